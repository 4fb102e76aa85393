//! Middleware de CORS

use tower_http::cors::CorsLayer;

/// CORS permisivo para desarrollo; el frontend corre en otro origen
pub fn cors_middleware() -> CorsLayer {
    CorsLayer::very_permissive()
}
