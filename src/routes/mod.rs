pub mod fleet_routes;
pub mod ws_routes;
