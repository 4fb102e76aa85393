//! Registro de operadores conectados
//!
//! Estado efímero del proceso: se reconstruye en cada arranque y se
//! limpia explícitamente al iniciar para no arrastrar fantasmas de una
//! sesión anterior. La deduplicación es por nombre, no por conexión:
//! modela a la misma persona reconectándose.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::models::Operator;

#[derive(Default)]
pub struct PresenceTracker {
    operators: HashMap<Uuid, Operator>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alta de un operador. Si ya había uno con el mismo nombre se lo
    /// elimina primero; el registro nuevo recibe id y timestamp frescos.
    pub fn join(&mut self, name: &str, connection_id: Uuid) -> Operator {
        self.operators.retain(|_, op| op.name != name);

        let operator = Operator {
            id: Uuid::new_v4(),
            name: name.to_string(),
            connection_id,
            last_active: Utc::now(),
        };
        self.operators.insert(operator.id, operator.clone());
        operator
    }

    /// Baja por id de conexión; devuelve el operador eliminado si existía
    pub fn leave(&mut self, connection_id: Uuid) -> Option<Operator> {
        let id = self
            .operators
            .values()
            .find(|op| op.connection_id == connection_id)
            .map(|op| op.id)?;
        self.operators.remove(&id)
    }

    pub fn list(&self) -> Vec<Operator> {
        self.operators.values().cloned().collect()
    }

    /// Vaciar el registro; corre una vez por arranque de proceso
    pub fn clear(&mut self) {
        self.operators.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_dedups_by_name() {
        let mut tracker = PresenceTracker::new();
        let conn_a = Uuid::new_v4();
        let conn_b = Uuid::new_v4();

        let first = tracker.join("Ana", conn_a);
        let second = tracker.join("Ana", conn_b);

        let active = tracker.list();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);
        assert_eq!(active[0].connection_id, conn_b);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_leave_by_connection() {
        let mut tracker = PresenceTracker::new();
        let conn = Uuid::new_v4();
        let operator = tracker.join("Bruno", conn);

        let removed = tracker.leave(conn);
        assert_eq!(removed.map(|op| op.id), Some(operator.id));
        assert!(tracker.list().is_empty());
    }

    #[test]
    fn test_leave_unknown_connection_is_noop() {
        let mut tracker = PresenceTracker::new();
        tracker.join("Carla", Uuid::new_v4());

        assert!(tracker.leave(Uuid::new_v4()).is_none());
        assert_eq!(tracker.list().len(), 1);
    }

    #[test]
    fn test_clear_drops_everyone() {
        let mut tracker = PresenceTracker::new();
        tracker.join("Ana", Uuid::new_v4());
        tracker.join("Bruno", Uuid::new_v4());

        tracker.clear();
        assert!(tracker.list().is_empty());
    }
}
