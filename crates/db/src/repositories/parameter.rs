//! Key/value parameter store (feature flags).

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

use crate::entities::parameters;

/// Whether creating a transfer requires an already-open till session for
/// the acting user (otherwise one is opened automatically).
pub const PARAM_REQUIRE_OPEN_TILL: &str = "transfers.require_open_till";

/// Parameter repository.
#[derive(Debug, Clone)]
pub struct ParameterRepository {
    db: DatabaseConnection,
}

impl ParameterRepository {
    /// Creates a new parameter repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads a boolean parameter, falling back to `default` when the key is
    /// absent or unparseable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn bool_value(&self, key: &str, default: bool) -> Result<bool, DbErr> {
        let row = parameters::Entity::find_by_id(key).one(&self.db).await?;
        Ok(row.map_or(default, |p| parse_bool(&p.value, default)))
    }
}

/// Lenient boolean parsing for stored parameter values.
fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_truthy() {
        assert!(parse_bool("true", false));
        assert!(parse_bool("1", false));
        assert!(parse_bool(" YES ", false));
        assert!(parse_bool("on", false));
    }

    #[test]
    fn test_parse_bool_falsy() {
        assert!(!parse_bool("false", true));
        assert!(!parse_bool("0", true));
        assert!(!parse_bool("No", true));
        assert!(!parse_bool("off", true));
    }

    #[test]
    fn test_parse_bool_garbage_falls_back() {
        assert!(parse_bool("maybe", true));
        assert!(!parse_bool("maybe", false));
    }
}
