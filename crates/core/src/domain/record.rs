use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coordinates::Coordinates;

/// Fixed identity fields written with every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub first: String,
    pub last: String,
    pub born: i64,
}

impl Default for UserIdentity {
    fn default() -> Self {
        Self {
            first: "Raditya".to_string(),
            last: "HerKristito".to_string(),
            born: 2002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub identity: UserIdentity,
    pub created_at: DateTime<Utc>,
    /// `None` when no position could be read for this run. The store still
    /// receives [`Coordinates::SENTINEL`] in that case, see
    /// [`UserRecord::stored_coordinates`].
    pub location: Option<Coordinates>,
}

impl UserRecord {
    pub fn new(identity: UserIdentity, location: Option<Coordinates>) -> Self {
        Self {
            identity,
            created_at: Utc::now(),
            location,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn stored_coordinates(&self) -> Coordinates {
        self.location.unwrap_or(Coordinates::SENTINEL)
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_location_stores_sentinel() {
        let record = UserRecord::new(UserIdentity::default(), None);
        assert!(!record.has_location());
        assert_eq!(record.stored_coordinates(), Coordinates::SENTINEL);
    }

    #[test]
    fn test_real_origin_is_distinguishable() {
        let record = UserRecord::new(UserIdentity::default(), Some(Coordinates::SENTINEL));
        assert!(record.has_location());
        assert!(record.stored_coordinates().is_sentinel());
    }

    #[test]
    fn test_default_identity() {
        let identity = UserIdentity::default();
        assert_eq!(identity.first, "Raditya");
        assert_eq!(identity.last, "HerKristito");
        assert_eq!(identity.born, 2002);
    }
}
