//! Authentication types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity resolved from a verified credential.
///
/// A lightweight, read-only projection of the externally-owned user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_serialization_roundtrip() {
        let identity = AuthIdentity {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        };

        let json = serde_json::to_string(&identity).unwrap();
        let deserialized: AuthIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(identity, deserialized);
    }
}
