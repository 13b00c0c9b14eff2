//! Identifier normalization at the API boundary
//!
//! Clients send identifiers in two shapes: a plain string (`"…"`) or the
//! wrapped object form (`{"$oid": "…"}`) that document-store exports
//! produce. Both are accepted here, once, at deserialization time, so
//! domain logic only ever sees `Uuid`.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// An inbound record identifier, normalized to `Uuid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(pub Uuid);

impl Identifier {
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for Identifier {
    fn from(id: Uuid) -> Self {
        Identifier(id)
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(String),
            Wrapped {
                #[serde(rename = "$oid")]
                oid: String,
            },
        }

        let raw = Raw::deserialize(deserializer)?;
        let value = match raw {
            Raw::Plain(s) => s,
            Raw::Wrapped { oid } => oid,
        };

        Uuid::parse_str(value.trim())
            .map(Identifier)
            .map_err(|_| serde::de::Error::custom(format!("invalid identifier: {}", value)))
    }
}
