//! # Identifiers
//!
//! `Uuid`-backed newtypes for every entity in the data model. Each follows
//! the same shape: `new()` for a fresh random id, `from_uuid`/`as_uuid` to
//! cross the storage boundary, and a `Display` impl that renders the
//! hyphenated UUID form used in URLs and JSON bodies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID, e.g. one read back from storage.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_newtype!(PrincipalId, "Identifies the human or organization a set of agents acts on behalf of.");
uuid_newtype!(AgentId, "Identifies a credentialed issuer of attestations.");
uuid_newtype!(RuleId, "Identifies a rule, stable across its version history.");
uuid_newtype!(AttestationId, "Identifies one issued attestation.");
uuid_newtype!(BatchId, "Identifies one Merkle batch commit.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_distinct() {
        assert_ne!(AgentId::new(), AgentId::new());
    }

    #[test]
    fn display_and_parse_roundtrip() {
        let id = RuleId::new();
        let s = id.to_string();
        let parsed: RuleId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_uuid_and_as_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = AttestationId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn serde_roundtrip() {
        let id = BatchId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: BatchId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn distinct_id_types_do_not_collide_via_display() {
        let agent = AgentId::new();
        let rule: RuleId = agent.to_string().parse().unwrap();
        assert_eq!(agent.as_uuid(), rule.as_uuid());
    }
}
