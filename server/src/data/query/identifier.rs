//! Store identifier conventions
//!
//! Document stores key records by a native identifier type living under a
//! fixed field name (`_id` holding an ObjectId in MongoDB). The compiler is
//! parameterized over both so the same column list can target stores with
//! different key conventions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// Public alias clients may use instead of the store's identifier field
pub const ID_ALIAS: &str = "id";

/// Column-name suffix requesting identifier coercion on an arbitrary field
pub const OID_SUFFIX: &str = ":oid";

/// Default identifier field name
pub const DEFAULT_ID_FIELD: &str = "_id";

// =============================================================================
// Identifier Kind
// =============================================================================

/// Native identifier type of the backing store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    /// 12-byte ObjectId written as 24 hex characters
    #[default]
    ObjectId,
    /// RFC 4122 UUID
    Uuid,
}

impl IdentifierKind {
    /// Parse a raw string into this identifier kind
    pub fn parse(&self, raw: &str) -> Option<Identifier> {
        match self {
            Self::ObjectId => raw.parse::<ObjectId>().ok().map(Identifier::ObjectId),
            Self::Uuid => Uuid::parse_str(raw).ok().map(Identifier::Uuid),
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::ObjectId => write!(f, "objectid"),
            IdentifierKind::Uuid => write!(f, "uuid"),
        }
    }
}

// =============================================================================
// ObjectId
// =============================================================================

/// 12-byte document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for ObjectId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// =============================================================================
// Identifier
// =============================================================================

/// A value coerced into the store's native identifier type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    ObjectId(ObjectId),
    Uuid(Uuid),
}

impl Identifier {
    /// Extended-JSON representation (`{"$oid": ..}` / `{"$uuid": ..}`)
    pub fn to_document(&self) -> Value {
        match self {
            Self::ObjectId(oid) => json!({ "$oid": oid.to_hex() }),
            Self::Uuid(uuid) => json!({ "$uuid": uuid.hyphenated().to_string() }),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectId(oid) => write!(f, "{}", oid),
            Self::Uuid(uuid) => write!(f, "{}", uuid.hyphenated()),
        }
    }
}

// =============================================================================
// Store Conventions
// =============================================================================

/// Identifier field name and type of the target store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConventions {
    pub id_field: String,
    pub id_kind: IdentifierKind,
}

impl Default for StoreConventions {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            id_kind: IdentifierKind::default(),
        }
    }
}

impl StoreConventions {
    pub fn new(id_field: impl Into<String>, id_kind: IdentifierKind) -> Self {
        Self {
            id_field: id_field.into(),
            id_kind,
        }
    }

    /// Map a column name to its output field and whether identifier coercion applies.
    ///
    /// `id` and the identifier field both map to the identifier field; a
    /// `:oid` suffix is stripped and keeps the remaining name verbatim, so
    /// `id:oid` targets a literal `id` field. Callers reject a bare `:oid`
    /// before resolving.
    pub fn resolve_field<'a>(&'a self, name: &'a str) -> (&'a str, bool) {
        if let Some(stripped) = name.strip_suffix(OID_SUFFIX) {
            return (stripped, true);
        }
        if name == ID_ALIAS || name == self.id_field {
            return (self.id_field.as_str(), true);
        }
        (name, false)
    }
}
