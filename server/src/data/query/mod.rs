//! Condition compiler
//!
//! Turns a flat list of client-supplied columns (name, operator, value,
//! logic) into a boolean filter tree for a document store.
//!
//! ## Usage
//!
//! ```
//! use sieve_server::data::query::{Column, compile};
//! use serde_json::json;
//!
//! let columns = vec![
//!     Column::new("status", "in", json!("open,pending")).logic("or"),
//!     Column::new("owner", "", json!("alice")),
//! ];
//! let filter = compile(&columns).unwrap();
//! assert_eq!(
//!     filter.to_document(),
//!     json!({ "$or": [
//!         { "status": { "$in": ["open", "pending"] } },
//!         { "owner": "alice" }
//!     ]})
//! );
//! ```

mod compiler;
mod error;
mod identifier;
mod types;

pub use compiler::{
    ConditionCompiler, ResolvedColumn, compile, group_boundaries, validate_column,
    validate_columns,
};
pub use error::QueryError;
pub use identifier::{
    DEFAULT_ID_FIELD, ID_ALIAS, Identifier, IdentifierKind, OID_SUFFIX, ObjectId,
    StoreConventions,
};
pub use types::{Column, Condition, Connective, FieldValue, Filter, Operator, Term};
