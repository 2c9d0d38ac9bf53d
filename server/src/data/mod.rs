//! Query layer
//!
//! - `query` - Condition compiler (columns to filter tree)
//! - `pagination` - Page/size clamping and sort parsing
//! - `search` - Combines both into a compiled query for a store

pub mod pagination;
pub mod query;
pub mod search;
