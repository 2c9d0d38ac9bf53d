//! Pagination normalizer
//!
//! Clamps page/size input and parses comma-separated sort specs such as
//! `"name,-created_at"` into ordered sort fields.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::{Map, Value};

use super::query::{DEFAULT_ID_FIELD, ID_ALIAS, StoreConventions};

/// Page size used when the client sends none (or a non-positive one)
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Default upper bound on page size
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 1000;
/// The maximum page size can never be configured below this
pub const MIN_MAX_PAGE_SIZE: u64 = 10;

static GLOBAL: Paginator = Paginator::new();

/// Set the process-wide maximum page size (raised to at least 10)
pub fn set_max_page_size(size: i64) {
    GLOBAL.set_max_page_size(size);
}

/// Current process-wide maximum page size
pub fn max_page_size() -> u64 {
    GLOBAL.max_page_size()
}

/// Normalize using the process-wide paginator
pub fn normalize_page(page: i64, size: i64, sort: &str) -> PageSpec {
    GLOBAL.normalize(page, size, sort)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Desc,
    Asc,
}

impl OrderDirection {
    /// Sort-document value (`1` ascending, `-1` descending)
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// One key of a multi-key sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    pub field: String,
    pub direction: OrderDirection,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }
}

/// Render sort fields as an ordered sort document (`{"name": 1, "age": -1}`)
pub fn sort_document(sort: &[SortField]) -> Value {
    let mut doc = Map::new();
    for field in sort {
        doc.insert(field.field.clone(), Value::from(field.direction.as_i32()));
    }
    Value::Object(doc)
}

/// Parse a sort spec into sort fields.
///
/// Whitespace is ignored, `-` marks descending, a bare `id` maps to
/// `id_field`. An empty spec sorts by `id_field` descending. Tokens are not
/// validated against any schema.
pub fn normalize_sort(sort: &str, id_field: &str) -> Vec<SortField> {
    let compact: String = sort.chars().filter(|c| !c.is_whitespace()).collect();

    let fields: Vec<SortField> = compact
        .split(',')
        .filter_map(|token| {
            let (name, direction) = match token.strip_prefix('-') {
                Some(rest) => (rest, OrderDirection::Desc),
                None => (token, OrderDirection::Asc),
            };
            if name.is_empty() {
                return None;
            }
            let field = if name == ID_ALIAS { id_field } else { name };
            Some(SortField {
                field: field.to_string(),
                direction,
            })
        })
        .collect();

    if fields.is_empty() {
        vec![SortField::desc(id_field)]
    } else {
        fields
    }
}

/// Normalized pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSpec {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortField>,
    pub skip: u64,
}

impl PageSpec {
    /// Number of documents to return
    pub fn limit(&self) -> u64 {
        self.size
    }
}

/// Page normalizer with a configurable maximum page size
#[derive(Debug)]
pub struct Paginator {
    max_page_size: AtomicU64,
    id_field: Cow<'static, str>,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new()
    }
}

impl Paginator {
    pub const fn new() -> Self {
        Self {
            max_page_size: AtomicU64::new(DEFAULT_MAX_PAGE_SIZE),
            id_field: Cow::Borrowed(DEFAULT_ID_FIELD),
        }
    }

    /// Build a paginator for a store's conventions and size limit
    pub fn with_conventions(conventions: &StoreConventions, max_page_size: i64) -> Self {
        let paginator = Self {
            max_page_size: AtomicU64::new(DEFAULT_MAX_PAGE_SIZE),
            id_field: Cow::Owned(conventions.id_field.clone()),
        };
        paginator.set_max_page_size(max_page_size);
        paginator
    }

    pub fn max_page_size(&self) -> u64 {
        self.max_page_size.load(Ordering::Relaxed)
    }

    pub fn set_max_page_size(&self, size: i64) {
        let size = u64::try_from(size)
            .unwrap_or(0)
            .max(MIN_MAX_PAGE_SIZE);
        self.max_page_size.store(size, Ordering::Relaxed);
        tracing::debug!(max_page_size = size, "Max page size updated");
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Clamp page and size, parse the sort spec and derive `skip`
    pub fn normalize(&self, page: i64, size: i64, sort: &str) -> PageSpec {
        let page = u64::try_from(page).unwrap_or(0);
        let size = match u64::try_from(size) {
            Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
            Ok(size) => size.min(self.max_page_size()),
        };
        PageSpec {
            page,
            size,
            sort: normalize_sort(sort, &self.id_field),
            skip: page.saturating_mul(size),
        }
    }
}
