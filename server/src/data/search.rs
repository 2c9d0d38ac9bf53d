//! Search request compilation
//!
//! Combines the condition compiler and the paginator: one `SearchRequest`
//! in, one `CompiledQuery` (filter, sort, limit, skip) out.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use super::pagination::{PageSpec, Paginator, SortField, sort_document};
use super::query::{Column, ConditionCompiler, Filter, QueryError, StoreConventions};
use crate::core::config::QueryConfig;

/// Generic search request as sent by clients
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct SearchRequest {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    #[validate(length(max = 1024, message = "sort must be at most 1024 characters"))]
    pub sort: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// Everything a store driver needs to run the query
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub filter: Filter,
    pub sort: Vec<SortField>,
    pub limit: u64,
    pub skip: u64,
}

impl CompiledQuery {
    fn from_parts(filter: Filter, page: PageSpec) -> Self {
        Self {
            filter,
            limit: page.limit(),
            skip: page.skip,
            sort: page.sort,
        }
    }

    /// Render as `{"filter": .., "sort": .., "limit": .., "skip": ..}`
    pub fn to_document(&self) -> Value {
        json!({
            "filter": self.filter.to_document(),
            "sort": sort_document(&self.sort),
            "limit": self.limit,
            "skip": self.skip,
        })
    }
}

/// Compiles search requests for one store
#[derive(Debug, Default)]
pub struct SearchService {
    compiler: ConditionCompiler,
    paginator: Paginator,
}

impl SearchService {
    pub fn new(compiler: ConditionCompiler, paginator: Paginator) -> Self {
        Self {
            compiler,
            paginator,
        }
    }

    pub fn from_config(config: &QueryConfig) -> Self {
        let conventions = StoreConventions::new(config.id_field.clone(), config.id_kind);
        let paginator = Paginator::with_conventions(&conventions, config.max_page_size);
        tracing::debug!(
            id_field = %conventions.id_field,
            id_kind = %conventions.id_kind,
            max_page_size = paginator.max_page_size(),
            "Search service configured"
        );
        Self::new(ConditionCompiler::new(conventions), paginator)
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Validate the request's columns without compiling them
    pub fn validate(&self, request: &SearchRequest) -> Result<(), QueryError> {
        self.compiler.validate(&request.columns)
    }

    pub fn compile(&self, request: &SearchRequest) -> Result<CompiledQuery, QueryError> {
        let filter = self.compiler.compile(&request.columns)?;
        let page = self
            .paginator
            .normalize(request.page, request.size, &request.sort);
        Ok(CompiledQuery::from_parts(filter, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::query::IdentifierKind;

    fn request(value: Value) -> SearchRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn compile_full_request() {
        let service = SearchService::default();
        let compiled = service
            .compile(&request(json!({
                "page": 2,
                "size": 25,
                "sort": "name,-age",
                "columns": [
                    { "name": "age", "exp": ">=", "value": 18, "logic": "and" },
                    { "name": "name", "exp": "like", "value": "ann" }
                ]
            })))
            .unwrap();

        assert_eq!(compiled.limit, 25);
        assert_eq!(compiled.skip, 50);
        assert_eq!(
            compiled.to_document(),
            json!({
                "filter": { "$and": [
                    { "age": { "$gte": 18 } },
                    { "name": { "$regex": "ann", "$options": "i" } }
                ]},
                "sort": { "name": 1, "age": -1 },
                "limit": 25,
                "skip": 50
            })
        );
    }

    #[test]
    fn compile_empty_request() {
        let compiled = SearchService::default().compile(&request(json!({}))).unwrap();
        assert_eq!(compiled.filter, Filter::All);
        assert_eq!(compiled.limit, 10);
        assert_eq!(compiled.skip, 0);
        assert_eq!(compiled.sort, vec![SortField::desc("_id")]);
    }

    #[test]
    fn compile_propagates_column_errors() {
        let err = SearchService::default()
            .compile(&request(json!({
                "columns": [{ "name": "a", "exp": "between", "value": 1 }]
            })))
            .unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_OPERATOR");
    }

    #[test]
    fn validate_only_checks_columns() {
        let service = SearchService::default();
        assert!(
            service
                .validate(&request(json!({ "size": -3, "columns": [{ "name": "a", "value": 1 }] })))
                .is_ok()
        );
        assert_eq!(
            service
                .validate(&request(json!({ "columns": [{ "name": "a" }] })))
                .unwrap_err()
                .code(),
            "NIL_VALUE"
        );
    }

    #[test]
    fn request_validation_limits_sort_length() {
        let ok = request(json!({ "sort": "a".repeat(1024) }));
        assert!(ok.validate().is_ok());

        let long = request(json!({ "sort": "a".repeat(1025) }));
        let errors = long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sort"));
    }

    #[test]
    fn from_config_applies_conventions() {
        let config = QueryConfig {
            max_page_size: 40,
            max_columns: 50,
            id_field: "uid".to_string(),
            id_kind: IdentifierKind::Uuid,
        };
        let service = SearchService::from_config(&config);
        assert_eq!(service.paginator().max_page_size(), 40);

        let uuid = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let compiled = service
            .compile(&request(json!({
                "size": 500,
                "sort": "-id",
                "columns": [{ "name": "id", "value": uuid }]
            })))
            .unwrap();
        assert_eq!(compiled.limit, 40);
        assert_eq!(
            compiled.to_document()["filter"],
            json!({ "uid": { "$uuid": uuid } })
        );
        assert_eq!(compiled.sort, vec![SortField::desc("uid")]);
    }
}
