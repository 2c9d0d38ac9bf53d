//! Column list compilation
//!
//! Validates each column, resolves operator/connective aliases, coerces
//! identifier values and folds the terms into an AND/OR tree.
//!
//! ## Grouping
//!
//! Connectives are positional: the connective on column `i` relates it to
//! column `i + 1`. Runs joined by AND form a group, an OR closes the current
//! group. Groups of two or more terms become `$and`, several groups become
//! `$or`:
//!
//! ```text
//! a AND b OR c AND d OR e   =>   (a AND b) OR (c AND d) OR e
//! ```
//!
//! There is no parenthesization and no operator precedence beyond this.

use std::ops::Range;

use serde_json::Value;

use super::error::QueryError;
use super::identifier::{OID_SUFFIX, StoreConventions};
use super::types::{Column, Condition, Connective, FieldValue, Filter, Operator};
use crate::utils::pattern::{escape_regex_pattern, split_list};

/// A column whose aliases resolved successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub operator: Operator,
    pub connective: Connective,
}

/// Validate one column in isolation.
///
/// Checks run in order: name, value, operator, connective, membership value.
/// The connective is checked even on the last column although grouping never
/// reads it. A name that is only the `:oid` suffix counts as empty.
pub fn validate_column(index: usize, column: &Column) -> Result<ResolvedColumn, QueryError> {
    let field = column.name.strip_suffix(OID_SUFFIX).unwrap_or(&column.name);
    if field.is_empty() {
        return Err(QueryError::EmptyName { index });
    }
    if column.value.is_none() {
        return Err(QueryError::NilValue {
            index,
            column: column.name.clone(),
        });
    }
    let operator =
        Operator::parse(&column.operator).ok_or_else(|| QueryError::UnknownOperator {
            index,
            operator: column.operator.clone(),
        })?;
    let connective =
        Connective::parse(&column.connective).ok_or_else(|| QueryError::UnknownConnective {
            index,
            connective: column.connective.clone(),
        })?;
    if operator == Operator::In
        && !matches!(column.value, Some(Value::String(_) | Value::Array(_)))
    {
        return Err(QueryError::InvalidMembershipValue {
            index,
            column: column.name.clone(),
        });
    }
    Ok(ResolvedColumn {
        operator,
        connective,
    })
}

/// Validate a batch without compiling it; returns the first error in column order
pub fn validate_columns(columns: &[Column]) -> Result<(), QueryError> {
    for (index, column) in columns.iter().enumerate() {
        validate_column(index, column)?;
    }
    Ok(())
}

/// Partition `0..len` into groups, closing a group after every OR boundary.
///
/// `is_or(i)` reports whether the boundary between `i` and `i + 1` is OR and
/// is only called for `i < len - 1`.
pub fn group_boundaries(len: usize, is_or: impl Fn(usize) -> bool) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    if len == 0 {
        return groups;
    }

    let mut start = 0;
    for boundary in 0..len - 1 {
        if is_or(boundary) {
            groups.push(start..boundary + 1);
            start = boundary + 1;
        }
    }
    groups.push(start..len);
    groups
}

/// Compiles column lists for one store's identifier conventions
#[derive(Debug, Clone, Default)]
pub struct ConditionCompiler {
    conventions: StoreConventions,
}

impl ConditionCompiler {
    pub fn new(conventions: StoreConventions) -> Self {
        Self { conventions }
    }

    /// Run every per-column check `compile` runs, without building terms
    pub fn validate(&self, columns: &[Column]) -> Result<(), QueryError> {
        validate_columns(columns)
    }

    /// Compile a column list into a filter tree
    pub fn compile(&self, columns: &[Column]) -> Result<Filter, QueryError> {
        let mut terms = Vec::with_capacity(columns.len());
        let mut connectives = Vec::with_capacity(columns.len());

        for (index, column) in columns.iter().enumerate() {
            let resolved = validate_column(index, column)?;
            terms.push(self.compile_term(index, column, resolved.operator)?);
            connectives.push(resolved.connective);
        }

        let groups = group_boundaries(terms.len(), |i| connectives[i] == Connective::Or);
        tracing::trace!(
            columns = columns.len(),
            groups = groups.len(),
            "Compiled column list"
        );

        let mut terms = terms.into_iter();
        let mut grouped: Vec<Filter> = groups
            .into_iter()
            .map(|range| {
                let mut members: Vec<Filter> = terms.by_ref().take(range.len()).collect();
                if members.len() == 1 {
                    members.remove(0)
                } else {
                    Filter::And(members)
                }
            })
            .collect();

        Ok(match grouped.len() {
            0 => Filter::All,
            1 => grouped.remove(0),
            _ => Filter::Or(grouped),
        })
    }

    fn compile_term(
        &self,
        index: usize,
        column: &Column,
        operator: Operator,
    ) -> Result<Filter, QueryError> {
        let (field, coerce) = self.conventions.resolve_field(&column.name);
        let raw = column.value.clone().unwrap_or(Value::Null);

        let condition = match operator {
            Operator::Eq => Condition::Eq(self.coerce(field, raw, coerce)),
            Operator::Ne => Condition::Ne(self.coerce(field, raw, coerce)),
            Operator::Gt => Condition::Gt(self.coerce(field, raw, coerce)),
            Operator::Gte => Condition::Gte(self.coerce(field, raw, coerce)),
            Operator::Lt => Condition::Lt(self.coerce(field, raw, coerce)),
            Operator::Lte => Condition::Lte(self.coerce(field, raw, coerce)),
            Operator::Like => {
                let text = self.coerce(field, raw, coerce).as_text();
                Condition::Like {
                    pattern: escape_regex_pattern(&text),
                }
            }
            Operator::In => {
                let items = match raw {
                    Value::String(joined) => split_list(&joined)
                        .into_iter()
                        .map(Value::String)
                        .collect(),
                    Value::Array(items) => items,
                    _ => {
                        return Err(QueryError::InvalidMembershipValue {
                            index,
                            column: column.name.clone(),
                        });
                    }
                };
                Condition::In(
                    items
                        .into_iter()
                        .map(|item| self.coerce(field, item, coerce))
                        .collect(),
                )
            }
        };

        tracing::trace!(field, operator = operator.as_str(), coerce, "Compiled term");
        Ok(Filter::term(field, condition))
    }

    /// Parse string values on identifier fields into the native identifier type.
    ///
    /// Unparseable input is kept as-is: callers filtering `_id` by a
    /// malformed id get a filter that simply matches nothing.
    fn coerce(&self, field: &str, value: Value, coerce: bool) -> FieldValue {
        if !coerce {
            return FieldValue::Json(value);
        }
        let Value::String(raw) = value else {
            return FieldValue::Json(value);
        };
        match self.conventions.id_kind.parse(&raw) {
            Some(id) => FieldValue::Id(id),
            None => {
                tracing::debug!(
                    field,
                    value = %raw,
                    kind = %self.conventions.id_kind,
                    "Identifier coercion failed, keeping raw value"
                );
                FieldValue::Json(Value::String(raw))
            }
        }
    }
}

/// Compile with the default store conventions (`_id` / ObjectId)
pub fn compile(columns: &[Column]) -> Result<Filter, QueryError> {
    ConditionCompiler::default().compile(columns)
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
