//! Column and filter type definitions
//!
//! `Column` is the wire shape clients send. `Filter` is the compiled tree
//! handed to the store driver, rendered as a MongoDB-style query document.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

use super::identifier::Identifier;

/// One client-supplied filter term
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Column {
    /// Field to filter on
    #[serde(default)]
    pub name: String,
    /// Comparison operator alias (empty means equality)
    #[serde(default, rename = "exp", alias = "operator")]
    pub operator: String,
    /// Comparison value; `None` covers both an absent key and JSON null
    #[serde(default)]
    pub value: Option<Value>,
    /// Relation to the next column (empty means AND)
    #[serde(default, rename = "logic", alias = "connective")]
    pub connective: String,
}

impl Column {
    pub fn new(name: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            operator: operator.into(),
            value: Some(value),
            connective: String::new(),
        }
    }

    /// Set the connective linking this column to the next one
    pub fn logic(mut self, connective: impl Into<String>) -> Self {
        self.connective = connective.into();
        self
    }
}

/// Canonical comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
}

impl Operator {
    /// Resolve an operator alias; the empty token defaults to equality
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "" | "eq" | "=" => Some(Self::Eq),
            "neq" | "!=" => Some(Self::Ne),
            "gt" | ">" => Some(Self::Gt),
            "gte" | ">=" => Some(Self::Gte),
            "lt" | "<" => Some(Self::Lt),
            "lte" | "<=" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
        }
    }
}

/// Boolean relation between a column and the next one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl Connective {
    /// Resolve a connective alias; the empty token defaults to AND
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "" | "and" | "&" | "&&" => Some(Self::And),
            "or" | "|" | "||" => Some(Self::Or),
            _ => None,
        }
    }
}

/// A comparison operand: opaque client JSON or a coerced store identifier
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(Value),
    Id(Identifier),
}

impl FieldValue {
    pub fn to_document(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Id(id) => id.to_document(),
        }
    }

    /// Text form used to build `like` patterns
    pub fn as_text(&self) -> String {
        match self {
            Self::Json(Value::String(s)) => s.clone(),
            Self::Json(other) => other.to_string(),
            Self::Id(id) => id.to_string(),
        }
    }
}

/// Compiled condition applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(FieldValue),
    Ne(FieldValue),
    Gt(FieldValue),
    Gte(FieldValue),
    Lt(FieldValue),
    Lte(FieldValue),
    /// Case-insensitive regex with metacharacters already escaped
    Like { pattern: String },
    In(Vec<FieldValue>),
}

impl Condition {
    pub fn to_document(&self) -> Value {
        match self {
            Self::Eq(value) => value.to_document(),
            Self::Ne(value) => json!({ "$ne": value.to_document() }),
            Self::Gt(value) => json!({ "$gt": value.to_document() }),
            Self::Gte(value) => json!({ "$gte": value.to_document() }),
            Self::Lt(value) => json!({ "$lt": value.to_document() }),
            Self::Lte(value) => json!({ "$lte": value.to_document() }),
            Self::Like { pattern } => json!({ "$regex": pattern, "$options": "i" }),
            Self::In(values) => {
                let items: Vec<Value> = values.iter().map(FieldValue::to_document).collect();
                json!({ "$in": items })
            }
        }
    }
}

/// A single compiled field term
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub field: String,
    pub condition: Condition,
}

/// Compiled boolean filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    Term(Term),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn term(field: impl Into<String>, condition: Condition) -> Self {
        Self::Term(Term {
            field: field.into(),
            condition,
        })
    }

    /// Render as a query document
    pub fn to_document(&self) -> Value {
        match self {
            Self::All => Value::Object(Map::new()),
            Self::Term(term) => {
                let mut doc = Map::new();
                doc.insert(term.field.clone(), term.condition.to_document());
                Value::Object(doc)
            }
            Self::And(children) => json!({ "$and": Self::render_all(children) }),
            Self::Or(children) => json!({ "$or": Self::render_all(children) }),
        }
    }

    fn render_all(children: &[Filter]) -> Vec<Value> {
        children.iter().map(Filter::to_document).collect()
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::query::identifier::IdentifierKind;

    #[test]
    fn operator_aliases() {
        let cases = [
            ("", Operator::Eq),
            ("eq", Operator::Eq),
            ("=", Operator::Eq),
            ("neq", Operator::Ne),
            ("!=", Operator::Ne),
            ("gt", Operator::Gt),
            (">", Operator::Gt),
            ("gte", Operator::Gte),
            (">=", Operator::Gte),
            ("lt", Operator::Lt),
            ("<", Operator::Lt),
            ("lte", Operator::Lte),
            ("<=", Operator::Lte),
            ("like", Operator::Like),
            ("in", Operator::In),
        ];
        for (token, expected) in cases {
            assert_eq!(Operator::parse(token), Some(expected), "token {:?}", token);
        }
        assert_eq!(Operator::parse("=="), None);
        assert_eq!(Operator::parse("EQ"), None);
    }

    #[test]
    fn connective_aliases() {
        for token in ["", "and", "&", "&&"] {
            assert_eq!(Connective::parse(token), Some(Connective::And));
        }
        for token in ["or", "|", "||"] {
            assert_eq!(Connective::parse(token), Some(Connective::Or));
        }
        assert_eq!(Connective::parse("xor"), None);
    }

    #[test]
    fn column_deserializes_wire_names() {
        let column: Column = serde_json::from_value(json!({
            "name": "age",
            "exp": ">=",
            "value": 18,
            "logic": "or"
        }))
        .unwrap();
        assert_eq!(column, Column::new("age", ">=", json!(18)).logic("or"));
    }

    #[test]
    fn column_null_value_is_none() {
        let column: Column = serde_json::from_value(json!({ "name": "a", "value": null })).unwrap();
        assert!(column.value.is_none());

        let column: Column = serde_json::from_value(json!({ "name": "a" })).unwrap();
        assert!(column.value.is_none());
        assert!(column.operator.is_empty());
        assert!(column.connective.is_empty());
    }

    #[test]
    fn filter_documents() {
        assert_eq!(Filter::All.to_document(), json!({}));

        let eq = Filter::term("name", Condition::Eq(FieldValue::Json(json!("bob"))));
        assert_eq!(eq.to_document(), json!({ "name": "bob" }));

        let like = Filter::term(
            "title",
            Condition::Like {
                pattern: "a\\.b".to_string(),
            },
        );
        assert_eq!(
            like.to_document(),
            json!({ "title": { "$regex": "a\\.b", "$options": "i" } })
        );

        let tree = Filter::Or(vec![
            eq.clone(),
            Filter::And(vec![
                Filter::term("age", Condition::Gt(FieldValue::Json(json!(30)))),
                Filter::term(
                    "tag",
                    Condition::In(vec![
                        FieldValue::Json(json!("x")),
                        FieldValue::Json(json!("y")),
                    ]),
                ),
            ]),
        ]);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({ "$or": [
                { "name": "bob" },
                { "$and": [
                    { "age": { "$gt": 30 } },
                    { "tag": { "$in": ["x", "y"] } }
                ]}
            ]})
        );
    }

    #[test]
    fn identifier_value_renders_extended_json() {
        let id = IdentifierKind::ObjectId
            .parse("65a1f0c2e4b0a1b2c3d4e5f6")
            .unwrap();
        let filter = Filter::term("_id", Condition::Ne(FieldValue::Id(id)));
        assert_eq!(
            filter.to_document(),
            json!({ "_id": { "$ne": { "$oid": "65a1f0c2e4b0a1b2c3d4e5f6" } } })
        );
    }

    #[test]
    fn field_value_text() {
        assert_eq!(FieldValue::Json(json!("abc")).as_text(), "abc");
        assert_eq!(FieldValue::Json(json!(42)).as_text(), "42");
        assert_eq!(FieldValue::Json(json!(true)).as_text(), "true");
    }
}
