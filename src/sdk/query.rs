//! Search constraint evaluation.
//!
//! Constraints use the SDK's conjunction form:
//!
//! ```text
//! {"AND": [["doc_type", "==", "Users"], ["age", ">=", 18]]}
//! ```
//!
//! `doc_type` refers to the document's type; any other field is looked up in
//! the document data, with dots descending into nested objects.

use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query constraints must be an object with an \"AND\" array")]
    NotAnObject,

    #[error("constraint {0} must be a [field, operator, value] array")]
    MalformedConstraint(usize),

    #[error("unsupported operator '{0}'")]
    UnknownOperator(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FromStr for CompareOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            other => Err(QueryError::UnknownOperator(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

/// A conjunction of constraints. An empty query matches everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    constraints: Vec<Constraint>,
}

impl Query {
    pub fn parse(value: &Value) -> Result<Self, QueryError> {
        let object = value.as_object().ok_or(QueryError::NotAnObject)?;
        let Some(all) = object.get("AND") else {
            return if object.is_empty() {
                Ok(Query::default())
            } else {
                Err(QueryError::NotAnObject)
            };
        };
        let all = all.as_array().ok_or(QueryError::NotAnObject)?;

        let mut constraints = Vec::with_capacity(all.len());
        for (i, item) in all.iter().enumerate() {
            let parts = match item.as_array() {
                Some(parts) if parts.len() == 3 => parts,
                _ => return Err(QueryError::MalformedConstraint(i)),
            };
            let field = parts[0].as_str().ok_or(QueryError::MalformedConstraint(i))?;
            let op = parts[1]
                .as_str()
                .ok_or(QueryError::MalformedConstraint(i))?
                .parse()?;
            constraints.push(Constraint {
                field: field.to_string(),
                op,
                value: parts[2].clone(),
            });
        }

        Ok(Query { constraints })
    }

    pub fn matches(&self, doc_type: &str, data: &Value) -> bool {
        self.constraints.iter().all(|c| {
            let doc_type_value;
            let actual = if c.field == "doc_type" {
                doc_type_value = Value::String(doc_type.to_string());
                Some(&doc_type_value)
            } else {
                lookup(data, &c.field)
            };
            actual.is_some_and(|actual| compare(actual, c.op, &c.value))
        })
    }
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, segment| current.get(segment))
}

fn compare(actual: &Value, op: CompareOp, expected: &Value) -> bool {
    let ordering = match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64().zip(b.as_f64()).and_then(|(a, b)| a.partial_cmp(&b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    };

    match op {
        CompareOp::Eq => ordering.map_or(actual == expected, |o| o == Ordering::Equal),
        CompareOp::Ne => ordering.map_or(actual != expected, |o| o != Ordering::Equal),
        CompareOp::Lt => ordering == Some(Ordering::Less),
        CompareOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => ordering == Some(Ordering::Greater),
        CompareOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_doc_type_constraint() {
        let query = Query::parse(&json!({"AND": [["doc_type", "==", "Users"]]})).unwrap();
        assert!(query.matches("Users", &json!({})));
        assert!(!query.matches("Orders", &json!({})));
    }

    #[test]
    fn test_numeric_and_nested() {
        let query = Query::parse(&json!({
            "AND": [["age", ">=", 18], ["address.city", "!=", "Paris"]]
        }))
        .unwrap();

        assert!(query.matches("Users", &json!({"age": 18.0, "address": {"city": "Lyon"}})));
        assert!(!query.matches("Users", &json!({"age": 17, "address": {"city": "Lyon"}})));
        assert!(!query.matches("Users", &json!({"age": 30, "address": {"city": "Paris"}})));
        // Missing fields never match.
        assert!(!query.matches("Users", &json!({"age": 30})));
    }

    #[test]
    fn test_empty_query_matches_all() {
        let query = Query::parse(&json!({})).unwrap();
        assert!(query.matches("Anything", &json!(null)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Query::parse(&json!([])), Err(QueryError::NotAnObject));
        assert_eq!(
            Query::parse(&json!({"AND": [["a", "=="]]})),
            Err(QueryError::MalformedConstraint(0))
        );
        assert_eq!(
            Query::parse(&json!({"AND": [["a", "~", 1]]})),
            Err(QueryError::UnknownOperator("~".into()))
        );
    }
}
