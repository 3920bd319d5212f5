//! Key condition expressions for the in-memory store.
//!
//! Supports the subset DynamoDB allows in `KeyConditionExpression`:
//! an equality on the partition key, optionally combined with one sort key
//! condition (`=`, `<`, `<=`, `>`, `>=`, `BETWEEN`, `begins_with`).

use crate::utils::error::{GatewayError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(<=|>=|<>|[=<>(),]|:[A-Za-z0-9_]+|[A-Za-z_][A-Za-z0-9_.\-]*)").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(Comparator, Value),
    Between(Value, Value),
    BeginsWith(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub attribute: String,
    pub predicate: Predicate,
}

impl Clause {
    pub fn matches(&self, item: &Map<String, Value>) -> bool {
        let Some(actual) = item.get(&self.attribute) else {
            return false;
        };

        match &self.predicate {
            Predicate::Compare(op, expected) => match compare_scalars(actual, expected) {
                Some(ordering) => match op {
                    Comparator::Eq => ordering == Ordering::Equal,
                    Comparator::Lt => ordering == Ordering::Less,
                    Comparator::Le => ordering != Ordering::Greater,
                    Comparator::Gt => ordering == Ordering::Greater,
                    Comparator::Ge => ordering != Ordering::Less,
                },
                None => false,
            },
            Predicate::Between(low, high) => {
                matches!(
                    compare_scalars(actual, low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    compare_scalars(actual, high),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            Predicate::BeginsWith(prefix) => actual
                .as_str()
                .map(|s| s.starts_with(prefix.as_str()))
                .unwrap_or(false),
        }
    }
}

/// Orders two key scalars of the same type; `None` for mixed or
/// non-scalar values.
pub fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

/// A parsed condition: one or two clauses, in expression order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConditionExpr {
    pub clauses: Vec<Clause>,
}

impl KeyConditionExpr {
    pub fn parse(expression: &str, values: &Map<String, Value>) -> Result<Self> {
        let tokens = tokenize(expression)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            values,
        };

        let mut clauses = vec![parser.clause()?];
        if parser.eat_keyword("and") {
            clauses.push(parser.clause()?);
        }
        if let Some(extra) = parser.peek() {
            return Err(invalid(format!("unexpected token '{}'", extra)));
        }

        Ok(Self { clauses })
    }

    pub fn matches(&self, item: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|clause| clause.matches(item))
    }
}

fn invalid(reason: impl std::fmt::Display) -> GatewayError {
    GatewayError::storage(format!("Invalid KeyConditionExpression: {}", reason))
}

fn tokenize(expression: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut rest = expression.trim_end();

    while !rest.is_empty() {
        let Some(caps) = TOKEN.captures(rest).filter(|c| c.get(0).map(|m| m.start()) == Some(0))
        else {
            return Err(invalid(format!("syntax error near '{}'", rest.trim_start())));
        };
        let whole = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());
        tokens.push(caps[1].to_string());
        rest = &rest[whole..];
    }

    if tokens.is_empty() {
        return Err(invalid("expression is empty"));
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<String>,
    pos: usize,
    values: &'a Map<String, Value>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> Result<String> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| invalid("unexpected end of expression"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &str) -> Result<()> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(invalid(format!("expected '{}', found '{}'", expected, token)))
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self
            .peek()
            .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
        {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn attribute(&mut self) -> Result<String> {
        let token = self.next()?;
        if token.starts_with(':') || !token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            return Err(invalid(format!("expected an attribute name, found '{}'", token)));
        }
        Ok(token)
    }

    fn placeholder(&mut self) -> Result<Value> {
        let token = self.next()?;
        if !token.starts_with(':') {
            return Err(invalid(format!("expected a value placeholder, found '{}'", token)));
        }
        self.values.get(&token).cloned().ok_or_else(|| {
            GatewayError::storage(format!(
                "Value provided in ExpressionAttributeValues unused or missing: {}",
                token
            ))
        })
    }

    fn clause(&mut self) -> Result<Clause> {
        if self.eat_keyword("begins_with") {
            self.expect("(")?;
            let attribute = self.attribute()?;
            self.expect(",")?;
            let prefix = match self.placeholder()? {
                Value::String(prefix) => prefix,
                other => return Err(invalid(format!("begins_with needs a string, got {}", other))),
            };
            self.expect(")")?;
            return Ok(Clause {
                attribute,
                predicate: Predicate::BeginsWith(prefix),
            });
        }

        let attribute = self.attribute()?;
        if self.eat_keyword("between") {
            let low = self.placeholder()?;
            if !self.eat_keyword("and") {
                return Err(invalid("BETWEEN requires AND"));
            }
            let high = self.placeholder()?;
            return Ok(Clause {
                attribute,
                predicate: Predicate::Between(low, high),
            });
        }

        let op = match self.next()?.as_str() {
            "=" => Comparator::Eq,
            "<" => Comparator::Lt,
            "<=" => Comparator::Le,
            ">" => Comparator::Gt,
            ">=" => Comparator::Ge,
            other => return Err(invalid(format!("unsupported operator '{}'", other))),
        };
        let value = self.placeholder()?;

        Ok(Clause {
            attribute,
            predicate: Predicate::Compare(op, value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_partition_only() {
        let expr = KeyConditionExpr::parse("pk = :pk", &values(json!({":pk": "user#1"}))).unwrap();
        assert_eq!(
            expr.clauses,
            vec![Clause {
                attribute: "pk".to_string(),
                predicate: Predicate::Compare(Comparator::Eq, json!("user#1")),
            }]
        );
    }

    #[test]
    fn test_parse_without_spaces() {
        let expr = KeyConditionExpr::parse("pk=:pk and sk>=:from", &values(json!({":pk": "a", ":from": 3}))).unwrap();
        assert_eq!(expr.clauses.len(), 2);
        assert_eq!(expr.clauses[1].predicate, Predicate::Compare(Comparator::Ge, json!(3)));
    }

    #[test]
    fn test_parse_between_and_begins_with() {
        let vals = values(json!({":pk": "a", ":lo": 1, ":hi": 9, ":p": "2024-"}));

        let between = KeyConditionExpr::parse("pk = :pk AND sk BETWEEN :lo AND :hi", &vals).unwrap();
        assert_eq!(between.clauses[1].predicate, Predicate::Between(json!(1), json!(9)));

        let prefix = KeyConditionExpr::parse("pk = :pk AND begins_with(sk, :p)", &vals).unwrap();
        assert_eq!(prefix.clauses[1].predicate, Predicate::BeginsWith("2024-".to_string()));
    }

    #[test]
    fn test_missing_placeholder_is_storage_error() {
        let err = KeyConditionExpr::parse("pk = :missing", &Map::new()).unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert!(err.to_string().contains(":missing"));
    }

    #[test]
    fn test_malformed_expressions() {
        let vals = values(json!({":pk": "a"}));
        assert!(KeyConditionExpr::parse("", &vals).is_err());
        assert!(KeyConditionExpr::parse("pk = :pk OR sk = :pk", &vals).is_err());
        assert!(KeyConditionExpr::parse("pk <> :pk", &vals).is_err());
        assert!(KeyConditionExpr::parse("pk = ", &vals).is_err());
        assert!(KeyConditionExpr::parse("pk = :pk $", &vals).is_err());
    }

    #[test]
    fn test_clause_matching() {
        let vals = values(json!({":pk": "a", ":lo": 2, ":hi": 4}));
        let expr = KeyConditionExpr::parse("pk = :pk AND sk BETWEEN :lo AND :hi", &vals).unwrap();

        assert!(expr.matches(&values(json!({"pk": "a", "sk": 3}))));
        assert!(expr.matches(&values(json!({"pk": "a", "sk": 4}))));
        assert!(!expr.matches(&values(json!({"pk": "a", "sk": 5}))));
        assert!(!expr.matches(&values(json!({"pk": "b", "sk": 3}))));
        assert!(!expr.matches(&values(json!({"pk": "a", "sk": "3"}))));
    }
}
