//! Traversal direction and edge property predicates.
//!
//! Predicates hold their bounds in store form so a store can evaluate them
//! directly against persisted properties.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Properties;
use crate::value::Value;

/// Which incident edges of a vertex a traversal follows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
    #[default]
    Both,
}

/// Comparison operator for `has` constraints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comparator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
}

impl Comparator {
    fn holds(&self, actual: &Value, bound: &Value) -> bool {
        let ordering = actual.compare(bound);
        let equal = ordering == Some(Ordering::Equal) || actual == bound;

        match self {
            Self::Equal => equal,
            Self::NotEqual => !equal,
            Self::GreaterThan => ordering == Some(Ordering::Greater),
            Self::GreaterThanEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            Self::LessThan => ordering == Some(Ordering::Less),
            Self::LessThanEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

/// The test a predicate applies to one property.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateOp {
    Compare { comparator: Comparator, value: Value },
    /// `lower <= x < upper`; `lower` never exceeds `upper`.
    Interval { lower: Value, upper: Value },
}

/// A constraint on one edge property.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: PredicateOp,
}

impl Predicate {
    pub fn compare(field: impl Into<String>, value: impl Into<Value>, comparator: Comparator) -> Self {
        Self {
            field: field.into(),
            op: PredicateOp::Compare {
                comparator,
                value: value.into().to_store(),
            },
        }
    }

    /// Range constraint; bounds given in descending order are swapped.
    pub fn interval(field: impl Into<String>, a: impl Into<Value>, b: impl Into<Value>) -> Self {
        let (a, b) = (a.into().to_store(), b.into().to_store());
        let (lower, upper) = match a.compare(&b) {
            Some(Ordering::Greater) => (b, a),
            _ => (a, b),
        };

        Self {
            field: field.into(),
            op: PredicateOp::Interval { lower, upper },
        }
    }

    /// Evaluate against store-form properties. A missing property never matches.
    pub fn matches(&self, properties: &Properties) -> bool {
        let Some(actual) = properties.get(&self.field) else {
            return false;
        };
        if actual.is_null() {
            return false;
        }

        match &self.op {
            PredicateOp::Compare { comparator, value } => comparator.holds(actual, value),
            PredicateOp::Interval { lower, upper } => {
                Comparator::GreaterThanEqual.holds(actual, lower)
                    && Comparator::LessThan.holds(actual, upper)
            }
        }
    }
}
