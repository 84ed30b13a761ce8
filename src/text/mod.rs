//! A search string syntax for specifications.
//!
//! ```
//! use specula::text::TextQuery;
//!
//! let spec = TextQuery::new()
//!     .primary("name")
//!     .parse(r#"cheese price:>=10 -is:null:deleted sort:name limit:20"#)
//!     .unwrap();
//! assert_eq!(spec.children().len(), 5);
//! ```
//!
//! * `field:value`: equality, the value might be prefixed by `<`, `<=`, `>`, `>=`
//! * `field:a..b`: `a` inclusive to `b` exclusive, either side can be `*` for unbounded
//! * `alias:field:value`: work on a joined entity
//! * `is:null:field`: check for `NULL`
//! * `sort:field`: ascending, `-sort:field` descending
//! * `limit:n`, `offset:n`
//! * `value`: a "contains" match on the primary fields
//!
//! All terms can be negated by prefixing them with `-`.

pub mod parser;

use crate::{
    component::Component,
    filter::{Comparison, IsNull, Like, LikeFormat, Not, Operator},
    logic::{Junction, LogicX},
    query::{Direction, Limit, Offset, OrderBy},
    Error,
};
use chumsky::Parser;
use sea_orm::Value;

/// The meaning of a single term.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Term<'a> {
    Primary(&'a str),
    Compare {
        alias: Option<&'a str>,
        field: &'a str,
        expression: &'a str,
    },
    IsNull {
        alias: Option<&'a str>,
        field: &'a str,
    },
    Sort {
        alias: Option<&'a str>,
        field: &'a str,
    },
    Limit(&'a str),
    Offset(&'a str),
}

impl<'a> Term<'a> {
    pub fn classify(qualifiers: &[&'a str], value: &'a str) -> Result<Self, Error> {
        Ok(match *qualifiers {
            [] => Term::Primary(value),
            ["is", "null"] => Term::IsNull {
                alias: None,
                field: value,
            },
            ["is", "null", alias] => Term::IsNull {
                alias: Some(alias),
                field: value,
            },
            ["is", ref predicate @ ..] => {
                let mut predicate = predicate.to_vec();
                predicate.push(value);
                return Err(Error::UnknownPredicate(predicate.join(":")));
            }
            ["sort"] => Term::Sort {
                alias: None,
                field: value,
            },
            ["sort", alias] => Term::Sort {
                alias: Some(alias),
                field: value,
            },
            ["limit"] => Term::Limit(value),
            ["offset"] => Term::Offset(value),
            [field] => Term::Compare {
                alias: None,
                field,
                expression: value,
            },
            [alias, field] => Term::Compare {
                alias: Some(alias),
                field,
                expression: value,
            },
            _ => return Err(Error::UnknownQualifier(qualifiers.join(":"))),
        })
    }
}

/// Compile search strings into specifications.
#[derive(Clone, Debug, Default)]
pub struct TextQuery {
    primary: Vec<String>,
}

impl TextQuery {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a field which is searched by terms without a qualifier.
    pub fn primary(mut self, field: impl Into<String>) -> Self {
        self.primary.push(field.into());
        self
    }

    pub fn parse(&self, input: &str) -> Result<LogicX, Error> {
        let clauses = parser::clauses()
            .parse(input)
            .into_result()
            .map_err(|errs| {
                Error::Parser(
                    errs.iter()
                        .map(|err| format!("{err:?}"))
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })?;

        let mut result = LogicX::new(Junction::And, vec![]);

        for clause in clauses {
            let term = Term::classify(&clause.qualifiers, clause.value)?;
            if let Some(component) = self.translate(term, clause.negated)? {
                result.push(component);
            }
        }

        tracing::debug!(input, terms = result.children().len(), "parsed search string");

        Ok(result)
    }

    fn translate(&self, term: Term, invert: bool) -> Result<Option<Box<dyn Component>>, Error> {
        let component: Box<dyn Component> = match term {
            Term::Sort { alias, field } => {
                let direction = match invert {
                    false => Direction::Ascending,
                    true => Direction::Descending,
                };
                let order = OrderBy::new(field, direction);
                return Ok(Some(match alias {
                    Some(alias) => Box::new(order.with_alias(alias)),
                    None => Box::new(order),
                }));
            }
            Term::Limit(value) => {
                not_inverted("limit", invert)?;
                return Ok(Some(Box::new(Limit(number(value)?))));
            }
            Term::Offset(value) => {
                not_inverted("offset", invert)?;
                return Ok(Some(Box::new(Offset(number(value)?))));
            }
            Term::IsNull { alias, field } => {
                let null = IsNull::new(field);
                let null = if invert { null.negate() } else { null };
                return Ok(Some(match alias {
                    Some(alias) => Box::new(null.with_alias(alias)),
                    None => Box::new(null),
                }));
            }
            Term::Primary(value) => {
                if self.primary.is_empty() {
                    return Err(Error::Expression(format!(
                        "'{value}' has no qualifier, and no primary fields are configured"
                    )));
                }
                let mut or = LogicX::new(Junction::Or, vec![]);
                for field in &self.primary {
                    or.push(Like::new(field, value, LikeFormat::Contains));
                }
                Box::new(or)
            }
            Term::Compare {
                alias,
                field,
                expression,
            } => match ordered(field, expression) {
                Some(comparisons) => {
                    let mut and = LogicX::new(Junction::And, vec![]);
                    for comparison in comparisons {
                        match alias {
                            Some(alias) => and.push(comparison.with_alias(alias)),
                            None => and.push(comparison),
                        }
                    }
                    Box::new(and)
                }
                None => return Ok(None),
            },
        };

        Ok(Some(match invert {
            true => Box::new(Not::new(component)),
            false => component,
        }))
    }
}

fn not_inverted(qualifier: &str, invert: bool) -> Result<(), Error> {
    match invert {
        true => Err(Error::Expression(format!("'{qualifier}' can't be negated"))),
        false => Ok(()),
    }
}

fn number(value: &str) -> Result<u64, Error> {
    value
        .parse()
        .map_err(|err| Error::Expression(format!("{value}: {err}")))
}

/// Translate an expression like `>=10` or `1..2` into comparisons.
///
/// Returns `None` if the expression doesn't constrain the field, like `*..*`.
fn ordered(field: &str, expression: &str) -> Option<Vec<Comparison>> {
    let compare = |operator, value: &str| Comparison::new(field, operator, typed_value(value));

    Some(if let Some(value) = expression.strip_prefix(">=") {
        vec![compare(Operator::GreaterEqual, value)]
    } else if let Some(value) = expression.strip_prefix('>') {
        vec![compare(Operator::Greater, value)]
    } else if let Some(value) = expression.strip_prefix("<=") {
        vec![compare(Operator::LessEqual, value)]
    } else if let Some(value) = expression.strip_prefix('<') {
        vec![compare(Operator::Less, value)]
    } else {
        match expression.split_once("..") {
            Some(("*", "*")) => return None,
            Some(("*", to)) => vec![compare(Operator::Less, to)],
            Some((from, "*")) => vec![compare(Operator::GreaterEqual, from)],
            Some((from, to)) => vec![
                compare(Operator::GreaterEqual, from),
                compare(Operator::Less, to),
            ],
            None => vec![compare(Operator::Equal, expression)],
        }
    })
}

/// Guess the type of a value from its textual representation.
pub fn typed_value(value: &str) -> Value {
    if let Ok(value) = value.parse::<i64>() {
        return value.into();
    }
    if let Some(value) = value.parse::<f64>().ok().filter(|f| f.is_finite()) {
        return value.into();
    }
    match value {
        "true" => return true.into(),
        "false" => return false.into(),
        _ => {}
    }

    #[cfg(feature = "time")]
    if let Ok(value) = ::time::OffsetDateTime::parse(
        value,
        &::time::format_description::well_known::Rfc3339,
    ) {
        return value.into();
    }

    value.into()
}
