use crate::{
    component::{Component, Filter, QueryModifier},
    Error,
};
use sea_orm::{
    sea_query::{Alias, Condition, Expr, SelectStatement},
    Value,
};

/// Reference a field of the entity addressed by `alias`.
pub(crate) fn column(alias: &str, field: &str) -> Expr {
    Expr::col((Alias::new(alias), Alias::new(field)))
}

/// Add a builder method which overrides the alias a filter works on.
macro_rules! aliased {
    ($t:ty) => {
        impl $t {
            /// Work on the entity addressed by `alias` instead of the one given by the caller.
            pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
                self.alias = Some(alias.into());
                self
            }

            fn alias<'a>(&'a self, alias: &'a str) -> &'a str {
                self.alias.as_deref().unwrap_or(alias)
            }
        }
    };
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// Compare a field with a value.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    alias: Option<String>,
}

impl Comparison {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            alias: None,
        }
    }
}

aliased!(Comparison);
component!(Comparison, filter);

impl Filter for Comparison {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        let column = column(self.alias(alias), &self.field);
        let value = self.value.clone();

        let expr = match self.operator {
            Operator::Equal => column.eq(value),
            Operator::NotEqual => column.ne(value),
            Operator::Less => column.lt(value),
            Operator::LessEqual => column.lte(value),
            Operator::Greater => column.gt(value),
            Operator::GreaterEqual => column.gte(value),
        };

        Ok(Some(Condition::all().add(expr)))
    }
}

/// Check if a field's value is one of a list of values.
#[derive(Clone, Debug, PartialEq)]
pub struct In {
    pub field: String,
    pub values: Vec<Value>,
    pub negated: bool,
    alias: Option<String>,
}

impl In {
    pub fn new<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
            alias: None,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

aliased!(In);
component!(In, filter);

impl Filter for In {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        let column = column(self.alias(alias), &self.field);
        let values = self.values.iter().cloned();

        let expr = match self.negated {
            false => column.is_in(values),
            true => column.is_not_in(values),
        };

        Ok(Some(Condition::all().add(expr)))
    }
}

/// Check a field for being `NULL`, or not.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IsNull {
    pub field: String,
    pub negated: bool,
    alias: Option<String>,
}

impl IsNull {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            negated: false,
            alias: None,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

aliased!(IsNull);
component!(IsNull, filter);

impl Filter for IsNull {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        let column = column(self.alias(alias), &self.field);

        let expr = match self.negated {
            false => column.is_null(),
            true => column.is_not_null(),
        };

        Ok(Some(Condition::all().add(expr)))
    }
}

/// Where to put the wildcards of a `LIKE` pattern.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LikeFormat {
    /// `%value%`
    #[default]
    Contains,
    /// `value%`
    StartsWith,
    /// `%value`
    EndsWith,
    /// The value is used as pattern, as it is.
    Exact,
}

impl LikeFormat {
    pub fn pattern(&self, value: &str) -> String {
        match self {
            Self::Contains => format!("%{value}%"),
            Self::StartsWith => format!("{value}%"),
            Self::EndsWith => format!("%{value}"),
            Self::Exact => value.to_string(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Like {
    pub field: String,
    pub value: String,
    pub format: LikeFormat,
    alias: Option<String>,
}

impl Like {
    pub fn new(field: impl Into<String>, value: impl Into<String>, format: LikeFormat) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            format,
            alias: None,
        }
    }
}

aliased!(Like);
component!(Like, filter);

impl Filter for Like {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        let column = column(self.alias(alias), &self.field);
        Ok(Some(
            Condition::all().add(column.like(self.format.pattern(&self.value))),
        ))
    }
}

/// Negate the filter of a child, query modifications are passed through.
#[derive(Debug)]
pub struct Not {
    pub child: Box<dyn Component>,
}

impl Not {
    pub fn new(child: impl Component + 'static) -> Self {
        Self {
            child: Box::new(child),
        }
    }
}

component!(Not, filter, query_modifier);

impl Filter for Not {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        if !self.child.is_specification() {
            return Err(Error::InvalidChild(self.child.type_name()));
        }

        Ok(match self.child.as_filter() {
            Some(filter) => filter.filter(alias)?.map(Condition::not),
            None => None,
        })
    }
}

impl QueryModifier for Not {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        match self.child.as_query_modifier() {
            Some(modifier) => modifier.modify(select, alias),
            None => Ok(()),
        }
    }
}
