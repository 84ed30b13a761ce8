use crate::{
    component::{Component, Filter, QueryModifier},
    filter::{Comparison, In, IsNull, Like, LikeFormat, Not, Operator},
    logic::{Junction, LogicX},
    query::{
        CountOf, Direction, Distinct, GroupBy, Join, JoinKind, Limit, Offset, OrderBy, Select,
        Slice,
    },
    result::{Cache, Hydrate, Hydration, ResultModifierCollection},
    Error,
};
use sea_orm::{
    sea_query::{Condition, SelectStatement},
    Value,
};
use std::fmt::Debug;
use std::time::Duration;

/// Entry point for building specifications.
///
/// ```
/// use specula::prelude::*;
///
/// let spec = Spec::and_x(vec![
///     Box::new(Spec::eq("name", "Cheese")),
///     Box::new(Spec::or_x(vec![
///         Box::new(Spec::is_null("deleted")),
///         Box::new(Spec::gt("deleted", 100)),
///     ])),
///     Box::new(Spec::order_by("name", Direction::Ascending)),
/// ]);
/// # let _ = spec;
/// ```
pub struct Spec;

impl Spec {
    pub fn and_x(children: Vec<Box<dyn Component>>) -> LogicX {
        LogicX::new(Junction::And, children)
    }

    pub fn or_x(children: Vec<Box<dyn Component>>) -> LogicX {
        LogicX::new(Junction::Or, children)
    }

    pub fn not(child: impl Component + 'static) -> Not {
        Not::new(child)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
        Comparison::new(field, Operator::Equal, value)
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
        Comparison::new(field, Operator::NotEqual, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
        Comparison::new(field, Operator::Less, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
        Comparison::new(field, Operator::LessEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
        Comparison::new(field, Operator::Greater, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Comparison {
        Comparison::new(field, Operator::GreaterEqual, value)
    }

    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> In
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        In::new(field, values)
    }

    pub fn not_in<I, V>(field: impl Into<String>, values: I) -> In
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        In::new(field, values).negate()
    }

    pub fn is_null(field: impl Into<String>) -> IsNull {
        IsNull::new(field)
    }

    pub fn is_not_null(field: impl Into<String>) -> IsNull {
        IsNull::new(field).negate()
    }

    pub fn like(field: impl Into<String>, value: impl Into<String>, format: LikeFormat) -> Like {
        Like::new(field, value, format)
    }

    pub fn join(table: impl Into<String>, alias: impl Into<String>) -> Join {
        Join::new(JoinKind::Join, table, alias)
    }

    pub fn left_join(table: impl Into<String>, alias: impl Into<String>) -> Join {
        Join::new(JoinKind::Left, table, alias)
    }

    pub fn inner_join(table: impl Into<String>, alias: impl Into<String>) -> Join {
        Join::new(JoinKind::Inner, table, alias)
    }

    pub fn limit(limit: u64) -> Limit {
        Limit(limit)
    }

    pub fn offset(offset: u64) -> Offset {
        Offset(offset)
    }

    pub fn slice(size: u64, index: u64) -> Slice {
        Slice { size, index }
    }

    pub fn order_by(field: impl Into<String>, direction: Direction) -> OrderBy {
        OrderBy::new(field, direction)
    }

    pub fn group_by(field: impl Into<String>) -> GroupBy {
        GroupBy::new(field)
    }

    pub fn distinct() -> Distinct {
        Distinct
    }

    pub fn select<I, F>(fields: I) -> Select
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Select::new(fields)
    }

    pub fn add_select(field: impl Into<String>) -> Select {
        Select::new([field]).append()
    }

    pub fn count_of(child: impl Component + 'static) -> CountOf {
        CountOf::new(child)
    }

    pub fn as_array() -> Hydrate {
        Hydrate(Hydration::Array)
    }

    pub fn as_scalar() -> Hydrate {
        Hydrate(Hydration::Scalar)
    }

    pub fn as_single_scalar() -> Hydrate {
        Hydrate(Hydration::SingleScalar)
    }

    pub fn cache(lifetime: Option<Duration>) -> Cache {
        Cache { lifetime }
    }

    #[cfg(feature = "time")]
    pub fn round_date_time(seconds: u64) -> Result<crate::result::RoundDateTime, Error> {
        crate::result::RoundDateTime::new(seconds)
    }

    pub fn result_modifiers(children: Vec<Box<dyn Component>>) -> ResultModifierCollection {
        ResultModifierCollection::new(children)
    }
}

/// A named, reusable specification.
///
/// ```
/// use specula::prelude::*;
///
/// #[derive(Debug)]
/// struct Available;
///
/// impl BaseSpecification for Available {
///     fn spec(&self) -> Box<dyn Component> {
///         Box::new(Spec::and_x(vec![
///             Box::new(Spec::is_null("deleted")),
///             Box::new(Spec::gt("stock", 0)),
///         ]))
///     }
/// }
///
/// let spec = Reusable::new(Available);
/// # let _ = spec;
/// ```
pub trait BaseSpecification: Debug + Send + Sync {
    fn spec(&self) -> Box<dyn Component>;
}

/// Turn a [`BaseSpecification`] into a [`Component`].
#[derive(Debug)]
pub struct Reusable<S: BaseSpecification> {
    inner: S,
    alias: Option<String>,
}

impl<S: BaseSpecification> Reusable<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, alias: None }
    }

    /// Apply the specification to the entity addressed by `alias`, instead of the caller's.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn alias<'a>(&'a self, alias: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(alias)
    }
}

impl<S: BaseSpecification> Component for Reusable<S> {
    fn as_filter(&self) -> Option<&dyn Filter> {
        Some(self)
    }

    fn as_query_modifier(&self) -> Option<&dyn QueryModifier> {
        Some(self)
    }
}

impl<S: BaseSpecification> Filter for Reusable<S> {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        let spec = self.inner.spec();
        if !spec.is_specification() {
            return Err(Error::InvalidSpecification(spec.type_name()));
        }
        match spec.as_filter() {
            Some(filter) => filter.filter(self.alias(alias)),
            None => Ok(None),
        }
    }
}

impl<S: BaseSpecification> QueryModifier for Reusable<S> {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        match self.inner.spec().as_query_modifier() {
            Some(modifier) => modifier.modify(select, self.alias(alias)),
            None => Ok(()),
        }
    }
}
