use crate::{
    component::{Component, ResultModifier},
    Error,
};
use sea_orm::{DbBackend, Statement, Value};
use std::time::Duration;

/// How rows of a query get turned into results.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Hydration {
    /// Into models of the entity.
    #[default]
    Object,
    /// Into JSON objects, one per row.
    Array,
    /// Into JSON values, each row must have exactly one column.
    Scalar,
    /// Into a single JSON value, the query must return exactly one row with one column.
    SingleScalar,
}

/// A request to cache the results of a query.
///
/// The library only records the request, it is up to the executor of the query to honor it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultCache {
    pub lifetime: Option<Duration>,
}

/// An executable query.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    statement: Statement,
    hydration: Hydration,
    cache: Option<ResultCache>,
}

impl Query {
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            hydration: Default::default(),
            cache: None,
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn into_statement(self) -> Statement {
        self.statement
    }

    pub fn backend(&self) -> DbBackend {
        self.statement.db_backend
    }

    pub fn sql(&self) -> &str {
        &self.statement.sql
    }

    /// The values bound to the statement's placeholders.
    pub fn parameters(&self) -> &[Value] {
        self.statement
            .values
            .as_ref()
            .map(|values| values.0.as_slice())
            .unwrap_or_default()
    }

    pub fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.statement
            .values
            .iter_mut()
            .flat_map(|values| values.0.iter_mut())
    }

    pub fn hydration(&self) -> Hydration {
        self.hydration
    }

    pub fn set_hydration(&mut self, hydration: Hydration) {
        self.hydration = hydration;
    }

    pub fn result_cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    pub fn set_result_cache(&mut self, cache: Option<ResultCache>) {
        self.cache = cache;
    }
}

/// Set the hydration mode of a query.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Hydrate(pub Hydration);

component!(Hydrate, result_modifier);

impl ResultModifier for Hydrate {
    fn modify(&self, query: &mut Query) -> Result<(), Error> {
        query.set_hydration(self.0);
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cache {
    pub lifetime: Option<Duration>,
}

component!(Cache, result_modifier);

impl ResultModifier for Cache {
    fn modify(&self, query: &mut Query) -> Result<(), Error> {
        query.set_result_cache(Some(ResultCache {
            lifetime: self.lifetime,
        }));
        Ok(())
    }
}

/// Round date/time parameters down to a multiple of `seconds`.
///
/// Queries with parameters like "now" produce the same statement within the rounding window,
/// which makes their results cacheable.
#[cfg(feature = "time")]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RoundDateTime {
    seconds: u64,
}

#[cfg(feature = "time")]
impl RoundDateTime {
    pub fn new(seconds: u64) -> Result<Self, Error> {
        if seconds == 0 {
            return Err(Error::InvalidArgument(
                "rounding interval must not be zero".into(),
            ));
        }
        Ok(Self { seconds })
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    fn round(&self, timestamp: i64) -> i64 {
        let seconds = i64::try_from(self.seconds).unwrap_or(i64::MAX);
        timestamp - timestamp.rem_euclid(seconds)
    }
}

#[cfg(feature = "time")]
component!(RoundDateTime, result_modifier);

#[cfg(feature = "time")]
impl ResultModifier for RoundDateTime {
    fn modify(&self, query: &mut Query) -> Result<(), Error> {
        use ::time::OffsetDateTime;

        let rounded = |timestamp: i64| {
            OffsetDateTime::from_unix_timestamp(self.round(timestamp))
                .map_err(|err| Error::InvalidArgument(err.to_string()))
        };

        for value in query.parameters_mut() {
            let replacement: Value = match value {
                Value::TimeDateTimeWithTimeZone(Some(date)) => {
                    let offset = date.offset();
                    rounded(date.unix_timestamp())?.to_offset(offset).into()
                }
                Value::TimeDateTime(Some(date)) => {
                    let date = rounded(date.assume_utc().unix_timestamp())?;
                    ::time::PrimitiveDateTime::new(date.date(), date.time()).into()
                }
                _ => continue,
            };
            *value = replacement;
        }

        Ok(())
    }
}

/// An ordered list of result modifiers.
///
/// Children are applied in the order they were added. If a child turns out not to be a result
/// modifier, applying stops with an error. Modifications which were already applied stay.
#[derive(Debug, Default)]
pub struct ResultModifierCollection {
    children: Vec<Box<dyn Component>>,
}

impl ResultModifierCollection {
    pub fn new(children: Vec<Box<dyn Component>>) -> Self {
        Self { children }
    }

    pub fn push(&mut self, child: impl Component + 'static) {
        self.children.push(Box::new(child));
    }

    pub fn with(mut self, child: impl Component + 'static) -> Self {
        self.push(child);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

component!(ResultModifierCollection, result_modifier);

impl ResultModifier for ResultModifierCollection {
    fn modify(&self, query: &mut Query) -> Result<(), Error> {
        for child in &self.children {
            let Some(modifier) = child.as_result_modifier() else {
                tracing::warn!(kind = child.type_name(), "not a result modifier");
                return Err(Error::NotAResultModifier(child.type_name()));
            };
            tracing::trace!(kind = child.type_name(), "applying result modifier");
            modifier.modify(query)?;
        }
        Ok(())
    }
}
