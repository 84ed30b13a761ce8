use crate::{result::Query, Error};
use sea_orm::sea_query::{Condition, SelectStatement};
use std::fmt::Debug;

/// A building block of a specification tree.
///
/// A component announces which capabilities it has. Composites and the repository ask for a
/// capability and skip, or reject, components which don't provide it.
pub trait Component: Debug + Send + Sync {
    /// The name of the concrete type, used when reporting contract violations.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_filter(&self) -> Option<&dyn Filter> {
        None
    }

    fn as_query_modifier(&self) -> Option<&dyn QueryModifier> {
        None
    }

    fn as_result_modifier(&self) -> Option<&dyn ResultModifier> {
        None
    }

    /// Check if this component can be applied to a query builder.
    fn is_specification(&self) -> bool {
        self.as_filter().is_some() || self.as_query_modifier().is_some()
    }
}

/// Contributes a condition to the `WHERE` clause.
pub trait Filter {
    /// Create the condition for entities addressed by `alias`.
    ///
    /// Returning `None` means the filter doesn't constrain the query.
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error>;
}

/// Changes the select statement, before the filter gets applied.
pub trait QueryModifier {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error>;
}

/// Changes the executable query, after the statement was built.
pub trait ResultModifier {
    fn modify(&self, query: &mut Query) -> Result<(), Error>;
}

impl Component for Box<dyn Component> {
    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn as_filter(&self) -> Option<&dyn Filter> {
        (**self).as_filter()
    }

    fn as_query_modifier(&self) -> Option<&dyn QueryModifier> {
        (**self).as_query_modifier()
    }

    fn as_result_modifier(&self) -> Option<&dyn ResultModifier> {
        (**self).as_result_modifier()
    }
}

/// Implement [`Component`] for a type, announcing the listed capabilities.
macro_rules! component {
    (@cap filter) => {
        fn as_filter(&self) -> Option<&dyn $crate::component::Filter> {
            Some(self)
        }
    };
    (@cap query_modifier) => {
        fn as_query_modifier(&self) -> Option<&dyn $crate::component::QueryModifier> {
            Some(self)
        }
    };
    (@cap result_modifier) => {
        fn as_result_modifier(&self) -> Option<&dyn $crate::component::ResultModifier> {
            Some(self)
        }
    };
    ($t:ty $(, $cap:ident)* $(,)?) => {
        impl $crate::component::Component for $t {
            $(component!(@cap $cap);)*
        }
    };
}

/// Apply a specification to a select statement.
///
/// Query modifications are applied first, then the filter is appended to the existing `WHERE`
/// clause using `AND`.
pub fn apply_specification(
    spec: &dyn Component,
    select: &mut SelectStatement,
    alias: &str,
) -> Result<(), Error> {
    if !spec.is_specification() {
        tracing::warn!(kind = spec.type_name(), "component is not a specification");
        return Err(Error::InvalidSpecification(spec.type_name()));
    }

    if let Some(modifier) = spec.as_query_modifier() {
        modifier.modify(select, alias)?;
    }

    if let Some(filter) = spec.as_filter() {
        if let Some(condition) = filter.filter(alias)? {
            select.cond_where(condition);
        }
    }

    Ok(())
}
