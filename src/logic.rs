use crate::{
    component::{Component, Filter, QueryModifier},
    Error,
};
use sea_orm::sea_query::{Condition, SelectStatement};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Junction {
    And,
    Or,
}

impl Junction {
    fn condition(&self) -> Condition {
        match self {
            Self::And => Condition::all(),
            Self::Or => Condition::any(),
        }
    }
}

/// Combine the filters of its children, and apply their query modifications.
#[derive(Debug)]
pub struct LogicX {
    junction: Junction,
    children: Vec<Box<dyn Component>>,
}

impl LogicX {
    pub fn new(junction: Junction, children: Vec<Box<dyn Component>>) -> Self {
        Self { junction, children }
    }

    pub fn junction(&self) -> Junction {
        self.junction
    }

    pub fn children(&self) -> &[Box<dyn Component>] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a child to the composite.
    pub fn push(&mut self, child: impl Component + 'static) {
        self.children.push(Box::new(child));
    }

    /// Combine with `child` using `AND`.
    ///
    /// An `AND` composite takes the child as an additional element, an `OR` composite becomes
    /// the first element of a new `AND` composite.
    pub fn and(self, child: impl Component + 'static) -> Self {
        self.combine(Junction::And, child)
    }

    /// Combine with `child` using `OR`, see [`LogicX::and`].
    pub fn or(self, child: impl Component + 'static) -> Self {
        self.combine(Junction::Or, child)
    }

    fn combine(mut self, junction: Junction, child: impl Component + 'static) -> Self {
        if self.junction == junction {
            self.push(child);
            self
        } else {
            let children: Vec<Box<dyn Component>> = vec![Box::new(self), Box::new(child)];
            Self::new(junction, children)
        }
    }
}

component!(LogicX, filter, query_modifier);

impl Filter for LogicX {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        let mut result = self.junction.condition();

        for child in &self.children {
            if !child.is_specification() {
                tracing::warn!(kind = child.type_name(), "invalid logic child");
                return Err(Error::InvalidChild(child.type_name()));
            }
            if let Some(filter) = child.as_filter() {
                if let Some(condition) = filter.filter(alias)? {
                    result = result.add(condition);
                }
            }
        }

        Ok(match result.is_empty() {
            true => None,
            false => Some(result),
        })
    }
}

impl QueryModifier for LogicX {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        for child in &self.children {
            if let Some(modifier) = child.as_query_modifier() {
                tracing::trace!(kind = child.type_name(), "applying query modifier");
                modifier.modify(select, alias)?;
            }
        }
        Ok(())
    }
}

/// Box a list of heterogeneous components, combining them with `AND`.
///
/// ```
/// use specula::{and_x, prelude::*};
///
/// let spec = and_x![Spec::eq("name", "Cheese"), Spec::limit(10)];
/// assert_eq!(spec.children().len(), 2);
/// ```
#[macro_export]
macro_rules! and_x {
    ($($child:expr),* $(,)?) => {
        $crate::logic::LogicX::new(
            $crate::logic::Junction::And,
            vec![$(Box::new($child) as Box<dyn $crate::component::Component>),*],
        )
    };
}

/// Box a list of heterogeneous components, combining them with `OR`.
#[macro_export]
macro_rules! or_x {
    ($($child:expr),* $(,)?) => {
        $crate::logic::LogicX::new(
            $crate::logic::Junction::Or,
            vec![$(Box::new($child) as Box<dyn $crate::component::Component>),*],
        )
    };
}
