#[macro_use]
pub mod component;

pub mod config;
pub mod error;
pub mod filter;
pub mod logic;
pub mod query;
pub mod repository;
pub mod result;
pub mod spec;
pub mod text;

pub use config::RepositoryConfig;
pub use error::Error;

pub mod prelude {
    pub use crate::component::{Component, Filter, QueryModifier, ResultModifier};
    pub use crate::filter::LikeFormat;
    pub use crate::query::Direction;
    pub use crate::repository::{Hydrated, SpecificationRepository};
    pub use crate::result::{Hydration, Query};
    pub use crate::spec::{BaseSpecification, Reusable, Spec};
    pub use crate::text::TextQuery;
    pub use crate::{and_x, or_x};
}

pub use ::chumsky;
pub use ::sea_orm;
