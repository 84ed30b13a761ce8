use crate::{
    component::{apply_specification, Component, QueryModifier, ResultModifier},
    result::{Hydration, Query},
    Error, RepositoryConfig,
};
use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, QueryTrait, Select, Statement};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;

/// A single result, hydrated according to the query's [`Hydration`] mode.
#[derive(Clone, Debug, PartialEq)]
pub enum Hydrated<M> {
    Model(M),
    Array(JsonValue),
    Scalar(JsonValue),
}

impl<M> Hydrated<M> {
    pub fn into_model(self) -> Option<M> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            Self::Model(_) => None,
            Self::Array(value) | Self::Scalar(value) => Some(value),
        }
    }
}

/// Find entities of `E` matching a specification.
///
/// The root alias of the specification is the table name of the entity.
pub struct SpecificationRepository<E: EntityTrait> {
    alias: String,
    config: RepositoryConfig,
    _marker: PhantomData<E>,
}

impl<E: EntityTrait> Default for SpecificationRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> SpecificationRepository<E> {
    pub fn new() -> Self {
        Self::with_config(Default::default())
    }

    pub fn with_config(config: RepositoryConfig) -> Self {
        Self {
            alias: E::default().table_name().to_string(),
            config,
            _marker: PhantomData,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Create a select for the entity, with the specification applied.
    pub fn query_builder(&self, spec: &dyn Component) -> Result<Select<E>, Error> {
        let mut select = E::find();

        if let Some(limit) = self.config.query_modifier() {
            limit.modify(QueryTrait::query(&mut select), &self.alias)?;
        }
        apply_specification(spec, QueryTrait::query(&mut select), &self.alias)?;

        Ok(select)
    }

    /// Create an executable query for the backend, with the specification and the result
    /// modifier applied.
    pub fn query(
        &self,
        backend: DbBackend,
        spec: &dyn Component,
        modifier: Option<&dyn Component>,
    ) -> Result<Query, Error> {
        let select = self.query_builder(spec)?;
        let mut query = Query::new(select.build(backend));

        self.config.result_modifiers()?.modify(&mut query)?;

        if let Some(modifier) = modifier {
            let result_modifier = modifier
                .as_result_modifier()
                .ok_or_else(|| Error::NotAResultModifier(modifier.type_name()))?;
            result_modifier.modify(&mut query)?;
        }

        tracing::debug!(sql = query.sql(), hydration = ?query.hydration(), "built query");

        Ok(query)
    }

    /// Find all results matching the specification.
    pub async fn match_spec<C>(
        &self,
        db: &C,
        spec: &dyn Component,
        modifier: Option<&dyn Component>,
    ) -> Result<Vec<Hydrated<E::Model>>, Error>
    where
        C: ConnectionTrait,
    {
        let query = self.query(db.get_database_backend(), spec, modifier)?;
        self.execute(db, query).await
    }

    /// Find exactly one result matching the specification.
    pub async fn match_single_result<C>(
        &self,
        db: &C,
        spec: &dyn Component,
        modifier: Option<&dyn Component>,
    ) -> Result<Hydrated<E::Model>, Error>
    where
        C: ConnectionTrait,
    {
        single(self.match_spec(db, spec, modifier).await?)
    }

    /// Find one result matching the specification, if there is any.
    pub async fn match_one_or_null_result<C>(
        &self,
        db: &C,
        spec: &dyn Component,
        modifier: Option<&dyn Component>,
    ) -> Result<Option<Hydrated<E::Model>>, Error>
    where
        C: ConnectionTrait,
    {
        match single(self.match_spec(db, spec, modifier).await?) {
            Ok(result) => Ok(Some(result)),
            Err(Error::NoResult) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Find results matching the specification, each row having exactly one column.
    pub async fn match_scalar_result<C>(
        &self,
        db: &C,
        spec: &dyn Component,
        modifier: Option<&dyn Component>,
    ) -> Result<Vec<JsonValue>, Error>
    where
        C: ConnectionTrait,
    {
        let mut query = self.query(db.get_database_backend(), spec, modifier)?;
        query.set_hydration(Hydration::Scalar);

        self.execute(db, query)
            .await?
            .into_iter()
            .map(|result| result.into_json().ok_or(Error::NonScalarResult(0)))
            .collect()
    }

    /// Find a single value matching the specification.
    pub async fn match_single_scalar_result<C>(
        &self,
        db: &C,
        spec: &dyn Component,
        modifier: Option<&dyn Component>,
    ) -> Result<JsonValue, Error>
    where
        C: ConnectionTrait,
    {
        let mut query = self.query(db.get_database_backend(), spec, modifier)?;
        query.set_hydration(Hydration::SingleScalar);

        single(self.execute(db, query).await?)?
            .into_json()
            .ok_or(Error::NonScalarResult(0))
    }

    async fn execute<C>(&self, db: &C, query: Query) -> Result<Vec<Hydrated<E::Model>>, Error>
    where
        C: ConnectionTrait,
    {
        let hydration = query.hydration();
        let statement = query.into_statement();

        tracing::debug!(sql = %statement.sql, ?hydration, "executing query");

        Ok(match hydration {
            Hydration::Object => E::find()
                .from_raw_sql(statement)
                .all(db)
                .await?
                .into_iter()
                .map(Hydrated::Model)
                .collect(),
            Hydration::Array => rows::<E, C>(db, statement)
                .await?
                .into_iter()
                .map(Hydrated::Array)
                .collect(),
            Hydration::Scalar => rows::<E, C>(db, statement)
                .await?
                .into_iter()
                .map(|row| scalar(row).map(Hydrated::Scalar))
                .collect::<Result<Vec<_>, _>>()?,
            Hydration::SingleScalar => {
                let row = single(rows::<E, C>(db, statement).await?)?;
                vec![Hydrated::Scalar(scalar(row)?)]
            }
        })
    }
}

async fn rows<E, C>(db: &C, statement: Statement) -> Result<Vec<JsonValue>, Error>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    Ok(E::find().from_raw_sql(statement).into_json().all(db).await?)
}

/// Take the only value of a single-column row.
fn scalar(row: JsonValue) -> Result<JsonValue, Error> {
    match row {
        JsonValue::Object(map) => {
            if map.len() != 1 {
                return Err(Error::NonScalarResult(map.len()));
            }
            Ok(map.into_iter().map(|(_, value)| value).next().unwrap_or_default())
        }
        value => Ok(value),
    }
}

/// Take the only element of a list of results.
fn single<T>(results: Vec<T>) -> Result<T, Error> {
    let mut results = results.into_iter();
    match (results.next(), results.next()) {
        (None, _) => Err(Error::NoResult),
        (Some(result), None) => Ok(result),
        (Some(_), Some(_)) => Err(Error::NonUniqueResult(2 + results.count())),
    }
}
