use pretty_assertions::assert_eq;
use sea_orm::{DbBackend, MockDatabase, Transaction, Value};
use specula::{and_x, prelude::*, result::ResultModifierCollection, Error, RepositoryConfig};
use std::collections::BTreeMap;
use std::time::Duration;

include!("entity.rs");

fn row(columns: &[(&'static str, i64)]) -> BTreeMap<&'static str, Value> {
    columns
        .iter()
        .map(|(name, value)| (*name, Value::from(*value)))
        .collect()
}

#[tokio::test]
async fn test_match_models() -> Result<(), Error> {
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([vec![cake::cheese(), cake::chocolate()]])
        .into_connection();

    let result = SpecificationRepository::<cake::Entity>::new()
        .match_spec(&db, &Spec::gt("price", 5), None)
        .await?;

    assert_eq!(
        result,
        vec![
            Hydrated::Model(cake::cheese()),
            Hydrated::Model(cake::chocolate())
        ]
    );

    assert_eq!(
        db.into_transaction_log(),
        vec![Transaction::from_sql_and_values(
            DbBackend::Postgres,
            format!(r#"{SELECT} WHERE "cake"."price" > $1"#),
            [5i32.into()]
        )]
    );

    Ok(())
}

#[tokio::test]
async fn test_match_arrays() -> Result<(), Error> {
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([vec![cake::cheese()]])
        .into_connection();

    let result = SpecificationRepository::<cake::Entity>::new()
        .match_spec(&db, &Spec::eq("id", 1), Some(&Spec::as_array()))
        .await?;

    assert_eq!(result.len(), 1);
    assert!(matches!(result[0], Hydrated::Array(_)));

    Ok(())
}

#[tokio::test]
async fn test_match_scalars() -> Result<(), Error> {
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([vec![row(&[("price", 10)]), row(&[("price", 12)])]])
        .into_connection();

    let result = SpecificationRepository::<cake::Entity>::new()
        .match_spec(&db, &Spec::select(["price"]), Some(&Spec::as_scalar()))
        .await?;

    assert_eq!(
        result,
        vec![Hydrated::Scalar(10.into()), Hydrated::Scalar(12.into())]
    );

    assert_eq!(
        db.into_transaction_log(),
        vec![Transaction::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT "cake"."price" FROM "cake""#,
            []
        )]
    );

    Ok(())
}

#[tokio::test]
async fn test_single_result() -> Result<(), Error> {
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([vec![cake::cheese()]])
        .append_query_results([Vec::<cake::Model>::new()])
        .append_query_results([vec![cake::cheese(), cake::chocolate()]])
        .into_connection();

    let repository = SpecificationRepository::<cake::Entity>::new();
    let spec = Spec::eq("name", "Cheese");

    let result = repository.match_single_result(&db, &spec, None).await?;
    assert_eq!(result.into_model(), Some(cake::cheese()));

    let result = repository.match_single_result(&db, &spec, None).await;
    assert!(matches!(result, Err(Error::NoResult)));

    let result = repository.match_single_result(&db, &spec, None).await;
    assert!(matches!(result, Err(Error::NonUniqueResult(2))));

    Ok(())
}

#[tokio::test]
async fn test_one_or_null_result() -> Result<(), Error> {
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([Vec::<cake::Model>::new()])
        .append_query_results([vec![cake::chocolate()]])
        .into_connection();

    let repository = SpecificationRepository::<cake::Entity>::new();
    let spec = Spec::eq("name", "Chocolate");

    assert_eq!(
        repository.match_one_or_null_result(&db, &spec, None).await?,
        None
    );
    assert_eq!(
        repository.match_one_or_null_result(&db, &spec, None).await?,
        Some(Hydrated::Model(cake::chocolate()))
    );

    Ok(())
}

#[tokio::test]
async fn test_scalar_results() -> Result<(), Error> {
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([vec![row(&[("id", 1)]), row(&[("id", 2)])]])
        .append_query_results([vec![row(&[("id", 1), ("price", 10)])]])
        .into_connection();

    let repository = SpecificationRepository::<cake::Entity>::new();
    let spec = and_x![Spec::select(["id"]), Spec::gt("price", 5)];

    let result = repository.match_scalar_result(&db, &spec, None).await?;
    assert_eq!(result.len(), 2);

    let result = repository.match_scalar_result(&db, &spec, None).await;
    assert!(matches!(result, Err(Error::NonScalarResult(2))));

    Ok(())
}

#[tokio::test]
async fn test_single_scalar_result() -> Result<(), Error> {
    let db = MockDatabase::new(DbBackend::Postgres)
        .append_query_results([vec![row(&[("count", 2)])]])
        .append_query_results([vec![row(&[("count", 2)]), row(&[("count", 3)])]])
        .into_connection();

    let repository = SpecificationRepository::<cake::Entity>::new();
    let spec = Spec::count_of(Spec::gt("price", 5));

    repository.match_single_scalar_result(&db, &spec, None).await?;

    let result = repository.match_single_scalar_result(&db, &spec, None).await;
    assert!(matches!(result, Err(Error::NonUniqueResult(2))));

    let log = db.into_transaction_log();
    assert_eq!(
        log[0],
        Transaction::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT COUNT(*) FROM "cake" WHERE "cake"."price" > $1"#,
            [5i32.into()]
        )
    );

    Ok(())
}

#[test]
fn test_query_with_modifiers() -> Result<(), Error> {
    let repository = SpecificationRepository::<cake::Entity>::new();
    let modifiers = ResultModifierCollection::default()
        .with(Spec::as_single_scalar())
        .with(Spec::cache(Some(Duration::from_secs(30))));

    let query = repository.query(
        DbBackend::Postgres,
        &Spec::count_of(Spec::is_null("deleted")),
        Some(&modifiers),
    )?;

    assert_eq!(query.hydration(), Hydration::SingleScalar);
    assert_eq!(
        query.result_cache().and_then(|cache| cache.lifetime),
        Some(Duration::from_secs(30))
    );
    assert_eq!(
        query.sql(),
        r#"SELECT COUNT(*) FROM "cake" WHERE "cake"."deleted" IS NULL"#
    );

    Ok(())
}

#[test]
fn test_count_of_backends() -> Result<(), Error> {
    let repository = SpecificationRepository::<cake::Entity>::new();
    let spec = Spec::count_of(Spec::gt("price", 5));

    assert_eq!(
        repository.query(DbBackend::Sqlite, &spec, None)?.sql(),
        r#"SELECT COUNT(*) FROM "cake" WHERE "cake"."price" > ?"#
    );
    assert_eq!(
        repository.query(DbBackend::MySql, &spec, None)?.sql(),
        "SELECT COUNT(*) FROM `cake` WHERE `cake`.`price` > ?"
    );

    Ok(())
}

#[test]
fn test_modifier_must_be_result_modifier() {
    let repository = SpecificationRepository::<cake::Entity>::new();

    let err = repository
        .query(DbBackend::Postgres, &Spec::eq("id", 1), Some(&Spec::limit(1)))
        .unwrap_err();
    assert!(matches!(err, Error::NotAResultModifier(name) if name.ends_with("Limit")));

    let modifiers = Spec::result_modifiers(vec![
        Box::new(Spec::as_array()),
        Box::new(Spec::eq("id", 1)),
    ]);
    let err = repository
        .query(DbBackend::Postgres, &Spec::eq("id", 1), Some(&modifiers))
        .unwrap_err();
    assert!(matches!(err, Error::NotAResultModifier(name) if name.ends_with("Comparison")));
}

#[test]
fn test_config() -> Result<(), Error> {
    let config: RepositoryConfig =
        serde_json::from_str(r#"{"maxResults": 50, "cacheLifetime": 60}"#).unwrap();
    let repository = SpecificationRepository::<cake::Entity>::with_config(config);

    let query = repository.query(DbBackend::Postgres, &Spec::eq("id", 1), None)?;
    assert_eq!(
        query.sql(),
        format!(r#"{SELECT} WHERE "cake"."id" = $1 LIMIT $2"#)
    );
    assert_eq!(
        query.result_cache().and_then(|cache| cache.lifetime),
        Some(Duration::from_secs(60))
    );

    // the specification wins over the configuration
    let query = repository.query(DbBackend::Postgres, &Spec::limit(5), None)?;
    assert_eq!(query.parameters(), &[Value::from(5u64)]);

    Ok(())
}

#[cfg(feature = "time")]
#[test]
fn test_round_date_time_config() -> Result<(), Error> {
    let repository = SpecificationRepository::<cake::Entity>::with_config(RepositoryConfig {
        round_date_time: Some(60),
        ..Default::default()
    });

    let now = time::OffsetDateTime::from_unix_timestamp(1_700_000_059).unwrap();
    let query = repository.query(DbBackend::Postgres, &Spec::lt("baked", now), None)?;

    assert_eq!(
        query.parameters(),
        &[Value::from(
            time::OffsetDateTime::from_unix_timestamp(1_700_000_040).unwrap()
        )]
    );

    Ok(())
}
