use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Child of a logic composite must be a filter or a query modifier, found: {0}")]
    InvalidChild(&'static str),
    #[error("Child of a result modifier collection must be a result modifier, found: {0}")]
    NotAResultModifier(&'static str),
    #[error("Not a specification: {0}")]
    InvalidSpecification(&'static str),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No result was found for the query")]
    NoResult,
    #[error("More than one result was found for the query, found: {0}")]
    NonUniqueResult(usize),
    #[error("Expected a scalar row with exactly one column, found {0} columns")]
    NonScalarResult(usize),
    #[error("Parser error: {0}")]
    Parser(String),
    #[error("Invalid expression: {0}")]
    Expression(String),
    #[error("Unknown qualifier: {0}")]
    UnknownQualifier(String),
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}
