use crate::{
    component::{apply_specification, Component, Filter, QueryModifier},
    filter::column,
    Error,
};
use sea_orm::sea_query::{
    Alias, Asterisk, Condition, Expr, Func, JoinType, Order, SelectStatement,
};

/// Join another table, under a new alias.
///
/// The join condition is `<alias>.<column> = <from>.<from_column>`, where `from` is the alias
/// given by the caller, unless overridden using [`Join::with_alias`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub on: Option<(String, String)>,
    from: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum JoinKind {
    #[default]
    Join,
    Left,
    Inner,
}

impl From<JoinKind> for JoinType {
    fn from(value: JoinKind) -> Self {
        match value {
            JoinKind::Join => JoinType::Join,
            JoinKind::Left => JoinType::LeftJoin,
            JoinKind::Inner => JoinType::InnerJoin,
        }
    }
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            alias: alias.into(),
            on: None,
            from: None,
        }
    }

    /// Set the columns to join on: a column of the joined table, and one of the table joined from.
    pub fn on(mut self, column: impl Into<String>, from_column: impl Into<String>) -> Self {
        self.on = Some((column.into(), from_column.into()));
        self
    }

    /// Join from `alias`, instead of the alias given by the caller.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.from = Some(alias.into());
        self
    }
}

component!(Join, query_modifier);

impl QueryModifier for Join {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        let (column_name, from_column) = self.on.as_ref().ok_or_else(|| {
            Error::InvalidArgument(format!("missing join condition for '{}'", self.alias))
        })?;
        let from = self.from.as_deref().unwrap_or(alias);

        let condition = column(&self.alias, column_name)
            .equals((Alias::new(from), Alias::new(from_column)));

        select.join_as(
            self.kind.into(),
            Alias::new(&self.table),
            Alias::new(&self.alias),
            Condition::all().add(condition),
        );

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Limit(pub u64);

component!(Limit, query_modifier);

impl QueryModifier for Limit {
    fn modify(&self, select: &mut SelectStatement, _: &str) -> Result<(), Error> {
        select.limit(self.0);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Offset(pub u64);

component!(Offset, query_modifier);

impl QueryModifier for Offset {
    fn modify(&self, select: &mut SelectStatement, _: &str) -> Result<(), Error> {
        select.offset(self.0);
        Ok(())
    }
}

/// A page of results: `size` entries, skipping `index` pages.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Slice {
    pub size: u64,
    pub index: u64,
}

component!(Slice, query_modifier);

impl QueryModifier for Slice {
    fn modify(&self, select: &mut SelectStatement, _: &str) -> Result<(), Error> {
        let offset = self.size.checked_mul(self.index).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "slice out of range: {} * {}",
                self.size, self.index
            ))
        })?;

        select.limit(self.size);
        if offset > 0 {
            select.offset(offset);
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl From<Direction> for Order {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Ascending => Order::Asc,
            Direction::Descending => Order::Desc,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
    alias: Option<String>,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

component!(OrderBy, query_modifier);

impl QueryModifier for OrderBy {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        let alias = self.alias.as_deref().unwrap_or(alias);
        select.order_by(
            (Alias::new(alias), Alias::new(&self.field)),
            self.direction.into(),
        );
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupBy {
    pub field: String,
    alias: Option<String>,
}

impl GroupBy {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

component!(GroupBy, query_modifier);

impl QueryModifier for GroupBy {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        let alias = self.alias.as_deref().unwrap_or(alias);
        select.group_by_col((Alias::new(alias), Alias::new(&self.field)));
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Distinct;

component!(Distinct, query_modifier);

impl QueryModifier for Distinct {
    fn modify(&self, select: &mut SelectStatement, _: &str) -> Result<(), Error> {
        select.distinct();
        Ok(())
    }
}

/// Select fields of an entity.
///
/// Unless `append` is set, this replaces all fields which are selected so far.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Select {
    pub fields: Vec<String>,
    pub append: bool,
    alias: Option<String>,
}

impl Select {
    pub fn new<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            append: false,
            alias: None,
        }
    }

    pub fn append(mut self) -> Self {
        self.append = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

component!(Select, query_modifier);

impl QueryModifier for Select {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        if self.fields.is_empty() {
            return Err(Error::InvalidArgument("no fields to select".into()));
        }

        let alias = self.alias.as_deref().unwrap_or(alias);
        if !self.append {
            select.clear_selects();
        }
        for field in &self.fields {
            select.column((Alias::new(alias), Alias::new(field)));
        }

        Ok(())
    }
}

/// Count the entities matching a specification.
#[derive(Debug)]
pub struct CountOf {
    pub child: Box<dyn Component>,
}

impl CountOf {
    pub fn new(child: impl Component + 'static) -> Self {
        Self {
            child: Box::new(child),
        }
    }
}

component!(CountOf, filter, query_modifier);

impl Filter for CountOf {
    fn filter(&self, alias: &str) -> Result<Option<Condition>, Error> {
        if !self.child.is_specification() {
            return Err(Error::InvalidChild(self.child.type_name()));
        }

        match self.child.as_filter() {
            Some(filter) => filter.filter(alias),
            None => Ok(None),
        }
    }
}

impl QueryModifier for CountOf {
    fn modify(&self, select: &mut SelectStatement, alias: &str) -> Result<(), Error> {
        if let Some(modifier) = self.child.as_query_modifier() {
            modifier.modify(select, alias)?;
        }

        select
            .clear_selects()
            .expr(Func::count(Expr::col(Asterisk)));

        Ok(())
    }
}

/// Apply a specification to a fresh select statement on `table`.
///
/// Mostly useful for inspecting the outcome of a specification, without an entity at hand.
pub fn select_from(table: &str, spec: &dyn Component) -> Result<SelectStatement, Error> {
    let mut select = SelectStatement::new();
    select
        .column((Alias::new(table), Asterisk))
        .from(Alias::new(table));
    apply_specification(spec, &mut select, table)?;
    Ok(select)
}

#[cfg(test)]
mod test {
    use super::*;
    use sea_orm::sea_query::{PostgresQueryBuilder, QueryStatementWriter};

    fn sql(spec: &dyn Component) -> String {
        select_from("cake", spec)
            .unwrap()
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn test_limit_offset() {
        assert_eq!(
            sql(&Limit(10)),
            r#"SELECT "cake".* FROM "cake" LIMIT 10"#
        );
        assert_eq!(
            sql(&Slice { size: 10, index: 2 }),
            r#"SELECT "cake".* FROM "cake" LIMIT 10 OFFSET 20"#
        );
        assert_eq!(
            sql(&Offset(5)),
            r#"SELECT "cake".* FROM "cake" OFFSET 5"#
        );
    }

    #[test]
    fn test_slice_overflow() {
        let slice = Slice {
            size: u64::MAX,
            index: 2,
        };
        let err = select_from("cake", &slice).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_order_by() {
        assert_eq!(
            sql(&OrderBy::new("name", Direction::Descending)),
            r#"SELECT "cake".* FROM "cake" ORDER BY "cake"."name" DESC"#
        );
    }

    #[test]
    fn test_group_by() {
        assert_eq!(
            sql(&GroupBy::new("name")),
            r#"SELECT "cake".* FROM "cake" GROUP BY "cake"."name""#
        );
        assert_eq!(
            sql(&GroupBy::new("name").with_alias("f")),
            r#"SELECT "cake".* FROM "cake" GROUP BY "f"."name""#
        );
    }

    #[test]
    fn test_select() {
        assert_eq!(
            sql(&Select::new(["id", "name"])),
            r#"SELECT "cake"."id", "cake"."name" FROM "cake""#
        );
    }

    #[test]
    fn test_join_requires_condition() {
        let err = select_from("cake", &Join::new(JoinKind::Left, "fruit", "f")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_join() {
        let sql = sql(&Join::new(JoinKind::Left, "fruit", "f").on("cake_id", "id"));
        assert!(
            sql.contains(r#"LEFT JOIN "fruit" AS "f" ON "f"."cake_id" = "cake"."id""#),
            "{sql}"
        );
    }

    #[test]
    fn test_count_of() {
        assert_eq!(
            sql(&CountOf::new(Distinct)),
            r#"SELECT DISTINCT COUNT(*) FROM "cake""#
        );
    }

    #[test]
    fn test_count_of_invalid_child() {
        let child = crate::result::Hydrate(crate::result::Hydration::Array);
        let err = select_from("cake", &CountOf::new(child)).unwrap_err();
        assert!(matches!(err, Error::InvalidChild(name) if name.ends_with("Hydrate")));
    }
}
