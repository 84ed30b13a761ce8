use chumsky::prelude::*;

type Extra<'a> = extra::Err<Simple<'a, char>>;

/// A whitespace separated part of a search string: `[-]qualifier:...:value`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Clause<'a> {
    pub negated: bool,
    pub qualifiers: Vec<&'a str>,
    pub value: &'a str,
}

impl<'a> Clause<'a> {
    pub fn new(negated: bool, qualifiers: Vec<&'a str>, value: &'a str) -> Self {
        Self {
            negated,
            qualifiers,
            value,
        }
    }
}

/// A non-empty run of characters accepted by `accept`.
fn word<'a>(accept: fn(&char) -> bool) -> impl Parser<'a, &'a str, &'a str, Extra<'a>> {
    any().filter(accept).repeated().at_least(1).to_slice()
}

/// A qualifier, including its trailing `:`.
fn qualifier<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> {
    word(|c| c.is_alphanumeric() || *c == '_').then_ignore(just(':'))
}

/// A value, either quoted, or running up to the next whitespace.
fn value<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> {
    let quoted = none_of('"')
        .repeated()
        .to_slice()
        .delimited_by(just('"'), just('"'));
    let bare = word(|c| !(c.is_whitespace() || c.is_control() || *c == '"'));

    quoted.or(bare)
}

fn clause<'a>() -> impl Parser<'a, &'a str, Clause<'a>, Extra<'a>> {
    just('-')
        .or_not()
        .map(|sign| sign.is_some())
        .then(qualifier().repeated().collect::<Vec<_>>())
        .then(value())
        .map(|((negated, qualifiers), value)| Clause::new(negated, qualifiers, value))
}

/// Split a search string into its clauses.
pub fn clauses<'a>() -> impl Parser<'a, &'a str, Vec<Clause<'a>>, Extra<'a>> {
    clause().padded().repeated().collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(input: &str) -> Vec<Clause> {
        clauses().parse(input).into_result().unwrap()
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse(""), vec![]);
        assert_eq!(parse("   "), vec![]);
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            parse("name:Cheese price:>=10 created_at:2023..2024"),
            vec![
                Clause::new(false, vec!["name"], "Cheese"),
                Clause::new(false, vec!["price"], ">=10"),
                Clause::new(false, vec!["created_at"], "2023..2024"),
            ]
        );
    }

    #[test]
    fn test_alias_and_primary() {
        assert_eq!(
            parse("cheese f:name:apple"),
            vec![
                Clause::new(false, vec![], "cheese"),
                Clause::new(false, vec!["f", "name"], "apple"),
            ]
        );
    }

    #[test]
    fn test_quoted_and_negated() {
        assert_eq!(
            parse(r#"-name:"Blue Cheese" -is:null:deleted"#),
            vec![
                Clause::new(true, vec!["name"], "Blue Cheese"),
                Clause::new(true, vec!["is", "null"], "deleted"),
            ]
        );
    }

    #[test]
    fn test_value_with_colons() {
        assert_eq!(
            parse("baked:<2023-05-01T10:00:00Z"),
            vec![Clause::new(false, vec!["baked"], "<2023-05-01T10:00:00Z")]
        );
    }

    #[test]
    fn test_missing_value() {
        assert!(clauses().parse("name:").has_errors());
        assert!(clauses().parse(r#"name:"open"#).has_errors());
    }
}
