//! Query Parser
//!
//! Parses query strings into Command AST. Parsing is all-or-nothing: any
//! trailing input fails the whole parse.
//!
//! # Supported Syntax
//!
//! ```text
//! HIST field [WHERE cond]
//! PLOT field [VS field2] [WHERE cond]
//! TREND field [BY field2] [WHERE cond]
//! BAR field [BY field2] [WHERE cond]
//! STATS field [BY field2] [WHERE cond]
//! IDENTIFY cond
//! IDENTIFY field WHERE cond
//! ```
//!
//! Conditions combine comparisons with NOT/AND/OR (in decreasing binding
//! strength, chains grouping left-to-right) and parentheses. Keywords are
//! case-insensitive; field names are case-sensitive dotted identifiers.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{anychar, char, digit1, multispace0, multispace1},
    combinator::{map, map_opt, not, opt, peek, recognize, value, verify},
    multi::{fold_many0, many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::query::ast::*;
use crate::query::error::{QueryError, QueryResult};

/// Parse a query string into a Command
pub fn parse(input: &str) -> QueryResult<Command> {
    let trimmed = input.trim();

    match preceded(multispace0, command)(trimmed) {
        Ok((remaining, cmd)) if remaining.trim().is_empty() => {
            tracing::debug!("parsed {} command from {:?}", cmd.kind, trimmed);
            Ok(cmd)
        }
        Ok((remaining, _)) => Err(QueryError::Parse {
            position: offset_of(trimmed, remaining),
            message: format!("unexpected input after query: '{}'", remaining.trim()),
        }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(QueryError::Parse {
            position: offset_of(trimmed, e.input),
            message: format!("expected {:?}", e.code),
        }),
        Err(nom::Err::Incomplete(_)) => Err(QueryError::Parse {
            position: trimmed.len(),
            message: "incomplete query".to_string(),
        }),
    }
}

/// Byte offset of `remaining` within `full`
fn offset_of(full: &str, remaining: &str) -> usize {
    full.len() - remaining.len()
}

/// Parse any command
fn command(input: &str) -> IResult<&str, Command> {
    alt((
        aggregate_command(CommandKind::Hist, "HIST"),
        plot_command,
        aggregate_command(CommandKind::Trend, "TREND"),
        aggregate_command(CommandKind::Bar, "BAR"),
        aggregate_command(CommandKind::Stats, "STATS"),
        identify_command,
    ))(input)
}

/// Parser for `KEYWORD field [BY field] [WHERE cond]` commands
fn aggregate_command(
    kind: CommandKind,
    word: &'static str,
) -> impl FnMut(&str) -> IResult<&str, Command> {
    move |input: &str| {
        let (input, _) = keyword(word)(input)?;
        let (input, _) = multispace1(input)?;
        let (input, field) = field_path(input)?;
        let (input, secondary) = opt(by_clause)(input)?;
        let (input, condition) = opt(where_clause)(input)?;

        Ok((
            input,
            Command {
                kind,
                field: Some(field),
                secondary,
                condition,
            },
        ))
    }
}

/// Parse `PLOT field [VS field] [WHERE cond]`
fn plot_command(input: &str) -> IResult<&str, Command> {
    let (input, _) = keyword("PLOT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, field) = field_path(input)?;
    let (input, secondary) = opt(vs_clause)(input)?;
    let (input, condition) = opt(where_clause)(input)?;

    Ok((
        input,
        Command {
            kind: CommandKind::Plot,
            field: Some(field),
            secondary,
            condition,
        },
    ))
}

/// Parse `IDENTIFY cond` or `IDENTIFY field WHERE cond`
fn identify_command(input: &str) -> IResult<&str, Command> {
    let (input, _) = keyword("IDENTIFY")(input)?;
    let (input, _) = multispace1(input)?;

    alt((
        map(
            pair(field_path, where_clause),
            |(field, cond)| Command {
                kind: CommandKind::Identify,
                field: Some(field),
                secondary: None,
                condition: Some(cond),
            },
        ),
        map(condition, |cond| Command {
            kind: CommandKind::Identify,
            field: None,
            secondary: None,
            condition: Some(cond),
        }),
    ))(input)
}

/// Parse `BY field`
fn by_clause(input: &str) -> IResult<&str, FieldPath> {
    preceded(
        tuple((multispace1, keyword("BY"), multispace1)),
        field_path,
    )(input)
}

/// Parse `VS field`
fn vs_clause(input: &str) -> IResult<&str, FieldPath> {
    preceded(
        tuple((multispace1, keyword("VS"), multispace1)),
        field_path,
    )(input)
}

/// Parse `WHERE cond`
fn where_clause(input: &str) -> IResult<&str, Condition> {
    preceded(
        tuple((multispace1, keyword("WHERE"), multispace1)),
        condition,
    )(input)
}

/// Parse a full condition (lowest precedence: OR)
pub(crate) fn condition(input: &str) -> IResult<&str, Condition> {
    or_expr(input)
}

/// `or_expr := and_expr ('OR' and_expr)*`, folded left-associatively
fn or_expr(input: &str) -> IResult<&str, Condition> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(
        tuple((multispace1, keyword("OR"), multispace1)),
        and_expr,
    ))(input)?;

    Ok((input, rest.into_iter().fold(first, Condition::or)))
}

/// `and_expr := not_expr ('AND' not_expr)*`, folded left-associatively
fn and_expr(input: &str) -> IResult<&str, Condition> {
    let (input, first) = not_expr(input)?;
    let (input, rest) = many0(preceded(
        tuple((multispace1, keyword("AND"), multispace1)),
        not_expr,
    ))(input)?;

    Ok((input, rest.into_iter().fold(first, Condition::and)))
}

/// `not_expr := 'NOT' not_expr | '(' condition ')' | comparison`
fn not_expr(input: &str) -> IResult<&str, Condition> {
    alt((
        negation,
        paren_group,
        map(comparison, Condition::Comparison),
    ))(input)
}

fn negation(input: &str) -> IResult<&str, Condition> {
    let (input, _) = keyword("NOT")(input)?;
    // NOT must be followed by whitespace or an opening paren
    let (input, _) = alt((value((), multispace1), value((), peek(char('(')))))(input)?;
    let (input, inner) = not_expr(input)?;
    Ok((input, inner.negate()))
}

fn paren_group(input: &str) -> IResult<&str, Condition> {
    delimited(
        pair(char('('), multispace0),
        condition,
        pair(multispace0, char(')')),
    )(input)
}

/// Parse `field op value` or `field IN (v1, v2, ...)`
fn comparison(input: &str) -> IResult<&str, Comparison> {
    let (input, field) = field_path(input)?;
    let (input, _) = multispace0(input)?;
    let (input, op) = compare_op(input)?;
    let (input, _) = multispace0(input)?;
    let (input, rhs) = alt((
        map(value_list, Operand::List),
        map(literal, Operand::Scalar),
    ))(input)?;

    Ok((input, Comparison { field, op, rhs }))
}

/// Parse a comparison operator (symbolic or keyword)
fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Ne, alt((tag("!="), tag("<>")))),
        value(CompareOp::Eq, alt((tag("=="), tag("=")))),
        value(CompareOp::Lt, tag("<")),
        value(CompareOp::Gt, tag(">")),
        value(CompareOp::Like, keyword("LIKE")),
        value(CompareOp::In, keyword("IN")),
        value(CompareOp::Contains, keyword("CONTAINS")),
    ))(input)
}

/// Parse `( value (',' value)* )`
fn value_list(input: &str) -> IResult<&str, Vec<Literal>> {
    delimited(
        pair(char('('), multispace0),
        separated_list1(delimited(multispace0, char(','), multispace0), literal),
        pair(multispace0, char(')')),
    )(input)
}

/// Parse a value token: number, quoted string, or bare word
fn literal(input: &str) -> IResult<&str, Literal> {
    alt((number, map(quoted_string, Literal::String), bare_word))(input)
}

/// Parse a signed integer or real
fn number(input: &str) -> IResult<&str, Literal> {
    let (rest, text) = recognize(tuple((
        opt(alt((char('-'), char('+')))),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)?;

    let lit = if text.contains('.') {
        text.parse::<f64>().ok().map(Literal::Float)
    } else {
        text.parse::<i64>().ok().map(Literal::Int)
    };

    match lit {
        Some(lit) => Ok((rest, lit)),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// Parse a bare word: `true`/`false` become Bool, anything else a String
fn bare_word(input: &str) -> IResult<&str, Literal> {
    map(identifier, |word| {
        if word.eq_ignore_ascii_case("true") {
            Literal::Bool(true)
        } else if word.eq_ignore_ascii_case("false") {
            Literal::Bool(false)
        } else {
            Literal::String(word.to_string())
        }
    })(input)
}

/// Parse a single- or double-quoted string with backslash escaping
fn quoted_string(input: &str) -> IResult<&str, String> {
    alt((quoted_with('\''), quoted_with('"')))(input)
}

fn quoted_with(quote: char) -> impl FnMut(&str) -> IResult<&str, String> {
    move |input: &str| {
        delimited(
            char(quote),
            fold_many0(
                alt((
                    preceded(char('\\'), anychar),
                    verify(anychar, move |c: &char| *c != '\\' && *c != quote),
                )),
                String::new,
                |mut acc, c| {
                    acc.push(c);
                    acc
                },
            ),
            char(quote),
        )(input)
    }
}

/// Parse a dotted field path
fn field_path(input: &str) -> IResult<&str, FieldPath> {
    map_opt(identifier, FieldPath::parse)(input)
}

/// Identifier: `[A-Za-z_][A-Za-z0-9_.]*` (dot allowed for nested paths)
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '.'),
    ))(input)
}

/// Case-insensitive keyword that must not run into a following identifier
/// character (`IN` must not match the start of `INactive`).
fn keyword(word: &'static str) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input: &str| {
        let (rest, matched) = tag_no_case(word)(input)?;
        let (rest, _) = not(verify(anychar, |c: &char| {
            c.is_alphanumeric() || *c == '_'
        }))(rest)?;
        Ok((rest, matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(field: &str, op: CompareOp, lit: Literal) -> Condition {
        Condition::Comparison(Comparison::new(field, op, lit))
    }

    #[test]
    fn test_parse_simple_hist() {
        let cmd = parse("HIST age_days").unwrap();
        assert_eq!(cmd.kind, CommandKind::Hist);
        assert_eq!(cmd.field, Some(FieldPath::from("age_days")));
        assert!(cmd.secondary.is_none());
        assert!(cmd.condition.is_none());
    }

    #[test]
    fn test_parse_hist_with_where() {
        let cmd = parse("HIST age_days WHERE state = 'open'").unwrap();
        assert_eq!(
            cmd.condition,
            Some(cmp("state", CompareOp::Eq, Literal::String("open".into())))
        );
    }

    #[test]
    fn test_parse_plot_vs() {
        let cmd = parse("PLOT comments VS age_days").unwrap();
        assert_eq!(cmd.kind, CommandKind::Plot);
        assert_eq!(cmd.field, Some(FieldPath::from("comments")));
        assert_eq!(cmd.secondary, Some(FieldPath::from("age_days")));
    }

    #[test]
    fn test_parse_trend_by() {
        let cmd = parse("TREND created_at BY primary_label").unwrap();
        assert_eq!(cmd.kind, CommandKind::Trend);
        assert_eq!(cmd.secondary, Some(FieldPath::from("primary_label")));
    }

    #[test]
    fn test_parse_stats_by_where() {
        let cmd = parse("STATS comments BY state WHERE age_days > 90 AND state = 'open'").unwrap();
        assert_eq!(cmd.kind, CommandKind::Stats);
        assert_eq!(cmd.secondary, Some(FieldPath::from("state")));

        match cmd.condition.unwrap() {
            Condition::And(left, right) => {
                assert_eq!(*left, cmp("age_days", CompareOp::Gt, Literal::Int(90)));
                assert_eq!(
                    *right,
                    cmp("state", CompareOp::Eq, Literal::String("open".into()))
                );
            }
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_case_insensitive_keywords() {
        let cmd = parse("stats comments by state where age_days > 90").unwrap();
        assert_eq!(cmd.kind, CommandKind::Stats);
        assert!(cmd.condition.is_some());
    }

    #[test]
    fn test_parse_identify_bare_condition() {
        let cmd = parse("IDENTIFY comments > 10 AND state = 'open'").unwrap();
        assert_eq!(cmd.kind, CommandKind::Identify);
        assert!(cmd.field.is_none());
        assert!(matches!(cmd.condition, Some(Condition::And(_, _))));
    }

    #[test]
    fn test_parse_identify_field_where() {
        let cmd = parse("IDENTIFY age_days WHERE age_days > 90 AND comments > 5").unwrap();
        assert_eq!(cmd.kind, CommandKind::Identify);
        assert_eq!(cmd.field, Some(FieldPath::from("age_days")));
        assert!(cmd.condition.is_some());
    }

    #[test]
    fn test_parse_boolean_precedence() {
        // AND binds tighter than OR: a OR (b AND c)
        let cmd = parse("IDENTIFY state = 'open' OR comments > 5 AND age_days > 90").unwrap();
        match cmd.condition.unwrap() {
            Condition::Or(left, right) => {
                assert!(matches!(*left, Condition::Comparison(_)));
                assert!(matches!(*right, Condition::And(_, _)));
            }
            other => panic!("expected Or at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_left_associative_chain() {
        // a AND b AND c parses as (a AND b) AND c
        let cmd = parse("IDENTIFY a = 1 AND b = 2 AND c = 3").unwrap();
        match cmd.condition.unwrap() {
            Condition::And(left, right) => {
                assert!(matches!(*left, Condition::And(_, _)));
                assert_eq!(*right, cmp("c", CompareOp::Eq, Literal::Int(3)));
            }
            other => panic!("expected And at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_not_and_parens() {
        let cmd = parse("IDENTIFY NOT (state = 'open' OR state = 'closed')").unwrap();
        match cmd.condition.unwrap() {
            Condition::Not(inner) => assert!(matches!(*inner, Condition::Or(_, _))),
            other => panic!("expected Not, got {:?}", other),
        }

        // NOT binds tighter than AND
        let cmd = parse("IDENTIFY NOT draft = true AND comments > 0").unwrap();
        match cmd.condition.unwrap() {
            Condition::And(left, _) => assert!(matches!(*left, Condition::Not(_))),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_in_list() {
        let cmd = parse("IDENTIFY state IN ('open', 'closed')").unwrap();
        match cmd.condition.unwrap() {
            Condition::Comparison(c) => {
                assert_eq!(c.op, CompareOp::In);
                assert_eq!(
                    c.rhs,
                    Operand::List(vec![
                        Literal::String("open".into()),
                        Literal::String("closed".into()),
                    ])
                );
            }
            other => panic!("expected Comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_like_and_contains() {
        let cmd = parse("IDENTIFY author LIKE '%spring%'").unwrap();
        match cmd.condition.unwrap() {
            Condition::Comparison(c) => assert_eq!(c.op, CompareOp::Like),
            other => panic!("expected Comparison, got {:?}", other),
        }

        let cmd = parse("IDENTIFY primary_label CONTAINS 'vector'").unwrap();
        match cmd.condition.unwrap() {
            Condition::Comparison(c) => assert_eq!(c.op, CompareOp::Contains),
            other => panic!("expected Comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_operators_without_spaces() {
        let cmd = parse("HIST comments WHERE age_days>90").unwrap();
        assert_eq!(
            cmd.condition,
            Some(cmp("age_days", CompareOp::Gt, Literal::Int(90)))
        );
    }

    #[test]
    fn test_parse_all_comparison_symbols() {
        for (text, op) in [
            ("=", CompareOp::Eq),
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            ("<>", CompareOp::Ne),
            ("<", CompareOp::Lt),
            ("<=", CompareOp::Le),
            (">", CompareOp::Gt),
            (">=", CompareOp::Ge),
        ] {
            let cmd = parse(&format!("HIST x WHERE a {} 1", text)).unwrap();
            match cmd.condition.unwrap() {
                Condition::Comparison(c) => assert_eq!(c.op, op, "operator {}", text),
                other => panic!("expected Comparison, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_literals() {
        let cmd = parse("IDENTIFY a = -12.5 OR b = 42 OR c = high OR d = true").unwrap();
        let mut found = Vec::new();

        fn collect(cond: &Condition, out: &mut Vec<Literal>) {
            match cond {
                Condition::Comparison(c) => {
                    if let Operand::Scalar(lit) = &c.rhs {
                        out.push(lit.clone());
                    }
                }
                Condition::And(l, r) | Condition::Or(l, r) => {
                    collect(l, out);
                    collect(r, out);
                }
                Condition::Not(inner) => collect(inner, out),
            }
        }
        collect(&cmd.condition.unwrap(), &mut found);

        assert_eq!(
            found,
            vec![
                Literal::Float(-12.5),
                Literal::Int(42),
                Literal::String("high".into()),
                Literal::Bool(true),
            ]
        );
    }

    #[test]
    fn test_parse_quoted_string_escapes() {
        let cmd = parse(r#"IDENTIFY title = 'it\'s done'"#).unwrap();
        match cmd.condition.unwrap() {
            Condition::Comparison(c) => {
                assert_eq!(c.rhs, Operand::Scalar(Literal::String("it's done".into())));
            }
            other => panic!("expected Comparison, got {:?}", other),
        }

        let cmd = parse(r#"HIST x WHERE note = "say \"hi\"""#).unwrap();
        match cmd.condition.unwrap() {
            Condition::Comparison(c) => {
                assert_eq!(
                    c.rhs,
                    Operand::Scalar(Literal::String(r#"say "hi""#.into()))
                );
            }
            other => panic!("expected Comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_field_path() {
        let cmd = parse("BAR labels_assigned.label").unwrap();
        let field = cmd.field.unwrap();
        assert_eq!(field.root(), "labels_assigned");
        assert!(field.is_nested());
    }

    #[test]
    fn test_parse_keyword_prefix_fields() {
        // field names beginning with keyword letters must not be eaten
        let cmd = parse("IDENTIFY not_ready = true AND order_index > 2").unwrap();
        match cmd.condition.unwrap() {
            Condition::And(left, _) => {
                assert_eq!(*left, cmp("not_ready", CompareOp::Eq, Literal::Bool(true)));
            }
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_idempotent() {
        let text = "STATS comments BY state WHERE age_days > 90 AND state = 'open'";
        assert_eq!(parse(text).unwrap(), parse(text).unwrap());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("SELECT age_days").is_err());
        assert!(parse("HIST").is_err());
        assert!(parse("HIST age_days WHERE").is_err());
        assert!(parse("HIST age_days trailing garbage").is_err());
        assert!(parse("IDENTIFY state IN ()").is_err());
    }

    #[test]
    fn test_parse_error_position() {
        match parse("HIST age_days extra") {
            Err(QueryError::Parse { position, .. }) => {
                assert_eq!(position, "HIST age_days".len());
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
