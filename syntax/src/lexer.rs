//! Tokenize a string representation of a program.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace1, none_of, not_line_ending},
    combinator::{map, map_res, recognize, value},
    error::ParseError,
    multi::{many0_count, many1},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use crate::Symbol;

/// Skip whitespace and `%`-comments.
pub(crate) fn space(input: &str) -> IResult<&str, &str> {
    recognize(many0_count(alt((
        multispace1,
        recognize(preceded(char('%'), not_line_ending)),
    ))))(input)
}

/// An identifier: a letter or underscore followed by letters,
/// digits, and underscores. Classification (constant vs. variable
/// vs. anonymous) is by the first character and left to the caller.
pub(crate) fn identifier(input: &str) -> IResult<&str, Symbol> {
    let (input, name) = recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)?;
    Ok((input, Symbol::new(name.to_owned())))
}

fn empty_string(input: &str) -> IResult<&str, String> {
    map(tag(r#""""#), |_| String::new())(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        escaped_transform(
            none_of(r#"\""#),
            '\\',
            alt((
                value("\\", tag("\\")),
                value("\"", tag("\"")),
                value("\n", tag("n")),
                value("\r", tag("r")),
                value("\t", tag("t")),
            )),
        ),
        char('"'),
    )(input)
}

pub(crate) fn string(input: &str) -> IResult<&str, String> {
    alt((empty_string, quoted_string))(input)
}

pub(crate) fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(many1(digit1)), |digits: &str| digits.parse())(input)
}

/// Wrap a parsed token with the source text it started at.
pub(crate) fn token<I, O, E, F>(mut parser: F) -> impl FnMut(I) -> IResult<I, Token<O, I>, E>
where
    I: Clone,
    O: Clone,
    E: ParseError<I>,
    F: Parser<I, O, E>,
{
    move |input: I| {
        let i = input.clone();
        let (input, t) = parser.parse(input)?;
        Ok((input, Token::new(t, i)))
    }
}

/// Define a parser combinator for a token denoted by a tag.
#[macro_export]
macro_rules! lex_token {
    ($function: ident<$ty: ty>, $tag: literal, $token: expr) => {
        pub(crate) fn $function(input: &str) -> IResult<&str, $crate::Token<$ty, &str>> {
            $crate::lexer::token(::nom::combinator::map(
                ::nom::bytes::complete::tag($tag),
                |_| $token,
            ))(input)
        }
    };
}

/// A token with source information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<T: Clone, S: Clone> {
    pub token: T,
    pub source: S,
}

impl<T: Clone, S: Clone> Token<T, S> {
    pub fn new(token: T, source: S) -> Self {
        Self { token, source }
    }
}

/// A lexer, a.k.a. lexical analyzer, tokenizer.
pub trait Lex<'a, S> {
    type Input;
    type Token;

    /// Tokenize an input stream.
    fn lex(input: Self::Input) -> IResult<Self::Input, Vec<Self::Token>>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identifier() {
        assert!(super::identifier("").is_err(), "empty");
        assert!(super::identifier("123").is_err(), "starts with a digit");
        assert_eq!(
            super::identifier("_123"),
            Ok(("", Symbol::from("_123"))),
            "starts with an underscore"
        );
        assert_eq!(
            super::identifier("foo_123"),
            Ok(("", Symbol::from("foo_123"))),
            "includes an underscore"
        );
        assert_eq!(
            super::identifier("Xs"),
            Ok(("", Symbol::from("Xs"))),
            "uppercase initial"
        );
    }

    #[test]
    fn string() {
        assert!(super::string(r#""#).is_err(), "empty");
        assert!(super::string(r#""foo"#).is_err(), "unterminated string");
        assert_eq!(super::string(r#""""#), Ok(("", String::new())), "empty string");
        assert_eq!(
            super::string(r#""foo bar""#),
            Ok(("", String::from("foo bar"))),
            "simple string"
        );
        assert_eq!(
            super::string(r#""a\n\"b\"""#),
            Ok(("", String::from("a\n\"b\""))),
            "backslash escapes"
        );
    }

    #[test]
    fn integer() {
        assert!(super::integer("").is_err(), "empty");
        assert!(super::integer("X").is_err(), "invalid");
        assert!(super::integer("12345678901234567890").is_err(), "big");
        assert_eq!(super::integer("0"), Ok(("", 0)), "zero");
        assert_eq!(super::integer("123"), Ok(("", 123)), "decimal");
    }

    #[test]
    fn space() {
        assert_eq!(super::space("  x"), Ok(("x", "  ")));
        assert_eq!(super::space("% comment\nx"), Ok(("x", "% comment\n")));
        assert_eq!(super::space("x"), Ok(("x", "")));
    }
}
