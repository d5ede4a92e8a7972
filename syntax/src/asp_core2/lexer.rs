//! ASP-Core-2 tokens and tokenizer.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    combinator::{map, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult, InputLength,
};

use crate::lexer::{identifier, integer, space, string, token, Lex, Token};
use crate::{lex_token, Symbol};

/// Lexical element of an ASP-Core-2 program.
/// Named after how they look, not what they mean.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum AspToken {
    Symbol(Symbol),
    Variable(Symbol),
    Anonymous,
    Str(String),
    Integer(i64),
    Count,
    Sum,
    Min,
    Max,
    Infimum,
    Supremum,
    Directive(String),
    If,
    Dot,
    Comma,
    Semi,
    Colon,
    Not,
    Or,
    Plus,
    Dash,
    Star,
    Slash,
    Backslash,
    Eq,
    Ne,
    Lt,
    Gt,
    Leq,
    Geq,
    LParen,
    RParen,
    LBrace,
    RBrace,
}

impl InputLength for AspToken {
    #[inline]
    fn input_len(&self) -> usize {
        1
    }
}

macro_rules! asp_token {
    ($function: ident, $tag: literal, $token: ident) => {
        lex_token!($function<AspToken>, $tag, AspToken::$token);
    };
}

asp_token!(r#if, ":-", If);
asp_token!(dot, ".", Dot);
asp_token!(comma, ",", Comma);
asp_token!(semi, ";", Semi);
asp_token!(colon, ":", Colon);
asp_token!(or, "|", Or);
asp_token!(plus, "+", Plus);
asp_token!(dash, "-", Dash);
asp_token!(star, "*", Star);
asp_token!(slash, "/", Slash);
asp_token!(backslash, "\\", Backslash);
asp_token!(eq, "=", Eq);
asp_token!(ne, "!=", Ne);
asp_token!(leq, "<=", Leq);
asp_token!(geq, ">=", Geq);
asp_token!(lt, "<", Lt);
asp_token!(gt, ">", Gt);
asp_token!(lparen, "(", LParen);
asp_token!(rparen, ")", RParen);
asp_token!(lbrace, "{", LBrace);
asp_token!(rbrace, "}", RBrace);

/// Classify an identifier by its first non-underscore character:
/// `_` alone is the anonymous variable, an uppercase initial makes
/// a variable, anything else a symbolic constant (or predicate or
/// function name, depending on context).
fn word(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    token(map(identifier, |s| match s.name() {
        "not" => AspToken::Not,
        name => match name.chars().find(|c| *c != '_') {
            None => AspToken::Anonymous,
            Some(c) if c.is_uppercase() => AspToken::Variable(s),
            Some(_) => AspToken::Symbol(s),
        },
    }))(input)
}

/// A `#`-prefixed element: an aggregate function name, `#inf`,
/// `#sup`, or an arbitrary directive. Directives are opaque: the
/// raw text through the terminating `.` is preserved verbatim.
fn hash(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    token(alt((
        map(tag("#count"), |_| AspToken::Count),
        map(tag("#sum"), |_| AspToken::Sum),
        map(tag("#min"), |_| AspToken::Min),
        map(tag("#max"), |_| AspToken::Max),
        map(tag("#inf"), |_| AspToken::Infimum),
        map(tag("#sup"), |_| AspToken::Supremum),
        map(
            recognize(preceded(pair(tag("#"), identifier), pair(take_until("."), tag(".")))),
            |text: &str| AspToken::Directive(String::from(text)),
        ),
    )))(input)
}

/// ASP-Core-2 lexer.
pub struct AspCore2Lexer;

impl<'a> Lex<'a, &str> for AspCore2Lexer {
    type Input = &'a str;
    type Token = Token<AspToken, &'a str>;

    /// Tokenize a string representation of an ASP-Core-2 program.
    fn lex(input: &'a str) -> IResult<&'a str, Vec<Self::Token>> {
        terminated(
            many0(delimited(
                space,
                alt((
                    hash,
                    alt((r#if, dot, comma, semi, colon, or)),
                    alt((plus, dash, star, slash, backslash)),
                    alt((ne, leq, geq, lt, gt, eq)),
                    alt((lparen, rparen, lbrace, rbrace)),
                    token(map(integer, AspToken::Integer)),
                    token(map(string, AspToken::Str)),
                    word,
                )),
                space,
            )),
            space,
        )(input)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(input: &str) -> Vec<AspToken> {
        let (rest, tokens) = AspCore2Lexer::lex(input).expect("lexing failed");
        assert_eq!(rest, "", "unconsumed input");
        tokens.into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn fact() {
        use AspToken::*;
        assert_eq!(
            tokens("p(1, 2)."),
            vec![
                Symbol("p".into()),
                LParen,
                Integer(1),
                Comma,
                Integer(2),
                RParen,
                Dot
            ]
        );
    }

    #[test]
    fn rule() {
        use AspToken::*;
        assert_eq!(
            tokens("q(X) :- p(X), not r(X)."),
            vec![
                Symbol("q".into()),
                LParen,
                Variable("X".into()),
                RParen,
                If,
                Symbol("p".into()),
                LParen,
                Variable("X".into()),
                RParen,
                Comma,
                Not,
                Symbol("r".into()),
                LParen,
                Variable("X".into()),
                RParen,
                Dot
            ]
        );
    }

    #[test]
    fn words() {
        use AspToken::*;
        assert_eq!(
            tokens("_ _X abc Abc not"),
            vec![
                Anonymous,
                Variable("_X".into()),
                Symbol("abc".into()),
                Variable("Abc".into()),
                Not
            ]
        );
    }

    #[test]
    fn relops() {
        use AspToken::*;
        assert_eq!(tokens("= != < > <= >="), vec![Eq, Ne, Lt, Gt, Leq, Geq]);
    }

    #[test]
    fn arithmetic() {
        use AspToken::*;
        assert_eq!(
            tokens("X + 1 * 2 / 3 \\ 4 - 5"),
            vec![
                Variable("X".into()),
                Plus,
                Integer(1),
                Star,
                Integer(2),
                Slash,
                Integer(3),
                Backslash,
                Integer(4),
                Dash,
                Integer(5)
            ]
        );
    }

    #[test]
    fn aggregates() {
        use AspToken::*;
        assert_eq!(
            tokens("#count { X : p(X) } <= 2"),
            vec![
                Count,
                LBrace,
                Variable("X".into()),
                Colon,
                Symbol("p".into()),
                LParen,
                Variable("X".into()),
                RParen,
                RBrace,
                Leq,
                Integer(2)
            ]
        );
        assert_eq!(tokens("#inf #sup"), vec![Infimum, Supremum]);
    }

    #[test]
    fn directive() {
        use AspToken::*;
        assert_eq!(
            tokens("#show p/2."),
            vec![Directive(String::from("#show p/2."))]
        );
    }

    #[test]
    fn comments() {
        use AspToken::*;
        assert_eq!(
            tokens("p(1). % a fact\np(2)."),
            vec![
                Symbol("p".into()),
                LParen,
                Integer(1),
                RParen,
                Dot,
                Symbol("p".into()),
                LParen,
                Integer(2),
                RParen,
                Dot
            ]
        );
    }
}
