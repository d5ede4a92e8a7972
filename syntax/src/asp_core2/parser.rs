//! ASP-Core-2 parser over a token stream.

use nom::{
    branch::alt,
    bytes::complete::take,
    combinator::{eof, map, opt},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Err, IResult,
};

use crate::{
    parse_token, Aggregate, AggregateElement, AggrFunc, Atom, BinOp, Choice, ChoiceElement,
    Directive, Guard, Head, Literal, Parse, Program, RelOp, Rule, Symbol, Term, Token, Tokens,
    UnaryOp,
};

use super::lexer::AspToken;

/// Local alias.
type Input<'a, S> = crate::parser::Input<'a, AspToken, S>;

/// ASP-Core-2 parser.
pub struct AspCore2Parser;

impl<'a, S: Clone> Parse<'a, S> for AspCore2Parser {
    type Token = AspToken;
    type Tree = Program<Term>;

    /// Parse a stream of ASP-Core-2 tokens as a program:
    /// a sequence of `.`-terminated rules and directives.
    fn parse(input: Input<'a, S>) -> IResult<Input<'a, S>, Self::Tree> {
        map(terminated(many0(statement), eof), |statements| {
            let mut rules = Vec::new();
            let mut directives = Vec::new();
            for s in statements {
                match s {
                    Statement::Rule(r) => rules.push(r),
                    Statement::Directive(d) => directives.push(d),
                }
            }
            Program::new(rules, directives)
        })(input)
    }
}

enum Statement {
    Rule(Rule<Term>),
    Directive(Directive),
}

/// Define a parser combinator that recognizes a single token.
/// Named (mostly) after what they mean, not how they look.
macro_rules! parse_asp_token {
    ($function: ident, $token: ident) => {
        parse_token!($function<AspToken>, AspToken::$token);
    };
}

parse_asp_token!(r#if, If);
parse_asp_token!(dot, Dot);
parse_asp_token!(comma, Comma);
parse_asp_token!(semi, Semi);
parse_asp_token!(colon, Colon);
parse_asp_token!(not, Not);
parse_asp_token!(or, Or);
parse_asp_token!(plus, Plus);
parse_asp_token!(minus, Dash);
parse_asp_token!(times, Star);
parse_asp_token!(over, Slash);
parse_asp_token!(modulo, Backslash);
parse_asp_token!(eq, Eq);
parse_asp_token!(ne, Ne);
parse_asp_token!(lt, Lt);
parse_asp_token!(gt, Gt);
parse_asp_token!(leq, Leq);
parse_asp_token!(geq, Geq);
parse_asp_token!(lparen, LParen);
parse_asp_token!(rparen, RParen);
parse_asp_token!(lbrace, LBrace);
parse_asp_token!(rbrace, RBrace);
parse_asp_token!(anonymous, Anonymous);
parse_asp_token!(infimum, Infimum);
parse_asp_token!(supremum, Supremum);

/// Pull one token and apply `select` to it.
fn token_where<'a, S: Clone + 'a, O>(
    select: impl Fn(&AspToken) -> Option<O>,
) -> impl FnMut(Input<'a, S>) -> IResult<Input<'a, S>, O> {
    move |input: Input<'a, S>| {
        let (rest, tokens) = take(1_usize)(input.clone())?;
        match tokens.first().and_then(|t| select(&t.token)) {
            Some(t) => Ok((rest, t)),
            None => Err(Err::Error(Error::new(input, ErrorKind::Fail))),
        }
    }
}

fn symbol<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    token_where(|t| match t {
        AspToken::Symbol(s) => Some(s.clone()),
        _ => None,
    })(input)
}

fn variable<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    token_where(|t| match t {
        AspToken::Variable(s) => Some(s.clone()),
        _ => None,
    })(input)
}

fn integer<S: Clone>(input: Input<S>) -> IResult<Input<S>, i64> {
    token_where(|t| match t {
        AspToken::Integer(i) => Some(*i),
        _ => None,
    })(input)
}

fn string<S: Clone>(input: Input<S>) -> IResult<Input<S>, String> {
    token_where(|t| match t {
        AspToken::Str(s) => Some(s.clone()),
        _ => None,
    })(input)
}

fn directive<S: Clone>(input: Input<S>) -> IResult<Input<S>, Directive> {
    token_where(|t| match t {
        AspToken::Directive(text) => Some(Directive(text.clone())),
        _ => None,
    })(input)
}

fn aggr_func<S: Clone>(input: Input<S>) -> IResult<Input<S>, AggrFunc> {
    token_where(|t| match t {
        AspToken::Count => Some(AggrFunc::Count),
        AspToken::Sum => Some(AggrFunc::Sum),
        AspToken::Min => Some(AggrFunc::Min),
        AspToken::Max => Some(AggrFunc::Max),
        _ => None,
    })(input)
}

fn rel_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, RelOp> {
    alt((
        map(eq, |_| RelOp::Eq),
        map(ne, |_| RelOp::Ne),
        map(leq, |_| RelOp::Leq),
        map(geq, |_| RelOp::Geq),
        map(lt, |_| RelOp::Lt),
        map(gt, |_| RelOp::Gt),
    ))(input)
}

fn arguments<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Term>> {
    delimited(lparen, separated_list0(comma, term), rparen)(input)
}

/// A symbol with arguments makes a function term; without, a constant.
fn symbolic_term<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    map(pair(symbol, opt(arguments)), |(name, args)| match args {
        Some(args) => Term::Function(name, args),
        None => Term::Constant(name),
    })(input)
}

/// A parenthesized term is grouping; two or more make a tuple.
fn parenthesized<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    map(
        delimited(lparen, separated_list1(comma, term), rparen),
        |mut terms| {
            if terms.len() == 1 {
                terms.remove(0)
            } else {
                Term::Tuple(terms)
            }
        },
    )(input)
}

fn base_term<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    alt((
        map(integer, Term::Number),
        map(string, Term::String),
        map(infimum, |_| Term::Infimum),
        map(supremum, |_| Term::Supremum),
        map(anonymous, |_| Term::Anonymous(0)),
        map(variable, Term::Variable),
        symbolic_term,
        parenthesized,
    ))(input)
}

fn unary<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    alt((
        map(preceded(minus, unary), |t| {
            Term::unary_operation(UnaryOp::Neg, t)
        }),
        base_term,
    ))(input)
}

fn mul_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, BinOp> {
    alt((
        map(times, |_| BinOp::Mul),
        map(over, |_| BinOp::Div),
        map(modulo, |_| BinOp::Rem),
    ))(input)
}

fn add_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, BinOp> {
    alt((map(plus, |_| BinOp::Add), map(minus, |_| BinOp::Sub)))(input)
}

fn multiplicative<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(mul_op, unary))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn additive<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    let (input, first) = multiplicative(input)?;
    let (input, rest) = many0(pair(add_op, multiplicative))(input)?;
    Ok((input, fold_binary(first, rest)))
}

/// Left-associative fold of an operator chain.
fn fold_binary(first: Term, rest: Vec<(BinOp, Term)>) -> Term {
    rest.into_iter()
        .fold(first, |acc, (op, t)| Term::binary_operation(acc, op, t))
}

fn term<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    additive(input)
}

fn atom<S: Clone>(input: Input<S>) -> IResult<Input<S>, Atom<Term>> {
    map(pair(symbol, opt(arguments)), |(predicate, args)| {
        Atom::new(predicate, args.unwrap_or_default())
    })(input)
}

fn relation<S: Clone>(input: Input<S>) -> IResult<Input<S>, Literal<Term>> {
    map(tuple((term, rel_op, term)), |(l, op, r)| {
        Literal::relation(l, op, r)
    })(input)
}

fn aggregate_element<S: Clone>(input: Input<S>) -> IResult<Input<S>, AggregateElement<Term>> {
    map(
        pair(
            separated_list1(comma, term),
            opt(preceded(colon, separated_list1(comma, literal))),
        ),
        |(terms, condition)| AggregateElement::new(terms, condition.unwrap_or_default()),
    )(input)
}

fn aggregate<S: Clone>(input: Input<S>) -> IResult<Input<S>, Aggregate<Term>> {
    map(
        tuple((
            opt(pair(term, rel_op)),
            aggr_func,
            delimited(lbrace, separated_list0(semi, aggregate_element), rbrace),
            opt(pair(rel_op, term)),
        )),
        |(left, function, elements, right)| {
            Aggregate::new(
                function,
                left.map(|(term, op)| Guard::new(op, term)),
                right.map(|(op, term)| Guard::new(op, term)),
                elements,
            )
        },
    )(input)
}

fn literal<S: Clone>(input: Input<S>) -> IResult<Input<S>, Literal<Term>> {
    alt((
        map(aggregate, Literal::Aggregate),
        map(preceded(not, atom), Literal::Negative),
        relation,
        map(atom, Literal::Positive),
    ))(input)
}

fn body<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Literal<Term>>> {
    separated_list1(comma, literal)(input)
}

fn choice_element<S: Clone>(input: Input<S>) -> IResult<Input<S>, ChoiceElement<Term>> {
    map(
        pair(atom, opt(preceded(colon, separated_list1(comma, literal)))),
        |(atom, condition)| ChoiceElement::new(atom, condition.unwrap_or_default()),
    )(input)
}

fn choice<S: Clone>(input: Input<S>) -> IResult<Input<S>, Head<Term>> {
    map(
        tuple((
            opt(term),
            delimited(lbrace, separated_list0(semi, choice_element), rbrace),
            opt(term),
        )),
        |(lower, elements, upper)| Head::Choice(Choice::new(lower, upper, elements)),
    )(input)
}

fn disjunction<S: Clone>(input: Input<S>) -> IResult<Input<S>, Head<Term>> {
    map(separated_list1(or, atom), Head::Disjunction)(input)
}

fn head<S: Clone>(input: Input<S>) -> IResult<Input<S>, Head<Term>> {
    alt((choice, disjunction))(input)
}

fn rule<S: Clone>(input: Input<S>) -> IResult<Input<S>, Rule<Term>> {
    map(
        alt((
            map(pair(head, preceded(r#if, body)), |(h, b)| Rule::new(h, b)),
            map(preceded(r#if, body), |b| Rule::new(Head::constraint(), b)),
            map(head, |h| Rule::new(h, [])),
        )),
        |mut rule| {
            number_anonymous_variables(&mut rule);
            rule
        },
    )(input)
}

fn statement<S: Clone>(input: Input<S>) -> IResult<Input<S>, Statement> {
    alt((
        map(directive, Statement::Directive),
        map(terminated(rule, dot), Statement::Rule),
    ))(input)
}

/// Give each anonymous variable in a rule a distinct id.
/// The lexer can't number them (it has no rule boundaries),
/// so they all arrive as `Anonymous(0)`.
fn number_anonymous_variables(rule: &mut Rule<Term>) {
    let mut next = 0_usize;
    let mut number = |t: &mut Term| each_term(t, &mut next);

    fn each_term(t: &mut Term, next: &mut usize) {
        match t {
            Term::Anonymous(id) => {
                *id = *next;
                *next += 1;
            }
            Term::UnaryOperation(_, x) => each_term(x, next),
            Term::BinaryOperation(x, _, y) => {
                each_term(x, next);
                each_term(y, next);
            }
            Term::Function(_, args) | Term::Tuple(args) => {
                for arg in args {
                    each_term(arg, next);
                }
            }
            _ => {}
        }
    }

    fn each_literal(l: &mut Literal<Term>, f: &mut impl FnMut(&mut Term)) {
        match l {
            Literal::Positive(atom) | Literal::Negative(atom) => {
                atom.arguments.iter_mut().for_each(&mut *f)
            }
            Literal::Relation(x, _, y) => {
                f(x);
                f(y);
            }
            Literal::Aggregate(agg) => {
                if let Some(g) = &mut agg.left {
                    f(&mut g.term);
                }
                if let Some(g) = &mut agg.right {
                    f(&mut g.term);
                }
                for e in &mut agg.elements {
                    e.terms.iter_mut().for_each(&mut *f);
                    for c in &mut e.condition {
                        each_literal(c, f);
                    }
                }
            }
        }
    }

    match &mut rule.head {
        Head::Disjunction(atoms) => {
            for a in atoms {
                a.arguments.iter_mut().for_each(&mut number);
            }
        }
        Head::Choice(choice) => {
            if let Some(l) = &mut choice.lower {
                number(l);
            }
            if let Some(u) = &mut choice.upper {
                number(u);
            }
            for e in &mut choice.elements {
                e.atom.arguments.iter_mut().for_each(&mut number);
                for c in &mut e.condition {
                    each_literal(c, &mut number);
                }
            }
        }
    }
    for l in &mut rule.body {
        each_literal(l, &mut number);
    }
}

#[cfg(test)]
mod test {
    use crate::*;

    use super::super::lexer::AspCore2Lexer;

    /// Lex and parse a whole program.
    fn parse(input: &str) -> Program<Term> {
        let (rest, tokens) = AspCore2Lexer::lex(input).expect("lexing failed");
        assert_eq!(rest, "", "unconsumed input");
        let (rest, program) =
            AspCore2Parser::parse(Tokens::new(&tokens[..])).expect("parsing failed");
        assert!(rest.is_empty(), "unconsumed tokens");
        program
    }

    #[test]
    fn facts() {
        let program = parse("p(1). p(2).");
        assert_eq!(program.rules(), [fact!(p(1)), fact!(p(2))]);
    }

    #[test]
    fn zero_ary() {
        let program = parse("a. b :- a.");
        assert_eq!(program.rules(), [fact!(a), rule!([atom!(b)], [pos!(a)])]);
    }

    #[test]
    fn simple_rule() {
        let program = parse("q(X) :- p(X).");
        assert_eq!(
            program.rules(),
            [rule!([atom!(q(var!(X)))], [pos!(p(var!(X)))])]
        );
    }

    #[test]
    fn negation() {
        let program = parse("r(X) :- p(X), not q(X).");
        assert_eq!(
            program.rules(),
            [rule!(
                [atom!(r(var!(X)))],
                [pos!(p(var!(X))), neg!(q(var!(X)))]
            )]
        );
    }

    #[test]
    fn constraint() {
        let program = parse(":- p(X), X > 3.");
        assert_eq!(
            program.rules(),
            [constraint!([pos!(p(var!(X))), rel!(var!(X), Gt, 3)])]
        );
    }

    #[test]
    fn disjunctive_head() {
        let program = parse("a | b :- c.");
        assert_eq!(program.rules(), [rule!([atom!(a), atom!(b)], [pos!(c)])]);
    }

    #[test]
    fn arithmetic_precedence() {
        let program = parse(":- p(X), X = 1 + 2 * 3.");
        assert_eq!(
            program.rules(),
            [constraint!([
                pos!(p(var!(X))),
                rel!(var!(X), Eq, binary!(1, Add, binary!(2, Mul, 3)))
            ])]
        );
    }

    #[test]
    fn left_associativity() {
        let program = parse(":- q(X), X = 1 - 2 - 3.");
        assert_eq!(
            program.rules(),
            [constraint!([
                pos!(q(var!(X))),
                rel!(var!(X), Eq, binary!(binary!(1, Sub, 2), Sub, 3))
            ])]
        );
    }

    #[test]
    fn function_terms() {
        let program = parse("p(f(X, g(1))) :- q(X).");
        assert_eq!(
            program.rules(),
            [rule!(
                [atom!(p(fun!(f(var!(X), fun!(g(1))))))],
                [pos!(q(var!(X)))]
            )]
        );
    }

    #[test]
    fn tuple_terms() {
        let program = parse("p((1, 2)) :- q((1, 2)).");
        let tuple = Term::Tuple(vec![1.into(), 2.into()]);
        assert_eq!(
            program.rules(),
            [rule!(
                [Atom::new(sym!(p), [tuple.clone()])],
                [Literal::Positive(Atom::new(sym!(q), [tuple]))]
            )]
        );
    }

    #[test]
    fn choice_rule() {
        let program = parse("1 { q(X, 0); q(X, 1) } :- n(X).");
        let choice = Choice::new(
            Some(Term::from(1)),
            None,
            [
                ChoiceElement::new(atom!(q(var!(X), 0)), []),
                ChoiceElement::new(atom!(q(var!(X), 1)), []),
            ],
        );
        assert_eq!(
            program.rules(),
            [Rule::new(Head::Choice(choice), [pos!(n(var!(X)))])]
        );
    }

    #[test]
    fn choice_with_condition() {
        let program = parse("{ in(X) : node(X) } 2.");
        let choice = Choice::new(
            None,
            Some(Term::from(2)),
            [ChoiceElement::new(
                atom!(in(var!(X))),
                [pos!(node(var!(X)))],
            )],
        );
        assert_eq!(program.rules(), [Rule::new(Head::Choice(choice), [])]);
    }

    #[test]
    fn aggregate_literal() {
        let program = parse("big(X) :- n(X), 2 <= #count { Y : e(X, Y) }.");
        let agg = Aggregate::new(
            AggrFunc::Count,
            Some(Guard::new(RelOp::Leq, Term::from(2))),
            None,
            [AggregateElement::new(
                [var!(Y)],
                [pos!(e(var!(X), var!(Y)))],
            )],
        );
        assert_eq!(
            program.rules(),
            [rule!(
                [atom!(big(var!(X)))],
                [pos!(n(var!(X))), Literal::Aggregate(agg)]
            )]
        );
    }

    #[test]
    fn anonymous_variables() {
        let program = parse("p :- q(_, _).");
        assert_eq!(
            program.rules(),
            [rule!(
                [atom!(p)],
                [Literal::Positive(Atom::new(
                    sym!(q),
                    [Term::Anonymous(0), Term::Anonymous(1)]
                ))]
            )]
        );
    }

    #[test]
    fn directives() {
        let program = parse("#show p/1. p(1).");
        assert_eq!(program.rules(), [fact!(p(1))]);
        assert_eq!(
            program.directives(),
            [Directive(String::from("#show p/1."))]
        );
    }

    #[test]
    fn display_round_trip() {
        let text = "p(1).\np(2).\nq(X) :- p(X), not r(X).\n";
        let program = parse(text);
        assert_eq!(parse(&program.to_string()), program);
    }
}
