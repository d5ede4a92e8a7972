//! Syntactic elements of the ASP-Core-2 logic language.
//!
//! See the "ASP-Core-2 Input Language Format" (2012). The types here
//! are generic over the term representation, so that the grounder can
//! reuse the same rule structure with ground (variable-free) terms.

mod asp_core2;
mod lexer;
mod parser;
mod stream;
mod visit;

use std::fmt;

pub use asp_core2::{AspCore2Lexer, AspCore2Parser, AspToken};
pub use lexer::{Lex, Token};
pub use parser::Parse;
pub use stream::Tokens;
pub use visit::*;

/// Uninterpreted element that names itself, a predicate,
/// a function, or a variable.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relational operators: equal, not equal, less than, greater than,
/// less than or equal to, greater than or equal to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Leq,
    Geq,
}

impl RelOp {
    pub fn eval<T>(&self, x: T, y: T) -> bool
    where
        T: Eq + Ord,
    {
        use RelOp::*;
        match self {
            Eq => x == y,
            Ne => x != y,
            Lt => x < y,
            Gt => x > y,
            Leq => x <= y,
            Geq => x >= y,
        }
    }

    pub fn negate(self) -> Self {
        use RelOp::*;
        match self {
            Eq => Ne,
            Ne => Eq,
            Lt => Geq,
            Gt => Leq,
            Leq => Gt,
            Geq => Lt,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RelOp::*;
        f.write_str(match self {
            Eq => "=",
            Ne => "!=",
            Lt => "<",
            Gt => ">",
            Leq => "<=",
            Geq => ">=",
        })
    }
}

/// Unary (prefix) arithmetic operations. ASP-Core-2 has only
/// numeric negation.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum UnaryOp {
    Neg,
}

/// Binary (infix) arithmetic operations: addition, subtraction,
/// multiplication, integer division, and remainder.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinOp::*;
        f.write_str(match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "\\",
        })
    }
}

/// Interpreted element that represents either a fixed value
/// (number, string, symbolic constant, `#inf`, `#sup`, functions
/// and tuples over such), something else (a variable), or an
/// arithmetic operation applied to other terms.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    Number(i64),
    Constant(Symbol),
    String(String),
    Variable(Symbol),
    Anonymous(usize),
    UnaryOperation(UnaryOp, Box<Term>),
    BinaryOperation(Box<Term>, BinOp, Box<Term>),
    Function(Symbol, Vec<Term>),
    Tuple(Vec<Term>),
    Infimum,
    Supremum,
}

impl Term {
    /// Boxing constructor.
    pub fn unary_operation(op: UnaryOp, x: Term) -> Self {
        Self::UnaryOperation(op, Box::new(x))
    }

    /// Boxing constructor.
    pub fn binary_operation(x: Term, op: BinOp, y: Term) -> Self {
        Self::BinaryOperation(Box::new(x), op, Box::new(y))
    }

    pub fn function(name: Symbol, args: impl IntoIterator<Item = Term>) -> Self {
        Self::Function(name, args.into_iter().collect())
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Self::Number(i)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Self::Constant(Symbol::from(s))
    }
}

impl From<Symbol> for Term {
    fn from(s: Symbol) -> Self {
        Self::Constant(s)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Term::*;
        match self {
            Number(i) => f.write_fmt(format_args!("{i}")),
            Constant(s) => s.fmt(f),
            String(s) => f.write_fmt(format_args!("{s:?}")),
            Variable(s) => s.fmt(f),
            Anonymous(_) => f.write_str("_"),
            UnaryOperation(UnaryOp::Neg, x) => f.write_fmt(format_args!("-{x}")),
            BinaryOperation(x, op, y) => f.write_fmt(format_args!("({x} {op} {y})")),
            Function(name, args) => f.write_fmt(format_args!("{name}({})", comma(args))),
            Tuple(args) => f.write_fmt(format_args!("({})", comma(args))),
            Infimum => f.write_str("#inf"),
            Supremum => f.write_str("#sup"),
        }
    }
}

/// An _n_-ary predicate applied to a tuple of terms.
/// If _n_ = 0, the arguments are elided.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Atom<T> {
    pub predicate: Symbol,
    pub arguments: Vec<T>,
}

impl<T> Atom<T> {
    pub fn new(predicate: Symbol, arguments: impl IntoIterator<Item = T>) -> Self {
        Self {
            predicate,
            arguments: arguments.into_iter().collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

impl<T> fmt::Display for Atom<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments.is_empty() {
            self.predicate.fmt(f)
        } else {
            f.write_fmt(format_args!("{}({})", self.predicate, comma(&self.arguments)))
        }
    }
}

/// Aggregate functions over sets of ground term tuples.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AggrFunc {
    Count,
    Sum,
    Min,
    Max,
}

impl fmt::Display for AggrFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AggrFunc::*;
        f.write_str(match self {
            Count => "#count",
            Sum => "#sum",
            Min => "#min",
            Max => "#max",
        })
    }
}

/// One bound on an aggregate: a relational operator and a term.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Guard<T> {
    pub op: RelOp,
    pub term: T,
}

impl<T> Guard<T> {
    pub fn new(op: RelOp, term: T) -> Self {
        Self { op, term }
    }
}

/// One element of an aggregate: a term tuple qualified by
/// a conjunction of condition literals.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AggregateElement<T> {
    pub terms: Vec<T>,
    pub condition: Vec<Literal<T>>,
}

impl<T> AggregateElement<T> {
    pub fn new(
        terms: impl IntoIterator<Item = T>,
        condition: impl IntoIterator<Item = Literal<T>>,
    ) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            condition: condition.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for AggregateElement<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&comma(&self.terms))?;
        if !self.condition.is_empty() {
            f.write_fmt(format_args!(" : {}", comma(&self.condition)))?;
        }
        Ok(())
    }
}

/// An aggregate atom: a function applied to a set of elements,
/// bounded by up to two guards.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Aggregate<T> {
    pub function: AggrFunc,
    pub left: Option<Guard<T>>,
    pub right: Option<Guard<T>>,
    pub elements: Vec<AggregateElement<T>>,
}

impl<T> Aggregate<T> {
    pub fn new(
        function: AggrFunc,
        left: Option<Guard<T>>,
        right: Option<Guard<T>>,
        elements: impl IntoIterator<Item = AggregateElement<T>>,
    ) -> Self {
        Self {
            function,
            left,
            right,
            elements: elements.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for Aggregate<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(Guard { op, term }) = &self.left {
            f.write_fmt(format_args!("{term} {op} "))?;
        }
        f.write_fmt(format_args!("{} {{ {} }}", self.function, semi(&self.elements)))?;
        if let Some(Guard { op, term }) = &self.right {
            f.write_fmt(format_args!(" {op} {term}"))?;
        }
        Ok(())
    }
}

/// A predicate atom, its negation as failure, a relation between
/// two terms (a "built-in"), or an aggregate atom.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Literal<T> {
    Positive(Atom<T>),
    Negative(Atom<T>),
    Relation(Box<T>, RelOp, Box<T>),
    Aggregate(Aggregate<T>),
}

impl<T> Literal<T> {
    /// Boxing constructor.
    pub fn relation(x: T, rel: RelOp, y: T) -> Self {
        Self::Relation(Box::new(x), rel, Box::new(y))
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive(..))
    }
}

impl<T> fmt::Display for Literal<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Literal::*;
        match self {
            Positive(atom) => atom.fmt(f),
            Negative(atom) => f.write_fmt(format_args!("not {atom}")),
            Relation(x, rel, y) => f.write_fmt(format_args!("{x} {rel} {y}")),
            Aggregate(agg) => agg.fmt(f),
        }
    }
}

/// One element of a choice: an atom qualified by a conjunction
/// of condition literals.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ChoiceElement<T> {
    pub atom: Atom<T>,
    pub condition: Vec<Literal<T>>,
}

impl<T> ChoiceElement<T> {
    pub fn new(atom: Atom<T>, condition: impl IntoIterator<Item = Literal<T>>) -> Self {
        Self {
            atom,
            condition: condition.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for ChoiceElement<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.atom.fmt(f)?;
        if !self.condition.is_empty() {
            f.write_fmt(format_args!(" : {}", comma(&self.condition)))?;
        }
        Ok(())
    }
}

/// A choice over a set of atoms, with optional cardinality bounds.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Choice<T> {
    pub lower: Option<T>,
    pub upper: Option<T>,
    pub elements: Vec<ChoiceElement<T>>,
}

impl<T> Choice<T> {
    pub fn new(
        lower: Option<T>,
        upper: Option<T>,
        elements: impl IntoIterator<Item = ChoiceElement<T>>,
    ) -> Self {
        Self {
            lower,
            upper,
            elements: elements.into_iter().collect(),
        }
    }
}

impl<T> fmt::Display for Choice<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(lower) = &self.lower {
            f.write_fmt(format_args!("{lower} "))?;
        }
        f.write_fmt(format_args!("{{ {} }}", semi(&self.elements)))?;
        if let Some(upper) = &self.upper {
            f.write_fmt(format_args!(" {upper}"))?;
        }
        Ok(())
    }
}

/// The head of a rule: a (possibly empty) disjunction of atoms,
/// or a choice. An empty disjunction makes the rule an integrity
/// constraint.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Head<T> {
    Disjunction(Vec<Atom<T>>),
    Choice(Choice<T>),
}

impl<T> Head<T> {
    pub fn atom(atom: Atom<T>) -> Self {
        Self::Disjunction(vec![atom])
    }

    pub fn constraint() -> Self {
        Self::Disjunction(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Disjunction(atoms) if atoms.is_empty())
    }
}

impl<T> fmt::Display for Head<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disjunction(atoms) => f.write_str(
                &atoms
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
            Self::Choice(choice) => choice.fmt(f),
        }
    }
}

/// A rule: a head and a conjunctive body. A _fact_ has an empty
/// body; a _constraint_ has an empty head.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rule<T> {
    pub head: Head<T>,
    pub body: Vec<Literal<T>>,
}

impl<T> Rule<T> {
    pub fn new(head: Head<T>, body: impl IntoIterator<Item = Literal<T>>) -> Self {
        Self {
            head,
            body: body.into_iter().collect(),
        }
    }

    pub fn is_fact(&self) -> bool {
        self.body.is_empty() && !self.head.is_empty()
    }

    pub fn is_constraint(&self) -> bool {
        self.head.is_empty()
    }
}

impl<T> fmt::Display for Rule<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.head.is_empty(), self.body.is_empty()) {
            (true, _) => f.write_fmt(format_args!(":- {}", comma(&self.body))),
            (false, true) => self.head.fmt(f),
            (false, false) => {
                f.write_fmt(format_args!("{} :- {}", self.head, comma(&self.body)))
            }
        }
    }
}

/// A statement opaque to grounding, e.g. `#show p/2.`,
/// carried through verbatim.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Directive(pub String);

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered sequence of rules plus the directives that
/// accompanied them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Program<T> {
    rules: Vec<Rule<T>>,
    directives: Vec<Directive>,
}

impl<T> Program<T> {
    pub fn new(
        rules: impl IntoIterator<Item = Rule<T>>,
        directives: impl IntoIterator<Item = Directive>,
    ) -> Self {
        Self {
            rules: rules.into_iter().collect(),
            directives: directives.into_iter().collect(),
        }
    }

    pub fn rules(&self) -> &[Rule<T>] {
        self.rules.as_slice()
    }

    pub fn directives(&self) -> &[Directive] {
        self.directives.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule<T>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Rule<T>>, Vec<Directive>) {
        (self.rules, self.directives)
    }
}

impl<T> FromIterator<Rule<T>> for Program<T> {
    fn from_iter<I: IntoIterator<Item = Rule<T>>>(iter: I) -> Self {
        Self::new(iter, [])
    }
}

impl<T> fmt::Display for Program<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.directives {
            f.write_fmt(format_args!("{d}\n"))?;
        }
        for r in &self.rules {
            f.write_fmt(format_args!("{r}.\n"))?;
        }
        Ok(())
    }
}

fn comma<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn semi<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// These constructor macros make tests involving syntactic elements
/// (most of them) much more readable. They are *not* intended as a
/// public interface, and *should* be behind `#[cfg(test)]`, but cargo
/// can't currently export test code across crates.
mod macros {
    #[macro_export]
    macro_rules! sym {
        ($name: ident) => {
            Symbol::from(stringify!($name))
        };
    }

    #[macro_export]
    macro_rules! var {
        ($name: ident) => {
            Term::Variable(sym!($name))
        };
    }

    #[macro_export]
    macro_rules! fun {
        ($name: ident($($arg: expr),*)) => {
            Term::function(sym!($name), [$($arg.into()),*])
        };
    }

    #[macro_export]
    macro_rules! unary {
        ($op: ident, $e: expr) => {
            Term::unary_operation(UnaryOp::$op, $e.into())
        };
    }

    #[macro_export]
    macro_rules! binary {
        ($l: expr, $op: ident, $r: expr) => {
            Term::binary_operation($l.into(), BinOp::$op, $r.into())
        };
    }

    #[macro_export]
    macro_rules! atom {
        ($pred: ident) => {
            Atom::new(sym!($pred), [])
        };
        ($pred: ident($($arg: expr),*)) => {
            Atom::new(sym!($pred), [$($arg.into()),*])
        };
    }

    #[macro_export]
    macro_rules! pos {
        ($pred: ident $(($($args: tt)*))?) => {
            Literal::Positive(atom!($pred$(($($args)*))?))
        };
    }

    #[macro_export]
    macro_rules! neg {
        ($pred: ident $(($($args: tt)*))?) => {
            Literal::Negative(atom!($pred$(($($args)*))?))
        };
    }

    #[macro_export]
    macro_rules! rel {
        ($l: expr, $op: ident, $r: expr) => {
            Literal::relation($l.into(), RelOp::$op, $r.into())
        };
    }

    #[macro_export]
    macro_rules! rule {
        ([$($head: expr),* $(,)?]) => {
            Rule::new(Head::Disjunction(vec![$($head),*]), [])
        };
        ([$($head: expr),* $(,)?], [$($body: expr),* $(,)?]) => {
            Rule::new(Head::Disjunction(vec![$($head),*]), [$($body),*])
        };
    }

    #[macro_export]
    macro_rules! fact {
        ($pred: ident $(($($args: tt)*))?) => {
            rule!([atom!($pred$(($($args)*))?)])
        };
    }

    #[macro_export]
    macro_rules! constraint {
        ([$($body: expr),* $(,)?]) => {
            Rule::new(Head::constraint(), [$($body),*])
        };
    }
}
