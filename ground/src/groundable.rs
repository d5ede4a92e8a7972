//! A trait to describe elements that may be grounded.

use rondo_syntax::{Atom, BinOp, Guard, Symbol, Term, UnaryOp};

use crate::{Bindings, Discard, GroundTerm};

/// Syntactic elements that contain variables can be _grounded_:
/// variables are replaced by the values bound to them and all
/// arithmetic is reduced to numbers. This trait performs the
/// replacement for a particular set of [`Bindings`]; it does
/// _not_ attempt to describe how the bindings are chosen, which
/// is the instantiator's job.
pub trait Groundable {
    type Ground;

    /// Replace variables per `bindings` and reduce arithmetic,
    /// or report why the element does not denote a value.
    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Discard>;

    /// Convenience method: ground with an empty set of bindings.
    fn ground(&self) -> Result<Self::Ground, Discard> {
        self.ground_with(&Bindings::new())
    }
}

impl Groundable for Term {
    type Ground = GroundTerm;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Discard> {
        use Term::*;
        match self {
            Number(i) => Ok(GroundTerm::Number(*i)),
            Constant(s) => Ok(GroundTerm::Constant(s.clone())),
            String(s) => Ok(GroundTerm::String(s.clone())),
            Variable(v) => bindings
                .get(v)
                .cloned()
                .ok_or_else(|| Discard::Unbound(v.clone())),
            Anonymous(_) => Err(Discard::Unbound(Symbol::from("_"))),
            UnaryOperation(UnaryOp::Neg, x) => {
                let x = number(x.ground_with(bindings)?)?;
                x.checked_neg()
                    .map(GroundTerm::Number)
                    .ok_or(Discard::Arithmetic)
            }
            BinaryOperation(x, op, y) => {
                let x = number(x.ground_with(bindings)?)?;
                let y = number(y.ground_with(bindings)?)?;
                eval(*op, x, y).map(GroundTerm::Number)
            }
            Function(name, args) => Ok(GroundTerm::Function(
                name.clone(),
                args.iter()
                    .map(|arg| arg.ground_with(bindings))
                    .collect::<Result<_, _>>()?,
            )),
            Tuple(args) => Ok(GroundTerm::Tuple(
                args.iter()
                    .map(|arg| arg.ground_with(bindings))
                    .collect::<Result<_, _>>()?,
            )),
            Infimum => Ok(GroundTerm::Infimum),
            Supremum => Ok(GroundTerm::Supremum),
        }
    }
}

impl Groundable for Atom<Term> {
    type Ground = Atom<GroundTerm>;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Discard> {
        Ok(Atom {
            predicate: self.predicate.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|arg| arg.ground_with(bindings))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl Groundable for Guard<Term> {
    type Ground = Guard<GroundTerm>;

    fn ground_with(&self, bindings: &Bindings) -> Result<Self::Ground, Discard> {
        Ok(Guard {
            op: self.op,
            term: self.term.ground_with(bindings)?,
        })
    }
}

fn number(t: GroundTerm) -> Result<i64, Discard> {
    if let GroundTerm::Number(i) = t {
        Ok(i)
    } else {
        Err(Discard::Arithmetic)
    }
}

/// Exact integer arithmetic. Division and remainder fail when the
/// divisor is zero; overflow fails rather than wrapping.
fn eval(op: BinOp, x: i64, y: i64) -> Result<i64, Discard> {
    use BinOp::*;
    match op {
        Add => x.checked_add(y),
        Sub => x.checked_sub(y),
        Mul => x.checked_mul(y),
        Div => x.checked_div(y),
        Rem => x.checked_rem(y),
    }
    .ok_or(Discard::Arithmetic)
}
