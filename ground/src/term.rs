//! Ground version of [`rondo_syntax::Term`].
//!
//! Where the syntactic term may contain variables and unevaluated
//! arithmetic, a ground term is a fixed value: the type has no
//! variable or operation cases, so the grounder's output invariants
//! (no variables, no arithmetic) hold by construction.

use std::cmp::Ordering;
use std::fmt;

use rondo_syntax::Symbol;

/// Ground (variable-free) element that represents a fixed value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GroundTerm {
    Number(i64),
    Constant(Symbol),
    String(String),
    Function(Symbol, Vec<GroundTerm>),
    Tuple(Vec<GroundTerm>),
    Infimum,
    Supremum,
}

impl GroundTerm {
    pub fn function(name: Symbol, args: impl IntoIterator<Item = GroundTerm>) -> Self {
        Self::Function(name, args.into_iter().collect())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl From<i64> for GroundTerm {
    fn from(i: i64) -> Self {
        Self::Number(i)
    }
}

impl From<&str> for GroundTerm {
    fn from(s: &str) -> Self {
        Self::Constant(Symbol::from(s))
    }
}

/// The ASP-Core-2 total order on ground terms:
/// `#inf` < numbers < strings < constants and functions < `#sup`,
/// with numbers ordered numerically, strings lexicographically, and
/// functors by arity, then name, then arguments. A constant is a
/// functor of arity 0; a tuple is a functor with an empty name.
impl Ord for GroundTerm {
    fn cmp(&self, other: &Self) -> Ordering {
        use GroundTerm::*;
        match (self, other) {
            (Infimum, Infimum) => Ordering::Equal,
            (Infimum, _) => Ordering::Less,
            (_, Infimum) => Ordering::Greater,
            (Supremum, Supremum) => Ordering::Equal,
            (Supremum, _) => Ordering::Greater,
            (_, Supremum) => Ordering::Less,
            (Number(a), Number(b)) => a.cmp(b),
            (Number(_), _) => Ordering::Less,
            (_, Number(_)) => Ordering::Greater,
            (String(a), String(b)) => a.cmp(b),
            (String(_), _) => Ordering::Less,
            (_, String(_)) => Ordering::Greater,
            _ => {
                let (a_arity, a_name, a_args) = functor_parts(self);
                let (b_arity, b_name, b_args) = functor_parts(other);
                a_arity
                    .cmp(&b_arity)
                    .then_with(|| a_name.cmp(b_name))
                    .then_with(|| a_args.cmp(b_args))
            }
        }
    }
}

impl PartialOrd for GroundTerm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn functor_parts(t: &GroundTerm) -> (usize, &str, &[GroundTerm]) {
    match t {
        GroundTerm::Constant(s) => (0, s.name(), &[]),
        GroundTerm::Function(s, args) => (args.len(), s.name(), args),
        GroundTerm::Tuple(args) => (args.len(), "", args),
        _ => unreachable!("ordered against the other cases first"),
    }
}

impl fmt::Display for GroundTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GroundTerm::*;
        match self {
            Number(i) => f.write_fmt(format_args!("{i}")),
            Constant(s) => s.fmt(f),
            String(s) => f.write_fmt(format_args!("{s:?}")),
            Function(name, args) => f.write_fmt(format_args!("{name}({})", comma(args))),
            Tuple(args) => f.write_fmt(format_args!("({})", comma(args))),
            Infimum => f.write_str("#inf"),
            Supremum => f.write_str("#sup"),
        }
    }
}

fn comma(items: &[GroundTerm]) -> String {
    items
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use super::*;

    fn constant(name: &str) -> GroundTerm {
        GroundTerm::from(name)
    }

    fn string(s: &str) -> GroundTerm {
        GroundTerm::String(s.into())
    }

    #[test]
    fn total_order_ranks() {
        let f_a = GroundTerm::function("f".into(), [1.into()]);
        let terms = [
            GroundTerm::Infimum,
            (-3).into(),
            0.into(),
            7.into(),
            string("abc"),
            string("abd"),
            constant("a"),
            constant("b"),
            f_a,
            GroundTerm::Supremum,
        ];
        for window in terms.windows(2) {
            assert!(window[0] < window[1], "{} < {}", window[0], window[1]);
        }
    }

    #[test]
    fn functors_by_arity_then_name_then_args() {
        let f1 = GroundTerm::function("f".into(), [1.into()]);
        let f2 = GroundTerm::function("f".into(), [2.into()]);
        let g1 = GroundTerm::function("g".into(), [1.into()]);
        let f11 = GroundTerm::function("f".into(), [1.into(), 1.into()]);
        assert!(f1 < f2, "arguments break ties");
        assert!(f2 < g1, "name before arguments");
        assert!(g1 < f11, "arity before name");
        assert!(constant("z") < f1, "constants are 0-ary functors");
    }

    #[test]
    fn tuples_are_anonymous_functors() {
        let pair = GroundTerm::Tuple(vec![1.into(), 2.into()]);
        let f_pair = GroundTerm::function("f".into(), [1.into(), 2.into()]);
        assert!(pair < f_pair, "the empty name sorts first");
    }
}
