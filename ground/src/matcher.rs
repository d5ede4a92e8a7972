//! One-way matching of non-ground patterns against ground targets.
//!
//! Matching is not full unification: the target is always ground,
//! so there is no occurs check and bindings flow one way, from
//! target values into pattern variables.

use rondo_syntax::{Atom, Symbol, Term};

use crate::{Bindings, Groundable as _, GroundTerm};

/// The current substitution along a search path: a binding map
/// plus a trail of the names bound since each mark, so that
/// backtracking is O(bindings since the mark).
#[derive(Clone, Debug, Default)]
pub(crate) struct Binder {
    bindings: Bindings,
    trail: Vec<Symbol>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing bindings, e.g. the enclosing rule's
    /// substitution when grounding an aggregate element.
    pub fn seeded(bindings: Bindings) -> Self {
        Self {
            bindings,
            trail: Vec::new(),
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn get(&self, v: &Symbol) -> Option<&GroundTerm> {
        self.bindings.get(v)
    }

    /// Bind a variable that must currently be unbound.
    pub fn bind(&mut self, v: Symbol, t: GroundTerm) {
        let prior = self.bindings.insert(v.clone(), t);
        debug_assert!(prior.is_none(), "rebound {v}");
        self.trail.push(v);
    }

    /// A position in the trail to [`undo`](Self::undo) back to.
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Unbind everything bound since `mark`.
    pub fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let v = self.trail.pop().expect("trail underflow");
            self.bindings.remove(&v);
        }
    }
}

/// Match a pattern term against a ground target, extending the
/// binder with any new bindings. On failure the binder may hold
/// partial bindings; the caller undoes to its mark either way.
pub(crate) fn match_term(pattern: &Term, target: &GroundTerm, binder: &mut Binder) -> bool {
    match pattern {
        Term::Variable(v) => match binder.get(v) {
            Some(prior) => prior == target,
            None => {
                binder.bind(v.clone(), target.clone());
                true
            }
        },
        Term::Anonymous(_) => true,
        Term::Number(i) => matches!(target, GroundTerm::Number(j) if i == j),
        Term::Constant(s) => matches!(target, GroundTerm::Constant(c) if s == c),
        Term::String(s) => matches!(target, GroundTerm::String(t) if s == t),
        Term::Infimum => matches!(target, GroundTerm::Infimum),
        Term::Supremum => matches!(target, GroundTerm::Supremum),
        Term::Function(name, args) => match target {
            GroundTerm::Function(n, ts) if name == n && args.len() == ts.len() => args
                .iter()
                .zip(ts.iter())
                .all(|(arg, t)| match_term(arg, t, binder)),
            _ => false,
        },
        Term::Tuple(args) => match target {
            GroundTerm::Tuple(ts) if args.len() == ts.len() => args
                .iter()
                .zip(ts.iter())
                .all(|(arg, t)| match_term(arg, t, binder)),
            _ => false,
        },
        // An arithmetic pattern matches when it evaluates, under
        // the bindings accumulated so far, to exactly the target.
        Term::UnaryOperation(..) | Term::BinaryOperation(..) => {
            match pattern.ground_with(binder.bindings()) {
                Ok(value) => value == *target,
                Err(_) => false,
            }
        }
    }
}

/// Match a pattern atom's arguments against a ground tuple.
pub(crate) fn match_atom(pattern: &Atom<Term>, tuple: &[GroundTerm], binder: &mut Binder) -> bool {
    pattern.arity() == tuple.len()
        && pattern
            .arguments
            .iter()
            .zip(tuple.iter())
            .all(|(arg, t)| match_term(arg, t, binder))
}

#[cfg(test)]
mod test {
    use rondo_syntax::*;

    use super::*;

    #[test]
    fn constants_match_themselves() {
        let mut binder = Binder::new();
        assert!(match_term(&Term::from(1), &1.into(), &mut binder));
        assert!(!match_term(&Term::from(1), &2.into(), &mut binder));
        assert!(match_term(&Term::from("a"), &"a".into(), &mut binder));
        assert!(!match_term(&Term::from("a"), &"b".into(), &mut binder));
        assert!(binder.bindings().is_empty());
    }

    #[test]
    fn variables_bind_and_then_must_agree() {
        let mut binder = Binder::new();
        assert!(match_term(&var!(X), &1.into(), &mut binder));
        assert_eq!(binder.get(&sym!(X)), Some(&GroundTerm::Number(1)));
        assert!(match_term(&var!(X), &1.into(), &mut binder));
        assert!(!match_term(&var!(X), &2.into(), &mut binder));
    }

    #[test]
    fn anonymous_matches_without_binding() {
        let mut binder = Binder::new();
        assert!(match_term(&Term::Anonymous(0), &1.into(), &mut binder));
        assert!(match_term(&Term::Anonymous(0), &"a".into(), &mut binder));
        assert!(binder.bindings().is_empty());
    }

    #[test]
    fn functions_match_pointwise() {
        let mut binder = Binder::new();
        let target = GroundTerm::function(sym!(f), [1.into(), "a".into()]);
        assert!(match_term(&fun!(f(var!(X), var!(Y))), &target, &mut binder));
        assert_eq!(binder.get(&sym!(X)), Some(&GroundTerm::Number(1)));
        assert_eq!(binder.get(&sym!(Y)), Some(&GroundTerm::from("a")));
        assert!(!match_term(&fun!(g(var!(X))), &target, &mut binder), "name");
        assert!(!match_term(&fun!(f(var!(X))), &target, &mut binder), "arity");
    }

    #[test]
    fn repeated_variables_constrain() {
        let mut binder = Binder::new();
        let same = GroundTerm::Tuple(vec![1.into(), 1.into()]);
        let diff = GroundTerm::Tuple(vec![1.into(), 2.into()]);
        assert!(match_term(
            &Term::Tuple(vec![var!(X), var!(X)]),
            &same,
            &mut binder
        ));
        binder.undo(0);
        assert!(!match_term(
            &Term::Tuple(vec![var!(X), var!(X)]),
            &diff,
            &mut binder
        ));
    }

    #[test]
    fn arithmetic_patterns_evaluate() {
        let mut binder = Binder::new();
        binder.bind(sym!(X), 2.into());
        assert!(match_term(&binary!(var!(X), Add, 1), &3.into(), &mut binder));
        assert!(!match_term(&binary!(var!(X), Add, 1), &4.into(), &mut binder));
        assert!(
            !match_term(&binary!(var!(Y), Add, 1), &3.into(), &mut binder),
            "unbound operand"
        );
    }

    #[test]
    fn undo_restores_the_mark() {
        let mut binder = Binder::new();
        binder.bind(sym!(X), 1.into());
        let mark = binder.mark();
        assert!(match_atom(
            &atom!(p(var!(X), var!(Y))),
            &[1.into(), 2.into()],
            &mut binder
        ));
        assert!(binder.get(&sym!(Y)).is_some());
        binder.undo(mark);
        assert!(binder.get(&sym!(Y)).is_none());
        assert!(binder.get(&sym!(X)).is_some());
    }
}
