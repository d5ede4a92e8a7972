//! Collectors of variable names, implemented as
//! [visitors](Visit).

use rondo_syntax::*;

use crate::Names;

/// Collect the names of all (non-anonymous) variables occurring
/// in an element.
pub trait Variables {
    fn variables(&self) -> Names;
}

#[derive(Default)]
struct VariableCollector(Names);

impl<'a> Visit<'a> for VariableCollector {
    fn visit_variable(&mut self, v: &'a Symbol) {
        self.0.insert(v.clone());
    }
}

impl Variables for Term {
    fn variables(&self) -> Names {
        let mut collector = VariableCollector::default();
        collector.visit_term(self);
        collector.0
    }
}

impl Variables for Atom<Term> {
    fn variables(&self) -> Names {
        let mut collector = VariableCollector::default();
        collector.visit_atom(self);
        collector.0
    }
}

impl Variables for Literal<Term> {
    fn variables(&self) -> Names {
        let mut collector = VariableCollector::default();
        collector.visit_literal(self);
        collector.0
    }
}

impl Variables for Rule<Term> {
    fn variables(&self) -> Names {
        let mut collector = VariableCollector::default();
        collector.visit_rule(self);
        collector.0
    }
}

impl Variables for [Literal<Term>] {
    fn variables(&self) -> Names {
        let mut collector = VariableCollector::default();
        for l in self {
            collector.visit_literal(l);
        }
        collector.0
    }
}

/// Search for an anonymous variable.
pub trait ContainsAnonymous {
    fn contains_anonymous(&self) -> bool;
}

#[derive(Default)]
struct AnonymousFinder(bool);

impl<'a> Visit<'a> for AnonymousFinder {
    fn visit_anonymous(&mut self, _id: usize) {
        self.0 = true;
    }
}

impl ContainsAnonymous for Term {
    fn contains_anonymous(&self) -> bool {
        let mut finder = AnonymousFinder::default();
        finder.visit_term(self);
        finder.0
    }
}

impl ContainsAnonymous for Atom<Term> {
    fn contains_anonymous(&self) -> bool {
        let mut finder = AnonymousFinder::default();
        finder.visit_atom(self);
        finder.0
    }
}

impl ContainsAnonymous for Literal<Term> {
    fn contains_anonymous(&self) -> bool {
        let mut finder = AnonymousFinder::default();
        finder.visit_literal(self);
        finder.0
    }
}

#[cfg(test)]
mod test {
    use rondo_syntax::*;

    use super::*;

    #[test]
    fn variables_of_a_rule() {
        let rule: Rule<Term> = rule!(
            [atom!(r(var!(X)))],
            [pos!(p(var!(X), var!(Y))), rel!(var!(Y), Lt, var!(Z))]
        );
        assert_eq!(rule.variables(), ["X", "Y", "Z"].map(Symbol::from).into());
    }

    #[test]
    fn anonymous_variables_are_not_names() {
        let lit: Literal<Term> = Literal::Positive(Atom::new(
            sym!(p),
            [Term::Anonymous(0), var!(X)],
        ));
        assert_eq!(lit.variables(), [Symbol::from("X")].into());
        assert!(lit.contains_anonymous());
    }

    #[test]
    fn aggregate_variables() {
        let agg = Aggregate::new(
            AggrFunc::Count,
            Some(Guard::new(RelOp::Leq, var!(N))),
            None,
            [AggregateElement::new([var!(Y)], [pos!(e(var!(X), var!(Y)))])],
        );
        assert_eq!(
            Literal::Aggregate(agg).variables(),
            ["N", "X", "Y"].map(Symbol::from).into()
        );
    }
}
