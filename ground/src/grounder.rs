//! The grounding driver: check the program, order it into
//! components, and instantiate each component to a fixed point.

use std::collections::{BTreeMap, BTreeSet};

use rondo_syntax::{Head, Literal, Program, Rule, Term};
use rondo_tracer::{trace, Trace};

use crate::instantiate::{instantiate_rule, AtomBase};
use crate::{deps, safety, Bindings, GroundTerm, GroundingError, Predicate};

/// Ground a program: produce an equivalent variable-free program.
///
/// The output is deterministic: rules appear in component order,
/// then by source rule, then by substitution, with syntactically
/// identical rules deduplicated. Directives pass through untouched.
pub fn ground(
    program: Program<Term>,
    trace: Trace,
) -> Result<Program<GroundTerm>, GroundingError> {
    let (rules, directives) = program.into_parts();

    for rule in &rules {
        safety::check_rule(rule)?;
    }
    trace!(trace, Safety, "all {} rules are safe", rules.len());

    let arities = deps::arity_table(&rules)?;
    let components = deps::components(&rules, trace);
    trace!(
        trace,
        Deps,
        "{} predicates in {} components",
        arities.len(),
        components.order.len()
    );

    // Assign each rule to the earliest component defining one of
    // its head predicates. Constraints define nothing and run once
    // every derivation set is complete.
    let mut by_component: Vec<Vec<usize>> = vec![Vec::new(); components.order.len()];
    let mut constraints = Vec::new();
    for (i, rule) in rules.iter().enumerate() {
        let heads = deps::head_predicates(rule);
        match heads.iter().map(|p| components.index[p]).min() {
            None => constraints.push(i),
            Some(c) => by_component[c].push(i),
        }
    }

    let mut base = AtomBase::default();
    let mut seen = BTreeSet::new();
    let mut output = Vec::new();

    for (c, preds) in components.order.iter().enumerate() {
        let in_component: BTreeSet<Predicate> = preds.iter().cloned().collect();
        let mut emitted = BTreeMap::new();
        let mut deferred = Vec::new();
        loop {
            let mut grew = false;
            for &r in &by_component[c] {
                for (bindings, instance) in instantiate_rule(&base, &rules[r])? {
                    match &instance.head {
                        Head::Disjunction(atoms) => {
                            for atom in atoms {
                                let new = base.insert(atom.clone());
                                grew |= new && in_component.contains(&Predicate::of(atom));
                            }
                        }
                        // Choice atoms feed the derivation sets only
                        // once their own component is done.
                        Head::Choice(choice) => {
                            deferred.extend(choice.elements.iter().map(|e| e.atom.clone()));
                        }
                    }
                    emitted.insert(instance_key(r, &instance, bindings), instance);
                }
            }
            if !grew {
                break;
            }
        }
        for atom in deferred {
            base.insert(atom);
        }
        flush(emitted, &mut seen, &mut output, trace);
    }

    let mut emitted = BTreeMap::new();
    for &r in &constraints {
        for (bindings, instance) in instantiate_rule(&base, &rules[r])? {
            emitted.insert(instance_key(r, &instance, bindings), instance);
        }
    }
    flush(emitted, &mut seen, &mut output, trace);

    Ok(Program::new(output, directives))
}

/// The identity of a rule instance across fixed-point passes: the
/// source rule, the matched positive body atoms, and the bindings.
/// Aggregate literals and choice elements are deliberately left
/// out: their expansions grow between passes, and the final pass
/// must supersede the earlier ones.
type InstanceKey = (usize, Vec<Literal<GroundTerm>>, Bindings);

fn instance_key(r: usize, instance: &Rule<GroundTerm>, bindings: Bindings) -> InstanceKey {
    let positives = instance
        .body
        .iter()
        .filter(|l| matches!(l, Literal::Positive(_)))
        .cloned()
        .collect();
    (r, positives, bindings)
}

fn flush(
    emitted: BTreeMap<InstanceKey, Rule<GroundTerm>>,
    seen: &mut BTreeSet<Rule<GroundTerm>>,
    output: &mut Vec<Rule<GroundTerm>>,
    trace: Trace,
) {
    for (_, rule) in emitted {
        if seen.insert(rule.clone()) {
            trace!(trace, Ground, "{}.", rule);
            output.push(rule);
        }
    }
}

#[cfg(test)]
mod test {
    use rondo_syntax::*;

    use super::*;

    fn ground_rules(rules: Vec<Rule<Term>>) -> Vec<String> {
        ground(Program::new(rules, []), Trace::none())
            .expect("grounding failed")
            .iter()
            .map(|r| r.to_string())
            .collect()
    }

    #[test]
    fn transitive_closure() {
        let rules = vec![
            fact!(e(1, 2)),
            fact!(e(2, 3)),
            rule!(
                [atom!(t(var!(X), var!(Y)))],
                [pos!(e(var!(X), var!(Y)))]
            ),
            rule!(
                [atom!(t(var!(X), var!(Z)))],
                [pos!(t(var!(X), var!(Y))), pos!(e(var!(Y), var!(Z)))]
            ),
        ];
        assert_eq!(
            ground_rules(rules),
            [
                "e(1, 2)",
                "e(2, 3)",
                "t(1, 2) :- e(1, 2)",
                "t(2, 3) :- e(2, 3)",
                "t(1, 3) :- t(1, 2), e(2, 3)",
            ]
        );
    }

    #[test]
    fn undefined_predicates_never_match() {
        let rules = vec![
            fact!(p(1)),
            rule!([atom!(q(var!(X)))], [pos!(p(var!(X))), pos!(ghost(var!(X)))]),
        ];
        assert_eq!(ground_rules(rules), ["p(1)"]);
    }

    #[test]
    fn safety_error_reports_the_rule() {
        let rules = vec![rule!([atom!(q(var!(X)))], [pos!(p(var!(Y)))])];
        match ground(Program::new(rules, []), Trace::none()) {
            Err(GroundingError::UnsafeRule { rule, variables }) => {
                assert_eq!(rule, "q(X) :- p(Y)");
                assert_eq!(variables, [sym!(X)]);
            }
            other => panic!("expected a safety error, got {other:?}"),
        }
    }

    #[test]
    fn arity_error_aborts() {
        let rules = vec![fact!(p(1)), fact!(p(1, 2))];
        assert!(matches!(
            ground(Program::new(rules, []), Trace::none()),
            Err(GroundingError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn choice_atoms_feed_later_components() {
        let rules = vec![
            fact!(n(1)),
            Rule::new(
                Head::Choice(Choice::new(
                    None,
                    None,
                    [ChoiceElement::new(atom!(q(var!(X))), [])],
                )),
                [pos!(n(var!(X)))],
            ),
            rule!([atom!(r(var!(X)))], [pos!(q(var!(X)))]),
        ];
        assert_eq!(
            ground_rules(rules),
            ["n(1)", "{ q(1) } :- n(1)", "r(1) :- q(1)"]
        );
    }

    #[test]
    fn directives_pass_through() {
        let program = Program::new(
            vec![fact!(p(1))],
            [Directive(String::from("#show p/1."))],
        );
        let ground = ground(program, Trace::none()).expect("grounding failed");
        assert_eq!(ground.directives(), [Directive(String::from("#show p/1."))]);
    }

    #[test]
    fn duplicate_instances_emit_once() {
        let rules = vec![
            fact!(p(1)),
            rule!([atom!(q(var!(X)))], [pos!(p(var!(X)))]),
            rule!([atom!(q(var!(X)))], [pos!(p(var!(X)))]),
        ];
        assert_eq!(ground_rules(rules), ["p(1)", "q(1) :- p(1)"]);
    }
}
