//! Predicate dependency analysis: the labeled dependency graph,
//! its strongly connected components, and the component order in
//! which the grounder instantiates the program.

use std::collections::BTreeMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use rondo_syntax::{Head, Literal, Rule, Symbol, Term};
use rondo_tracer::{trace, Trace};

use crate::{GroundingError, Predicate};

/// How a body predicate occurrence supports a head: through a
/// plain positive literal, or through negation or an aggregate
/// (where support is non-monotone).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Polarity {
    Positive,
    Negative,
}

/// The strongly connected components of the dependency graph, in
/// topological order: every predicate a component depends on lies
/// in an earlier component or the component itself.
pub(crate) struct Components {
    pub order: Vec<Vec<Predicate>>,
    pub index: BTreeMap<Predicate, usize>,
}

/// Check that every use of a predicate name has the same arity.
pub(crate) fn arity_table(rules: &[Rule<Term>]) -> Result<BTreeMap<Symbol, usize>, GroundingError> {
    let mut arities = BTreeMap::<Symbol, usize>::new();
    for rule in rules {
        for p in predicates_of(rule) {
            match arities.get(&p.name) {
                None => {
                    arities.insert(p.name, p.arity);
                }
                Some(&first) if first != p.arity => {
                    return Err(GroundingError::ArityMismatch {
                        name: p.name,
                        first,
                        second: p.arity,
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(arities)
}

/// Build the dependency graph and compute its components.
///
/// For each rule with head predicates H and body occurrences B,
/// there is an edge b → h for every b ∈ B, h ∈ H, labeled with the
/// occurrence's polarity. Condition literals of choice elements
/// count as body occurrences; anything under an aggregate counts
/// as negative. Non-stratified negation (a negative edge within a
/// component) is accepted and handled by the semi-naive
/// approximation; it is only reported on the trace.
pub(crate) fn components(rules: &[Rule<Term>], trace: Trace) -> Components {
    let mut graph = DiGraph::<Predicate, Polarity>::new();
    let mut nodes = BTreeMap::<Predicate, NodeIndex>::new();
    let mut node = |graph: &mut DiGraph<Predicate, Polarity>, p: Predicate| -> NodeIndex {
        *nodes
            .entry(p.clone())
            .or_insert_with(|| graph.add_node(p))
    };

    for rule in rules {
        let heads = head_predicates(rule);
        let mut body = Vec::new();
        for literal in &rule.body {
            occurrences(literal, Polarity::Positive, &mut body);
        }
        if let Head::Choice(choice) = &rule.head {
            for element in &choice.elements {
                for literal in &element.condition {
                    occurrences(literal, Polarity::Positive, &mut body);
                }
            }
        }
        for h in &heads {
            let h = node(&mut graph, h.clone());
            for (b, polarity) in &body {
                let b = node(&mut graph, b.clone());
                graph.add_edge(b, h, *polarity);
            }
        }
        // Register body-only (EDB) predicates even for constraints.
        for (b, _) in body {
            node(&mut graph, b);
        }
    }

    let mut sccs = tarjan_scc(&graph);
    // Tarjan yields reverse topological order; we want
    // dependencies first.
    sccs.reverse();

    let mut order = Vec::with_capacity(sccs.len());
    let mut index = BTreeMap::new();
    for (i, scc) in sccs.into_iter().enumerate() {
        let mut preds: Vec<Predicate> = scc.iter().map(|&n| graph[n].clone()).collect();
        preds.sort();
        for p in &preds {
            index.insert(p.clone(), i);
        }
        let recursive_negation = scc.iter().any(|&n| {
            graph
                .edges(n)
                .any(|e| *e.weight() == Polarity::Negative && scc.contains(&e.target()))
        });
        if recursive_negation {
            trace!(
                trace,
                Deps,
                "component {{{}}} has negation over recursion; deferring",
                preds
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        order.push(preds);
    }

    Components { order, index }
}

/// The predicates a rule's head defines.
pub(crate) fn head_predicates(rule: &Rule<Term>) -> Vec<Predicate> {
    match &rule.head {
        Head::Disjunction(atoms) => atoms.iter().map(Predicate::of).collect(),
        Head::Choice(choice) => choice
            .elements
            .iter()
            .map(|e| Predicate::of(&e.atom))
            .collect(),
    }
}

/// Flatten the predicate occurrences of one body literal. The
/// `context` polarity weakens to negative under `not` and inside
/// aggregates.
fn occurrences(literal: &Literal<Term>, context: Polarity, out: &mut Vec<(Predicate, Polarity)>) {
    match literal {
        Literal::Positive(atom) => out.push((Predicate::of(atom), context)),
        Literal::Negative(atom) => out.push((Predicate::of(atom), Polarity::Negative)),
        Literal::Relation(..) => {}
        Literal::Aggregate(agg) => {
            for element in &agg.elements {
                for l in &element.condition {
                    occurrences(l, Polarity::Negative, out);
                }
            }
        }
    }
}

/// All predicate uses in a rule, for the arity check.
fn predicates_of(rule: &Rule<Term>) -> Vec<Predicate> {
    let mut preds = head_predicates(rule);
    for literal in &rule.body {
        condition_predicates(literal, &mut preds);
    }
    if let Head::Choice(choice) = &rule.head {
        for element in &choice.elements {
            for l in &element.condition {
                condition_predicates(l, &mut preds);
            }
        }
    }
    preds
}

fn condition_predicates(literal: &Literal<Term>, out: &mut Vec<Predicate>) {
    match literal {
        Literal::Positive(atom) | Literal::Negative(atom) => out.push(Predicate::of(atom)),
        Literal::Relation(..) => {}
        Literal::Aggregate(agg) => {
            for element in &agg.elements {
                for l in &element.condition {
                    condition_predicates(l, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use rondo_syntax::*;

    use super::*;

    fn pred(name: &str, arity: usize) -> Predicate {
        Predicate {
            name: Symbol::from(name),
            arity,
        }
    }

    #[test]
    fn arity_mismatch() {
        let rules: Vec<Rule<Term>> = vec![fact!(p(1)), fact!(p(1, 2))];
        assert_eq!(
            arity_table(&rules),
            Err(GroundingError::ArityMismatch {
                name: sym!(p),
                first: 1,
                second: 2,
            })
        );
    }

    #[test]
    fn facts_before_rules() {
        let rules: Vec<Rule<Term>> = vec![
            rule!([atom!(q(var!(X)))], [pos!(p(var!(X)))]),
            fact!(p(1)),
        ];
        let c = components(&rules, Trace::none());
        assert_eq!(c.order, [vec![pred("p", 1)], vec![pred("q", 1)]]);
    }

    #[test]
    fn mutual_recursion_shares_a_component() {
        let rules: Vec<Rule<Term>> = vec![
            rule!([atom!(p(var!(X)))], [pos!(q(var!(X)))]),
            rule!([atom!(q(var!(X)))], [pos!(p(var!(X))), pos!(e(var!(X)))]),
        ];
        let c = components(&rules, Trace::none());
        assert_eq!(c.index[&pred("p", 1)], c.index[&pred("q", 1)]);
        assert!(c.index[&pred("e", 1)] < c.index[&pred("p", 1)]);
    }

    #[test]
    fn negation_orders_strata() {
        let rules: Vec<Rule<Term>> = vec![
            fact!(p(1)),
            fact!(q(1)),
            rule!([atom!(r(var!(X)))], [pos!(p(var!(X))), neg!(q(var!(X)))]),
        ];
        let c = components(&rules, Trace::none());
        assert!(c.index[&pred("q", 1)] < c.index[&pred("r", 1)]);
        assert!(c.index[&pred("p", 1)] < c.index[&pred("r", 1)]);
    }

    #[test]
    fn choice_conditions_are_dependencies() {
        let rules: Vec<Rule<Term>> = vec![
            fact!(node(1)),
            Rule::new(
                Head::Choice(Choice::new(
                    None,
                    None,
                    [ChoiceElement::new(
                        atom!(in(var!(X))),
                        [pos!(node(var!(X)))],
                    )],
                )),
                [],
            ),
        ];
        let c = components(&rules, Trace::none());
        assert!(c.index[&pred("node", 1)] < c.index[&pred("in", 1)]);
    }

    #[test]
    fn body_only_predicates_get_components() {
        let rules: Vec<Rule<Term>> = vec![rule!([atom!(q)], [pos!(edb(var!(X), var!(Y)))])];
        let c = components(&rules, Trace::none());
        assert!(c.index.contains_key(&pred("edb", 2)));
    }
}
