//! Check that all global variables in a rule are _safe_, i.e.,
//! range-restricted by a positive body literal (possibly through
//! a chain of `=` built-ins). Local variables of an aggregate or
//! choice element may instead be bound by the element's own
//! positive condition literals.
//!
//! This is totally unrelated to Rust's `unsafe` keyword.

use rondo_syntax::*;

use crate::collect::{ContainsAnonymous, Variables};
use crate::{GroundingError, Names};

pub(crate) fn check_rule(rule: &Rule<Term>) -> Result<(), GroundingError> {
    let bound = positive_vars(&rule.body);
    let mut unsafe_vars = Names::new();
    let mut anonymous_misuse = false;

    // Body literals other than positive ones must be fully bound.
    for literal in &rule.body {
        match literal {
            Literal::Positive(_) => {}
            Literal::Negative(atom) => {
                collect_unbound(&atom.variables(), &bound, &mut unsafe_vars);
                anonymous_misuse |= atom.contains_anonymous();
            }
            Literal::Relation(x, _, y) => {
                collect_unbound(&x.variables(), &bound, &mut unsafe_vars);
                collect_unbound(&y.variables(), &bound, &mut unsafe_vars);
                anonymous_misuse |= x.contains_anonymous() || y.contains_anonymous();
            }
            Literal::Aggregate(agg) => {
                for guard in agg.left.iter().chain(agg.right.iter()) {
                    collect_unbound(&guard.term.variables(), &bound, &mut unsafe_vars);
                    anonymous_misuse |= guard.term.contains_anonymous();
                }
                for element in &agg.elements {
                    let local = element_vars(&bound, &element.condition);
                    for term in &element.terms {
                        collect_unbound(&term.variables(), &local, &mut unsafe_vars);
                        anonymous_misuse |= term.contains_anonymous();
                    }
                    check_condition(
                        &element.condition,
                        &local,
                        &mut unsafe_vars,
                        &mut anonymous_misuse,
                    );
                }
            }
        }
    }

    // Head variables must be bound by the body.
    match &rule.head {
        Head::Disjunction(atoms) => {
            for atom in atoms {
                collect_unbound(&atom.variables(), &bound, &mut unsafe_vars);
                anonymous_misuse |= atom.contains_anonymous();
            }
        }
        Head::Choice(choice) => {
            for b in choice.lower.iter().chain(choice.upper.iter()) {
                collect_unbound(&b.variables(), &bound, &mut unsafe_vars);
                anonymous_misuse |= b.contains_anonymous();
            }
            for element in &choice.elements {
                let local = element_vars(&bound, &element.condition);
                collect_unbound(&element.atom.variables(), &local, &mut unsafe_vars);
                anonymous_misuse |= element.atom.contains_anonymous();
                check_condition(
                    &element.condition,
                    &local,
                    &mut unsafe_vars,
                    &mut anonymous_misuse,
                );
            }
        }
    }

    if unsafe_vars.is_empty() && !anonymous_misuse {
        Ok(())
    } else {
        if anonymous_misuse {
            unsafe_vars.insert(Symbol::from("_"));
        }
        Err(GroundingError::UnsafeRule {
            rule: rule.to_string(),
            variables: unsafe_vars.into_iter().collect(),
        })
    }
}

/// The variables bound by the positive non-aggregate literals of a
/// body, extended to a fixed point over chained `=` built-ins: an
/// equality binds a variable on one side once the other side is
/// fully bound.
fn positive_vars(body: &[Literal<Term>]) -> Names {
    let mut bound = Names::new();
    for literal in body {
        if let Literal::Positive(atom) = literal {
            bound.extend(atom.variables());
        }
    }
    loop {
        let mut grew = false;
        for literal in body {
            if let Literal::Relation(x, RelOp::Eq, y) = literal {
                grew |= equality_binds(x, y, &mut bound);
                grew |= equality_binds(y, x, &mut bound);
            }
        }
        if !grew {
            break bound;
        }
    }
}

/// `v = t` (or `t = v`) binds `v` when every variable of `t` is
/// already bound.
fn equality_binds(var_side: &Term, term_side: &Term, bound: &mut Names) -> bool {
    if let Term::Variable(v) = var_side {
        if !bound.contains(v) && term_side.variables().is_subset(bound) {
            bound.insert(v.clone());
            return true;
        }
    }
    false
}

/// The variables available inside an element: the globally bound
/// ones plus the element's own positive condition literals.
fn element_vars(bound: &Names, condition: &[Literal<Term>]) -> Names {
    let mut local = bound.clone();
    for literal in condition {
        if let Literal::Positive(atom) = literal {
            local.extend(atom.variables());
        }
    }
    local
}

/// Condition literals follow the same discipline as the body, with
/// the element-local bound set.
fn check_condition(
    condition: &[Literal<Term>],
    local: &Names,
    unsafe_vars: &mut Names,
    anonymous_misuse: &mut bool,
) {
    for literal in condition {
        match literal {
            Literal::Positive(_) => {}
            Literal::Negative(atom) => {
                collect_unbound(&atom.variables(), local, unsafe_vars);
                *anonymous_misuse |= atom.contains_anonymous();
            }
            Literal::Relation(x, _, y) => {
                collect_unbound(&x.variables(), local, unsafe_vars);
                collect_unbound(&y.variables(), local, unsafe_vars);
                *anonymous_misuse |= x.contains_anonymous() || y.contains_anonymous();
            }
            Literal::Aggregate(_) => {
                // Nested aggregates have no ASP-Core-2 reading;
                // their variables must all be bound from outside.
                collect_unbound(&literal.variables(), local, unsafe_vars);
            }
        }
    }
}

fn collect_unbound(vars: &Names, bound: &Names, unsafe_vars: &mut Names) {
    for v in vars {
        if !bound.contains(v) {
            unsafe_vars.insert(v.clone());
        }
    }
}
