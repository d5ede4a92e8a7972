//! Instantiate a rule against the current derivation sets:
//! enumerate every substitution that satisfies the body, by a
//! backtracking join over the positive literals with built-ins
//! pushed down, aggregates expanded once their outside variables
//! are bound, and negative literals checked last.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use rondo_syntax::{
    Aggregate, AggregateElement, Atom, Choice, ChoiceElement, Head, Literal, RelOp, Rule, Symbol,
    Term,
};

use crate::collect::Variables;
use crate::matcher::{match_atom, Binder};
use crate::{
    reduce, Bindings, Discard, Groundable as _, GroundTerm, GroundingError, Names, Predicate,
};

/// The ground atoms derived so far, per predicate: the derivation
/// sets. Sets grow monotonically while a component is instantiated
/// and are frozen when it completes.
#[derive(Clone, Debug, Default)]
pub(crate) struct AtomBase {
    sets: BTreeMap<Predicate, BTreeSet<Vec<GroundTerm>>>,
}

impl AtomBase {
    pub fn contains(&self, atom: &Atom<GroundTerm>) -> bool {
        self.sets
            .get(&Predicate::of(atom))
            .is_some_and(|s| s.contains(&atom.arguments))
    }

    /// Record a derived atom; true if the set grew.
    pub fn insert(&mut self, atom: Atom<GroundTerm>) -> bool {
        self.sets
            .entry(Predicate::of(&atom))
            .or_default()
            .insert(atom.arguments)
    }

    /// The tuples derived for a predicate, in term order.
    /// A predicate never derived (EDB or undefined) has none.
    pub fn tuples(&self, p: &Predicate) -> impl Iterator<Item = &Vec<GroundTerm>> {
        self.sets.get(p).into_iter().flatten()
    }

    pub fn len_of(&self, p: &Predicate) -> usize {
        self.sets.get(p).map_or(0, |s| s.len())
    }
}

/// One satisfying substitution for a body: the bindings of its
/// global variables and the fully ground body literals, in their
/// original order.
pub(crate) struct Solution {
    pub bindings: Bindings,
    pub body: Vec<Literal<GroundTerm>>,
}

/// Enumerate every substitution extending `seed` that satisfies
/// `body` against the derivation sets in `base`.
pub(crate) fn solve(
    base: &AtomBase,
    body: &[Literal<Term>],
    seed: &Bindings,
) -> Result<Vec<Solution>, GroundingError> {
    let bound = seed.keys().cloned().collect();
    let mut search = Search {
        base,
        order: matching_order(body, bound, base),
        slots: vec![None; body.len()],
        solutions: Vec::new(),
    };
    let mut binder = Binder::seeded(seed.clone());
    search.step(0, &mut binder)?;
    Ok(search.solutions)
}

/// Produce all ground instances of a rule, paired with the
/// substitution that produced each.
pub(crate) fn instantiate_rule(
    base: &AtomBase,
    rule: &Rule<Term>,
) -> Result<Vec<(Bindings, Rule<GroundTerm>)>, GroundingError> {
    let mut instances = Vec::new();
    for solution in solve(base, &rule.body, &Bindings::new())? {
        let head = match &rule.head {
            Head::Disjunction(atoms) => {
                match ground_atoms(atoms, &solution.bindings)? {
                    // Arithmetic failed somewhere in the head:
                    // the whole candidate is discarded.
                    None => continue,
                    Some(atoms) => Head::Disjunction(atoms),
                }
            }
            Head::Choice(choice) => match ground_choice(base, choice, &solution.bindings)? {
                None => continue,
                Some(choice) => Head::Choice(choice),
            },
        };
        instances.push((solution.bindings, Rule::new(head, solution.body)));
    }
    Ok(instances)
}

fn ground_atoms(
    atoms: &[Atom<Term>],
    bindings: &Bindings,
) -> Result<Option<Vec<Atom<GroundTerm>>>, GroundingError> {
    let mut ground = Vec::with_capacity(atoms.len());
    for atom in atoms {
        match reduce(atom.ground_with(bindings))? {
            None => return Ok(None),
            Some(atom) => ground.push(atom),
        }
    }
    Ok(Some(ground))
}

/// Instantiate a choice head: bounds are evaluated under the
/// rule's substitution, and every element is expanded by solving
/// its condition just like a rule body.
fn ground_choice(
    base: &AtomBase,
    choice: &Choice<Term>,
    bindings: &Bindings,
) -> Result<Option<Choice<GroundTerm>>, GroundingError> {
    let lower = match &choice.lower {
        None => None,
        Some(t) => match reduce(t.ground_with(bindings))? {
            None => return Ok(None),
            Some(g) => Some(g),
        },
    };
    let upper = match &choice.upper {
        None => None,
        Some(t) => match reduce(t.ground_with(bindings))? {
            None => return Ok(None),
            Some(g) => Some(g),
        },
    };
    let mut elements = BTreeSet::new();
    for element in &choice.elements {
        for sub in solve(base, &element.condition, bindings)? {
            match reduce(element.atom.ground_with(&sub.bindings))? {
                None => {}
                Some(atom) => {
                    elements.insert(ChoiceElement {
                        atom,
                        condition: sub.body,
                    });
                }
            }
        }
    }
    Ok(Some(Choice {
        lower,
        upper,
        elements: elements.into_iter().collect(),
    }))
}

/// One body literal in matching order, tagged with its original
/// body position so the emitted body keeps the source order.
#[derive(Clone, Copy)]
struct Ordered<'a> {
    index: usize,
    literal: &'a Literal<Term>,
}

struct Search<'a> {
    base: &'a AtomBase,
    order: Vec<Ordered<'a>>,
    slots: Vec<Option<Literal<GroundTerm>>>,
    solutions: Vec<Solution>,
}

impl<'a> Search<'a> {
    fn step(&mut self, depth: usize, binder: &mut Binder) -> Result<(), GroundingError> {
        if depth == self.order.len() {
            let body = self
                .slots
                .iter()
                .map(|s| {
                    s.clone().ok_or_else(|| {
                        GroundingError::Internal(String::from("body literal left unground"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.solutions.push(Solution {
                bindings: binder.bindings().clone(),
                body,
            });
            return Ok(());
        }
        let Ordered { index, literal } = self.order[depth];
        match literal {
            Literal::Positive(atom) => {
                let base = self.base;
                let pred = Predicate::of(atom);
                for tuple in base.tuples(&pred) {
                    let mark = binder.mark();
                    if match_atom(atom, tuple, binder) {
                        self.slots[index] = Some(Literal::Positive(Atom {
                            predicate: atom.predicate.clone(),
                            arguments: tuple.clone(),
                        }));
                        self.step(depth + 1, binder)?;
                    }
                    binder.undo(mark);
                }
                Ok(())
            }
            Literal::Negative(atom) => {
                match reduce(atom.ground_with(binder.bindings()))? {
                    None => {}
                    Some(ground) => {
                        // Absence from the derivation set: complete
                        // for earlier components, the set derived so
                        // far for the current one.
                        if !self.base.contains(&ground) {
                            self.slots[index] = Some(Literal::Negative(ground));
                            self.step(depth + 1, binder)?;
                        }
                    }
                }
                Ok(())
            }
            Literal::Relation(x, op, y) => self.relation(depth, index, x, *op, y, binder),
            Literal::Aggregate(agg) => {
                match self.expand_aggregate(agg, binder.bindings())? {
                    None => {}
                    Some(ground) => {
                        self.slots[index] = Some(Literal::Aggregate(ground));
                        self.step(depth + 1, binder)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn relation(
        &mut self,
        depth: usize,
        index: usize,
        x: &Term,
        op: RelOp,
        y: &Term,
        binder: &mut Binder,
    ) -> Result<(), GroundingError> {
        // An equality binds an as-yet-unbound variable on one side
        // once the other side denotes a value.
        if op == RelOp::Eq {
            for (var_side, term_side) in [(x, y), (y, x)] {
                if let Term::Variable(v) = var_side {
                    if binder.get(v).is_none() {
                        return match term_side.ground_with(binder.bindings()) {
                            Ok(value) => {
                                let mark = binder.mark();
                                binder.bind(v.clone(), value.clone());
                                self.slots[index] =
                                    Some(Literal::relation(value.clone(), RelOp::Eq, value));
                                self.step(depth + 1, binder)?;
                                binder.undo(mark);
                                Ok(())
                            }
                            Err(Discard::Arithmetic) => Ok(()),
                            Err(Discard::Unbound(u)) => Err(GroundingError::Internal(format!(
                                "relation on unbound variable {u}"
                            ))),
                        };
                    }
                }
            }
        }
        let gx = match reduce(x.ground_with(binder.bindings()))? {
            None => return Ok(()),
            Some(g) => g,
        };
        let gy = match reduce(y.ground_with(binder.bindings()))? {
            None => return Ok(()),
            Some(g) => g,
        };
        // Equality comparisons use the total term order; the strict
        // inequalities are numeric and fail on non-numbers.
        let holds = match op {
            RelOp::Eq | RelOp::Ne => op.eval(&gx, &gy),
            _ => gx.is_number() && gy.is_number() && op.eval(&gx, &gy),
        };
        if holds {
            self.slots[index] = Some(Literal::relation(gx, op, gy));
            self.step(depth + 1, binder)?;
        }
        Ok(())
    }

    /// Ground an aggregate under the current substitution: guards
    /// are evaluated, and every element's condition is solved to
    /// enumerate its ground instances. The aggregate's truth value
    /// is left to the solver, so expansion never fails the search.
    fn expand_aggregate(
        &self,
        agg: &Aggregate<Term>,
        bindings: &Bindings,
    ) -> Result<Option<Aggregate<GroundTerm>>, GroundingError> {
        let guard = |g: &Option<rondo_syntax::Guard<Term>>| match g {
            None => Ok(Some(None)),
            Some(g) => match reduce(g.ground_with(bindings))? {
                None => Ok(None),
                Some(g) => Ok(Some(Some(g))),
            },
        };
        let left = match guard(&agg.left)? {
            None => return Ok(None),
            Some(g) => g,
        };
        let right = match guard(&agg.right)? {
            None => return Ok(None),
            Some(g) => g,
        };
        let mut elements = BTreeSet::new();
        for element in &agg.elements {
            for sub in solve(self.base, &element.condition, bindings)? {
                let mut terms = Vec::with_capacity(element.terms.len());
                let mut whole = true;
                for t in &element.terms {
                    match reduce(t.ground_with(&sub.bindings))? {
                        None => {
                            whole = false;
                            break;
                        }
                        Some(g) => terms.push(g),
                    }
                }
                if whole {
                    elements.insert(AggregateElement {
                        terms,
                        condition: sub.body,
                    });
                }
            }
        }
        Ok(Some(Aggregate {
            function: agg.function,
            left,
            right,
            elements: elements.into_iter().collect(),
        }))
    }
}

/// Order the body literals for the join:
///
/// 1. positive literals, sequenced greedily to bind the most
///    still-unbound variables of the other literals (ties broken
///    by smaller derivation set, then source order);
/// 2. built-ins pushed down to the earliest point their variables
///    are bound (an equality may bind one side itself);
/// 3. aggregates once every outside variable is bound;
/// 4. negative literals last.
fn matching_order<'a>(body: &'a [Literal<Term>], mut bound: Names, base: &AtomBase) -> Vec<Ordered<'a>> {
    let vars: Vec<Names> = body.iter().map(|l| l.variables()).collect();
    let mut positives = Vec::new();
    let mut relations = Vec::new();
    let mut aggregates = Vec::new();
    let mut negatives = Vec::new();
    for (i, literal) in body.iter().enumerate() {
        match literal {
            Literal::Positive(_) => positives.push(i),
            Literal::Relation(..) => relations.push(i),
            Literal::Aggregate(_) => aggregates.push(i),
            Literal::Negative(_) => negatives.push(i),
        }
    }

    let mut order = Vec::with_capacity(body.len());
    flush_relations(body, &vars, &mut relations, &mut bound, &mut order);
    while !positives.is_empty() {
        let (k, _) = positives
            .iter()
            .enumerate()
            .map(|(k, &idx)| {
                let score = vars[idx]
                    .iter()
                    .filter(|v| {
                        !bound.contains(*v)
                            && body
                                .iter()
                                .enumerate()
                                .any(|(j, _)| j != idx && vars[j].contains(*v))
                    })
                    .count();
                let size = match &body[idx] {
                    Literal::Positive(atom) => base.len_of(&Predicate::of(atom)),
                    _ => unreachable!("positives only"),
                };
                (k, (Reverse(score), size, idx))
            })
            .min_by_key(|(_, key)| key.clone())
            .expect("nonempty positives");
        let idx = positives.remove(k);
        bound.extend(vars[idx].iter().cloned());
        order.push(Ordered {
            index: idx,
            literal: &body[idx],
        });
        flush_relations(body, &vars, &mut relations, &mut bound, &mut order);
    }
    for idx in aggregates.into_iter().chain(negatives).chain(relations) {
        order.push(Ordered {
            index: idx,
            literal: &body[idx],
        });
    }
    order
}

/// Append every relation whose variables are bound (or that an
/// equality can bind), repeating until none moves.
fn flush_relations<'a>(
    body: &'a [Literal<Term>],
    vars: &[Names],
    relations: &mut Vec<usize>,
    bound: &mut Names,
    order: &mut Vec<Ordered<'a>>,
) {
    loop {
        let mut flushed = false;
        let mut i = 0;
        while i < relations.len() {
            let idx = relations[i];
            match relation_ready(&body[idx], &vars[idx], bound) {
                None => i += 1,
                Some(binds) => {
                    if let Some(v) = binds {
                        bound.insert(v);
                    }
                    order.push(Ordered {
                        index: idx,
                        literal: &body[idx],
                    });
                    relations.remove(i);
                    flushed = true;
                }
            }
        }
        if !flushed {
            break;
        }
    }
}

/// Is this relation evaluable yet? `Some(None)` when all its
/// variables are bound; `Some(Some(v))` when it is an equality
/// that will bind `v`; `None` when it must wait.
fn relation_ready(
    literal: &Literal<Term>,
    vars: &Names,
    bound: &Names,
) -> Option<Option<Symbol>> {
    if vars.is_subset(bound) {
        return Some(None);
    }
    if let Literal::Relation(x, RelOp::Eq, y) = literal {
        for (var_side, term_side) in [(x, y), (y, x)] {
            if let Term::Variable(v) = var_side.as_ref() {
                if !bound.contains(v) && term_side.variables().is_subset(bound) {
                    return Some(Some(v.clone()));
                }
            }
        }
    }
    None
}
