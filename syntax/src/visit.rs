//! Walk a syntax tree, i.e., visit every sub-element.

use super::*;

/// Walk a shared borrow of a syntactic element.
///
/// We follow [the standard Rust visitor
/// pattern](https://rust-unofficial.github.io/patterns/patterns/behavioural/visitor.html).
/// The methods in this trait are hooks to be overridden.
/// By default, they all call out to walker functions that
/// in turn call back into the visitor to continue the walk.
pub trait Visit<'a> {
    fn visit_variable(&mut self, _v: &'a Symbol) {}
    fn visit_anonymous(&mut self, _id: usize) {}
    fn visit_constant(&mut self, _c: &'a Symbol) {}
    fn visit_number(&mut self, _n: i64) {}
    fn visit_string(&mut self, _s: &'a str) {}
    fn visit_predicate_name(&mut self, _p: &'a Symbol) {}
    fn visit_function_name(&mut self, _f: &'a Symbol) {}
    fn visit_term(&mut self, t: &'a Term) {
        visit_term(self, t)
    }
    fn visit_atom(&mut self, a: &'a Atom<Term>) {
        visit_atom(self, a)
    }
    fn visit_guard(&mut self, g: &'a Guard<Term>) {
        visit_guard(self, g)
    }
    fn visit_aggregate(&mut self, a: &'a Aggregate<Term>) {
        visit_aggregate(self, a)
    }
    fn visit_aggregate_element(&mut self, e: &'a AggregateElement<Term>) {
        visit_aggregate_element(self, e)
    }
    fn visit_literal(&mut self, l: &'a Literal<Term>) {
        visit_literal(self, l)
    }
    fn visit_choice(&mut self, c: &'a Choice<Term>) {
        visit_choice(self, c)
    }
    fn visit_choice_element(&mut self, e: &'a ChoiceElement<Term>) {
        visit_choice_element(self, e)
    }
    fn visit_head(&mut self, h: &'a Head<Term>) {
        visit_head(self, h)
    }
    fn visit_rule(&mut self, r: &'a Rule<Term>) {
        visit_rule(self, r)
    }
}

pub fn visit_term<'a, V: Visit<'a> + ?Sized>(v: &mut V, t: &'a Term) {
    match t {
        Term::Number(n) => v.visit_number(*n),
        Term::Constant(c) => v.visit_constant(c),
        Term::String(s) => v.visit_string(s),
        Term::Variable(s) => v.visit_variable(s),
        Term::Anonymous(id) => v.visit_anonymous(*id),
        Term::UnaryOperation(_op, x) => v.visit_term(x),
        Term::BinaryOperation(x, _op, y) => {
            v.visit_term(x);
            v.visit_term(y);
        }
        Term::Function(name, args) => {
            v.visit_function_name(name);
            for arg in args {
                v.visit_term(arg);
            }
        }
        Term::Tuple(args) => {
            for arg in args {
                v.visit_term(arg);
            }
        }
        Term::Infimum | Term::Supremum => {}
    }
}

pub fn visit_atom<'a, V: Visit<'a> + ?Sized>(v: &mut V, atom: &'a Atom<Term>) {
    v.visit_predicate_name(&atom.predicate);
    for arg in &atom.arguments {
        v.visit_term(arg);
    }
}

pub fn visit_guard<'a, V: Visit<'a> + ?Sized>(v: &mut V, guard: &'a Guard<Term>) {
    v.visit_term(&guard.term);
}

pub fn visit_aggregate<'a, V: Visit<'a> + ?Sized>(v: &mut V, aggregate: &'a Aggregate<Term>) {
    if let Some(g) = &aggregate.left {
        v.visit_guard(g);
    }
    if let Some(g) = &aggregate.right {
        v.visit_guard(g);
    }
    for e in &aggregate.elements {
        v.visit_aggregate_element(e);
    }
}

pub fn visit_aggregate_element<'a, V: Visit<'a> + ?Sized>(
    v: &mut V,
    element: &'a AggregateElement<Term>,
) {
    for t in &element.terms {
        v.visit_term(t);
    }
    for l in &element.condition {
        v.visit_literal(l);
    }
}

pub fn visit_literal<'a, V: Visit<'a> + ?Sized>(v: &mut V, literal: &'a Literal<Term>) {
    match literal {
        Literal::Positive(a) | Literal::Negative(a) => v.visit_atom(a),
        Literal::Relation(l, _op, r) => {
            v.visit_term(l);
            v.visit_term(r);
        }
        Literal::Aggregate(a) => v.visit_aggregate(a),
    }
}

pub fn visit_choice<'a, V: Visit<'a> + ?Sized>(v: &mut V, choice: &'a Choice<Term>) {
    if let Some(l) = &choice.lower {
        v.visit_term(l);
    }
    if let Some(u) = &choice.upper {
        v.visit_term(u);
    }
    for e in &choice.elements {
        v.visit_choice_element(e);
    }
}

pub fn visit_choice_element<'a, V: Visit<'a> + ?Sized>(
    v: &mut V,
    element: &'a ChoiceElement<Term>,
) {
    v.visit_atom(&element.atom);
    for l in &element.condition {
        v.visit_literal(l);
    }
}

pub fn visit_head<'a, V: Visit<'a> + ?Sized>(v: &mut V, head: &'a Head<Term>) {
    match head {
        Head::Disjunction(atoms) => {
            for a in atoms {
                v.visit_atom(a);
            }
        }
        Head::Choice(c) => v.visit_choice(c),
    }
}

pub fn visit_rule<'a, V: Visit<'a> + ?Sized>(v: &mut V, rule: &'a Rule<Term>) {
    v.visit_head(&rule.head);
    for l in &rule.body {
        v.visit_literal(l);
    }
}
