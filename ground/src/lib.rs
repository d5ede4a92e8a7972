//! Replace terms that can contain variables with _ground_
//! (variable-free) terms.
//!
//! Grounding proceeds bottom-up: the predicate dependency graph
//! orders the program into components, and each component is
//! instantiated to a fixed point against the growing per-predicate
//! derivation sets. See [`ground`] for the entry point.

mod collect;
mod deps;
mod groundable;
mod grounder;
mod instantiate;
mod matcher;
mod safety;
mod term;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use rondo_syntax::{Atom, Symbol};

// Re-exports.
pub use collect::{ContainsAnonymous, Variables};
pub use groundable::Groundable;
pub use grounder::ground;
pub use term::GroundTerm;

/// Map variable names to the ground terms they are bound to.
pub type Bindings = BTreeMap<Symbol, GroundTerm>;

/// A set of variable names.
pub type Names = BTreeSet<Symbol>;

/// A predicate symbol together with its arity. Atoms with the
/// same name but different arities denote different predicates
/// only in the arity table check; everywhere else the pair is
/// the identity.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Predicate {
    pub name: Symbol,
    pub arity: usize,
}

impl Predicate {
    pub fn of<T>(atom: &Atom<T>) -> Self {
        Self {
            name: atom.predicate.clone(),
            arity: atom.arity(),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}/{}", self.name, self.arity))
    }
}

/// Things that may go wrong during grounding. All of these abort
/// grounding; no partial output is produced.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GroundingError {
    #[error("unsafe variables ({}) in rule: {rule}", names(.variables))]
    UnsafeRule { rule: String, variables: Vec<Symbol> },

    #[error("predicate {name} used with both arity {first} and arity {second}")]
    ArityMismatch {
        name: Symbol,
        first: usize,
        second: usize,
    },

    #[error("internal grounding invariant violated: {0}")]
    Internal(String),
}

/// Why a candidate substitution was dropped. This is *not* an
/// error: the instantiator silently discards the candidate and
/// moves on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Discard {
    /// Arithmetic failed to reduce: a non-numeric operand,
    /// division or remainder by zero, or overflow.
    Arithmetic,
    /// A variable had no binding. Safety analysis guarantees this
    /// cannot happen on an emission path; reaching one anyway is
    /// reported as [`GroundingError::Internal`].
    Unbound(Symbol),
}

fn names(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lift a discarding computation into the grounder's error space:
/// arithmetic failures drop the candidate (`None`), unbound
/// variables surface as internal errors.
pub(crate) fn reduce<T>(r: Result<T, Discard>) -> Result<Option<T>, GroundingError> {
    match r {
        Ok(t) => Ok(Some(t)),
        Err(Discard::Arithmetic) => Ok(None),
        Err(Discard::Unbound(v)) => Err(GroundingError::Internal(format!(
            "unbound variable {v} on an emission path"
        ))),
    }
}
