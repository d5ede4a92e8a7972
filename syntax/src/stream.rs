//! Streams of lexical tokens.
//!
//! The parser consumes tokens rather than characters, so a token
//! slice must act as a nom input type. Only the traits our
//! token-level combinators exercise are implemented: `take(1)`
//! wants [`InputTake`] and [`InputIter`], and the repetition
//! combinators (`many0`, `separated_list*`, `eof`) want
//! [`InputLength`] on a cloneable input.

use std::iter::Enumerate;
use std::slice::Iter;

use nom::{InputIter, InputLength, InputTake, Needed};

/// A parser input backed by a shared slice of tokens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tokens<'a, T> {
    tok: &'a [T],
}

impl<'a, T> Tokens<'a, T> {
    pub fn new(tok: &'a [T]) -> Self {
        Self { tok }
    }

    /// The token at the front of the stream, if any.
    pub fn first(&self) -> Option<&'a T> {
        self.tok.first()
    }

    pub fn is_empty(&self) -> bool {
        self.tok.is_empty()
    }
}

impl<'a, T> InputLength for Tokens<'a, T> {
    #[inline]
    fn input_len(&self) -> usize {
        self.tok.len()
    }
}

/// `take(count)` splits a prefix off the stream; nom wants the
/// pair back as (rest, taken).
impl<'a, T> InputTake for Tokens<'a, T> {
    #[inline]
    fn take(&self, count: usize) -> Self {
        Tokens::new(&self.tok[..count])
    }

    #[inline]
    fn take_split(&self, count: usize) -> (Self, Self) {
        let (taken, rest) = self.tok.split_at(count);
        (Tokens::new(rest), Tokens::new(taken))
    }
}

impl<'a, T> InputIter for Tokens<'a, T> {
    type Item = &'a T;
    type Iter = Enumerate<Iter<'a, T>>;
    type IterElem = Iter<'a, T>;

    #[inline]
    fn iter_indices(&self) -> Self::Iter {
        self.tok.iter().enumerate()
    }

    #[inline]
    fn iter_elements(&self) -> Self::IterElem {
        self.tok.iter()
    }

    #[inline]
    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tok.iter().position(predicate)
    }

    #[inline]
    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        if self.tok.len() >= count {
            Ok(count)
        } else {
            Err(Needed::new(count - self.tok.len()))
        }
    }
}
