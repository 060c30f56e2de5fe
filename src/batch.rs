//! # Scalar-or-sequence arguments
//!
//! Every converter accepts each of its arguments either as a single value or as an ordered
//! sequence, and answers in the same form as its primary positional argument. [`Batch`] is that
//! tagged union. It is used both for inputs and for results:
//!
//! ```text
//! Batch::Scalar(x)        one value, broadcast to any length
//! Batch::Sequence(vec)    N values, used as-is when N matches the job count
//! ```
//!
//! ## Broadcasting rule
//!
//! The job count `N` is the length of the primary argument (latitude for coordinate
//! conversions, magnetic longitude for MLT). A secondary argument of length `N` is used
//! as-is, a secondary argument of length 1 is replicated `N` times, and any other length is
//! a [`MagCoordsError::ShapeMismatch`]. Nothing is ever truncated or zero-padded.
//!
//! ## Result shape
//!
//! Results mirror the *tag* of the primary argument, not its length: a `Scalar` input yields a
//! `Scalar` result, while a one-element `Sequence` yields a one-element `Sequence`.
use crate::magcoords_errors::MagCoordsError;

#[derive(Debug, Clone, PartialEq)]
pub enum Batch<T> {
    Scalar(T),
    Sequence(Vec<T>),
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        match self {
            Batch::Scalar(_) => 1,
            Batch::Sequence(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Batch::Scalar(_))
    }

    /// Borrow the values as a slice, whatever the tag.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Batch::Scalar(value) => std::slice::from_ref(value),
            Batch::Sequence(values) => values,
        }
    }

    /// Flatten into a `Vec`, whatever the tag.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Batch::Scalar(value) => vec![value],
            Batch::Sequence(values) => values,
        }
    }

    /// The bare value of a `Scalar`, `None` for a `Sequence`.
    pub fn scalar(self) -> Option<T> {
        match self {
            Batch::Scalar(value) => Some(value),
            Batch::Sequence(_) => None,
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Apply `f` to every value, keeping the tag.
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Batch<U> {
        match self {
            Batch::Scalar(value) => Batch::Scalar(f(value)),
            Batch::Sequence(values) => Batch::Sequence(values.into_iter().map(f).collect()),
        }
    }

    /// Apply a fallible `f` to every value, keeping the tag and stopping at the first error.
    pub fn try_map<U, E, F: FnMut(T) -> Result<U, E>>(self, mut f: F) -> Result<Batch<U>, E> {
        Ok(match self {
            Batch::Scalar(value) => Batch::Scalar(f(value)?),
            Batch::Sequence(values) => {
                Batch::Sequence(values.into_iter().map(f).collect::<Result<_, _>>()?)
            }
        })
    }
}

impl<T: Clone> Batch<T> {
    /// Expand to exactly `n` values following the broadcasting rule.
    ///
    /// Arguments
    /// -----------------
    /// * `n`: the job count, i.e. the length of the primary argument.
    /// * `argument`: the argument name reported on failure.
    ///
    /// Return
    /// ----------
    /// * `n` values, or [`MagCoordsError::ShapeMismatch`] when the length is neither 1 nor `n`.
    pub fn broadcast_to(&self, n: usize, argument: &'static str) -> Result<Vec<T>, MagCoordsError> {
        match self.as_slice() {
            values if values.len() == n => Ok(values.to_vec()),
            [single] => Ok(vec![single.clone(); n]),
            values => Err(MagCoordsError::ShapeMismatch {
                argument,
                len: values.len(),
                expected: n,
            }),
        }
    }
}

/// Wrap converted values with the tag of the primary argument.
///
/// A `Scalar` primary argument always describes exactly one job, so its result holds exactly
/// one value.
pub(crate) fn collapse_like<T, U>(primary: &Batch<T>, mut values: Vec<U>) -> Batch<U> {
    match (primary, values.len()) {
        (Batch::Scalar(_), 1) => Batch::Scalar(values.remove(0)),
        _ => Batch::Sequence(values),
    }
}

/// Check that every argument in a group has the same length, without broadcasting.
///
/// Used where a partial broadcast would be meaningless, e.g. the six fields of a timestamp.
pub(crate) fn check_same_arity(lengths: &[usize]) -> Result<usize, MagCoordsError> {
    match lengths.split_first() {
        Some((&first, rest)) if rest.iter().all(|&l| l == first) => Ok(first),
        Some(_) => Err(MagCoordsError::ArityMismatch {
            lengths: lengths.to_vec(),
        }),
        None => Ok(0),
    }
}

impl<T> From<T> for Batch<T> {
    fn from(value: T) -> Self {
        Batch::Scalar(value)
    }
}

impl<T> From<Vec<T>> for Batch<T> {
    fn from(values: Vec<T>) -> Self {
        Batch::Sequence(values)
    }
}

impl<T: Clone> From<&[T]> for Batch<T> {
    fn from(values: &[T]) -> Self {
        Batch::Sequence(values.to_vec())
    }
}

impl<T, const N: usize> From<[T; N]> for Batch<T> {
    fn from(values: [T; N]) -> Self {
        Batch::Sequence(Vec::from(values))
    }
}

impl<T> FromIterator<T> for Batch<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Batch::Sequence(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Batch<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Batch<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
