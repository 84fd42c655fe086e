//! Lazy, chainable sequences over arbitrary enumerable sources.
//!
//! A [`Collection`] holds a factory for enumerators rather than a live cursor,
//! so it can be enumerated any number of times. Whether those enumerations
//! agree depends on the source:
//!
//! * collections built by [`Collection::wrap`], [`Collection::range`],
//!   [`Collection::map`], [`Collection::concat`], [`Collection::group_by`],
//!   [`Collection::sort`], [`Collection::sort_by_key`] and
//!   [`Collection::memoize`] over restartable inputs are **restartable**:
//!   every enumeration re-runs the pipeline from scratch;
//! * collections wrapping a one-shot [`Cursor`] (see
//!   [`Collection::from_cursor`]) are **not**: a second enumeration only sees
//!   what earlier ones left behind, which is usually nothing.
//!
//! The kind is carried along through composition and can be inspected with
//! [`Collection::restartability`] or enforced with
//! [`Collection::try_restartable`].

use std::{
    cmp::Ordering,
    collections::{hash_map::Entry, HashMap},
    fmt,
    hash::Hash,
    iter::FromIterator,
    rc::Rc,
};

use itertools::Itertools;
use tracing::trace;

use crate::{
    enumerable::{BoxedIter, Cursor, Enumerable, Generator, Restartability},
    error::CollectionError,
    lazy_sequence::LazySequence,
};

/// A lazy sequence of `T`.
///
/// Chain operators never mutate the receiver; they return a new collection
/// that captures a cheap clone of it. Cloning a collection shares its
/// immutable source.
pub struct Collection<'a, T> {
    source: Rc<dyn Enumerable<'a, Item = T> + 'a>,
}

pub struct Iter<'a, T> {
    inner: BoxedIter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: 'a> Collection<'a, T> {
    /// Wraps an arbitrary source as-is. The collection is exactly as
    /// restartable as `source` is.
    pub fn of<E>(source: E) -> Self
    where
        E: Enumerable<'a, Item = T> + 'a,
    {
        Self {
            source: Rc::new(source),
        }
    }

    /// Builds a restartable collection around a factory that is invoked once
    /// per enumeration and must return a fresh iterator every time.
    ///
    /// A factory that hands out a shared cursor breaks that promise; declare
    /// such factories with [`Collection::wrap_with`] instead.
    pub fn wrap<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::of(Generator::new(factory))
    }

    /// Like [`Collection::wrap`], with the factory's restartability declared
    /// by the caller.
    pub fn wrap_with<F, I>(factory: F, restartability: Restartability) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::of(Generator::with_restartability(factory, restartability))
    }

    /// Wraps a stateful iterator. The result is one-shot: everything pulled
    /// by one enumeration is gone for the next.
    pub fn from_cursor<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::of(Cursor::new(iter.into_iter()))
    }

    pub fn empty() -> Self {
        Self::wrap(std::iter::empty)
    }

    pub fn restartability(&self) -> Restartability {
        self.source.restartability()
    }

    pub fn is_restartable(&self) -> bool {
        self.restartability().is_restartable()
    }

    /// Rejects collections that read from a one-shot source.
    pub fn try_restartable(self) -> Result<Self, CollectionError> {
        if self.is_restartable() {
            Ok(self)
        } else {
            Err(CollectionError::NotRestartable)
        }
    }

    pub fn iter(&self) -> Iter<'a, T> {
        Iter {
            inner: self.source.enumerator(),
        }
    }

    /// Lazily applies `f` to every element, in order.
    pub fn map<U, F>(&self, f: F) -> Collection<'a, U>
    where
        F: Fn(T) -> U + 'a,
        U: 'a,
    {
        let receiver = self.clone();
        let f = Rc::new(f);
        Collection::of(Generator::with_restartability(
            move || {
                let f = Rc::clone(&f);
                receiver.iter().map(move |elem| (*f)(elem))
            },
            self.restartability(),
        ))
    }

    /// Lazily yields the elements of `other` **followed by** the elements of
    /// `self`.
    ///
    /// Note the order: the argument comes first and the receiver second, so
    /// `range(3).concat(range(2))` yields `0, 1, 0, 1, 2`. Callers rely on
    /// this prepending behavior.
    pub fn concat<E>(&self, other: E) -> Self
    where
        E: Enumerable<'a, Item = T> + 'a,
    {
        let head = Collection::of(other);
        let tail = self.clone();
        let restartability = head.restartability().combine(tail.restartability());
        Self::of(Generator::with_restartability(
            move || head.iter().chain(tail.iter()),
            restartability,
        ))
    }

    /// Partitions the elements by `key`.
    ///
    /// Unlike the other chain operators this drains `self` immediately. Groups
    /// come out in order of first occurrence of their key and each group
    /// keeps the relative order of its members.
    pub fn group_by<K, F>(&self, mut key: F) -> Collection<'a, (K, Collection<'a, T>)>
    where
        K: Hash + Eq + Clone + 'a,
        F: FnMut(&T) -> K,
        T: Clone,
    {
        let mut slots: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<T>)> = Vec::new();
        let mut elements = 0usize;
        for elem in self {
            elements += 1;
            match slots.entry(key(&elem)) {
                Entry::Occupied(slot) => groups[*slot.get()].1.push(elem),
                Entry::Vacant(slot) => {
                    groups.push((slot.key().clone(), vec![elem]));
                    slot.insert(groups.len() - 1);
                }
            }
        }
        trace!(elements, groups = groups.len(), "grouped collection");
        groups
            .into_iter()
            .map(|(key, members)| (key, Collection::from_buffer(members)))
            .collect()
    }

    /// Eagerly sorts the elements with `compare`. The sort is stable.
    pub fn sort<F>(&self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
        T: Clone,
    {
        let sorted = self.iter().sorted_by(compare).collect_vec();
        trace!(elements = sorted.len(), "sorted collection");
        Self::from_buffer(sorted)
    }

    /// Eagerly sorts the elements in ascending order of `key`. The sort is
    /// stable and `key` runs exactly once per element; keys that compare
    /// neither less nor greater are treated as equal.
    pub fn sort_by_key<K, F>(&self, mut key: F) -> Self
    where
        F: FnMut(&T) -> K,
        K: PartialOrd,
        T: Clone,
    {
        let sorted = self
            .iter()
            .map(|elem| (key(&elem), elem))
            .sorted_by(|(a, _), (b, _)| compare_keys(a, b))
            .map(|(_, elem)| elem)
            .collect_vec();
        trace!(elements = sorted.len(), "sorted collection by key");
        Self::from_buffer(sorted)
    }

    /// Returns a restartable collection that caches everything it pulls from a
    /// single enumeration of `self`. Nothing is pulled until the result is
    /// enumerated, and later enumerations replay the cache before pulling
    /// more.
    pub fn memoize(&self) -> Self
    where
        T: Clone,
    {
        let receiver = self.clone();
        Self::of(LazySequence::new(move || receiver.source.enumerator()))
    }

    /// Drains one enumeration left to right. `combine` receives the
    /// accumulator, the element, its index and the whole materialized
    /// sequence.
    pub fn reduce<U, F>(&self, mut combine: F, initial: U) -> U
    where
        F: FnMut(U, &T, usize, &[T]) -> U,
    {
        let snapshot = self.to_list();
        let all = snapshot.as_slice();
        all.iter()
            .enumerate()
            .fold(initial, |acc, (idx, elem)| combine(acc, elem, idx, all))
    }

    /// Like [`Collection::reduce`], but stops at the first error `combine`
    /// returns and hands it back unchanged.
    pub fn try_reduce<U, E, F>(&self, mut combine: F, initial: U) -> Result<U, E>
    where
        F: FnMut(U, &T, usize, &[T]) -> Result<U, E>,
    {
        let snapshot = self.to_list();
        let all = snapshot.as_slice();
        all.iter()
            .enumerate()
            .try_fold(initial, |acc, (idx, elem)| combine(acc, elem, idx, all))
    }

    /// Drains one enumeration into a vector. On a one-shot collection this
    /// leaves the source exhausted.
    pub fn to_list(&self) -> Vec<T> {
        let list = self.iter().collect_vec();
        trace!(elements = list.len(), "materialized collection");
        list
    }

    fn from_buffer(buf: Vec<T>) -> Self
    where
        T: Clone,
    {
        Self::of(Rc::<[T]>::from(buf))
    }
}

impl<'a> Collection<'a, i64> {
    /// `0, 1, ..., count - 1`; empty when `count <= 0`.
    pub fn range(count: i64) -> Self {
        Self::wrap(move || 0..count)
    }
}

impl<'a, T: 'a, E: 'a> Collection<'a, Result<T, E>> {
    /// Drains until the first `Err` and returns it, or all values if there is
    /// none.
    pub fn try_to_list(&self) -> Result<Vec<T>, E> {
        let list: Result<Vec<T>, E> = self.iter().collect();
        match &list {
            Ok(list) => trace!(elements = list.len(), "materialized collection"),
            Err(_) => trace!("materialization stopped at caller error"),
        }
        list
    }
}

fn compare_keys<K: PartialOrd>(a: &K, b: &K) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Shorthand for [`Collection::of`].
pub fn of<'a, E>(source: E) -> Collection<'a, E::Item>
where
    E: Enumerable<'a> + 'a,
    E::Item: 'a,
{
    Collection::of(source)
}

/// Shorthand for [`Collection::range`].
pub fn range<'a>(count: i64) -> Collection<'a, i64> {
    Collection::range(count)
}

impl<'a, T> Clone for Collection<'a, T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<'a, T: 'a> Default for Collection<'a, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> fmt::Debug for Collection<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Collection")
            .field("restartability", &self.source.restartability())
            .finish_non_exhaustive()
    }
}

impl<'a, T: 'a> Enumerable<'a> for Collection<'a, T> {
    type Item = T;

    fn enumerator(&self) -> BoxedIter<'a, T> {
        self.source.enumerator()
    }

    fn restartability(&self) -> Restartability {
        self.source.restartability()
    }
}

impl<'a, T: Clone + 'a> FromIterator<T> for Collection<'a, T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_buffer(iter.into_iter().collect())
    }
}

impl<'a, T: 'a> IntoIterator for Collection<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, 'b, T: 'a> IntoIterator for &'b Collection<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
