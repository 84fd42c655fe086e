use std::{cell::RefCell, fmt, rc::Rc};

pub type BoxedIter<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Whether enumerating a source twice yields the same elements twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Restartability {
    /// Every enumeration starts from scratch and is independent of the others.
    Restartable,
    /// Enumerations share one cursor; whatever an earlier enumeration pulled
    /// is gone for the later ones.
    OneShot,
}

impl Restartability {
    pub fn is_restartable(self) -> bool {
        self == Restartability::Restartable
    }

    /// Restartability of a sequence that enumerates both `self` and `other`.
    pub fn combine(self, other: Self) -> Self {
        if self.is_restartable() && other.is_restartable() {
            Restartability::Restartable
        } else {
            Restartability::OneShot
        }
    }
}

/// Anything that can hand out a pull-based enumerator of its elements.
///
/// Restartable sources return a fresh enumerator on every call to
/// [`Enumerable::enumerator`]; one-shot sources return a view of the single
/// cursor they own.
pub trait Enumerable<'a> {
    type Item;

    fn enumerator(&self) -> BoxedIter<'a, Self::Item>;

    fn restartability(&self) -> Restartability;
}

/// Zero-argument factory invoked once per enumeration.
pub struct Generator<F> {
    factory: F,
    restartability: Restartability,
}

impl<F> Generator<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            restartability: Restartability::Restartable,
        }
    }

    /// Declares the factory's restartability explicitly, for factories that
    /// read from a shared cursor or from other sequences.
    pub fn with_restartability(factory: F, restartability: Restartability) -> Self {
        Self {
            factory,
            restartability,
        }
    }
}

impl<'a, F, I> Enumerable<'a> for Generator<F>
where
    F: Fn() -> I,
    I: IntoIterator,
    I::IntoIter: 'a,
{
    type Item = I::Item;

    fn enumerator(&self) -> BoxedIter<'a, I::Item> {
        Box::new((self.factory)().into_iter())
    }

    fn restartability(&self) -> Restartability {
        self.restartability
    }
}

/// A hand-advanced iterator shared by every enumeration of it.
pub struct Cursor<I> {
    iter: Rc<RefCell<I>>,
}

impl<I: Iterator> Cursor<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter: Rc::new(RefCell::new(iter)),
        }
    }
}

impl<I> Clone for Cursor<I> {
    fn clone(&self) -> Self {
        Self {
            iter: Rc::clone(&self.iter),
        }
    }
}

impl<I> fmt::Debug for Cursor<I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor").finish_non_exhaustive()
    }
}

impl<'a, I> Enumerable<'a> for Cursor<I>
where
    I: Iterator + 'a,
{
    type Item = I::Item;

    fn enumerator(&self) -> BoxedIter<'a, I::Item> {
        let iter = Rc::clone(&self.iter);
        Box::new(std::iter::from_fn(move || iter.borrow_mut().next()))
    }

    fn restartability(&self) -> Restartability {
        Restartability::OneShot
    }
}

impl<'a, T: Clone + 'a> Enumerable<'a> for Vec<T> {
    type Item = T;

    fn enumerator(&self) -> BoxedIter<'a, T> {
        Box::new(self.clone().into_iter())
    }

    fn restartability(&self) -> Restartability {
        Restartability::Restartable
    }
}

impl<'a, T: Clone + 'a> Enumerable<'a> for &'a [T] {
    type Item = T;

    fn enumerator(&self) -> BoxedIter<'a, T> {
        let slice: &'a [T] = *self;
        Box::new(slice.iter().cloned())
    }

    fn restartability(&self) -> Restartability {
        Restartability::Restartable
    }
}

impl<'a, T: Clone + 'a> Enumerable<'a> for Rc<[T]> {
    type Item = T;

    fn enumerator(&self) -> BoxedIter<'a, T> {
        Box::new(crate::lazy_sequence::BufferIter::new(Rc::clone(self)))
    }

    fn restartability(&self) -> Restartability {
        Restartability::Restartable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_restartable_only_when_both_are() {
        use Restartability::*;
        assert_eq!(Restartable.combine(Restartable), Restartable);
        assert_eq!(Restartable.combine(OneShot), OneShot);
        assert_eq!(OneShot.combine(Restartable), OneShot);
        assert_eq!(OneShot.combine(OneShot), OneShot);
    }

    #[test]
    fn generator_invokes_factory_per_enumeration() {
        let generator = Generator::new(|| 0..3);
        assert_eq!(generator.enumerator().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(generator.enumerator().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(generator.restartability().is_restartable());
    }

    #[test]
    fn cursor_enumerations_share_state() {
        let cursor = Cursor::new(vec!['a', 'b', 'c'].into_iter());
        let mut first = cursor.enumerator();
        assert_eq!(first.next(), Some('a'));
        assert_eq!(cursor.enumerator().collect::<String>(), "bc");
        assert_eq!(first.next(), None);
        assert_eq!(cursor.restartability(), Restartability::OneShot);
    }

    #[test]
    fn slices_are_restartable() {
        let words = ["a", "b", "c"];
        let slice: &[&str] = &words;
        assert_eq!(slice.enumerator().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(slice.enumerator().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(Enumerable::restartability(&slice).is_restartable());
    }

    #[test]
    fn with_restartability_is_reported_as_declared() {
        let declared = Generator::with_restartability(|| 0..2, Restartability::OneShot);
        assert_eq!(declared.restartability(), Restartability::OneShot);
        assert_eq!(declared.enumerator().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn buffers_are_restartable() {
        let buf: Rc<[u8]> = Rc::from(vec![1, 2]);
        assert_eq!(buf.enumerator().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(buf.enumerator().collect::<Vec<_>>(), vec![1, 2]);

        let vec = vec![String::from("x")];
        assert_eq!(vec.enumerator().collect::<Vec<_>>(), vec!["x"]);
        assert!(Enumerable::restartability(&vec).is_restartable());
    }
}
