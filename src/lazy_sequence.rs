use std::{cell::RefCell, rc::Rc};

use crate::enumerable::{BoxedIter, Enumerable, Restartability};

pub(crate) struct BufferIter<T> {
    buf: Rc<[T]>,
    next_idx: usize,
}

impl<T> BufferIter<T> {
    pub(crate) fn new(buf: Rc<[T]>) -> Self {
        Self { buf, next_idx: 0 }
    }
}

impl<T: Clone> Iterator for BufferIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let res = self.buf.get(self.next_idx)?.clone();
        self.next_idx += 1;
        Some(res)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buf.len() - self.next_idx;
        (remaining, Some(remaining))
    }
}

enum Source<'a, T> {
    Pending(Box<dyn Fn() -> BoxedIter<'a, T> + 'a>),
    Running(BoxedIter<'a, T>),
    Exhausted,
}

struct Shared<'a, T> {
    vec: Vec<T>,
    source: Source<'a, T>,
}

impl<'a, T> Shared<'a, T> {
    /// Pulls one more element from the source into the cache. Returns false
    /// once the source is exhausted.
    fn pull(&mut self) -> bool {
        // Stays pending until `start` returns, so a source that panics while
        // starting is started again by the next enumeration.
        if let Source::Pending(start) = &self.source {
            let iter = start();
            self.source = Source::Running(iter);
        }
        let next = match &mut self.source {
            Source::Running(iter) => iter.next(),
            _ => return false,
        };
        match next {
            Some(elem) => {
                self.vec.push(elem);
                true
            }
            None => {
                self.source = Source::Exhausted;
                false
            }
        }
    }
}

/// Caches everything pulled from a single enumeration of its source, so any
/// number of enumerations can replay it. The source is not started until the
/// first element is requested.
///
/// If the running source panics while producing an element, the elements
/// already cached are kept and later enumerations resume from wherever the
/// source was left.
pub(crate) struct LazySequence<'a, T> {
    shared: Rc<RefCell<Shared<'a, T>>>,
}

pub(crate) struct LazySequenceIterator<'a, T> {
    seq: Rc<RefCell<Shared<'a, T>>>,
    next_idx: usize,
}

impl<'a, T> LazySequence<'a, T> {
    pub(crate) fn new(start: impl Fn() -> BoxedIter<'a, T> + 'a) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                vec: Vec::new(),
                source: Source::Pending(Box::new(start)),
            })),
        }
    }

    pub(crate) fn iter(&self) -> LazySequenceIterator<'a, T> {
        LazySequenceIterator {
            seq: Rc::clone(&self.shared),
            next_idx: 0,
        }
    }
}

impl<'a, T: Clone> Iterator for LazySequenceIterator<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        // Reentrant enumeration from inside the source would panic here on
        // the RefCell; sources are expected not to read their own cache.
        let mut seq = self.seq.borrow_mut();
        if self.next_idx >= seq.vec.len() && !seq.pull() {
            return None;
        }
        let res = seq.vec[self.next_idx].clone();
        self.next_idx += 1;
        Some(res)
    }
}

impl<'a, T: Clone + 'a> Enumerable<'a> for LazySequence<'a, T> {
    type Item = T;

    fn enumerator(&self) -> BoxedIter<'a, T> {
        Box::new(self.iter())
    }

    fn restartability(&self) -> Restartability {
        Restartability::Restartable
    }
}
