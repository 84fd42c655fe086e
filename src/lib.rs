//! Lazy, restartable sequences with chainable transformations.
//!
//! ```
//! use lazy_collection::{range, Collection};
//!
//! let squares = range(4).map(|x| x * x);
//! assert_eq!(squares.to_list(), vec![0, 1, 4, 9]);
//! // Enumerating again re-runs the pipeline.
//! assert_eq!(squares.to_list(), vec![0, 1, 4, 9]);
//!
//! let parity = Collection::of(vec![1, 2, 3, 4]).group_by(|x| x % 2);
//! let groups: Vec<_> = parity.iter().map(|(k, g)| (k, g.to_list())).collect();
//! assert_eq!(groups, vec![(1, vec![1, 3]), (0, vec![2, 4])]);
//! ```

mod collection;
mod enumerable;
mod error;
mod lazy_sequence;

pub use crate::{
    collection::{of, range, Collection, Iter},
    enumerable::{BoxedIter, Cursor, Enumerable, Generator, Restartability},
    error::CollectionError,
};
