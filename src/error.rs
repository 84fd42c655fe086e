#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CollectionError {
    /// The collection reads from a one-shot cursor, so a second enumeration
    /// would see a truncated or empty sequence.
    #[error("collection is backed by a one-shot source and cannot be enumerated more than once")]
    NotRestartable,
}
