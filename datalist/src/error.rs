/// Errors raised by [`crate::VirtualizingList`] and [`crate::VirtualizingVector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An index was outside `[0, len)` (or `[0, len]` for inserts).
    #[error("index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A copy destination was shorter than the data being copied into it.
    #[error("destination has room for {available} items but {needed} are required")]
    DestinationTooSmall { needed: usize, available: usize },

    /// A mutating call was made on a read-only collection.
    #[error("cannot modify a read-only collection")]
    ReadOnly,
}
