/// Splits `items` in contiguous chunks of `size` items, preserving their order.
///
/// The last chunk may be shorter. An empty slice gives no chunk.
pub fn chunk<T>(items: &[T], size: usize) -> Result<Vec<&[T]>, InvalidChunkSizeError> {
    if size == 0 {
        return Err(InvalidChunkSizeError);
    }

    Ok(items.chunks(size).collect())
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Chunk size must be > 0")]
pub struct InvalidChunkSizeError;
