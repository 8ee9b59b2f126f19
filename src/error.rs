//! Errors returned by [`SkipMap`][crate::SkipMap].

use thiserror::Error;

use crate::level_generator::GeometricError;

/// Errors that can occur when building or mutating a
/// [`SkipMap`][crate::SkipMap].
///
/// None of these leave the map modified: the operation is rejected before any
/// link is touched.
#[derive(Error, Debug, PartialEq, Eq)]
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum SkipMapError {
    /// The key being inserted is already present in the map.
    #[error("the key already exists.")]
    DuplicateKey,
    /// The offset into a destination buffer lies outside of it.
    #[error("offset {offset} is out of range for a destination of length {len}.")]
    OffsetOutOfRange {
        /// The offset which was requested.
        offset: usize,
        /// The length of the destination.
        len: usize,
    },
    /// The destination buffer cannot hold every entry of the map.
    #[error("destination has room for {available} entries but {required} are needed.")]
    InsufficientCapacity {
        /// The number of entries in the map.
        required: usize,
        /// The number of slots between the offset and the end of the
        /// destination.
        available: usize,
    },
    /// The options given to build the map's level generator are invalid.
    #[error(transparent)]
    LevelGenerator(#[from] GeometricError),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::SkipMapError;
    use crate::level_generator::GeometricError;

    #[test]
    fn messages() {
        assert_eq!(
            SkipMapError::DuplicateKey.to_string(),
            "the key already exists."
        );
        assert_eq!(
            SkipMapError::OffsetOutOfRange { offset: 4, len: 4 }.to_string(),
            "offset 4 is out of range for a destination of length 4."
        );
        assert_eq!(
            SkipMapError::InsufficientCapacity {
                required: 2,
                available: 1
            }
            .to_string(),
            "destination has room for 1 entries but 2 are needed."
        );
        assert_eq!(
            SkipMapError::from(GeometricError::ZeroMax).to_string(),
            "max must be non-zero."
        );
    }
}
