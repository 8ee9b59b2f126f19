//! Geometric level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::debug;

use crate::level_generator::LevelGenerator;

/// The default number of levels, and therefore the tallest possible node.
pub const MAX_LEVEL: usize = 20;

/// The largest number of levels a generator accepts.
///
/// This bounds the forward array of the head node and the predecessor buffer
/// allocated by every insertion and removal.
pub const LEVEL_LIMIT: usize = 64;

/// The default probability that a node present at some level is also present
/// at the next level.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// The default seed of the random number generator.
///
/// Seeding with a constant makes the shape of the skiplist reproducible from
/// one run to the next. This has no bearing on security and the generator must
/// not be used for anything which does.
pub const DEFAULT_SEED: u64 = 0x0d0f_ffed;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum number of levels must not exceed [`LEVEL_LIMIT`].
    #[error("max must be at most {}.", LEVEL_LIMIT)]
    TooManyLevels,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator using a geometric distribution.
///
/// This distribution assumes that if a node is present at some level `$n$`,
/// then the probability that it is present at level `$n+1$` is some constant
/// `$p \in (0, 1)$`. This produces a geometric distribution, albeit truncated
/// at the maximum number of levels allowed: a node has height `$k$` with
/// probability `$p^{k-1}(1-p)$` for every `$k$` below the maximum, and the
/// remaining mass is assigned to the maximum height.
#[derive(Debug)]
pub struct Geometric {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The probability that a node is present in the next level.
    p: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level.
    ///
    /// The generator is seeded from the thread-local entropy source, so the
    /// heights it produces differ from one run to the next. Use
    /// [`Geometric::with_seed`] for a reproducible sequence.
    ///
    /// # Errors
    ///
    /// `p` must be between 0 and 1 (exclusive) and `total` must lie in
    /// `1..=LEVEL_LIMIT`.
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        Self::validate(total, p)?;
        debug!(total, p, "building level generator from entropy");
        Ok(Geometric {
            total,
            p,
            rng: SmallRng::from_rng(&mut rand::rng()),
        })
    }

    /// Create a new geometric level generator whose random number generator is
    /// seeded with `seed`.
    ///
    /// Two generators built with the same arguments produce the same sequence
    /// of levels.
    ///
    /// # Errors
    ///
    /// `p` must be between 0 and 1 (exclusive) and `total` must lie in
    /// `1..=LEVEL_LIMIT`.
    #[inline]
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::validate(total, p)?;
        debug!(total, p, seed, "building seeded level generator");
        Ok(Geometric {
            total,
            p,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// The probability that a node is present in the next level.
    #[inline]
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.p
    }

    fn validate(total: usize, p: f64) -> Result<(), GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroMax);
        }
        if total > LEVEL_LIMIT {
            return Err(GeometricError::TooManyLevels);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(())
    }
}

impl Default for Geometric {
    /// [`MAX_LEVEL`] levels, `$p = 1/2$`, seeded with [`DEFAULT_SEED`].
    #[inline]
    fn default() -> Self {
        Geometric {
            total: MAX_LEVEL,
            p: DEFAULT_PROBABILITY,
            rng: SmallRng::seed_from_u64(DEFAULT_SEED),
        }
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    /// Generate a level for a new node using a geometric distribution.
    ///
    /// A uniform variate `$r \in [0, 1)$` is drawn and the result is the
    /// smallest level `$n$` such that `$p^{n+1} < r$`. If no such level exists
    /// below [`total`][LevelGenerator::total], the top level is returned.
    #[inline]
    #[expect(clippy::float_arithmetic, reason = "Computing successive powers of p")]
    fn level(&mut self) -> usize {
        let r = self.rng.random::<f64>();
        let mut threshold = self.p;
        for level in 0..self.total {
            if threshold < r {
                return level;
            }
            threshold *= self.p;
        }
        self.total - 1
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{
        DEFAULT_PROBABILITY, Geometric, GeometricError, LEVEL_LIMIT, LevelGenerator, MAX_LEVEL,
    };

    #[test]
    fn invalid_max() {
        assert_eq!(Geometric::new(0, 0.5).err(), Some(GeometricError::ZeroMax));
        assert_eq!(
            Geometric::with_seed(0, 0.5, 1).err(),
            Some(GeometricError::ZeroMax)
        );
    }

    #[rstest]
    #[case(LEVEL_LIMIT + 1)]
    #[case(usize::MAX)]
    fn too_many_levels(#[case] n: usize) -> Result<()> {
        assert_eq!(
            Geometric::new(n, 0.5).err(),
            Some(GeometricError::TooManyLevels)
        );
        assert_eq!(
            Geometric::with_seed(n, 0.5, 1).err(),
            Some(GeometricError::TooManyLevels)
        );
        let generator = Geometric::with_seed(LEVEL_LIMIT, 0.5, 1)?;
        assert_eq!(generator.total(), LEVEL_LIMIT);
        Ok(())
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn invalid_p(#[case] p: f64) {
        assert_eq!(
            Geometric::with_seed(1, p, 1).err(),
            Some(GeometricError::InvalidProbability)
        );
        assert_eq!(
            Geometric::new(1, p).err(),
            Some(GeometricError::InvalidProbability)
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(GeometricError::ZeroMax.to_string(), "max must be non-zero.");
        assert_eq!(
            GeometricError::TooManyLevels.to_string(),
            "max must be at most 64."
        );
        assert_eq!(
            GeometricError::InvalidProbability.to_string(),
            "p must be in (0, 1)."
        );
    }

    #[test]
    fn default() {
        let generator = Geometric::default();
        assert_eq!(generator.total(), MAX_LEVEL);
        assert_eq!(generator.probability(), DEFAULT_PROBABILITY);
    }

    #[rstest]
    fn levels_in_range(
        #[values(1, 2, 4, 20)] n: usize,
        #[values(0.01, 0.1, 0.5, 0.99)] p: f64,
    ) -> Result<()> {
        let mut generator = Geometric::new(n, p)?;
        assert_eq!(generator.total(), n);
        for _ in 0..100_000 {
            let level = generator.level();
            assert!((0..n).contains(&level));
            let height = generator.height();
            assert!((1..=n).contains(&height));
        }
        Ok(())
    }

    #[rstest]
    fn reaches_bottom_and_top(#[values(1, 2, 4)] n: usize) -> Result<()> {
        let mut generator = Geometric::with_seed(n, 0.5, 7)?;
        let levels: Vec<usize> = (0..100_000).map(|_| generator.level()).collect();
        if !levels.contains(&0) {
            bail!("Failed to generate a level-0 node.");
        }
        if !levels.contains(&(n - 1)) {
            bail!("Failed to generate a level-{} node.", n - 1);
        }
        Ok(())
    }

    #[test]
    fn seeded_is_reproducible() -> Result<()> {
        let mut a = Geometric::with_seed(MAX_LEVEL, 0.5, 0xdead_beef)?;
        let mut b = Geometric::with_seed(MAX_LEVEL, 0.5, 0xdead_beef)?;
        let a: Vec<usize> = (0..1000).map(|_| a.level()).collect();
        let b: Vec<usize> = (0..1000).map(|_| b.level()).collect();
        assert_eq!(a, b);

        let mut c = Geometric::default();
        let mut d = Geometric::default();
        for _ in 0..1000 {
            assert_eq!(c.level(), d.level());
        }
        Ok(())
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "Comparing empirical frequencies")]
    #[expect(clippy::cast_precision_loss, reason = "Sample counts are small")]
    #[expect(clippy::as_conversions, reason = "No other way to do this")]
    fn distribution(#[values(0.25, 0.5, 0.75)] p: f64) -> Result<()> {
        const SAMPLES: usize = 200_000;
        let mut generator = Geometric::with_seed(MAX_LEVEL, p, 42)?;
        let mut counts = [0_usize; MAX_LEVEL];
        for _ in 0..SAMPLES {
            counts[generator.level()] += 1;
        }

        // P(level = 0) = 1 - p and P(level = 1) = p (1 - p).
        let level_0 = counts[0] as f64 / SAMPLES as f64;
        let level_1 = counts[1] as f64 / SAMPLES as f64;
        assert!((level_0 - (1.0 - p)).abs() < 0.01, "level 0: {level_0}");
        assert!((level_1 - p * (1.0 - p)).abs() < 0.01, "level 1: {level_1}");
        Ok(())
    }
}
