//! # 随机性核心
//!
//! Seeded randomness shared by every generator. Nothing in this module reads
//! global entropy: all draws come from an explicit generator seeded from an
//! identity, so equal seeds always replay equal sequences.
//!
//! ## 模块结构
//! - `Lcg64`: 64-bit linear-congruential generator implementing `rand::RngCore`
//! - `Randomness`: uniform, Box–Muller Gaussian and bounded Gaussian sampling
//! - `perlin`: 2D gradient noise over a seeded permutation table

pub mod perlin;

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

pub use perlin::PerlinNoise;

/// Resample budget for [`Randomness::bounded_gaussian`] before clamping
pub const MAX_RESAMPLES: usize = 100;

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

/// 64-bit linear-congruential generator with a mixed output stage.
///
/// The raw LCG state has weak low bits, so every output is passed through a
/// SplitMix64-style finalizer. Any other `RngCore` can be plugged into
/// [`Randomness`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    /// Create a generator from a raw seed
    pub fn new(seed: u64) -> Self {
        Self::seed_from_u64(seed)
    }

    #[inline]
    fn step(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        mix64(self.state)
    }
}

/// SplitMix64 finalizer
#[inline]
pub(crate) fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

impl RngCore for Lcg64 {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seed_from_u64(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9e3779b97f4a7c15,
        }
    }
}

/// Bounded Gaussian parameters for a single delay or duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl TimingDistribution {
    pub const fn new(mean: f64, std_dev: f64, min: f64, max: f64) -> Self {
        Self {
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Check that the distribution is well formed
    pub fn validate(&self, name: &str) -> crate::Result<()> {
        let finite = [self.mean, self.std_dev, self.min, self.max]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(crate::Error::configuration(format!(
                "{}: timing values must be finite",
                name
            )));
        }
        if self.std_dev < 0.0 {
            return Err(crate::Error::configuration(format!(
                "{}: std_dev must not be negative",
                name
            )));
        }
        if self.min > self.max {
            return Err(crate::Error::configuration(format!(
                "{}: min {} exceeds max {}",
                name, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Draw one value from this distribution
    pub fn sample<R: RngCore>(&self, rng: &mut Randomness<R>) -> f64 {
        rng.bounded_gaussian(self.mean, self.std_dev, self.min, self.max)
    }
}

/// Sampler over a seeded generator.
///
/// Box–Muller produces two independent normals per pair of uniform draws; the
/// second one is cached and returned by the next [`Randomness::gaussian`] call.
#[derive(Debug, Clone)]
pub struct Randomness<R: RngCore = Lcg64> {
    rng: R,
    spare: Option<f64>,
}

impl Randomness<Lcg64> {
    /// Create a sampler over an [`Lcg64`] seeded with `seed`
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(Lcg64::seed_from_u64(seed))
    }
}

impl<R: RngCore> Randomness<R> {
    /// Wrap an arbitrary generator
    pub fn from_rng(rng: R) -> Self {
        Self { rng, spare: None }
    }

    /// Access the underlying generator
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Uniform value in `[0, 1)` with 53 bits of precision
    pub fn uniform(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform value in `[min, max)`
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.uniform()
    }

    /// Uniform integer in `[min, max]`
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        min + ((self.uniform() * span) as u32).min(max - min)
    }

    /// Uniform index into a slice of length `len` (`len` must be non-zero)
    pub fn index(&mut self, len: usize) -> usize {
        ((self.uniform() * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Bernoulli trial
    pub fn chance(&mut self, probability: f64) -> bool {
        probability > 0.0 && self.uniform() < probability
    }

    /// Either `1.0` or `-1.0`
    pub fn sign(&mut self) -> f64 {
        if self.uniform() < 0.5 {
            -1.0
        } else {
            1.0
        }
    }

    /// Normal sample via the Box–Muller transform
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return mean + std_dev * z;
        }

        // u1 in (0, 1] keeps ln() finite
        let u1 = 1.0 - self.uniform();
        let u2 = self.uniform();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;

        self.spare = Some(radius * theta.sin());
        mean + std_dev * radius * theta.cos()
    }

    /// Gaussian sample restricted to `[min, max]`.
    ///
    /// Resamples up to [`MAX_RESAMPLES`] times, then clamps the last draw.
    pub fn bounded_gaussian(&mut self, mean: f64, std_dev: f64, min: f64, max: f64) -> f64 {
        let mut value = mean;
        for _ in 0..MAX_RESAMPLES {
            value = self.gaussian(mean, std_dev);
            if value >= min && value <= max {
                return value;
            }
        }
        value.max(min).min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_is_deterministic() {
        let mut a = Lcg64::new(42);
        let mut b = Lcg64::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_lcg_seeds_diverge() {
        let mut a = Lcg64::new(1);
        let mut b = Lcg64::new(2);
        let same = (0..50).filter(|_| a.next_u64() == b.next_u64()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = Lcg64::new(7);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|b| *b != 0));
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = Randomness::seeded(99);
        for _ in 0..10_000 {
            let v = rng.uniform();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_uniform_mean() {
        let mut rng = Randomness::seeded(3);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| rng.uniform()).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean was {}", mean);
    }

    #[test]
    fn test_gaussian_moments() {
        let mut rng = Randomness::seeded(1234);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.gaussian(10.0, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

        assert!((mean - 10.0).abs() < 0.1, "mean was {}", mean);
        assert!((var.sqrt() - 2.0).abs() < 0.1, "std dev was {}", var.sqrt());
    }

    #[test]
    fn test_gaussian_uses_spare() {
        // Two normals come from one pair of uniform draws
        let mut rng = Randomness::seeded(5);
        rng.gaussian(0.0, 1.0);
        let state_after_first = rng.rng.clone();
        rng.gaussian(0.0, 1.0);
        assert_eq!(rng.rng, state_after_first);
    }

    #[test]
    fn test_bounded_gaussian_stays_in_bounds() {
        let mut rng = Randomness::seeded(77);
        for _ in 0..5_000 {
            let v = rng.bounded_gaussian(100.0, 50.0, 80.0, 120.0);
            assert!((80.0..=120.0).contains(&v));
        }
    }

    #[test]
    fn test_bounded_gaussian_clamps_unreachable_range() {
        // Range far in the tail: resampling gives up and clamps
        let mut rng = Randomness::seeded(8);
        let v = rng.bounded_gaussian(0.0, 1.0, 1_000.0, 2_000.0);
        assert_eq!(v, 1_000.0);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = Randomness::seeded(11);
        for _ in 0..1_000 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_range_inclusive_covers_bounds() {
        let mut rng = Randomness::seeded(13);
        let values: Vec<u32> = (0..2_000).map(|_| rng.range_inclusive(1, 6)).collect();
        assert!(values.contains(&1));
        assert!(values.contains(&6));
        assert!(values.iter().all(|v| (1..=6).contains(v)));
    }

    #[test]
    fn test_timing_distribution_validation() {
        assert!(TimingDistribution::new(10.0, 2.0, 5.0, 20.0).validate("ok").is_ok());
        assert!(TimingDistribution::new(10.0, -1.0, 5.0, 20.0).validate("neg").is_err());
        assert!(TimingDistribution::new(10.0, 2.0, 30.0, 20.0).validate("inv").is_err());
        assert!(TimingDistribution::new(f64::NAN, 2.0, 5.0, 20.0).validate("nan").is_err());
    }
}
