//! 2D gradient noise
//!
//! Improved Perlin noise over a 256-entry permutation table shuffled once
//! from a seed. Output is continuous and lies in `[-1, 1]`.

use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::Lcg64;

/// Seeded Perlin noise field
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    perm: [u8; 512],
}

impl PerlinNoise {
    /// Build the permutation table with a Fisher–Yates shuffle driven by `seed`
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255u8).collect();
        let mut rng = Lcg64::seed_from_u64(seed);
        table.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// Noise value at `(x, y)`
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let x = x - xf;
        let y = y - yf;

        let u = fade(x);
        let v = fade(y);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let b = p[xi + 1] as usize + yi;

        let aa = p[a];
        let ab = p[a + 1];
        let ba = p[b];
        let bb = p[b + 1];

        let value = lerp(
            v,
            lerp(u, grad(aa, x, y), grad(ba, x - 1.0, y)),
            lerp(u, grad(ab, x, y - 1.0), grad(bb, x - 1.0, y - 1.0)),
        );
        value.clamp(-1.0, 1.0)
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}
