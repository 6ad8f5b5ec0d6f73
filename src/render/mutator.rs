//! Raster noise and render fingerprints
//!
//! Pixel mutation adds a smooth Perlin offset to the color channels of an
//! RGBA buffer. Fingerprints are derived from the identity seed rather than
//! from pixel content, so they stay stable when the drawn content shifts.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use crate::identity;
use crate::random::{mix64, PerlinNoise, Randomness};
use crate::{Error, Result};

const BYTES_PER_PIXEL: usize = 4;
const SYNTHETIC_PAYLOAD_LEN: usize = 512;
const ENTROPY_SALT: u64 = 0x5eed_e17e_0b1a_5e11;

/// Pixel noise settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Peak offset added to each color channel
    pub noise_intensity: f64,
    /// Noise-space units per pixel
    pub noise_scale: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            noise_intensity: 4.0,
            noise_scale: 0.1,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.noise_intensity.is_finite() || self.noise_intensity < 0.0 {
            return Err(Error::configuration(format!(
                "render.noise_intensity must be non-negative, got {}",
                self.noise_intensity
            )));
        }
        if !self.noise_scale.is_finite() || self.noise_scale <= 0.0 {
            return Err(Error::configuration(format!(
                "render.noise_scale must be positive, got {}",
                self.noise_scale
            )));
        }
        Ok(())
    }
}

/// Stable synthetic render fingerprint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFingerprint {
    /// SHA-256 over seed, dimensions and data digest
    pub hash: String,
    pub width: u32,
    pub height: u32,
    /// SHA-256 of the synthetic encoded image data
    pub data_digest: String,
    pub entropy: f64,
}

/// Applies pixel noise and caches fingerprints per `(identity, width, height)`
#[derive(Debug, Default)]
pub struct RenderMutator {
    config: RenderConfig,
    fingerprints: RwLock<HashMap<(String, u32, u32), RenderFingerprint>>,
}

impl RenderMutator {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            fingerprints: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Copy of an RGBA `buffer` with noise added to R, G and B
    ///
    /// The noise field depends only on `seed` and pixel coordinates. Alpha
    /// is never touched.
    pub fn mutate(&self, buffer: &[u8], width: u32, height: u32, seed: u64) -> Result<Vec<u8>> {
        let expected = checked_len(width, height)?;
        if buffer.len() != expected {
            return Err(Error::invalid_input(format!(
                "buffer of {} bytes does not match {}x{} RGBA ({} bytes)",
                buffer.len(),
                width,
                height,
                expected
            )));
        }

        let noise = PerlinNoise::new(seed);
        let scale = self.config.noise_scale;
        let intensity = self.config.noise_intensity;
        let mut out = buffer.to_vec();

        for (i, pixel) in out.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            let x = (i % width as usize) as f64;
            let y = (i / width as usize) as f64;
            // Truncated toward zero
            let offset = (noise.noise(x * scale, y * scale) * intensity) as i32;
            if offset == 0 {
                continue;
            }
            for channel in &mut pixel[..3] {
                *channel = (*channel as i32 + offset).clamp(0, 255) as u8;
            }
        }

        Ok(out)
    }

    /// Fingerprint for `identity` at the given canvas size; cached
    pub fn fingerprint_for(&self, identity: &str, width: u32, height: u32) -> Result<RenderFingerprint> {
        checked_len(width, height)?;
        let key = (identity.to_string(), width, height);

        if let Some(fp) = self
            .fingerprints
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(&key)
        {
            return Ok(fp.clone());
        }

        let fingerprint = derive_fingerprint(identity::seed_for(identity), width, height);
        let mut cache = self
            .fingerprints
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        debug!(identity = %identity, width, height, "render fingerprint derived");
        Ok(cache.entry(key).or_insert(fingerprint).clone())
    }

    /// Drop cached fingerprints for `identity`
    pub fn clear_cache(&self, identity: &str) -> Result<usize> {
        let mut cache = self
            .fingerprints
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        let before = cache.len();
        cache.retain(|(id, _, _), _| id != identity);
        Ok(before - cache.len())
    }

    pub fn clear_all(&self) -> Result<()> {
        self.fingerprints
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .clear();
        Ok(())
    }

    pub fn cached_count(&self) -> usize {
        self.fingerprints.read().map(|c| c.len()).unwrap_or(0)
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_input(format!(
            "raster dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| Error::invalid_input(format!("raster {}x{} is too large", width, height)))
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Pure derivation from the seed and dimensions
fn derive_fingerprint(seed: u64, width: u32, height: u32) -> RenderFingerprint {
    let payload_seed = mix64(seed ^ ((width as u64) << 32 | height as u64));
    let mut payload = vec![0u8; SYNTHETIC_PAYLOAD_LEN];
    Randomness::seeded(payload_seed).rng_mut().fill_bytes(&mut payload);

    let data_url = format!("data:image/png;base64,{}", BASE64.encode(&payload));
    let data_digest = sha256_hex(data_url.as_bytes());

    let hash = sha256_hex(format!("{:016x}:{}x{}:{}", seed, width, height, data_digest).as_bytes());
    let entropy = identity::unit_from_seed(mix64(seed ^ ENTROPY_SALT));

    RenderFingerprint {
        hash,
        width,
        height,
        data_digest,
        entropy,
    }
}
