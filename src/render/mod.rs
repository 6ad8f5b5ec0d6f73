//! # 渲染指纹
//!
//! Deterministic raster noise and synthetic render/hardware fingerprints.
//!
//! ## 模块结构
//! - `mutator`: Perlin pixel noise over RGBA buffers, cached `RenderFingerprint`
//! - `hardware`: GPU, audio and navigator hardware values per identity

pub mod mutator;
pub mod hardware;

pub use mutator::{RenderConfig, RenderFingerprint, RenderMutator};
pub use hardware::{AudioProfile, HardwareProfile};
