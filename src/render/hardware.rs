//! Per-identity hardware characteristics
//!
//! GPU strings, audio parameters and navigator hardware values. Tables are
//! chosen by the platform the identity presents, and every field is a table
//! lookup or small integer derived from the identity seed with a modulo, so
//! an identity always reports the same machine.

use serde::Serialize;

use crate::transport::{BrowserFamily, OperatingSystem};

/// WebGL `UNMASKED_VENDOR_WEBGL` / `UNMASKED_RENDERER_WEBGL` pairs for Windows
pub const WINDOWS_GPUS: &[(&str, &str)] = &[
    (
        "Google Inc. (NVIDIA)",
        "ANGLE (NVIDIA, NVIDIA GeForce RTX 3080 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    ),
    (
        "Google Inc. (NVIDIA)",
        "ANGLE (NVIDIA, NVIDIA GeForce RTX 3070 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    ),
    (
        "Google Inc. (NVIDIA)",
        "ANGLE (NVIDIA, NVIDIA GeForce GTX 1660 SUPER Direct3D11 vs_5_0 ps_5_0, D3D11)",
    ),
    (
        "Google Inc. (Intel)",
        "ANGLE (Intel, Intel(R) UHD Graphics 630 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    ),
    (
        "Google Inc. (Intel)",
        "ANGLE (Intel, Intel(R) Iris(R) Xe Graphics Direct3D11 vs_5_0 ps_5_0, D3D11)",
    ),
    (
        "Google Inc. (AMD)",
        "ANGLE (AMD, AMD Radeon RX 6800 Direct3D11 vs_5_0 ps_5_0, D3D11)",
    ),
    (
        "Google Inc. (AMD)",
        "ANGLE (AMD, AMD Radeon RX 580 Series Direct3D11 vs_5_0 ps_5_0, D3D11)",
    ),
];

/// macOS through ANGLE on Metal (Chromium and Firefox)
pub const MACOS_GPUS: &[(&str, &str)] = &[
    (
        "Google Inc. (Apple)",
        "ANGLE (Apple, ANGLE Metal Renderer: Apple M1, Unspecified Version)",
    ),
    (
        "Google Inc. (Apple)",
        "ANGLE (Apple, ANGLE Metal Renderer: Apple M2, Unspecified Version)",
    ),
    (
        "Google Inc. (Apple)",
        "ANGLE (Apple, ANGLE Metal Renderer: Apple M3 Pro, Unspecified Version)",
    ),
    (
        "Google Inc. (Intel Inc.)",
        "ANGLE (Intel Inc., Intel(R) Iris(TM) Plus Graphics OpenGL Engine, OpenGL 4.1)",
    ),
];

/// Safari on macOS and every iOS browser mask the GPU
pub const APPLE_MASKED_GPUS: &[(&str, &str)] = &[("Apple Inc.", "Apple GPU")];

pub const LINUX_GPUS: &[(&str, &str)] = &[
    (
        "Google Inc. (NVIDIA Corporation)",
        "ANGLE (NVIDIA Corporation, NVIDIA GeForce RTX 3060/PCIe/SSE2, OpenGL 4.5.0)",
    ),
    (
        "Google Inc. (Intel)",
        "ANGLE (Intel, Mesa Intel(R) UHD Graphics 620 (KBL GT2), OpenGL 4.6)",
    ),
    (
        "Google Inc. (AMD)",
        "ANGLE (AMD, AMD Radeon RX 6700 XT (radeonsi, navi22, LLVM 15.0.7), OpenGL 4.6)",
    ),
];

pub const ANDROID_GPUS: &[(&str, &str)] = &[
    ("Qualcomm", "Adreno (TM) 740"),
    ("Qualcomm", "Adreno (TM) 660"),
    ("ARM", "Mali-G710 MC10"),
];

const DESKTOP_CONCURRENCY: &[u32] = &[4, 6, 8, 12, 16, 24, 32];
const MOBILE_CONCURRENCY: &[u32] = &[6, 8];
const DESKTOP_MEMORY_GB: &[u32] = &[4, 8, 16, 32];
const MOBILE_MEMORY_GB: &[u32] = &[4, 6, 8];
const COLOR_DEPTHS: &[u32] = &[24, 24, 24, 30];
const SAMPLE_RATES: &[u32] = &[44_100, 48_000];

/// GPU table a browser reports on an operating system
pub fn gpu_table(browser: BrowserFamily, os: OperatingSystem) -> &'static [(&'static str, &'static str)] {
    match os {
        OperatingSystem::Windows => WINDOWS_GPUS,
        OperatingSystem::MacOS if browser == BrowserFamily::Safari => APPLE_MASKED_GPUS,
        OperatingSystem::MacOS => MACOS_GPUS,
        OperatingSystem::Linux => LINUX_GPUS,
        OperatingSystem::Android => ANDROID_GPUS,
        OperatingSystem::IOS => APPLE_MASKED_GPUS,
    }
}

/// Audio stack parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioProfile {
    pub sample_rate: u32,
    /// Small signed skew applied to reported timing, in Hz
    pub sample_rate_offset: i32,
    pub oscillator_frequency: f64,
    pub noise_floor: f64,
}

/// Reported hardware for one identity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub gpu_vendor: &'static str,
    pub gpu_renderer: &'static str,
    pub hardware_concurrency: u32,
    pub device_memory: u32,
    pub color_depth: u32,
    pub audio: AudioProfile,
}

fn pick<T: Copy>(table: &[T], seed: u64, shift: u32) -> T {
    table[((seed >> shift) % table.len() as u64) as usize]
}

impl HardwareProfile {
    /// Hardware reported by the identity with this seed on `browser`/`os`
    pub fn for_platform(seed: u64, browser: BrowserFamily, os: OperatingSystem) -> Self {
        let (gpu_vendor, gpu_renderer) = pick(gpu_table(browser, os), seed, 0);
        let (concurrency, memory) = if os.is_mobile() {
            (MOBILE_CONCURRENCY, MOBILE_MEMORY_GB)
        } else {
            (DESKTOP_CONCURRENCY, DESKTOP_MEMORY_GB)
        };

        let audio = AudioProfile {
            sample_rate: pick(SAMPLE_RATES, seed, 40),
            sample_rate_offset: ((seed >> 44) % 7) as i32 - 3,
            oscillator_frequency: 10_000.0 + ((seed >> 48) % 100) as f64 * 0.5,
            noise_floor: 1e-7 * (1 + (seed >> 56) % 10) as f64,
        };

        Self {
            gpu_vendor,
            gpu_renderer,
            hardware_concurrency: pick(concurrency, seed, 8),
            device_memory: pick(memory, seed, 16),
            color_depth: pick(COLOR_DEPTHS, seed, 24),
            audio,
        }
    }
}
