//! # 传输指纹
//!
//! Static table of browser handshake profiles and per-identity selection.
//!
//! ## 主要功能
//! - **配置表**: cipher suites, curves and extensions in browser offer order
//! - **选择策略**: static, per-call, per-identity and market-share weighted
//! - **请求头**: header templates consistent with the selected browser and OS
//! - **JA3**: fingerprint string and MD5 hash
//!
//! ## 使用示例
//! ```rust,no_run
//! use ghost_engine::transport::{ProfileFilter, RotationStrategy, TransportRegistry};
//!
//! let registry = TransportRegistry::default();
//! let profile = registry
//!     .profile_for("worker-7", RotationStrategy::Adaptive, &ProfileFilter::any())
//!     .unwrap();
//! println!("{} -> {}", profile.id, ghost_engine::transport::ja3::fingerprint(profile).hash);
//! ```

pub mod profiles;
pub mod registry;
pub mod headers;
pub mod ja3;

use serde::{Deserialize, Serialize};

pub use profiles::{
    BrowserFamily, OperatingSystem, TlsVersion, TransportProfile, DEFAULT_PROFILE_ID, PROFILES,
};
pub use registry::{ProfileFilter, RotationStrategy, TransportRegistry};
pub use headers::{headers_for, user_agent, HeaderSet};
pub use ja3::Ja3Fingerprint;

/// Transport selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub strategy: RotationStrategy,
    /// Profile served by the static strategy
    pub default_profile: String,
    pub filter: ProfileFilter,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::Adaptive,
            default_profile: DEFAULT_PROFILE_ID.to_string(),
            filter: ProfileFilter::any(),
        }
    }
}

impl TransportConfig {
    /// Build the registry and check the configured strategy can be served
    pub fn registry(&self) -> crate::Result<TransportRegistry> {
        let registry = TransportRegistry::new(&self.default_profile)?;
        registry.validate(self.strategy, &self.filter)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds() {
        let registry = TransportConfig::default().registry().unwrap();
        assert_eq!(registry.default_profile().id, DEFAULT_PROFILE_ID);
    }

    #[test]
    fn test_config_rejects_unservable_filter() {
        let config = TransportConfig {
            filter: ProfileFilter {
                browsers: vec![BrowserFamily::Edge],
                operating_systems: vec![OperatingSystem::IOS],
            },
            ..Default::default()
        };
        assert!(matches!(config.registry(), Err(crate::Error::Configuration(_))));
    }

    #[test]
    fn test_config_from_toml() {
        let config: TransportConfig = toml::from_str(
            r#"
            strategy = "per-identity"
            default_profile = "safari-18-macos"

            [filter]
            browsers = ["safari", "firefox"]
            operating_systems = ["macos"]
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy, RotationStrategy::PerIdentity);
        assert_eq!(config.filter.browsers, vec![BrowserFamily::Safari, BrowserFamily::Firefox]);
        assert_eq!(config.filter.operating_systems, vec![OperatingSystem::MacOS]);
        assert!(config.registry().is_ok());
    }
}
