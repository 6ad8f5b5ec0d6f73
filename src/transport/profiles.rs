//! Static handshake profile table
//!
//! Realistic browser/OS handshake records with approximate market share.
//! Cipher suites, extensions and curves are listed in the exact order the
//! browser offers them; that order is part of the fingerprint and is never
//! sorted.

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Browser family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFamily {
    Chrome,
    Edge,
    Firefox,
    Safari,
}

impl BrowserFamily {
    /// Chromium-based browsers send client hints
    pub fn is_chromium(&self) -> bool {
        matches!(self, BrowserFamily::Chrome | BrowserFamily::Edge)
    }
}

impl fmt::Display for BrowserFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrowserFamily::Chrome => "chrome",
            BrowserFamily::Edge => "edge",
            BrowserFamily::Firefox => "firefox",
            BrowserFamily::Safari => "safari",
        };
        f.write_str(name)
    }
}

/// Operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    MacOS,
    Linux,
    Android,
    #[serde(rename = "ios")]
    IOS,
}

impl OperatingSystem {
    pub fn is_mobile(&self) -> bool {
        matches!(self, OperatingSystem::Android | OperatingSystem::IOS)
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperatingSystem::Windows => "windows",
            OperatingSystem::MacOS => "macos",
            OperatingSystem::Linux => "linux",
            OperatingSystem::Android => "android",
            OperatingSystem::IOS => "ios",
        };
        f.write_str(name)
    }
}

/// TLS protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsVersion {
    #[serde(rename = "TLSv1.2")]
    Tls12,
    #[serde(rename = "TLSv1.3")]
    Tls13,
}

impl TlsVersion {
    /// Wire identifier
    pub fn wire_id(&self) -> u16 {
        match self {
            TlsVersion::Tls12 => 0x0303,
            TlsVersion::Tls13 => 0x0304,
        }
    }
}

/// One immutable handshake profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportProfile {
    pub id: &'static str,
    pub browser: BrowserFamily,
    pub browser_version: &'static str,
    pub os: OperatingSystem,
    /// IANA cipher suite names in offer order
    pub cipher_suites: &'static [&'static str],
    pub min_version: TlsVersion,
    pub max_version: TlsVersion,
    pub signature_algorithms: &'static [&'static str],
    /// Named groups in offer order
    pub curves: &'static [&'static str],
    pub alpn_protocols: &'static [&'static str],
    /// Extension ids in offer order, GREASE omitted
    pub extensions: &'static [u16],
    pub point_formats: &'static [u8],
    pub session_timeout_secs: u32,
    /// Share of the browsing population, used as a selection weight
    pub market_share: f64,
}

impl TransportProfile {
    /// Cipher suite ids in offer order
    pub fn cipher_suite_ids(&self) -> Vec<u16> {
        self.cipher_suites
            .iter()
            .filter_map(|name| CIPHER_SUITE_IDS.get(name).copied())
            .collect()
    }

    /// Named group ids in offer order
    pub fn curve_ids(&self) -> Vec<u16> {
        self.curves
            .iter()
            .filter_map(|name| CURVE_IDS.get(name).copied())
            .collect()
    }

    /// Major browser version, e.g. `131` for `131.0.6778.86`
    pub fn major_version(&self) -> &'static str {
        self.browser_version
            .split('.')
            .next()
            .unwrap_or(self.browser_version)
    }
}

/// IANA cipher suite registry subset
pub static CIPHER_SUITE_IDS: phf::Map<&'static str, u16> = phf_map! {
    "TLS_AES_128_GCM_SHA256" => 0x1301,
    "TLS_AES_256_GCM_SHA384" => 0x1302,
    "TLS_CHACHA20_POLY1305_SHA256" => 0x1303,
    "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256" => 0xc02b,
    "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256" => 0xc02f,
    "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384" => 0xc02c,
    "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384" => 0xc030,
    "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256" => 0xcca9,
    "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256" => 0xcca8,
    "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA" => 0xc009,
    "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA" => 0xc00a,
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA" => 0xc013,
    "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA" => 0xc014,
    "TLS_RSA_WITH_AES_128_GCM_SHA256" => 0x009c,
    "TLS_RSA_WITH_AES_256_GCM_SHA384" => 0x009d,
    "TLS_RSA_WITH_AES_128_CBC_SHA" => 0x002f,
    "TLS_RSA_WITH_AES_256_CBC_SHA" => 0x0035,
    "TLS_RSA_WITH_3DES_EDE_CBC_SHA" => 0x000a,
};

/// IANA named group registry subset
pub static CURVE_IDS: phf::Map<&'static str, u16> = phf_map! {
    "X25519MLKEM768" => 0x11ec,
    "x25519" => 0x001d,
    "secp256r1" => 0x0017,
    "secp384r1" => 0x0018,
    "secp521r1" => 0x0019,
    "ffdhe2048" => 0x0100,
    "ffdhe3072" => 0x0101,
};

const CHROMIUM_CIPHERS: &[&str] = &[
    "TLS_AES_128_GCM_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "TLS_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
    "TLS_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_RSA_WITH_AES_128_CBC_SHA",
    "TLS_RSA_WITH_AES_256_CBC_SHA",
];

const FIREFOX_CIPHERS: &[&str] = &[
    "TLS_AES_128_GCM_SHA256",
    "TLS_CHACHA20_POLY1305_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
    "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
    "TLS_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_RSA_WITH_AES_128_CBC_SHA",
    "TLS_RSA_WITH_AES_256_CBC_SHA",
];

const SAFARI_CIPHERS: &[&str] = &[
    "TLS_AES_128_GCM_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "TLS_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
    "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
    "TLS_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_RSA_WITH_AES_256_CBC_SHA",
    "TLS_RSA_WITH_AES_128_CBC_SHA",
    "TLS_RSA_WITH_3DES_EDE_CBC_SHA",
];

const CHROMIUM_SIGNATURES: &[&str] = &[
    "ecdsa_secp256r1_sha256",
    "rsa_pss_rsae_sha256",
    "rsa_pkcs1_sha256",
    "ecdsa_secp384r1_sha384",
    "rsa_pss_rsae_sha384",
    "rsa_pkcs1_sha384",
    "rsa_pss_rsae_sha512",
    "rsa_pkcs1_sha512",
];

const FIREFOX_SIGNATURES: &[&str] = &[
    "ecdsa_secp256r1_sha256",
    "ecdsa_secp384r1_sha384",
    "ecdsa_secp521r1_sha512",
    "rsa_pss_rsae_sha256",
    "rsa_pss_rsae_sha384",
    "rsa_pss_rsae_sha512",
    "rsa_pkcs1_sha256",
    "rsa_pkcs1_sha384",
    "rsa_pkcs1_sha512",
    "ecdsa_sha1",
    "rsa_pkcs1_sha1",
];

const SAFARI_SIGNATURES: &[&str] = &[
    "ecdsa_secp256r1_sha256",
    "rsa_pss_rsae_sha256",
    "rsa_pkcs1_sha256",
    "ecdsa_secp384r1_sha384",
    "ecdsa_sha1",
    "rsa_pss_rsae_sha384",
    "rsa_pkcs1_sha384",
    "rsa_pss_rsae_sha512",
    "rsa_pkcs1_sha512",
    "rsa_pkcs1_sha1",
];

const CHROMIUM_CURVES: &[&str] = &["X25519MLKEM768", "x25519", "secp256r1", "secp384r1"];
const FIREFOX_CURVES: &[&str] = &[
    "X25519MLKEM768",
    "x25519",
    "secp256r1",
    "secp384r1",
    "secp521r1",
    "ffdhe2048",
    "ffdhe3072",
];
const SAFARI_CURVES: &[&str] = &["x25519", "secp256r1", "secp384r1", "secp521r1"];

const CHROMIUM_EXTENSIONS: &[u16] = &[
    0, 23, 65281, 10, 11, 35, 16, 5, 13, 18, 51, 45, 43, 27, 17513, 65037,
];
const FIREFOX_EXTENSIONS: &[u16] = &[0, 23, 65281, 10, 11, 35, 16, 5, 34, 51, 43, 13, 45, 28, 27, 65037];
const SAFARI_EXTENSIONS: &[u16] = &[0, 23, 65281, 10, 11, 16, 5, 13, 18, 51, 45, 43, 27, 21];

const H2_ALPN: &[&str] = &["h2", "http/1.1"];
const UNCOMPRESSED: &[u8] = &[0];

/// Profile served by the static strategy unless configured otherwise
pub const DEFAULT_PROFILE_ID: &str = "chrome-131-windows";

/// All known profiles
pub static PROFILES: &[TransportProfile] = &[
    TransportProfile {
        id: "chrome-131-windows",
        browser: BrowserFamily::Chrome,
        browser_version: "131.0.6778.86",
        os: OperatingSystem::Windows,
        cipher_suites: CHROMIUM_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: CHROMIUM_SIGNATURES,
        curves: CHROMIUM_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: CHROMIUM_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 7200,
        market_share: 0.34,
    },
    TransportProfile {
        id: "chrome-131-macos",
        browser: BrowserFamily::Chrome,
        browser_version: "131.0.6778.86",
        os: OperatingSystem::MacOS,
        cipher_suites: CHROMIUM_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: CHROMIUM_SIGNATURES,
        curves: CHROMIUM_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: CHROMIUM_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 7200,
        market_share: 0.09,
    },
    TransportProfile {
        id: "chrome-131-linux",
        browser: BrowserFamily::Chrome,
        browser_version: "131.0.6778.85",
        os: OperatingSystem::Linux,
        cipher_suites: CHROMIUM_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: CHROMIUM_SIGNATURES,
        curves: CHROMIUM_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: CHROMIUM_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 7200,
        market_share: 0.04,
    },
    TransportProfile {
        id: "chrome-131-android",
        browser: BrowserFamily::Chrome,
        browser_version: "131.0.6778.81",
        os: OperatingSystem::Android,
        cipher_suites: CHROMIUM_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: CHROMIUM_SIGNATURES,
        curves: CHROMIUM_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: CHROMIUM_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 7200,
        market_share: 0.18,
    },
    TransportProfile {
        id: "edge-131-windows",
        browser: BrowserFamily::Edge,
        browser_version: "131.0.2903.86",
        os: OperatingSystem::Windows,
        cipher_suites: CHROMIUM_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: CHROMIUM_SIGNATURES,
        curves: CHROMIUM_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: CHROMIUM_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 7200,
        market_share: 0.10,
    },
    TransportProfile {
        id: "firefox-133-windows",
        browser: BrowserFamily::Firefox,
        browser_version: "133.0",
        os: OperatingSystem::Windows,
        cipher_suites: FIREFOX_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: FIREFOX_SIGNATURES,
        curves: FIREFOX_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: FIREFOX_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 86400,
        market_share: 0.05,
    },
    TransportProfile {
        id: "firefox-133-macos",
        browser: BrowserFamily::Firefox,
        browser_version: "133.0",
        os: OperatingSystem::MacOS,
        cipher_suites: FIREFOX_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: FIREFOX_SIGNATURES,
        curves: FIREFOX_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: FIREFOX_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 86400,
        market_share: 0.015,
    },
    TransportProfile {
        id: "firefox-133-linux",
        browser: BrowserFamily::Firefox,
        browser_version: "133.0",
        os: OperatingSystem::Linux,
        cipher_suites: FIREFOX_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: FIREFOX_SIGNATURES,
        curves: FIREFOX_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: FIREFOX_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 86400,
        market_share: 0.015,
    },
    TransportProfile {
        id: "safari-18-macos",
        browser: BrowserFamily::Safari,
        browser_version: "18.2",
        os: OperatingSystem::MacOS,
        cipher_suites: SAFARI_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: SAFARI_SIGNATURES,
        curves: SAFARI_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: SAFARI_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 604800,
        market_share: 0.06,
    },
    TransportProfile {
        id: "safari-18-ios",
        browser: BrowserFamily::Safari,
        browser_version: "18.2",
        os: OperatingSystem::IOS,
        cipher_suites: SAFARI_CIPHERS,
        min_version: TlsVersion::Tls12,
        max_version: TlsVersion::Tls13,
        signature_algorithms: SAFARI_SIGNATURES,
        curves: SAFARI_CURVES,
        alpn_protocols: H2_ALPN,
        extensions: SAFARI_EXTENSIONS,
        point_formats: UNCOMPRESSED,
        session_timeout_secs: 604800,
        market_share: 0.11,
    },
];

/// Look up a profile by id
pub fn find(id: &str) -> Option<&'static TransportProfile> {
    PROFILES.iter().find(|p| p.id == id)
}
