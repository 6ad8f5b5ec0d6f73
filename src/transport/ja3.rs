//! JA3 client fingerprints
//!
//! The JA3 string is five comma-separated fields:
//!
//! ```text
//! TLSVersion,Ciphers,Extensions,EllipticCurves,EllipticCurvePointFormats
//! ```
//!
//! Each field holds decimal ids joined by `-`, in offer order. `TLSVersion`
//! is the ClientHello legacy version, which is `771` (TLS 1.2) even when
//! TLS 1.3 is negotiated through `supported_versions`. GREASE values are not
//! part of the table and so never appear. The hash is the lowercase hex MD5
//! of the string's UTF-8 bytes.

use serde::Serialize;

use super::profiles::{TlsVersion, TransportProfile};

/// JA3 string and its MD5 digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ja3Fingerprint {
    pub string: String,
    pub hash: String,
}

fn join<T: ToString>(ids: impl IntoIterator<Item = T>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// JA3 string for a profile
pub fn ja3_string(profile: &TransportProfile) -> String {
    // The legacy version field is capped at TLS 1.2
    let version = profile.max_version.min(TlsVersion::Tls12).wire_id();

    format!(
        "{},{},{},{},{}",
        version,
        join(profile.cipher_suite_ids()),
        join(profile.extensions.iter()),
        join(profile.curve_ids()),
        join(profile.point_formats.iter()),
    )
}

/// Lowercase hex MD5 of a JA3 string
pub fn ja3_hash(ja3: &str) -> String {
    format!("{:x}", md5::compute(ja3.as_bytes()))
}

/// JA3 string and hash for a profile
pub fn fingerprint(profile: &TransportProfile) -> Ja3Fingerprint {
    let string = ja3_string(profile);
    let hash = ja3_hash(&string);
    Ja3Fingerprint { string, hash }
}
