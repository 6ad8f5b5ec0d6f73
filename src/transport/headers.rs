//! Request header templates
//!
//! Header sets consistent with a transport profile's browser and OS. Each
//! browser family sends its headers in its own order, so the set is an
//! ordered list rather than a map.

use serde::Serialize;

use super::profiles::{BrowserFamily, OperatingSystem, TransportProfile};

/// Ordered request headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSet {
    headers: Vec<(String, String)>,
}

impl HeaderSet {
    fn new() -> Self {
        Self { headers: Vec::new() }
    }

    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.headers.push((name.to_string(), value.into()));
    }

    /// Value of header `name`, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Header names in send order
    pub fn names(&self) -> Vec<&str> {
        self.headers.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const ACCEPT_HTML_FIREFOX: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_HTML_SAFARI: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// User-Agent string for a profile
pub fn user_agent(profile: &TransportProfile) -> String {
    let major = profile.major_version();
    let version = profile.browser_version;

    match (profile.browser, profile.os) {
        (BrowserFamily::Chrome, os) => format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 {}Safari/537.36",
            chromium_platform(os),
            major,
            if os.is_mobile() { "Mobile " } else { "" }
        ),
        (BrowserFamily::Edge, os) => format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{major}.0.0.0 Safari/537.36 Edg/{major}.0.0.0",
            chromium_platform(os),
            major = major
        ),
        (BrowserFamily::Firefox, os) => {
            let platform = match os {
                OperatingSystem::Windows => "Windows NT 10.0; Win64; x64",
                OperatingSystem::MacOS => "Macintosh; Intel Mac OS X 10.15",
                OperatingSystem::Android => "Android 14; Mobile",
                OperatingSystem::Linux | OperatingSystem::IOS => "X11; Ubuntu; Linux x86_64",
            };
            format!(
                "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
                platform, version, version
            )
        }
        (BrowserFamily::Safari, OperatingSystem::IOS) => format!(
            "Mozilla/5.0 (iPhone; CPU iPhone OS {} like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{} Mobile/15E148 Safari/604.1",
            version.replace('.', "_"),
            version
        ),
        (BrowserFamily::Safari, _) => format!(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{} Safari/605.1.15",
            version
        ),
    }
}

fn chromium_platform(os: OperatingSystem) -> &'static str {
    match os {
        OperatingSystem::Windows => "Windows NT 10.0; Win64; x64",
        OperatingSystem::MacOS => "Macintosh; Intel Mac OS X 10_15_7",
        OperatingSystem::Linux => "X11; Linux x86_64",
        OperatingSystem::Android => "Linux; Android 10; K",
        OperatingSystem::IOS => "iPhone; CPU iPhone OS 18_2 like Mac OS X",
    }
}

fn client_hint_platform(os: OperatingSystem) -> &'static str {
    match os {
        OperatingSystem::Windows => "\"Windows\"",
        OperatingSystem::MacOS => "\"macOS\"",
        OperatingSystem::Linux => "\"Linux\"",
        OperatingSystem::Android => "\"Android\"",
        OperatingSystem::IOS => "\"iOS\"",
    }
}

fn client_hint_brands(profile: &TransportProfile) -> String {
    let major = profile.major_version();
    match profile.browser {
        BrowserFamily::Edge => format!(
            "\"Microsoft Edge\";v=\"{major}\", \"Chromium\";v=\"{major}\", \"Not_A Brand\";v=\"24\"",
            major = major
        ),
        _ => format!(
            "\"Google Chrome\";v=\"{major}\", \"Chromium\";v=\"{major}\", \"Not_A Brand\";v=\"24\"",
            major = major
        ),
    }
}

/// Navigation request headers for a profile, in the browser's send order
pub fn headers_for(profile: &TransportProfile) -> HeaderSet {
    let mut headers = HeaderSet::new();
    let ua = user_agent(profile);

    match profile.browser {
        BrowserFamily::Chrome | BrowserFamily::Edge => {
            headers.push("sec-ch-ua", client_hint_brands(profile));
            headers.push("sec-ch-ua-mobile", if profile.os.is_mobile() { "?1" } else { "?0" });
            headers.push("sec-ch-ua-platform", client_hint_platform(profile.os));
            headers.push("Upgrade-Insecure-Requests", "1");
            headers.push("User-Agent", ua);
            headers.push("Accept", ACCEPT_HTML);
            headers.push("Sec-Fetch-Site", "none");
            headers.push("Sec-Fetch-Mode", "navigate");
            headers.push("Sec-Fetch-User", "?1");
            headers.push("Sec-Fetch-Dest", "document");
            headers.push("Accept-Encoding", "gzip, deflate, br, zstd");
            headers.push("Accept-Language", ACCEPT_LANGUAGE);
        }
        BrowserFamily::Firefox => {
            headers.push("User-Agent", ua);
            headers.push("Accept", ACCEPT_HTML_FIREFOX);
            headers.push("Accept-Language", "en-US,en;q=0.5");
            headers.push("Accept-Encoding", "gzip, deflate, br, zstd");
            headers.push("Upgrade-Insecure-Requests", "1");
            headers.push("Sec-Fetch-Dest", "document");
            headers.push("Sec-Fetch-Mode", "navigate");
            headers.push("Sec-Fetch-Site", "none");
            headers.push("Sec-Fetch-User", "?1");
            headers.push("Priority", "u=0, i");
        }
        BrowserFamily::Safari => {
            headers.push("Accept", ACCEPT_HTML_SAFARI);
            headers.push("Sec-Fetch-Site", "none");
            headers.push("Accept-Encoding", "gzip, deflate, br");
            headers.push("Sec-Fetch-Mode", "navigate");
            headers.push("User-Agent", ua);
            headers.push("Accept-Language", ACCEPT_LANGUAGE);
            headers.push("Sec-Fetch-Dest", "document");
            headers.push("Priority", "u=0, i");
        }
    }

    headers
}
