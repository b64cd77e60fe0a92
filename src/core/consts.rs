//! Constants shared by the client: endpoints, impersonation headers, payloads.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

pub const API_BASE_URL: &str = "https://api.edge-gateway.siriusxm.com";
pub const PLAYER_PAGE_URL: &str = "https://www.siriusxm.com/player";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const LINEAR_CHANNEL_TYPE: &str = "channel-linear";

/// Linear channels share one well-known key id instead of a per-stream one.
pub const LINEAR_CHANNEL_KEY_ID: &str = "00000000-0000-0000-0000-000000000000";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";

/// The edge gateway rejects requests that do not look like the web player,
/// so every request carries this browser-impersonating header set.
pub fn request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("accept", HeaderValue::from_static("application/json; charset=utf-8"));
    headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        "baggage",
        HeaderValue::from_static("sentry-environment=prod,sentry-release=release-sxm-player-7.0"),
    );
    headers.insert(
        "content-type",
        HeaderValue::from_static("application/json; charset=UTF-8"),
    );
    headers.insert("dnt", HeaderValue::from_static("1"));
    headers.insert("origin", HeaderValue::from_static("https://www.siriusxm.com"));
    headers.insert("referer", HeaderValue::from_static("https://www.siriusxm.com/"));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static("'Not_A Brand';v='8', 'Chromium';v='120', 'Microsoft Edge';v='120'"),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("'macOS'"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-site"));
    headers.insert("user-agent", HeaderValue::from_static(USER_AGENT));
    headers.insert("x-sxm-clock", HeaderValue::from_static("[0,0]"));
    headers.insert("x-sxm-platform", HeaderValue::from_static("browser"));
    headers.insert("x-sxm-tenant", HeaderValue::from_static("sxm"));
    headers
}

/// Device registration payload describing a desktop web browser.
pub fn device_payload() -> serde_json::Value {
    serde_json::json!({
        "devicePlatform": "web-desktop",
        "deviceAttributes": {
            "browser": {
                "browserVersion": "120.0.0.0",
                "browser": "Edge",
                "userAgent": USER_AGENT,
                "sdk": "web",
                "app": "web",
                "sdkVersion": "120.0.0.0",
                "appVersion": "120.0.0.0",
            },
        },
    })
}
