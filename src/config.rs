use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "PixelCalc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title printed at the top of every report page.
pub const REPORT_TITLE: &str = "Digital Image Processing Report";

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "pixelcalc_lib=info,pixelcalc=info,tower_http=warn"
}

const DEFAULT_BIND: &str = "127.0.0.1:8501";
const DEFAULT_MAX_UPLOAD_MB: u64 = 20;
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Per-image upload cap in bytes.
    pub max_upload_bytes: u64,
    /// Quality of the intermediate JPEG files embedded in the report.
    pub jpeg_quality: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8501))),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `PIXELCALC_BIND`, `PIXELCALC_MAX_UPLOAD_MB`
    /// and `PIXELCALC_JPEG_QUALITY`. Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("PIXELCALC_BIND") {
            match raw.parse::<SocketAddr>() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(value = %raw, "Ignoring PIXELCALC_BIND: {e}"),
            }
        }

        if let Some(raw) = lookup("PIXELCALC_MAX_UPLOAD_MB") {
            match raw.parse::<u64>() {
                Ok(mb) if mb > 0 => config.max_upload_bytes = mb * 1024 * 1024,
                _ => tracing::warn!(value = %raw, "Ignoring PIXELCALC_MAX_UPLOAD_MB"),
            }
        }

        if let Some(raw) = lookup("PIXELCALC_JPEG_QUALITY") {
            match raw.parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => config.jpeg_quality = q,
                _ => tracing::warn!(value = %raw, "Ignoring PIXELCALC_JPEG_QUALITY"),
            }
        }

        config
    }

    /// Request body limit: two images plus multipart overhead.
    pub fn body_limit(&self) -> usize {
        (self.max_upload_bytes as usize)
            .saturating_mul(2)
            .saturating_add(1024 * 1024)
    }
}
