//! Logging setup and standard spans.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` overrides the default `info` filter; `NUITBOT_LOG_FORMAT=json`
/// switches to one JSON object per line.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("NUITBOT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for a supervised socket.
    pub fn link(name: &str, url: &str) -> Span {
        info_span!("link", name = %name, url = %url)
    }

    /// Create a span for one dispatched chat event.
    pub fn event(channel: &str, user: &str) -> Span {
        info_span!("event", channel = %channel, user = %user)
    }

    /// Create a span for a mentality sequence.
    pub fn mentality(display_name: &str) -> Span {
        info_span!("mentality", name = %display_name)
    }
}
