//! Process-wide logging setup shared by the storefront binaries.

pub mod subscriber;

pub use subscriber::{LogFormat, SubscriberSettings};

/// Install the global tracing subscriber using `RUST_LOG` / `LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init(&SubscriberSettings::from_env());
}
