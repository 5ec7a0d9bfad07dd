//! Logging setup utilities for the live-stream binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive: every listed target at `default_log_level`.
fn default_directive(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// `targets` are the crate or binary names whose events should be shown.
/// The filter can be overridden using the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use livestream_shared::logger::setup_logger;
///
/// setup_logger(&["livestream-server", "livestream_server"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_normalizes_targets() {
        // テスト項目: ハイフンを含むターゲット名がアンダースコアに正規化される
        // given (前提条件):
        let targets = ["livestream-server", "tower_http"];

        // when (操作):
        let directive = default_directive(&targets, "debug");

        // then (期待する結果):
        assert_eq!(directive, "livestream_server=debug,tower_http=debug");
    }

    #[test]
    fn test_default_directive_with_no_targets() {
        // テスト項目: ターゲットが空の場合、空のディレクティブになる
        // given (前提条件):
        let targets: [&str; 0] = [];

        // when (操作):
        let directive = default_directive(&targets, "info");

        // then (期待する結果):
        assert!(directive.is_empty());
    }
}
