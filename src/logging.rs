//! Structured logging setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging based on CLI arguments
///
/// `RUST_LOG` or `TXTDUMP_LOG` override the CLI level when set.
pub fn init_tracing(verbose: bool, log_level: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "warn",
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("TXTDUMP_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}

/// Scope a bare level to this crate; full directives pass through
fn filter_directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("txtdump={}", level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("info"), "txtdump=info");
        assert_eq!(filter_directive("txtdump=trace,ignore=warn"), "txtdump=trace,ignore=warn");
    }
}
