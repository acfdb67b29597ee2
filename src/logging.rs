use tracing::warn;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "warn";

/// Build the filter for `directive`, falling back to [`DEFAULT_LEVEL`].
/// The parse error is returned alongside so it can be logged once the
/// subscriber is up.
pub fn filter_for(directive: Option<&str>) -> (EnvFilter, Option<String>) {
    match directive.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(e)) => (EnvFilter::new(DEFAULT_LEVEL), Some(e.to_string())),
        None => (EnvFilter::new(DEFAULT_LEVEL), None),
    }
}

/// Install the global `fmt` subscriber on stderr. Stdout carries command
/// output only.
pub fn init(directive: Option<&str>) {
    let (filter, rejected) = filter_for(directive);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Some(reason) = rejected {
        warn!(
            directive = directive.unwrap_or_default(),
            "invalid log filter, using {DEFAULT_LEVEL}: {reason}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_directive_is_kept() {
        let (filter, rejected) = filter_for(Some("tasktree=debug"));
        assert!(rejected.is_none());
        assert!(filter.to_string().contains("tasktree"));
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        let (filter, rejected) = filter_for(Some("tasktree=loud"));
        assert!(rejected.is_some());
        assert_eq!(filter.to_string(), DEFAULT_LEVEL);
    }

    #[test]
    fn test_missing_directive_uses_default() {
        let (filter, rejected) = filter_for(None);
        assert!(rejected.is_none());
        assert_eq!(filter.to_string(), DEFAULT_LEVEL);
    }
}
