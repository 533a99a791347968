//! Structured diagnostic events for the action pipeline.
//!
//! Every event carries the emitting component, an event name and a JSON details
//! payload. A [`Diagnostics`] value is handed to the pipeline at construction;
//! when it is disabled no diagnostic output is produced at all.

use serde_json::Value;

const COMPONENT: &str = "pipeline_action";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    verbose: bool,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn verbose() -> Self {
        Self::new(true)
    }

    /// Interprets a toggle value such as `1`, `true`, `on` or `yes` (case-insensitive).
    /// Anything else, including an unset value, disables diagnostics.
    pub fn from_toggle(value: Option<&str>) -> Self {
        let verbose = value
            .map(|raw| {
                matches!(
                    raw.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "on" | "yes"
                )
            })
            .unwrap_or(false);
        Self::new(verbose)
    }

    pub fn is_enabled(&self) -> bool {
        self.verbose
    }

    pub fn info(&self, event: &str, details: Value) {
        if !self.verbose {
            return;
        }
        tracing::info!(component = COMPONENT, event, details = %details, "{event}");
    }

    pub fn error(&self, event: &str, details: Value) {
        if !self.verbose {
            return;
        }
        tracing::error!(component = COMPONENT, event, details = %details, "{event}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_values_enable_diagnostics() {
        for value in ["1", "true", "TRUE", " on ", "yes"] {
            assert!(Diagnostics::from_toggle(Some(value)).is_enabled(), "{value}");
        }
    }

    #[test]
    fn unset_or_other_values_disable_diagnostics() {
        assert!(!Diagnostics::from_toggle(None).is_enabled());
        for value in ["", "0", "false", "off", "verbose"] {
            assert!(!Diagnostics::from_toggle(Some(value)).is_enabled(), "{value}");
        }
    }

    #[test]
    fn default_is_disabled() {
        assert_eq!(Diagnostics::default(), Diagnostics::disabled());
    }
}
