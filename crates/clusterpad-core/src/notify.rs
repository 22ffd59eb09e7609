//! User-facing status messages routed onto the `log` facade.

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An operation completed, such as a callback being connected.
    Success,
    Error,
    Warning,
    /// Message is dropped.
    Suppressed,
}

/// Report a message at the given severity. Never fails.
pub fn show_message(severity: Severity, message: &str) {
    match severity {
        Severity::Success => log::info!("{}", message),
        Severity::Error => log::error!("{}", message),
        Severity::Warning => log::warn!("{}", message),
        Severity::Suppressed => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_severity_is_accepted() {
        for severity in [
            Severity::Success,
            Severity::Error,
            Severity::Warning,
            Severity::Suppressed,
        ] {
            show_message(severity, "status");
        }
    }
}
