use boil_traits::{Notifier, Severity};

/// Notifier that only writes to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Warning => tracing::warn!(title, "{message}"),
            Severity::Info | Severity::Success => {
                tracing::info!(title, severity = severity.as_str(), "{message}")
            }
        }
    }
}
