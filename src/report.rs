//! Diagnostic sink for exporter warnings and progress notes.
//!
//! Reports are one-way: nothing the exporter does depends on them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

pub trait Reporter {
    fn report(&mut self, severity: Severity, message: &str);
}

/// Forwards reports to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => log::info!(target: "darts_export", "{message}"),
            Severity::Warning => log::warn!(target: "darts_export", "{message}"),
        }
    }
}

/// Keeps every report in memory, for hosts that surface them in their own UI.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub entries: Vec<(Severity, String)>,
}

impl CollectingReporter {
    pub fn warnings(&self) -> Vec<&str> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> Vec<&str> {
        self.with_severity(Severity::Info)
    }

    fn with_severity(&self, severity: Severity) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.as_str())
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, severity: Severity, message: &str) {
        self.entries.push((severity, message.to_string()));
    }
}
