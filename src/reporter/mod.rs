//! Reporting sinks for checkscope.
//!
//! A reporter is the external collaborator that consumes the structured
//! start/stop notifications of sections and steps, typically to render a
//! human-readable test report. The core never depends on what a sink does
//! with the events: it only guarantees their order and correlation.
//!
//! Every section open produces exactly one [`section_start`] and one
//! [`section_stop`] notification carrying the same freshly generated id, so
//! correlated pairs can be matched even when sections nest or run in quick
//! sequence. The stop notification always fires before the section's
//! aggregated failure (if any) is surfaced to the caller.
//!
//! Implement [`SectionReporter`] to plug in a rendering backend. All methods
//! default to no-ops, so a sink only has to handle the events it cares about.
//!
//! [`section_start`]: SectionReporter::section_start
//! [`section_stop`]: SectionReporter::section_stop

use std::borrow::Cow;

use uuid::Uuid;

use crate::failure::{Failure, SectionError};

mod no;
pub use no::*;

mod recording;
pub use recording::*;

mod tracing;
pub use tracing::*;

/// Display parameters attached to a section, forwarded verbatim to the sink
/// with the start notification.
pub type SectionParams = [(Cow<'static, str>, Cow<'static, str>)];

/// The final result of a section, as handed to the sink's stop notification.
#[derive(Debug, Clone, Copy)]
pub enum SectionOutcome<'a> {
    Passed,
    Failed(&'a SectionError),
}

impl<'a> SectionOutcome<'a> {
    pub fn passed(&self) -> bool {
        matches!(self, SectionOutcome::Passed)
    }

    pub fn failed(&self) -> bool {
        matches!(self, SectionOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&'a SectionError> {
        match self {
            SectionOutcome::Passed => None,
            SectionOutcome::Failed(error) => Some(error),
        }
    }
}

pub trait SectionReporter {
    /// Called once per section open, before any step runs.
    fn section_start(&self, id: Uuid, title: &str, params: &SectionParams) {
        let _ = (id, title, params);
    }

    /// Called once per section close, after all steps ran and before any
    /// aggregated failure reaches the caller.
    fn section_stop(&self, id: Uuid, title: &str, outcome: SectionOutcome<'_>) {
        let _ = (id, title, outcome);
    }

    /// Called when a step's boundary is entered.
    fn step_start(&self, section: Uuid, name: &str) {
        let _ = (section, name);
    }

    /// Called when a step's boundary is exited, with the failure captured
    /// there, if any.
    fn step_stop(&self, section: Uuid, name: &str, failure: Option<&Failure>) {
        let _ = (section, name, failure);
    }
}
