use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    failure::Failure,
    reporter::{SectionOutcome, SectionParams, SectionReporter},
};

/// Renders notifications as structured tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl SectionReporter for TracingReporter {
    fn section_start(&self, id: Uuid, title: &str, params: &SectionParams) {
        info!(target: "checkscope::reporter", %id, title, ?params, "section started");
    }

    fn section_stop(&self, id: Uuid, title: &str, outcome: SectionOutcome<'_>) {
        match outcome.error() {
            None => info!(target: "checkscope::reporter", %id, title, "section passed"),
            Some(error) => warn!(
                target: "checkscope::reporter",
                %id,
                title,
                kind = error.kind().name(),
                %error,
                "section failed"
            ),
        }
    }

    fn step_start(&self, section: Uuid, name: &str) {
        info!(target: "checkscope::reporter", %section, step = name, "step started");
    }

    fn step_stop(&self, section: Uuid, name: &str, failure: Option<&Failure>) {
        match failure {
            None => info!(target: "checkscope::reporter", %section, step = name, "step passed"),
            Some(failure) => warn!(
                target: "checkscope::reporter",
                %section,
                step = name,
                kind = failure.kind().name(),
                message = failure.message(),
                "step failed"
            ),
        }
    }
}
