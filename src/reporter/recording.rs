use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::{
    failure::Failure,
    reporter::{SectionOutcome, SectionParams, SectionReporter},
};

/// A snapshot of one notification, with owned copies of everything a test
/// would want to assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterEvent {
    SectionStart {
        id: Uuid,
        title: String,
        params: Vec<(String, String)>,
    },
    SectionStop {
        id: Uuid,
        title: String,
        // (kind name, message) of the final error, if the section failed
        error: Option<(String, String)>,
    },
    StepStart {
        section: Uuid,
        name: String,
    },
    StepStop {
        section: Uuid,
        name: String,
        failure: Option<(String, String)>,
    },
}

/// A fake sink that records every notification it receives.
///
/// Clones share the same underlying event list, so a test can keep one handle
/// and hand another to the section under test:
///
/// ```
/// use checkscope::{reporter::RecordingReporter, section};
///
/// let reporter = RecordingReporter::default();
/// let result = section("empty").with_reporter(reporter.clone()).run(|_| {});
///
/// assert!(result.is_ok());
/// assert_eq!(reporter.events().len(), 2); // start + stop
/// ```
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter(Arc<Mutex<Vec<ReporterEvent>>>);

impl RecordingReporter {
    pub fn events(&self) -> Vec<ReporterEvent> {
        self.0.lock().expect("event list not poisoned").clone()
    }

    fn push(&self, event: ReporterEvent) {
        self.0.lock().expect("event list not poisoned").push(event);
    }
}

impl SectionReporter for RecordingReporter {
    fn section_start(&self, id: Uuid, title: &str, params: &SectionParams) {
        self.push(ReporterEvent::SectionStart {
            id,
            title: title.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }

    fn section_stop(&self, id: Uuid, title: &str, outcome: SectionOutcome<'_>) {
        self.push(ReporterEvent::SectionStop {
            id,
            title: title.to_string(),
            error: outcome
                .error()
                .map(|e| (e.kind().name().to_string(), e.to_string())),
        });
    }

    fn step_start(&self, section: Uuid, name: &str) {
        self.push(ReporterEvent::StepStart {
            section,
            name: name.to_string(),
        });
    }

    fn step_stop(&self, section: Uuid, name: &str, failure: Option<&Failure>) {
        self.push(ReporterEvent::StepStop {
            section,
            name: name.to_string(),
            failure: failure.map(|f| (f.kind().name().to_string(), f.message().to_string())),
        });
    }
}
