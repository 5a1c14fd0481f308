use crate::reporter::SectionReporter;

/// Discards every notification. The default when no rendering backend is
/// attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReporter;

impl SectionReporter for NoReporter {}
