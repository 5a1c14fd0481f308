use std::{
    any::{self, Any},
    backtrace::Backtrace,
    borrow::Cow,
    error::Error,
    fmt::{self, Display},
    slice,
};

use crate::whatever::{BoxedWhatever, Whatever};

/// The category of a captured step failure.
///
/// Panics intercepted at a step boundary are classified as [`Assertion`]
/// since the assertion macros are how validation checks fail in Rust.
/// Errors returned through `Result` are tagged with the short name of their
/// concrete type.
///
/// [`Assertion`]: FailureKind::Assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Assertion,
    Tagged(Cow<'static, str>),
}

impl FailureKind {
    pub fn tagged(tag: impl Into<Cow<'static, str>>) -> Self {
        Self::Tagged(tag.into())
    }

    pub fn name(&self) -> &str {
        match self {
            FailureKind::Assertion => "Assertion",
            FailureKind::Tagged(tag) => tag,
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, FailureKind::Assertion)
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One captured error from a step body, before it is attributed to a step.
///
/// Deliberately does not implement [`Display`]: a `StepError` is already a
/// captured failure, and giving it `Display` would let the blanket
/// `Result` conversion in [`crate::step`] wrap one capture inside another.
#[derive(Debug)]
pub struct StepError {
    kind: FailureKind,
    message: String,
    original: Option<BoxedWhatever>,
    backtrace: Backtrace,
}

impl StepError {
    /// Captures an error value raised by a step body, keeping the original
    /// value around for later downcasting.
    pub fn capture<E: Whatever>(error: E) -> Self {
        Self {
            kind: FailureKind::tagged(short_type_name::<E>()),
            message: error.to_string(),
            original: Some(Box::new(error)),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Assertion,
            message: message.into(),
            original: None,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn tagged(tag: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::tagged(tag),
            message: message.into(),
            original: None,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn panicked(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self {
            kind: FailureKind::Assertion,
            message: downcast_panic_payload(payload),
            original: None,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn original(&self) -> Option<&dyn Whatever> {
        self.original.as_deref()
    }
}

pub(crate) fn downcast_panic_payload(payload: Box<dyn Any + Send + 'static>) -> String {
    payload
        .downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|payload| payload.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("non-string panic payload"))
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let name = any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

/// One failure attributed to the step it came from.
#[derive(Debug)]
pub struct Failure {
    step: Cow<'static, str>,
    error: StepError,
}

impl Failure {
    pub(crate) fn attributed(step: Cow<'static, str>, error: StepError) -> Self {
        Self { step, error }
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn kind(&self) -> &FailureKind {
        self.error.kind()
    }

    pub fn message(&self) -> &str {
        self.error.message()
    }

    pub fn backtrace(&self) -> &Backtrace {
        self.error.backtrace()
    }

    pub fn original(&self) -> Option<&dyn Whatever> {
        self.error.original()
    }

    /// Recovers the concrete error value the step raised, if it was captured
    /// from a `Result` and is of type `T`.
    pub fn downcast_ref<T: Whatever>(&self) -> Option<&T> {
        self.original()?.downcast_ref()
    }
}

// A section with exactly one failing step must be indistinguishable from an
// unwrapped failure of that kind, so `Display` is the bare message.
impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for Failure {}

/// The single synthesized error raised when two or more steps of one section
/// failed.
///
/// Its reported [`kind`](AggregateFailure::kind) is [`FailureKind::Assertion`]
/// when at least one collected failure is an assertion, otherwise the generic
/// `Tagged("Error")`. Assertion failures take priority because they are the
/// intended validation checks rather than incidental runtime errors.
#[derive(Debug)]
pub struct AggregateFailure {
    kind: FailureKind,
    failures: Vec<Failure>,
}

impl AggregateFailure {
    pub(crate) fn new(failures: Vec<Failure>) -> Self {
        let kind = match failures.iter().any(|f| f.kind().is_assertion()) {
            true => FailureKind::Assertion,
            false => FailureKind::tagged("Error"),
        };
        Self { kind, failures }
    }

    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }
}

impl Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} steps failed:", self.failures.len())?;
        for (index, failure) in self.failures.iter().enumerate() {
            write!(
                f,
                "\n{}. {}: {} (step: {})",
                index + 1,
                failure.kind(),
                failure.message(),
                failure.step(),
            )?;
        }
        Ok(())
    }
}

impl Error for AggregateFailure {}

/// The outcome of a failed section: either the exact failure of the only
/// failing step, or the aggregate over all of them.
#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    #[error(transparent)]
    Step(Failure),
    #[error(transparent)]
    Aggregate(AggregateFailure),
}

impl SectionError {
    pub fn kind(&self) -> &FailureKind {
        match self {
            SectionError::Step(failure) => failure.kind(),
            SectionError::Aggregate(aggregate) => aggregate.kind(),
        }
    }

    /// All collected failures, in the order they were captured.
    pub fn failures(&self) -> &[Failure] {
        match self {
            SectionError::Step(failure) => slice::from_ref(failure),
            SectionError::Aggregate(aggregate) => aggregate.failures(),
        }
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.failures().first().map(Failure::backtrace)
    }
}
