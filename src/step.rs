use std::{
    borrow::Cow,
    fmt::{self, Debug, Display},
};

use crate::failure::StepError;

/// A deferred step: a name plus the caller's callable with its arguments
/// already captured. Executed once, in registration order, when the owning
/// section closes.
pub struct StepRecord<'env> {
    pub(crate) name: Cow<'static, str>,
    pub(crate) thunk: Box<dyn FnOnce() -> StepResult + 'env>,
}

impl<'env> StepRecord<'env> {
    pub(crate) fn new<T, F>(name: Cow<'static, str>, body: F) -> Self
    where
        F: FnOnce() -> T + 'env,
        T: Into<StepResult>,
    {
        Self {
            name,
            thunk: Box::new(move || body().into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Debug for StepRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRecord")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a step body produced.
///
/// Step bodies do not return this directly; they return `()` or any
/// `Result<(), E>` with a printable error, and the conversions below capture
/// the error's kind, message and original value.
#[derive(Debug)]
pub struct StepResult(pub Result<(), StepError>);

impl StepResult {
    pub fn ok() -> Self {
        Self(Ok(()))
    }

    pub fn fail(error: StepError) -> Self {
        Self(Err(error))
    }
}

impl From<()> for StepResult {
    fn from(_: ()) -> Self {
        Self(Ok(()))
    }
}

impl<E> From<Result<(), E>> for StepResult
where
    E: Debug + Display + Send + Sync + 'static,
{
    fn from(v: Result<(), E>) -> Self {
        StepResult(v.map_err(StepError::capture))
    }
}
