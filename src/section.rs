use std::{
    borrow::Cow,
    mem,
    panic::{AssertUnwindSafe, catch_unwind, resume_unwind},
};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    failure::{AggregateFailure, Failure, SectionError, StepError},
    reporter::{NoReporter, SectionOutcome, SectionReporter},
    step::{StepRecord, StepResult},
};

/// Opens a section with the given title.
///
/// A section groups several independent validation steps, runs every one of
/// them even when earlier ones fail, and reports the combined outcome once,
/// when the scope closes:
///
/// ```
/// use checkscope::section;
///
/// let result = section("Validate power system activation").run(|s| {
///     s.step("Validate control msg was sent", || assert!(true));
///     s.step("Validate pin state is on", || assert!(true));
///     s.step("Validate consumer reaction", || assert!(true));
/// });
/// assert!(result.is_ok());
/// ```
///
/// Use this only to validate several independent checks of one state; steps
/// that change conditions between each other will keep running after a
/// failure and can behave unexpectedly.
pub fn section(title: impl Into<Cow<'static, str>>) -> Section<NoReporter> {
    Section {
        title: title.into(),
        params: Vec::new(),
        reporter: NoReporter,
    }
}

/// A configured section, ready to [`run`](Section::run).
#[derive(Debug)]
pub struct Section<Reporter = NoReporter> {
    title: Cow<'static, str>,
    params: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    reporter: Reporter,
}

impl<Reporter> Section<Reporter> {
    /// Attaches a reporting sink that receives the section's start/stop
    /// notifications and the per-step boundaries.
    pub fn with_reporter<WithReporter: SectionReporter>(
        self,
        reporter: WithReporter,
    ) -> Section<WithReporter> {
        Section {
            title: self.title,
            params: self.params,
            reporter,
        }
    }

    /// Adds a display parameter forwarded to the sink with the start
    /// notification.
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

impl<Reporter: SectionReporter> Section<Reporter> {
    /// Runs the section body and finalizes the scope exactly once.
    ///
    /// Finalization executes the deferred steps in registration order,
    /// notifies the sink of the stop event, and then surfaces the collected
    /// failures: nothing for zero, the exact failure for one, a single
    /// [`AggregateFailure`] for two or more. The stop notification always
    /// precedes the returned error.
    ///
    /// A panic in the body outside any step boundary is not intercepted: it
    /// resumes after finalization ran, so steps that already completed are
    /// still reported.
    pub fn run<'env, T, F>(self, body: F) -> Result<T, SectionError>
    where
        F: FnOnce(&mut SectionScope<'env, Reporter>) -> T,
    {
        let Section {
            title,
            params,
            reporter,
        } = self;

        let id = Uuid::new_v4();
        info!(section = %title, %id, "entering section");
        reporter.section_start(id, &title, &params);

        let mut scope = SectionScope {
            id,
            reporter,
            failures: Vec::new(),
            deferred: Vec::new(),
        };
        // Finalization must run on every exit path, including an unwinding
        // body. The scope's failure list stays consistent because each step
        // boundary completes its bookkeeping before control returns.
        let body_result = catch_unwind(AssertUnwindSafe(|| body(&mut scope)));
        scope.run_deferred();
        let outcome = scope.take_outcome();

        info!(section = %title, %id, "exiting section");
        match &outcome {
            None => scope.reporter.section_stop(id, &title, SectionOutcome::Passed),
            Some(error) => scope
                .reporter
                .section_stop(id, &title, SectionOutcome::Failed(error)),
        }

        let value = match body_result {
            Ok(value) => value,
            Err(payload) => resume_unwind(payload),
        };
        match outcome {
            None => Ok(value),
            Some(error) => Err(error),
        }
    }
}

/// The handle a section body works with: declares and runs steps, collects
/// their failures.
#[derive(Debug)]
pub struct SectionScope<'env, Reporter> {
    id: Uuid,
    reporter: Reporter,
    failures: Vec<Failure>,
    deferred: Vec<StepRecord<'env>>,
}

impl<'env, Reporter: SectionReporter> SectionScope<'env, Reporter> {
    /// The token correlating this section's start/stop notifications.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The failures captured so far, in step order.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Runs a step immediately.
    ///
    /// The body may return `()` or any `Result<(), E>` with a printable
    /// error. A panic or `Err` inside the boundary is captured and appended
    /// to the section's failures instead of propagating, so the remaining
    /// steps still run.
    pub fn step<T, F>(&mut self, name: impl Into<Cow<'static, str>>, body: F)
    where
        F: FnOnce() -> T,
        T: Into<StepResult>,
    {
        self.boundary(name.into(), || body().into());
    }

    /// Registers a step for deferred execution.
    ///
    /// The callable is not invoked here; all deferred steps run in
    /// registration order when the section closes, each inside the same
    /// reporting boundary as an immediate step.
    pub fn defer<T, F>(&mut self, name: impl Into<Cow<'static, str>>, body: F)
    where
        F: FnOnce() -> T + 'env,
        T: Into<StepResult>,
    {
        self.deferred.push(StepRecord::new(name.into(), body));
    }

    fn run_deferred(&mut self) {
        for record in mem::take(&mut self.deferred) {
            let StepRecord { name, thunk } = record;
            self.boundary(name, thunk);
        }
    }

    /// The per-step reporting boundary: notifies the sink, intercepts any
    /// panic or captured error, and records the failure under the step's
    /// name.
    fn boundary(&mut self, name: Cow<'static, str>, body: impl FnOnce() -> StepResult) {
        info!(step = %name, "executing step");
        self.reporter.step_start(self.id, &name);

        let result = catch_unwind(AssertUnwindSafe(body));
        let failure = match result {
            Ok(StepResult(Ok(()))) => None,
            Ok(StepResult(Err(error))) => Some(Failure::attributed(name.clone(), error)),
            Err(payload) => Some(Failure::attributed(name.clone(), StepError::panicked(payload))),
        };

        self.reporter.step_stop(self.id, &name, failure.as_ref());
        if let Some(failure) = failure {
            warn!(step = %name, kind = failure.kind().name(), %failure, "captured step failure");
            self.failures.push(failure);
        }
    }

    fn take_outcome(&mut self) -> Option<SectionError> {
        let mut failures = mem::take(&mut self.failures);
        match failures.len() {
            0 => None,
            1 => Some(SectionError::Step(failures.remove(0))),
            _ => Some(SectionError::Aggregate(AggregateFailure::new(failures))),
        }
    }
}
