use std::{fmt, panic::AssertUnwindSafe};

use checkscope::{
    failure::SectionError,
    reporter::{RecordingReporter, ReporterEvent},
    section,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

#[derive(Debug)]
struct ValueError(&'static str);

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn section_id(events: &[ReporterEvent]) -> Uuid {
    match events.first() {
        Some(ReporterEvent::SectionStart { id, .. }) => *id,
        other => panic!("expected a start notification first, got {other:?}"),
    }
}

#[test]
fn all_passing_steps_notify_success() {
    let reporter = RecordingReporter::default();
    let result = section("S").with_reporter(reporter.clone()).run(|s| {
        s.step("one", || {});
        s.step("two", || {});
        s.step("three", || {});
    });

    assert!(result.is_ok());
    let events = reporter.events();
    let id = section_id(&events);
    assert_eq!(
        events,
        vec![
            ReporterEvent::SectionStart {
                id,
                title: "S".into(),
                params: vec![],
            },
            ReporterEvent::StepStart { section: id, name: "one".into() },
            ReporterEvent::StepStop { section: id, name: "one".into(), failure: None },
            ReporterEvent::StepStart { section: id, name: "two".into() },
            ReporterEvent::StepStop { section: id, name: "two".into(), failure: None },
            ReporterEvent::StepStart { section: id, name: "three".into() },
            ReporterEvent::StepStop { section: id, name: "three".into(), failure: None },
            ReporterEvent::SectionStop { id, title: "S".into(), error: None },
        ],
    );
}

#[test]
fn single_failure_surfaces_verbatim() {
    let result = section("S").run(|s| {
        s.step("one", || {});
        s.step("two", || Err::<(), _>(ValueError("x")));
        s.step("three", || {});
    });

    let error = result.unwrap_err();
    assert_eq!(error.kind().name(), "ValueError");
    assert_eq!(error.to_string(), "x");

    let SectionError::Step(failure) = &error else {
        panic!("a single failing step must not be aggregated");
    };
    assert_eq!(failure.step(), "two");
    let original = failure
        .downcast_ref::<ValueError>()
        .expect("the exact error value the step raised should be preserved");
    assert_eq!(original.0, "x");
}

#[test]
fn multiple_failures_aggregate_with_assertion_priority() {
    let result = section("S").run(|s| {
        s.step("first", || assert!(false, "a"));
        s.step("second", || {});
        s.step("third", || Err::<(), _>(ValueError("b")));
    });

    let error = result.unwrap_err();
    assert!(error.kind().is_assertion());
    assert!(matches!(error, SectionError::Aggregate(_)));
    assert_eq!(
        error.to_string(),
        "2 steps failed:\n\
         1. Assertion: a (step: first)\n\
         2. ValueError: b (step: third)",
    );
}

#[test]
fn aggregate_without_assertions_reports_generic_kind() {
    let result = section("S").run(|s| {
        s.step("first", || Err::<(), _>(ValueError("a")));
        s.step("second", || Err::<(), _>(ValueError("b")));
    });

    let error = result.unwrap_err();
    assert_eq!(error.kind().name(), "Error");
    assert_eq!(error.failures().len(), 2);
}

#[test]
fn stop_is_notified_before_the_error_reaches_the_caller() {
    let reporter = RecordingReporter::default();
    let result = section("S").with_reporter(reporter.clone()).run(|s| {
        s.step("bad", || Err::<(), _>(ValueError("x")));
    });

    assert!(result.is_err());
    let events = reporter.events();
    let id = section_id(&events);
    assert_eq!(
        events.last(),
        Some(&ReporterEvent::SectionStop {
            id,
            title: "S".into(),
            error: Some(("ValueError".into(), "x".into())),
        }),
    );
}

#[test]
fn deferred_steps_run_at_close_in_registration_order() {
    let reporter = RecordingReporter::default();
    let result = section("S").with_reporter(reporter.clone()).run(|s| {
        s.defer("d1", || {});
        s.defer("d2", || Err::<(), _>(ValueError("late")));
        s.step("i1", || {});
        // Nothing deferred has run while the body is still open.
        assert!(s.failures().is_empty());
    });

    let error = result.unwrap_err();
    assert_eq!(error.failures()[0].step(), "d2");

    let events = reporter.events();
    let id = section_id(&events);
    assert_eq!(
        events,
        vec![
            ReporterEvent::SectionStart {
                id,
                title: "S".into(),
                params: vec![],
            },
            ReporterEvent::StepStart { section: id, name: "i1".into() },
            ReporterEvent::StepStop { section: id, name: "i1".into(), failure: None },
            ReporterEvent::StepStart { section: id, name: "d1".into() },
            ReporterEvent::StepStop { section: id, name: "d1".into(), failure: None },
            ReporterEvent::StepStart { section: id, name: "d2".into() },
            ReporterEvent::StepStop {
                section: id,
                name: "d2".into(),
                failure: Some(("ValueError".into(), "late".into())),
            },
            ReporterEvent::SectionStop {
                id,
                title: "S".into(),
                error: Some(("ValueError".into(), "late".into())),
            },
        ],
    );
}

#[test]
fn sections_do_not_share_failures() {
    let reporter = RecordingReporter::default();

    let first = section("first")
        .with_reporter(reporter.clone())
        .run(|s| s.step("a", || Err::<(), _>(ValueError("a"))));
    let second = section("second")
        .with_reporter(reporter.clone())
        .run(|s| s.step("b", || Err::<(), _>(ValueError("b"))));

    let first = first.unwrap_err();
    let second = second.unwrap_err();
    assert_eq!(first.to_string(), "a");
    assert_eq!(second.to_string(), "b");
    assert_eq!(first.failures().len(), 1);
    assert_eq!(second.failures().len(), 1);

    let ids: Vec<_> = reporter
        .events()
        .iter()
        .filter_map(|event| match event {
            ReporterEvent::SectionStart { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1], "every section open gets a fresh token");
}

#[test]
fn panic_outside_steps_propagates_after_finalization() {
    let reporter = RecordingReporter::default();
    let run = std::panic::catch_unwind(AssertUnwindSafe(|| {
        section("S").with_reporter(reporter.clone()).run(|s| {
            s.step("bad", || assert!(false, "a"));
            s.defer("late", || {});
            panic!("outside any step");
        })
    }));

    let payload = run.expect_err("a panic outside a step boundary is not intercepted");
    let message = payload
        .downcast_ref::<&str>()
        .expect("panic payload should be preserved");
    assert_eq!(*message, "outside any step");

    // Finalization still ran: the deferred step executed and the stop
    // notification carried the failure collected before the panic.
    let events = reporter.events();
    let id = section_id(&events);
    assert!(events.contains(&ReporterEvent::StepStop {
        section: id,
        name: "late".into(),
        failure: None,
    }));
    assert_eq!(
        events.last(),
        Some(&ReporterEvent::SectionStop {
            id,
            title: "S".into(),
            error: Some(("Assertion".into(), "a".into())),
        }),
    );
}

#[test]
fn params_are_forwarded_with_the_start_notification() {
    let reporter = RecordingReporter::default();
    section("S")
        .with_reporter(reporter.clone())
        .with_param("board", "rev-b")
        .with_param("voltage", "12V")
        .run(|_| {})
        .unwrap();

    let events = reporter.events();
    let id = section_id(&events);
    assert_eq!(
        events.first(),
        Some(&ReporterEvent::SectionStart {
            id,
            title: "S".into(),
            params: vec![
                ("board".into(), "rev-b".into()),
                ("voltage".into(), "12V".into()),
            ],
        }),
    );
}
