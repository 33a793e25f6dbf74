//! End-to-end tests: markup in, controllers started.

extern crate ctrl;


use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use binder_util::{binder_for, binder_with, Recorded, Recorder};
use ctrl::dom::{Document, DomElement};
use ctrl::runner::controller::{CompositeDefinition, Constructor, Registry};
use ctrl::runner::logger::Level;
use ctrl::runner::{Binder, BinderConfig, BinderError, FailurePolicy, Options, PriorityPolicy};
use pretty_assertions::assert_eq;

struct Greeter {
    element_id: String,
}

#[test]
fn test_greeter_end_to_end() {
    let started: Rc<RefCell<Vec<Rc<Greeter>>>> = Rc::new(RefCell::new(Vec::new()));
    let doc = Document::parse(
        r#"<!DOCTYPE html>
        <html>
          <body>
            <h1>Welcome</h1>
            <p data-controller="greet" id="hello">Hi!</p>
          </body>
        </html>"#,
    )
    .unwrap();

    let mut controllers = Registry::new();
    let sink = started.clone();
    controllers.set(
        "greet",
        CompositeDefinition::new(Constructor::new(|options: Options| {
            let element = options
                .element()
                .ok_or_else(|| anyhow::anyhow!("no element in options"))?;
            Ok(Greeter {
                element_id: element.attribute("id").unwrap_or_default(),
            })
        }))
        .with_after_start(move |instance| {
            let greeter = instance
                .clone()
                .downcast::<Greeter>()
                .map_err(|_| anyhow::anyhow!("not a Greeter"))?;
            sink.borrow_mut().push(greeter);
            Ok(())
        }),
    );

    let binder = Binder::new(doc.clone(), controllers, BinderConfig::default());
    binder.run().unwrap();

    let started = started.borrow();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].element_id, "hello");
    assert_eq!(
        doc.get_element_by_id("hello").map(|el| el.text_content()),
        Some("Hi!".to_string())
    );
}

#[test]
fn test_each_run_starts_controllers_again() {
    let recorder = Recorder::new();
    let controllers: Registry = vec![("w", recorder.ctor("w"))].into_iter().collect();
    let (binder, _sink) = binder_for(r#"<div data-controller="w"></div>"#, controllers);

    binder.run().unwrap();
    binder.run().unwrap();

    assert_eq!(recorder.count(), 2);
}

#[test]
fn test_elements_added_during_run_wait_for_next_run() {
    let recorder = Recorder::new();
    let (binder, _sink) = binder_for(r#"<ul data-controller="list" id="list"></ul>"#, Registry::new());

    let doc = binder.document().clone();
    let appended = Rc::new(RefCell::new(false));
    let appended_flag = appended.clone();
    binder.set_controller(
        "list",
        CompositeDefinition::new(recorder.ctor("list")).with_after_start(move |_| {
            if !*appended_flag.borrow() {
                let list = doc
                    .get_element_by_id("list")
                    .ok_or_else(|| anyhow::anyhow!("list missing"))?;
                let item = list.append_child("li");
                item.set_attribute("data-controller", "item");
                item.set_attribute("id", "item");
                *appended_flag.borrow_mut() = true;
            }
            Ok(())
        }),
    );
    binder.set_controller("item", recorder.ctor("item"));

    binder.run().unwrap();
    assert_eq!(recorder.labels(), vec!["list"]);

    binder.run().unwrap();
    assert_eq!(recorder.labels(), vec!["list", "list", "item"]);
}

#[test]
fn test_abort_policy_stops_remaining_dispatches() {
    let recorder = Recorder::new();
    let controllers: Registry = vec![
        ("ok", recorder.ctor("ok")),
        ("bad", recorder.failing_ctor("bad")),
    ]
    .into_iter()
    .collect();
    let (binder, _sink) = binder_for(
        r#"<i data-controller="ok" id="1"></i><i data-controller="bad" id="2"></i><i data-controller="ok" id="3"></i>"#,
        controllers,
    );

    let err = binder.run().unwrap_err();

    assert!(err.is_controller_failure());
    assert_eq!(recorder.element_ids(), vec!["1", "2"]);
}

#[test]
fn test_isolate_policy_continues_and_reports_count() {
    let recorder = Recorder::new();
    let controllers: Registry = vec![
        ("ok", recorder.ctor("ok")),
        ("bad", recorder.failing_ctor("bad")),
    ]
    .into_iter()
    .collect();
    let (binder, sink) = binder_with(
        r#"<i data-controller="bad" id="1"></i><i data-controller="ok" id="2"></i><i data-controller="bad" id="3"></i>"#,
        controllers,
        BinderConfig::new().with_failure_policy(FailurePolicy::Isolate),
    );

    match binder.run() {
        Err(BinderError::Isolated { failures }) => assert_eq!(failures, 2),
        other => panic!("expected isolated failures, got {:?}", other),
    }
    assert_eq!(recorder.element_ids(), vec!["1", "2", "3"]);
    assert_eq!(
        sink.messages(Level::Error),
        vec![
            "controller \"bad\" failed to start: bad exploded".to_string(),
            "controller \"bad\" failed to start: bad exploded".to_string(),
        ]
    );
}

#[test]
fn test_missing_sink_is_fatal() {
    let recorder = Recorder::new();
    let controllers: Registry = vec![("w", recorder.ctor("w"))].into_iter().collect();
    let (mut binder, _sink) = binder_for(
        r#"<i data-controller="" data-priority="1"></i><i data-controller="w"></i>"#,
        controllers,
    );
    binder.logger_mut().remove_sink();

    match binder.run() {
        Err(BinderError::NoDiagnosticSink(message)) => assert_eq!(message, "Controller not defined"),
        other => panic!("expected NoDiagnosticSink, got {:?}", other),
    }
    assert_eq!(recorder.count(), 0);
}

#[test]
fn test_missing_sink_is_not_isolated() {
    let (mut binder, _sink) = binder_with(
        r#"<i data-controller="unknown"></i>"#,
        Registry::new(),
        BinderConfig::new().with_failure_policy(FailurePolicy::Isolate),
    );
    binder.logger_mut().remove_sink();

    assert!(matches!(binder.run(), Err(BinderError::NoDiagnosticSink(_))));
}

#[test]
fn test_default_logger_without_subscriber_is_fatal() {
    let doc = Document::parse(r#"<div data-controller="nope"></div>"#).unwrap();
    let binder = Binder::with_defaults(doc);

    if !tracing::dispatcher::has_been_set() {
        match binder.run() {
            Err(BinderError::NoDiagnosticSink(message)) => {
                assert_eq!(message, "Controller \"nope\" not found")
            }
            other => panic!("expected NoDiagnosticSink, got {:?}", other),
        }
    }

    let subscriber = tracing_subscriber::fmt().with_writer(std::io::sink).finish();
    tracing::subscriber::with_default(subscriber, || {
        assert!(binder.run().is_ok());
    });
}

#[test]
fn test_custom_selector_and_controller_attribute() {
    let recorder = Recorder::new();
    let controllers: Registry = vec![("menu", recorder.ctor("menu"))].into_iter().collect();
    let (binder, _sink) = binder_with(
        r#"<nav data-role="menu" id="n"></nav><div data-controller="menu" id="d"></div>"#,
        controllers,
        BinderConfig::new()
            .with_selector("[data-role]")
            .with_controller_attribute("data-role"),
    );

    binder.run().unwrap();

    assert_eq!(recorder.element_ids(), vec!["n"]);
    assert_eq!(recorder.options()[0].get_str("selector"), Some("[data-role]"));
}

#[test]
fn test_invalid_selector_fails_run() {
    let (binder, _sink) = binder_with(
        "<div></div>",
        Registry::new(),
        BinderConfig::new().with_selector("div > p"),
    );

    assert!(matches!(binder.run(), Err(BinderError::Selector { .. })));
}

#[test]
fn test_config_loaded_from_file() {
    let path = std::env::temp_dir().join(format!("ctrl-config-{}.toml", uuid::Uuid::new_v4()));
    fs::write(
        &path,
        r#"
        selector = ".widget"
        priority = "absent-last"

        [options]
        theme = "dark"
        "#,
    )
    .unwrap();
    let config = BinderConfig::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.priority, PriorityPolicy::AbsentLast);

    let recorder = Recorder::new();
    let controllers: Registry = vec![("w", recorder.ctor("w"))].into_iter().collect();
    let (binder, _sink) = binder_with(
        r#"<div class="widget" data-controller="w" id="a"></div>
           <div class="widget big" data-controller="w" id="b" data-priority="3"></div>
           <div data-controller="w" id="c"></div>"#,
        controllers,
        config,
    );

    binder.run().unwrap();

    assert_eq!(recorder.element_ids(), vec!["b", "a"]);
    assert!(recorder
        .options()
        .iter()
        .all(|o| o.get_str("theme") == Some("dark") && o.get_str("selector") == Some(".widget")));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let path = std::env::temp_dir().join(format!("ctrl-missing-{}.toml", uuid::Uuid::new_v4()));
    assert!(matches!(BinderConfig::load(&path), Err(BinderError::Io { .. })));
}

#[test]
fn test_plan_lists_sorted_candidates_without_dispatching() {
    let recorder = Recorder::new();
    let controllers: Registry = vec![("tabs", recorder.ctor("tabs"))].into_iter().collect();
    let (binder, sink) = binder_for(
        r#"<div data-controller="tabs" id="a" data-priority="1"></div>
           <div data-controller="modal" id="b" data-priority="4"></div>
           <div data-controller="" id="c"></div>"#,
        controllers,
    );

    let plan = binder.plan().unwrap();

    let summary: Vec<(Option<String>, Option<f64>, bool)> = plan
        .iter()
        .map(|p| (p.controller.clone(), p.priority, p.registered))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Some("modal".to_string()), Some(4.0), false),
            (Some("tabs".to_string()), Some(1.0), true),
            (None, None, false),
        ]
    );
    assert_eq!(plan[0].element.attribute("id").as_deref(), Some("b"));
    assert_eq!(recorder.count(), 0);
    assert!(sink.records().is_empty());
}

#[test]
fn test_recorded_instance_keeps_options() {
    let recorder = Recorder::new();
    let ctor = recorder.ctor("probe");
    let instance = ctor.construct(Options::new().with("x", 1)).unwrap();
    let recorded = instance.downcast_ref::<Recorded>().unwrap();
    assert_eq!(recorded.options.get_number("x"), Some(1.0));
    assert_eq!(recorded.label, "probe");
}

#[test]
fn test_element_handle_identity_across_queries() {
    let doc = Document::parse(r#"<div id="x" data-controller="w"></div>"#).unwrap();
    let a = doc.get_element_by_id("x").unwrap();
    let b = doc.elements().remove(0);
    assert_eq!(DomElement::id(&a), DomElement::id(&b));
}
