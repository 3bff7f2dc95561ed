mod common;

use std::{cell::RefCell, rc::Rc};

use common::{RecordingWebView, envelope, init_message};
use serde_json::{Value, json};
use webshell_core::{
    Feature, FeatureBuilder, MountOptions, Props, Webshell, WebshellError, features,
};

fn hello() -> Feature {
    FeatureBuilder::new(
        "test.hello",
        "function hello(webshell) { webshell.postMessageToShell('Hello world!'); }",
    )
    .declare_shell_handler("onHello")
    .build()
    .unwrap()
    .instance(None)
}

fn pinger() -> Feature {
    FeatureBuilder::new(
        "test.ping",
        "function ping(webshell) { webshell.onShellMessage('ping', function () {}); }",
    )
    .declare_web_handler("ping")
    .build()
    .unwrap()
    .instance(None)
}

fn strict() -> MountOptions {
    MountOptions::new().with_debug(true).with_strict(true)
}

#[test]
fn test_hello_world_scenario() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let props = Props::new().with_handler("onHello", move |body| sink.borrow_mut().push(body));

    let shell = Webshell::mount(RecordingWebView::default(), [hello()], &props, strict()).unwrap();
    shell
        .handle_message(&envelope(json!({
            "type": "feature",
            "identifier": "test.hello",
            "handlerId": "default",
            "body": "Hello world!"
        })))
        .unwrap();

    assert_eq!(*seen.borrow(), vec![json!("Hello world!")]);
}

#[test]
fn test_rebinding_props_keeps_the_session() {
    let webview = Rc::new(RecordingWebView::default());
    let first = Rc::new(RefCell::new(Vec::new()));
    let first_sink = Rc::clone(&first);
    let ping = pinger();
    let shell = Webshell::mount(
        Rc::clone(&webview),
        [hello(), ping.clone()],
        &Props::new().with_handler("onHello", move |body| first_sink.borrow_mut().push(body)),
        strict(),
    )
    .unwrap();
    shell.handle_message(&init_message()).unwrap();

    let second = Rc::new(RefCell::new(Vec::new()));
    let second_sink = Rc::clone(&second);
    shell.set_props(
        &Props::new()
            .with_handler("onHello", move |body| second_sink.borrow_mut().push(body))
            .with_value("style", json!({ "flex": 1 })),
    );
    shell
        .handle_message(&envelope(json!({
            "type": "feature",
            "identifier": "test.hello",
            "body": "again"
        })))
        .unwrap();

    assert!(first.borrow().is_empty());
    assert_eq!(*second.borrow(), vec![json!("again")]);
    assert_eq!(shell.runtime_props().keys().collect::<Vec<_>>(), vec!["style"]);

    // still loaded: calls go straight through instead of waiting for another init
    assert!(shell.is_runtime_ready());
    shell.rmi().post_message_to_web(&ping, "ping", json!(1)).unwrap();
    assert_eq!(webview.scripts().len(), 1);
}

#[test]
fn test_marked_garbage_is_not_passed_through() {
    let raw_messages = Rc::new(RefCell::new(Vec::<String>::new()));
    let raw_sink = Rc::clone(&raw_messages);
    let shell = Webshell::mount(
        RecordingWebView::default(),
        [hello()],
        &Props::new(),
        strict().with_on_message(move |raw| raw_sink.borrow_mut().push(raw.to_string())),
    )
    .unwrap();

    let anonymous = envelope(json!({ "type": "feature", "handlerId": "default", "body": 1 }));
    assert!(matches!(
        shell.handle_message(&anonymous),
        Err(WebshellError::MissingShellHandler { .. })
    ));
    let teleport = envelope(json!({ "type": "teleport", "identifier": "test.hello" }));
    assert!(shell.handle_message(&teleport).is_ok());

    assert!(raw_messages.borrow().is_empty());
}

#[test]
fn test_outbound_calls_wait_for_init() {
    let webview = Rc::new(RecordingWebView::default());
    let feature = pinger();
    let shell = Webshell::mount(
        Rc::clone(&webview),
        [feature.clone()],
        &Props::new(),
        strict(),
    )
    .unwrap();
    let rmi = shell.rmi();

    for tag in ["A", "B", "C"] {
        rmi.post_message_to_web(&feature, "ping", json!(tag)).unwrap();
    }
    assert!(webview.scripts().is_empty());
    assert!(!shell.is_runtime_ready());

    shell.handle_message(&init_message()).unwrap();
    assert!(shell.is_runtime_ready());
    assert_eq!(webview.scripts().len(), 3);

    rmi.post_message_to_web(&feature, "ping", json!("D")).unwrap();

    let scripts = webview.scripts();
    for (script, tag) in scripts.iter().zip(["A", "B", "C", "D"]) {
        assert!(script.contains(&format!("\"ping\", \"{tag}\")")), "{script}");
    }

    // a reload announces readiness again without replaying anything
    shell.handle_message(&init_message()).unwrap();
    assert_eq!(webview.scripts().len(), 4);
}

#[test]
fn test_buffered_precondition_failure_surfaces_on_init() {
    let webview = Rc::new(RecordingWebView::default());
    let shell = Webshell::mount(Rc::clone(&webview), [pinger()], &Props::new(), strict()).unwrap();

    let stranger = pinger();
    shell
        .rmi()
        .post_message_to_web(&stranger, "ping", Value::Null)
        .unwrap();

    let err = shell.handle_message(&init_message()).unwrap_err();
    assert_eq!(
        err,
        WebshellError::MissingInShell {
            identifier: "test.ping".into()
        }
    );
    assert!(webview.scripts().is_empty());
}

#[test]
fn test_conflicting_props_fail_the_mount_in_strict_mode() {
    let a = FeatureBuilder::new("test.a", "function a() {}")
        .declare_shell_handler("onThing")
        .build()
        .unwrap()
        .instance(None);
    let b = FeatureBuilder::new("test.b", "function b() {}")
        .declare_shell_handler("onThing")
        .build()
        .unwrap()
        .instance(None);

    let strict_mount = Webshell::mount(
        RecordingWebView::default(),
        [a.clone(), b.clone()],
        &Props::new(),
        strict(),
    );
    assert!(matches!(
        strict_mount,
        Err(WebshellError::DuplicatedRegisteredProp { .. })
    ));

    let lenient = Webshell::mount(
        RecordingWebView::default(),
        [a, b],
        &Props::new(),
        MountOptions::new().with_debug(true),
    )
    .unwrap();
    assert_eq!(
        lenient.registry().props_map()["onThing"].feature_identifier,
        "test.b"
    );
}

#[test]
fn test_pass_through_and_feature_errors() {
    let raw_messages = Rc::new(RefCell::new(Vec::new()));
    let raw_sink = Rc::clone(&raw_messages);
    let failures = Rc::new(RefCell::new(Vec::new()));
    let failure_sink = Rc::clone(&failures);

    let options = MountOptions::new()
        .with_on_message(move |raw| raw_sink.borrow_mut().push(raw.to_string()))
        .with_on_web_feature_error(move |identifier, body| {
            failure_sink
                .borrow_mut()
                .push(format!("{identifier}: {body}"));
        });
    let shell = Webshell::mount(RecordingWebView::default(), [hello()], &Props::new(), options)
        .unwrap();

    for raw in ["debug noise from a page script", "[]", "null"] {
        shell.handle_message(raw).unwrap();
    }
    shell
        .handle_message(&envelope(json!({
            "type": "error",
            "identifier": "test.hello",
            "body": "boom"
        })))
        .unwrap();

    assert_eq!(
        *raw_messages.borrow(),
        vec!["debug noise from a page script", "[]", "null"]
    );
    assert_eq!(*failures.borrow(), vec![r#"test.hello: "boom""#]);
}

#[test]
fn test_runtime_props_and_injected_script() {
    let props = Props::new()
        .with_handler("onHello", |_| {})
        .with_value("webshellStrictMode", true)
        .with_value("style", json!({ "flex": 1 }));
    let shell = Webshell::mount(
        RecordingWebView::default(),
        [Some(hello()), None],
        &props,
        MountOptions::default(),
    )
    .unwrap();

    assert_eq!(shell.runtime_props().keys().collect::<Vec<_>>(), vec!["style"]);

    let script = shell.injected_javascript(Some("console.log('integrator');"));
    let bootstrap = shell.registry().assembled_script();
    assert!(script.starts_with(bootstrap));
    assert!(script.contains("console.log('integrator');"));
    assert!(script.ends_with("true;\n"));
    assert!(bootstrap.contains("window.ReactNativeWebshell.debug = false;"));
}

#[test]
fn test_stock_features_mount_together() {
    let link_press = features::link_press().unwrap().instance(None);
    let dimensions = features::html_dimensions().unwrap().instance(None);

    let shell = Webshell::mount(
        RecordingWebView::default(),
        [link_press, dimensions],
        &Props::new(),
        strict(),
    )
    .unwrap();

    let registry = shell.registry();
    assert!(
        registry
            .handler(features::LINK_PRESS_IDENTIFIER, "default")
            .is_some()
    );
    assert!(
        registry
            .handler(features::HTML_DIMENSIONS_IDENTIFIER, "default")
            .is_some()
    );
}
