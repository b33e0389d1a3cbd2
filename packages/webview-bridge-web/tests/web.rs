use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Reflect};
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::wasm_bindgen_test;
use webview_bridge_web::{
    BridgeConfig, BridgeError, Readiness, WebBridgeConfig, WebEnvironment, CALLBACKS_GLOBAL,
    DEFAULT_INJECTION_URL,
};

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

// A minimal host: answers every call with a success envelope echoing the payload and records registrations.
const FAKE_BRIDGE: &str = r#"
    window.__fakeBridge = {
        registered: [],
        callHandler(name, data, callback) {
            callback(JSON.stringify({ code: 200, data: { name, data }, msg: "ok" }));
        },
        registerHandler(name, handler) {
            this.registered.push(name);
        },
    };
"#;

fn reset_page() {
    _ = tracing_wasm::try_set_as_global_default();
    js_sys::eval(
        r#"
        delete window.isBridgeReady;
        delete window.WebViewJavascriptBridge;
        delete window.WVJBCallbacks;
        delete window.__fakeBridge;
        "#,
    )
    .unwrap();
    js_sys::eval(FAKE_BRIDGE).unwrap();
}

/// Let every zero-delay timer scheduled so far run.
async fn tick() {
    TimeoutFuture::new(0).await;
}

fn injection_frame() -> Option<web_sys::Element> {
    let document = web_sys::window().unwrap().document().unwrap();
    document
        .query_selector(&format!("iframe[src='{DEFAULT_INJECTION_URL}']"))
        .unwrap()
}

fn callback_queue_len() -> u32 {
    let window = web_sys::window().unwrap();
    let queue = Reflect::get(&window, &JsValue::from_str(CALLBACKS_GLOBAL)).unwrap();
    queue.unchecked_ref::<Array>().length()
}

fn registered() -> Vec<String> {
    let fake = js_sys::eval("window.__fakeBridge.registered").unwrap();
    fake.unchecked_into::<Array>()
        .iter()
        .filter_map(|name| name.as_string())
        .collect()
}

#[wasm_bindgen_test]
async fn calls_through_the_injected_bridge() {
    reset_page();
    js_sys::eval("window.WebViewJavascriptBridge = window.__fakeBridge").unwrap();

    let gate = WebEnvironment::gate(WebBridgeConfig::default());
    let res = gate.call("echo", Some(json!({ "n": 3 }))).await.unwrap();

    assert_eq!(res, json!({ "name": "echo", "data": { "n": 3 } }));
}

#[wasm_bindgen_test]
async fn registrations_wait_for_the_host_flush() {
    reset_page();

    let gate = WebEnvironment::gate(WebBridgeConfig::default());
    gate.register("onResume", |_, _| {});
    gate.register("onPush", |_, _| {});

    // one queued callback in the global queue, no matter how many continuations the gate holds
    let window = web_sys::window().unwrap();
    let queue = Reflect::get(&window, &JsValue::from_str(CALLBACKS_GLOBAL)).unwrap();
    assert_eq!(queue.unchecked_ref::<Array>().length(), 1);
    assert!(registered().is_empty());

    // what the host does once it has injected the bridge
    js_sys::eval(
        r#"
        window.WebViewJavascriptBridge = window.__fakeBridge;
        const callbacks = window.WVJBCallbacks;
        delete window.WVJBCallbacks;
        callbacks.forEach((callback) => callback(window.WebViewJavascriptBridge));
        "#,
    )
    .unwrap();

    assert_eq!(registered(), vec!["onResume", "onPush"]);
    assert_eq!(gate.readiness(), Readiness::Ready);
}

#[wasm_bindgen_test]
async fn readiness_follows_the_global_flag() {
    reset_page();

    let config = WebBridgeConfig::new().with_bridge_config(
        BridgeConfig::new()
            .with_poll_interval(Duration::from_millis(5))
            .with_max_attempts(4),
    );
    let gate = WebEnvironment::gate(config);

    assert!(matches!(gate.check_ready(false).await, Err(BridgeError::NotReady)));
    assert!(matches!(
        gate.check_ready(true).await,
        Err(BridgeError::Timeout { attempts: 4 })
    ));
    assert_eq!(js_sys::eval("window.isBridgeReady").unwrap(), JsValue::FALSE);

    js_sys::eval("window.isBridgeReady = true").unwrap();
    assert!(gate.check_ready(false).await.is_ok());
}

#[wasm_bindgen_test]
async fn unsupported_user_agents_fail_fast() {
    reset_page();

    let agent = web_sys::window().unwrap().navigator().user_agent().unwrap();
    let marker = agent.split_whitespace().next().unwrap().to_string();
    let gate = WebEnvironment::gate(WebBridgeConfig::new().with_unsupported_user_agent(marker));

    assert!(matches!(
        gate.check_ready(true).await,
        Err(BridgeError::UnsupportedHost)
    ));
    assert_eq!(gate.readiness(), Readiness::Unready);
}

#[wasm_bindgen_test]
async fn injection_signal_attaches_and_detaches_a_hidden_frame() {
    // frames left behind by earlier tests are gone after two ticks
    tick().await;
    tick().await;
    reset_page();

    let gate = WebEnvironment::gate(WebBridgeConfig::default());
    let _call = gate.call("ping", None);
    assert!(injection_frame().is_none());

    tick().await;
    let frame = injection_frame().expect("injection frame attached on the next tick");
    assert_eq!(frame.get_attribute("style").as_deref(), Some("display: none"));

    tick().await;
    assert!(injection_frame().is_none());
}

#[wasm_bindgen_test]
async fn existing_callback_queue_is_joined_without_a_new_signal() {
    tick().await;
    tick().await;
    reset_page();
    js_sys::eval("window.WVJBCallbacks = [function () {}]").unwrap();

    let gate = WebEnvironment::gate(WebBridgeConfig::default());
    gate.register("onResume", |_, _| {});
    assert_eq!(callback_queue_len(), 2);

    tick().await;
    assert!(injection_frame().is_none());

    js_sys::eval(
        r#"
        window.WebViewJavascriptBridge = window.__fakeBridge;
        const callbacks = window.WVJBCallbacks;
        delete window.WVJBCallbacks;
        callbacks.forEach((callback) => callback(window.WebViewJavascriptBridge));
        "#,
    )
    .unwrap();
    assert_eq!(registered(), vec!["onResume"]);
}

#[wasm_bindgen_test]
async fn answers_without_a_json_form_are_not_empty() {
    reset_page();
    js_sys::eval(
        r#"
        window.WebViewJavascriptBridge = {
            callHandler(name, data, callback) {
                callback(function () {});
            },
            registerHandler() {},
        };
        "#,
    )
    .unwrap();

    let gate = WebEnvironment::gate(WebBridgeConfig::default());
    let err = gate.call("odd", None).await.unwrap_err();
    assert!(matches!(err, BridgeError::Malformed(_)), "{err:?}");
}

#[wasm_bindgen_test]
async fn repeated_answers_are_ignored() {
    reset_page();
    js_sys::eval(
        r#"
        window.__secondAnswerThrew = false;
        window.WebViewJavascriptBridge = {
            callHandler(name, data, callback) {
                callback(JSON.stringify({ code: 200, data: "first", msg: "ok" }));
                try {
                    callback(JSON.stringify({ code: 200, data: "second", msg: "ok" }));
                } catch (e) {
                    window.__secondAnswerThrew = true;
                }
            },
            registerHandler() {},
        };
        "#,
    )
    .unwrap();

    let gate = WebEnvironment::gate(WebBridgeConfig::default());
    assert_eq!(gate.call("twice", None).await.unwrap(), json!("first"));
    assert_eq!(js_sys::eval("window.__secondAnswerThrew").unwrap(), JsValue::FALSE);
}
