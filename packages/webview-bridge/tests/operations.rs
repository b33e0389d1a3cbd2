use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use webview_bridge::{names, BridgeGate, MemoryBridge, MemoryEnvironment, TopViewStatus};

fn ok(data: Value) -> Option<Value> {
    Some(Value::String(
        json!({ "code": 200, "data": data, "msg": "ok" }).to_string(),
    ))
}

#[tokio::test]
async fn wrappers_hit_the_host_catalog() {
    let bridge = MemoryBridge::new();
    for name in [
        names::CALL_CAMERA_OR_PHOTO,
        names::GET_USER,
        names::GO_BACK,
        names::CLOSE_WEB,
        names::TOP_VIEW_STATUS,
    ] {
        bridge.on_call(name, |data| ok(data.unwrap_or_default()));
    }
    let gate = BridgeGate::new(MemoryEnvironment::with_handle(bridge.clone()));

    assert_eq!(gate.call_camera_or_photo(5).await.unwrap(), json!(5));
    assert_eq!(gate.call_camera_or_photo_default().await.unwrap(), json!(3));
    assert_eq!(gate.get_token().await.unwrap(), Value::Null);
    assert_eq!(gate.go_back().await.unwrap(), Value::Null);
    assert_eq!(gate.close_web().await.unwrap(), Value::Null);
    assert_eq!(
        gate.top_view_status(TopViewStatus::Hide).await.unwrap(),
        json!("hide")
    );

    assert_eq!(
        bridge.calls(),
        vec![
            ("callCameraOrPhoto".to_string(), Some(json!(5))),
            ("callCameraOrPhoto".to_string(), Some(json!(3))),
            ("getUser".to_string(), None),
            ("goBack".to_string(), None),
            ("closeWeb".to_string(), None),
            ("topViewStatus".to_string(), Some(json!("hide"))),
        ]
    );
}

#[tokio::test]
async fn wrappers_propagate_failures_unchanged() {
    let bridge = MemoryBridge::new();
    bridge.on_call(names::GET_USER, |_| {
        Some(Value::String(r#"{"code":401,"data":null,"msg":"login required"}"#.to_string()))
    });
    let gate = BridgeGate::new(MemoryEnvironment::with_handle(bridge));

    let err = gate.get_token().await.unwrap_err();
    assert_eq!(err.envelope().and_then(|e| e.code.as_i64()), Some(401));
}

#[test]
fn top_view_status_spells_like_the_host() {
    assert_eq!(TopViewStatus::Show.to_string(), "show");
    assert_eq!(TopViewStatus::Hide.as_str(), "hide");
}
