//! Host integration tests.
//!
//! Installs the stock platforms into an `Extensible` host and verifies that
//! configuration, routing and conversion work together through the
//! object-safe `Platform` interface.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use parley_platforms::{
    CORE_TYPE_TAG, CorePlatformFactory, DIALOGFLOW_TYPE_TAG, DialogflowPlatformFactory,
    PlatformFactory, default_platforms, make_platform,
};
use parley_plugin::{Extensible, LifecycleState, PluginError};
use parley_types::{AppState, OutputTemplate};

fn dialogflow_request() -> Value {
    json!({
        "responseId": "r-42",
        "session": "projects/demo/agent/sessions/abc",
        "queryResult": {
            "queryText": "order a pizza",
            "languageCode": "en",
            "parameters": {}
        }
    })
}

fn core_request(type_tag: &str) -> Value {
    json!({
        "version": "4.0.0",
        "type": type_tag,
        "request": {"type": "INTENT", "body": {"intent": "OrderIntent"}},
        "session": {"id": "s-1", "data": {}, "new": true}
    })
}

async fn stock_host() -> Extensible {
    let mut host = Extensible::new("app");
    host.install_all(default_platforms()).await.unwrap();
    host
}

#[tokio::test]
async fn stock_platforms_install_in_order() {
    let host = stock_host().await;
    assert_eq!(host.names(), vec!["Dialogflow", "Core"]);
    assert_eq!(host.state("Dialogflow"), Some(LifecycleState::Installed));
    assert_eq!(host.state("Core"), Some(LifecycleState::Installed));
}

#[tokio::test]
async fn requests_are_routed_to_their_platform() {
    let host = stock_host().await;

    let platform = host.find_platform_for_request(&dialogflow_request()).unwrap();
    assert_eq!(platform.name(), "Dialogflow");

    let platform = host
        .find_platform_for_request(&core_request(CORE_TYPE_TAG))
        .unwrap();
    assert_eq!(platform.name(), "Core");

    assert!(host.find_platform_for_request(&json!({"hello": "world"})).is_none());
    assert!(host.find_platform_for_request(&core_request("unknown")).is_none());
}

#[tokio::test]
async fn responses_are_routed_back_to_their_producer() {
    let host = stock_host().await;
    let state = AppState::new().with_session_value("count", json!(1));
    let output = OutputTemplate::with_message("Hello");

    for name in ["Dialogflow", "Core"] {
        let response = host
            .platform(name)
            .unwrap()
            .respond(&[output.clone()], &state)
            .unwrap()
            .into_response();

        let producer = host.find_platform_for_response(&response).unwrap();
        assert_eq!(producer.name(), name);

        let parsed = producer.parse_response(&response).unwrap();
        assert_eq!(parsed.message, output.message);
    }
}

#[tokio::test]
async fn platform_overrides_reach_only_their_platform() {
    let host = stock_host().await;
    let mut output = OutputTemplate::with_message("generic");
    output.platform_mut("Dialogflow").message = Some("for dialogflow".into());

    let state = AppState::new();
    let dialogflow = host
        .platform("Dialogflow")
        .unwrap()
        .respond(&[output.clone()], &state)
        .unwrap()
        .into_response();
    let core = host
        .platform("Core")
        .unwrap()
        .respond(&[output], &state)
        .unwrap()
        .into_response();

    assert_eq!(
        dialogflow["fulfillment_messages"][0]["message"]["text"]["text"],
        json!(["for dialogflow"])
    );
    assert_eq!(core["output"]["message"], "generic");
    assert!(core["output"].get("platforms").is_none());
}

#[tokio::test]
async fn descriptor_variant_routes_by_its_own_tag() {
    let mut host = stock_host().await;
    let kiosk = CorePlatformFactory::from_descriptor(make_platform("Kiosk", "kiosk-v1"));
    host.install(kiosk).await.unwrap();

    let platform = host.find_platform_for_request(&core_request("kiosk-v1")).unwrap();
    assert_eq!(platform.name(), "Kiosk");
    assert_eq!(platform.type_tag(), "kiosk-v1");
    assert_eq!(platform.platform_name(), "Core");

    let response = platform
        .respond(&[OutputTemplate::with_message("hi")], &AppState::new())
        .unwrap()
        .into_response();
    assert_eq!(response["type"], "kiosk-v1");
}

#[tokio::test]
async fn second_stock_set_is_rejected_as_duplicate() {
    let mut host = stock_host().await;
    let err = host.install(DialogflowPlatformFactory::new()).await.unwrap_err();
    assert!(matches!(err, PluginError::DuplicateIdentity(ref name) if name == "Dialogflow"));
    assert_eq!(host.len(), 2);
}

#[tokio::test]
async fn aliased_platform_keeps_the_kind_override_key() {
    let mut host = Extensible::new("app");
    host.install(
        DialogflowPlatformFactory::new()
            .definition()
            .named("Assistant")
            .with_config(json!({"type": "assistant"})),
    )
    .await
    .unwrap();

    let platform = host.platform("Assistant").unwrap();
    assert_eq!(platform.type_tag(), "assistant");

    let mut output = OutputTemplate::with_message("generic");
    output.platform_mut("Dialogflow").message = Some("override".into());
    let response = platform
        .respond(&[output], &AppState::new())
        .unwrap()
        .into_response();
    assert_eq!(
        response["fulfillment_messages"][0]["message"]["text"]["text"],
        json!(["override"])
    );
    assert_eq!(response["type"], "assistant");
}

#[tokio::test]
async fn platforms_nest_under_platforms() {
    let mut host = Extensible::new("app");
    let definition = PlatformFactory::<parley_platforms::Core>::new()
        .definition()
        .with_plugin(
            DialogflowPlatformFactory::new()
                .definition()
                .with_config(json!({"type": "nested-dialogflow"})),
        );
    host.install(definition).await.unwrap();

    let names: Vec<_> = host.platforms().iter().map(|p| p.name().to_owned()).collect();
    assert_eq!(names, vec!["Core", "Dialogflow"]);
    assert_eq!(host.len(), 1);

    let nested = host.platform("Dialogflow").unwrap();
    assert_eq!(nested.type_tag(), "nested-dialogflow");
}

#[tokio::test]
async fn shutdown_uninstalls_every_platform() {
    let host = stock_host().await;
    let results = host.shutdown().await;
    let names: Vec<_> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["Core", "Dialogflow"]);
    assert!(results.iter().all(|(_, result)| result.is_ok()));
}

#[tokio::test]
async fn effective_config_is_reported_per_platform() {
    let mut host = Extensible::new("app");
    host.install(
        DialogflowPlatformFactory::new()
            .definition()
            .with_config(json!({"output": {"sanitization": {"maxLength": false}}})),
    )
    .await
    .unwrap();

    let config = host.get("Dialogflow").unwrap().config();
    assert_eq!(config["type"], DIALOGFLOW_TYPE_TAG);
    assert_eq!(
        config["output"]["sanitization"],
        json!({"max_size": true, "max_length": false})
    );
    assert_eq!(config["output"]["limits"]["quick_replies_max_size"], 20);
}
