use super::*;
use alfred_protocols::{FnTool, ParameterSpec, ParameterType};
use serde_json::json;

fn upper_tool(name: &str, description: &str) -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        ToolDescriptor::new(name, description)
            .with_category(ToolCategory::ContentGeneration)
            .with_parameter("text", ParameterSpec::required(ParameterType::String))
            .with_parameter(
                "suffix",
                ParameterSpec::with_default(ParameterType::String, json!("")),
            ),
        |args| {
            let text = args.get("text").and_then(Value::as_str).unwrap_or_default();
            let suffix = args.get("suffix").and_then(Value::as_str).unwrap_or_default();
            Ok(json!(format!("{}{}", text.to_uppercase(), suffix)))
        },
    ))
}

fn failing_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        ToolDescriptor::new("flaky", "Always fails"),
        |_| Err("upstream returned 503".to_string()),
    ))
}

fn secret_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        ToolDescriptor::new("vault", "Reads secrets").requires_auth(true),
        |_| Ok(json!("s3cr3t")),
    ))
}

fn args(value: Value) -> ValueMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("test arguments must be an object"),
    }
}

#[test]
fn test_register_and_resolve() {
    let registry = ToolRegistry::new();
    assert!(registry.register(upper_tool("upper", "Uppercase")));
    assert!(registry.contains("upper"));

    let descriptor = registry.resolve("upper").unwrap();
    assert_eq!(descriptor.description, "Uppercase");
}

#[test]
fn test_duplicate_name_returns_false() {
    let registry = ToolRegistry::new();
    assert!(registry.register(upper_tool("upper", "First")));
    assert!(!registry.register(upper_tool("upper", "Second")));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.resolve("upper").unwrap().description, "First");
}

#[test]
fn test_resolve_unknown() {
    let registry = ToolRegistry::new();
    assert!(matches!(
        registry.resolve("missing"),
        Err(ToolError::UnknownTool(name)) if name == "missing"
    ));
}

#[test]
fn test_list_all_and_by_category() {
    let registry = ToolRegistry::new();
    registry.register(upper_tool("upper", "Uppercase"));
    registry.register(failing_tool());

    let all: Vec<_> = registry.list_all().into_iter().map(|d| d.name).collect();
    assert_eq!(all, vec!["upper", "flaky"]);

    let generation = registry.list_by_category(ToolCategory::ContentGeneration);
    assert_eq!(generation.len(), 1);
    assert_eq!(generation[0].name, "upper");
    assert!(registry.list_by_category(ToolCategory::Analysis).is_empty());
}

#[tokio::test]
async fn test_invoke_applies_defaults() {
    let registry = ToolRegistry::new();
    registry.register(upper_tool("upper", "Uppercase"));

    let result = registry
        .invoke("upper", args(json!({"text": "hello"})))
        .await
        .unwrap();
    assert_eq!(result, json!("HELLO"));

    let result = registry
        .invoke("upper", args(json!({"text": "hi", "suffix": "!"})))
        .await
        .unwrap();
    assert_eq!(result, json!("HI!"));
}

#[tokio::test]
async fn test_invoke_parameter_error() {
    let registry = ToolRegistry::new();
    registry.register(upper_tool("upper", "Uppercase"));

    let err = registry.invoke("upper", ValueMap::new()).await.unwrap_err();
    assert!(matches!(err, ToolError::Parameter { .. }));
}

#[tokio::test]
async fn test_invoke_unknown_tool() {
    let registry = ToolRegistry::new();
    let err = registry.invoke("nope", ValueMap::new()).await.unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(_)));
}

#[tokio::test]
async fn test_invoke_execution_error_wrapped() {
    let registry = ToolRegistry::new();
    registry.register(failing_tool());

    let err = registry.invoke("flaky", ValueMap::new()).await.unwrap_err();
    match err {
        ToolError::Execution { tool, message } => {
            assert_eq!(tool, "flaky");
            assert!(message.contains("503"));
        }
        other => panic!("Expected Execution error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_auth_default_accepts() {
    let registry = ToolRegistry::new();
    registry.register(secret_tool());

    let result = registry.invoke("vault", ValueMap::new()).await.unwrap();
    assert_eq!(result, json!("s3cr3t"));
    assert!(registry.list_all()[0].requires_auth);
}

#[tokio::test]
async fn test_auth_predicate_refuses() {
    let registry = ToolRegistry::new().with_authorizer(|_| false);
    registry.register(secret_tool());
    registry.register(upper_tool("upper", "Uppercase"));

    let err = registry.invoke("vault", ValueMap::new()).await.unwrap_err();
    assert!(matches!(err, ToolError::Execution { .. }));

    // Tools without the flag are unaffected.
    assert!(
        registry
            .invoke("upper", args(json!({"text": "ok"})))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_invoke_through_invoker_handle() {
    let registry = Arc::new(ToolRegistry::with_config(ToolRegistryConfig {
        log_arguments: true,
    }));
    registry.register(upper_tool("upper", "Uppercase"));

    let invoker: Arc<dyn ToolInvoker> = registry.clone();
    let result = invoker
        .invoke("upper", args(json!({"text": "via handle"})))
        .await
        .unwrap();
    assert_eq!(result, json!("VIA HANDLE"));
    assert_eq!(invoker.descriptor("upper").unwrap().name, "upper");
}

#[tokio::test]
async fn test_invoke_with_argument_logging() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let registry = ToolRegistry::with_config(ToolRegistryConfig {
        log_arguments: true,
    });
    assert!(registry.register(upper_tool("upper", "Uppercase")));

    let result = registry
        .invoke("upper", args(json!({"text": "logged"})))
        .await
        .unwrap();
    assert_eq!(result, json!("LOGGED"));
}
