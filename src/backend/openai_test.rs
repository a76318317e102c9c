use super::*;

fn completion_body(chunks: &[&str]) -> String {
    let mut lines = chunks
        .iter()
        .map(|chunk| CompletionResponse {
            id: uuid::Uuid::new_v4().to_string(),
            choices: vec![CompletionChoiceResponse {
                delta: CompletionDeltaResponse {
                    content: Some(chunk.to_string()),
                },
                finish_reason: None,
            }],
        })
        .map(|l| {
            format!(
                "data: {}",
                serde_json::to_string(&l).expect("failed to serialize")
            )
        })
        .collect::<Vec<_>>();
    lines.push("data: [DONE]".to_string());
    lines.join("\n")
}

#[tokio::test]
async fn test_generate_accumulates_stream() {
    let mut server = mockito::Server::new_async().await;
    let completion_handler = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .match_header("Authorization", "Bearer test_token")
        .with_body(completion_body(&["Hello ", "there!"]))
        .create();

    let backend = OpenAI::default()
        .with_endpoint(&server.url())
        .with_api_key("test_token");

    let prompt = GenerationPrompt::new("Hello")
        .with_model("gpt-4o-mini")
        .with_system("You are a test assistant.");

    let text = backend
        .generate(prompt)
        .await
        .expect("failed to get completion");
    completion_handler.assert();

    assert_eq!(text, "Hello there!");
}

#[tokio::test]
async fn test_generate_requires_model() {
    let backend = OpenAI::default();
    let err = backend
        .generate(GenerationPrompt::new("Hello"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no model is set"));
}

#[tokio::test]
async fn test_generate_surfaces_api_error() {
    let body = serde_json::json!({
        "error": {
            "message": "Incorrect API key provided",
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }
    });

    let mut server = mockito::Server::new_async().await;
    let completion_handler = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(body.to_string())
        .create();

    let backend = OpenAI::default()
        .with_endpoint(&server.url())
        .with_api_key("bad_token");

    let err = backend
        .generate(GenerationPrompt::new("Hello").with_model("gpt-4o-mini"))
        .await
        .unwrap_err();
    completion_handler.assert();

    let api_err = err.downcast::<ApiError>().expect("api error");
    assert_eq!(api_err.http_code, 401);
    assert_eq!(api_err.message, "Incorrect API key provided");
    assert_eq!(api_err.code.as_deref(), Some("invalid_api_key"));
}

#[tokio::test]
async fn test_health_check() {
    let mut server = mockito::Server::new_async().await;
    let ok_handler = server
        .mock("GET", "/v1/models")
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .create();

    let backend = OpenAI::default().with_endpoint(&server.url());
    backend.health_check().await.expect("health check");
    ok_handler.assert();
}

#[tokio::test]
async fn test_health_check_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/models")
        .with_status(500)
        .with_body("oops")
        .create();

    let backend = OpenAI::default().with_endpoint(&server.url());
    assert!(backend.health_check().await.is_err());
}

#[tokio::test]
async fn test_from_connection() {
    let connection = BackendConnection::new(crate::models::BackendKind::OpenAI, "http://localhost")
        .with_alias("local")
        .with_api_key("key")
        .with_timeout(std::time::Duration::from_secs(30));

    let backend: OpenAI = (&connection).into();
    assert_eq!(backend.name(), "local");
    assert_eq!(backend.endpoint(), "http://localhost");
    assert_eq!(backend.api_key(), Some("key"));
    assert_eq!(backend.timeout(), Some(std::time::Duration::from_secs(30)));
}
