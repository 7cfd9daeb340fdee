//! Generation loop behaviour against a scripted provider.

use super::fakes::{tool_call, ScriptedClient, StubTool};
use crate::rag::GenerationLoop;
use crate::tools::{ToolContext, ToolRegistry};
use coursebot_core::AppError;
use coursebot_llm::{CompletionResponse, ContentBlock, MessageContent, Role};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn registry_with(tools: Vec<StubTool>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(Arc::new(tool)).unwrap();
    }
    registry
}

fn generator(client: &Arc<ScriptedClient>) -> GenerationLoop {
    GenerationLoop::new(client.clone(), "test-model")
}

fn tool_results(content: &MessageContent) -> Vec<(String, String, bool)> {
    match content {
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolResult { call_id, content, is_error } => {
                    Some((call_id.clone(), content.clone(), *is_error))
                }
                _ => None,
            })
            .collect(),
        MessageContent::Text(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_direct_answer_makes_one_call() {
    let client = Arc::new(ScriptedClient::new(vec![CompletionResponse::text("4")]));
    let registry = registry_with(vec![StubTool::ok("search_course_content", "unused")]);
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .generate("What is 2+2?", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    assert_eq!(answer, "4");
    assert_eq!(client.calls(), 1);

    let request = &client.requests()[0];
    assert!(request.has_tools());
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.max_tokens, 800);
    assert_eq!(request.temperature, Some(0.0));
}

#[tokio::test]
async fn test_no_tools_configured() {
    let client = Arc::new(ScriptedClient::new(vec![CompletionResponse::text("2+2 equals 4.")]));
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .generate("What is 2+2?", None, &[], None, &mut ctx)
        .await
        .unwrap();

    assert_eq!(answer, "2+2 equals 4.");
    assert_eq!(client.calls(), 1);

    let body = serde_json::to_value(&client.requests()[0]).unwrap();
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
    assert!(ctx.is_empty());
}

#[tokio::test]
async fn test_tool_request_without_registry_returns_text() {
    let client = Arc::new(ScriptedClient::new(vec![CompletionResponse::tool_calls(vec![
        ContentBlock::text("Let me check."),
        ContentBlock::tool_use("t1", "search_course_content", json!({"query": "x"})),
    ])]));
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .generate("query", None, &[], None, &mut ctx)
        .await
        .unwrap();

    assert_eq!(answer, "Let me check.");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_single_tool_round() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("toolu_1", "search_course_content", json!({"query": "neural networks"})),
        CompletionResponse::text("Neural networks are covered in lesson 2."),
    ]));
    let registry = registry_with(vec![StubTool::ok("search_course_content", "[AI Course - Lesson 2]\nNeural networks...")]);
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .generate("Tell me about neural networks", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    assert_eq!(answer, "Neural networks are covered in lesson 2.");
    assert_eq!(client.calls(), 2);

    let second = &client.requests()[1];
    assert!(second.has_tools());
    assert_eq!(second.messages.len(), 3);
    assert_eq!(second.messages[1].role, Role::Assistant);
    assert_eq!(second.messages[2].role, Role::User);
    assert_eq!(
        tool_results(&second.messages[2].content),
        vec![(
            "toolu_1".to_string(),
            "[AI Course - Lesson 2]\nNeural networks...".to_string(),
            false
        )]
    );
}

#[tokio::test]
async fn test_two_rounds_force_final_call_without_tools() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("t1", "get_course_outline", json!({"course_title": "AI"})),
        tool_call("t2", "search_course_content", json!({"query": "lesson 4"})),
        // would ask for a third round if tools were still offered
        tool_call("t3", "search_course_content", json!({"query": "more"})),
    ]));
    let outline = StubTool::ok("get_course_outline", "outline");
    let search = StubTool::ok("search_course_content", "results");
    let registry = registry_with(vec![outline, search]);
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .generate("What does lesson 4 cover?", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    // the forced final call's text is returned even when empty
    assert_eq!(answer, "");
    assert_eq!(client.calls(), 3);

    let requests = client.requests();
    assert!(requests[0].has_tools());
    assert!(requests[1].has_tools());

    let final_body = serde_json::to_value(&requests[2]).unwrap();
    assert!(final_body.get("tools").is_none());
    assert!(final_body.get("tool_choice").is_none());
    assert_eq!(requests[2].messages.len(), 5);
    assert_eq!(requests[2].system, requests[0].system);
}

#[tokio::test]
async fn test_tool_batches_counted_per_round() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("t1", "search_course_content", json!({"query": "a"})),
        tool_call("t2", "search_course_content", json!({"query": "b"})),
        CompletionResponse::text("done"),
    ]));
    let mut registry = ToolRegistry::new();
    let search = Arc::new(StubTool::ok("search_course_content", "results"));
    registry.register(search.clone()).unwrap();
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .generate("q", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    assert_eq!(answer, "done");
    assert_eq!(search.calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_multiple_tool_calls_in_one_round_run_in_order() {
    let client = Arc::new(ScriptedClient::new(vec![
        CompletionResponse::tool_calls(vec![
            ContentBlock::tool_use("a", "get_course_outline", json!({"course_title": "AI"})),
            ContentBlock::text("and"),
            ContentBlock::tool_use("b", "search_course_content", json!({"query": "x"})),
        ]),
        CompletionResponse::text("combined"),
    ]));
    let registry = registry_with(vec![
        StubTool::ok("search_course_content", "search output"),
        StubTool::ok("get_course_outline", "outline output"),
    ]);
    let mut ctx = ToolContext::new();

    generator(&client)
        .generate("q", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    let second = &client.requests()[1];
    // the assistant turn is replayed verbatim, text blocks included
    assert!(matches!(&second.messages[1].content, MessageContent::Blocks(b) if b.len() == 3));

    let results = tool_results(&second.messages[2].content);
    assert_eq!(
        results.iter().map(|(id, content, _)| (id.as_str(), content.as_str())).collect::<Vec<_>>(),
        vec![("a", "outline output"), ("b", "search output")]
    );
}

#[tokio::test]
async fn test_tool_failure_is_fed_back_as_text() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("t1", "search_course_content", json!({"query": "x"})),
        CompletionResponse::text("Sorry, search is unavailable."),
    ]));
    let registry = registry_with(vec![StubTool::failing("search_course_content", "Database connection failed")]);
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .generate("q", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    assert_eq!(answer, "Sorry, search is unavailable.");

    let results = tool_results(&client.requests()[1].messages[2].content);
    assert_eq!(results.len(), 1);
    assert!(results[0].1.contains("Tool execution error:"));
    assert!(results[0].1.contains("Database connection failed"));
    assert!(results[0].2);
}

#[tokio::test]
async fn test_unknown_tool_is_reported_to_model() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("t1", "unknown_tool", json!({})),
        CompletionResponse::text("ok"),
    ]));
    let registry = registry_with(vec![StubTool::ok("search_course_content", "x")]);
    let mut ctx = ToolContext::new();

    generator(&client)
        .generate("q", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    let results = tool_results(&client.requests()[1].messages[2].content);
    assert!(results[0].1.to_lowercase().contains("not found"));
    assert!(!results[0].2);
}

#[tokio::test]
async fn test_history_is_appended_to_system_prompt() {
    let client = Arc::new(ScriptedClient::new(vec![CompletionResponse::text("answer")]));
    let mut ctx = ToolContext::new();

    generator(&client)
        .generate("follow up", Some("User: hi\nAssistant: hello"), &[], None, &mut ctx)
        .await
        .unwrap();

    let system = client.requests()[0].system.clone().unwrap();
    assert!(system.contains("Previous conversation:\nUser: hi\nAssistant: hello"));
}

#[tokio::test]
async fn test_provider_error_propagates() {
    let client = Arc::new(ScriptedClient::with_results(vec![
        Ok(tool_call("t1", "search_course_content", json!({"query": "x"}))),
        Err(AppError::Llm("API rate limit exceeded".to_string())),
    ]));
    let registry = registry_with(vec![StubTool::ok("search_course_content", "x")]);
    let mut ctx = ToolContext::new();

    let err = generator(&client)
        .generate("q", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Llm(ref m) if m.contains("rate limit")));
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_custom_round_cap() {
    let client = Arc::new(ScriptedClient::new(vec![
        tool_call("t1", "search_course_content", json!({"query": "x"})),
        CompletionResponse::text("final"),
    ]));
    let registry = registry_with(vec![StubTool::ok("search_course_content", "x")]);
    let mut ctx = ToolContext::new();

    let answer = generator(&client)
        .with_max_tool_rounds(1)
        .generate("q", None, &registry.schemas(), Some(&registry), &mut ctx)
        .await
        .unwrap();

    assert_eq!(answer, "final");
    assert!(!client.requests()[1].has_tools());
}
