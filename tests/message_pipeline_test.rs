// ABOUTME: Integration tests for the send-message pipeline
// ABOUTME: Checks prompt assembly, stored turn order, fallback replies and upstream failure handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_resources, sign_in, sign_in_admin, Script, ScriptedLlm};
use helpers::axum_test::AxumTestRequest;
use promptdesk_server::{
    constants::chat::FALLBACK_REPLY,
    database_plugins::NewTemplate,
    llm::ChatMessage,
    models::{Message, MessageRole},
    resources::ServerResources,
    server::build_router,
    services::ConversationStartPolicy,
};
use serde_json::json;
use std::sync::Arc;

struct Fixture {
    resources: Arc<ServerResources>,
    llm: Arc<ScriptedLlm>,
    router: axum::Router,
    token: String,
    template_id: i64,
    conversation_id: i64,
}

async fn setup() -> Fixture {
    let llm = ScriptedLlm::new();
    let resources = create_test_resources(llm.clone(), ConversationStartPolicy::AlwaysCreate).await;
    let router = build_router(&resources);

    let (admin, _admin_token) = sign_in_admin(&resources).await;
    let template_id = resources
        .database
        .create_template(&NewTemplate {
            title: "Helpful bot",
            description: None,
            content: "You are a helpful bot.",
            created_by: admin.id,
        })
        .await
        .unwrap()
        .id;

    let (user, token) = sign_in(&resources, "alice").await;
    let conversation_id = resources
        .database
        .create_conversation(user.id, Some(template_id), "Chat")
        .await
        .unwrap()
        .id;

    Fixture {
        resources,
        llm,
        router,
        token,
        template_id,
        conversation_id,
    }
}

async fn send(fixture: &Fixture, content: &str) -> helpers::axum_test::AxumTestResponse {
    AxumTestRequest::post(&format!(
        "/api/conversations/{}/messages",
        fixture.conversation_id
    ))
    .bearer(&fixture.token)
    .json(&json!({ "content": content }))
    .send(fixture.router.clone())
    .await
}

fn roles_and_contents(messages: &[Message]) -> Vec<(MessageRole, String)> {
    messages
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}

#[tokio::test]
async fn test_send_returns_reply_and_stores_both_turns() {
    let fixture = setup().await;

    let response = send(&fixture, "hi").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({"content": "reply to: hi"}));

    let stored = fixture
        .resources
        .database
        .list_messages(fixture.conversation_id)
        .await;
    assert_eq!(
        roles_and_contents(&stored),
        vec![
            (MessageRole::User, "hi".to_owned()),
            (MessageRole::Assistant, "reply to: hi".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_send_leaves_conversation_row_unchanged() {
    let fixture = setup().await;
    let before = fixture
        .resources
        .database
        .get_conversation(fixture.conversation_id)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let response = send(&fixture, "hi").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let after = fixture
        .resources
        .database
        .get_conversation(fixture.conversation_id)
        .await
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_model_sees_system_prompt_then_full_history() {
    let fixture = setup().await;

    send(&fixture, "hi").await;
    send(&fixture, "bye").await;

    let requests = fixture.llm.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].messages,
        vec![
            ChatMessage::system("You are a helpful bot."),
            ChatMessage::user("hi"),
            ChatMessage::assistant("reply to: hi"),
            ChatMessage::user("bye"),
        ]
    );
}

#[tokio::test]
async fn test_soft_deleted_template_still_seeds_system_prompt() {
    let fixture = setup().await;
    fixture
        .resources
        .database
        .set_template_active(fixture.template_id, false)
        .await
        .unwrap();

    send(&fixture, "still there?").await;

    let requests = fixture.llm.requests();
    assert_eq!(
        requests[0].messages[0],
        ChatMessage::system("You are a helpful bot.")
    );
}

#[tokio::test]
async fn test_stored_system_turns_are_not_replayed() {
    let fixture = setup().await;
    fixture
        .resources
        .database
        .create_message(fixture.conversation_id, MessageRole::System, "injected")
        .await
        .unwrap();

    send(&fixture, "hi").await;

    let requests = fixture.llm.requests();
    assert_eq!(
        requests[0].messages,
        vec![
            ChatMessage::system("You are a helpful bot."),
            ChatMessage::user("hi"),
        ]
    );
}

#[tokio::test]
async fn test_conversation_without_template_has_no_system_turn() {
    let fixture = setup().await;
    let user = fixture
        .resources
        .database
        .get_user_by_open_id("alice")
        .await
        .unwrap();
    let bare = fixture
        .resources
        .database
        .create_conversation(user.id, None, "Bare")
        .await
        .unwrap();

    let response = AxumTestRequest::post(&format!("/api/conversations/{}/messages", bare.id))
        .bearer(&fixture.token)
        .json(&json!({"content": "hello"}))
        .send(fixture.router.clone())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        fixture.llm.requests()[0].messages,
        vec![ChatMessage::user("hello")]
    );
}

#[tokio::test]
async fn test_non_text_reply_stores_fallback() {
    let fixture = setup().await;
    fixture.llm.set_script(Script::NonText);

    let body: serde_json::Value = send(&fixture, "draw me a picture").await.json();

    assert_eq!(body["content"], FALLBACK_REPLY);
    let stored = fixture
        .resources
        .database
        .list_messages(fixture.conversation_id)
        .await;
    assert_eq!(stored[1].content, FALLBACK_REPLY);
    assert_eq!(stored[1].role, MessageRole::Assistant);
}

#[tokio::test]
async fn test_upstream_failure_keeps_user_turn_only() {
    let fixture = setup().await;
    fixture.llm.set_script(Script::Fail);

    let response = send(&fixture, "anyone there?").await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.error_code(), "UPSTREAM_UNAVAILABLE");

    let stored = fixture
        .resources
        .database
        .list_messages(fixture.conversation_id)
        .await;
    assert_eq!(
        roles_and_contents(&stored),
        vec![(MessageRole::User, "anyone there?".to_owned())]
    );

    fixture.llm.set_script(Script::Echo);
    send(&fixture, "retry").await;
    let replayed = &fixture.llm.requests()[1].messages;
    assert_eq!(
        replayed[1..],
        [
            ChatMessage::user("anyone there?"),
            ChatMessage::user("retry"),
        ]
    );
}

#[tokio::test]
async fn test_empty_content_is_rejected_before_storage() {
    let fixture = setup().await;

    let response = send(&fixture, "   ").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(fixture
        .resources
        .database
        .list_messages(fixture.conversation_id)
        .await
        .is_empty());
    assert!(fixture.llm.requests().is_empty());
}

#[tokio::test]
async fn test_messages_list_in_creation_order() {
    let fixture = setup().await;
    send(&fixture, "one").await;
    send(&fixture, "two").await;

    let messages: Vec<Message> = AxumTestRequest::get(&format!(
        "/api/conversations/{}/messages",
        fixture.conversation_id
    ))
    .bearer(&fixture.token)
    .send(fixture.router.clone())
    .await
    .json();

    assert_eq!(messages.len(), 4);
    assert!(messages.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert_eq!(messages[2].content, "two");
}
