use serde_json::{json, Value};
use std::net::TcpListener;
use warbler::configuration::AuthSettings;
use warbler::startup::run;
use warbler::storage::Stores;

fn test_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "integration-test-secret-0123456789abcdef".to_string(),
        access_token_ttl_seconds: 3600,
        webhook_api_key: "f271c81ff7084ee5b99a5091b42d486e".to_string(),
    }
}

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = run(listener, Stores::in_memory(), test_settings())
        .expect("Failed to create server");

    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://127.0.0.1:{}", port)
}

/// Registers a user and returns their access token
async fn register_user(client: &reqwest::Client, address: &str, email: &str) -> String {
    let response = client
        .post(&format!("{}/auth/register", address))
        .json(&json!({ "email": email, "password": "SecurePass123" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

async fn current_user_id(client: &reqwest::Client, address: &str, access_token: &str) -> String {
    let response = client
        .get(&format!("{}/api/me", address))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"]
        .as_str()
        .expect("No user id in response")
        .to_string()
}

async fn post_message(
    client: &reqwest::Client,
    address: &str,
    access_token: &str,
    body: &str,
) -> reqwest::Response {
    client
        .post(&format!("{}/api/messages", address))
        .header("Authorization", format!("Bearer {}", access_token))
        .json(&json!({ "body": body }))
        .send()
        .await
        .expect("Failed to execute request.")
}

// --- Creation Tests ---

#[tokio::test]
async fn create_message_returns_201_for_authenticated_user() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;
    let user_id = current_user_id(&client, &addr, &access_token).await;

    let response = post_message(&client, &addr, &access_token, "Hello from the treetops").await;
    assert_eq!(201, response.status().as_u16());

    let message: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(message["body"], "Hello from the treetops");
    assert_eq!(message["user_id"], user_id.as_str());
    assert!(message["id"].as_str().is_some());
}

#[tokio::test]
async fn create_message_requires_authentication() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/messages", &addr))
        .json(&json!({ "body": "Hello" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn create_message_enforces_the_length_limit() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;

    let at_limit = "a".repeat(140);
    let response = post_message(&client, &addr, &access_token, &at_limit).await;
    assert_eq!(201, response.status().as_u16(),
        "A 140 character body is still acceptable");

    let over_limit = "a".repeat(141);
    let response = post_message(&client, &addr, &access_token, &over_limit).await;
    assert_eq!(400, response.status().as_u16(),
        "A 141 character body must be rejected");
}

#[tokio::test]
async fn profanity_is_scrubbed_before_storage() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;

    let response = post_message(
        &client,
        &addr,
        &access_token,
        "This kerfuffle is a Sharbert fornax situation",
    )
    .await;
    assert_eq!(201, response.status().as_u16());

    let message: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(message["body"], "This **** is a **** **** situation");

    // The stored copy is the scrubbed one
    let message_id = message["id"].as_str().expect("No message id in response");
    let fetched = client
        .get(&format!("{}/messages/{}", &addr, message_id))
        .send()
        .await
        .expect("Failed to execute request.");
    let fetched_body: Value = fetched.json().await.expect("Failed to parse response");
    assert_eq!(fetched_body["body"], "This **** is a **** **** situation");
}

#[tokio::test]
async fn profanity_with_punctuation_is_left_alone() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;

    let response = post_message(&client, &addr, &access_token, "What a kerfuffle!").await;
    assert_eq!(201, response.status().as_u16());

    let message: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(message["body"], "What a kerfuffle!");
}

// --- Listing Tests ---

#[tokio::test]
async fn list_messages_is_public_and_oldest_first() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;
    for body in ["first", "second", "third"] {
        let response = post_message(&client, &addr, &access_token, body).await;
        assert_eq!(201, response.status().as_u16());
    }

    // No Authorization header on the read side
    let response = client
        .get(&format!("{}/messages", &addr))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let messages: Vec<Value> = response.json().await.expect("Failed to parse response");
    let bodies: Vec<&str> = messages.iter().filter_map(|m| m["body"].as_str()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn list_messages_sort_desc_returns_newest_first() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;
    for body in ["first", "second", "third"] {
        let response = post_message(&client, &addr, &access_token, body).await;
        assert_eq!(201, response.status().as_u16());
    }

    let response = client
        .get(&format!("{}/messages?sort=desc", &addr))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let messages: Vec<Value> = response.json().await.expect("Failed to parse response");
    let bodies: Vec<&str> = messages.iter().filter_map(|m| m["body"].as_str()).collect();
    assert_eq!(bodies, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn list_messages_filters_by_author() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let first_token = register_user(&client, &addr, "first@example.com").await;
    let second_token = register_user(&client, &addr, "second@example.com").await;
    let first_id = current_user_id(&client, &addr, &first_token).await;

    post_message(&client, &addr, &first_token, "mine").await;
    post_message(&client, &addr, &second_token, "theirs").await;
    post_message(&client, &addr, &first_token, "mine again").await;

    let response = client
        .get(&format!("{}/messages?author_id={}", &addr, first_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let messages: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(2, messages.len());
    for message in &messages {
        assert_eq!(message["user_id"], first_id.as_str());
    }
}

#[tokio::test]
async fn list_messages_returns_400_for_malformed_author_id() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/messages?author_id=not-a-uuid", &addr))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn list_messages_returns_empty_array_for_unknown_author() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;
    post_message(&client, &addr, &access_token, "hello").await;

    let response = client
        .get(&format!(
            "{}/messages?author_id={}",
            &addr,
            uuid::Uuid::new_v4()
        ))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let messages: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(messages.is_empty());
}

// --- Lookup Tests ---

#[tokio::test]
async fn get_message_returns_404_for_unknown_id() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/messages/{}", &addr, uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn get_message_returns_400_for_malformed_id() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/messages/not-a-uuid", &addr))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

// --- Deletion Tests ---

#[tokio::test]
async fn delete_message_returns_204_for_owner() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;
    let response = post_message(&client, &addr, &access_token, "short lived").await;
    let message: Value = response.json().await.expect("Failed to parse response");
    let message_id = message["id"].as_str().expect("No message id in response");

    let delete_response = client
        .delete(&format!("{}/api/messages/{}", &addr, message_id))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, delete_response.status().as_u16());

    let fetch_response = client
        .get(&format!("{}/messages/{}", &addr, message_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, fetch_response.status().as_u16());
}

#[tokio::test]
async fn delete_message_returns_403_for_non_owner() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let owner_token = register_user(&client, &addr, "owner@example.com").await;
    let other_token = register_user(&client, &addr, "other@example.com").await;

    let response = post_message(&client, &addr, &owner_token, "hands off").await;
    let message: Value = response.json().await.expect("Failed to parse response");
    let message_id = message["id"].as_str().expect("No message id in response");

    let delete_response = client
        .delete(&format!("{}/api/messages/{}", &addr, message_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(403, delete_response.status().as_u16());

    // The message is still there
    let fetch_response = client
        .get(&format!("{}/messages/{}", &addr, message_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, fetch_response.status().as_u16());
}

#[tokio::test]
async fn delete_message_returns_404_for_unknown_id() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let access_token = register_user(&client, &addr, "author@example.com").await;

    let response = client
        .delete(&format!("{}/api/messages/{}", &addr, uuid::Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_message_requires_authentication() {
    let addr = spawn_app();
    let client = reqwest::Client::new();

    let response = client
        .delete(&format!("{}/api/messages/{}", &addr, uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}
