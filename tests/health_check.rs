//! Integration tests for the warbler server

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

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn health_check_needs_no_authentication() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}
