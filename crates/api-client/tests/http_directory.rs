//! End-to-end tests for the HTTP directory client.
//!
//! Each test starts the real REST router on a random local port backed by a temporary store.

use api_client::HttpClientDirectory;
use api_rest::{router, AppState};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use therapist_core::{
    ClientDirectory, ClientPayload, ClientService, CoreConfig, DirectoryError, FormField, Gender,
    SubmissionCoordinator, SubmissionState,
};

async fn start_test_server(temp_dir: &TempDir) -> SocketAddr {
    let cfg = Arc::new(
        CoreConfig::new(temp_dir.path().to_path_buf()).expect("CoreConfig::new should succeed"),
    );
    let clients = ClientService::open(cfg).expect("open should succeed");
    let app = router(
        AppState::new(clients),
        vec![HeaderValue::from_static("http://localhost:3000")],
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener should have an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    addr
}

fn directory_for(addr: SocketAddr) -> HttpClientDirectory {
    HttpClientDirectory::new(format!("http://{addr}/api/v1")).expect("client should build")
}

fn payload(full_name: &str, age: i64, gender: Gender) -> ClientPayload {
    ClientPayload {
        full_name: full_name.into(),
        age,
        gender,
        custom_gender: None,
        background: None,
    }
}

#[tokio::test]
async fn test_create_get_update_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let directory = directory_for(start_test_server(&temp_dir).await);

    let created = directory
        .create_client(&payload("Robin Hart", 40, Gender::NonBinary))
        .await
        .expect("create should succeed");
    assert_eq!(created.id, 1);

    let fetched = directory.get_client(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let by_uuid = directory.get_client_by_uuid(&created.uuid).await.unwrap();
    assert_eq!(by_uuid, created);

    let updated = directory
        .update_client(created.id, &payload("Robin Hart", 41, Gender::NonBinary))
        .await
        .unwrap();
    assert_eq!(updated.age, 41);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_status_mapping() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let directory = directory_for(start_test_server(&temp_dir).await);

    assert_eq!(
        directory.get_client(404).await.unwrap_err(),
        DirectoryError::NotFound
    );
    assert_eq!(
        directory
            .create_client(&payload("Robin", 121, Gender::Male))
            .await
            .unwrap_err(),
        DirectoryError::Rejected("Age must be between 0 and 120".into())
    );
}

#[tokio::test]
async fn test_list_fetches_full_records() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let directory = directory_for(start_test_server(&temp_dir).await);

    let mut with_background = payload("Alice", 30, Gender::Female);
    with_background.background = Some("Weekly sessions.".into());
    directory.create_client(&with_background).await.unwrap();
    directory
        .create_client(&payload("Bob", 45, Gender::Male))
        .await
        .unwrap();

    let all = directory.list_clients().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].background.as_deref(), Some("Weekly sessions."));
    assert_eq!(all[1].full_name, "Bob");

    assert_eq!(directory.count_clients().await.unwrap(), 2);
    directory.delete_client(all[0].id).await.unwrap();
    assert_eq!(directory.count_clients().await.unwrap(), 1);
    assert_eq!(
        directory.delete_client(all[0].id).await.unwrap_err(),
        DirectoryError::NotFound
    );
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let directory = directory_for(addr);
    let err = directory.get_client(1).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_coordinator_submits_through_http() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let directory = directory_for(start_test_server(&temp_dir).await);

    let mut coordinator = SubmissionCoordinator::for_new_client();
    coordinator.set_field(FormField::FullName, "Al");
    coordinator.set_field(FormField::Age, "120");
    coordinator.set_field(FormField::Gender, "male");

    let state = coordinator.submit(&directory).await;

    assert_eq!(state, SubmissionState::Success);
    let record = coordinator.record().expect("record should be set");
    assert_eq!(record.id, 1);
    assert_eq!(record.full_name, "Al");
}
