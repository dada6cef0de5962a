//! End-to-end tests for the tubemeta binary.

#![allow(deprecated)]

mod support;

use support::fixtures::{initial_page, rows};
use support::socket_guard::{socket_skip_return, start_mock_server_or_skip};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_playlist(server: &MockServer, id: &str, item_count: usize) {
    Mock::given(method("GET"))
        .and(path("/playlist"))
        .and(query_param("list", id))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(initial_page(1, &rows(id, item_count), "").into_bytes(), "text/html"),
        )
        .mount(server)
        .await;
}

fn tubemeta() -> Command {
    let mut cmd = Command::cargo_bin("tubemeta").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_lists_subcommands() {
    tubemeta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("playlist"))
        .stdout(predicate::str::contains("video"));
}

#[test]
fn test_binary_without_ids_is_usage_error() {
    tubemeta()
        .arg("playlist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ID>"));
}

#[tokio::test]
async fn test_binary_writes_default_output_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_playlist(&server, "PLok", 3).await;
    let tempdir = TempDir::new().unwrap();

    tubemeta()
        .current_dir(tempdir.path())
        .args(["-q", "playlist", "--base-url", server.uri().as_str(), "PLok"])
        .assert()
        .success();

    let written = std::fs::read_to_string(tempdir.path().join("list_PLok.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["id"], "PLok");
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["items"][2]["lengthSeconds"], 187);
}

#[tokio::test]
async fn test_binary_pretty_stdout() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_playlist(&server, "PLout", 1).await;

    tubemeta()
        .args(["-q", "playlist", "--base-url", server.uri().as_str(), "--output", "-", "--pretty", "PLout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n    \"id\": \"PLout\""))
        .stdout(predicate::str::contains("\n            \"lengthSeconds\": 187"));
}

#[tokio::test]
async fn test_binary_exit_code_partial_failure_is_one() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_playlist(&server, "PLgood", 2).await;
    Mock::given(method("GET"))
        .and(path("/playlist"))
        .and(query_param("list", "PLbad"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let tempdir = TempDir::new().unwrap();
    let pattern = tempdir.path().join("{id}.json");

    let assert = tubemeta()
        .args(["-q", "playlist", "--base-url", server.uri().as_str(), "--output"])
        .arg(&pattern)
        .args(["PLbad", "PLgood"])
        .assert()
        .failure();

    assert_eq!(assert.get_output().status.code(), Some(1));
    assert!(tempdir.path().join("PLgood.json").exists());
    assert!(!tempdir.path().join("PLbad.json").exists());
}

#[tokio::test]
async fn test_binary_reports_layout_mismatch() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    Mock::given(method("GET"))
        .and(path("/playlist"))
        .and(query_param("list", "PLshape"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>nothing here</p></body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let assert = tubemeta()
        .args(["playlist", "--base-url", server.uri().as_str(), "--output", "-", "PLshape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("layout did not match"));

    assert_eq!(assert.get_output().status.code(), Some(1));
}

#[tokio::test]
async fn test_binary_unwritable_output_is_exit_two() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_playlist(&server, "PLw", 1).await;
    let tempdir = TempDir::new().unwrap();
    let pattern = tempdir.path().join("no-such-dir").join("{id}.json");

    let assert = tubemeta()
        .args(["playlist", "--base-url", server.uri().as_str(), "--output"])
        .arg(&pattern)
        .arg("PLw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to write"));

    assert_eq!(assert.get_output().status.code(), Some(2));
}

#[tokio::test]
async fn test_binary_video_to_stdout() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(
            "player_response",
            r#"{"videoDetails":{"title":"Clip","lengthSeconds":"9","author":"Me","channelId":"UC1"}}"#,
        )
        .finish();
    Mock::given(method("GET"))
        .and(path("/get_video_info"))
        .and(query_param("video_id", "vid"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "application/x-www-form-urlencoded"),
        )
        .mount(&server)
        .await;

    let output = tubemeta()
        .args(["-q", "video", "--base-url", server.uri().as_str(), "-o", "-", "vid"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["title"], "Clip");
    assert_eq!(json["lengthSeconds"], 9);
    assert_eq!(json["uploader"]["channelId"], "UC1");
    assert_eq!(json["keywords"], serde_json::json!([]));
}

#[tokio::test]
async fn test_binary_unique_drops_repeated_items() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    let mut batch = rows("d", 2);
    batch.push(batch[1].clone());
    Mock::given(method("GET"))
        .and(path("/playlist"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(initial_page(0, &batch, "").into_bytes(), "text/html"),
        )
        .mount(&server)
        .await;

    let output = tubemeta()
        .args(["-q", "playlist", "--base-url", server.uri().as_str(), "-o", "-", "--unique", "PLd"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
}
