//! Upload and listing integration tests.
//!
//! Run with: `cargo test -p vidvault-api --test videos_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::fixtures::{file_part, upload_form, video_bytes, FILES_FIELD};
use helpers::{setup_local_app, setup_production_app, setup_test_app};
use serde_json::Value;

#[tokio::test]
async fn test_upload_single_video() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("clip.mp4", 2048)]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    assert!(body.get("errors").is_none());

    let file = &body["files"][0];
    assert_eq!(file["filename"], "clip.mp4");
    assert_eq!(file["size"], 2048);
    assert_eq!(file["content_type"], "video/mp4");

    let blob_name = file["blob_name"].as_str().unwrap();
    assert!(blob_name.ends_with(".mp4"));
    assert_eq!(blob_name.len(), 36 + ".mp4".len());
    assert!(file["url"].as_str().unwrap().ends_with(blob_name));

    let stored = app.memory().get_object(&app.container, blob_name).unwrap();
    assert_eq!(stored.to_vec(), video_bytes(2048));
}

#[tokio::test]
async fn test_upload_mixed_batch_reports_per_file_errors() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("clip.mp4", 512), ("notes.txt", 64)]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    assert_eq!(body["error_count"], 1);
    assert_eq!(body["files"][0]["filename"], "clip.mp4");

    let error = &body["errors"][0];
    assert_eq!(error["filename"], "notes.txt");
    assert_eq!(error["error"], "Invalid file type");
    assert_eq!(error["message"], "Only MP4, MOV, AVI, MKV, WEBM files are allowed");

    assert_eq!(app.memory().object_count(&app.container), 1);
}

#[tokio::test]
async fn test_upload_only_invalid_files_returns_400() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("notes.txt", 10), ("movie.exe", 10)]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["total"], 0);
    assert_eq!(body["error_count"], 2);
    assert_eq!(body["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_extension_check_is_case_insensitive() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("HOLIDAY.MOV", 32)]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["files"][0]["content_type"], "video/quicktime");
    assert!(body["files"][0]["blob_name"].as_str().unwrap().ends_with(".mov"));
}

#[tokio::test]
async fn test_uploaded_filename_is_sanitized() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("../../etc/evil clip.webm", 16)]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let filename = body["files"][0]["filename"].as_str().unwrap();
    assert!(!filename.contains('/'));
    assert!(!filename.contains(".."));
    assert!(filename.ends_with(".webm"));
}

#[tokio::test]
async fn test_storage_failure_does_not_abort_batch() {
    let app = setup_test_app();
    app.memory().set_fail_writes(true);

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("a.mp4", 100), ("b.txt", 10), ("c.mkv", 100)]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error_count"], 3);

    let labels: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["error"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Upload failed", "Invalid file type", "Upload failed"]);
    assert_eq!(body["errors"][2]["filename"], "c.mkv");

    app.memory().set_fail_writes(false);
    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("a.mp4", 100)]))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_upload_without_files_field_returns_400() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_text("description", "holiday");
    let response = app.client().post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No files provided");
    assert_eq!(body["message"], "Please select files to upload");
}

#[tokio::test]
async fn test_upload_with_empty_selection_returns_400() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_part(FILES_FIELD, file_part("", Vec::new()));
    let response = app.client().post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No files provided");
    assert_eq!(body["message"], "Please select at least one file to upload");
}

#[tokio::test]
async fn test_list_before_any_upload_is_empty() {
    let app = setup_test_app();

    let response = app.client().get("/api/videos").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 0);
    assert_eq!(body["videos"].as_array().unwrap().len(), 0);
    assert_eq!(body["message"], "No videos uploaded yet");
}

#[tokio::test]
async fn test_list_after_upload_returns_stored_objects() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("one.mp4", 300), ("two.avi", 700)]))
        .await;
    assert_eq!(response.status_code(), 200);
    let uploaded: Value = response.json();

    let response = app.client().get("/api/videos").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["total"], 2);
    assert!(body.get("message").is_none());

    for file in uploaded["files"].as_array().unwrap() {
        let blob_name = file["blob_name"].as_str().unwrap();
        let listed = body["videos"]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["filename"] == blob_name)
            .expect("uploaded blob missing from listing");
        assert_eq!(listed["id"], blob_name);
        assert_eq!(listed["size"], file["size"]);
        assert_eq!(listed["content_type"], file["content_type"]);
        assert_eq!(listed["url"], file["url"]);
    }
}

#[tokio::test]
async fn test_local_backend_upload_and_list() {
    let app = setup_local_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("clip.webm", 1024)]))
        .await;
    assert_eq!(response.status_code(), 200);
    let uploaded: Value = response.json();
    let blob_name = uploaded["files"][0]["blob_name"].as_str().unwrap().to_string();

    let body: Value = app.client().get("/api/videos").await.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["videos"][0]["filename"], blob_name);
    assert_eq!(body["videos"][0]["size"], 1024);
    assert_eq!(body["videos"][0]["content_type"], "video/webm");
}

#[tokio::test]
async fn test_long_and_dotfile_names_keep_their_extension() {
    let app = setup_test_app();
    let long_name = format!("{}.mp4", "a".repeat(300));

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[(long_name.as_str(), 64), (".mp4", 64)]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["total"], 2);

    for file in body["files"].as_array().unwrap() {
        assert!(file["blob_name"].as_str().unwrap().ends_with(".mp4"));
        assert_eq!(file["content_type"], "video/mp4");
        assert!(file["filename"].as_str().unwrap().ends_with(".mp4"));
    }
    assert_eq!(body["files"][0]["filename"].as_str().unwrap().len(), 255);
    assert_eq!(body["files"][1]["filename"], "file.mp4");

    let listed: Value = app.client().get("/api/videos").await.json();
    for video in listed["videos"].as_array().unwrap() {
        assert_eq!(video["content_type"], "video/mp4");
    }
}

#[tokio::test]
async fn test_container_create_failure_is_reported_per_file() {
    let app = setup_test_app();
    app.memory().set_fail_creates(true);

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("a.mp4", 10), ("b.txt", 10), ("c.mov", 10)]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error_count"], 3);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors[0]["filename"], "a.mp4");
    assert_eq!(errors[0]["error"], "Upload failed");
    assert!(errors[0]["message"]
        .as_str()
        .unwrap()
        .contains("simulated create failure"));
    assert_eq!(errors[1]["error"], "Invalid file type");
    assert_eq!(errors[2]["filename"], "c.mov");
    assert_eq!(errors[2]["error"], "Upload failed");

    app.memory().set_fail_creates(false);
    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("a.mp4", 10)]))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_storage_failure_message_is_generic_in_production() {
    let app = setup_production_app();
    app.memory().set_fail_writes(true);

    let response = app
        .client()
        .post("/api/upload")
        .multipart(upload_form(&[("a.mp4", 10)]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["error"], "Upload failed");
    assert_eq!(body["errors"][0]["message"], "Failed to store file");
}
