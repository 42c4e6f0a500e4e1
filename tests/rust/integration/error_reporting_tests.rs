use frameserver::client::{ClientError, Session};
use frameserver::frame_catalog::{CsvFile, FrameCatalogError};
use frameserver::server::models::ErrorBody;
use serde_json::json;

use super::common::{classification_schema, client_config, connect, CLASSIFICATION_CSV};

/// Send a raw request and parse its response as an error body
async fn raw_error(request: reqwest::RequestBuilder) -> (u16, ErrorBody) {
    let response = request.send().await.unwrap();
    let status = response.status().as_u16();
    let text = response.text().await.unwrap();
    let body = serde_json::from_str::<ErrorBody>(&text)
        .unwrap_or_else(|e| panic!("response is not an error body ({}): {}", e, text));
    (status, body)
}

#[tokio::test]
async fn test_missing_source_file() {
    let session = connect().await;
    let source = CsvFile::new("errors_no_such_file.csv", classification_schema());

    let err = session
        .create_frame(source, Some("errors_missing_source"))
        .await
        .unwrap_err();
    match err {
        ClientError::Server {
            status, error_type, ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(error_type, "SourceNotFound");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!session
        .get_frame_names()
        .await
        .unwrap()
        .contains(&"errors_missing_source".to_string()));
}

#[tokio::test]
async fn test_invalid_name_is_rejected_before_sending() {
    let session = connect().await;
    let source = CsvFile::new("any.csv", classification_schema());

    let err = session
        .create_frame(source, Some("not a valid name"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::InvalidInput(FrameCatalogError::InvalidName { .. })
    ));
}

#[tokio::test]
async fn test_details_follow_session_config() {
    let terse = Session::connect(client_config().with_show_details(false))
        .await
        .unwrap();
    let detailed = Session::connect(client_config().with_show_details(true))
        .await
        .unwrap();

    let terse_err = terse
        .create_frame(
            CsvFile::new("errors_terse.csv", classification_schema()),
            Some("errors_terse"),
        )
        .await
        .unwrap_err();
    let detailed_err = detailed
        .create_frame(
            CsvFile::new("errors_detailed.csv", classification_schema()),
            Some("errors_detailed"),
        )
        .await
        .unwrap_err();

    assert!(!terse_err.to_string().contains("Details:"));
    assert!(detailed_err.to_string().contains("Details: create frame"));
}

#[tokio::test]
async fn test_unknown_frame_lookup() {
    let session = connect().await;
    let err = session.get_frame("errors_never_created").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_malformed_requests_get_error_body() {
    let base_url = client_config().base_url();
    let http = reqwest::Client::new();

    let (status, body) = raw_error(http.post(format!("{}/frames", base_url)).json(&json!({
        "name": "errors_bad_column_type",
        "source": {
            "path": CLASSIFICATION_CSV,
            "schema": [{"name": "a", "type": "decimal"}]
        }
    })))
    .await;
    assert_eq!(status, 422);
    assert_eq!(body.error_type, "InvalidSchema");
    assert!(body.error.contains("decimal"));
    assert!(body.details.unwrap().starts_with("create frame:"));

    let (status, body) = raw_error(
        http.post(format!("{}/frames", base_url))
            .header("content-type", "application/json")
            .body("{not json"),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body.error_type, "InvalidRequest");

    let (status, body) =
        raw_error(http.put(format!("{}/frames/1/name", base_url)).json(&json!({}))).await;
    assert_eq!(status, 422);
    assert_eq!(body.error_type, "InvalidRequest");
    assert!(body.error.contains("name"));

    let (status, body) = raw_error(http.get(format!("{}/frames/abc", base_url))).await;
    assert_eq!(status, 400);
    assert_eq!(body.error_type, "InvalidRequest");

    let (status, body) =
        raw_error(http.get(format!("{}/frames/1/rows?count=-1", base_url))).await;
    assert_eq!(status, 400);
    assert_eq!(body.error_type, "InvalidRequest");

    let (status, body) = raw_error(http.get(format!("{}/no/such/route", base_url))).await;
    assert_eq!(status, 404);
    assert_eq!(body.error_type, "NotFound");
}

#[tokio::test]
async fn test_column_types_are_case_insensitive_on_the_wire() {
    let base_url = client_config().base_url();
    let response = reqwest::Client::new()
        .post(format!("{}/frames", base_url))
        .json(&json!({
            "name": "errors_upper_case_types",
            "source": {
                "path": CLASSIFICATION_CSV,
                "schema": [
                    {"name": "a", "type": "String"},
                    {"name": "b", "type": "INT32"},
                    {"name": "labels", "type": "Int32"},
                    {"name": "predictions", "type": "i32"}
                ],
                "skip_header_lines": 1
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let frame = connect().await.get_frame("errors_upper_case_types").await.unwrap();
    assert_eq!(frame.schema(), &classification_schema());
    assert_eq!(frame.rejected_rows(), 0);
}
