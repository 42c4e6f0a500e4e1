use frameserver::frame_catalog::{CsvFile, DataType, FrameSchema};

use super::common::{
    classification_schema, connect, shared_server, CLASSIFICATION_CSV, CLASSIFICATION_ROWS,
};

#[tokio::test]
async fn test_create_reports_schema_and_rows() {
    let session = connect().await;
    let source = CsvFile::new(CLASSIFICATION_CSV, classification_schema()).with_skip_header_lines(1);
    let frame = session
        .create_frame(source, Some("lifecycle_schema_rows"))
        .await
        .unwrap();

    assert_eq!(frame.row_count(), CLASSIFICATION_ROWS);
    assert_eq!(frame.rejected_rows(), 0);
    assert_eq!(frame.schema(), &classification_schema());
}

#[tokio::test]
async fn test_header_is_rejected_when_not_skipped() {
    let session = connect().await;
    let source = CsvFile::new(CLASSIFICATION_CSV, classification_schema());
    let frame = session
        .create_frame(source, Some("lifecycle_header_not_skipped"))
        .await
        .unwrap();

    // "b" in the header line does not parse as int32
    assert_eq!(frame.row_count(), CLASSIFICATION_ROWS);
    assert_eq!(frame.rejected_rows(), 1);
}

#[tokio::test]
async fn test_absolute_path_and_custom_delimiter() {
    let server = shared_server();
    server.write_dataset("lifecycle_pipes.psv", "x|1.5|true\ny|2.5|false\n");
    let path = server.datasets_dir().join("lifecycle_pipes.psv");

    let schema = FrameSchema::from_pairs([
        ("name", DataType::Str),
        ("score", DataType::Float64),
        ("flag", DataType::Bool),
    ]);
    let source = CsvFile::new(path.to_str().unwrap(), schema).with_delimiter('|');

    let session = connect().await;
    let frame = session
        .create_frame(source, Some("lifecycle_pipes"))
        .await
        .unwrap();
    let rows = frame.take(10).await.unwrap();

    assert_eq!(rows.columns, vec!["name", "score", "flag"]);
    assert_eq!(rows.rows[1], vec![
        serde_json::json!("y"),
        serde_json::json!(2.5),
        serde_json::json!(false)
    ]);
}

#[tokio::test]
async fn test_take_is_capped_by_server() {
    let session = connect().await;
    let source = CsvFile::new(CLASSIFICATION_CSV, classification_schema()).with_skip_header_lines(1);
    let frame = session
        .create_frame(source, Some("lifecycle_take_cap"))
        .await
        .unwrap();

    // The shared server allows at most 5 rows per request
    let rows = frame.take(100).await.unwrap();
    assert_eq!(rows.rows.len(), 5);
    assert_eq!(rows.rows[0][1], serde_json::json!(0));

    let tail = frame.take_from(18, 5).await.unwrap();
    assert_eq!(tail.offset, 18);
    assert_eq!(tail.rows.len(), 2);
}

#[tokio::test]
async fn test_list_frames_includes_created() {
    let session = connect().await;
    let source = CsvFile::new(CLASSIFICATION_CSV, classification_schema()).with_skip_header_lines(1);
    let frame = session
        .create_frame(source, Some("lifecycle_listed"))
        .await
        .unwrap();

    let frames = session.list_frames().await.unwrap();
    let listed = frames
        .iter()
        .find(|f| f.id == frame.id())
        .expect("created frame should be listed");
    assert_eq!(listed.name.as_deref(), Some("lifecycle_listed"));
    assert_eq!(listed.row_count, CLASSIFICATION_ROWS);
}

#[tokio::test]
async fn test_drop_frames() {
    let session = connect().await;
    for name in ["lifecycle_drop_a", "lifecycle_drop_b"] {
        let source =
            CsvFile::new(CLASSIFICATION_CSV, classification_schema()).with_skip_header_lines(1);
        session.create_frame(source, Some(name)).await.unwrap();
    }

    let dropped = session
        .drop_frames(&["lifecycle_drop_a", "lifecycle_drop_b", "lifecycle_drop_missing"])
        .await
        .unwrap();
    assert_eq!(dropped, 2);

    let names = session.get_frame_names().await.unwrap();
    assert!(!names.contains(&"lifecycle_drop_a".to_string()));
    assert!(!names.contains(&"lifecycle_drop_b".to_string()));
}

#[tokio::test]
async fn test_dropped_name_can_be_reused() {
    let session = connect().await;
    let source = CsvFile::new(CLASSIFICATION_CSV, classification_schema()).with_skip_header_lines(1);
    let frame = session
        .create_frame(source.clone(), Some("lifecycle_reuse"))
        .await
        .unwrap();
    let old_id = frame.id();
    frame.drop_frame().await.unwrap();

    let again = session
        .create_frame(source, Some("lifecycle_reuse"))
        .await
        .unwrap();
    assert_ne!(again.id(), old_id);
}

#[tokio::test]
async fn test_concurrent_creates_with_one_name() {
    let session = connect().await;
    let handles: Vec<_> = (0..6)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move {
                let source = CsvFile::new(CLASSIFICATION_CSV, classification_schema())
                    .with_skip_header_lines(1);
                session
                    .create_frame(source, Some("lifecycle_create_race"))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(e.is_duplicate_name(), "unexpected error: {}", e),
        }
    }
    assert_eq!(created, 1);
}
