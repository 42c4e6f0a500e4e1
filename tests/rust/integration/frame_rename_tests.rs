use frameserver::frame_catalog::CsvFile;

use super::common::{classification_schema, connect, CLASSIFICATION_CSV};

fn classification_source() -> CsvFile {
    CsvFile::new(CLASSIFICATION_CSV, classification_schema())
        .with_delimiter(',')
        .with_skip_header_lines(1)
}

#[tokio::test]
async fn test_frame_rename() {
    let session = connect().await;

    let mut frame = session
        .create_frame(classification_source(), Some("test_frame_rename"))
        .await
        .unwrap();

    let new_name = "test_frame_new_name";
    assert!(
        !session
            .get_frame_names()
            .await
            .unwrap()
            .contains(&new_name.to_string()),
        "test_frame_new_name should not exist in list of frames"
    );

    frame.set_name(new_name).await.unwrap();
    assert!(
        session
            .get_frame_names()
            .await
            .unwrap()
            .contains(&new_name.to_string()),
        "test_frame_new_name should exist in list of frames"
    );
    assert_eq!(frame.name(), Some(new_name));
}

#[tokio::test]
async fn test_created_name_listed_exactly_once() {
    let session = connect().await;
    session
        .create_frame(classification_source(), Some("rename_listed_once"))
        .await
        .unwrap();

    let names = session.get_frame_names().await.unwrap();
    assert_eq!(
        names.iter().filter(|n| *n == "rename_listed_once").count(),
        1
    );
}

#[tokio::test]
async fn test_old_name_gone_after_rename() {
    let session = connect().await;
    let mut frame = session
        .create_frame(classification_source(), Some("rename_old_gone_before"))
        .await
        .unwrap();

    frame.set_name("rename_old_gone_after").await.unwrap();

    // Every listing after the rename shows only the new name
    for _ in 0..3 {
        let names = session.get_frame_names().await.unwrap();
        assert!(names.contains(&"rename_old_gone_after".to_string()));
        assert!(!names.contains(&"rename_old_gone_before".to_string()));
    }
    assert!(session
        .get_frame("rename_old_gone_before")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_rename_to_existing_name_is_rejected() {
    let session = connect().await;
    let mut first = session
        .create_frame(classification_source(), Some("rename_conflict_a"))
        .await
        .unwrap();
    session
        .create_frame(classification_source(), Some("rename_conflict_b"))
        .await
        .unwrap();

    let err = first.set_name("rename_conflict_b").await.unwrap_err();
    assert!(err.is_duplicate_name(), "unexpected error: {}", err);
    assert_eq!(first.name(), Some("rename_conflict_a"));

    let names = session.get_frame_names().await.unwrap();
    assert!(names.contains(&"rename_conflict_a".to_string()));
    assert_eq!(
        names.iter().filter(|n| *n == "rename_conflict_b").count(),
        1
    );
}

#[tokio::test]
async fn test_rename_seen_by_other_handles() {
    let session = connect().await;
    let mut frame = session
        .create_frame(classification_source(), Some("rename_other_handle"))
        .await
        .unwrap();
    let mut other = session.get_frame("rename_other_handle").await.unwrap();

    frame.set_name("rename_other_handle_new").await.unwrap();
    assert_eq!(other.name(), Some("rename_other_handle"));

    other.refresh().await.unwrap();
    assert_eq!(other.name(), Some("rename_other_handle_new"));
    assert_eq!(other.id(), frame.id());
}

#[tokio::test]
async fn test_unnamed_frame_gets_listed_once_named() {
    let session = connect().await;
    let mut frame = session
        .create_frame(classification_source(), None)
        .await
        .unwrap();
    assert_eq!(frame.name(), None);

    frame.set_name("rename_from_unnamed").await.unwrap();
    assert!(session
        .get_frame_names()
        .await
        .unwrap()
        .contains(&"rename_from_unnamed".to_string()));
}

#[tokio::test]
async fn test_concurrent_renames_to_one_name() {
    let session = connect().await;
    let mut frames = Vec::new();
    for i in 0..4 {
        let name = format!("rename_race_source_{}", i);
        frames.push(
            session
                .create_frame(classification_source(), Some(name.as_str()))
                .await
                .unwrap(),
        );
    }

    let handles: Vec<_> = frames
        .into_iter()
        .map(|mut frame| {
            tokio::spawn(async move { frame.set_name("rename_race_target").await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => winners += 1,
            Err(e) => assert!(e.is_duplicate_name(), "unexpected error: {}", e),
        }
    }
    assert_eq!(winners, 1);

    let names = session.get_frame_names().await.unwrap();
    assert_eq!(
        names.iter().filter(|n| *n == "rename_race_target").count(),
        1
    );
    assert_eq!(
        names
            .iter()
            .filter(|n| n.starts_with("rename_race_source_"))
            .count(),
        3
    );
}
