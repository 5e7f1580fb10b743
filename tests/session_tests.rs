mod common;

use common::*;
use fhir_capability_viewer::{LoadSession, SessionUpdate};
use std::sync::Arc;
use std::time::Duration;

const SLOW: &str = "https://slow.test/metadata";
const FAST: &str = "https://fast.test/metadata";

fn racing_session(discard_stale: bool) -> LoadSession {
    let client = Arc::new(
        MockClient::new()
            .route(
                "https://slow.test/",
                Reply::ok(&capability_statement("slow")).after(Duration::from_millis(100)),
            )
            .route(
                "https://fast.test/",
                Reply::ok(&capability_statement("fast")).after(Duration::from_millis(10)),
            ),
    );
    LoadSession::new(Arc::new(loader_with(&client)), discard_stale)
}

fn loaded_name(update: &SessionUpdate) -> Option<String> {
    update.result().document()?.model().name.clone()
}

#[tokio::test(start_paused = true)]
async fn test_newer_load_wins_over_slower_older_one() {
    let session = racing_session(true);

    let (first, second) = tokio::join!(session.load(SLOW), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        session.load(FAST).await
    });

    assert!(matches!(first, SessionUpdate::Stale(_)));
    assert_eq!(loaded_name(&first).as_deref(), Some("slow"));
    assert!(second.is_applied());

    let current = session.current().await.unwrap();
    assert_eq!(
        current.document().unwrap().model().name.as_deref(),
        Some("fast")
    );
    assert_eq!(session.generation(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_completion_order_when_not_discarding() {
    let session = racing_session(false);

    let (first, second) = tokio::join!(session.load(SLOW), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        session.load(FAST).await
    });

    assert!(first.is_applied());
    assert!(second.is_applied());

    let current = session.current().await.unwrap();
    assert_eq!(
        current.document().unwrap().model().name.as_deref(),
        Some("slow")
    );
}

#[tokio::test]
async fn test_sequential_loads_replace_slot() {
    let session = racing_session(true);
    assert!(session.current().await.is_none());

    let update = session.load("not-a-url").await;
    assert!(update.is_applied());
    assert!(!session.current().await.unwrap().is_success());

    tokio::time::pause();
    let update = session.load(FAST).await;
    assert!(update.is_applied());
    assert!(session.current().await.unwrap().is_success());

    session.clear().await;
    assert!(session.current().await.is_none());
}
