//! Identifier resolution integration tests.

use std::time::Duration;

use faretrack_core::{
    testing::{fixtures, MockDirectory, MockSearchClient},
    tracker::{resolve_identifiers, Resolution},
    DealRecord, SearchClient,
};

async fn records(directory: &MockDirectory) -> Vec<DealRecord> {
    directory
        .deals()
        .await
        .into_iter()
        .map(DealRecord::from)
        .collect()
}

#[tokio::test]
async fn test_each_deal_gets_a_resolution() {
    let directory = MockDirectory::new();
    directory
        .set_deals(vec![
            fixtures::deal_row(2, "Paris", "", 500.0),
            fixtures::deal_row(3, "Tokyo", "NRT", 300.0),
            fixtures::deal_row(4, "Atlantis", "", 100.0),
            fixtures::deal_row(5, "Lima", "", 900.0),
            fixtures::deal_row(6, "Quito", "", 900.0),
        ])
        .await;
    directory.set_persist_error(6, "HTTP 500").await;

    let search = MockSearchClient::new();
    search.set_identifier("Paris", "CDG").await;
    search.set_lookup_error("Lima", "connection refused").await;
    search.set_identifier("Quito", "UIO").await;

    let token = search.authenticate().await.unwrap();
    let mut deals = records(&directory).await;

    let resolutions = resolve_identifiers(&mut deals, &search, &directory, &token).await;

    assert_eq!(resolutions.len(), 5);
    assert!(matches!(&resolutions[0], Resolution::Resolved(code) if code == "CDG"));
    assert!(matches!(resolutions[1], Resolution::AlreadyResolved));
    assert!(matches!(resolutions[2], Resolution::NotFound));
    assert!(matches!(resolutions[3], Resolution::LookupFailed(_)));
    assert!(matches!(
        &resolutions[4],
        Resolution::PersistFailed { canonical_id, .. } if canonical_id == "UIO"
    ));

    assert_eq!(deals[0].canonical_id(), Some("CDG"));
    assert_eq!(deals[1].canonical_id(), Some("NRT"));
    assert_eq!(deals[2].canonical_id(), None);
    assert_eq!(deals[3].canonical_id(), None);
    assert_eq!(deals[4].canonical_id(), None);

    // Only deals missing a code were looked up
    let looked_up: Vec<String> = search
        .recorded_lookups()
        .await
        .into_iter()
        .map(|l| l.city_name)
        .collect();
    assert_eq!(looked_up.len(), 4);
    assert!(!looked_up.contains(&"Tokyo".to_string()));

    // Only the successful write reached the directory
    assert_eq!(directory.persisted().await, vec![(2, "CDG".to_string())]);
    assert_eq!(directory.deals().await[0].iata_code.as_deref(), Some("CDG"));
}

#[tokio::test]
async fn test_nothing_to_resolve() {
    let directory = MockDirectory::new();
    directory
        .set_deals(vec![fixtures::deal_row(3, "Tokyo", "NRT", 300.0)])
        .await;
    let search = MockSearchClient::new();
    let token = search.authenticate().await.unwrap();
    let mut deals = records(&directory).await;

    let resolutions = resolve_identifiers(&mut deals, &search, &directory, &token).await;

    assert!(matches!(resolutions[..], [Resolution::AlreadyResolved]));
    assert!(search.recorded_lookups().await.is_empty());
}

#[tokio::test]
async fn test_resolved_code_is_trimmed() {
    let directory = MockDirectory::new();
    directory
        .set_deals(vec![fixtures::deal_row(2, "Paris", "  ", 500.0)])
        .await;
    let search = MockSearchClient::new();
    search.set_identifier("Paris", "CDG").await;
    let token = search.authenticate().await.unwrap();
    let mut deals = records(&directory).await;

    // A whitespace-only code counts as missing
    assert!(deals[0].needs_resolution());

    resolve_identifiers(&mut deals, &search, &directory, &token).await;

    assert_eq!(deals[0].canonical_id(), Some("CDG"));
}

#[tokio::test]
async fn test_lookups_run_concurrently() {
    let directory = MockDirectory::new();
    let rows = (1..=8)
        .map(|i| fixtures::deal_row(i, &format!("City {}", i), "", 100.0))
        .collect();
    directory.set_deals(rows).await;

    let search = MockSearchClient::new();
    for i in 1..=8 {
        search
            .set_identifier(&format!("City {}", i), &format!("C{:02}", i))
            .await;
    }
    search.set_lookup_delay(Duration::from_millis(30)).await;

    let token = search.authenticate().await.unwrap();
    let mut deals = records(&directory).await;

    let resolutions = resolve_identifiers(&mut deals, &search, &directory, &token).await;

    // Every unresolved deal is looked up at the same time
    assert_eq!(search.max_concurrent_lookups(), 8);
    assert!(resolutions
        .iter()
        .all(|r| matches!(r, Resolution::Resolved(_))));
    assert_eq!(deals[7].canonical_id(), Some("C08"));
    assert_eq!(directory.persisted().await.len(), 8);
}
