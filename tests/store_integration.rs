//! SQLite location store integration tests.

use city_search::{Location, LocationFilter, LocationStore};
use whereismycity::SqliteLocationStore;

fn location(id: i64, city: &str, country: &str) -> Location {
    Location {
        id,
        city: city.into(),
        state: "State".into(),
        country: country.into(),
        code: "XX".into(),
        lat: 10.0,
        lng: 20.0,
    }
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("locations.db");

    {
        let store = SqliteLocationStore::open(&path).expect("open");
        store
            .insert(&[location(1, "Bukhara", "Uzbekistan"), location(2, "Khiva", "Uzbekistan")])
            .expect("insert");
    }

    let store = SqliteLocationStore::open(&path).expect("reopen");
    assert_eq!(store.count().expect("count"), 2);

    let found = store
        .find_by_ids(&[2], &LocationFilter::default(), 5)
        .await
        .expect("find");
    assert_eq!(found, vec![location(2, "Khiva", "Uzbekistan")]);
}

#[tokio::test]
async fn concurrent_lookups_share_one_connection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteLocationStore::open(&dir.path().join("locations.db")).expect("open");
    let seed: Vec<Location> = (1..=50)
        .map(|id| location(id, &format!("City {id}"), if id % 2 == 0 { "Even" } else { "Odd" }))
        .collect();
    store.insert(&seed).expect("insert");

    let ids: Vec<i64> = (1..=50).collect();
    let lookups = (0..8).map(|_| {
        let store = store.clone();
        let ids = ids.clone();
        tokio::spawn(async move {
            store
                .find_by_ids(&ids, &LocationFilter::country("Even"), 100)
                .await
        })
    });

    for handle in futures_util::future::join_all(lookups).await {
        let found = handle.expect("join").expect("find");
        assert_eq!(found.len(), 25);
        assert!(found.iter().all(|l| l.id % 2 == 0));
    }
}
