//! Behaviour of the save pipeline and greeting stream against in-memory fakes.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use futures::StreamExt;
use reservation_core::{
    Clock, GreetingRequest, GreetingService, Reservation, ReservationError,
    ReservationRepository, ReservationService, StorageError,
};
use reservation_testing::{InMemoryReservationRepository, SEED_NAMES, SteppingClock, test_clock};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_pending, assert_ready};

fn service() -> (
    Arc<InMemoryReservationRepository>,
    ReservationService<InMemoryReservationRepository>,
) {
    let repository = Arc::new(InMemoryReservationRepository::new());
    let service = ReservationService::new(repository.clone());
    (repository, service)
}

#[tokio::test]
async fn test_valid_batch_is_saved_in_order_with_ids() {
    let (repository, service) = service();

    let saved = service
        .save_all(["Josh", "Madhura", "Mark"])
        .await
        .expect("valid batch");

    let names: Vec<&str> = saved.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Josh", "Madhura", "Mark"]);
    assert!(saved.iter().all(Reservation::is_persisted));
    assert_eq!(repository.find_all().await.unwrap(), saved);
}

#[tokio::test]
async fn test_invalid_name_rolls_back_whole_batch() {
    let (repository, service) = service();

    let err = service
        .save_all(["Josh", "Madhura", "mark", "Olga"])
        .await
        .expect_err("lowercase name must be rejected");

    assert_eq!(
        err,
        ReservationError::Validation {
            name: "mark".to_string()
        }
    );
    assert!(repository.find_all().await.unwrap().is_empty());
    // Validation happens after the write, and the batch stops at the bad name.
    assert_eq!(repository.save_attempts(), 3);
}

#[tokio::test]
async fn test_invalid_first_name_rolls_back() {
    let (repository, service) = service();

    let err = service.save_all(["ria"]).await.unwrap_err();

    assert!(err.is_validation());
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_empty_name_is_rejected() {
    let (repository, service) = service();

    let err = service.save_all(["Josh", ""]).await.unwrap_err();

    assert_eq!(err, ReservationError::Validation { name: String::new() });
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_empty_batch_succeeds() {
    let (repository, service) = service();

    let saved = service.save_all(Vec::<String>::new()).await.unwrap();

    assert!(saved.is_empty());
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_rejected_batch_leaves_earlier_rows_alone() {
    let (repository, service) = service();
    service.save_all(["Spencer"]).await.unwrap();

    service.save_all(["Ria", "violetta"]).await.unwrap_err();

    let names: Vec<String> = repository
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["Spencer"]);
}

#[tokio::test]
async fn test_storage_failure_propagates_and_rolls_back() {
    let repository = Arc::new(InMemoryReservationRepository::failing_after(2));
    let service = ReservationService::new(repository.clone());

    let err = service
        .save_all(["Josh", "Madhura", "Mark"])
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::Storage(StorageError::Database(_))));
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_unicode_uppercase_is_accepted() {
    let (_repository, service) = service();

    let saved = service
        .save_all(["Stéphane", "Élodie", "Ødegaard", "Ωmega"])
        .await
        .expect("accented and non-latin capitals are uppercase");

    assert_eq!(saved.len(), 4);
}

#[tokio::test]
async fn test_unicode_lowercase_is_rejected() {
    let (_repository, service) = service();

    let err = service.save_all(["élodie"]).await.unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn test_names_round_trip_unchanged() {
    let (repository, service) = service();

    service.save_all(["Stéphane"]).await.unwrap();

    let all = repository.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Stéphane");
}

#[tokio::test]
async fn test_seed_scenario() {
    let (repository, service) = service();
    repository.delete_all().await.unwrap();

    service.save_all(SEED_NAMES).await.expect("seed list is valid");

    let all = repository.find_all().await.unwrap();
    let names: HashSet<&str> = all.iter().map(|r| r.name.as_str()).collect();
    let ids: HashSet<i64> = all.iter().filter_map(|r| r.id).collect();
    assert_eq!(names, SEED_NAMES.into_iter().collect());
    assert_eq!(ids.len(), SEED_NAMES.len());
}

#[tokio::test]
async fn test_concurrent_batches_are_independent() {
    let (repository, service) = service();

    let (good, bad) = tokio::join!(
        service.save_all(["Josh", "Mark"]),
        service.save_all(["Olga", "spencer"]),
    );

    assert_eq!(good.unwrap().len(), 2);
    assert!(bad.unwrap_err().is_validation());
    assert_eq!(repository.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_greetings_are_paced_and_distinct() {
    let clock = SteppingClock::new(test_clock().now(), chrono::Duration::seconds(1));
    let service = GreetingService::new(Arc::new(clock));
    let mut stream = tokio_test::task::spawn(service.greet(GreetingRequest::new("X")));

    assert_pending!(stream.poll_next());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let first = assert_ready!(stream.poll_next()).expect("stream never ends");
    assert_pending!(stream.poll_next());

    tokio::time::sleep(Duration::from_secs(1)).await;
    let second = assert_ready!(stream.poll_next()).expect("stream never ends");

    assert_eq!(first.message, "Hello X @ 2025-01-01T00:00:00.000000000Z");
    assert_eq!(second.message, "Hello X @ 2025-01-01T00:00:01.000000000Z");
}

#[tokio::test]
async fn test_greetings_with_system_clock() {
    let service = GreetingService::with_interval(
        Arc::new(reservation_core::SystemClock),
        Duration::from_millis(20),
    );

    let responses: Vec<_> = service
        .greet(GreetingRequest::new("Josh"))
        .take(3)
        .collect()
        .await;

    assert_eq!(responses.len(), 3);
    for pair in responses.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}
