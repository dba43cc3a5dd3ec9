use std::time::{Duration, Instant};

use super::*;
use crate::scene::loader::{SyntheticLoader, ThreadedLoader};

fn registry(loader: impl DatasetLoader + 'static) -> DatasetRegistry {
    DatasetRegistry::new(Catalog::builtin(), loader)
}

#[test]
fn load_becomes_ready_on_poll() {
    let mut r = registry(SyntheticLoader::with_points(32));
    assert_eq!(r.state("room"), DatasetState::Unloaded);
    assert_eq!(r.request_load("room").unwrap(), DatasetState::Loading);
    assert_eq!(r.state("room"), DatasetState::Loading);
    assert!(r.cloud("room").is_err());

    let outcomes = r.poll();
    assert_eq!(
        outcomes,
        vec![LoadOutcome::Ready {
            id: DatasetId::from("room")
        }]
    );
    assert!(r.state("room").is_ready());
    assert_eq!(r.cloud("room").unwrap().len(), 32);
    assert_eq!(r.request_load("room").unwrap(), DatasetState::Ready);
    assert!(r.poll().is_empty());
}

#[test]
fn unknown_dataset_is_not_found() {
    let mut r = registry(SyntheticLoader::default());
    assert!(matches!(
        r.request_load("missing"),
        Err(RevealError::DatasetNotFound { .. })
    ));
    assert!(matches!(
        r.cloud("missing"),
        Err(RevealError::DatasetNotFound { .. })
    ));
}

#[test]
fn failure_is_reported_once_and_retryable() {
    let mut r = registry(SyntheticLoader::with_points(4).failing("skull"));
    r.request_load("skull").unwrap();
    let outcomes = r.poll();
    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        LoadOutcome::Failed { id, uri, cause } => {
            assert_eq!(id.as_str(), "skull");
            assert_eq!(uri, "assets/splats/skull.sog");
            assert!(!cause.is_empty());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(matches!(r.state("skull"), DatasetState::Failed { .. }));
    assert!(r.poll().is_empty());

    assert_eq!(r.request_load("skull").unwrap(), DatasetState::Loading);
    assert_eq!(r.poll().len(), 1);
}

#[test]
fn evicted_completion_is_stale() {
    let mut r = registry(SyntheticLoader::with_points(4));
    r.request_load("room").unwrap();
    r.evict("room");
    assert!(r.poll().is_empty());
    assert_eq!(r.state("room"), DatasetState::Unloaded);
}

#[test]
fn duplicate_request_loads_once() {
    let mut r = registry(SyntheticLoader::with_points(4));
    r.request_load("room").unwrap();
    r.request_load("room").unwrap();
    assert_eq!(r.poll().len(), 1);
}

#[test]
fn threaded_completions_arrive_through_poll() {
    let mut r = registry(ThreadedLoader::new(SyntheticLoader::with_points(8)));
    r.request_load("canyon").unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut outcomes = Vec::new();
    while outcomes.is_empty() && Instant::now() < deadline {
        outcomes = r.poll();
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(outcomes.len(), 1);
    assert!(r.state("canyon").is_ready());
}
