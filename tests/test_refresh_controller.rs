use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dessert_browser::{
    LoadError, PullGesture, Recipe, RecipeCollection, RecipeSource, RefreshController,
    RefreshOutcome, RefreshState,
};
use tokio::sync::Notify;

fn recipe(id: &str, name: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        cuisine: "British".to_string(),
        photo_large: "https://example.com/large.jpg".to_string(),
        photo_small: "https://example.com/small.jpg".to_string(),
        video_url: None,
        source_url: None,
    }
}

fn collection(names: &[&str]) -> RecipeCollection {
    RecipeCollection::new(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| recipe(&i.to_string(), name))
            .collect(),
    )
    .unwrap()
}

/// Source whose loads block until the test opens the gate
struct GatedSource {
    gate: Notify,
    results: Mutex<VecDeque<Result<RecipeCollection, String>>>,
    calls: AtomicUsize,
}

impl GatedSource {
    fn new(results: Vec<Result<RecipeCollection, String>>) -> Arc<Self> {
        Arc::new(Self {
            gate: Notify::new(),
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn open(&self) {
        self.gate.notify_one();
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipeSource for GatedSource {
    fn source_name(&self) -> &str {
        "gated"
    }

    async fn load(&self) -> Result<RecipeCollection, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        let next = self.results.lock().unwrap().pop_front();
        match next {
            Some(Ok(collection)) => Ok(collection),
            Some(Err(message)) => Err(LoadError::NotFound(message)),
            None => Err(LoadError::NotFound("no more results".to_string())),
        }
    }
}

async fn wait_for_idle(controller: &RefreshController) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.state() != RefreshState::Idle {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("controller never returned to idle");
}

#[tokio::test]
async fn test_initial_state_is_idle_and_empty() {
    let source = GatedSource::new(vec![]);
    let controller = RefreshController::new(source);

    assert_eq!(controller.state(), RefreshState::Idle);
    assert!(controller.current().is_empty());
}

#[tokio::test]
async fn test_successful_refresh_replaces_store() {
    let source = GatedSource::new(vec![
        Ok(collection(&["Eton Mess"])),
        Ok(collection(&["Treacle Tart", "Jam Roly-Poly"])),
    ]);
    let controller = RefreshController::new(source.clone());

    source.open();
    assert_eq!(controller.load_initial().await.unwrap(), 1);

    let handle = controller.request_refresh().expect("refresh should start");
    let (during, state) = controller.snapshot();
    assert_eq!(state, RefreshState::Refreshing);
    assert_eq!(during[0].name, "Eton Mess");

    source.open();
    assert_eq!(handle.outcome().await, RefreshOutcome::Replaced { count: 2 });

    let (after, state) = controller.snapshot();
    assert_eq!(state, RefreshState::Idle);
    assert_eq!(after, collection(&["Treacle Tart", "Jam Roly-Poly"]));
}

#[tokio::test]
async fn test_failed_refresh_keeps_store() {
    let source = GatedSource::new(vec![
        Ok(collection(&["Eton Mess"])),
        Err("recipes.json".to_string()),
    ]);
    let controller = RefreshController::new(source.clone());

    source.open();
    controller.load_initial().await.unwrap();

    let handle = controller.request_refresh().unwrap();
    source.open();
    assert!(matches!(handle.outcome().await, RefreshOutcome::Failed(_)));

    assert_eq!(controller.state(), RefreshState::Idle);
    assert_eq!(controller.current(), collection(&["Eton Mess"]));
}

#[tokio::test]
async fn test_request_while_refreshing_is_ignored() {
    let source = GatedSource::new(vec![Ok(collection(&["Eton Mess"]))]);
    let controller = RefreshController::new(source.clone());

    let handle = controller.request_refresh().unwrap();
    for _ in 0..5 {
        assert!(controller.request_refresh().is_none());
    }
    assert_eq!(controller.state(), RefreshState::Refreshing);

    source.open();
    handle.outcome().await;
    assert_eq!(source.calls(), 1);

    // Idle again, so the next request goes through
    let second = controller.request_refresh().unwrap();
    source.open();
    second.outcome().await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_cancelled_refresh_returns_to_idle() {
    let source = GatedSource::new(vec![
        Ok(collection(&["Eton Mess"])),
        Ok(collection(&["Never Shown"])),
    ]);
    let controller = RefreshController::new(source.clone());

    source.open();
    controller.load_initial().await.unwrap();

    let mut handle = controller.request_refresh().unwrap();
    handle.cancel();
    assert_eq!(handle.outcome().await, RefreshOutcome::Cancelled);

    assert_eq!(controller.state(), RefreshState::Idle);
    assert_eq!(controller.current(), collection(&["Eton Mess"]));
}

#[tokio::test]
async fn test_dropped_handle_still_completes() {
    let source = GatedSource::new(vec![Ok(collection(&["Eton Mess", "Trifle"]))]);
    let controller = RefreshController::new(source.clone());

    drop(controller.request_refresh().unwrap());
    source.open();
    wait_for_idle(&controller).await;

    assert_eq!(controller.current().len(), 2);
}

async fn wait_for_calls(source: &GatedSource, calls: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while source.calls() < calls {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("source was never called");
}

#[tokio::test]
async fn test_refresh_during_startup_load_is_ignored() {
    let source = GatedSource::new(vec![
        Ok(collection(&["Eton Mess"])),
        Ok(collection(&["Never Shown"])),
    ]);
    let controller = Arc::new(RefreshController::new(source.clone()));

    let startup = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.load_initial().await }
    });
    wait_for_calls(&source, 1).await;

    assert_eq!(controller.state(), RefreshState::Refreshing);
    assert!(controller.request_refresh().is_none());
    let mut gesture = PullGesture::default();
    assert!(gesture.drive(80.0, &controller).is_none());

    source.open();
    assert_eq!(startup.await.unwrap().unwrap(), 1);

    let (after, state) = controller.snapshot();
    assert_eq!(state, RefreshState::Idle);
    assert_eq!(after, collection(&["Eton Mess"]));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_startup_load_during_refresh_does_not_overwrite() {
    let source = GatedSource::new(vec![
        Ok(collection(&["Treacle Tart", "Jam Roly-Poly"])),
        Ok(collection(&["Stale"])),
    ]);
    let controller = RefreshController::new(source.clone());

    let handle = controller.request_refresh().unwrap();
    // Returns at once without touching the source
    assert_eq!(controller.load_initial().await.unwrap(), 0);
    assert_eq!(controller.state(), RefreshState::Refreshing);

    source.open();
    assert_eq!(handle.outcome().await, RefreshOutcome::Replaced { count: 2 });

    let (after, state) = controller.snapshot();
    assert_eq!(state, RefreshState::Idle);
    assert_eq!(after, collection(&["Treacle Tart", "Jam Roly-Poly"]));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_failed_startup_load_returns_to_idle() {
    let source = GatedSource::new(vec![
        Err("recipes.json".to_string()),
        Ok(collection(&["Eton Mess"])),
    ]);
    let controller = RefreshController::new(source.clone());

    source.open();
    assert!(matches!(
        controller.load_initial().await,
        Err(LoadError::NotFound(_))
    ));
    assert_eq!(controller.state(), RefreshState::Idle);
    assert!(controller.current().is_empty());

    // The gate was released, so a pull can retry
    let handle = controller.request_refresh().unwrap();
    source.open();
    assert_eq!(handle.outcome().await, RefreshOutcome::Replaced { count: 1 });
}

#[tokio::test]
async fn test_pull_gesture_drives_refresh() {
    let source = GatedSource::new(vec![Ok(collection(&["Eton Mess"]))]);
    let controller = RefreshController::new(source.clone());
    let mut gesture = PullGesture::default();

    assert!(gesture.drive(30.0, &controller).is_none());
    let handle = gesture.drive(60.0, &controller).expect("pull past threshold");
    assert!(gesture.drive(90.0, &controller).is_none());
    assert!(gesture.indicator(controller.state()).spinner);

    source.open();
    handle.outcome().await;
    gesture.reset();

    let indicator = gesture.indicator(controller.state());
    assert!(!indicator.spinner);
    assert_eq!(indicator.rotation, 0.0);
    assert_eq!(source.calls(), 1);
}
