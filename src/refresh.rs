//! Pull-to-refresh coordination.
//!
//! [`RefreshController`] owns the recipe store and the refresh state behind a
//! single lock. Background reloads only compute a collection; the swap into
//! the store and the return to [`RefreshState::Idle`] happen together in one
//! critical section, so no reader sees `Idle` with stale data or
//! `Refreshing` with new data.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::LoadError;
use crate::loader::RecipeSource;
use crate::model::RecipeCollection;
use crate::store::RecipeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

/// How a reload ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The store now holds `count` freshly loaded recipes
    Replaced { count: usize },
    /// The reload failed; the store is unchanged
    Failed(String),
    /// The reload was cancelled; the store is unchanged
    Cancelled,
}

#[derive(Debug, Default)]
struct Shared {
    store: RecipeStore,
    state: RefreshState,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RefreshController {
    shared: Arc<Mutex<Shared>>,
    source: Arc<dyn RecipeSource>,
}

impl RefreshController {
    pub fn new(source: Arc<dyn RecipeSource>) -> Self {
        Self::with_store(RecipeStore::new(), source)
    }

    pub fn with_store(store: RecipeStore, source: Arc<dyn RecipeSource>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                store,
                state: RefreshState::Idle,
            })),
            source,
        }
    }

    pub fn state(&self) -> RefreshState {
        lock(&self.shared).state
    }

    pub fn current(&self) -> RecipeCollection {
        lock(&self.shared).store.current()
    }

    /// Collection and refresh state read under one lock
    pub fn snapshot(&self) -> (RecipeCollection, RefreshState) {
        let shared = lock(&self.shared);
        (shared.store.current(), shared.state)
    }

    /// Populate the store at startup.
    ///
    /// Holds the same `Refreshing` gate as [`request_refresh`], so a pull
    /// during startup is ignored. If a reload is already running nothing is
    /// loaded and the current count is returned. A failure leaves the store
    /// as it was (empty on first launch).
    ///
    /// [`request_refresh`]: RefreshController::request_refresh
    pub async fn load_initial(&self) -> Result<usize, LoadError> {
        let Some(guard) = self.begin() else {
            debug!("Refresh already in progress, skipping startup load");
            return Ok(self.current().len());
        };
        info!("Loading recipes from {}", self.source.source_name());

        guard.complete(self.source.load().await)
    }

    /// Start a reload unless one is already running.
    ///
    /// Returns `None` when a reload is in flight. Must be called from within
    /// a tokio runtime.
    pub fn request_refresh(&self) -> Option<RefreshHandle> {
        let guard = self.begin()?;
        info!("Refreshing recipes from {}", self.source.source_name());

        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let source = Arc::clone(&self.source);

        let handle = tokio::spawn(async move {
            // A dropped sender disables the cancel branch instead of firing it
            let result = tokio::select! {
                result = source.load() => Some(result),
                Ok(()) = &mut cancel_rx => None,
            };
            guard.finish(result)
        });

        Some(RefreshHandle {
            cancel: Some(cancel_tx),
            handle,
        })
    }

    /// Move to `Refreshing`, or `None` if a load already holds the gate
    fn begin(&self) -> Option<RefreshGuard> {
        let mut shared = lock(&self.shared);
        if shared.state == RefreshState::Refreshing {
            debug!("Refresh already in progress, ignoring request");
            return None;
        }
        shared.state = RefreshState::Refreshing;
        Some(RefreshGuard {
            shared: Arc::clone(&self.shared),
            armed: true,
        })
    }
}

/// Returns the controller to `Idle` even if the reload task is dropped or
/// panics before completing.
struct RefreshGuard {
    shared: Arc<Mutex<Shared>>,
    armed: bool,
}

impl RefreshGuard {
    /// Swap in a loaded collection and return to `Idle` under one lock.
    /// On error the store is left untouched.
    fn complete(
        mut self,
        result: Result<RecipeCollection, LoadError>,
    ) -> Result<usize, LoadError> {
        let mut shared = lock(&self.shared);
        let result = match result {
            Ok(collection) => {
                let count = collection.len();
                shared.store.replace(collection);
                info!("Loaded {} recipes", count);
                Ok(count)
            }
            Err(e) => {
                warn!("Error loading recipes, keeping current ones: {}", e);
                Err(e)
            }
        };
        shared.state = RefreshState::Idle;
        drop(shared);
        self.armed = false;
        result
    }

    fn finish(self, result: Option<Result<RecipeCollection, LoadError>>) -> RefreshOutcome {
        match result {
            Some(result) => match self.complete(result) {
                Ok(count) => RefreshOutcome::Replaced { count },
                Err(e) => RefreshOutcome::Failed(e.to_string()),
            },
            None => {
                // Dropping the guard returns to Idle
                debug!("Refresh cancelled");
                RefreshOutcome::Cancelled
            }
        }
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if self.armed {
            lock(&self.shared).state = RefreshState::Idle;
        }
    }
}

/// Handle to a running reload.
///
/// Dropping it lets the reload finish in the background.
pub struct RefreshHandle {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<RefreshOutcome>,
}

impl RefreshHandle {
    /// Stop the reload; the store keeps its current collection
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the reload to end
    pub async fn outcome(self) -> RefreshOutcome {
        self.handle
            .await
            .unwrap_or_else(|e| RefreshOutcome::Failed(e.to_string()))
    }
}

/// Default pull distance, in points, past which a refresh fires
pub const DEFAULT_PULL_THRESHOLD: f64 = 50.0;

/// What the refresh header above the grid shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullIndicator {
    /// Arrow rotation in degrees, 0 to 180
    pub rotation: f64,
    pub spinner: bool,
    pub label: &'static str,
}

impl PullIndicator {
    pub fn idle(rotation: f64) -> Self {
        Self {
            rotation,
            spinner: false,
            label: "Pull to refresh",
        }
    }

    pub fn refreshing() -> Self {
        Self {
            rotation: 180.0,
            spinner: true,
            label: "Refreshing...",
        }
    }
}

impl Default for PullIndicator {
    fn default() -> Self {
        Self::idle(0.0)
    }
}

/// Turns scroll offsets into refresh triggers
#[derive(Debug, Clone, PartialEq)]
pub struct PullGesture {
    threshold: f64,
    offset: f64,
    rotation: f64,
}

impl Default for PullGesture {
    fn default() -> Self {
        Self::new(DEFAULT_PULL_THRESHOLD)
    }
}

impl PullGesture {
    /// A non-positive or NaN `threshold` falls back to
    /// [`DEFAULT_PULL_THRESHOLD`].
    pub fn new(threshold: f64) -> Self {
        let threshold = if threshold.is_nan() || threshold <= 0.0 {
            warn!(
                "Pull threshold {} is not positive, using {}",
                threshold, DEFAULT_PULL_THRESHOLD
            );
            DEFAULT_PULL_THRESHOLD
        } else {
            threshold
        };
        Self {
            threshold,
            offset: 0.0,
            rotation: 0.0,
        }
    }

    /// Content pulled below its resting position
    pub fn is_eligible(&self) -> bool {
        self.offset > 0.0
    }

    /// Record a new scroll offset. Returns `true` when the pull crossed the
    /// threshold while idle and a refresh should be requested.
    pub fn update(&mut self, offset: f64, state: RefreshState) -> bool {
        self.offset = offset;
        if !self.is_eligible() || state == RefreshState::Refreshing {
            return false;
        }
        self.rotation = (offset / self.threshold * 180.0).clamp(0.0, 180.0);
        if offset > self.threshold {
            self.rotation = 180.0;
            return true;
        }
        false
    }

    /// Reset the arrow once a refresh has finished
    pub fn reset(&mut self) {
        self.rotation = 0.0;
    }

    pub fn indicator(&self, state: RefreshState) -> PullIndicator {
        match state {
            RefreshState::Refreshing => PullIndicator::refreshing(),
            RefreshState::Idle => PullIndicator::idle(self.rotation),
        }
    }

    /// Feed `offset` to the gesture and start a reload on `controller` if the
    /// pull crossed the threshold.
    pub fn drive(&mut self, offset: f64, controller: &RefreshController) -> Option<RefreshHandle> {
        if self.update(offset, controller.state()) {
            controller.request_refresh()
        } else {
            None
        }
    }
}
