//! Navigation through the hosting router
//!
//! [`Router`] abstracts whatever performs the actual transition (browser
//! history, an in-memory stack for native hosts and tests). [`Navigator`]
//! wraps it with an advisory "navigating" flag that UI code uses to suppress
//! duplicate triggers.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::observable::Observable;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Navigation to {path} failed: {reason}")]
pub struct NavigationError {
    pub path: String,
    pub reason: String,
}

impl NavigationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Performs route transitions for the host application
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Router: Send + Sync {
    async fn navigate(&self, path: &str) -> Result<(), NavigationError>;

    fn current_path(&self) -> String;
}

/// Router that keeps its history in memory
#[derive(Debug)]
pub struct MemoryRouter {
    history: Mutex<Vec<String>>,
}

impl MemoryRouter {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![initial_path.into()]),
        }
    }

    /// Every path visited, oldest first, including the initial one
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new("/")
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Router for MemoryRouter {
    async fn navigate(&self, path: &str) -> Result<(), NavigationError> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
        Ok(())
    }

    fn current_path(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserRouter;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{NavigationError, Router};
    use async_trait::async_trait;
    use wasm_bindgen::JsValue;

    /// Router over the browser History API
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BrowserRouter;

    #[async_trait(?Send)]
    impl Router for BrowserRouter {
        async fn navigate(&self, path: &str) -> Result<(), NavigationError> {
            let window =
                web_sys::window().ok_or_else(|| NavigationError::new(path, "no window"))?;
            let history = window
                .history()
                .map_err(|e| NavigationError::new(path, format!("{e:?}")))?;
            history
                .push_state_with_url(&JsValue::NULL, "", Some(path))
                .map_err(|e| NavigationError::new(path, format!("{e:?}")))
        }

        fn current_path(&self) -> String {
            web_sys::window()
                .and_then(|w| w.location().pathname().ok())
                .unwrap_or_else(|| "/".to_string())
        }
    }
}

/// Router wrapper that tracks whether a transition is under way
pub struct Navigator {
    router: Arc<dyn Router>,
    navigating: Arc<Observable<bool>>,
    settle_delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Navigator {
    pub fn new(router: Arc<dyn Router>, settle_delay: Duration) -> Self {
        Self {
            router,
            navigating: Arc::new(Observable::new(false)),
            settle_delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn current_path(&self) -> String {
        self.router.current_path()
    }

    pub fn is_navigating(&self) -> bool {
        self.navigating.get()
    }

    pub fn watch_navigating(&self) -> watch::Receiver<bool> {
        self.navigating.subscribe()
    }

    /// Navigate to `path`
    ///
    /// The navigating flag is raised for the transition and stays up for the
    /// settle delay after it finishes. Only the latest `goto` lowers it.
    pub async fn goto(&self, path: &str) -> Result<(), NavigationError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.navigating.set(true);
        debug!(path, "Navigating");

        let result = self.router.navigate(path).await;
        self.schedule_settle(generation);
        result
    }

    /// Lower the flag immediately and cancel pending settles
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.navigating.set(false);
    }

    fn schedule_settle(&self, generation: u64) {
        let navigating = Arc::clone(&self.navigating);
        let latest = Arc::clone(&self.generation);
        let settle = move || {
            if latest.load(Ordering::SeqCst) == generation {
                navigating.set(false);
            }
        };

        if self.settle_delay.is_zero() {
            settle();
            return;
        }

        let delay = self.settle_delay;

        #[cfg(not(target_arch = "wasm32"))]
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    settle();
                });
            }
            // no executor to wait on
            Err(_) => settle(),
        }

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::sleep(delay).await;
            settle();
        });
    }
}
