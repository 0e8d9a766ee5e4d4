//! Add-recipe draft persistence.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::storage::{log_storage_error, LocalStore, DRAFT_KEY};

/// How often an open add-recipe form is saved.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Unsubmitted add-recipe form state, keyed by form input id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "cuisine-type")]
    pub cuisine_type: String,
    #[serde(rename = "dietary-preference")]
    pub dietary_preference: String,
    #[serde(rename = "difficulty-level")]
    pub difficulty_level: String,
    pub servings: String,
    #[serde(rename = "prep-time")]
    pub prep_time: String,
    #[serde(rename = "cook-time")]
    pub cook_time: String,
    #[serde(rename = "calories-per-serving")]
    pub calories_per_serving: String,
    #[serde(rename = "video-url")]
    pub video_url: String,
    pub tags: String,
    /// Non-blank entries only.
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// Reads and writes the single draft slot in local storage.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn LocalStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, draft: &RecipeDraft) {
        match serde_json::to_string(draft) {
            Ok(json) => {
                log_storage_error("set", DRAFT_KEY, self.store.set(DRAFT_KEY, &json));
                tracing::debug!(title = %draft.title, "draft saved");
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode draft"),
        }
    }

    /// The saved draft. An unreadable draft is ignored.
    pub fn load(&self) -> Option<RecipeDraft> {
        let raw = self.store.get(DRAFT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable draft");
                None
            }
        }
    }

    pub fn clear(&self) {
        log_storage_error("remove", DRAFT_KEY, self.store.remove(DRAFT_KEY));
    }
}

/// Periodic draft saver. Stops when dropped.
pub struct DraftAutosave {
    handle: JoinHandle<()>,
}

impl DraftAutosave {
    /// Save `snapshot()` every `interval`, starting one interval from now.
    /// Requires a tokio runtime.
    pub fn start<T, F>(
        drafts: DraftStore,
        source: Arc<Mutex<T>>,
        interval: Duration,
        snapshot: F,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(&T) -> RecipeDraft + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                let draft = {
                    let guard = source.lock().unwrap_or_else(|e| e.into_inner());
                    snapshot(&guard)
                };
                drafts.save(&draft);
            }
        });
        Self { handle }
    }

    /// Abort the saver task now instead of waiting for scope end.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for DraftAutosave {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let drafts = DraftStore::new(store.clone());
        let draft = RecipeDraft {
            title: "Lemon Tart".to_string(),
            description: "Sharp and sweet".to_string(),
            ingredients: vec!["3 lemons".to_string(), "butter".to_string()],
            instructions: vec!["Zest".to_string(), "Bake".to_string()],
            ..Default::default()
        };
        drafts.save(&draft);
        assert_eq!(drafts.load(), Some(draft));
        assert!(store.get(DRAFT_KEY).unwrap().contains("\"cuisine-type\""));
    }

    #[test]
    fn test_unreadable_draft_is_ignored() {
        let store = MemoryStore::with_entries(&[(DRAFT_KEY, "{oops")]);
        let drafts = DraftStore::new(Arc::new(store));
        assert_eq!(drafts.load(), None);
    }

    #[test]
    fn test_partial_draft_fills_defaults() {
        let drafts = DraftStore::new(Arc::new(MemoryStore::with_entries(&[(
            DRAFT_KEY,
            r#"{"title": "Soup", "prep-time": "10"}"#,
        )])));
        let draft = drafts.load().unwrap();
        assert_eq!(draft.prep_time, "10");
        assert!(draft.ingredients.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_ticks_and_stops() {
        let store = Arc::new(MemoryStore::new());
        let drafts = DraftStore::new(store.clone());
        let title = Arc::new(Mutex::new(String::from("first")));

        let autosave = DraftAutosave::start(
            drafts.clone(),
            title.clone(),
            AUTOSAVE_INTERVAL,
            |t: &String| RecipeDraft {
                title: t.clone(),
                ..Default::default()
            },
        );

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(drafts.load(), None);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(drafts.load().unwrap().title, "first");

        *title.lock().unwrap() = "second".to_string();
        autosave.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(drafts.load().unwrap().title, "first");
    }
}
