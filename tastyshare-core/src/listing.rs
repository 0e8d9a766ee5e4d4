//! Paginated, filterable recipe listing.
//!
//! At most one listing fetch is in flight. Triggers that arrive while one is
//! pending are dropped, not queued, and an in-flight request is never
//! cancelled.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::app::App;
use crate::types::{FilterKey, FilterSet, Pagination, Recipe, RecipePage};
use crate::view::{self, CardOptions, Node};

pub const PAGE_SIZE: u32 = 12;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const LOAD_FAILED: &str = "Failed to load recipes. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Empty,
    Failed,
    /// Another fetch was in flight; nothing was requested.
    Suppressed,
}

/// Holds the busy flag for the lifetime of one fetch.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct ListingState {
    filters: FilterSet,
    page: u32,
    view_mode: ViewMode,
    recipes: Vec<Recipe>,
    pagination: Option<Pagination>,
    summary: Option<String>,
    view: Option<Node>,
}

pub struct ListingController {
    app: App,
    state: Mutex<ListingState>,
    busy: AtomicBool,
    search_generation: AtomicU64,
}

impl ListingController {
    pub fn new(app: App) -> Self {
        Self::with_filters(app, FilterSet::new())
    }

    /// Start with `filters` already applied, without fetching.
    pub fn with_filters(app: App, filters: FilterSet) -> Self {
        Self {
            app,
            state: Mutex::new(ListingState {
                filters,
                page: 1,
                ..Default::default()
            }),
            busy: AtomicBool::new(false),
            search_generation: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, ListingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn filters(&self) -> FilterSet {
        self.state().filters.clone()
    }

    pub fn page(&self) -> u32 {
        self.state().page
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state().view_mode
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state().recipes.clone()
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.state().pagination
    }

    /// "Showing {start}-{end} of {total} recipes", absent for empty results.
    pub fn summary(&self) -> Option<String> {
        self.state().summary.clone()
    }

    pub fn view(&self) -> Option<Node> {
        self.state().view.clone()
    }

    pub fn pagination_view(&self) -> Option<Node> {
        self.state().pagination.as_ref().and_then(view::pagination)
    }

    /// Query pairs for a page: paging first, then the non-empty filters.
    pub fn query_for(filters: &FilterSet, page: u32) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), PAGE_SIZE.to_string()),
        ];
        query.extend(filters.query_pairs());
        query
    }

    pub async fn load_page(&self, page: u32) -> LoadOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            tracing::warn!(page, "listing fetch in flight, dropping trigger");
            return LoadOutcome::Suppressed;
        };

        let requested = page.max(1);
        let query = Self::query_for(&self.state().filters, requested);

        let result = self
            .app
            .client()
            .get_json::<RecipePage>("/api/recipes", query)
            .await;

        let signed_in = self.app.session().is_authenticated();
        let mut state = self.state();
        match result {
            Ok(page) if page.recipes.is_empty() => {
                tracing::debug!("listing returned no recipes");
                state.page = requested;
                state.recipes.clear();
                state.pagination = None;
                state.summary = None;
                state.view = Some(view::empty_state(
                    "No recipes found",
                    "Try adjusting your search criteria or browse all recipes.",
                ));
                LoadOutcome::Empty
            }
            Ok(page) => {
                tracing::debug!(
                    count = page.recipes.len(),
                    total = page.pagination.total,
                    "listing loaded"
                );
                let total = page.pagination.total;
                state.page = requested;
                state.summary = page
                    .pagination
                    .item_range()
                    .map(|(start, end)| format!("Showing {}-{} of {} recipes", start, end, total));
                state.recipes = page.recipes;
                state.pagination = Some(page.pagination);
                state.view = Some(render(&state.recipes, state.view_mode, signed_in));
                LoadOutcome::Loaded
            }
            Err(e) => {
                tracing::warn!(error = %e, page = requested, "failed to load recipes");
                state.recipes.clear();
                state.pagination = None;
                state.summary = None;
                state.view = Some(view::empty_state("Error loading recipes", LOAD_FAILED));
                drop(state);
                self.app.notifier().error(LOAD_FAILED);
                LoadOutcome::Failed
            }
        }
    }

    /// Replace the filters and reload from page 1.
    pub async fn set_filters(&self, filters: FilterSet) -> LoadOutcome {
        self.state().filters = filters;
        self.load_page(1).await
    }

    pub async fn set_filter(&self, key: FilterKey, value: &str) -> LoadOutcome {
        let filters = {
            let mut filters = self.state().filters.clone();
            filters.set(key, value);
            filters
        };
        self.set_filters(filters).await
    }

    /// Debounced search keystroke. Returns `None` when a later keystroke
    /// arrived inside the debounce window.
    pub async fn on_search_input(&self, text: &str) -> Option<LoadOutcome> {
        let generation = self.search_generation.fetch_add(1, Ordering::AcqRel) + 1;
        tokio::time::sleep(SEARCH_DEBOUNCE).await;
        if self.search_generation.load(Ordering::Acquire) != generation {
            return None;
        }
        Some(self.set_filter(FilterKey::Search, text).await)
    }

    pub async fn clear_filters(&self) -> LoadOutcome {
        self.set_filters(FilterSet::new()).await
    }

    /// Switch grid/list and re-render the cached page.
    pub fn set_view_mode(&self, mode: ViewMode) {
        let signed_in = self.app.session().is_authenticated();
        let mut state = self.state();
        state.view_mode = mode;
        if !state.recipes.is_empty() {
            state.view = Some(render(&state.recipes, mode, signed_in));
        }
    }
}

fn render(recipes: &[Recipe], mode: ViewMode, signed_in: bool) -> Node {
    let container = Node::el("div").attr("id", "recipes-container");
    match mode {
        ViewMode::Grid => container.class("grid").children(
            recipes
                .iter()
                .map(|r| view::recipe_card(r, CardOptions::default(), signed_in)),
        ),
        ViewMode::List => container
            .class("list")
            .children(recipes.iter().map(|r| view::recipe_list_item(r, signed_in))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::test_app;
    use crate::http::{ApiResponse, Method, MockResponse, MockTransport};
    use crate::notifier::ToastKind;
    use serde_json::json;

    fn page_body(page: u32, count: usize, total: u32) -> serde_json::Value {
        let recipes: Vec<_> = (0..count)
            .map(|i| json!({"id": i + 1, "title": format!("Recipe {}", i + 1), "description": "x"}))
            .collect();
        json!({
            "recipes": recipes,
            "pagination": {"page": page, "per_page": 12, "pages": 3, "total": total}
        })
    }

    fn query_of(req: &crate::http::ApiRequest) -> Vec<(String, String)> {
        req.query.clone()
    }

    #[tokio::test]
    async fn test_page_two_summary() {
        let t = test_app(
            MockTransport::new().with_json(Method::Get, "/api/recipes", 200, page_body(2, 12, 30)),
            None,
        );
        let listing = ListingController::new(t.app.clone());

        assert_eq!(listing.load_page(2).await, LoadOutcome::Loaded);
        assert_eq!(listing.summary().as_deref(), Some("Showing 13-24 of 30 recipes"));
        assert_eq!(listing.recipes().len(), 12);
        assert!(listing.pagination_view().is_some());
    }

    #[tokio::test]
    async fn test_query_omits_blank_filters() {
        let t = test_app(
            MockTransport::new().with_json(Method::Get, "/api/recipes", 200, page_body(1, 1, 1)),
            None,
        );
        let listing = ListingController::new(t.app.clone());
        let filters = FilterSet::new()
            .with(FilterKey::Search, "  curry ")
            .with(FilterKey::Category, "")
            .with(FilterKey::DifficultyLevel, "Easy");

        listing.set_filters(filters).await;

        let sent = &t.mock.requests()[0];
        assert_eq!(
            query_of(sent),
            vec![
                ("page".to_string(), "1".to_string()),
                ("per_page".to_string(), "12".to_string()),
                ("search".to_string(), "curry".to_string()),
                ("difficulty_level".to_string(), "Easy".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_result_shows_empty_state_without_summary() {
        let t = test_app(
            MockTransport::new().with_json(Method::Get, "/api/recipes", 200, page_body(1, 0, 0)),
            None,
        );
        let listing = ListingController::new(t.app.clone());

        assert_eq!(listing.load_page(1).await, LoadOutcome::Empty);
        assert_eq!(listing.summary(), None);
        assert!(listing.view().unwrap().text_content().contains("No recipes found"));
    }

    #[tokio::test]
    async fn test_failure_keeps_filters_and_page() {
        let t = test_app(
            MockTransport::new().with_unreachable(Method::Get, "/api/recipes"),
            None,
        );
        let listing = ListingController::new(t.app.clone());

        let outcome = listing
            .set_filters(FilterSet::new().with(FilterKey::Category, "dessert"))
            .await;

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(listing.filters().get(FilterKey::Category), Some("dessert"));
        assert_eq!(listing.page(), 1);
        let toast = t.app.notifier().current().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, LOAD_FAILED);
        assert!(!listing.is_loading());
    }

    #[tokio::test]
    async fn test_failure_from_later_page_keeps_page_and_clears_summary() {
        let t = test_app(
            MockTransport::new()
                .with_json(Method::Get, "/api/recipes", 200, page_body(2, 12, 30))
                .with_unreachable(Method::Get, "/api/recipes"),
            None,
        );
        let listing = ListingController::new(t.app.clone());
        assert_eq!(listing.load_page(2).await, LoadOutcome::Loaded);

        assert_eq!(listing.load_page(3).await, LoadOutcome::Failed);

        assert_eq!(listing.page(), 2);
        assert_eq!(listing.summary(), None);
        assert!(listing.pagination_view().is_none());
        assert!(listing.recipes().is_empty());
        assert!(listing
            .view()
            .unwrap()
            .text_content()
            .contains("Error loading recipes"));
    }

    #[tokio::test]
    async fn test_oversized_pagination_does_not_panic() {
        let t = test_app(
            MockTransport::new().with_json(
                Method::Get,
                "/api/recipes",
                200,
                json!({
                    "recipes": [{"id": 1, "title": "Lonely"}],
                    "pagination": {"page": 100000, "per_page": 100000, "total": 5}
                }),
            ),
            None,
        );
        let listing = ListingController::new(t.app.clone());

        assert_eq!(listing.load_page(1).await, LoadOutcome::Loaded);
        assert_eq!(listing.summary(), None);
        assert_eq!(listing.recipes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_while_loading_is_suppressed() {
        let t = test_app(
            MockTransport::new().with_response(
                Method::Get,
                "/api/recipes",
                MockResponse::Delayed(
                    Duration::from_secs(1),
                    ApiResponse::json(200, &page_body(1, 3, 3)),
                ),
            ),
            None,
        );
        let listing = ListingController::new(t.app.clone());

        let (first, second) = tokio::join!(listing.load_page(1), listing.load_page(2));

        assert_eq!(first, LoadOutcome::Loaded);
        assert_eq!(second, LoadOutcome::Suppressed);
        assert_eq!(t.mock.requests().len(), 1);
        assert_eq!(listing.page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced() {
        let t = test_app(
            MockTransport::new().with_json(Method::Get, "/api/recipes", 200, page_body(1, 1, 1)),
            None,
        );
        let listing = ListingController::new(t.app.clone());

        let typed = async {
            let early = listing.on_search_input("pa");
            let late = async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                listing.on_search_input("pasta").await
            };
            tokio::join!(early, late)
        };
        let (early, late) = typed.await;

        assert_eq!(early, None);
        assert_eq!(late, Some(LoadOutcome::Loaded));
        let requests = t.mock.requests();
        assert_eq!(requests.len(), 1);
        assert!(query_of(&requests[0]).contains(&("search".to_string(), "pasta".to_string())));
    }

    #[tokio::test]
    async fn test_view_mode_rerenders_without_fetch() {
        let t = test_app(
            MockTransport::new().with_json(Method::Get, "/api/recipes", 200, page_body(1, 2, 2)),
            None,
        );
        let listing = ListingController::new(t.app.clone());
        listing.load_page(1).await;

        listing.set_view_mode(ViewMode::List);

        let view = listing.view().unwrap();
        let mut rows = Vec::new();
        view.find_all_class("recipe-list-item", &mut rows);
        assert_eq!(rows.len(), 2);
        assert_eq!(t.mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_filters_resets_page() {
        let t = test_app(
            MockTransport::new().with_json(Method::Get, "/api/recipes", 200, page_body(1, 1, 1)),
            None,
        );
        let listing = ListingController::new(t.app.clone());
        listing.set_filter(FilterKey::Search, "soup").await;
        listing.load_page(3).await;

        listing.clear_filters().await;

        assert!(listing.filters().is_empty());
        assert_eq!(listing.page(), 1);
    }
}
