//! Landing page: top-rated recipes and site counters.

use crate::app::App;
use crate::types::{RecipePage, SiteStats};
use crate::view::{self, CardOptions, Node};

pub const FEATURED_COUNT: u32 = 6;

pub struct HomePage {
    app: App,
}

impl HomePage {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Highest-rated recipes as cards, or an empty/error panel.
    pub async fn featured(&self) -> Node {
        let query = vec![
            ("sort_by".to_string(), "rating".to_string()),
            ("per_page".to_string(), FEATURED_COUNT.to_string()),
        ];
        let signed_in = self.app.session().is_authenticated();
        match self.app.client().get_json::<RecipePage>("/api/recipes", query).await {
            Ok(page) if page.recipes.is_empty() => {
                let panel = view::empty_state(
                    "No recipes yet",
                    "Be the first to share a delicious recipe!",
                );
                panel.child_opt(signed_in.then(|| {
                    Node::el("a")
                        .attr("id", "first-recipe-btn")
                        .attr("href", "/add-recipe")
                        .child(Node::text("Add First Recipe"))
                }))
            }
            Ok(page) => Node::el("div").attr("id", "featured-recipes").children(
                page.recipes
                    .iter()
                    .map(|r| view::recipe_card(r, CardOptions::default(), signed_in)),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load featured recipes");
                Node::el("div")
                    .class("alert")
                    .child(Node::text("Failed to load featured recipes. Please try again later."))
            }
        }
    }

    /// Site counters; zeros when the endpoint is unavailable.
    pub async fn stats(&self) -> SiteStats {
        self.app
            .client()
            .get_json::<SiteStats>("/api/stats", Vec::new())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load site stats");
                SiteStats::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{test_app, MEMBER};
    use crate::http::{Method, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_featured_query() {
        let t = test_app(
            MockTransport::new().with_json(
                Method::Get,
                "/api/recipes",
                200,
                json!({"recipes": [{"id": 1, "title": "Ramen"}], "pagination": {}}),
            ),
            None,
        );
        let home = HomePage::new(t.app.clone());

        let node = home.featured().await;

        let mut cards = Vec::new();
        node.find_all_class("recipe-card", &mut cards);
        assert_eq!(cards.len(), 1);
        assert_eq!(
            t.mock.requests()[0].path_and_query(),
            "/api/recipes?sort_by=rating&per_page=6"
        );
    }

    #[tokio::test]
    async fn test_empty_featured_offers_first_recipe_to_members() {
        let t = test_app(
            MockTransport::new().with_json(
                Method::Get,
                "/api/recipes",
                200,
                json!({"recipes": []}),
            ),
            Some(MEMBER),
        );
        let node = HomePage::new(t.app.clone()).featured().await;
        assert!(node.text_content().contains("Add First Recipe"));
    }

    #[tokio::test]
    async fn test_stats_fall_back_to_zero() {
        let t = test_app(MockTransport::new().with_unreachable(Method::Get, "/api/stats"), None);
        assert_eq!(HomePage::new(t.app.clone()).stats().await, SiteStats::default());

        let t = test_app(
            MockTransport::new().with_json(
                Method::Get,
                "/api/stats",
                200,
                json!({"recipes": 12, "users": 3, "reviews": 40, "views": 900}),
            ),
            None,
        );
        assert_eq!(HomePage::new(t.app.clone()).stats().await.views, 900);
    }
}
