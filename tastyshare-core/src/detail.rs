//! Recipe detail page: recipe, reviews, favorites and owner actions.

use std::sync::{Mutex, MutexGuard};

use crate::app::App;
use crate::error::ApiError;
use crate::forms::SubmitError;
use crate::http::{ApiRequest, Method};
use crate::navigation::{Redirect, SUCCESS_REDIRECT_DELAY};
use crate::types::{FavoriteToggle, Recipe, RecipeEnvelope, Review, ReviewsResponse};
use crate::validation::{FieldError, Validator};
use crate::view::{self, DetailOptions, Node};

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this recipe? This action cannot be undone.";
pub const MAX_COMMENT_CHARS: usize = 500;
pub const RECIPE_NOT_FOUND: &str = "Recipe not found";

#[derive(Debug, Default)]
struct DetailState {
    recipe: Option<Recipe>,
    reviews: Vec<Review>,
    recipe_view: Option<Node>,
    reviews_view: Option<Node>,
}

pub struct DetailController {
    app: App,
    recipe_id: i64,
    state: Mutex<DetailState>,
}

impl DetailController {
    pub fn new(app: App, recipe_id: i64) -> Self {
        Self {
            app,
            recipe_id,
            state: Mutex::new(DetailState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn recipe_id(&self) -> i64 {
        self.recipe_id
    }

    pub fn recipe(&self) -> Option<Recipe> {
        self.state().recipe.clone()
    }

    pub fn reviews(&self) -> Vec<Review> {
        self.state().reviews.clone()
    }

    pub fn recipe_view(&self) -> Option<Node> {
        self.state().recipe_view.clone()
    }

    pub fn reviews_view(&self) -> Option<Node> {
        self.state().reviews_view.clone()
    }

    /// Absolute link to this recipe's page.
    pub fn share_url(&self) -> String {
        format!("{}/recipe/{}", self.app.config().base_url, self.recipe_id)
    }

    /// Hand the link to the shell in place of the clipboard.
    pub fn share(&self) -> String {
        let url = self.share_url();
        self.app.notifier().success("Recipe URL copied to clipboard!");
        url
    }

    /// The signed-in user owns the recipe or is an admin.
    pub fn can_manage(&self) -> bool {
        let Some(user) = self.app.session().current_user() else {
            return false;
        };
        if user.is_admin() {
            return true;
        }
        self.state()
            .recipe
            .as_ref()
            .and_then(Recipe::owner_id)
            .is_some_and(|owner| owner == user.id)
    }

    /// Fetch recipe and reviews concurrently. Each part is stored and
    /// rendered as soon as its own response arrives.
    pub async fn load(&self) {
        let _ = tokio::join!(self.load_recipe(), self.load_reviews());
    }

    pub async fn load_recipe(&self) -> Result<(), ApiError> {
        let path = format!("/api/recipes/{}", self.recipe_id);
        match self.app.client().get_json::<RecipeEnvelope>(&path, Vec::new()).await {
            Ok(envelope) => {
                self.state().recipe = Some(envelope.recipe);
                self.render_recipe();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(recipe_id = self.recipe_id, error = %e, "failed to load recipe");
                let message = if e.is_not_found() {
                    RECIPE_NOT_FOUND
                } else {
                    "Failed to load recipe. Please try again."
                };
                self.state().recipe_view =
                    Some(view::error_state(message, "/recipes", "Back to Recipes"));
                Err(e)
            }
        }
    }

    /// Reviews failures are logged only; the previous list stays.
    pub async fn load_reviews(&self) -> Result<(), ApiError> {
        let path = format!("/api/recipes/{}/reviews", self.recipe_id);
        match self.app.client().get_json::<ReviewsResponse>(&path, Vec::new()).await {
            Ok(response) => {
                let reviews = response.into_reviews();
                let mut state = self.state();
                state.reviews_view = Some(view::reviews(&reviews));
                state.reviews = reviews;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(recipe_id = self.recipe_id, error = %e, "failed to load reviews");
                Err(e)
            }
        }
    }

    fn render_recipe(&self) {
        let options = DetailOptions {
            signed_in: self.app.session().is_authenticated(),
            can_manage: self.can_manage(),
        };
        let mut state = self.state();
        state.recipe_view = state.recipe.as_ref().map(|r| view::recipe_detail(r, options));
    }

    /// Toggle the favorite flag. Returns the server-confirmed state, or
    /// `None` when nothing changed.
    pub async fn toggle_favorite(&self) -> Option<bool> {
        if !self.app.session().is_authenticated() {
            self.app.notifier().warning("Please login to add favorites");
            return None;
        }

        let request = ApiRequest::post(format!("/api/recipes/{}/favorite", self.recipe_id));
        match self.app.client().request_json::<FavoriteToggle>(request).await {
            Ok(toggle) => {
                if let Some(recipe) = self.state().recipe.as_mut() {
                    recipe.is_favorited = toggle.is_favorited;
                }
                self.render_recipe();
                let message = if toggle.message.is_empty() {
                    if toggle.is_favorited {
                        "Added to favorites".to_string()
                    } else {
                        "Removed from favorites".to_string()
                    }
                } else {
                    toggle.message
                };
                self.app.notifier().success(message);
                Some(toggle.is_favorited)
            }
            Err(e) => {
                tracing::warn!(recipe_id = self.recipe_id, error = %e, "favorite toggle failed");
                self.app.notifier().error("Failed to update favorite");
                None
            }
        }
    }

    /// Delete after `confirm` accepts [`DELETE_PROMPT`]. Returns true if
    /// the recipe was deleted.
    pub async fn delete_recipe<F>(&self, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_PROMPT) {
            return false;
        }

        let path = format!("/api/recipes/{}", self.recipe_id);
        match self.app.client().delete(&path).await {
            Ok(_) => {
                tracing::info!(recipe_id = self.recipe_id, "recipe deleted");
                self.app.notifier().success("Recipe deleted successfully");
                self.app
                    .navigator()
                    .navigate(Redirect::after("/recipes", SUCCESS_REDIRECT_DELAY));
                true
            }
            Err(e) => {
                tracing::warn!(recipe_id = self.recipe_id, error = %e, "delete failed");
                self.app.notifier().error("Failed to delete recipe");
                false
            }
        }
    }

    pub fn validate_review(rating: u8, comment: &str) -> Vec<FieldError> {
        let mut v = Validator::new();
        if !(1..=5).contains(&rating) {
            v.error("rating", "Please select a rating between 1 and 5");
        }
        if comment.chars().count() > MAX_COMMENT_CHARS {
            v.error("comment", "Comment must be 500 characters or less");
        }
        v.finish()
    }

    /// Post a review, then reload reviews and the recipe's rating.
    pub async fn submit_review(&self, rating: u8, comment: &str) -> Result<(), SubmitError> {
        if !self.app.session().is_authenticated() {
            let message = "Please login to submit a review";
            self.app.notifier().warning(message);
            return Err(ApiError::Unauthorized(message.to_string()).into());
        }

        let errors = Self::validate_review(rating, comment);
        if let Some(first) = errors.first() {
            self.app.notifier().error(first.message.clone());
            return Err(SubmitError::Invalid(errors));
        }

        let path = format!("/api/recipes/{}/reviews", self.recipe_id);
        let body = serde_json::json!({ "rating": rating, "comment": comment });
        let result = self
            .app
            .client()
            .send_json::<serde_json::Value, _>(Method::Post, &path, &body)
            .await;

        match result {
            Ok(_) => {
                self.app.notifier().success("Review submitted successfully!");
                let _ = tokio::join!(self.load_reviews(), self.load_recipe());
                Ok(())
            }
            Err(e) => {
                self.app.notifier().error(e.message_or("Failed to submit review"));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{test_app, ADMIN, MEMBER};
    use crate::http::MockTransport;
    use crate::notifier::ToastKind;
    use serde_json::json;

    fn recipe_body(owner: i64, favorited: bool) -> serde_json::Value {
        json!({"recipe": {
            "id": 7,
            "title": "Shakshuka",
            "description": "Eggs in spicy tomato",
            "user_id": owner,
            "is_favorited": favorited,
            "ingredients": ["6 eggs", "1 can tomatoes"],
            "instructions": ["Simmer", "Crack eggs"]
        }})
    }

    #[tokio::test]
    async fn test_recipe_renders_when_reviews_fail() {
        let t = test_app(
            MockTransport::new()
                .with_json(Method::Get, "/api/recipes/7", 200, recipe_body(2, false))
                .with_unreachable(Method::Get, "/api/recipes/7/reviews"),
            None,
        );
        let detail = DetailController::new(t.app.clone(), 7);

        detail.load().await;

        assert_eq!(detail.recipe().unwrap().title, "Shakshuka");
        assert!(detail.recipe_view().is_some());
        assert!(detail.reviews_view().is_none());
        assert!(t.app.notifier().current().is_none());
    }

    #[tokio::test]
    async fn test_reviews_render_when_recipe_fails() {
        let t = test_app(
            MockTransport::new()
                .with_json(Method::Get, "/api/recipes/7", 404, json!({"error": "Recipe not found"}))
                .with_json(
                    Method::Get,
                    "/api/recipes/7/reviews",
                    200,
                    json!([{"id": 1, "rating": 4, "comment": "Lovely"}]),
                ),
            None,
        );
        let detail = DetailController::new(t.app.clone(), 7);

        detail.load().await;

        assert_eq!(detail.reviews().len(), 1);
        let text = detail.recipe_view().unwrap().text_content();
        assert!(text.contains(RECIPE_NOT_FOUND));
        assert!(!text.contains("Failed to load recipe"));
    }

    #[tokio::test]
    async fn test_server_error_shows_retry_message() {
        let t = test_app(
            MockTransport::new()
                .with_json(Method::Get, "/api/recipes/7", 500, json!({"error": "boom"}))
                .with_json(Method::Get, "/api/recipes/7/reviews", 200, json!([])),
            None,
        );
        let detail = DetailController::new(t.app.clone(), 7);

        assert!(detail.load_recipe().await.is_err());

        let text = detail.recipe_view().unwrap().text_content();
        assert!(text.contains("Failed to load recipe. Please try again."));
    }

    #[test]
    fn test_share_url_points_at_detail_page() {
        let t = test_app(MockTransport::new(), None);
        let detail = DetailController::new(t.app.clone(), 7);

        let url = detail.share();

        assert_eq!(url, format!("{}/recipe/7", t.app.config().base_url));
        let toast = t.app.notifier().current().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Recipe URL copied to clipboard!");
    }

    #[tokio::test]
    async fn test_favorite_requires_sign_in() {
        let t = test_app(MockTransport::new(), None);
        let detail = DetailController::new(t.app.clone(), 7);

        assert_eq!(detail.toggle_favorite().await, None);
        assert!(t.mock.requests().is_empty());
        assert_eq!(t.app.notifier().current().unwrap().kind, ToastKind::Warning);
    }

    #[tokio::test]
    async fn test_favorite_uses_server_state() {
        let t = test_app(
            MockTransport::new()
                .with_json(Method::Get, "/api/recipes/7", 200, recipe_body(5, false))
                .with_json(
                    Method::Post,
                    "/api/recipes/7/favorite",
                    200,
                    json!({"is_favorited": true, "message": "Recipe added to favorites"}),
                ),
            Some(MEMBER),
        );
        let detail = DetailController::new(t.app.clone(), 7);
        detail.load_recipe().await.unwrap();

        assert_eq!(detail.toggle_favorite().await, Some(true));
        assert!(detail.recipe().unwrap().is_favorited);
        let view = detail.recipe_view().unwrap();
        assert!(view.text_content().contains("Remove from Favorites"));
        assert_eq!(
            t.app.notifier().current().unwrap().message,
            "Recipe added to favorites"
        );
    }

    #[tokio::test]
    async fn test_owner_and_admin_can_manage() {
        let mock = || {
            MockTransport::new().with_json(
                Method::Get,
                "/api/recipes/7",
                200,
                recipe_body(2, false),
            )
        };

        let owner = test_app(mock(), Some(MEMBER));
        let detail = DetailController::new(owner.app.clone(), 7);
        detail.load_recipe().await.unwrap();
        assert!(detail.can_manage());

        let admin = test_app(mock(), Some(ADMIN));
        let detail = DetailController::new(admin.app.clone(), 7);
        detail.load_recipe().await.unwrap();
        assert!(detail.can_manage());

        let visitor = test_app(mock(), None);
        let detail = DetailController::new(visitor.app.clone(), 7);
        detail.load_recipe().await.unwrap();
        assert!(!detail.can_manage());
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let t = test_app(
            MockTransport::new().with_json(
                Method::Delete,
                "/api/recipes/7",
                200,
                json!({"message": "ok"}),
            ),
            Some(MEMBER),
        );
        let detail = DetailController::new(t.app.clone(), 7);

        assert!(!detail.delete_recipe(|_| false).await);
        assert!(t.mock.requests().is_empty());

        assert!(detail.delete_recipe(|prompt| prompt == DELETE_PROMPT).await);
        assert_eq!(
            t.navigator.last(),
            Some(Redirect::after("/recipes", SUCCESS_REDIRECT_DELAY))
        );
        assert_eq!(
            t.app.notifier().current().unwrap().message,
            "Recipe deleted successfully"
        );
    }

    #[tokio::test]
    async fn test_review_reloads_recipe_and_reviews() {
        let t = test_app(
            MockTransport::new()
                .with_json(
                    Method::Post,
                    "/api/recipes/7/reviews",
                    201,
                    json!({"review": {"id": 3}}),
                )
                .with_json(Method::Get, "/api/recipes/7", 200, recipe_body(5, false))
                .with_json(
                    Method::Get,
                    "/api/recipes/7/reviews",
                    200,
                    json!({"reviews": [{"id": 3, "rating": 5, "comment": "Great"}]}),
                ),
            Some(MEMBER),
        );
        let detail = DetailController::new(t.app.clone(), 7);

        detail.submit_review(5, "Great").await.unwrap();

        let posted = &t.mock.requests_to(Method::Post, "/api/recipes/7/reviews")[0];
        assert_eq!(
            posted.body,
            crate::http::RequestBody::Json(json!({"rating": 5, "comment": "Great"}))
        );
        assert_eq!(detail.reviews().len(), 1);
        assert!(detail.recipe().is_some());
    }

    #[tokio::test]
    async fn test_review_constraints_checked_locally() {
        let t = test_app(MockTransport::new(), Some(MEMBER));
        let detail = DetailController::new(t.app.clone(), 7);
        let long = "a".repeat(501);

        let err = detail.submit_review(0, &long).await.unwrap_err();

        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["rating", "comment"]);
        assert!(t.mock.requests().is_empty());
    }
}
