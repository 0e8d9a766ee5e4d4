//! Profile page: account summary, dashboard counters, own recipes and
//! favorites.

use std::sync::{Mutex, MutexGuard};

use crate::app::App;
use crate::error::ApiError;
use crate::http::ApiRequest;
use crate::session::avatar_url;
use crate::types::{
    Dashboard, DashboardStats, Favorite, FavoriteToggle, FavoritesPage, Recipe, RecipePage, User,
    UserEnvelope,
};
use crate::view::{self, CardOptions, Node};

pub const PROFILE_PATH: &str = "/profile";

#[derive(Debug, Default)]
struct ProfileState {
    user: Option<User>,
    stats: DashboardStats,
    my_recipes: Option<Node>,
    favorites: Vec<Favorite>,
    favorites_view: Option<Node>,
}

pub struct ProfilePage {
    app: App,
    state: Mutex<ProfileState>,
}

impl ProfilePage {
    pub fn new(app: App) -> Self {
        Self {
            app,
            state: Mutex::new(ProfileState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProfileState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Anonymous visitors are sent to login. Returns false if redirected.
    pub fn open(&self) -> bool {
        self.app
            .session()
            .require_auth(self.app.navigator().as_ref(), PROFILE_PATH)
    }

    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    pub fn stats(&self) -> DashboardStats {
        self.state().stats
    }

    pub fn favorites(&self) -> Vec<Favorite> {
        self.state().favorites.clone()
    }

    pub fn my_recipes_view(&self) -> Option<Node> {
        self.state().my_recipes.clone()
    }

    pub fn favorites_view(&self) -> Option<Node> {
        self.state().favorites_view.clone()
    }

    /// Profile plus dashboard counters. Dashboard failures keep zeroed stats.
    pub async fn load(&self) -> Result<User, ApiError> {
        let user = match self
            .app
            .client()
            .get_json::<UserEnvelope>("/api/auth/profile", Vec::new())
            .await
        {
            Ok(envelope) => envelope.user,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load profile");
                self.app.notifier().error("Failed to load profile data");
                return Err(e);
            }
        };
        {
            let mut state = self.state();
            state.user = Some(user.clone());
            state.stats = DashboardStats::default();
        }
        self.load_dashboard().await;
        Ok(user)
    }

    pub async fn load_dashboard(&self) -> DashboardStats {
        match self
            .app
            .client()
            .get_json::<Dashboard>("/api/user/dashboard", Vec::new())
            .await
        {
            Ok(dashboard) => {
                self.state().stats = dashboard.stats;
                dashboard.stats
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load dashboard");
                self.stats()
            }
        }
    }

    pub async fn load_my_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let result = self
            .app
            .client()
            .get_json::<RecipePage>("/api/user/recipes", Vec::new())
            .await;
        let mut state = self.state();
        match result {
            Ok(page) => {
                state.my_recipes = Some(if page.recipes.is_empty() {
                    view::empty_state("No recipes yet", "Start sharing your delicious recipes!")
                } else {
                    Node::el("div").attr("id", "my-recipes-content").children(
                        page.recipes.iter().map(|r| {
                            view::recipe_card(
                                r,
                                CardOptions {
                                    show_author: false,
                                    show_favorite: false,
                                },
                                true,
                            )
                        }),
                    )
                });
                Ok(page.recipes)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load own recipes");
                state.my_recipes = Some(
                    Node::el("div")
                        .class("alert")
                        .child(Node::text("Failed to load recipes")),
                );
                Err(e)
            }
        }
    }

    pub async fn load_favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        let result = self
            .app
            .client()
            .get_json::<FavoritesPage>("/api/user/favorites", Vec::new())
            .await;
        let mut state = self.state();
        match result {
            Ok(page) => {
                state.favorites_view = Some(if page.favorites.is_empty() {
                    view::empty_state(
                        "No favorites yet",
                        "Start exploring recipes and add them to your favorites!",
                    )
                } else {
                    favorites_grid(&page.favorites).child_opt(view::pagination(&page.pagination))
                });
                state.favorites = page.favorites.clone();
                Ok(page.favorites)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load favorites");
                state.favorites_view = Some(view::empty_state(
                    "Error loading favorites",
                    "There was a problem loading your favorite recipes.",
                ));
                Err(e)
            }
        }
    }

    /// Unfavorite a recipe and reload the favorites tab.
    pub async fn remove_favorite(&self, recipe_id: i64) -> bool {
        let request = ApiRequest::post(format!("/api/recipes/{}/favorite", recipe_id));
        match self.app.client().request_json::<FavoriteToggle>(request).await {
            Ok(toggle) => {
                if toggle.is_favorited {
                    tracing::warn!(recipe_id, "favorite toggle re-added the recipe");
                }
                self.app.notifier().success("Recipe removed from favorites");
                let _ = self.load_favorites().await;
                true
            }
            Err(e) => {
                tracing::warn!(recipe_id, error = %e, "failed to remove favorite");
                self.app.notifier().error("Failed to remove from favorites");
                false
            }
        }
    }

    /// Account header: avatar, names, bio and counters.
    pub fn header_view(&self) -> Option<Node> {
        let state = self.state();
        let user = state.user.as_ref()?;
        let name = format!(
            "{} {}",
            user.first_name.as_deref().unwrap_or(""),
            user.last_name.as_deref().unwrap_or("")
        );
        let name = match name.trim() {
            "" => "No name provided".to_string(),
            n => n.to_string(),
        };
        let bio = user
            .bio
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or("No bio provided");

        let stat = |id: &str, value: u64, label: &str| {
            Node::el("div")
                .attr("id", id)
                .child(Node::el("strong").child(Node::text(value.to_string())))
                .child(Node::el("small").child(Node::text(label)))
        };

        Some(
            Node::el("section")
                .attr("id", "profile-header")
                .child(
                    Node::el("img")
                        .attr("id", "profile-avatar")
                        .attr("src", avatar_url(user, 120)),
                )
                .child(
                    Node::el("h3")
                        .attr("id", "profile-username")
                        .child(Node::text(&user.username)),
                )
                .child(Node::el("p").attr("id", "profile-name").child(Node::text(name)))
                .child(Node::el("p").attr("id", "profile-bio").child(Node::text(bio)))
                .child(
                    Node::el("div")
                        .class("stats")
                        .child(stat("total-recipes", state.stats.total_recipes, "Recipes"))
                        .child(stat("total-views", state.stats.total_views, "Views"))
                        .child(stat("total-favorites", state.stats.total_favorites, "Favorites")),
                ),
        )
    }
}

fn favorites_grid(favorites: &[Favorite]) -> Node {
    Node::el("div").attr("id", "favorites-content").children(favorites.iter().map(|favorite| {
        view::recipe_card(
            &favorite.recipe,
            CardOptions {
                show_author: true,
                show_favorite: false,
            },
            true,
        )
        .child(
            Node::el("button")
                .class("remove-favorite")
                .attr("data-recipe-id", favorite.recipe.id.to_string())
                .child(Node::text("Remove from favorites")),
        )
    }))
}
