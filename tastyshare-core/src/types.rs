use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A signed-in user as returned by the auth endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    /// "First Last" when both names are known, otherwise the username.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() || !last.is_empty() => {
                format!("{} {}", first, last).trim().to_string()
            }
            _ => self.username.clone(),
        }
    }
}

/// Short user record embedded in recipes and reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub prep_time: Option<u32>,
    #[serde(default)]
    pub cook_time: Option<u32>,
    #[serde(default)]
    pub total_time: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub calories_per_serving: Option<u32>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Accepts a JSON array, a JSON-encoded array string, or "a, b, c".
    #[serde(default, deserialize_with = "comma_list")]
    pub tags: Vec<String>,
    /// Preparation order. Accepts arrays or legacy newline-separated text.
    #[serde(default, deserialize_with = "line_list")]
    pub ingredients: Vec<String>,
    /// Execution order. Accepts arrays or legacy newline-separated text.
    #[serde(default, deserialize_with = "line_list")]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default, alias = "review_count")]
    pub rating_count: u32,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Recipe {
    /// Id of the owning user, from `user_id` or the embedded author.
    pub fn owner_id(&self) -> Option<i64> {
        self.user_id.or_else(|| self.author.as_ref().map(|a| a.id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub recipe_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<Author>,
}

/// Page metadata, taken verbatim from the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub has_prev: bool,
    #[serde(default)]
    pub has_next: bool,
}

impl Pagination {
    /// Inclusive 1-based range of items shown on this page.
    ///
    /// `None` when the result set is empty or the page lies past the end.
    pub fn item_range(&self) -> Option<(u32, u32)> {
        if self.total == 0 || self.page == 0 {
            return None;
        }
        let page = u64::from(self.page);
        let per_page = u64::from(self.per_page);
        let total = u64::from(self.total);
        let start = (page - 1) * per_page + 1;
        if start > total {
            return None;
        }
        let end = (page * per_page).min(total);
        Some((start as u32, end as u32))
    }
}

/// Listing filter keys, in the order they are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Search,
    Category,
    CuisineType,
    DietaryPreference,
    DifficultyLevel,
    SortBy,
}

impl FilterKey {
    pub const ALL: &'static [FilterKey] = &[
        FilterKey::Search,
        FilterKey::Category,
        FilterKey::CuisineType,
        FilterKey::DietaryPreference,
        FilterKey::DifficultyLevel,
        FilterKey::SortBy,
    ];

    /// Query parameter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Search => "search",
            FilterKey::Category => "category",
            FilterKey::CuisineType => "cuisine_type",
            FilterKey::DietaryPreference => "dietary_preference",
            FilterKey::DifficultyLevel => "difficulty_level",
            FilterKey::SortBy => "sort_by",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

/// Active listing filters. Blank values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    values: BTreeMap<FilterKey, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`FilterSet::set`].
    pub fn with(mut self, key: FilterKey, value: &str) -> Self {
        self.set(key, value);
        self
    }

    /// Set a filter. A value that is empty after trimming removes the key.
    pub fn set(&mut self, key: FilterKey, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value.to_string());
        }
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Query pairs for the non-empty filters.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.clone()))
            .collect()
    }
}

/// Counters shown on the home page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStats {
    #[serde(default)]
    pub recipes: u64,
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub reviews: u64,
    #[serde(default)]
    pub views: u64,
}

/// Per-user counters shown on the profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_recipes: u64,
    #[serde(default)]
    pub published_recipes: u64,
    #[serde(default)]
    pub draft_recipes: u64,
    #[serde(default)]
    pub total_favorites: u64,
    #[serde(default)]
    pub total_views: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default)]
    pub recent_recipes: Vec<Recipe>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Favorite {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    pub recipe: Recipe,
}

// Wire envelopes.

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeEnvelope {
    pub recipe: Recipe,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePage {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritesPage {
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Reviews arrive either wrapped (`{reviews, pagination}`) or as a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReviewsResponse {
    Wrapped { reviews: Vec<Review> },
    Bare(Vec<Review>),
}

impl ReviewsResponse {
    pub fn into_reviews(self) -> Vec<Review> {
        match self {
            ReviewsResponse::Wrapped { reviews } | ReviewsResponse::Bare(reviews) => reviews,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteToggle {
    #[serde(alias = "favorited")]
    pub is_favorited: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Body shape used by the server for every error response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(flexible_list(value, ','))
}

fn line_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(flexible_list(value, '\n'))
}

fn flexible_list(value: Option<Value>, separator: char) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed @ Value::Array(_)) => flexible_list(Some(parsed), separator),
            _ => s
                .split(separator)
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        },
        Some(other) => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipe_accepts_array_and_legacy_lists() {
        let recipe: Recipe = serde_json::from_value(json!({
            "id": 7,
            "title": "Banana Bread",
            "tags": "baking, breakfast,  ,dessert",
            "ingredients": "[\"3 bananas\", \"1 cup flour\"]",
            "instructions": "Mash bananas\n\nBake for 60 minutes\n",
        }))
        .unwrap();

        assert_eq!(recipe.tags, vec!["baking", "breakfast", "dessert"]);
        assert_eq!(recipe.ingredients, vec!["3 bananas", "1 cup flour"]);
        assert_eq!(
            recipe.instructions,
            vec!["Mash bananas", "Bake for 60 minutes"]
        );
    }

    #[test]
    fn test_recipe_tolerates_nulls() {
        let recipe: Recipe = serde_json::from_value(json!({
            "id": 1,
            "tags": null,
            "ingredients": null,
            "prep_time": null,
            "review_count": 4,
        }))
        .unwrap();

        assert!(recipe.tags.is_empty());
        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.prep_time, None);
        assert_eq!(recipe.rating_count, 4);
    }

    #[test]
    fn test_owner_id_falls_back_to_author() {
        let recipe = Recipe {
            author: Some(Author {
                id: 42,
                username: "chef".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(recipe.owner_id(), Some(42));
    }

    #[test]
    fn test_item_range_for_middle_page() {
        let pagination = Pagination {
            page: 2,
            per_page: 12,
            pages: 3,
            total: 30,
            has_prev: true,
            has_next: true,
        };
        assert_eq!(pagination.item_range(), Some((13, 24)));
    }

    #[test]
    fn test_item_range_for_last_page_is_clamped() {
        let pagination = Pagination {
            page: 3,
            per_page: 12,
            pages: 3,
            total: 30,
            has_prev: true,
            has_next: false,
        };
        assert_eq!(pagination.item_range(), Some((25, 30)));
    }

    #[test]
    fn test_item_range_empty() {
        assert_eq!(Pagination::default().item_range(), None);
    }

    #[test]
    fn test_filter_set_drops_blank_values() {
        let mut filters = FilterSet::new()
            .with(FilterKey::Search, "  pasta ")
            .with(FilterKey::Category, "   ");
        assert_eq!(filters.get(FilterKey::Search), Some("pasta"));
        assert_eq!(filters.get(FilterKey::Category), None);

        filters.set(FilterKey::Search, "");
        assert!(filters.is_empty());
    }

    #[test]
    fn test_item_range_handles_out_of_range_pages() {
        let huge = Pagination {
            page: 100_000,
            per_page: 100_000,
            total: 5,
            ..Pagination::default()
        };
        assert_eq!(huge.item_range(), None);

        let last = Pagination {
            page: 3,
            per_page: 12,
            total: 30,
            ..Pagination::default()
        };
        assert_eq!(last.item_range(), Some((25, 30)));
    }

    #[test]
    fn test_filter_key_round_trip() {
        for key in FilterKey::ALL {
            assert_eq!(FilterKey::from_str(key.as_str()), Some(*key));
        }
        assert_eq!(FilterKey::from_str("page"), None);
    }

    #[test]
    fn test_reviews_response_shapes() {
        let wrapped: ReviewsResponse = serde_json::from_value(json!({
            "reviews": [{"id": 1, "rating": 5, "comment": "Great"}],
            "pagination": {"page": 1}
        }))
        .unwrap();
        assert_eq!(wrapped.into_reviews().len(), 1);

        let bare: ReviewsResponse =
            serde_json::from_value(json!([{"id": 2, "rating": 3}])).unwrap();
        assert_eq!(bare.into_reviews()[0].rating, 3);
    }

    #[test]
    fn test_favorite_toggle_accepts_legacy_key() {
        let toggle: FavoriteToggle =
            serde_json::from_value(json!({"favorited": true, "message": "ok"})).unwrap();
        assert!(toggle.is_favorited);
    }
}
