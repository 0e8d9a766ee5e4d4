//! View descriptions.
//!
//! Every page renders through pure functions from data to a [`Node`] tree.
//! The shell decides how to draw the tree (the CLI flattens it to text).

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::session::NavigationView;
use crate::types::{Author, Pagination, Recipe, Review};

/// Placeholder shown when a recipe has no image.
pub const RECIPE_PLACEHOLDER: &str = "/static/images/recipe-placeholder.svg";
/// Placeholder shown when a reviewer has no avatar.
pub const AVATAR_PLACEHOLDER: &str = "/static/images/default-avatar.png";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element {
        tag: &'static str,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    pub fn el(tag: &'static str) -> Self {
        Node::Element {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn class(mut self, class: &str) -> Self {
        if let Node::Element { classes, .. } = &mut self {
            classes.extend(class.split_whitespace().map(str::to_string));
        }
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.push((name.to_string(), value.into()));
        }
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn child_opt(self, node: Option<Node>) -> Self {
        match node {
            Some(node) => self.child(node),
            None => self,
        }
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Node::Element { tag, .. } => Some(tag),
            Node::Text(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        match self {
            Node::Element { classes, .. } => classes.iter().any(|c| c == class),
            Node::Text(_) => false,
        }
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            Node::Text(_) => None,
        }
    }

    /// Depth-first search for the first node carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&Node> {
        if self.has_class(class) {
            return Some(self);
        }
        match self {
            Node::Element { children, .. } => children.iter().find_map(|c| c.find_class(class)),
            Node::Text(_) => None,
        }
    }

    /// Every node carrying `class`, in document order.
    pub fn find_all_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Node>) {
        if self.has_class(class) {
            out.push(self);
        }
        if let Node::Element { children, .. } = self {
            for c in children {
                c.find_all_class(class, out);
            }
        }
    }

    /// All text in the subtree, whitespace-joined.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Text(s) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed);
                }
            }
            Node::Element { children, .. } => {
                for c in children {
                    c.collect_text(out);
                }
            }
        }
    }

    /// Plain-text rendering: block elements start new lines.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out, 0);
        out.trim_end().to_string()
    }

    fn write_plain(&self, out: &mut String, depth: usize) {
        match self {
            Node::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return;
                }
                if !out.is_empty() && !out.ends_with('\n') && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
            Node::Element { tag, children, .. } => {
                let block = matches!(
                    *tag,
                    "div" | "section" | "li" | "h1" | "h2" | "h3" | "p" | "nav" | "ul" | "ol"
                );
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                if *tag == "li" {
                    out.push_str(&"  ".repeat(depth.saturating_sub(1)));
                    out.push_str("- ");
                }
                let next_depth = if matches!(*tag, "ul" | "ol") { depth + 1 } else { depth };
                for c in children {
                    c.write_plain(out, next_depth);
                }
                if block && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }
}

/// Human-readable duration for a minute count: "N/A", "45 min", "1h 30m", "2h".
pub fn format_time(minutes: Option<u32>) -> String {
    match minutes {
        None | Some(0) => "N/A".to_string(),
        Some(m) if m < 60 => format!("{} min", m),
        Some(m) => {
            let hours = m / 60;
            let mins = m % 60;
            if mins > 0 {
                format!("{}h {}m", hours, mins)
            } else {
                format!("{}h", hours)
            }
        }
    }
}

/// "Mar 5, 2024" from an ISO-8601 timestamp; unparseable input is returned as-is.
pub fn format_date(timestamp: &str) -> String {
    let date = DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.date_naive())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
        })
        .or_else(|_| NaiveDate::parse_from_str(timestamp, "%Y-%m-%d"));

    match date {
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// (full, half, empty) star counts for a rating out of `max`.
pub fn star_counts(rating: f64, max: u32) -> (u32, u32, u32) {
    let rating = rating.clamp(0.0, max as f64);
    let full = rating.floor() as u32;
    let half = u32::from(rating.fract() >= 0.5);
    let empty = max.saturating_sub(full + half);
    (full, half, empty)
}

pub fn star_rating(rating: f64, max: u32, show_number: bool) -> Node {
    let (full, half, empty) = star_counts(rating, max);
    let stars = std::iter::repeat("star-full")
        .take(full as usize)
        .chain(std::iter::repeat("star-half").take(half as usize))
        .chain(std::iter::repeat("star-empty").take(empty as usize))
        .map(|class| Node::el("i").class(class));

    Node::el("span")
        .class("rating")
        .attr("aria-label", format!("{:.1} out of {}", rating, max))
        .children(stars)
        .child_opt(show_number.then(|| Node::text(format!("({:.1})", rating))))
}

/// Resolve a stored image path, falling back to `fallback` when empty.
pub fn image_url(path: Option<&str>, fallback: &str) -> String {
    match path {
        None | Some("") => fallback.to_string(),
        Some(p) if p.starts_with("http") || p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{}", p),
    }
}

fn badge(text: &str, class: &str) -> Node {
    Node::el("span").class("badge").class(class).child(Node::text(text))
}

fn favorite_icon(recipe: &Recipe) -> Node {
    Node::el("button")
        .class("favorite-btn")
        .attr("data-recipe-id", recipe.id.to_string())
        .attr("data-favorited", recipe.is_favorited.to_string())
        .child(
            Node::el("i")
                .class("heart")
                .class(if recipe.is_favorited { "favorited" } else { "muted" }),
        )
}

fn total_time(recipe: &Recipe) -> Option<Node> {
    recipe
        .total_time
        .filter(|t| *t > 0)
        .map(|t| Node::el("small").class("total-time").child(Node::text(format_time(Some(t)))))
}

#[derive(Debug, Clone, Copy)]
pub struct CardOptions {
    pub show_author: bool,
    /// Only honored for signed-in viewers.
    pub show_favorite: bool,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            show_author: true,
            show_favorite: true,
        }
    }
}

/// Element with an `id` and a single text child.
fn labeled(tag: &'static str, id: &str, text: impl Into<String>) -> Node {
    Node::el(tag).attr("id", id).child(Node::text(text))
}

fn rating_count(recipe: &Recipe) -> Node {
    Node::el("small")
        .class("rating-count")
        .child(Node::text(format!("({})", recipe.rating_count)))
}

fn author_line(author: &Author) -> Node {
    Node::el("small")
        .class("author")
        .child(Node::text(format!("by {}", author.username)))
}

/// Grid card for one recipe.
pub fn recipe_card(recipe: &Recipe, options: CardOptions, signed_in: bool) -> Node {
    let author = recipe
        .author
        .as_ref()
        .filter(|_| options.show_author)
        .map(author_line);

    let badges = Node::el("div")
        .class("badges")
        .child_opt(
            recipe
                .category
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(|c| badge(c, "category")),
        )
        .child_opt(
            recipe
                .difficulty_level
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| badge(d, "difficulty")),
        );

    Node::el("div")
        .class("recipe-card")
        .attr("data-recipe-id", recipe.id.to_string())
        .child(
            Node::el("img")
                .attr("src", image_url(recipe.image_url.as_deref(), RECIPE_PLACEHOLDER))
                .attr("alt", recipe.title.clone()),
        )
        .child(Node::el("h5").class("card-title").child(Node::text(&recipe.title)))
        .child(Node::el("p").class("card-text").child(Node::text(&recipe.description)))
        .child_opt(author)
        .child(badges)
        .child(
            Node::el("div")
                .class("recipe-meta")
                .child(star_rating(recipe.average_rating, 5, false))
                .child(rating_count(recipe))
                .child_opt(total_time(recipe))
                .child_opt((options.show_favorite && signed_in).then(|| favorite_icon(recipe))),
        )
        .child(
            Node::el("a")
                .class("view-link")
                .attr("href", format!("/recipe/{}", recipe.id))
                .child(Node::text("View Recipe")),
        )
}

/// Row for the list view mode.
pub fn recipe_list_item(recipe: &Recipe, signed_in: bool) -> Node {
    let badges = Node::el("div")
        .class("badges")
        .child(badge(
            recipe.category.as_deref().filter(|c| !c.is_empty()).unwrap_or("Uncategorized"),
            "category",
        ))
        .child_opt(
            recipe
                .difficulty_level
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| badge(d, "difficulty")),
        )
        .child_opt(
            recipe
                .dietary_preference
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| badge(d, "dietary")),
        );

    Node::el("div")
        .class("recipe-list-item")
        .attr("data-recipe-id", recipe.id.to_string())
        .child(Node::el("h5").class("card-title").child(Node::text(&recipe.title)))
        .child_opt(signed_in.then(|| favorite_icon(recipe)))
        .child(Node::el("p").class("card-text").child(Node::text(&recipe.description)))
        .child(badges)
        .child(
            Node::el("div")
                .class("recipe-meta")
                .child(star_rating(recipe.average_rating, 5, false))
                .child(rating_count(recipe))
                .child_opt(total_time(recipe))
                .child_opt(recipe.author.as_ref().map(author_line)),
        )
        .child(
            Node::el("a")
                .class("view-link")
                .attr("href", format!("/recipe/{}", recipe.id))
                .child(Node::text("View")),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Previous(u32),
    Page { number: u32, active: bool },
    Ellipsis,
    Next(u32),
}

/// Links for a page set: previous, a window of two pages either side of the
/// current one, first/last with ellipses, next. Empty for a single page.
pub fn pagination_links(pagination: &Pagination) -> Vec<PageLink> {
    let mut links = Vec::new();
    if pagination.pages <= 1 {
        return links;
    }
    let current = pagination.page.clamp(1, pagination.pages);

    if pagination.has_prev {
        links.push(PageLink::Previous(current - 1));
    }

    let start = current.saturating_sub(2).max(1);
    let end = current.saturating_add(2).min(pagination.pages);

    if start > 1 {
        links.push(PageLink::Page {
            number: 1,
            active: false,
        });
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }

    for number in start..=end {
        links.push(PageLink::Page {
            number,
            active: number == current,
        });
    }

    if end < pagination.pages {
        if end < pagination.pages - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page {
            number: pagination.pages,
            active: false,
        });
    }

    if pagination.has_next && current < pagination.pages {
        links.push(PageLink::Next(current + 1));
    }

    links
}

pub fn pagination(pagination: &Pagination) -> Option<Node> {
    let links = pagination_links(pagination);
    if links.is_empty() {
        return None;
    }

    let items = links.into_iter().map(|link| {
        let (label, page, class) = match link {
            PageLink::Previous(p) => ("Previous".to_string(), Some(p), "page-item"),
            PageLink::Next(p) => ("Next".to_string(), Some(p), "page-item"),
            PageLink::Page { number, active } => (
                number.to_string(),
                Some(number),
                if active { "page-item active" } else { "page-item" },
            ),
            PageLink::Ellipsis => ("...".to_string(), None, "page-item disabled"),
        };
        let link = match page {
            Some(p) => Node::el("a").class("page-link").attr("data-page", p.to_string()),
            None => Node::el("span").class("page-link"),
        };
        Node::el("li").class(class).child(link.child(Node::text(label)))
    });

    Some(
        Node::el("nav")
            .attr("aria-label", "Recipe pagination")
            .child(Node::el("ul").class("pagination").children(items)),
    )
}

pub fn empty_state(title: &str, message: &str) -> Node {
    Node::el("div")
        .class("no-results")
        .child(Node::el("h4").child(Node::text(title)))
        .child(Node::el("p").child(Node::text(message)))
}

pub fn error_state(message: &str, back_href: &str, back_label: &str) -> Node {
    Node::el("div")
        .class("error-state")
        .child(Node::el("h4").child(Node::text(message)))
        .child(Node::el("a").attr("href", back_href).child(Node::text(back_label)))
}

pub fn navigation(nav: &NavigationView) -> Node {
    let items: Vec<Node> = match nav {
        NavigationView::Anonymous => vec![
            nav_link("/login", "Login"),
            nav_link("/register", "Register"),
        ],
        NavigationView::Member {
            username,
            avatar_url,
            is_admin,
        } => {
            let mut menu = vec![
                nav_link("/profile", "Profile"),
                nav_link("/add-recipe", "Add Recipe"),
                nav_link("/profile#favorites", "Favorites"),
                nav_link("/profile#my-recipes", "My Recipes"),
            ];
            if *is_admin {
                menu.push(nav_link("/admin", "Admin Panel"));
            }
            menu.push(
                Node::el("li").child(
                    Node::el("a")
                        .attr("id", "logout-btn")
                        .attr("href", "#")
                        .child(Node::text("Logout")),
                ),
            );
            vec![Node::el("li")
                .class("dropdown")
                .child(
                    Node::el("span")
                        .class("dropdown-toggle")
                        .child(Node::el("img").class("avatar").attr("src", avatar_url.clone()))
                        .child(Node::text(username)),
                )
                .child(Node::el("ul").class("dropdown-menu").children(menu))]
        }
    };

    Node::el("nav").attr("id", "nav-auth").child(Node::el("ul").children(items))
}

fn nav_link(href: &str, label: &str) -> Node {
    Node::el("li").child(Node::el("a").attr("href", href).child(Node::text(label)))
}

/// Favorite button on the detail page.
pub fn favorite_button(is_favorited: bool) -> Node {
    let (class, label) = if is_favorited {
        ("favorited", "Remove from Favorites")
    } else {
        ("not-favorited", "Add to Favorites")
    };
    Node::el("button")
        .attr("id", "favorite-btn")
        .class(class)
        .child(Node::text(label))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DetailOptions {
    pub signed_in: bool,
    /// Author or admin: show edit/delete actions.
    pub can_manage: bool,
}

pub fn recipe_detail(recipe: &Recipe, options: DetailOptions) -> Node {
    let mut badges = Node::el("div").attr("id", "recipe-badges");
    for (value, class) in [
        (&recipe.category, "category"),
        (&recipe.cuisine_type, "cuisine"),
        (&recipe.dietary_preference, "dietary"),
    ] {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            badges = badges.child(badge(v, class));
        }
    }
    if let Some(level) = recipe.difficulty_level.as_deref().filter(|v| !v.is_empty()) {
        let color = match level.to_ascii_lowercase().as_str() {
            "easy" => "difficulty-easy",
            "medium" => "difficulty-medium",
            "hard" => "difficulty-hard",
            _ => "difficulty",
        };
        badges = badges.child(badge(level, color));
    }

    let mut timings = Node::el("div").class("timings");
    if let Some(t) = recipe.prep_time.filter(|t| *t > 0) {
        timings = timings.child(labeled("div", "prep-time", format!("Prep: {} min", t)));
    }
    if let Some(t) = recipe.cook_time.filter(|t| *t > 0) {
        timings = timings.child(labeled("div", "cook-time", format!("Cook: {} min", t)));
    }
    if let Some(s) = recipe.servings.filter(|s| *s > 0) {
        timings = timings.child(labeled("div", "servings", format!("Serves: {}", s)));
    }
    if let Some(c) = recipe.calories_per_serving.filter(|c| *c > 0) {
        timings = timings.child(labeled("div", "calories", format!("{} cal", c)));
    }

    let ingredients = recipe
        .ingredients
        .iter()
        .filter(|i| !i.trim().is_empty())
        .map(|i| Node::el("li").class("ingredient").child(Node::text(i.trim())));

    let instructions = recipe
        .instructions
        .iter()
        .filter(|i| !i.trim().is_empty())
        .enumerate()
        .map(|(n, step)| {
            Node::el("li")
                .class("instruction")
                .child(Node::el("span").class("step-number").child(Node::text((n + 1).to_string())))
                .child(Node::text(step.trim()))
        });

    let meta = Node::el("div")
        .class("recipe-meta")
        .child(star_rating(recipe.average_rating, 5, true))
        .child(
            Node::el("span")
                .class("review-count")
                .child(Node::text(format!("({} reviews)", recipe.rating_count))),
        )
        .child_opt((recipe.view_count > 0).then(|| {
            labeled("span", "recipe-views", format!("{} views", recipe.view_count))
        }))
        .child_opt(
            recipe
                .created_at
                .as_deref()
                .map(|d| labeled("span", "recipe-date", format_date(d))),
        );

    let actions = options.can_manage.then(|| {
        Node::el("div")
            .attr("id", "recipe-actions")
            .child(
                Node::el("a")
                    .attr("id", "edit-recipe-btn")
                    .attr("href", format!("/recipe/{}/edit", recipe.id))
                    .child(Node::text("Edit")),
            )
            .child(Node::el("button").attr("id", "delete-recipe-btn").child(Node::text("Delete")))
    });

    Node::el("section")
        .attr("id", "recipe-content")
        .child(Node::el("h1").attr("id", "recipe-title").child(Node::text(&recipe.title)))
        .child(labeled("p", "recipe-description", recipe.description.as_str()))
        .child(meta)
        .child(badges)
        .child(
            Node::el("img")
                .attr("id", "recipe-image")
                .attr("src", image_url(recipe.image_url.as_deref(), RECIPE_PLACEHOLDER))
                .attr("alt", recipe.title.clone()),
        )
        .child(timings)
        .child(Node::el("h3").child(Node::text("Ingredients")))
        .child(Node::el("ul").attr("id", "ingredients-list").children(ingredients))
        .child(Node::el("h3").child(Node::text("Instructions")))
        .child(Node::el("ol").attr("id", "instructions-list").children(instructions))
        .child_opt(
            recipe
                .author
                .as_ref()
                .map(|a| labeled("div", "author-name", format!("by {}", a.username))),
        )
        .child_opt(options.signed_in.then(|| favorite_button(recipe.is_favorited)))
        .child_opt(actions)
}

pub fn reviews(reviews: &[Review]) -> Node {
    let container = Node::el("div").attr("id", "reviews-container");
    if reviews.is_empty() {
        return container.child(
            Node::el("p")
                .class("text-muted")
                .child(Node::text("No reviews yet. Be the first to review this recipe!")),
        );
    }

    container.children(reviews.iter().map(|review| {
        let (name, avatar) = match &review.user {
            Some(user) => {
                let name = match (user.first_name.as_deref(), user.last_name.as_deref()) {
                    (Some(first), Some(last)) => format!("{} {}", first, last),
                    _ => user.username.clone(),
                };
                (name, image_url(user.profile_image.as_deref(), AVATAR_PLACEHOLDER))
            }
            None => ("Anonymous".to_string(), AVATAR_PLACEHOLDER.to_string()),
        };
        Node::el("div")
            .class("review")
            .attr("data-review-id", review.id.to_string())
            .child(Node::el("img").class("avatar").attr("src", avatar))
            .child(Node::el("strong").child(Node::text(name)))
            .child_opt(
                review
                    .created_at
                    .as_deref()
                    .map(|d| Node::el("small").child(Node::text(format_date(d)))),
            )
            .child(star_rating(review.rating as f64, 5, true))
            .child(Node::el("p").child(Node::text(&review.comment)))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Author;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: 3,
            title: "Thai Green Curry".to_string(),
            description: "Aromatic and creamy".to_string(),
            category: Some("dinner".to_string()),
            difficulty_level: Some("Medium".to_string()),
            total_time: Some(95),
            average_rating: 4.5,
            rating_count: 8,
            is_favorited: true,
            author: Some(Author {
                id: 1,
                username: "chef".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "N/A");
        assert_eq!(format_time(Some(0)), "N/A");
        assert_eq!(format_time(Some(45)), "45 min");
        assert_eq!(format_time(Some(90)), "1h 30m");
        assert_eq!(format_time(Some(120)), "2h");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T12:30:00.123456"), "Mar 5, 2024");
        assert_eq!(format_date("2024-12-25T08:00:00+00:00"), "Dec 25, 2024");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_star_counts() {
        assert_eq!(star_counts(3.5, 5), (3, 1, 1));
        assert_eq!(star_counts(4.3, 5), (4, 0, 1));
        assert_eq!(star_counts(0.0, 5), (0, 0, 5));
        assert_eq!(star_counts(7.0, 5), (5, 0, 0));
    }

    #[test]
    fn test_image_url() {
        assert_eq!(image_url(None, RECIPE_PLACEHOLDER), RECIPE_PLACEHOLDER);
        assert_eq!(image_url(Some("uploads/a.png"), RECIPE_PLACEHOLDER), "/uploads/a.png");
        assert_eq!(image_url(Some("https://cdn/x.png"), RECIPE_PLACEHOLDER), "https://cdn/x.png");
    }

    #[test]
    fn test_recipe_card_hides_favorite_for_anonymous() {
        let recipe = sample_recipe();
        let anonymous = recipe_card(&recipe, CardOptions::default(), false);
        assert!(anonymous.find_class("favorite-btn").is_none());

        let member = recipe_card(&recipe, CardOptions::default(), true);
        let button = member.find_class("favorite-btn").unwrap();
        assert_eq!(button.attr_value("data-favorited"), Some("true"));
        assert!(member.text_content().contains("by chef"));
        assert!(member.text_content().contains("1h 35m"));
    }

    #[test]
    fn test_list_item_defaults_category() {
        let recipe = Recipe {
            id: 1,
            title: "Toast".to_string(),
            ..Default::default()
        };
        assert!(recipe_list_item(&recipe, false).text_content().contains("Uncategorized"));
    }

    fn page(page: u32, pages: u32) -> Pagination {
        Pagination {
            page,
            per_page: 12,
            pages,
            total: pages * 12,
            has_prev: page > 1,
            has_next: page < pages,
        }
    }

    #[test]
    fn test_pagination_single_page_is_hidden() {
        assert!(pagination_links(&page(1, 1)).is_empty());
        assert!(pagination(&page(1, 1)).is_none());
    }

    #[test]
    fn test_pagination_window_with_ellipses() {
        let links = pagination_links(&page(6, 10));
        assert_eq!(
            links,
            vec![
                PageLink::Previous(5),
                PageLink::Page { number: 1, active: false },
                PageLink::Ellipsis,
                PageLink::Page { number: 4, active: false },
                PageLink::Page { number: 5, active: false },
                PageLink::Page { number: 6, active: true },
                PageLink::Page { number: 7, active: false },
                PageLink::Page { number: 8, active: false },
                PageLink::Ellipsis,
                PageLink::Page { number: 10, active: false },
                PageLink::Next(7),
            ]
        );
    }

    #[test]
    fn test_pagination_no_ellipsis_when_adjacent() {
        let links = pagination_links(&page(2, 3));
        assert_eq!(
            links,
            vec![
                PageLink::Previous(1),
                PageLink::Page { number: 1, active: false },
                PageLink::Page { number: 2, active: true },
                PageLink::Page { number: 3, active: false },
                PageLink::Next(3),
            ]
        );
    }

    #[test]
    fn test_navigation_for_admin() {
        let nav = NavigationView::Member {
            username: "admin".to_string(),
            avatar_url: "/a.png".to_string(),
            is_admin: true,
        };
        let text = navigation(&nav).text_content();
        assert!(text.contains("Admin Panel"));
        assert!(text.contains("Logout"));
        assert!(!text.contains("Register"));

        let anon = navigation(&NavigationView::Anonymous).text_content();
        assert!(anon.contains("Login"));
        assert!(anon.contains("Register"));
    }

    #[test]
    fn test_detail_numbers_instructions_and_skips_blank() {
        let recipe = Recipe {
            id: 9,
            title: "Eggs".to_string(),
            instructions: vec!["Boil".to_string(), " ".to_string(), "Peel".to_string()],
            ..Default::default()
        };
        let detail = recipe_detail(&recipe, DetailOptions::default());
        let mut steps = Vec::new();
        detail.find_all_class("instruction", &mut steps);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].text_content(), "2 Peel");
        assert!(detail.find_class("favorite-btn").is_none());
    }

    #[test]
    fn test_empty_reviews_message() {
        assert!(reviews(&[]).text_content().contains("Be the first"));
    }

    #[test]
    fn test_plain_text_lists() {
        let node = Node::el("ul")
            .child(Node::el("li").child(Node::text("one")))
            .child(Node::el("li").child(Node::text("two")));
        assert_eq!(node.to_plain_text(), "- one\n- two");
    }
}
