mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tastyshare_core::detail::DetailController;
use tastyshare_core::forms::{
    ChangePasswordController, EntryKind, EntryList, FormController, LoginController,
    ProfileEditController, RecipeController, RecipeForm, RegisterController,
};
use tastyshare_core::listing::{ListingController, LoadOutcome, ViewMode};
use tastyshare_core::{
    App, ClientConfig, FilterKey, FilterSet, HomePage, ProfilePage, SubmitError, ThemePreference,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use shell::{flush_toast, print_field_errors, print_view, ShellNavigator};

#[derive(Parser)]
#[command(name = "tastyshare")]
#[command(about = "TastyShare recipe client", long_about = None)]
struct Cli {
    /// Server URL (overrides TASTYSHARE_BASE_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Directory for the saved session, draft and theme
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASTYSHARE_PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASTYSHARE_PASSWORD")]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Agree to the terms and conditions
        #[arg(long)]
        accept_terms: bool,
    },
    /// Forget the saved session
    Logout,
    /// Verify the saved session and show the signed-in user
    Whoami,
    /// Browse recipes
    Recipes {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        cuisine: Option<String>,
        #[arg(long)]
        dietary: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        /// e.g. newest, rating, popular
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// One row per recipe instead of cards
        #[arg(long)]
        list: bool,
    },
    /// Show a recipe with its reviews
    Show { id: i64 },
    /// Toggle a recipe in your favorites
    Favorite { id: i64 },
    /// Print a shareable link to a recipe
    Share { id: i64 },
    /// Review a recipe
    Review {
        id: i64,
        /// 1 to 5 stars
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Delete one of your recipes
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Publish a new recipe (resumes any saved draft)
    Add(RecipeArgs),
    /// Edit an existing recipe; only the given fields change
    Edit {
        id: i64,
        #[command(flatten)]
        fields: RecipeArgs,
    },
    /// Show or update your profile
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// List your recipes
        #[arg(long)]
        recipes: bool,
        /// List your favorites
        #[arg(long)]
        favorites: bool,
        /// Remove a recipe from your favorites
        #[arg(long)]
        unfavorite: Option<i64>,
    },
    /// Change your password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Site counters and featured recipes
    Stats,
    /// Show or change the dark-mode preference
    Theme {
        #[arg(long)]
        toggle: bool,
        /// Treat the system preference as dark
        #[arg(long)]
        system_dark: bool,
    },
}

#[derive(Args, Default)]
struct RecipeArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    cuisine: Option<String>,
    #[arg(long)]
    dietary: Option<String>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    servings: Option<String>,
    /// Minutes
    #[arg(long)]
    prep: Option<String>,
    /// Minutes
    #[arg(long)]
    cook: Option<String>,
    #[arg(long)]
    calories: Option<String>,
    #[arg(long)]
    video_url: Option<String>,
    /// Comma-separated
    #[arg(long)]
    tags: Option<String>,
    /// Repeat for each ingredient, in order
    #[arg(long = "ingredient")]
    ingredients: Vec<String>,
    /// Repeat for each step, in order
    #[arg(long = "instruction")]
    instructions: Vec<String>,
    /// JPG, PNG, GIF or WebP, at most 5MB
    #[arg(long)]
    image: Option<PathBuf>,
}

impl RecipeArgs {
    /// Overlay the given flags onto the form.
    fn apply(&self, form: &mut RecipeForm) {
        let fields = [
            (&self.title, &mut form.title),
            (&self.description, &mut form.description),
            (&self.category, &mut form.category),
            (&self.cuisine, &mut form.cuisine_type),
            (&self.dietary, &mut form.dietary_preference),
            (&self.difficulty, &mut form.difficulty_level),
            (&self.servings, &mut form.servings),
            (&self.prep, &mut form.prep_time),
            (&self.cook, &mut form.cook_time),
            (&self.calories, &mut form.calories_per_serving),
            (&self.video_url, &mut form.video_url),
            (&self.tags, &mut form.tags),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        if !self.ingredients.is_empty() {
            form.ingredients =
                EntryList::from_entries(EntryKind::Ingredient, self.ingredients.clone());
        }
        if !self.instructions.is_empty() {
            form.instructions =
                EntryList::from_entries(EntryKind::Instruction, self.instructions.clone());
        }
    }
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Invalid TASTYSHARE_* environment")?;
    if let Some(server) = &cli.server {
        config = config.with_base_url(server);
    }
    if let Some(dir) = cli.state_dir.clone() {
        config = config.with_state_dir(dir);
    }

    let navigator = Arc::new(ShellNavigator::default());
    let app = App::from_config(config, navigator.clone()).context("Failed to build HTTP client")?;

    let result = run(&app, &navigator, cli.command).await;
    flush_toast(&app);
    result
}

async fn run(app: &App, navigator: &ShellNavigator, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let mut login = LoginController::new(app.clone(), "");
            login.form.email = email;
            login.form.password = password;
            let user = login.submit().await.map_err(report)?;
            println!("Signed in as {}", user.username);
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
            first_name,
            last_name,
            phone,
            accept_terms,
        } => {
            let mut register = RegisterController::new(app.clone());
            register.form.username = username;
            register.form.email = email;
            register.form.password = password;
            register.form.confirm_password = confirm_password;
            register.form.first_name = first_name;
            register.form.last_name = last_name;
            register.form.phone = phone;
            register.form.accept_terms = accept_terms;
            let user = register.submit().await.map_err(report)?;
            println!("Registered {}", user.username);
        }
        Commands::Logout => {
            app.session().logout();
            println!("Signed out");
        }
        Commands::Whoami => {
            if !app.session().verify_token().await {
                println!("Not signed in");
                return Ok(());
            }
            if let Some(user) = app.session().current_user() {
                let role = if user.is_admin() { " (admin)" } else { "" };
                println!("{}{} <{}>", user.display_name(), role, user.email.unwrap_or_default());
            }
        }
        Commands::Recipes {
            search,
            category,
            cuisine,
            dietary,
            difficulty,
            sort_by,
            page,
            list,
        } => {
            let mut filters = FilterSet::new();
            for (key, value) in [
                (FilterKey::Search, search),
                (FilterKey::Category, category),
                (FilterKey::CuisineType, cuisine),
                (FilterKey::DietaryPreference, dietary),
                (FilterKey::DifficultyLevel, difficulty),
                (FilterKey::SortBy, sort_by),
            ] {
                filters.set(key, value.as_deref().unwrap_or(""));
            }

            let listing = ListingController::with_filters(app.clone(), filters);
            if list {
                listing.set_view_mode(ViewMode::List);
            }
            let outcome = listing.load_page(page).await;

            if let Some(summary) = listing.summary() {
                println!("{}\n", summary);
            }
            if let Some(view) = listing.view() {
                print_view(&view);
            }
            if let Some(pages) = listing.pagination_view() {
                println!();
                print_view(&pages);
            }
            if outcome == LoadOutcome::Failed {
                bail!("Failed to load recipes");
            }
        }
        Commands::Show { id } => {
            let detail = DetailController::new(app.clone(), id);
            detail.load().await;
            if let Some(view) = detail.recipe_view() {
                print_view(&view);
            }
            println!("\nReviews");
            if let Some(view) = detail.reviews_view() {
                print_view(&view);
            }
        }
        Commands::Favorite { id } => {
            let detail = DetailController::new(app.clone(), id);
            if detail.toggle_favorite().await.is_none() {
                bail!("Favorite not changed");
            }
        }
        Commands::Share { id } => {
            let detail = DetailController::new(app.clone(), id);
            println!("{}", detail.share());
        }
        Commands::Review { id, rating, comment } => {
            let detail = DetailController::new(app.clone(), id);
            detail.submit_review(rating, &comment).await.map_err(report)?;
        }
        Commands::Delete { id, yes } => {
            let detail = DetailController::new(app.clone(), id);
            if !detail.delete_recipe(|prompt| yes || shell::confirm(prompt)).await {
                bail!("Recipe not deleted");
            }
        }
        Commands::Add(fields) => {
            let mut recipe = RecipeController::add(app.clone());
            if !recipe.open() {
                bail!("Sign in first: tastyshare login");
            }
            flush_toast(app);
            fields.apply(&mut recipe.form());
            if let Some(path) = &fields.image {
                recipe.attach_image_file(path).map_err(SubmitError::from).map_err(report)?;
            }

            match recipe.submit().await {
                Ok(saved) => {
                    if let Some(redirect) = navigator.last() {
                        recipe.confirm_navigation(&redirect);
                    }
                    println!("Published recipe {}", saved.id);
                }
                Err(e) => {
                    recipe.save_draft();
                    eprintln!("Draft saved; rerun `tastyshare add` to continue.");
                    return Err(report(e));
                }
            }
            recipe.close();
        }
        Commands::Edit { id, fields } => {
            let mut recipe = RecipeController::edit(app.clone(), id);
            if !app
                .session()
                .require_auth(app.navigator().as_ref(), &format!("/recipe/{}/edit", id))
            {
                bail!("Sign in first: tastyshare login");
            }
            if recipe.load().await.is_err() {
                if let Some(view) = recipe.view() {
                    print_view(view);
                }
                bail!("Could not load recipe {}", id);
            }
            fields.apply(&mut recipe.form());
            if let Some(path) = &fields.image {
                recipe.attach_image_file(path).map_err(SubmitError::from).map_err(report)?;
            }
            recipe.submit().await.map_err(report)?;
        }
        Commands::Profile {
            first_name,
            last_name,
            email,
            phone,
            bio,
            recipes,
            favorites,
            unfavorite,
        } => {
            let page = ProfilePage::new(app.clone());
            if !page.open() {
                bail!("Sign in first: tastyshare login");
            }

            let edits = [&first_name, &last_name, &email, &phone, &bio];
            if edits.iter().any(|v| v.is_some()) {
                let mut edit = ProfileEditController::new(app.clone());
                for (value, slot) in [
                    (first_name, &mut edit.form.first_name),
                    (last_name, &mut edit.form.last_name),
                    (email, &mut edit.form.email),
                    (phone, &mut edit.form.phone),
                    (bio, &mut edit.form.bio),
                ] {
                    if let Some(value) = value {
                        *slot = value;
                    }
                }
                edit.submit().await.map_err(report)?;
                flush_toast(app);
            }

            if let Some(recipe_id) = unfavorite {
                page.remove_favorite(recipe_id).await;
                flush_toast(app);
            }

            page.load().await.context("Failed to load profile")?;
            if let Some(header) = page.header_view() {
                print_view(&header);
            }
            if recipes {
                let _ = page.load_my_recipes().await;
                if let Some(view) = page.my_recipes_view() {
                    println!("\nMy recipes");
                    print_view(&view);
                }
            }
            if favorites && unfavorite.is_none() {
                let _ = page.load_favorites().await;
            }
            if favorites {
                if let Some(view) = page.favorites_view() {
                    println!("\nFavorites");
                    print_view(&view);
                }
            }
        }
        Commands::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let mut change = ChangePasswordController::new(app.clone());
            change.form.current_password = current;
            change.form.new_password = new;
            change.form.confirm_password = confirm;
            change.submit().await.map_err(report)?;
        }
        Commands::Stats => {
            let home = HomePage::new(app.clone());
            let (stats, featured) = tokio::join!(home.stats(), home.featured());
            println!(
                "{} recipes, {} cooks, {} reviews, {} views\n",
                stats.recipes, stats.users, stats.reviews, stats.views
            );
            print_view(&featured);
        }
        Commands::Theme {
            toggle,
            system_dark,
        } => {
            let theme = ThemePreference::new(app.store().clone());
            let current = if toggle {
                theme.toggle(system_dark)
            } else {
                theme.resolve(system_dark)
            };
            let source = if theme.saved().is_some() { "saved" } else { "system" };
            println!(
                "{} mode ({})",
                if current.is_dark() { "Dark" } else { "Light" },
                source
            );
        }
    }
    Ok(())
}

/// Print field errors and turn a submit failure into the command's error.
fn report(error: SubmitError) -> anyhow::Error {
    print_field_errors(error.field_errors());
    anyhow::Error::new(error)
}
