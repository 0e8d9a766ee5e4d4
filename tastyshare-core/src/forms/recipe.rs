use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{EntryKind, EntryList, EntryListError, FormController, SubmitError, FIX_ERRORS};
use crate::app::App;
use crate::draft::{DraftAutosave, DraftStore, RecipeDraft, AUTOSAVE_INTERVAL};
use crate::error::ApiError;
use crate::http::{Method, MultipartForm};
use crate::image::{AttachmentError, ImageAttachment};
use crate::modal::ModalSlot;
use crate::navigation::{Redirect, SUCCESS_REDIRECT_DELAY};
use crate::types::{Recipe, RecipeEnvelope};
use crate::validation::{self, parse_minutes, FieldError, Validator};
use crate::view::{self, Node};

/// Whether the form creates a recipe or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeMode {
    Add,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub cuisine_type: String,
    pub dietary_preference: String,
    pub difficulty_level: String,
    pub servings: String,
    pub prep_time: String,
    pub cook_time: String,
    pub calories_per_serving: String,
    pub video_url: String,
    /// Comma-separated.
    pub tags: String,
    pub ingredients: EntryList,
    pub instructions: EntryList,
    pub image: Option<ImageAttachment>,
}

impl Default for RecipeForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: String::new(),
            cuisine_type: String::new(),
            dietary_preference: String::new(),
            difficulty_level: String::new(),
            servings: String::new(),
            prep_time: String::new(),
            cook_time: String::new(),
            calories_per_serving: String::new(),
            video_url: String::new(),
            tags: String::new(),
            ingredients: EntryList::new(EntryKind::Ingredient),
            instructions: EntryList::new(EntryKind::Instruction),
            image: None,
        }
    }
}

fn number(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl RecipeForm {
    /// Prep plus cook minutes; blank or invalid counts as zero.
    pub fn total_time(&self) -> u32 {
        let prep = parse_minutes(&self.prep_time).unwrap_or(0);
        let cook = parse_minutes(&self.cook_time).unwrap_or(0);
        prep.saturating_add(cook)
    }

    /// Tag list from the comma-separated input.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Populate from a stored recipe (edit mode).
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            category: recipe.category.clone().unwrap_or_default(),
            cuisine_type: recipe.cuisine_type.clone().unwrap_or_default(),
            dietary_preference: recipe.dietary_preference.clone().unwrap_or_default(),
            difficulty_level: recipe.difficulty_level.clone().unwrap_or_default(),
            servings: recipe.servings.unwrap_or(1).to_string(),
            prep_time: number(recipe.prep_time),
            cook_time: number(recipe.cook_time),
            calories_per_serving: number(recipe.calories_per_serving),
            video_url: recipe.video_url.clone().unwrap_or_default(),
            tags: recipe.tags.join(", "),
            ingredients: EntryList::from_entries(EntryKind::Ingredient, recipe.ingredients.clone()),
            instructions: EntryList::from_entries(
                EntryKind::Instruction,
                recipe.instructions.clone(),
            ),
            image: None,
        }
    }

    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            cuisine_type: self.cuisine_type.clone(),
            dietary_preference: self.dietary_preference.clone(),
            difficulty_level: self.difficulty_level.clone(),
            servings: self.servings.clone(),
            prep_time: self.prep_time.clone(),
            cook_time: self.cook_time.clone(),
            calories_per_serving: self.calories_per_serving.clone(),
            video_url: self.video_url.clone(),
            tags: self.tags.clone(),
            ingredients: self.ingredients.values(),
            instructions: self.instructions.values(),
        }
    }

    pub fn from_draft(draft: RecipeDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            category: draft.category,
            cuisine_type: draft.cuisine_type,
            dietary_preference: draft.dietary_preference,
            difficulty_level: draft.difficulty_level,
            servings: draft.servings,
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            calories_per_serving: draft.calories_per_serving,
            video_url: draft.video_url,
            tags: draft.tags,
            ingredients: EntryList::from_entries(EntryKind::Ingredient, draft.ingredients),
            instructions: EntryList::from_entries(EntryKind::Instruction, draft.instructions),
            image: None,
        }
    }

    /// Every failing field. Required: title, description, category, servings.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut v = Validator::new();

        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
            ("servings", &self.servings),
        ] {
            v.check(field, validation::required(value));
        }

        if !v.has("title") {
            v.check("title", validation::title(&self.title));
        }
        if !v.has("servings") {
            v.check("servings", validation::servings(&self.servings));
        }
        v.check("prep-time", validation::minutes(&self.prep_time));
        v.check("cook-time", validation::minutes(&self.cook_time));
        v.check("video-url", validation::absolute_url(&self.video_url));

        let mut errors = v.finish();
        errors.extend(self.ingredients.validate());
        errors.extend(self.instructions.validate());
        errors
    }

    /// Multipart body. Lists are JSON-encoded arrays; when editing, blank
    /// fields are left out so the server keeps its values.
    pub fn to_multipart(&self, mode: RecipeMode) -> MultipartForm {
        let json_list = |items: Vec<String>| serde_json::Value::from(items).to_string();
        let tags = match mode {
            RecipeMode::Add => self.tags.trim().to_string(),
            RecipeMode::Edit(_) => {
                let tags = self.tag_list();
                if tags.is_empty() {
                    String::new()
                } else {
                    json_list(tags)
                }
            }
        };

        let fields = [
            ("title", self.title.trim().to_string()),
            ("description", self.description.trim().to_string()),
            ("servings", self.servings.trim().to_string()),
            ("category", self.category.clone()),
            ("cuisine_type", self.cuisine_type.clone()),
            ("dietary_preference", self.dietary_preference.clone()),
            ("difficulty_level", self.difficulty_level.clone()),
            ("prep_time", self.prep_time.trim().to_string()),
            ("cook_time", self.cook_time.trim().to_string()),
            ("total_time", self.total_time().to_string()),
            ("calories_per_serving", self.calories_per_serving.trim().to_string()),
            ("video_url", self.video_url.trim().to_string()),
            ("tags", tags),
            ("ingredients", json_list(self.ingredients.values())),
            ("instructions", json_list(self.instructions.values())),
        ];

        let mut form = MultipartForm::new();
        for (name, value) in fields {
            let omit = match mode {
                RecipeMode::Add => name == "calories_per_serving" && value.is_empty(),
                RecipeMode::Edit(_) => value.is_empty(),
            };
            if !omit {
                form = form.text(name, value);
            }
        }
        if let Some(image) = &self.image {
            form = form.file(image.clone().into_part());
        }
        form
    }
}

/// Add-recipe and edit-recipe page.
pub struct RecipeController {
    app: App,
    mode: RecipeMode,
    form: Arc<Mutex<RecipeForm>>,
    drafts: DraftStore,
    autosave: Option<DraftAutosave>,
    modal: ModalSlot,
    errors: Vec<FieldError>,
    view: Option<Node>,
}

impl RecipeController {
    pub fn add(app: App) -> Self {
        Self::with_mode(app, RecipeMode::Add)
    }

    pub fn edit(app: App, recipe_id: i64) -> Self {
        Self::with_mode(app, RecipeMode::Edit(recipe_id))
    }

    fn with_mode(app: App, mode: RecipeMode) -> Self {
        let drafts = DraftStore::new(app.store().clone());
        Self {
            app,
            mode,
            form: Arc::new(Mutex::new(RecipeForm::default())),
            drafts,
            autosave: None,
            modal: ModalSlot::new("recipe-loading-modal"),
            errors: Vec::new(),
            view: None,
        }
    }

    pub fn mode(&self) -> RecipeMode {
        self.mode
    }

    /// Current field values. Do not hold across an await.
    pub fn form(&self) -> MutexGuard<'_, RecipeForm> {
        self.form.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn modal(&self) -> &ModalSlot {
        &self.modal
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Error view shown when the recipe could not be loaded for editing.
    pub fn view(&self) -> Option<&Node> {
        self.view.as_ref()
    }

    pub fn is_autosaving(&self) -> bool {
        self.autosave.is_some()
    }

    /// Open the add form: require a session, restore any saved draft and
    /// start autosaving. Returns false if the visitor was redirected.
    pub fn open(&mut self) -> bool {
        if !self.app.session().is_authenticated() {
            self.app.notifier().warning("Please log in to add recipes");
            self.app
                .navigator()
                .navigate(Redirect::to_login("/add-recipe"));
            return false;
        }
        if self.mode != RecipeMode::Add {
            return true;
        }

        if let Some(draft) = self.drafts.load() {
            *self.form() = RecipeForm::from_draft(draft);
            self.app.notifier().info("Draft data restored");
        }

        self.autosave = Some(DraftAutosave::start(
            self.drafts.clone(),
            self.form.clone(),
            AUTOSAVE_INTERVAL,
            RecipeForm::to_draft,
        ));
        true
    }

    /// Save the draft now, outside the autosave schedule.
    pub fn save_draft(&self) {
        let draft = self.form().to_draft();
        self.drafts.save(&draft);
    }

    /// Load the recipe being edited and populate the form.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let RecipeMode::Edit(id) = self.mode else {
            return Ok(());
        };

        let result = {
            let _modal = self.modal.open();
            self.app
                .client()
                .get_json::<RecipeEnvelope>(&format!("/api/recipes/{}", id), vec![])
                .await
        };

        match result {
            Ok(envelope) => {
                *self.form() = RecipeForm::from_recipe(&envelope.recipe);
                self.view = None;
                Ok(())
            }
            Err(e) => {
                let reason = match &e {
                    ApiError::NotFound(_) => "Recipe not found".to_string(),
                    ApiError::Forbidden(_) => "Access denied".to_string(),
                    other => other.message_or("Failed to load recipe data"),
                };
                tracing::warn!(recipe_id = id, error = %e, "failed to load recipe for editing");
                self.view = Some(view::error_state(&reason, "/recipes", "Back to Recipes"));
                Err(e)
            }
        }
    }

    pub fn add_ingredient(&self) {
        self.form().ingredients.push("");
    }

    pub fn add_instruction(&self) {
        self.form().instructions.push("");
    }

    /// Remove one ingredient input; the last one stays, with a warning.
    pub fn remove_ingredient(&self, index: usize) -> Result<(), EntryListError> {
        let result = self.form().ingredients.remove(index).map(|_| ());
        self.warn_on_last(result)
    }

    pub fn remove_instruction(&self, index: usize) -> Result<(), EntryListError> {
        let result = self.form().instructions.remove(index).map(|_| ());
        self.warn_on_last(result)
    }

    fn warn_on_last(&self, result: Result<(), EntryListError>) -> Result<(), EntryListError> {
        if let Err(e @ EntryListError::LastEntry(_)) = &result {
            self.app.notifier().warning(e.to_string());
        }
        result
    }

    /// Attach a picked file. Rejected files never reach the form.
    pub fn attach_image(
        &mut self,
        file_name: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<(), AttachmentError> {
        let attachment = ImageAttachment::from_bytes(file_name, content_type, data);
        self.accept_image(attachment)
    }

    pub fn attach_image_file(&mut self, path: &Path) -> Result<(), AttachmentError> {
        let attachment = ImageAttachment::from_path(path);
        self.accept_image(attachment)
    }

    fn accept_image(
        &mut self,
        attachment: Result<ImageAttachment, AttachmentError>,
    ) -> Result<(), AttachmentError> {
        self.errors.retain(|e| e.field != "recipe-image");
        match attachment {
            Ok(image) => {
                self.form().image = Some(image);
                Ok(())
            }
            Err(e) => {
                self.app.notifier().error(e.to_string());
                self.errors.push(FieldError::new("recipe-image", e.to_string()));
                Err(e)
            }
        }
    }

    pub fn remove_image(&self) {
        self.form().image = None;
    }

    /// The shell reports where it actually navigated. Arriving on a recipe
    /// detail page means the draft was published, so it is discarded.
    pub fn confirm_navigation(&mut self, redirect: &Redirect) {
        if self.mode == RecipeMode::Add && redirect.is_recipe_detail() {
            self.autosave = None;
            self.drafts.clear();
            tracing::debug!(path = %redirect.path, "draft cleared after publish");
        }
    }

    /// Stop autosaving (leaving the page).
    pub fn close(&mut self) {
        self.autosave = None;
    }
}

#[async_trait]
impl FormController for RecipeController {
    type Output = Recipe;

    fn validate(&self) -> Vec<FieldError> {
        self.form().validate()
    }

    async fn submit(&mut self) -> Result<Recipe, SubmitError> {
        let errors = self.form().validate();
        let image_errors: Vec<_> = self
            .errors
            .iter()
            .filter(|e| e.field == "recipe-image")
            .cloned()
            .collect();
        self.errors = errors;
        if !self.errors.is_empty() {
            self.errors.extend(image_errors);
            self.app.notifier().error(FIX_ERRORS);
            return Err(SubmitError::Invalid(self.errors.clone()));
        }
        let body = self.form().to_multipart(self.mode);

        let (method, path, success, fallback) = match self.mode {
            RecipeMode::Add => (
                Method::Post,
                "/api/recipes".to_string(),
                "Recipe published successfully!",
                "Failed to publish recipe. Please try again.",
            ),
            RecipeMode::Edit(id) => (
                Method::Put,
                format!("/api/recipes/{}", id),
                "Recipe updated successfully!",
                "Failed to update recipe",
            ),
        };

        let result = {
            let _modal = self.modal.open();
            self.app
                .client()
                .send_multipart::<RecipeEnvelope>(method, &path, body)
                .await
        };

        match result {
            Ok(envelope) => {
                let recipe = envelope.recipe;
                let id = match self.mode {
                    RecipeMode::Edit(id) => id,
                    RecipeMode::Add => recipe.id,
                };
                tracing::info!(recipe_id = id, "recipe saved");
                self.app.notifier().success(success);
                self.app
                    .navigator()
                    .navigate(Redirect::after(format!("/recipe/{}", id), SUCCESS_REDIRECT_DELAY));
                Ok(recipe)
            }
            Err(e) => {
                self.app.notifier().error(e.message_or(fallback));
                Err(e.into())
            }
        }
    }
}
