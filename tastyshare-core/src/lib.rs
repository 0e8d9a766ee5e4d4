pub mod app;
pub mod config;
pub mod detail;
pub mod draft;
pub mod error;
pub mod forms;
pub mod home;
pub mod http;
pub mod image;
pub mod listing;
pub mod modal;
pub mod navigation;
pub mod notifier;
pub mod profile;
pub mod session;
pub mod storage;
pub mod theme;
pub mod types;
pub mod validation;
pub mod view;

pub use app::App;
pub use config::ClientConfig;
pub use detail::DetailController;
pub use draft::{DraftAutosave, DraftStore, RecipeDraft};
pub use error::{ApiError, ConfigError, StorageError, TransportError};
pub use forms::{
    ChangePasswordController, FormController, LoginController, ProfileEditController,
    RecipeController, RecipeMode, RegisterController, SubmitError,
};
pub use home::HomePage;
pub use http::{HttpClient, MockResponse, MockTransport, ReqwestTransport, Transport};
pub use crate::image::{AttachmentError, ImageAttachment, MAX_FILE_SIZE};
pub use listing::{ListingController, LoadOutcome, ViewMode, PAGE_SIZE};
pub use modal::{ModalGuard, ModalSlot};
pub use navigation::{Navigator, RecordingNavigator, Redirect};
pub use notifier::{Notifier, Toast, ToastKind};
pub use profile::ProfilePage;
pub use session::{NavigationView, SessionState, SessionStore};
pub use storage::{FileStore, LocalStore, MemoryStore};
pub use theme::{Theme, ThemePreference};
pub use types::{FilterKey, FilterSet, Pagination, Recipe, Review, User};
pub use validation::FieldError;
