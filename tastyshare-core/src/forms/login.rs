use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{FormController, SubmitError, TIMED_OUT};
use crate::app::App;
use crate::error::ApiError;
use crate::modal::ModalSlot;
use crate::navigation::{redirect_param, Redirect, LOGIN_REDIRECT_DELAY};
use crate::session::LOGIN_FALLBACK;
use crate::types::User;
use crate::validation::{validate_email, FieldError, Validator, INVALID_EMAIL};

/// Fail-safe: the loading modal never outlives this.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub struct LoginController {
    app: App,
    pub form: LoginForm,
    /// Where to go after signing in, from the page's `redirect` parameter.
    return_to: Option<String>,
    modal: Arc<ModalSlot>,
    errors: Vec<FieldError>,
}

impl LoginController {
    /// `query` is the login page's query string.
    pub fn new(app: App, query: &str) -> Self {
        Self {
            app,
            form: LoginForm::default(),
            return_to: redirect_param(query),
            modal: Arc::new(ModalSlot::new("loading-modal")),
            errors: Vec::new(),
        }
    }

    /// Signed-in visitors skip the login page. Returns true if redirected.
    pub fn redirect_if_signed_in(&self) -> bool {
        if self.app.session().is_authenticated() {
            self.app.navigator().navigate(Redirect::now("/"));
            return true;
        }
        false
    }

    pub fn modal(&self) -> &ModalSlot {
        &self.modal
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    fn target(&self) -> String {
        match self.return_to.as_deref() {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
            _ => "/".to_string(),
        }
    }

    fn mark_server_error(&mut self, message: &str) {
        let lower = message.to_lowercase();
        if lower.contains("email") {
            self.errors.push(FieldError::new("email", message));
        } else if lower.contains("password") {
            self.errors.push(FieldError::new("password", message));
        }
    }
}

#[async_trait]
impl FormController for LoginController {
    type Output = User;

    fn validate(&self) -> Vec<FieldError> {
        let mut v = Validator::new();
        let email = self.form.email.trim();
        if email.is_empty() {
            v.error("email", "Email is required");
        } else if !validate_email(email) {
            v.error("email", INVALID_EMAIL);
        }
        if self.form.password.is_empty() {
            v.error("password", "Password is required");
        }
        v.finish()
    }

    async fn submit(&mut self) -> Result<User, SubmitError> {
        self.errors = self.validate();
        if !self.errors.is_empty() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        let notifier = self.app.notifier().clone();
        let session = self.app.session().clone();
        let email = self.form.email.trim().to_string();
        let password = self.form.password.clone();

        let mut modal = Some(self.modal.open());
        let mut login = tokio::spawn(async move { session.login(&email, &password).await });

        // The timer only hides the modal; the login itself runs to completion.
        let joined = tokio::select! {
            joined = &mut login => joined,
            _ = tokio::time::sleep(LOGIN_TIMEOUT) => {
                tracing::warn!("login still pending after fail-safe timeout");
                drop(modal.take());
                notifier.error(TIMED_OUT);
                (&mut login).await
            }
        };
        drop(modal);

        let result = joined.unwrap_or_else(|e| Err(ApiError::Network(e.to_string())));
        match result {
            Ok(user) => {
                notifier.success("Login successful! Welcome back.");
                self.app
                    .navigator()
                    .navigate(Redirect::after(self.target(), LOGIN_REDIRECT_DELAY));
                Ok(user)
            }
            Err(e) => {
                let message = e.message_or(LOGIN_FALLBACK);
                tracing::debug!(error = %e, "login rejected");
                notifier.error(message.clone());
                self.mark_server_error(&message);
                Err(e.into())
            }
        }
    }
}
