use std::sync::Arc;

use async_trait::async_trait;

use super::{FormController, SubmitError};
use crate::app::App;
use crate::modal::ModalSlot;
use crate::navigation::{Redirect, SUCCESS_REDIRECT_DELAY};
use crate::session::{RegisterRequest, REGISTER_FALLBACK};
use crate::types::User;
use crate::validation::{
    validate_email, validate_password, validate_username, FieldError, Validator, INVALID_EMAIL,
    PASSWORDS_DIFFER, PASSWORD_RULES, USERNAME_RULES,
};

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub accept_terms: bool,
}

impl RegisterForm {
    /// Payload as sent: trimmed, email lowercased, no confirmation field.
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

pub struct RegisterController {
    app: App,
    pub form: RegisterForm,
    modal: Arc<ModalSlot>,
    errors: Vec<FieldError>,
}

impl RegisterController {
    pub fn new(app: App) -> Self {
        Self {
            app,
            form: RegisterForm::default(),
            modal: Arc::new(ModalSlot::new("loading-modal")),
            errors: Vec::new(),
        }
    }

    /// Signed-in visitors skip the register page. Returns true if redirected.
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

    fn mark_server_error(&mut self, message: &str) {
        let lower = message.to_lowercase();
        let field = ["username", "email", "password"]
            .into_iter()
            .find(|f| lower.contains(f));
        if let Some(field) = field {
            self.errors.push(FieldError::new(field, message));
        }
    }
}

#[async_trait]
impl FormController for RegisterController {
    type Output = User;

    fn validate(&self) -> Vec<FieldError> {
        let f = &self.form;
        let mut v = Validator::new();

        let username = f.username.trim();
        if username.is_empty() {
            v.error("username", "Username is required");
        } else if !validate_username(username) {
            v.error("username", USERNAME_RULES);
        }

        let email = f.email.trim();
        if email.is_empty() {
            v.error("email", "Email is required");
        } else if !validate_email(email) {
            v.error("email", INVALID_EMAIL);
        }

        if f.password.is_empty() {
            v.error("password", "Password is required");
        } else if !validate_password(&f.password) {
            v.error("password", PASSWORD_RULES);
        }

        if f.confirm_password.is_empty() {
            v.error("confirm-password", "Please confirm your password");
        } else if f.confirm_password != f.password {
            v.error("confirm-password", PASSWORDS_DIFFER);
        }

        if !f.accept_terms {
            v.error("terms", "You must agree to the terms and conditions");
        }

        v.finish()
    }

    async fn submit(&mut self) -> Result<User, SubmitError> {
        self.errors = self.validate();
        if !self.errors.is_empty() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        let request = self.form.to_request();
        let result = {
            let _modal = self.modal.open();
            self.app.session().register(&request).await
        };

        let notifier = self.app.notifier();
        match result {
            Ok(user) => {
                notifier.success("Registration successful! Welcome to TastyShare!");
                self.app
                    .navigator()
                    .navigate(Redirect::after("/", SUCCESS_REDIRECT_DELAY));
                Ok(user)
            }
            Err(e) => {
                let message = e.message_or(REGISTER_FALLBACK);
                notifier.error(message.clone());
                self.mark_server_error(&message);
                Err(e.into())
            }
        }
    }
}
