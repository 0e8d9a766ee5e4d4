use async_trait::async_trait;
use serde::Serialize;

use super::{FormController, SubmitError};
use crate::app::App;
use crate::http::Method;
use crate::types::{MessageResponse, User, UserEnvelope};
use crate::validation::{validate_email, FieldError, Validator, INVALID_EMAIL};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
        }
    }
}

/// Edit-profile dialog. A saved profile becomes the session user.
pub struct ProfileEditController {
    app: App,
    pub form: ProfileForm,
}

impl ProfileEditController {
    /// Form prefilled from the signed-in user.
    pub fn new(app: App) -> Self {
        let form = app
            .session()
            .current_user()
            .map(|u| ProfileForm::from_user(&u))
            .unwrap_or_default();
        Self { app, form }
    }
}

#[async_trait]
impl FormController for ProfileEditController {
    type Output = User;

    fn validate(&self) -> Vec<FieldError> {
        let mut v = Validator::new();
        let email = self.form.email.trim();
        if !email.is_empty() && !validate_email(email) {
            v.error("edit-email", INVALID_EMAIL);
        }
        v.finish()
    }

    async fn submit(&mut self) -> Result<User, SubmitError> {
        let errors = self.validate();
        if let Some(first) = errors.first() {
            self.app.notifier().error(first.message.clone());
            return Err(SubmitError::Invalid(errors));
        }

        let result = self
            .app
            .client()
            .send_json::<UserEnvelope, _>(Method::Put, "/api/auth/profile", &self.form)
            .await;

        match result {
            Ok(envelope) => {
                self.app.session().update_user(envelope.user.clone());
                self.app.notifier().success("Profile updated successfully!");
                Ok(envelope.user)
            }
            Err(e) => {
                self.app
                    .notifier()
                    .error(e.message_or("Failed to update profile"));
                Err(e.into())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ChangePasswordController {
    app: App,
    pub form: PasswordForm,
}

impl ChangePasswordController {
    pub fn new(app: App) -> Self {
        Self {
            app,
            form: PasswordForm::default(),
        }
    }
}

#[async_trait]
impl FormController for ChangePasswordController {
    type Output = ();

    fn validate(&self) -> Vec<FieldError> {
        let mut v = Validator::new();
        if self.form.new_password != self.form.confirm_password {
            v.error("confirm-new-password", "New passwords do not match");
        }
        if self.form.new_password.chars().count() < 8 {
            v.error("new-password", "Password must be at least 8 characters long");
        }
        v.finish()
    }

    async fn submit(&mut self) -> Result<(), SubmitError> {
        let errors = self.validate();
        if let Some(first) = errors.first() {
            self.app.notifier().error(first.message.clone());
            return Err(SubmitError::Invalid(errors));
        }

        let body = serde_json::json!({
            "current_password": self.form.current_password,
            "new_password": self.form.new_password,
        });
        let result = self
            .app
            .client()
            .send_json::<MessageResponse, _>(Method::Post, "/api/auth/change-password", &body)
            .await;

        match result {
            Ok(_) => {
                self.app.notifier().success("Password changed successfully!");
                self.form = PasswordForm::default();
                Ok(())
            }
            Err(e) => {
                self.app
                    .notifier()
                    .error(e.message_or("Failed to change password"));
                Err(e.into())
            }
        }
    }
}
