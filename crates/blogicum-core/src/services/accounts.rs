use chrono::Utc;
use uuid::Uuid;

use super::Blog;
use crate::domain::User;
use crate::error::DomainError;
use crate::forms::{FormErrors, LoginForm, ProfileForm, RegistrationForm};
use crate::ports::{BaseRepository, PasswordService};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

impl Blog {
    async fn ensure_username_free(
        &self,
        username: &str,
        except: Option<Uuid>,
    ) -> Result<(), DomainError> {
        match self.users.find_by_username(username).await? {
            Some(existing) if Some(existing.id) != except => Err(DomainError::Validation(
                FormErrors::single("username", USERNAME_TAKEN),
            )),
            _ => Ok(()),
        }
    }

    /// Load the account behind a session.
    pub async fn current_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }

    /// Edit the requester's own profile fields.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        form: &ProfileForm,
    ) -> Result<User, DomainError> {
        let mut user = self.current_user(user_id).await?;
        let clean = form.clean().map_err(DomainError::Validation)?;
        self.ensure_username_free(&clean.username, Some(user.id))
            .await?;

        user.username = clean.username;
        user.first_name = clean.first_name;
        user.last_name = clean.last_name;
        user.email = clean.email;
        user.updated_at = Utc::now();

        Ok(self.users.save(user).await?)
    }

    /// Create an account.
    pub async fn register(
        &self,
        form: &RegistrationForm,
        passwords: &dyn PasswordService,
    ) -> Result<User, DomainError> {
        let clean = form.clean().map_err(DomainError::Validation)?;
        self.ensure_username_free(&clean.username, None).await?;

        let hash = passwords.hash(&clean.password)?;
        let user = User::new(clean.username, clean.email, hash);
        Ok(self.users.save(user).await?)
    }

    /// Check a username/password pair.
    pub async fn authenticate(
        &self,
        form: &LoginForm,
        passwords: &dyn PasswordService,
    ) -> Result<User, DomainError> {
        let invalid = || {
            DomainError::Validation(FormErrors::single(
                "__all__",
                "Please enter a correct username and password.",
            ))
        };

        let user = self
            .users
            .find_by_username(form.username.trim())
            .await?
            .ok_or_else(invalid)?;

        if passwords.verify(&form.password, &user.password_hash)? {
            Ok(user)
        } else {
            Err(invalid())
        }
    }
}
