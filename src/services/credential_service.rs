use uuid::Uuid;
use validator::Validate;

use crate::database::DynStore;
use crate::dto::auth_dto::{CompleteProfilePayload, RegisterPayload};
use crate::error::{Error, Result};
use crate::models::user::{NewUser, ProfileChanges, Role, User};
use crate::utils::{
    crypto,
    validation::{checked_email, is_blank, normalize_email, single_error},
};

#[derive(Clone)]
pub struct CredentialService {
    store: DynStore,
}

impl CredentialService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        payload.validate()?;
        let email = checked_email(&payload.email)?;
        let name = match payload.name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            given => given.to_string(),
        };

        let company_name = match payload.role {
            Role::Company => payload
                .company_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            Role::Applicant => None,
        };

        let password = payload.password;
        let password_hash = tokio::task::spawn_blocking(move || crypto::hash_password(&password))
            .await?
            .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;

        let user = self
            .store
            .insert_user(NewUser {
                email,
                password_hash,
                role: payload.role,
                name,
                company_name,
                profile: payload.profile.unwrap_or_else(|| serde_json::json!({})),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account registered");
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(Error::InvalidCredentials);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || crypto::verify_password(&password, &hash))
            .await?
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                Error::InvalidCredentials
            })?;

        if !matches {
            tracing::debug!(user_id = %user.id, "Login rejected, password mismatch");
            return Err(Error::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Owner-only: callers pass the identity taken from the session token.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        role: Role,
        payload: CompleteProfilePayload,
    ) -> Result<User> {
        payload.validate()?;
        if let Some(name) = &payload.name {
            if is_blank(name) {
                return Err(single_error("name", "required", "Name cannot be blank").into());
            }
        }
        if payload.company_name.is_some() && role != Role::Company {
            return Err(single_error(
                "company_name",
                "company_only",
                "Only company accounts have a company name",
            )
            .into());
        }

        let changes = ProfileChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            company_name: payload.company_name.map(|n| n.trim().to_string()),
            profile: payload.profile,
        };

        let user = self
            .store
            .update_user_profile(user_id, changes)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}
