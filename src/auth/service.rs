// Authentication service - business logic layer

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{User, UserResponse, ValidatedRegistration},
    password::PasswordService,
    registration::validate_registration,
    repository::UserStore,
    token::TokenService,
};
use crate::error::StoreError;
use crate::validation::ValidationError;

fn email_taken() -> ValidationError {
    ValidationError::DuplicateField {
        location: "email",
        message: "Email already taken",
    }
}

/// Authentication service coordinating signup, login and token checks
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register a new user from a raw signup payload
    ///
    /// 1. Field rules (presence, type, trim, length, format)
    /// 2. Email uniqueness pre-check for a deterministic error
    /// 3. Hash and insert; a store-level duplicate maps to the same error
    pub async fn register(&self, body: &Value) -> Result<UserResponse, AuthError> {
        let registration = validate_registration(body)?;
        self.create_user(registration).await.map(UserResponse::from)
    }

    /// Create a user from an already validated registration
    pub async fn create_user(&self, registration: ValidatedRegistration) -> Result<User, AuthError> {
        if self.users.find_by_email(&registration.email).await?.is_some() {
            debug!("Registration with taken email rejected");
            return Err(email_taken().into());
        }

        let password_hash = PasswordService::hash_password_blocking(registration.password).await?;

        let user = User {
            id: Uuid::new_v4(),
            email: registration.email,
            password_hash,
            cellphone: registration.cellphone,
        };

        let user = self.users.insert(user).await.map_err(|e| match e {
            StoreError::Duplicate => AuthError::from(email_taken()),
            other => AuthError::Store(other),
        })?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = PasswordService::verify_password_blocking(
            password.to_string(),
            user.password_hash.clone(),
        )
        .await?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        debug!("User {} logged in", user.id);
        self.tokens.issue(user.id)
    }

    /// Verify a bearer token and resolve the user it names
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self.tokens.verify(token)?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownUser)
    }

    /// Issue a fresh token for an already authenticated user
    pub fn refresh(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.tokens.issue(user_id)
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }
}
