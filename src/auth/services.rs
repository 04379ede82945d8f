use tracing::{debug, info, warn};

use crate::{
    auth::{
        dto::{TokenResponse, TOKEN_TYPE_BEARER},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{NewUser, DEFAULT_ROLE},
    },
    error::{AppError, AppResult},
};

/// Rejects blank fields before the store is touched. No strength policy is applied.
pub fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if email.is_empty() {
        return Err(AppError::Validation("email must not be empty".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password must not be empty".into()));
    }
    Ok(())
}

pub async fn register(store: &dyn UserStore, email: &str, password: &str) -> AppResult<()> {
    validate_credentials(email, password)?;

    if store.find_by_email(email).await?.is_some() {
        debug!(email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(password)?;

    // A concurrent registration can still win between lookup and insert;
    // the store reports that as DuplicateEmail too.
    let user = store
        .insert(NewUser {
            email: email.to_string(),
            password_hash,
            role: DEFAULT_ROLE.to_string(),
        })
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::DuplicateEmail) {
                debug!(email, "email registered concurrently");
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(())
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    validate_credentials(email, password)?;

    let Some(user) = store.find_by_email(email).await? else {
        debug!("login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = keys.sign(user.id, &user.role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
    })
}
