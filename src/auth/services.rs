use tracing::{info, warn};

use super::dto::{LoginRequest, PublicUser, RegisterRequest};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    validation::normalize_email,
};

/// Create an account. The returned profile never carries the password hash.
pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<PublicUser> {
    let req = req.normalized();

    // Cheap early exit; the unique insert below is what actually decides.
    if state.users.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::Conflict);
    }

    let hash = state.hasher.hash(&req.password).await?;
    let user = state
        .users
        .create(&req.name, &req.email, &hash)
        .await
        .map_err(|e| {
            warn!(email = %req.email, error = %e, "create user failed");
            AppError::from(e)
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user.into())
}

/// Exchange credentials for a token.
///
/// Unknown email and wrong password fail identically.
pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<String> {
    let email = normalize_email(&req.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !state.hasher.verify(&req.password, &user.password_hash).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .keys
        .issue(user.id)
        .map_err(|e| AppError::Internal(e.into()))?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registration(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ana Silva".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn credentials(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let state = AppState::fake();
        let user = register(&state, registration("ana@x.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(user.name, "Ana Silva");

        let token = login(&state, credentials("ana@x.com", "secret1")).await.unwrap();
        assert!(!token.is_empty());
        assert_eq!(state.keys.verify(&token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn login_is_case_insensitive_on_email() {
        let state = AppState::fake();
        register(&state, registration("Ana@X.com", "secret1")).await.unwrap();
        assert!(login(&state, credentials("ANA@x.COM", "secret1")).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let state = AppState::fake();
        register(&state, registration("ana@x.com", "secret1")).await.unwrap();

        let unknown = login(&state, credentials("bia@x.com", "secret1")).await.unwrap_err();
        let wrong = login(&state, credentials("ana@x.com", "secret2")).await.unwrap_err();
        assert_eq!(unknown.kind(), wrong.kind());
        assert_eq!(unknown.status(), wrong.status());
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn concurrent_duplicate_registration_has_one_winner() {
        let state = Arc::new(AppState::fake());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                register(&state, registration("race@x.com", "secret1")).await
            }));
        }
        let mut ok = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::Conflict) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);
    }
}
