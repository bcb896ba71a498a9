use super::{
    AppState, ApiError, json_object,
    types::{MessageResponse, UserLogin},
};
use axum::{Json, body::Bytes, extract::Extension, http::StatusCode};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const LOGGED_IN: &str = "Login successful";

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Missing payload", body = MessageResponse),
        (status = 401, description = "Unknown account or wrong password", body = MessageResponse),
    ),
    tag= "login"
)]
#[instrument(skip_all)]
pub async fn login(
    state: Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let user = UserLogin::from_object(&json_object(&body)?);

    debug!("user: {:?}", user);

    let (Some(username), Some(password)) = (user.username, user.password) else {
        debug!("Missing credentials");
        return Err(ApiError::InvalidCredentials);
    };

    let password = SecretString::from(password);

    // login matches `username` against the email the account registered with
    let Some(record) = state.store().get(&username).await else {
        debug!("User not found");

        // burn one verification so unknown accounts take as long as wrong passwords
        if let Err(err) = state
            .hasher()
            .verify_blocking(password, state.decoy_hash().to_string())
            .await
        {
            debug!("Decoy verification failed: {err:#}");
        }

        return Err(ApiError::InvalidCredentials);
    };

    if state
        .hasher()
        .verify_blocking(password, record.password_hash)
        .await?
    {
        debug!("Login successful");

        Ok((StatusCode::OK, Json(MessageResponse::new(LOGGED_IN))))
    } else {
        debug!("Unauthorized");

        Err(ApiError::InvalidCredentials)
    }
}
