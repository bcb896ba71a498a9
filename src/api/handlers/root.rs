use super::types::MessageResponse;
use axum::Json;

pub const WELCOME: &str = "Welcome to the Registrar API";

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse, content_type = "application/json"),
    ),
    tag = "registrar"
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new(WELCOME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::{app, get};
    use anyhow::Result;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn welcome_is_fixed() -> Result<()> {
        let (app, _store) = app()?;

        let (status, first) = get(&app, "/").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, json!({ "message": WELCOME }));

        let (_, second) = get(&app, "/").await?;
        assert_eq!(first, second);
        Ok(())
    }
}
