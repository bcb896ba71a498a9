use super::{
    AppState, ApiError, json_object,
    types::{MessageResponse, UserRegister},
};
use crate::api::{
    store::{InsertOutcome, Role, UserRecord},
    validate::{Class, Field, Schema},
};
use axum::{Json, body::Bytes, extract::Extension, http::StatusCode};
use once_cell::sync::Lazy;
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const REGISTERED: &str = "User registered successfully!";

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field(Field::string("username").min(3).max(24))
        .field(Field::string("email").email())
        .field(Field::string("type").alias(&["role"]).one_of(&Role::NAMES))
        .field(Field::string("password").min(5).max(24).contains(&[
            Class::Lowercase,
            Class::Uppercase,
            Class::NonWord,
        ]))
});

fn parse_user(body: &Map<String, Value>) -> Result<UserRegister, ApiError> {
    let valid = SCHEMA.validate(body).map_err(ApiError::Validation)?;

    let field = |name: &str| {
        valid
            .get(name)
            .ok_or_else(|| ApiError::Validation(format!("\"{name}\" is required")))
    };

    let role = field("type")?
        .parse::<Role>()
        .map_err(|()| ApiError::Validation("\"type\" must be one of [user, admin]".to_string()))?;

    Ok(UserRegister {
        username: field("username")?.to_string(),
        email: field("email")?.to_string(),
        role,
        password: SecretString::from(field("password")?.to_string()),
    })
}

#[utoipa::path(
    post,
    path= "/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Missing payload or first validation error", body = MessageResponse),
        (status = 409, description = "User with the specified email already exists", body = MessageResponse),
    ),
    tag= "register"
)]
#[instrument(skip_all)]
pub async fn register(
    state: Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let body = json_object(&body)?;

    let user = parse_user(&body)?;

    debug!("user: {:?}", user);

    // skip hashing for known duplicates; insert_if_absent below is authoritative
    if state.store().exists(&user.email).await {
        debug!("User already exists");
        return Err(ApiError::Conflict);
    }

    let salted = state.hasher().hash_blocking(user.password).await?;

    let record = UserRecord {
        email: user.email,
        role: user.role,
        salt: salted.salt,
        password_hash: salted.hash,
    };

    match state.store().insert_if_absent(record).await {
        InsertOutcome::Created => {
            debug!("User created");
            Ok((StatusCode::CREATED, Json(MessageResponse::new(REGISTERED))))
        }
        InsertOutcome::Conflict => {
            debug!("User created concurrently");
            Err(ApiError::Conflict)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{
        handlers::test_support::{app, post_json, post_raw, post_untyped},
        store::CredentialStore,
    };
    use anyhow::Result;
    use serde_json::json;

    fn bob() -> Value {
        json!({
            "username": "bob",
            "email": "bob@x.com",
            "type": "user",
            "password": "Abcde!"
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut body = bob();
        body[field] = value;
        body
    }

    #[tokio::test]
    async fn register_stores_salted_record() -> Result<()> {
        let (app, store) = app()?;

        let (status, body) = post_json(&app, "/register", &bob()).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "message": REGISTERED }));

        let record = store.get("bob@x.com").await.unwrap();
        assert_eq!(record.role, Role::User);
        assert!(!record.salt.is_empty());
        assert!(record.password_hash.starts_with("$argon2id$"));
        assert!(record.password_hash.contains(&record.salt));
        assert!(!record.password_hash.contains("Abcde!"));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> Result<()> {
        let (app, store) = app()?;

        let (status, _) = post_json(&app, "/register", &bob()).await?;
        assert_eq!(status, StatusCode::CREATED);

        let again = with("username", json!("robert"));
        let (status, body) = post_json(&app, "/register", &again).await?;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "message": "User exists!" }));
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn password_without_uppercase_is_rejected() -> Result<()> {
        let (app, store) = app()?;

        let (status, body) = post_json(&app, "/register", &with("password", json!("abcde!"))).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "\"password\" fails to match the required pattern"
        );
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn validation_messages() -> Result<()> {
        let (app, _store) = app()?;

        let cases = [
            (with("username", json!("bo")), "\"username\" length must be at least 3 characters long"),
            (
                with("username", json!("b".repeat(25))),
                "\"username\" length must be less than or equal to 24 characters long",
            ),
            (with("email", json!("bob-at-x")), "\"email\" must be a valid email"),
            (with("type", json!("root")), "\"type\" must be one of [user, admin]"),
            (with("password", json!("Ab!")), "\"password\" length must be at least 5 characters long"),
            (
                with("password", json!("Abcdefghijklmnopqrstuvwxy!")),
                "\"password\" length must be less than or equal to 24 characters long",
            ),
            (with("password", json!("ABCDE!")), "\"password\" fails to match the required pattern"),
            (with("password", json!("Abcdef")), "\"password\" fails to match the required pattern"),
            (with("username", json!(7)), "\"username\" must be a string"),
            (with("email", json!("")), "\"email\" is not allowed to be empty"),
        ];

        for (body, expected) in cases {
            let (status, response) = post_json(&app, "/register", &body).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
            assert_eq!(response["message"], expected);
        }
        Ok(())
    }

    #[tokio::test]
    async fn first_violation_is_reported() -> Result<()> {
        let (app, _store) = app()?;

        let (status, body) = post_json(&app, "/register", &json!({})).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "\"username\" is required");

        let body = json!({ "username": "bob", "type": "nope", "password": "x" });
        let (_, response) = post_json(&app, "/register", &body).await?;
        assert_eq!(response["message"], "\"email\" is required");
        Ok(())
    }

    #[tokio::test]
    async fn role_alias_and_admin() -> Result<()> {
        let (app, store) = app()?;

        let body = json!({
            "username": "alice",
            "email": "alice@x.com",
            "role": "admin",
            "password": "Qwerty#1"
        });
        let (status, _) = post_json(&app, "/register", &body).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            store.get("alice@x.com").await.map(|r| r.role),
            Some(Role::Admin)
        );
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_body_is_missing_payload() -> Result<()> {
        let (app, _store) = app()?;

        for raw in ["", "not json", "[1,2,3]", "null"] {
            let (status, body) = post_raw(&app, "/register", raw.to_string()).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
            assert_eq!(body, json!({ "message": "Missing payload" }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn body_without_content_type_is_validated() -> Result<()> {
        let (app, store) = app()?;

        let (status, body) = post_untyped(&app, "/register", bob().to_string()).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "message": REGISTERED }));
        assert!(store.exists("bob@x.com").await);

        let incomplete = json!({ "email": "alice@x.com" });
        let (status, body) = post_untyped(&app, "/register", incomplete.to_string()).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "\"username\" is required");
        Ok(())
    }

    #[tokio::test]
    async fn wrong_typed_fields_are_validation_errors() -> Result<()> {
        let (app, store) = app()?;

        let (status, body) = post_json(&app, "/register", &with("password", json!(12345))).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "\"password\" must be a string");

        let (status, body) = post_json(&app, "/register", &with("type", json!(["user"]))).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "\"type\" must be a string");
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_create_once() -> Result<()> {
        let (app, store) = app()?;

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let app = app.clone();
                let body = with("username", json!(format!("bob{i}")));
                tokio::spawn(async move { post_json(&app, "/register", &body).await })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for task in tasks {
            match task.await??.0 {
                StatusCode::CREATED => created += 1,
                StatusCode::CONFLICT => conflicts += 1,
                other => panic!("unexpected status {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.len().await, 1);
        Ok(())
    }
}
