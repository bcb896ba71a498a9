use crate::api::store::Role;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;

/// Body of every response from the user endpoints.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Registration request, after validation. The handler reads the raw body as
/// JSON and builds this from the validated fields.
#[derive(ToSchema)]
pub struct UserRegister {
    #[schema(min_length = 3, max_length = 24)]
    pub username: String,
    #[schema(example = "bob@x.com")]
    pub email: String,
    #[schema(rename = "type")]
    pub role: Role,
    /// 5-24 characters with a lowercase letter, an uppercase letter and a symbol.
    #[schema(value_type = String, min_length = 5, max_length = 24)]
    pub password: SecretString,
}

impl fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRegister")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password", &"***")
            .finish()
    }
}

/// Login request. `username` holds the email the account was registered with.
#[derive(ToSchema)]
pub struct UserLogin {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UserLogin {
    /// Take the string fields of a JSON object. Absent and non-string values
    /// are `None`.
    #[must_use]
    pub fn from_object(body: &Map<String, Value>) -> Self {
        let text = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);

        Self {
            username: text("username"),
            password: text("password"),
        }
    }
}

impl fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserLogin")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
