use super::handlers::{health, root, types, user_login, user_register};
use crate::api::store::Role;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(root::root, user_register::register, user_login::login, health::health),
    components(schemas(
        types::MessageResponse,
        types::UserRegister,
        types::UserLogin,
        Role,
        health::Health
    )),
    tags(
        (name = "registrar", description = "User registration and login API"),
        (name = "register", description = "Account creation"),
        (name = "login", description = "Credential checks"),
        (name = "health", description = "Service status")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
