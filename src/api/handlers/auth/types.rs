//! Request/response types for the auth and board routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, Debug)]
pub(crate) struct RegisterForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SubmitForm {
    pub secret: String,
}

/// Query parameters Google sends back to the callback route.
#[derive(Deserialize, Debug)]
pub(crate) struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user_id: String,
    pub username: String,
}
