use serde::Deserialize;

/// Request body for signup. Extra fields sent by clients are ignored.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Request body for login. Missing or null credentials are an
/// authentication failure, not a malformed request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
