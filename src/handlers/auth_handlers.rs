use axum::extract::State;
use serde::{Deserialize, Deserializer};

use super::extract::ApiJson;
use super::response::{ApiResponse, Empty};
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::User;
use crate::services::{CreateUserRequest, LoginOutcome, LoginRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub univ: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub admission_date: Option<String>,
    #[serde(default)]
    pub expected_graduation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SendCodeBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    #[serde(deserialize_with = "code_from_string_or_number")]
    pub code: String,
}

/// Accepts `"0042"` as well as `42`; numbers are zero-padded to four digits.
fn code_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCode {
        Text(String),
        Number(u32),
    }

    Ok(match RawCode::deserialize(deserializer)? {
        RawCode::Text(text) => text,
        RawCode::Number(n) => format!("{:04}", n),
    })
}

/// POST /auth/signup - Register a new user
///
/// ## Request Body (JSON)
/// ```json
/// {
///   "email": "kim@example.ac.kr",
///   "password": "at-least-8-chars",
///   "name": "Kim",
///   "department": "Computer Science"
/// }
/// ```
pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignUpBody>,
) -> Result<ApiResponse<User>> {
    let user = state
        .auth_service
        .sign_up(CreateUserRequest {
            email: body.email,
            password: body.password,
            name: body.name,
            univ: body.univ,
            department: body.department,
            admission_date: body.admission_date,
            expected_graduation_date: body.expected_graduation_date,
        })
        .await?;

    Ok(ApiResponse::created("Sign-up complete", user))
}

/// POST /auth/login - Exchange credentials for an access token
///
/// ## Response (200 OK)
/// ```json
/// {
///   "statusCode": 200,
///   "data": { "message": ["Logged in"], "accessToken": "<jwt>", "user": { .. } }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<ApiResponse<LoginOutcome>> {
    let outcome = state
        .auth_service
        .login(LoginRequest {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(ApiResponse::ok("Logged in", outcome))
}

pub async fn send_code(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendCodeBody>,
) -> Result<ApiResponse<Empty>> {
    state.verification_service.send(&body.email).await?;
    Ok(ApiResponse::message("Verification code sent"))
}

pub async fn verify_code(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyCodeBody>,
) -> Result<ApiResponse<Empty>> {
    state
        .verification_service
        .verify_code(&body.email, &body.code)
        .await?;
    Ok(ApiResponse::message("Email verified"))
}

/// GET /users/me - Profile of the authenticated user
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<ApiResponse<User>> {
    let user = state.user_service.find_by_email(&auth.email).await?;
    Ok(ApiResponse::ok("OK", user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_accepts_string_and_number() {
        let body: VerifyCodeBody =
            serde_json::from_str(r#"{"email":"a@x.com","code":"0042"}"#).expect("string code");
        assert_eq!(body.code, "0042");

        let body: VerifyCodeBody =
            serde_json::from_str(r#"{"email":"a@x.com","code":42}"#).expect("numeric code");
        assert_eq!(body.code, "0042");
    }

    #[test]
    fn test_code_rejects_other_shapes() {
        let result = serde_json::from_str::<VerifyCodeBody>(r#"{"email":"a@x.com","code":[1]}"#);
        assert!(result.is_err());
    }
}
