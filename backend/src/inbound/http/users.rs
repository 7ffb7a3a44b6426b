//! Account endpoints.
//!
//! ```text
//! GET  /api/user/all
//! POST /api/user/register {"name":"Ana","email":"ana@example.cl","password":"Secreto12","phones":[...]}
//! GET  /api/user/token    {"email":"ana@example.cl","password":"Secreto12"}
//! POST /api/user/login    {"email":"ana@example.cl","password":"Secreto12"}  + Authorization
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::{
    CredentialsDraft, IssuedToken, LoginOutcome, Phone, PhoneDraft, RegistrationDraft,
    RegistrationReceipt, RequestMetadata, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::state::HttpState;

/// Phone entry in a registration payload.
///
/// Field names follow the public contract (`citycode`, `contrycode`).
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PhonePayload {
    #[schema(example = "1234567")]
    pub number: Option<String>,
    #[schema(example = "1")]
    pub citycode: Option<String>,
    #[schema(example = "57")]
    pub contrycode: Option<String>,
}

impl From<PhonePayload> for PhoneDraft {
    fn from(value: PhonePayload) -> Self {
        Self {
            number: value.number,
            city_code: value.citycode,
            country_code: value.contrycode,
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub phones: Option<Vec<PhonePayload>>,
}

impl From<RegisterRequest> for RegistrationDraft {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password.map(Zeroizing::new),
            phones: value
                .phones
                .unwrap_or_default()
                .into_iter()
                .map(PhoneDraft::from)
                .collect(),
        }
    }
}

/// Email and password pair for token issuance and login.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<CredentialsRequest> for CredentialsDraft {
    fn from(value: CredentialsRequest) -> Self {
        Self {
            email: value.email,
            password: value.password.map(Zeroizing::new),
        }
    }
}

/// Registration success body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub is_active: bool,
}

impl From<RegistrationReceipt> for ReceiptResponse {
    fn from(value: RegistrationReceipt) -> Self {
        Self {
            id: *value.id.as_uuid(),
            created: value.created,
            modified: value.modified,
            last_login: value.last_login,
            is_active: value.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(value: IssuedToken) -> Self {
        Self { token: value.token }
    }
}

/// Success envelope sharing the error body's shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = json!(["Te has logueado ;D"]))]
    pub mensaje: Vec<String>,
}

impl From<LoginOutcome> for MessageResponse {
    fn from(value: LoginOutcome) -> Self {
        Self {
            mensaje: vec![value.message],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneResponse {
    pub id: i64,
    pub number: Option<String>,
    pub city_code: Option<String>,
    pub country_code: Option<String>,
}

impl From<Phone> for PhoneResponse {
    fn from(value: Phone) -> Self {
        Self {
            id: value.id.get(),
            number: value.number,
            city_code: value.city_code,
            country_code: value.country_code,
        }
    }
}

/// Listed user. The password digest is never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phones: Vec<PhoneResponse>,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: *value.id.as_uuid(),
            name: value.name,
            email: value.email,
            phones: value.phones.into_iter().map(PhoneResponse::from).collect(),
            is_active: value.is_active,
            created: value.created,
            modified: value.modified,
            last_login: value.last_login,
        }
    }
}

// Opaque bytes are decoded lossily so a garbled header still reaches the
// token codec and fails there.
fn request_metadata(request: &HttpRequest) -> RequestMetadata {
    let mut metadata = RequestMetadata::default();
    for (name, value) in request.headers() {
        metadata.insert(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }
    metadata
}

/// List every stored user.
#[utoipa::path(
    get,
    path = "/api/user/all",
    responses(
        (status = 200, description = "Stored users", body = [UserResponse]),
        (status = 204, description = "No users stored"),
        (status = 503, description = "Store unavailable", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/all")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let users = state.accounts.list_users().await?;
    if users.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Register a user and their phones.
#[utoipa::path(
    post,
    path = "/api/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ReceiptResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let receipt = state
        .accounts
        .register(RegistrationDraft::from(payload.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(ReceiptResponse::from(receipt)))
}

/// Issue a bearer token for a registered email.
#[utoipa::path(
    get,
    path = "/api/user/token",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or unknown email", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "issueToken"
)]
#[get("/token")]
pub async fn issue_token(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let token = state
        .accounts
        .issue_token(CredentialsDraft::from(payload.into_inner()))
        .await?;
    Ok(web::Json(TokenResponse::from(token)))
}

/// Check credentials and the bearer token.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = CredentialsRequest,
    security(("BearerToken" = [])),
    responses(
        (status = 200, description = "Logged in", body = MessageResponse),
        (status = 400, description = "Login refused", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let metadata = request_metadata(&request);
    let outcome = state
        .accounts
        .login(CredentialsDraft::from(payload.into_inner()), metadata)
        .await?;
    Ok(web::Json(MessageResponse::from(outcome)))
}
