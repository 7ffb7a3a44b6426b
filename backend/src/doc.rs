//! OpenAPI document for the account endpoints.
//!
//! Served by Swagger UI in debug builds and printed by the `openapi-dump`
//! binary for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::users::{
    CredentialsRequest, MessageResponse, PhonePayload, PhoneResponse, ReceiptResponse,
    RegisterRequest, TokenResponse, UserResponse,
};

/// Registers the bearer scheme required by `POST /api/user/login`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by GET /api/user/token."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "User accounts API",
        description = "Registration, token issuance, login and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::register,
        crate::inbound::http::users::issue_token,
        crate::inbound::http::users::login,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorBody,
        RegisterRequest,
        PhonePayload,
        CredentialsRequest,
        ReceiptResponse,
        TokenResponse,
        MessageResponse,
        UserResponse,
        PhoneResponse,
    )),
    tags(
        (name = "users", description = "Account registration and login"),
        (name = "health", description = "Orchestrator probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("/api/user/all")]
    #[case("/api/user/register")]
    #[case("/api/user/token")]
    #[case("/api/user/login")]
    #[case("/health/live")]
    #[case("/health/ready")]
    fn documents_every_route(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }

    #[rstest]
    fn phone_payload_keeps_wire_names() {
        let fields = schema_fields("PhonePayload");
        assert!(fields.contains(&"citycode".to_owned()));
        assert!(fields.contains(&"contrycode".to_owned()));
    }

    #[rstest]
    fn user_schema_never_exposes_password() {
        let fields = schema_fields("UserResponse");
        assert!(fields.contains(&"lastLogin".to_owned()));
        assert!(!fields.contains(&"password".to_owned()));
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
