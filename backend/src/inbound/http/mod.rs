//! HTTP inbound adapter exposing the account endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod state;
pub mod users;

pub use error::ApiResult;

/// Mount the `/api/user` scope.
pub fn configure_users(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/user")
            .service(users::list_users)
            .service(users::register)
            .service(users::issue_token)
            .service(users::login),
    );
}
