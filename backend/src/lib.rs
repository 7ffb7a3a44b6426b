//! User accounts service library.
//!
//! `domain` holds the workflows and ports, `inbound` the HTTP adapter and
//! `outbound` the store, hasher and token codec adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
