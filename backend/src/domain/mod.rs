//! Domain primitives, workflows and ports.
//!
//! Purpose: hold the account rules independent of transport and storage.
//! Nothing here imports actix or diesel; adapters in `inbound` and
//! `outbound` translate at the edges.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Phone, NewUser, NewPhone: stored and unsaved aggregates.
//! - RegistrationDraft, CredentialsDraft, RequestMetadata: workflow inputs.
//! - UserValidator: registration field rules.
//! - AccountsService: implementation of the `UserAccounts` driving port.

pub mod accounts_service;
pub mod drafts;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::accounts_service::{AccountsService, LOGIN_SUCCESS_MESSAGE};
pub use self::drafts::{
    CredentialsDraft, IssuedToken, LoginOutcome, PhoneDraft, RegistrationDraft,
    RegistrationReceipt, RequestMetadata,
};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    NewPhone, NewUser, PasswordDigest, Phone, PhoneId, User, UserId, UserIdError,
};
pub use self::validation::{FieldError, UserValidator};
