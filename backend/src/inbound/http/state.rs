//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only see the
//! driving port, so they can be exercised against a mock.

use std::sync::Arc;

use crate::domain::ports::UserAccounts;

#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn UserAccounts>,
}

impl HttpState {
    pub fn new(accounts: Arc<dyn UserAccounts>) -> Self {
        Self { accounts }
    }
}
