//! Inbound adapters that translate external requests into `UserAccounts`
//! calls while keeping framework details at the edge.

pub mod http;
