//! Gerrit REST adapter: authenticated transport, anti-XSSI response framing,
//! typed schema decoding and structured error classification, plus the pure
//! helpers that belong to the wire domain (change-identifier classification,
//! review-URL parsing, CI build-state interpretation).
//!
//! The crate is deliberately free of terminal/CLI concerns; it returns typed
//! values and typed errors, and the command layer decides presentation.
//! No retry policy is implemented: transient 5xx/network failures surface to
//! the caller unchanged.

pub mod build_status;
pub mod client;
pub mod errors;
pub mod ident;
pub mod types;

pub use build_status::{BuildState, interpret};
pub use client::GerritClient;
pub use errors::{ApiResult, Error};
pub use ident::{ChangeRef, UrlChange};
