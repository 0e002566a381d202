//! Command executors.
//!
//! Every command follows the same skeleton: resolve the change, issue REST
//! calls (concurrently when independent), render in the requested format,
//! and return the process exit code. Errors travel upward as typed values
//! and are lowered only in `main`.

pub mod build_status;
pub mod checkout;
pub mod comments;
pub mod diff;
pub mod directory;
pub mod extract_url;
pub mod lifecycle;
pub mod open;
pub mod push;
pub mod review;
pub mod reviewers;
pub mod search;
pub mod setup;
pub mod show;
pub mod status;
pub mod topic;
pub mod vote;

use std::path::PathBuf;

use gerrit_api::GerritClient;

use crate::config::{self, Credentials};
use crate::error::CliResult;
use crate::output::OutputFormat;
use crate::resolver::{ResolvedChange, resolve};

/// Everything a command needs: immutable credentials, one REST client, the
/// chosen output format and the invocation directory.
pub struct Context {
    pub creds: Credentials,
    pub client: GerritClient,
    pub format: OutputFormat,
    pub cwd: PathBuf,
}

impl Context {
    pub fn load(format: OutputFormat) -> CliResult<Self> {
        let creds = config::load()?;
        let client = GerritClient::new(&creds.host, &creds.username, &creds.password)?;
        Ok(Self {
            creds,
            client,
            format,
            cwd: std::env::current_dir()?,
        })
    }

    /// Resolve an optional change argument against the working tree.
    pub fn resolve_change(&self, raw: Option<&str>) -> CliResult<ResolvedChange> {
        resolve(raw, &self.cwd)
    }
}

/// Exit code for the ordinary success path.
pub const EXIT_OK: i32 = 0;
