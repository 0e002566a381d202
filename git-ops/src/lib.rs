//! Local VCS integration for the Gerrit client.
//!
//! Two layers, one discipline:
//! - read-only repository queries go through libgit2 in-process
//!   ([`repo`]);
//! - anything that mutates the tree or touches the network spawns `git`
//!   with an argv array and an explicit timeout ([`run`], [`ops`]).
//!
//! Every caller-influenced string is validated before it can reach an argv
//! array ([`validate`]); git's own error output is surfaced verbatim, never
//! wrapped or rewritten.

pub mod errors;
pub mod hook;
pub mod ident_util;
pub mod ops;
pub mod repo;
pub mod run;
pub mod validate;

pub use errors::{Error, GitResult};
pub use run::GitOutput;
