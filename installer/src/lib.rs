//! loggar installer library.
//!
//! This crate provides the core functionality for selecting, downloading,
//! verifying and installing the prebuilt `loggar` binary. It is used by the
//! `loggar-installer` CLI binary and can be consumed programmatically for
//! testing or custom installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Architecture, digest and release table types, download
//!   and integrity verification
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Installer error taxonomy and exit codes
//! - [`list`] - The `list` command handler
//! - [`list_output`] - Output formatting for the release table
//! - [`manifest`] - TOML release manifest loading
//! - [`output`] - Progress lines, PATH snippets and dry-run summaries
//! - [`pipeline`] - Select, fetch, verify, install and self-test orchestration
//! - [`smoke`] - Post-install `version` smoke test
//! - [`stager`] - Atomic installation of the executable
//! - [`target`] - Install directory and executable name resolution
//! - [`verify_cmd`] - The `verify` command handler

pub mod artefact;
pub mod cli;
pub mod error;
pub mod list;
pub mod list_output;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod smoke;
pub mod stager;
pub mod target;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod verify_cmd;
