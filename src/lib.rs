//! Markdown documentation explorer.
//!
//! The library resolves URL-ish paths onto an in-memory file tree, drives the
//! explorer's navigation state, and serves a directory of markdown files over
//! HTTP. The `mdex` binary wraps the server and a few inspection commands.

pub mod core;
pub mod models;
pub mod pages;
pub mod server;
pub mod services;
pub mod ui;

pub use crate::core::config::{ExplorerConfig, ServerConfig};
pub use crate::core::errors::{Error, Result};
pub use crate::models::{FileNode, NodeKind};
