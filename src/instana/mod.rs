//! Instana API interaction module
//!
//! This module provides the REST plumbing used by the resource layer:
//! the authenticated HTTP client, URL building, the generic
//! get/upsert/delete resource and the wire types.
//!
//! # Module Structure
//!
//! - [`client`] - Main Instana client and per-type REST resources
//! - [`http`] - HTTP utilities for REST API calls
//! - [`rest`] - The get-one/upsert/delete contract
//! - [`model`] - Wire types
//! - [`error`] - REST error kinds
//!
//! # Example
//!
//! ```ignore
//! use crate::instana::client::InstanaApi;
//! use crate::instana::http::RetryPolicy;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let api = InstanaApi::new("tenant-unit.instana.io", "token", false, RetryPolicy::default())?;
//!     let channel = api.alerting_channels().get_one("ch-1").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod model;
pub mod rest;
