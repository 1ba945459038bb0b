//! # Simulated Job Status Source
//!
//! An in-memory job that stays `pending` for a randomly drawn delay, then
//! latches to `completed` or `error`, plus the axum routes that expose it as
//! `GET /status`.
//!
//! ## Example
//!
//! ```ignore
//! use jobpoll_source::{server, SourceConfig, StatusSource};
//! use std::sync::Arc;
//!
//! let source = Arc::new(StatusSource::new(&SourceConfig::default())?);
//! let (addr, _handle) = server::spawn("127.0.0.1:0", source).await?;
//! println!("GET http://{addr}/status");
//! ```

pub mod server;
pub mod source;

pub use server::{routes, serve, spawn};
pub use source::{Resolution, SourceConfig, SourceError, StatusSource};
