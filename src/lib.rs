//! # ems-rs
//!
//! A client library and headless admin dashboard for the employee management REST API.
//!
//! The [`Client`] wraps the HTTP endpoints. The [`Dashboard`] drives the views on top of
//! it: a cached employee table with debounced search, a stats panel, an add/edit form
//! and CSV import/export. Views render to plain text, so any front end can sit on top.
//!
//! ```ignore
//! use std::sync::Arc;
//! use ems_rs::{Client, Config, Dashboard, Event};
//!
//! let config = Config::from_env()?;
//! let client = Arc::new(Client::new(&config)?);
//! let mut dashboard = Dashboard::new(client, |_: &str| true, &config);
//!
//! dashboard.handle(Event::Mount);
//! dashboard.settle().await;
//! println!("{}", dashboard.render());
//! ```
//!
//! ## Sentry Integration
//!
//! Errors capture a span trace where they are created. Enable the `sentry` feature to
//! turn them into breadcrumbs and extra context, and install `ErrorLayer` so the span
//! traces are populated:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .with(sentry::integrations::tracing::layer())
//!     .init();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod csv;
pub mod dashboard;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod form;
pub mod service;
pub mod stats;
pub mod table;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::Client;
pub use config::Config;
pub use dashboard::{Confirm, Dashboard, DashboardState, Event, Notice, NoticeLevel};
pub use endpoints::EmsEndpoint;
pub use entities::*;
pub use error::{Error, Result};
pub use service::EmployeeService;

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;
