//! Stock analysis dashboard controller
//!
//! This crate drives a five-view dashboard on top of an external stock
//! analysis backend. It includes:
//!
//! - Input validation and request construction (`RequestBuilder`)
//! - Per-session collaborator handles, built once and then read-only
//! - Views for analysis, history, real-time quotes, the task queue and the
//!   system configuration
//! - Response formatting into a renderer-agnostic `Page` model
//! - Terminal, Markdown and JSON renderers
//! - HTTP collaborators for the backend REST API
//!
//! # Architecture
//!
//! A `Dashboard` owns one `Session` and routes navigation labels to views
//! through the `ViewRouter`. Each view render validates its input, makes at
//! most one collaborator call under the busy indicator and formats the
//! outcome. Collaborator failures become error pages; they never escape a
//! render.
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_dashboard::{Action, Dashboard, DashboardConfig, HttpServiceFactory};
//! use stock_dashboard::views::AnalysisForm;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let factory = Arc::new(HttpServiceFactory::new(DashboardConfig::from_env()?));
//!     let mut dashboard = Dashboard::new(factory);
//!
//!     let page = dashboard
//!         .dispatch(Action::SubmitAnalysis(AnalysisForm::new("600519")))
//!         .await;
//!     println!("{:?}", page.status);
//!
//!     Ok(())
//! }
//! ```

pub mod busy;
pub mod collaborators;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod formatter;
pub mod models;
pub mod page;
pub mod render;
pub mod request;
pub mod router;
pub mod session;
pub mod views;

// Re-export main types for convenience
pub use busy::{BusyGuard, BusyIndicator};
pub use collaborators::{HttpBackend, HttpServiceFactory, ServiceFactory};
pub use commands::Command;
pub use config::DashboardConfig;
pub use dashboard::{Action, Dashboard, Sidebar};
pub use error::{DashboardError, ErrorKind, Result};
pub use page::{Block, Page, PageStatus, Tone};
pub use render::{OutputFormat, Renderer, RendererFactory};
pub use request::RequestBuilder;
pub use router::{View, ViewRouter};
pub use session::Session;
