//! Symptom Checker
//!
//! A server-rendered symptom-checker page. The user describes symptoms, an
//! external analysis service detects symptoms and scores potential
//! conditions, the user confirms follow-up symptoms, and a final analysis
//! adds condition details and recommendations.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server returning HTMX fragments
//! - **Checker**: per-session state machine driving two exchanges with the analysis service
//! - **UI**: `format!`-built HTML over pure view models
//!
//! # Modules
//!
//! - [`analysis`]: analysis service contract and HTTP client
//! - [`checker`]: the controller behind every checker action
//! - [`session`]: session state, transitions and storage
//! - [`view`]: analysis → display transforms
//! - [`ui`]: HTML rendering
//! - [`server`]: router and handlers
//! - [`config`]: layered configuration
//!
//! # Static assets
//!
//! The page needs htmx to do anything beyond the first render. It is served
//! from `{server.static_dir}/vendor/htmx-2.0.8.min.js` (see
//! [`ui::page::HTMX_ASSET`]) and is not shipped with the crate: download
//! htmx 2.0.8 into that path before starting the server. A warning is logged
//! at startup when the file is missing.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::unused_async)]
#![allow(clippy::cast_possible_truncation)]

pub mod analysis;
pub mod checker;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod ui;
pub mod view;

use crate::checker::SymptomChecker;
use crate::config::AppConfig;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Controller owning the session store and the analysis client.
    pub checker: SymptomChecker,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
