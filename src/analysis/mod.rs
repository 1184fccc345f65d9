//! Access to the external analysis service.
//!
//! - [`types`]: request and response payloads
//! - [`service`]: the [`AnalysisService`] seam and its tagged outcome
//! - [`client`]: reqwest implementation used in production

pub mod client;
pub mod service;
pub mod types;

pub use client::HttpAnalysisClient;
pub use service::{AnalysisOutcome, AnalysisService};
pub use types::{
    AnalysisResult, AnalyzeRequest, ConditionDetails, FinalAnalysisRequest, Recommendations,
    ServiceEnvelope,
};
