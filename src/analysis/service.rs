//! Service trait and outcome type.

use async_trait::async_trait;

use super::types::{AnalysisResult, AnalyzeRequest, FinalAnalysisRequest, ServiceEnvelope};
use crate::error::TransportError;

/// Outcome of an exchange that reached the service and returned a valid envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// `status == "success"` with an analysis attached.
    Success(AnalysisResult),
    /// Any other status, or a success status with no analysis.
    Failure {
        /// Status string exactly as the service sent it.
        status: String,
    },
}

impl From<ServiceEnvelope> for AnalysisOutcome {
    fn from(envelope: ServiceEnvelope) -> Self {
        match envelope {
            ServiceEnvelope {
                status,
                analysis: Some(analysis),
            } if status == ServiceEnvelope::SUCCESS => Self::Success(analysis),
            ServiceEnvelope { status, .. } => Self::Failure { status },
        }
    }
}

/// The remote collaborator that turns symptoms into an analysis.
///
/// Implementors must not retry; a failed exchange is reported once.
#[async_trait]
pub trait AnalysisService: Send + Sync + std::fmt::Debug {
    /// `POST /analyze`.
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisOutcome, TransportError>;

    /// `POST /final_analysis`.
    async fn final_analysis(
        &self,
        request: &FinalAnalysisRequest,
    ) -> Result<AnalysisOutcome, TransportError>;
}
