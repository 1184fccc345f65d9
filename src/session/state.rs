//! Session state and its transitions.

use std::fmt;

use serde::Serialize;

use crate::analysis::{AnalysisResult, AnalyzeRequest, FinalAnalysisRequest};
use crate::error::{CheckerError, ValidationError};

/// UI phase of a session.
///
/// `Idle` → `InitialResultsShown` → `FinalResultsShown` → (reset) → `Idle`.
/// A new initial analysis may start from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Only the symptom input is visible.
    Idle,
    /// Initial results and the follow-up panel are visible.
    InitialResultsShown,
    /// Initial and final results are visible; follow-up panel hidden.
    FinalResultsShown,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InitialResultsShown => "initial_results_shown",
            Self::FinalResultsShown => "final_results_shown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one checker page.
///
/// Invariant: `selected_follow_up_symptoms` is exactly the texts of the
/// checked questions of `current_analysis`, in question order. Replacing or
/// clearing the analysis clears the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSession {
    current_analysis: Option<AnalysisResult>,
    /// One flag per follow-up question of `current_analysis`.
    checked: Vec<bool>,
    selected_follow_up_symptoms: Vec<String>,
    final_analysis: Option<AnalysisResult>,
}

impl ClientSession {
    /// Empty session in the `Idle` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match (&self.current_analysis, &self.final_analysis) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::InitialResultsShown,
            (Some(_), Some(_)) => Phase::FinalResultsShown,
        }
    }

    #[must_use]
    pub fn current_analysis(&self) -> Option<&AnalysisResult> {
        self.current_analysis.as_ref()
    }

    #[must_use]
    pub fn final_analysis(&self) -> Option<&AnalysisResult> {
        self.final_analysis.as_ref()
    }

    #[must_use]
    pub fn selected_follow_up_symptoms(&self) -> &[String] {
        &self.selected_follow_up_symptoms
    }

    /// Checkbox state per follow-up question.
    #[must_use]
    pub fn checked(&self) -> &[bool] {
        &self.checked
    }

    /// Validate free text and build the `/analyze` request.
    ///
    /// Surrounding whitespace is stripped before sending.
    pub fn prepare_analysis(free_text: &str) -> Result<AnalyzeRequest, ValidationError> {
        let symptoms = free_text.trim();
        if symptoms.is_empty() {
            return Err(ValidationError::EmptySymptoms);
        }
        Ok(AnalyzeRequest {
            symptoms: symptoms.to_string(),
        })
    }

    /// Store a fresh initial analysis, discarding everything before it.
    pub fn apply_analysis(&mut self, analysis: AnalysisResult) {
        self.checked = vec![false; analysis.follow_up_questions.len()];
        self.selected_follow_up_symptoms.clear();
        self.final_analysis = None;
        self.current_analysis = Some(analysis);
    }

    /// Flip the checkbox at `index` and recompute the selection.
    pub fn toggle_follow_up_question(&mut self, index: usize) -> Result<(), CheckerError> {
        let phase = self.phase();
        if phase != Phase::InitialResultsShown {
            return Err(CheckerError::InvalidTransition {
                operation: "toggling a follow-up question",
                phase,
            });
        }
        let flag = self
            .checked
            .get_mut(index)
            .ok_or(ValidationError::UnknownQuestion { index })?;
        *flag = !*flag;
        self.recompute_selection();
        Ok(())
    }

    /// Validate the selection and build the `/final_analysis` request.
    pub fn prepare_final_analysis(&self) -> Result<FinalAnalysisRequest, CheckerError> {
        if self.selected_follow_up_symptoms.is_empty() {
            return Err(ValidationError::NoFollowUpSelected.into());
        }
        let phase = self.phase();
        let current = self
            .current_analysis
            .as_ref()
            .filter(|_| phase == Phase::InitialResultsShown)
            .ok_or(CheckerError::InvalidTransition {
                operation: "final analysis",
                phase,
            })?;
        Ok(FinalAnalysisRequest {
            initial_symptoms: current.detected_symptoms.clone(),
            follow_up_symptoms: self.selected_follow_up_symptoms.clone(),
        })
    }

    /// Store the final analysis; the selection is kept for display.
    pub fn apply_final_analysis(&mut self, analysis: AnalysisResult) {
        self.final_analysis = Some(analysis);
    }

    /// Return to the empty `Idle` state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn recompute_selection(&mut self) {
        let Some(current) = &self.current_analysis else {
            self.selected_follow_up_symptoms.clear();
            return;
        };
        self.selected_follow_up_symptoms = current
            .follow_up_questions
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(question, _)| question.clone())
            .collect();
    }
}
