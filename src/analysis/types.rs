//! Wire contract of the external analysis service.
//!
//! The service owns symptom extraction, condition scoring and recommendation
//! generation. The checker treats an [`AnalysisResult`] as opaque apart from
//! the fields it renders.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an explicit `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Free-text symptom description, exactly as the user typed it.
    pub symptoms: String,
}

/// Body of `POST /final_analysis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnalysisRequest {
    /// Symptoms detected by the initial analysis.
    pub initial_symptoms: Vec<String>,
    /// Follow-up questions the user confirmed, in question order.
    pub follow_up_symptoms: Vec<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Envelope wrapping every service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEnvelope {
    /// `"success"` or anything else.
    pub status: String,
    /// Present on success; may be missing on a logical failure.
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
}

impl ServiceEnvelope {
    /// Status value the service uses for a completed analysis.
    pub const SUCCESS: &'static str = "success";

    /// Whether the service reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

/// Result of an initial or final analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Symptoms extracted from the input, in detection order. Not deduplicated.
    pub detected_symptoms: Vec<String>,
    /// Condition name to risk score in `[0, 1]`, in the order the service sent them.
    pub potential_conditions: IndexMap<String, f64>,
    /// Clarifying questions offered as checkboxes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub follow_up_questions: Vec<String>,
    /// Descriptive detail per condition (final analysis only). A `null`
    /// entry is kept as `None` and rendered with placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_details: Option<IndexMap<String, Option<ConditionDetails>>>,
    /// Advice block (final analysis only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Recommendations>,
}

impl AnalysisResult {
    /// Details for `condition`, if the service supplied any.
    #[must_use]
    pub fn details_for(&self, condition: &str) -> Option<&ConditionDetails> {
        self.condition_details.as_ref()?.get(condition)?.as_ref()
    }
}

/// Descriptive information about one condition.
///
/// The service sends `{}` for conditions it knows nothing about, so every
/// field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionDetails {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub common_causes: Option<Vec<String>>,
    #[serde(default)]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Recommendations generated for a final analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default, deserialize_with = "null_as_default")]
    pub specific_recommendations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_tips: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub motivational_message: String,
}
