//! View models derived from analyses.
//!
//! Everything here is a pure transform from session data to display data.
//! HTML lives in [`crate::ui`].

use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::session::{ClientSession, Phase};

/// Shown when a condition has no description.
pub const NO_DESCRIPTION: &str = "No description available";
/// Shown when a condition has no severity.
pub const UNKNOWN_SEVERITY: &str = "Unknown";

/// Format a `[0, 1]` score as a percentage with one decimal, without the `%`.
///
/// Exact ties round half to even, so `0.3125` gives `"31.2"` where a browser's
/// `toFixed(1)` would show `"31.3"`. Non-tie values round to nearest.
///
/// ```rust
/// assert_eq!(symptom_checker::view::format_percent(0.72), "72.0");
/// assert_eq!(symptom_checker::view::format_percent(0.3333), "33.3");
/// assert_eq!(symptom_checker::view::format_percent(0.3125), "31.2");
/// ```
#[must_use]
pub fn format_percent(score: f64) -> String {
    format!("{:.1}", score * 100.0)
}

/// Coarse risk bucket for a condition score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Above 0.7 is high, above 0.4 medium, anything else low.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Self::High
        } else if score > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low risk",
            Self::Medium => "Medium risk",
            Self::High => "High risk",
        }
    }
}

/// A condition tag in the initial results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionTag {
    pub name: String,
    pub percent: String,
}

impl ConditionTag {
    /// `"<name> (<pct>%)"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({}%)", self.name, self.percent)
    }
}

/// One follow-up checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionItem {
    pub index: usize,
    pub text: String,
    pub checked: bool,
}

/// Panels shown after the initial analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialView {
    pub symptom_tags: Vec<String>,
    pub condition_tags: Vec<ConditionTag>,
    pub questions: Vec<QuestionItem>,
}

/// Detail card for one condition in the final results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionCard {
    /// Condition name, upper-cased.
    pub title: String,
    pub percent: String,
    pub risk: RiskLevel,
    pub description: String,
    /// Comma-joined.
    pub common_causes: String,
    /// Comma-joined.
    pub risk_factors: String,
    pub severity: String,
}

impl ConditionCard {
    /// `"<NAME> (<pct>% Risk)"`.
    #[must_use]
    pub fn heading(&self) -> String {
        format!("{} ({}% Risk)", self.title, self.percent)
    }
}

/// Panels shown after the final analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalView {
    pub symptom_tags: Vec<String>,
    pub cards: Vec<ConditionCard>,
}

/// Recommendations block, revealed after the final results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RecommendationsView {
    pub specific_recommendations: Vec<String>,
    pub health_tips: Vec<String>,
    pub motivational_message: String,
}

/// Everything the page shows for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub initial: Option<InitialView>,
    pub final_results: Option<FinalView>,
}

/// Condition tags in service order.
#[must_use]
pub fn condition_tags(analysis: &AnalysisResult) -> Vec<ConditionTag> {
    analysis
        .potential_conditions
        .iter()
        .map(|(name, score)| ConditionTag {
            name: name.clone(),
            percent: format_percent(*score),
        })
        .collect()
}

/// Follow-up checkboxes; questions beyond `checked` render unchecked.
#[must_use]
pub fn question_items(analysis: &AnalysisResult, checked: &[bool]) -> Vec<QuestionItem> {
    analysis
        .follow_up_questions
        .iter()
        .enumerate()
        .map(|(index, text)| QuestionItem {
            index,
            text: text.clone(),
            checked: checked.get(index).copied().unwrap_or(false),
        })
        .collect()
}

#[must_use]
pub fn initial_view(analysis: &AnalysisResult, checked: &[bool]) -> InitialView {
    InitialView {
        symptom_tags: analysis.detected_symptoms.clone(),
        condition_tags: condition_tags(analysis),
        questions: question_items(analysis, checked),
    }
}

/// Final results: the final analysis' detected symptoms followed by the
/// selected follow-ups (duplicates kept), and one card per condition.
#[must_use]
pub fn final_view(analysis: &AnalysisResult, selected: &[String]) -> FinalView {
    let symptom_tags = analysis
        .detected_symptoms
        .iter()
        .chain(selected)
        .cloned()
        .collect();

    let cards = analysis
        .potential_conditions
        .iter()
        .map(|(name, score)| {
            let details = analysis.details_for(name);
            ConditionCard {
                title: name.to_uppercase(),
                percent: format_percent(*score),
                risk: RiskLevel::from_score(*score),
                description: details
                    .and_then(|d| d.description.clone())
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                common_causes: details
                    .and_then(|d| d.common_causes.as_deref())
                    .unwrap_or_default()
                    .join(", "),
                risk_factors: details
                    .and_then(|d| d.risk_factors.as_deref())
                    .unwrap_or_default()
                    .join(", "),
                severity: details
                    .and_then(|d| d.severity.clone())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| UNKNOWN_SEVERITY.to_string()),
            }
        })
        .collect();

    FinalView {
        symptom_tags,
        cards,
    }
}

/// Each subsection is empty when the service sent no recommendations.
#[must_use]
pub fn recommendations_view(analysis: &AnalysisResult) -> RecommendationsView {
    analysis
        .recommendations
        .as_ref()
        .map(|r| RecommendationsView {
            specific_recommendations: r.specific_recommendations.clone(),
            health_tips: r.health_tips.clone(),
            motivational_message: r.motivational_message.clone(),
        })
        .unwrap_or_default()
}

#[must_use]
pub fn session_view(session: &ClientSession) -> SessionView {
    let initial = session
        .current_analysis()
        .map(|analysis| initial_view(analysis, session.checked()));
    let final_results = session
        .final_analysis()
        .map(|analysis| final_view(analysis, session.selected_follow_up_symptoms()));

    SessionView {
        phase: session.phase(),
        initial,
        final_results,
    }
}
