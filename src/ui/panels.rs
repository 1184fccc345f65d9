//! Checker container and panels.
//!
//! Element IDs are stable; htmx targets them directly:
//! `#checker`, `#alert`, `#initial-results`, `#follow-up`, `#final-results`,
//! `#recommendations`.

use std::fmt::Write;

use super::markup::{self, BadgeVariant, ButtonVariant, escape};
use crate::view::{
    ConditionCard, FinalView, InitialView, QuestionItem, RecommendationsView, SessionView,
};

/// The whole checker, rendered from a session view.
///
/// `symptoms` pre-fills the input box.
#[must_use]
pub fn checker(session_id: &str, view: &SessionView, symptoms: &str, reveal_delay_ms: u64) -> String {
    let initial = view.initial.as_ref();
    // The follow-up panel closes once final results are shown.
    let follow_up_items = initial
        .filter(|_| view.final_results.is_none())
        .map(|initial| initial.questions.as_slice());

    format!(
        r##"<div id="checker" class="checker space-y-6" data-phase="{phase}">
    <form id="checker-form" hx-target="#checker" hx-swap="outerHTML" onsubmit="return false">
        <input type="hidden" name="session_id" value="{session_id}">
        {alert}
        <section id="symptom-input" class="panel">
            <h2>Describe your symptoms</h2>
            <textarea id="symptoms-input" name="symptoms" rows="3" placeholder="e.g. headache, fever, sore throat">{symptoms}</textarea>
            {analyze}
        </section>
        {initial}
        {follow_up}
        {final_results}
        <div class="actions">
            {reset}
        </div>
    </form>
</div>"##,
        phase = view.phase,
        session_id = escape(session_id),
        alert = cleared_alert(false),
        symptoms = escape(symptoms),
        analyze = markup::post_button("analyze-btn", ButtonVariant::Primary, "/checker/analyze", "Analyze Symptoms"),
        initial = initial_results(initial),
        follow_up = follow_up(follow_up_items, false),
        final_results = final_results(session_id, view.final_results.as_ref(), reveal_delay_ms, false),
        reset = markup::post_button("new-analysis-btn", ButtonVariant::Secondary, "/checker/reset", "New Analysis"),
    )
}

/// Detected symptoms and potential conditions; hidden when `None`.
#[must_use]
pub fn initial_results(view: Option<&InitialView>) -> String {
    let Some(view) = view else {
        return r#"<section id="initial-results" class="panel hidden"></section>"#.to_string();
    };

    let condition_labels: Vec<String> = view.condition_tags.iter().map(|t| t.label()).collect();
    format!(
        r#"<section id="initial-results" class="panel">
            <h3>Detected Symptoms</h3>
            <div id="detected-symptoms">{symptoms}</div>
            <h3>Potential Conditions</h3>
            <div id="potential-conditions">{conditions}</div>
        </section>"#,
        symptoms = markup::tags("symptom-tag", view.symptom_tags.iter().map(String::as_str)),
        conditions = markup::tags("condition-tag", condition_labels.iter().map(String::as_str)),
    )
}

/// Follow-up checkboxes plus the final-analysis button; hidden when `None`.
///
/// With `oob` set the panel carries `hx-swap-oob` so it can ride along with
/// another response.
#[must_use]
pub fn follow_up(questions: Option<&[QuestionItem]>, oob: bool) -> String {
    let oob_attr = if oob { r#" hx-swap-oob="true""# } else { "" };
    let Some(questions) = questions else {
        return format!(r#"<section id="follow-up" class="panel hidden"{oob_attr}></section>"#);
    };

    let items = questions.iter().fold(String::new(), |mut out, q| {
        let _ = write!(
            out,
            r##"<div class="question-item" data-index="{i}">
                <input type="checkbox" id="question-{i}"{checked} hx-post="/checker/questions/{i}/toggle" hx-trigger="change" hx-target="#follow-up" hx-swap="outerHTML">
                <label for="question-{i}">{text}</label>
            </div>"##,
            i = q.index,
            checked = if q.checked { " checked" } else { "" },
            text = escape(&q.text),
        );
        out
    });

    format!(
        r##"<section id="follow-up" class="panel"{oob_attr}>
            <h3>Do you have any of these symptoms?</h3>
            <div id="follow-up-questions">{items}</div>
            <button type="button" id="final-analysis-btn" class="h-10 px-4 rounded-xl text-sm font-medium {classes}" hx-post="/checker/final" hx-target="#final-results" hx-swap="outerHTML">Get Final Analysis</button>
        </section>"##,
        classes = ButtonVariant::Primary.classes(),
    )
}

/// Final symptoms, condition cards and the deferred recommendations slot.
#[must_use]
pub fn final_results(
    session_id: &str,
    view: Option<&FinalView>,
    reveal_delay_ms: u64,
    oob: bool,
) -> String {
    let oob_attr = if oob { r#" hx-swap-oob="true""# } else { "" };
    let Some(view) = view else {
        return format!(r#"<section id="final-results" class="panel hidden"{oob_attr}></section>"#);
    };

    let cards: String = view.cards.iter().map(condition_card).collect();
    format!(
        r#"<section id="final-results" class="panel"{oob_attr}>
            <h3>All Symptoms</h3>
            <div id="all-symptoms">{symptoms}</div>
            <h3>Detailed Analysis</h3>
            <div id="final-conditions">{cards}</div>
            <div id="recommendations" hx-get="/checker/recommendations?session_id={session_id}" hx-trigger="load delay:{reveal_delay_ms}ms" hx-target="this" hx-swap="outerHTML"></div>
        </section>"#,
        symptoms = markup::tags("symptom-tag", view.symptom_tags.iter().map(String::as_str)),
        session_id = escape(session_id),
    )
}

fn condition_card(card: &ConditionCard) -> String {
    format!(
        r#"<div class="condition-card">
                <h4>{heading} {badge}</h4>
                <p><strong>Description:</strong> {description}</p>
                <p><strong>Common Causes:</strong> {causes}</p>
                <p><strong>Risk Factors:</strong> {factors}</p>
                <p><strong>Severity:</strong> {severity}</p>
            </div>"#,
        heading = escape(&card.heading()),
        badge = markup::badge(BadgeVariant::from(card.risk), card.risk.label()),
        description = escape(&card.description),
        causes = escape(&card.common_causes),
        factors = escape(&card.risk_factors),
        severity = escape(&card.severity),
    )
}

/// Recommendations block with its entrance transition.
#[must_use]
pub fn recommendations(view: &RecommendationsView) -> String {
    format!(
        r#"<div id="recommendations" class="recommendations-container reveal">
            <div class="recommendations-section">
                <h3>Recommendations</h3>
                <ul class="recommendations-list">{specific}</ul>
            </div>
            <div class="health-tips-section">
                <h3>Health Tips</h3>
                <ul class="health-tips-list">{tips}</ul>
            </div>
            <div class="motivational-message">
                <h3>Message of Support</h3>
                <p>{message}</p>
            </div>
        </div>"#,
        specific = markup::list_items(&view.specific_recommendations),
        tips = markup::list_items(&view.health_tips),
        message = escape(&view.motivational_message),
    )
}

/// Blocking alert shown in place of `#alert`.
#[must_use]
pub fn alert(message: &str) -> String {
    format!(
        r#"<div id="alert" class="alert" role="alert">{}</div>"#,
        escape(message)
    )
}

/// Empty `#alert`, optionally as an out-of-band swap.
#[must_use]
pub fn cleared_alert(oob: bool) -> String {
    if oob {
        r#"<div id="alert" class="alert hidden" hx-swap-oob="true"></div>"#.to_string()
    } else {
        r#"<div id="alert" class="alert hidden"></div>"#.to_string()
    }
}
