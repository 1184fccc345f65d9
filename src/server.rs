use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::analysis::{AnalysisService, HttpAnalysisClient};
use crate::checker::SymptomChecker;
use crate::config::AppConfig;
use crate::error::CheckerError;
use crate::session::{Phase, SessionStore};
use crate::ui::{page, panels};
use crate::view::SessionView;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let client = match config.analysis.timeout() {
        Some(timeout) => HttpAnalysisClient::with_timeout(&config.analysis.base_url, timeout)?,
        None => HttpAnalysisClient::new(&config.analysis.base_url)?,
    };

    info!(
        name: "analysis.config.loaded",
        base_url = %client.base_url(),
        timeout_secs = ?config.analysis.timeout_secs,
        "Analysis service configured"
    );

    let service: Arc<dyn AnalysisService> = Arc::new(client);
    let sessions = SessionStore::new();
    spawn_session_sweeper(sessions.clone(), &config);

    let state = AppState {
        checker: SymptomChecker::new(service, sessions),
        config: Arc::clone(&config),
    };

    let htmx = std::path::Path::new(&config.server.static_dir).join(page::HTMX_ASSET);
    if !htmx.exists() {
        tracing::warn!(
            name: "server.htmx.missing",
            path = %htmx.display(),
            "htmx bundle not found; the checker page will not be interactive"
        );
    }

    let app = router(state).nest_service("/static", ServeDir::new(&config.server.static_dir));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/checker/analyze", post(analyze_handler))
        .route("/checker/questions/{index}/toggle", post(toggle_handler))
        .route("/checker/final", post(final_handler))
        .route("/checker/recommendations", get(recommendations_handler))
        .route("/checker/reset", post(reset_handler))
        .route("/api/sessions/{id}", get(api_get_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop sessions idle past the configured timeout.
fn spawn_session_sweeper(sessions: SessionStore, config: &AppConfig) {
    let idle_timeout = config.sessions.idle_timeout();
    let mut interval = tokio::time::interval(config.sessions.sweep_interval());

    tokio::spawn(async move {
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired_with_timeout(idle_timeout);
            if removed > 0 {
                info!(
                    name: "sessions.expired",
                    removed,
                    remaining = sessions.len(),
                    "Expired idle sessions"
                );
            }
        }
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form fields shared by every checker action.
#[derive(Debug, Deserialize)]
struct SessionForm {
    /// Session ID from the page.
    #[serde(default)]
    session_id: Option<String>,
}

/// Form for `POST /checker/analyze`.
#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    #[serde(default)]
    session_id: Option<String>,
    /// Free-text symptoms.
    #[serde(default)]
    symptoms: String,
}

/// GET / - Page with a fresh, idle checker.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let session = state.checker.session(None);
    let view = state.checker.current_view(&session).await;
    let content = panels::checker(session.id(), &view, "", state.config.ui.reveal_delay_ms);
    Html(page::html_shell("Check your symptoms", &content))
}

/// POST /checker/analyze - Initial analysis; re-renders the whole checker.
async fn analyze_handler(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> Response {
    let session = state.checker.session(form.session_id.as_deref());

    match state.checker.submit_symptoms(&session, &form.symptoms).await {
        Ok(initial) => {
            let view = SessionView {
                phase: Phase::InitialResultsShown,
                initial: Some(initial),
                final_results: None,
            };
            Html(panels::checker(
                session.id(),
                &view,
                form.symptoms.trim(),
                state.config.ui.reveal_delay_ms,
            ))
            .into_response()
        }
        Err(e) => alert_response(session.id(), &e),
    }
}

/// POST /checker/questions/{index}/toggle - Flip one checkbox.
async fn toggle_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Form(form): Form<SessionForm>,
) -> Response {
    let session = match state.checker.existing_session(form.session_id.as_deref()) {
        Ok(session) => session,
        Err(e) => {
            let id = form.session_id.as_deref().unwrap_or_default();
            return alert_response_with(id, &e, &panels::follow_up(None, true));
        }
    };

    match state.checker.toggle_follow_up_question(&session, index).await {
        Ok(questions) => Html(format!(
            "{}{}",
            panels::follow_up(Some(&questions), false),
            panels::cleared_alert(true)
        ))
        .into_response(),
        Err(e) => {
            // The browser already flipped the checkbox; put back the stored state.
            let questions = state.checker.follow_up_questions(&session).await;
            alert_response_with(
                session.id(),
                &e,
                &panels::follow_up(questions.as_deref(), true),
            )
        }
    }
}

/// POST /checker/final - Final analysis; closes the follow-up panel.
async fn final_handler(State(state): State<AppState>, Form(form): Form<SessionForm>) -> Response {
    let session = match state.checker.existing_session(form.session_id.as_deref()) {
        Ok(session) => session,
        Err(e) => return alert_response(form.session_id.as_deref().unwrap_or_default(), &e),
    };

    match state.checker.submit_final_analysis(&session).await {
        Ok(view) => Html(format!(
            "{}{}{}",
            panels::final_results(
                session.id(),
                Some(&view),
                state.config.ui.reveal_delay_ms,
                false
            ),
            panels::follow_up(None, true),
            panels::cleared_alert(true)
        ))
        .into_response(),
        Err(e) => alert_response(session.id(), &e),
    }
}

/// GET /checker/recommendations - Deferred recommendations block.
async fn recommendations_handler(
    State(state): State<AppState>,
    Query(query): Query<SessionForm>,
) -> Html<String> {
    let session = query
        .session_id
        .as_deref()
        .and_then(|id| state.checker.sessions().get(id));

    let recommendations = match session {
        Some(session) => state.checker.recommendations(&session).await,
        None => None,
    };

    match recommendations {
        Some(view) => Html(panels::recommendations(&view)),
        None => Html(r#"<div id="recommendations"></div>"#.to_string()),
    }
}

/// POST /checker/reset - Back to an empty, idle checker.
async fn reset_handler(State(state): State<AppState>, Form(form): Form<SessionForm>) -> Html<String> {
    let session = state.checker.session(form.session_id.as_deref());
    let session = state.checker.reset(&session);
    let view = SessionView {
        phase: Phase::Idle,
        initial: None,
        final_results: None,
    };
    Html(panels::checker(
        session.id(),
        &view,
        "",
        state.config.ui.reveal_delay_ms,
    ))
}

/// Render an error as an alert that htmx swaps into `#alert`.
///
/// Returned with 200 so htmx performs the swap.
fn alert_response(session_id: &str, error: &CheckerError) -> Response {
    alert_response_with(session_id, error, "")
}

/// Alert response carrying extra out-of-band fragments.
fn alert_response_with(session_id: &str, error: &CheckerError, oob: &str) -> Response {
    if error.is_validation() {
        tracing::debug!(session_id = %session_id, error = %error, "Rejected checker input");
    } else {
        tracing::warn!(session_id = %session_id, error = %error, "Checker action failed");
    }

    (
        [("HX-Retarget", "#alert"), ("HX-Reswap", "outerHTML")],
        Html(format!("{}{oob}", panels::alert(&error.user_message()))),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Session info for inspection.
#[derive(Debug, Serialize)]
struct SessionInfo {
    id: String,
    phase: Phase,
    has_analysis: bool,
    selected_follow_up_symptoms: Vec<String>,
}

/// GET /api/sessions/{id} - Get session state.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionInfo>, StatusCode> {
    let session = state
        .checker
        .sessions()
        .get(&id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let snapshot = session.snapshot().await;

    Ok(Json(SessionInfo {
        id: session.id().to_string(),
        phase: snapshot.phase(),
        has_analysis: snapshot.current_analysis().is_some(),
        selected_follow_up_symptoms: snapshot.selected_follow_up_symptoms().to_vec(),
    }))
}
