//! The symptom-checker controller.
//!
//! Drives the two exchanges with the analysis service over a session. A
//! session's state lock is held for the whole exchange and its state is only
//! written after a successful response, so failures leave it untouched.

use std::sync::Arc;
use std::time::Instant;

use crate::analysis::{AnalysisOutcome, AnalysisResult, AnalysisService};
use crate::error::{CheckerError, Exchange, Result};
use crate::session::{ClientSession, Phase, SessionHandle, SessionStore};
use crate::view::{self, FinalView, InitialView, QuestionItem, RecommendationsView, SessionView};

/// Controller shared by all request handlers.
#[derive(Debug, Clone)]
pub struct SymptomChecker {
    service: Arc<dyn AnalysisService>,
    sessions: SessionStore,
}

impl SymptomChecker {
    #[must_use]
    pub fn new(service: Arc<dyn AnalysisService>, sessions: SessionStore) -> Self {
        Self { service, sessions }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Look up the caller's session, creating one if needed.
    #[must_use]
    pub fn session(&self, id: Option<&str>) -> SessionHandle {
        self.sessions.resolve(id)
    }

    /// Look up a session the page already holds, without creating one.
    pub fn existing_session(&self, id: Option<&str>) -> Result<SessionHandle> {
        id.and_then(|id| self.sessions.get(id))
            .ok_or(CheckerError::SessionExpired)
    }

    /// Run the initial analysis for `free_text`.
    ///
    /// Blank input fails validation without contacting the service.
    pub async fn submit_symptoms(
        &self,
        session: &SessionHandle,
        free_text: &str,
    ) -> Result<InitialView> {
        let request = ClientSession::prepare_analysis(free_text)?;
        let mut state = session.try_lock()?;

        tracing::debug!(
            session_id = %session.id(),
            symptoms = %request.symptoms,
            "Submitting symptoms"
        );
        let started = Instant::now();
        let outcome = self
            .service
            .analyze(&request)
            .await
            .map_err(|e| CheckerError::transport(Exchange::Initial, e));
        let analysis = Self::accept(session, Exchange::Initial, outcome)?;

        tracing::info!(
            name: "checker.analysis.completed",
            session_id = %session.id(),
            detected = analysis.detected_symptoms.len(),
            conditions = analysis.potential_conditions.len(),
            questions = analysis.follow_up_questions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Initial analysis completed"
        );

        // A fresh analysis starts with every question unchecked.
        let view = view::initial_view(&analysis, &[]);
        state.apply_analysis(analysis);
        Ok(view)
    }

    /// Flip follow-up question `index`; returns the updated checkboxes.
    pub async fn toggle_follow_up_question(
        &self,
        session: &SessionHandle,
        index: usize,
    ) -> Result<Vec<QuestionItem>> {
        let mut state = session.try_lock()?;
        state.toggle_follow_up_question(index)?;

        tracing::debug!(
            session_id = %session.id(),
            index,
            selected = state.selected_follow_up_symptoms().len(),
            "Follow-up question toggled"
        );

        Ok(state
            .current_analysis()
            .map(|analysis| view::question_items(analysis, state.checked()))
            .unwrap_or_default())
    }

    /// Run the final analysis over the detected and selected symptoms.
    pub async fn submit_final_analysis(&self, session: &SessionHandle) -> Result<FinalView> {
        let mut state = session.try_lock()?;
        let request = state.prepare_final_analysis()?;

        let started = Instant::now();
        let outcome = self
            .service
            .final_analysis(&request)
            .await
            .map_err(|e| CheckerError::transport(Exchange::Final, e));
        let analysis = Self::accept(session, Exchange::Final, outcome)?;

        tracing::info!(
            name: "checker.final_analysis.completed",
            session_id = %session.id(),
            initial = request.initial_symptoms.len(),
            follow_up = request.follow_up_symptoms.len(),
            conditions = analysis.potential_conditions.len(),
            has_recommendations = analysis.recommendations.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Final analysis completed"
        );

        let view = view::final_view(&analysis, state.selected_follow_up_symptoms());
        state.apply_final_analysis(analysis);
        Ok(view)
    }

    /// Recommendations of the session's final analysis, if it has one.
    pub async fn recommendations(&self, session: &SessionHandle) -> Option<RecommendationsView> {
        session
            .snapshot()
            .await
            .final_analysis()
            .map(view::recommendations_view)
    }

    /// Checkboxes as the session holds them; `None` outside `InitialResultsShown`.
    ///
    /// Waits for any in-flight request on the session to finish.
    pub async fn follow_up_questions(&self, session: &SessionHandle) -> Option<Vec<QuestionItem>> {
        let view = self.current_view(session).await;
        match view.phase {
            Phase::InitialResultsShown => view.initial.map(|initial| initial.questions),
            Phase::Idle | Phase::FinalResultsShown => None,
        }
    }

    /// Everything the page currently shows for the session.
    pub async fn current_view(&self, session: &SessionHandle) -> SessionView {
        view::session_view(&session.snapshot().await)
    }

    /// Clear the session back to `Idle`. Never fails.
    ///
    /// If a request is still in flight the session is swapped for a fresh one
    /// under the same ID and the in-flight result is dropped with the old state.
    pub fn reset(&self, session: &SessionHandle) -> SessionHandle {
        if let Ok(mut state) = session.try_lock() {
            state.reset();
            tracing::info!(
                name: "checker.session.reset",
                session_id = %session.id(),
                age_secs = session.age().as_secs(),
                "Session reset"
            );
            return session.clone();
        }

        tracing::info!(
            name: "checker.session.replaced",
            session_id = %session.id(),
            "Session reset while a request was in flight; replacing it"
        );
        self.sessions.replace(session.id())
    }

    fn accept(
        session: &SessionHandle,
        exchange: Exchange,
        outcome: Result<AnalysisOutcome>,
    ) -> Result<AnalysisResult> {
        match outcome {
            Ok(AnalysisOutcome::Success(analysis)) => Ok(analysis),
            Ok(AnalysisOutcome::Failure { status }) => {
                tracing::warn!(
                    session_id = %session.id(),
                    exchange = %exchange,
                    status = %status,
                    "Analysis service reported failure"
                );
                Err(CheckerError::Service { exchange, status })
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session.id(),
                    exchange = %exchange,
                    error = %e,
                    "Analysis request failed"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalyzeRequest, FinalAnalysisRequest, Recommendations};
    use crate::error::{TransportError, ValidationError};
    use async_trait::async_trait;
    use indexmap::IndexMap;
    use std::sync::Mutex;

    /// Records requests and answers from a fixed script.
    #[derive(Debug, Default)]
    struct ScriptedService {
        initial: Mutex<Vec<AnalyzeRequest>>,
        finals: Mutex<Vec<FinalAnalysisRequest>>,
        status: Option<String>,
        fail_transport: bool,
    }

    impl ScriptedService {
        fn answer(&self) -> std::result::Result<AnalysisOutcome, TransportError> {
            if self.fail_transport {
                return Err(TransportError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            match &self.status {
                Some(status) => Ok(AnalysisOutcome::Failure {
                    status: status.clone(),
                }),
                None => Ok(AnalysisOutcome::Success(flu_analysis())),
            }
        }

        fn calls(&self) -> usize {
            self.initial.lock().unwrap().len() + self.finals.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AnalysisService for ScriptedService {
        async fn analyze(
            &self,
            request: &AnalyzeRequest,
        ) -> std::result::Result<AnalysisOutcome, TransportError> {
            self.initial.lock().unwrap().push(request.clone());
            self.answer()
        }

        async fn final_analysis(
            &self,
            request: &FinalAnalysisRequest,
        ) -> std::result::Result<AnalysisOutcome, TransportError> {
            self.finals.lock().unwrap().push(request.clone());
            let mut outcome = self.answer()?;
            if let AnalysisOutcome::Success(analysis) = &mut outcome {
                analysis.recommendations = Some(Recommendations {
                    specific_recommendations: vec!["Rest".into()],
                    health_tips: vec![],
                    motivational_message: "Feel better".into(),
                });
            }
            Ok(outcome)
        }
    }

    fn flu_analysis() -> AnalysisResult {
        AnalysisResult {
            detected_symptoms: vec!["headache".into(), "fever".into()],
            potential_conditions: IndexMap::from([("flu".to_string(), 0.72)]),
            follow_up_questions: vec!["Do you have chills?".into()],
            ..Default::default()
        }
    }

    fn checker(service: ScriptedService) -> (SymptomChecker, Arc<ScriptedService>) {
        let service = Arc::new(service);
        let checker = SymptomChecker::new(service.clone(), SessionStore::new());
        (checker, service)
    }

    #[tokio::test]
    async fn test_blank_symptoms_never_reach_service() {
        let (checker, service) = checker(ScriptedService::default());
        let session = checker.session(None);

        let err = checker.submit_symptoms(&session, "  \t").await.unwrap_err();
        assert!(matches!(
            err,
            CheckerError::Validation(ValidationError::EmptySymptoms)
        ));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_flow() {
        let (checker, service) = checker(ScriptedService::default());
        let session = checker.session(None);

        let initial = checker
            .submit_symptoms(&session, "headache, fever")
            .await
            .unwrap();
        assert_eq!(initial.condition_tags[0].label(), "flu (72.0%)");
        assert_eq!(initial.questions.len(), 1);

        let questions = checker.toggle_follow_up_question(&session, 0).await.unwrap();
        assert!(questions[0].checked);

        let fin = checker.submit_final_analysis(&session).await.unwrap();
        assert_eq!(fin.cards[0].heading(), "FLU (72.0% Risk)");

        let sent = service.finals.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![FinalAnalysisRequest {
                initial_symptoms: vec!["headache".into(), "fever".into()],
                follow_up_symptoms: vec!["Do you have chills?".into()],
            }]
        );

        let recs = checker.recommendations(&session).await.unwrap();
        assert_eq!(recs.specific_recommendations, vec!["Rest"]);
        assert_eq!(checker.current_view(&session).await.phase, Phase::FinalResultsShown);
    }

    #[tokio::test]
    async fn test_final_without_selection_never_reaches_service() {
        let (checker, service) = checker(ScriptedService::default());
        let session = checker.session(None);
        checker.submit_symptoms(&session, "fever").await.unwrap();

        let err = checker.submit_final_analysis(&session).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.finals.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_state() {
        let (checker, _service) = checker(ScriptedService {
            fail_transport: true,
            ..Default::default()
        });
        let session = checker.session(None);

        let err = checker.submit_symptoms(&session, "fever").await.unwrap_err();
        assert_eq!(err.user_message(), "An error occurred while analyzing symptoms");
        assert_eq!(session.snapshot().await, ClientSession::new());
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let (checker, _service) = checker(ScriptedService {
            status: Some("error".into()),
            ..Default::default()
        });
        let session = checker.session(None);

        let err = checker.submit_symptoms(&session, "fever").await.unwrap_err();
        assert!(matches!(
            err,
            CheckerError::Service { exchange: Exchange::Initial, ref status } if status == "error"
        ));
        assert_eq!(checker.current_view(&session).await.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_busy_session_rejects_second_request() {
        let (checker, service) = checker(ScriptedService::default());
        let session = checker.session(None);

        let _in_flight = session.try_lock().unwrap();
        let err = checker.submit_symptoms(&session, "fever").await.unwrap_err();
        assert!(matches!(err, CheckerError::Busy));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_reset_always_succeeds() {
        let (checker, _service) = checker(ScriptedService::default());
        let session = checker.session(None);
        checker.submit_symptoms(&session, "fever").await.unwrap();

        let after = checker.reset(&session);
        assert_eq!(after.id(), session.id());
        assert_eq!(after.snapshot().await, ClientSession::new());

        checker.submit_symptoms(&session, "fever").await.unwrap();
        let guard = session.try_lock().unwrap();
        let replaced = checker.reset(&session);
        drop(guard);
        assert_eq!(replaced.id(), session.id());
        assert_eq!(replaced.snapshot().await.phase(), Phase::Idle);
        assert_eq!(session.snapshot().await.phase(), Phase::InitialResultsShown);
    }

    #[tokio::test]
    async fn test_existing_session_never_creates_one() {
        let (checker, _service) = checker(ScriptedService::default());
        let session = checker.session(None);

        let found = checker.existing_session(Some(session.id())).unwrap();
        assert_eq!(found.id(), session.id());
        assert!(matches!(
            checker.existing_session(Some("expired-id")),
            Err(CheckerError::SessionExpired)
        ));
        assert!(matches!(
            checker.existing_session(None),
            Err(CheckerError::SessionExpired)
        ));
        assert_eq!(checker.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_questions_reflect_stored_state() {
        let (checker, _service) = checker(ScriptedService::default());
        let session = checker.session(None);
        assert!(checker.follow_up_questions(&session).await.is_none());

        checker.submit_symptoms(&session, "fever").await.unwrap();
        checker.toggle_follow_up_question(&session, 0).await.unwrap();
        let questions = checker.follow_up_questions(&session).await.unwrap();
        assert!(questions[0].checked);

        checker.submit_final_analysis(&session).await.unwrap();
        assert!(checker.follow_up_questions(&session).await.is_none());
    }
}
