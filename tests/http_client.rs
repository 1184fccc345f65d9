use axum::{
    Json, Router,
    http::{StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use symptom_checker::analysis::{
    AnalysisOutcome, AnalysisService, AnalyzeRequest, FinalAnalysisRequest, HttpAnalysisClient,
};
use symptom_checker::error::TransportError;

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn flu_payload() -> Value {
    json!({
        "status": "success",
        "analysis": {
            "detected_symptoms": ["headache", "fever"],
            "potential_conditions": { "flu": 0.72 },
            "follow_up_questions": ["Do you have chills?"]
        }
    })
}

#[tokio::test]
async fn test_analyze_posts_symptoms() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let seen = received.clone();
    let app = Router::new().route(
        "/analyze",
        post(move |Json(body): Json<Value>| {
            let seen = seen.clone();
            async move {
                *seen.lock().unwrap() = Some(body);
                Json(flu_payload())
            }
        }),
    );
    let client = HttpAnalysisClient::new(spawn(app).await).unwrap();

    let outcome = client
        .analyze(&AnalyzeRequest {
            symptoms: "headache, fever".into(),
        })
        .await
        .unwrap();

    let AnalysisOutcome::Success(analysis) = outcome else {
        panic!("expected a successful analysis");
    };
    assert_eq!(analysis.detected_symptoms, vec!["headache", "fever"]);
    assert_eq!(analysis.potential_conditions["flu"], 0.72);
    assert_eq!(
        received.lock().unwrap().clone(),
        Some(json!({ "symptoms": "headache, fever" }))
    );
}

#[tokio::test]
async fn test_final_analysis_posts_both_lists() {
    let received = Arc::new(Mutex::new(None::<Value>));
    let seen = received.clone();
    let app = Router::new().route(
        "/final_analysis",
        post(move |Json(body): Json<Value>| {
            let seen = seen.clone();
            async move {
                *seen.lock().unwrap() = Some(body);
                Json(flu_payload())
            }
        }),
    );
    let client = HttpAnalysisClient::new(spawn(app).await).unwrap();

    client
        .final_analysis(&FinalAnalysisRequest {
            initial_symptoms: vec!["headache".into(), "fever".into()],
            follow_up_symptoms: vec!["Do you have chills?".into()],
        })
        .await
        .unwrap();

    assert_eq!(
        received.lock().unwrap().clone(),
        Some(json!({
            "initial_symptoms": ["headache", "fever"],
            "follow_up_symptoms": ["Do you have chills?"]
        }))
    );
}

#[tokio::test]
async fn test_condition_order_survives_the_client() {
    const BODY: &str = r#"{
        "status": "success",
        "analysis": {
            "detected_symptoms": ["headache"],
            "potential_conditions": { "migraine": 0.62, "flu": 0.81, "anxiety": 0.2 },
            "follow_up_questions": []
        }
    }"#;
    let app = Router::new().route(
        "/analyze",
        post(|| async { ([(header::CONTENT_TYPE, "application/json")], BODY) }),
    );
    let client = HttpAnalysisClient::new(spawn(app).await).unwrap();

    let outcome = client
        .analyze(&AnalyzeRequest {
            symptoms: "headache".into(),
        })
        .await
        .unwrap();

    let AnalysisOutcome::Success(analysis) = outcome else {
        panic!("expected a successful analysis");
    };
    let names: Vec<&str> = analysis.potential_conditions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["migraine", "flu", "anxiety"]);
}

#[tokio::test]
async fn test_null_sections_in_final_analysis() {
    const BODY: &str = r#"{
        "status": "success",
        "analysis": {
            "detected_symptoms": ["fever"],
            "potential_conditions": { "flu": 0.9 },
            "condition_details": { "flu": null },
            "recommendations": { "health_tips": null, "motivational_message": null }
        }
    }"#;
    let app = Router::new().route(
        "/final_analysis",
        post(|| async { ([(header::CONTENT_TYPE, "application/json")], BODY) }),
    );
    let client = HttpAnalysisClient::new(spawn(app).await).unwrap();

    let outcome = client
        .final_analysis(&FinalAnalysisRequest {
            initial_symptoms: vec!["fever".into()],
            follow_up_symptoms: vec!["Do you have chills?".into()],
        })
        .await
        .unwrap();

    let AnalysisOutcome::Success(analysis) = outcome else {
        panic!("expected a successful analysis");
    };
    assert!(analysis.details_for("flu").is_none());
    let recs = analysis.recommendations.unwrap();
    assert!(recs.health_tips.is_empty());
    assert!(recs.motivational_message.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_a_failure_outcome() {
    let app = Router::new().route(
        "/analyze",
        post(|| async { Json(json!({ "status": "error", "message": "model offline" })) }),
    );
    let client = HttpAnalysisClient::new(spawn(app).await).unwrap();

    let outcome = client
        .analyze(&AnalyzeRequest {
            symptoms: "fever".into(),
        })
        .await
        .unwrap();
    assert_eq!(
        outcome,
        AnalysisOutcome::Failure {
            status: "error".into()
        }
    );
}

#[tokio::test]
async fn test_http_error_status() {
    let app = Router::new().route(
        "/analyze",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "kaboom") }),
    );
    let client = HttpAnalysisClient::new(spawn(app).await).unwrap();

    let err = client
        .analyze(&AnalyzeRequest {
            symptoms: "fever".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransportError::Api { status: 500, ref message } if message == "kaboom"
    ));
}

#[tokio::test]
async fn test_malformed_json() {
    let app = Router::new().route("/analyze", post(|| async { "not json" }));
    let client = HttpAnalysisClient::new(spawn(app).await).unwrap();

    let err = client
        .analyze(&AnalyzeRequest {
            symptoms: "fever".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Json(_)));
}

#[tokio::test]
async fn test_timeout_when_configured() {
    let app = Router::new().route(
        "/analyze",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(flu_payload())
        }),
    );
    let client =
        HttpAnalysisClient::with_timeout(spawn(app).await, Duration::from_millis(100)).unwrap();

    let err = client
        .analyze(&AnalyzeRequest {
            symptoms: "fever".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Http(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpAnalysisClient::new(format!("http://{addr}")).unwrap();
    let err = client
        .analyze(&AnalyzeRequest {
            symptoms: "fever".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
}
