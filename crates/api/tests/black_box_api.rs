use reqwest::StatusCode;
use serde_json::json;

use upkeep_ai::{
    ClassificationCapability, ClassificationError, ClassificationSignal, ModelDescriptor, RuleTable,
    TableAnswer, UnavailableClassifier,
};
use upkeep_api::app::{AppServices, build_app};
use upkeep_infra::ai::ClassifierWorker;

/// Deterministic model: fixed label/confidence, fixed table answer.
struct StubModel {
    label: &'static str,
    confidence: f64,
    answer: &'static str,
}

impl ClassificationCapability for StubModel {
    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new("stub").with_revision("test")
    }

    fn classify(&self, _text: &str) -> Result<ClassificationSignal, ClassificationError> {
        Ok(ClassificationSignal::new(self.label, self.confidence))
    }

    fn answer_over_table(
        &self,
        _table: &RuleTable,
        _query: &str,
    ) -> Result<TableAnswer, ClassificationError> {
        Ok(TableAnswer::new(self.answer))
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn<C, F>(factory: F) -> Self
    where
        F: FnOnce() -> Result<C, ClassificationError> + Send + 'static,
        C: ClassificationCapability + 'static,
    {
        // Same router as prod, bound to an ephemeral port.
        let services = AppServices::with_capability(&ClassifierWorker::default(), factory)
            .expect("failed to start classifier worker");
        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn with_stub(label: &'static str, confidence: f64, answer: &'static str) -> Self {
        Self::spawn(move || {
            Ok(StubModel {
                label,
                confidence,
                answer,
            })
        })
        .await
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn scenario_a() -> serde_json::Value {
    json!({
        "asset_id": "EST-001",
        "lastMaintenance": "2024-01-10",
        "now": "2025-02-01",
        "rules": [
            {
                "rule_id": "R_TRIM",
                "frequency": { "value": 3, "unit": "months" },
                "description": "Quarterly check"
            },
            { "rule_id": "R_ANNUAL", "frequency_value": 12, "frequency_unit": "months" }
        ]
    })
}

#[tokio::test]
async fn health_reports_model_and_cadence() {
    let srv = TestServer::with_stub("NEGATIVE", 0.9, "").await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-evaluation-id"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"]["name"], "stub");
    assert_eq!(body["cadence"]["ruleCheckSecs"], 86_400);
    assert_eq!(body["cadence"]["predictiveCheckSecs"], 259_200);
}

#[tokio::test]
async fn rule_check_scenario_a_with_corroboration() {
    let srv = TestServer::with_stub("NEGATIVE", 0.9, "R_ANNUAL").await;

    let res = srv.post("/rule-check", scenario_a()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["x-evaluation-id"].to_str().unwrap().len(),
        36
    );

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "shouldCreateEvent": true,
            "reason": "multiple_rules_due",
            "explanation": "2 rules are due",
            "suggestedWindowDays": 7,
            "dueRuleIds": ["R_TRIM", "R_ANNUAL"],
            "corroboratedRuleId": "R_ANNUAL"
        })
    );
}

#[tokio::test]
async fn rule_check_ignores_an_advisor_that_disagrees() {
    let srv = TestServer::with_stub("NEGATIVE", 0.9, "R_UNKNOWN").await;

    let body: serde_json::Value = srv.post("/rule-check", scenario_a()).await.json().await.unwrap();
    assert_eq!(body["dueRuleIds"], json!(["R_TRIM", "R_ANNUAL"]));
    assert!(body.get("corroboratedRuleId").is_none());
}

#[tokio::test]
async fn rule_check_degrades_on_incomplete_input() {
    let srv = TestServer::with_stub("NEGATIVE", 0.9, "").await;

    let body: serde_json::Value = srv
        .post(
            "/rule-check",
            json!({ "asset_id": "EST-001", "lastMaintenance": "2024-01-10", "rules": [] }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "shouldCreateEvent": false }));

    let res = srv
        .post(
            "/rule-check",
            json!({
                "asset_id": "EST-001",
                "now": "2025-02-01",
                "rules": [{ "rule_id": "R_TRIM", "frequency": { "value": 3, "unit": "months" } }]
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["shouldCreateEvent"], false);
    assert_eq!(body["reason"], "missing_last_maintenance");
}

#[tokio::test]
async fn predictive_check_scenario_b() {
    let srv = TestServer::with_stub("NEGATIVE", 0.82, "").await;

    let res = srv
        .post(
            "/predictive-check",
            json!({
                "asset_id": "EST-001",
                "history": ["pressure drop", { "type": "inspection" }],
                "metadata": { "site": "B2" },
                "now": "2025-02-01T00:00:00Z"
            }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["shouldCreateEvent"], true);
    assert_eq!(body["riskScore"], 0.82);
    assert_eq!(body["confidence"], 0.82);
    assert_eq!(body["riskLevel"], "HIGH");
    assert_eq!(body["suggestedWindowDays"], 7);
    assert_eq!(body["suggestedDate"], "2025-02-08T00:00:00Z");
}

#[tokio::test]
async fn predictive_check_scenario_c() {
    let srv = TestServer::with_stub("POSITIVE", 0.6, "").await;

    let body: serde_json::Value = srv
        .post("/predictive-check", json!({ "asset_id": "EST-001", "history": [], "metadata": {} }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["shouldCreateEvent"], false);
    assert_eq!(body["riskScore"], 0.4);
    assert_eq!(body["riskLevel"], "LOW");
    assert!(body.get("suggestedDate").is_none());
}

#[tokio::test]
async fn predictive_check_without_a_model_is_declined() {
    let srv = TestServer::spawn(|| Ok::<_, ClassificationError>(UnavailableClassifier)).await;

    let res = srv
        .post("/predictive-check", json!({ "asset_id": "EST-001", "history": ["leak"] }))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["shouldCreateEvent"], false);
    assert_eq!(body["reason"], "classification_unavailable");
    assert!(body.get("riskScore").is_none());
}

#[tokio::test]
async fn malformed_payloads_are_rejected() {
    let srv = TestServer::with_stub("NEGATIVE", 0.9, "").await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/rule-check", srv.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_payload");

    let res = srv
        .post("/predictive-check", json!({ "asset_id": "EST-001", "history": "not a list" }))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_asset_id_is_a_validation_error() {
    let srv = TestServer::with_stub("NEGATIVE", 0.9, "").await;

    let res = srv.post("/rule-check", json!({ "asset_id": " ", "rules": [] })).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn caller_supplied_evaluation_id_is_echoed() {
    let srv = TestServer::with_stub("NEGATIVE", 0.9, "").await;
    let id = "01890a5d-ac96-774b-bcce-b302099a8057";

    let res = reqwest::Client::new()
        .post(format!("{}/rule-check", srv.base_url))
        .header("x-evaluation-id", id)
        .json(&scenario_a())
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-evaluation-id"], id);
}
