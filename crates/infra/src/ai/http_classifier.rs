use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::debug;

use upkeep_ai::{
    ClassificationCapability, ClassificationError, ClassificationSignal, ModelDescriptor, RuleTable,
    TableAnswer,
};

#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    /// Text-classification inference endpoint.
    pub classify_url: String,
    /// Table question-answering endpoint; without it the advisory step is unsupported.
    pub table_qa_url: Option<String>,
    /// Sent as a bearer token when present.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpClassifierConfig {
    pub fn new(classify_url: impl Into<String>) -> Self {
        Self {
            classify_url: classify_url.into(),
            table_qa_url: None,
            token: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Blocking client for hosted inference endpoints.
///
/// Must be built and used off the async runtime; the classifier worker thread
/// is the intended owner.
#[derive(Debug)]
pub struct HttpClassifier {
    client: Client,
    config: HttpClassifierConfig,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ClassificationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassificationError::Unavailable(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn post(&self, url: &str, body: &JsonValue) -> Result<JsonValue, ClassificationError> {
        let mut req = self.client.post(url).json(body);
        if let Some(token) = &self.config.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(ClassificationError::Inference(format!("{url} returned {status}: {text}")));
        }

        resp.json::<JsonValue>()
            .map_err(|e| ClassificationError::Inference(format!("unparsable response body: {e}")))
    }

    fn transport_error(&self, e: reqwest::Error) -> ClassificationError {
        if e.is_timeout() {
            ClassificationError::Timeout(self.config.timeout)
        } else {
            ClassificationError::Unavailable(e.to_string())
        }
    }
}

impl ClassificationCapability for HttpClassifier {
    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new(self.config.classify_url.clone())
    }

    fn classify(&self, text: &str) -> Result<ClassificationSignal, ClassificationError> {
        let body = self.post(&self.config.classify_url, &json!({ "inputs": text }))?;
        let signal = parse_classification(body)?;
        debug!(label = %signal.label, confidence = signal.confidence, "classification response");
        Ok(signal)
    }

    fn answer_over_table(
        &self,
        table: &RuleTable,
        query: &str,
    ) -> Result<TableAnswer, ClassificationError> {
        let Some(url) = self.config.table_qa_url.as_deref() else {
            return Err(ClassificationError::Unsupported("table question answering"));
        };

        let body = json!({
            "inputs": {
                "query": query,
                "table": table.to_column_map(),
            }
        });
        parse_table_answer(self.post(url, &body)?)
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Batched(Vec<Vec<LabelScore>>),
    List(Vec<LabelScore>),
    Single(LabelScore),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TableResponse {
    Single(TableAnswer),
    List(Vec<TableAnswer>),
}

/// Highest-scoring label of a classification response.
fn parse_classification(body: JsonValue) -> Result<ClassificationSignal, ClassificationError> {
    let response: ClassificationResponse = serde_json::from_value(body).map_err(|e| {
        ClassificationError::Inference(format!("unexpected classification shape: {e}"))
    })?;

    let candidates = match response {
        ClassificationResponse::Batched(batches) => batches.into_iter().flatten().collect(),
        ClassificationResponse::List(list) => list,
        ClassificationResponse::Single(one) => vec![one],
    };

    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|best| ClassificationSignal::new(best.label, best.score))
        .ok_or_else(|| ClassificationError::Inference("empty classification response".to_string()))
}

fn parse_table_answer(body: JsonValue) -> Result<TableAnswer, ClassificationError> {
    let response: TableResponse = serde_json::from_value(body).map_err(|e| {
        ClassificationError::Inference(format!("unexpected table answer shape: {e}"))
    })?;

    match response {
        TableResponse::Single(a) => Ok(a),
        TableResponse::List(list) => list
            .into_iter()
            .next()
            .ok_or_else(|| ClassificationError::Inference("empty table answer".to_string())),
    }
}
