use crate::core::order::MAX_UNITS;
use crate::domain::model::InterpretationResult;
use crate::domain::ports::TranscriptInterpreter;
use crate::utils::error::{KioskError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Serialize)]
struct InterpretRequest<'a> {
    text: &'a str,
}

/// Client for the remote interpretation service.
///
/// `POST {"text": ...}` and expects `{"order_items": {"<name>": <qty>, ...}}`.
pub struct HttpTranscriptInterpreter {
    client: Client,
    endpoint: String,
}

impl HttpTranscriptInterpreter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TranscriptInterpreter for HttpTranscriptInterpreter {
    async fn interpret(&self, transcript: &str) -> Result<InterpretationResult> {
        tracing::debug!("Making interpretation request to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&InterpretRequest { text: transcript })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Interpretation response status: {}", status);
        if !status.is_success() {
            return Err(KioskError::NetworkError {
                message: format!("interpretation service returned HTTP {}", status),
            });
        }

        let body = response.text().await?;
        let reply: Value = serde_json::from_str(&body)?;
        parse_reply(&reply)
    }
}

pub fn parse_reply(reply: &Value) -> Result<InterpretationResult> {
    let object = reply.as_object().ok_or_else(|| KioskError::ContractError {
        message: "reply is not a JSON object".to_string(),
    })?;

    if object.get("status").and_then(Value::as_str) == Some("error") {
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("service reported an error");
        return Err(KioskError::ContractError {
            message: message.to_string(),
        });
    }

    let items = object
        .get("order_items")
        .ok_or_else(|| KioskError::ContractError {
            message: "missing 'order_items'".to_string(),
        })?
        .as_object()
        .ok_or_else(|| KioskError::ContractError {
            message: "'order_items' is not an object".to_string(),
        })?;

    let mut order_items = Vec::with_capacity(items.len());
    for (name, quantity) in items {
        let quantity = quantity
            .as_u64()
            .filter(|q| *q > 0)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| KioskError::ContractError {
                message: format!("quantity for '{}' is not a positive integer: {}", name, quantity),
            })?;
        if quantity > MAX_UNITS {
            return Err(KioskError::ContractError {
                message: format!(
                    "quantity for '{}' exceeds {}: {}",
                    name, MAX_UNITS, quantity
                ),
            });
        }
        order_items.push((name.clone(), quantity));
    }

    Ok(InterpretationResult { order_items })
}
