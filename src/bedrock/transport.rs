use crate::error::{PoetError, Result};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::Value;

/// Sends one JSON request body to a hosted model and returns its JSON reply.
///
/// The stage clients only build payloads and read replies; everything that
/// touches the network sits behind this trait so it can be swapped in tests.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn invoke(&self, model_id: &str, payload: &Value) -> Result<Value>;
}

#[derive(Clone)]
pub struct BedrockTransport {
    client: Client,
}

impl BedrockTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelTransport for BedrockTransport {
    async fn invoke(&self, model_id: &str, payload: &Value) -> Result<Value> {
        let request_json = serde_json::to_vec(payload)
            .map_err(|e| PoetError::SerializationError(e.to_string()))?;

        log::debug!(
            "Invoking model {} ({} byte payload)",
            model_id,
            request_json.len()
        );

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json))
            .send()
            .await
            .map_err(|e| {
                log::error!("Bedrock invocation of {} failed: {:?}", model_id, e);

                if let Some(service_error) = e.as_service_error() {
                    PoetError::TransportError(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    PoetError::TransportError(format!("AWS SDK error: {}", e))
                }
            })?;

        let response_bytes = response.body.into_inner();
        serde_json::from_slice(&response_bytes).map_err(|e| {
            PoetError::MalformedResponse(format!("Model reply is not valid JSON: {}", e))
        })
    }
}
