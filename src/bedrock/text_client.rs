use super::transport::ModelTransport;
use crate::{
    error::{PoetError, Result},
    models::{
        Ai21Response, Category, ClaudeMessageResponse, CohereResponse, ImageDescription,
        Language, LlamaResponse, MistralResponse, ModelProvider, TitanTextResponse,
    },
    pipeline::PoemComposer,
    prompts::compose_poem_prompt,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

/// Writes poems with any Bedrock text model.
pub struct TextClient<T: ModelTransport> {
    transport: Arc<T>,
    model_id: String,
    provider: ModelProvider,
    max_tokens: i32,
    temperature: f32,
}

impl<T: ModelTransport> TextClient<T> {
    pub fn new(
        transport: Arc<T>,
        model_id: impl Into<String>,
        provider: ModelProvider,
        max_tokens: i32,
        temperature: f32,
    ) -> Self {
        Self {
            transport,
            model_id: model_id.into(),
            provider,
            max_tokens,
            temperature,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let payload =
            build_request_payload(self.provider, prompt, self.max_tokens, self.temperature);

        log::info!("Invoking text model: {}", self.model_id);
        let reply = self.transport.invoke(&self.model_id, &payload).await?;
        extract_text(self.provider, reply)
    }
}

#[async_trait]
impl<T: ModelTransport> PoemComposer for TextClient<T> {
    async fn compose_poem(
        &self,
        description: &ImageDescription,
        category: &Category,
        language: &Language,
    ) -> Result<String> {
        let prompt = compose_poem_prompt(description, category, language);
        let poem = self.generate(&prompt).await?;
        Ok(poem.trim().to_string())
    }
}

pub fn build_request_payload(
    provider: ModelProvider,
    prompt: &str,
    max_tokens: i32,
    temperature: f32,
) -> Value {
    match provider {
        ModelProvider::Amazon => json!({
            "inputText": prompt,
            "textGenerationConfig": {
                "maxTokenCount": max_tokens,
                "temperature": temperature,
                "topP": 0.9
            }
        }),
        ModelProvider::Anthropic => json!({
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
            "anthropic_version": "bedrock-2023-05-31"
        }),
        ModelProvider::Cohere => json!({
            "prompt": prompt,
            "max_tokens": max_tokens,
            "temperature": temperature,
            "p": 0.9
        }),
        ModelProvider::AI21 => json!({
            "prompt": prompt,
            "maxTokens": max_tokens,
            "temperature": temperature,
            "topP": 0.9
        }),
        ModelProvider::Meta => json!({
            "prompt": prompt,
            "max_gen_len": max_tokens,
            "temperature": temperature,
            "top_p": 0.9
        }),
        ModelProvider::Mistral => json!({
            "prompt": format!("<s>[INST] {} [/INST]", prompt),
            "max_tokens": max_tokens,
            "temperature": temperature,
            "top_p": 0.9
        }),
    }
}

/// Pulls the generated text out of a provider reply. A reply without the
/// expected field is malformed; an empty string is passed through.
pub fn extract_text(provider: ModelProvider, reply: Value) -> Result<String> {
    let text = match provider {
        ModelProvider::Amazon => parse::<TitanTextResponse>(provider, reply)?
            .results
            .into_iter()
            .next()
            .map(|r| r.output_text),
        ModelProvider::Anthropic => Some(parse::<ClaudeMessageResponse>(provider, reply)?.text()),
        ModelProvider::Cohere => parse::<CohereResponse>(provider, reply)?
            .generations
            .into_iter()
            .next()
            .map(|g| g.text),
        ModelProvider::AI21 => parse::<Ai21Response>(provider, reply)?
            .completions
            .into_iter()
            .next()
            .map(|c| c.data.text),
        ModelProvider::Meta => Some(parse::<LlamaResponse>(provider, reply)?.generation),
        ModelProvider::Mistral => parse::<MistralResponse>(provider, reply)?
            .outputs
            .into_iter()
            .next()
            .map(|o| o.text),
    };

    text.ok_or_else(|| {
        PoetError::MalformedResponse(format!("{} reply contains no output", provider.as_str()))
    })
}

fn parse<R: DeserializeOwned>(provider: ModelProvider, reply: Value) -> Result<R> {
    serde_json::from_value(reply).map_err(|e| {
        PoetError::MalformedResponse(format!("Unexpected {} reply: {}", provider.as_str(), e))
    })
}
