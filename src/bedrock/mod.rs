pub mod text_client;
pub mod transport;
pub mod vision_client;

use crate::{
    config::PoetConfig,
    error::Result,
    models::{text_models, vision_models, ModelInfo},
    pipeline::PoemPipeline,
};
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::{
    config::{Credentials, Region},
    Client,
};
use std::sync::Arc;

pub use text_client::TextClient;
pub use transport::{BedrockTransport, ModelTransport};
pub use vision_client::VisionClient;

/// Both stage clients sharing one Bedrock runtime connection.
#[derive(Clone)]
pub struct BedrockClient {
    vision_client: Arc<VisionClient<BedrockTransport>>,
    text_client: Arc<TextClient<BedrockTransport>>,
}

impl BedrockClient {
    pub async fn new(config: PoetConfig) -> Result<Self> {
        config.validate()?;
        let bedrock_config = &config.bedrock;
        let region = Region::new(bedrock_config.region_or_default());

        let loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&bedrock_config.access_key, &bedrock_config.secret_key)
        {
            loader
                .credentials_provider(Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "photopoet",
                ))
                .load()
                .await
        } else {
            log::debug!("No explicit AWS credentials, using the default provider chain");
            loader.load().await
        };

        let transport = Arc::new(BedrockTransport::new(Client::new(&aws_config)));
        Self::with_transport(transport, &config)
    }

    pub fn with_transport(transport: Arc<BedrockTransport>, config: &PoetConfig) -> Result<Self> {
        let vision_client = VisionClient::new(
            transport.clone(),
            config.vision_model_id.clone(),
            config.description_max_tokens,
        );
        let text_client = TextClient::new(
            transport,
            config.text_model_id.clone(),
            config.resolved_text_provider()?,
            config.poem_max_tokens,
            config.temperature,
        );

        Ok(Self {
            vision_client: Arc::new(vision_client),
            text_client: Arc::new(text_client),
        })
    }

    pub fn vision(&self) -> &VisionClient<BedrockTransport> {
        &self.vision_client
    }

    pub fn text(&self) -> &TextClient<BedrockTransport> {
        &self.text_client
    }

    pub fn pipeline(&self) -> PoemPipeline {
        PoemPipeline::new(self.vision_client.clone(), self.text_client.clone())
    }

    /// Every model the pipeline can use, vision models first.
    pub fn supported_models() -> Vec<ModelInfo> {
        let mut models = vision_models();
        models.extend(text_models());
        models
    }
}
