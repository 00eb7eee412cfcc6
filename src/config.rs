use crate::error::{PoetError, Result};
use crate::models::{accepts_image_input, ModelProvider};
use std::env;

pub const DEFAULT_VISION_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_TEXT_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Default)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok();
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok();
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY").ok();

        BedrockConfig {
            region,
            access_key,
            secret_key,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn region_or_default(&self) -> String {
        self.region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PoetConfig {
    pub bedrock: BedrockConfig,
    pub vision_model_id: String,
    pub text_model_id: String,
    /// Needed when the text model id carries no provider prefix (inference profile ARNs).
    pub text_provider: Option<ModelProvider>,
    pub description_max_tokens: i32,
    pub poem_max_tokens: i32,
    pub temperature: f32,
    pub port: u16,
}

impl Default for PoetConfig {
    fn default() -> Self {
        PoetConfig {
            bedrock: BedrockConfig::default(),
            vision_model_id: DEFAULT_VISION_MODEL.to_string(),
            text_model_id: DEFAULT_TEXT_MODEL.to_string(),
            text_provider: None,
            description_max_tokens: 512,
            poem_max_tokens: 1024,
            temperature: 0.7,
            port: 8080,
        }
    }
}

impl PoetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        PoetConfig {
            bedrock: BedrockConfig::from_env(),
            vision_model_id: env::var("POET_VISION_MODEL").unwrap_or(defaults.vision_model_id),
            text_model_id: env::var("POET_TEXT_MODEL").unwrap_or(defaults.text_model_id),
            text_provider: env::var("POET_TEXT_PROVIDER")
                .ok()
                .and_then(|p| ModelProvider::parse(&p)),
            description_max_tokens: parse_env("POET_DESCRIPTION_MAX_TOKENS")
                .unwrap_or(defaults.description_max_tokens),
            poem_max_tokens: parse_env("POET_POEM_MAX_TOKENS").unwrap_or(defaults.poem_max_tokens),
            temperature: parse_env("POET_TEMPERATURE").unwrap_or(defaults.temperature),
            port: parse_env("PORT").unwrap_or(defaults.port),
        }
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = config;
        self
    }

    pub fn with_vision_model(mut self, model_id: impl Into<String>) -> Self {
        self.vision_model_id = model_id.into();
        self
    }

    pub fn with_text_model(mut self, model_id: impl Into<String>) -> Self {
        self.text_model_id = model_id.into();
        self
    }

    pub fn with_text_provider(mut self, provider: ModelProvider) -> Self {
        self.text_provider = Some(provider);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, description: i32, poem: i32) -> Self {
        self.description_max_tokens = description;
        self.poem_max_tokens = poem;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Provider used to shape requests for the text model.
    pub fn resolved_text_provider(&self) -> Result<ModelProvider> {
        self.text_provider
            .or_else(|| ModelProvider::from_model_id(&self.text_model_id))
            .ok_or_else(|| {
                PoetError::ConfigError(format!(
                    "Cannot infer the provider of text model '{}', set POET_TEXT_PROVIDER",
                    self.text_model_id
                ))
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.vision_model_id.trim().is_empty() {
            return Err(PoetError::ConfigError("Vision model id is empty".into()));
        }
        if self.text_model_id.trim().is_empty() {
            return Err(PoetError::ConfigError("Text model id is empty".into()));
        }
        if !accepts_image_input(&self.vision_model_id) {
            return Err(PoetError::ConfigError(format!(
                "Vision model '{}' does not accept image input, use a Claude 3 model or an inference profile ARN",
                self.vision_model_id
            )));
        }
        self.resolved_text_provider()?;
        if self.description_max_tokens <= 0 || self.poem_max_tokens <= 0 {
            return Err(PoetError::ConfigError(
                "Token limits must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(PoetError::ConfigError(format!(
                "Temperature {} is outside [0, 1]",
                self.temperature
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PoetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.resolved_text_provider().unwrap(),
            ModelProvider::Anthropic
        );
        assert_eq!(config.bedrock.region_or_default(), "us-east-1");
    }

    #[test]
    fn test_builder() {
        let config = PoetConfig::new()
            .with_bedrock(
                BedrockConfig::new()
                    .with_region("eu-west-1")
                    .with_credentials("AKIA", "secret"),
            )
            .with_text_model("meta.llama3-8b-instruct-v1:0")
            .with_temperature(0.9)
            .with_max_tokens(256, 700)
            .with_port(9000);

        assert_eq!(config.bedrock.region_or_default(), "eu-west-1");
        assert_eq!(config.bedrock.access_key.as_deref(), Some("AKIA"));
        assert_eq!(config.resolved_text_provider().unwrap(), ModelProvider::Meta);
        assert_eq!(config.poem_max_tokens, 700);
        assert_eq!(config.port, 9000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let text_only_vision = PoetConfig::new().with_vision_model("amazon.titan-text-express-v1");
        assert!(matches!(
            text_only_vision.validate(),
            Err(PoetError::ConfigError(_))
        ));

        for model_id in [
            "anthropic.claude-v2",
            "anthropic.claude-instant-v1",
            "amazon.nova-pro-v1:0",
            "foo",
        ] {
            let config = PoetConfig::new().with_vision_model(model_id);
            assert!(
                matches!(config.validate(), Err(PoetError::ConfigError(_))),
                "{model_id} accepted as vision model"
            );
        }
        let regional = PoetConfig::new()
            .with_vision_model("us.anthropic.claude-3-5-sonnet-20240620-v1:0");
        assert!(regional.validate().is_ok());
        let profile = PoetConfig::new().with_vision_model(
            "arn:aws:bedrock:us-east-1:123456789012:application-inference-profile/vision",
        );
        assert!(profile.validate().is_ok());

        let hot = PoetConfig::new().with_temperature(1.5);
        assert!(hot.validate().is_err());

        let no_tokens = PoetConfig::new().with_max_tokens(0, 100);
        assert!(no_tokens.validate().is_err());

        let arn = "arn:aws:bedrock:us-east-1:123456789012:application-inference-profile/x";
        let unknown = PoetConfig::new().with_text_model(arn);
        assert!(unknown.validate().is_err());
        let known = PoetConfig::new()
            .with_text_model(arn)
            .with_text_provider(ModelProvider::Anthropic);
        assert!(known.validate().is_ok());
    }
}
