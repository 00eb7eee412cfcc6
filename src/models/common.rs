use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: ModelProvider,
    pub category: ModelCategory,
    pub max_tokens: usize,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelCategory {
    Text,
    Vision,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Amazon,
    Anthropic,
    Cohere,
    AI21,
    Meta,
    Mistral,
}

impl ModelProvider {
    /// Infers the provider from a Bedrock model id. Inference profile ARNs
    /// carry no provider prefix and yield `None`.
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        match strip_region_prefix(model_id) {
            id if id.starts_with("amazon.titan") => Some(ModelProvider::Amazon),
            id if id.starts_with("anthropic.claude") => Some(ModelProvider::Anthropic),
            id if id.starts_with("cohere.command") => Some(ModelProvider::Cohere),
            id if id.starts_with("ai21.") => Some(ModelProvider::AI21),
            id if id.starts_with("meta.llama") => Some(ModelProvider::Meta),
            id if id.starts_with("mistral.") => Some(ModelProvider::Mistral),
            _ => None,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "amazon" | "titan" => Some(ModelProvider::Amazon),
            "anthropic" | "claude" => Some(ModelProvider::Anthropic),
            "cohere" => Some(ModelProvider::Cohere),
            "ai21" => Some(ModelProvider::AI21),
            "meta" | "llama" => Some(ModelProvider::Meta),
            "mistral" => Some(ModelProvider::Mistral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Amazon => "Amazon",
            ModelProvider::Anthropic => "Anthropic",
            ModelProvider::Cohere => "Cohere",
            ModelProvider::AI21 => "AI21",
            ModelProvider::Meta => "Meta",
            ModelProvider::Mistral => "Mistral",
        }
    }
}

/// Cross-region inference ids are the plain id behind a `us.`, `eu.` or `apac.` prefix.
fn strip_region_prefix(model_id: &str) -> &str {
    model_id
        .strip_prefix("us.")
        .or_else(|| model_id.strip_prefix("eu."))
        .or_else(|| model_id.strip_prefix("apac."))
        .unwrap_or(model_id)
}

/// Claude 3 and later Claude 3.x models take image input; inference profile
/// ARNs are trusted to point at one.
pub fn accepts_image_input(model_id: &str) -> bool {
    model_id.starts_with("arn:") || strip_region_prefix(model_id).starts_with("anthropic.claude-3")
}

fn model(
    id: &str,
    name: &str,
    provider: ModelProvider,
    category: ModelCategory,
    max_tokens: usize,
    description: &str,
) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: name.to_string(),
        provider,
        category,
        max_tokens,
        description: description.to_string(),
    }
}

/// Models able to take an image and describe it.
pub fn vision_models() -> Vec<ModelInfo> {
    vec![
        model(
            "anthropic.claude-3-haiku-20240307-v1:0",
            "Claude 3 Haiku",
            ModelProvider::Anthropic,
            ModelCategory::Vision,
            4096,
            "Fast multimodal model, good default for image descriptions",
        ),
        model(
            "anthropic.claude-3-sonnet-20240229-v1:0",
            "Claude 3 Sonnet",
            ModelProvider::Anthropic,
            ModelCategory::Vision,
            4096,
            "Balanced multimodal model",
        ),
        model(
            "anthropic.claude-3-5-sonnet-20240620-v1:0",
            "Claude 3.5 Sonnet",
            ModelProvider::Anthropic,
            ModelCategory::Vision,
            8192,
            "Most detailed descriptions",
        ),
    ]
}

/// Models that can write the poem.
pub fn text_models() -> Vec<ModelInfo> {
    let mut models: Vec<ModelInfo> = vision_models()
        .into_iter()
        .map(|m| ModelInfo {
            category: ModelCategory::Text,
            ..m
        })
        .collect();
    models.extend([
        model(
            "amazon.titan-text-express-v1",
            "Titan Text Express",
            ModelProvider::Amazon,
            ModelCategory::Text,
            8192,
            "General purpose Amazon text model",
        ),
        model(
            "meta.llama3-8b-instruct-v1:0",
            "Llama 3 8B Instruct",
            ModelProvider::Meta,
            ModelCategory::Text,
            2048,
            "Small instruction tuned model",
        ),
        model(
            "mistral.mistral-7b-instruct-v0:2",
            "Mistral 7B Instruct",
            ModelProvider::Mistral,
            ModelCategory::Text,
            8192,
            "Small instruction tuned model",
        ),
        model(
            "cohere.command-text-v14",
            "Command",
            ModelProvider::Cohere,
            ModelCategory::Text,
            4000,
            "Cohere generation model",
        ),
        model(
            "ai21.j2-ultra-v1",
            "Jurassic-2 Ultra",
            ModelProvider::AI21,
            ModelCategory::Text,
            8191,
            "AI21 generation model",
        ),
    ]);
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_inference() {
        assert_eq!(
            ModelProvider::from_model_id("anthropic.claude-3-haiku-20240307-v1:0"),
            Some(ModelProvider::Anthropic)
        );
        assert_eq!(
            ModelProvider::from_model_id("us.anthropic.claude-3-5-sonnet-20240620-v1:0"),
            Some(ModelProvider::Anthropic)
        );
        assert_eq!(
            ModelProvider::from_model_id("amazon.titan-text-express-v1"),
            Some(ModelProvider::Amazon)
        );
        assert_eq!(
            ModelProvider::from_model_id("meta.llama3-8b-instruct-v1:0"),
            Some(ModelProvider::Meta)
        );
        assert_eq!(
            ModelProvider::from_model_id(
                "arn:aws:bedrock:us-east-1:123456789012:application-inference-profile/abc"
            ),
            None
        );
    }

    #[test]
    fn test_accepts_image_input() {
        assert!(accepts_image_input("anthropic.claude-3-haiku-20240307-v1:0"));
        assert!(accepts_image_input("eu.anthropic.claude-3-5-sonnet-20240620-v1:0"));
        assert!(accepts_image_input(
            "arn:aws:bedrock:us-east-1:123456789012:application-inference-profile/abc"
        ));
        assert!(!accepts_image_input("anthropic.claude-v2"));
        assert!(!accepts_image_input("anthropic.claude-instant-v1"));
        assert!(!accepts_image_input("amazon.titan-text-express-v1"));
        assert!(!accepts_image_input("foo"));
    }

    #[test]
    fn test_catalogues_match_their_category() {
        assert!(vision_models()
            .iter()
            .all(|m| m.category == ModelCategory::Vision
                && m.provider == ModelProvider::Anthropic
                && accepts_image_input(&m.id)));
        let text = text_models();
        assert!(text.iter().all(|m| m.category == ModelCategory::Text));
        assert!(text
            .iter()
            .all(|m| ModelProvider::from_model_id(&m.id) == Some(m.provider)));
    }
}
