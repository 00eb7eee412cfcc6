use thiserror::Error;

/// The two sequential stages of a poem generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Describing,
    Composing,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Describing => "describing",
            PipelineStage::Composing => "composing",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PoetError {
    #[error("Input error: {0}")]
    InputError(String),
    #[error("Model invocation error while {stage}: {message}")]
    ModelInvocation {
        stage: PipelineStage,
        message: String,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl PoetError {
    /// Relabels a failure raised inside a stage as a model invocation
    /// failure of that stage. Already-labelled failures keep their stage.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        match self {
            PoetError::ModelInvocation { .. } => self,
            other => PoetError::ModelInvocation {
                stage,
                message: other.to_string(),
            },
        }
    }

    pub fn is_input_error(&self) -> bool {
        matches!(self, PoetError::InputError(_))
    }

    pub fn is_model_invocation(&self) -> bool {
        matches!(self, PoetError::ModelInvocation { .. })
    }
}

pub type Result<T> = std::result::Result<T, PoetError>;
