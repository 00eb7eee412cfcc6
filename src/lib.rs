//! PhotoPoet: turn a photograph into a poem.
//!
//! A vision model describes the photograph, then a text model writes a poem
//! from that description in the chosen tone and language. Both models are
//! reached through AWS Bedrock behind the [`bedrock::ModelTransport`] trait.

pub mod bedrock;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;

pub use bedrock::{BedrockClient, TextClient, VisionClient};
pub use config::{BedrockConfig, PoetConfig};
pub use error::{PipelineStage, PoetError, Result};
pub use models::{
    Category, GenerationWarning, ImageReference, Language, ModelProvider, PoemOutcome,
    PoemRequest, PoemResult,
};
pub use pipeline::{PoemComposer, PoemPipeline, VisionDescriber};
