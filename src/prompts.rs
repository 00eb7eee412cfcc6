//! Prompt templates for the two generation stages.
//!
//! The describer prompt is fixed; the composer prompt embeds the description,
//! category and language verbatim so the style can vary over one description.

use crate::models::{Category, ImageDescription, Language};

pub const DESCRIBE_IMAGE_SYSTEM_PROMPT: &str = "You are an AI vision model that can describe an image.";

pub const DESCRIBE_IMAGE_PROMPT: &str = "Describe the attached image, including key objects, scenes, and emotions. \
Write a neutral descriptive summary and output only the description.";

pub const POET_SYSTEM_PROMPT: &str = "You are a poet laureate.";

pub fn compose_poem_prompt(
    description: &ImageDescription,
    category: &Category,
    language: &Language,
) -> String {
    format!(
        "{} Write a poem in {} inspired by the following image description, with a {} tone:\n\n{}",
        POET_SYSTEM_PROMPT, language, category, description.text
    )
}
