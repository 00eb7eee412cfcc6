use serde::{Deserialize, Serialize};

// Provider response bodies. Only the fields carrying generated text are
// modelled; everything else in the payload is ignored.

#[derive(Serialize, Deserialize)]
pub struct TitanTextResponse {
    pub results: Vec<TitanTextResult>,
}

#[derive(Serialize, Deserialize)]
pub struct TitanTextResult {
    #[serde(rename = "outputText")]
    pub output_text: String,
    #[serde(rename = "completionReason")]
    pub completion_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ClaudeMessageResponse {
    pub content: Vec<ClaudeContentBlock>,
    pub stop_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ClaudeContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ClaudeMessageResponse {
    /// Concatenates every text block of the reply.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Serialize, Deserialize)]
pub struct LlamaResponse {
    pub generation: String,
    pub stop_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct MistralResponse {
    pub outputs: Vec<MistralOutput>,
}

#[derive(Serialize, Deserialize)]
pub struct MistralOutput {
    pub text: String,
    pub stop_reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CohereResponse {
    pub generations: Vec<CohereGeneration>,
}

#[derive(Serialize, Deserialize)]
pub struct CohereGeneration {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct Ai21Response {
    pub completions: Vec<Ai21Completion>,
}

#[derive(Serialize, Deserialize)]
pub struct Ai21Completion {
    pub data: Ai21CompletionData,
}

#[derive(Serialize, Deserialize)]
pub struct Ai21CompletionData {
    pub text: String,
}
