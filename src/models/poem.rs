use crate::error::{PoetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Shown to the user in place of a poem when the composer returned nothing.
pub const EMPTY_POEM_PLACEHOLDER: &str = "Failed to generate poem.";

/// Emotional tone of the poem. Unknown labels pass through as free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Romantic,
    Sad,
    Happy,
    Angry,
    Hopeful,
    Melancholy,
    Nature,
    Abstract,
    Other(String),
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Romantic,
        Category::Sad,
        Category::Happy,
        Category::Angry,
        Category::Hopeful,
        Category::Melancholy,
        Category::Nature,
        Category::Abstract,
    ];

    /// A blank label falls back to the default tone.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() {
            return Self::default();
        }
        Self::ALL
            .iter()
            .find(|known| known.as_str().eq_ignore_ascii_case(label))
            .cloned()
            .unwrap_or_else(|| Category::Other(label.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Romantic => "Romantic",
            Category::Sad => "Sad",
            Category::Happy => "Happy",
            Category::Angry => "Angry",
            Category::Hopeful => "Hopeful",
            Category::Melancholy => "Melancholy",
            Category::Nature => "Nature",
            Category::Abstract => "Abstract",
            Category::Other(label) => label,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Romantic
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::parse(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// Language the poem is written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    English,
    Bangla,
    Other(String),
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Bangla];

    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        match label.to_ascii_lowercase().as_str() {
            "" | "english" | "en" => Language::English,
            "bangla" | "bengali" | "bn" => Language::Bangla,
            _ => Language::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Bangla => "Bangla",
            Language::Other(label) => label,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Language {
    fn from(label: String) -> Self {
        Language::parse(&label)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemRequest {
    /// Data URI or http(s) URL of the photograph.
    pub image_reference: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub language: Language,
}

impl PoemRequest {
    pub fn new(image_reference: impl Into<String>) -> Self {
        Self {
            image_reference: image_reference.into(),
            category: Category::default(),
            language: Language::default(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// What the vision model saw. Only ever handed to the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescription {
    pub text: String,
}

impl ImageDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemResult {
    pub text: String,
}

impl PoemResult {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Writes the poem as plain text into `dir`, named after the source image.
    pub fn save_to(&self, dir: impl AsRef<Path>, source_name: Option<&str>) -> Result<PathBuf> {
        if self.is_empty() {
            return Err(PoetError::InputError(
                "No poem generated, please generate a poem before saving".into(),
            ));
        }
        let path = dir.as_ref().join(poem_file_name(source_name));
        std::fs::write(&path, &self.text).map_err(|e| {
            PoetError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        log::info!("Poem saved to {}", path.display());
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationWarning {
    /// The composer answered but the poem is empty.
    EmptyResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemOutcome {
    pub request_id: String,
    pub result: PoemResult,
    pub warning: Option<GenerationWarning>,
}

impl PoemOutcome {
    pub fn display_text(&self) -> &str {
        match self.warning {
            Some(GenerationWarning::EmptyResult) => EMPTY_POEM_PLACEHOLDER,
            None => &self.result.text,
        }
    }
}

/// `<stem>_poem.txt` for a named source image, `poem.txt` otherwise.
pub fn poem_file_name(source_name: Option<&str>) -> String {
    let stem = source_name
        .map(|name| {
            Path::new(name)
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or(name)
        })
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty());

    match stem {
        Some(stem) => format!("{}_poem.txt", stem),
        None => "poem.txt".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(Category::parse("romantic"), Category::Romantic);
        assert_eq!(Category::parse(" MELANCHOLY "), Category::Melancholy);
        assert_eq!(
            Category::parse("Nostalgic"),
            Category::Other("Nostalgic".into())
        );
        assert_eq!(Category::Other("Nostalgic".into()).to_string(), "Nostalgic");
        assert_eq!(Category::parse(""), Category::Romantic);
        assert_eq!(Category::parse("   "), Category::Romantic);
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::parse("bn"), Language::Bangla);
        assert_eq!(Language::parse("English"), Language::English);
        assert_eq!(Language::parse("French").as_str(), "French");
        assert_eq!(Language::parse(" "), Language::English);
    }

    #[test]
    fn test_blank_labels_deserialize_to_defaults() {
        let request: PoemRequest = serde_json::from_str(
            r#"{"image_reference": "x", "category": "", "language": ""}"#,
        )
        .unwrap();
        assert_eq!(request.category, Category::Romantic);
        assert_eq!(request.language, Language::English);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: PoemRequest =
            serde_json::from_str(r#"{"image_reference": "https://x.test/a.png"}"#).unwrap();
        assert_eq!(request.category, Category::Romantic);
        assert_eq!(request.language, Language::English);

        let request: PoemRequest = serde_json::from_str(
            r#"{"image_reference": "x", "category": "sad", "language": "Bangla"}"#,
        )
        .unwrap();
        assert_eq!(request.category, Category::Sad);
        assert_eq!(request.language, Language::Bangla);
        assert_eq!(
            serde_json::to_value(&request).unwrap()["category"],
            serde_json::json!("Sad")
        );
    }

    #[test]
    fn test_display_text_uses_placeholder_for_empty_result() {
        let outcome = PoemOutcome {
            request_id: "r".into(),
            result: PoemResult { text: String::new() },
            warning: Some(GenerationWarning::EmptyResult),
        };
        assert_eq!(outcome.display_text(), EMPTY_POEM_PLACEHOLDER);

        let outcome = PoemOutcome {
            request_id: "r".into(),
            result: PoemResult {
                text: "Still water".into(),
            },
            warning: None,
        };
        assert_eq!(outcome.display_text(), "Still water");
    }

    #[test]
    fn test_poem_file_name() {
        assert_eq!(poem_file_name(Some("lake.sunset.jpg")), "lake_poem.txt");
        assert_eq!(poem_file_name(Some("/photos/beach.png")), "beach_poem.txt");
        assert_eq!(poem_file_name(Some(".hidden")), "poem.txt");
        assert_eq!(poem_file_name(None), "poem.txt");
    }

    #[test]
    fn test_save_to_writes_file() {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dir).unwrap();

        let poem = PoemResult {
            text: "Gold on the water".into(),
        };
        let path = poem.save_to(&dir, Some("lake.jpg")).unwrap();
        assert_eq!(path, dir.join("lake_poem.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Gold on the water");

        let empty = PoemResult { text: "  ".into() };
        assert!(empty.save_to(&dir, None).unwrap_err().is_input_error());

        let missing_dir = dir.join("does-not-exist");
        assert!(matches!(
            poem.save_to(&missing_dir, None),
            Err(PoetError::IoError(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
