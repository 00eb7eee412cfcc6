use super::transport::ModelTransport;
use crate::{
    error::{PipelineStage, PoetError, Result},
    models::{
        is_supported_image, media_type_for_extension, ClaudeMessageResponse, ImageDescription,
        ImageReference,
    },
    pipeline::VisionDescriber,
    prompts::{DESCRIBE_IMAGE_PROMPT, DESCRIBE_IMAGE_SYSTEM_PROMPT},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use std::sync::Arc;

const DESCRIPTION_TEMPERATURE: f32 = 0.2;

/// Image bytes ready to be attached to a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub media_type: String,
    pub base64_data: String,
}

/// Describes photographs with an Anthropic Claude 3 model.
pub struct VisionClient<T: ModelTransport> {
    transport: Arc<T>,
    http: reqwest::Client,
    model_id: String,
    max_tokens: i32,
}

impl<T: ModelTransport> VisionClient<T> {
    pub fn new(transport: Arc<T>, model_id: impl Into<String>, max_tokens: i32) -> Self {
        Self {
            transport,
            http: reqwest::Client::new(),
            model_id: model_id.into(),
            max_tokens,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub async fn resolve(&self, image: &ImageReference) -> Result<ResolvedImage> {
        match image {
            ImageReference::DataUri { media_type, data } => {
                let bytes = STANDARD
                    .decode(data.trim())
                    .map_err(|e| decode_failure(format!("image data is not valid base64: {}", e)))?;
                into_resolved(media_type.clone(), bytes)
            }
            ImageReference::Url(url) => self.fetch(url).await,
        }
    }

    async fn fetch(&self, url: &str) -> Result<ResolvedImage> {
        log::debug!("Fetching image from {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PoetError::TransportError(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(PoetError::TransportError(format!(
                "Fetching {} returned {}",
                url,
                response.status()
            )));
        }

        let header_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase());

        let media_type = match header_type.as_deref() {
            Some(media_type) if media_type.starts_with("image/") => media_type.to_string(),
            None | Some("application/octet-stream") => guess_media_type(url).unwrap_or_default(),
            Some(other) => {
                return Err(decode_failure(format!(
                    "{} served '{}' instead of an image",
                    url, other
                )))
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PoetError::TransportError(format!("Failed to read {}: {}", url, e)))?;

        into_resolved(media_type, bytes.to_vec())
    }

    pub fn build_payload(&self, image: &ResolvedImage) -> Value {
        json!({
            "anthropic_version": "bedrock-2023-05-31",
            "max_tokens": self.max_tokens,
            "temperature": DESCRIPTION_TEMPERATURE,
            "system": DESCRIBE_IMAGE_SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": image.media_type,
                                "data": image.base64_data
                            }
                        },
                        {
                            "type": "text",
                            "text": DESCRIBE_IMAGE_PROMPT
                        }
                    ]
                }
            ]
        })
    }
}

#[async_trait]
impl<T: ModelTransport> VisionDescriber for VisionClient<T> {
    async fn describe_image(&self, image: &ImageReference) -> Result<ImageDescription> {
        let resolved = self
            .resolve(image)
            .await
            .map_err(|e| e.in_stage(PipelineStage::Describing))?;
        log::info!(
            "Describing {} image with model {}",
            resolved.media_type,
            self.model_id
        );

        let payload = self.build_payload(&resolved);
        let reply = self.transport.invoke(&self.model_id, &payload).await?;

        let message: ClaudeMessageResponse = serde_json::from_value(reply).map_err(|e| {
            PoetError::MalformedResponse(format!("Unexpected vision model reply: {}", e))
        })?;
        let description = message.text().trim().to_string();

        log::debug!(
            "Image description ({} chars): {}",
            description.len(),
            description.chars().take(200).collect::<String>()
        );

        Ok(ImageDescription::new(description))
    }
}

fn into_resolved(media_type: String, bytes: Vec<u8>) -> Result<ResolvedImage> {
    if bytes.is_empty() {
        return Err(decode_failure("image is empty".to_string()));
    }
    if !is_supported_image(&media_type) {
        return Err(decode_failure(format!(
            "unsupported image type '{}'",
            media_type
        )));
    }
    Ok(ResolvedImage {
        media_type,
        base64_data: STANDARD.encode(bytes),
    })
}

fn guess_media_type(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = path.rsplit_once('.')?.1.to_ascii_lowercase();
    media_type_for_extension(&extension).map(String::from)
}

fn decode_failure(message: String) -> PoetError {
    PoetError::ModelInvocation {
        stage: PipelineStage::Describing,
        message: format!("Image could not be decoded: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bedrock::transport::mock::MockTransport;

    fn client(transport: Arc<MockTransport>) -> VisionClient<MockTransport> {
        VisionClient::new(transport, "anthropic.claude-3-haiku-20240307-v1:0", 300)
    }

    fn claude_reply(text: &str) -> Value {
        json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": text }],
            "stop_reason": "end_turn"
        })
    }

    #[tokio::test]
    async fn test_describe_sends_image_block() {
        let transport = Arc::new(MockTransport::replying(vec![Ok(claude_reply(
            "  a quiet lake at sunset \n",
        ))]));
        let vision = client(transport.clone());
        let image = ImageReference::DataUri {
            media_type: "image/png".into(),
            data: STANDARD.encode(b"png-bytes"),
        };

        let description = vision.describe_image(&image).await.unwrap();
        assert_eq!(description.text, "a quiet lake at sunset");

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "anthropic.claude-3-haiku-20240307-v1:0");
        let content = &calls[0].1["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], STANDARD.encode(b"png-bytes"));
        assert_eq!(content[1]["text"], DESCRIBE_IMAGE_PROMPT);
        assert_eq!(calls[0].1["max_tokens"], 300);
    }

    #[tokio::test]
    async fn test_undecodable_image_fails_before_invocation() {
        let transport = Arc::new(MockTransport::default());
        let vision = client(transport.clone());

        let garbage = ImageReference::DataUri {
            media_type: "image/png".into(),
            data: "%%% not base64 %%%".into(),
        };
        let err = vision.describe_image(&garbage).await.unwrap_err();
        assert!(matches!(
            err,
            PoetError::ModelInvocation {
                stage: PipelineStage::Describing,
                ..
            }
        ));

        let pdf = ImageReference::DataUri {
            media_type: "application/pdf".into(),
            data: STANDARD.encode(b"%PDF"),
        };
        assert!(vision.describe_image(&pdf).await.unwrap_err().is_model_invocation());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let transport = Arc::new(MockTransport::replying(vec![Ok(json!({ "oops": true }))]));
        let vision = client(transport);
        let image = ImageReference::DataUri {
            media_type: "image/jpeg".into(),
            data: STANDARD.encode(b"jpeg"),
        };
        assert!(matches!(
            vision.describe_image(&image).await,
            Err(PoetError::MalformedResponse(_))
        ));
    }

    /// Serves one canned HTTP response and returns the URL to fetch it from.
    async fn serve_once(status: &str, content_type: Option<&str>, body: &[u8]) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut response = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\n", status, body.len());
        if let Some(content_type) = content_type {
            response.push_str(&format!("Content-Type: {}\r\n", content_type));
        }
        response.push_str("Connection: close\r\n\r\n");
        let mut response = response.into_bytes();
        response.extend_from_slice(body);

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/photo.jpg", addr)
    }

    fn assert_describing_failure(err: PoetError) {
        assert!(
            matches!(
                err,
                PoetError::ModelInvocation {
                    stage: PipelineStage::Describing,
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_image_content_type() {
        let url = serve_once(
            "200 OK",
            Some("text/html; charset=utf-8"),
            b"<html>not an image</html>",
        )
        .await;
        let transport = Arc::new(MockTransport::default());
        let vision = client(transport.clone());

        let err = vision
            .describe_image(&ImageReference::Url(url))
            .await
            .unwrap_err();
        assert_describing_failure(err);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let url = serve_once("404 Not Found", Some("image/jpeg"), b"missing").await;
        let transport = Arc::new(MockTransport::default());
        let vision = client(transport.clone());

        let err = vision
            .describe_image(&ImageReference::Url(url))
            .await
            .unwrap_err();
        assert_describing_failure(err);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_uses_image_content_type() {
        let url = serve_once("200 OK", Some("image/webp"), b"webp-bytes").await;
        let vision = client(Arc::new(MockTransport::default()));

        let resolved = vision.resolve(&ImageReference::Url(url)).await.unwrap();
        assert_eq!(
            resolved,
            ResolvedImage {
                media_type: "image/webp".into(),
                base64_data: STANDARD.encode(b"webp-bytes"),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_guesses_type_for_octet_stream() {
        let url = serve_once("200 OK", Some("application/octet-stream"), b"jpeg-bytes").await;
        let vision = client(Arc::new(MockTransport::default()));

        let resolved = vision.resolve(&ImageReference::Url(url)).await.unwrap();
        assert_eq!(resolved.media_type, "image/jpeg");
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(
            guess_media_type("https://x.test/photos/lake.JPG?size=large"),
            Some("image/jpeg".to_string())
        );
        assert_eq!(guess_media_type("https://x.test/photo"), None);
    }
}
