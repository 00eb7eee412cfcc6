//! Image-to-poem orchestration.
//!
//! A run goes through two strictly sequential stages: the vision model
//! describes the photograph, then the text model writes a poem from that
//! description in the requested tone and language. Either both stages
//! complete or the run fails; there are no retries and no partial results.

use crate::{
    error::{PipelineStage, PoetError, Result},
    logger::StageTimer,
    models::{
        Category, GenerationWarning, ImageDescription, ImageReference, Language, PoemOutcome,
        PoemRequest, PoemResult,
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait VisionDescriber: Send + Sync {
    async fn describe_image(&self, image: &ImageReference) -> Result<ImageDescription>;
}

#[async_trait]
pub trait PoemComposer: Send + Sync {
    async fn compose_poem(
        &self,
        description: &ImageDescription,
        category: &Category,
        language: &Language,
    ) -> Result<String>;
}

#[derive(Clone)]
pub struct PoemPipeline {
    describer: Arc<dyn VisionDescriber>,
    composer: Arc<dyn PoemComposer>,
}

impl PoemPipeline {
    pub fn new(describer: Arc<dyn VisionDescriber>, composer: Arc<dyn PoemComposer>) -> Self {
        Self {
            describer,
            composer,
        }
    }

    pub async fn submit(&self, request: PoemRequest) -> Result<PoemOutcome> {
        let request_id = Uuid::new_v4().to_string();

        let image = ImageReference::parse(&request.image_reference).map_err(|e| {
            log::warn!("[req:{}] rejected: {}", request_id, e);
            e
        })?;

        log::info!(
            "[req:{}] generating {} poem in {} from {}",
            request_id,
            request.category,
            request.language,
            image.summary()
        );

        let description = self.describe(&request_id, &image).await?;
        let poem = self
            .compose(&request_id, &description, &request.category, &request.language)
            .await?;

        let result = PoemResult { text: poem };
        let warning = if result.is_empty() {
            log::warn!("[req:{}] composer returned an empty poem", request_id);
            Some(GenerationWarning::EmptyResult)
        } else {
            log::info!(
                "[req:{}] poem generated ({} chars)",
                request_id,
                result.text.chars().count()
            );
            None
        };

        Ok(PoemOutcome {
            request_id,
            result,
            warning,
        })
    }

    async fn describe(&self, request_id: &str, image: &ImageReference) -> Result<ImageDescription> {
        let stage = PipelineStage::Describing;
        let mut timer = StageTimer::start(stage.as_str(), request_id);

        let description = self
            .describer
            .describe_image(image)
            .await
            .map_err(|e| stage_failure(request_id, stage, e))?;

        if description.text.trim().is_empty() {
            return Err(stage_failure(
                request_id,
                stage,
                PoetError::MalformedResponse("vision model returned an empty description".into()),
            ));
        }

        timer.stop();
        Ok(description)
    }

    async fn compose(
        &self,
        request_id: &str,
        description: &ImageDescription,
        category: &Category,
        language: &Language,
    ) -> Result<String> {
        let stage = PipelineStage::Composing;
        let mut timer = StageTimer::start(stage.as_str(), request_id);

        let poem = self
            .composer
            .compose_poem(description, category, language)
            .await
            .map_err(|e| stage_failure(request_id, stage, e))?;

        timer.stop();
        Ok(poem)
    }
}

fn stage_failure(request_id: &str, stage: PipelineStage, error: PoetError) -> PoetError {
    let error = error.in_stage(stage);
    log::error!("[req:{}] {}", request_id, error);
    error
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    pub struct MockDescriber {
        reply: Mutex<Option<Result<String>>>,
        pub calls: Mutex<Vec<ImageReference>>,
    }

    impl MockDescriber {
        pub fn returning(text: &str) -> Self {
            Self::with_reply(Ok(text.to_string()))
        }

        pub fn failing(error: PoetError) -> Self {
            Self::with_reply(Err(error))
        }

        fn with_reply(reply: Result<String>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VisionDescriber for MockDescriber {
        async fn describe_image(&self, image: &ImageReference) -> Result<ImageDescription> {
            self.calls.lock().unwrap().push(image.clone());
            let reply = self.reply.lock().unwrap().take();
            reply
                .unwrap_or_else(|| Err(PoetError::TransportError("describer called twice".into())))
                .map(ImageDescription::new)
        }
    }

    pub struct MockComposer {
        reply: Mutex<Option<Result<String>>>,
        pub calls: Mutex<Vec<(String, Category, Language)>>,
    }

    impl MockComposer {
        pub fn returning(poem: &str) -> Self {
            Self::with_reply(Ok(poem.to_string()))
        }

        pub fn failing(error: PoetError) -> Self {
            Self::with_reply(Err(error))
        }

        fn with_reply(reply: Result<String>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PoemComposer for MockComposer {
        async fn compose_poem(
            &self,
            description: &ImageDescription,
            category: &Category,
            language: &Language,
        ) -> Result<String> {
            self.calls.lock().unwrap().push((
                description.text.clone(),
                category.clone(),
                language.clone(),
            ));
            let reply = self.reply.lock().unwrap().take();
            reply.unwrap_or_else(|| Err(PoetError::TransportError("composer called twice".into())))
        }
    }
}
