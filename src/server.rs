//! HTTP front end for the pipeline, enabled with the `server` feature.

use crate::{
    error::PoetError,
    models::{Category, GenerationWarning, Language, PoemRequest},
    pipeline::PoemPipeline,
};
use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer, ResponseError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GeneratePoemBody {
    pub photo_url: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct GeneratePoemReply {
    pub request_id: String,
    pub poem: String,
    pub display_text: String,
    pub warning: Option<GenerationWarning>,
}

#[derive(Debug, Serialize)]
pub struct OptionsReply {
    pub categories: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorReply {
    error: String,
}

impl ResponseError for PoetError {
    fn status_code(&self) -> StatusCode {
        match self {
            PoetError::InputError(_) => StatusCode::BAD_REQUEST,
            PoetError::ModelInvocation { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorReply {
            error: self.to_string(),
        })
    }
}

async fn generate_poem(
    pipeline: web::Data<PoemPipeline>,
    body: web::Json<GeneratePoemBody>,
) -> Result<HttpResponse, PoetError> {
    let body = body.into_inner();
    let request = PoemRequest::new(body.photo_url)
        .with_category(body.category)
        .with_language(body.language);

    let outcome = pipeline.submit(request).await?;
    let display_text = outcome.display_text().to_string();

    Ok(HttpResponse::Ok().json(GeneratePoemReply {
        request_id: outcome.request_id,
        poem: outcome.result.text,
        display_text,
        warning: outcome.warning,
    }))
}

async fn options() -> HttpResponse {
    HttpResponse::Ok().json(OptionsReply {
        categories: Category::ALL.iter().map(|c| c.to_string()).collect(),
        languages: Language::ALL.iter().map(|l| l.to_string()).collect(),
    })
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/poem", web::post().to(generate_poem))
        .route("/api/options", web::get().to(options))
        .route("/health", web::get().to(health));
}

pub async fn run(pipeline: PoemPipeline, port: u16) -> std::io::Result<()> {
    log::info!("🚀 Serving PhotoPoet on http://0.0.0.0:{}", port);
    let data = web::Data::new(pipeline);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
