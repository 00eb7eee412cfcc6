use photopoet::{BedrockClient, BedrockConfig, Category, ImageReference, Language, PoemRequest, PoetConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    photopoet::logger::init()?;

    let image_path = env::args()
        .nth(1)
        .ok_or("usage: cargo run --example poem -- <image>")?;
    let region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

    let mut bedrock = BedrockConfig::new().with_region(&region);
    if let (Ok(access_key), Ok(secret_key)) = (
        env::var("AWS_ACCESS_KEY_ID"),
        env::var("AWS_SECRET_ACCESS_KEY"),
    ) {
        bedrock = bedrock.with_credentials(access_key, secret_key);
    }
    let config = PoetConfig::new().with_bedrock(bedrock).with_temperature(0.8);

    let client = BedrockClient::new(config).await?;
    let image = ImageReference::from_file(&image_path)?;

    for (category, language) in [
        (Category::Melancholy, Language::English),
        (Category::Hopeful, Language::Bangla),
    ] {
        let request = PoemRequest::new(image.to_uri())
            .with_category(category.clone())
            .with_language(language.clone());
        let outcome = client.pipeline().submit(request).await?;
        println!("--- {} / {} ---\n{}\n", category, language, outcome.display_text());
    }

    Ok(())
}
