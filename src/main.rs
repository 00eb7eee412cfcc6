use clap::{Parser, Subcommand};
use photopoet::{
    logger, BedrockClient, Category, ImageReference, Language, PoemRequest, PoetConfig,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "photopoet", version, about = "Write a poem inspired by a photograph")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a poem from an image file, http(s) URL or data URI
    Generate {
        #[arg(value_name = "IMAGE")]
        image: String,

        #[arg(short, long, default_value = "Romantic")]
        category: String,

        #[arg(short, long, default_value = "English")]
        language: String,

        /// Save the poem as <image>_poem.txt
        #[arg(short, long)]
        save: bool,

        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// List categories, languages and supported models
    Options,
    /// Serve the HTTP API
    #[cfg(feature = "server")]
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init() {
        eprintln!("{}", e);
    }
    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Generate {
            image,
            category,
            language,
            save,
            out_dir,
        } => generate(image, category, language, save, out_dir).await,
        Command::Options => {
            print_options();
            Ok(())
        }
        #[cfg(feature = "server")]
        Command::Serve { port } => {
            let config = PoetConfig::from_env();
            let port = port.unwrap_or(config.port);
            logger::log_config_info(&config);
            let client = BedrockClient::new(config).await?;
            photopoet::server::run(client.pipeline(), port).await?;
            Ok(())
        }
    }
}

async fn generate(
    image: String,
    category: String,
    language: String,
    save: bool,
    out_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let (image_reference, source_name) = image_reference_for(&image)?;

    let config = PoetConfig::from_env();
    logger::log_config_info(&config);
    let client = BedrockClient::new(config).await?;

    let request = PoemRequest::new(image_reference)
        .with_category(Category::parse(&category))
        .with_language(Language::parse(&language));

    let outcome = client.pipeline().submit(request).await?;
    println!("{}", outcome.display_text());

    if outcome.warning.is_some() {
        log::warn!("⚠️  The model returned an empty poem, nothing to save");
        return Ok(());
    }

    if save {
        let path = outcome.result.save_to(&out_dir, source_name.as_deref())?;
        eprintln!("Poem saved to {}", path.display());
    }

    Ok(())
}

/// URLs and data URIs go through untouched; anything else is read from disk.
fn image_reference_for(
    image: &str,
) -> Result<(String, Option<String>), Box<dyn std::error::Error>> {
    let lower = image.trim().to_ascii_lowercase();
    if lower.starts_with("data:") || lower.starts_with("http://") || lower.starts_with("https://")
    {
        let name = image
            .rsplit('/')
            .next()
            .filter(|_| !lower.starts_with("data:"))
            .map(String::from);
        return Ok((image.trim().to_string(), name));
    }

    let path = Path::new(image);
    let reference = ImageReference::from_file(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(String::from);
    Ok((reference.to_uri(), name))
}

fn print_options() {
    println!("Categories:");
    for category in Category::ALL.iter() {
        println!("  {}", category);
    }
    println!("Languages:");
    for language in Language::ALL.iter() {
        println!("  {}", language);
    }
    println!("Models:");
    for model in BedrockClient::supported_models() {
        println!(
            "  [{:?}] {} - {} ({})",
            model.category,
            model.id,
            model.name,
            model.provider.as_str()
        );
    }
}
