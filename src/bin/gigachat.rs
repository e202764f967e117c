use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use gigachat::config::loader;
use gigachat::observability::metrics::render_metrics;
use gigachat::utils::logging::{self, LogLevel};
use gigachat::{conversation, ChatOptions, Client, ImageOptions, StreamEvent};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "gigachat.yaml")]
    config: PathBuf,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// print collected metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available models
    Models,
    /// Send one message and print the answer
    Chat {
        message: String,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f64>,
        #[arg(long)]
        top_p: Option<f64>,
        #[arg(long)]
        max_tokens: Option<u32>,
        /// print the answer as it is generated
        #[arg(long)]
        stream: bool,
    },
    /// Generate an image and save it to a file
    Image {
        prompt: String,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(short, long, default_value = "image.jpg")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let client_config = loader::file_to_config(&args.config).await?;
    logging::init_logging(&logging::resolve(client_config.logging.as_ref(), args.log_level));

    // -------------------------------
    // 2. Build token manager and client
    // -------------------------------

    let client = Client::from_config(&client_config)?;
    info!(model = %client.default_model(), "client ready");

    // -------------------------------
    // 3. Run command
    // -------------------------------

    let result = run(&client, args.command).await;

    if args.metrics {
        eprint!("{}", render_metrics().await);
    }
    result
}

async fn run(client: &Client, command: Command) -> Result<()> {
    match command {
        Command::Models => {
            let models = client.models().await?;
            for model in models.data {
                println!("{}\t{}", model.id, model.owned_by);
            }
        }
        Command::Chat { message, system, model, temperature, top_p, max_tokens, stream } => {
            let messages = conversation(system.as_deref().unwrap_or_default(), &message);
            let options = ChatOptions { model, temperature, top_p, max_tokens, ..ChatOptions::default() };

            if stream {
                stream_answer(client, messages, &options).await?;
            } else {
                let response = client.chat(messages, &options).await?;
                println!("{}", response.content().unwrap_or_default());
                if let Some(usage) = response.usage {
                    info!(
                        model = %response.model,
                        prompt = usage.prompt_tokens,
                        completion = usage.completion_tokens,
                        total = usage.total_tokens,
                        "tokens used"
                    );
                }
            }
        }
        Command::Image { prompt, system, model, output } => {
            let options = ImageOptions { system_message: system, model, temperature: None };
            let image = client.create_image(&prompt, &options).await?;
            save_image(&output, &image.content).await?;
            println!("{}\t{}", image.file_id, output.display());
        }
    }
    Ok(())
}

async fn stream_answer(client: &Client, messages: Vec<gigachat::Message>, options: &ChatOptions) -> Result<()> {
    let mut stdout = std::io::stdout();
    client
        .chat_stream(messages, options, |event| match event {
            StreamEvent::Chunk(chunk) => {
                if let Some(text) = chunk.content() {
                    let _ = write!(stdout, "{}", text);
                    let _ = stdout.flush();
                }
            }
            StreamEvent::Done => {
                let _ = writeln!(stdout);
            }
            StreamEvent::Failed(e) => warn!(error = %e, "skipping undecodable chunk"),
        })
        .await?;
    Ok(())
}

async fn save_image(path: &Path, content: &str) -> Result<()> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(content)
        .context("image content is not valid base64")?;
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write image to '{}'", path.display()))
}
