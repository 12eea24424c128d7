use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use webvidgen::api::gemini::GeminiClient;
use webvidgen::config::Config;
use webvidgen::credential::{ApiKey, SharedCredential};
use webvidgen::generator::Generator;
use webvidgen::history::{self, HistoryStore, JsonHistoryStore};
use webvidgen::init;
use webvidgen::media::{self, MediaStore};
use webvidgen::model::{AspectRatio, GenerationOptions, Language, Voice};
use webvidgen::session::GenerationSession;

#[derive(Parser, Debug)]
#[clap(name = "webvidgen", version, about = "Turn a website URL into a short promo video")]
struct Cli {
    /// JSON config file; defaults apply when it does not exist.
    #[clap(long, default_value = "config.json")]
    config: PathBuf,

    #[clap(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a URL and generate its video.
    Generate {
        url: String,
        #[clap(long, default_value = "16:9")]
        ratio: AspectRatio,
        /// Overrides the suggested visual style.
        #[clap(long)]
        prompt: Option<String>,
        #[clap(long)]
        voiceover: bool,
        #[clap(long, default_value = "Kore")]
        voice: Voice,
        #[clap(long, default_value = "English")]
        language: Language,
        /// Export directory; defaults to the configured output dir.
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Inspect or prune past generations.
    History {
        #[clap(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    List,
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load_or_default(&cli.config).await?;
    init::ensure_directories(&cfg).await?;

    let code = match cli.command {
        Command::Generate {
            url,
            ratio,
            prompt,
            voiceover,
            voice,
            language,
            out,
        } => {
            let key = cli.api_key.or_else(|| cfg.api_key.clone());
            let options = GenerationOptions {
                aspect_ratio: ratio,
                voiceover,
                voice,
                language,
            };
            let out_dir = out.unwrap_or_else(|| cfg.output_dir.clone());
            run_generate(&cfg, key, &url, prompt, options, out_dir).await?
        }
        Command::History { action } => run_history(&cfg, action).await?,
    };
    std::process::exit(code);
}

async fn run_generate(
    cfg: &Config,
    key: Option<String>,
    url: &str,
    prompt: Option<String>,
    options: GenerationOptions,
    out_dir: PathBuf,
) -> Result<i32> {
    let credential = SharedCredential::unset();
    match key.and_then(ApiKey::new) {
        Some(key) => credential.set(key),
        None => {
            eprintln!("[ERROR] No API key. Pass --api-key, set GEMINI_API_KEY or add api_key to the config.");
            return Ok(2);
        }
    }

    let media = Arc::new(MediaStore::new()?);
    let client = GeminiClient::new(cfg, credential.clone(), media.clone())?;
    let generator = Generator::new(Arc::new(client));
    let store = JsonHistoryStore::new(cfg.history_path.clone());
    let mut session = GenerationSession::new(generator, credential, store, cfg.analysis_delay());
    session.load_history().await;

    let suggested = session.analyze(url, options.aspect_ratio).await?;
    match prompt {
        Some(custom) => session.update_prompt(custom),
        None => eprintln!("[INFO] Suggested style: {}", suggested),
    }

    let video = match session.confirm(options).await {
        Ok(video) => video,
        Err(err) => {
            eprintln!("[ERROR] {}", err);
            if err.requires_reconnect() {
                eprintln!("[ERROR] Reconnect your API key and try again.");
            }
            return Ok(1);
        }
    };

    let handle = video
        .video_url
        .as_ref()
        .context("completed generation has no video")?;
    let dest = media::export(handle, &out_dir, &video.download_name()).await?;
    println!("video: {}", dest.display());

    if let Some(audio) = &video.audio_url {
        let dest = media::export(audio, &out_dir, &format!("webvidgen-{}.wav", video.id)).await?;
        println!("voiceover: {}", dest.display());
    }
    if let Some(script) = &video.script {
        println!("script: {}", script);
    }
    Ok(0)
}

async fn run_history(cfg: &Config, action: HistoryAction) -> Result<i32> {
    let store = JsonHistoryStore::new(cfg.history_path.clone());
    match action {
        HistoryAction::List => {
            let records = store.load_all().await?;
            if records.is_empty() {
                println!("No generations yet.");
            }
            for entry in history::sorted_for_display(&records).await {
                let v = &entry.video;
                let when = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(v.timestamp)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "{}  {}  {:?}  {}  {}  [{}]",
                    v.id,
                    when,
                    v.status,
                    v.aspect_ratio,
                    v.url,
                    entry.label()
                );
            }
        }
        HistoryAction::Delete { id } => {
            store.remove(&id).await?;
            println!("Deleted {}", id);
        }
    }
    Ok(0)
}
