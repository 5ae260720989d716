// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subtitler::app_config::{self, Config, TranslationProvider};
use subtitler::media;
use subtitler::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an SRT file or every SRT file in a directory
    Translate(TranslateArgs),

    /// Split oversized captions without translating
    Normalize {
        /// Input SRT file
        input: PathBuf,

        /// Output file (default: <input>.normalized.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build an SRT file from a Whisper-style JSON transcript
    FromSegments {
        /// Transcript JSON ({"segments": [...]} or a bare array)
        input: PathBuf,

        /// Output file (default: <input>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds added to every segment
        #[arg(long, default_value_t = 0.0)]
        offset: f64,
    },

    /// Transcribe an audio file into SRT with the Whisper API
    Transcribe {
        /// Audio file (e.g. from extract-audio)
        audio: PathBuf,

        /// Output file (default: <audio>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds added to every segment, for audio cut into chunks
        #[arg(long, default_value_t = 0.0)]
        offset: f64,
    },

    /// Extract the audio track of a video as WAV
    ExtractAudio {
        video: PathBuf,
        audio: PathBuf,
    },

    /// Embed an SRT file into a video as a subtitle track
    Embed {
        video: PathBuf,
        srt: PathBuf,
        output: PathBuf,
    },

    /// Generate shell completions for subtitler
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input SRT file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of captions translated at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
}

/// subtitler - captions from transcripts, translated with AI
#[derive(Parser, Debug)]
#[command(name = "subtitler")]
#[command(version)]
#[command(about = "Caption building and AI-powered subtitle translation")]
#[command(long_about = "subtitler builds SRT captions from transcripts, splits captions that are too long \
and translates them one by one with surrounding context.

EXAMPLES:
    subtitler translate movie.srt                  # Translate using default config
    subtitler translate -f movie.srt               # Force overwrite existing output
    subtitler translate -p ollama -m llama3 movie.srt
    subtitler translate -s es -t fr /movies/       # Process an entire directory
    subtitler extract-audio movie.mp4 movie.wav
    subtitler transcribe movie.wav -o movie.srt
    subtitler from-segments talk.json -o talk.srt
    subtitler embed movie.mp4 movie.en.srt movie.subs.mp4
    subtitler completions bash > subtitler.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. An empty OpenAI api_key is read from OPENAI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger, later level changes go through log::set_max_level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtitler", &mut std::io::stdout());
            Ok(())
        }
        Commands::ExtractAudio { video, audio } => media::extract_audio(&video, &audio).await,
        Commands::Embed { video, srt, output } => media::embed_subtitles(&video, &srt, &output).await,
        Commands::Normalize { input, output } => {
            let config = load_config(&cli.config_path, cli.log_level.is_none())?;
            Controller::with_config(config)?.normalize_file(&input, output)?;
            Ok(())
        }
        Commands::FromSegments { input, output, offset } => {
            let config = load_config(&cli.config_path, cli.log_level.is_none())?;
            Controller::with_config(config)?.segments_to_srt(&input, output, offset)?;
            Ok(())
        }
        Commands::Transcribe { audio, output, offset } => {
            let config = load_config(&cli.config_path, cli.log_level.is_none())?;
            let controller = Controller::with_config(config)?;
            let transcriber = controller.whisper_transcriber()?;

            let output = output.unwrap_or_else(|| audio.with_extension("srt"));
            controller.transcribe_to_srt(&transcriber, &audio, &output, offset).await?;
            Ok(())
        }
        Commands::Translate(args) => {
            let mut config = load_config(&cli.config_path, cli.log_level.is_none())?;
            apply_overrides(&mut config, &args);

            config.validate()
                .context("Configuration validation failed")?;

            run_translate(config, args).await
        }
    }
}

/// Load `conf.json`, creating it with defaults when missing
fn load_config(config_path: &str, apply_log_level: bool) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // A level given on the command line wins over the file
    if apply_log_level {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &TranslateArgs) {
    if let Some(provider) = &args.provider {
        config.translation.provider = provider.clone().into();
    }

    let provider_str = config.translation.provider.to_lowercase_string();
    if let Some(provider_config) = config.translation.available_providers.iter_mut()
        .find(|p| p.provider_type == provider_str)
    {
        if let Some(model) = &args.model {
            provider_config.model = model.clone();
        }
        if let Some(concurrency) = args.concurrency {
            provider_config.concurrent_requests = concurrency;
        }
    }

    if let Some(source_lang) = &args.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &args.target_language {
        config.target_language = target_lang.clone();
    }
}

async fn run_translate(config: Config, args: TranslateArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;

    if args.input_path.is_file() {
        let output_dir = args.input_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        controller.run(args.input_path.clone(), output_dir, args.force_overwrite).await?;
    } else if args.input_path.is_dir() {
        controller.run_folder(args.input_path.clone(), args.force_overwrite).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    Ok(())
}
