use anyhow::{Result, Context, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, warn, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::openai::{OpenAI, WhisperTranscriber};
use crate::segmentation;
use crate::subtitle_processor::SubtitleCollection;
use crate::transcription::{self, Transcriber};
use crate::translation::{BatchOutcome, BatchTranslator, TranslationService, Translator, UnitOutcome};

// @module: Application controller for caption processing

/// Name of the per-directory file listing captions kept in the source language
pub const ISSUES_LOG_NAME: &str = "subtitler.issues.log";

/// Main application controller for caption translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Injected translator, built from config on first use when absent
    translator: Option<Arc<dyn Translator>>,

    multi_progress: MultiProgress,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            translator: None,
            multi_progress: MultiProgress::new(),
        })
    }

    /// Create a controller that translates through the given capability
    pub fn with_translator(config: Config, translator: Arc<dyn Translator>) -> Self {
        Self {
            config,
            translator: Some(translator),
            multi_progress: MultiProgress::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn translator(&self) -> Result<Arc<dyn Translator>> {
        if let Some(translator) = &self.translator {
            return Ok(Arc::clone(translator));
        }

        let service = TranslationService::new(self.config.translation.clone(), &self.config.source_language)
            .context("Failed to create translation service")?;
        Ok(Arc::new(service))
    }

    /// Language code used in output file names
    fn target_code(&self) -> String {
        language_utils::normalize_to_part1_or_part2t(&self.config.target_language)
            .unwrap_or_else(|_| self.config.target_language.to_lowercase())
    }

    /// Expected output path for a translated caption file
    pub fn output_path_for(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, output_dir, &self.target_code(), "srt")
    }

    /// Split oversized captions when enabled in the configuration
    pub fn prepare(&self, collection: &SubtitleCollection) -> SubtitleCollection {
        if self.config.subtitle.split_oversized {
            segmentation::normalize(collection, self.config.subtitle.max_chars_per_caption)
        } else {
            collection.clone()
        }
    }

    /// Normalize and translate a document
    ///
    /// Returns the translated document together with the per-caption outcome.
    pub async fn translate_collection(&self, collection: &SubtitleCollection) -> Result<(SubtitleCollection, BatchOutcome)> {
        let prepared = self.prepare(collection);
        let batch = BatchTranslator::new(self.translator()?, self.config.to_batch_options());

        let progress_bar = self.multi_progress.add(ProgressBar::new(prepared.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} captions ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let outcome = batch
            .translate_collection(&prepared, &self.config.target_language, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;

        progress_bar.finish_and_clear();

        let mut translated = outcome.apply_to(&prepared)?;
        translated.source_language = self.config.target_language.clone();

        Ok((translated, outcome))
    }

    /// Translate one SRT file into `output_dir`.
    ///
    /// Returns `None` when the output exists and `force_overwrite` is off.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let start_time = Instant::now();

        if !input_file.is_file() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(&output_dir)?;

        let output_path = self.output_path_for(&input_file, &output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {}, translation already exists (use -f to force overwrite)", input_file.display());
            return Ok(None);
        }

        let source = SubtitleCollection::read_srt_file(&input_file, &self.config.source_language)?;
        info!(
            "Translating {} ({} captions) with {} - {}",
            input_file.display(),
            source.len(),
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        let (translated, outcome) = self.translate_collection(&source).await?;
        translated.write_to_srt(&output_path)?;

        if outcome.failed_count() > 0 {
            let log_path = output_dir.join(ISSUES_LOG_NAME);
            if let Err(e) = Self::write_issues_log(&log_path, &input_file, &outcome) {
                warn!("Failed to write issues log: {}", e);
            } else {
                warn!(
                    "{} caption(s) kept in source language, see {}",
                    outcome.failed_count(),
                    log_path.display()
                );
            }
        }

        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(Some(output_path))
    }

    /// Translate every SRT file below `input_dir`, next to its source.
    ///
    /// Files that are themselves translations into the target language are
    /// ignored. Errors on one file are logged and do not stop the others.
    /// Returns the number of files written.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<usize> {
        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let suffix = format!(".{}", self.target_code());
        let files: Vec<PathBuf> = FileManager::find_files(&input_dir, "srt")?
            .into_iter()
            .filter(|path| {
                path.file_stem()
                    .map(|stem| !stem.to_string_lossy().ends_with(&suffix))
                    .unwrap_or(false)
            })
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let folder_pb = self.multi_progress.add(ProgressBar::new(files.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));

        let mut success_count = 0;
        let mut skip_count = 0;
        let mut error_count = 0;

        for file in &files {
            let file_name = file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = file.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.clone());

            match self.run(file.clone(), output_dir, force_overwrite).await {
                Ok(Some(_)) => success_count += 1,
                Ok(None) => skip_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();
        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors",
            success_count, skip_count, error_count
        );

        Ok(success_count)
    }

    /// Split oversized captions of an SRT file without translating
    pub fn normalize_file(&self, input_file: &Path, output_file: Option<PathBuf>) -> Result<PathBuf> {
        let source = SubtitleCollection::read_srt_file(input_file, &self.config.source_language)?;
        let normalized = segmentation::normalize(&source, self.config.subtitle.max_chars_per_caption);

        let output_path = output_file.unwrap_or_else(|| input_file.with_extension("normalized.srt"));
        normalized.write_to_srt(&output_path)?;

        info!(
            "Normalized {} captions into {} ({})",
            source.len(),
            normalized.len(),
            output_path.display()
        );
        Ok(output_path)
    }

    /// Turn a JSON transcript into an SRT file
    pub fn segments_to_srt(&self, segments_file: &Path, output_file: Option<PathBuf>, offset_secs: f64) -> Result<PathBuf> {
        let segments = transcription::read_segments_file(segments_file)?;
        let output_path = output_file.unwrap_or_else(|| segments_file.with_extension("srt"));

        self.write_segments(segments_file, &segments, &output_path, offset_secs)?;
        Ok(output_path)
    }

    /// Whisper transcriber built from the transcription settings
    ///
    /// The source language is passed to the endpoint as a hint.
    pub fn whisper_transcriber(&self) -> Result<WhisperTranscriber> {
        let settings = &self.config.transcription;
        let api_key = settings.get_api_key(&self.config.translation);
        if api_key.is_empty() {
            return Err(anyhow!(
                "Transcription API key is required (set transcription.api_key or OPENAI_API_KEY)"
            ));
        }

        let client = OpenAI::new(api_key, settings.get_endpoint(&self.config.translation), settings.timeout_secs);
        let language = language_utils::normalize_to_part1_or_part2t(&self.config.source_language).ok();

        Ok(WhisperTranscriber::new(client, settings.model.clone(), language))
    }

    /// Transcribe an audio file through `transcriber` and write the captions
    pub async fn transcribe_to_srt(
        &self,
        transcriber: &dyn Transcriber,
        audio_file: &Path,
        output_file: &Path,
        offset_secs: f64,
    ) -> Result<SubtitleCollection> {
        let segments = transcriber.transcribe(audio_file).await
            .with_context(|| format!("Transcription failed for {}", audio_file.display()))?;

        self.write_segments(audio_file, &segments, output_file, offset_secs)
    }

    fn write_segments(
        &self,
        source_file: &Path,
        segments: &[transcription::TranscriptSegment],
        output_path: &Path,
        offset_secs: f64,
    ) -> Result<SubtitleCollection> {
        let collection = SubtitleCollection::from_segments(
            source_file.to_path_buf(),
            self.config.source_language.clone(),
            segments,
            offset_secs,
        );

        collection.write_to_srt(output_path)?;
        info!("Wrote {} captions to {}", collection.len(), output_path.display());
        Ok(collection)
    }

    /// Append the captions that fell back to the source text to the issues log
    fn write_issues_log(log_path: &Path, input_file: &Path, outcome: &BatchOutcome) -> Result<()> {
        use std::io::Write;

        let mut log_content = format!(
            "Translation issues - {} - {}\n",
            input_file.display(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        for (position, result) in outcome.outcomes.iter().enumerate() {
            if let UnitOutcome::Failed(e) = result {
                log_content.push_str(&format!(
                    "[caption {}] {} attempt(s): {}\n",
                    position + 1,
                    outcome.attempts[position],
                    e
                ));
            }
        }
        log_content.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open {}", log_path.display()))?;
        file.write_all(log_content.as_bytes())?;

        Ok(())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
