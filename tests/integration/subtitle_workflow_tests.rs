/*!
 * File-to-file workflows through the controller
 */

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use subtitler::app_config::Config;
use subtitler::app_controller::{Controller, ISSUES_LOG_NAME};
use subtitler::subtitle_processor::SubtitleCollection;
use subtitler::transcription::{Transcriber, TranscriptSegment};

use crate::common::{self, mock_translators::*};

/// Returns fixed segments for any audio file
struct FixedTranscriber {
    segments: Vec<TranscriptSegment>,
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<Vec<TranscriptSegment>> {
        Ok(self.segments.clone())
    }
}

fn uppercase_controller() -> (Controller, Arc<UppercaseTranslator>) {
    let translator = Arc::new(UppercaseTranslator::default());
    (Controller::with_translator(Config::default(), translator.clone()), translator)
}

#[tokio::test]
async fn test_run_shouldWriteTranslatedFileNextToLanguageCode() {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(temp_dir.path(), "show.srt").unwrap();
    let out_dir = temp_dir.path().join("out");
    let (controller, _) = uppercase_controller();

    let written = controller.run(input, out_dir.clone(), false).await.unwrap();

    let output = written.expect("output should be written");
    assert_eq!(output, out_dir.join("show.en.srt"));

    let translated = SubtitleCollection::read_srt_file(&output, "en").unwrap();
    assert_eq!(translated.texts(), vec!["HOLA", "MUNDO", "ADIOS"]);
    assert_eq!(translated.entries[1].start.to_string(), "00:00:02,000");
    assert!(!out_dir.join(ISSUES_LOG_NAME).exists());
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(temp_dir.path(), "show.srt").unwrap();
    let out_dir = temp_dir.path().to_path_buf();
    let (controller, translator) = uppercase_controller();

    assert!(controller.run(input.clone(), out_dir.clone(), false).await.unwrap().is_some());
    assert_eq!(translator.call_count(), 3);

    assert!(controller.run(input.clone(), out_dir.clone(), false).await.unwrap().is_none());
    assert_eq!(translator.call_count(), 3);

    assert!(controller.run(input, out_dir, true).await.unwrap().is_some());
    assert_eq!(translator.call_count(), 6);
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let (controller, _) = uppercase_controller();

    let result = controller
        .run(temp_dir.path().join("missing.srt"), temp_dir.path().to_path_buf(), false)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_withFailedCaptions_shouldWriteIssuesLog() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_subtitle(temp_dir.path(), "show.srt").unwrap();
    let controller = Controller::with_translator(Config::default(), Arc::new(FailingOnTranslator::new("Mundo")));

    let output = controller
        .run(input, temp_dir.path().to_path_buf(), false)
        .await
        .unwrap()
        .unwrap();

    let translated = SubtitleCollection::read_srt_file(&output, "en").unwrap();
    assert_eq!(translated.texts(), vec!["HOLA", "Mundo", "ADIOS"]);

    let issues = std::fs::read_to_string(temp_dir.path().join(ISSUES_LOG_NAME)).unwrap();
    assert!(issues.contains("show.srt"));
    assert!(issues.contains("[caption 2]"));
    assert!(!issues.contains("[caption 1]"));
}

#[tokio::test]
async fn test_run_withOversizedCaption_shouldSplitBeforeTranslating() {
    let temp_dir = common::create_temp_dir().unwrap();
    let content = "1\n00:00:00,000 --> 00:00:04,000\nuno dos tres cuatro\n";
    let input = common::create_test_file(temp_dir.path(), "long.srt", content).unwrap();

    let mut config = Config::default();
    config.subtitle.max_chars_per_caption = 10;
    let controller = Controller::with_translator(config, Arc::new(UppercaseTranslator::default()));

    let output = controller
        .run(input, temp_dir.path().to_path_buf(), false)
        .await
        .unwrap()
        .unwrap();

    let translated = SubtitleCollection::read_srt_file(&output, "en").unwrap();
    assert_eq!(translated.texts(), vec!["UNO DOS", "TRES CUATRO"]);
    assert_eq!(translated.entries[0].end.to_string(), "00:00:02,000");
}

#[tokio::test]
async fn test_runFolder_shouldTranslateEachSourceAndIgnoreOutputs() {
    let temp_dir = common::create_temp_dir().unwrap();
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("season1")).unwrap();
    common::create_test_subtitle(root, "a.srt").unwrap();
    common::create_test_subtitle(&root.join("season1"), "b.srt").unwrap();
    common::create_test_file(root, "notes.txt", "not a subtitle").unwrap();

    let (controller, translator) = uppercase_controller();

    let written = controller.run_folder(root.to_path_buf(), false).await.unwrap();
    assert_eq!(written, 2);
    assert!(root.join("a.en.srt").is_file());
    assert!(root.join("season1").join("b.en.srt").is_file());

    // Second pass: sources are skipped, outputs are not picked up as sources
    let written = controller.run_folder(root.to_path_buf(), false).await.unwrap();
    assert_eq!(written, 0);
    assert_eq!(translator.call_count(), 6);
    assert!(!root.join("a.en.en.srt").exists());
}

#[tokio::test]
async fn test_runFolder_withBrokenFile_shouldContinueWithOthers() {
    let temp_dir = common::create_temp_dir().unwrap();
    let root = temp_dir.path();
    common::create_test_file(root, "broken.srt", "   \n\n").unwrap();
    common::create_test_subtitle(root, "good.srt").unwrap();

    let (controller, _) = uppercase_controller();

    let written = controller.run_folder(root.to_path_buf(), false).await.unwrap();

    assert_eq!(written, 1);
    assert!(root.join("good.en.srt").is_file());
    assert!(!root.join("broken.en.srt").exists());
}

#[tokio::test]
async fn test_runFolder_withNoSubtitles_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let (controller, _) = uppercase_controller();

    assert!(controller.run_folder(temp_dir.path().to_path_buf(), false).await.is_err());
}

#[test]
fn test_normalizeFile_shouldWriteSplitDocument() {
    let temp_dir = common::create_temp_dir().unwrap();
    let content = "1\n00:00:00,000 --> 00:00:04,000\nuno dos tres cuatro\n\n2\n00:00:05,000 --> 00:00:06,000\ncinco\n";
    let input = common::create_test_file(temp_dir.path(), "episode.srt", content).unwrap();

    let mut config = Config::default();
    config.subtitle.max_chars_per_caption = 10;
    let controller = Controller::with_config(config).unwrap();

    let output = controller.normalize_file(&input, None).unwrap();

    assert_eq!(output, temp_dir.path().join("episode.normalized.srt"));
    let normalized = SubtitleCollection::read_srt_file(&output, "es").unwrap();
    assert_eq!(normalized.texts(), vec!["uno dos", "tres cuatro", "cinco"]);
    assert_eq!(normalized.entries[2].seq_num, 3);
}

#[test]
fn test_segmentsToSrt_shouldConvertWhisperJson() {
    let temp_dir = common::create_temp_dir().unwrap();
    let json = r#"{"text": "Hola Mundo", "segments": [
        {"id": 0, "start": 0.0, "end": 1.25, "text": " Hola"},
        {"id": 1, "start": 1.25, "end": 2.5, "text": " Mundo"}
    ]}"#;
    let input = common::create_test_file(temp_dir.path(), "talk.json", json).unwrap();
    let controller = Controller::with_config(Config::default()).unwrap();

    let output = controller.segments_to_srt(&input, None, 10.0).unwrap();

    assert_eq!(output, temp_dir.path().join("talk.srt"));
    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("1\n00:00:10,000 --> 00:00:11,250\nHola\n\n2\n"));
}

#[tokio::test]
async fn test_transcribeToSrt_shouldWriteCaptionsFromTranscriber() {
    let temp_dir = common::create_temp_dir().unwrap();
    let audio = common::create_test_file(temp_dir.path(), "audio.wav", "").unwrap();
    let output = temp_dir.path().join("subs").join("audio.srt");

    let transcriber = FixedTranscriber {
        segments: vec![
            TranscriptSegment::new(0.5, 1.5, "Hola"),
            TranscriptSegment::new(1.5, 1.5, "  "),
            TranscriptSegment::new(2.0, 3.0, "Mundo"),
        ],
    };
    let controller = Controller::with_config(Config::default()).unwrap();

    let collection = controller
        .transcribe_to_srt(&transcriber, &audio, &output, 0.0)
        .await
        .unwrap();

    assert_eq!(collection.texts(), vec!["Hola", "Mundo"]);
    let reread = SubtitleCollection::read_srt_file(&output, "es").unwrap();
    assert_eq!(reread.entries, collection.entries);
}

#[tokio::test]
async fn test_whisperTranscriber_withConfiguredKey_shouldBeBuiltFromConfig() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut config = Config::default();
    config.transcription.api_key = "sk-audio".to_string();
    config.transcription.endpoint = "http://127.0.0.1:9".to_string();
    let controller = Controller::with_config(config).unwrap();

    let transcriber = controller.whisper_transcriber().unwrap();
    let output = temp_dir.path().join("missing.srt");
    let result = controller
        .transcribe_to_srt(&transcriber, &temp_dir.path().join("missing.wav"), &output, 0.0)
        .await;

    assert!(result.is_err());
    assert!(!output.exists());
}
