/*!
 * ffmpeg collaborators.
 *
 * Audio extraction ahead of transcription and subtitle embedding after
 * translation. Both shell out to `ffmpeg` with a hard timeout.
 */

use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{debug, error, info};
use tokio::process::Command;

/// Default time budget for one ffmpeg run
pub const FFMPEG_TIMEOUT: Duration = Duration::from_secs(600);

/// Arguments that pull a 16-bit PCM stereo track out of a video
pub fn extract_audio_args(video_path: &Path, audio_path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), video_path.into()];
    args.extend(
        ["-vn", "-acodec", "pcm_s16le", "-ar", "44100", "-ac", "2"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(audio_path.into());
    args
}

/// Arguments that mux an SRT file into a video as a soft subtitle track
pub fn embed_subtitles_args(video_path: &Path, srt_path: &Path, output_path: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        video_path.into(),
        "-i".into(),
        srt_path.into(),
        "-c".into(),
        "copy".into(),
        "-c:s".into(),
        "mov_text".into(),
        output_path.into(),
    ]
}

/// Extract the audio track of `video_path` into `audio_path` (WAV)
pub async fn extract_audio(video_path: &Path, audio_path: &Path) -> Result<()> {
    if !video_path.exists() {
        return Err(anyhow!("Video file does not exist: {:?}", video_path));
    }

    run_ffmpeg(extract_audio_args(video_path, audio_path), FFMPEG_TIMEOUT).await?;
    info!("Audio extracted to {}", audio_path.display());
    Ok(())
}

/// Embed `srt_path` into `video_path`, writing `output_path`
pub async fn embed_subtitles(video_path: &Path, srt_path: &Path, output_path: &Path) -> Result<()> {
    if !video_path.exists() {
        return Err(anyhow!("Video file does not exist: {:?}", video_path));
    }
    if !srt_path.exists() {
        return Err(anyhow!("Subtitle file does not exist: {:?}", srt_path));
    }

    run_ffmpeg(embed_subtitles_args(video_path, srt_path, output_path), FFMPEG_TIMEOUT).await?;
    info!("Subtitles embedded into {}", output_path.display());
    Ok(())
}

async fn run_ffmpeg(args: Vec<OsString>, timeout: Duration) -> Result<()> {
    debug!("Running ffmpeg {:?}", args);

    let ffmpeg_future = Command::new("ffmpeg").args(&args).kill_on_drop(true).output();

    let output = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| anyhow!("Failed to execute ffmpeg: {}", e))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("ffmpeg timed out after {:?}", timeout));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("ffmpeg failed: {}", filtered);
        return Err(anyhow!("ffmpeg exited with {}: {}", output.status, filtered));
    }

    Ok(())
}

/// Keep the lines of ffmpeg's stderr that explain a failure
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let relevant: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains("error") || lower.contains("invalid") || lower.contains("no such file")
        })
        .collect();

    if relevant.is_empty() {
        stderr.lines().last().unwrap_or_default().trim().to_string()
    } else {
        relevant.join("; ")
    }
}
