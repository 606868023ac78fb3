//! FFprobe/FFmpeg service for music video stream details and thumbnails.

use crate::models::config::FfmpegConfig;
use crate::models::media::{AudioStream, ProbeInfo, VideoStream};
use crate::services::provider::VideoProber;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;

/// Offset of the frame grabbed for thumbnails.
const THUMBNAIL_OFFSET: &str = "00:00:10";

/// FFprobe output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

/// FFprobe stream information.
#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    display_aspect_ratio: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: Option<FfprobeTags>,
}

#[derive(Debug, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// FFprobe format information.
#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Check if a tool answers `-version`.
pub fn is_installed(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// First line of a tool's `-version` output.
pub fn get_version(program: &str) -> Result<String> {
    let output = std::process::Command::new(program).arg("-version").output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().unwrap_or("unknown");

    Ok(first_line.to_string())
}

/// Stream details from ffprobe JSON; a video and an audio stream are required.
fn parse_probe(json: &[u8]) -> Result<ProbeInfo> {
    let ffprobe: FfprobeOutput = serde_json::from_slice(json)?;

    let video = ffprobe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| crate::Error::Probe("no video stream".to_string()))?;
    let audio = ffprobe
        .streams
        .iter()
        .find(|s| s.codec_type == "audio")
        .ok_or_else(|| crate::Error::Probe("no audio stream".to_string()))?;

    let duration = ffprobe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse().ok())
        .unwrap_or(0.0);

    Ok(ProbeInfo {
        duration,
        video: VideoStream {
            codec: video.codec_name.clone().unwrap_or_default(),
            width: video.width.unwrap_or(0),
            height: video.height.unwrap_or(0),
            aspect: video.display_aspect_ratio.clone().unwrap_or_default(),
        },
        audio: AudioStream {
            codec: audio.codec_name.clone().unwrap_or_default(),
            channels: audio.channels.unwrap_or(0),
            language: audio
                .tags
                .as_ref()
                .and_then(|t| t.language.clone())
                .unwrap_or_default(),
        },
    })
}

/// Prober backed by the ffprobe and ffmpeg binaries.
pub struct FfmpegProber {
    ffprobe: String,
    ffmpeg: String,
}

impl FfmpegProber {
    pub fn new(config: &FfmpegConfig) -> Self {
        Self {
            ffprobe: config.ffprobe_path.clone(),
            ffmpeg: config.ffmpeg_path.clone(),
        }
    }
}

#[async_trait]
impl VideoProber for FfmpegProber {
    async fn probe(&self, video: &Path) -> Result<ProbeInfo> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(video)
            .output()
            .await?;

        if !output.status.success() {
            return Err(crate::Error::Probe(format!("ffprobe failed for: {:?}", video)));
        }

        parse_probe(&output.stdout)
    }

    async fn thumbnail(&self, video: &Path, target: &Path) -> Result<()> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-y", "-ss", THUMBNAIL_OFFSET, "-i"])
            .arg(video)
            .args(["-frames:v", "1", "-q:v", "2"])
            .arg(target)
            .output()
            .await?;

        if !output.status.success() || !crate::utils::fs::non_empty_file(target) {
            return Err(crate::Error::Probe(format!(
                "ffmpeg thumbnail failed for {:?}: {}",
                video,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}
