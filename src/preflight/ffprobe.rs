//! FFprobe/FFmpeg preflight check.

use super::CheckResult;
use crate::services::ffprobe;

/// Check that a configured ffmpeg tool runs.
pub fn check(name: &str, program: &str) -> CheckResult {
    if ffprobe::is_installed(program) {
        match ffprobe::get_version(program) {
            Ok(version) => CheckResult::ok(name, &format!("installed ({})", version)),
            Err(_) => CheckResult::ok(name, "installed"),
        }
    } else {
        CheckResult::fail(
            name,
            &format!("{} not found", program),
            "Install FFmpeg (sudo apt install ffmpeg) or set the path in [ffmpeg]",
        )
    }
}
