//! Source audio download
//!
//! Drives yt-dlp to fetch the best available audio track for a URL into a
//! job's private working directory. Any failure here is a transport error:
//! the caller's URL, the network, or the source itself.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{NocturneError, Result};

/// Output template yt-dlp expands with the source's extension.
const INPUT_TEMPLATE: &str = "input.%(ext)s";

/// URL schemes must be http(s). yt-dlp supports many sites, so validation
/// stays permissive beyond the scheme.
pub fn validate_url(url: &str) -> Result<()> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(())
    } else {
        Err(NocturneError::InvalidUrl)
    }
}

/// Download the best available audio for `url` into `workdir`, returning
/// the path of the downloaded file.
pub async fn download_audio(ytdlp: &Path, url: &str, workdir: &Path) -> Result<PathBuf> {
    let template = workdir.join(INPUT_TEMPLATE);
    debug!(url = %url, workdir = %workdir.display(), "downloading source audio");

    let output = Command::new(ytdlp)
        .arg("-f")
        .arg("bestaudio/best")
        .arg("--no-playlist")
        .arg("-o")
        .arg(&template)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let detail = if output.stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            String::from_utf8_lossy(&output.stderr).into_owned()
        };
        return Err(NocturneError::Transport {
            reason: format!("yt-dlp failed: {}", detail.trim()),
        });
    }

    find_downloaded(workdir)
}

/// Locate the file yt-dlp wrote; the extension is the source's choice.
fn find_downloaded(workdir: &Path) -> Result<PathBuf> {
    for entry in std::fs::read_dir(workdir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && entry.file_name().to_string_lossy().starts_with("input.") {
            return Ok(path);
        }
    }
    Err(NocturneError::Transport {
        reason: "download succeeded but no input file was produced".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_schemes() {
        assert!(validate_url("http://example.com/watch?v=abc").is_ok());
        assert!(validate_url("https://example.com/watch?v=abc").is_ok());
        assert!(validate_url("HTTPS://EXAMPLE.COM/abc").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        for url in ["ftp://example.com", "file:///etc/passwd", "example.com", ""] {
            assert!(
                matches!(validate_url(url), Err(NocturneError::InvalidUrl)),
                "accepted: {url}"
            );
        }
    }

    #[test]
    fn test_find_downloaded_picks_input_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("input.webm"), b"audio").unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), b"x").unwrap();

        let found = find_downloaded(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "input.webm");
    }

    #[test]
    fn test_find_downloaded_fails_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_downloaded(dir.path()).unwrap_err();
        assert!(matches!(err, NocturneError::Transport { .. }));
    }
}
