use super::SandboxConfig;
use crate::error::{Error, Result};
use std::io::Write;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

pub(crate) struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
    pub stdout_overflow: bool,
    pub stderr_overflow: bool,
    pub exit_code: i32,
    pub success: bool,
}

/// Write `code` to a temporary script and run it under the configured interpreter
pub(crate) async fn run_script(config: &SandboxConfig, code: &str) -> Result<ScriptOutput> {
    let mut script = tempfile::Builder::new()
        .prefix("cortex-")
        .suffix(&config.script_suffix)
        .tempfile()?;
    script.write_all(code.as_bytes())?;
    script.flush()?;

    let mut cmd = Command::new(&config.interpreter);
    cmd.args(&config.interpreter_args)
        .arg(script.path())
        .current_dir(std::env::temp_dir())
        .env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .env("PYTHONIOENCODING", "utf-8")
        .env("PYTHONDONTWRITEBYTECODE", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::Execution(format!("failed to start {}: {e}", config.interpreter)))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Execution("stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Execution("stderr was not captured".to_string()))?;

    // A char is at most four bytes in UTF-8.
    let limit = u64::try_from(config.max_output_chars)
        .unwrap_or(u64::MAX)
        .saturating_mul(4);
    let run = async {
        tokio::try_join!(
            read_capped(stdout, limit),
            read_capped(stderr, limit),
            child.wait()
        )
    };

    // On timeout the child is dropped, which kills it.
    let ((stdout, stdout_overflow), (stderr, stderr_overflow), status) =
        tokio::time::timeout(config.timeout, run)
            .await
            .map_err(|_| {
                Error::Timeout(u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX))
            })?
            .map_err(|e| Error::Execution(e.to_string()))?;

    Ok(ScriptOutput {
        stdout: String::from_utf8_lossy(&stdout).to_string(),
        stderr: String::from_utf8_lossy(&stderr).to_string(),
        stdout_overflow,
        stderr_overflow,
        exit_code: status.code().unwrap_or(-1),
        success: status.success(),
    })
}

/// Buffer at most `limit` bytes of `reader`, discarding the rest
///
/// Returns the buffered bytes and whether anything was discarded.
async fn read_capped<R>(mut reader: R, limit: u64) -> std::io::Result<(Vec<u8>, bool)>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    (&mut reader).take(limit).read_to_end(&mut buffer).await?;
    let discarded = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok((buffer, discarded > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_capped_stops_buffering_at_limit() {
        let (buffer, overflow) = read_capped(&b"abcdef"[..], 4).await.unwrap();
        assert_eq!(buffer, b"abcd");
        assert!(overflow);

        let (buffer, overflow) = read_capped(&b"abcdef"[..], 6).await.unwrap();
        assert_eq!(buffer, b"abcdef");
        assert!(!overflow);
    }
}
