//! Serve command: JSON-lines request/reply loop.
//!
//! Each input line is one request such as `{"type":"LOAD_SETTINGS"}`; each
//! output line is its reply. Replies keep request order.

use super::{spawn_router, PageTarget};
use crate::config::Config;
use crate::messages::{Request, Response, RouterHandle};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Answers requests read from stdin on stdout.
pub struct ServeCommand {
    config: Config,
}

impl ServeCommand {
    /// Creates a new serve command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Serves stdin/stdout until stdin closes.
    pub async fn execute(&self, target: &PageTarget) -> Result<()> {
        let router = spawn_router(&self.config, target)?;
        info!("Serving requests on stdin");

        let stdin = BufReader::new(tokio::io::stdin());
        let handled = serve_lines(&router, stdin, tokio::io::stdout()).await?;

        info!("Input closed after {} requests", handled);
        Ok(())
    }
}

/// Reads requests line by line and writes one reply line per request.
/// Returns the number of requests answered.
pub async fn serve_lines<R, W>(router: &RouterHandle, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!("Received {}", request.kind());
                router.request(request).await?
            }
            Err(e) => {
                warn!("Rejected malformed request: {}", e);
                Response::failure(format!("invalid request: {}", e))
            }
        };

        let mut out = serde_json::to_string(&response).context("Failed to encode reply")?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await.context("Failed to write reply")?;
        writer.flush().await.context("Failed to write reply")?;

        handled += 1;
    }

    Ok(handled)
}
