//! Transcript sources
//!
//! The speech recogniser is external. A source yields one [`Utterance`] per
//! capture session and ends when the recogniser does.

use async_trait::async_trait;
use eyre::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// Outcome of one capture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// Recognised text, whitespace-normalised
    Transcript(String),
    /// Capture finished but nothing was heard
    Silence,
    /// Capture was cancelled; any partial text is discarded
    Aborted,
}

/// A finite, non-restartable sequence of utterances
#[async_trait]
pub trait TranscriptSource: Send {
    /// Next utterance, or `None` when the source is exhausted
    async fn next_utterance(&mut self) -> Result<Option<Utterance>>;
}

/// One transcript per line, as written by an external recogniser
///
/// Blank lines are silence; a line equal to the abort marker is an aborted
/// capture, as is a line that is not valid UTF-8. Only a failing reader ends
/// the source early.
pub struct LineSource<R> {
    reader: R,
    abort_marker: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R, abort_marker: impl Into<String>) -> Self {
        Self {
            reader,
            abort_marker: abort_marker.into(),
        }
    }

    fn classify(&self, line: &str) -> Utterance {
        let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            Utterance::Silence
        } else if normalized == self.abort_marker {
            Utterance::Aborted
        } else {
            Utterance::Transcript(normalized)
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> TranscriptSource for LineSource<R> {
    async fn next_utterance(&mut self) -> Result<Option<Utterance>> {
        let mut bytes = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut bytes)
            .await
            .context("Failed to read transcript")?;
        if read == 0 {
            debug!("LineSource::next_utterance: end of input");
            return Ok(None);
        }

        let utterance = match String::from_utf8(bytes) {
            Ok(line) => self.classify(&line),
            Err(e) => {
                warn!(error = %e, "Undecodable transcript line, discarding capture");
                Utterance::Aborted
            }
        };
        debug!(?utterance, "LineSource::next_utterance: read");
        Ok(Some(utterance))
    }
}
