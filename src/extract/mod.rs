//! Single-pass extraction of call-recording audio from one MBOX archive.

pub mod audio;

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::ExtractError;
use crate::model::call::CallRecording;
use crate::parser::{header, mbox, mime};

/// Aggregated outcome of one extraction run.
///
/// Failures never propagate out of [`MboxExtractor::extract`]; each is
/// logged once and recorded here, and the affected unit of work (one
/// message, one attachment, or the whole archive) is skipped. The filename
/// list is the primary caller-visible signal.
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    /// Filenames written, in extraction order. May contain repeats when
    /// same-second call records collide (the later write wins on disk).
    pub extracted: Vec<String>,
    /// Per-unit failures that were logged and skipped.
    pub failures: Vec<ExtractError>,
}

impl ExtractionSummary {
    /// Whether every unit of work succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Extracts call-recording audio attachments from MBOX archives.
///
/// The extraction directory doubles as the archive root: the archive path
/// handed to [`extract`](Self::extract) is resolved relative to it, and
/// output files are written next to the archive.
pub struct MboxExtractor {
    extract_dir: PathBuf,
}

impl MboxExtractor {
    /// Create an extractor rooted at the given extraction directory.
    pub fn new(extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            extract_dir: extract_dir.into(),
        }
    }

    /// Directory archives are read from and audio files are written to.
    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Extract every call-recording audio attachment from one archive.
    ///
    /// `archive_rel_path` is resolved relative to the extraction directory.
    /// An unreadable archive yields an empty file list with a single
    /// archive-level failure entry; per-message and per-attachment failures
    /// are skipped without aborting the run.
    pub fn extract(&self, archive_rel_path: impl AsRef<Path>) -> ExtractionSummary {
        let mut summary = ExtractionSummary::default();
        let archive_path = self.extract_dir.join(archive_rel_path.as_ref());

        // Lossy decode: undecodable byte sequences are replaced, not fatal.
        let content = match std::fs::read(&archive_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                let err = ExtractError::archive_read(&archive_path, e);
                error!(archive = %archive_path.display(), error = %err, "Failed to read MBOX archive");
                summary.failures.push(err);
                return summary;
            }
        };

        let blocks = mbox::split_blocks(&content);

        let mut messages = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            match mime::parse_block(block) {
                Some(message) => messages.push((block.as_str(), message)),
                None => {
                    warn!(index, "Failed to parse message block, skipping");
                    summary.failures.push(ExtractError::MessageParse { index });
                }
            }
        }
        info!(count = messages.len(), archive = %archive_path.display(), "Found messages in MBOX archive");

        for (block, message) in &messages {
            self.extract_from_message(block, message, &mut summary);
        }

        summary
    }

    /// Classify one parsed message and persist its matching audio parts.
    fn extract_from_message(
        &self,
        block: &str,
        message: &mail_parser::Message<'_>,
        summary: &mut ExtractionSummary,
    ) {
        let headers = header::parse_message_headers(block);
        if !CallRecording::subject_matches(&headers.subject) {
            return;
        }

        let timestamp = match header::parse_date(&headers.date) {
            Some(dt) => header::format_timestamp(&dt),
            None => {
                warn!(date = %headers.date, "Failed to parse date, using current time");
                summary.failures.push(ExtractError::DateParse {
                    value: headers.date.clone(),
                });
                header::now_timestamp()
            }
        };

        let call =
            CallRecording::from_headers(&headers.subject, &headers.from, &headers.to, timestamp);
        let filename = call.audio_filename();

        if !mime::is_multipart(message) {
            return;
        }

        for part in mime::walk_parts(message) {
            if !mime::is_audio_attachment(part) {
                continue;
            }
            let payload = part.contents();
            if payload.is_empty() {
                continue;
            }
            match audio::write_audio(&self.extract_dir, &filename, payload) {
                Ok(name) => summary.extracted.push(name),
                Err(e) => {
                    warn!(filename = %filename, error = %e, "Failed to save audio file");
                    summary.failures.push(e);
                }
            }
        }
    }
}
