//! Call-log classification: direction, phone number, and output filename.

/// Direction of a recorded call, derived from the subject marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

/// A classified call-recording notification.
///
/// Built from the subject, `From`/`To` headers, and a pre-formatted
/// call-timestamp. The relevant party's phone number is the `To` header for
/// outgoing calls and `From` otherwise, with the leading `+` stripped and no
/// other characters altered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecording {
    pub direction: CallDirection,
    pub phone_number: String,
    pub timestamp: String,
}

/// Subject markers identifying a call-log notification.
const OUTGOING_MARKER: &str = "OUTGOING_CALL";
const INCOMING_MARKER: &str = "INCOMING_CALL";

impl CallRecording {
    /// Whether a subject line identifies a call-recording notification:
    /// it contains `OUTGOING_CALL`, `INCOMING_CALL`, or the
    /// case-insensitive substring `recording`.
    pub fn subject_matches(subject: &str) -> bool {
        subject.contains(OUTGOING_MARKER)
            || subject.contains(INCOMING_MARKER)
            || subject.to_lowercase().contains("recording")
    }

    /// Classify a matching message's headers into a call record.
    ///
    /// Subjects without an explicit direction marker (matched only via
    /// `recording`) default to incoming, selecting the `From` number.
    pub fn from_headers(subject: &str, from: &str, to: &str, timestamp: String) -> Self {
        let direction = if subject.contains(OUTGOING_MARKER) {
            CallDirection::Outgoing
        } else {
            CallDirection::Incoming
        };
        let phone_number = match direction {
            CallDirection::Outgoing => strip_plus(to),
            CallDirection::Incoming => strip_plus(from),
        };
        Self {
            direction,
            phone_number,
            timestamp,
        }
    }

    /// Output filename for the extracted audio.
    ///
    /// The `.mp3` extension is applied unconditionally, regardless of the
    /// source attachment's extension. With second-granularity timestamps and
    /// no per-attachment disambiguator, identical call records overwrite
    /// each other at the destination path.
    pub fn audio_filename(&self) -> String {
        format!("call_{}_{}.mp3", self.phone_number, self.timestamp)
    }
}

/// Trim whitespace and strip the leading `+` from a phone-number header.
fn strip_plus(raw: &str) -> String {
    raw.trim().trim_start_matches('+').to_string()
}
