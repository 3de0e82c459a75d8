//! MIME parsing and part-tree traversal.
//!
//! Uses `mail-parser` for structural parsing; `part.contents()` already has
//! the content-transfer-encoding (base64, quoted-printable) reversed.

use mail_parser::{Message, MessagePart, MessageParser, MimeHeaders, PartType};

/// Parse a restored message block as a full MIME message (headers + body).
///
/// The leading `From ` separator line is tolerated and skipped. Returns
/// `None` when the block has no parsable structure at all.
pub fn parse_block(block: &str) -> Option<Message<'_>> {
    let bytes = skip_from_line(block.as_bytes());
    if bytes.is_empty() {
        return None;
    }
    MessageParser::default().parse(bytes)
}

/// Whether the message's top-level content type is `multipart/*`.
///
/// Non-multipart messages never carry extractable attachments.
pub fn is_multipart(message: &Message<'_>) -> bool {
    message
        .content_type()
        .is_some_and(|ct| ct.ctype().eq_ignore_ascii_case("multipart"))
}

/// Depth-first iterator over every part of a message, descending into
/// nested `message/rfc822` parts.
///
/// The traversal is lazy and restartable: each call builds a fresh walker
/// over the borrowed part tree, so filtering predicates can be applied (and
/// unit-tested) without decoding any payload.
pub fn walk_parts<'a>(message: &'a Message<'a>) -> PartWalker<'a> {
    PartWalker {
        stack: vec![message.parts.iter()],
    }
}

/// See [`walk_parts`].
pub struct PartWalker<'a> {
    stack: Vec<std::slice::Iter<'a, MessagePart<'a>>>,
}

impl<'a> Iterator for PartWalker<'a> {
    type Item = &'a MessagePart<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(part) => {
                    if let PartType::Message(nested) = &part.body {
                        self.stack.push(nested.parts.iter());
                    }
                    return Some(part);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// The audio-attachment predicate.
///
/// A part qualifies when its content type is `application/octet-stream`,
/// it declares a non-empty filename, and the filename either contains
/// `recording` (any case) or ends in `.mp3`/`.wav`.
pub fn is_audio_attachment(part: &MessagePart<'_>) -> bool {
    let octet_stream = part.content_type().is_some_and(|ct| {
        ct.ctype().eq_ignore_ascii_case("application")
            && ct
                .subtype()
                .is_some_and(|sub| sub.eq_ignore_ascii_case("octet-stream"))
    });
    if !octet_stream {
        return false;
    }

    match part.attachment_name() {
        Some(name) if !name.is_empty() => {
            name.to_lowercase().contains("recording")
                || name.ends_with(".mp3")
                || name.ends_with(".wav")
        }
        _ => false,
    }
}

/// Skip the `From ` separator line at the start of MBOX message bytes.
fn skip_from_line(data: &[u8]) -> &[u8] {
    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
        return b"";
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multipart_fixture() -> String {
        "From 15551234567 Mon Jan 02 03:04:05 2023\n\
         From: +15551234567\n\
         Subject: INCOMING_CALL recording\n\
         MIME-Version: 1.0\n\
         Content-Type: multipart/mixed; boundary=\"b1\"\n\
         \n\
         --b1\n\
         Content-Type: text/plain\n\
         \n\
         Call log entry\n\
         --b1\n\
         Content-Type: application/octet-stream\n\
         Content-Disposition: attachment; filename=\"recording.wav\"\n\
         Content-Transfer-Encoding: base64\n\
         \n\
         SGVsbG8=\n\
         --b1--\n"
            .to_string()
    }

    #[test]
    fn test_parse_block_skips_separator() {
        let raw = multipart_fixture();
        let msg = parse_block(&raw).expect("block should parse");
        assert!(is_multipart(&msg));
    }

    #[test]
    fn test_parse_block_empty_is_none() {
        assert!(parse_block("").is_none());
        assert!(parse_block("From separator-only-no-newline").is_none());
    }

    #[test]
    fn test_walker_finds_audio_part() {
        let raw = multipart_fixture();
        let msg = parse_block(&raw).unwrap();
        let audio: Vec<_> = walk_parts(&msg).filter(|p| is_audio_attachment(p)).collect();
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].contents(), b"Hello");
    }

    #[test]
    fn test_walker_is_restartable() {
        let raw = multipart_fixture();
        let msg = parse_block(&raw).unwrap();
        let first = walk_parts(&msg).count();
        let second = walk_parts(&msg).count();
        assert_eq!(first, second);
        assert!(first >= 2);
    }

    #[test]
    fn test_walker_descends_into_nested_message() {
        let raw = "From x Mon Jan 01 00:00:00 2024\n\
                   Subject: OUTGOING_CALL forwarded\n\
                   MIME-Version: 1.0\n\
                   Content-Type: multipart/mixed; boundary=\"outer\"\n\
                   \n\
                   --outer\n\
                   Content-Type: message/rfc822\n\
                   \n\
                   Subject: inner\n\
                   Content-Type: multipart/mixed; boundary=\"inner\"\n\
                   \n\
                   --inner\n\
                   Content-Type: application/octet-stream\n\
                   Content-Disposition: attachment; filename=\"recording1.wav\"\n\
                   Content-Transfer-Encoding: base64\n\
                   \n\
                   SGVsbG8=\n\
                   --inner--\n\
                   --outer--\n";
        let msg = parse_block(raw).unwrap();
        let audio: Vec<_> = walk_parts(&msg).filter(|p| is_audio_attachment(p)).collect();
        assert_eq!(audio.len(), 1, "nested audio part should be reachable");
    }

    #[test]
    fn test_predicate_rejects_wrong_content_type() {
        let raw = "From x Mon Jan 01 00:00:00 2024\n\
                   Subject: INCOMING_CALL\n\
                   MIME-Version: 1.0\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\n\
                   \n\
                   --b1\n\
                   Content-Type: audio/mpeg\n\
                   Content-Disposition: attachment; filename=\"recording.mp3\"\n\
                   \n\
                   data\n\
                   --b1--\n";
        let msg = parse_block(raw).unwrap();
        assert!(!walk_parts(&msg).any(|p| is_audio_attachment(p)));
    }

    #[test]
    fn test_predicate_rejects_unrelated_filename() {
        let raw = "From x Mon Jan 01 00:00:00 2024\n\
                   Subject: INCOMING_CALL\n\
                   MIME-Version: 1.0\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\n\
                   \n\
                   --b1\n\
                   Content-Type: application/octet-stream\n\
                   Content-Disposition: attachment; filename=\"notes.pdf\"\n\
                   \n\
                   data\n\
                   --b1--\n";
        let msg = parse_block(raw).unwrap();
        assert!(!walk_parts(&msg).any(|p| is_audio_attachment(p)));
    }

    #[test]
    fn test_predicate_accepts_recording_substring_any_case() {
        let raw = "From x Mon Jan 01 00:00:00 2024\n\
                   Subject: INCOMING_CALL\n\
                   MIME-Version: 1.0\n\
                   Content-Type: multipart/mixed; boundary=\"b1\"\n\
                   \n\
                   --b1\n\
                   Content-Type: application/octet-stream\n\
                   Content-Disposition: attachment; filename=\"My-RECORDING.bin\"\n\
                   \n\
                   data\n\
                   --b1--\n";
        let msg = parse_block(raw).unwrap();
        assert!(walk_parts(&msg).any(|p| is_audio_attachment(p)));
    }
}
