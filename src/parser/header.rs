//! RFC 5322 header handling: unfolding, encoded-words (RFC 2047), and date
//! parsing for the call-timestamp.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

/// The headers a call-log notification is classified from.
#[derive(Debug, Clone, Default)]
pub struct MessageHeaders {
    /// Decoded subject line (RFC 2047 encoded-words resolved).
    pub subject: String,
    /// Raw `From:` value. For call notifications this is the caller's
    /// phone number, not an email address.
    pub from: String,
    /// Raw `To:` value.
    pub to: String,
    /// Raw `Date:` value.
    pub date: String,
}

/// Extract the classification headers from a restored message block.
///
/// Missing headers resolve to empty strings, never an error.
pub fn parse_message_headers(block: &str) -> MessageHeaders {
    let headers = unfold_headers(header_region(skip_from_line(block)));

    MessageHeaders {
        subject: decode_encoded_words(&get_header(&headers, "subject").unwrap_or_default()),
        from: get_header(&headers, "from").unwrap_or_default(),
        to: get_header(&headers, "to").unwrap_or_default(),
        date: get_header(&headers, "date").unwrap_or_default(),
    }
}

/// Skip the `From ` separator line at the start of an mbox message block.
fn skip_from_line(block: &str) -> &str {
    if block.starts_with("From ") {
        if let Some(pos) = block.find('\n') {
            return &block[pos + 1..];
        }
        return "";
    }
    block
}

/// The header region: everything before the first blank line.
fn header_region(text: &str) -> &str {
    if let Some(pos) = text.find("\n\n") {
        &text[..pos]
    } else if let Some(pos) = text.find("\r\n\r\n") {
        &text[..pos]
    } else {
        text
    }
}

/// Unfold headers: join continuation lines (starting with space or tab) with
/// the previous header.
///
/// Returns a list of `(lowercase_name, raw_value)` pairs.
fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
        // Lines without a colon and not a continuation are silently skipped
    }

    result
}

/// Get the first value for a header name (case-insensitive).
fn get_header(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

// ── RFC 2047 encoded-words ──────────────────────────────────────

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?cmVjb3JkaW5n?="` → `"recording"`
///
/// Malformed tokens are preserved verbatim. Whitespace between two adjacent
/// encoded words is dropped (RFC 2047 §6.2).
pub fn decode_encoded_words(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        if !last_was_encoded || !before.trim().is_empty() {
            result.push_str(before);
        }

        match decode_one_word(&remaining[start..]) {
            Some((text, consumed)) => {
                result.push_str(&text);
                remaining = &remaining[start + consumed..];
                last_was_encoded = true;
            }
            None => {
                result.push_str("=?");
                remaining = &remaining[start + 2..];
                last_was_encoded = false;
            }
        }
    }

    result.push_str(remaining);
    result
}

/// Decode a single `=?charset?enc?text?=` token.
///
/// Returns the decoded text and the number of bytes consumed, or `None` if
/// the token is malformed.
fn decode_one_word(token: &str) -> Option<(String, usize)> {
    let inner = token.strip_prefix("=?")?;
    let (charset, rest) = inner.split_once('?')?;
    let (encoding, rest) = rest.split_once('?')?;
    let end = rest.find("?=")?;
    let encoded = &rest[..end];

    let bytes = match encoding {
        "B" | "b" => decode_base64(encoded)?,
        "Q" | "q" => decode_q(encoded),
        _ => return None,
    };

    let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;
    Some((decode_charset(charset, &bytes), consumed))
}

/// Minimal base64 decoder tolerant of embedded whitespace.
///
/// Returns `None` on any non-alphabet byte or truncated input, so malformed
/// encoded-words fall back to their raw form.
fn decode_base64(input: &str) -> Option<Vec<u8>> {
    fn sextet(c: u8) -> Option<u8> {
        match c {
            b'A'..=b'Z' => Some(c - b'A'),
            b'a'..=b'z' => Some(c - b'a' + 26),
            b'0'..=b'9' => Some(c - b'0' + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }

    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut quad = [0u8; 4];
    let mut filled = 0usize;
    let mut padding = 0usize;

    for &b in input.as_bytes() {
        if b.is_ascii_whitespace() {
            continue;
        }
        if b == b'=' {
            padding += 1;
            quad[filled] = 0;
        } else {
            // Data after padding is malformed
            if padding > 0 {
                return None;
            }
            quad[filled] = sextet(b)?;
        }
        filled += 1;
        if filled == 4 {
            out.push((quad[0] << 2) | (quad[1] >> 4));
            out.push((quad[1] << 4) | (quad[2] >> 2));
            out.push((quad[2] << 6) | quad[3]);
            filled = 0;
        }
    }

    if filled != 0 || padding > 2 {
        return None;
    }
    out.truncate(out.len() - padding);
    Some(out)
}

/// Decode Q-encoding (RFC 2047): underscores → spaces, `=XX` → byte.
fn decode_q(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'=');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

/// Decode bytes using a named charset, falling back to lossy UTF-8.
fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    if charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8") {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    match encoding_rs::Encoding::for_label(charset.as_bytes()) {
        Some(encoding) => {
            let (decoded, _, _) = encoding.decode(bytes);
            decoded.into_owned()
        }
        None => {
            warn!(charset, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

// ── Date parsing ────────────────────────────────────────────────

/// Parse an email date string in RFC 2822 and common broken variants.
///
/// The returned value keeps the UTC offset the header carries; the
/// call-timestamp is formatted in that offset, not normalized to UTC.
/// Dates with no offset at all are treated as UTC.
pub fn parse_date(date_str: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }

    // Remove leading day-of-week: "Thu, " or "Thu "
    let no_dow = strip_day_of_week(trimmed);
    let tz_replaced = replace_named_tz(&no_dow);

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S",
        "%b %d %H:%M:%S %Y",
    ];

    for candidate in [no_dow.as_str(), tz_replaced.as_str()] {
        for fmt in &formats {
            if let Ok(dt) = DateTime::parse_from_str(candidate, fmt) {
                return Some(dt);
            }
            if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
                return Some(Utc.from_utc_datetime(&ndt).fixed_offset());
            }
        }
    }

    warn!(date = trimmed, "Could not parse date");
    None
}

/// Strip a leading day-of-week prefix (e.g. "Thu, " or "Thu ").
fn strip_day_of_week(s: &str) -> String {
    let days = [
        "Mon,", "Tue,", "Wed,", "Thu,", "Fri,", "Sat,", "Sun,", "Mon ", "Tue ", "Wed ", "Thu ",
        "Fri ", "Sat ", "Sun ",
    ];
    for day in &days {
        if let Some(rest) = s.strip_prefix(day) {
            return rest.trim().to_string();
        }
    }
    s.to_string()
}

/// Replace well-known timezone abbreviations with numeric offsets.
fn replace_named_tz(s: &str) -> String {
    let tzs = [
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
    ];
    for (name, offset) in &tzs {
        if let Some(prefix) = s.strip_suffix(name) {
            return format!("{prefix}{offset}");
        }
    }
    s.to_string()
}

/// Format a parsed date as a call-timestamp: `YYYYMMDD_HHMMSS`.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y%m%d_%H%M%S").to_string()
}

/// Current local wall-clock time as a call-timestamp.
///
/// Used as the fallback when a message carries no parsable `Date` header.
pub fn now_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}
