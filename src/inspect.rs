//! Extracts host/title pairs from zgrab2's JSON-lines output.
//!
//! zgrab2 emits one JSON object per probed host. We only ever need two
//! string fields out of it, `ip` and the HTML `body` buried in the response
//! record, so instead of deserializing the whole document this module scans
//! each line for a named string field and decodes its escapes. The escape
//! decoding is deliberately ASCII-only: `\uXXXX` above 0x7F becomes `?`,
//! which is all a title summary needs.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Sentinel used when a response body yields no usable title.
pub const NO_TITLE: &str = "No title found";

/// Marker written when a host responded without a body field.
pub const NO_BODY: &str = "No response body found";

/// Decodes the standard JSON escape sequences in a raw string value.
///
/// `\uXXXX` decodes only codepoints up to 0x7F; anything higher, and any
/// `\uXXXX` whose four characters are not hex digits, becomes `?`. A `\u`
/// with fewer than four characters left consumes nothing beyond the `u`,
/// and an unrecognized escape passes the escaped character through.
fn unescape(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '\\' || i + 1 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }

        let escaped = chars[i + 1];
        i += 2;
        match escaped {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '/' => out.push('/'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                if i + 4 <= chars.len() {
                    let hex: String = chars[i..i + 4].iter().collect();
                    match u32::from_str_radix(&hex, 16) {
                        Ok(code) if code <= 0x7F => out.push(char::from(code as u8)),
                        _ => out.push('?'),
                    }
                    i += 4;
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Pulls the named string field out of a single JSON line.
///
/// Matches `"key"` followed by a colon and a double-quoted value, anywhere
/// on the line, and returns the unescaped value of the first such match.
/// Multi-line string values are not supported; zgrab2 never emits them.
#[must_use]
pub fn extract_field(line: &str, key: &str) -> Option<String> {
    let needle = format!("\"{key}\"");
    let bytes = line.as_bytes();

    let mut search_from = 0;
    while let Some(found) = line[search_from..].find(&needle) {
        let key_end = search_from + found + needle.len();
        search_from = key_end;

        let mut i = key_end;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b':' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'"' {
            continue;
        }

        // Scan to the closing quote, hopping over escape pairs. Quote and
        // backslash bytes never occur inside a multi-byte UTF-8 sequence,
        // so byte positions found here are valid slice boundaries.
        let value_start = i + 1;
        let mut j = value_start;
        while j < bytes.len() {
            match bytes[j] {
                b'\\' => j += 2,
                b'"' => return Some(unescape(&line[value_start..j])),
                _ => j += 1,
            }
        }
        // Unterminated value; keep looking for another occurrence.
    }

    None
}

/// Finds the text of the first `<title>` element, trimmed.
///
/// The search is case-insensitive and tolerates attributes on the opening
/// tag. Returns [`NO_TITLE`] when the tag is missing, unterminated, or
/// encloses only whitespace.
#[must_use]
pub fn extract_title(html: &str) -> String {
    let lower = html.to_ascii_lowercase();

    let Some(start) = lower.find("<title") else {
        return NO_TITLE.to_owned();
    };
    let Some(gt) = lower[start..].find('>').map(|rel| start + rel) else {
        return NO_TITLE.to_owned();
    };
    let Some(end) = lower[gt..].find("</title>").map(|rel| gt + rel) else {
        return NO_TITLE.to_owned();
    };

    let title = html[gt + 1..end].trim();
    if title.is_empty() {
        NO_TITLE.to_owned()
    } else {
        title.to_owned()
    }
}

/// Reduces one zgrab2 output line to its summary line, or `None` for lines
/// with no `ip` field (zgrab2 chatter, partial writes).
#[must_use]
pub fn summary_line(json_line: &str) -> Option<String> {
    let ip = extract_field(json_line, "ip")?;

    Some(match extract_field(json_line, "body") {
        Some(body) => format!("IP: {ip} - Title: {}", extract_title(&body)),
        None => format!("IP: {ip} - {NO_BODY}"),
    })
}

/// Streams a zgrab2 results file into the summary writer, one line at a
/// time. Lines without an `ip` field are dropped silently.
pub fn append_titles(results: &Path, out: &mut impl Write) -> Result<()> {
    let file =
        File::open(results).with_context(|| format!("failed to read {}", results.display()))?;

    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(summary) = summary_line(&line) {
            writeln!(out, "{summary}")?;
        }
    }

    Ok(())
}
