//! RFC 2047 encoded words for header-like text such as display names and
//! subjects.

use base64::{Engine, engine::general_purpose};

/// Longest encoded word allowed by RFC 2047.
const MAX_ENCODED_WORD_LEN: usize = 75;
const WORD_PREFIX: &str = "=?UTF-8?B?";
const WORD_SUFFIX: &str = "?=";

/// Encodes `text` as one or more `=?UTF-8?B?...?=` words. Printable ASCII
/// that cannot be mistaken for an encoded word is returned unchanged.
pub fn encode_header_text(text: &str) -> String {
    if is_header_safe(text) {
        return text.to_string();
    }

    // Base64 output for n input bytes is 4 * ceil(n / 3).
    let budget = MAX_ENCODED_WORD_LEN - WORD_PREFIX.len() - WORD_SUFFIX.len();
    let max_chunk_bytes = budget / 4 * 3;

    let mut words = Vec::new();
    let mut chunk_start = 0;
    let mut chunk_end = 0;
    for (index, ch) in text.char_indices() {
        let next_end = index + ch.len_utf8();
        if next_end - chunk_start > max_chunk_bytes {
            words.push(encode_word(&text[chunk_start..chunk_end]));
            chunk_start = chunk_end;
        }
        chunk_end = next_end;
    }
    if chunk_start < text.len() {
        words.push(encode_word(&text[chunk_start..]));
    }

    words.join(" ")
}

fn is_header_safe(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c.is_ascii_graphic()) && !text.contains("=?")
}

fn encode_word(chunk: &str) -> String {
    format!(
        "{}{}{}",
        WORD_PREFIX,
        general_purpose::STANDARD.encode(chunk.as_bytes()),
        WORD_SUFFIX
    )
}

/// Decodes any encoded words in `text` into display form. Words that are
/// malformed or use an unsupported charset are kept verbatim.
pub fn decode_header_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    let mut pending_whitespace = String::new();
    let mut previous_was_word = false;

    while !rest.is_empty() {
        if rest.starts_with("=?")
            && let Some((decoded, consumed)) = decode_word(rest)
        {
            // Whitespace separating two adjacent encoded words is not part of the text.
            if !previous_was_word {
                output.push_str(&pending_whitespace);
            }
            pending_whitespace.clear();
            output.push_str(&decoded);
            rest = &rest[consumed..];
            previous_was_word = true;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        if ch.is_whitespace() {
            pending_whitespace.push(ch);
        } else {
            output.push_str(&pending_whitespace);
            pending_whitespace.clear();
            output.push(ch);
            previous_was_word = false;
        }
        rest = &rest[ch.len_utf8()..];
    }

    output.push_str(&pending_whitespace);
    output
}

/// Decodes a single `=?charset?encoding?payload?=` word at the start of
/// `input`, returning the text and the number of bytes consumed.
fn decode_word(input: &str) -> Option<(String, usize)> {
    let body = input.strip_prefix("=?")?;
    let (charset, body) = body.split_once('?')?;
    let (encoding, body) = body.split_once('?')?;
    let end = body.find("?=")?;
    let payload = &body[..end];
    let consumed = input.len() - body.len() + end + 2;
    if payload.contains(char::is_whitespace) {
        return None;
    }

    // Language suffix from RFC 2231, e.g. UTF-8*en.
    let charset = charset.split('*').next().unwrap_or(charset);
    let bytes = match encoding {
        "B" | "b" => general_purpose::STANDARD.decode(payload).ok()?,
        "Q" | "q" => decode_q(payload)?,
        _ => return None,
    };
    let decoded = decode_charset(charset, bytes)?;

    Some((decoded, consumed))
}

fn decode_q(payload: &str) -> Option<Vec<u8>> {
    let raw = payload.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut index = 0;
    while index < raw.len() {
        match raw[index] {
            b'_' => bytes.push(b' '),
            b'=' => {
                let hex = raw.get(index + 1..index + 3)?;
                if !hex.iter().all(u8::is_ascii_hexdigit) {
                    return None;
                }
                let hex = std::str::from_utf8(hex).ok()?;
                bytes.push(u8::from_str_radix(hex, 16).ok()?);
                index += 2;
            }
            byte => bytes.push(byte),
        }
        index += 1;
    }
    Some(bytes)
}

fn decode_charset(charset: &str, bytes: Vec<u8>) -> Option<String> {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => String::from_utf8(bytes).ok(),
        "us-ascii" | "ascii" => bytes
            .is_ascii()
            .then(|| bytes.iter().map(|&b| b as char).collect()),
        "iso-8859-1" | "latin1" => Some(bytes.iter().map(|&b| b as char).collect()),
        _ => None,
    }
}
