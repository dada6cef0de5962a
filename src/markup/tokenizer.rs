//! Chunk-tolerant markup tokenizer.
//!
//! Input arrives in arbitrary pieces; anything that cannot be tokenized yet
//! (a tag cut in half, an entity missing its `;`, the tail of a script body)
//! stays buffered until the next chunk or [`Tokenizer::finish`].

use std::borrow::Cow;

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::BytesStart;

/// Elements whose body is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Longest reference name (between `&` and `;`) that is looked up.
const MAX_REFERENCE_LEN: usize = 32;

/// A lexical unit of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr=...>` or `<name/>`.
    Start {
        /// Lowercased tag name.
        name: String,
        /// Attributes in source order, keys lowercased, values entity-decoded.
        attrs: Vec<(String, String)>,
        /// Whether the tag ended in `/>`.
        self_closing: bool,
    },
    /// `</name>`.
    End {
        /// Lowercased tag name.
        name: String,
    },
    /// Character data, entity-decoded (except inside raw-text elements).
    Text(String),
}

enum Scan {
    Emit(Token, usize),
    Skip(usize),
    Wait,
}

/// Incremental tokenizer holding only the not-yet-tokenized tail of the input.
#[derive(Debug, Default)]
pub struct Tokenizer {
    buf: String,
    raw_text: Option<String>,
}

impl Tokenizer {
    /// Creates an empty tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and pushes every token that is now complete onto `out`.
    pub fn feed(&mut self, chunk: &str, out: &mut Vec<Token>) {
        self.buf.push_str(chunk);
        self.drain(false, out);
    }

    /// Flushes whatever is still buffered, treating the input as finished.
    pub fn finish(&mut self, out: &mut Vec<Token>) {
        self.drain(true, out);
        self.buf.clear();
        self.raw_text = None;
    }

    /// Number of bytes waiting for more input.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    fn drain(&mut self, eof: bool, out: &mut Vec<Token>) {
        let mut pos = 0;
        while pos < self.buf.len() {
            match scan(&self.buf[pos..], &mut self.raw_text, eof) {
                Scan::Emit(token, used) => {
                    out.push(token);
                    pos += used;
                }
                Scan::Skip(used) => pos += used,
                Scan::Wait => break,
            }
        }
        self.buf.drain(..pos);
    }
}

fn scan(rest: &str, raw_text: &mut Option<String>, eof: bool) -> Scan {
    if let Some(element) = raw_text.as_deref() {
        let (scan, ended) = scan_raw_text(rest, element, eof);
        if ended {
            *raw_text = None;
        }
        return scan;
    }

    if rest.starts_with('<') {
        scan_markup(rest, raw_text, eof)
    } else {
        scan_text(rest, eof)
    }
}

/// Scans a raw-text body; the flag reports whether the body has ended.
fn scan_raw_text(rest: &str, element: &str, eof: bool) -> (Scan, bool) {
    let bytes = rest.as_bytes();
    let needle_len = element.len() + 2;
    let end = rest.match_indices("</").map(|(i, _)| i).find(|&i| {
        bytes.len() >= i + needle_len
            && bytes[i + 2..i + needle_len].eq_ignore_ascii_case(element.as_bytes())
    });

    match end {
        Some(0) => (Scan::Skip(0), true),
        Some(i) => (Scan::Emit(Token::Text(rest[..i].to_string()), i), true),
        None if eof => (Scan::Emit(Token::Text(rest.to_string()), rest.len()), true),
        None => {
            // Hold back enough bytes to recognize an end tag split across chunks.
            let mut safe = rest.len().saturating_sub(needle_len);
            while safe > 0 && !rest.is_char_boundary(safe) {
                safe -= 1;
            }
            if safe == 0 {
                (Scan::Wait, false)
            } else {
                (Scan::Emit(Token::Text(rest[..safe].to_string()), safe), false)
            }
        }
    }
}

fn scan_markup(rest: &str, raw_text: &mut Option<String>, eof: bool) -> Scan {
    let incomplete = || if eof { Scan::Skip(rest.len()) } else { Scan::Wait };

    if rest.starts_with("<!--") {
        return match rest[4..].find("-->") {
            Some(end) => Scan::Skip(4 + end + 3),
            None => incomplete(),
        };
    }

    // A lone '<' at the end of a chunk could still become anything.
    let Some(next) = rest[1..].chars().next() else {
        return if eof {
            Scan::Emit(Token::Text("<".to_string()), 1)
        } else {
            Scan::Wait
        };
    };

    match next {
        '!' | '?' => match rest.find('>') {
            Some(end) => Scan::Skip(end + 1),
            None => incomplete(),
        },
        '/' => match rest.find('>') {
            Some(end) => {
                let name = rest[2..end]
                    .trim_start()
                    .split(|c: char| c.is_ascii_whitespace() || c == '/')
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                if name.is_empty() {
                    Scan::Skip(end + 1)
                } else {
                    Scan::Emit(Token::End { name }, end + 1)
                }
            }
            None => incomplete(),
        },
        c if c.is_ascii_alphabetic() => match find_tag_end(rest) {
            Some(end) => {
                let token = parse_start_tag(&rest[1..end]);
                if let Token::Start {
                    name,
                    self_closing: false,
                    ..
                } = &token
                    && RAW_TEXT_ELEMENTS.contains(&name.as_str())
                {
                    *raw_text = Some(name.clone());
                }
                Scan::Emit(token, end + 1)
            }
            None => incomplete(),
        },
        _ => Scan::Emit(Token::Text("<".to_string()), 1),
    }
}

fn scan_text(rest: &str, eof: bool) -> Scan {
    if let Some(end) = rest.find('<') {
        return Scan::Emit(Token::Text(decode_entities(&rest[..end]).into_owned()), end);
    }
    if eof {
        return Scan::Emit(Token::Text(decode_entities(rest).into_owned()), rest.len());
    }

    // Keep a possibly unfinished entity for the next chunk.
    let cut = rest.rfind('&').unwrap_or(rest.len());
    if cut == 0 {
        Scan::Wait
    } else {
        Scan::Emit(Token::Text(decode_entities(&rest[..cut]).into_owned()), cut)
    }
}

/// Finds the `>` closing a start tag, ignoring any inside quoted attribute values.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut after_eq = false;
    for (i, &b) in rest.as_bytes().iter().enumerate().skip(1) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'>' => return Some(i),
                b'"' | b'\'' if after_eq => {
                    quote = Some(b);
                    after_eq = false;
                }
                b'=' => after_eq = true,
                b if b.is_ascii_whitespace() => {}
                _ => after_eq = false,
            },
        }
    }
    None
}

fn parse_start_tag(content: &str) -> Token {
    let (content, self_closing) = match content.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (content, false),
    };
    let name_len = content
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(content.len());
    let name = content[..name_len].to_ascii_lowercase();

    Token::Start {
        attrs: parse_attributes(content, name_len),
        name,
        self_closing,
    }
}

/// Parses HTML-style attributes (unquoted and valueless forms allowed).
///
/// Stops at the first syntax error and keeps what was read so far.
fn parse_attributes(content: &str, name_len: usize) -> Vec<(String, String)> {
    let start = BytesStart::from_content(content, name_len);
    let mut attrs = Vec::new();
    for attr in start.html_attributes().with_checks(false) {
        let Ok(attr) = attr else {
            break;
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let raw = String::from_utf8_lossy(&attr.value);
        attrs.push((key, decode_entities(&raw).into_owned()));
    }
    attrs
}

/// Decodes named HTML5 and numeric character references.
///
/// Each `&name;` is resolved on its own. Unknown references and bare `&`
/// are kept verbatim, so decoding never depends on where text was split.
#[must_use]
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let resolved = reference_end(tail)
            .and_then(|end| resolve_reference(&tail[..end]).map(|value| (end, value)));
        match resolved {
            Some((end, value)) => {
                out.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Position of the `;` ending a reference name at the start of `tail`.
fn reference_end(tail: &str) -> Option<usize> {
    tail.char_indices()
        .take(MAX_REFERENCE_LEN + 1)
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '#'))
        .filter(|&(_, c)| c == ';')
        .map(|(i, _)| i)
}

fn resolve_reference(name: &str) -> Option<Cow<'static, str>> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code)
            .filter(|c| *c != '\0')
            .map(|c| Cow::Owned(c.to_string()));
    }
    resolve_html5_entity(name).map(Cow::Borrowed)
}
