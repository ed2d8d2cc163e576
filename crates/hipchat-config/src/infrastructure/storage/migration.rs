//! Schema migrations of the configuration file.
//!
//! A migration is a detection predicate plus a rewrite of the raw file text.
//! Migrations run before the file is parsed, so an old file never reaches the
//! deserializer.  Rewrites only touch the tokens they rename; every other
//! byte of the file is kept.
//!
//! # v0.1 → v0.2
//!
//! Release 0.1 stored the default room under `roomId`.  Project overrides,
//! added later, also use `roomId` for their own room, so the rename is limited
//! to the global section: the text before the first `[[...]]` array-of-tables
//! header.
//!
//! ```text
//! [hipchat]                      [hipchat]
//! roomId = "12345"        ──►    defaultRoomId = "12345"
//! notify = true                  notify = true
//! ```
//!
//! Only lines that start outside a string count as key lines.  A token or
//! room id saved as a multi-line string may hold a line reading
//! `roomId = ...`; that text is a value and is never renamed.
//!
//! A global section that already has `defaultRoomId` is current, even if a
//! stray `roomId` line survives from a hand edit.  The deserializer ignores
//! the stray key and the next save drops it.
//!
//! A migrated file no longer matches the predicate, so running the
//! migrations a second time is a no-op.

use std::io;
use std::ops::Range;
use std::sync::OnceLock;

use hipchat_core::domain::keys::{DEFAULT_ROOM_ID_KEY, DEFAULT_ROOM_ID_KEY_V0_1};
use regex::Regex;
use thiserror::Error;

/// Error type for migration steps.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid key pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not write migrated text: {0}")]
    Write(#[from] io::Error),
}

/// One schema upgrade step.
pub struct Migration {
    /// Human-readable name, used in logs.
    pub name: &'static str,
    applies: fn(&str) -> Result<bool, MigrationError>,
    rewrite: fn(&str) -> Result<String, MigrationError>,
}

impl Migration {
    pub fn applies(&self, text: &str) -> Result<bool, MigrationError> {
        (self.applies)(text)
    }

    pub fn rewrite(&self, text: &str) -> Result<String, MigrationError> {
        (self.rewrite)(text)
    }
}

/// All migrations, oldest first.
pub static MIGRATIONS: &[Migration] = &[Migration {
    name: "v0.1 -> v0.2: rename roomId to defaultRoomId",
    applies: has_legacy_default_room_key,
    rewrite: rename_legacy_default_room_key,
}];

/// Result of running the migrations over a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedText {
    pub text: String,
    /// Names of the migrations that were applied, in order.
    pub applied: Vec<&'static str>,
}

/// Applies every migration whose predicate matches, in order.
///
/// Returns `Ok(None)` when no migration applies, meaning the file is already
/// current and must not be rewritten.
///
/// # Errors
///
/// [`MigrationError::Pattern`] if a key pattern fails to compile.
pub fn migrate_text(text: &str) -> Result<Option<MigratedText>, MigrationError> {
    let mut current: Option<String> = None;
    let mut applied = Vec::new();
    for migration in MIGRATIONS {
        let input = current.as_deref().unwrap_or(text);
        if migration.applies(input)? {
            current = Some(migration.rewrite(input)?);
            applied.push(migration.name);
        }
    }
    Ok(current.map(|text| MigratedText { text, applied }))
}

// ── Key scanning ──────────────────────────────────────────────────────────────

/// `key =` at the start of a line, optionally indented and optionally quoted.
const LINE_KEY_PATTERN: &str = r#"^[ \t]*"?([A-Za-z0-9_-]+)"?[ \t]*="#;

fn line_key_regex() -> Result<&'static Regex, regex::Error> {
    static RE: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = RE.get() {
        return Ok(re);
    }
    let re = Regex::new(LINE_KEY_PATTERN)?;
    Ok(RE.get_or_init(|| re))
}

/// A bare key found at the start of a global-section line.
struct KeySpan<'a> {
    name: &'a str,
    range: Range<usize>,
}

#[derive(Clone, Copy)]
enum Lexeme {
    Normal,
    Comment,
    Basic,
    Literal,
    MultilineBasic,
    MultilineLiteral,
}

/// Byte offsets of the global-section lines that begin outside any string
/// or comment.  Scanning stops at the first `[[` header.
fn global_line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = Vec::new();
    let mut state = Lexeme::Normal;
    let mut at_line_start = true;
    let mut i = 0;

    while i < bytes.len() {
        if at_line_start {
            at_line_start = false;
            if matches!(state, Lexeme::Normal) {
                if text[i..].trim_start_matches([' ', '\t']).starts_with("[[") {
                    break;
                }
                starts.push(i);
            }
        }

        let rest = &bytes[i..];
        let (next, advance) = match (state, rest[0]) {
            (Lexeme::Normal, _) if rest.starts_with(b"\"\"\"") => (Lexeme::MultilineBasic, 3),
            (Lexeme::Normal, _) if rest.starts_with(b"'''") => (Lexeme::MultilineLiteral, 3),
            (Lexeme::Normal, b'"') => (Lexeme::Basic, 1),
            (Lexeme::Normal, b'\'') => (Lexeme::Literal, 1),
            (Lexeme::Normal, b'#') => (Lexeme::Comment, 1),
            (Lexeme::Basic | Lexeme::MultilineBasic, b'\\') => (state, 2),
            (Lexeme::Basic, b'"') | (Lexeme::Literal, b'\'') => (Lexeme::Normal, 1),
            // Up to two quotes may precede the closing delimiter.
            (Lexeme::MultilineBasic, b'"') if rest.starts_with(b"\"\"\"") => {
                (Lexeme::Normal, quote_run(rest, b'"'))
            }
            (Lexeme::MultilineLiteral, b'\'') if rest.starts_with(b"'''") => {
                (Lexeme::Normal, quote_run(rest, b'\''))
            }
            // Single-line strings and comments end at the newline.
            (Lexeme::Comment | Lexeme::Basic | Lexeme::Literal, b'\n') => (Lexeme::Normal, 1),
            _ => (state, 1),
        };
        if rest[..advance.min(rest.len())].contains(&b'\n') {
            at_line_start = true;
        }
        state = next;
        i += advance;
    }
    starts
}

fn quote_run(rest: &[u8], quote: u8) -> usize {
    rest.iter().take(5).take_while(|&&b| b == quote).count()
}

fn global_keys(text: &str) -> Result<Vec<KeySpan<'_>>, regex::Error> {
    let re = line_key_regex()?;
    let keys = global_line_starts(text)
        .into_iter()
        .filter_map(|start| {
            let end = text[start..].find('\n').map_or(text.len(), |n| start + n);
            let key = re.captures(&text[start..end])?.get(1)?;
            Some(KeySpan {
                name: key.as_str(),
                range: start + key.start()..start + key.end(),
            })
        })
        .collect();
    Ok(keys)
}

// ── v0.1 → v0.2 ───────────────────────────────────────────────────────────────

fn has_legacy_default_room_key(text: &str) -> Result<bool, MigrationError> {
    let keys = global_keys(text)?;
    let has = |name: &str| keys.iter().any(|key| key.name == name);
    Ok(has(DEFAULT_ROOM_ID_KEY_V0_1) && !has(DEFAULT_ROOM_ID_KEY))
}

fn rename_legacy_default_room_key(text: &str) -> Result<String, MigrationError> {
    let mut migrated = String::with_capacity(text.len() + DEFAULT_ROOM_ID_KEY.len());
    let mut copied = 0;
    for key in global_keys(text)? {
        if key.name == DEFAULT_ROOM_ID_KEY_V0_1 {
            migrated.push_str(&text[copied..key.range.start]);
            migrated.push_str(DEFAULT_ROOM_ID_KEY);
            copied = key.range.end;
        }
    }
    migrated.push_str(&text[copied..]);
    Ok(migrated)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
