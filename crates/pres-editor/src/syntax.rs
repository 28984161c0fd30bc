//! Syntax definitions — the per-file-type data the lexer and the state
//! machine consult.
//!
//! A definition is four marker sets plus bookkeeping:
//!
//! | Field | Used for |
//! |-------|----------|
//! | `keywords` | words reclassified as keywords by the lexer |
//! | `comments` | operator tokens that start a comment running to end of line |
//! | `strings` | operator tokens that open and close a single-line string |
//! | `block_start` / `block_end` | operator tokens that open and close a block spanning lines |
//!
//! Definitions are loaded from JSON. A built-in set is compiled into the
//! binary; a user file (`<config_dir>/pres/syntax.json`) replaces built-in
//! languages by name and adds new ones. A definition that leaves out any
//! marker set is rejected with [`SyntaxError::MissingField`]: an empty list
//! is fine, a missing one is a mistake.
//!
//! ```json
//! {
//!   "colors": { "keyword": "bright-magenta" },
//!   "languages": [
//!     { "name": "python", "extensions": ["py"],
//!       "keywords": ["def"], "comments": ["#"], "strings": ["'", "\""],
//!       "block_start": ["'''"], "block_end": ["'''"] }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const BUILTIN: &str = include_str!("builtin_syntax.json");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("syntax definition `{language}` is missing required field `{field}`")]
    MissingField {
        language: String,
        field: &'static str,
    },

    #[error("malformed syntax definitions: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read syntax file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// SyntaxDefinition
// ---------------------------------------------------------------------------

/// Markers and keywords for one file type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxDefinition {
    name: String,
    extensions: Vec<String>,
    keywords: HashSet<String>,
    comments: Vec<String>,
    strings: Vec<String>,
    block_start: Vec<String>,
    block_end: Vec<String>,
}

impl SyntaxDefinition {
    /// A definition with no keywords and no markers.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // -- Builders -----------------------------------------------------------

    #[must_use]
    pub fn with_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_keywords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = words.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_comments<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_strings<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strings = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_blocks<I, J, S, T>(mut self, start: I, end: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        self.block_start = start.into_iter().map(Into::into).collect();
        self.block_end = end.into_iter().map(Into::into).collect();
        self
    }

    // -- Queries ------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    #[must_use]
    pub fn is_comment_start(&self, text: &str) -> bool {
        self.comments.iter().any(|m| m == text)
    }

    #[must_use]
    pub fn is_string_delimiter(&self, text: &str) -> bool {
        self.strings.iter().any(|m| m == text)
    }

    #[must_use]
    pub fn is_block_start(&self, text: &str) -> bool {
        self.block_start.iter().any(|m| m == text)
    }

    #[must_use]
    pub fn is_block_end(&self, text: &str) -> bool {
        self.block_end.iter().any(|m| m == text)
    }

    /// Either a block start or a block end marker.
    #[must_use]
    pub fn is_block_marker(&self, text: &str) -> bool {
        self.is_block_start(text) || self.is_block_end(text)
    }

    /// Whether `text` is exactly one of the comment, string or block markers.
    #[must_use]
    pub fn is_marker(&self, text: &str) -> bool {
        self.is_comment_start(text) || self.is_string_delimiter(text) || self.is_block_marker(text)
    }

    /// Whether `text` is a proper or full prefix of any marker. The lexer
    /// keeps growing an operator token while this holds, so multi-character
    /// markers such as `'''` or `<!--` come out as one token.
    #[must_use]
    pub fn is_marker_prefix(&self, text: &str) -> bool {
        self.comments
            .iter()
            .chain(&self.strings)
            .chain(&self.block_start)
            .chain(&self.block_end)
            .any(|m| m.starts_with(text))
    }
}

// ---------------------------------------------------------------------------
// JSON form
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SyntaxFile {
    #[serde(default)]
    colors: BTreeMap<String, String>,
    #[serde(default)]
    languages: Vec<RawDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    name: String,
    #[serde(default)]
    extensions: Vec<String>,
    keywords: Option<Vec<String>>,
    comments: Option<Vec<String>>,
    strings: Option<Vec<String>>,
    block_start: Option<Vec<String>>,
    block_end: Option<Vec<String>>,
}

impl TryFrom<RawDefinition> for SyntaxDefinition {
    type Error = SyntaxError;

    fn try_from(raw: RawDefinition) -> Result<Self, Self::Error> {
        let RawDefinition {
            name,
            extensions,
            keywords,
            comments,
            strings,
            block_start,
            block_end,
        } = raw;

        let require = |field: &'static str, value: Option<Vec<String>>| {
            value.ok_or_else(|| SyntaxError::MissingField {
                language: name.clone(),
                field,
            })
        };

        let keywords = require("keywords", keywords)?;
        let comments = require("comments", comments)?;
        let strings = require("strings", strings)?;
        let block_start = require("block_start", block_start)?;
        let block_end = require("block_end", block_end)?;

        Ok(Self::new(name)
            .with_extensions(extensions)
            .with_keywords(keywords)
            .with_comments(comments)
            .with_strings(strings)
            .with_blocks(block_start, block_end))
    }
}

// ---------------------------------------------------------------------------
// SyntaxSet
// ---------------------------------------------------------------------------

/// All known definitions, looked up by file extension.
#[derive(Debug, Clone, Default)]
pub struct SyntaxSet {
    languages: Vec<SyntaxDefinition>,
    colors: BTreeMap<String, String>,
}

impl SyntaxSet {
    /// The definitions compiled into the binary.
    ///
    /// # Errors
    ///
    /// Only if the embedded JSON is broken, which the tests rule out.
    pub fn builtin() -> Result<Self, SyntaxError> {
        Self::from_json(BUILTIN)
    }

    /// Parse a syntax file.
    ///
    /// # Errors
    ///
    /// [`SyntaxError::Parse`] for malformed JSON,
    /// [`SyntaxError::MissingField`] for an incomplete definition.
    pub fn from_json(json: &str) -> Result<Self, SyntaxError> {
        let file: SyntaxFile = serde_json::from_str(json)?;
        let languages = file
            .languages
            .into_iter()
            .map(SyntaxDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            languages,
            colors: file.colors,
        })
    }

    /// Load a syntax file. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// An unreadable file, malformed JSON, or an incomplete definition.
    pub fn load(path: &Path) -> Result<Option<Self>, SyntaxError> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let set = Self::from_json(&json)?;
                tracing::debug!(path = %path.display(), languages = set.languages.len(), "loaded syntax file");
                Ok(Some(set))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SyntaxError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Layer `other` on top: same-named languages are replaced, new ones
    /// added, color overrides merged.
    pub fn merge(&mut self, other: Self) {
        for def in other.languages {
            if let Some(existing) = self.languages.iter_mut().find(|d| d.name == def.name) {
                *existing = def;
            } else {
                self.languages.push(def);
            }
        }
        self.colors.extend(other.colors);
    }

    /// The definition for a file extension (without the dot), ignoring case.
    /// Later definitions win when two claim the same extension.
    #[must_use]
    pub fn for_extension(&self, ext: &str) -> Option<&SyntaxDefinition> {
        self.languages.iter().rev().find(|def| {
            def.extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
    }

    /// The definition for a path, by its extension.
    #[must_use]
    pub fn for_path(&self, path: &Path) -> Option<&SyntaxDefinition> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.for_extension(ext))
    }

    /// Look a definition up by name or, failing that, by extension.
    #[must_use]
    pub fn find(&self, name_or_ext: &str) -> Option<&SyntaxDefinition> {
        self.languages
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name_or_ext))
            .or_else(|| self.for_extension(name_or_ext))
    }

    /// Color overrides by token class name, as written in the file.
    #[must_use]
    pub const fn colors(&self) -> &BTreeMap<String, String> {
        &self.colors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
