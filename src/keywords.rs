//! Keyword-prefixed line reader.
//!
//! A keyword file is plain text with one record per line:
//!
//! ```text
//! sentence: This is a short sentence!
//! float: 3.1415 # this is a float comment
//! integer list: 1 2 3 4 5 6 7
//! ```
//!
//! A query such as `"integer list:"` selects the first line whose leading
//! whitespace-separated tokens equal the query tokens, and yields the tokens
//! that follow them.

use std::any::type_name;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, IoContext, Result};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Controls how value tokens are extracted from a matched line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordOptions {
    /// Drop the value tokens from the first one equal to `comment_marker`.
    pub strip_comments: bool,
    pub comment_marker: char,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self {
            strip_comments: true,
            comment_marker: '#',
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Cut the value tokens at a comment. A comment starts at a token that is
/// exactly the marker, so values such as `#ff0000` survive.
fn strip_comment<'a>(values: &[&'a str], options: &KeywordOptions) -> Vec<&'a str> {
    if !options.strip_comments {
        return values.to_vec();
    }
    let mut buf = [0u8; 4];
    let marker: &str = options.comment_marker.encode_utf8(&mut buf);
    values
        .iter()
        .take_while(|tok| **tok != marker)
        .copied()
        .collect()
}

/// Return the value tokens of the first line whose leading tokens equal
/// `query`, or `None` when no line matches. Keywords are matched against the
/// raw tokens; comments are only stripped from the values.
fn match_tokens<'a, I>(lines: I, query: &[&str], options: &KeywordOptions) -> Option<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().find_map(|line| {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < query.len() {
            return None;
        }
        let matched = query.iter().zip(&tokens).all(|(q, t)| q == t);
        matched.then(|| {
            strip_comment(&tokens[query.len()..], options)
                .into_iter()
                .map(String::from)
                .collect()
        })
    })
}

/// Resolve `keywords` against an in-memory sequence of lines.
///
/// Returns the value tokens of the first matching line joined with single
/// spaces. An empty query never matches.
pub fn resolve<'a, I>(lines: I, keywords: &str, options: &KeywordOptions) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let query: Vec<&str> = keywords.split_whitespace().collect();
    if query.is_empty() {
        return None;
    }
    match_tokens(lines, &query, options).map(|tokens| tokens.join(" "))
}

fn parse_token<T: FromStr>(token: &str, keywords: &str) -> Result<T> {
    token.parse::<T>().map_err(|_| Error::ValueConversion {
        token: token.to_string(),
        target: type_name::<T>(),
        keywords: keywords.to_string(),
    })
}

// ---------------------------------------------------------------------------
// KeywordFile
// ---------------------------------------------------------------------------

/// A keyword document on disk.
///
/// The file is re-opened and scanned on every query; nothing is cached
/// between calls, so each read observes the current contents.
#[derive(Debug, Clone)]
pub struct KeywordFile {
    path: PathBuf,
    options: KeywordOptions,
}

impl KeywordFile {
    /// Bind to `path` with the default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, KeywordOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: KeywordOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::DocumentNotFound { path });
        }
        Ok(Self { path, options })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &KeywordOptions {
        &self.options
    }

    /// Scan the document once and return the value tokens for `keywords`.
    fn value_tokens(&self, keywords: &str) -> Result<Vec<String>> {
        let query: Vec<&str> = keywords.split_whitespace().collect();
        if query.is_empty() {
            return Err(Error::EmptyKeywords);
        }

        debug!("scanning {} for '{}'", self.path.display(), keywords);
        let file = File::open(&self.path).with_path(&self.path)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line.with_path(&self.path)?;
            if let Some(tokens) = match_tokens([line.as_str()], &query, &self.options) {
                debug!("'{}' matched with {} value token(s)", keywords, tokens.len());
                return Ok(tokens);
            }
        }

        Err(Error::KeywordNotFound {
            keywords: keywords.to_string(),
            path: self.path.clone(),
        })
    }

    fn first_token(&self, keywords: &str) -> Result<String> {
        self.value_tokens(keywords)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingValue {
                keywords: keywords.to_string(),
                path: self.path.clone(),
            })
    }

    /// Parse the first value token as `T`.
    pub fn read_value<T: FromStr>(&self, keywords: &str) -> Result<T> {
        let token = self.first_token(keywords)?;
        parse_token(&token, keywords)
    }

    /// Parse every value token as `T`. A matched line without values yields
    /// an empty list.
    pub fn read_list<T: FromStr>(&self, keywords: &str) -> Result<Vec<T>> {
        self.value_tokens(keywords)?
            .iter()
            .map(|tok| parse_token(tok, keywords))
            .collect()
    }

    /// The full value text of the matched line, tokens joined by one space.
    pub fn read_sentence(&self, keywords: &str) -> Result<String> {
        Ok(self.value_tokens(keywords)?.join(" "))
    }

    pub fn read_string(&self, keywords: &str) -> Result<String> {
        self.first_token(keywords)
    }

    pub fn read_double(&self, keywords: &str) -> Result<f64> {
        self.read_value(keywords)
    }

    pub fn read_float(&self, keywords: &str) -> Result<f32> {
        self.read_value(keywords)
    }

    pub fn read_integer(&self, keywords: &str) -> Result<i32> {
        self.read_value(keywords)
    }

    pub fn read_string_list(&self, keywords: &str) -> Result<Vec<String>> {
        self.value_tokens(keywords)
    }

    pub fn read_double_list(&self, keywords: &str) -> Result<Vec<f64>> {
        self.read_list(keywords)
    }

    pub fn read_float_list(&self, keywords: &str) -> Result<Vec<f32>> {
        self.read_list(keywords)
    }

    pub fn read_integer_list(&self, keywords: &str) -> Result<Vec<i32>> {
        self.read_list(keywords)
    }
}
