//! Frontmatter parsing for guide files.
//!
//! Guides from different eras carry one of two metadata encodings at the
//! top of the file:
//!
//! - a fenced block delimited by lines of exactly `---` or `-----`,
//!   decoded as a YAML mapping, or
//! - leading lines of the shape `:key = value` / `:key: value` /
//!   `:key value`, with optional single/double quoting and trailing
//!   `# comment`.
//!
//! The parser splits raw file content into a typed [`Metadata`] map and the
//! remaining body. A file with no recognized block yields an empty map,
//! never an error.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{HowtoError, Result};

/// One `:key = value` metadata line. Adapted from the dotenv line grammar:
/// quoted or bare values, trailing comments ignored.
static META_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"^:\s*(?P<key>\w+)(?:\s*=\s*|:\s+|\s+)(?:'(?P<single>(?:\\'|[^'])*)'|"(?P<double>(?:\\"|[^"])*)"|(?P<bare>[^#\r\n]+))?\s*(?:#.*)?$"##,
    )
    .unwrap_or_else(|err| panic!("invalid META_LINE regex: {err}"))
});

/// A typed metadata value decoded from either encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// `true` / `false`.
    Bool(bool),
    /// All-digit bare values and YAML integers.
    Int(i64),
    /// Everything else.
    Str(String),
    /// Key present without a value.
    Null,
}

impl MetaValue {
    /// Returns the boolean value, or `None` for non-boolean variants.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    fn from_yaml(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(value) => Self::Bool(value),
            serde_yaml::Value::Number(num) => match num.as_i64() {
                Some(int) => Self::Int(int),
                None => Self::Str(num.to_string()),
            },
            serde_yaml::Value::String(text) => Self::Str(text),
            // Only scalar values are ever consulted; compound values are
            // kept as their YAML rendering.
            other => Self::Str(
                serde_yaml::to_string(&other)
                    .unwrap_or_default()
                    .trim_end()
                    .to_owned(),
            ),
        }
    }
}

/// Mapping from lowercase symbolic key to typed value.
pub type Metadata = BTreeMap<String, MetaValue>;

/// The result of splitting a guide file: typed metadata plus the body with
/// the metadata block (and at most one following blank line) removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    /// Decoded metadata; empty when the file has no recognized block.
    pub metadata: Metadata,
    /// Guide body, guaranteed valid UTF-8.
    pub body: String,
}

/// Read and split a guide file.
///
/// # Errors
///
/// [`HowtoError::FileUnreadable`] when the read fails,
/// [`HowtoError::InvalidEncoding`] when the bytes are not UTF-8, plus the
/// fenced-block failures documented on [`parse_str`].
pub fn parse(path: &Path) -> Result<Parsed> {
    let content = read_file(path)?;
    parse_str(&content, path)
}

/// Split already-read content. `path` is used for error reporting only.
///
/// # Errors
///
/// [`HowtoError::InvalidFormat`] when an opening fence is never closed,
/// [`HowtoError::UnparseableMetadata`] when the fenced block fails to
/// decode, and [`HowtoError::InvalidMetadata`] when it decodes to a
/// non-mapping.
pub fn parse_str(content: &str, path: &Path) -> Result<Parsed> {
    if starts_with_fence(content) {
        parse_fenced(content, path)
    } else {
        Ok(parse_line_prefixed(content))
    }
}

/// Read a file as UTF-8, stripping a leading byte-order-mark.
fn read_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| HowtoError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let slice = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(&bytes);
    match std::str::from_utf8(slice) {
        Ok(text) => Ok(text.to_owned()),
        Err(_) => Err(HowtoError::InvalidEncoding {
            path: path.to_path_buf(),
        }),
    }
}

/// A fence is a line of exactly three or five dashes, trailing whitespace
/// allowed.
fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed == "---" || trimmed == "-----"
}

fn starts_with_fence(content: &str) -> bool {
    is_fence(content.lines().next().unwrap_or(""))
}

fn parse_fenced(content: &str, path: &Path) -> Result<Parsed> {
    let mut block = String::new();
    let mut body_start = None;
    let mut pos = 0;
    for (i, line) in content.split_inclusive('\n').enumerate() {
        pos += line.len();
        if i == 0 {
            continue; // opening fence
        }
        if is_fence(line) {
            body_start = Some(pos);
            break;
        }
        block.push_str(line);
    }
    let Some(start) = body_start else {
        return Err(HowtoError::InvalidFormat {
            path: path.to_path_buf(),
        });
    };

    let metadata = decode_yaml_block(&block, path)?;
    let mut body = &content[start..];
    // A single blank line directly after the block belongs to it.
    for newline in ["\r\n", "\n"] {
        if let Some(rest) = body.strip_prefix(newline) {
            body = rest;
            break;
        }
    }
    Ok(Parsed {
        metadata,
        body: body.to_owned(),
    })
}

fn decode_yaml_block(block: &str, path: &Path) -> Result<Metadata> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|source| HowtoError::UnparseableMetadata {
            path: path.to_path_buf(),
            source,
        })?;
    match value {
        // An empty block is as good as no metadata.
        serde_yaml::Value::Null => Ok(Metadata::new()),
        serde_yaml::Value::Mapping(mapping) => {
            let mut metadata = Metadata::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(text) => text,
                    other => serde_yaml::to_string(&other)
                        .unwrap_or_default()
                        .trim_end()
                        .to_owned(),
                };
                metadata.insert(key.to_lowercase(), MetaValue::from_yaml(value));
            }
            Ok(metadata)
        }
        _ => Err(HowtoError::InvalidMetadata {
            path: path.to_path_buf(),
        }),
    }
}

fn parse_line_prefixed(content: &str) -> Parsed {
    let mut metadata = Metadata::new();
    let mut consumed = 0;
    let mut saw_block = false;
    for line in content.split_inclusive('\n') {
        let stripped = line.trim_end_matches(['\n', '\r']);
        if stripped.starts_with(':') {
            if let Some(caps) = META_LINE.captures(stripped) {
                let key = caps["key"].to_lowercase();
                metadata.insert(key, capture_value(&caps));
            }
            // Malformed ':' lines still belong to the block.
            saw_block = true;
            consumed += line.len();
        } else {
            // The block is terminated by the first non-':' line; if that
            // line is blank it is consumed with the block.
            if saw_block && stripped.trim().is_empty() {
                consumed += line.len();
            }
            break;
        }
    }
    Parsed {
        metadata,
        body: content[consumed..].to_owned(),
    }
}

fn capture_value(caps: &regex::Captures<'_>) -> MetaValue {
    if let Some(single) = caps.name("single") {
        return MetaValue::Str(single.as_str().replace("\\'", "'"));
    }
    if let Some(double) = caps.name("double") {
        return MetaValue::Str(double.as_str().replace("\\\"", "\""));
    }
    match caps.name("bare") {
        Some(bare) => coerce_bare(bare.as_str().trim()),
        None => MetaValue::Null,
    }
}

/// Bare values are type-coerced; quoted values always stay strings.
fn coerce_bare(value: &str) -> MetaValue {
    match value {
        "true" => MetaValue::Bool(true),
        "false" => MetaValue::Bool(false),
        "" => MetaValue::Null,
        _ if value.bytes().all(|b| b.is_ascii_digit()) => match value.parse::<i64>() {
            Ok(int) => MetaValue::Int(int),
            Err(_) => MetaValue::Str(value.to_owned()),
        },
        _ => MetaValue::Str(value.to_owned()),
    }
}
