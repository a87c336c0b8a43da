//! Locations inside a (possibly multi-file) contract.
//!
//! A [`Position`] is the identity of every node the compiler looks at: two
//! schemas are the same schema exactly when they live at the same position,
//! no matter how many `$ref` chains lead to them.

use std::{
  fmt,
  path::{Component, Path, PathBuf},
  sync::LazyLock,
};

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::generator::errors::{ContractError, ContractResult};

static URI_SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  file: PathBuf,
  segments: Vec<String>,
}

impl Position {
  /// The root of the document stored in `file`.
  pub fn root(file: impl Into<PathBuf>) -> Self {
    Self {
      file: file.into(),
      segments: vec![],
    }
  }

  pub fn new<S: Into<String>>(file: impl Into<PathBuf>, segments: impl IntoIterator<Item = S>) -> Self {
    Self {
      file: file.into(),
      segments: segments.into_iter().map(Into::into).collect(),
    }
  }

  pub fn file(&self) -> &Path {
    &self.file
  }

  pub fn segments(&self) -> &[String] {
    &self.segments
  }

  pub fn is_root(&self) -> bool {
    self.segments.is_empty()
  }

  #[must_use]
  pub fn child(&self, segment: impl Into<String>) -> Self {
    let mut segments = self.segments.clone();
    segments.push(segment.into());
    Self {
      file: self.file.clone(),
      segments,
    }
  }

  /// Returns the segments following `ancestor`, if `ancestor` contains this position.
  pub fn relative_to(&self, ancestor: &Position) -> Option<&[String]> {
    if self.file != ancestor.file {
      return None;
    }
    self.segments.strip_prefix(ancestor.segments.as_slice())
  }

  /// JSON Pointer of this position inside its file (`""` for the root).
  pub fn pointer(&self) -> String {
    self
      .segments
      .iter()
      .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
      .collect()
  }

  /// Resolves a `$ref` string against this position.
  ///
  /// A reference with a path part points into another file, resolved relative
  /// to the directory of the current file. The fragment, when present, must be
  /// a JSON Pointer.
  pub fn resolve(&self, reference: &str) -> ContractResult<Position> {
    if reference.chars().any(|c| c.is_whitespace() || c.is_control()) {
      return Err(ContractError::content(
        self,
        format!("invalid reference '{reference}': references must not contain whitespace"),
      ));
    }

    let (path_part, fragment) = match reference.split_once('#') {
      Some((path, fragment)) => (path, Some(fragment)),
      None => (reference, None),
    };

    if fragment.is_some_and(|f| f.contains('#')) {
      return Err(ContractError::content(
        self,
        format!("invalid reference '{reference}': more than one fragment"),
      ));
    }

    if URI_SCHEME_RE.is_match(path_part) {
      return Err(ContractError::not_supported(
        self,
        format!("remote reference '{reference}' is not supported"),
      ));
    }

    let path_part = path_part.split_once('?').map_or(path_part, |(path, _)| path);
    let path = self.decode(reference, path_part)?;
    let file = if path.is_empty() {
      self.file.clone()
    } else {
      let base = self.file.parent().unwrap_or_else(|| Path::new(""));
      canonical_file(&base.join(path))
    };

    let segments = match fragment {
      None | Some("") => vec![],
      Some(fragment) => {
        let decoded = self.decode(reference, fragment)?;
        let Some(pointer) = decoded.strip_prefix('/') else {
          return Err(ContractError::content(
            self,
            format!("invalid reference '{reference}': fragment must be a JSON Pointer starting with '/'"),
          ));
        };
        pointer.split('/').map(unescape_segment).collect()
      }
    };

    Ok(Position { file, segments })
  }

  fn decode(&self, reference: &str, part: &str) -> ContractResult<String> {
    percent_decode_str(part)
      .decode_utf8()
      .map(|decoded| decoded.into_owned())
      .map_err(|_| {
        ContractError::content(
          self,
          format!("invalid reference '{reference}': percent-encoding is not valid UTF-8"),
        )
      })
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}#{}", self.file.display(), self.pointer())
  }
}

impl Serialize for Position {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Identity of a schema: the position of its (dereferenced) declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaId(Position);

impl SchemaId {
  pub fn new(position: Position) -> Self {
    Self(position)
  }

  pub fn position(&self) -> &Position {
    &self.0
  }
}

impl From<Position> for SchemaId {
  fn from(position: Position) -> Self {
    Self(position)
  }
}

impl fmt::Display for SchemaId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl Serialize for SchemaId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.0.serialize(serializer)
  }
}

fn unescape_segment(segment: &str) -> String {
  segment.replace("~1", "/").replace("~0", "~")
}

/// Canonical form of `path`: the real path when the file exists, a lexically
/// normalized one otherwise so that a later load reports the missing file.
pub(crate) fn canonical_file(path: &Path) -> PathBuf {
  std::fs::canonicalize(path).unwrap_or_else(|_| normalize_lexically(path))
}

fn normalize_lexically(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        let ends_in_normal = normalized
          .components()
          .next_back()
          .is_some_and(|last| matches!(last, Component::Normal(_)));
        if ends_in_normal {
          normalized.pop();
        } else if !normalized.has_root() {
          normalized.push("..");
        }
      }
      other => normalized.push(other.as_os_str()),
    }
  }
  normalized
}
