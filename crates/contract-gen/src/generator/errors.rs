use std::path::PathBuf;

use itertools::Itertools;
use strum::Display;

use crate::generator::position::Position;

pub type ContractResult<T> = Result<T, ContractError>;

/// The three failure categories callers need to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
  /// The contract is structurally invalid for the format it claims to follow.
  #[strum(to_string = "content error")]
  Content,
  /// The contract is valid but uses a construct the generator does not implement.
  #[strum(to_string = "not supported")]
  NotSupported,
  /// A file the contract points at could not be read.
  #[strum(to_string = "not found")]
  NotFound,
  /// A broken internal invariant. Never caused by contract content.
  #[strum(to_string = "internal error")]
  Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
  #[error("{position}: {message}")]
  Content { position: Position, message: String },

  #[error("invalid document {}:\n  {}", file.display(), problems.iter().join("\n  "))]
  InvalidDocument { file: PathBuf, problems: Vec<String> },

  #[error("{}{message}", position.as_ref().map(|p| format!("{p}: ")).unwrap_or_default())]
  NotSupported { message: String, position: Option<Position> },

  #[error("file not found: {} ({reason})", file.display())]
  NotFound { file: PathBuf, reason: String },

  #[error("internal error: {message}")]
  Internal { message: String },
}

impl ContractError {
  pub fn content(position: &Position, message: impl Into<String>) -> Self {
    Self::Content {
      position: position.clone(),
      message: message.into(),
    }
  }

  pub fn not_supported(position: &Position, message: impl Into<String>) -> Self {
    Self::NotSupported {
      message: message.into(),
      position: Some(position.clone()),
    }
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal {
      message: message.into(),
    }
  }

  #[must_use]
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Content { .. } | Self::InvalidDocument { .. } => ErrorKind::Content,
      Self::NotSupported { .. } => ErrorKind::NotSupported,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::Internal { .. } => ErrorKind::Internal,
    }
  }

  /// Re-attributes a missing file to the `$ref` that pointed at it.
  pub(crate) fn attribute_to_reference(self, reference: &Position, ref_path: &str) -> Self {
    match self {
      Self::NotFound { file, reason } => Self::content(
        reference,
        format!("unresolvable reference '{ref_path}': {} ({reason})", file.display()),
      ),
      other => other,
    }
  }
}
