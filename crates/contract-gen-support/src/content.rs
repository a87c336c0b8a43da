//! Media type classification and response body selection for generated clients.

use http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use mediatype::MediaType;

/// Broad family of a media type, deciding how a body is encoded or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentCategory {
  #[default]
  Json,
  FormUrlEncoded,
  Multipart,
  Text,
  Binary,
  Xml,
  EventStream,
}

impl ContentCategory {
  /// Unparseable media types count as JSON.
  #[must_use]
  pub fn from_content_type(content_type: &str) -> Self {
    let Ok(media) = MediaType::parse(content_type.trim()) else {
      return Self::Json;
    };

    let ty = media.ty.as_str().to_ascii_lowercase();
    let subty = media.subty.as_str().to_ascii_lowercase();
    let suffix = media.suffix.as_ref().map(|s| s.as_str().to_ascii_lowercase());

    match (ty.as_str(), subty.as_str(), suffix.as_deref()) {
      ("multipart", _, _) => Self::Multipart,
      ("text", "event-stream", _) => Self::EventStream,
      ("text" | "application", "xml", _) | (_, _, Some("xml")) => Self::Xml,
      ("application", "x-www-form-urlencoded", _) => Self::FormUrlEncoded,
      ("application", "json", _) | (_, _, Some("json")) => Self::Json,
      ("image" | "audio" | "video", _, _) | ("application", "pdf" | "octet-stream", _) => Self::Binary,
      ("application" | "text", _, _) => Self::Text,
      _ => Self::Json,
    }
  }

  /// Bodies sent as individual named fields.
  #[must_use]
  pub const fn is_form(self) -> bool {
    matches!(self, Self::FormUrlEncoded | Self::Multipart)
  }

  #[must_use]
  pub const fn is_json(self) -> bool {
    matches!(self, Self::Json)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
  #[error("status {status} declares no media type matching '{content_type}'")]
  Unmatched { status: StatusCode, content_type: String },
  #[error("status {status} declares no response body")]
  NoBody { status: StatusCode },
  #[error("content type header is not valid text")]
  InvalidHeader,
}

/// The declared media type a response body is decoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSelection {
  pub media_type: String,
  pub category: ContentCategory,
}

/// Chooses how to decode the body of one response status from the media
/// types the contract declares for it.
///
/// When a status declares exactly one media type and that type is not JSON,
/// a JSON request or a JSON answer still decodes the body as JSON.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
  status: StatusCode,
  declared: Vec<String>,
}

impl ContentMatcher {
  pub fn new<S: Into<String>>(status: StatusCode, declared: impl IntoIterator<Item = S>) -> Self {
    Self {
      status,
      declared: declared.into_iter().map(Into::into).collect(),
    }
  }

  /// Selects using the `Content-Type` of the response headers.
  pub fn select_from_headers(&self, headers: &HeaderMap, requested_json: bool) -> Result<ContentSelection, ContentError> {
    let received = headers
      .get(CONTENT_TYPE)
      .map(|value| value.to_str().map_err(|_| ContentError::InvalidHeader))
      .transpose()?;
    self.select(received, requested_json)
  }

  pub fn select(&self, received: Option<&str>, requested_json: bool) -> Result<ContentSelection, ContentError> {
    if let Some(received) = received
      && let Some(declared) = self.declared.iter().find(|declared| same_essence(declared, received))
    {
      return Ok(ContentSelection {
        category: ContentCategory::from_content_type(declared),
        media_type: declared.clone(),
      });
    }

    match self.declared.as_slice() {
      [] => Err(ContentError::NoBody { status: self.status }),
      [single] => {
        let declared_category = ContentCategory::from_content_type(single);
        let answered_json = received.is_some_and(|r| ContentCategory::from_content_type(r).is_json());
        let category = if !declared_category.is_json() && (requested_json || answered_json) {
          ContentCategory::Json
        } else {
          declared_category
        };
        Ok(ContentSelection {
          media_type: single.clone(),
          category,
        })
      }
      _ => Err(ContentError::Unmatched {
        status: self.status,
        content_type: received.unwrap_or_default().to_string(),
      }),
    }
  }
}

/// Compares `type/subtype+suffix`, ignoring parameters and case.
fn same_essence(declared: &str, received: &str) -> bool {
  let (Ok(declared), Ok(received)) = (MediaType::parse(declared.trim()), MediaType::parse(received.trim())) else {
    return declared.trim().eq_ignore_ascii_case(received.trim());
  };
  let suffix = |media: &MediaType<'_>| media.suffix.as_ref().map(|s| s.as_str().to_ascii_lowercase());

  declared.ty.as_str().eq_ignore_ascii_case(received.ty.as_str())
    && declared.subty.as_str().eq_ignore_ascii_case(received.subty.as_str())
    && suffix(&declared) == suffix(&received)
}

#[cfg(test)]
mod tests {
  use http::HeaderValue;

  use super::*;

  #[test]
  fn test_content_category_from_content_type() {
    let cases = [
      ("application/json", ContentCategory::Json),
      ("application/problem+json", ContentCategory::Json),
      ("application/json; charset=utf-8", ContentCategory::Json),
      ("multipart/form-data", ContentCategory::Multipart),
      ("multipart/mixed", ContentCategory::Multipart),
      ("application/x-www-form-urlencoded", ContentCategory::FormUrlEncoded),
      ("text/event-stream", ContentCategory::EventStream),
      ("application/xml", ContentCategory::Xml),
      ("application/atom+xml", ContentCategory::Xml),
      ("image/png", ContentCategory::Binary),
      ("application/octet-stream", ContentCategory::Binary),
      ("text/plain", ContentCategory::Text),
      ("not a media type", ContentCategory::Json),
    ];
    for (content_type, expected) in cases {
      assert_eq!(
        ContentCategory::from_content_type(content_type),
        expected,
        "failed for {content_type}"
      );
    }
  }

  #[test]
  fn test_is_form() {
    assert!(ContentCategory::Multipart.is_form());
    assert!(ContentCategory::FormUrlEncoded.is_form());
    assert!(!ContentCategory::Json.is_form());
  }

  #[test]
  fn test_select_matches_declared_type_ignoring_parameters() {
    let matcher = ContentMatcher::new(StatusCode::OK, ["application/json", "text/csv"]);
    let selection = matcher.select(Some("text/csv; charset=utf-8"), false).unwrap();
    assert_eq!(selection.media_type, "text/csv");
    assert_eq!(selection.category, ContentCategory::Text);
  }

  #[test]
  fn test_single_non_json_type_falls_back_to_json_when_requested() {
    let matcher = ContentMatcher::new(StatusCode::OK, ["text/plain"]);

    let requested = matcher.select(None, true).unwrap();
    assert_eq!(requested.category, ContentCategory::Json);

    let answered = matcher.select(Some("application/json"), false).unwrap();
    assert_eq!(answered.category, ContentCategory::Json);
    assert_eq!(answered.media_type, "text/plain");

    let plain = matcher.select(Some("text/plain"), false).unwrap();
    assert_eq!(plain.category, ContentCategory::Text);
  }

  #[test]
  fn test_select_errors() {
    let empty = ContentMatcher::new(StatusCode::NO_CONTENT, Vec::<String>::new());
    assert_eq!(
      empty.select(Some("application/json"), true),
      Err(ContentError::NoBody {
        status: StatusCode::NO_CONTENT
      })
    );

    let several = ContentMatcher::new(StatusCode::OK, ["application/json", "application/xml"]);
    assert!(matches!(
      several.select(Some("text/html"), false),
      Err(ContentError::Unmatched { .. })
    ));
  }

  #[test]
  fn test_select_from_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));

    let matcher = ContentMatcher::new(StatusCode::OK, ["application/json", "application/xml"]);
    let selection = matcher.select_from_headers(&headers, true).unwrap();
    assert_eq!(selection.category, ContentCategory::Xml);
  }
}
