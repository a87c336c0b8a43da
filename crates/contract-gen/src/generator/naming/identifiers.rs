use std::{
  collections::{BTreeSet, HashSet},
  sync::LazyLock,
};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

/// Keywords of the object-oriented target languages that cannot name a method.
pub(crate) static RESERVED_IDENTIFIERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const", "continue",
    "default", "do", "double", "else", "enum", "extends", "final", "finally", "float", "for", "goto", "if",
    "implements", "import", "instanceof", "int", "interface", "long", "native", "new", "package", "private",
    "protected", "public", "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "try", "void", "volatile", "while", "var", "record", "yield", "true", "false",
    "null",
  ]
  .into_iter()
  .collect()
});

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());
static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Transliterates to ASCII, replaces invalid characters with underscores,
/// collapses runs of underscores and trims them from both ends.
pub(crate) fn sanitize(input: &str) -> String {
  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Appends `2`, `3`, … to `base_name` until it is not in `used_names`.
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }
  let mut i = 2;
  loop {
    let new_name = format!("{base_name}{i}");
    if !used_names.contains(&new_name) {
      return new_name;
    }
    i += 1;
  }
}

/// Splits `input` into lowercase words. Words written entirely in capitals
/// (`NOT_FORCED`) count as one word each.
fn words(input: &str) -> Vec<String> {
  let joined = sanitize(input)
    .split('_')
    .map(|word| {
      if word.chars().any(|c| c.is_ascii_lowercase()) {
        word.to_string()
      } else {
        word.to_ascii_lowercase()
      }
    })
    .collect::<Vec<_>>()
    .join("_");

  joined
    .to_snake_case()
    .split('_')
    .filter(|word| !word.is_empty())
    .map(ToString::to_string)
    .collect()
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
    None => String::new(),
  }
}

/// Converts a contract name into a type name (`PascalCase`).
///
/// Input that already mixes upper and lower case without separators keeps its
/// capitalization (`HTTPError` stays `HTTPError`). A leading digit gets a `T`
/// prefix and an empty result becomes `Unnamed`.
pub(crate) fn to_type_name(name: &str) -> String {
  let ascii = any_ascii(name);
  let has_separators = ascii.contains(|c: char| !c.is_ascii_alphanumeric());
  let has_upper = ascii.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = ascii.chars().any(|c| c.is_ascii_lowercase());

  let mut ident = if !has_separators && has_upper && has_lower {
    capitalize(&ascii)
  } else {
    words(&ascii).iter().map(|word| capitalize(word)).collect()
  };

  if ident.is_empty() {
    return "Unnamed".to_string();
  }

  prefix_if_digit_start(&mut ident, 'T');
  ident
}

/// Converts a contract name into a method identifier (`camelCase`).
///
/// Reserved keywords and names starting with a digit get a `_` prefix.
pub(crate) fn to_identifier(name: &str) -> String {
  let words = words(name);
  let Some((first, rest)) = words.split_first() else {
    return "_".to_string();
  };

  let mut ident = first.clone();
  ident.extend(rest.iter().map(|word| capitalize(word)));

  if RESERVED_IDENTIFIERS.contains(ident.as_str()) {
    ident.insert(0, '_');
  }

  prefix_if_digit_start(&mut ident, '_');
  ident
}

fn prefix_if_digit_start(ident: &mut String, prefix: char) {
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, prefix);
  }
}
