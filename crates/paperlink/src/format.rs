//! Filename formatting for downloaded PDFs.
//!
//! Titles scraped from mirror pages contain punctuation, markup leftovers and the odd
//! path separator; DOIs always contain a `/`. Both are turned into a lowercase,
//! underscore-joined stem that is safe to use on any common filesystem.
//!
//! # Examples
//!
//! ```
//! use paperlink::format;
//!
//! assert_eq!(
//!   format::pdf_filename(Some("MapReduce: Simplified Data Processing"), "10.1145/1327452.1327492"),
//!   "mapreduce_simplified_data_processing.pdf"
//! );
//! assert_eq!(format::pdf_filename(None, "10.1145/1327452.1327492"), "10.1145_1327452.1327492.pdf");
//! ```

/// Default upper bound on a formatted stem, in bytes.
pub const DEFAULT_MAX_LENGTH: usize = 50;

/// Formats a title into a filename stem.
///
/// - lowercases the text
/// - drops every character that is not alphanumeric, whitespace, `-` or `_`
/// - joins the remaining words with single underscores
/// - truncates on a word boundary to `max_length` (default [`DEFAULT_MAX_LENGTH`])
///
/// A single word longer than the limit is cut at the last character boundary that fits.
///
/// ```
/// use paperlink::format::format_title;
///
/// assert_eq!(format_title("Hello,   World!", None), "hello_world");
/// assert_eq!(format_title("This Is A Very Long Title Indeed", Some(20)), "this_is_a_very_long");
/// ```
pub fn format_title(title: &str, max_length: Option<usize>) -> String {
  let max_length = max_length.unwrap_or(DEFAULT_MAX_LENGTH);

  let cleaned: String = title
    .to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
    .collect();

  let mut stem = String::new();
  for word in cleaned.split_whitespace() {
    let needed = if stem.is_empty() { word.len() } else { word.len() + 1 };
    if stem.len() + needed > max_length {
      if stem.is_empty() {
        stem = truncate_on_char_boundary(word, max_length).to_string();
      }
      break;
    }
    if !stem.is_empty() {
      stem.push('_');
    }
    stem.push_str(word);
  }

  stem
}

/// Picks a filename for a downloaded PDF.
///
/// The title wins when it formats to something non-empty; otherwise the DOI is used with
/// path separators replaced by underscores.
pub fn pdf_filename(title: Option<&str>, doi: &str) -> String {
  let stem = title.map(|t| format_title(t, None)).filter(|s| !s.is_empty()).unwrap_or_else(|| {
    doi
      .chars()
      .map(|c| match c {
        '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
        c if c.is_whitespace() => '_',
        c => c,
      })
      .collect()
  });
  format!("{stem}.pdf")
}

/// Longest prefix of `s` no longer than `max` bytes that ends on a char boundary.
fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
  let mut end = max.min(s.len());
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  &s[..end]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_title() {
    assert_eq!(format_title("Hello World", None), "hello_world");
    assert_eq!(
      format_title("This Is A Very Long Title Indeed", None),
      "this_is_a_very_long_title_indeed"
    );
    assert_eq!(format_title("This Is A Very Long Title Indeed", Some(30)), "this_is_a_very_long_title");
    assert_eq!(format_title("UPPERCASE TEXT", None), "uppercase_text");
    assert_eq!(format_title("No    Extra    Spaces", None), "no_extra_spaces");
  }

  #[test]
  fn test_format_title_strips_unsafe_characters() {
    assert_eq!(format_title("A/B: testing <things>?", None), "ab_testing_things");
    assert_eq!(format_title("self-attention is_all", None), "self-attention_is_all");
    assert_eq!(format_title("?!", None), "");
  }

  #[test]
  fn test_format_title_long_single_word() {
    assert_eq!(format_title("Supercalifragilistic", Some(5)), "super");
    assert_eq!(format_title("ééééé", Some(3)), "é");
  }

  #[test]
  fn test_pdf_filename() {
    assert_eq!(pdf_filename(Some("Example Title"), "10.1000/xyz123"), "example_title.pdf");
    assert_eq!(pdf_filename(None, "10.1000/xyz123"), "10.1000_xyz123.pdf");
    assert_eq!(pdf_filename(Some("   "), "10.1000/a:b"), "10.1000_a_b.pdf");
  }
}
