//! Heading outline extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::slug::slugify;

/// A navigable section of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading text, trimmed but otherwise raw
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (2 or 3)
    pub level: u8,
}

/// A heading line recognised by [`classify_heading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingLine<'a> {
    /// Number of leading `#` (1-3)
    pub level: u8,
    /// Trimmed heading text
    pub text: &'a str,
}

impl HeadingLine<'_> {
    /// Whether this heading belongs in the navigable outline.
    pub fn is_outlined(&self) -> bool {
        matches!(self.level, 2 | 3)
    }

    /// Anchor id, only for outlined headings.
    pub fn anchor(&self) -> Option<String> {
        self.is_outlined().then(|| slugify(self.text))
    }
}

/// Classify a single markdown line as a level 1-3 heading.
///
/// The line is trimmed first. Exactly `level` hashes must be followed by
/// whitespace and non-empty text, so `####` lines and `##title` are not
/// headings.
pub fn classify_heading(line: &str) -> Option<HeadingLine<'_>> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.+)$").expect("Invalid heading regex"));

    let caps = RE.captures(line.trim())?;
    let level = caps.get(1)?.as_str().len() as u8;
    let text = caps.get(2)?.as_str().trim();

    if text.is_empty() {
        return None;
    }

    Some(HeadingLine { level, text })
}

/// Extract the level 2 and 3 headings of a document, in document order.
///
/// Duplicate titles produce duplicate ids.
pub fn extract_outline(source: &str) -> Vec<Section> {
    let sections: Vec<Section> = source
        .lines()
        .filter_map(classify_heading)
        .filter(HeadingLine::is_outlined)
        .map(|heading| Section {
            title: heading.text.to_string(),
            id: slugify(heading.text),
            level: heading.level,
        })
        .collect();

    tracing::debug!("Extracted {} sections", sections.len());

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(title: &str, id: &str, level: u8) -> Section {
        Section {
            title: title.to_string(),
            id: id.to_string(),
            level,
        }
    }

    #[test]
    fn extracts_levels_two_and_three() {
        let outline = extract_outline("## Intro\ntext\n### Details\nmore");

        assert_eq!(
            outline,
            vec![
                section("Intro", "intro", 2),
                section("Details", "details", 3),
            ]
        );
    }

    #[test]
    fn skips_title_and_deeper_headings() {
        let source = "# Privacy Policy\n## Scope\n#### Fine print\n##NoSpace\n###";

        assert_eq!(extract_outline(source), vec![section("Scope", "scope", 2)]);
    }

    #[test]
    fn empty_document_has_empty_outline() {
        assert!(extract_outline("").is_empty());
        assert!(extract_outline("\n\n   \n").is_empty());
    }

    #[test]
    fn keeps_duplicate_titles() {
        let outline = extract_outline("## Contact\n### Contact\n## Contact");

        assert_eq!(outline.len(), 3);
        assert!(outline.iter().all(|s| s.id == "contact"));
    }

    #[test]
    fn slug_uses_raw_heading_text() {
        let outline = extract_outline("## See [our site](https://x.com) **now**");

        assert_eq!(outline[0].title, "See [our site](https://x.com) **now**");
        assert_eq!(outline[0].id, "see-our-sitehttpsxcom-now");
    }

    #[test]
    fn tolerates_indentation_and_crlf() {
        let outline = extract_outline("  ## Indented  \r\n### Windows\r\n");

        assert_eq!(
            outline,
            vec![
                section("Indented", "indented", 2),
                section("Windows", "windows", 3),
            ]
        );
    }

    #[test]
    fn count_matches_heading_lines() {
        let source = "# T\n## A\nbody\n### B\n- item\n## C\n#### D\n### E";
        let expected = source
            .lines()
            .filter(|l| l.starts_with("## ") || l.starts_with("### "))
            .count();

        assert_eq!(extract_outline(source).len(), expected);
    }

    #[test]
    fn classifies_heading_lines() {
        assert_eq!(
            classify_heading("# Title"),
            Some(HeadingLine {
                level: 1,
                text: "Title"
            })
        );
        assert_eq!(
            classify_heading("###   Spaced   ").map(|h| h.text),
            Some("Spaced")
        );
        assert_eq!(classify_heading("#### Four"), None);
        assert_eq!(classify_heading("plain"), None);
        assert_eq!(classify_heading("## "), None);
    }
}
