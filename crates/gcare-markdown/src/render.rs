//! Block-level markdown rendering.
//!
//! The view is a flat sequence of [`Block`]s: headings, paragraphs and
//! unordered lists. Headings at levels 2 and 3 carry the same id that
//! [`extract_outline`](crate::outline::extract_outline) produces, so outline
//! entries and rendered anchors always line up.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::commonmark::CommonMarkRenderer;
use crate::outline::classify_heading;

/// A block-level view element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        /// Anchor id, present for levels 2 and 3
        id: Option<String>,
        text: String,
    },
    Paragraph(Vec<Span>),
    List(Vec<Vec<Span>>),
}

/// Inline content of a paragraph or list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Span {
    Text(String),
    /// Opens in a new browsing context without an opener reference
    Link { label: String, href: String },
}

/// Output of a [`Renderer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Rendered HTML body
    pub html: String,

    /// Ids of the rendered level 2/3 headings, in document order.
    ///
    /// Available as soon as rendering returns; this is what scroll tracking
    /// attaches to.
    pub anchors: Vec<String>,
}

impl RenderedDocument {
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// A markdown-to-view rendering strategy.
pub trait Renderer: Send + Sync {
    /// Renderer identifier (e.g., "line", "commonmark")
    fn name(&self) -> &'static str;

    /// Render a document to HTML plus its heading anchors.
    fn render(&self, source: &str) -> RenderedDocument;
}

/// Which [`Renderer`] to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Line-oriented block renderer
    #[default]
    Line,
    /// pulldown-cmark with heading id and link hooks
    CommonMark,
}

impl RendererKind {
    /// Instantiate the renderer.
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            Self::Line => Box::new(LineRenderer),
            Self::CommonMark => Box::new(CommonMarkRenderer::new()),
        }
    }
}

/// Line-oriented renderer: one block per line, `- ` runs grouped into lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineRenderer;

impl Renderer for LineRenderer {
    fn name(&self) -> &'static str {
        "line"
    }

    fn render(&self, source: &str) -> RenderedDocument {
        let blocks = render_blocks(source);
        let anchors = blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { id: Some(id), .. } => Some(id.clone()),
                _ => None,
            })
            .collect();

        RenderedDocument {
            html: blocks_to_html(&blocks),
            anchors,
        }
    }
}

/// Parse a document into block view elements.
pub fn render_blocks(source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut list: Vec<Vec<Span>> = Vec::new();

    for line in source.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        // A bare "- " line is an empty item
        if let Some(item) = line.trim_start().strip_prefix("- ") {
            let item = item.trim();
            list.push(if item.is_empty() {
                Vec::new()
            } else {
                parse_inline(item)
            });
            continue;
        }

        if !list.is_empty() {
            blocks.push(Block::List(std::mem::take(&mut list)));
        }

        if let Some(heading) = classify_heading(trimmed) {
            blocks.push(Block::Heading {
                level: heading.level,
                id: heading.anchor(),
                text: heading.text.to_string(),
            });
        } else {
            blocks.push(Block::Paragraph(parse_inline(trimmed)));
        }
    }

    if !list.is_empty() {
        blocks.push(Block::List(list));
    }

    blocks
}

/// Split text around its first `[label](url)` link.
fn parse_inline(text: &str) -> Vec<Span> {
    static LINK: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("Invalid link regex"));

    let Some(caps) = LINK.captures(text) else {
        return vec![Span::Text(text.to_string())];
    };

    let (Some(whole), Some(label), Some(href)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return vec![Span::Text(text.to_string())];
    };

    let mut spans = Vec::with_capacity(3);
    let before = &text[..whole.start()];
    let after = &text[whole.end()..];

    if !before.is_empty() {
        spans.push(Span::Text(before.to_string()));
    }
    spans.push(Span::Link {
        label: label.as_str().to_string(),
        href: href.as_str().trim().to_string(),
    });
    if !after.is_empty() {
        spans.push(Span::Text(after.to_string()));
    }

    spans
}

/// Serialize blocks to HTML.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();

    for block in blocks {
        match block {
            Block::Heading { level, id, text } => {
                match id {
                    Some(id) => {
                        let _ = write!(out, "<h{level} id=\"{}\">", escape_html(id));
                    }
                    None => {
                        let _ = write!(out, "<h{level}>");
                    }
                }
                let _ = writeln!(out, "{}</h{level}>", escape_html(text));
            }
            Block::Paragraph(spans) => {
                out.push_str("<p>");
                push_spans(&mut out, spans);
                out.push_str("</p>\n");
            }
            Block::List(items) => {
                out.push_str("<ul>\n");
                for spans in items {
                    out.push_str("<li>");
                    push_spans(&mut out, spans);
                    out.push_str("</li>\n");
                }
                out.push_str("</ul>\n");
            }
        }
    }

    out
}

fn push_spans(out: &mut String, spans: &[Span]) {
    for span in spans {
        match span {
            Span::Text(text) => out.push_str(&escape_html(text)),
            Span::Link { label, href } => {
                let _ = write!(
                    out,
                    r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                    escape_html(href),
                    escape_html(label)
                );
            }
        }
    }
}

/// Escape text for HTML content and attribute values.
pub(crate) fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::extract_outline;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    fn link(label: &str, href: &str) -> Span {
        Span::Link {
            label: label.to_string(),
            href: href.to_string(),
        }
    }

    #[test]
    fn renders_list_with_link() {
        let blocks = render_blocks("- [site](https://x.com)");

        assert_eq!(
            blocks,
            vec![Block::List(vec![vec![link("site", "https://x.com")]])]
        );

        let html = LineRenderer.render("- [site](https://x.com)").html;
        assert!(html.contains(
            r#"<a href="https://x.com" target="_blank" rel="noopener noreferrer">site</a>"#
        ));
    }

    #[test]
    fn empty_item_stays_in_list() {
        let blocks = render_blocks("- \n- x");

        assert_eq!(blocks, vec![Block::List(vec![vec![], vec![text("x")]])]);
        assert_eq!(
            LineRenderer.render("- \n- x").html,
            "<ul>\n<li></li>\n<li>x</li>\n</ul>\n"
        );
    }

    #[test]
    fn renders_headings_with_outline_ids() {
        let blocks = render_blocks("# Terms\n## Intro\n### Details");

        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    id: None,
                    text: "Terms".to_string()
                },
                Block::Heading {
                    level: 2,
                    id: Some("intro".to_string()),
                    text: "Intro".to_string()
                },
                Block::Heading {
                    level: 3,
                    id: Some("details".to_string()),
                    text: "Details".to_string()
                },
            ]
        );
    }

    #[test]
    fn groups_consecutive_list_lines() {
        let blocks = render_blocks("- one\n- two\n\n- three\nafter\n- four");
        let first = vec![vec![text("one")], vec![text("two")], vec![text("three")]];

        assert_eq!(
            blocks,
            vec![
                Block::List(first),
                Block::Paragraph(vec![text("after")]),
                Block::List(vec![vec![text("four")]]),
            ]
        );
    }

    #[test]
    fn heading_closes_open_list() {
        let blocks = render_blocks("- item\n## Next");

        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], Block::List(_)));
        assert!(matches!(blocks[1], Block::Heading { level: 2, .. }));
    }

    #[test]
    fn paragraph_keeps_text_around_link() {
        let blocks = render_blocks("Email [us](mailto:help@x.com) today.");

        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                text("Email "),
                link("us", "mailto:help@x.com"),
                text(" today."),
            ])]
        );
    }

    #[test]
    fn only_first_link_is_rendered() {
        let blocks = render_blocks("[a](1) and [b](2)");

        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![link("a", "1"), text(" and [b](2)")])]
        );
    }

    #[test]
    fn skips_blank_lines() {
        assert!(render_blocks("\n\n  \n").is_empty());
        assert!(LineRenderer.render("").is_empty());
        assert!(LineRenderer.render("").anchors.is_empty());
    }

    #[test]
    fn escapes_html() {
        let html = LineRenderer.render("## <script>\n5 > 3 & \"quoted\"").html;

        assert!(html.contains("<h2 id=\"script\">&lt;script&gt;</h2>"));
        assert!(html.contains("<p>5 &gt; 3 &amp; &quot;quoted&quot;</p>"));
    }

    #[test]
    fn anchors_match_outline() {
        let source = "# Privacy\n## Data We Collect\ntext\n### Location (GPS)\n- a\n## Contact [us](x)\n## Data We Collect";

        let outline: Vec<String> = extract_outline(source).into_iter().map(|s| s.id).collect();
        let rendered = LineRenderer.render(source);

        assert_eq!(rendered.anchors, outline);
        for id in &outline {
            assert!(rendered.html.contains(&format!("id=\"{id}\"")));
        }
    }

    #[test]
    fn renderer_kind_deserializes() {
        #[derive(Deserialize)]
        struct Wrapper {
            renderer: RendererKind,
        }

        let parsed: Wrapper = serde_json::from_str(r#"{"renderer":"commonmark"}"#).unwrap();
        assert_eq!(parsed.renderer, RendererKind::CommonMark);
        assert_eq!(RendererKind::default().renderer().name(), "line");
    }
}
