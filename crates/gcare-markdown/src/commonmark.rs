//! CommonMark rendering through pulldown-cmark.
//!
//! Events are passed through unchanged except for two hooks: level 2/3 ATX
//! headings get the outline id, and links are rewritten to open in a new
//! browsing context.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::outline::classify_heading;
use crate::render::{escape_html, RenderedDocument, Renderer};

/// Standards-compliant renderer with heading-id and link hooks.
#[derive(Debug, Clone)]
pub struct CommonMarkRenderer {
    options: Options,
}

impl CommonMarkRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
        }
    }
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CommonMarkRenderer {
    fn name(&self) -> &'static str {
        "commonmark"
    }

    fn render(&self, source: &str) -> RenderedDocument {
        let mut anchors = Vec::new();

        let events = Parser::new_ext(source, self.options)
            .into_offset_iter()
            .map(|(event, range)| match event {
                Event::Start(Tag::Heading {
                    level,
                    classes,
                    attrs,
                    ..
                }) => {
                    // The id comes from the raw source line, exactly as the outline sees it.
                    // Headings nested in quotes or list items are not outline lines.
                    let id = starts_line(source, range.start)
                        .then(|| source[range].lines().next())
                        .flatten()
                        .and_then(classify_heading)
                        .and_then(|heading| heading.anchor());

                    if let Some(id) = &id {
                        anchors.push(id.clone());
                    }

                    Event::Start(Tag::Heading {
                        level,
                        id: id.map(CowStr::from),
                        classes,
                        attrs,
                    })
                }
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => Event::InlineHtml(open_link(&dest_url, &title).into()),
                Event::End(TagEnd::Link) => Event::InlineHtml("</a>".into()),
                other => other,
            });

        let mut html_output = String::new();
        html::push_html(&mut html_output, events);

        RenderedDocument {
            html: html_output,
            anchors,
        }
    }
}

/// Whether only whitespace precedes `offset` on its line.
fn starts_line(source: &str, offset: usize) -> bool {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..offset]
        .chars()
        .all(|c| c == ' ' || c == '\t')
}

fn open_link(href: &str, title: &str) -> String {
    let mut tag = format!(
        r#"<a href="{}" target="_blank" rel="noopener noreferrer""#,
        escape_html(href)
    );
    if !title.is_empty() {
        tag.push_str(&format!(r#" title="{}""#, escape_html(title)));
    }
    tag.push('>');
    tag
}
