//! Template engine for rendering site pages.

use gcare_markdown::Section;
use minijinja::{context, Environment};

/// Robots directive for indexable pages.
pub const ROBOTS_INDEX: &str =
    "index, follow, max-snippet:-1, max-image-preview:large, max-video-preview:-1";

/// Robots directive for pages kept out of search results.
pub const ROBOTS_NOINDEX: &str = "noindex, nofollow";

/// Context for rendering a page template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Meta description
    pub description: String,
    /// Meta keywords
    pub keywords: String,
    /// Robots directive
    pub robots: String,
    /// Canonical URL
    pub canonical: String,
    /// Rendered content HTML
    pub content: String,
    /// Outline entries, empty when the sidebar is off
    pub toc: Vec<Section>,
    /// Message shown in place of content
    pub error: Option<String>,
    /// Base URL
    pub base_url: String,
    /// Tracker settings as JSON for the browser runtime
    pub tracker: String,
    /// Links shown in the page footer
    pub footer: Vec<FooterLink>,
    /// Include the dev live reload client
    pub live_reload: bool,
}

/// A footer link to another site variant.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("base.html".to_string(), BASE_TEMPLATE.to_string())
            .expect("Failed to add base template");

        env.add_template_owned("page.html".to_string(), PAGE_TEMPLATE.to_string())
            .expect("Failed to add page template");

        env.add_template_owned("outline.html".to_string(), OUTLINE_TEMPLATE.to_string())
            .expect("Failed to add outline template");

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        context: &PageContext,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            title => &context.title,
            site_title => &context.site_title,
            description => &context.description,
            keywords => &context.keywords,
            robots => &context.robots,
            canonical => &context.canonical,
            content => &context.content,
            toc => &context.toc,
            error => &context.error,
            base_url => &context.base_url,
            tracker => &context.tracker,
            footer => &context.footer,
            live_reload => context.live_reload,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  <meta name="title" content="{{ title }}">
  <meta name="description" content="{{ description }}">
  <meta name="keywords" content="{{ keywords }}">
  <meta name="author" content="{{ site_title }}">
  <meta name="robots" content="{{ robots }}">
  <link rel="canonical" href="{{ canonical }}">
  <meta property="og:type" content="website">
  <meta property="og:url" content="{{ canonical }}">
  <meta property="og:title" content="{{ title }}">
  <meta property="og:description" content="{{ description }}">
  <meta property="og:site_name" content="{{ site_title }}">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:title" content="{{ title }}">
  <meta name="twitter:description" content="{{ description }}">
  <link rel="stylesheet" href="{{ base_url }}assets/main.css">
</head>
<body>
  {% block body %}{% endblock %}
  <footer class="site-footer">
    {% if footer %}
    <nav class="footer-links">
      {% for link in footer %}{% if not loop.first %}<span class="sep">|</span>{% endif %}
      <a href="{{ link.href }}">{{ link.label }}</a>
      {% endfor %}
    </nav>
    {% endif %}
    <p>&copy; GCare. All rights reserved.</p>
  </footer>
  <script type="application/json" id="gcare-tracker">{{ tracker | safe }}</script>
  <script src="{{ base_url }}assets/viewer.js"></script>
  {% if live_reload %}<script src="/__live.js"></script>{% endif %}
</body>
</html>"##;

const PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block body %}
<div class="layout{% if toc %} with-toc{% endif %}">
  {% if toc %}
  <button type="button" class="menu-btn" aria-controls="toc" aria-expanded="false">Contents</button>
  <aside class="toc" id="toc">
    {% include "outline.html" %}
  </aside>
  {% endif %}
  <main class="main">
    {% if error %}
    <div class="error" role="alert">{{ error }}</div>
    {% endif %}
    <article class="content">
      {{ content | safe }}
    </article>
  </main>
</div>
{% endblock %}"##;

const OUTLINE_TEMPLATE: &str = r##"<h2>Table of Contents</h2>
<ul>
{% for entry in toc %}
  <li class="toc-level-{{ entry.level }}">
    <a href="#{{ entry.id }}" data-section="{{ entry.id }}">{{ entry.title }}</a>
  </li>
{% endfor %}
</ul>"##;
