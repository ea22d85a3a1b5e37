//! Asset pipeline for CSS and the browser runtime.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the viewer runtime.
    ///
    /// The runtime reads its settings from the `gcare-tracker` JSON block each
    /// page carries, so one script serves every page.
    pub fn generate_js() -> String {
        VIEWER_JS.replace(
            "__MAX_COOLDOWN_MS__",
            &gcare_tracker::MAX_COOLDOWN_MS.to_string(),
        )
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* GCare site theme */

:root {
  --background: #ffffff;
  --foreground: #1f2937;
  --muted: #f9fafb;
  --muted-foreground: #6b7280;
  --border: #e5e7eb;
  --primary: #2563eb;
  --primary-foreground: #ffffff;
  --danger: #b91c1c;
  --danger-background: #fef2f2;
  --radius: 0.5rem;
  --toc-width: 260px;
  --content-max-width: 860px;
  --header-offset: 80px;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

html {
  scroll-padding-top: var(--header-offset);
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.layout {
  display: grid;
  grid-template-columns: 1fr;
  min-height: 100vh;
}

.layout.with-toc {
  grid-template-columns: var(--toc-width) 1fr;
}

/* Outline sidebar */
.toc {
  position: sticky;
  top: 0;
  align-self: start;
  height: 100vh;
  overflow-y: auto;
  padding: 2rem 1.5rem;
  border-right: 1px solid var(--border);
  background: var(--muted);
}

.toc h2 {
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc li {
  margin-bottom: 0.25rem;
}

.toc a {
  display: block;
  padding: 0.25rem 0.5rem;
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
  border-left: 2px solid transparent;
  transition: color 0.15s, border-color 0.15s;
}

.toc a:hover {
  color: var(--foreground);
}

.toc a.active {
  color: var(--primary);
  border-left-color: var(--primary);
  font-weight: 600;
}

.toc-level-2 {
  padding-left: 0;
}

.toc-level-3 {
  padding-left: 1rem;
}

/* Main content */
.main {
  padding: 2rem;
  max-width: var(--content-max-width);
}

.content h1 {
  font-size: 2.25rem;
  font-weight: 700;
  margin-bottom: 1.5rem;
}

.content h2 {
  font-size: 1.5rem;
  font-weight: 600;
  margin: 2rem 0 1rem;
  padding-bottom: 0.5rem;
  border-bottom: 1px solid var(--border);
}

.content h3 {
  font-size: 1.25rem;
  font-weight: 600;
  margin: 1.5rem 0 0.75rem;
}

.content p {
  margin-bottom: 1rem;
}

.content ul {
  margin: 0 0 1rem 1.5rem;
}

.content li {
  margin-bottom: 0.25rem;
}

.content a {
  color: var(--primary);
  text-decoration: underline;
  text-underline-offset: 4px;
}

.error {
  margin-bottom: 1.5rem;
  padding: 1rem;
  border: 1px solid var(--danger);
  border-radius: var(--radius);
  background: var(--danger-background);
  color: var(--danger);
}

.site-footer {
  padding: 1.5rem 1rem;
  background: #111827;
  color: #9ca3af;
  font-size: 0.875rem;
  text-align: center;
}

.footer-links {
  display: flex;
  flex-wrap: wrap;
  justify-content: center;
  gap: 0.75rem;
  margin-bottom: 1rem;
}

.footer-links a {
  color: inherit;
  text-decoration: underline;
}

.footer-links a:hover {
  color: #ffffff;
}

.footer-links .sep {
  color: #4b5563;
}

/* Menu button for the mobile outline */
.menu-btn {
  display: none;
  position: fixed;
  right: 1rem;
  bottom: 1rem;
  z-index: 100;
  padding: 0.5rem 1rem;
  background: var(--primary);
  color: var(--primary-foreground);
  border: none;
  border-radius: var(--radius);
  cursor: pointer;
}

@media (max-width: 1024px) {
  .layout.with-toc {
    grid-template-columns: 1fr;
  }

  .menu-btn {
    display: block;
  }

  .toc {
    position: fixed;
    inset: 0;
    z-index: 50;
    height: auto;
    transform: translateX(-100%);
    transition: transform 0.3s;
  }

  .toc.open {
    transform: translateX(0);
  }
}
"#;

/// Browser port of `gcare_tracker`. `byVisibility` follows
/// `VisibilityStrategy`, `byPosition` follows `PositionStrategy`, `nearBottom`
/// follows `bottom_override` and `navigate` follows `SectionTracker::navigate`.
/// Change them together.
const VIEWER_JS: &str = r#"// GCare viewer runtime: keeps the outline in sync with the reader.
(function() {
  'use strict';

  const configEl = document.getElementById('gcare-tracker');
  const toc = document.querySelector('.toc');
  if (!configEl || !toc) return;

  const config = JSON.parse(configEl.textContent || '{}');
  const cooldown = Math.min(config.cooldown_ms, __MAX_COOLDOWN_MS__);
  const links = Array.from(toc.querySelectorAll('a[data-section]'));
  const menuBtn = document.querySelector('.menu-btn');

  // Only outline entries whose heading was rendered are tracked
  const headings = links
    .map(link => document.getElementById(link.dataset.section))
    .filter(Boolean);

  let active = null;
  let generation = 0;
  let suspendedUntil = 0;

  function setActive(id) {
    if (!id || id === active) return;
    active = id;
    links.forEach(link => {
      const on = link.dataset.section === id;
      link.classList.toggle('active', on);
      if (on) {
        link.setAttribute('aria-current', 'location');
      } else {
        link.removeAttribute('aria-current');
      }
    });
  }

  function setOverlay(open) {
    toc.classList.toggle('open', open);
    if (menuBtn) menuBtn.setAttribute('aria-expanded', String(open));
  }

  function suspended() {
    return Date.now() < suspendedUntil;
  }

  function nearBottom() {
    const distance = document.documentElement.scrollHeight - (window.scrollY + window.innerHeight);
    return distance < config.bottom_threshold;
  }

  function documentTop(el) {
    return el.getBoundingClientRect().top + window.scrollY;
  }

  function byVisibility() {
    const vh = window.innerHeight;
    const top = vh * config.top_inset;
    const bottom = vh * (1 - config.bottom_inset);
    let best = null;
    let bestTop = Infinity;
    headings.forEach(h => {
      const rect = h.getBoundingClientRect();
      if (rect.top <= bottom && rect.bottom >= top && rect.top < bestTop) {
        best = h.id;
        bestTop = rect.top;
      }
    });
    return best;
  }

  function byPosition() {
    const line = window.scrollY + config.lookahead;
    let current = null;
    headings.forEach(h => {
      if (documentTop(h) <= line) current = h.id;
    });
    return current;
  }

  function update() {
    if (suspended() || headings.length === 0) return;
    if (nearBottom()) {
      setActive(headings[headings.length - 1].id);
      return;
    }
    setActive(config.strategy === 'position' ? byPosition() : byVisibility());
  }

  function navigate(id) {
    const el = document.getElementById(id);
    if (!el) {
      console.warn("Element with id '" + id + "' not found");
      return;
    }

    const current = ++generation;
    suspendedUntil = Date.now() + cooldown;
    setActive(id);
    setOverlay(false);

    window.scrollTo({
      top: Math.max(documentTop(el) - config.scroll_offset, 0),
      behavior: 'smooth',
    });

    setTimeout(() => {
      if (current === generation) {
        suspendedUntil = 0;
        update();
      }
    }, cooldown);
  }

  links.forEach(link => {
    link.addEventListener('click', event => {
      event.preventDefault();
      navigate(link.dataset.section);
    });
  });

  if (menuBtn) {
    menuBtn.addEventListener('click', () => {
      setOverlay(!toc.classList.contains('open'));
    });
  }

  if (config.strategy === 'position' || !('IntersectionObserver' in window)) {
    window.addEventListener('scroll', update, { passive: true });
  } else {
    const margin = '-' + config.top_inset * 100 + '% 0px -' + config.bottom_inset * 100 + '% 0px';
    const observer = new IntersectionObserver(update, { rootMargin: margin, threshold: 0 });
    headings.forEach(h => observer.observe(h));
    // The bottom of the page may never cross the band
    window.addEventListener('scroll', () => {
      if (nearBottom()) update();
    }, { passive: true });
    window.addEventListener('pagehide', () => observer.disconnect());
  }

  update();
})();
"#;
