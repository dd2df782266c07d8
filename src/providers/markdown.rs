//! HTML to markdown conversion for fetched pages

use html2md::{Handle, StructuredPrinter, TagHandler, TagHandlerFactory};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use url::Url;

lazy_static! {
    static ref LINK_TARGET: Regex = Regex::new(r"\]\(([^()\s]+)\)").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").unwrap();
}

/// Elements whose content never reaches the markdown output
const IGNORED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "canvas", "iframe", "nav",
    "footer", "form", "button", "select", "input",
];

/// Readable content extracted from an HTML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub markdown: String,
}

/// Drops an element together with its children
#[derive(Clone)]
struct IgnoreTagFactory;

impl TagHandlerFactory for IgnoreTagFactory {
    fn instantiate(&self) -> Box<dyn TagHandler> {
        Box::new(self.clone())
    }
}

impl TagHandler for IgnoreTagFactory {
    fn handle(&mut self, _tag: &Handle, _printer: &mut StructuredPrinter) {}
    fn after_handle(&mut self, _printer: &mut StructuredPrinter) {}
    fn skip_descendants(&self) -> bool {
        true
    }
}

/// Convert an HTML document to markdown
///
/// Relative links are resolved against `base` when given.
pub fn html_to_markdown(html: &str, base: Option<&Url>) -> ExtractedPage {
    let (title, description) = page_metadata(html);

    let mut tag_factory: HashMap<String, Box<dyn TagHandlerFactory>> = HashMap::new();
    for tag in IGNORED {
        tag_factory.insert(tag.to_string(), Box::new(IgnoreTagFactory));
    }

    let markdown = html2md::parse_html_custom(html.trim(), &tag_factory, true);
    let markdown = BLANK_LINES.replace_all(markdown.trim(), "\n\n");
    let markdown = match base {
        Some(base) => resolve_links(&markdown, base),
        None => markdown.into_owned(),
    };

    ExtractedPage {
        title,
        description,
        markdown,
    }
}

/// `<title>` text and `<meta name="description">` content
fn page_metadata(html: &str) -> (Option<String>, Option<String>) {
    let document = Html::parse_document(html);
    let elements = || {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    };

    let title = elements()
        .find(|e| e.value().name() == "title")
        .map(|t| t.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty());

    let description = elements()
        .find(|e| {
            e.value().name() == "meta"
                && e.value()
                    .attr("name")
                    .is_some_and(|n| n.eq_ignore_ascii_case("description"))
        })
        .and_then(|e| e.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    (title, description)
}

/// Rewrite relative markdown link targets into absolute URLs
///
/// Absolute targets and in-page fragments are left as they are.
fn resolve_links(markdown: &str, base: &Url) -> String {
    LINK_TARGET
        .replace_all(markdown, |caps: &Captures| {
            let target = &caps[1];
            if target.starts_with('#') || Url::parse(target).is_ok() {
                return caps[0].to_string();
            }
            match base.join(target) {
                Ok(url) => format!("]({})", url),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}
