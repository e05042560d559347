use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::card::{DetailPage, RawCard};
use crate::error::{Result, TrackerError};

static ADVERT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/advert/\d+$").unwrap());

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "nav", "ol", "p",
    "section", "table", "td", "th", "tr", "ul",
];

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TrackerError::Parse {
        reason: format!("invalid selector {css}: {e}"),
    })
}

/// Advert cards on a results page, in document order, one per distinct URL.
pub fn parse_cards(html: &str, page_url: &Url) -> Result<Vec<RawCard>> {
    let document = Html::parse_document(html);
    let anchors = selector(r#"a[href*="/advert/"]"#)?;
    let img = selector("img")?;

    let mut seen = HashSet::new();
    let mut cards = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut url) = page_url.join(href) else {
            tracing::debug!(href, "Skipping unresolvable advert link");
            continue;
        };
        url.set_fragment(None);
        if url.query().is_some() || !ADVERT_PATH_RE.is_match(url.path()) {
            continue;
        }
        let url = url.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let mut card = RawCard::new(url, visible_text(anchor));
        if let Some(src) = anchor.select(&img).find_map(|i| {
            i.value()
                .attr("src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| i.value().attr("data-src"))
        }) && let Ok(resolved) = page_url.join(src.trim())
        {
            card = card.with_image(resolved.to_string());
        }
        cards.push(card);
    }
    Ok(cards)
}

/// Whether the page links to page `current + 1`.
pub fn has_next_page(html: &str, page_url: &Url, current: u32) -> Result<bool> {
    let document = Html::parse_document(html);
    let links = selector("a[href]")?;
    let next = (current + 1).to_string();

    Ok(document.select(&links).any(|a| {
        let el = a.value();
        if el
            .attr("aria-label")
            .is_some_and(|label| label.trim().eq_ignore_ascii_case("next page"))
        {
            return true;
        }
        if el
            .attr("rel")
            .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("next")))
        {
            return true;
        }
        el.attr("href")
            .and_then(|href| page_url.join(href).ok())
            .is_some_and(|url| url.query_pairs().any(|(k, v)| k == "page" && v == next))
    }))
}

/// Attribute pairs from `dl` (`dt`/`dd`) and two-cell table rows, plus the
/// page's visible body text.
pub fn parse_detail(html: &str) -> Result<DetailPage> {
    let document = Html::parse_document(html);
    let terms = selector("dl dt")?;
    let rows = selector("tr")?;
    let cells = selector("th, td")?;
    let body = selector("body")?;

    let mut labels = Vec::new();
    for term in document.select(&terms) {
        let definition = term
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| matches!(sibling.value().name(), "dd" | "dt"))
            .filter(|sibling| sibling.value().name() == "dd");
        if let Some(definition) = definition {
            labels.push((one_line(term), one_line(definition)));
        }
    }
    for row in document.select(&rows) {
        let row_cells: Vec<ElementRef<'_>> = row.select(&cells).collect();
        if let [label, value] = row_cells.as_slice() {
            labels.push((one_line(*label), one_line(*value)));
        }
    }

    let body_text = document
        .select(&body)
        .next()
        .map_or_else(|| visible_text(document.root_element()), visible_text);

    Ok(DetailPage { labels, body_text })
}

/// Rendered text with one line per block element, blank lines dropped.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn one_line(element: ElementRef<'_>) -> String {
    visible_text(element).replace('\n', " ")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if HIDDEN_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child) = ElementRef::wrap(child) {
                    push_text(child, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
