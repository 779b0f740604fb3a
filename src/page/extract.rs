//! Post extraction from WordPress-style markup
//!
//! This module pulls the record fields out of a rendered post page:
//! - Identifier, title, header and content markup
//! - Upload and update timestamps from `<time>` elements
//! - Canonical post URL from the permalink
//! - The navigation link for the requested traversal direction

use crate::model::{PageHandle, RawRecord};
use crate::page::{CrawlDirection, LoadedPage, PageError, PageResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracts a post record and its navigation link from rendered page markup
///
/// Relative navigation links resolve against `page_url`, which should be the
/// final URL after redirects.
///
/// # Arguments
///
/// * `html` - The rendered page markup
/// * `page_url` - The URL the markup was served from
/// * `direction` - Which navigation link to follow
///
/// # Returns
///
/// The extracted record and next handle, or an error when a required field
/// is missing or malformed
pub fn extract_post(
    html: &str,
    page_url: &Url,
    direction: CrawlDirection,
) -> PageResult<LoadedPage> {
    let document = Html::parse_document(html);

    let article = article_element(&document).ok_or(PageError::MissingField("article"))?;
    let id = article
        .value()
        .attr("id")
        .map(str::to_string)
        .ok_or(PageError::MissingField("article id"))?;

    let title = text_in(article, "h1.entry-title").ok_or(PageError::MissingField("title"))?;
    let header_markup = inner_html_in(article, ".entry-header").unwrap_or_default();
    let content_markup = inner_html_in(article, ".entry-content")
        .map(|markup| rewrite_content_links(&markup))
        .ok_or(PageError::MissingField("content"))?;

    let upload_raw = attr_in(article, "time.entry-date.published", "datetime")
        .ok_or(PageError::MissingField("upload time"))?;
    let upload_time = parse_time("upload", &upload_raw)?;

    // The updated element carries the published datetime when the post was
    // never edited; recording it anyway is harmless.
    let update_time = match attr_in(article, "time.updated", "datetime") {
        Some(value) => Some(parse_time("update", &value)?),
        None => None,
    };

    let url = attr_in(article, "span.posted-on a", "href")
        .unwrap_or_else(|| page_url.to_string());

    let nav_css = match direction {
        CrawlDirection::Newer => "div.nav-next a",
        CrawlDirection::Older => "div.nav-previous a",
    };
    let next = match nav_href(&document, nav_css) {
        Some(href) => Some(resolve_handle(&href, page_url)?),
        None => None,
    };

    let record = RawRecord {
        id,
        url,
        title,
        header_markup,
        content_markup,
        upload_time,
        update_time,
    };

    Ok(LoadedPage { record, next })
}

/// Rewrites every anchor in post content to open in a new tab
///
/// Existing `target` and `rel` attributes are replaced so embedded links
/// always carry `target="_blank" rel="noopener noreferrer"`.
pub fn rewrite_content_links(markup: &str) -> String {
    let anchor_tag = Regex::new(r"<a\b[^>]*>").unwrap();
    let target_or_rel =
        Regex::new(r#"\s+(?:target|rel)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap();

    anchor_tag
        .replace_all(markup, |caps: &regex::Captures<'_>| {
            let tag = target_or_rel.replace_all(&caps[0], "");
            let head = tag.strip_suffix('>').unwrap_or(&tag).trim_end();
            format!(r#"{} target="_blank" rel="noopener noreferrer">"#, head)
        })
        .into_owned()
}

/// Returns the plain text of a record for prompt and excerpt building
///
/// The title comes first, then the content markup with tags stripped and
/// whitespace collapsed.
pub fn article_text(record: &RawRecord) -> String {
    let fragment = Html::parse_fragment(&record.content_markup);
    let body = fragment
        .root_element()
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if body.is_empty() {
        record.title.clone()
    } else {
        format!("{}\n\n{}", record.title, body)
    }
}

fn article_element(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(r#"article[id^="post-"]"#).ok()?;
    document.select(&selector).next()
}

fn text_in(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn inner_html_in(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next().map(|el| el.inner_html())
}

fn attr_in(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

fn nav_href(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string)
}

fn parse_time(field: &'static str, value: &str) -> PageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PageError::MalformedTime {
            field,
            value: value.to_string(),
        })
}

fn resolve_handle(href: &str, base: &Url) -> PageResult<PageHandle> {
    base.join(href.trim())
        .map(PageHandle::from)
        .map_err(|source| PageError::InvalidLink {
            href: href.to_string(),
            source,
        })
}
