//! Related link extraction from watch pages
//!
//! The page lists suggestions as `<li class="related-list-item">` entries.
//! Only entries whose first anchor carries the `content-link` class are single
//! videos; mixes and playlists use other anchor classes and are skipped.
//!
//! This is a tolerant tag scanner, not an HTML parser: it only needs tag names
//! and attributes, and never fails on malformed markup.

use tracing::debug;
use url::Url;

const ITEM_CLASS: &str = "related-list-item";
const VIDEO_LINK_CLASS: &str = "content-link";

/// Collect related video links from `html`, resolved against `base`
///
/// Links keep page order. Unresolvable hrefs are skipped.
pub fn extract_related_links(html: &str, base: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut in_item = false;

    for tag in Tags::new(html) {
        if tag.is("li") {
            in_item = !tag.closing && has_class(tag.attrs, ITEM_CLASS);
            continue;
        }

        if !in_item || tag.closing || !tag.is("a") {
            continue;
        }

        // Only the entry's first anchor decides
        in_item = false;

        if !has_class(tag.attrs, VIDEO_LINK_CLASS) {
            continue;
        }
        let Some(href) = attribute(tag.attrs, "href") else {
            continue;
        };

        match base.join(&decode_entities(href)) {
            Ok(url) => links.push(url.to_string()),
            Err(e) => debug!("Skipping related link {:?}: {}", href, e),
        }
    }

    links
}

/// A start or end tag
struct Tag<'a> {
    name: &'a str,
    attrs: &'a str,
    closing: bool,
}

impl Tag<'_> {
    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Iterator over the tags of a document, skipping comments
struct Tags<'a> {
    html: &'a str,
    pos: usize,
}

impl<'a> Tags<'a> {
    fn new(html: &'a str) -> Self {
        Self { html, pos: 0 }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Tag<'a>> {
        loop {
            let start = self.pos + self.html.get(self.pos..)?.find('<')?;
            let after = &self.html[start + 1..];

            if let Some(comment) = after.strip_prefix("!--") {
                self.pos = comment
                    .find("-->")
                    .map_or(self.html.len(), |end| start + 4 + end + 3);
                continue;
            }

            let closing = after.starts_with('/');
            let name_start = start + 1 + usize::from(closing);
            let name_len = self.html[name_start..]
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(self.html.len() - name_start);

            if name_len == 0 {
                // Stray '<' in text
                self.pos = start + 1;
                continue;
            }

            let attrs_start = name_start + name_len;
            let end = find_tag_end(self.html, attrs_start)?;
            self.pos = end + 1;

            return Some(Tag {
                name: &self.html[name_start..attrs_start],
                attrs: &self.html[attrs_start..end],
                closing,
            });
        }
    }
}

/// Index of the `>` closing a tag, ignoring quoted attribute values
fn find_tag_end(html: &str, from: usize) -> Option<usize> {
    let mut quote = None;

    for (i, c) in html[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(from + i),
            _ => {}
        }
    }

    None
}

/// Raw value of attribute `wanted` in a tag's attribute text
fn attribute<'a>(attrs: &'a str, wanted: &str) -> Option<&'a str> {
    let mut rest = attrs;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '/');
        if rest.is_empty() {
            return None;
        }

        let name_end = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let value = match rest.strip_prefix('=') {
            Some(after_eq) => {
                let after_eq = after_eq.trim_start();
                let (value, remaining) = split_value(after_eq);
                rest = remaining;
                Some(value)
            }
            None => None,
        };

        if name.eq_ignore_ascii_case(wanted) {
            return Some(value.unwrap_or(""));
        }
        if name.is_empty() && value.is_none() {
            // Garbage we can't step over
            return None;
        }
    }
}

/// Split an attribute value (quoted or bare) from the text after it
fn split_value(text: &str) -> (&str, &str) {
    match text.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let body = &text[1..];
            match body.find(q) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            }
        }
        _ => {
            let end = text
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(text.len());
            (&text[..end], &text[end..])
        }
    }
}

fn has_class(attrs: &str, class: &str) -> bool {
    attribute(attrs, "class")
        .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
}

/// Decode the character references that show up in hrefs
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
