// ── Minimal markup scanning ──
//
// The endpoints return small HTML fragments, not documents. A full DOM is
// not needed: opening tags are located with a regex, attributes are split
// out, and element text is taken up to the matching close tag.

use std::sync::LazyLock;

use regex::Regex;

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<([A-Za-z][A-Za-z0-9]*)\b([^>]*)>").expect("open tag pattern is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag strip pattern is valid"));

static OPEN_OR_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*?(/?)>")
        .expect("open/close tag pattern is valid")
});

/// An opening tag found in a fragment.
#[derive(Debug, Clone)]
pub(crate) struct Tag {
    /// Lowercased tag name.
    pub name: String,
    /// Attributes in source order, names lowercased.
    pub attrs: Vec<(String, String)>,
    /// Byte offset of `<`.
    pub start: usize,
    /// Byte offset just past `>`.
    pub end: usize,
}

impl Tag {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whitespace-separated class token match, like a CSS class selector.
    pub fn has_class(&self, token: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == token))
    }
}

/// All opening tags named `name` (case-insensitive), in document order.
pub(crate) fn tags<'a>(html: &'a str, name: &'a str) -> impl Iterator<Item = Tag> + 'a {
    OPEN_TAG.captures_iter(html).filter_map(move |caps| {
        let whole = caps.get(0)?;
        let tag_name = caps.get(1)?.as_str();
        if !tag_name.eq_ignore_ascii_case(name) {
            return None;
        }
        let raw_attrs = caps.get(2).map_or("", |m| m.as_str());
        Some(Tag {
            name: tag_name.to_ascii_lowercase(),
            attrs: parse_attributes(raw_attrs),
            start: whole.start(),
            end: whole.end(),
        })
    })
}

/// Any opening tag, regardless of name, that carries attribute `attr`.
pub(crate) fn first_with_attr(html: &str, attr: &str) -> Option<Tag> {
    OPEN_TAG.captures_iter(html).find_map(|caps| {
        let whole = caps.get(0)?;
        let attrs = parse_attributes(caps.get(2).map_or("", |m| m.as_str()));
        if !attrs.iter().any(|(k, _)| k == attr) {
            return None;
        }
        Some(Tag {
            name: caps.get(1)?.as_str().to_ascii_lowercase(),
            attrs,
            start: whole.start(),
            end: whole.end(),
        })
    })
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            Some((name, value.to_owned()))
        })
        .collect()
}

/// Byte offset of the close tag that ends `tag`, counting nested elements
/// of the same name. `None` when the element is never closed.
pub(crate) fn matching_close(html: &str, tag: &Tag) -> Option<usize> {
    let rest = html.get(tag.end..)?;
    let mut depth = 0_usize;
    for caps in OPEN_OR_CLOSE.captures_iter(rest) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if !name.as_str().eq_ignore_ascii_case(&tag.name) {
            continue;
        }
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            if depth == 0 {
                return Some(tag.end + whole.start());
            }
            depth -= 1;
        } else if !self_closing {
            depth += 1;
        }
    }
    None
}

/// Visible text of an element: everything between the opening tag and its
/// close tag, with nested tags stripped and whitespace trimmed.
pub(crate) fn element_text(html: &str, tag: &Tag) -> String {
    let close = matching_close(html, tag).unwrap_or(html.len());
    let inner = html.get(tag.end..close).unwrap_or_default();
    ANY_TAG.replace_all(inner, "").trim().to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn attributes_accept_all_quote_styles() {
        let html = r#"<div class="a b" data-free='40' id=x hidden>"#;
        let tag = tags(html, "div").next().unwrap();
        assert_eq!(tag.attr("class"), Some("a b"));
        assert_eq!(tag.attr("data-free"), Some("40"));
        assert_eq!(tag.attr("id"), Some("x"));
        assert_eq!(tag.attr("hidden"), Some(""));
        assert_eq!(tag.attr("style"), None);
    }

    #[test]
    fn matching_close_skips_nested_elements() {
        let html = r#"<div class="outer"><div class="inner"></div><br/></div><div></div>"#;
        let outer = tags(html, "div").next().unwrap();
        let close = matching_close(html, &outer).unwrap();
        assert_eq!(&html[close..close + 6], "</div>");
        assert_eq!(&html[close + 6..], "<div></div>");
    }

    #[test]
    fn matching_close_of_unclosed_element_is_none() {
        let html = r#"<div class="outer"><div></div>"#;
        let outer = tags(html, "div").next().unwrap();
        assert_eq!(matching_close(html, &outer), None);
    }

    #[test]
    fn tag_names_match_case_insensitively() {
        let html = r#"<DIV CLASS="outer_wrapper"></DIV>"#;
        let tag = tags(html, "div").next().unwrap();
        assert_eq!(tag.name, "div");
        assert!(tag.has_class("outer_wrapper"));
    }

    #[test]
    fn class_match_is_token_based() {
        let html = r#"<div class="inner_wrapper_extra">"#;
        let tag = tags(html, "div").next().unwrap();
        assert!(!tag.has_class("inner_wrapper"));
    }

    #[test]
    fn element_text_strips_nested_markup() {
        let html = r#"<span title="x"> <b>12</b> </span>"#;
        let tag = tags(html, "span").next().unwrap();
        assert_eq!(element_text(html, &tag), "12");
    }

    #[test]
    fn first_with_attr_ignores_tag_name() {
        let html = r#"<p>hi</p><section data-free="7"></section>"#;
        let tag = first_with_attr(html, "data-free").unwrap();
        assert_eq!(tag.name, "section");
        assert_eq!(tag.attr("data-free"), Some("7"));
    }
}
