// ABOUTME: Boilerplate predicates used while walking an article DOM.
// ABOUTME: Discard-tag list, class/id token denylist (Aho-Corasick), ARIA roles, hidden elements.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use scraper::node::Element;
use scraper::ElementRef;

/// Elements whose whole subtree never contributes text.
pub const DISCARD_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "footer", "aside", "header", "form",
    "iframe", "svg", "canvas", "button", "select", "textarea", "object", "embed", "dialog",
    "head", "title", "link", "meta",
];

/// Substrings of class/id values that mark boilerplate containers.
const BOILERPLATE_TOKENS: &[&str] = &[
    "cookie",
    "consent",
    "subscribe",
    "newsletter",
    "nav",
    "menu",
    "sidebar",
    "footer",
    "share",
    "social",
    "advert",
    "banner",
    "popup",
    "modal",
    "related",
    "comment",
    "breadcrumb",
    "promo",
    "widget",
];

/// Substrings of class/id values that mark content containers. These win over
/// the denylist, so `<div id="content" class="with-sidebar">` is kept.
const CONTENT_TOKENS: &[&str] = &[
    "article",
    "content",
    "entry",
    "hentry",
    "main",
    "story",
    "body",
];

/// ARIA landmark roles that never hold article text.
const BOILERPLATE_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "complementary",
    "contentinfo",
    "search",
    "dialog",
    "alertdialog",
    "menu",
    "menubar",
];

/// Elements exempt from the class/id denylist: a `<body class="has-navbar">`
/// must not wipe out the page.
const ATTRIBUTE_EXEMPT_TAGS: &[&str] = &["html", "body"];

static BOILERPLATE_MATCHER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(BOILERPLATE_TOKENS)
        .ok()
});

static CONTENT_MATCHER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(CONTENT_TOKENS)
        .ok()
});

/// True if `name` is a tag whose subtree is always dropped.
pub fn is_discard_tag(name: &str) -> bool {
    DISCARD_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name))
}

fn attrs_match(el: &Element, matcher: &AhoCorasick) -> bool {
    el.classes().any(|class| matcher.is_match(class))
        || el.id().is_some_and(|id| matcher.is_match(id))
}

/// True if any class token or the id contains a denylisted substring and
/// none contains a content-container substring.
pub fn has_boilerplate_attrs(el: &Element) -> bool {
    if ATTRIBUTE_EXEMPT_TAGS.contains(&el.name()) {
        return false;
    }
    if CONTENT_MATCHER
        .as_ref()
        .is_some_and(|content| attrs_match(el, content))
    {
        return false;
    }
    BOILERPLATE_MATCHER
        .as_ref()
        .is_some_and(|matcher| attrs_match(el, matcher))
}

/// True if the element is explicitly hidden from readers.
pub fn is_hidden(el: &Element) -> bool {
    if el.attr("hidden").is_some() {
        return true;
    }
    if el
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    })
}

/// True if the element carries a non-content ARIA role.
pub fn has_boilerplate_role(el: &Element) -> bool {
    el.attr("role").is_some_and(|role| {
        role.split_whitespace()
            .any(|r| BOILERPLATE_ROLES.iter().any(|b| b.eq_ignore_ascii_case(r)))
    })
}

/// True if the element and its subtree should be dropped.
pub fn is_boilerplate(el: &Element) -> bool {
    is_discard_tag(el.name()) || is_hidden(el) || has_boilerplate_role(el) || has_boilerplate_attrs(el)
}

/// True if the element or any ancestor is boilerplate.
pub fn in_boilerplate(el: &ElementRef) -> bool {
    if is_boilerplate(el.value()) {
        return true;
    }
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| is_boilerplate(a.value()))
}
