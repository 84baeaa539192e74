// ABOUTME: Block-level text collection: walks a DOM subtree and emits one string per text block.
// ABOUTME: Boilerplate subtrees are skipped; inline content is concatenated with whitespace collapsed.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use super::cleaners::is_boilerplate;
use super::normalize_spaces;

/// Tags that start and end a text block.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "body", "caption", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "html", "li",
    "main", "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name))
}

struct BlockCollector {
    blocks: Vec<String>,
    buf: String,
    /// A `<br>` was the last thing seen, ignoring whitespace.
    after_br: bool,
}

impl BlockCollector {
    fn flush(&mut self) {
        self.after_br = false;
        let text = normalize_spaces(&self.buf);
        self.buf.clear();
        if !text.is_empty() {
            self.blocks.push(text);
        }
    }

    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => {
                if !text.trim().is_empty() {
                    self.after_br = false;
                }
                self.buf.push_str(text);
            }
            Node::Element(el) => {
                if is_boilerplate(el) {
                    return;
                }
                if el.name().eq_ignore_ascii_case("br") {
                    // <br><br> separates paragraphs
                    if self.after_br {
                        self.flush();
                    } else {
                        self.buf.push(' ');
                        self.after_br = true;
                    }
                    return;
                }
                self.after_br = false;
                let block = is_block_tag(el.name());
                if block {
                    self.flush();
                }
                for child in node.children() {
                    self.walk(child);
                }
                if block {
                    self.flush();
                }
            }
            _ => {}
        }
    }
}

/// Collect the text blocks under `root`, in document order.
///
/// The root itself is not tested against the boilerplate rules; callers pick
/// roots that are already known to be content containers.
pub fn collect_blocks(root: ElementRef<'_>) -> Vec<String> {
    let mut collector = BlockCollector {
        blocks: Vec::new(),
        buf: String::new(),
        after_br: false,
    };
    for child in root.children() {
        collector.walk(child);
    }
    collector.flush();
    collector.blocks
}
