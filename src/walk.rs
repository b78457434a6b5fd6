//! Structural HTML-to-markdown walk.
//!
//! The walker visits a DOM subtree depth-first, emitting markdown-flavored
//! text per element type and, when requested, recording the container
//! regions (div/section/article/main) it passed through. Each recursive call
//! returns an owned text-and-containers pair; results are merged explicitly
//! at composite nodes, so no accumulator is shared across calls.

use dom_query::{Document, NodeRef, Selection};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::result::{make_preview, ContainerDescriptor, ExtractedContent};
use crate::urls;

/// Elements removed before any text is read.
pub(crate) const NOISE_SELECTOR: &str =
    "script, style, nav, header, footer, iframe, noscript, aside";

/// Priority list for finding the main content region.
pub(crate) const CONTENT_ROOT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".content",
    ".post-content",
    ".article-content",
    "#content",
    "#main",
    ".entry-content",
];

/// Container element types tracked during the walk.
const CONTAINER_TAGS: [&str; 4] = ["div", "section", "article", "main"];

#[allow(clippy::expect_used)]
static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("valid regex"));

#[allow(clippy::expect_used)]
static SPACE_RUNS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));

/// Owned output of one walk call: emitted text plus the containers
/// discovered in that subtree, deduplicated by structural key.
#[derive(Debug, Default)]
pub(crate) struct WalkOutput {
    pub text: String,
    pub containers: Vec<ContainerDescriptor>,
}

impl WalkOutput {
    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Merge a child subtree's output, keeping the first descriptor for
    /// each structural key.
    fn merge(&mut self, child: WalkOutput) {
        self.text.push_str(&child.text);
        for container in child.containers {
            if !self.contains_key(&container) {
                self.containers.push(container);
            }
        }
    }

    fn contains_key(&self, candidate: &ContainerDescriptor) -> bool {
        self.containers.iter().any(|c| {
            c.element_type == candidate.element_type
                && c.id == candidate.id
                && c.classes == candidate.classes
        })
    }
}

/// Collapse whitespace into the normalized output form.
///
/// Three or more newlines (with interleaved whitespace) become exactly two,
/// runs of spaces collapse to one, every line is trimmed, and the whole
/// string is trimmed. The operation is a fixed point: cleaning cleaned text
/// changes nothing.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let text = EXCESS_NEWLINES_RE.replace_all(text, "\n\n");
    let text = SPACE_RUNS_RE.replace_all(&text, " ");

    let trimmed_lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    trimmed_lines.join("\n").trim().to_string()
}

/// Remove noise elements from the document in place.
pub(crate) fn remove_noise(doc: &Document) {
    doc.select(NOISE_SELECTOR).remove();
}

/// Pick the walk root for the generic (non-CJK) path: the first matching
/// priority selector, else `body`, else the document element.
pub(crate) fn select_content_root(doc: &Document) -> Option<NodeRef<'_>> {
    for selector in CONTENT_ROOT_SELECTORS {
        let sel = doc.select_single(selector);
        if sel.exists() {
            return sel.nodes().first().copied();
        }
    }

    let body = doc.select_single("body");
    if body.exists() {
        return body.nodes().first().copied();
    }

    let html = doc.select_single("html");
    html.nodes().first().copied()
}

/// Extract markdown-flavored content from raw HTML.
///
/// Removes noise elements, chooses the content root via the priority
/// selector list, walks the subtree, and cleans the result. When
/// `track_containers` is set, the returned container list reports every
/// distinct (type, id, classes) region the walk passed through, in
/// discovery order.
///
/// # Example
///
/// ```rust
/// use readscrape::extract_content;
///
/// let html = "<html><body><article><h2>One</h2><p>Text.</p></article></body></html>";
/// let content = extract_content(html, false);
/// assert!(content.text.contains("## One"));
/// assert!(content.text.contains("Text."));
/// ```
#[must_use]
pub fn extract_content(html: &str, track_containers: bool) -> ExtractedContent {
    let doc = Document::from(html);
    remove_noise(&doc);

    let Some(root) = select_content_root(&doc) else {
        return ExtractedContent {
            text: String::new(),
            containers: track_containers.then(Vec::new),
        };
    };

    let output = walk_from(&root, track_containers);
    ExtractedContent {
        text: clean_text(&output.text),
        containers: track_containers.then_some(output.containers),
    }
}

/// Walk a subtree rooted at `node`.
///
/// Elements with a known emission rule go through the per-element handler;
/// anything else (notably `body`) is treated as a composite and recursed
/// into, so content directly under an unhandled root is still emitted.
pub(crate) fn walk_from(node: &NodeRef, track: bool) -> WalkOutput {
    let tag = tag_of(node);
    if is_handled_tag(&tag) {
        walk_element(node, track)
    } else {
        walk_children(node, track)
    }
}

fn tag_of(node: &NodeRef) -> String {
    node.node_name()
        .map(|t| t.to_lowercase())
        .unwrap_or_default()
}

fn is_handled_tag(tag: &str) -> bool {
    matches!(
        tag,
        "h1" | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "p"
            | "br"
            | "blockquote"
            | "ul"
            | "ol"
            | "hr"
            | "pre"
            | "code"
            | "strong"
            | "b"
            | "em"
            | "i"
            | "table"
            | "a"
            | "div"
            | "section"
            | "article"
            | "main"
    )
}

/// Recurse into child nodes of a composite element, merging each child's
/// output. Direct text nodes emit their trimmed text plus a space.
fn walk_children(node: &NodeRef, track: bool) -> WalkOutput {
    let mut output = WalkOutput::default();

    for child in node.children() {
        if child.is_element() {
            output.merge(walk_element(&child, track));
        } else if child.is_text() {
            let text = child.text();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                output.push_text(trimmed);
                output.push_text(" ");
            }
        }
    }

    output
}

/// Emit text for a single element according to its type.
#[allow(clippy::too_many_lines)]
fn walk_element(node: &NodeRef, track: bool) -> WalkOutput {
    let mut output = WalkOutput::default();
    let tag = tag_of(node);
    let sel = Selection::from(*node);

    match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(tag.as_bytes()[1] - b'0');
            let text = sel.text().trim().to_string();
            if !text.is_empty() {
                output.push_text(&format!("\n{} {text}\n\n", "#".repeat(level)));
            }
        }
        "p" => {
            let text = sel.text().trim().to_string();
            if !text.is_empty() {
                output.push_text(&text);
                output.push_text("\n\n");
            }
        }
        "br" => output.push_text("\n"),
        "blockquote" => {
            let text = sel.text().trim().to_string();
            if !text.is_empty() {
                let quoted: Vec<String> = text
                    .split('\n')
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| format!("> {}", line.trim()))
                    .collect();
                output.push_text(&quoted.join("\n"));
                output.push_text("\n\n");
            }
        }
        "ul" => {
            for li in direct_children(node, "li") {
                let text = Selection::from(li).text().trim().to_string();
                if !text.is_empty() {
                    output.push_text(&format!("- {text}\n"));
                }
            }
            output.push_text("\n");
        }
        "ol" => {
            for (index, li) in direct_children(node, "li").into_iter().enumerate() {
                let text = Selection::from(li).text().trim().to_string();
                if !text.is_empty() {
                    output.push_text(&format!("{}. {text}\n", index + 1));
                }
            }
            output.push_text("\n");
        }
        "hr" => output.push_text("\n---\n\n"),
        "pre" => {
            let code = sel.text().to_string();
            output.push_text(&format!("\n```\n{code}\n```\n\n"));
        }
        "code" => {
            // Inline only; code under <pre> is already fenced.
            let inside_pre = node
                .parent()
                .and_then(|p| p.node_name())
                .is_some_and(|t| t.eq_ignore_ascii_case("pre"));
            if !inside_pre {
                output.push_text(&format!("`{}`", sel.text()));
            }
        }
        "strong" | "b" => {
            let text = sel.text().trim().to_string();
            if !text.is_empty() {
                output.push_text(&format!("**{text}**"));
            }
        }
        "em" | "i" => {
            let text = sel.text().trim().to_string();
            if !text.is_empty() {
                output.push_text(&format!("*{text}*"));
            }
        }
        "table" => {
            output.push_text("\n");
            for row in sel.select("tr").nodes() {
                let cells: Vec<String> = Selection::from(*row)
                    .select("td, th")
                    .nodes()
                    .iter()
                    .map(|cell| Selection::from(*cell).text().trim().to_string())
                    .collect();
                if !cells.is_empty() {
                    output.push_text(&format!("| {} |\n", cells.join(" | ")));
                }
            }
            output.push_text("\n");
        }
        "a" => {
            let text = sel.text().trim().to_string();
            let href = sel.attr("href").map(|h| h.to_string()).unwrap_or_default();
            if !text.is_empty() {
                if urls::is_absolute_http(&href) {
                    output.push_text(&format!("[{text}]({href})"));
                } else {
                    output.push_text(&text);
                }
            }
        }
        "div" | "section" | "article" | "main" => {
            let inner = walk_children(node, track);
            let inner_text = inner.text.clone();
            output.merge(inner);

            if track && !inner_text.trim().is_empty() {
                let descriptor = describe_container(&sel, &tag, &inner_text);
                if !output.contains_key(&descriptor) {
                    output.containers.push(descriptor);
                }
            }
        }
        _ => {
            // Leaf fallback: only elements without child elements, so text
            // already emitted through structural children is not repeated.
            if !has_element_children(node) {
                let text = sel.text().trim().to_string();
                if !text.is_empty() {
                    output.push_text(&text);
                    output.push_text(" ");
                }
            }
        }
    }

    output
}

fn describe_container(sel: &Selection, tag: &str, emitted: &str) -> ContainerDescriptor {
    let id = sel
        .attr("id")
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty());
    let classes = sel
        .attr("class")
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty());

    ContainerDescriptor {
        element_type: tag.to_string(),
        id,
        classes,
        content_length: emitted.chars().count(),
        content_preview: make_preview(emitted),
        chinese_percentage: None,
    }
}

fn direct_children<'a>(node: &NodeRef<'a>, tag: &str) -> Vec<NodeRef<'a>> {
    node.children()
        .into_iter()
        .filter(|child| {
            child.is_element()
                && child
                    .node_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag))
        })
        .collect()
}

fn has_element_children(node: &NodeRef) -> bool {
    node.children().into_iter().any(|child| child.is_element())
}

/// Re-extract content restricted to a caller-approved container subset.
///
/// The HTML is re-parsed, elements matching each selected descriptor's
/// structural key are located (id match first, else all class tokens, else
/// type alone), each match is walked with the standard rules, and the
/// concatenation is cleaned once. Indices outside the container list are
/// ignored.
pub fn extract_selected_containers(
    html: &str,
    containers: &[ContainerDescriptor],
    selected: &[usize],
) -> Result<String> {
    let doc = Document::from(html);
    remove_noise(&doc);

    let mut parts: Vec<String> = Vec::new();

    for &index in selected {
        let Some(descriptor) = containers.get(index) else {
            continue;
        };

        for node in doc.select(&descriptor.element_type).nodes() {
            if !matches_descriptor(&Selection::from(*node), descriptor) {
                continue;
            }
            let text = walk_from(node, false).text;
            if !text.trim().is_empty() {
                parts.push(text);
            }
        }
    }

    let combined = clean_text(&parts.join("\n\n"));
    if combined.is_empty() {
        return Err(Error::NoSelectedContent);
    }
    Ok(combined)
}

/// Match an element against a descriptor's structural key. Id is exact and
/// most specific; otherwise every class token must be present; a descriptor
/// with neither matches by element type alone.
fn matches_descriptor(sel: &Selection, descriptor: &ContainerDescriptor) -> bool {
    if let Some(ref wanted_id) = descriptor.id {
        return sel.attr("id").is_some_and(|id| &*id == wanted_id.as_str());
    }

    if let Some(ref wanted_classes) = descriptor.classes {
        let Some(class_attr) = sel.attr("class") else {
            return false;
        };
        let present: Vec<&str> = class_attr.split_whitespace().collect();
        return wanted_classes
            .split_whitespace()
            .all(|token| present.contains(&token));
    }

    true
}
