//! CJK-majority container selection.
//!
//! For pages whose main text is ideographic, the generic selector list is a
//! poor guide; instead every candidate container is scored by CJK character
//! density and the longest qualifying one becomes the walk root.

use dom_query::{Document, NodeRef, Selection};

use crate::result::{make_preview, ContainerDescriptor, ExtractedContent};
use crate::walk::{self, clean_text};

/// Candidate container types scanned for CJK density.
const CANDIDATE_SELECTOR: &str = "div, section, article, main, p";

/// Minimum stripped-text length for a candidate.
const MIN_CANDIDATE_LEN: usize = 50;

/// Density above which a candidate counts as CJK-majority.
const MIN_CJK_RATIO: f64 = 0.5;

/// Whether a character is a CJK ideograph.
///
/// Covers CJK Unified Ideographs (U+4E00-U+9FFF), Extension A
/// (U+3400-U+4DBF), and Extension B (U+20000-U+2A6DF).
#[must_use]
pub fn is_cjk_char(c: char) -> bool {
    matches!(
        u32::from(c),
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x20000..=0x2A6DF
    )
}

/// Ratio of CJK ideographs to non-whitespace characters, 0.0 to 1.0.
#[must_use]
pub fn cjk_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut cjk = 0usize;

    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if is_cjk_char(c) {
            cjk += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    cjk as f64 / total as f64
}

struct Candidate<'a> {
    node: NodeRef<'a>,
    descriptor: ContainerDescriptor,
}

/// Extract content using CJK-majority container selection.
///
/// After noise removal, every `div, section, article, main, p` under the
/// body is scored; candidates shorter than 50 characters or at most half
/// CJK are discarded, survivors are ranked by text length descending, and
/// the top one becomes the walk root. With no qualifying candidate the walk
/// falls back to the body (then the document).
///
/// When tracking is requested, the reported container list is the ranked
/// survivor list, each annotated with its density percentage.
#[must_use]
pub fn extract_chinese_content(html: &str, track_containers: bool) -> ExtractedContent {
    let doc = Document::from(html);
    walk::remove_noise(&doc);

    let body = doc.select_single("body");
    let scope = if body.exists() {
        body
    } else {
        doc.select_single("html")
    };

    let mut candidates: Vec<Candidate> = Vec::new();
    for node in scope.select(CANDIDATE_SELECTOR).nodes() {
        let sel = Selection::from(*node);
        let text = sel.text().trim().to_string();
        let length = text.chars().count();
        if length < MIN_CANDIDATE_LEN {
            continue;
        }

        let ratio = cjk_ratio(&text);
        if ratio <= MIN_CJK_RATIO {
            continue;
        }

        candidates.push(Candidate {
            node: *node,
            descriptor: describe_candidate(&sel, &text, length, ratio),
        });
    }

    // Longest candidate first; ties keep document order.
    candidates.sort_by(|a, b| b.descriptor.content_length.cmp(&a.descriptor.content_length));

    let output = if let Some(best) = candidates.first() {
        walk::walk_from(&best.node, false)
    } else if let Some(root) = scope.nodes().first() {
        walk::walk_from(root, false)
    } else {
        return ExtractedContent {
            text: String::new(),
            containers: track_containers.then(Vec::new),
        };
    };

    let containers = track_containers
        .then(|| candidates.into_iter().map(|c| c.descriptor).collect::<Vec<_>>());

    ExtractedContent {
        text: clean_text(&output.text),
        containers,
    }
}

fn describe_candidate(
    sel: &Selection,
    text: &str,
    length: usize,
    ratio: f64,
) -> ContainerDescriptor {
    let id = sel
        .attr("id")
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty());
    let classes = sel
        .attr("class")
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty());

    ContainerDescriptor {
        element_type: sel
            .nodes()
            .first()
            .and_then(|n| n.node_name())
            .map(|t| t.to_lowercase())
            .unwrap_or_default(),
        id,
        classes,
        content_length: length,
        content_preview: make_preview(text),
        chinese_percentage: Some((ratio * 1000.0).round() / 10.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chinese_text(chars: usize) -> String {
        "漢字文章內容測試".chars().cycle().take(chars).collect()
    }

    #[test]
    fn cjk_char_ranges() {
        assert!(is_cjk_char('漢'));
        assert!(is_cjk_char('㐀')); // U+3400, Extension A
        assert!(is_cjk_char('\u{20000}')); // Extension B
        assert!(!is_cjk_char('a'));
        assert!(!is_cjk_char('。')); // punctuation is not an ideograph
    }

    #[test]
    fn ratio_ignores_whitespace() {
        assert!((cjk_ratio("漢字 漢字") - 1.0).abs() < f64::EPSILON);
        assert!((cjk_ratio("漢a") - 0.5).abs() < f64::EPSILON);
        assert!((cjk_ratio("") - 0.0).abs() < f64::EPSILON);
        assert!((cjk_ratio("   ") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn densest_long_container_wins() {
        // Only #story qualifies: dense and long. The English div is long
        // but not CJK; the short div is dense but under 50 chars.
        let story = chinese_text(500);
        let html = format!(
            "<html><body>\
             <div id=\"junk\">{}</div>\
             <div id=\"tiny\">漢字漢字</div>\
             <div id=\"story\"><p>{story}</p></div>\
             </body></html>",
            "english filler text that goes on and on without ideographs ".repeat(4)
        );
        let content = extract_chinese_content(&html, true);
        assert!(content.text.contains(&chinese_text(8)));

        let containers = content.containers.unwrap_or_default();
        assert!(!containers.is_empty());
        // The ranked list leads with the chosen container.
        assert!(containers[0].content_length >= 500);
        assert!(containers[0].chinese_percentage.is_some_and(|p| p > 50.0));
    }

    #[test]
    fn survivors_are_ranked_by_length_descending() {
        let long = chinese_text(400);
        let short = chinese_text(80);
        let html = format!(
            "<html><body>\
             <div id=\"short\"><p>{short}</p></div>\
             <div id=\"long\"><p>{long}</p></div>\
             </body></html>"
        );
        let content = extract_chinese_content(&html, true);
        let containers = content.containers.unwrap_or_default();
        assert!(containers.len() >= 2);
        assert!(containers[0].content_length >= containers[1].content_length);
    }

    #[test]
    fn density_annotation_is_percentage_with_one_decimal() {
        // 2 CJK out of 3 non-whitespace chars repeated: 66.7%.
        let text = "漢字a".repeat(30);
        let html = format!("<html><body><div>{text}</div></body></html>");
        let content = extract_chinese_content(&html, true);
        let containers = content.containers.unwrap_or_default();
        assert!(!containers.is_empty());
        assert_eq!(containers[0].chinese_percentage, Some(66.7));
    }

    #[test]
    fn no_qualifying_container_falls_back_to_body() {
        let html = "<html><body><p>Plain English paragraph only.</p></body></html>";
        let content = extract_chinese_content(html, true);
        assert!(content.text.contains("Plain English paragraph only."));
        assert_eq!(content.containers, Some(vec![]));
    }

    #[test]
    fn paragraph_candidates_qualify() {
        let text = chinese_text(120);
        let html = format!("<html><body><p>{text}</p></body></html>");
        let content = extract_chinese_content(&html, true);
        let containers = content.containers.unwrap_or_default();
        // Both the p and no parent div; exactly the paragraph qualifies.
        assert!(containers.iter().any(|c| c.element_type == "p"));
    }
}
