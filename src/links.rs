//! Chapter-link discovery for index-style pages.
//!
//! A staged pipeline over the page's candidate links: URL clustering with a
//! sequential-number confidence check, then text heuristics, then list
//! structure, then a lenient last resort. Each stage either accepts a result
//! and terminates the pipeline or passes to the next.

use dom_query::{Document, Selection};
use log::debug;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;
use url::Url;

use crate::error::Result;
use crate::result::ChapterLink;
use crate::urls;
use crate::walk;

/// Scope selectors: the content priority list plus index-specific regions.
const LINK_SCOPE_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".content",
    ".post-content",
    ".article-content",
    "#content",
    "#main",
    ".entry-content",
    ".chapter-list",
    ".toc",
    ".table-of-contents",
];

/// Navigational link text that disqualifies a candidate (case-insensitive
/// substring match).
const NAV_BLACKLIST: &[&str] = &[
    "home", "about", "contact", "login", "register", "search", "privacy", "terms", "policy",
    "rss", "subscribe", "follow", "twitter", "facebook", "share", "comment", "next", "previous",
    "prev", "download", "print", "bookmark", "archive", "latest", "recent", "popular", "tag",
    "category",
];

/// Similarity threshold for URL clustering.
const CLUSTER_THRESHOLD: f64 = 0.9;

/// Confidence threshold for accepting a sequential URL pattern.
const PATTERN_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Minimum results from the text-heuristic stage before falling back.
const MIN_TEXT_STAGE_RESULTS: usize = 3;

#[allow(clippy::expect_used)]
static CHAPTER_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bchapter\b").expect("valid regex"));

#[allow(clippy::expect_used)]
static CH_ABBREV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bch\.?\s*\d+").expect("valid regex"));

#[allow(clippy::expect_used)]
static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.):]").expect("valid regex"));

#[allow(clippy::expect_used)]
static PURE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

#[allow(clippy::expect_used)]
static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// A numeric progression detected across a cluster's URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialPattern {
    /// Smallest extracted number.
    pub min: i64,
    /// Largest extracted number.
    pub max: i64,
    /// Count of distinct extracted numbers.
    pub unique_count: usize,
    /// `unique_count / (max - min + 1)`.
    pub coverage: f64,
    /// `0.5 + 0.5 * sequential_score`, where the score is 1.0 when
    /// coverage is at least 0.5 and `coverage * 2` below that.
    pub confidence: f64,
    /// Numbers missing from the range: `(max - min + 1) - unique_count`.
    pub gap_count: i64,
}

/// A filtered link candidate awaiting a pipeline decision.
#[derive(Debug, Clone)]
struct Candidate {
    name: String,
    url: Url,
}

impl Candidate {
    fn last_number(&self) -> Option<i64> {
        INTEGER_RE
            .find_iter(self.url.as_str())
            .last()
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Discover an ordered chapter-link list on an index-style page.
///
/// `base_url` anchors relative hrefs and defines the allowed host. The
/// returned list may be empty when nothing chapter-like is found; `order`
/// is the 0-based position in the result of whichever stage accepted.
pub fn discover_chapter_links(html: &str, base_url: &str) -> Result<Vec<ChapterLink>> {
    let base = Url::parse(base_url)?;
    let doc = Document::from(html);
    walk::remove_noise(&doc);

    let scope = select_link_scope(&doc);
    let candidates = collect_candidates(&scope, &base);
    debug!("link discovery: {} candidates after filtering", candidates.len());

    if candidates.len() >= 2 {
        if let Some(accepted) = url_pattern_stage(&candidates) {
            debug!("link discovery: URL pattern accepted {} links", accepted.len());
            return Ok(finalize(accepted));
        }
    } else {
        debug!("link discovery: too few candidates for clustering");
    }

    let mut links = text_heuristic_stage(&candidates);
    debug!("link discovery: text heuristics matched {} links", links.len());

    if links.len() < MIN_TEXT_STAGE_RESULTS {
        links = list_structure_stage(&scope, &base);
        debug!("link discovery: list fallback found {} links", links.len());
    }

    if links.is_empty() && !candidates.is_empty() {
        links = last_resort_stage(&candidates);
        debug!("link discovery: last resort kept {} links", links.len());
    }

    Ok(finalize(links))
}

/// First matching scope selector, else body, else the document element.
fn select_link_scope(doc: &Document) -> Selection<'_> {
    for selector in LINK_SCOPE_SELECTORS {
        let sel = doc.select_single(selector);
        if sel.exists() {
            return sel;
        }
    }

    let body = doc.select_single("body");
    if body.exists() {
        return body;
    }
    doc.select_single("html")
}

/// Stage 0: collect and filter candidate links.
///
/// Keeps absolute same-host links with non-empty, non-navigational text;
/// duplicates by absolute URL keep the first occurrence in document order.
fn collect_candidates(scope: &Selection, base: &Url) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for node in scope.select("a[href]").nodes() {
        let link = Selection::from(*node);
        let href = link.attr("href").map(|h| h.to_string()).unwrap_or_default();

        let Some(resolved) = urls::resolve_href(base, &href) else {
            continue;
        };
        if !urls::same_host(&resolved, base) {
            continue;
        }
        if !seen.insert(resolved.to_string()) {
            continue;
        }

        let name = link.text().trim().to_string();
        if name.is_empty() || is_navigational(&name) {
            continue;
        }

        candidates.push(Candidate {
            name,
            url: resolved,
        });
    }

    candidates
}

fn is_navigational(text: &str) -> bool {
    let lower = text.to_lowercase();
    NAV_BLACKLIST.iter().any(|term| lower.contains(term))
}

/// Stages 1 and 2: cluster candidate URLs and accept the largest cluster
/// when it shows a confident sequential number pattern, ordered ascending
/// by that number.
fn url_pattern_stage(candidates: &[Candidate]) -> Option<Vec<Candidate>> {
    let clusters = cluster_by_similarity(candidates);
    debug!("link discovery: {} URL clusters", clusters.len());

    let largest = clusters.first()?;
    let pattern = detect_sequential_pattern_in(largest)?;
    debug!(
        "link discovery: pattern range {}-{}, coverage {:.2}, confidence {:.2}",
        pattern.min, pattern.max, pattern.coverage, pattern.confidence
    );

    if pattern.confidence <= PATTERN_CONFIDENCE_THRESHOLD {
        return None;
    }

    // Numbered members ascending; members without a number keep their
    // first-seen order at the tail.
    let mut numbered: Vec<(i64, Candidate)> = Vec::new();
    let mut unnumbered: Vec<Candidate> = Vec::new();
    for candidate in largest {
        match candidate.last_number() {
            Some(n) => numbered.push((n, candidate.clone())),
            None => unnumbered.push(candidate.clone()),
        }
    }
    numbered.sort_by_key(|(n, _)| *n);

    let mut ordered: Vec<Candidate> = numbered.into_iter().map(|(_, c)| c).collect();
    ordered.extend(unnumbered);
    Some(ordered)
}

/// Greedy single-pass clustering: each unclustered candidate seeds a
/// cluster and absorbs every later unclustered candidate within the
/// similarity threshold. Only clusters of two or more survive, largest
/// first.
fn cluster_by_similarity(candidates: &[Candidate]) -> Vec<Vec<Candidate>> {
    let mut used = vec![false; candidates.len()];
    let mut clusters: Vec<Vec<Candidate>> = Vec::new();

    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut cluster = vec![candidates[i].clone()];

        for j in (i + 1)..candidates.len() {
            if used[j] {
                continue;
            }
            if url_similarity(&candidates[i].url, &candidates[j].url) >= CLUSTER_THRESHOLD {
                used[j] = true;
                cluster.push(candidates[j].clone());
            }
        }

        if cluster.len() >= 2 {
            clusters.push(cluster);
        }
    }

    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
    clusters
}

/// Segment-level URL similarity: 0 when hosts or segment counts differ,
/// else the average of per-segment scores (1.0 equal, 0.9 equal after
/// stripping digits with a non-empty remainder, 0.0 otherwise).
fn url_similarity(a: &Url, b: &Url) -> f64 {
    if a.host_str() != b.host_str() {
        return 0.0;
    }

    let segments_a = urls::path_segments(a);
    let segments_b = urls::path_segments(b);
    if segments_a.len() != segments_b.len() || segments_a.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    for (seg_a, seg_b) in segments_a.iter().zip(&segments_b) {
        if seg_a == seg_b {
            score += 1.0;
        } else {
            let stripped_a = urls::strip_digits(seg_a);
            let stripped_b = urls::strip_digits(seg_b);
            if !stripped_a.is_empty() && stripped_a == stripped_b {
                score += 0.9;
            }
        }
    }

    score / segments_a.len() as f64
}

/// Derive the sequential pattern from a cluster, using the last integer
/// substring of each URL. Requires at least two numbered members.
fn detect_sequential_pattern_in(cluster: &[Candidate]) -> Option<SequentialPattern> {
    let numbers: Vec<i64> = cluster.iter().filter_map(Candidate::last_number).collect();
    if numbers.len() < 2 {
        return None;
    }

    let unique: BTreeSet<i64> = numbers.iter().copied().collect();
    let min = *unique.first()?;
    let max = *unique.last()?;
    let expected = max - min + 1;
    let unique_count = unique.len();
    let coverage = if expected > 0 {
        unique_count as f64 / expected as f64
    } else {
        0.0
    };

    let sequential_score = if coverage >= 0.5 { 1.0 } else { coverage * 2.0 };
    let confidence = 0.5 + 0.5 * sequential_score;

    Some(SequentialPattern {
        min,
        max,
        unique_count,
        coverage,
        confidence,
        gap_count: expected - unique_count as i64,
    })
}

/// Stage 3: keep candidates whose text looks chapter-like.
fn text_heuristic_stage(candidates: &[Candidate]) -> Vec<Candidate> {
    candidates
        .iter()
        .filter(|c| is_chapter_like(&c.name))
        .cloned()
        .collect()
}

fn is_chapter_like(text: &str) -> bool {
    CHAPTER_WORD_RE.is_match(text)
        || CH_ABBREV_RE.is_match(text)
        || LEADING_NUMBER_RE.is_match(text)
        || PURE_NUMBER_RE.is_match(text)
}

/// Stage 4: scan list structures. Ordered lists first, then unordered
/// lists that do not look like navigation menus. Stage-0 URL rules apply;
/// link text must be non-empty and under 200 characters.
fn list_structure_stage(scope: &Selection, base: &Url) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut links: Vec<Candidate> = Vec::new();

    collect_list_links(&scope.select("ol > li > a"), base, &mut seen, &mut links);

    if links.len() < MIN_TEXT_STAGE_RESULTS {
        for ul in scope.select("ul").nodes() {
            let list = Selection::from(*ul);
            if is_nav_list(&list) {
                continue;
            }
            collect_list_links(&list.select("li > a"), base, &mut seen, &mut links);
        }
    }

    links
}

fn is_nav_list(list: &Selection) -> bool {
    list.attr("class").is_some_and(|class| {
        class
            .split_whitespace()
            .any(|token| {
                let lower = token.to_lowercase();
                lower.contains("nav") || lower.contains("menu")
            })
    })
}

fn collect_list_links(
    anchors: &Selection,
    base: &Url,
    seen: &mut HashSet<String>,
    links: &mut Vec<Candidate>,
) {
    for node in anchors.nodes() {
        let link = Selection::from(*node);
        let href = link.attr("href").map(|h| h.to_string()).unwrap_or_default();

        let Some(resolved) = urls::resolve_href(base, &href) else {
            continue;
        };
        if !urls::same_host(&resolved, base) {
            continue;
        }
        if !seen.insert(resolved.to_string()) {
            continue;
        }

        let name = link.text().trim().to_string();
        if name.is_empty() || name.chars().count() >= 200 {
            continue;
        }

        links.push(Candidate {
            name,
            url: resolved,
        });
    }
}

/// Stage 5: lenient filter over the stage-0 candidates, keeping any with
/// text length strictly between 1 and 150.
fn last_resort_stage(candidates: &[Candidate]) -> Vec<Candidate> {
    candidates
        .iter()
        .filter(|c| {
            let len = c.name.chars().count();
            len > 1 && len < 150
        })
        .cloned()
        .collect()
}

fn finalize(candidates: Vec<Candidate>) -> Vec<ChapterLink> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(order, c)| ChapterLink {
            name: c.name,
            url: c.url.to_string(),
            order,
        })
        .collect()
}
