//! Chapter-link discovery tests over realistic index pages.

use readscrape::discover_chapter_links;

/// A book index with site chrome, sequential chapter URLs, and a handful
/// of same-host links that should never be mistaken for chapters.
fn book_index() -> String {
    let chapters: String = (1..=12)
        .map(|n| format!("<li><a href=\"/novel/the-road/chapter-{n}.html\">第{n}章</a></li>"))
        .collect();
    format!(
        r#"<html><head><title>The Road - Index</title></head>
        <body>
        <nav><a href="/">Home</a> <a href="/ranking">Ranking</a></nav>
        <div class="content">
            <h1>The Road</h1>
            <p>All chapters, updated daily.</p>
            <a href="/author/someone">The Author Page</a>
            <ul class="chapter-listing">{chapters}</ul>
        </div>
        <footer><a href="/terms">Terms of Service</a></footer>
        </body></html>"#
    )
}

#[test]
fn sequential_chapter_urls_are_discovered_in_order() {
    let links = discover_chapter_links(&book_index(), "https://example.com/novel/the-road/")
        .unwrap_or_default();

    assert_eq!(links.len(), 12);
    for (i, link) in links.iter().enumerate() {
        assert_eq!(link.order, i);
        assert_eq!(
            link.url,
            format!(
                "https://example.com/novel/the-road/chapter-{}.html",
                i + 1
            )
        );
    }
    assert_eq!(links[0].name, "第1章");
}

#[test]
fn document_order_does_not_matter_for_numbered_urls() {
    // A "latest chapters first" index still comes back ascending.
    let anchors: String = (1..=8)
        .rev()
        .map(|n| format!("<a href=\"/b/ch{n}\">Part {n}</a>"))
        .collect();
    let html = format!("<html><body><div id=\"content\">{anchors}</div></body></html>");

    let links = discover_chapter_links(&html, "https://example.com/b/").unwrap_or_default();
    assert_eq!(links.len(), 8);
    assert_eq!(links[0].url, "https://example.com/b/ch1");
    assert_eq!(links[7].url, "https://example.com/b/ch8");
}

#[test]
fn gaps_in_the_sequence_are_tolerated() {
    // Chapters 4 and 7 are missing; coverage is still above one half, so
    // the pattern is accepted.
    let anchors: String = [1, 2, 3, 5, 6, 8]
        .iter()
        .map(|n| format!("<a href=\"/story/part-{n}\">Part {n}</a>"))
        .collect();
    let html = format!("<html><body><main>{anchors}</main></body></html>");

    let links = discover_chapter_links(&html, "https://example.com/story/").unwrap_or_default();
    assert_eq!(links.len(), 6);
    assert_eq!(links[0].url, "https://example.com/story/part-1");
    assert_eq!(links[5].url, "https://example.com/story/part-8");
}

#[test]
fn sparse_numbers_are_not_accepted_as_a_pattern() {
    // Two numbers spanning 1..100: coverage far below one half, so the
    // URL-pattern stage rejects and text heuristics take over.
    let html = r#"<html><body><div id="content">
        <a href="/p/ch-1">Chapter 1</a>
        <a href="/p/ch-100">Chapter 100</a>
    </div></body></html>"#;

    let links = discover_chapter_links(html, "https://example.com/").unwrap_or_default();
    // Still found, via the chapter-like text, just not via URL clustering.
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].name, "Chapter 1");
}

#[test]
fn chapter_text_without_url_structure_is_found() {
    let html = r#"<html><body><div class="content">
        <a href="/read/alpha">Chapter 1: The Start</a>
        <a href="/view?id=9f2">Chapter 2: The Middle</a>
        <a href="/misc/end-page">Chapter 3: The End</a>
        <a href="/author/someone">The Author Page</a>
    </div></body></html>"#;

    let links = discover_chapter_links(html, "https://example.com/").unwrap_or_default();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].name, "Chapter 1: The Start");
    assert_eq!(links[2].name, "Chapter 3: The End");
}

#[test]
fn navigational_text_is_blacklisted() {
    let html = r#"<html><body><div id="content">
        <a href="/ch/1">Chapter 1</a>
        <a href="/ch/2">Chapter 2</a>
        <a href="/about-us">About Us</a>
        <a href="/next-book">Next Book</a>
        <a href="/popular-now">Popular Now</a>
    </div></body></html>"#;

    let links = discover_chapter_links(html, "https://example.com/").unwrap_or_default();
    let names: Vec<&str> = links.iter().map(|l| l.name.as_str()).collect();
    assert!(names.contains(&"Chapter 1"));
    assert!(names.contains(&"Chapter 2"));
    assert!(!names.contains(&"About Us"));
    assert!(!names.contains(&"Next Book"));
    assert!(!names.contains(&"Popular Now"));
}

#[test]
fn cross_host_links_are_never_chapters() {
    let html = r#"<html><body><div id="content">
        <a href="https://mirror.example.net/ch-1">Chapter 1</a>
        <a href="https://mirror.example.net/ch-2">Chapter 2</a>
        <a href="/local/ch-3">Chapter 3</a>
    </div></body></html>"#;

    let links = discover_chapter_links(html, "https://example.com/").unwrap_or_default();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url, "https://example.com/local/ch-3");
}

#[test]
fn ordered_list_structure_is_a_fallback() {
    // Names carry no chapter vocabulary and URLs share no numeric shape.
    let html = r#"<html><body><div class="content">
        <ol>
            <li><a href="/r/beginnings">Beginnings</a></li>
            <li><a href="/r/the-storm-breaks">The Storm Breaks</a></li>
            <li><a href="/r/aftermath">Aftermath</a></li>
        </ol>
    </div></body></html>"#;

    let links = discover_chapter_links(html, "https://example.com/").unwrap_or_default();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].name, "Beginnings");
    assert_eq!(links[1].name, "The Storm Breaks");
    assert_eq!(links[2].name, "Aftermath");
}

#[test]
fn index_without_links_yields_empty_list() {
    let html = "<html><body><article><p>Just prose, no index.</p></article></body></html>";
    let links = discover_chapter_links(html, "https://example.com/").unwrap_or_default();
    assert!(links.is_empty());
}

#[test]
fn scope_prefers_content_region_over_page_chrome() {
    // Identical-shaped URLs in the sidebar must not join the cluster,
    // because scoping cuts them out before stage 1 sees anything.
    let chapters: String = (1..=5)
        .map(|n| format!("<a href=\"/w/ep-{n}\">Episode {n}</a>"))
        .collect();
    let html = format!(
        r#"<html><body>
        <div class="sidebar"><a href="/w/ep-99">Episode 99</a></div>
        <article>{chapters}</article>
        </body></html>"#
    );

    let links = discover_chapter_links(&html, "https://example.com/w/").unwrap_or_default();
    assert_eq!(links.len(), 5);
    assert!(links.iter().all(|l| !l.url.ends_with("ep-99")));
}
