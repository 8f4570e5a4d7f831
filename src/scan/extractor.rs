// src/scan/extractor.rs
use crate::scan::{LinkCandidate, PageSnapshot};
use crate::utils::collapse_whitespace;
use scraper::{Html, Selector};
use url::Url;

/// Hrefs at most this many characters long are never postings ("#", "/", "/en")
const SHORT_HREF_MAX_CHARS: usize = 10;

/// Anchor text longer than this keeps a link even without a keyword in the href
const DESCRIPTIVE_TEXT_MIN_CHARS: usize = 10;

/// Pull every anchor out of a rendered page and keep the ones that plausibly
/// point at a job posting. Relative hrefs are resolved against the page URL.
/// Duplicates are preserved; deduplication happens against the store.
pub fn extract_candidates(snapshot: &PageSnapshot) -> Vec<LinkCandidate> {
    let document = Html::parse_document(&snapshot.html);
    let anchors = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let base = Url::parse(&snapshot.url).ok();

    let mut candidates = Vec::new();
    for element in document.select(&anchors) {
        let raw_href = match element.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };
        if raw_href.is_empty() {
            continue;
        }
        let href = match resolve_href(base.as_ref(), raw_href) {
            Some(href) => href,
            None => continue,
        };
        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if is_job_candidate(&href, &text) {
            candidates.push(LinkCandidate { text, href });
        }
    }
    candidates
}

/// The permissive keep/discard heuristic, applied to the resolved href and
/// the collapsed anchor text. Keyword matching is deliberately case-sensitive
/// and lengths count characters, not bytes.
pub fn is_job_candidate(href: &str, text: &str) -> bool {
    if href.chars().count() <= SHORT_HREF_MAX_CHARS {
        return false;
    }
    href.contains("job")
        || href.contains("career")
        || text.chars().count() > DESCRIPTIVE_TEXT_MIN_CHARS
}

fn resolve_href(base: Option<&Url>, raw: &str) -> Option<String> {
    match base {
        Some(base) => base.join(raw).ok().map(|url| url.to_string()),
        None => Url::parse(raw).ok().map(|url| url.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(html: &str) -> PageSnapshot {
        PageSnapshot {
            url: "https://acme.example/careers".to_string(),
            html: html.to_string(),
        }
    }

    #[test]
    fn short_hrefs_are_discarded_even_with_long_text() {
        // Exactly 10 characters
        assert!(!is_job_candidate("https://x/", "A very promising senior role"));
        assert!(!is_job_candidate("#", "A very promising senior role"));
        // 11 characters crosses the threshold
        assert!(is_job_candidate("https://x/a", "A very promising senior role"));
    }

    #[test]
    fn keyword_in_href_keeps_links_with_short_text() {
        assert!(is_job_candidate("https://acme.example/job/2", "a"));
        assert!(is_job_candidate("https://acme.example/careers/2", ""));
    }

    #[test]
    fn keyword_matching_is_case_sensitive() {
        assert!(!is_job_candidate("https://acme.example/JOBS/2", "a"));
        assert!(!is_job_candidate("https://acme.example/Careers", "a"));
        // Long anchor text still rescues an uppercase path
        assert!(is_job_candidate(
            "https://acme.example/JOBS/2",
            "Senior Platform Engineer"
        ));
    }

    #[test]
    fn descriptive_text_keeps_links_without_keywords() {
        let href = "https://acme.example/p/1";
        assert!(is_job_candidate(href, "Senior Rust Engineer"));
        // Exactly 10 characters is not enough
        assert!(!is_job_candidate(href, "Contact us"));
        assert!(is_job_candidate(href, "Contact us!"));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let href = "https://acme.example/p/1";
        // 11 characters, 33 bytes
        assert!(is_job_candidate(href, "シニアエンジニア募集中"));
        // 5 characters
        assert!(!is_job_candidate(href, "データ分析"));
    }

    #[test]
    fn extracts_and_resolves_candidates_from_a_page() {
        let html = r#"
            <html><body>
              <nav><a href="/">Home</a> <a href="/about">About</a></nav>
              <a href="/job/1">Senior Engineer role</a>
              <a href="job/2">a</a>
              <a href="https://other.example/careers/apply">Apply</a>
            </body></html>
        "#;

        let candidates = extract_candidates(&snapshot(html));

        assert_eq!(
            candidates,
            vec![
                LinkCandidate {
                    text: "Senior Engineer role".to_string(),
                    href: "https://acme.example/job/1".to_string(),
                },
                LinkCandidate {
                    text: "a".to_string(),
                    href: "https://acme.example/job/2".to_string(),
                },
                LinkCandidate {
                    text: "Apply".to_string(),
                    href: "https://other.example/careers/apply".to_string(),
                },
            ]
        );
    }

    #[test]
    fn nested_markup_is_flattened_and_whitespace_collapsed() {
        let html = r#"<a href="/positions/backend-123"><span>Backend</span>
            <b>Engineer</b>   (Remote)</a>"#;

        let candidates = extract_candidates(&snapshot(html));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Backend Engineer (Remote)");
        assert_eq!(
            candidates[0].href,
            "https://acme.example/positions/backend-123"
        );
    }

    #[test]
    fn duplicate_anchors_are_all_reported() {
        let html = r#"
            <a href="/job/1">Senior Engineer role</a>
            <a href="/job/1">Senior Engineer role</a>
        "#;

        let candidates = extract_candidates(&snapshot(html));

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], candidates[1]);
    }

    #[test]
    fn anchors_with_empty_hrefs_are_ignored() {
        let html = r#"<a href="">A perfectly descriptive anchor text</a>"#;

        assert!(extract_candidates(&snapshot(html)).is_empty());
    }

    #[test]
    fn unparseable_page_url_keeps_absolute_hrefs_only() {
        let snapshot = PageSnapshot {
            url: "not a url".to_string(),
            html: r#"
                <a href="/job/1">Senior Engineer role</a>
                <a href="https://acme.example/job/2">Senior Engineer role</a>
            "#
            .to_string(),
        };

        let candidates = extract_candidates(&snapshot);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].href, "https://acme.example/job/2");
    }
}
