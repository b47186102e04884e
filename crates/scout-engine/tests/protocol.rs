mod common;

use common::{open_budgets, profile_page, FailAt, MockApi, MockPages, PageStats};
use scout_core::{Platform, Post, ScrapeErrorKind, ScrapeMethod, ScrapeOutcome};
use scout_engine::{ProfileScraper, ScrapeProtocol};
use scout_niche::KeywordClassifier;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const PROFILE_URL: &str = "https://www.instagram.com/fit_jane/";

fn protocol(pages: MockPages) -> ScrapeProtocol {
    ScrapeProtocol::new(
        Arc::new(pages),
        open_budgets(),
        Arc::new(KeywordClassifier::default()),
    )
}

fn working_pages() -> MockPages {
    MockPages::new().with_profile(|_| {
        Some(profile_page(
            "Jane",
            "1K",
            "Coach | gym and workout plans | jane@fit.io",
        ))
    })
}

fn api_post(n: u64, likes: u64) -> Post {
    Post {
        url: format!("https://www.instagram.com/p/{n}/"),
        timestamp: None,
        likes: Some(likes),
        comments: Some(0),
        caption: Some("new laptop setup for coding".to_string()),
        engagement_rate: None,
    }
}

#[tokio::test]
async fn test_invalid_url_takes_no_network_action() {
    let pages = working_pages();
    let stats = Arc::clone(&pages.stats);
    let api = Arc::new(MockApi::new(Platform::Instagram, FailAt::Nowhere));
    let protocol = protocol(pages).with_api(api.clone());

    for url in ["not a url", "https://www.linkedin.com/in/jane/", "https://www.instagram.com/p/abc/"] {
        let outcome = protocol.scrape(Platform::Instagram, url, true).await;
        assert_eq!(outcome.error_kind(), Some(ScrapeErrorKind::InvalidInput), "{url}");
        assert_eq!(outcome.method_used(), None);
    }
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    assert_eq!(PageStats::get(&stats.opens), 0);
}

#[tokio::test]
async fn test_without_credentials_goes_straight_to_fallback() {
    let pages = working_pages();
    let stats = Arc::clone(&pages.stats);
    let protocol = protocol(pages);
    assert!(!protocol.has_api(Platform::Instagram));

    let outcome = protocol.scrape(Platform::Instagram, PROFILE_URL, true).await;

    assert_eq!(outcome.method_used(), Some(ScrapeMethod::Fallback));
    let profile = outcome.profile().expect("profile");
    assert_eq!(profile.handle.as_str(), "fit_jane");
    assert_eq!(profile.display_name.as_deref(), Some("Jane"));
    assert_eq!(profile.follower_count, Some(1_000));
    assert_eq!(profile.post_count, Some(1_204));
    assert_eq!(profile.public_contact_email.as_deref(), Some("jane@fit.io"));
    assert_eq!(profile.niche.as_deref(), Some("Fitness"));
    assert_eq!(profile.raw, None);
    assert_eq!(PageStats::get(&stats.closes), 1);
}

#[tokio::test]
async fn test_api_success_uses_api() {
    let api = Arc::new(
        MockApi::new(Platform::Instagram, FailAt::Nowhere)
            .with_posts(vec![api_post(1, 10), api_post(2, 40), api_post(3, 20), api_post(4, 30)]),
    );
    let pages = working_pages();
    let stats = Arc::clone(&pages.stats);
    let protocol = protocol(pages).with_api(api.clone()).with_store_raw(true);

    let outcome = protocol.scrape(Platform::Instagram, PROFILE_URL, true).await;

    assert_eq!(outcome.method_used(), Some(ScrapeMethod::Api));
    assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    assert_eq!(PageStats::get(&stats.opens), 0);

    let profile = outcome.profile().expect("profile");
    assert_eq!(profile.niche.as_deref(), Some("Tech"));
    assert_eq!(profile.public_contact_email.as_deref(), Some("biz@api.dev"));
    assert_eq!(profile.raw, Some(serde_json::json!({ "id": "42" })));
    // (10 + 40 + 20 + 30) / (1000 * 4)
    assert_eq!(profile.engagement_rate, Some(0.025));

    let top: Vec<&str> = profile.top_posts.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        top,
        vec![
            "https://www.instagram.com/p/2/",
            "https://www.instagram.com/p/4/",
            "https://www.instagram.com/p/3/",
        ]
    );
    assert_eq!(profile.recent_posts.len(), 4);
    assert_eq!(profile.top_posts[0].engagement_rate, Some(0.04));
}

#[tokio::test]
async fn test_prefer_api_false_skips_api() {
    let api = Arc::new(MockApi::new(Platform::Instagram, FailAt::Nowhere));
    let protocol = protocol(working_pages()).with_api(api.clone());

    let outcome = protocol.scrape(Platform::Instagram, PROFILE_URL, false).await;

    assert_eq!(outcome.method_used(), Some(ScrapeMethod::Fallback));
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_api_failure_falls_back_once() {
    for fail_at in [FailAt::Identity, FailAt::Profile, FailAt::Content] {
        let api = Arc::new(MockApi::new(Platform::Instagram, fail_at));
        let pages = working_pages();
        let stats = Arc::clone(&pages.stats);
        let protocol = protocol(pages).with_api(api);

        let outcome = protocol.scrape(Platform::Instagram, PROFILE_URL, true).await;

        assert!(outcome.is_success(), "{fail_at:?}");
        assert_eq!(outcome.method_used(), Some(ScrapeMethod::Fallback));
        assert_eq!(PageStats::get(&stats.opens), 1);
    }
}

#[tokio::test]
async fn test_extraction_failure_is_terminal() {
    let api = Arc::new(MockApi::new(Platform::Instagram, FailAt::Profile));
    let pages = MockPages::new();
    let stats = Arc::clone(&pages.stats);
    let protocol = protocol(pages).with_api(api);

    let outcome = protocol.scrape(Platform::Instagram, PROFILE_URL, true).await;

    match outcome {
        ScrapeOutcome::Failure {
            kind,
            method_used,
            message,
        } => {
            assert_eq!(kind, ScrapeErrorKind::ExtractionError);
            assert_eq!(method_used, Some(ScrapeMethod::Fallback));
            assert!(message.contains("selectors matched nothing"));
        }
        ScrapeOutcome::Success { .. } => panic!("expected failure"),
    }
    assert_eq!(PageStats::get(&stats.opens), 1);
    assert_eq!(PageStats::get(&stats.closes), 1);
}

#[tokio::test]
async fn test_engagement_is_clamped() {
    let pages = MockPages::new().with_profile(|_| Some(profile_page("Tiny", "10", "")));
    let protocol = protocol(pages);

    let outcome = protocol.scrape(Platform::Instagram, PROFILE_URL, true).await;
    let profile = outcome.profile().expect("profile");

    assert_eq!(profile.engagement_rate, Some(1.0));
    assert!(profile
        .top_posts
        .iter()
        .all(|p| p.engagement_rate == Some(1.0)));
    assert_eq!(profile.recent_posts[0].url, "https://www.instagram.com/p/two/");
    assert!(profile.validate().is_ok());
}

#[tokio::test]
async fn test_page_raw_kept_when_configured() {
    let protocol = protocol(working_pages()).with_store_raw(true);

    let outcome = protocol.scrape(Platform::Instagram, PROFILE_URL, false).await;
    let raw = outcome.profile().and_then(|p| p.raw.clone()).expect("raw");

    assert_eq!(raw["display_name"], "Jane");
}
