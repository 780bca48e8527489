//! End-to-end ingestion runs against mocked archive and browser.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use guildrank_archive::testing::{MockBrowser, MockCaptureSource, MockRender};
use guildrank_archive::{
    EraResolver, FallbackResolver, FetchCache, FetchContext, RateLimiter, SnapshotResolver,
};
use guildrank_common::Dataset;
use guildrank_ingest::{run, OutputWriter, RunSettings, RunSummary};
use wayback_client::{capture_url, index_url};

const ROOT: &str = "https://web.archive.org";
const SITE: &str = "www.dmsguild.com";
const SLIDER_FEED: &str = "https://www.dmsguild.com/api/products/list/hottest_filtered/slider_view?filters=45469&include_community_content=1&strip_src=hottest_in_dmg";
const HOMEPAGE: &str = "http://www.dmsguild.com/";

fn index_line(timestamp: u64, status: &str) -> String {
    format!("com,dmsguild)/ {timestamp} http://www.dmsguild.com/ text/html {status} D{timestamp} 100\n")
}

fn listing(entries: &[(&str, &str)]) -> String {
    let results: Vec<String> = entries
        .iter()
        .map(|(id, name)| format!(r#"{{"products_id":"{id}","products_name":"{name}"}}"#))
        .collect();
    format!(r#"{{"results":[{}]}}"#, results.join(","))
}

fn api_capture(timestamp: u64) -> String {
    capture_url(ROOT, timestamp, SLIDER_FEED, true)
}

fn context(cache: &Path, source: MockCaptureSource, browser: &MockBrowser) -> FetchContext {
    FetchContext::new(
        FetchCache::new(cache),
        RateLimiter::new(Duration::ZERO),
        Arc::new(source),
        Arc::new(browser.clone()),
    )
}

fn settings(output: &Path) -> RunSettings {
    RunSettings {
        archive_root: ROOT.to_string(),
        site_url: SITE.to_string(),
        dataset_name: "DMsGuild".to_string(),
        output: OutputWriter::new(output),
    }
}

async fn ingest(
    dir: &Path,
    source: MockCaptureSource,
    browser: &MockBrowser,
    resolver: &mut dyn SnapshotResolver,
) -> anyhow::Result<(Dataset, RunSummary)> {
    let mut ctx = context(&dir.join("cache"), source, browser);
    run(&mut ctx, resolver, settings(&dir.join("dmsguild.json"))).await
}

fn assert_dataset_invariants(dataset: &Dataset) {
    for pair in dataset.rankings.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp, "rankings out of order");
        assert_ne!(pair[0].product_ids, pair[1].product_ids, "adjacent duplicate ranking");
    }
    for record in &dataset.rankings {
        for id in &record.product_ids {
            assert!(dataset.titles.contains_key(id), "missing title for {id}");
        }
    }
}

#[tokio::test]
async fn pre_2016_capture_yields_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockCaptureSource::new().on(
        &index_url(ROOT, SITE),
        "- 20150101000000 http://www.dmsguild.com 200 ABCDE -",
    );
    let calls = source.calls();
    let browser = MockBrowser::new();

    let (dataset, summary) = ingest(dir.path(), source, &browser, &mut EraResolver::new(ROOT))
        .await
        .unwrap();

    assert!(dataset.rankings.is_empty());
    assert_eq!(summary.skipped_empty, 1);
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(browser.launches(), 0);
}

#[tokio::test]
async fn identical_consecutive_captures_make_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let body = listing(&[("111", "A"), ("222", "B")]);
    let source = MockCaptureSource::new()
        .on(
            &index_url(ROOT, SITE),
            &(index_line(20220101000000, "200") + &index_line(20220201000000, "200")),
        )
        .on(&api_capture(20220101000000), &body)
        .on(&api_capture(20220201000000), &body);

    let (dataset, summary) =
        ingest(dir.path(), source, &MockBrowser::new(), &mut EraResolver::new(ROOT))
            .await
            .unwrap();

    assert_eq!(dataset.rankings.len(), 1);
    assert_eq!(dataset.rankings[0].timestamp, 20220101000000);
    assert_eq!(dataset.rankings[0].product_ids, vec!["111", "222"]);
    assert_eq!(summary.skipped_duplicate, 1);
    assert_dataset_invariants(&dataset);
}

#[tokio::test]
async fn repeated_id_in_listing_then_clean_listing_is_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockCaptureSource::new()
        .on(
            &index_url(ROOT, SITE),
            &(index_line(20220101000000, "200") + &index_line(20220201000000, "200")),
        )
        .on(
            &api_capture(20220101000000),
            &listing(&[("111", "A"), ("222", "B"), ("111", "A")]),
        )
        .on(&api_capture(20220201000000), &listing(&[("111", "A"), ("222", "B")]));

    let (dataset, summary) =
        ingest(dir.path(), source, &MockBrowser::new(), &mut EraResolver::new(ROOT))
            .await
            .unwrap();

    assert_eq!(dataset.rankings.len(), 1);
    assert_eq!(dataset.rankings[0].product_ids, vec!["111", "222"]);
    assert_eq!(summary.skipped_duplicate, 1);
    assert_dataset_invariants(&dataset);
}

#[tokio::test]
async fn new_title_is_added_and_existing_title_kept() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockCaptureSource::new()
        .on(
            &index_url(ROOT, SITE),
            &(index_line(20220101000000, "200") + &index_line(20220301000000, "200")),
        )
        .on(&api_capture(20220101000000), &listing(&[("111", "A"), ("222", "B")]))
        .on(&api_capture(20220301000000), &listing(&[("111", "A renamed"), ("333", "C")]));

    let (dataset, _) = ingest(dir.path(), source, &MockBrowser::new(), &mut EraResolver::new(ROOT))
        .await
        .unwrap();

    assert_eq!(dataset.rankings.len(), 2);
    assert_eq!(dataset.titles["333"].name, "C");
    assert!(dataset.titles["333"].url.contains("/product/333"));
    assert_eq!(dataset.titles["111"].name, "A");
    assert_dataset_invariants(&dataset);
}

#[tokio::test]
async fn non_200_and_failing_captures_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let index = index_line(20220101000000, "302")
        + &index_line(20220201000000, "200")
        + &index_line(20220301000000, "200")
        + &index_line(20220401000000, "200");
    let source = MockCaptureSource::new()
        .on(&index_url(ROOT, SITE), &index)
        .on(&api_capture(20220201000000), "<html>not a listing</html>")
        .failing(&api_capture(20220301000000), 503)
        .on(&api_capture(20220401000000), &listing(&[("9", "Nine")]));
    let calls = source.calls();

    let (dataset, summary) =
        ingest(dir.path(), source, &MockBrowser::new(), &mut EraResolver::new(ROOT))
            .await
            .unwrap();

    assert_eq!(dataset.rankings.len(), 1);
    assert_eq!(dataset.rankings[0].timestamp, 20220401000000);
    assert_eq!(summary.captures_seen, 4);
    assert_eq!(summary.skipped_status, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.emitted, 1);
    assert!(!calls.lock().unwrap().contains(&api_capture(20220101000000)));
}

#[tokio::test]
async fn index_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockCaptureSource::new().failing(&index_url(ROOT, SITE), 500);

    let result = ingest(dir.path(), source, &MockBrowser::new(), &mut EraResolver::new(ROOT)).await;

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("capture index"));
    assert!(!dir.path().join("dmsguild.json").exists());
}

#[tokio::test]
async fn browser_deadline_is_cached_and_not_renavigated() {
    let dir = tempfile::tempdir().unwrap();
    let index = index_line(20180101000000, "200");
    let homepage = capture_url(ROOT, 20180101000000, HOMEPAGE, false);
    let browser = MockBrowser::new().on(&homepage, MockRender::TimedOut);

    for _ in 0..2 {
        let source = MockCaptureSource::new().on(&index_url(ROOT, SITE), &index);
        let (dataset, _) = ingest(dir.path(), source, &browser, &mut EraResolver::new(ROOT))
            .await
            .unwrap();
        assert!(dataset.rankings.is_empty());
    }

    let cached = dir.path().join("cache").join("20180101000000.html");
    assert_eq!(std::fs::read_to_string(cached).unwrap(), "");
    assert_eq!(browser.navigations(), vec![homepage]);
    assert_eq!(browser.launches(), 1);
    assert_eq!(browser.closes(), 1);
}

#[tokio::test]
async fn browser_is_released_once_after_mixed_eras() {
    let dir = tempfile::tempdir().unwrap();
    let index = index_line(20170101000000, "200")
        + &index_line(20190101000000, "200")
        + &index_line(20220101000000, "200");
    let browser = MockBrowser::new()
        .on(
            &capture_url(ROOT, 20170101000000, HOMEPAGE, false),
            MockRender::Body(r#"<a href="/product/1/x">One</a>"#.into()),
        )
        .on(
            &capture_url(ROOT, 20190101000000, HOMEPAGE, false),
            MockRender::Body(listing(&[("2", "Two")])),
        );
    let source = MockCaptureSource::new()
        .on(&index_url(ROOT, SITE), &index)
        .on(&api_capture(20220101000000), &listing(&[("2", "Two"), ("3", "Three")]));

    let (dataset, summary) = ingest(dir.path(), source, &browser, &mut EraResolver::new(ROOT))
        .await
        .unwrap();

    assert_eq!(summary.emitted, 3);
    assert_eq!(browser.launches(), 1);
    assert_eq!(browser.closes(), 1);
    assert_dataset_invariants(&dataset);

    let written: Dataset =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("dmsguild.json")).unwrap())
            .unwrap();
    assert_eq!(written, dataset);
}

#[tokio::test]
async fn unavailable_browser_fails_captures_not_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let index = index_line(20170101000000, "200") + &index_line(20220101000000, "200");
    let source = MockCaptureSource::new()
        .on(&index_url(ROOT, SITE), &index)
        .on(&api_capture(20220101000000), &listing(&[("5", "Five")]));
    let browser = MockBrowser::new().unavailable();

    let (dataset, summary) = ingest(dir.path(), source, &browser, &mut EraResolver::new(ROOT))
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(dataset.rankings.len(), 1);
    assert_eq!(browser.closes(), 0);
}

#[tokio::test]
async fn fallback_mode_walks_endpoints_forward() {
    let dir = tempfile::tempdir().unwrap();
    let index = index_line(20170101000000, "200") + &index_line(20230101000000, "200");
    let template = |ts: u64, original: &str| capture_url(ROOT, ts, original, true);
    let legacy = "http://www.dmsguild.com/api/products/list/hottest_filtered?filters=45469&include_community_content=1&strip_src=hottest_in_dmg";
    let source = MockCaptureSource::new()
        .on(&index_url(ROOT, SITE), &index)
        .on(
            &template(20170101000000, "https://www.dmsguild.com/"),
            r#"<a href="/product/1/a">One</a>"#,
        )
        .on(&template(20230101000000, "https://www.dmsguild.com/"), "<html></html>")
        .on(
            &template(20230101000000, legacy),
            r#"<a href="/product/2/b" oldtitle="Two">x</a>"#,
        );
    let mut resolver = FallbackResolver::new(ROOT);

    let (dataset, _) = ingest(dir.path(), source, &MockBrowser::new(), &mut resolver)
        .await
        .unwrap();

    assert_eq!(resolver.cursor(), 1);
    assert_eq!(dataset.rankings.len(), 2);
    assert_eq!(dataset.titles["2"].name, "Two");
    assert_dataset_invariants(&dataset);
}

#[tokio::test]
async fn unwritable_output_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockCaptureSource::new()
        .on(&index_url(ROOT, SITE), &index_line(20220101000000, "200"))
        .on(&api_capture(20220101000000), &listing(&[("1", "One")]));
    // Output path's parent is a regular file.
    std::fs::write(dir.path().join("blocked"), "").unwrap();
    let mut ctx = context(&dir.path().join("cache"), source, &MockBrowser::new());

    let result = run(
        &mut ctx,
        &mut EraResolver::new(ROOT),
        settings(&dir.path().join("blocked").join("dmsguild.json")),
    )
    .await;
    assert!(result.is_err());
}
