//! Session scenarios: engine output forwarded into sinks

use crate::support::*;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use tweet_harvester::collector::DEFAULT_SINCE_ID;
use tweet_harvester::config::load_config;
use tweet_harvester::sink::{RunStatus, Sink, SinkError};
use tweet_harvester::{
    ApiClient, CollectOptions, CollectionEngine, CollectionSession, FetchStrategy, HarvestError,
    JsonLinesSink, ManualClock, MemorySink, SqliteSink,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

/// Timeline of `ids` in one page, then an empty page
async fn mount_timeline(h: &Harness, since_id: u64, ids: &[u64]) {
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("since_id", since_id.to_string().as_str()))
        .and(ParamMissing("max_id"))
        .respond_with(page(tweets(ids), 50, START + 900))
        .expect(1)
        .mount(&h.server)
        .await;

    let last = ids.last().copied().unwrap_or(1);
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("max_id", (last - 1).to_string().as_str()))
        .respond_with(page(json!([]), 49, START + 900))
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn test_session_stores_every_record() {
    let h = harness().await;
    mount_probe(&h.server, timeline_quota(900, START + 900)).await;
    mount_timeline(&h, 1000, &[1050, 1040, 1030]).await;

    let mut sink = SqliteSink::new_in_memory().unwrap().with_config_hash("cafe");
    sink.use_collection("alice");

    let summary = CollectionSession::new(&h.engine, &mut sink)
        .run(
            FetchStrategy::user_timeline("alice", Some(1000)),
            CollectOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.label, "user-timeline @alice");
    assert_eq!(summary.emitted, 3);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.final_cursor, Some(1029));

    assert_eq!(sink.count_records().unwrap(), 3);
    assert_eq!(sink.latest_id().unwrap(), Some(1050));

    let runs = sink.recent_runs(5).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].emitted, 3);
    assert_eq!(runs[0].config_hash, "cafe");
}

#[tokio::test]
async fn test_resume_point_becomes_since_id() {
    let h = harness().await;
    mount_probe(&h.server, timeline_quota(900, START + 900)).await;
    mount_timeline(&h, 1050, &[1070, 1060]).await;

    let mut sink = MemorySink::new();
    sink.store(&tweet(1050)).unwrap();
    sink.store(&tweet(1040)).unwrap();

    let mut session = CollectionSession::new(&h.engine, &mut sink);
    let resume = session.resume_point().unwrap();
    assert_eq!(resume, 1050);

    session
        .run(
            FetchStrategy::user_timeline("alice", Some(resume)),
            CollectOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(sink.ids(), vec![1050, 1040, 1070, 1060]);
}

#[tokio::test]
async fn test_empty_sink_resumes_from_default() {
    let h = harness().await;
    mount_probe(&h.server, timeline_quota(900, START + 900)).await;
    mount_timeline(&h, DEFAULT_SINCE_ID, &[DEFAULT_SINCE_ID + 5]).await;

    let mut sink = SqliteSink::new_in_memory().unwrap();
    let mut session = CollectionSession::new(&h.engine, &mut sink);
    let resume = session.resume_point().unwrap();

    let summary = session
        .run(
            FetchStrategy::user_timeline("alice", Some(resume)),
            CollectOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.emitted, 1);
}

#[tokio::test]
async fn test_sink_failure_is_fatal() {
    let h = harness().await;
    mount_probe(&h.server, timeline_quota(900, START + 900)).await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(page(tweets(&[5, 4, 3]), 50, START + 900))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut sink = MemorySink::failing_after(2);
    let result = CollectionSession::new(&h.engine, &mut sink)
        .run(
            FetchStrategy::user_timeline("alice", None),
            CollectOptions::default(),
        )
        .await;

    assert!(matches!(
        result,
        Err(HarvestError::Sink(SinkError::Rejected(_)))
    ));
    assert_eq!(sink.ids(), vec![5, 4]);
    assert_eq!(
        sink.runs(),
        &[(
            "user-timeline @alice".to_string(),
            Some(RunStatus::Failed),
            2
        )]
    );
}

#[tokio::test]
async fn test_fetch_error_keeps_stored_records() {
    let h = harness().await;
    mount_probe(&h.server, timeline_quota(900, START + 900)).await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(ParamMissing("max_id"))
        .respond_with(page(tweets(&[30, 20, 10]), 50, START + 900))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("max_id", "9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let mut sink = SqliteSink::new_in_memory().unwrap();
    sink.use_collection("alice");
    let result = CollectionSession::new(&h.engine, &mut sink)
        .run(
            FetchStrategy::user_timeline("alice", None),
            CollectOptions::default(),
        )
        .await;

    assert!(matches!(
        result,
        Err(HarvestError::Api { status: 500, .. })
    ));
    assert_eq!(sink.count_records().unwrap(), 3);

    let runs = sink.recent_runs(1).unwrap();
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert_eq!(runs[0].emitted, 3);
}

#[tokio::test]
async fn test_json_lines_session() {
    let h = harness().await;
    mount_probe(&h.server, timeline_quota(900, START + 900)).await;
    mount_timeline(&h, 1000, &[1002, 1001]).await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("alice.jsonl");
    let mut sink = JsonLinesSink::open(&file).unwrap();

    let options = CollectOptions {
        only_text: true,
        ..Default::default()
    };
    CollectionSession::new(&h.engine, &mut sink)
        .run(FetchStrategy::user_timeline("alice", Some(1000)), options)
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&file).unwrap();
    assert_eq!(contents, "\"tweet 1002\"\n\"tweet 1001\"\n");
}

#[tokio::test]
async fn test_config_driven_jobs() {
    let h = harness().await;
    mount_probe(
        &h.server,
        limit_status("search", "/search/tweets", 180, START + 900),
    )
    .await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("q", "#rustlang"))
        .and(query_param("since_id", "77"))
        .and(ParamMissing("max_id"))
        .respond_with(page(
            json!({"statuses": [tweet(90), tweet(80)]}),
            179,
            START + 900,
        ))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("max_id", "79"))
        .respond_with(page(json!({"statuses": []}), 178, START + 900))
        .mount(&h.server)
        .await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r##"
[api]
base-url = "{}"
timeout-secs = 5

[collector]
total = 10

[output]
database-path = "unused.db"

[[accounts]]
consumer-key = "ck"
consumer-secret = "cs"
access-token = "at"
access-token-secret = "as"

[[jobs]]
mode = "search"
keyword = "#rustlang"
since-id = 77
collection = "rust.lang"
"##,
        h.server.uri()
    )
    .unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).unwrap();
    let account = config.selected_account().unwrap();
    let client = ApiClient::new(&config.api, account.credentials()).unwrap();
    let engine = CollectionEngine::new(Arc::new(client), Arc::new(ManualClock::new(START)));

    let job = &config.jobs[0];
    let mut sink = SqliteSink::new_in_memory().unwrap();
    sink.use_collection(&job.collection_name());

    let mut session = CollectionSession::new(&engine, &mut sink);
    let strategy = job.to_strategy(Some(session.resume_point().unwrap()));
    let summary = session
        .run(strategy, config.collector.collect_options())
        .await
        .unwrap();

    assert_eq!(summary.emitted, 2);
    assert_eq!(sink.collection(), "rust_lang");
    assert_eq!(sink.collection_counts().unwrap(), vec![("rust_lang".to_string(), 2)]);
}
