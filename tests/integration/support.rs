//! Shared fixtures for the integration tests

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use tweet_harvester::config::ApiConfig;
use tweet_harvester::quota::RATE_LIMIT_STATUS_ENDPOINT;
use tweet_harvester::{
    ApiClient, Clock, Collection, CollectionEngine, Credentials, ManualClock, Record,
};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, Respond, ResponseTemplate};

/// Epoch seconds every test clock starts at
pub const START: i64 = 1_700_000_000;

pub const TIMELINE: &str = "/1.1/statuses/user_timeline.json";
pub const SEARCH: &str = "/1.1/search/tweets.json";
pub const FOLLOWERS: &str = "/1.1/followers/list.json";

pub struct Harness {
    pub server: MockServer,
    pub clock: Arc<ManualClock>,
    pub engine: CollectionEngine,
}

/// Mock API server plus an engine pointed at it
pub async fn harness() -> Harness {
    let server = MockServer::start().await;
    let clock = Arc::new(ManualClock::new(START));
    let engine = engine_for(&server, Arc::clone(&clock));
    Harness {
        server,
        clock,
        engine,
    }
}

pub fn engine_for(server: &MockServer, clock: Arc<ManualClock>) -> CollectionEngine {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    };
    let client = ApiClient::new(&config, Credentials::new("ck", "cs", "at", "ats"))
        .expect("client should build");
    CollectionEngine::new(Arc::new(client), clock)
}

/// Rate limit status body with a single resource entry
pub fn limit_status(family: &str, resource: &str, remaining: i64, reset: i64) -> Value {
    let mut entry = Map::new();
    entry.insert(
        resource.to_string(),
        json!({"limit": 900, "remaining": remaining, "reset": reset}),
    );
    let mut resources = Map::new();
    resources.insert(family.to_string(), Value::Object(entry));
    json!({ "resources": resources })
}

pub fn timeline_quota(remaining: i64, reset: i64) -> Value {
    limit_status("statuses", "/statuses/user_timeline", remaining, reset)
}

/// Mounts a probe answer that is always available
pub async fn mount_probe(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(RATE_LIMIT_STATUS_ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn tweet(id: u64) -> Value {
    json!({"id": id, "text": format!("tweet {}", id), "user": {"screen_name": "alice"}})
}

pub fn retweet(id: u64) -> Value {
    json!({"id": id, "text": format!("RT tweet {}", id), "retweeted_status": tweet(id - 1)})
}

pub fn tweets(ids: &[u64]) -> Value {
    Value::Array(ids.iter().map(|&id| tweet(id)).collect())
}

/// 200 response with both rate limit headers
pub fn page(body: Value, remaining: i64, reset: i64) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .insert_header("x-rate-limit-remaining", remaining.to_string().as_str())
        .insert_header("x-rate-limit-reset", reset.to_string().as_str())
}

/// Requests received for `path`
pub async fn hits(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .count()
}

pub async fn drain(collection: &mut Collection<'_>) -> tweet_harvester::Result<Vec<Record>> {
    let mut records = Vec::new();
    while let Some(record) = collection.next_record().await? {
        records.push(record);
    }
    Ok(records)
}

pub fn ids(records: &[Record]) -> Vec<u64> {
    records.iter().filter_map(|r| r["id"].as_u64()).collect()
}

/// Matches requests without the named query parameter
pub struct ParamMissing(pub &'static str);

impl Match for ParamMissing {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(k, _)| k == self.0)
    }
}

/// Responds with a fixed template and logs the clock reading per request
pub struct Recording {
    clock: Arc<ManualClock>,
    times: Arc<Mutex<Vec<i64>>>,
    template: ResponseTemplate,
}

impl Recording {
    pub fn new(
        clock: &Arc<ManualClock>,
        template: ResponseTemplate,
    ) -> (Self, Arc<Mutex<Vec<i64>>>) {
        let times = Arc::new(Mutex::new(Vec::new()));
        let responder = Self {
            clock: Arc::clone(clock),
            times: Arc::clone(&times),
            template,
        };
        (responder, times)
    }
}

impl Respond for Recording {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.times.lock().unwrap().push(self.clock.now());
        self.template.clone()
    }
}
