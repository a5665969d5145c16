use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calendar_event_extractor::api::routes::create_router;
use calendar_event_extractor::config::Config;
use calendar_event_extractor::dates::DateFinder;
use calendar_event_extractor::error::{AppError, Result};
use calendar_event_extractor::summarizer::{Summarizer, SummaryLength};
use calendar_event_extractor::AppState;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;

enum Behaviour {
    Echo,
    Fail,
    Stall,
}

struct StubSummarizer(Behaviour);

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, _text: &str, length: SummaryLength) -> Result<String> {
        match self.0 {
            Behaviour::Echo if length == SummaryLength::EVENT_NAME => Ok("Team offsite".to_string()),
            Behaviour::Echo => Ok("The whole team travels to the lake for planning.".to_string()),
            Behaviour::Fail => Err(AppError::SummarizerError("connection refused".to_string())),
            Behaviour::Stall => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
        }
    }

    fn backend(&self) -> &'static str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

async fn spawn_app(behaviour: Behaviour, vars: &[(&str, &str)]) -> String {
    let config = Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap();

    let mut state = AppState::with_summarizer(config, Arc::new(StubSummarizer(behaviour)));
    state.finder = DateFinder::with_base_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn post_text(base: &str, text: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/detect_date", base))
        .json(&json!({ "text": text }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn dates_become_events() {
    let base = spawn_app(Behaviour::Echo, &[]).await;

    let res = post_text(&base, "Offsite at the lake on June 3rd, 2024. Return 06/05/2024.").await;
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({"events": [
            {
                "date": "2024-06-03 00:00:00",
                "eventName": "Team offsite",
                "eventDescription": "The whole team travels to the lake for planning."
            },
            {
                "date": "2024-06-05 00:00:00",
                "eventName": "Team offsite",
                "eventDescription": "The whole team travels to the lake for planning."
            }
        ]})
    );
}

#[tokio::test]
async fn text_without_dates_gets_a_message() {
    let base = spawn_app(Behaviour::Echo, &[]).await;

    let res = post_text(&base, "Nothing on the calendar this week.").await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"message": "No dates found"}));
}

#[tokio::test]
async fn summarizer_failures_become_placeholders() {
    let base = spawn_app(Behaviour::Fail, &[]).await;

    let res = post_text(&base, "Dentist 2024-07-09 at 10:30").await;
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"events": [{
            "date": "2024-07-09 10:30:00",
            "eventName": "Error summarizing event name",
            "eventDescription": "Error summarizing description"
        }]})
    );
}

#[tokio::test]
async fn missing_text_is_rejected() {
    let base = spawn_app(Behaviour::Echo, &[]).await;

    let res = reqwest::Client::new()
        .post(format!("{}/detect_date", base))
        .json(&json!({ "body": "May 5, 2024" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 422);
}

#[tokio::test]
async fn slow_summaries_time_out() {
    let base = spawn_app(Behaviour::Stall, &[("REQUEST_TIMEOUT_SECS", "1")]).await;

    let res = post_text(&base, "Launch on 2024-09-01").await;
    assert_eq!(res.status(), 408);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "Request processing timed out"})
    );
}

#[tokio::test]
async fn health_reports_the_summarizer() {
    let base = spawn_app(Behaviour::Echo, &[]).await;

    let res = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"status": "ok", "summarizer": "stub", "model": "stub-model"})
    );
}

#[tokio::test]
async fn browser_client_origin_passes_preflight() {
    let base = spawn_app(Behaviour::Echo, &[]).await;

    let res = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/detect_date", base))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn unknown_origin_is_not_allowed() {
    let base = spawn_app(Behaviour::Echo, &[]).await;

    let res = reqwest::Client::new()
        .post(format!("{}/detect_date", base))
        .header("Origin", "http://evil.test")
        .json(&json!({ "text": "no dates" }))
        .send()
        .await
        .unwrap();

    assert!(res.headers().get("access-control-allow-origin").is_none());
}
