use serde::{Deserialize, Serialize};

pub const NO_DATES_MESSAGE: &str = "No dates found";

#[derive(Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEvent {
    pub date: String,
    pub event_name: String,
    pub event_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetectResponse {
    Events { events: Vec<DetectedEvent> },
    NoDates { message: String },
}

impl DetectResponse {
    pub fn no_dates() -> Self {
        DetectResponse::NoDates {
            message: NO_DATES_MESSAGE.to_string(),
        }
    }

    pub fn event_count(&self) -> usize {
        match self {
            DetectResponse::Events { events } => events.len(),
            DetectResponse::NoDates { .. } => 0,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub summarizer: String,
    pub model: String,
}
