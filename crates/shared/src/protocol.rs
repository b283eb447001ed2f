use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CurrentSlide, Element, ElementId, Response};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSlideRequest {
    #[serde(default, alias = "slide", alias = "currentSlide")]
    pub slide_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideAck {
    pub success: bool,
    pub current_slide: String,
    pub timestamp: DateTime<Utc>,
}

impl From<CurrentSlide> for SlideAck {
    fn from(slide: CurrentSlide) -> Self {
        Self {
            success: true,
            current_slide: slide.current_slide,
            timestamp: slide.timestamp,
        }
    }
}

/// Admin payload for creating or overwriting an element. Fields are optional
/// on the wire so that a missing field is reported as a validation error
/// rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveElementRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    #[serde(default)]
    pub element_id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub option: Option<i64>,
    #[serde(default)]
    pub option_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAck {
    pub success: bool,
    pub element_id: ElementId,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

pub type ElementListing = BTreeMap<ElementId, Element>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseListing {
    pub element_id: ElementId,
    pub responses: Vec<Response>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntry {
    pub user: String,
    pub response: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTally {
    pub text: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregatedResult {
    Text {
        responses: Vec<TextEntry>,
        total: usize,
    },
    Choice {
        options: Vec<OptionTally>,
        total: usize,
    },
}

impl AggregatedResult {
    pub fn total(&self) -> usize {
        match self {
            AggregatedResult::Text { total, .. } | AggregatedResult::Choice { total, .. } => *total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsPayload {
    pub element: Element,
    pub results: AggregatedResult,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub uptime: f64,
    pub current_slide: String,
    pub elements_count: usize,
    pub responses_count: usize,
    pub subscribers: usize,
}

/// State transition fanned out to push subscribers after the mutation is
/// visible to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    SlideChanged {
        slide: CurrentSlide,
    },
    ElementSaved {
        element: Element,
    },
    ResponseAdded {
        #[serde(rename = "elementId")]
        element_id: ElementId,
        count: usize,
    },
    ElementDeleted {
        #[serde(rename = "elementId")]
        element_id: ElementId,
    },
    ResponsesCleared,
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::SlideChanged { .. } => "slide_changed",
            ServerEvent::ElementSaved { .. } => "element_saved",
            ServerEvent::ResponseAdded { .. } => "response_added",
            ServerEvent::ElementDeleted { .. } => "element_deleted",
            ServerEvent::ResponsesCleared => "responses_cleared",
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
