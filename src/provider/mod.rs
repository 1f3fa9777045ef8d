//! Scheduling provider access
//!
//! Wire types for the provider's JSON payloads and the `SchedulingProvider`
//! trait the pipeline is written against. `ProviderClient` is the HTTP
//! implementation; tests drive the pipeline with stub providers instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

mod client;

pub use client::{ProviderClient, RetryPolicy};

/// Provider operations the schedule pipeline depends on
#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// Resource for the account that owns the bearer token
    async fn current_user(&self) -> Result<CurrentUser, ScheduleError>;

    /// Scheduled events belonging to an organization
    async fn list_events(&self, organization: &str) -> Result<Vec<Event>, ScheduleError>;

    /// Invitees registered for a single event
    async fn list_invitees(&self, event_id: &str) -> Result<Vec<RawInvitee>, ScheduleError>;

    /// Start and end time for a single event
    async fn get_event(&self, event_id: &str) -> Result<EventTiming, ScheduleError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub current_organization: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "uri")]
    pub resource_uri: String,
}

impl Event {
    /// Identifier of the event: the last path segment of its URI
    pub fn id(&self) -> Result<&str, ScheduleError> {
        self.resource_uri
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .ok_or_else(|| ScheduleError::EventUriMalformed(self.resource_uri.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInvitee {
    pub name: String,
    pub email: String,
    pub uri: String,
    #[serde(default)]
    pub questions_and_answers: Vec<QuestionAnswer>,
}

impl RawInvitee {
    /// Answer recorded at a given position of the booking form.
    ///
    /// The form has no stable question identifiers, so answers are addressed
    /// by the order the provider returns them in.
    pub fn answer_at(&self, position: usize) -> Option<&str> {
        self.questions_and_answers.get(position).map(|qa| qa.answer.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventTiming {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Envelope for single-resource responses
#[derive(Debug, Deserialize)]
pub(crate) struct Resource<T> {
    pub resource: T,
}

/// Envelope for list responses
#[derive(Debug, Deserialize)]
pub(crate) struct Collection<T> {
    pub collection: Vec<T>,
}
