use std::time::Duration;

use crate::pipeline::Stage;

/// Errors produced while building a schedule
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Location '{0}' is not a recognized location")]
    UnknownLocation(String),
    #[error("Provider endpoint {endpoint} unavailable: {cause}")]
    ProviderUnavailable { endpoint: String, cause: String, transient: bool },
    #[error("No scheduled event name contains location '{0}'")]
    LocationNotFound(String),
    #[error("Event URI '{0}' has no identifier segment")]
    EventUriMalformed(String),
    #[error("Invitee '{uri}' has {answers} question/answer entries, expected at least 2")]
    MalformedInviteeRecord { uri: String, answers: usize },
    #[error("Invitee URI '{0}' does not carry an event identifier segment")]
    InviteeUriMalformed(String),
    #[error("Enrichment failed for invitee '{uri}': {cause}")]
    EnrichmentFailed { uri: String, cause: Box<ScheduleError> },
    #[error("Schedule run exceeded its {secs}s deadline while {stage}", secs = .after.as_secs())]
    DeadlineExceeded { stage: Stage, after: Duration },
}

impl ScheduleError {
    /// Stable machine-readable name, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::UnknownLocation(_) => "unknown_location",
            ScheduleError::ProviderUnavailable { .. } => "provider_unavailable",
            ScheduleError::LocationNotFound(_) => "location_not_found",
            ScheduleError::EventUriMalformed(_) => "event_uri_malformed",
            ScheduleError::MalformedInviteeRecord { .. } => "malformed_invitee_record",
            ScheduleError::InviteeUriMalformed(_) => "invitee_uri_malformed",
            ScheduleError::EnrichmentFailed { .. } => "enrichment_failed",
            ScheduleError::DeadlineExceeded { .. } => "deadline_exceeded",
        }
    }

    /// Whether the same request could succeed if issued again later.
    /// Nothing in the pipeline retries on this basis; the provider client
    /// only retries transport-level failures.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScheduleError::ProviderUnavailable { transient, .. } => *transient,
            ScheduleError::EnrichmentFailed { cause, .. } => cause.is_retryable(),
            ScheduleError::DeadlineExceeded { .. } => true,
            _ => false,
        }
    }
}
