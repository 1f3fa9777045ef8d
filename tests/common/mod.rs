#![allow(dead_code)]

use async_trait::async_trait;
use pickup_schedule::provider::{
    CurrentUser, Event, EventTiming, QuestionAnswer, RawInvitee, SchedulingProvider,
};
use pickup_schedule::ScheduleError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory provider that records every call made against it
#[derive(Default)]
pub struct StubProvider {
    pub organization: String,
    pub events: Vec<Event>,
    pub invitees: Vec<RawInvitee>,
    /// Event timing by event id; ids missing here fail the lookup
    pub timings: HashMap<String, EventTiming>,
    /// Extra latency for individual event lookups
    pub lookup_delays: HashMap<String, Duration>,
    pub user_delay: Duration,

    pub user_calls: AtomicUsize,
    pub event_list_calls: AtomicUsize,
    pub invitee_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub requested: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn total_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
            + self.event_list_calls.load(Ordering::SeqCst)
            + self.invitee_calls.load(Ordering::SeqCst)
            + self.lookup_calls.load(Ordering::SeqCst)
    }

    fn record(&self, request: String) {
        self.requested.lock().unwrap().push(request);
    }
}

#[async_trait]
impl SchedulingProvider for StubProvider {
    async fn current_user(&self) -> Result<CurrentUser, ScheduleError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.record("users/me".to_string());
        if !self.user_delay.is_zero() {
            tokio::time::sleep(self.user_delay).await;
        }
        Ok(CurrentUser { current_organization: self.organization.clone() })
    }

    async fn list_events(&self, organization: &str) -> Result<Vec<Event>, ScheduleError> {
        self.event_list_calls.fetch_add(1, Ordering::SeqCst);
        self.record(format!("events?organization={}", organization));
        Ok(self.events.clone())
    }

    async fn list_invitees(&self, event_id: &str) -> Result<Vec<RawInvitee>, ScheduleError> {
        self.invitee_calls.fetch_add(1, Ordering::SeqCst);
        self.record(format!("events/{}/invitees", event_id));
        Ok(self.invitees.clone())
    }

    async fn get_event(&self, event_id: &str) -> Result<EventTiming, ScheduleError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.lookup_delays.get(event_id) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.timings.get(event_id).copied().ok_or_else(|| ScheduleError::ProviderUnavailable {
            endpoint: format!("/scheduled_events/{}", event_id),
            cause: "HTTP 503 Service Unavailable".to_string(),
            transient: true,
        })
    }
}

pub fn event(name: &str, id: &str) -> Event {
    Event {
        display_name: name.to_string(),
        resource_uri: format!("https://api.calendly.com/scheduled_events/{}", id),
    }
}

/// Invitee whose URI points at event `event_id`
pub fn invitee(name: &str, event_id: &str, answers: &[&str]) -> RawInvitee {
    RawInvitee {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        uri: format!("https://api.calendly.com/scheduled_events/{}/invitees/{}", event_id, name),
        questions_and_answers: answers
            .iter()
            .map(|answer| QuestionAnswer {
                question: "Question".to_string(),
                answer: answer.to_string(),
            })
            .collect(),
    }
}

pub fn timing(start: &str, end: &str) -> EventTiming {
    EventTiming { start_time: start.parse().unwrap(), end_time: end.parse().unwrap() }
}
