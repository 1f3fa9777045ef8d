//! Schedule pipeline
//!
//! Turns a location name into an enriched schedule:
//!
//! 1. validate the location against the allow-list
//! 2. fetch the current user to learn its organization
//! 3. list the organization's scheduled events
//! 4. pick the event whose name mentions the location
//! 5. list that event's invitees
//! 6. project each invitee onto the schedule fields
//! 7. look up every invitee's event timing concurrently
//!
//! Each stage depends on the previous stage's output, so stages run strictly
//! in order and the first failure ends the run.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info};
use secrecy::SecretString;
use uuid::Uuid;

use crate::config::{Config, ScheduleConfig};
use crate::enrichment::enrich;
use crate::error::ScheduleError;
use crate::invitee::{project, EnrichedInvitee};
use crate::location::{find_event_by_location, LocationRegistry};
use crate::provider::{ProviderClient, SchedulingProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidatingLocation,
    FetchingUser,
    ListingEvents,
    MatchingEvent,
    ListingInvitees,
    Projecting,
    Enriching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ValidatingLocation => "validating location",
            Stage::FetchingUser => "fetching current user",
            Stage::ListingEvents => "listing events",
            Stage::MatchingEvent => "matching event",
            Stage::ListingInvitees => "listing invitees",
            Stage::Projecting => "projecting invitees",
            Stage::Enriching => "enriching invitees",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Idle,
    Active(Stage),
    Done(Vec<EnrichedInvitee>),
    Failed { stage: Stage, error: ScheduleError },
}

/// Bookkeeping for a single pipeline run
struct ScheduleRun {
    id: Uuid,
    state: RunState,
}

impl ScheduleRun {
    fn new() -> Self {
        Self { id: Uuid::new_v4(), state: RunState::Idle }
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Run[{}]: {:?} -> {:?}", self.id, self.state, stage);
        self.state = RunState::Active(stage);
    }

    /// Stage the run is in, or the first stage if it never started
    fn stage(&self) -> Stage {
        match &self.state {
            RunState::Active(stage) | RunState::Failed { stage, .. } => *stage,
            RunState::Idle | RunState::Done(_) => Stage::ValidatingLocation,
        }
    }

    /// Log the outcome and hand it back with the stage the run stopped in
    fn finish(
        self,
        outcome: Result<Vec<EnrichedInvitee>, ScheduleError>,
    ) -> (Stage, Result<Vec<EnrichedInvitee>, ScheduleError>) {
        let stage = self.stage();
        match &outcome {
            Ok(invitees) => {
                info!("Run[{}]: schedule ready with {} invitees", self.id, invitees.len())
            }
            Err(error) => error!("Run[{}]: failed while {}: {}", self.id, stage, error),
        }
        (stage, outcome)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub locations: LocationRegistry,
    pub max_concurrent_lookups: usize,
    pub deadline: Duration,
}

impl From<&ScheduleConfig> for PipelineSettings {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            locations: LocationRegistry::new(&config.locations),
            max_concurrent_lookups: config.max_concurrent_lookups,
            deadline: Duration::from_secs(config.deadline_secs),
        }
    }
}

pub struct Pipeline {
    provider: Arc<dyn SchedulingProvider>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn SchedulingProvider>, settings: PipelineSettings) -> Self {
        Self { provider, settings }
    }

    /// Pipeline backed by the provider's HTTP API
    pub fn from_config(config: &Config, token: SecretString) -> Result<Self> {
        let client = ProviderClient::new(&config.provider, token)?;
        Ok(Self::new(Arc::new(client), PipelineSettings::from(&config.schedule)))
    }

    pub fn locations(&self) -> &LocationRegistry {
        &self.settings.locations
    }

    /// Build the schedule for `location`
    pub async fn run(&self, location: &str) -> Result<Vec<EnrichedInvitee>, ScheduleError> {
        let (_, outcome) = self.complete(location).await;
        outcome
    }

    /// Drive a run to completion, returning `Done` or `Failed`
    pub async fn execute(&self, location: &str) -> RunState {
        match self.complete(location).await {
            (_, Ok(invitees)) => RunState::Done(invitees),
            (stage, Err(error)) => RunState::Failed { stage, error },
        }
    }

    async fn complete(
        &self,
        location: &str,
    ) -> (Stage, Result<Vec<EnrichedInvitee>, ScheduleError>) {
        let mut run = ScheduleRun::new();
        info!("Run[{}]: building schedule for '{}'", run.id, location);

        let deadline = self.settings.deadline;
        let outcome = tokio::time::timeout(deadline, self.drive(&mut run, location)).await;
        let outcome = match outcome {
            Ok(result) => result,
            Err(_) => Err(ScheduleError::DeadlineExceeded { stage: run.stage(), after: deadline }),
        };
        run.finish(outcome)
    }

    async fn drive(
        &self,
        run: &mut ScheduleRun,
        location: &str,
    ) -> Result<Vec<EnrichedInvitee>, ScheduleError> {
        run.enter(Stage::ValidatingLocation);
        let location = self.settings.locations.validate(location)?;

        run.enter(Stage::FetchingUser);
        let user = self.provider.current_user().await?;

        run.enter(Stage::ListingEvents);
        let events = self.provider.list_events(&user.current_organization).await?;
        debug!("Run[{}]: {} events for {}", run.id, events.len(), user.current_organization);

        run.enter(Stage::MatchingEvent);
        let event = find_event_by_location(&events, &location)?;
        let event_id = event.id()?;
        info!("Run[{}]: '{}' matched event '{}' ({})", run.id, location, event.display_name, event_id);

        run.enter(Stage::ListingInvitees);
        let raw_invitees = self.provider.list_invitees(event_id).await?;

        run.enter(Stage::Projecting);
        let invitees = raw_invitees.iter().map(project).collect::<Result<Vec<_>, _>>()?;

        run.enter(Stage::Enriching);
        enrich(self.provider.as_ref(), invitees, self.settings.max_concurrent_lookups).await
    }
}
