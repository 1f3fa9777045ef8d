//! Per-invitee event lookups
//!
//! Every invitee is enriched with the start and end time of its own event.
//! Lookups run concurrently up to a fixed limit and the batch is
//! all-or-nothing: the first failure drops the remaining lookups and the
//! whole batch fails.

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, error};

use crate::error::ScheduleError;
use crate::invitee::{event_id_from_uri, EnrichedInvitee, ProjectedInvitee};
use crate::provider::SchedulingProvider;

/// Attach event timing to each invitee, preserving input order
pub async fn enrich(
    provider: &dyn SchedulingProvider,
    invitees: Vec<ProjectedInvitee>,
    max_concurrent: usize,
) -> Result<Vec<EnrichedInvitee>, ScheduleError> {
    // Resolve every identifier before issuing any lookup
    let lookups = invitees
        .into_iter()
        .map(|invitee| -> Result<(String, ProjectedInvitee), ScheduleError> {
            let event_id = event_id_from_uri(&invitee.uri)?.to_string();
            Ok((event_id, invitee))
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Enriching {} invitees, {} lookups at a time", lookups.len(), max_concurrent);

    let mut enriched: Vec<(usize, EnrichedInvitee)> = stream::iter(lookups.into_iter().enumerate())
        .map(|(index, (event_id, invitee))| async move {
            match provider.get_event(&event_id).await {
                Ok(timing) => Ok((index, EnrichedInvitee::new(invitee, timing))),
                Err(e) => {
                    error!("Event lookup {} for invitee {} failed: {}", event_id, invitee.uri, e);
                    Err(ScheduleError::EnrichmentFailed {
                        uri: invitee.uri,
                        cause: Box::new(e),
                    })
                }
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .try_collect()
        .await?;

    enriched.sort_unstable_by_key(|(index, _)| *index);
    Ok(enriched.into_iter().map(|(_, invitee)| invitee).collect())
}
