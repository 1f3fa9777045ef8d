pub mod api_server;
pub mod config;
pub mod enrichment;
pub mod env_manager;
pub mod error;
pub mod invitee;
pub mod location;
pub mod pipeline;
pub mod provider;

use env_logger::Env;

/// Initialize logging, honouring `SCHEDULER_LOG_LEVEL` (default `info`)
pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().filter_or(env_manager::LOG_LEVEL_VAR, "info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use error::ScheduleError;
pub use invitee::{EnrichedInvitee, ProjectedInvitee};
pub use pipeline::{Pipeline, PipelineSettings, RunState, Stage};
pub use provider::{ProviderClient, SchedulingProvider};
