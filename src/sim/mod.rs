pub mod agenda;
pub mod context;
pub mod crisis;
pub mod drift;
pub mod economy;
pub mod events;
pub mod expiry;
pub mod jobs;
pub mod mood;
pub mod news;
pub mod oracle;
pub mod prophecy;
pub mod season;
pub mod session;
pub mod system;
pub mod war;

pub use agenda::{Agenda, Scheduled};
pub use context::{CompletionRequest, FollowUp, Job, Outbox, Purpose, TickContext};
pub use session::{Command, Outbound, Session};
pub use system::SimSystem;

use crate::config::Cadences;

/// Every scheduled system, in the order they are first placed on the agenda.
pub fn default_systems(c: &Cadences) -> Vec<Box<dyn SimSystem>> {
    vec![
        Box::new(economy::EconomySystem::new(c.economy)),
        Box::new(war::WarSystem::new(c.war)),
        Box::new(mood::MoodSystem::new(c.mood)),
        Box::new(season::SeasonSystem::new(c.season)),
        Box::new(expiry::ExpirySystem::new(c.expiry)),
        Box::new(events::EventSystem::new(c.events)),
        Box::new(crisis::CrisisSystem::new(c.crisis)),
        Box::new(prophecy::ProphecySystem::new(c.prophecy)),
        Box::new(news::NewsSystem::new(c.news)),
        Box::new(drift::DriftSystem::new(c.drift)),
        Box::new(oracle::DecisionSystem::new(c.decision)),
        Box::new(oracle::AmbientSystem::new(c.ambient)),
        Box::new(oracle::InterceptSystem::new(c.intercept)),
    ]
}
