#[macro_use]
mod macros;

pub mod action;
pub mod chronicle;
pub mod influence;
pub mod mission;
pub mod nation;
pub mod notice;
pub mod persona;
pub mod ring;
pub mod world;

pub use action::{Action, ActionKind, ActionOutcome, ActionResult, ActionSource};
pub use chronicle::{BreakingNews, ChronicleEntry, Crisis, Intercept, LogEntry, LogKind, Prophecy};
pub use influence::{Ability, Merit, PlayerInfluence};
pub use mission::{Mission, MissionKind};
pub use nation::{City, Mood, Nation, Relation, RelationLabel, Rumor};
pub use notice::{Audience, Notice};
pub use persona::{NationId, Persona, Personality, persona};
pub use ring::BoundedLog;
pub use world::World;
