pub mod actions;
pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod fog;
pub mod id;
pub mod influence;
pub mod model;
pub mod scenario;
pub mod service;
pub mod sim;
pub mod store;
pub mod testutil;

pub use engine::{Realms, Services, SessionHandle, spawn_session};
pub use id::{IdGenerator, RealmId, SessionId, ViewerId};
pub use model::{NationId, World};
pub use sim::{Command, Outbound, Session};
