mod migrate;
mod snapshot;

pub use migrate::migrate;
pub use snapshot::PgWorldStore;
