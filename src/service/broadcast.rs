use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::trace;

use crate::error::BroadcastError;
use crate::id::{RealmId, ViewerId};
use crate::model::Notice;

/// Delivers notices to connected viewers. Calls never block.
pub trait Broadcaster: Send + Sync {
    /// Every viewer connected to `realm`.
    fn send_to_all(&self, realm: &RealmId, notice: &Notice);

    /// One viewer. Errors when the viewer is gone.
    fn send_to_one(&self, viewer: ViewerId, notice: &Notice) -> Result<(), BroadcastError>;
}

/// In-process fan-out over unbounded channels carrying JSON-encoded notices.
/// A transport (websocket, SSE) subscribes per connection and forwards.
#[derive(Debug, Default)]
pub struct ChannelBroadcaster {
    viewers: Mutex<HashMap<ViewerId, (RealmId, UnboundedSender<String>)>>,
}

impl ChannelBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, realm: &RealmId, viewer: ViewerId) -> UnboundedReceiver<String> {
        let (tx, rx) = unbounded_channel();
        let mut viewers = self.viewers.lock().unwrap_or_else(|e| e.into_inner());
        viewers.insert(viewer, (realm.clone(), tx));
        rx
    }

    pub fn unsubscribe(&self, viewer: ViewerId) {
        let mut viewers = self.viewers.lock().unwrap_or_else(|e| e.into_inner());
        viewers.remove(&viewer);
    }

    pub fn connected(&self, realm: &RealmId) -> usize {
        let viewers = self.viewers.lock().unwrap_or_else(|e| e.into_inner());
        viewers.values().filter(|(r, _)| r == realm).count()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn send_to_all(&self, realm: &RealmId, notice: &Notice) {
        let Ok(payload) = serde_json::to_string(notice) else {
            return;
        };
        let mut viewers = self.viewers.lock().unwrap_or_else(|e| e.into_inner());
        viewers.retain(|viewer, (r, tx)| {
            if *r != *realm {
                return true;
            }
            let open = tx.send(payload.clone()).is_ok();
            if !open {
                trace!(%viewer, "dropping closed viewer");
            }
            open
        });
    }

    fn send_to_one(&self, viewer: ViewerId, notice: &Notice) -> Result<(), BroadcastError> {
        let payload = serde_json::to_string(notice)?;
        let mut viewers = self.viewers.lock().unwrap_or_else(|e| e.into_inner());
        let Some((_, tx)) = viewers.get(&viewer) else {
            return Err(BroadcastError::Disconnected(viewer));
        };
        if tx.send(payload).is_err() {
            viewers.remove(&viewer);
            return Err(BroadcastError::Disconnected(viewer));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_is_scoped_to_realm() {
        let b = ChannelBroadcaster::new();
        let a = RealmId::from("a");
        let mut rx1 = b.subscribe(&a, ViewerId(1));
        let mut rx2 = b.subscribe(&RealmId::from("b"), ViewerId(2));
        b.send_to_all(&a, &Notice::WorldReset);
        assert!(rx1.try_recv().unwrap().contains("world_reset"));
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn closed_viewer_reports_disconnect() {
        let b = ChannelBroadcaster::new();
        let rx = b.subscribe(&RealmId::from("a"), ViewerId(1));
        drop(rx);
        let err = b.send_to_one(ViewerId(1), &Notice::WorldReset).unwrap_err();
        assert!(matches!(err, BroadcastError::Disconnected(ViewerId(1))));
        assert!(b.send_to_one(ViewerId(1), &Notice::WorldReset).is_err());
        assert_eq!(b.connected(&RealmId::from("a")), 0);
    }
}
