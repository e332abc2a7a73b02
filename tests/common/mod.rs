#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use realm_sim::engine::Services;
use realm_sim::error::CompletionError;
use realm_sim::service::{ChannelBroadcaster, MemoryStore, TextCompletion};
use realm_sim::sim::Outbound;
use realm_sim::{NationId, ViewerId};
use tokio::sync::mpsc::UnboundedReceiver;

/// Replies with queued lines in order, then with the fallback. Records every
/// prompt it was asked.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    pub prompts: Mutex<Vec<(String, String, u32)>>,
}

impl ScriptedCompletion {
    pub fn new(replies: &[&str], fallback: &str) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
            fallback: fallback.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, CompletionError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string(), max_tokens));
        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Never answers before the caller's timeout.
pub struct HangingCompletion;

#[async_trait]
impl TextCompletion for HangingCompletion {
    async fn complete(&self, _: &str, _: &str, _: u32) -> Result<String, CompletionError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".into())
    }
}

pub struct Rig {
    pub services: Services,
    pub broadcaster: Arc<ChannelBroadcaster>,
    pub store: Arc<MemoryStore>,
}

pub fn rig(completion: Arc<dyn TextCompletion>) -> Rig {
    let broadcaster = Arc::new(ChannelBroadcaster::new());
    let store = Arc::new(MemoryStore::new());
    let services = Services {
        completion,
        store: store.clone(),
        broadcaster: broadcaster.clone(),
        completion_timeout: Duration::from_secs(20),
    };
    Rig {
        services,
        broadcaster,
        store,
    }
}

/// Everything currently queued for a viewer, decoded.
pub fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    while let Ok(line) = rx.try_recv() {
        out.push(serde_json::from_str(&line).unwrap());
    }
    out
}

pub fn types(messages: &[serde_json::Value]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| m["type"].as_str().map(String::from))
        .collect()
}

/// Notice types addressed to `viewer` in a batch of session effects.
pub fn direct_types(out: &[Outbound], viewer: ViewerId) -> Vec<&'static str> {
    out.iter()
        .filter_map(|o| match o {
            Outbound::Direct(v, n) if *v == viewer => Some(n.type_str()),
            _ => None,
        })
        .collect()
}

pub fn broadcast_types(out: &[Outbound]) -> Vec<&'static str> {
    out.iter()
        .filter_map(|o| match o {
            Outbound::Broadcast(n) => Some(n.type_str()),
            _ => None,
        })
        .collect()
}

pub fn other_than(id: NationId) -> NationId {
    id.others().next().unwrap()
}
