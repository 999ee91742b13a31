use std::sync::mpsc::{self, Receiver, Sender};

use crate::errors::Result;

use super::SyncEnvelope;

/// Outbound notification of committed state.
pub trait BroadcastChannel: Send {
    fn publish(&self, envelope: &SyncEnvelope) -> Result<()>;
}

/// Drops every envelope. Used when running without peers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadcast;

impl BroadcastChannel for NullBroadcast {
    fn publish(&self, _envelope: &SyncEnvelope) -> Result<()> {
        Ok(())
    }
}

/// Message-passing broadcast backed by an `mpsc` channel.
#[derive(Debug, Clone)]
pub struct ChannelBroadcast {
    sender: Sender<SyncEnvelope>,
}

impl ChannelBroadcast {
    pub fn new(sender: Sender<SyncEnvelope>) -> Self {
        Self { sender }
    }
}

impl BroadcastChannel for ChannelBroadcast {
    fn publish(&self, envelope: &SyncEnvelope) -> Result<()> {
        if self.sender.send(envelope.clone()).is_err() {
            tracing::warn!(device = %envelope.device_id, "no listeners for sync envelope");
        }
        Ok(())
    }
}

pub fn channel() -> (ChannelBroadcast, Receiver<SyncEnvelope>) {
    let (sender, receiver) = mpsc::channel();
    (ChannelBroadcast::new(sender), receiver)
}
