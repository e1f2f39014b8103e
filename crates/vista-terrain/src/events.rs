//! Lifecycle events from the generation layer.
//!
//! Producers may run on any thread; the receiving side is drained on the
//! render thread between frames.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryIter, unbounded};

use crate::chunk_record::{ChunkId, ChunkRecord};

#[derive(Clone, Debug)]
pub enum TerrainEvent {
    /// A chunk-state object exists; its data may not be ready yet.
    Created(ChunkId),
    /// Data for the chunk is available. The first `Ready` builds the chunk,
    /// later ones rebuild its surface.
    Ready(ChunkId, Arc<ChunkRecord>),
    /// The chunk is retired.
    Destroyed(ChunkId),
}

impl TerrainEvent {
    pub fn chunk_id(&self) -> ChunkId {
        match self {
            Self::Created(id) | Self::Ready(id, _) | Self::Destroyed(id) => *id,
        }
    }
}

/// Producer half of the terrain event channel.
#[derive(Clone, Debug)]
pub struct TerrainEventSender {
    sender: Sender<TerrainEvent>,
}

impl TerrainEventSender {
    /// Send an event. Returns `false` once the receiving set is gone.
    pub fn send(&self, event: TerrainEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn created(&self, id: ChunkId) -> bool {
        self.send(TerrainEvent::Created(id))
    }

    pub fn ready(&self, id: ChunkId, record: Arc<ChunkRecord>) -> bool {
        self.send(TerrainEvent::Ready(id, record))
    }

    pub fn destroyed(&self, id: ChunkId) -> bool {
        self.send(TerrainEvent::Destroyed(id))
    }
}

/// Consumer half of the terrain event channel.
#[derive(Debug)]
pub struct TerrainEventReceiver {
    receiver: Receiver<TerrainEvent>,
}

impl TerrainEventReceiver {
    /// Events already queued, without blocking.
    pub fn try_iter(&self) -> TryIter<'_, TerrainEvent> {
        self.receiver.try_iter()
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

/// Create a connected sender/receiver pair.
pub fn terrain_channel() -> (TerrainEventSender, TerrainEventReceiver) {
    let (sender, receiver) = unbounded();
    (
        TerrainEventSender { sender },
        TerrainEventReceiver { receiver },
    )
}
