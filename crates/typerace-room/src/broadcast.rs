//! Broadcast fan-out for one room.
//!
//! Every event a room emits is stamped with the room's next sequence
//! number and pushed onto each subscriber's unbounded queue. A
//! connection's writer task drains that queue at its own pace, so a slow
//! socket never holds up the room or its other subscribers.

use std::sync::Arc;

use tokio::sync::mpsc;
use typerace_protocol::{ConnectionId, Envelope, RoomId, ServerEvent};

/// The outbound queue of one connection.
///
/// The envelope is shared: a broadcast allocates once, however many
/// subscribers it reaches.
pub type Subscriber = mpsc::UnboundedSender<Arc<Envelope>>;

/// Subscribers of one room and the room's sequence counter.
#[derive(Debug)]
pub struct Broadcaster {
    room_id: RoomId,
    subscribers: Vec<(ConnectionId, Subscriber)>,
    last_seq: u64,
}

impl Broadcaster {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            subscribers: Vec::new(),
            last_seq: 0,
        }
    }

    /// Adds a subscriber, replacing any previous queue for the same
    /// connection.
    pub fn subscribe(&mut self, conn_id: ConnectionId, subscriber: Subscriber) {
        self.unsubscribe(conn_id);
        self.subscribers.push((conn_id, subscriber));
    }

    /// Returns `true` if the connection was subscribed.
    pub fn unsubscribe(&mut self, conn_id: ConnectionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != conn_id);
        self.subscribers.len() != before
    }

    /// Delivers `event` to every subscriber, in subscription order.
    ///
    /// Subscribers whose queue is closed are dropped. Returns how many
    /// subscribers received the event.
    pub fn broadcast(&mut self, event: ServerEvent) -> usize {
        let name = event.name();
        let envelope = Arc::new(self.stamp(event));
        let room_id = &self.room_id;
        self.subscribers.retain(|(conn_id, tx)| {
            let delivered = tx.send(Arc::clone(&envelope)).is_ok();
            if !delivered {
                tracing::debug!(%room_id, %conn_id, "dropping closed subscriber");
            }
            delivered
        });
        tracing::trace!(
            room_id = %self.room_id,
            seq = envelope.seq,
            event = name,
            recipients = self.subscribers.len(),
            "broadcast"
        );
        self.subscribers.len()
    }

    /// Delivers `event` to one subscriber only. Returns `false` if the
    /// connection isn't subscribed or its queue is closed.
    ///
    /// The event still consumes a sequence number, so every subscriber
    /// sees gaps where unicasts to others went out.
    pub fn unicast(&mut self, conn_id: ConnectionId, event: ServerEvent) -> bool {
        let Some(index) = self.subscribers.iter().position(|(id, _)| *id == conn_id) else {
            return false;
        };
        let envelope = Arc::new(self.stamp(event));
        if self.subscribers[index].1.send(envelope).is_ok() {
            return true;
        }
        tracing::debug!(room_id = %self.room_id, %conn_id, "dropping closed subscriber");
        self.subscribers.remove(index);
        false
    }

    fn stamp(&mut self, payload: ServerEvent) -> Envelope {
        self.last_seq += 1;
        Envelope {
            seq: self.last_seq,
            payload,
        }
    }

    /// Sequence number of the most recent event, 0 if none was sent.
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn contains(&self, conn_id: ConnectionId) -> bool {
        self.subscribers.iter().any(|(id, _)| *id == conn_id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
