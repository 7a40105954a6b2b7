//! Room registry: creates rooms on first join and routes members to them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use typerace_protocol::{ConnectionId, Role, RoomId, RoomSnapshot};

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle, SentenceProvider, Subscriber};

/// Every live room, keyed by name.
///
/// Rooms are created implicitly by the first join and evicted when they
/// empty out (see [`RoomConfig::empty_room_ttl`]). A later join for the
/// same name starts a fresh room.
///
/// Rooms share nothing: each one is its own actor, and the registry only
/// holds their handles. The map lock is held for lookups and inserts
/// only; waiting on a room actor always happens after it is released, so
/// a busy room never delays joins to another one.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, RoomHandle>>,
    config: RoomConfig,
    sentences: Arc<dyn SentenceProvider>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig, sentences: Arc<dyn SentenceProvider>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
            sentences,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    // Every critical section is a single map operation, so a poisoned
    // lock still guards a consistent map.
    fn rooms(&self) -> MutexGuard<'_, HashMap<RoomId, RoomHandle>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the live handle for `room_id`, creating the room if it
    /// doesn't exist or its actor has stopped.
    fn live_or_spawn(&self, room_id: &RoomId) -> RoomHandle {
        let mut rooms = self.rooms();
        if let Some(handle) = rooms.get(room_id).filter(|h| !h.is_closed()) {
            return handle.clone();
        }
        let handle = spawn_room(room_id.clone(), self.config.clone(), Arc::clone(&self.sentences));
        rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, "room created");
        handle
    }

    /// Drops `room_id` from the map if it still points at `handle`. A
    /// newer room under the same name is left alone.
    fn forget(&self, room_id: &RoomId, handle: &RoomHandle) -> bool {
        let mut rooms = self.rooms();
        if rooms.get(room_id).is_some_and(|current| current.same_room(handle)) {
            rooms.remove(room_id);
            return true;
        }
        false
    }

    /// Adds a member to a room, creating the room if needed, and returns
    /// the room's handle for later actions.
    ///
    /// A room may stop between the lookup and the join (its empty-room
    /// TTL expired). The join is then retried once on a fresh room.
    ///
    /// # Errors
    /// Whatever the room rejects the join with: `DuplicateNickname`,
    /// `RoomFull` or `InvalidState`.
    pub async fn join(
        &self,
        room_id: &RoomId,
        conn_id: ConnectionId,
        nickname: &str,
        role: Role,
        subscriber: Subscriber,
    ) -> Result<RoomHandle, RoomError> {
        self.prune_closed();
        let handle = self.live_or_spawn(room_id);
        match handle
            .join(conn_id, nickname.to_string(), role, subscriber.clone())
            .await
        {
            Ok(()) => Ok(handle),
            Err(RoomError::Unavailable(_)) => {
                tracing::debug!(%room_id, "room stopped during join, recreating");
                let handle = self.live_or_spawn(room_id);
                handle
                    .join(conn_id, nickname.to_string(), role, subscriber)
                    .await?;
                Ok(handle)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes a member from a room. The room is dropped from the
    /// registry once its actor stops.
    ///
    /// Leaving a room that no longer exists is not an error: there is
    /// nobody left to notify.
    pub async fn leave(
        &self,
        room_id: &RoomId,
        conn_id: ConnectionId,
        nickname: &str,
    ) -> Result<usize, RoomError> {
        self.prune_closed();
        let Some(handle) = self.handle(room_id) else {
            return Ok(0);
        };
        match handle.leave(conn_id, nickname.to_string()).await {
            Ok(remaining) => {
                if remaining == 0
                    && self.config.empty_room_ttl.is_zero()
                    && self.forget(room_id, &handle)
                {
                    tracing::info!(%room_id, "room evicted");
                }
                Ok(remaining)
            }
            Err(RoomError::Unavailable(_)) => {
                self.forget(room_id, &handle);
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns a handle to a live room.
    pub fn handle(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms()
            .get(room_id)
            .filter(|h| !h.is_closed())
            .cloned()
    }

    /// Snapshot of one room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room isn't live.
    pub async fn room_info(&self, room_id: &RoomId) -> Result<RoomSnapshot, RoomError> {
        let handle = self
            .handle(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.snapshot().await
    }

    /// Snapshots of every live room. Rooms that stop while being asked
    /// are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomSnapshot> {
        let handles: Vec<RoomHandle> = self.rooms().values().cloned().collect();
        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(info) = handle.snapshot().await {
                infos.push(info);
            }
        }
        infos
    }

    /// Stops a room and forgets it. Its members are not notified.
    pub async fn destroy_room(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms()
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Forgets rooms whose actor has stopped. Returns how many were
    /// removed.
    pub fn prune_closed(&self) -> usize {
        let mut rooms = self.rooms();
        let before = rooms.len();
        rooms.retain(|_, handle| !handle.is_closed());
        before - rooms.len()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms().values().filter(|h| !h.is_closed()).count()
    }

    /// Number of entries in the map, stopped rooms included until they
    /// are pruned.
    pub fn tracked_rooms(&self) -> usize {
        self.rooms().len()
    }

    /// Names of the live rooms, in no particular order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms()
            .iter()
            .filter(|(_, h)| !h.is_closed())
            .map(|(id, _)| id.clone())
            .collect()
    }
}
