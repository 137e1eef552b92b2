//! Room registry: creates, tracks, and routes actions to rooms.
//!
//! The map lock is only held long enough to look up or insert a handle.
//! The actual work happens in the room's own actor, so actions on
//! different rooms never wait on each other.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use neologisms_protocol::{GameView, RoomId, SessionId, Square, Username};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::RwLock;

use crate::hub::UpdateSender;
use crate::room::spawn_room;
use crate::{Room, RoomConfig, RoomError, RoomHandle, RoomSettings, grid};

/// Longest accepted room id, in characters.
pub const MAX_ROOM_ID_LEN: usize = 64;

/// Parses a client-supplied room id.
///
/// Surrounding whitespace is trimmed. The result must be non-empty, at
/// most [`MAX_ROOM_ID_LEN`] characters, and free of inner whitespace and
/// control characters.
pub fn parse_room_id(raw: &str) -> Result<RoomId, RoomError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(RoomError::Validation("Missing id".into()));
    }
    if id.chars().count() > MAX_ROOM_ID_LEN
        || id.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(RoomError::Validation("Invalid id".into()));
    }
    Ok(RoomId::new(id))
}

/// All live rooms, keyed by id.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room and spawns its actor.
    ///
    /// Without an id, one is generated (`word-word-xx`), retrying until
    /// it is unused. A taken id fails with [`RoomError::AlreadyExists`].
    pub async fn create(
        &self,
        id: Option<RoomId>,
        timer_secs: u32,
    ) -> Result<RoomHandle, RoomError> {
        if timer_secs > self.config.max_timer_secs {
            return Err(RoomError::Validation(format!(
                "Timer must be at most {} seconds",
                self.config.max_timer_secs
            )));
        }

        let mut rooms = self.rooms.write().await;
        let id = match id {
            Some(id) if rooms.contains_key(&id) => return Err(RoomError::AlreadyExists(id)),
            Some(id) => id,
            None => loop {
                let candidate = grid::random_room_id(&mut rand::rng());
                if !rooms.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        let handle = self.spawn(id.clone(), timer_secs);
        rooms.insert(id.clone(), handle.clone());
        tracing::info!(room_id = %id, timer_secs, rooms = rooms.len(), "room created");
        Ok(handle)
    }

    /// Returns the room with this id, creating an untimed one if needed.
    pub async fn get_or_create(&self, id: RoomId) -> RoomHandle {
        if let Some(handle) = self.rooms.read().await.get(&id) {
            return handle.clone();
        }

        let mut rooms = self.rooms.write().await;
        if let Some(handle) = rooms.get(&id) {
            return handle.clone();
        }
        let handle = self.spawn(id.clone(), 0);
        rooms.insert(id.clone(), handle.clone());
        tracing::info!(room_id = %id, rooms = rooms.len(), "room created on first use");
        handle
    }

    /// Looks up a room.
    pub async fn get(&self, id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(id.clone()))
    }

    /// Runs `f` against a room with exclusive access to it. Calls for
    /// other rooms proceed in parallel.
    pub async fn with_room<T, F>(&self, id: &RoomId, f: F) -> Result<T, RoomError>
    where
        F: FnOnce(&mut Room) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.get(id).await?.with_room(f).await
    }

    pub async fn snapshot(&self, id: &RoomId) -> Result<GameView, RoomError> {
        self.get(id).await?.snapshot().await
    }

    pub async fn draw(&self, id: &RoomId, player: Username) -> Result<GameView, RoomError> {
        self.get(id).await?.draw(player).await
    }

    pub async fn give_clue(
        &self,
        id: &RoomId,
        player: Username,
        text: String,
    ) -> Result<GameView, RoomError> {
        self.get(id).await?.give_clue(player, text).await
    }

    pub async fn guess(
        &self,
        id: &RoomId,
        player: Username,
        square: Square,
    ) -> Result<(GameView, bool), RoomError> {
        self.get(id).await?.guess(player, square).await
    }

    pub async fn refresh(&self, id: &RoomId) -> Result<GameView, RoomError> {
        self.get(id).await?.refresh().await
    }

    pub async fn subscribe(
        &self,
        id: &RoomId,
        session: SessionId,
        sender: UpdateSender,
    ) -> Result<(), RoomError> {
        self.get(id).await?.subscribe(session, sender).await
    }

    /// Unsubscribes a session. Unknown rooms count as "not subscribed".
    pub async fn unsubscribe(&self, id: &RoomId, session: SessionId) -> Result<bool, RoomError> {
        match self.get(id).await {
            Ok(handle) => handle.unsubscribe(session).await,
            Err(RoomError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Number of live rooms.
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// Ids of all live rooms, in no particular order.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.read().await.keys().cloned().collect()
    }

    fn spawn(&self, id: RoomId, timer_secs: u32) -> RoomHandle {
        let settings = RoomSettings::new(timer_secs)
            .with_finish_when_exhausted(self.config.finish_when_exhausted);
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(room_seed(seed, &id)),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let room = Room::generate(id, settings, &mut rng);
        spawn_room(room, &self.config, rng)
    }
}

/// Mixes the configured seed with the room id, so each room gets its own
/// board while a given id stays reproducible.
fn room_seed(seed: u64, id: &RoomId) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    id.as_str().hash(&mut hasher);
    hasher.finish()
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_room_id_trims() {
        assert_eq!(parse_room_id("  R1 ").unwrap().as_str(), "R1");
    }

    #[test]
    fn test_parse_room_id_rejects_bad_ids() {
        for raw in ["", "   ", "a b", "tab\there", "bell\u{7}"] {
            let err = parse_room_id(raw).unwrap_err();
            assert_eq!(err.code(), 400, "{raw:?}");
        }
        assert_eq!(parse_room_id("").unwrap_err().to_string(), "Missing id");
        assert!(parse_room_id(&"x".repeat(MAX_ROOM_ID_LEN)).is_ok());
        assert!(parse_room_id(&"x".repeat(MAX_ROOM_ID_LEN + 1)).is_err());
    }

    #[tokio::test]
    async fn test_seeded_rooms_get_their_own_boards() {
        let registry = RoomRegistry::new(RoomConfig::default().with_seed(7));
        let a = registry.create(Some(RoomId::new("R1")), 0).await.unwrap();
        let b = registry.create(Some(RoomId::new("R2")), 0).await.unwrap();
        let a = a.snapshot().await.unwrap();
        let b = b.snapshot().await.unwrap();
        assert_ne!((a.words, a.deck), (b.words, b.deck));
    }

    #[tokio::test]
    async fn test_seeded_room_is_reproducible() {
        let first = RoomRegistry::new(RoomConfig::default().with_seed(7));
        let second = RoomRegistry::new(RoomConfig::default().with_seed(7));
        let a = first.create(Some(RoomId::new("R1")), 0).await.unwrap();
        let b = second.create(Some(RoomId::new("R1")), 0).await.unwrap();
        assert_eq!(a.snapshot().await.unwrap(), b.snapshot().await.unwrap());
    }

    #[test]
    fn test_room_seed_depends_on_seed_and_id() {
        let r1 = RoomId::new("R1");
        assert_eq!(room_seed(7, &r1), room_seed(7, &r1));
        assert_ne!(room_seed(7, &r1), room_seed(8, &r1));
        assert_ne!(room_seed(7, &r1), room_seed(7, &RoomId::new("R2")));
    }
}
