//! Server state management
//!
//! Shared registries for players and games. Each game sits behind its own
//! lock: commands take it exclusively, queries copy what they need out of a
//! shared read.

use halma_core::{
    Color, FieldInfo, Game, GameError, GameId, GameInfo, GamePlayer, GameState, MoveError,
    ObserverId, PlayerId, Position,
};
use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::events::{event_queue, EventReceiver};
use crate::ServerConfig;

/// A game shared between request handlers
pub type SharedGame = Arc<RwLock<Game>>;

/// Receiving end of a watcher's queue, held while long-polling
pub type SharedReceiver = Arc<tokio::sync::Mutex<EventReceiver>>;

/// Errors from registry commands
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("player name must not be empty")]
    EmptyName,

    #[error("player name already taken: {0}")]
    NameTaken(String),

    #[error("invalid name or password")]
    BadCredentials,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown game {0}")]
    UnknownGame(GameId),

    #[error("unknown watcher {watcher} for game {game}")]
    UnknownWatcher { game: GameId, watcher: ObserverId },

    #[error("game {0} is full")]
    GameFull(GameId),

    #[error("player {player} is not seated in game {game}")]
    NotSeated { player: PlayerId, game: GameId },

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Move(#[from] MoveError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

// ============================================================================
// PLAYERS
// ============================================================================

/// A registered player
#[derive(Clone, Debug, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(skip_serializing)]
    password: String,
}

#[derive(Default)]
struct PlayerTable {
    players: Vec<Player>,
    by_name: FxHashMap<String, PlayerId>,
}

/// Registered players, ids handed out in registration order
#[derive(Default)]
pub struct PlayerRegistry {
    table: RwLock<PlayerTable>,
}

impl PlayerRegistry {
    pub fn register(&self, name: &str, password: &str) -> Result<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut table = self.table.write();
        if table.by_name.contains_key(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }

        let player = Player {
            id: PlayerId(table.players.len() as u64),
            name: name.to_string(),
            password: password.to_string(),
        };
        table.by_name.insert(player.name.clone(), player.id);
        table.players.push(player.clone());

        tracing::info!("Registered player {} ({})", player.name, player.id);
        Ok(player)
    }

    pub fn login(&self, name: &str, password: &str) -> Result<Player> {
        let table = self.table.read();
        table
            .by_name
            .get(name.trim())
            .and_then(|id| table.players.get(id.0 as usize))
            .filter(|player| player.password == password)
            .cloned()
            .ok_or(RegistryError::BadCredentials)
    }

    pub fn get(&self, id: PlayerId) -> Result<Player> {
        self.table
            .read()
            .players
            .get(id.0 as usize)
            .cloned()
            .ok_or(RegistryError::UnknownPlayer(id))
    }

    pub fn len(&self) -> usize {
        self.table.read().players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// GAMES
// ============================================================================

/// All games of this server, ids handed out in creation order
#[derive(Default)]
pub struct GameRegistry {
    games: RwLock<Vec<SharedGame>>,
}

impl GameRegistry {
    pub fn create(&self) -> SharedGame {
        let mut games = self.games.write();
        let game = Arc::new(RwLock::new(Game::new(games.len() as GameId)));
        games.push(game.clone());
        game
    }

    pub fn get(&self, id: GameId) -> Result<SharedGame> {
        self.games
            .read()
            .get(id as usize)
            .cloned()
            .ok_or(RegistryError::UnknownGame(id))
    }

    pub fn list(&self) -> Vec<SharedGame> {
        self.games.read().clone()
    }

    pub fn len(&self) -> usize {
        self.games.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// SERVER STATE
// ============================================================================

/// Server-wide shared state
pub struct ServerState {
    pub players: PlayerRegistry,
    pub games: GameRegistry,
    watchers: RwLock<FxHashMap<(GameId, ObserverId), SharedReceiver>>,
    rng: Mutex<ChaCha8Rng>,
    event_capacity: usize,
    poll_timeout: Duration,
}

impl ServerState {
    pub fn new() -> Self {
        Self::with_config(&ServerConfig::default())
    }

    pub fn with_config(config: &ServerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            players: PlayerRegistry::default(),
            games: GameRegistry::default(),
            watchers: RwLock::new(FxHashMap::default()),
            rng: Mutex::new(rng),
            event_capacity: config.event_capacity,
            poll_timeout: Duration::from_millis(config.poll_timeout_ms),
        }
    }

    /// How long an event poll waits for something to happen
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// Create a game and seat its creator as the first color
    pub fn create_game(&self, creator: PlayerId) -> Result<GameInfo> {
        self.players.get(creator)?;

        let game = self.games.create();
        let mut game = game.write();
        game.join(creator);

        tracing::info!("Player {} created game {}", creator, game.id());
        Ok(game.info(Some(creator)))
    }

    /// Every game, with `player`'s color filled in where seated
    pub fn list_games(&self, player: Option<PlayerId>) -> Vec<GameInfo> {
        self.games
            .list()
            .iter()
            .map(|game| game.read().info(player))
            .collect()
    }

    pub fn game_info(&self, id: GameId, player: Option<PlayerId>) -> Result<GameInfo> {
        Ok(self.games.get(id)?.read().info(player))
    }

    pub fn fields(&self, id: GameId) -> Result<Vec<FieldInfo>> {
        Ok(self.games.get(id)?.read().fields())
    }

    pub fn current_turn(&self, id: GameId) -> Result<Option<Color>> {
        Ok(self.games.get(id)?.read().current_turn())
    }

    /// Seat `player` while the game has not started. Joining twice returns
    /// the existing seat.
    pub fn join_game(&self, id: GameId, player: PlayerId) -> Result<GamePlayer> {
        self.players.get(player)?;
        let game = self.games.get(id)?;
        let mut game = game.write();

        if let Some(seat) = game.get_player(player) {
            return Ok(*seat);
        }
        if game.state() != GameState::New {
            return Err(GameError::AlreadyStarted.into());
        }
        game.join(player).ok_or(RegistryError::GameFull(id))
    }

    /// Start a game on behalf of one of its seated players
    pub fn start_game(&self, id: GameId, player: PlayerId) -> Result<GameInfo> {
        let game = self.games.get(id)?;
        let mut game = game.write();
        if game.get_player(player).is_none() {
            return Err(RegistryError::NotSeated { player, game: id });
        }

        let mut rng = self.rng.lock();
        game.start(&mut *rng)?;
        Ok(game.info(Some(player)))
    }

    /// Move one of `player`'s pins; returns the color to move next.
    ///
    /// Watchers the game dropped during the move lose their queues here.
    pub fn move_piece(
        &self,
        id: GameId,
        player: PlayerId,
        from: Position,
        to: Position,
    ) -> Result<Option<Color>> {
        let game = self.games.get(id)?;
        let (next, dropped) = {
            let mut game = game.write();
            let color = game
                .player_color(player)
                .ok_or(RegistryError::NotSeated { player, game: id })?;
            let next = game.move_piece(color, from, to)?;
            (next, game.take_dropped_observers())
        };

        for watcher in dropped {
            self.forget_watcher(id, watcher);
        }
        Ok(next)
    }

    /// Fields reachable from `from` in the current position
    pub fn destinations(&self, id: GameId, from: Position) -> Result<Vec<Position>> {
        Ok(self.games.get(id)?.read().possible_destinations(from))
    }

    /// Register a new watcher on a game
    pub fn watch(&self, id: GameId) -> Result<ObserverId> {
        let game = self.games.get(id)?;
        let (observer, receiver) = event_queue(self.event_capacity);
        let watcher = game.write().add_observer(Box::new(observer));

        self.watchers
            .write()
            .insert((id, watcher), Arc::new(tokio::sync::Mutex::new(receiver)));
        tracing::debug!("Watcher {} added to game {}", watcher, id);
        Ok(watcher)
    }

    pub fn watcher(&self, id: GameId, watcher: ObserverId) -> Result<SharedReceiver> {
        self.watchers
            .read()
            .get(&(id, watcher))
            .cloned()
            .ok_or(RegistryError::UnknownWatcher { game: id, watcher })
    }

    /// Remove a watcher; returns false if the game had already dropped it
    pub fn unwatch(&self, id: GameId, watcher: ObserverId) -> Result<bool> {
        let game = self.games.get(id)?;
        let removed = game.write().remove_observer(watcher);
        self.forget_watcher(id, watcher);
        Ok(removed)
    }

    /// Drop the receiving end of a watcher whose queue has closed
    pub fn forget_watcher(&self, id: GameId, watcher: ObserverId) {
        if self.watchers.write().remove(&(id, watcher)).is_some() {
            tracing::debug!("Watcher {} of game {} forgotten", watcher, id);
        }
    }

    /// Receiving ends still held for polling
    pub fn watcher_count(&self) -> usize {
        self.watchers.read().len()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halma_core::GameEvent;

    fn seeded_state(event_capacity: usize) -> ServerState {
        ServerState::with_config(&ServerConfig {
            seed: Some(7),
            event_capacity,
            ..ServerConfig::default()
        })
    }

    /// Two registered players seated in game 0
    fn two_player_game(state: &ServerState) -> (PlayerId, PlayerId) {
        let alice = state.players.register("alice", "a").unwrap().id;
        let bob = state.players.register("bob", "b").unwrap().id;
        state.create_game(alice).unwrap();
        state.join_game(0, bob).unwrap();
        (alice, bob)
    }

    /// Seat and a legal move for whoever is to move in game `id`
    fn next_move(state: &ServerState, id: GameId) -> (PlayerId, Position, Position) {
        let game = state.games.get(id).unwrap();
        let game = game.read();
        let color = game.current_turn().unwrap();
        let seat = game.roster().iter().find(|seat| seat.color == color).unwrap();
        let (from, to) = game.legal_moves(color)[0];
        (seat.player, from, to)
    }

    #[test]
    fn test_register_and_login() {
        let state = ServerState::new();
        let player = state.players.register("alice", "secret").unwrap();
        assert_eq!(player.id, PlayerId(0));

        assert!(matches!(
            state.players.register("alice", "other"),
            Err(RegistryError::NameTaken(_))
        ));
        assert!(matches!(
            state.players.register("  ", "x"),
            Err(RegistryError::EmptyName)
        ));
        assert_eq!(state.players.login("alice", "secret").unwrap().id, player.id);
        assert!(matches!(
            state.players.login("alice", "wrong"),
            Err(RegistryError::BadCredentials)
        ));
        assert!(matches!(
            state.players.login("carol", "secret"),
            Err(RegistryError::BadCredentials)
        ));
    }

    #[test]
    fn test_create_seats_creator() {
        let state = ServerState::new();
        let alice = state.players.register("alice", "a").unwrap().id;
        let info = state.create_game(alice).unwrap();
        assert_eq!(info.id, 0);
        assert_eq!(info.player_color, Some(Color::Red));
        assert_eq!(info.state, GameState::New);

        assert!(matches!(
            state.create_game(PlayerId(42)),
            Err(RegistryError::UnknownPlayer(_))
        ));
        assert_eq!(state.games.len(), 1);
    }

    #[test]
    fn test_join_rules() {
        let state = seeded_state(8);
        let (alice, bob) = two_player_game(&state);

        // Rejoining keeps the same seat
        assert_eq!(state.join_game(0, alice).unwrap().color, Color::Red);
        assert_eq!(state.join_game(0, bob).unwrap().color, Color::Green);

        let carol = state.players.register("carol", "c").unwrap().id;
        let dave = state.players.register("dave", "d").unwrap().id;
        assert_eq!(state.join_game(0, carol).unwrap().color, Color::Blue);
        assert!(matches!(state.join_game(0, dave), Err(RegistryError::GameFull(0))));
        assert!(matches!(state.join_game(3, dave), Err(RegistryError::UnknownGame(3))));
    }

    #[test]
    fn test_join_after_start_rejected() {
        let state = seeded_state(8);
        let (alice, _) = two_player_game(&state);
        state.start_game(0, alice).unwrap();

        let carol = state.players.register("carol", "c").unwrap().id;
        assert!(matches!(
            state.join_game(0, carol),
            Err(RegistryError::Game(GameError::AlreadyStarted))
        ));
    }

    #[test]
    fn test_start_requires_seat() {
        let state = seeded_state(8);
        two_player_game(&state);
        let carol = state.players.register("carol", "c").unwrap().id;
        assert!(matches!(
            state.start_game(0, carol),
            Err(RegistryError::NotSeated { .. })
        ));
    }

    #[test]
    fn test_list_games_per_player() {
        let state = seeded_state(8);
        let (alice, bob) = two_player_game(&state);
        state.create_game(bob).unwrap();

        let games = state.list_games(Some(alice));
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].player_color, Some(Color::Red));
        assert_eq!(games[1].player_color, None);
        assert_eq!(state.list_games(Some(bob))[1].player_color, Some(Color::Red));
    }

    #[test]
    fn test_move_through_registry() {
        let state = seeded_state(8);
        let (alice, _) = two_player_game(&state);
        state.start_game(0, alice).unwrap();

        let before = state.current_turn(0).unwrap();
        let (player, from, to) = next_move(&state, 0);
        let next = state.move_piece(0, player, from, to).unwrap();
        assert_ne!(next, before);
        assert_eq!(state.current_turn(0).unwrap(), next);

        // Repeating the same move is now illegal
        assert!(matches!(
            state.move_piece(0, player, from, to),
            Err(RegistryError::Move(_))
        ));

        let stranger = PlayerId(99);
        assert!(matches!(
            state.move_piece(0, stranger, from, to),
            Err(RegistryError::NotSeated { .. })
        ));
    }

    #[test]
    fn test_watcher_receives_events() {
        let state = seeded_state(8);
        let (alice, _) = two_player_game(&state);
        state.start_game(0, alice).unwrap();
        let watcher = state.watch(0).unwrap();

        let (player, from, to) = next_move(&state, 0);
        let next = state.move_piece(0, player, from, to).unwrap();

        let receiver = state.watcher(0, watcher).unwrap();
        let mut receiver = receiver.try_lock().unwrap();
        assert!(matches!(receiver.try_recv(), Ok(GameEvent::Move { .. })));
        assert_eq!(receiver.try_recv().unwrap(), GameEvent::Turn { current: next });
    }

    #[test]
    fn test_full_watcher_is_dropped() {
        let state = seeded_state(2);
        let (alice, _) = two_player_game(&state);
        state.start_game(0, alice).unwrap();
        let watcher = state.watch(0).unwrap();

        for _ in 0..2 {
            let (player, from, to) = next_move(&state, 0);
            state.move_piece(0, player, from, to).unwrap();
        }

        let game = state.games.get(0).unwrap();
        assert_eq!(game.read().observer_count(), 0);
        assert_eq!(state.watcher_count(), 0);
        assert!(!state.unwatch(0, watcher).unwrap());
        assert!(matches!(
            state.watcher(0, watcher),
            Err(RegistryError::UnknownWatcher { .. })
        ));
    }

    #[test]
    fn test_overflowed_watchers_released_without_poll() {
        let state = seeded_state(1);
        let (alice, _) = two_player_game(&state);
        state.start_game(0, alice).unwrap();
        for _ in 0..100 {
            state.watch(0).unwrap();
        }
        assert_eq!(state.watcher_count(), 100);

        let (player, from, to) = next_move(&state, 0);
        state.move_piece(0, player, from, to).unwrap();

        let game = state.games.get(0).unwrap();
        assert_eq!(game.read().observer_count(), 0);
        assert_eq!(state.watcher_count(), 0);
    }

    #[test]
    fn test_healthy_watchers_kept_after_move() {
        let state = seeded_state(8);
        let (alice, _) = two_player_game(&state);
        state.start_game(0, alice).unwrap();
        let watcher = state.watch(0).unwrap();

        let (player, from, to) = next_move(&state, 0);
        state.move_piece(0, player, from, to).unwrap();

        assert_eq!(state.watcher_count(), 1);
        assert!(state.watcher(0, watcher).is_ok());
    }

    #[test]
    fn test_unwatch() {
        let state = seeded_state(8);
        let (alice, _) = two_player_game(&state);
        let watcher = state.watch(0).unwrap();
        assert!(state.unwatch(0, watcher).unwrap());
        let game = state.games.get(0).unwrap();
        assert_eq!(game.read().observer_count(), 0);
        assert!(state.game_info(0, Some(alice)).is_ok());
    }
}
