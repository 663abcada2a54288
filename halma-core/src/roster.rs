//! Players seated in a game and the colors they play

use crate::board::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Game identifier (ordinal, assigned by the registry)
pub type GameId = u32;

/// Most players a game can seat
pub const MAX_PLAYERS: usize = 3;

/// Stable identity of a registered player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A player's seat in one game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePlayer {
    pub player: PlayerId,
    pub game: GameId,
    pub color: Color,
}

/// Seated players in join order.
///
/// Colors are handed out in turn order, so the seated colors are always
/// Red..=N with no gaps.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    game: GameId,
    players: Vec<GamePlayer>,
}

impl Roster {
    pub fn new(game: GameId) -> Self {
        Self {
            game,
            players: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Color the next player to join would get
    pub fn free_color(&self) -> Option<Color> {
        Color::from_ordinal(self.players.len() + 1)
    }

    /// Seat `player` with the next free color
    pub fn join(&mut self, player: PlayerId) -> Option<GamePlayer> {
        if self.is_full() {
            return None;
        }
        let color = self.free_color()?;
        let seat = GamePlayer {
            player,
            game: self.game,
            color,
        };
        self.players.push(seat);
        Some(seat)
    }

    pub fn get(&self, player: PlayerId) -> Option<&GamePlayer> {
        self.players.iter().find(|seat| seat.player == player)
    }

    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        self.get(player).map(|seat| seat.color)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GamePlayer> + '_ {
        self.players.iter()
    }

    /// Color whose turn follows `current`, wrapping after the last seat
    pub fn next_color(&self, current: Color) -> Color {
        let seated = self.players.len().max(1);
        Color::from_ordinal(current.ordinal() % seated + 1).unwrap_or(Color::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_follow_join_order() {
        let mut roster = Roster::new(7);
        assert_eq!(roster.free_color(), Some(Color::Red));

        let red = roster.join(PlayerId(10)).unwrap();
        assert_eq!(red.color, Color::Red);
        assert_eq!(red.game, 7);
        assert_eq!(roster.join(PlayerId(11)).unwrap().color, Color::Green);
        assert_eq!(roster.join(PlayerId(12)).unwrap().color, Color::Blue);
        assert_eq!(roster.free_color(), None);
        assert!(roster.is_full());
    }

    #[test]
    fn test_join_full_roster() {
        let mut roster = Roster::new(0);
        for id in 0..3 {
            roster.join(PlayerId(id));
        }
        assert!(roster.join(PlayerId(3)).is_none());
        assert_eq!(roster.len(), 3);
        assert!(roster.get(PlayerId(3)).is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        let mut roster = Roster::new(0);
        roster.join(PlayerId(5));
        roster.join(PlayerId(9));

        assert_eq!(roster.get(PlayerId(9)).map(|seat| seat.color), Some(Color::Green));
        assert_eq!(roster.color_of(PlayerId(5)), Some(Color::Red));
        assert_eq!(roster.color_of(PlayerId(1)), None);
    }

    #[test]
    fn test_next_color_wraps() {
        let mut roster = Roster::new(0);
        roster.join(PlayerId(0));
        assert_eq!(roster.next_color(Color::Red), Color::Red);

        roster.join(PlayerId(1));
        assert_eq!(roster.next_color(Color::Red), Color::Green);
        assert_eq!(roster.next_color(Color::Green), Color::Red);

        roster.join(PlayerId(2));
        assert_eq!(roster.next_color(Color::Green), Color::Blue);
        assert_eq!(roster.next_color(Color::Blue), Color::Red);
    }
}
