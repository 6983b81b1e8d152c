use crate::event::Key;
use serde::{Deserialize, Serialize};

/// Camera-relative movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Upward,
    Downward,
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Upward,
        Direction::Downward,
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];
}

/// Directional key bindings. Several keys may drive the same direction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyBindings {
    pub upward: Vec<Key>,
    pub downward: Vec<Key>,
    pub forward: Vec<Key>,
    pub back: Vec<Key>,
    pub left: Vec<Key>,
    pub right: Vec<Key>,
}

impl KeyBindings {
    /// Two vertical keys (E up, Q down) plus WASD.
    pub fn wasd() -> Self {
        let mut bindings = Self::default();
        bindings.bind(Direction::Upward, Key::KeyE);
        bindings.bind(Direction::Downward, Key::KeyQ);
        bindings.bind(Direction::Forward, Key::KeyW);
        bindings.bind(Direction::Back, Key::KeyS);
        bindings.bind(Direction::Left, Key::KeyA);
        bindings.bind(Direction::Right, Key::KeyD);
        bindings
    }

    /// Add `key` to the keys driving `direction`. Duplicates are ignored.
    pub fn bind(&mut self, direction: Direction, key: Key) {
        let keys = self.keys_mut(direction);
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    pub fn keys(&self, direction: Direction) -> &[Key] {
        match direction {
            Direction::Upward => &self.upward,
            Direction::Downward => &self.downward,
            Direction::Forward => &self.forward,
            Direction::Back => &self.back,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    fn keys_mut(&mut self, direction: Direction) -> &mut Vec<Key> {
        match direction {
            Direction::Upward => &mut self.upward,
            Direction::Downward => &mut self.downward,
            Direction::Forward => &mut self.forward,
            Direction::Back => &mut self.back,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Directions bound to `key`.
    pub fn directions_for(&self, key: Key) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |d| self.keys(*d).contains(&key))
    }

    /// Whether `key` drives any direction.
    pub fn is_bound(&self, key: Key) -> bool {
        self.directions_for(key).next().is_some()
    }

    /// Total number of bound keys across all directions.
    pub fn len(&self) -> usize {
        Direction::ALL.iter().map(|d| self.keys(*d).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_binds_six_keys() {
        let b = KeyBindings::wasd();
        assert_eq!(b.len(), 6);
        assert_eq!(b.keys(Direction::Upward), &[Key::KeyE]);
        assert_eq!(b.keys(Direction::Downward), &[Key::KeyQ]);
        assert_eq!(b.keys(Direction::Forward), &[Key::KeyW]);
        assert_eq!(b.keys(Direction::Back), &[Key::KeyS]);
        assert_eq!(b.keys(Direction::Left), &[Key::KeyA]);
        assert_eq!(b.keys(Direction::Right), &[Key::KeyD]);
    }

    #[test]
    fn bind_ignores_duplicates() {
        let mut b = KeyBindings::wasd();
        b.bind(Direction::Forward, Key::KeyW);
        assert_eq!(b.len(), 6);
    }

    #[test]
    fn shift_is_not_directional() {
        let b = KeyBindings::wasd();
        assert!(!b.is_bound(Key::ShiftLeft));
        assert!(b.is_bound(Key::KeyA));
        assert_eq!(b.directions_for(Key::KeyA).collect::<Vec<_>>(), vec![Direction::Left]);
    }

    #[test]
    fn default_is_empty() {
        assert!(KeyBindings::default().is_empty());
    }
}
