//! Score state: current score, persisted high score and stolen-food count.

use crate::storage::ScoreStore;

pub struct ScoreBoard {
    current: u32,
    high: u32,
    stolen: u32,
    store: Box<dyn ScoreStore>,
}

impl ScoreBoard {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        let high = store.load_high_score();
        Self { current: 0, high, stolen: 0, store }
    }

    /// Add points; returns `true` when this set a new high score (which is
    /// persisted immediately).
    pub fn add_points(&mut self, points: u32) -> bool {
        self.current = self.current.saturating_add(points);
        if self.current > self.high {
            self.high = self.current;
            self.store.save_high_score(self.high);
            return true;
        }
        false
    }

    pub fn increment_stolen(&mut self) {
        self.stolen += 1;
    }

    /// Zero the run counters. The high score survives.
    pub fn reset(&mut self) {
        self.current = 0;
        self.stolen = 0;
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    pub fn stolen(&self) -> u32 {
        self.stolen
    }
}

impl std::fmt::Debug for ScoreBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreBoard")
            .field("current", &self.current)
            .field("high", &self.high)
            .field("stolen", &self.stolen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{HIGH_SCORE_KEY, KeyValueStore, MemoryStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shares one in-memory backend between a board and the test.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, crate::error::StorageError> {
            self.0.borrow().get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), crate::error::StorageError> {
            self.0.borrow_mut().set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), crate::error::StorageError> {
            self.0.borrow_mut().remove(key)
        }
    }

    #[test]
    fn high_score_tracks_and_persists() {
        let shared = SharedStore::default();
        let mut board = ScoreBoard::new(Box::new(shared.clone()));
        assert!(board.add_points(10));
        assert!(board.add_points(25));
        assert_eq!(board.current(), 35);
        assert_eq!(board.high(), 35);
        assert_eq!(shared.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("35"));
    }

    #[test]
    fn reset_keeps_high_score_and_it_never_decreases() {
        let shared = SharedStore::default();
        let mut board = ScoreBoard::new(Box::new(shared.clone()));
        board.add_points(50);
        board.increment_stolen();
        board.reset();
        assert_eq!(board.current(), 0);
        assert_eq!(board.stolen(), 0);
        assert_eq!(board.high(), 50);
        assert!(!board.add_points(20));
        assert_eq!(board.high(), 50);

        // A fresh session sees the persisted value.
        let next = ScoreBoard::new(Box::new(shared));
        assert_eq!(next.high(), 50);
    }

    #[test]
    fn stolen_count_does_not_touch_score() {
        let mut board = ScoreBoard::new(Box::new(MemoryStore::new()));
        board.add_points(10);
        board.increment_stolen();
        board.increment_stolen();
        assert_eq!(board.stolen(), 2);
        assert_eq!(board.current(), 10);
    }
}
