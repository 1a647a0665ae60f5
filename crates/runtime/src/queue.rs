//! FIFO queue of host events.
//!
//! Key properties:
//! - Events are delivered strictly in arrival order.
//! - Every accepted event is stamped with the next [`Tick`].
//! - Optional backpressure via a deterministic maximum pending length.

use std::collections::VecDeque;

use crate::tick::Tick;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QueueFull {
    pub max_len: usize,
}

impl std::fmt::Display for QueueFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event queue full (max_len={})", self.max_len)
    }
}

impl std::error::Error for QueueFull {}

#[derive(Debug)]
pub struct EventQueue<E> {
    next_tick: Tick,
    pending: VecDeque<(Tick, E)>,
    max_len: Option<usize>,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            next_tick: Tick::default(),
            pending: VecDeque::new(),
            max_len: None,
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Tick the next accepted event will carry.
    pub fn next_tick(&self) -> Tick {
        self.next_tick
    }

    pub fn push(&mut self, event: E) -> Result<Tick, QueueFull> {
        if let Some(max_len) = self.max_len {
            if self.pending.len() >= max_len {
                return Err(QueueFull { max_len });
            }
        }
        let tick = self.next_tick;
        self.next_tick = tick.next();
        self.pending.push_back((tick, event));
        Ok(tick)
    }

    pub fn pop(&mut self) -> Option<(Tick, E)> {
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventQueue, QueueFull};
    use crate::tick::Tick;

    #[test]
    fn delivers_in_arrival_order() {
        let mut q = EventQueue::new();
        q.push("zoom").unwrap();
        q.push("click").unwrap();
        q.push("zoom").unwrap();

        let got: Vec<_> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(
            got,
            vec![
                (Tick::new(0), "zoom"),
                (Tick::new(1), "click"),
                (Tick::new(2), "zoom")
            ]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn ticks_keep_counting_after_pop() {
        let mut q = EventQueue::new();
        q.push(1).unwrap();
        q.pop();
        assert_eq!(q.push(2).unwrap(), Tick::new(1));
    }

    #[test]
    fn rejects_when_full() {
        let mut q = EventQueue::with_max_len(1);
        q.push(1).unwrap();
        assert_eq!(q.push(2), Err(QueueFull { max_len: 1 }));
        assert_eq!(q.len(), 1);
    }
}
