/// Position of an event in the dispatch order.
///
/// Ticks are handed out in arrival order, one per queued event, so they double
/// as a deterministic timebase that can be recorded and replayed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick {
    /// 0-based dispatch index.
    pub index: u64,
}

impl Tick {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::Tick;

    #[test]
    fn ticks_are_ordered() {
        let t0 = Tick::default();
        let t1 = t0.next();
        assert_eq!(t1.index, 1);
        assert!(t0 < t1);
    }
}
