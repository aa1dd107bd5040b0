/// Gate that lets an evaluation cycle through once every `interval` host ticks.
///
/// The host calls [`UpdateGate::tick`] on every update; only every
/// `interval`-th call returns `true`.
///
/// # Examples
///
/// ```
/// use power_monitor::monitor::clock::UpdateGate;
///
/// let mut gate = UpdateGate::new(3);
/// let fired: Vec<bool> = (0..6).map(|_| gate.tick()).collect();
/// assert_eq!(fired, vec![false, false, true, false, false, true]);
/// ```
#[derive(Debug, Clone)]
pub struct UpdateGate {
    /// Ticks seen since the last cycle
    counter: u32,
    /// Ticks between two cycles
    interval: u32,
}

impl UpdateGate {
    /// Creates a gate; an interval of 0 behaves like 1.
    pub fn new(interval: u32) -> Self {
        Self {
            counter: 0,
            interval: interval.max(1),
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Counts one host tick.
    ///
    /// # Returns
    ///
    /// * `true` - A cycle is due; the counter restarts
    /// * `false` - Still waiting
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter < self.interval {
            return false;
        }
        self.counter = 0;
        true
    }

    /// Counts host ticks until the next cycle is due, returning how many were
    /// consumed.
    pub fn wait(&mut self) -> u32 {
        let mut ticks = 1;
        while !self.tick() {
            ticks += 1;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gate() {
        let gate = UpdateGate::new(60);
        assert_eq!(gate.counter, 0);
        assert_eq!(gate.interval(), 60);
    }

    #[test]
    fn test_fires_every_interval() {
        let mut gate = UpdateGate::new(60);
        let fired = (0..180).filter(|_| gate.tick()).count();
        assert_eq!(fired, 3);
    }

    #[test]
    fn test_zero_interval_fires_every_tick() {
        let mut gate = UpdateGate::new(0);
        assert!(gate.tick());
        assert!(gate.tick());
    }

    #[test]
    fn test_wait_consumes_full_interval() {
        let mut gate = UpdateGate::new(4);
        assert!(!gate.tick());
        assert_eq!(gate.wait(), 3);
        assert_eq!(gate.wait(), 4);
    }
}
