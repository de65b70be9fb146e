use std::time::Duration;

/// Running per-stage timings. Stage `i` accumulates every duration pushed
/// under index `i`; `n` counts completed calls.
#[derive(Debug, Default)]
pub struct TimeCalc {
    n: usize,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn avg(&self) -> Duration {
        if self.n == 0 {
            return Duration::ZERO;
        }
        self.total() / self.n as u32
    }

    pub fn avg_i(&self, i: usize) -> Duration {
        match self.duration.get(i) {
            Some(d) if self.n > 0 => *d / self.n as u32,
            _ => Duration::ZERO,
        }
    }

    pub fn add_i(&mut self, i: usize, x: Duration) {
        if i >= self.duration.len() {
            self.duration.resize(i + 1, Duration::ZERO);
        }
        self.duration[i] += x;
    }

    /// Marks the end of one call.
    pub fn tick(&mut self) {
        self.n += 1;
    }

    pub fn clear(&mut self) {
        self.n = Default::default();
        self.duration = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_per_stage() {
        let mut t = TimeCalc::default();
        assert_eq!(t.avg(), Duration::ZERO);

        t.add_i(0, Duration::from_millis(2));
        t.add_i(1, Duration::from_millis(10));
        t.tick();
        t.add_i(0, Duration::from_millis(4));
        t.add_i(1, Duration::from_millis(20));
        t.tick();

        assert_eq!(t.n(), 2);
        assert_eq!(t.avg_i(0), Duration::from_millis(3));
        assert_eq!(t.avg_i(1), Duration::from_millis(15));
        assert_eq!(t.avg(), Duration::from_millis(18));
        assert_eq!(t.avg_i(7), Duration::ZERO);
    }
}
