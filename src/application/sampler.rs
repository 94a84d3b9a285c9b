// Sampling gate - deterministic counter-based downsampler

/// Forwards roughly one in `1/density` telegrams by adding the density to
/// an accumulator and resetting it whenever it crosses 1. Deterministic:
/// the forwarding pattern is a pure function of the density and of how many
/// telegrams have passed through.
#[derive(Debug)]
pub struct SamplingGate {
    density: f64,
    accumulator: f64,
}

impl SamplingGate {
    /// `density` must lie in `(0, 1]`; validated at configuration load.
    pub fn new(density: f64) -> Self {
        debug_assert!(density > 0.0 && density <= 1.0);
        Self {
            density,
            accumulator: 0.0,
        }
    }

    /// Account for one parsed telegram; true when it should be forwarded.
    pub fn admit(&mut self) -> bool {
        self.accumulator += self.density;
        if self.accumulator >= 1.0 {
            self.accumulator = 0.0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(density: f64, calls: usize) -> Vec<bool> {
        let mut gate = SamplingGate::new(density);
        (0..calls).map(|_| gate.admit()).collect()
    }

    #[test]
    fn test_density_015_forwards_exactly_once_in_seven_calls() {
        let decisions = pattern(0.15, 7);
        assert_eq!(decisions.iter().filter(|&&forwarded| forwarded).count(), 1);
        // The accumulator reaches 1.05 on the seventh call.
        assert_eq!(decisions[6], true);
    }

    #[test]
    fn test_pattern_is_reproducible() {
        assert_eq!(pattern(0.15, 100), pattern(0.15, 100));
    }

    #[test]
    fn test_accumulator_resets_after_forwarding() {
        let decisions = pattern(0.15, 14);
        let forwarded: Vec<usize> = decisions
            .iter()
            .enumerate()
            .filter_map(|(i, &forwarded)| forwarded.then_some(i))
            .collect();
        assert_eq!(forwarded, vec![6, 13]);
    }

    #[test]
    fn test_density_one_forwards_every_telegram() {
        assert!(pattern(1.0, 5).into_iter().all(|forwarded| forwarded));
    }

    #[test]
    fn test_density_half_forwards_every_second_telegram() {
        assert_eq!(pattern(0.5, 4), vec![false, true, false, true]);
    }
}
