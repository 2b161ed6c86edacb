//! Randomness used by the tick simulator.

use rand::Rng;

/// Source of uniform draws for the simulator.
///
/// Implemented for every [`rand::Rng`], so `StdRng`, `ThreadRng` and friends
/// plug in directly. Tests substitute a scripted source to get exact ticks.
pub trait RandomSource {
    /// Uniform draw in `[low, high)`. Returns `low` when the range is empty.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low < high {
            self.random_range(low..high)
        } else {
            low
        }
    }

    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}
