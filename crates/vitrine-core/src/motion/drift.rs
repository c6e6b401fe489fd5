//! Looping particle drift

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::easing::EasingType;
use super::timing::lerp;

/// Particles floating over the hero
pub const PARTICLE_COUNT: usize = 5;

/// Leg duration of the first particle; each later one is slower
const BASE_LEG: Duration = Duration::from_secs(10);
const LEG_STEP: Duration = Duration::from_millis(500);

/// A point drifting between two positions in the unit square, forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub from: (f64, f64),
    pub to: (f64, f64),
    /// Time for one pass from `from` to `to`
    pub leg: Duration,
    pub easing: EasingType,
}

impl Particle {
    /// Position `elapsed` after the drift started, in [0, 1] on both axes
    pub fn position_at(&self, elapsed: Duration) -> (f64, f64) {
        let t = self.easing.apply(ping_pong(elapsed, self.leg));
        (
            lerp(self.from.0, self.to.0, t),
            lerp(self.from.1, self.to.1, t),
        )
    }
}

/// Linear progress that runs 0 → 1 over `leg`, back to 0 over the next, and
/// repeats.
pub fn ping_pong(elapsed: Duration, leg: Duration) -> f64 {
    if leg.is_zero() {
        return 1.0;
    }
    let phase = (elapsed.as_secs_f64() / leg.as_secs_f64()) % 2.0;
    if phase <= 1.0 {
        phase
    } else {
        2.0 - phase
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Random start and end points, different on every launch
    pub fn random(count: usize) -> Self {
        Self::generate(count, &mut rand::thread_rng())
    }

    /// Reproducible field for a given seed
    pub fn seeded(count: usize, seed: u64) -> Self {
        Self::generate(count, &mut StdRng::seed_from_u64(seed))
    }

    fn generate(count: usize, rng: &mut impl Rng) -> Self {
        let particles = (0..count)
            .map(|i| Particle {
                from: (rng.gen(), rng.gen()),
                to: (rng.gen(), rng.gen()),
                leg: BASE_LEG + LEG_STEP * i as u32,
                easing: EasingType::EaseInOut,
            })
            .collect();
        Self { particles }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Every particle's position `elapsed` after the drift started
    pub fn positions_at(&self, elapsed: Duration) -> Vec<(f64, f64)> {
        self.particles.iter().map(|p| p.position_at(elapsed)).collect()
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::random(PARTICLE_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn particle() -> Particle {
        Particle {
            from: (0.1, 0.9),
            to: (0.7, 0.3),
            leg: Duration::from_secs(10),
            easing: EasingType::EaseInOut,
        }
    }

    #[test]
    fn test_ping_pong_reverses() {
        let leg = Duration::from_secs(10);
        assert_eq!(ping_pong(Duration::ZERO, leg), 0.0);
        assert_eq!(ping_pong(Duration::from_secs(5), leg), 0.5);
        assert_eq!(ping_pong(Duration::from_secs(10), leg), 1.0);
        assert_eq!(ping_pong(Duration::from_secs(15), leg), 0.5);
        assert_eq!(ping_pong(Duration::from_secs(20), leg), 0.0);
        assert_eq!(ping_pong(Duration::from_secs(25), leg), 0.5);
    }

    #[test]
    fn test_particle_travels_there_and_back() {
        let p = particle();
        let close = |a: (f64, f64), b: (f64, f64)| (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9;
        assert!(close(p.position_at(Duration::ZERO), p.from));
        assert!(close(p.position_at(Duration::from_secs(10)), p.to));
        assert!(close(p.position_at(Duration::from_secs(20)), p.from));
        assert!(close(p.position_at(Duration::from_secs(30)), p.to));

        let (x, _) = p.position_at(Duration::from_secs(5));
        assert!((x - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_field_is_reproducible() {
        let a = ParticleField::seeded(PARTICLE_COUNT, 7);
        let b = ParticleField::seeded(PARTICLE_COUNT, 7);
        assert_eq!(a, b);
        assert_ne!(a, ParticleField::seeded(PARTICLE_COUNT, 8));

        let legs: Vec<Duration> = a.particles().iter().map(|p| p.leg).collect();
        assert_eq!(legs[0], Duration::from_secs(10));
        assert_eq!(legs[4], Duration::from_secs(12));
    }

    proptest! {
        #[test]
        fn prop_positions_stay_in_bounds(seed in any::<u64>(), ms in 0u64..10_000_000) {
            let field = ParticleField::seeded(PARTICLE_COUNT, seed);
            for (x, y) in field.positions_at(Duration::from_millis(ms)) {
                prop_assert!((0.0..=1.0).contains(&x));
                prop_assert!((0.0..=1.0).contains(&y));
            }
        }
    }
}
