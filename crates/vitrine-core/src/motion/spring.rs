//! Damped spring simulation

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Integration step; larger frame deltas are split into steps this size
const MAX_STEP_SECS: f64 = 1.0 / 240.0;

/// Damping ratios this close to 1.0 use the critically damped solution
const CRITICAL_EPSILON: f64 = 1e-6;

/// Spring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 30.0,
            mass: 1.0,
        }
    }
}

impl SpringConfig {
    /// Damping ratio; above 1.0 the spring settles without overshoot
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Progress of a 0 → 1 transition after `elapsed`.
    ///
    /// Closed-form step response of the damped oscillator starting at rest,
    /// so the cost does not depend on `elapsed`.
    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        let t = elapsed.as_secs_f64();
        if t <= 0.0 {
            return 0.0;
        }
        if self.stiffness <= 0.0 || self.mass <= 0.0 {
            return 1.0;
        }

        let omega = (self.stiffness / self.mass).sqrt();
        let zeta = self.damping_ratio().max(0.0);
        let x = if (zeta - 1.0).abs() < CRITICAL_EPSILON {
            1.0 - (-omega * t).exp() * (1.0 + omega * t)
        } else if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let decay = zeta * omega;
            1.0 - (-decay * t).exp() * ((omega_d * t).cos() + decay / omega_d * (omega_d * t).sin())
        } else {
            let root = omega * (zeta * zeta - 1.0).sqrt();
            let slow = -zeta * omega + root;
            let fast = -zeta * omega - root;
            let spread = slow - fast;
            1.0 + fast / spread * (slow * t).exp() - slow / spread * (fast * t).exp()
        };

        if x.is_finite() {
            x
        } else {
            1.0
        }
    }
}

/// One-dimensional spring chasing a target value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    config: SpringConfig,
    position: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    pub fn new(config: SpringConfig, position: f64) -> Self {
        Self {
            config,
            position,
            velocity: 0.0,
            target: position,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let mass = self.config.mass.max(f64::EPSILON);
        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP_SECS);
            let force = -self.config.stiffness * (self.position - self.target)
                - self.config.damping * self.velocity;
            self.velocity += force / mass * h;
            self.position += self.velocity * h;
            remaining -= h;
        }
    }

    /// Whether the spring is within `tolerance` of its target and nearly still
    pub fn is_settled(&self, tolerance: f64) -> bool {
        (self.position - self.target).abs() <= tolerance && self.velocity.abs() <= tolerance
    }

    /// Jump to the target and stop.
    pub fn snap(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

/// Two-dimensional spring, used for the cursor follower
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringFollower {
    x: Spring,
    y: Spring,
}

impl SpringFollower {
    pub fn new(config: SpringConfig, x: f64, y: f64) -> Self {
        Self {
            x: Spring::new(config, x),
            y: Spring::new(config, y),
        }
    }

    pub fn set_target(&mut self, x: f64, y: f64) {
        self.x.set_target(x);
        self.y.set_target(y);
    }

    pub fn step(&mut self, dt: f64) {
        self.x.step(dt);
        self.y.step(dt);
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x.position(), self.y.position())
    }

    pub fn is_settled(&self, tolerance: f64) -> bool {
        self.x.is_settled(tolerance) && self.y.is_settled(tolerance)
    }
}
