/// Milliseconds of simulated time per integration step.
pub const STEP_MS: u32 = 4;

/// Fixed integration step size, decoupled from wall-clock time.
const STEP: f64 = 0.01;

/// Distance to target under which a sample counts as settled.
const SETTLE_EPSILON: f64 = 0.0002;

/// Stiffness and friction for a [`Spring`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Spring constant (pull towards the target)
    pub k: f64,
    /// Velocity damping
    pub friction: f64,
}

impl SpringConfig {
    /// Friction a freshly initialized spring starts with.
    pub const DEFAULT_FRICTION: f64 = 400.0;

    /// Plain spring with the integrator's default friction
    pub const DEFAULT: Self = Self {
        k: 200.0,
        friction: Self::DEFAULT_FRICTION,
    };

    /// Heavily damped spring used by zoom and fade animations
    pub const ANIMATION: Self = Self {
        k: 200.0,
        friction: 700.0,
    };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Damped oscillator advanced in fixed 4 ms steps.
///
/// Velocity is never stored: it is the finite difference between `current`
/// and `previous`, so both only make sense relative to `timestamp`.
#[derive(Clone, Debug, PartialEq)]
pub struct Spring {
    pub k: f64,
    pub friction: f64,
    pub current: f64,
    pub previous: f64,
    pub target: f64,
    /// Simulated time of `current`, in milliseconds
    pub timestamp: u32,
}

impl Spring {
    /// Create a spring at rest on `current`, pulled towards `target`.
    ///
    /// Friction starts at [`SpringConfig::DEFAULT_FRICTION`] and the timestamp
    /// at zero; callers set both as needed.
    pub fn new(k: f64, current: f64, target: f64) -> Self {
        Self {
            k,
            friction: SpringConfig::DEFAULT_FRICTION,
            current,
            previous: current,
            target,
            timestamp: 0,
        }
    }

    /// Create a spring from a config, starting at `timestamp`.
    pub fn with_config(config: SpringConfig, current: f64, target: f64, timestamp: u32) -> Self {
        Self {
            friction: config.friction,
            timestamp,
            ..Self::new(config.k, current, target)
        }
    }

    /// Advance the simulation up to `msec`.
    ///
    /// Steps run until the simulated time is within one step of `msec`, so
    /// a late frame runs several steps and the result never depends on how
    /// often this is called. A `msec` behind the spring's own timestamp is a
    /// no-op.
    pub fn update(&mut self, msec: u32) {
        let mut steps = 0u32;
        while self.elapsed(msec) > STEP_MS {
            let current = self.current;
            let v = current - self.previous;
            let force = self.k * (self.target - current) / 10.0 - v * self.friction;

            self.current = current + v + force * STEP * STEP;
            self.previous = current;
            self.timestamp = self.timestamp.wrapping_add(STEP_MS);
            steps += 1;
        }

        if steps > 0 {
            log::trace!(
                "spring advanced {} steps to {}ms, current {:.5}",
                steps,
                self.timestamp,
                self.current
            );
        }
    }

    /// Both of the last two samples are within epsilon of the target.
    pub fn is_settled(&self) -> bool {
        (self.previous - self.target).abs() < SETTLE_EPSILON
            && (self.current - self.target).abs() < SETTLE_EPSILON
    }

    /// Milliseconds from the spring's timestamp to `msec` on a wrapping clock.
    fn elapsed(&self, msec: u32) -> u32 {
        let delta = msec.wrapping_sub(self.timestamp);
        // Past the half range the caller is behind us, not far ahead.
        if delta > u32::MAX / 2 {
            0
        } else {
            delta
        }
    }
}
