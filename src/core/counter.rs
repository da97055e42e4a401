//! Presentation-level smoothing for stat widgets
//!
//! Tweens the displayed number towards the latest authoritative value with an
//! ease-out-cubic curve. Small changes snap immediately.

/// Animated display value for one stat.
#[derive(Debug, Clone)]
pub struct AnimatedCounter {
    from: f64,
    target: f64,
    started_at: f64,
    /// Tween duration in seconds
    duration: f64,
    /// Changes smaller than this are applied without animation
    threshold: f64,
}

impl AnimatedCounter {
    pub fn new(initial: f64) -> Self {
        Self {
            from: initial,
            target: initial,
            started_at: 0.0,
            duration: 0.6,
            threshold: 2.0,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Retarget at time `now` (seconds). A tween in flight restarts from the
    /// value currently on screen.
    pub fn set(&mut self, value: f64, now: f64) {
        if value == self.target {
            return;
        }
        let current = self.value_at(now);
        if (value - current).abs() < self.threshold {
            self.from = value;
            self.target = value;
            self.started_at = now;
            return;
        }
        self.from = current;
        self.target = value;
        self.started_at = now;
    }

    /// Displayed value at `now`, rounded like an integer counter.
    pub fn value_at(&self, now: f64) -> f64 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.target;
        }
        let eased = 1.0 - (1.0 - progress).powi(3);
        (self.from + (self.target - self.from) * eased).round()
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.from != self.target && self.progress(now) < 1.0
    }

    fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }
}
