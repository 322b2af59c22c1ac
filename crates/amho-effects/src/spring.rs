//! Spring physics for the dismantle overlay opacity.
//!
//! The spring is always critically damped, so each frame is stepped with the
//! closed-form solution instead of numeric integration. Frames of any length
//! land exactly on the curve.

/// Configuration for a critically damped spring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub fn new(stiffness: f32, mass: f32) -> Self {
        Self { stiffness, mass }
    }

    /// Slow, no overshoot. Drives the reveal overlay fade.
    pub fn fade() -> Self {
        Self::new(100.0, 1.0)
    }

    /// Natural angular frequency, `sqrt(k / m)`.
    pub fn omega(&self) -> f32 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Damping coefficient this spring implies, `2 * sqrt(k * m)`.
    pub fn damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::fade()
    }
}

/// A spring-driven scalar.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    const EPSILON: f32 = 1e-3;

    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget. Velocity carries over, so retargeting mid-flight is smooth.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < Self::EPSILON && self.velocity.abs() < Self::EPSILON
    }

    /// Advance by `dt` seconds.
    ///
    /// With `d` the offset from the target and `w` the angular frequency:
    /// `d(t) = (d0 + (v0 + w*d0) * t) * e^(-w*t)`.
    pub fn advance(&mut self, dt: f32) {
        let t = dt.max(0.0);
        if t == 0.0 {
            return;
        }
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let w = self.config.omega();
        let d0 = self.value - self.target;
        let v0 = self.velocity;
        let c = v0 + w * d0;
        let decay = (-w * t).exp();

        self.value = self.target + (d0 + c * t) * decay;
        self.velocity = (v0 - w * c * t) * decay;

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_is_critically_damped() {
        let config = SpringConfig::fade();
        assert_eq!(config.stiffness, 100.0);
        assert_eq!(config.omega(), 10.0);
        assert_eq!(config.damping(), 20.0);
    }

    #[test]
    fn test_follows_closed_form() {
        let mut spring = Spring::new(SpringConfig::fade(), 0.0);
        spring.set_target(1.0);
        spring.advance(0.1);
        // d(0.1) = -(1 + 10 * 0.1) * e^-1
        let expected = 1.0 - 2.0 * (-1.0f32).exp();
        assert!((spring.value() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut coarse = Spring::new(SpringConfig::fade(), 0.0);
        let mut fine = Spring::new(SpringConfig::fade(), 0.0);
        coarse.set_target(1.0);
        fine.set_target(1.0);
        coarse.advance(0.2);
        for _ in 0..20 {
            fine.advance(0.01);
        }
        assert!((coarse.value() - fine.value()).abs() < 1e-4);
    }

    #[test]
    fn test_rises_without_overshoot() {
        let mut spring = Spring::new(SpringConfig::fade(), 0.0);
        spring.set_target(1.0);
        let mut last = 0.0;
        for _ in 0..120 {
            spring.advance(1.0 / 60.0);
            assert!(spring.value() >= last - 1e-6);
            assert!(spring.value() <= 1.0 + 1e-3);
            last = spring.value();
        }
        assert!(spring.is_settled());
        assert_eq!(spring.value(), 1.0);
    }

    #[test]
    fn test_long_frame_is_stable() {
        let mut spring = Spring::new(SpringConfig::fade(), 1.0);
        spring.set_target(0.0);
        spring.advance(5.0);
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn test_settled_spring_stays_put() {
        let mut spring = Spring::new(SpringConfig::fade(), 0.0);
        spring.advance(1.0);
        assert_eq!(spring.value(), 0.0);
        spring.set_target(0.0);
        spring.advance(1.0);
        assert_eq!(spring.value(), 0.0);
    }
}
