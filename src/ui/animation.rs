use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Easing function for UI animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed interpolation.
    Linear,
    /// Cubic ease-in-out: slow start, fast middle, slow end.
    EaseInOut,
    /// Cubic ease-out: fast start, slow end (deceleration).
    EaseOut,
}

/// A single active animation interpolating an f32 value over time.
struct Animation {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

/// Time-driven f32 interpolation keyed by string.
///
/// Animations tick on wall-clock delta, not frame counts. The view builders
/// query values each frame to drive card expansion and the rail fade during
/// a category swap.
pub struct Animator {
    animations: HashMap<String, Animation>,
}

impl Animator {
    pub fn new() -> Self {
        Self {
            animations: HashMap::new(),
        }
    }

    /// Start (or restart) an animation. Overwrites any existing animation
    /// with the same key.
    pub fn start(
        &mut self,
        key: &str,
        from: f32,
        to: f32,
        duration: Duration,
        easing: Easing,
        now: Instant,
    ) {
        self.animations.insert(
            key.to_string(),
            Animation {
                from,
                to,
                start: now,
                duration,
                easing,
            },
        );
    }

    /// Current interpolated value, or `None` if no animation exists for this
    /// key. Returns the `to` value once complete.
    pub fn get(&self, key: &str, now: Instant) -> Option<f32> {
        let anim = self.animations.get(key)?;
        let elapsed = now.duration_since(anim.start);
        if anim.duration.is_zero() || elapsed >= anim.duration {
            return Some(anim.to);
        }
        let t = elapsed.as_secs_f32() / anim.duration.as_secs_f32();
        let eased = ease(t, anim.easing);
        Some(anim.from + (anim.to - anim.from) * eased)
    }

    /// Current value, falling back to `default` when the key is absent.
    pub fn value_or(&self, key: &str, now: Instant, default: f32) -> f32 {
        self.get(key, now).unwrap_or(default)
    }

    /// Returns true if the animation exists and has not yet completed.
    pub fn is_active(&self, key: &str, now: Instant) -> bool {
        if let Some(anim) = self.animations.get(key) {
            !anim.duration.is_zero() && now.duration_since(anim.start) < anim.duration
        } else {
            false
        }
    }

    /// The target value of an animation, if it exists.
    pub fn target(&self, key: &str) -> Option<f32> {
        self.animations.get(key).map(|a| a.to)
    }

    /// Remove completed animations to prevent unbounded growth.
    /// Call once per frame.
    pub fn gc(&mut self, now: Instant) {
        self.animations.retain(|_, anim| {
            anim.duration.is_zero() || now.duration_since(anim.start) < anim.duration
        });
    }
}

/// Apply an easing function to a linear progress value `t` in [0, 1].
fn ease(t: f32, easing: Easing) -> f32 {
    match easing {
        Easing::Linear => t,
        Easing::EaseInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let f = -2.0 * t + 2.0;
                1.0 - f * f * f / 2.0
            }
        }
        Easing::EaseOut => {
            let f = 1.0 - t;
            1.0 - f * f * f
        }
    }
}
