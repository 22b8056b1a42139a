//! Uptime functions
//!
//! Pure functions estimating which fraction of a fight an effect is active,
//! or what fraction of its value survives on average.

/// Reference fight length used when averaging decaying effects, in seconds
pub const COMBAT_WINDOW: f64 = 120.0;

/// Lowest cooldown an awakening can be reduced to, in seconds
pub const MIN_AWAKENING_COOLDOWN: f64 = 10.0;

/// Fraction of time a periodic effect is active: `duration / (duration + cooldown)`
///
/// A non-positive cooldown means the effect is always active.
pub fn uptime_of(duration: f64, cooldown: f64) -> f64 {
    if cooldown <= 0.0 {
        return 1.0;
    }
    if duration <= 0.0 {
        return 0.0;
    }
    duration / (duration + cooldown)
}

/// Time-averaged value of an effect that starts at `initial` and loses
/// `rate` every `interval` seconds, over `window` seconds, floored at zero
///
/// Returns `initial` unchanged when the effect never decays.
pub fn decay_average(initial: f64, rate: f64, interval: f64, window: f64) -> f64 {
    if initial <= 0.0 || window <= 0.0 {
        return initial.max(0.0);
    }
    if rate <= 0.0 || interval <= 0.0 {
        return initial;
    }

    // Value during step k is initial - rate*k, for t in [k*interval, (k+1)*interval).
    let full_steps = (window / interval).floor();
    let remainder = window - full_steps * interval;
    let positive_steps = (initial / rate).ceil();

    let n = full_steps.min(positive_steps);
    let area_full = interval * (n * initial - rate * n * (n - 1.0) / 2.0);
    let tail_value = (initial - rate * full_steps).max(0.0);
    let area_tail = tail_value * remainder;

    (area_full + area_tail) / window
}

/// Uptime of an awakening ability after cooldown reduction
///
/// The effective cooldown never drops below `min_cooldown`.
pub fn awakening_uptime(
    duration: f64,
    base_cooldown: f64,
    cooldown_reduction: f64,
    min_cooldown: f64,
) -> f64 {
    let cooldown = (base_cooldown - cooldown_reduction).max(min_cooldown);
    if duration <= 0.0 {
        return 0.0;
    }
    duration / (duration + cooldown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_uptime_of() {
        assert!(close(uptime_of(10.0, 30.0), 0.25));
        assert_eq!(uptime_of(10.0, 0.0), 1.0);
        assert_eq!(uptime_of(10.0, -5.0), 1.0);
        assert_eq!(uptime_of(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_decay_without_decay() {
        assert_eq!(decay_average(20.0, 0.0, 5.0, COMBAT_WINDOW), 20.0);
        assert_eq!(decay_average(20.0, 2.0, 0.0, COMBAT_WINDOW), 20.0);
    }

    #[test]
    fn test_decay_reaches_zero() {
        // 10 -> 5 -> 0 with 10s steps; over 40s: (10*10 + 5*10 + 0 + 0) / 40
        assert!(close(decay_average(10.0, 5.0, 10.0, 40.0), 150.0 / 40.0));
    }

    #[test]
    fn test_decay_partial_step() {
        // 12 for 10s, 9 for 10s, 6 for 5s over a 25s window
        let expected = (12.0 * 10.0 + 9.0 * 10.0 + 6.0 * 5.0) / 25.0;
        assert!(close(decay_average(12.0, 3.0, 10.0, 25.0), expected));
    }

    #[test]
    fn test_decay_matches_stepwise_sum() {
        let (initial, rate, interval, window): (f64, f64, f64, f64) = (30.0, 1.7, 3.0, COMBAT_WINDOW);
        let mut area = 0.0;
        let mut t: f64 = 0.0;
        let mut k: f64 = 0.0;
        while t < window {
            let seg = interval.min(window - t);
            area += (initial - rate * k).max(0.0) * seg;
            t += interval;
            k += 1.0;
        }
        assert!(close(decay_average(initial, rate, interval, window), area / window));
    }

    #[test]
    fn test_awakening_uptime() {
        assert!(close(awakening_uptime(10.0, 90.0, 0.0, 10.0), 0.1));
        assert!(close(awakening_uptime(10.0, 90.0, 30.0, 10.0), 10.0 / 70.0));
        // Floor at the minimum cooldown
        assert!(close(awakening_uptime(10.0, 90.0, 500.0, 10.0), 0.5));
    }
}
