//! Monotonic nanosecond timestamps.
//!
//! Rest timestamps and event timestamps come from a steady clock, not
//! wall-clock time: they are only ever compared against each other for
//! relative ordering (price-time tie-break) and are never persisted as
//! calendar time.

use std::sync::OnceLock;
use std::time::Instant;

static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds elapsed on the steady clock since the first call in this
/// process. Monotonic: never decreases, unaffected by wall-clock jumps.
pub fn monotonic_nanos() -> u64 {
    let origin = *ORIGIN.get_or_init(Instant::now);
    Instant::now().duration_since(origin).as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_decreases() {
        let mut prev = monotonic_nanos();
        for _ in 0..1000 {
            let now = monotonic_nanos();
            assert!(now >= prev);
            prev = now;
        }
    }

    #[test]
    fn test_monotonic_advances() {
        let a = monotonic_nanos();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = monotonic_nanos();
        assert!(b > a);
    }
}
