//! Monotonic microsecond time sources.
//!
//! Everything time-dependent in the device core (debouncing, task intervals)
//! reads time through the [`Clock`] trait so that tests can drive it with a
//! synthetic, fully deterministic [`ManualClock`].

/// Monotonic microsecond counter.
///
/// Implementations must never go backwards and must not wrap within the
/// lifetime of the device. Must be callable from interrupt context.
pub trait Clock {
    /// Returns microseconds since an arbitrary fixed origin.
    fn now_us(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

#[cfg(feature = "std")]
impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    #[inline]
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// A clock that only moves when told to.
///
/// Shareable between threads; tests hand the same `ManualClock` to switches,
/// gates and the scheduler and step it explicitly.
///
/// # Example
///
/// ```rust
/// use pulsar_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(0);
/// clock.advance(1500);
/// assert_eq!(clock.now_us(), 1500);
/// ```
#[cfg(target_has_atomic = "64")]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: core::sync::atomic::AtomicU64,
}

#[cfg(target_has_atomic = "64")]
impl ManualClock {
    /// Creates a clock reading `start_us`.
    pub const fn new(start_us: u64) -> Self {
        Self {
            now: core::sync::atomic::AtomicU64::new(start_us),
        }
    }

    /// Moves the clock forward by `delta_us`.
    #[inline]
    pub fn advance(&self, delta_us: u64) {
        self.now
            .fetch_add(delta_us, core::sync::atomic::Ordering::AcqRel);
    }

    /// Sets the clock to `now_us`. Values earlier than the current time are ignored.
    #[inline]
    pub fn set(&self, now_us: u64) {
        self.now
            .fetch_max(now_us, core::sync::atomic::Ordering::AcqRel);
    }
}

#[cfg(target_has_atomic = "64")]
impl Clock for ManualClock {
    #[inline]
    fn now_us(&self) -> u64 {
        self.now.load(core::sync::atomic::Ordering::Acquire)
    }
}

/// Wall-clock time source for host builds, measured from construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Creates a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    #[inline]
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_us(), 15);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(100);
        clock.set(50);
        assert_eq!(clock.now_us(), 100);
        clock.set(200);
        assert_eq!(clock.now_us(), 200);
    }

    #[test]
    fn test_clock_through_reference() {
        fn read(c: impl Clock) -> u64 {
            c.now_us()
        }
        let clock = ManualClock::new(42);
        assert_eq!(read(&clock), 42);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_us();
        let b = clock.now_us();
        assert!(b >= a);
    }
}
