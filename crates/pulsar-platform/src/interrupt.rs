//! Pin-interrupt handler table.
//!
//! [`InterruptDispatch`] maps each logical input to at most one
//! [`InterruptHandler`]. The hardware interrupt entry points call
//! [`InterruptDispatch::dispatch_line`] (or [`InterruptDispatch::dispatch_vector`]
//! for vectors shared by several lines) and the table forwards the
//! notification to every handler registered on that line.
//!
//! # Line Aliasing
//!
//! On the reference MCU a pin number maps to one interrupt line whatever its
//! port, and lines 5-9 and 10-15 additionally share one vector each:
//!
//! ```text
//! line   0   1   2   3   4   5..9       10..15
//! vector 0   1   2   3   4   Lines5To9  Lines10To15
//! ```
//!
//! Registering `PA3` and `PB3` is accepted, but both handlers then run on
//! either pin's edge. This is reported as [`Registration::Aliased`] (and
//! logged under the `tracing` feature); it is not an error. Handlers
//! re-read their own pins, so a spurious call is harmless to a debounced
//! control.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::{InputId, PINS_PER_PORT};

/// Default capacity of an [`InterruptDispatch`] table.
pub const MAX_HANDLERS: usize = PINS_PER_PORT as usize;

/// Receives pin-change notifications.
///
/// Runs in interrupt context: no blocking, no allocation, bounded work.
pub trait InterruptHandler: Sync {
    /// Called when a registered pin changes level.
    fn on_interrupt(&self);
}

/// Hardware interrupt vector serving one or more lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrqVector {
    /// Dedicated vector for lines 0-4.
    Line(u8),
    /// Shared vector for lines 5-9.
    Lines5To9,
    /// Shared vector for lines 10-15.
    Lines10To15,
}

impl IrqVector {
    /// Vector that serves `line`, or `None` if the line does not exist.
    pub const fn for_line(line: u8) -> Option<Self> {
        match line {
            0..=4 => Some(IrqVector::Line(line)),
            5..=9 => Some(IrqVector::Lines5To9),
            10..=15 => Some(IrqVector::Lines10To15),
            _ => None,
        }
    }

    /// Lines served by this vector as `(first, last)`, inclusive.
    pub const fn lines(self) -> (u8, u8) {
        match self {
            IrqVector::Line(line) => (line, line),
            IrqVector::Lines5To9 => (5, 9),
            IrqVector::Lines10To15 => (10, 15),
        }
    }
}

/// Outcome of [`InterruptDispatch::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Registered on a line no other input uses.
    Registered,
    /// The input already had a handler; it has been replaced.
    Replaced,
    /// Registered, but another input already raises the same line.
    Aliased {
        /// The input registered earlier on the same line.
        previous: InputId,
    },
    /// The pin number does not exist; nothing was registered.
    InvalidPin,
    /// The table has no free slot; nothing was registered.
    TableFull,
}

impl Registration {
    /// Returns true if the handler is now installed.
    #[inline]
    pub const fn is_installed(self) -> bool {
        matches!(
            self,
            Registration::Registered | Registration::Replaced | Registration::Aliased { .. }
        )
    }
}

#[derive(Clone, Copy)]
struct Slot<'a> {
    input: InputId,
    handler: &'a dyn InterruptHandler,
}

/// Fixed-size table of interrupt handlers keyed by logical input.
///
/// Built once during startup through `&mut self`; after that it is shared
/// by reference with the interrupt context, which only reads it.
///
/// # Example
///
/// ```rust
/// use pulsar_platform::{InputId, InterruptDispatch, PendingFlag, Registration};
///
/// let flag = PendingFlag::new();
/// let mut dispatch: InterruptDispatch<'_> = InterruptDispatch::new();
/// let pin = InputId::new(0, 7);
///
/// assert_eq!(dispatch.register(pin, &flag), Registration::Registered);
/// assert!(!dispatch.is_available(pin));
///
/// dispatch.dispatch_line(7);
/// assert!(flag.take());
/// assert!(!flag.take());
/// ```
pub struct InterruptDispatch<'a, const N: usize = MAX_HANDLERS> {
    slots: [Option<Slot<'a>>; N],
}

impl<const N: usize> core::fmt::Debug for InterruptDispatch<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.slots.iter().flatten().map(|slot| slot.input))
            .finish()
    }
}

impl<const N: usize> Default for InterruptDispatch<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> InterruptDispatch<'a, N> {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    /// Installs `handler` for `input`.
    ///
    /// Never fails hard: the returned [`Registration`] says whether the
    /// handler was installed and whether the input aliases another one.
    pub fn register(&mut self, input: InputId, handler: &'a dyn InterruptHandler) -> Registration {
        if !input.is_valid() {
            #[cfg(feature = "tracing")]
            tracing::warn!("interrupt: {input} is not a valid pin, handler ignored");
            return Registration::InvalidPin;
        }

        if let Some(slot) = self.slots.iter_mut().flatten().find(|s| s.input == input) {
            slot.handler = handler;
            #[cfg(feature = "tracing")]
            tracing::debug!("interrupt: replaced handler for {input}");
            return Registration::Replaced;
        }

        let previous = self
            .slots
            .iter()
            .flatten()
            .find(|s| s.input.line() == input.line())
            .map(|s| s.input);

        let Some(free) = self.slots.iter_mut().find(|s| s.is_none()) else {
            #[cfg(feature = "tracing")]
            tracing::warn!("interrupt: table full, handler for {input} ignored");
            return Registration::TableFull;
        };
        *free = Some(Slot { input, handler });

        match previous {
            Some(previous) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "interrupt: {input} shares line {} ({:?}) with {previous}",
                    input.line(),
                    IrqVector::for_line(input.line()),
                );
                Registration::Aliased { previous }
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("interrupt: registered {input}");
                Registration::Registered
            }
        }
    }

    /// Returns true if `input` is a valid pin with no handler.
    pub fn is_available(&self, input: InputId) -> bool {
        input.is_valid() && !self.slots.iter().flatten().any(|s| s.input == input)
    }

    /// Number of installed handlers.
    pub fn handler_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Invokes the handler registered for exactly `input`, if any.
    #[inline]
    pub fn dispatch(&self, input: InputId) {
        if let Some(slot) = self.slots.iter().flatten().find(|s| s.input == input) {
            slot.handler.on_interrupt();
        }
    }

    /// Invokes every handler raised by interrupt line `line`.
    ///
    /// This is what the hardware delivers: the line, not the port. Inputs
    /// that alias on the line are all notified.
    #[inline]
    pub fn dispatch_line(&self, line: u8) {
        for slot in self.slots.iter().flatten() {
            if slot.input.line() == line {
                slot.handler.on_interrupt();
            }
        }
    }

    /// Invokes every handler whose line is served by `vector`.
    pub fn dispatch_vector(&self, vector: IrqVector) {
        let (first, last) = vector.lines();
        for slot in self.slots.iter().flatten() {
            let line = slot.input.line();
            if line >= first && line <= last {
                slot.handler.on_interrupt();
            }
        }
    }
}

/// The simplest handler: remembers that an interrupt happened.
#[derive(Debug, Default)]
pub struct PendingFlag {
    pending: AtomicBool,
}

impl PendingFlag {
    /// Creates a cleared flag.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Returns and clears the flag.
    #[inline]
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

impl InterruptHandler for PendingFlag {
    #[inline]
    fn on_interrupt(&self) {
        self.pending.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_dispatch() {
        let flag = PendingFlag::new();
        let other = PendingFlag::new();
        let mut table: InterruptDispatch<'_> = InterruptDispatch::new();
        let a = InputId::new(0, 2);

        assert!(table.is_available(a));
        assert_eq!(table.register(a, &flag), Registration::Registered);
        assert!(!table.is_available(a));
        assert_eq!(table.handler_count(), 1);

        table.dispatch(InputId::new(0, 3));
        assert!(!flag.take());
        table.dispatch(a);
        assert!(flag.take());

        assert_eq!(table.register(a, &other), Registration::Replaced);
        table.dispatch(a);
        assert!(!flag.take());
        assert!(other.take());
    }

    #[test]
    fn test_aliased_inputs_both_fire() {
        let first = PendingFlag::new();
        let second = PendingFlag::new();
        let mut table: InterruptDispatch<'_> = InterruptDispatch::new();
        let pa3 = InputId::new(0, 3);
        let pb3 = InputId::new(1, 3);

        assert_eq!(table.register(pa3, &first), Registration::Registered);
        assert_eq!(
            table.register(pb3, &second),
            Registration::Aliased { previous: pa3 }
        );

        // Per-input dispatch stays individual
        table.dispatch(pb3);
        assert!(!first.take());
        assert!(second.take());

        // The shared line reaches both
        table.dispatch_line(3);
        assert!(first.take());
        assert!(second.take());
    }

    #[test]
    fn test_shared_vector_fans_out() {
        let five = PendingFlag::new();
        let nine = PendingFlag::new();
        let ten = PendingFlag::new();
        let mut table: InterruptDispatch<'_> = InterruptDispatch::new();
        table.register(InputId::new(0, 5), &five);
        table.register(InputId::new(2, 9), &nine);
        table.register(InputId::new(0, 10), &ten);

        table.dispatch_vector(IrqVector::Lines5To9);
        assert!(five.take());
        assert!(nine.take());
        assert!(!ten.take());

        table.dispatch_vector(IrqVector::Line(0));
        assert!(!five.take() && !nine.take() && !ten.take());
    }

    #[test]
    fn test_invalid_and_full() {
        let flag = PendingFlag::new();
        let mut table: InterruptDispatch<'_, 2> = InterruptDispatch::new();
        assert_eq!(
            table.register(InputId::new(0, 16), &flag),
            Registration::InvalidPin
        );
        assert!(!table.is_available(InputId::new(0, 16)));

        assert!(table.register(InputId::new(0, 0), &flag).is_installed());
        assert!(table.register(InputId::new(0, 1), &flag).is_installed());
        assert_eq!(
            table.register(InputId::new(0, 2), &flag),
            Registration::TableFull
        );
        assert_eq!(table.handler_count(), 2);
    }

    #[test]
    fn test_unregistered_dispatch_is_noop() {
        let table: InterruptDispatch<'_> = InterruptDispatch::new();
        table.dispatch(InputId::new(0, 4));
        table.dispatch_line(4);
        table.dispatch_vector(IrqVector::Lines10To15);
        assert_eq!(table.handler_count(), 0);
    }

    #[test]
    fn test_vector_mapping() {
        assert_eq!(IrqVector::for_line(4), Some(IrqVector::Line(4)));
        assert_eq!(IrqVector::for_line(5), Some(IrqVector::Lines5To9));
        assert_eq!(IrqVector::for_line(15), Some(IrqVector::Lines10To15));
        assert_eq!(IrqVector::for_line(16), None);
        assert_eq!(IrqVector::Lines10To15.lines(), (10, 15));
    }
}
