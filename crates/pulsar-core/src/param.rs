//! Program parameters as tagged variants.
//!
//! Each configurable parameter of a [`Program`](crate::Program) is described
//! by a [`ParamDescriptor`] whose [`ParamKind`] says what values it accepts.
//! Values travel as [`ParamValue`]s. A program exposes its parameters through
//! a static [`ParamTable`] of accessor functions, so the menu layer can list,
//! read and edit any program's parameters without knowing its concrete type.
//!
//! # Example
//!
//! ```rust
//! use pulsar_core::{ParamDescriptor, ParamEntry, ParamTable, ParamValue};
//!
//! struct Echo {
//!     feedback: f32,
//!     frozen: bool,
//! }
//!
//! static ECHO_PARAMS: ParamTable<Echo> = ParamTable::new(&[
//!     ParamEntry {
//!         desc: ParamDescriptor::float("Feedback", 0.0, 1.0, 0.5),
//!         get: |e| ParamValue::Float(e.feedback),
//!         set: |e, v| e.feedback = v.as_float().unwrap_or(e.feedback),
//!     },
//!     ParamEntry {
//!         desc: ParamDescriptor::bool("Freeze", false),
//!         get: |e| ParamValue::Bool(e.frozen),
//!         set: |e, v| e.frozen = v.as_bool().unwrap_or(e.frozen),
//!     },
//! ]);
//!
//! let mut echo = Echo { feedback: 0.5, frozen: false };
//! assert!(ECHO_PARAMS.set(&mut echo, 0, ParamValue::Float(1.7)));
//! assert_eq!(echo.feedback, 1.0); // clamped to the descriptor's range
//! ```

/// The shape of values a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// On/off.
    Bool,
    /// Integer in `min..=max`.
    Int {
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// Continuous value in `min..=max`.
    Float {
        /// Smallest accepted value.
        min: f32,
        /// Largest accepted value.
        max: f32,
    },
    /// One entry out of a fixed list of labels.
    Choice(&'static [&'static str]),
}

/// A parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Value of a [`ParamKind::Bool`] parameter.
    Bool(bool),
    /// Value of a [`ParamKind::Int`] parameter.
    Int(u32),
    /// Value of a [`ParamKind::Float`] parameter.
    Float(f32),
    /// Index into a [`ParamKind::Choice`] label list.
    Choice(usize),
}

impl ParamValue {
    /// Returns the boolean payload, if this is a `Bool`.
    #[inline]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an `Int`.
    #[inline]
    pub const fn as_int(self) -> Option<u32> {
        match self {
            ParamValue::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a `Float`.
    #[inline]
    pub const fn as_float(self) -> Option<f32> {
        match self {
            ParamValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the choice index, if this is a `Choice`.
    #[inline]
    pub const fn as_choice(self) -> Option<usize> {
        match self {
            ParamValue::Choice(i) => Some(i),
            _ => None,
        }
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Display name.
    pub name: &'static str,
    /// Accepted values.
    pub kind: ParamKind,
    /// Value after [`Program::init`](crate::Program::init).
    pub default: ParamValue,
}

/// Fractional step applied per encoder click to float parameters.
const FLOAT_STEPS: f32 = 100.0;

impl ParamDescriptor {
    /// On/off parameter.
    pub const fn bool(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: ParamValue::Bool(default),
        }
    }

    /// Integer parameter in `min..=max`.
    pub const fn int(name: &'static str, min: u32, max: u32, default: u32) -> Self {
        Self {
            name,
            kind: ParamKind::Int { min, max },
            default: ParamValue::Int(default),
        }
    }

    /// Continuous parameter in `min..=max`.
    pub const fn float(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            kind: ParamKind::Float { min, max },
            default: ParamValue::Float(default),
        }
    }

    /// Parameter picking one of `labels`.
    pub const fn choice(
        name: &'static str,
        labels: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Choice(labels),
            default: ParamValue::Choice(default),
        }
    }

    /// Validates `value` against this parameter's kind.
    ///
    /// Numeric values are clamped into range. Returns `None` when the
    /// variant does not match the kind or a choice index is out of range.
    pub fn coerce(&self, value: ParamValue) -> Option<ParamValue> {
        match (self.kind, value) {
            (ParamKind::Bool, ParamValue::Bool(_)) => Some(value),
            (ParamKind::Int { min, max }, ParamValue::Int(n)) => {
                Some(ParamValue::Int(n.clamp(min, max)))
            }
            (ParamKind::Float { min, max }, ParamValue::Float(f)) if !f.is_nan() => {
                Some(ParamValue::Float(f.clamp(min, max)))
            }
            (ParamKind::Choice(labels), ParamValue::Choice(i)) if i < labels.len() => Some(value),
            _ => None,
        }
    }

    /// Moves `value` by `clicks` encoder steps.
    ///
    /// Booleans toggle on any odd step count, integers and choices move by
    /// one per click and stop at the ends, floats move by 1/100 of their range.
    pub fn step(&self, value: ParamValue, clicks: i32) -> ParamValue {
        let stepped = match (self.kind, value) {
            (ParamKind::Bool, ParamValue::Bool(b)) => ParamValue::Bool(b ^ (clicks % 2 != 0)),
            (ParamKind::Int { .. }, ParamValue::Int(n)) => {
                ParamValue::Int(n.saturating_add_signed(clicks))
            }
            (ParamKind::Float { min, max }, ParamValue::Float(f)) => {
                ParamValue::Float(f + (max - min) * clicks as f32 / FLOAT_STEPS)
            }
            (ParamKind::Choice(labels), ParamValue::Choice(i)) if !labels.is_empty() => {
                let last = labels.len() - 1;
                ParamValue::Choice(i.saturating_add_signed(clicks as isize).min(last))
            }
            _ => self.default,
        };
        self.coerce(stepped).unwrap_or(self.default)
    }

    /// Returns the label for `value` for boolean and choice parameters.
    pub fn label(&self, value: ParamValue) -> Option<&'static str> {
        match (self.kind, value) {
            (ParamKind::Bool, ParamValue::Bool(b)) => Some(if b { "On" } else { "Off" }),
            (ParamKind::Choice(labels), ParamValue::Choice(i)) => labels.get(i).copied(),
            _ => None,
        }
    }
}

/// Accessors binding one [`ParamDescriptor`] to a field of `P`.
pub struct ParamEntry<P: 'static> {
    /// What the parameter is.
    pub desc: ParamDescriptor,
    /// Reads the current value.
    pub get: fn(&P) -> ParamValue,
    /// Stores an already-validated value.
    pub set: fn(&mut P, ParamValue),
}

/// Fixed list of a program's parameters.
pub struct ParamTable<P: 'static> {
    entries: &'static [ParamEntry<P>],
}

impl<P: 'static> ParamTable<P> {
    /// Wraps a static entry list.
    pub const fn new(entries: &'static [ParamEntry<P>]) -> Self {
        Self { entries }
    }

    /// A table with no parameters.
    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    /// Number of parameters.
    #[inline]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor of parameter `index`.
    pub fn descriptor(&self, index: usize) -> Option<ParamDescriptor> {
        self.entries.get(index).map(|e| e.desc)
    }

    /// Current value of parameter `index` on `target`.
    pub fn get(&self, target: &P, index: usize) -> Option<ParamValue> {
        self.entries.get(index).map(|e| (e.get)(target))
    }

    /// Validates and stores `value` into parameter `index` on `target`.
    ///
    /// Returns false if the index is out of range or the value does not fit
    /// the parameter's kind.
    pub fn set(&self, target: &mut P, index: usize, value: ParamValue) -> bool {
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        match entry.desc.coerce(value) {
            Some(valid) => {
                (entry.set)(target, valid);
                true
            }
            None => false,
        }
    }

    /// Stores every parameter's default value into `target`.
    pub fn reset(&self, target: &mut P) {
        for entry in self.entries {
            (entry.set)(target, entry.desc.default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: &[&str] = &["Depth", "Rate"];

    #[derive(Default)]
    struct Fake {
        on: bool,
        count: u32,
        level: f32,
        mode: usize,
    }

    static FAKE_PARAMS: ParamTable<Fake> = ParamTable::new(&[
        ParamEntry {
            desc: ParamDescriptor::bool("On", true),
            get: |f| ParamValue::Bool(f.on),
            set: |f, v| f.on = v.as_bool().unwrap_or(f.on),
        },
        ParamEntry {
            desc: ParamDescriptor::int("Count", 1, 16, 8),
            get: |f| ParamValue::Int(f.count),
            set: |f, v| f.count = v.as_int().unwrap_or(f.count),
        },
        ParamEntry {
            desc: ParamDescriptor::float("Level", 0.0, 1.0, 0.25),
            get: |f| ParamValue::Float(f.level),
            set: |f, v| f.level = v.as_float().unwrap_or(f.level),
        },
        ParamEntry {
            desc: ParamDescriptor::choice("Mode", MODES, 0),
            get: |f| ParamValue::Choice(f.mode),
            set: |f, v| f.mode = v.as_choice().unwrap_or(f.mode),
        },
    ]);

    #[test]
    fn test_reset_applies_defaults() {
        let mut f = Fake::default();
        FAKE_PARAMS.reset(&mut f);
        assert!(f.on);
        assert_eq!(f.count, 8);
        assert_eq!(f.level, 0.25);
        assert_eq!(f.mode, 0);
    }

    #[test]
    fn test_set_clamps_numeric() {
        let mut f = Fake::default();
        assert!(FAKE_PARAMS.set(&mut f, 1, ParamValue::Int(99)));
        assert_eq!(f.count, 16);
        assert!(FAKE_PARAMS.set(&mut f, 2, ParamValue::Float(-3.0)));
        assert_eq!(f.level, 0.0);
    }

    #[test]
    fn test_set_rejects_mismatch_and_range() {
        let mut f = Fake::default();
        assert!(!FAKE_PARAMS.set(&mut f, 0, ParamValue::Int(1)));
        assert!(!FAKE_PARAMS.set(&mut f, 3, ParamValue::Choice(2)));
        assert!(!FAKE_PARAMS.set(&mut f, 7, ParamValue::Bool(true)));
        assert!(!FAKE_PARAMS.set(&mut f, 2, ParamValue::Float(f32::NAN)));
    }

    #[test]
    fn test_get_and_descriptor() {
        let f = Fake {
            mode: 1,
            ..Fake::default()
        };
        assert_eq!(FAKE_PARAMS.get(&f, 3), Some(ParamValue::Choice(1)));
        assert_eq!(FAKE_PARAMS.get(&f, 4), None);
        assert_eq!(FAKE_PARAMS.descriptor(1).map(|d| d.name), Some("Count"));
        assert_eq!(FAKE_PARAMS.len(), 4);
    }

    #[test]
    fn test_step() {
        let count = ParamDescriptor::int("Count", 1, 16, 8);
        assert_eq!(count.step(ParamValue::Int(8), 3), ParamValue::Int(11));
        assert_eq!(count.step(ParamValue::Int(2), -5), ParamValue::Int(1));

        let level = ParamDescriptor::float("Level", 0.0, 1.0, 0.5);
        let ParamValue::Float(v) = level.step(ParamValue::Float(0.5), 10) else {
            panic!("float step changed variant");
        };
        assert!((v - 0.6).abs() < 1e-6);

        let on = ParamDescriptor::bool("On", false);
        assert_eq!(on.step(ParamValue::Bool(false), 1), ParamValue::Bool(true));
        assert_eq!(on.step(ParamValue::Bool(false), -2), ParamValue::Bool(false));

        let mode = ParamDescriptor::choice("Mode", MODES, 0);
        assert_eq!(mode.step(ParamValue::Choice(0), 5), ParamValue::Choice(1));
        assert_eq!(mode.step(ParamValue::Choice(1), -5), ParamValue::Choice(0));

        let three = ParamDescriptor::choice("Source", &["A", "B", "C"], 0);
        assert_eq!(three.step(ParamValue::Choice(1), 5), ParamValue::Choice(2));
        assert_eq!(three.step(ParamValue::Choice(2), 1), ParamValue::Choice(2));
    }

    #[test]
    fn test_labels() {
        let mode = ParamDescriptor::choice("Mode", MODES, 0);
        assert_eq!(mode.label(ParamValue::Choice(1)), Some("Rate"));
        assert_eq!(mode.label(ParamValue::Choice(5)), None);
        let on = ParamDescriptor::bool("On", false);
        assert_eq!(on.label(ParamValue::Bool(true)), Some("On"));
    }
}
