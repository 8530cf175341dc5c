//! The fixed program list built at startup.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

use pulsar_core::Program;

use crate::{AutoPan, Bitcrush, GateEnvelope, Passthrough};

/// Builder for the module's program list.
///
/// # Example
///
/// ```rust
/// use pulsar_programs::ProgramList;
///
/// let programs = ProgramList::standard(48_000.0);
/// assert_eq!(programs.len(), ProgramList::NAMES.len());
/// assert_eq!(programs[2].name(), "Bitcrusher");
/// assert_eq!(ProgramList::index_of("auto pan"), Some(1));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramList;

impl ProgramList {
    /// Program names in list order.
    pub const NAMES: &'static [&'static str] =
        &["Passthrough", "Auto Pan", "Bitcrusher", "Gate Envelope"];

    /// Every program, in menu order.
    pub fn standard(sample_rate: f32) -> Vec<Box<dyn Program>> {
        vec![
            Box::new(Passthrough::new()),
            Box::new(AutoPan::new(sample_rate)),
            Box::new(Bitcrush::new(sample_rate)),
            Box::new(GateEnvelope::new(sample_rate)),
        ]
    }

    /// List position of the program called `name`, ignoring ASCII case.
    pub fn index_of(name: &str) -> Option<usize> {
        Self::NAMES.iter().position(|n| n.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_programs() {
        let programs = ProgramList::standard(48_000.0);
        let names: Vec<_> = programs.iter().map(|p| p.name()).collect();
        assert_eq!(names, ProgramList::NAMES);
    }

    #[test]
    fn test_index_of() {
        assert_eq!(ProgramList::index_of("BITCRUSHER"), Some(2));
        assert_eq!(ProgramList::index_of("reverb"), None);
    }
}
