//! The fixed list of programs and the "current program" selection.
//!
//! # Switching Protocol
//!
//! [`ProgramRack::run_program`] runs in the cooperative context only:
//!
//! 1. clear the current index, so new blocks skip processing
//! 2. lock the chosen program and `init` it (waits for a block that is
//!    already inside this program to finish)
//! 3. publish the index
//!
//! The audio context reads the index and then `try_lock`s the program. If
//! the lock is held (an `init` is in progress) the block is left silent, so
//! `process` never sees a half-initialized program and the audio context
//! never waits.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use pulsar_core::{ProcessArgs, Program};

const NONE: usize = usize::MAX;

/// Programs created at startup plus the atomic current selection.
pub struct ProgramRack {
    programs: Vec<Mutex<Box<dyn Program>>>,
    names: Vec<&'static str>,
    current: AtomicUsize,
    frames: AtomicU64,
    sample_rate: f32,
}

impl core::fmt::Debug for ProgramRack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgramRack")
            .field("programs", &self.names)
            .field("current", &self.current())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl ProgramRack {
    /// Creates a rack with no current program.
    pub fn new(programs: Vec<Box<dyn Program>>, sample_rate: f32) -> Self {
        let names = programs.iter().map(|p| p.name()).collect();
        Self {
            programs: programs.into_iter().map(Mutex::new).collect(),
            names,
            current: AtomicUsize::new(NONE),
            frames: AtomicU64::new(0),
            sample_rate,
        }
    }

    /// Number of programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Returns true if the rack holds no programs.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Program names in list order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Index of the program called `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    /// Sample rate handed to `init`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Index of the current program.
    pub fn current(&self) -> Option<usize> {
        match self.current.load(Ordering::Acquire) {
            NONE => None,
            index => Some(index),
        }
    }

    /// Makes `index` the current program, or clears the selection with `None`.
    ///
    /// Cooperative context only. Returns false (leaving no program current)
    /// if `index` is out of range.
    pub fn run_program(&self, index: Option<usize>) -> bool {
        self.current.store(NONE, Ordering::Release);

        let Some(index) = index else {
            tracing::info!("program cleared");
            return true;
        };
        let Some(slot) = self.programs.get(index) else {
            tracing::warn!(index, len = self.programs.len(), "no such program");
            return false;
        };

        slot.lock().init(self.sample_rate);
        self.current.store(index, Ordering::Release);
        tracing::info!(index, name = self.names[index], "program running");
        true
    }

    /// Runs `f` on program `index`, blocking until the audio context is done with it.
    ///
    /// Cooperative context only.
    pub fn with_program<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut dyn Program) -> R,
    ) -> Option<R> {
        let slot = self.programs.get(index)?;
        let mut program = slot.lock();
        Some(f(&mut **program))
    }

    /// Runs `f` on the current program.
    pub fn with_current<R>(&self, f: impl FnOnce(&mut dyn Program) -> R) -> Option<R> {
        self.with_program(self.current()?, f)
    }

    /// Runs `f` on the current program if it can be locked without waiting.
    ///
    /// Audio context. Returns `None`, without calling `f`, if no program is
    /// current or the current one is held by the cooperative context.
    pub fn try_with_current<R>(&self, f: impl FnOnce(&mut dyn Program) -> R) -> Option<R> {
        let index = self.current()?;
        let mut program = self.programs.get(index)?.try_lock()?;
        Some(f(&mut **program))
    }

    /// Processes one block with the current program.
    ///
    /// Audio context. Returns false if no program is current or the current
    /// one is busy.
    pub fn process_current(&self, args: &mut ProcessArgs<'_>) -> bool {
        self.try_with_current(|program| program.process(args)).is_some()
    }

    /// Adds `frames` to the processed-frame counter.
    #[inline]
    pub fn count_frames(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Returns and resets the processed-frame counter.
    pub fn take_frame_count(&self) -> u64 {
        self.frames.swap(0, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsar_core::{Frame, ParamValue};

    struct Constant {
        level: f32,
    }

    impl Program for Constant {
        fn name(&self) -> &'static str {
            "Constant"
        }
        fn init(&mut self, _sample_rate: f32) {}
        fn process(&mut self, args: &mut ProcessArgs<'_>) {
            args.output.fill(Frame::mono(self.level));
        }
        fn param_count(&self) -> usize {
            1
        }
        fn param(&self, index: usize) -> Option<ParamValue> {
            (index == 0).then_some(ParamValue::Float(self.level))
        }
    }

    fn rack() -> ProgramRack {
        ProgramRack::new(
            vec![
                Box::new(Constant { level: 0.25 }),
                Box::new(Constant { level: 0.5 }),
            ],
            48_000.0,
        )
    }

    fn run_block(rack: &ProgramRack) -> (bool, Frame) {
        let input = [Frame::SILENCE; 4];
        let mut output = [Frame::SILENCE; 4];
        let mut args = ProcessArgs::new(&input, &mut output);
        let ran = rack.process_current(&mut args);
        (ran, output[0])
    }

    #[test]
    fn test_starts_without_program() {
        let rack = rack();
        assert_eq!(rack.current(), None);
        assert_eq!(run_block(&rack), (false, Frame::SILENCE));
    }

    #[test]
    fn test_run_program_inits_then_publishes() {
        let rack = rack();
        assert!(rack.run_program(Some(1)));
        assert_eq!(rack.current(), Some(1));
        assert_eq!(
            rack.with_current(|p| p.param(0)),
            Some(Some(ParamValue::Float(0.5)))
        );
        assert_eq!(run_block(&rack), (true, Frame::mono(0.5)));
    }

    #[test]
    fn test_out_of_range_clears() {
        let rack = rack();
        rack.run_program(Some(0));
        assert!(!rack.run_program(Some(9)));
        assert_eq!(rack.current(), None);
        assert!(!run_block(&rack).0);
    }

    #[test]
    fn test_clear_with_none() {
        let rack = rack();
        rack.run_program(Some(0));
        assert!(rack.run_program(None));
        assert_eq!(rack.current(), None);
        assert!(rack.with_current(|_| ()).is_none());
    }

    #[test]
    fn test_locked_program_is_skipped() {
        let rack = rack();
        rack.run_program(Some(0));
        let guard = rack.programs[0].lock();
        assert!(!run_block(&rack).0);
        drop(guard);
        assert!(run_block(&rack).0);
    }

    #[test]
    fn test_try_with_current_skips_busy_program() {
        let rack = rack();
        assert_eq!(rack.try_with_current(|p| p.name()), None);
        rack.run_program(Some(1));
        let guard = rack.programs[1].lock();
        let mut called = false;
        assert_eq!(rack.try_with_current(|_| called = true), None);
        assert!(!called);
        drop(guard);
        assert_eq!(rack.try_with_current(|p| p.name()), Some("Constant"));
    }

    #[test]
    fn test_find_and_frames() {
        let rack = rack();
        assert_eq!(rack.find("constant"), Some(0));
        assert_eq!(rack.find("missing"), None);
        rack.count_frames(4);
        rack.count_frames(4);
        assert_eq!(rack.take_frame_count(), 8);
        assert_eq!(rack.take_frame_count(), 0);
    }
}
