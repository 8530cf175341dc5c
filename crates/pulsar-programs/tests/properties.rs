//! Property-based tests for every program in the standard list.
//!
//! Whatever the audio, CV readings, gate edges and parameter values, a
//! program must produce finite, bounded output and never panic.

use proptest::prelude::*;
use pulsar_core::{EdgeSnapshot, Frame, ParamKind, ParamValue, ProcessArgs, Program};
use pulsar_programs::ProgramList;

const SAMPLE_RATE: f32 = 48_000.0;

/// Sets every parameter from a normalized value in `[0, 1]`.
fn set_params(program: &mut dyn Program, normalized: &[f32; 8]) {
    for i in 0..program.param_count() {
        let Some(desc) = program.param_info(i) else {
            continue;
        };
        let t = normalized[i % normalized.len()];
        let value = match desc.kind {
            ParamKind::Bool => ParamValue::Bool(t >= 0.5),
            ParamKind::Int { min, max } => ParamValue::Int(min + ((max - min) as f32 * t) as u32),
            ParamKind::Float { min, max } => ParamValue::Float(min + (max - min) * t),
            ParamKind::Choice(labels) => {
                ParamValue::Choice(((labels.len() - 1) as f32 * t).round() as usize)
            }
        };
        assert!(program.set_param(i, value), "{} rejected {value:?}", desc.name);
    }
}

fn edges(bits: u8) -> [EdgeSnapshot; 3] {
    std::array::from_fn(|i| EdgeSnapshot {
        turned_on: bits & (1 << (2 * i)) != 0,
        turned_off: bits & (1 << (2 * i + 1)) != 0,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn programs_stay_finite_and_bounded(
        program_idx in 0usize..8,
        samples in prop::collection::vec((-1.0f32..=1.0, -1.0f32..=1.0), 1..64),
        cv in prop::array::uniform3(any::<u16>()),
        gates in prop::collection::vec(any::<u8>(), 1..8),
        params in prop::array::uniform8(0.0f32..=1.0),
    ) {
        let mut programs = ProgramList::standard(SAMPLE_RATE);
        let index = program_idx % programs.len();
        let program = &mut programs[index];
        set_params(program.as_mut(), &params);
        program.init(SAMPLE_RATE);

        let input: Vec<Frame> = samples.iter().map(|&(l, r)| Frame::new(l, r)).collect();
        let mut output = vec![Frame::SILENCE; input.len()];
        for &bits in &gates {
            let mut args = ProcessArgs::new(&input, &mut output);
            args.cv = cv;
            args.gates = edges(bits);
            program.process(&mut args);

            for frame in &output {
                prop_assert!(frame.left.is_finite() && frame.right.is_finite());
                prop_assert!(frame.left.abs() <= 1.0 && frame.right.abs() <= 1.0,
                    "{} produced {:?}", program.name(), frame);
            }
        }
    }

    #[test]
    fn params_round_trip_through_descriptors(
        program_idx in 0usize..8,
        params in prop::array::uniform8(0.0f32..=1.0),
    ) {
        let mut programs = ProgramList::standard(SAMPLE_RATE);
        let index = program_idx % programs.len();
        let program = &mut programs[index];
        set_params(program.as_mut(), &params);

        for i in 0..program.param_count() {
            let desc = program.param_info(i).unwrap();
            let value = program.param(i).unwrap();
            prop_assert_eq!(desc.coerce(value), Some(value));
        }
        prop_assert!(program.param(program.param_count()).is_none());
    }
}
