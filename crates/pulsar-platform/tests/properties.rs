//! Property-based tests for quadrature decoding and acceleration.

use proptest::prelude::*;
use pulsar_platform::{AccelConfig, Encoder, EncoderState};

const CW: [(bool, bool); 4] = [(true, false), (true, true), (false, true), (false, false)];
const CCW: [(bool, bool); 4] = [(false, true), (true, true), (true, false), (false, false)];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Any interleaving of full detents nets to (clockwise - counter-clockwise).
    #[test]
    fn quadrature_net_count(turns in prop::collection::vec(any::<bool>(), 0..64)) {
        let encoder = Encoder::unconfigured();
        let mut expected = 0;
        for clockwise in turns {
            let seq = if clockwise { CW } else { CCW };
            for (a, b) in seq {
                encoder.step(a, b);
            }
            expected += if clockwise { 1 } else { -1 };
        }
        prop_assert_eq!(encoder.change(), expected);
        prop_assert_eq!(encoder.state(), EncoderState::Start);
    }

    /// Without both contacts closed at once, no detent is ever counted.
    #[test]
    fn quadrature_partial_motion_is_zero(
        levels in prop::collection::vec((any::<bool>(), any::<bool>()), 0..128),
    ) {
        let encoder = Encoder::unconfigured();
        for (a, b) in levels {
            if a && b {
                continue;
            }
            encoder.step(a, b);
        }
        prop_assert_eq!(encoder.change(), 0);
    }

    /// A poll is scaled exactly when it extends a run of non-zero polls past
    /// the threshold.
    #[test]
    fn accel_scales_only_long_runs(
        polls in prop::collection::vec(0u8..3, 1..40),
        threshold in 1u32..6,
        multiplier in 2i32..10,
    ) {
        let encoder = Encoder::unconfigured().with_accel(AccelConfig { threshold, multiplier });
        let mut run = 0u32;
        for detents in polls {
            for _ in 0..detents {
                for (a, b) in CW {
                    encoder.step(a, b);
                }
            }
            let got = encoder.change_accel();
            let raw = i32::from(detents);
            if raw == 0 {
                run = 0;
                prop_assert_eq!(got, 0);
            } else {
                run += 1;
                let want = if run > threshold { raw * multiplier } else { raw };
                prop_assert_eq!(got, want);
            }
        }
    }
}
