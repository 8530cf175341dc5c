//! Gate-triggered attack/decay envelope (a simple VCA).
//!
//! A rising edge on the selected gate source starts the attack from the
//! current level, so retriggers never click. The attack is linear, the
//! decay exponential:
//!
//! ```text
//! attack:  level += 1 / (attack_s · fs)         until 1.0
//! decay:   level *= exp(-1 / (decay_s · fs))    until below -80 dB
//! ```
//!
//! With `Hold` on, the envelope stays at full level after the attack until
//! the gate turns off.

use libm::expf;
use pulsar_core::{
    GateSource, ParamDescriptor, ParamEntry, ParamTable, ParamValue, ProcessArgs, Program,
};

/// Level below which the decay snaps to silence.
const FLOOR: f32 = 1.0e-4;

/// Envelope segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Silent, waiting for a gate.
    #[default]
    Idle,
    /// Rising towards full level.
    Attack,
    /// Holding full level while the gate is on.
    Hold,
    /// Falling towards silence.
    Decay,
}

static PARAMS: ParamTable<GateEnvelope> = ParamTable::new(&[
    ParamEntry {
        desc: ParamDescriptor::choice("Gate source", GateSource::LABELS, 0),
        get: |e| ParamValue::Choice(e.source.index()),
        set: |e, v| {
            if let Some(source) = v.as_choice().and_then(GateSource::from_index) {
                e.source = source;
            }
        },
    },
    ParamEntry {
        desc: ParamDescriptor::float("Attack", 0.001, 2.0, 0.005),
        get: |e| ParamValue::Float(e.attack_s),
        set: |e, v| {
            e.attack_s = v.as_float().unwrap_or(e.attack_s);
            e.update_rates();
        },
    },
    ParamEntry {
        desc: ParamDescriptor::float("Decay", 0.01, 5.0, 0.3),
        get: |e| ParamValue::Float(e.decay_s),
        set: |e, v| {
            e.decay_s = v.as_float().unwrap_or(e.decay_s);
            e.update_rates();
        },
    },
    ParamEntry {
        desc: ParamDescriptor::bool("Hold", false),
        get: |e| ParamValue::Bool(e.hold),
        set: |e, v| e.hold = v.as_bool().unwrap_or(e.hold),
    },
]);

/// Gate-triggered AD envelope applied to the input.
///
/// ## Parameters
///
/// | Index | Name | Kind | Default |
/// |-------|------|------|---------|
/// | 0 | Gate source | CV1 / CV2 / Button | CV1 |
/// | 1 | Attack | 0.001-2 s | 0.005 s |
/// | 2 | Decay | 0.01-5 s | 0.3 s |
/// | 3 | Hold | on/off | off |
#[derive(Debug, Clone)]
pub struct GateEnvelope {
    sample_rate: f32,
    source: GateSource,
    attack_s: f32,
    decay_s: f32,
    hold: bool,
    stage: Stage,
    level: f32,
    attack_step: f32,
    decay_coeff: f32,
}

impl GateEnvelope {
    /// Creates an idle envelope with default parameters.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            sample_rate,
            source: GateSource::Cv1,
            attack_s: 0.0,
            decay_s: 0.0,
            hold: false,
            stage: Stage::Idle,
            level: 0.0,
            attack_step: 0.0,
            decay_coeff: 0.0,
        };
        PARAMS.reset(&mut env);
        env
    }

    /// Gate that triggers the envelope.
    #[must_use]
    pub fn source(&self) -> GateSource {
        self.source
    }

    /// Current segment.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Current gain.
    #[must_use]
    pub fn level(&self) -> f32 {
        self.level
    }

    fn update_rates(&mut self) {
        let attack_samples = (self.attack_s * self.sample_rate).max(1.0);
        let decay_samples = (self.decay_s * self.sample_rate).max(1.0);
        self.attack_step = 1.0 / attack_samples;
        self.decay_coeff = expf(-1.0 / decay_samples);
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        match self.stage {
            Stage::Idle | Stage::Hold => {}
            Stage::Attack => {
                self.level += self.attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = if self.hold { Stage::Hold } else { Stage::Decay };
                }
            }
            Stage::Decay => {
                self.level *= self.decay_coeff;
                if self.level < FLOOR {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }
}

impl Program for GateEnvelope {
    fn name(&self) -> &'static str {
        "Gate Envelope"
    }

    fn init(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_rates();
        self.stage = Stage::Idle;
        self.level = 0.0;
    }

    fn process(&mut self, args: &mut ProcessArgs<'_>) {
        let source = self.source.index();
        if args.gate_on(source) {
            self.stage = Stage::Attack;
        }
        let holding = matches!(self.stage, Stage::Attack | Stage::Hold);
        if self.hold && holding && args.gate_off(source) {
            self.stage = Stage::Decay;
        }

        for (out, inp) in args.output.iter_mut().zip(args.input) {
            let gain = self.tick();
            *out = inp.scaled(gain);
        }
    }

    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.descriptor(index)
    }

    fn param(&self, index: usize) -> Option<ParamValue> {
        PARAMS.get(self, index)
    }

    fn set_param(&mut self, index: usize, value: ParamValue) -> bool {
        PARAMS.set(self, index, value)
    }
}
