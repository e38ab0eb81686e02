//! Chip emulation sink.
//!
//! The engine only writes registers and asks for samples; the analog model
//! lives behind [`SidEmulation`].

use sid_ir::ChipModel;

use crate::registers::NUM_REGS;

/// A SID chip model that accepts register writes and renders samples.
///
/// Call order: `reset`, `set_chip_model`, `set_sampling_parameters`, then
/// any sequence of `write` and `clock`.
pub trait SidEmulation {
    fn reset(&mut self);
    fn set_chip_model(&mut self, model: ChipModel);
    fn set_sampling_parameters(&mut self, clock_hz: u32, sample_rate: u32);
    /// Run the chip for up to `cycles` clock cycles, writing at most
    /// `buffer.len()` samples. Returns the number of samples written.
    fn clock(&mut self, cycles: u32, buffer: &mut [i16]) -> usize;
    fn write(&mut self, register: u8, value: u8);
}

/// Emulation that renders silence at the correct rate and keeps a copy of
/// the register file.
#[derive(Clone, Debug, Default)]
pub struct NullEmulation {
    clock_hz: u32,
    sample_rate: u32,
    /// Fractional sample position, in `cycles * sample_rate` units
    carry: u64,
    registers: [u8; NUM_REGS],
    writes: u64,
}

impl NullEmulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to `register`.
    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    /// Number of writes since the last reset.
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl SidEmulation for NullEmulation {
    fn reset(&mut self) {
        self.registers = [0; NUM_REGS];
        self.writes = 0;
        self.carry = 0;
    }

    fn set_chip_model(&mut self, _model: ChipModel) {}

    fn set_sampling_parameters(&mut self, clock_hz: u32, sample_rate: u32) {
        self.clock_hz = clock_hz;
        self.sample_rate = sample_rate;
        self.carry = 0;
    }

    fn clock(&mut self, cycles: u32, buffer: &mut [i16]) -> usize {
        if self.clock_hz == 0 {
            return 0;
        }
        let clock = self.clock_hz as u64;
        let total = self.carry + cycles as u64 * self.sample_rate as u64;
        let produced = ((total / clock) as usize).min(buffer.len());
        self.carry = (total - produced as u64 * clock).min(clock - 1);
        buffer[..produced].fill(0);
        produced
    }

    fn write(&mut self, register: u8, value: u8) {
        if let Some(slot) = self.registers.get_mut(register as usize) {
            *slot = value;
        }
        self.writes += 1;
    }
}

#[cfg(feature = "resid")]
mod resid_backend {
    use resid::{SamplingMethod, Sid};
    use sid_ir::ChipModel;

    use super::SidEmulation;

    fn resid_model(model: ChipModel) -> resid::ChipModel {
        match model {
            ChipModel::Mos6581 => resid::ChipModel::Mos6581,
            ChipModel::Mos8580 => resid::ChipModel::Mos8580,
        }
    }

    /// Cycle-accurate emulation backed by reSID.
    pub struct ResidEmulation {
        sid: Sid,
    }

    impl ResidEmulation {
        pub fn new() -> Self {
            Self {
                sid: Sid::new(resid::ChipModel::Mos6581),
            }
        }
    }

    impl Default for ResidEmulation {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SidEmulation for ResidEmulation {
        fn reset(&mut self) {
            self.sid.reset();
        }

        fn set_chip_model(&mut self, model: ChipModel) {
            self.sid = Sid::new(resid_model(model));
        }

        fn set_sampling_parameters(&mut self, clock_hz: u32, sample_rate: u32) {
            self.sid
                .set_sampling_parameters(SamplingMethod::Fast, clock_hz, sample_rate);
        }

        fn clock(&mut self, cycles: u32, buffer: &mut [i16]) -> usize {
            let len = buffer.len();
            let (produced, _) = self.sid.sample(cycles, buffer, len, 1);
            produced
        }

        fn write(&mut self, register: u8, value: u8) {
            self.sid.write(register, value);
        }
    }
}

#[cfg(feature = "resid")]
pub use resid_backend::ResidEmulation;
