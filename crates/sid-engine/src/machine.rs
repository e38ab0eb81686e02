//! Machine trait for sound generators driven by a sequencer.

use alloc::string::String;

use sid_ir::Tempo;

/// Metadata describing a machine's parameter.
pub struct ParamInfo {
    pub id: u16,
    pub name: &'static str,
    pub min: i32,
    pub max: i32,
    pub default: i32,
    /// Value meaning "leave unchanged"
    pub no_value: i32,
}

impl ParamInfo {
    /// Clamp `value` into the parameter range.
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Static metadata about a machine.
pub struct MachineInfo {
    pub name: &'static str,
    pub short_name: &'static str,
    pub author: &'static str,
    /// Parameters shared by all tracks
    pub params: &'static [ParamInfo],
    /// Parameters repeated per track (voice)
    pub track_params: &'static [ParamInfo],
    pub tracks: u8,
}

impl MachineInfo {
    pub fn param(&self, id: u16) -> Option<&'static ParamInfo> {
        self.params.iter().find(|p| p.id == id)
    }

    pub fn track_param(&self, id: u16) -> Option<&'static ParamInfo> {
        self.track_params.iter().find(|p| p.id == id)
    }
}

/// Core trait for sound generators.
///
/// `work` renders one subtick buffer. Parameter changes take effect at the
/// next register update inside `work`.
pub trait Machine {
    fn info(&self) -> &MachineInfo;
    fn init(&mut self, sample_rate: u32);
    fn set_tempo(&mut self, tempo: &Tempo);
    /// Render `buffer.len()` samples. Returns false once the output is silent.
    fn work(&mut self, buffer: &mut [i16]) -> bool;
    fn stop(&mut self);
    fn set_param(&mut self, param: u16, value: i32);
    fn set_track_param(&mut self, track: u8, param: u16, value: i32);
    /// Human-readable value of a global parameter.
    fn describe_param(&self, _param: u16, _value: i32) -> Option<String> {
        None
    }
    /// Human-readable value of a track parameter.
    fn describe_track_param(&self, _param: u16, _value: i32) -> Option<String> {
        None
    }
}
