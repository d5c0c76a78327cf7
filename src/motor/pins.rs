//! Axis wiring

/// Pin names driving one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisPins {
    /// Step/dir driver (A4988)
    StepDir {
        step: String,
        dir: String,
        /// Active low
        enable: Option<String>,
        /// MS1..MS3, may repeat a pin when the lines are bridged
        microstep: Vec<String>,
    },

    /// Four coil inputs (ULN2003 IN1..IN4)
    Coils([String; 4]),
}

impl AxisPins {
    pub fn step_dir(step: &str, dir: &str, enable: Option<&str>, microstep: &[&str]) -> Self {
        AxisPins::StepDir {
            step: step.to_string(),
            dir: dir.to_string(),
            enable: enable.map(str::to_string),
            microstep: microstep.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn coils(pins: [&str; 4]) -> Self {
        AxisPins::Coils(pins.map(str::to_string))
    }

    /// RA/Az axis on the Orange Pi header
    pub fn default_ra_az() -> Self {
        Self::step_dir("PD25", "PD22", Some("PD26"), &["PL2", "PL2", "PL2"])
    }

    /// Dec/Alt axis on the Orange Pi header
    pub fn default_dec_alt() -> Self {
        Self::step_dir("PD15", "PD16", Some("PD18"), &["PL3", "PL3", "PL3"])
    }

    /// Every pin this axis uses
    pub fn all(&self) -> Vec<&str> {
        match self {
            AxisPins::StepDir {
                step,
                dir,
                enable,
                microstep,
            } => {
                let mut pins = vec![step.as_str(), dir.as_str()];
                pins.extend(enable.as_deref());
                pins.extend(microstep.iter().map(String::as_str));
                pins
            }
            AxisPins::Coils(coils) => coils.iter().map(String::as_str).collect(),
        }
    }

    pub fn has_microstep_lines(&self) -> bool {
        matches!(self, AxisPins::StepDir { microstep, .. } if !microstep.is_empty())
    }
}
