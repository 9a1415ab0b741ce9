use std::fmt;
use std::str::FromStr;

/// Which choreography triggers are live during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChoreographyMode {
    /// Every actor runs its own script untouched.
    Off,
    /// Pre-flight: swap scripts and destinations of actors whose projected paths cross.
    #[default]
    Predictive,
    /// In-flight: swap current scripts whenever two running actors get close.
    Proximity,
    /// Predictive swap before the run, proximity swaps during it.
    Combined,
}

impl ChoreographyMode {
    pub fn label(self) -> &'static str {
        match self {
            ChoreographyMode::Off => "Off",
            ChoreographyMode::Predictive => "Predictive",
            ChoreographyMode::Proximity => "Proximity",
            ChoreographyMode::Combined => "Combined",
        }
    }

    pub fn predictive(self) -> bool {
        matches!(self, ChoreographyMode::Predictive | ChoreographyMode::Combined)
    }

    pub fn proximity(self) -> bool {
        matches!(self, ChoreographyMode::Proximity | ChoreographyMode::Combined)
    }
}

const ALL_MODES: [ChoreographyMode; 4] = [
    ChoreographyMode::Off,
    ChoreographyMode::Predictive,
    ChoreographyMode::Proximity,
    ChoreographyMode::Combined,
];

impl fmt::Display for ChoreographyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChoreographyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_MODES
            .iter()
            .copied()
            .find(|mode| mode.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = ALL_MODES.iter().map(|m| m.label()).collect();
                format!("unknown choreography mode '{s}' (expected one of {})", names.join(", "))
            })
    }
}
