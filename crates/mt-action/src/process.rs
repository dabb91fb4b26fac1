//! Process-type tags.

use std::fmt;

/// The six string-excitation sub-processes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StringProcessKind {
    /// Single diffractive, `A + B → A + X`.
    SoftSingleDiffractiveAX,
    /// Single diffractive, `A + B → X + B`.
    SoftSingleDiffractiveXB,
    SoftDoubleDiffractive,
    SoftNonDiffractive,
    /// Baryon–antibaryon annihilation into mesonic strings.
    SoftAnnihilation,
    Hard,
}

impl StringProcessKind {
    pub const ALL: [StringProcessKind; 6] = [
        StringProcessKind::SoftSingleDiffractiveAX,
        StringProcessKind::SoftSingleDiffractiveXB,
        StringProcessKind::SoftDoubleDiffractive,
        StringProcessKind::SoftNonDiffractive,
        StringProcessKind::SoftAnnihilation,
        StringProcessKind::Hard,
    ];

    #[inline]
    pub fn is_soft(self) -> bool {
        self != StringProcessKind::Hard
    }
}

/// What kind of interaction an action (or a candidate branch) represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessType {
    /// Not yet resolved.
    #[default]
    None,
    Elastic,
    /// Resonance formation, `2 → 1`.
    TwoToOne,
    /// Inelastic `2 → 2`.
    TwoToTwo,
    String(StringProcessKind),
    Decay,
}

impl ProcessType {
    /// `true` for every process a scatter action can realize.
    pub fn is_scattering(self) -> bool {
        matches!(
            self,
            ProcessType::Elastic | ProcessType::TwoToOne | ProcessType::TwoToTwo | ProcessType::String(_)
        )
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessType::None      => f.write_str("none"),
            ProcessType::Elastic   => f.write_str("elastic"),
            ProcessType::TwoToOne  => f.write_str("2→1"),
            ProcessType::TwoToTwo  => f.write_str("2→2"),
            ProcessType::String(k) => write!(f, "string ({k:?})"),
            ProcessType::Decay     => f.write_str("decay"),
        }
    }
}
