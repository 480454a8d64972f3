use serde::{Deserialize, Serialize};
use std::fmt;

/// Anatomical imaging plane derived from the slice normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    Sag,
    Cor,
    Ax,
}

impl Plane {
    /// Planes indexed by the dominant axis of the slice normal (x, y, z)
    pub const BY_AXIS: [Plane; 3] = [Plane::Sag, Plane::Cor, Plane::Ax];

    /// Returns short string representation
    pub fn simple_name(&self) -> &'static str {
        match self {
            Plane::Sag => "sag",
            Plane::Cor => "cor",
            Plane::Ax => "ax",
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// MR sequence type inferred from the series description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeqLabel {
    T1,
    Spgr, // Spoiled gradient / MPRAGE
    T2,
    Flair,
    Swi, // Susceptibility weighted / GRE
    Adc,
    Dwi,
    Mra,
    Loc, // Localizer / scout
    Other,
    Unknown,
}

impl SeqLabel {
    /// The full label vocabulary
    pub const ALL: [SeqLabel; 11] = [
        SeqLabel::T1,
        SeqLabel::Spgr,
        SeqLabel::T2,
        SeqLabel::Flair,
        SeqLabel::Swi,
        SeqLabel::Adc,
        SeqLabel::Dwi,
        SeqLabel::Mra,
        SeqLabel::Loc,
        SeqLabel::Other,
        SeqLabel::Unknown,
    ];

    /// Returns whether this label is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, SeqLabel::Unknown)
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            SeqLabel::T1 => "t1",
            SeqLabel::Spgr => "spgr",
            SeqLabel::T2 => "t2",
            SeqLabel::Flair => "flair",
            SeqLabel::Swi => "swi",
            SeqLabel::Adc => "adc",
            SeqLabel::Dwi => "dwi",
            SeqLabel::Mra => "mra",
            SeqLabel::Loc => "loc",
            SeqLabel::Other => "other",
            SeqLabel::Unknown => "unknown",
        }
    }

    /// Parses a label from its simple name
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        let s_lower = s.trim().to_lowercase();
        SeqLabel::ALL
            .iter()
            .copied()
            .find(|l| l.simple_name() == s_lower)
            .unwrap_or(SeqLabel::Unknown)
    }
}

impl fmt::Display for SeqLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_by_axis() {
        assert_eq!(Plane::BY_AXIS[0], Plane::Sag);
        assert_eq!(Plane::BY_AXIS[1], Plane::Cor);
        assert_eq!(Plane::BY_AXIS[2], Plane::Ax);
        assert_eq!(Plane::Ax.to_string(), "ax");
    }

    #[test]
    fn test_seq_label_names_roundtrip() {
        for label in SeqLabel::ALL {
            assert_eq!(SeqLabel::from_str(label.simple_name()), label);
        }
        assert_eq!(SeqLabel::from_str(" FLAIR "), SeqLabel::Flair);
        assert_eq!(SeqLabel::from_str("bogus"), SeqLabel::Unknown);
    }

    #[test]
    fn test_seq_label_serde() {
        let json = serde_json::to_string(&SeqLabel::Spgr).unwrap();
        assert_eq!(json, "\"spgr\"");
        let label: SeqLabel = serde_json::from_str("\"dwi\"").unwrap();
        assert_eq!(label, SeqLabel::Dwi);
    }
}
