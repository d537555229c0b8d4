//! Score bands: letter grade, suitability class and recommendation text.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Seven-band letter grade derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Grade {
    /// 88 and above.
    #[cfg_attr(feature = "serde", serde(rename = "A+"))]
    APlus,
    /// 78 to 87.
    A,
    /// 68 to 77.
    #[cfg_attr(feature = "serde", serde(rename = "B+"))]
    BPlus,
    /// 58 to 67.
    B,
    /// 47 to 57.
    C,
    /// 35 to 46.
    D,
    /// Below 35.
    F,
}

impl Grade {
    /// Grade for a final score.
    ///
    /// # Examples
    /// ```
    /// use sitescore_core::Grade;
    ///
    /// assert_eq!(Grade::from_score(88), Grade::APlus);
    /// assert_eq!(Grade::from_score(87), Grade::A);
    /// assert_eq!(Grade::from_score(34).to_string(), "F");
    /// ```
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            88.. => Self::APlus,
            78.. => Self::A,
            68.. => Self::BPlus,
            58.. => Self::B,
            47.. => Self::C,
            35.. => Self::D,
            _ => Self::F,
        }
    }

    /// Display label, such as `"B+"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Five-level ordinal suitability bucket, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SuitabilityClass {
    /// 80 and above.
    Excellent,
    /// 65 to 79.
    Good,
    /// 50 to 64.
    Moderate,
    /// 35 to 49.
    Poor,
    /// Below 35.
    Unsuitable,
}

impl SuitabilityClass {
    /// Suitability class for a final score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Excellent,
            65.. => Self::Good,
            50.. => Self::Moderate,
            35.. => Self::Poor,
            _ => Self::Unsuitable,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::Unsuitable => "Unsuitable",
        }
    }

    /// Hex colour used when rendering cells of this class.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Excellent => "#10b981",
            Self::Good => "#3b82f6",
            Self::Moderate => "#f59e0b",
            Self::Poor => "#f97316",
            Self::Unsuitable => "#ef4444",
        }
    }
}

impl fmt::Display for SuitabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canned recommendation for a final score.
#[must_use]
pub const fn recommendation(score: u8) -> &'static str {
    match score {
        85.. => "Exceptional: top-tier solar site. Maximum return expected with minimal risk.",
        75.. => "Highly recommended: excellent solar potential with fast payback.",
        65.. => "Recommended: good conditions for solar installation with solid returns.",
        55.. => "Promising: above-average potential. A standard installation will be profitable.",
        45.. => "Moderate: acceptable conditions. Consider premium panels for better yield.",
        35.. => "Marginal: limited potential. Evaluate shading, orientation and hybrid options.",
        _ => "Not recommended: poor solar resource and high investment risk.",
    }
}
