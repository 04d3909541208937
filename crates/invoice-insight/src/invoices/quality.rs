use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Score below which an invoice counts as low quality in fleet statistics.
pub const LOW_QUALITY_THRESHOLD: Decimal = Decimal::from_parts(7, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Good,
    Warning,
    Poor,
    Unknown,
}

impl QualityTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Warning => "Warning",
            Self::Poor => "Poor",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn color(self) -> DisplayColor {
        match self {
            Self::Good => DisplayColor::Success,
            Self::Warning => DisplayColor::Warning,
            Self::Poor => DisplayColor::Error,
            Self::Unknown => DisplayColor::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayColor {
    Success,
    Warning,
    Error,
    Neutral,
}

impl DisplayColor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Neutral => "neutral",
        }
    }
}

/// Inclusive lower bounds of the good and warning tiers.
///
/// Two policies coexist: the detail view grades with `0.7 / 0.5`, while the
/// compact badge on list cards grades with `0.8 / 0.6`. They are kept apart
/// because collapsing them would change what one of the views shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    pub name: &'static str,
    pub good_from: Decimal,
    pub warning_from: Decimal,
}

impl TierPolicy {
    pub const fn detail() -> Self {
        Self {
            name: "detail",
            good_from: Decimal::from_parts(7, 0, 0, false, 1),
            warning_from: Decimal::from_parts(5, 0, 0, false, 1),
        }
    }

    pub const fn summary() -> Self {
        Self {
            name: "summary",
            good_from: Decimal::from_parts(8, 0, 0, false, 1),
            warning_from: Decimal::from_parts(6, 0, 0, false, 1),
        }
    }

    pub fn tier(&self, score: Option<Decimal>) -> QualityTier {
        match score {
            None => QualityTier::Unknown,
            Some(score) if score >= self.good_from => QualityTier::Good,
            Some(score) if score >= self.warning_from => QualityTier::Warning,
            Some(_) => QualityTier::Poor,
        }
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::detail()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: QualityTier,
    pub color: DisplayColor,
}

impl Classification {
    pub const fn label(&self) -> &'static str {
        self.tier.label()
    }
}

pub fn classify(score: Option<Decimal>, policy: &TierPolicy) -> Classification {
    let tier = policy.tier(score);
    Classification {
        tier,
        color: tier.color(),
    }
}

pub fn classify_detail(score: Option<Decimal>) -> Classification {
    classify(score, &TierPolicy::detail())
}

/// Whole-number percentage, rounded half away from zero (`0.875` -> `88`).
pub fn score_percent(score: Decimal) -> u32 {
    let scaled = (score * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    scaled.to_u32().unwrap_or(0)
}

/// `"87%"`, or `"N/A"` when no score was produced.
pub fn format_score(score: Option<Decimal>) -> String {
    match score {
        Some(score) => format!("{}%", score_percent(score)),
        None => "N/A".to_string(),
    }
}
