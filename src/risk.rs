use serde::Serialize;

/// Scores strictly above this are high risk.
pub const HIGH_THRESHOLD: f64 = 70.0;
/// Scores strictly above this (and not high) are medium risk.
pub const MEDIUM_THRESHOLD: f64 = 40.0;
/// Legacy alert boundary, independent of the tier boundaries above.
pub const ALERT_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::High, RiskTier::Medium, RiskTier::Low];

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::High => "High",
            RiskTier::Medium => "Medium",
            RiskTier::Low => "Low",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::High => "#f06070",
            RiskTier::Medium => "#f0a030",
            RiskTier::Low => "#2dd4a8",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::High => "high",
            RiskTier::Medium => "medium",
            RiskTier::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskLevel {
    pub tier: RiskTier,
    pub label: &'static str,
    pub color: &'static str,
}

impl From<RiskTier> for RiskLevel {
    fn from(tier: RiskTier) -> Self {
        RiskLevel {
            tier,
            label: tier.label(),
            color: tier.color(),
        }
    }
}

/// Maps a burnout score to its tier. Out-of-range input is clamped to
/// [0, 100] and NaN is treated as 0, so this never fails.
pub fn classify(score: f64) -> RiskLevel {
    tier_for(score).into()
}

pub fn tier_for(score: f64) -> RiskTier {
    let score = bounded(score);
    if score > HIGH_THRESHOLD {
        RiskTier::High
    } else if score > MEDIUM_THRESHOLD {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn is_alert(score: f64) -> bool {
    bounded(score) > ALERT_THRESHOLD
}

pub fn bounded(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exact() {
        assert_eq!(classify(71.0).tier, RiskTier::High);
        assert_eq!(classify(70.0).tier, RiskTier::Medium);
        assert_eq!(classify(70.01).tier, RiskTier::High);
        assert_eq!(classify(41.0).tier, RiskTier::Medium);
        assert_eq!(classify(40.0).tier, RiskTier::Low);
        assert_eq!(classify(0.0).tier, RiskTier::Low);
    }

    #[test]
    fn out_of_range_scores_clamp() {
        assert_eq!(classify(250.0).tier, RiskTier::High);
        assert_eq!(classify(-5.0).tier, RiskTier::Low);
        assert_eq!(classify(f64::NAN).tier, RiskTier::Low);
        assert_eq!(classify(f64::INFINITY).tier, RiskTier::High);
    }

    #[test]
    fn level_carries_stable_display_fields() {
        let level = classify(85.0);
        assert_eq!(level.label, "High");
        assert_eq!(level.color, "#f06070");
        assert_eq!(classify(55.0).color, "#f0a030");
        assert_eq!(classify(10.0).color, "#2dd4a8");
    }

    #[test]
    fn alert_threshold_is_independent_of_tiers() {
        assert!(is_alert(65.0));
        assert_eq!(classify(65.0).tier, RiskTier::Medium);
        assert!(!is_alert(60.0));
    }
}
