use std::str::FromStr;

use serde::Serialize;

pub const DEFAULT_TOP_N: usize = 15;

/// Header used for the heatmap's burnout column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatmapLabel {
    /// "Performance", as the dashboard has always shown it.
    #[default]
    Legacy,
    /// "Burnout", matching the data actually in the column.
    Corrected,
}

impl FromStr for HeatmapLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(HeatmapLabel::Legacy),
            "corrected" => Ok(HeatmapLabel::Corrected),
            other => Err(format!("unknown heatmap label '{other}'")),
        }
    }
}

/// Presentation settings passed into every view computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardConfig {
    pub top_n: usize,
    pub heatmap_label: HeatmapLabel,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            heatmap_label: HeatmapLabel::Legacy,
        }
    }
}
