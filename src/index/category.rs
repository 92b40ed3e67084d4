//! AQI severity categories with EPA display colors.

/// Severity tier for an AQI value. Tiers are ordered and exhaustive: every
/// AQI maps to exactly one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Inclusive upper AQI bound per tier, scanned in order. Anything above the
/// last bound is Hazardous.
const TIERS: [(u32, Category); 5] = [
    (50, Category::Good),
    (100, Category::Moderate),
    (150, Category::UnhealthyForSensitiveGroups),
    (200, Category::Unhealthy),
    (300, Category::VeryUnhealthy),
];

impl Category {
    /// Classify an AQI value. Total over all representable AQI values.
    pub fn for_aqi(aqi: u32) -> Category {
        for (upper_bound, category) in TIERS {
            if aqi <= upper_bound {
                return category;
            }
        }
        Category::Hazardous
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }

    /// Display color in hex notation.
    pub fn color(self) -> &'static str {
        match self {
            Category::Good => "#00e400",
            Category::Moderate => "#ffff00",
            Category::UnhealthyForSensitiveGroups => "#ff7e00",
            Category::Unhealthy => "#ff0000",
            Category::VeryUnhealthy => "#8f3f97",
            Category::Hazardous => "#7e0023",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::Good => {
                "Air quality is satisfactory, and air pollution poses little or no risk"
            }
            Category::Moderate => {
                "Air quality is acceptable. However, there may be a risk for some people"
            }
            Category::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects"
            }
            Category::Unhealthy => {
                "Some members of the general public may experience health effects"
            }
            Category::VeryUnhealthy => {
                "Health alert: The risk of health effects is increased for everyone"
            }
            Category::Hazardous => {
                "Health warning of emergency conditions: everyone is more likely to be affected"
            }
        }
    }
}
