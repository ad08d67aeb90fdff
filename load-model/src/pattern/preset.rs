use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use super::{PatternModel, ShapePattern, normalize_to_percentage};

/// Built-in load shapes for common business types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./pattern.ts")]
#[serde(rename_all = "kebab-case")]
pub enum PatternPreset {
    /// Office building with a daytime peak.
    Office,
    /// Factory closed on weekends.
    FactoryWeekdays,
    /// Factory running seven days a week.
    FactorySevenDay,
    Supermarket,
    /// Warehouse operating during the day only.
    Warehouse,
    /// Convenience store open around the clock.
    ConvenienceStore,
    /// Almost flat, temperature-driven load.
    NearlyFlat,
}

const OFFICE_WORKING: [f64; 24] = [
    2.0, 2.0, 2.0, 2.0, 2.0, 3.0, 5.0, 7.0, 8.0, 9.0, 9.0, 8.0, 7.0, 9.0, 10.0, 9.0, 8.0, 7.0, 6.0,
    5.0, 4.0, 3.0, 2.0, 2.0,
];
const FACTORY_WEEKDAYS_WORKING: [f64; 24] = [
    2.0, 2.0, 2.0, 2.0, 2.0, 3.0, 5.0, 8.0, 9.0, 10.0, 9.0, 9.0, 5.0, 9.0, 10.0, 9.0, 8.0, 6.0,
    3.0, 2.0, 2.0, 2.0, 2.0, 2.0,
];
const FACTORY_SEVEN_DAY: [f64; 24] = [
    3.0, 3.0, 3.0, 3.0, 3.0, 4.0, 6.0, 8.0, 9.0, 10.0, 9.0, 9.0, 6.0, 9.0, 10.0, 9.0, 8.0, 7.0,
    5.0, 4.0, 3.0, 3.0, 3.0, 3.0,
];
const SUPERMARKET_WORKING: [f64; 24] = [
    4.0, 4.0, 4.0, 4.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.5, 10.0, 9.5,
    8.0, 7.0, 6.0, 5.0, 4.0, 4.0,
];
const SUPERMARKET_NONWORKING: [f64; 24] = [
    4.0, 4.0, 4.0, 4.0, 4.0, 5.0, 7.0, 8.0, 9.0, 9.0, 9.5, 10.0, 9.5, 9.0, 9.0, 9.5, 10.0, 9.0,
    8.0, 7.0, 6.0, 5.0, 4.0, 4.0,
];
const WAREHOUSE_WORKING: [f64; 24] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 4.0, 8.0, 8.0, 8.0, 8.0, 6.0, 8.0, 8.0, 8.0, 8.0, 4.0, 2.0,
    1.0, 1.0, 1.0, 1.0, 1.0,
];
const CONVENIENCE_STORE: [f64; 24] = [
    4.0, 4.0, 4.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 9.0, 9.0, 10.0, 10.0, 9.0, 9.0, 8.0, 8.0, 7.0,
    6.0, 5.0, 5.0, 5.0, 4.0, 4.0,
];
const NEARLY_FLAT: [f64; 24] = [
    6.0, 6.0, 6.0, 6.0, 6.0, 6.0, 7.0, 8.0, 9.0, 10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 8.0, 7.0, 6.0,
    6.0, 6.0, 6.0, 6.0, 6.0, 6.0,
];

impl PatternPreset {
    pub const ALL: [PatternPreset; 7] = [
        PatternPreset::Office,
        PatternPreset::FactoryWeekdays,
        PatternPreset::FactorySevenDay,
        PatternPreset::Supermarket,
        PatternPreset::Warehouse,
        PatternPreset::ConvenienceStore,
        PatternPreset::NearlyFlat,
    ];

    /// Identifier used in config files and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            PatternPreset::Office => "office",
            PatternPreset::FactoryWeekdays => "factory-weekdays",
            PatternPreset::FactorySevenDay => "factory-seven-day",
            PatternPreset::Supermarket => "supermarket",
            PatternPreset::Warehouse => "warehouse",
            PatternPreset::ConvenienceStore => "convenience-store",
            PatternPreset::NearlyFlat => "nearly-flat",
        }
    }

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            PatternPreset::Office => "Office (daytime)",
            PatternPreset::FactoryWeekdays => "Factory (closed weekends)",
            PatternPreset::FactorySevenDay => "Factory (seven-day operation)",
            PatternPreset::Supermarket => "Supermarket",
            PatternPreset::Warehouse => "Warehouse (daytime only)",
            PatternPreset::ConvenienceStore => "Convenience store (24h)",
            PatternPreset::NearlyFlat => "Nearly flat (temperature-driven)",
        }
    }

    fn raw_shapes(&self) -> ([f64; 24], [f64; 24]) {
        match self {
            PatternPreset::Office => (OFFICE_WORKING, [3.0; 24]),
            PatternPreset::FactoryWeekdays => (FACTORY_WEEKDAYS_WORKING, [2.0; 24]),
            PatternPreset::FactorySevenDay => (FACTORY_SEVEN_DAY, FACTORY_SEVEN_DAY),
            PatternPreset::Supermarket => (SUPERMARKET_WORKING, SUPERMARKET_NONWORKING),
            PatternPreset::Warehouse => (WAREHOUSE_WORKING, [1.0; 24]),
            PatternPreset::ConvenienceStore => (CONVENIENCE_STORE, CONVENIENCE_STORE),
            PatternPreset::NearlyFlat => (NEARLY_FLAT, NEARLY_FLAT),
        }
    }

    /// Default non-working amplitude in percent of the working-day peak
    pub fn amplitude_percent(&self) -> f64 {
        match self {
            PatternPreset::Office => 30.0,
            PatternPreset::FactoryWeekdays => 15.0,
            PatternPreset::FactorySevenDay => 100.0,
            PatternPreset::Supermarket => 100.0,
            PatternPreset::Warehouse => 20.0,
            PatternPreset::ConvenienceStore => 90.0,
            PatternPreset::NearlyFlat => 100.0,
        }
    }

    /// The preset shapes in percentage form.
    pub fn pattern(&self) -> ShapePattern {
        let (working, nonworking) = self.raw_shapes();
        ShapePattern {
            working: normalize_to_percentage(&working),
            nonworking: normalize_to_percentage(&nonworking),
        }
    }

    /// The preset shapes with the preset's default amplitude.
    pub fn pattern_model(&self) -> PatternModel {
        PatternModel {
            pattern: self.pattern(),
            amplitude_ratio: self.amplitude_percent() / 100.0,
        }
    }
}

impl fmt::Display for PatternPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PatternPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternPreset::ALL
            .iter()
            .find(|preset| preset.key().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                let known: Vec<&str> = PatternPreset::ALL.iter().map(|p| p.key()).collect();
                format!("Unknown pattern preset '{}'. Known: {}", s, known.join(", "))
            })
    }
}
