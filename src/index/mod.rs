//! AQI computation core: breakpoint tables, sub-index interpolation and
//! dominant-pollutant aggregation.
//!
//! The band tables are CPCB breakpoints. They are the ground truth the
//! predictor approximates, so the same tables serve offline labeling and any
//! online re-derivation.

use serde::{Deserialize, Serialize};

pub mod category;

/// The fixed set of pollutants a reading may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    O3,
    Nh3,
}

impl Pollutant {
    /// Canonical feature order for the predictor boundary. Reordering this
    /// list silently breaks any model trained against it.
    pub const ALL: [Pollutant; 7] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
        Pollutant::Nh3,
    ];

    /// Wire name of the pollutant field.
    pub fn key(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::No2 => "no2",
            Pollutant::So2 => "so2",
            Pollutant::Co => "co",
            Pollutant::O3 => "o3",
            Pollutant::Nh3 => "nh3",
        }
    }

    pub fn from_key(key: &str) -> Option<Pollutant> {
        Pollutant::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Breakpoint bands for this pollutant, ordered by concentration.
    pub fn bands(self) -> &'static [Band] {
        match self {
            Pollutant::Pm25 => &PM2_5_BANDS,
            Pollutant::Pm10 => &PM10_BANDS,
            Pollutant::No2 => &NO2_BANDS,
            Pollutant::So2 => &SO2_BANDS,
            Pollutant::Co => &CO_BANDS,
            Pollutant::O3 => &O3_BANDS,
            Pollutant::Nh3 => &NH3_BANDS,
        }
    }
}

/// One breakpoint band: a concentration range and the index range it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: f64,
    pub index_high: f64,
}

impl Band {
    const fn new(conc_low: f64, conc_high: f64, index_low: f64, index_high: f64) -> Self {
        Self {
            conc_low,
            conc_high,
            index_low,
            index_high,
        }
    }
}

const PM2_5_BANDS: [Band; 6] = [
    Band::new(0.0, 30.0, 0.0, 50.0),
    Band::new(31.0, 60.0, 51.0, 100.0),
    Band::new(61.0, 90.0, 101.0, 200.0),
    Band::new(91.0, 120.0, 201.0, 300.0),
    Band::new(121.0, 250.0, 301.0, 400.0),
    Band::new(251.0, 500.0, 401.0, 500.0),
];

const PM10_BANDS: [Band; 6] = [
    Band::new(0.0, 50.0, 0.0, 50.0),
    Band::new(51.0, 100.0, 51.0, 100.0),
    Band::new(101.0, 250.0, 101.0, 200.0),
    Band::new(251.0, 350.0, 201.0, 300.0),
    Band::new(351.0, 430.0, 301.0, 400.0),
    Band::new(431.0, 600.0, 401.0, 500.0),
];

const NO2_BANDS: [Band; 6] = [
    Band::new(0.0, 40.0, 0.0, 50.0),
    Band::new(41.0, 80.0, 51.0, 100.0),
    Band::new(81.0, 180.0, 101.0, 200.0),
    Band::new(181.0, 280.0, 201.0, 300.0),
    Band::new(281.0, 400.0, 301.0, 400.0),
    Band::new(401.0, 1000.0, 401.0, 500.0),
];

const SO2_BANDS: [Band; 6] = [
    Band::new(0.0, 40.0, 0.0, 50.0),
    Band::new(41.0, 80.0, 51.0, 100.0),
    Band::new(81.0, 380.0, 101.0, 200.0),
    Band::new(381.0, 800.0, 201.0, 300.0),
    Band::new(801.0, 1600.0, 301.0, 400.0),
    Band::new(1601.0, 2000.0, 401.0, 500.0),
];

const CO_BANDS: [Band; 6] = [
    Band::new(0.0, 1.0, 0.0, 50.0),
    Band::new(1.1, 2.0, 51.0, 100.0),
    Band::new(2.1, 10.0, 101.0, 200.0),
    Band::new(10.1, 17.0, 201.0, 300.0),
    Band::new(17.1, 34.0, 301.0, 400.0),
    Band::new(34.1, 50.0, 401.0, 500.0),
];

const O3_BANDS: [Band; 6] = [
    Band::new(0.0, 50.0, 0.0, 50.0),
    Band::new(51.0, 100.0, 51.0, 100.0),
    Band::new(101.0, 168.0, 101.0, 200.0),
    Band::new(169.0, 208.0, 201.0, 300.0),
    Band::new(209.0, 748.0, 301.0, 400.0),
    Band::new(749.0, 1000.0, 401.0, 500.0),
];

const NH3_BANDS: [Band; 6] = [
    Band::new(0.0, 200.0, 0.0, 50.0),
    Band::new(201.0, 400.0, 51.0, 100.0),
    Band::new(401.0, 800.0, 101.0, 200.0),
    Band::new(801.0, 1200.0, 201.0, 300.0),
    Band::new(1201.0, 1800.0, 301.0, 400.0),
    Band::new(1801.0, 3000.0, 401.0, 500.0),
];

/// Compute the sub-index for a pollutant concentration by linear
/// interpolation within the first matching band.
///
/// Returns `None` for NaN/non-finite values and for concentrations outside
/// every band (negative, above the top band, or inside a gap between bands).
/// Out-of-band means "no contribution", never an error, and never
/// extrapolates. Band edges map exactly to the band's index endpoints.
pub fn sub_index(pollutant: Pollutant, concentration: f64) -> Option<f64> {
    if !concentration.is_finite() {
        return None;
    }
    for band in pollutant.bands() {
        if concentration >= band.conc_low && concentration <= band.conc_high {
            let fraction = (concentration - band.conc_low) / (band.conc_high - band.conc_low);
            return Some(band.index_low + (band.index_high - band.index_low) * fraction);
        }
    }
    None
}

/// One row of pollutant concentrations. Historical rows may have holes;
/// serving-side validation requires all seven fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    #[serde(default)]
    pub pm2_5: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub no2: Option<f64>,
    #[serde(default)]
    pub so2: Option<f64>,
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub o3: Option<f64>,
    #[serde(default)]
    pub nh3: Option<f64>,
}

impl PollutantReading {
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm2_5,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
            Pollutant::Nh3 => self.nh3,
        }
    }
}

/// Aggregate a reading into its AQI value: the maximum sub-index across all
/// pollutants that produced one (dominant-pollutant rule).
///
/// Returns `None` when no pollutant produced a sub-index. Callers must treat
/// such readings as having no AQI, never as zero.
pub fn aggregate(reading: &PollutantReading) -> Option<f64> {
    let mut dominant: Option<f64> = None;
    for pollutant in Pollutant::ALL {
        let Some(concentration) = reading.get(pollutant) else {
            continue;
        };
        let Some(sub) = sub_index(pollutant, concentration) else {
            continue;
        };
        dominant = Some(match dominant {
            Some(current) if current >= sub => current,
            _ => sub,
        });
    }
    dominant
}

/// Integer AQI for a reading: the aggregate rounded to the nearest integer
/// (half away from zero), or `None` when the aggregate is undefined.
pub fn aqi(reading: &PollutantReading) -> Option<u32> {
    aggregate(reading).map(|value| value.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_return_exact_band_indices() {
        for pollutant in Pollutant::ALL {
            for band in pollutant.bands() {
                assert_eq!(
                    sub_index(pollutant, band.conc_low),
                    Some(band.index_low),
                    "{} low edge {}",
                    pollutant.key(),
                    band.conc_low
                );
                assert_eq!(
                    sub_index(pollutant, band.conc_high),
                    Some(band.index_high),
                    "{} high edge {}",
                    pollutant.key(),
                    band.conc_high
                );
            }
        }
    }

    #[test]
    fn sub_index_is_monotonic_within_band() {
        for pollutant in Pollutant::ALL {
            for band in pollutant.bands() {
                let quarter = band.conc_low + (band.conc_high - band.conc_low) * 0.25;
                let mid = band.conc_low + (band.conc_high - band.conc_low) * 0.5;
                let samples = [band.conc_low, quarter, mid, band.conc_high];
                let mut previous = f64::NEG_INFINITY;
                for sample in samples {
                    let value = sub_index(pollutant, sample).expect("in-band sample");
                    assert!(
                        value >= previous,
                        "{} not monotonic at {sample}",
                        pollutant.key()
                    );
                    previous = value;
                }
            }
        }
    }

    #[test]
    fn out_of_band_concentrations_have_no_sub_index() {
        assert_eq!(sub_index(Pollutant::Pm25, -1.0), None);
        assert_eq!(sub_index(Pollutant::Pm25, 500.1), None);
        assert_eq!(sub_index(Pollutant::Pm25, f64::NAN), None);
        assert_eq!(sub_index(Pollutant::Pm25, f64::INFINITY), None);
        // Gap between the first two pm2_5 bands (30, 31).
        assert_eq!(sub_index(Pollutant::Pm25, 30.5), None);
    }

    #[test]
    fn pollutant_keys_round_trip() {
        for pollutant in Pollutant::ALL {
            assert_eq!(Pollutant::from_key(pollutant.key()), Some(pollutant));
        }
        assert_eq!(Pollutant::from_key("benzene"), None);
    }

    #[test]
    fn aggregate_of_empty_reading_is_none() {
        assert_eq!(aggregate(&PollutantReading::default()), None);
    }

    #[test]
    fn aggregate_of_out_of_range_reading_is_none_not_zero() {
        let reading = PollutantReading {
            pm2_5: Some(-5.0),
            pm10: Some(9999.0),
            ..PollutantReading::default()
        };
        assert_eq!(aggregate(&reading), None);
    }

    #[test]
    fn aggregate_picks_dominant_pollutant() {
        let reading = PollutantReading {
            pm2_5: Some(40.0),
            pm10: Some(500.0),
            ..PollutantReading::default()
        };
        let expected = sub_index(Pollutant::Pm10, 500.0).expect("pm10 in band");
        assert_eq!(aggregate(&reading), Some(expected));
        assert!(expected > sub_index(Pollutant::Pm25, 40.0).expect("pm2_5 in band"));
    }

    #[test]
    fn aqi_rounds_the_aggregate() {
        let reading = PollutantReading {
            pm2_5: Some(40.0),
            ..PollutantReading::default()
        };
        // (100 - 51) / (60 - 31) * (40 - 31) + 51 = 66.206...
        assert_eq!(aqi(&reading), Some(66));
        assert_eq!(aqi(&PollutantReading::default()), None);
    }

    #[test]
    fn reading_deserializes_with_missing_fields() {
        let reading: PollutantReading =
            serde_json::from_str(r#"{"pm2_5": 12.5, "co": 0.8}"#).expect("parse reading");
        assert_eq!(reading.pm2_5, Some(12.5));
        assert_eq!(reading.co, Some(0.8));
        assert_eq!(reading.so2, None);
    }
}
