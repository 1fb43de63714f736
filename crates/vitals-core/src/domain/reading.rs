//! The `VitalsReading` record and the closed ranges its fields are drawn from.
//!
//! A reading is four independent integer metrics.  There is no physiological
//! correlation between fields or between successive readings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A closed integer range `[min, max]` for one named reading field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    /// Field name as it appears on the wire.
    pub name: &'static str,
    pub min: u16,
    pub max: u16,
}

impl FieldRange {
    /// Returns `true` if `value` lies within `[min, max]`.
    pub fn contains(&self, value: u16) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn check(&self, value: u16) -> Result<(), RangeError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(RangeError {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const HEART_RATE: FieldRange = FieldRange {
    name: "heart_rate",
    min: 60,
    max: 100,
};

pub const BLOOD_PRESSURE_SYSTOLIC: FieldRange = FieldRange {
    name: "blood_pressure_systolic",
    min: 118,
    max: 120,
};

pub const BLOOD_PRESSURE_DIASTOLIC: FieldRange = FieldRange {
    name: "blood_pressure_diastolic",
    min: 79,
    max: 80,
};

pub const RESPIRATION_RATE: FieldRange = FieldRange {
    name: "respiration_rate",
    min: 12,
    max: 20,
};

/// A field value fell outside its declared range.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field} = {value} is outside [{min}, {max}]")]
pub struct RangeError {
    pub field: &'static str,
    pub value: u16,
    pub min: u16,
    pub max: u16,
}

/// One synthetic sample of four physiological metrics.
///
/// Serialises to a flat JSON object with exactly these four keys.  Unknown
/// keys are rejected on deserialisation, and every key is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VitalsReading {
    /// Beats per minute, in `[60, 100]`.
    pub heart_rate: u16,
    /// mmHg, in `[118, 120]`.
    pub blood_pressure_systolic: u16,
    /// mmHg, in `[79, 80]`.
    pub blood_pressure_diastolic: u16,
    /// Breaths per minute, in `[12, 20]`.
    pub respiration_rate: u16,
}

impl VitalsReading {
    /// All four field ranges, in wire order.
    pub const RANGES: [FieldRange; 4] = [
        HEART_RATE,
        BLOOD_PRESSURE_SYSTOLIC,
        BLOOD_PRESSURE_DIASTOLIC,
        RESPIRATION_RATE,
    ];

    /// Checks every field against its declared range.
    ///
    /// # Errors
    ///
    /// Returns the first [`RangeError`] found, in wire order.
    pub fn validate(&self) -> Result<(), RangeError> {
        HEART_RATE.check(self.heart_rate)?;
        BLOOD_PRESSURE_SYSTOLIC.check(self.blood_pressure_systolic)?;
        BLOOD_PRESSURE_DIASTOLIC.check(self.blood_pressure_diastolic)?;
        RESPIRATION_RATE.check(self.respiration_rate)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal() -> VitalsReading {
        VitalsReading {
            heart_rate: 72,
            blood_pressure_systolic: 119,
            blood_pressure_diastolic: 80,
            respiration_rate: 14,
        }
    }

    #[test]
    fn test_validate_accepts_nominal_reading() {
        assert_eq!(nominal().validate(), Ok(()));
    }

    #[test]
    fn test_validate_accepts_range_boundaries() {
        let low = VitalsReading {
            heart_rate: 60,
            blood_pressure_systolic: 118,
            blood_pressure_diastolic: 79,
            respiration_rate: 12,
        };
        let high = VitalsReading {
            heart_rate: 100,
            blood_pressure_systolic: 120,
            blood_pressure_diastolic: 80,
            respiration_rate: 20,
        };
        assert!(low.validate().is_ok());
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_heart_rate_above_max() {
        // Arrange
        let reading = VitalsReading {
            heart_rate: 101,
            ..nominal()
        };

        // Act
        let err = reading.validate().unwrap_err();

        // Assert
        assert_eq!(err.field, "heart_rate");
        assert_eq!(err.value, 101);
        assert_eq!((err.min, err.max), (60, 100));
    }

    #[test]
    fn test_validate_reports_diastolic_below_min() {
        let reading = VitalsReading {
            blood_pressure_diastolic: 78,
            ..nominal()
        };
        let err = reading.validate().unwrap_err();
        assert_eq!(err.field, "blood_pressure_diastolic");
    }

    #[test]
    fn test_validate_reports_first_offending_field_in_wire_order() {
        let reading = VitalsReading {
            heart_rate: 0,
            blood_pressure_systolic: 0,
            blood_pressure_diastolic: 0,
            respiration_rate: 0,
        };
        assert_eq!(reading.validate().unwrap_err().field, "heart_rate");
    }

    #[test]
    fn test_range_error_display_names_field_and_bounds() {
        let err = RangeError {
            field: "respiration_rate",
            value: 25,
            min: 12,
            max: 20,
        };
        assert_eq!(err.to_string(), "respiration_rate = 25 is outside [12, 20]");
    }

    #[test]
    fn test_ranges_are_listed_in_wire_order() {
        let names: Vec<_> = VitalsReading::RANGES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "heart_rate",
                "blood_pressure_systolic",
                "blood_pressure_diastolic",
                "respiration_rate"
            ]
        );
    }
}
