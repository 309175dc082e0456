//! Physical constants.
//!
//! Values are CODATA 2018 exact or recommended values.

use crate::FloatValue;

/// Molar gas constant
/// unit: J / (mol K)
pub const GAS_CONSTANT: FloatValue = 8.314462618;

/// Faraday constant
/// unit: C / mol
pub const FARADAY: FloatValue = 96485.33212;

/// 0 °C expressed in kelvin
pub const ZERO_CELSIUS: FloatValue = 273.15;

/// Temperature used when a caller does not request one (25 °C)
/// unit: K
pub const DEFAULT_TEMPERATURE: FloatValue = 298.15;

/// Seconds per hour, used to convert capacities in Ah to coulombs
pub const SECONDS_PER_HOUR: FloatValue = 3600.0;

/// Thermal voltage $V_T = RT/F$
/// unit: V
pub fn thermal_voltage(temperature: FloatValue) -> FloatValue {
    GAS_CONSTANT * temperature / FARADAY
}

/// Inverse thermal voltage $f = F/(RT)$
/// unit: 1/V
pub fn inverse_thermal_voltage(temperature: FloatValue) -> FloatValue {
    FARADAY / (GAS_CONSTANT * temperature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_voltage_at_room_temperature() {
        // ~25.69 mV at 25 °C
        let vt = thermal_voltage(DEFAULT_TEMPERATURE);
        assert!((vt - 0.025693).abs() < 1e-6, "VT = {}", vt);
        assert!((vt * inverse_thermal_voltage(DEFAULT_TEMPERATURE) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_default_temperature_is_25_celsius() {
        assert_eq!(DEFAULT_TEMPERATURE, ZERO_CELSIUS + 25.0);
    }
}
