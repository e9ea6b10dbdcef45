//! Display-string formatting for evaluated values (spec §4.6), with the
//! numeric decimal-place count as the one configurable knob (spec §9 open
//! question: resolved as a configuration value, default `1`).

use lattice_common::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub decimal_places: u8,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig { decimal_places: 1 }
    }
}

/// Render a value for display, per spec §4.6: numbers at a fixed decimal
/// precision, booleans as `True`/`False`, errors as their sentinel, arrays
/// as their first element (matching the engine's own numeric/text
/// coercion rule for a value used in a scalar context).
pub fn format_value(value: &Value, config: &ProcessorConfig) -> String {
    match value {
        Value::Number(n) => format!("{:.*}", config.decimal_places as usize, n),
        Value::Array(items) => match items.first() {
            Some(first) => format_value(first, config),
            None => String::new(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_common::ErrorKind;

    #[test]
    fn formats_number_at_configured_precision() {
        let config = ProcessorConfig { decimal_places: 2 };
        assert_eq!(format_value(&Value::Number(3.14159), &config), "3.14");
    }

    #[test]
    fn default_precision_is_one_decimal_place() {
        let config = ProcessorConfig::default();
        assert_eq!(format_value(&Value::Number(3.0), &config), "3.0");
    }

    #[test]
    fn formats_error_sentinel() {
        let config = ProcessorConfig::default();
        assert_eq!(format_value(&Value::Error(ErrorKind::Div0), &config), "#DIV/0!");
    }

    #[test]
    fn formats_bool_title_case() {
        let config = ProcessorConfig::default();
        assert_eq!(format_value(&Value::Bool(true), &config), "True");
    }
}
