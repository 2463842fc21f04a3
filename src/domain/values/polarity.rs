use serde::{Deserialize, Serialize};

/// Sentiment polarity in [-1, 1]; negative means negative sentiment.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64")]
pub struct Polarity(f64);

impl Polarity {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
            return Err(format!(
                "Polarity must be between -1.0 and 1.0, got {value}"
            ));
        }
        Ok(Polarity(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Polarity {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Polarity::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Polarity::new(-1.0).is_ok());
        assert!(Polarity::new(1.0).is_ok());
        assert!(Polarity::new(1.0001).is_err());
        assert!(Polarity::new(f64::NAN).is_err());
    }

    #[test]
    fn test_deserialize_checks_bounds() {
        let p: Polarity = serde_json::from_str("-0.25").unwrap();
        assert_eq!(p.value(), -0.25);
        assert!(serde_json::from_str::<Polarity>("1.5").is_err());
    }
}
