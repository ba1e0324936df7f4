//! Availability buckets used to colour station markers.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityLevel {
    /// Fewer than 2 bikes.
    Low,
    /// 2 to 10 bikes.
    Medium,
    /// More than 10 bikes.
    High,
}

impl AvailabilityLevel {
    pub fn from_count(available_bikes: u32) -> Self {
        match available_bikes {
            0..=1 => AvailabilityLevel::Low,
            2..=10 => AvailabilityLevel::Medium,
            _ => AvailabilityLevel::High,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AvailabilityLevel::Low => "#E74C3C",
            AvailabilityLevel::Medium => "#F39C12",
            AvailabilityLevel::High => "#2ECC71",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(AvailabilityLevel::from_count(0), AvailabilityLevel::Low);
        assert_eq!(AvailabilityLevel::from_count(1), AvailabilityLevel::Low);
        assert_eq!(AvailabilityLevel::from_count(2), AvailabilityLevel::Medium);
        assert_eq!(AvailabilityLevel::from_count(10), AvailabilityLevel::Medium);
        assert_eq!(AvailabilityLevel::from_count(11), AvailabilityLevel::High);
        assert_eq!(AvailabilityLevel::High.color(), "#2ECC71");
    }
}
