//! The five funnel steps and the rules that gate leaving each one.

use std::fmt;

use crate::domain::{present, FunnelData, Service};

pub const TOTAL_STEPS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Service,
    Vehicle,
    Package,
    ConditionTiming,
    Contact,
}

impl Step {
    pub const ALL: [Step; TOTAL_STEPS as usize] = [
        Step::Service,
        Step::Vehicle,
        Step::Package,
        Step::ConditionTiming,
        Step::Contact,
    ];

    /// One-based position in the funnel.
    pub fn index(self) -> u8 {
        match self {
            Step::Service => 1,
            Step::Vehicle => 2,
            Step::Package => 3,
            Step::ConditionTiming => 4,
            Step::Contact => 5,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_index(self.index().checked_sub(1)?)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Service => "Choose your service",
            Step::Vehicle => "Tell us about your car",
            Step::Package => "Pick a package",
            Step::ConditionTiming => "Condition and timing",
            Step::Contact => "Where should we send your quote?",
        }
    }

    pub fn is_last(self) -> bool {
        self == Step::Contact
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}: {}", self.index(), TOTAL_STEPS, self.title())
    }
}

/// Why the user cannot continue past `step`, or `None` when they can.
pub fn blocking_reason(step: Step, data: &FunnelData) -> Option<&'static str> {
    match step {
        Step::Service => data.service.is_none().then_some("Select a service to continue"),
        Step::Vehicle => {
            let complete = present(&data.year).is_some()
                && present(&data.make).is_some()
                && present(&data.model).is_some();
            (!complete).then_some("Select year, make and model to continue")
        }
        Step::Package => {
            if present(&data.package).is_none() {
                Some("Select a package to continue")
            } else if data.service == Some(Service::Wrapping) && present(&data.finish).is_none() {
                Some("Select a finish to continue")
            } else {
                None
            }
        }
        Step::ConditionTiming => {
            if present(&data.condition).is_none() {
                Some("Select vehicle condition to continue")
            } else if present(&data.timing).is_none() {
                Some("Select timing to continue")
            } else {
                None
            }
        }
        Step::Contact => present(&data.name)
            .is_none()
            .then_some("Enter your name to continue"),
    }
}

pub fn can_proceed(step: Step, data: &FunnelData) -> bool {
    blocking_reason(step, data).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_round_trip_and_stay_in_range() {
        for step in Step::ALL {
            assert_eq!(Step::from_index(step.index()), Some(step));
        }
        assert_eq!(Step::from_index(0), None);
        assert_eq!(Step::from_index(6), None);
        assert_eq!(Step::Contact.next(), None);
        assert_eq!(Step::Service.previous(), None);
    }

    #[test]
    fn wrapping_requires_a_finish_but_ppf_does_not() {
        let mut data = FunnelData {
            service: Some(Service::Wrapping),
            package: Some("full_wrap".into()),
            ..FunnelData::default()
        };
        assert_eq!(
            blocking_reason(Step::Package, &data),
            Some("Select a finish to continue")
        );

        data.service = Some(Service::Ppf);
        assert!(can_proceed(Step::Package, &data));
    }

    #[test]
    fn vehicle_step_needs_all_three_fields() {
        let data = FunnelData {
            year: Some("2024".into()),
            make: Some("BMW".into()),
            model: Some("   ".into()),
            ..FunnelData::default()
        };
        assert!(!can_proceed(Step::Vehicle, &data));
    }

    #[test]
    fn condition_is_checked_before_timing() {
        let mut data = FunnelData::default();
        assert_eq!(
            blocking_reason(Step::ConditionTiming, &data),
            Some("Select vehicle condition to continue")
        );
        data.condition = Some("good".into());
        assert_eq!(
            blocking_reason(Step::ConditionTiming, &data),
            Some("Select timing to continue")
        );
    }

    #[test]
    fn display_includes_progress() {
        assert_eq!(Step::Package.to_string(), "Step 3 of 5: Pick a package");
    }
}
