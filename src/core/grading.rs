//! Additive lead scoring.
//!
//! Three components are summed: the service/package tier, how soon the
//! visitor wants the work done, and the market segment of the vehicle make.
//! Budget is not part of the score.

use crate::catalog::Segment;
use crate::domain::{FunnelData, Grade, Service};

/// Makes scored as the luxury segment.
pub const LUXURY_MAKES: &[&str] = &[
    "Porsche",
    "BMW",
    "Mercedes-Benz",
    "Audi",
    "Lexus",
    "Lotus",
    "Bentley",
    "Rolls-Royce",
    "Ferrari",
    "Lamborghini",
    "McLaren",
    "Aston Martin",
];

/// Makes scored as the mid segment.
pub const MID_MAKES: &[&str] = &[
    "Ford",
    "Toyota",
    "Honda",
    "Nissan",
    "Volkswagen",
    "Hyundai",
    "Kia",
    "Mazda",
    "Subaru",
    "Mitsubishi",
];

pub const GRADE_A_THRESHOLD: u8 = 8;
pub const GRADE_B_THRESHOLD: u8 = 5;

/// Score breakdown for one lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadScore {
    pub service: u8,
    pub timing: u8,
    pub segment: u8,
}

impl LeadScore {
    pub fn total(&self) -> u8 {
        self.service + self.timing + self.segment
    }

    pub fn grade(&self) -> Grade {
        grade_for_total(self.total())
    }
}

/// Computes the score components. Unset inputs fall through to the defaults.
pub fn score_lead(
    service: Option<Service>,
    package: Option<&str>,
    timing: Option<&str>,
    make: Option<&str>,
) -> LeadScore {
    LeadScore {
        service: service_points(service, package),
        timing: timing_points(timing),
        segment: segment_points(segment_for_make(make)),
    }
}

/// Grades a lead from its service, package, timing, and vehicle make.
pub fn grade_lead(
    service: Option<Service>,
    package: Option<&str>,
    timing: Option<&str>,
    make: Option<&str>,
) -> Grade {
    score_lead(service, package, timing, make).grade()
}

/// Grades the current state of a funnel record.
pub fn grade_funnel(data: &FunnelData) -> Grade {
    grade_lead(
        data.service,
        data.package.as_deref(),
        data.timing.as_deref(),
        data.make.as_deref(),
    )
}

pub fn grade_for_total(total: u8) -> Grade {
    if total >= GRADE_A_THRESHOLD {
        Grade::A
    } else if total >= GRADE_B_THRESHOLD {
        Grade::B
    } else {
        Grade::C
    }
}

/// Segment by exact membership in the fixed make lists.
pub fn segment_for_make(make: Option<&str>) -> Segment {
    match make {
        Some(make) if LUXURY_MAKES.contains(&make) => Segment::Luxury,
        Some(make) if MID_MAKES.contains(&make) => Segment::Mid,
        _ => Segment::Entry,
    }
}

fn service_points(service: Option<Service>, package: Option<&str>) -> u8 {
    match (service, package) {
        (Some(Service::Ppf), Some("full_body")) => 5,
        (Some(Service::Wrapping), Some("full_wrap")) => 4,
        (Some(Service::Ppf), Some("full_front" | "track_pack")) => 3,
        (Some(Service::Detailing), _) => 2,
        _ => 0,
    }
}

fn timing_points(timing: Option<&str>) -> u8 {
    match timing {
        Some("asap") => 3,
        Some("this_week") => 2,
        _ => 1,
    }
}

fn segment_points(segment: Segment) -> u8 {
    match segment {
        Segment::Luxury => 3,
        Segment::Mid => 2,
        Segment::Entry => 1,
    }
}
