use std::collections::BTreeSet;
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

const YEAR_SPAN: i32 = 50;

/// Market segment used by lead grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Luxury,
    Mid,
    Entry,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Segment::Luxury => "luxury",
            Segment::Mid => "mid",
            Segment::Entry => "entry",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub segment: Segment,
}

/// Fixed year/make/model reference list backing the vehicle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCatalog {
    vehicles: Vec<Vehicle>,
}

impl VehicleCatalog {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self { vehicles }
    }

    pub fn builtin() -> Self {
        const MODELS: &[(&str, &[&str], Segment)] = &[
            ("Audi", &["A4", "A6", "Q5", "Q7", "RS6"], Segment::Luxury),
            ("BMW", &["M3", "M4", "X5", "5 Series"], Segment::Luxury),
            ("Bentley", &["Bentayga", "Continental GT"], Segment::Luxury),
            ("Ferrari", &["296 GTB", "Roma", "SF90"], Segment::Luxury),
            ("Lamborghini", &["Huracan", "Urus"], Segment::Luxury),
            ("Lexus", &["ES", "LX", "RX"], Segment::Luxury),
            ("Mercedes-Benz", &["C-Class", "E-Class", "G-Class", "S-Class"], Segment::Luxury),
            ("Porsche", &["911", "Cayenne", "Macan", "Taycan"], Segment::Luxury),
            ("Rolls-Royce", &["Cullinan", "Ghost"], Segment::Luxury),
            ("Ford", &["Explorer", "F-150", "Mustang"], Segment::Mid),
            ("Honda", &["Accord", "Civic", "CR-V"], Segment::Mid),
            ("Hyundai", &["Elantra", "Santa Fe", "Tucson"], Segment::Mid),
            ("Kia", &["K5", "Sportage", "Telluride"], Segment::Mid),
            ("Nissan", &["Altima", "Patrol", "Sunny"], Segment::Mid),
            ("Toyota", &["Camry", "Corolla", "Land Cruiser", "Supra"], Segment::Mid),
            ("Volkswagen", &["Golf", "Tiguan", "Touareg"], Segment::Mid),
            ("Chery", &["Tiggo 7", "Arrizo 6"], Segment::Entry),
            ("MG", &["MG5", "ZS"], Segment::Entry),
            ("Tesla", &["Model 3", "Model Y"], Segment::Entry),
        ];

        let mut vehicles = Vec::new();
        for year in 2018..=2025 {
            for (make, models, segment) in MODELS {
                for model in *models {
                    vehicles.push(Vehicle {
                        year,
                        make: (*make).to_string(),
                        model: (*model).to_string(),
                        segment: *segment,
                    });
                }
            }
        }
        Self::new(vehicles)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Selectable years, newest first, starting at next calendar year.
    pub fn years() -> Vec<String> {
        years_from(chrono::Local::now().year())
    }

    /// Unique makes, sorted alphabetically.
    pub fn makes(&self) -> Vec<String> {
        self.vehicles
            .iter()
            .map(|vehicle| vehicle.make.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Models known for a year and a (partial, case-insensitive) make.
    pub fn models_for(&self, year: &str, make: &str) -> Vec<String> {
        let year = year.trim();
        let make = make.trim().to_lowercase();
        if year.is_empty() || make.is_empty() {
            return Vec::new();
        }
        self.vehicles
            .iter()
            .filter(|vehicle| vehicle.year.to_string() == year)
            .filter(|vehicle| vehicle.make.to_lowercase().contains(&make))
            .map(|vehicle| vehicle.model.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn segment_of(&self, make: &str) -> Option<Segment> {
        self.vehicles
            .iter()
            .find(|vehicle| vehicle.make.eq_ignore_ascii_case(make.trim()))
            .map(|vehicle| vehicle.segment)
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Year options for a given current year: `current + 1` back across fifty years.
pub fn years_from(current_year: i32) -> Vec<String> {
    (0..YEAR_SPAN)
        .map(|offset| (current_year + 1 - offset).to_string())
        .collect()
}
