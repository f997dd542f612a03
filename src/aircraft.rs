use crate::error::DataLoadingError;
use crate::route::AirportCode;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub type TailCode = Arc<str>;
pub type TypeCode = Arc<str>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub tail_code: TailCode,
    pub type_code: TypeCode,
    pub manufacturer: Arc<str>,
    pub model: Arc<str>,
    pub seats: u32,
    pub cabin_crew_required: u32,
    pub starting_position: AirportCode,
}

/// Read-only fleet snapshot. Enumeration order is source order and is
/// stable across calls; the scheduler treats it as selection priority.
pub struct AircraftCatalog {
    aircraft: Vec<Aircraft>,
}

impl AircraftCatalog {
    pub fn new(aircraft: Vec<Aircraft>) -> Self {
        AircraftCatalog { aircraft }
    }

    /// Loads a fleet from a CSV file with a header row:
    /// tail_code,type_code,manufacturer,model,seats,cabin_crew_required,starting_position
    pub fn load(path: &Path) -> Result<Self, DataLoadingError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, DataLoadingError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut aircraft = Vec::new();
        for record in csv.deserialize() {
            aircraft.push(record?);
        }
        Ok(AircraftCatalog { aircraft })
    }

    pub fn find_by_starting_position(&self, airport: &str) -> Vec<&Aircraft> {
        self.aircraft
            .iter()
            .filter(|a| a.starting_position.as_ref() == airport)
            .collect()
    }

    pub fn find_by_seats(&self, min_seats: u32) -> Vec<&Aircraft> {
        self.aircraft.iter().filter(|a| a.seats >= min_seats).collect()
    }

    pub fn find_by_tail_code(&self, tail_code: &str) -> Option<&Aircraft> {
        self.aircraft
            .iter()
            .find(|a| a.tail_code.eq_ignore_ascii_case(tail_code))
    }

    pub fn find_by_type(&self, type_code: &str) -> Vec<&Aircraft> {
        self.aircraft
            .iter()
            .filter(|a| a.type_code.as_ref() == type_code)
            .collect()
    }

    pub fn all(&self) -> &[Aircraft] {
        &self.aircraft
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }
}
