use crate::aircraft::TypeCode;
use crate::error::DataLoadingError;
use crate::route::AirportCode;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub type CrewId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rank {
    Captain,
    FirstOfficer,
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::Captain => write!(f, "Captain"),
            Rank::FirstOfficer => write!(f, "First Officer"),
        }
    }
}

// Source files are inconsistent about rank casing ("Captain",
// "FIRST_OFFICER", "first officer"); normalize before matching.
impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.to_uppercase().replace(' ', "_").as_str() {
            "CAPTAIN" => Ok(Rank::Captain),
            "FIRST_OFFICER" => Ok(Rank::FirstOfficer),
            other => Err(serde::de::Error::custom(format!("unknown rank {:?}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pilot {
    pub id: CrewId,
    pub name: Arc<str>,
    pub home_base: AirportCode,
    pub rank: Rank,
    pub type_ratings: Vec<TypeCode>,
}

impl Pilot {
    pub fn is_qualified_for(&self, type_code: &str) -> bool {
        self.type_ratings.iter().any(|t| t.as_ref() == type_code)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CabinCrew {
    pub id: CrewId,
    pub name: Arc<str>,
    pub home_base: AirportCode,
    pub type_ratings: Vec<TypeCode>,
}

impl CabinCrew {
    pub fn is_qualified_for(&self, type_code: &str) -> bool {
        self.type_ratings.iter().any(|t| t.as_ref() == type_code)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CrewMember {
    Pilot(Pilot),
    CabinCrew(CabinCrew),
}

#[derive(Deserialize)]
struct RawPilot {
    forename: String,
    surname: String,
    homebase: AirportCode,
    rank: Rank,
    #[serde(rename = "typeRatings")]
    type_ratings: Vec<TypeCode>,
}

#[derive(Deserialize)]
struct RawCabinCrew {
    forename: String,
    surname: String,
    homebase: AirportCode,
    #[serde(rename = "typeRatings")]
    type_ratings: Vec<TypeCode>,
}

#[derive(Deserialize)]
struct RawCrewFile {
    pilots: Vec<RawPilot>,
    #[serde(rename = "cabincrew")]
    cabin_crew: Vec<RawCabinCrew>,
}

/// Read-only crew roster. Ids are assigned in load order and are the
/// identity used by conflict detection; enumeration order is source
/// order, which the scheduler treats as selection priority.
pub struct CrewCatalog {
    members: Vec<CrewMember>,
}

impl CrewCatalog {
    pub fn new(members: Vec<CrewMember>) -> Self {
        CrewCatalog { members }
    }

    /// Loads a roster from a JSON file of shape
    /// `{ "pilots": [...], "cabincrew": [...] }`.
    pub fn load(path: &Path) -> Result<Self, DataLoadingError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> Result<Self, DataLoadingError> {
        let raw: RawCrewFile = serde_json::from_str(json)?;
        let mut members = Vec::with_capacity(raw.pilots.len() + raw.cabin_crew.len());
        let mut next_id: CrewId = 0;
        for p in raw.pilots {
            members.push(CrewMember::Pilot(Pilot {
                id: next_id,
                name: format!("{} {}", p.forename, p.surname).into(),
                home_base: p.homebase,
                rank: p.rank,
                type_ratings: p.type_ratings,
            }));
            next_id += 1;
        }
        for c in raw.cabin_crew {
            members.push(CrewMember::CabinCrew(CabinCrew {
                id: next_id,
                name: format!("{} {}", c.forename, c.surname).into(),
                home_base: c.homebase,
                type_ratings: c.type_ratings,
            }));
            next_id += 1;
        }
        Ok(CrewCatalog { members })
    }

    fn pilots(&self) -> impl Iterator<Item = &Pilot> {
        self.members.iter().filter_map(|m| match m {
            CrewMember::Pilot(p) => Some(p),
            CrewMember::CabinCrew(_) => None,
        })
    }

    fn cabin_crew(&self) -> impl Iterator<Item = &CabinCrew> {
        self.members.iter().filter_map(|m| match m {
            CrewMember::CabinCrew(c) => Some(c),
            CrewMember::Pilot(_) => None,
        })
    }

    pub fn find_pilots_by_home_base_and_type_rating(
        &self,
        type_code: &str,
        airport: &str,
    ) -> Vec<&Pilot> {
        self.pilots()
            .filter(|p| p.home_base.as_ref() == airport && p.is_qualified_for(type_code))
            .collect()
    }

    pub fn find_pilots_by_type_rating(&self, type_code: &str) -> Vec<&Pilot> {
        self.pilots().filter(|p| p.is_qualified_for(type_code)).collect()
    }

    pub fn find_pilots_by_home_base(&self, airport: &str) -> Vec<&Pilot> {
        self.pilots()
            .filter(|p| p.home_base.as_ref() == airport)
            .collect()
    }

    pub fn all_pilots(&self) -> Vec<&Pilot> {
        self.pilots().collect()
    }

    pub fn find_cabin_crew_by_home_base_and_type_rating(
        &self,
        type_code: &str,
        airport: &str,
    ) -> Vec<&CabinCrew> {
        self.cabin_crew()
            .filter(|c| c.home_base.as_ref() == airport && c.is_qualified_for(type_code))
            .collect()
    }

    pub fn find_cabin_crew_by_type_rating(&self, type_code: &str) -> Vec<&CabinCrew> {
        self.cabin_crew()
            .filter(|c| c.is_qualified_for(type_code))
            .collect()
    }

    pub fn find_cabin_crew_by_home_base(&self, airport: &str) -> Vec<&CabinCrew> {
        self.cabin_crew()
            .filter(|c| c.home_base.as_ref() == airport)
            .collect()
    }

    pub fn all_cabin_crew(&self) -> Vec<&CabinCrew> {
        self.cabin_crew().collect()
    }

    pub fn all(&self) -> &[CrewMember] {
        &self.members
    }

    pub fn number_of_pilots(&self) -> usize {
        self.pilots().count()
    }

    pub fn number_of_cabin_crew(&self) -> usize {
        self.cabin_crew().count()
    }
}
