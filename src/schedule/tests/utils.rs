use crate::aircraft::Aircraft;
use crate::crew::{CabinCrew, CrewId, Pilot, Rank};
use crate::route::{Route, RouteCatalog, parse_iso_duration};
use chrono::{NaiveDate, NaiveTime, Weekday};
use proptest::prelude::Strategy;
use proptest::prop_oneof;
use proptest::strategy::Just;
use std::sync::Arc;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn aircraft(
    tail_code: &str,
    type_code: &str,
    seats: u32,
    cabin_crew_required: u32,
    starting_position: &str,
) -> Aircraft {
    Aircraft {
        tail_code: id(tail_code),
        type_code: id(type_code),
        manufacturer: id("Airbus"),
        model: id("A320"),
        seats,
        cabin_crew_required,
        starting_position: id(starting_position),
    }
}

pub fn captain(crew_id: CrewId, home_base: &str, type_ratings: &[&str]) -> Pilot {
    pilot(crew_id, home_base, Rank::Captain, type_ratings)
}

pub fn first_officer(crew_id: CrewId, home_base: &str, type_ratings: &[&str]) -> Pilot {
    pilot(crew_id, home_base, Rank::FirstOfficer, type_ratings)
}

pub fn pilot(crew_id: CrewId, home_base: &str, rank: Rank, type_ratings: &[&str]) -> Pilot {
    Pilot {
        id: crew_id,
        name: id("Test Pilot"),
        home_base: id(home_base),
        rank,
        type_ratings: type_ratings.iter().map(|t| id(t)).collect(),
    }
}

pub fn cabin(crew_id: CrewId, home_base: &str, type_ratings: &[&str]) -> CabinCrew {
    CabinCrew {
        id: crew_id,
        name: id("Test Crew"),
        home_base: id(home_base),
        type_ratings: type_ratings.iter().map(|t| id(t)).collect(),
    }
}

pub fn route(
    flight_number: u32,
    day_of_week: Weekday,
    departure_time: &str,
    from: &str,
    to: &str,
    duration: &str,
) -> Route {
    let departure_time = NaiveTime::parse_from_str(departure_time, "%H:%M").unwrap();
    let duration = parse_iso_duration(duration).unwrap();
    Route {
        flight_number,
        day_of_week,
        departure_time,
        departure_airport: id(from),
        departure_airport_code: id(from),
        arrival_time: departure_time + duration,
        arrival_airport: id(to),
        arrival_airport_code: id(to),
        duration,
    }
}

pub fn timetable(routes: Vec<Route>) -> RouteCatalog {
    RouteCatalog::new(routes)
}

pub fn arb_airport() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("MAN"), Just("LGW"), Just("JFK"), Just("AGP")]
}

pub fn arb_route(flight_number: u32) -> impl Strategy<Value = Route> {
    (arb_airport(), arb_airport(), 0u32..20, 1u32..10).prop_map(
        move |(from, to, dep_hour, duration_hours)| {
            let departure_time = NaiveTime::from_hms_opt(dep_hour, 0, 0).unwrap();
            let duration = chrono::TimeDelta::hours(duration_hours as i64);
            Route {
                flight_number,
                day_of_week: Weekday::Mon,
                departure_time,
                departure_airport: id(from),
                departure_airport_code: id(from),
                arrival_time: departure_time + duration,
                arrival_airport: id(to),
                arrival_airport_code: id(to),
                duration,
            }
        },
    )
}
