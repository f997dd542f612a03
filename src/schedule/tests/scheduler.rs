use crate::aircraft::AircraftCatalog;
use crate::crew::{CrewCatalog, CrewMember};
use crate::flight::FlightId;
use crate::forecast::ForecastCatalog;
use crate::schedule::schedule::Schedule;
use crate::schedule::scheduler::{Scheduler, UnresolvedReason, generate_schedule};
use crate::schedule::tests::utils::{
    aircraft, cabin, captain, date, first_officer, route, timetable,
};
use chrono::Weekday;

fn roster(pilots: Vec<crate::crew::Pilot>, cabin_crew: Vec<crate::crew::CabinCrew>) -> CrewCatalog {
    let members = pilots
        .into_iter()
        .map(CrewMember::Pilot)
        .chain(cabin_crew.into_iter().map(CrewMember::CabinCrew))
        .collect();
    CrewCatalog::new(members)
}

fn flight(flight_number: u32, day: u32) -> FlightId {
    FlightId {
        flight_number,
        date: date(2020, 7, day),
    }
}

#[test]
fn test_single_flight_fully_staffed() {
    let fleet = AircraftCatalog::new(vec![aircraft("G-AB", "A320", 180, 4, "MAN")]);
    let crew = roster(
        vec![captain(1, "MAN", &["A320"]), first_officer(2, "MAN", &["A320"])],
        (10..14).map(|i| cabin(i, "MAN", &["A320"])).collect(),
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);

    // One Monday in the first week of July 2020.
    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 1),
        date(2020, 7, 7),
    );

    assert!(schedule.is_completed());
    assert_eq!(schedule.completed_allocations().len(), 1);
    let report = schedule.last_report.as_ref().unwrap();
    assert_eq!(report.completed, 1);
    assert!(report.unresolved.is_empty());

    let allocation = schedule.allocation_for(flight(101, 6)).unwrap();
    assert_eq!(allocation.aircraft.as_ref().unwrap().tail_code.as_ref(), "G-AB");
    assert_eq!(allocation.captain.as_ref().unwrap().id, 1);
    assert_eq!(allocation.first_officer.as_ref().unwrap().id, 2);
    assert_eq!(allocation.cabin_crew.len(), 4);
}

#[test]
fn test_cabin_crew_starvation_leaves_flight_unresolved() {
    let fleet = AircraftCatalog::new(vec![aircraft("G-AB", "A320", 180, 4, "MAN")]);
    let crew = roster(
        vec![captain(1, "MAN", &["A320"]), first_officer(2, "MAN", &["A320"])],
        (10..13).map(|i| cabin(i, "MAN", &["A320"])).collect(),
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 1),
        date(2020, 7, 7),
    );

    assert!(!schedule.is_completed());
    let report = schedule.last_report.as_ref().unwrap();
    assert_eq!(report.completed, 0);
    assert_eq!(
        report.unresolved,
        vec![(
            flight(101, 6),
            UnresolvedReason::InsufficientCabinCrew {
                required: 4,
                found: 3
            }
        )]
    );
    // The failed attempt must not leave partial bindings behind.
    assert!(schedule.allocation_for(flight(101, 6)).unwrap().is_empty());
}

#[test]
fn test_pilot_fallback_to_other_home_base() {
    let fleet = AircraftCatalog::new(vec![aircraft("G-AB", "A320", 180, 1, "MAN")]);
    // Nobody is based at MAN; the type-rated LGW crew still staffs it.
    let crew = roster(
        vec![captain(1, "LGW", &["A320"]), first_officer(2, "LGW", &["A320"])],
        vec![cabin(10, "LGW", &["A320"])],
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    assert!(schedule.is_completed());
}

#[test]
fn test_home_base_crew_preferred() {
    let fleet = AircraftCatalog::new(vec![aircraft("G-AB", "A320", 180, 1, "MAN")]);
    // The LGW captain appears first in the roster but tier one goes to
    // the MAN-based one.
    let crew = roster(
        vec![
            captain(1, "LGW", &["A320"]),
            captain(2, "MAN", &["A320"]),
            first_officer(3, "MAN", &["A320"]),
        ],
        vec![cabin(10, "MAN", &["A320"])],
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    assert!(schedule.is_completed());
    let allocation = schedule.allocation_for(flight(101, 6)).unwrap();
    assert_eq!(allocation.captain.as_ref().unwrap().id, 2);
}

#[test]
fn test_best_fit_prefers_smallest_sufficient_aircraft() {
    let fleet = AircraftCatalog::new(vec![
        aircraft("G-BIG", "A330", 290, 1, "MAN"),
        aircraft("G-SML", "A320", 180, 1, "MAN"),
    ]);
    let crew = roster(
        vec![
            captain(1, "MAN", &["A320", "A330"]),
            first_officer(2, "MAN", &["A320", "A330"]),
        ],
        vec![cabin(10, "MAN", &["A320", "A330"])],
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);
    let forecasts = ForecastCatalog::from_records([(101, date(2020, 7, 6), 150)]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &forecasts,
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    let allocation = schedule.allocation_for(flight(101, 6)).unwrap();
    assert_eq!(allocation.aircraft.as_ref().unwrap().tail_code.as_ref(), "G-SML");
}

#[test]
fn test_overloaded_flight_gets_largest_aircraft() {
    let fleet = AircraftCatalog::new(vec![
        aircraft("G-SML", "A320", 180, 1, "MAN"),
        aircraft("G-BIG", "A330", 290, 1, "MAN"),
    ]);
    let crew = roster(
        vec![
            captain(1, "MAN", &["A320", "A330"]),
            first_officer(2, "MAN", &["A320", "A330"]),
        ],
        vec![cabin(10, "MAN", &["A320", "A330"])],
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);
    // Demand beyond every hull; the largest one caps the loss.
    let forecasts = ForecastCatalog::from_records([(101, date(2020, 7, 6), 400)]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &forecasts,
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    let allocation = schedule.allocation_for(flight(101, 6)).unwrap();
    assert_eq!(allocation.aircraft.as_ref().unwrap().tail_code.as_ref(), "G-BIG");
}

#[test]
fn test_missing_forecast_defaults_to_smallest_aircraft() {
    let fleet = AircraftCatalog::new(vec![
        aircraft("G-BIG", "A330", 290, 1, "MAN"),
        aircraft("G-SML", "A320", 180, 1, "MAN"),
    ]);
    let crew = roster(
        vec![
            captain(1, "MAN", &["A320", "A330"]),
            first_officer(2, "MAN", &["A320", "A330"]),
        ],
        vec![cabin(10, "MAN", &["A320", "A330"])],
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    let allocation = schedule.allocation_for(flight(101, 6)).unwrap();
    assert_eq!(allocation.aircraft.as_ref().unwrap().tail_code.as_ref(), "G-SML");
}

#[test]
fn test_aircraft_flies_out_and_back() {
    let fleet = AircraftCatalog::new(vec![aircraft("G-AB", "A320", 180, 1, "MAN")]);
    let crew = roster(
        vec![captain(1, "MAN", &["A320"]), first_officer(2, "MAN", &["A320"])],
        vec![cabin(10, "MAN", &["A320"])],
    );
    let routes = timetable(vec![
        route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H"),
        route(102, Weekday::Mon, "19:00", "JFK", "MAN", "PT7H30M"),
    ]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    assert!(schedule.is_completed());
    assert_eq!(schedule.completed_allocations().len(), 2);
    let out = schedule.allocation_for(flight(101, 6)).unwrap();
    let back = schedule.allocation_for(flight(102, 6)).unwrap();
    assert_eq!(out.aircraft, back.aircraft);
    assert_eq!(out.captain, back.captain);
}

#[test]
fn test_concurrent_flights_compete_for_one_crew() {
    let fleet = AircraftCatalog::new(vec![
        aircraft("G-AB", "A320", 180, 1, "MAN"),
        aircraft("G-CD", "A320", 180, 1, "MAN"),
    ]);
    let crew = roster(
        vec![captain(1, "MAN", &["A320"]), first_officer(2, "MAN", &["A320"])],
        vec![cabin(10, "MAN", &["A320"])],
    );
    let routes = timetable(vec![
        route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H"),
        route(103, Weekday::Mon, "10:00", "MAN", "AGP", "PT2H45M"),
    ]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    let report = schedule.last_report.as_ref().unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(schedule.remaining_allocations().len(), 1);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].1, UnresolvedReason::NoCaptainAvailable);
}

#[test]
fn test_empty_timetable_completes_immediately() {
    let fleet = AircraftCatalog::new(vec![]);
    let crew = roster(vec![], vec![]);
    let routes = timetable(vec![]);

    let mut schedule = Schedule::new(&routes, date(2020, 7, 1), date(2020, 7, 31));
    let report = Scheduler::new(&fleet, &crew, &ForecastCatalog::empty()).run(&mut schedule);

    assert!(schedule.is_completed());
    assert_eq!(report.attempts, 0);
}

#[test]
fn test_no_aircraft_reported() {
    let fleet = AircraftCatalog::new(vec![]);
    let crew = roster(
        vec![captain(1, "MAN", &["A320"]), first_officer(2, "MAN", &["A320"])],
        vec![cabin(10, "MAN", &["A320"])],
    );
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 6),
        date(2020, 7, 6),
    );

    let report = schedule.last_report.as_ref().unwrap();
    assert_eq!(
        report.unresolved,
        vec![(flight(101, 6), UnresolvedReason::NoAircraftAvailable)]
    );
}

#[test]
fn test_run_terminates_after_full_pass_without_progress() {
    let fleet = AircraftCatalog::new(vec![aircraft("G-AB", "A320", 180, 2, "MAN")]);
    let crew = roster(vec![captain(1, "MAN", &["A320"])], vec![]);
    // Two identical Mondays, neither staffable without a first officer.
    let routes = timetable(vec![route(101, Weekday::Mon, "09:00", "MAN", "JFK", "PT8H")]);

    let schedule = generate_schedule(
        &fleet,
        &crew,
        &routes,
        &ForecastCatalog::empty(),
        date(2020, 7, 1),
        date(2020, 7, 14),
    );

    let report = schedule.last_report.as_ref().unwrap();
    assert_eq!(report.completed, 0);
    assert_eq!(report.attempts, 2);
    assert_eq!(report.unresolved.len(), 2);
    assert!(report
        .unresolved
        .iter()
        .all(|(_, reason)| *reason == UnresolvedReason::NoFirstOfficerAvailable));
}
