use crate::route::{Route, RouteCatalog};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::fmt;

/// Identity of a flight instance: a route realized on one calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightId {
    pub flight_number: u32,
    pub date: NaiveDate,
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.flight_number, self.date)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlightInstance {
    pub route: Route,
    pub date: NaiveDate,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
}

impl FlightInstance {
    pub fn new(route: Route, date: NaiveDate) -> Self {
        let departure = date.and_time(route.departure_time);
        // Arrival comes from the duration, so overnight flights land on
        // the following day regardless of the timetable's arrival clock.
        let arrival = departure + route.duration;
        FlightInstance {
            route,
            date,
            departure,
            arrival,
        }
    }

    pub fn id(&self) -> FlightId {
        FlightId {
            flight_number: self.route.flight_number,
            date: self.date,
        }
    }

    /// Half-open duty windows: touching end-to-start is not an overlap.
    pub fn overlaps(&self, other: &FlightInstance) -> bool {
        self.departure < other.arrival && other.departure < self.arrival
    }
}

/// Derives the concrete set of date-stamped departures to schedule:
/// one instance per route per calendar date in `[from, to]` whose
/// weekday matches the route's day of week.
pub fn expand_instances(routes: &RouteCatalog, from: NaiveDate, to: NaiveDate) -> Vec<FlightInstance> {
    let mut instances = Vec::new();
    for date in from.iter_days().take_while(|d| *d <= to) {
        for route in routes.find_by_day_of_week(date.weekday()) {
            instances.push(FlightInstance::new(route.clone(), date));
        }
    }
    instances
}
