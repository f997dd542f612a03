use crate::error::DataLoadingError;
use chrono::{NaiveTime, TimeDelta, Weekday};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub type AirportCode = Arc<str>;

/// One timetable entry: a weekly departure, not yet bound to a date.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub flight_number: u32,
    pub day_of_week: Weekday,
    pub departure_time: NaiveTime,
    pub departure_airport: Arc<str>,
    pub departure_airport_code: AirportCode,
    pub arrival_time: NaiveTime,
    pub arrival_airport: Arc<str>,
    pub arrival_airport_code: AirportCode,
    pub duration: TimeDelta,
}

pub struct RouteCatalog {
    routes: Vec<Route>,
}

impl RouteCatalog {
    pub fn new(routes: Vec<Route>) -> Self {
        RouteCatalog { routes }
    }

    /// Loads a timetable from an XML file of `<Route>` elements.
    /// Child elements are matched by tag name.
    pub fn load(path: &Path) -> Result<Self, DataLoadingError> {
        let data = fs::read_to_string(path)?;
        Self::from_xml(&data)
    }

    pub fn from_xml(xml: &str) -> Result<Self, DataLoadingError> {
        let doc = roxmltree::Document::parse(xml)?;
        let mut routes = Vec::new();
        for node in doc.descendants().filter(|n| n.has_tag_name("Route")) {
            routes.push(parse_route(node)?);
        }
        Ok(RouteCatalog { routes })
    }

    pub fn find_by_day_of_week(&self, day: Weekday) -> Vec<&Route> {
        self.routes.iter().filter(|r| r.day_of_week == day).collect()
    }

    pub fn find_by_departure_airport_and_day(&self, airport: &str, day: Weekday) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|r| r.day_of_week == day && r.departure_airport_code.as_ref() == airport)
            .collect()
    }

    pub fn all(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn parse_route(node: roxmltree::Node<'_, '_>) -> Result<Route, DataLoadingError> {
    let text = |tag: &str| -> Result<String, DataLoadingError> {
        node.children()
            .find(|c| c.has_tag_name(tag))
            .and_then(|c| c.text())
            .map(|t| t.trim().to_owned())
            .ok_or_else(|| DataLoadingError::Malformed(format!("route missing <{}>", tag)))
    };

    let flight_number = text("FlightNumber")?
        .parse::<u32>()
        .map_err(|e| DataLoadingError::Malformed(format!("bad flight number: {}", e)))?;
    let day = text("DayOfWeek")?;
    let day_of_week = day
        .parse::<Weekday>()
        .map_err(|_| DataLoadingError::Malformed(format!("bad day of week {:?}", day)))?;
    let duration_text = text("Duration")?;
    let duration = parse_iso_duration(&duration_text).ok_or_else(|| {
        DataLoadingError::Malformed(format!("bad duration {:?}", duration_text))
    })?;

    Ok(Route {
        flight_number,
        day_of_week,
        departure_time: parse_time(&text("DepartureTime")?)?,
        departure_airport: text("DepartureAirport")?.into(),
        departure_airport_code: text("DepartureAirportCode")?.into(),
        arrival_time: parse_time(&text("ArrivalTime")?)?,
        arrival_airport: text("ArrivalAirport")?.into(),
        arrival_airport_code: text("ArrivalAirportCode")?.into(),
        duration,
    })
}

fn parse_time(text: &str) -> Result<NaiveTime, DataLoadingError> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|e| DataLoadingError::Malformed(format!("bad time {:?}: {}", text, e)))
}

/// Parses the ISO-8601 duration subset used by the timetable files,
/// e.g. "PT2H30M" or "P1DT4H".
pub fn parse_iso_duration(text: &str) -> Option<TimeDelta> {
    let rest = text.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut seconds = 0i64;
    if !date_part.is_empty() {
        seconds += date_part.strip_suffix('D')?.parse::<i64>().ok()? * 86_400;
    }
    let mut digits = String::new();
    for ch in time_part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let value = digits.parse::<i64>().ok()?;
        digits.clear();
        seconds += match ch {
            'H' => value * 3_600,
            'M' => value * 60,
            'S' => value,
            _ => return None,
        };
    }
    if !digits.is_empty() {
        return None;
    }
    Some(TimeDelta::seconds(seconds))
}
