use crate::error::DataLoadingError;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

/// Passenger-demand forecasts keyed by flight number and date.
/// A missing entry means the demand is unknown, which the scheduler
/// must treat as "no preference" rather than an error.
pub struct ForecastCatalog {
    entries: HashMap<(u32, NaiveDate), u32>,
}

impl ForecastCatalog {
    pub fn empty() -> Self {
        ForecastCatalog {
            entries: HashMap::new(),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = (u32, NaiveDate, u32)>) -> Self {
        ForecastCatalog {
            entries: records
                .into_iter()
                .map(|(flight, date, passengers)| ((flight, date), passengers))
                .collect(),
        }
    }

    /// Loads forecasts from an SQLite database with a
    /// `PassengerNumbers(Date, FlightNumber, Passengers)` table.
    /// Later rows win on duplicate keys.
    pub fn load(path: &Path) -> Result<Self, DataLoadingError> {
        let conn = Connection::open(path)?;
        Self::from_connection(&conn)
    }

    pub fn from_connection(conn: &Connection) -> Result<Self, DataLoadingError> {
        let mut stmt =
            conn.prepare("SELECT Date, FlightNumber, Passengers FROM PassengerNumbers")?;
        let mut rows = stmt.query([])?;
        let mut entries = HashMap::new();
        while let Some(row) = rows.next()? {
            let date_text: String = row.get("Date")?;
            let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|e| {
                DataLoadingError::Malformed(format!("bad forecast date {:?}: {}", date_text, e))
            })?;
            let flight: u32 = row.get("FlightNumber")?;
            let passengers: u32 = row.get("Passengers")?;
            entries.insert((flight, date), passengers);
        }
        Ok(ForecastCatalog { entries })
    }

    pub fn forecast_for(&self, flight_number: u32, date: NaiveDate) -> Option<u32> {
        self.entries.get(&(flight_number, date)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn looks_up_known_flights() {
        let catalog = ForecastCatalog::from_records([
            (101, date("2020-07-06"), 172),
            (102, date("2020-07-06"), 40),
        ]);
        assert_eq!(catalog.forecast_for(101, date("2020-07-06")), Some(172));
        assert_eq!(catalog.forecast_for(102, date("2020-07-06")), Some(40));
    }

    #[test]
    fn unknown_flight_or_date_is_none() {
        let catalog = ForecastCatalog::from_records([(101, date("2020-07-06"), 172)]);
        assert_eq!(catalog.forecast_for(999, date("2020-07-06")), None);
        assert_eq!(catalog.forecast_for(101, date("2020-07-13")), None);
        assert_eq!(ForecastCatalog::empty().forecast_for(101, date("2020-07-06")), None);
    }

    #[test]
    fn loads_from_database() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE PassengerNumbers (Date TEXT, FlightNumber INTEGER, Passengers INTEGER);
             INSERT INTO PassengerNumbers VALUES ('2020-07-06', 101, 172);
             INSERT INTO PassengerNumbers VALUES ('2020-07-06', 102, 40);
             INSERT INTO PassengerNumbers VALUES ('2020-07-13', 101, 168);",
        )
        .unwrap();

        let catalog = ForecastCatalog::from_connection(&conn).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.forecast_for(101, date("2020-07-13")), Some(168));
    }

    #[test]
    fn rejects_bad_dates() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE PassengerNumbers (Date TEXT, FlightNumber INTEGER, Passengers INTEGER);
             INSERT INTO PassengerNumbers VALUES ('06/07/2020', 101, 172);",
        )
        .unwrap();
        assert!(matches!(
            ForecastCatalog::from_connection(&conn),
            Err(DataLoadingError::Malformed(_))
        ));
    }
}
