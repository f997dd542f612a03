use crate::aircraft::{Aircraft, AircraftCatalog};
use crate::crew::{CabinCrew, CrewCatalog, Pilot, Rank};
use crate::flight::{FlightId, FlightInstance};
use crate::forecast::ForecastCatalog;
use crate::route::RouteCatalog;
use crate::schedule::schedule::{AllocationError, InvalidAllocation, Resource, Schedule};
use chrono::NaiveDate;
use std::fmt;

/// Why the scheduler gave up on a flight instance. Recorded per
/// attempt, so a flight probed several times keeps only the reason
/// from its last failed attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnresolvedReason {
    NoAircraftAvailable,
    NoCaptainAvailable,
    NoFirstOfficerAvailable,
    InsufficientCabinCrew { required: u32, found: u32 },
    AllocationRejected(AllocationError),
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoAircraftAvailable => write!(f, "no aircraft available"),
            UnresolvedReason::NoCaptainAvailable => write!(f, "no captain available"),
            UnresolvedReason::NoFirstOfficerAvailable => write!(f, "no first officer available"),
            UnresolvedReason::InsufficientCabinCrew { required, found } => {
                write!(f, "insufficient cabin crew ({} of {} found)", found, required)
            }
            UnresolvedReason::AllocationRejected(err) => write!(f, "allocation rejected: {}", err),
        }
    }
}

/// Outcome summary of a scheduler run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchedulerReport {
    pub attempts: usize,
    pub completed: usize,
    pub unresolved: Vec<(FlightId, UnresolvedReason)>,
}

/// Greedy allocator. Walks the remaining instances with a wrapping
/// cursor, staffing each in turn; a failed attempt rolls back cleanly
/// and moves on. The run stops once a full pass over the remaining set
/// makes no progress, so resource starvation cannot livelock it.
pub struct Scheduler<'a> {
    aircraft: &'a AircraftCatalog,
    crew: &'a CrewCatalog,
    forecasts: &'a ForecastCatalog,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        aircraft: &'a AircraftCatalog,
        crew: &'a CrewCatalog,
        forecasts: &'a ForecastCatalog,
    ) -> Self {
        Scheduler {
            aircraft,
            crew,
            forecasts,
        }
    }

    pub fn run(&self, schedule: &mut Schedule) -> SchedulerReport {
        let mut report = SchedulerReport::default();
        let mut unresolved: Vec<(FlightId, UnresolvedReason)> = Vec::new();
        let mut cursor = 0;
        let mut stalled = 0;
        loop {
            let remaining = schedule.remaining_flights();
            if remaining.is_empty() || stalled >= remaining.len() {
                break;
            }
            if cursor >= remaining.len() {
                cursor = 0;
            }
            let flight = remaining[cursor];
            report.attempts += 1;
            match self.attempt(schedule, flight) {
                Ok(()) => {
                    report.completed += 1;
                    unresolved.retain(|(id, _)| *id != flight);
                    stalled = 0;
                    // The completed instance left the remaining set, so
                    // the cursor already points at its successor.
                }
                Err(reason) => {
                    schedule.unallocate(flight);
                    unresolved.retain(|(id, _)| *id != flight);
                    unresolved.push((flight, reason));
                    stalled += 1;
                    cursor += 1;
                }
            }
        }
        unresolved.sort_by_key(|(id, _)| *id);
        report.unresolved = unresolved;
        report
    }

    fn attempt(&self, schedule: &mut Schedule, flight: FlightId) -> Result<(), UnresolvedReason> {
        let instance = schedule
            .instance(flight)
            .cloned()
            .ok_or(UnresolvedReason::AllocationRejected(
                AllocationError::Invalid(InvalidAllocation::UnknownFlight),
            ))?;
        let demand = self
            .forecasts
            .forecast_for(flight.flight_number, flight.date)
            .unwrap_or(0);

        let aircraft = self
            .pick_aircraft(schedule, &instance, demand)
            .ok_or(UnresolvedReason::NoAircraftAvailable)?
            .clone();
        let captain = self
            .pick_pilot(schedule, &instance, &aircraft, Rank::Captain, None)
            .ok_or(UnresolvedReason::NoCaptainAvailable)?
            .clone();
        let first_officer = self
            .pick_pilot(
                schedule,
                &instance,
                &aircraft,
                Rank::FirstOfficer,
                Some(captain.id),
            )
            .ok_or(UnresolvedReason::NoFirstOfficerAvailable)?
            .clone();
        let cabin = self
            .pick_cabin_crew(schedule, &instance, &aircraft)
            .map_err(|found| UnresolvedReason::InsufficientCabinCrew {
                required: aircraft.cabin_crew_required,
                found,
            })?;

        let commit = |schedule: &mut Schedule| -> Result<(), AllocationError> {
            schedule.allocate_aircraft_to(&aircraft, flight)?;
            schedule.allocate_captain_to(&captain, flight)?;
            schedule.allocate_first_officer_to(&first_officer, flight)?;
            for member in &cabin {
                schedule.allocate_cabin_crew_to(member, flight)?;
            }
            schedule.complete_allocation_for(flight)
        };
        commit(schedule).map_err(UnresolvedReason::AllocationRejected)
    }

    /// Best fit by seat count: the smallest free aircraft covering the
    /// forecast demand, searching hulls positioned at the departure
    /// airport before the whole fleet. When no hull anywhere is big
    /// enough, the largest free one caps the spill.
    fn pick_aircraft(
        &self,
        schedule: &Schedule,
        instance: &FlightInstance,
        demand: u32,
    ) -> Option<&Aircraft> {
        let local = self
            .aircraft
            .find_by_starting_position(&instance.route.departure_airport_code);
        let fleet: Vec<&Aircraft> = self.aircraft.all().iter().collect();
        for pool in [&local, &fleet] {
            let mut fit: Option<&Aircraft> = None;
            for candidate in pool.iter().copied() {
                if candidate.seats < demand
                    || schedule.has_conflict(Resource::Aircraft(candidate), instance)
                {
                    continue;
                }
                if fit.is_none_or(|best| candidate.seats < best.seats) {
                    fit = Some(candidate);
                }
            }
            if fit.is_some() {
                return fit;
            }
        }
        let mut largest: Option<&Aircraft> = None;
        for candidate in fleet {
            if schedule.has_conflict(Resource::Aircraft(candidate), instance) {
                continue;
            }
            if largest.is_none_or(|best| candidate.seats > best.seats) {
                largest = Some(candidate);
            }
        }
        largest
    }

    /// Base-and-type qualified first, then type qualified anywhere,
    /// then anyone of the right rank.
    fn pick_pilot(
        &self,
        schedule: &Schedule,
        instance: &FlightInstance,
        aircraft: &Aircraft,
        rank: Rank,
        taken: Option<u32>,
    ) -> Option<&Pilot> {
        let tiers = [
            self.crew.find_pilots_by_home_base_and_type_rating(
                &aircraft.type_code,
                &instance.route.departure_airport_code,
            ),
            self.crew.find_pilots_by_type_rating(&aircraft.type_code),
            self.crew.all_pilots(),
        ];
        for tier in tiers {
            let found = tier.into_iter().find(|p| {
                p.rank == rank
                    && taken != Some(p.id)
                    && !schedule.has_conflict(Resource::Pilot(p), instance)
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Fills the complement across the same three tiers as pilots.
    /// Returns the shortfall count on failure.
    fn pick_cabin_crew(
        &self,
        schedule: &Schedule,
        instance: &FlightInstance,
        aircraft: &Aircraft,
    ) -> Result<Vec<CabinCrew>, u32> {
        let required = aircraft.cabin_crew_required as usize;
        let mut picked: Vec<CabinCrew> = Vec::with_capacity(required);
        let tiers = [
            self.crew.find_cabin_crew_by_home_base_and_type_rating(
                &aircraft.type_code,
                &instance.route.departure_airport_code,
            ),
            self.crew.find_cabin_crew_by_type_rating(&aircraft.type_code),
            self.crew.all_cabin_crew(),
        ];
        for tier in tiers {
            for candidate in tier {
                if picked.len() == required {
                    return Ok(picked);
                }
                if picked.iter().any(|c| c.id == candidate.id) {
                    continue;
                }
                if schedule.has_conflict(Resource::CabinCrew(candidate), instance) {
                    continue;
                }
                picked.push(candidate.clone());
            }
        }
        if picked.len() == required {
            Ok(picked)
        } else {
            Err(picked.len() as u32)
        }
    }
}

/// Expands the timetable over the date range and runs the scheduler to
/// a fixed point. The run report is left on the schedule.
pub fn generate_schedule(
    aircraft: &AircraftCatalog,
    crew: &CrewCatalog,
    routes: &RouteCatalog,
    forecasts: &ForecastCatalog,
    from: NaiveDate,
    to: NaiveDate,
) -> Schedule {
    let mut schedule = Schedule::new(routes, from, to);
    let report = Scheduler::new(aircraft, crew, forecasts).run(&mut schedule);
    schedule.last_report = Some(report);
    schedule
}
