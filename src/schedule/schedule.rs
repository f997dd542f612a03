use crate::aircraft::Aircraft;
use crate::crew::{CabinCrew, Pilot, Rank};
use crate::flight::{FlightId, FlightInstance, expand_instances};
use crate::route::RouteCatalog;
use crate::schedule::scheduler::SchedulerReport;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Aircraft,
    Captain,
    FirstOfficer,
    CabinCrew,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Aircraft => write!(f, "aircraft"),
            Role::Captain => write!(f, "captain"),
            Role::FirstOfficer => write!(f, "first officer"),
            Role::CabinCrew => write!(f, "cabin crew"),
        }
    }
}

/// Why an allocation attempt was rejected. These are routine outcomes
/// of a greedy probe, so they are ordinary values, not panics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationError {
    /// The resource is already committed to an overlapping duty, or is
    /// not positioned at the flight's departure airport.
    DoubleBooked,
    Invalid(InvalidAllocation),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidAllocation {
    UnknownFlight,
    RoleAlreadyFilled(Role),
    RankMismatch { expected: Rank, actual: Rank },
    NoAircraftAssigned,
    MissingTypeRating,
    CabinComplementFull,
    MissingRole(Role),
    AlreadyCompleted,
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::DoubleBooked => write!(f, "resource is double-booked"),
            AllocationError::Invalid(reason) => write!(f, "{}", reason),
        }
    }
}

impl fmt::Display for InvalidAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidAllocation::UnknownFlight => write!(f, "flight is not in this schedule"),
            InvalidAllocation::RoleAlreadyFilled(role) => {
                write!(f, "{} role is already filled", role)
            }
            InvalidAllocation::RankMismatch { expected, actual } => {
                write!(f, "expected a {}, got a {}", expected, actual)
            }
            InvalidAllocation::NoAircraftAssigned => {
                write!(f, "no aircraft assigned to check ratings against")
            }
            InvalidAllocation::MissingTypeRating => {
                write!(f, "crew member lacks the aircraft type rating")
            }
            InvalidAllocation::CabinComplementFull => {
                write!(f, "cabin crew complement is already full")
            }
            InvalidAllocation::MissingRole(role) => write!(f, "{} role is unfilled", role),
            InvalidAllocation::AlreadyCompleted => write!(f, "flight is already completed"),
        }
    }
}

impl From<InvalidAllocation> for AllocationError {
    fn from(reason: InvalidAllocation) -> Self {
        AllocationError::Invalid(reason)
    }
}

/// Resource bindings for one flight instance. Partial states are valid
/// while the scheduler is probing; only `complete_allocation_for`
/// demands a full complement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allocation {
    pub aircraft: Option<Aircraft>,
    pub captain: Option<Pilot>,
    pub first_officer: Option<Pilot>,
    pub cabin_crew: Vec<CabinCrew>,
}

impl Allocation {
    pub fn is_empty(&self) -> bool {
        self.aircraft.is_none()
            && self.captain.is_none()
            && self.first_officer.is_none()
            && self.cabin_crew.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        let cabin_full = self
            .aircraft
            .as_ref()
            .is_some_and(|a| self.cabin_crew.len() as u32 >= a.cabin_crew_required);
        self.aircraft.is_some()
            && self.captain.is_some()
            && self.first_officer.is_some()
            && cabin_full
    }

    fn holds(&self, resource: Resource) -> bool {
        match resource {
            Resource::Aircraft(a) => self
                .aircraft
                .as_ref()
                .is_some_and(|x| x.tail_code == a.tail_code),
            Resource::Pilot(p) => {
                self.captain.as_ref().is_some_and(|x| x.id == p.id)
                    || self.first_officer.as_ref().is_some_and(|x| x.id == p.id)
            }
            Resource::CabinCrew(c) => self.cabin_crew.iter().any(|x| x.id == c.id),
        }
    }
}

/// A candidate resource submitted for conflict checking. The schedule
/// compares by identity (tail code or crew id), never by address.
#[derive(Clone, Copy)]
pub enum Resource<'a> {
    Aircraft(&'a Aircraft),
    Pilot(&'a Pilot),
    CabinCrew(&'a CabinCrew),
}

/// Sole source of truth for allocation state. Every mutation goes
/// through the allocate/unallocate/complete operations, so no caller
/// can bypass conflict checking.
pub struct Schedule {
    instances: Vec<FlightInstance>,
    index: HashMap<FlightId, usize>,
    allocations: Vec<Allocation>,
    remaining: Vec<usize>,
    completed: Vec<usize>,
    pub last_report: Option<SchedulerReport>,
}

impl Schedule {
    /// Expands the timetable over `[from, to]` and starts with every
    /// instance unallocated and remaining. Instances are ordered by
    /// departure time, then flight number, and keep that order in the
    /// remaining/completed snapshots.
    pub fn new(routes: &RouteCatalog, from: NaiveDate, to: NaiveDate) -> Schedule {
        let mut instances = expand_instances(routes, from, to);
        instances.sort_by_key(|i| (i.departure, i.route.flight_number));
        let index = instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (inst.id(), i))
            .collect::<HashMap<FlightId, usize>>();
        let allocations = vec![Allocation::default(); instances.len()];
        let remaining = (0..instances.len()).collect();
        Schedule {
            instances,
            index,
            allocations,
            remaining,
            completed: Vec::new(),
            last_report: None,
        }
    }

    fn lookup(&self, flight: FlightId) -> Result<usize, AllocationError> {
        self.index
            .get(&flight)
            .copied()
            .ok_or(AllocationError::Invalid(InvalidAllocation::UnknownFlight))
    }

    pub fn instance(&self, flight: FlightId) -> Option<&FlightInstance> {
        self.index.get(&flight).map(|i| &self.instances[*i])
    }

    pub fn allocation_for(&self, flight: FlightId) -> Option<&Allocation> {
        self.index.get(&flight).map(|i| &self.allocations[*i])
    }

    pub fn instances(&self) -> &[FlightInstance] {
        &self.instances
    }

    /// True if `resource` is already bound to any instance whose duty
    /// window overlaps `flight`'s, or if `flight` breaks the resource's
    /// chain of positions: the duty it is bound to right before
    /// `flight` must land at `flight`'s departure airport, and the duty
    /// right after must depart from `flight`'s arrival airport.
    ///
    /// A resource with no allocation history carries no position
    /// constraint: its first duty may start anywhere, and the
    /// repositioning cost shows up as a conflict on the next flight
    /// that touches it. A flight the resource is already bound to
    /// counts as overlapping itself, which rejects duplicate bindings
    /// such as captain == first officer.
    pub fn has_conflict(&self, resource: Resource, flight: &FlightInstance) -> bool {
        let mut last_leg: Option<&FlightInstance> = None;
        let mut next_leg: Option<&FlightInstance> = None;
        for (inst, alloc) in self.instances.iter().zip(&self.allocations) {
            if !alloc.holds(resource) {
                continue;
            }
            if inst.overlaps(flight) || inst.id() == flight.id() {
                return true;
            }
            if inst.arrival <= flight.departure
                && last_leg.is_none_or(|prev| inst.arrival > prev.arrival)
            {
                last_leg = Some(inst);
            }
            if inst.departure >= flight.arrival
                && next_leg.is_none_or(|next| inst.departure < next.departure)
            {
                next_leg = Some(inst);
            }
        }
        if last_leg.is_some_and(|prev| {
            prev.route.arrival_airport_code != flight.route.departure_airport_code
        }) {
            return true;
        }
        next_leg.is_some_and(|next| {
            next.route.departure_airport_code != flight.route.arrival_airport_code
        })
    }

    pub fn allocate_aircraft_to(
        &mut self,
        aircraft: &Aircraft,
        flight: FlightId,
    ) -> Result<(), AllocationError> {
        let idx = self.lookup(flight)?;
        if self.has_conflict(Resource::Aircraft(aircraft), &self.instances[idx]) {
            return Err(AllocationError::DoubleBooked);
        }
        if self.allocations[idx].aircraft.is_some() {
            return Err(InvalidAllocation::RoleAlreadyFilled(Role::Aircraft).into());
        }
        self.allocations[idx].aircraft = Some(aircraft.clone());
        self.assert_invariants();
        Ok(())
    }

    pub fn allocate_captain_to(
        &mut self,
        pilot: &Pilot,
        flight: FlightId,
    ) -> Result<(), AllocationError> {
        let idx = self.lookup(flight)?;
        self.check_pilot(pilot, idx, Rank::Captain, Role::Captain)?;
        self.allocations[idx].captain = Some(pilot.clone());
        self.assert_invariants();
        Ok(())
    }

    pub fn allocate_first_officer_to(
        &mut self,
        pilot: &Pilot,
        flight: FlightId,
    ) -> Result<(), AllocationError> {
        let idx = self.lookup(flight)?;
        self.check_pilot(pilot, idx, Rank::FirstOfficer, Role::FirstOfficer)?;
        self.allocations[idx].first_officer = Some(pilot.clone());
        self.assert_invariants();
        Ok(())
    }

    fn check_pilot(
        &self,
        pilot: &Pilot,
        idx: usize,
        expected: Rank,
        role: Role,
    ) -> Result<(), AllocationError> {
        if self.has_conflict(Resource::Pilot(pilot), &self.instances[idx]) {
            return Err(AllocationError::DoubleBooked);
        }
        let alloc = &self.allocations[idx];
        let filled = match role {
            Role::Captain => alloc.captain.is_some(),
            _ => alloc.first_officer.is_some(),
        };
        if filled {
            return Err(InvalidAllocation::RoleAlreadyFilled(role).into());
        }
        if pilot.rank != expected {
            return Err(InvalidAllocation::RankMismatch {
                expected,
                actual: pilot.rank,
            }
            .into());
        }
        let aircraft = alloc
            .aircraft
            .as_ref()
            .ok_or(InvalidAllocation::NoAircraftAssigned)?;
        if !pilot.is_qualified_for(&aircraft.type_code) {
            return Err(InvalidAllocation::MissingTypeRating.into());
        }
        Ok(())
    }

    pub fn allocate_cabin_crew_to(
        &mut self,
        member: &CabinCrew,
        flight: FlightId,
    ) -> Result<(), AllocationError> {
        let idx = self.lookup(flight)?;
        if self.has_conflict(Resource::CabinCrew(member), &self.instances[idx]) {
            return Err(AllocationError::DoubleBooked);
        }
        let alloc = &self.allocations[idx];
        let aircraft = alloc
            .aircraft
            .as_ref()
            .ok_or(InvalidAllocation::NoAircraftAssigned)?;
        if alloc.cabin_crew.len() as u32 >= aircraft.cabin_crew_required {
            return Err(InvalidAllocation::CabinComplementFull.into());
        }
        if !member.is_qualified_for(&aircraft.type_code) {
            return Err(InvalidAllocation::MissingTypeRating.into());
        }
        self.allocations[idx].cabin_crew.push(member.clone());
        self.assert_invariants();
        Ok(())
    }

    /// Clears every binding for the instance. Idempotent; does not
    /// move the instance between the remaining and completed sets.
    pub fn unallocate(&mut self, flight: FlightId) {
        if let Some(&idx) = self.index.get(&flight) {
            self.allocations[idx] = Allocation::default();
        }
        self.assert_invariants();
    }

    /// Moves the instance from remaining to completed once every
    /// required role is filled.
    pub fn complete_allocation_for(&mut self, flight: FlightId) -> Result<(), AllocationError> {
        let idx = self.lookup(flight)?;
        let Some(pos) = self.remaining.iter().position(|i| *i == idx) else {
            return Err(InvalidAllocation::AlreadyCompleted.into());
        };
        let alloc = &self.allocations[idx];
        if alloc.aircraft.is_none() {
            return Err(InvalidAllocation::MissingRole(Role::Aircraft).into());
        }
        if alloc.captain.is_none() {
            return Err(InvalidAllocation::MissingRole(Role::Captain).into());
        }
        if alloc.first_officer.is_none() {
            return Err(InvalidAllocation::MissingRole(Role::FirstOfficer).into());
        }
        if !alloc.is_complete() {
            return Err(InvalidAllocation::MissingRole(Role::CabinCrew).into());
        }
        self.remaining.remove(pos);
        self.completed.push(idx);
        self.assert_invariants();
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn remaining_allocations(&self) -> Vec<&FlightInstance> {
        self.remaining.iter().map(|i| &self.instances[*i]).collect()
    }

    pub fn completed_allocations(&self) -> Vec<&FlightInstance> {
        self.completed.iter().map(|i| &self.instances[*i]).collect()
    }

    pub fn remaining_flights(&self) -> Vec<FlightId> {
        self.remaining.iter().map(|i| self.instances[*i].id()).collect()
    }

    fn assert_invariants(&self) {
        debug_assert_eq!(
            self.remaining.len() + self.completed.len(),
            self.instances.len(),
            "remaining/completed must partition the instance set"
        );
        debug_assert!(
            self.completed.iter().all(|i| !self.remaining.contains(i)),
            "remaining and completed must be disjoint"
        );
        // The pairwise sweeps are quadratic; skip them entirely outside
        // debug builds.
        if cfg!(debug_assertions) {
            for (i, a) in self.instances.iter().zip(&self.allocations) {
                for (j, b) in self.instances.iter().zip(&self.allocations) {
                    if std::ptr::eq(i, j) || !i.overlaps(j) {
                        continue;
                    }
                    debug_assert!(
                        !shares_resource(a, b),
                        "overlapping instances {} and {} share a resource",
                        i.id(),
                        j.id()
                    );
                }
            }
            let mut duties: HashMap<String, Vec<&FlightInstance>> = HashMap::new();
            for (inst, alloc) in self.instances.iter().zip(&self.allocations) {
                if let Some(a) = &alloc.aircraft {
                    duties.entry(format!("aircraft {}", a.tail_code)).or_default().push(inst);
                }
                for p in [&alloc.captain, &alloc.first_officer].into_iter().flatten() {
                    duties.entry(format!("crew {}", p.id)).or_default().push(inst);
                }
                for c in &alloc.cabin_crew {
                    duties.entry(format!("crew {}", c.id)).or_default().push(inst);
                }
            }
            for (holder, mut legs) in duties {
                legs.sort_by_key(|i| i.departure);
                for pair in legs.windows(2) {
                    debug_assert!(
                        pair[0].route.arrival_airport_code == pair[1].route.departure_airport_code,
                        "{} lands at {} after {} but departs {} on {}",
                        holder,
                        pair[0].route.arrival_airport_code,
                        pair[0].id(),
                        pair[1].route.departure_airport_code,
                        pair[1].id()
                    );
                }
            }
        }
    }
}

fn shares_resource(a: &Allocation, b: &Allocation) -> bool {
    if let (Some(x), Some(y)) = (&a.aircraft, &b.aircraft) {
        if x.tail_code == y.tail_code {
            return true;
        }
    }
    let pilots = |alloc: &Allocation| {
        [&alloc.captain, &alloc.first_officer]
            .into_iter()
            .flatten()
            .map(|p| p.id)
            .collect::<Vec<_>>()
    };
    let (a_pilots, b_pilots) = (pilots(a), pilots(b));
    if a_pilots.iter().any(|id| b_pilots.contains(id)) {
        return true;
    }
    a.cabin_crew
        .iter()
        .any(|x| b.cabin_crew.iter().any(|y| x.id == y.id))
}
