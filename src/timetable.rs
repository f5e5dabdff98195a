/* The frozen timetable snapshot the routing data is built from.

   Everything here is owned. `DataRaptor` borrows stop times out of it, so a
   `Timetable` must stay alive and untouched while queries run.
*/
use chrono::NaiveDate;
use fixedbitset::FixedBitSet;

use crate::error::{Error, Result};
use crate::idx::{IdxMap, JpIdx, JppIdx, SpIdx, VjIdx};
use crate::time::Timestamp;

#[derive(Debug, Clone)]
pub struct StopPoint {
    pub idx: SpIdx,
    pub uri: String,
    pub name: String,
    pub journey_pattern_points: Vec<JppIdx>,
}

#[derive(Debug, Clone)]
pub struct JourneyPattern {
    pub idx: JpIdx,
    pub uri: String,
    /// In stop order.
    pub journey_pattern_points: Vec<JppIdx>,
    /// Sorted by departure at the first stop.
    pub discrete_vehicle_journeys: Vec<VjIdx>,
    pub frequency_vehicle_journeys: Vec<VjIdx>,
}

/// Longest stop sequence a journey pattern can have.
pub const MAX_JOURNEY_PATTERN_POINTS: usize = u16::MAX as usize;

#[derive(Debug, Clone)]
pub struct JourneyPatternPoint {
    pub idx: JppIdx,
    pub journey_pattern: JpIdx,
    pub stop_point: SpIdx,
    pub order: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    pub arrival_time: Timestamp,
    pub departure_time: Timestamp,
    pub vehicle_journey: VjIdx,
    pub order: u16,
}

/// Headway based service: a vehicle every `headway_secs` between `start_time`
/// and `end_time`. Stop times of such a journey are relative to its first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub headway_secs: u32,
}

/// Days (offsets from the timetable start date) a vehicle journey runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityPattern {
    days: FixedBitSet,
}

impl ValidityPattern {
    pub fn new(nb_days: usize) -> Self {
        Self { days: FixedBitSet::with_capacity(nb_days) }
    }

    /// Days past `nb_days` are dropped.
    pub fn from_days(nb_days: usize, days: impl IntoIterator<Item = usize>) -> Self {
        let mut pattern = Self::new(nb_days);
        for day in days {
            pattern.add(day);
        }
        pattern
    }

    /// Runs every day.
    pub fn full(nb_days: usize) -> Self {
        let mut pattern = Self::new(nb_days);
        pattern.days.insert_range(..);
        pattern
    }

    /// Days outside the pattern are ignored.
    pub fn add(&mut self, day: usize) {
        if day < self.days.len() {
            self.days.insert(day);
        }
    }

    pub fn remove(&mut self, day: usize) {
        if day < self.days.len() {
            self.days.set(day, false);
        }
    }

    /// Out of range days are never valid.
    pub fn check(&self, day: usize) -> bool {
        self.days.contains(day)
    }

    pub fn nb_days(&self) -> usize {
        self.days.len()
    }

    pub fn days(&self) -> impl Iterator<Item = usize> + '_ {
        self.days.ones()
    }
}

#[derive(Debug, Clone)]
pub struct VehicleJourney {
    pub idx: VjIdx,
    pub uri: String,
    pub journey_pattern: JpIdx,
    pub stop_times: Vec<StopTime>,
    pub base_validity_pattern: ValidityPattern,
    pub adapted_validity_pattern: ValidityPattern,
    pub frequency: Option<Frequency>,
}

impl VehicleJourney {
    pub fn is_frequency(&self) -> bool {
        self.frequency.is_some()
    }
}

/// A timed transfer (walking link, same station change, ...) between two stop points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPointConnection {
    pub departure: SpIdx,
    pub destination: SpIdx,
    pub duration: Timestamp,
}

#[derive(Debug)]
pub struct Timetable {
    pub start_date: NaiveDate,
    pub nb_days: usize,
    pub stop_points: IdxMap<SpIdx, StopPoint>,
    pub journey_patterns: IdxMap<JpIdx, JourneyPattern>,
    pub journey_pattern_points: IdxMap<JppIdx, JourneyPatternPoint>,
    pub vehicle_journeys: IdxMap<VjIdx, VehicleJourney>,
    pub stop_point_connections: Vec<StopPointConnection>,
}

impl Timetable {
    pub fn builder(start_date: NaiveDate, nb_days: usize) -> TimetableBuilder {
        TimetableBuilder::new(start_date, nb_days)
    }

    pub fn nb_stop_times(&self) -> usize {
        self.vehicle_journeys.values().map(|vj| vj.stop_times.len()).sum()
    }

    pub fn stop_point_by_uri(&self, uri: &str) -> Option<SpIdx> {
        self.stop_points.iter().find(|(_, sp)| sp.uri == uri).map(|(idx, _)| idx)
    }
}

/// Assembles a consistent `Timetable`. Every reference handed to it is
/// checked, so `build` cannot fail.
pub struct TimetableBuilder {
    timetable: Timetable,
}

impl TimetableBuilder {
    pub fn new(start_date: NaiveDate, nb_days: usize) -> Self {
        Self {
            timetable: Timetable {
                start_date,
                nb_days,
                stop_points: IdxMap::new(),
                journey_patterns: IdxMap::new(),
                journey_pattern_points: IdxMap::new(),
                vehicle_journeys: IdxMap::new(),
                stop_point_connections: Vec::new(),
            },
        }
    }

    pub fn nb_days(&self) -> usize {
        self.timetable.nb_days
    }

    pub fn add_stop_point(&mut self, uri: impl Into<String>, name: impl Into<String>) -> SpIdx {
        let stop_points = &mut self.timetable.stop_points;
        let idx = SpIdx::new(stop_points.len() as u32);
        stop_points.push(StopPoint {
            idx,
            uri: uri.into(),
            name: name.into(),
            journey_pattern_points: Vec::new(),
        })
    }

    /// Creates a journey pattern and one journey pattern point per stop.
    pub fn add_journey_pattern(&mut self, uri: impl Into<String>, stop_points: &[SpIdx]) -> Result<JpIdx> {
        let uri = uri.into();
        if stop_points.is_empty() {
            return Err(Error::EmptyJourneyPattern(uri));
        }
        // Orders and the point count are stored on a u16.
        if stop_points.len() > MAX_JOURNEY_PATTERN_POINTS {
            return Err(Error::TooManyStopPoints { uri, found: stop_points.len(), max: MAX_JOURNEY_PATTERN_POINTS });
        }
        if let Some(&unknown) = stop_points.iter().find(|&&sp| self.timetable.stop_points.get(sp).is_none()) {
            return Err(Error::UnknownStopPoint(unknown));
        }

        let tt = &mut self.timetable;
        let jp_idx = JpIdx::new(tt.journey_patterns.len() as u32);
        let mut jpps = Vec::with_capacity(stop_points.len());
        for (order, &sp_idx) in stop_points.iter().enumerate() {
            let jpp_idx = JppIdx::new(tt.journey_pattern_points.len() as u32);
            tt.journey_pattern_points.push(JourneyPatternPoint {
                idx: jpp_idx,
                journey_pattern: jp_idx,
                stop_point: sp_idx,
                order: order as u16,
            });
            tt.stop_points[sp_idx].journey_pattern_points.push(jpp_idx);
            jpps.push(jpp_idx);
        }
        tt.journey_patterns.push(JourneyPattern {
            idx: jp_idx,
            uri,
            journey_pattern_points: jpps,
            discrete_vehicle_journeys: Vec::new(),
            frequency_vehicle_journeys: Vec::new(),
        });
        Ok(jp_idx)
    }

    /// Adds a timetabled trip. `times` holds one `(arrival, departure)` pair
    /// per point of the journey pattern.
    pub fn add_vehicle_journey(
        &mut self,
        uri: impl Into<String>,
        jp_idx: JpIdx,
        times: &[(Timestamp, Timestamp)],
        validity_pattern: ValidityPattern,
    ) -> Result<VjIdx> {
        self.insert_vehicle_journey(uri.into(), jp_idx, times, validity_pattern, None)
    }

    /// Adds a headway based trip, `times` being those of its first run.
    pub fn add_frequency_vehicle_journey(
        &mut self,
        uri: impl Into<String>,
        jp_idx: JpIdx,
        times: &[(Timestamp, Timestamp)],
        validity_pattern: ValidityPattern,
        frequency: Frequency,
    ) -> Result<VjIdx> {
        self.insert_vehicle_journey(uri.into(), jp_idx, times, validity_pattern, Some(frequency))
    }

    fn insert_vehicle_journey(
        &mut self,
        uri: String,
        jp_idx: JpIdx,
        times: &[(Timestamp, Timestamp)],
        validity_pattern: ValidityPattern,
        frequency: Option<Frequency>,
    ) -> Result<VjIdx> {
        let tt = &mut self.timetable;
        let jp = tt.journey_patterns.get(jp_idx).ok_or(Error::UnknownJourneyPattern(jp_idx))?;
        if jp.journey_pattern_points.len() != times.len() {
            return Err(Error::StopTimesMismatch {
                uri,
                expected: jp.journey_pattern_points.len(),
                found: times.len(),
            });
        }
        if validity_pattern.nb_days() != tt.nb_days {
            return Err(Error::ValidityLength { uri, expected: tt.nb_days, found: validity_pattern.nb_days() });
        }
        if let Some(order) = times.iter().position(|&(arrival, departure)| arrival > departure) {
            return Err(Error::ArrivalAfterDeparture { uri, order: order as u16 });
        }

        let vj_idx = VjIdx::new(tt.vehicle_journeys.len() as u32);
        let stop_times = times
            .iter()
            .enumerate()
            .map(|(order, &(arrival_time, departure_time))| StopTime {
                arrival_time,
                departure_time,
                vehicle_journey: vj_idx,
                order: order as u16,
            })
            .collect();
        tt.vehicle_journeys.push(VehicleJourney {
            idx: vj_idx,
            uri,
            journey_pattern: jp_idx,
            stop_times,
            adapted_validity_pattern: validity_pattern.clone(),
            base_validity_pattern: validity_pattern,
            frequency,
        });

        let jp = &mut tt.journey_patterns[jp_idx];
        if frequency.is_some() {
            jp.frequency_vehicle_journeys.push(vj_idx);
        } else {
            jp.discrete_vehicle_journeys.push(vj_idx);
        }
        Ok(vj_idx)
    }

    /// Overrides the disruption adapted validity of a trip.
    pub fn set_adapted_validity_pattern(&mut self, vj_idx: VjIdx, validity_pattern: ValidityPattern) -> Result<()> {
        let nb_days = self.timetable.nb_days;
        let vj = self
            .timetable
            .vehicle_journeys
            .get(vj_idx)
            .ok_or(Error::UnknownVehicleJourney(vj_idx))?;
        if validity_pattern.nb_days() != nb_days {
            return Err(Error::ValidityLength { uri: vj.uri.clone(), expected: nb_days, found: validity_pattern.nb_days() });
        }
        self.timetable.vehicle_journeys[vj_idx].adapted_validity_pattern = validity_pattern;
        Ok(())
    }

    pub fn add_connection(&mut self, departure: SpIdx, destination: SpIdx, duration: Timestamp) -> Result<()> {
        for sp in [departure, destination] {
            if self.timetable.stop_points.get(sp).is_none() {
                return Err(Error::UnknownStopPoint(sp));
            }
        }
        self.timetable.stop_point_connections.push(StopPointConnection { departure, destination, duration });
        Ok(())
    }

    pub fn build(mut self) -> Timetable {
        // Trips are boarded in this order, keep it stable across rebuilds.
        let vehicle_journeys = &self.timetable.vehicle_journeys;
        for jp in self.timetable.journey_patterns.values_mut() {
            jp.discrete_vehicle_journeys.sort_by_key(|&vj| {
                let first = &vehicle_journeys[vj].stop_times[0];
                (first.departure_time, vj)
            });
        }
        self.timetable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn journey_pattern_points_are_registered_on_both_sides() {
        let mut builder = Timetable::builder(date(), 2);
        let a = builder.add_stop_point("A", "Stop A");
        let b = builder.add_stop_point("B", "Stop B");
        let jp = builder.add_journey_pattern("jp", &[a, b, a]).unwrap();
        let tt = builder.build();

        let jpps = &tt.journey_patterns[jp].journey_pattern_points;
        assert_eq!(jpps.len(), 3);
        assert_eq!(tt.stop_points[a].journey_pattern_points, vec![jpps[0], jpps[2]]);
        assert_eq!(tt.journey_pattern_points[jpps[2]].order, 2);
        assert_eq!(tt.journey_pattern_points[jpps[1]].stop_point, b);
        assert_eq!(tt.stop_point_by_uri("B"), Some(b));
    }

    #[test]
    fn rejects_inconsistent_vehicle_journeys() {
        let mut builder = Timetable::builder(date(), 2);
        let a = builder.add_stop_point("A", "Stop A");
        let b = builder.add_stop_point("B", "Stop B");
        let jp = builder.add_journey_pattern("jp", &[a, b]).unwrap();

        let err = builder.add_vehicle_journey("vj", jp, &[(0, 0)], ValidityPattern::full(2));
        assert_eq!(err, Err(Error::StopTimesMismatch { uri: "vj".into(), expected: 2, found: 1 }));

        let err = builder.add_vehicle_journey("vj", jp, &[(0, 0), (10, 10)], ValidityPattern::full(3));
        assert!(matches!(err, Err(Error::ValidityLength { expected: 2, found: 3, .. })));

        let err = builder.add_vehicle_journey("vj", jp, &[(0, 0), (20, 10)], ValidityPattern::full(2));
        assert!(matches!(err, Err(Error::ArrivalAfterDeparture { order: 1, .. })));

        assert_eq!(builder.add_journey_pattern("empty", &[]), Err(Error::EmptyJourneyPattern("empty".into())));
        assert_eq!(builder.add_connection(a, SpIdx::new(9), 60), Err(Error::UnknownStopPoint(SpIdx::new(9))));
    }

    #[test]
    fn rejects_journey_patterns_longer_than_a_u16_order() {
        let mut builder = Timetable::builder(date(), 1);
        let a = builder.add_stop_point("A", "Stop A");

        let longest = vec![a; MAX_JOURNEY_PATTERN_POINTS];
        let jp = builder.add_journey_pattern("longest", &longest).unwrap();
        let too_long = vec![a; MAX_JOURNEY_PATTERN_POINTS + 1];
        assert_eq!(
            builder.add_journey_pattern("too_long", &too_long),
            Err(Error::TooManyStopPoints { uri: "too_long".into(), found: 65_536, max: 65_535 })
        );

        let tt = builder.build();
        let last = *tt.journey_patterns[jp].journey_pattern_points.last().unwrap();
        assert_eq!(tt.journey_pattern_points[last].order, u16::MAX - 1);
        assert_eq!(tt.journey_patterns.len(), 1);
        assert_eq!(tt.journey_pattern_points.len(), MAX_JOURNEY_PATTERN_POINTS);
    }

    #[test]
    fn validity_pattern_ignores_days_outside_its_range() {
        let mut pattern = ValidityPattern::from_days(3, [0, 2, 3, 10]);
        assert_eq!(pattern.days().collect::<Vec<_>>(), vec![0, 2]);
        pattern.add(5);
        pattern.remove(7);
        pattern.remove(2);
        assert_eq!(pattern.nb_days(), 3);
        assert_eq!(pattern.days().collect::<Vec<_>>(), vec![0]);
        assert!(!pattern.check(5));
    }

    #[test]
    fn build_sorts_discrete_trips_by_first_departure() {
        let mut builder = Timetable::builder(date(), 1);
        let a = builder.add_stop_point("A", "Stop A");
        let b = builder.add_stop_point("B", "Stop B");
        let jp = builder.add_journey_pattern("jp", &[a, b]).unwrap();
        let late = builder.add_vehicle_journey("late", jp, &[(900, 900), (1000, 1000)], ValidityPattern::full(1)).unwrap();
        let early = builder.add_vehicle_journey("early", jp, &[(100, 100), (200, 200)], ValidityPattern::full(1)).unwrap();
        let freq = Frequency { start_time: 0, end_time: 3600, headway_secs: 600 };
        let headway = builder
            .add_frequency_vehicle_journey("freq", jp, &[(0, 0), (60, 60)], ValidityPattern::full(1), freq)
            .unwrap();
        let tt = builder.build();

        assert_eq!(tt.journey_patterns[jp].discrete_vehicle_journeys, vec![early, late]);
        assert_eq!(tt.journey_patterns[jp].frequency_vehicle_journeys, vec![headway]);
        assert!(tt.vehicle_journeys[headway].is_frequency());
        assert_eq!(tt.nb_stop_times(), 6);
    }

    #[test]
    fn adapted_validity_defaults_to_base() {
        let mut builder = Timetable::builder(date(), 3);
        let a = builder.add_stop_point("A", "Stop A");
        let jp = builder.add_journey_pattern("jp", &[a]).unwrap();
        let vj = builder.add_vehicle_journey("vj", jp, &[(0, 0)], ValidityPattern::from_days(3, [0, 2])).unwrap();
        builder.set_adapted_validity_pattern(vj, ValidityPattern::from_days(3, [2])).unwrap();
        let tt = builder.build();

        let vj = &tt.vehicle_journeys[vj];
        assert_eq!(vj.base_validity_pattern.days().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(vj.adapted_validity_pattern.days().collect::<Vec<_>>(), vec![2]);
        assert!(!vj.adapted_validity_pattern.check(7));
    }
}
