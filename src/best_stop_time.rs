use std::ops::Range;

use crate::idx::{IdxMap, JpIdx};
use crate::time::{self, DateTime, Timestamp};
use crate::timetable::{StopTime, Timetable};

/// Sorted stop times of every journey pattern point, for binary search trip
/// selection.
///
/// The stop times of a journey pattern are stored contiguously starting at
/// `first_stop_time[jp]`, one block of `nb_trips[jp]` entries per journey
/// pattern point, blocks in pattern order. Inside a block, `departure_times`
/// is sorted ascending and `arrival_times` descending, so that both
/// "earliest departure after" and "latest arrival before" are one
/// `partition_point` away. Then, for all `i`:
///
/// ```text
/// st_forward[i].departure_time (time of day) == departure_times[i]
/// st_backward[i].arrival_time (time of day) == arrival_times[i]
/// ```
///
/// Only discrete vehicle journeys are stored: a journey pattern point with
/// `has_freq` set must be handled by the caller.
#[derive(Debug, Default)]
pub struct BestStopTimeData<'tt> {
    arrival_times: Vec<Timestamp>,
    departure_times: Vec<Timestamp>,
    st_forward: Vec<&'tt StopTime>,
    st_backward: Vec<&'tt StopTime>,

    // Index of the first stop time of a journey pattern in the arrays above.
    first_stop_time: IdxMap<JpIdx, usize>,
    // Number of discrete vehicle journeys of a journey pattern.
    nb_trips: IdxMap<JpIdx, usize>,
    // Number of journey pattern points of a journey pattern.
    nb_jpps: IdxMap<JpIdx, u16>,
}

impl<'tt> BestStopTimeData<'tt> {
    pub fn load(timetable: &'tt Timetable) -> Self {
        let nb_stop_times = timetable
            .journey_patterns
            .values()
            .map(|jp| jp.discrete_vehicle_journeys.len() * jp.journey_pattern_points.len())
            .sum();
        let mut data = Self {
            arrival_times: Vec::with_capacity(nb_stop_times),
            departure_times: Vec::with_capacity(nb_stop_times),
            st_forward: Vec::with_capacity(nb_stop_times),
            st_backward: Vec::with_capacity(nb_stop_times),
            first_stop_time: IdxMap::with_len(timetable.journey_patterns.len(), 0),
            nb_trips: IdxMap::with_len(timetable.journey_patterns.len(), 0),
            nb_jpps: IdxMap::with_len(timetable.journey_patterns.len(), 0),
        };

        let mut st_from_jpp: Vec<&'tt StopTime> = Vec::new();
        for (jp_idx, jp) in timetable.journey_patterns.iter() {
            data.first_stop_time[jp_idx] = data.departure_times.len();
            data.nb_trips[jp_idx] = jp.discrete_vehicle_journeys.len();
            data.nb_jpps[jp_idx] = jp.journey_pattern_points.len() as u16;

            for &jpp_idx in &jp.journey_pattern_points {
                let order = timetable.journey_pattern_points[jpp_idx].order as usize;
                st_from_jpp.clear();
                st_from_jpp.extend(
                    jp.discrete_vehicle_journeys
                        .iter()
                        .map(|&vj_idx| &timetable.vehicle_journeys[vj_idx].stop_times[order]),
                );

                st_from_jpp.sort_by_key(|st| time::hour(st.departure_time));
                for &st in &st_from_jpp {
                    data.st_forward.push(st);
                    data.departure_times.push(time::hour(st.departure_time));
                }

                st_from_jpp.sort_by_key(|st| std::cmp::Reverse(time::hour(st.arrival_time)));
                for &st in &st_from_jpp {
                    data.st_backward.push(st);
                    data.arrival_times.push(time::hour(st.arrival_time));
                }
            }
        }

        debug_assert_eq!(data.departure_times.len(), nb_stop_times);
        data
    }

    pub fn is_empty(&self) -> bool {
        self.departure_times.is_empty()
    }

    pub fn nb_stop_times(&self) -> usize {
        self.departure_times.len()
    }

    pub fn nb_trips(&self, jp_idx: JpIdx) -> usize {
        self.nb_trips[jp_idx]
    }

    /// Stop times at `(jp_idx, jpp_order)` in increasing departure time.
    #[inline]
    pub fn forward_range(&self, jp_idx: JpIdx, jpp_order: u16) -> &[&'tt StopTime] {
        &self.st_forward[self.stop_time_idx_range(jp_idx, jpp_order)]
    }

    /// Stop times at `(jp_idx, jpp_order)` in decreasing arrival time.
    #[inline]
    pub fn backward_range(&self, jp_idx: JpIdx, jpp_order: u16) -> &[&'tt StopTime] {
        &self.st_backward[self.stop_time_idx_range(jp_idx, jpp_order)]
    }

    /// Stop times at `(jp_idx, jpp_order)` in increasing departure time,
    /// starting with the first one departing at or after `hour(dt)`.
    #[inline]
    pub fn after(&self, jp_idx: JpIdx, jpp_order: u16, dt: DateTime) -> &[&'tt StopTime] {
        let range = self.stop_time_idx_range(jp_idx, jpp_order);
        let hour = time::hour(dt);
        let first = range.start + self.departure_times[range.clone()].partition_point(|&t| t < hour);
        &self.st_forward[first..range.end]
    }

    /// Stop times at `(jp_idx, jpp_order)` in decreasing arrival time,
    /// starting with the first one arriving at or before `hour(dt)`.
    #[inline]
    pub fn before(&self, jp_idx: JpIdx, jpp_order: u16, dt: DateTime) -> &[&'tt StopTime] {
        let range = self.stop_time_idx_range(jp_idx, jpp_order);
        let hour = time::hour(dt);
        let first = range.start + self.arrival_times[range.clone()].partition_point(|&t| t > hour);
        &self.st_backward[first..range.end]
    }

    /// Departure times of the block, as stored (time of day, ascending).
    pub fn departure_times(&self, jp_idx: JpIdx, jpp_order: u16) -> &[Timestamp] {
        &self.departure_times[self.stop_time_idx_range(jp_idx, jpp_order)]
    }

    /// Arrival times of the block, as stored (time of day, descending).
    pub fn arrival_times(&self, jp_idx: JpIdx, jpp_order: u16) -> &[Timestamp] {
        &self.arrival_times[self.stop_time_idx_range(jp_idx, jpp_order)]
    }

    #[inline]
    fn stop_time_idx_range(&self, jp_idx: JpIdx, jpp_order: u16) -> Range<usize> {
        debug_assert!(jp_idx.val() < self.nb_trips.len() as u32, "{jp_idx} out of range");
        debug_assert!(
            jpp_order < self.nb_jpps[jp_idx],
            "order {jpp_order} out of range for {jp_idx} with {} points",
            self.nb_jpps[jp_idx]
        );
        let nb_trips = self.nb_trips[jp_idx];
        let begin = self.first_stop_time[jp_idx] + jpp_order as usize * nb_trips;
        begin..begin + nb_trips
    }
}
