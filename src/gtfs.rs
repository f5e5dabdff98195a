use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use gtfs_structures::{DirectionType, Exception, Gtfs, Trip};
use log::{info, warn};

use crate::error::{Error, Result};
use crate::idx::{JpIdx, SpIdx};
use crate::time::Timestamp;
use crate::timetable::{Frequency, Timetable, TimetableBuilder, ValidityPattern};

/// Settings of a GTFS import.
#[derive(Debug, Clone)]
pub struct GtfsConfig {
    /// First day of the imported calendar.
    pub start_date: NaiveDate,
    /// Number of days computed in every validity pattern.
    pub nb_days: usize,
    /// Duration of a `transfers.txt` entry with no `min_transfer_time`.
    pub default_transfer_duration: Timestamp,
}

impl Default for GtfsConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap_or_default(),
            nb_days: 7,
            default_transfer_duration: 3 * 60, // 3 minutes transfer time.
        }
    }
}

// Trips sharing a route, a direction and a stop sequence share a journey pattern.
type PatternKey<'a> = (&'a str, u8, Vec<SpIdx>);

impl Timetable {
    pub fn from_gtfs(gtfs: &Gtfs, config: &GtfsConfig) -> Result<Self> {
        let mut builder = TimetableBuilder::new(config.start_date, config.nb_days);

        // Sorted so that indices do not depend on hash map order.
        let mut stop_ids: Vec<&String> = gtfs.stops.keys().collect();
        stop_ids.sort_unstable();
        let mut stop_index = HashMap::with_capacity(stop_ids.len());
        for &id in &stop_ids {
            let name = gtfs.stops[id].name.clone().unwrap_or_else(|| id.clone());
            stop_index.insert(id.as_str(), builder.add_stop_point(id.as_str(), name));
        }

        let mut trip_ids: Vec<&String> = gtfs.trips.keys().collect();
        trip_ids.sort_unstable();
        let mut patterns: BTreeMap<PatternKey, Vec<&Trip>> = BTreeMap::new();
        for id in trip_ids {
            let trip = &gtfs.trips[id];
            if trip.stop_times.is_empty() {
                warn!("Skipping trip {} without stop times.", trip.id);
                continue;
            }
            let direction = match trip.direction_id {
                Some(DirectionType::Inbound) => 1,
                _ => 0,
            };
            let stops = trip.stop_times.iter().map(|st| stop_index[st.stop.id.as_str()]).collect();
            patterns.entry((trip.route_id.as_str(), direction, stops)).or_default().push(trip);
        }

        for (n, ((route_id, direction, stops), trips)) in patterns.iter().enumerate() {
            let jp_idx = builder.add_journey_pattern(format!("{route_id}:{direction}:{n}"), stops)?;
            for trip in trips {
                add_trip(&mut builder, gtfs, config, jp_idx, trip)?;
            }
        }

        for id in stop_ids {
            let departure = stop_index[id.as_str()];
            for transfer in &gtfs.stops[id].transfers {
                let Some(&destination) = stop_index.get(transfer.to_stop_id.as_str()) else {
                    warn!("Skipping transfer from {id} to unknown stop {}.", transfer.to_stop_id);
                    continue;
                };
                let duration = transfer.min_transfer_time.unwrap_or(config.default_transfer_duration);
                builder.add_connection(departure, destination, duration)?;
            }
        }

        let timetable = builder.build();
        info!(
            "GTFS imported with {} stop points, {} journey patterns and {} vehicle journeys.",
            timetable.stop_points.len(),
            timetable.journey_patterns.len(),
            timetable.vehicle_journeys.len()
        );
        Ok(timetable)
    }
}

fn add_trip(builder: &mut TimetableBuilder, gtfs: &Gtfs, config: &GtfsConfig, jp_idx: JpIdx, trip: &Trip) -> Result<()> {
    let times = trip
        .stop_times
        .iter()
        .map(|st| match (st.arrival_time, st.departure_time) {
            (Some(arrival), Some(departure)) => Ok((arrival, departure)),
            _ => Err(Error::MissingStopTime { trip_id: trip.id.clone() }),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut validity_pattern = ValidityPattern::new(config.nb_days);
    for day in 0..config.nb_days {
        let Some(date) = config.start_date.checked_add_days(Days::new(day as u64)) else {
            break;
        };
        if does_trip_run(gtfs, trip, date)? {
            validity_pattern.add(day);
        }
    }

    if trip.frequencies.len() > 1 {
        warn!("Trip {} has {} frequency windows, only the first one is kept.", trip.id, trip.frequencies.len());
    }
    match trip.frequencies.first() {
        Some(freq) => {
            let frequency = Frequency {
                start_time: freq.start_time,
                end_time: freq.end_time,
                headway_secs: freq.headway_secs,
            };
            builder.add_frequency_vehicle_journey(trip.id.as_str(), jp_idx, &times, validity_pattern, frequency)?;
        }
        None => {
            builder.add_vehicle_journey(trip.id.as_str(), jp_idx, &times, validity_pattern)?;
        }
    }
    Ok(())
}

/// Whether the service of `trip` runs on `date`, exceptions included.
pub fn does_trip_run(gtfs: &Gtfs, trip: &Trip, date: NaiveDate) -> Result<bool> {
    let calendar = gtfs.calendar.get(trip.service_id.as_str());
    let exceptions = gtfs.calendar_dates.get(trip.service_id.as_str());
    if calendar.is_none() && exceptions.is_none() {
        return Err(Error::UnknownService { trip_id: trip.id.clone(), service_id: trip.service_id.clone() });
    }

    let exception = exceptions.and_then(|dates| dates.iter().find(|calendar_date| calendar_date.date == date));
    Ok(match exception {
        Some(calendar_date) => matches!(calendar_date.exception_type, Exception::Added),
        None => calendar.is_some_and(|calendar| {
            calendar.valid_weekday(date) && calendar.start_date <= date && date <= calendar.end_date
        }),
    })
}

#[cfg(test)]
mod tests {
    use gtfs_structures::GtfsReader;

    use super::*;
    use crate::data::DataRaptor;
    use crate::timetable::{StopPointConnection, VehicleJourney};

    // Friday, Saturday and Sunday.
    fn config() -> GtfsConfig {
        GtfsConfig { start_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(), nb_days: 3, default_transfer_duration: 180 }
    }

    fn load_tiny_gtfs() -> Gtfs {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tiny_gtfs");
        GtfsReader::default().read_shapes(false).read_from_path(path).unwrap()
    }

    fn vehicle_journey<'a>(tt: &'a Timetable, uri: &str) -> &'a VehicleJourney {
        tt.vehicle_journeys.values().find(|vj| vj.uri == uri).unwrap()
    }

    #[test]
    fn trips_are_grouped_by_route_direction_and_stops() {
        let tt = Timetable::from_gtfs(&load_tiny_gtfs(), &config()).unwrap();
        assert_eq!(tt.stop_points.len(), 3);
        assert_eq!(tt.journey_patterns.len(), 4);

        let jp = |uri| vehicle_journey(&tt, uri).journey_pattern;
        assert_eq!(jp("t1"), jp("t2"));
        assert_ne!(jp("t1"), jp("t3"));
        assert_ne!(jp("t1"), jp("t4"));
        assert_eq!(tt.journey_patterns[jp("t1")].discrete_vehicle_journeys.len(), 2);

        let reverse: Vec<&str> = tt.journey_patterns[jp("t3")]
            .journey_pattern_points
            .iter()
            .map(|&jpp| tt.stop_points[tt.journey_pattern_points[jpp].stop_point].uri.as_str())
            .collect();
        assert_eq!(reverse, vec!["S3", "S2", "S1"]);
    }

    #[test]
    fn trips_without_stop_times_are_skipped() {
        let tt = Timetable::from_gtfs(&load_tiny_gtfs(), &config()).unwrap();
        assert_eq!(tt.vehicle_journeys.len(), 5);
        assert!(tt.vehicle_journeys.values().all(|vj| vj.uri != "t6"));
    }

    #[test]
    fn calendar_dates_override_the_weekly_calendar() {
        let gtfs = load_tiny_gtfs();
        let trip = &gtfs.trips["t1"];
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        // Friday removed, Saturday added.
        assert_eq!(does_trip_run(&gtfs, trip, day(10)), Ok(false));
        assert_eq!(does_trip_run(&gtfs, trip, day(11)), Ok(true));
        assert_eq!(does_trip_run(&gtfs, trip, day(12)), Ok(false));
        assert_eq!(does_trip_run(&gtfs, trip, day(13)), Ok(true));

        let tt = Timetable::from_gtfs(&gtfs, &config()).unwrap();
        let days = |uri| vehicle_journey(&tt, uri).base_validity_pattern.days().collect::<Vec<_>>();
        assert_eq!(days("t1"), vec![1]);
        // Service known only from calendar_dates.
        assert_eq!(days("t5"), vec![2]);
    }

    #[test]
    fn trips_of_an_unknown_service_are_rejected() {
        let mut gtfs = load_tiny_gtfs();
        gtfs.calendar.remove("WEEK");
        gtfs.calendar_dates.remove("WEEK");

        let expected = Error::UnknownService { trip_id: "t1".into(), service_id: "WEEK".into() };
        assert_eq!(does_trip_run(&gtfs, &gtfs.trips["t1"], config().start_date), Err(expected));
        assert!(matches!(Timetable::from_gtfs(&gtfs, &config()), Err(Error::UnknownService { .. })));
    }

    #[test]
    fn frequency_trips_keep_their_first_window() {
        let tt = Timetable::from_gtfs(&load_tiny_gtfs(), &config()).unwrap();
        let vj = vehicle_journey(&tt, "t5");
        assert_eq!(vj.frequency, Some(Frequency { start_time: 6 * 3600, end_time: 10 * 3600, headway_secs: 600 }));
        let jp = &tt.journey_patterns[vj.journey_pattern];
        assert_eq!(jp.frequency_vehicle_journeys, vec![vj.idx]);
        assert!(jp.discrete_vehicle_journeys.is_empty());

        let data = DataRaptor::load(&tt);
        assert!(data.jpps_from_jp[vj.journey_pattern].iter().all(|jpp| jpp.has_freq));
        assert_eq!(data.best_stop_time_data.nb_trips(vj.journey_pattern), 0);
        let t1 = vehicle_journey(&tt, "t1").journey_pattern;
        assert!(data.jpps_from_jp[t1].iter().all(|jpp| !jpp.has_freq));
    }

    #[test]
    fn transfers_without_duration_use_the_default() {
        let tt = Timetable::from_gtfs(&load_tiny_gtfs(), &config()).unwrap();
        let sp = |uri| tt.stop_point_by_uri(uri).unwrap();
        assert_eq!(
            tt.stop_point_connections,
            vec![
                StopPointConnection { departure: sp("S1"), destination: sp("S2"), duration: 120 },
                StopPointConnection { departure: sp("S2"), destination: sp("S3"), duration: 180 },
            ]
        );
    }
}
