use std::path::Path;

use chrono::NaiveDate;
use dataraptor::time::{parse_time, Timestamp};
use dataraptor::timetable::{Frequency, ValidityPattern};
use dataraptor::{JpIdx, SpIdx, Timetable};
use gtfs_structures::{Error, Gtfs, GtfsReader};

// Common data for the tests, benchmarks and demos.

pub fn load_gtfs(path: impl AsRef<Path>) -> Result<Gtfs, Error> {
    let path = path.as_ref().to_string_lossy();
    GtfsReader::default().read_shapes(false).read(&path)
}

pub fn get_example_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

fn t(s: &str) -> Timestamp {
    parse_time(s).unwrap()
}

/// Pattern `P1` visiting `A` then `B` with three trips:
/// departures 08:00, 08:30, 09:00 from `A`, arrivals 08:20, 08:50, 09:20 at `B`.
/// A fourth stop point `C` is isolated.
pub fn get_example_scenario() -> (Timetable, JpIdx) {
    let mut builder = Timetable::builder(get_example_date(), 1);
    let a = builder.add_stop_point("A", "Stop A");
    let b = builder.add_stop_point("B", "Stop B");
    builder.add_stop_point("C", "Isolated stop");
    let p1 = builder.add_journey_pattern("P1", &[a, b]).unwrap();
    for (uri, departure, arrival) in [("T1", "08:00:00", "08:20:00"), ("T2", "08:30:00", "08:50:00"), ("T3", "09:00:00", "09:20:00")] {
        builder
            .add_vehicle_journey(uri, p1, &[(t(departure), t(departure)), (t(arrival), t(arrival))], ValidityPattern::full(1))
            .unwrap();
    }
    builder.add_connection(a, b, 10 * 60).unwrap();
    (builder.build(), p1)
}

/// Shape of a generated network.
#[derive(Debug, Clone)]
pub struct RandomNetworkParams {
    pub nb_stop_points: usize,
    pub nb_journey_patterns: usize,
    pub max_stops_per_pattern: usize,
    pub max_trips_per_pattern: usize,
    pub nb_days: usize,
    pub nb_connections: usize,
    /// One pattern out of `frequency_every` also gets a headway based trip.
    pub frequency_every: usize,
}

impl Default for RandomNetworkParams {
    fn default() -> Self {
        Self {
            nb_stop_points: 200,
            nb_journey_patterns: 60,
            max_stops_per_pattern: 20,
            max_trips_per_pattern: 40,
            nb_days: 14,
            nb_connections: 300,
            frequency_every: 7,
        }
    }
}

/// A reproducible random timetable. Trips overtake each other and some run
/// past midnight, so sorting is actually exercised.
pub fn random_timetable(seed: u64, params: &RandomNetworkParams) -> Timetable {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut builder = Timetable::builder(get_example_date(), params.nb_days);

    let stop_points: Vec<SpIdx> = (0..params.nb_stop_points)
        .map(|i| builder.add_stop_point(format!("sp:{i}"), format!("Stop {i}")))
        .collect();

    for jp in 0..params.nb_journey_patterns {
        let nb_stops = rng.usize(1..=params.max_stops_per_pattern);
        let stops: Vec<SpIdx> = (0..nb_stops).map(|_| stop_points[rng.usize(..stop_points.len())]).collect();
        let jp_idx = builder.add_journey_pattern(format!("jp:{jp}"), &stops).unwrap();

        for vj in 0..rng.usize(0..=params.max_trips_per_pattern) {
            let times = random_stop_times(&mut rng, nb_stops);
            let validity = random_validity(&mut rng, params.nb_days);
            builder.add_vehicle_journey(format!("vj:{jp}:{vj}"), jp_idx, &times, validity).unwrap();
        }

        if params.frequency_every > 0 && jp % params.frequency_every == 0 {
            let times = random_stop_times(&mut rng, nb_stops);
            let validity = random_validity(&mut rng, params.nb_days);
            let frequency = Frequency { start_time: t("06:00:00"), end_time: t("20:00:00"), headway_secs: 600 };
            builder
                .add_frequency_vehicle_journey(format!("freq:{jp}"), jp_idx, &times, validity, frequency)
                .unwrap();
        }
    }

    for _ in 0..params.nb_connections {
        let from = stop_points[rng.usize(..stop_points.len())];
        let to = stop_points[rng.usize(..stop_points.len())];
        builder.add_connection(from, to, rng.u32(30..=900)).unwrap();
    }

    builder.build()
}

fn random_stop_times(rng: &mut fastrand::Rng, nb_stops: usize) -> Vec<(Timestamp, Timestamp)> {
    let mut time = rng.u32(4 * 3600..26 * 3600);
    let mut times = Vec::with_capacity(nb_stops);
    for _ in 0..nb_stops {
        let arrival = time;
        let departure = arrival + rng.u32(0..=120);
        times.push((arrival, departure));
        time = departure + rng.u32(60..=900);
    }
    times
}

fn random_validity(rng: &mut fastrand::Rng, nb_days: usize) -> ValidityPattern {
    ValidityPattern::from_days(nb_days, (0..nb_days).filter(|_| rng.u8(..4) == 0))
}
