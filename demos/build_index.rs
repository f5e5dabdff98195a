use std::time::Instant;

use dataraptor::time::{get_time_str, parse_time};
use dataraptor::{DataRaptor, GtfsConfig, Timetable};
use dev_utils::{get_example_date, load_gtfs, random_timetable, RandomNetworkParams};

// Builds the routing data from the GTFS given as first argument (a zip or a
// directory), or from a generated network, then prints a few lookups.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let timetable = match std::env::args().nth(1) {
        Some(path) => {
            let gtfs = load_gtfs(&path)?;
            gtfs.print_stats();
            let config = GtfsConfig { start_date: get_example_date(), ..GtfsConfig::default() };
            Timetable::from_gtfs(&gtfs, &config)?
        }
        None => random_timetable(7, &RandomNetworkParams::default()),
    };

    let start = Instant::now();
    let data = DataRaptor::load(&timetable);
    println!("Routing data built in {:?}.", start.elapsed());
    data.print_stats();

    let start_time = parse_time("08:30:00")?;
    let Some((sp_idx, stop_point)) = timetable.stop_points.iter().find(|(sp, _)| !data.jpps_from_sp[*sp].is_empty()) else {
        println!("No stop point is served.");
        return Ok(());
    };
    println!();
    println!("Departures from {} after {}:", stop_point.name, get_time_str(start_time));
    for jpp in &data.jpps_from_sp[sp_idx] {
        let jp = &timetable.journey_patterns[jpp.jp_idx];
        if data.jpps_from_jp[jpp.jp_idx][jpp.order as usize].has_freq {
            println!("  {}: headway based, not in the sorted stop times.", jp.uri);
            continue;
        }
        match data.best_stop_time_data.after(jpp.jp_idx, jpp.order, start_time).first() {
            Some(st) => println!(
                "  {}: {} ({})",
                jp.uri,
                get_time_str(st.departure_time),
                timetable.vehicle_journeys[st.vehicle_journey].uri
            ),
            None => println!("  {}: no more departure today.", jp.uri),
        }
    }

    Ok(())
}
