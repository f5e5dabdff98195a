use dataraptor::time::{self, DateTime, Timestamp};
use dataraptor::{DataRaptor, JpIdx, Timetable};
use dev_utils::{get_example_scenario, random_timetable, RandomNetworkParams};

const SEEDS: [u64; 4] = [7, 42, 1234, 99_999];

fn for_each_block(tt: &Timetable, mut f: impl FnMut(JpIdx, u16)) {
    for (jp_idx, jp) in tt.journey_patterns.iter() {
        for order in 0..jp.journey_pattern_points.len() as u16 {
            f(jp_idx, order);
        }
    }
}

fn departure(st: &&dataraptor::timetable::StopTime) -> Timestamp {
    time::hour(st.departure_time)
}

fn arrival(st: &&dataraptor::timetable::StopTime) -> Timestamp {
    time::hour(st.arrival_time)
}

#[test]
fn example_scenario() {
    let (tt, p1) = get_example_scenario();
    let data = DataRaptor::load(&tt);
    let t = |s| time::parse_time(s).unwrap();
    let sts = &data.best_stop_time_data;

    let after: Vec<_> = sts.after(p1, 0, t("08:15:00")).iter().map(departure).collect();
    assert_eq!(after, vec![t("08:30:00"), t("09:00:00")]);
    let before: Vec<_> = sts.before(p1, 1, t("08:55:00")).iter().map(arrival).collect();
    assert_eq!(before, vec![t("08:50:00"), t("08:20:00")]);
    assert!(sts.after(p1, 0, t("09:01:00")).is_empty());
    assert!(sts.before(p1, 1, t("08:19:00")).is_empty());

    let isolated = tt.stop_point_by_uri("C").unwrap();
    assert!(data.connections.forward(isolated).is_empty());
    assert!(data.connections.backward(isolated).is_empty());
}

#[test]
fn blocks_are_sorted_and_match_stop_times() {
    for seed in SEEDS {
        let tt = random_timetable(seed, &RandomNetworkParams::default());
        let data = DataRaptor::load(&tt);
        let sts = &data.best_stop_time_data;

        for_each_block(&tt, |jp, order| {
            let forward = sts.forward_range(jp, order);
            let backward = sts.backward_range(jp, order);
            assert!(forward.windows(2).all(|w| departure(&w[0]) <= departure(&w[1])));
            assert!(backward.windows(2).all(|w| arrival(&w[0]) >= arrival(&w[1])));

            assert_eq!(forward.iter().map(departure).collect::<Vec<_>>(), sts.departure_times(jp, order));
            assert_eq!(backward.iter().map(arrival).collect::<Vec<_>>(), sts.arrival_times(jp, order));

            let nb_trips = tt.journey_patterns[jp].discrete_vehicle_journeys.len();
            assert_eq!(forward.len(), nb_trips);
            assert_eq!(backward.len(), nb_trips);
            assert_eq!(sts.nb_trips(jp), nb_trips);
            assert!(forward.iter().chain(backward).all(|st| st.order == order));
        });
    }
}

#[test]
fn after_and_before_return_exact_suffixes() {
    let probes: Vec<DateTime> = (0..=48).map(|half_hours| half_hours * 1800).chain([time::set(3, 8 * 3600 + 17)]).collect();
    for seed in SEEDS {
        let tt = random_timetable(seed, &RandomNetworkParams::default());
        let data = DataRaptor::load(&tt);
        let sts = &data.best_stop_time_data;

        for_each_block(&tt, |jp, order| {
            let forward = sts.forward_range(jp, order);
            let backward = sts.backward_range(jp, order);
            for &dt in &probes {
                let hour = time::hour(dt);

                let after = sts.after(jp, order, dt);
                let expected = forward.iter().position(|st| departure(st) >= hour).unwrap_or(forward.len());
                assert_eq!(after, &forward[expected..]);

                let before = sts.before(jp, order, dt);
                let expected = backward.iter().position(|st| arrival(st) <= hour).unwrap_or(backward.len());
                assert_eq!(before, &backward[expected..]);
            }
        });
    }
}

#[test]
fn stored_departure_times_are_exact_boundaries() {
    let tt = random_timetable(3, &RandomNetworkParams::default());
    let data = DataRaptor::load(&tt);
    let sts = &data.best_stop_time_data;

    for_each_block(&tt, |jp, order| {
        for (i, &dep) in sts.departure_times(jp, order).iter().enumerate() {
            let after = sts.after(jp, order, dep);
            // Inclusive: the first trip departing at `dep` is kept.
            assert!(after.len() >= sts.nb_trips(jp) - i);
            assert_eq!(departure(&after[0]), dep);
        }
        for (i, &arr) in sts.arrival_times(jp, order).iter().enumerate() {
            let before = sts.before(jp, order, arr);
            assert!(before.len() >= sts.nb_trips(jp) - i);
            assert_eq!(arrival(&before[0]), arr);
        }
    });
}
