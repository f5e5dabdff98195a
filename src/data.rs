use std::time::Instant;

use fixedbitset::FixedBitSet;
use log::{debug, info};

use crate::best_stop_time::BestStopTimeData;
use crate::connections::Connections;
use crate::idx::JpIdx;
use crate::jpps::{JppsFromJp, JppsFromSp};
use crate::labels::Labels;
use crate::time;
use crate::timetable::Timetable;
use crate::validity::{JpValidityPatterns, ValidityLevel};

/// Static data of the RAPTOR search, never modified during a query.
///
/// Built once from a frozen `Timetable`, whose stop times it borrows. To take
/// a new schedule or disruption into account, build a new `DataRaptor` and
/// publish it in place of the old one (behind an `Arc` for instance).
#[derive(Debug)]
pub struct DataRaptor<'tt> {
    pub connections: Connections,
    pub jpps_from_sp: JppsFromSp,
    pub jpps_from_jp: JppsFromJp,
    pub best_stop_time_data: BestStopTimeData<'tt>,
    pub jp_validity_patterns: JpValidityPatterns,

    // Blank labels, to reset the labels of a query with a memcpy.
    pub labels_const: Labels,
    pub labels_const_reverse: Labels,
}

impl<'tt> DataRaptor<'tt> {
    pub fn load(timetable: &'tt Timetable) -> Self {
        let start = Instant::now();
        let nb_stop_points = timetable.stop_points.len();

        let labels_const = Labels::init(nb_stop_points, time::INF);
        let labels_const_reverse = Labels::init(nb_stop_points, time::MIN);

        let connections = Connections::load(timetable);
        debug!("Loaded {} connections.", connections.nb_connections());

        let jpps_from_sp = JppsFromSp::load(timetable);
        let jpps_from_jp = JppsFromJp::load(timetable);
        debug!("Loaded {} journey pattern points.", jpps_from_sp.nb_jpps());

        let best_stop_time_data = BestStopTimeData::load(timetable);
        debug!("Loaded {} sorted stop times.", best_stop_time_data.nb_stop_times());

        let jp_validity_patterns = JpValidityPatterns::load(timetable);
        debug!("Loaded journey pattern validity over {} days.", jp_validity_patterns.nb_days());

        info!(
            "Routing data for {} stop points and {} journey patterns built in {:?}.",
            nb_stop_points,
            timetable.journey_patterns.len(),
            start.elapsed()
        );

        Self {
            connections,
            jpps_from_sp,
            jpps_from_jp,
            best_stop_time_data,
            jp_validity_patterns,
            labels_const,
            labels_const_reverse,
        }
    }

    /// Removes from `jpps_from_sp` the journey pattern points missing in
    /// `valid_jpps`. Must run before the data is shared with queries.
    pub fn filter_jpps(&mut self, valid_jpps: &FixedBitSet) {
        let nb_removed = self.jpps_from_sp.filter_jpps(valid_jpps);
        debug!("Filtered out {nb_removed} journey pattern points.");
    }

    /// Same as `filter_jpps`, for build pipelines.
    pub fn with_filtered_jpps(mut self, valid_jpps: &FixedBitSet) -> Self {
        self.filter_jpps(valid_jpps);
        self
    }

    #[inline]
    pub fn is_jp_valid(&self, level: ValidityLevel, day: usize, jp_idx: JpIdx) -> bool {
        self.jp_validity_patterns.is_valid(level, day, jp_idx)
    }

    pub fn print_stats(&self) {
        info!("Number of stop points: {}", self.labels_const.len());
        info!("Number of connections: {}", self.connections.nb_connections());
        info!("Number of journey pattern points served: {}", self.jpps_from_sp.nb_jpps());
        info!("Number of sorted stop times: {}", self.best_stop_time_data.nb_stop_times());
        info!("Number of days: {}", self.jp_validity_patterns.nb_days());
    }
}
