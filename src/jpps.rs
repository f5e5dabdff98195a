use fixedbitset::FixedBitSet;

use crate::idx::{Idx, IdxMap, JpIdx, JppIdx, SpIdx};
use crate::timetable::Timetable;

/// Compressed journey pattern point, as seen from a stop point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpJpp {
    pub idx: JppIdx,
    pub jp_idx: JpIdx,
    /// Position of the point in its journey pattern.
    pub order: u16,
}

/// Cache friendly access to the journey pattern points serving a stop point.
#[derive(Debug, Default)]
pub struct JppsFromSp {
    jpps_from_sp: IdxMap<SpIdx, Vec<SpJpp>>,
}

impl JppsFromSp {
    pub fn load(timetable: &Timetable) -> Self {
        let jpps_from_sp = timetable
            .stop_points
            .values()
            .map(|sp| {
                sp.journey_pattern_points
                    .iter()
                    .map(|&jpp_idx| {
                        let jpp = &timetable.journey_pattern_points[jpp_idx];
                        SpJpp { idx: jpp_idx, jp_idx: jpp.journey_pattern, order: jpp.order }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { jpps_from_sp }
    }

    /// Drops every journey pattern point not in `valid_jpps`, keeping the
    /// order of the survivors. Returns the number of removed entries.
    pub fn filter_jpps(&mut self, valid_jpps: &FixedBitSet) -> usize {
        let mut nb_removed = 0;
        for jpps in self.jpps_from_sp.values_mut() {
            let before = jpps.len();
            jpps.retain(|jpp| valid_jpps.contains(jpp.idx.index()));
            nb_removed += before - jpps.len();
        }
        nb_removed
    }

    pub fn nb_jpps(&self) -> usize {
        self.jpps_from_sp.values().map(Vec::len).sum()
    }
}

impl std::ops::Index<SpIdx> for JppsFromSp {
    type Output = [SpJpp];

    #[inline]
    fn index(&self, sp_idx: SpIdx) -> &[SpJpp] {
        &self.jpps_from_sp[sp_idx]
    }
}

/// Compressed journey pattern point, as seen from its journey pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpJpp {
    pub idx: JppIdx,
    pub sp_idx: SpIdx,
    pub order: u16,
    /// The journey pattern has headway based trips, which are not in
    /// `BestStopTimeData`.
    pub has_freq: bool,
}

/// Cache friendly access to the ordered journey pattern points of a journey pattern.
#[derive(Debug, Default)]
pub struct JppsFromJp {
    jpps_from_jp: IdxMap<JpIdx, Vec<JpJpp>>,
}

impl JppsFromJp {
    pub fn load(timetable: &Timetable) -> Self {
        let jpps_from_jp = timetable
            .journey_patterns
            .values()
            .map(|jp| {
                let has_freq = !jp.frequency_vehicle_journeys.is_empty();
                jp.journey_pattern_points
                    .iter()
                    .map(|&jpp_idx| {
                        let jpp = &timetable.journey_pattern_points[jpp_idx];
                        JpJpp { idx: jpp_idx, sp_idx: jpp.stop_point, order: jpp.order, has_freq }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { jpps_from_jp }
    }
}

impl std::ops::Index<JpIdx> for JppsFromJp {
    type Output = [JpJpp];

    #[inline]
    fn index(&self, jp_idx: JpIdx) -> &[JpJpp] {
        &self.jpps_from_jp[jp_idx]
    }
}
