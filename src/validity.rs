use fixedbitset::FixedBitSet;

use crate::idx::{Idx, JpIdx};
use crate::timetable::{Timetable, ValidityPattern, VehicleJourney};

/// Which calendar a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidityLevel {
    /// The planned schedule.
    Base,
    /// The schedule with disruptions applied.
    Adapted,
}

/// For every day of the timetable, the journey patterns with at least one
/// running vehicle journey:
///
/// `jp_validity_patterns[day][jp] == any(vj.validity_pattern.check(day) for vj in jp)`
#[derive(Debug, Default)]
pub struct JpValidityPatterns {
    jp_validity_patterns: Vec<FixedBitSet>,
    jp_adapted_validity_patterns: Vec<FixedBitSet>,
}

impl JpValidityPatterns {
    pub fn load(timetable: &Timetable) -> Self {
        Self {
            jp_validity_patterns: Self::compute(timetable, |vj| &vj.base_validity_pattern),
            jp_adapted_validity_patterns: Self::compute(timetable, |vj| &vj.adapted_validity_pattern),
        }
    }

    fn compute(timetable: &Timetable, validity_pattern: impl Fn(&VehicleJourney) -> &ValidityPattern) -> Vec<FixedBitSet> {
        let nb_jps = timetable.journey_patterns.len();
        let mut patterns = vec![FixedBitSet::with_capacity(nb_jps); timetable.nb_days];
        for vj in timetable.vehicle_journeys.values() {
            let jp = vj.journey_pattern.index();
            for day in validity_pattern(vj).days() {
                patterns[day].insert(jp);
            }
        }
        patterns
    }

    /// One bitset per day, indexed by journey pattern.
    pub fn patterns(&self, level: ValidityLevel) -> &[FixedBitSet] {
        match level {
            ValidityLevel::Base => &self.jp_validity_patterns,
            ValidityLevel::Adapted => &self.jp_adapted_validity_patterns,
        }
    }

    /// Days outside of the timetable are never valid.
    #[inline]
    pub fn is_valid(&self, level: ValidityLevel, day: usize, jp_idx: JpIdx) -> bool {
        self.patterns(level).get(day).is_some_and(|bitset| bitset.contains(jp_idx.index()))
    }

    pub fn nb_days(&self) -> usize {
        self.jp_validity_patterns.len()
    }
}
