use crate::idx::{IdxMap, SpIdx};
use crate::time::DateTime;

/// Per stop point best times of a search: `dt_pts` when reached by public
/// transport, `dt_transfers` when reached by a transfer.
///
/// The search keeps one `Labels` per round and resets it from a template
/// built at load time with `clear`, which is a plain memory copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    dt_pts: IdxMap<SpIdx, DateTime>,
    dt_transfers: IdxMap<SpIdx, DateTime>,
}

impl Labels {
    /// Every stop point set to `val`.
    pub fn init(nb_stop_points: usize, val: DateTime) -> Self {
        Self {
            dt_pts: IdxMap::with_len(nb_stop_points, val),
            dt_transfers: IdxMap::with_len(nb_stop_points, val),
        }
    }

    /// Resets `self` to `template`, reusing the allocation.
    pub fn clear(&mut self, template: &Labels) {
        if self.dt_pts.len() == template.dt_pts.len() {
            self.dt_pts.as_mut_slice().copy_from_slice(template.dt_pts.as_slice());
            self.dt_transfers.as_mut_slice().copy_from_slice(template.dt_transfers.as_slice());
        } else {
            self.clone_from(template);
        }
    }

    pub fn len(&self) -> usize {
        self.dt_pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dt_pts.is_empty()
    }

    #[inline]
    pub fn dt_pt(&self, sp_idx: SpIdx) -> DateTime {
        self.dt_pts[sp_idx]
    }

    #[inline]
    pub fn dt_transfer(&self, sp_idx: SpIdx) -> DateTime {
        self.dt_transfers[sp_idx]
    }

    #[inline]
    pub fn mut_dt_pt(&mut self, sp_idx: SpIdx) -> &mut DateTime {
        &mut self.dt_pts[sp_idx]
    }

    #[inline]
    pub fn mut_dt_transfer(&mut self, sp_idx: SpIdx) -> &mut DateTime {
        &mut self.dt_transfers[sp_idx]
    }

    /// True when every label equals `val`.
    pub fn all_equal(&self, val: DateTime) -> bool {
        self.dt_pts.values().chain(self.dt_transfers.values()).all(|&dt| dt == val)
    }
}
