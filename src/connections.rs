use crate::idx::{IdxMap, SpIdx};
use crate::time::Timestamp;
use crate::timetable::Timetable;

/// A transfer edge: `duration` seconds to reach `sp_idx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub duration: Timestamp,
    pub sp_idx: SpIdx,
}

/// Cache friendly access to the transfers of a stop point, in both directions.
#[derive(Debug, Default)]
pub struct Connections {
    // For a stop point, the connections leaving it.
    forward_connections: IdxMap<SpIdx, Vec<Connection>>,
    // For a stop point, the connections reaching it (`sp_idx` is the origin).
    backward_connections: IdxMap<SpIdx, Vec<Connection>>,
}

impl Connections {
    pub fn load(timetable: &Timetable) -> Self {
        let nb_stop_points = timetable.stop_points.len();
        let mut forward_connections = IdxMap::with_len(nb_stop_points, Vec::new());
        let mut backward_connections = IdxMap::with_len(nb_stop_points, Vec::new());
        for conn in &timetable.stop_point_connections {
            forward_connections[conn.departure].push(Connection { duration: conn.duration, sp_idx: conn.destination });
            backward_connections[conn.destination].push(Connection { duration: conn.duration, sp_idx: conn.departure });
        }
        Self { forward_connections, backward_connections }
    }

    #[inline]
    pub fn forward(&self, sp_idx: SpIdx) -> &[Connection] {
        &self.forward_connections[sp_idx]
    }

    #[inline]
    pub fn backward(&self, sp_idx: SpIdx) -> &[Connection] {
        &self.backward_connections[sp_idx]
    }

    pub fn nb_connections(&self) -> usize {
        self.forward_connections.values().map(Vec::len).sum()
    }
}
