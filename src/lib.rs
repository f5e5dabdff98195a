pub mod idx;

pub use idx::{Idx, IdxMap, JpIdx, JppIdx, SpIdx, VjIdx};

pub mod error;

pub use error::{Error, Result};

pub mod time;

pub mod timetable;

pub use timetable::{Timetable, TimetableBuilder};

pub mod gtfs;

pub use gtfs::GtfsConfig;

pub mod connections;

pub mod jpps;

pub mod best_stop_time;

pub mod validity;

pub use validity::ValidityLevel;

pub mod labels;

pub mod data;

pub use data::DataRaptor;
