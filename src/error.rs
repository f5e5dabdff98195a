use crate::idx::{JpIdx, SpIdx, VjIdx};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid time {0:?} (expected HH:MM:SS).")]
    InvalidTime(String),
    #[error("Unknown stop point {0}.")]
    UnknownStopPoint(SpIdx),
    #[error("Unknown journey pattern {0}.")]
    UnknownJourneyPattern(JpIdx),
    #[error("Unknown vehicle journey {0}.")]
    UnknownVehicleJourney(VjIdx),
    #[error("Journey pattern {0:?} has no stop point.")]
    EmptyJourneyPattern(String),
    #[error("Journey pattern {uri:?} has {found} stop points, at most {max} are supported.")]
    TooManyStopPoints { uri: String, found: usize, max: usize },
    #[error("Vehicle journey {uri:?} has {found} stop times but its journey pattern has {expected} points.")]
    StopTimesMismatch { uri: String, expected: usize, found: usize },
    #[error("Vehicle journey {uri:?} arrives after it departs at stop time {order}.")]
    ArrivalAfterDeparture { uri: String, order: u16 },
    #[error("Validity pattern of {uri:?} covers {found} days but the timetable covers {expected}.")]
    ValidityLength { uri: String, expected: usize, found: usize },
    #[error("Trip {trip_id:?} has a stop time without arrival or departure time.")]
    MissingStopTime { trip_id: String },
    #[error("Trip {trip_id:?} refers to unknown service {service_id:?}.")]
    UnknownService { trip_id: String, service_id: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
