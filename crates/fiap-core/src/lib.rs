//! Core types and rules for the IEEE 1888 ("FIAP") sensor-data protocol:
//! the point/point-set tree model, the id-keyed merge used to accumulate
//! paginated and pushed data, and the envelope success/error rules.

pub mod builder;
pub mod envelope;
pub mod error;
pub mod merge;
pub mod model;

pub use builder::BodyBuilder;
pub use envelope::{error_transport, ok_transport, validate_transport};
pub use error::{Error, Result};
pub use merge::merge_body;
pub use model::{
    point_list, point_map, Body, Fault, Header, Key, Point, PointMap, PointSet, Query, QueryType,
    Select, Timestamp, Transport, Value,
};
