//! FIAP data model: the entities exchanged in one message

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp carried by a [`Value`]: an instant with a timezone offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Two-level projection of points: id -> (timestamp -> value).
pub type PointMap = BTreeMap<String, BTreeMap<Timestamp, String>>;

/// A single time-stamped scalar reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub time: Timestamp,
    pub value: String,
}

impl Value {
    pub fn new(time: Timestamp, value: impl Into<String>) -> Self {
        Self {
            time,
            value: value.into(),
        }
    }
}

/// A named time series. The id is globally meaningful (typically a URI).
///
/// Uniqueness of ids is not enforced by construction; duplicates are
/// merged by [`crate::merge_body`], never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

impl Point {
    pub fn new(id: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }
}

/// A named, recursively nestable grouping of points and point sets.
///
/// The tree is owned all the way down, so a point set can never contain
/// itself; the merge engine only moves whole subtrees and keeps it that
/// way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointSet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub point_sets: Vec<PointSet>,
}

impl PointSet {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            points: Vec::new(),
            point_sets: Vec::new(),
        }
    }
}

/// The top-level container of one message. A body has no id of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub point_sets: Vec<PointSet>,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a body with the factory API.
    pub fn builder() -> crate::builder::BodyBuilder {
        crate::builder::BodyBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.point_sets.is_empty()
    }
}

/// Selector for the minimum or maximum value under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Select {
    Minimum,
    Maximum,
}

/// Opaque selector addressing one or more points for a query.
///
/// The bound fields carry the usual FIAP comparison operators against
/// the value timestamps; all of them are optional and pass through the
/// wire untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lteq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gteq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trap: Option<bool>,
}

impl Key {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Key requesting push delivery of changed values.
    pub fn trap(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            trap: Some(true),
            ..Self::default()
        }
    }
}

/// Interaction style of a query: pull from storage, or register a push
/// subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Storage,
    Stream,
}

/// A request descriptor, echoed back by servers to carry the pagination
/// cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: String,
    #[serde(rename = "type")]
    pub query_type: QueryType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Subscription lifetime in seconds (STREAM queries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Address the remote side pushes matching data to (STREAM queries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl Query {
    /// A pull request over the given keys, with a fresh id.
    pub fn storage(keys: Vec<Key>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query_type: QueryType::Storage,
            keys,
            cursor: None,
            ttl: None,
            callback_data: None,
        }
    }

    /// A push-subscription registration over the given keys, with a
    /// fresh id.
    pub fn stream(keys: Vec<Key>, callback_data: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query_type: QueryType::Stream,
            keys,
            cursor: None,
            ttl: Some(ttl_secs),
            callback_data: Some(callback_data.into()),
        }
    }
}

/// Server-reported fault, surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Fault {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Envelope metadata. A response is expected to carry either the OK
/// marker or an error; absence of both is itself an error condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Fault>,
}

/// The full message envelope, used identically for requests and
/// responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl Transport {
    /// Envelope carrying a query in its header and no body.
    pub fn for_query(query: Query) -> Self {
        Self {
            header: Some(Header {
                query: Some(query),
                ok: false,
                error: None,
            }),
            body: None,
        }
    }

    /// Envelope carrying a body and no header.
    pub fn for_body(body: Body) -> Self {
        Self {
            header: None,
            body: Some(body),
        }
    }
}

/// Flatten points into an id -> (timestamp -> value) map.
///
/// Duplicate point ids merge into one entry; within an entry the last
/// value seen for a timestamp wins, since the target is a pure mapping.
pub fn point_map<'a, I>(points: I) -> PointMap
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut map = PointMap::new();
    for point in points {
        let values = map.entry(point.id.clone()).or_default();
        for v in &point.values {
            values.insert(v.time, v.value.clone());
        }
    }
    map
}

/// Inverse of [`point_map`]: one point per map entry, values ordered by
/// timestamp.
pub fn point_list(point_values: &PointMap) -> Vec<Point> {
    point_values
        .iter()
        .map(|(id, values)| Point {
            id: id.clone(),
            values: values
                .iter()
                .map(|(time, value)| Value::new(*time, value.clone()))
                .collect(),
        })
        .collect()
}
