//! Accumulation stores for pushed trap data.
//!
//! A store is shared between the inbound listener (merging pushes) and
//! the scheduled expiry action (publishing the result), so every shape
//! serializes access behind a single mutex.

use std::collections::VecDeque;

use fiap_core::{merge_body, point_map, Body, Point, PointMap};
use parking_lot::Mutex;
use tracing::debug;

/// One shape of trap accumulation. Implementations accept one pushed
/// body at a time; the choice of shape is the caller's, made at call
/// time.
pub trait TrapStore: Send + Sync {
    fn accept(&self, body: Body) -> fiap_core::Result<()>;
}

/// Flat list of points, merged by id: values for an already-known point
/// id are appended, unknown ids are adopted.
#[derive(Debug, Default)]
pub struct PointStore {
    points: Mutex<Vec<Point>>,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the accumulated points.
    pub fn snapshot(&self) -> Vec<Point> {
        self.points.lock().clone()
    }
}

impl TrapStore for PointStore {
    fn accept(&self, body: Body) -> fiap_core::Result<()> {
        let mut points = self.points.lock();
        merge_body(Some(&mut points), None, body);
        debug!(points = points.len(), "push merged into point store");
        Ok(())
    }
}

/// Append-only queue of points: every pushed point object is queued
/// as-is, duplicates included, with no merging.
#[derive(Debug, Default)]
pub struct PointQueue {
    points: Mutex<VecDeque<Point>>,
}

impl PointQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.lock().is_empty()
    }

    /// Copy of the queued points in arrival order.
    pub fn snapshot(&self) -> Vec<Point> {
        self.points.lock().iter().cloned().collect()
    }

    /// Remove and return all queued points.
    pub fn drain(&self) -> Vec<Point> {
        self.points.lock().drain(..).collect()
    }
}

impl TrapStore for PointQueue {
    fn accept(&self, body: Body) -> fiap_core::Result<()> {
        let mut points = self.points.lock();
        points.extend(body.points);
        debug!(queued = points.len(), "push queued");
        Ok(())
    }
}

/// Two-level mapping from point id to (timestamp -> value): merged by id
/// then by timestamp, later values overwriting earlier ones at the same
/// timestamp.
#[derive(Debug, Default)]
pub struct PointMapStore {
    map: Mutex<PointMap>,
}

impl PointMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the accumulated mapping.
    pub fn snapshot(&self) -> PointMap {
        self.map.lock().clone()
    }
}

impl TrapStore for PointMapStore {
    fn accept(&self, body: Body) -> fiap_core::Result<()> {
        let incoming = point_map(&body.points);
        let mut map = self.map.lock();
        for (id, values) in incoming {
            map.entry(id).or_default().extend(values);
        }
        debug!(ids = map.len(), "push merged into point map store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use fiap_core::{Timestamp, Value};

    fn ts(secs: i64) -> Timestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(secs, 0)
            .unwrap()
    }

    fn body(id: &str, secs: i64, value: &str) -> Body {
        Body {
            points: vec![Point::new(id, vec![Value::new(ts(secs), value)])],
            point_sets: vec![],
        }
    }

    #[test]
    fn point_store_merges_by_id() {
        let store = PointStore::new();
        store.accept(body("p1", 0, "a")).unwrap();
        store.accept(body("p1", 10, "b")).unwrap();
        store.accept(body("p2", 0, "c")).unwrap();

        let points = store.snapshot();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].values.len(), 2);
    }

    #[test]
    fn point_queue_keeps_duplicates() {
        let queue = PointQueue::new();
        queue.accept(body("p1", 0, "a")).unwrap();
        queue.accept(body("p1", 0, "a")).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn point_map_store_overwrites_same_timestamp() {
        let store = PointMapStore::new();
        store.accept(body("p1", 0, "old")).unwrap();
        store.accept(body("p1", 0, "new")).unwrap();
        store.accept(body("p1", 10, "x")).unwrap();

        let map = store.snapshot();
        assert_eq!(map["p1"].len(), 2);
        assert_eq!(map["p1"][&ts(0)], "new");
    }

    #[test]
    fn stores_ignore_point_sets() {
        let store = PointStore::new();
        store
            .accept(Body {
                points: vec![],
                point_sets: vec![fiap_core::PointSet::new("ps")],
            })
            .unwrap();
        assert!(store.snapshot().is_empty());
    }
}
