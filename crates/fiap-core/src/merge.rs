//! Tree merge engine: folds one incoming body into accumulator
//! collections, matching entities by id.

use crate::model::{Body, Point, PointSet};

/// Merge an incoming body into the accumulator collections in place.
///
/// This is an id-keyed union with append semantics, not an overwrite:
///
/// - an incoming point set whose id already exists in the accumulator
///   has its child point/point-set lists appended to the existing entry
///   wholesale; otherwise it is adopted as-is.
/// - an incoming point whose id already exists has its values appended
///   to the existing entry; otherwise it is adopted as-is.
///
/// Id matching happens only at the level being merged, and the first
/// accumulator match wins when the accumulator already holds duplicate
/// ids. Values are never deduplicated, even for identical timestamps.
///
/// Either accumulator may be `None` when the caller does not track that
/// kind of entity; the corresponding incoming entities are dropped.
pub fn merge_body(
    points: Option<&mut Vec<Point>>,
    point_sets: Option<&mut Vec<PointSet>>,
    incoming: Body,
) {
    if let Some(store) = point_sets {
        for ps in incoming.point_sets {
            match store.iter_mut().find(|it| it.id == ps.id) {
                Some(existing) => {
                    existing.points.extend(ps.points);
                    existing.point_sets.extend(ps.point_sets);
                }
                None => store.push(ps),
            }
        }
    }

    if let Some(store) = points {
        for p in incoming.points {
            match store.iter_mut().find(|it| it.id == p.id) {
                Some(existing) => existing.values.extend(p.values),
                None => store.push(p),
            }
        }
    }
}
