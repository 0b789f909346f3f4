//! Factory-style construction of body trees.
//!
//! Nested point sets are described with closures instead of a stateful
//! parent-pointer chain, so a builder never escapes its scope
//! half-finished.

use crate::model::{Body, Point, PointSet, Timestamp, Value};

/// Builds a [`Body`] tree.
///
/// ```
/// use fiap_core::{Body, Timestamp};
///
/// fn t(s: &str) -> Timestamp { s.parse().unwrap() }
///
/// let body = Body::builder()
///     .point_set("http://host/", |ps| {
///         ps.point("http://host/power", |p| p.value(t("2024-01-01T00:00:00+09:00"), "42"))
///             .point_set("http://host/sub", |ps| ps)
///     })
///     .build();
///
/// assert_eq!(body.point_sets[0].points[0].id, "http://host/power");
/// ```
#[derive(Debug, Default)]
pub struct BodyBuilder {
    points: Vec<Point>,
    point_sets: Vec<PointSet>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level point, described by the closure.
    pub fn point(mut self, id: impl Into<String>, f: impl FnOnce(PointBuilder) -> PointBuilder) -> Self {
        self.points.push(f(PointBuilder::new(id)).finish());
        self
    }

    /// Add a top-level point set, described by the closure.
    pub fn point_set(
        mut self,
        id: impl Into<String>,
        f: impl FnOnce(PointSetBuilder) -> PointSetBuilder,
    ) -> Self {
        self.point_sets.push(f(PointSetBuilder::new(id)).finish());
        self
    }

    pub fn build(self) -> Body {
        Body {
            points: self.points,
            point_sets: self.point_sets,
        }
    }
}

/// Builds one [`PointSet`] subtree.
#[derive(Debug)]
pub struct PointSetBuilder {
    set: PointSet,
}

impl PointSetBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            set: PointSet::new(id),
        }
    }

    pub fn point(mut self, id: impl Into<String>, f: impl FnOnce(PointBuilder) -> PointBuilder) -> Self {
        self.set.points.push(f(PointBuilder::new(id)).finish());
        self
    }

    pub fn point_set(
        mut self,
        id: impl Into<String>,
        f: impl FnOnce(PointSetBuilder) -> PointSetBuilder,
    ) -> Self {
        self.set.point_sets.push(f(PointSetBuilder::new(id)).finish());
        self
    }

    fn finish(self) -> PointSet {
        self.set
    }
}

/// Builds one [`Point`] with its values.
#[derive(Debug)]
pub struct PointBuilder {
    point: Point,
}

impl PointBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            point: Point::new(id, Vec::new()),
        }
    }

    pub fn value(mut self, time: Timestamp, value: impl Into<String>) -> Self {
        self.point.values.push(Value::new(time, value));
        self
    }

    fn finish(self) -> Point {
        self.point
    }
}
