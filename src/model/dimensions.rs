use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::binding::Observable;

use super::{AxisKind, Projection};

#[derive(Debug)]
pub struct Dimension {
    pub value: Observable<usize>,
    pub extent: usize,
}

/// Current index and extent of every positional dimension of an image.
#[derive(Debug, Default)]
pub struct Dimensions {
    axes: BTreeMap<AxisKind, Dimension>,
}

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, axis: AxisKind, value: usize, extent: usize) {
        self.axes.insert(
            axis,
            Dimension {
                value: Observable::new(value),
                extent,
            },
        );
    }

    pub fn get(&self, axis: AxisKind) -> Option<&Dimension> {
        self.axes.get(&axis)
    }

    pub fn observable(&self, axis: AxisKind) -> Option<&Observable<usize>> {
        self.axes.get(&axis).map(|dimension| &dimension.value)
    }

    pub fn value(&self, axis: AxisKind) -> Option<usize> {
        self.observable(axis).map(Observable::get)
    }

    /// Number of planes along `axis` (`max_<dim>`); absent axes count as one.
    pub fn max(&self, axis: AxisKind) -> usize {
        self.axes
            .get(&axis)
            .map(|dimension| dimension.extent)
            .unwrap_or(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisKind, &Dimension)> {
        self.axes.iter().map(|(axis, dimension)| (*axis, dimension))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRange {
    pub start: usize,
    pub end: usize,
}

impl ProjectionRange {
    pub fn new(first: usize, second: usize) -> Self {
        Self {
            start: first.min(second),
            end: first.max(second),
        }
    }

    pub fn to_value(self) -> Value {
        json!({"start": self.start, "end": self.end})
    }
}

/// Projection mode together with its range, recorded when projection is toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionState {
    pub projection: Projection,
    pub start: usize,
    pub end: usize,
}

impl ProjectionState {
    pub fn new(projection: Projection, range: ProjectionRange) -> Self {
        Self {
            projection,
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(self) -> ProjectionRange {
        ProjectionRange::new(self.start, self.end)
    }

    pub fn to_value(self) -> Value {
        json!({
            "projection": self.projection.as_str(),
            "start": self.start,
            "end": self.end,
        })
    }
}
