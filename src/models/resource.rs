//! Resource model (resource catalog).
//!
//! Resources are treatment kinds: a tourniquet kit, a transfusion, an
//! airway procedure. Each kind has a fixed duration during which it keeps
//! one responder busy, and a survival-probability boost applied at the
//! moment treatment starts. Kinds are reusable without limit in count.

use serde::{Deserialize, Serialize};

/// A treatment kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Time units one responder is occupied (must be positive).
    #[serde(rename = "time")]
    pub duration: u32,
    /// Probability points added at treatment start (non-negative).
    pub boost: f64,
}

impl Resource {
    /// Creates a new resource kind.
    pub fn new(duration: u32, boost: f64) -> Self {
        Self { duration, boost }
    }

    /// Whether a treatment starting at `start` completes within `horizon`.
    #[inline]
    pub fn fits_within(&self, start: u32, horizon: u32) -> bool {
        start
            .checked_add(self.duration)
            .is_some_and(|end| end <= horizon)
    }

    /// Completion time of a treatment starting at `start` (exclusive).
    #[inline]
    pub fn end_time(&self, start: u32) -> u32 {
        start.saturating_add(self.duration)
    }
}

/// Ordered catalog of resource kinds, indexed by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceCatalog {
    resources: Vec<Resource>,
}

impl ResourceCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource kind; its index is the current length.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Looks up a resource by index.
    pub fn get(&self, index: usize) -> Option<&Resource> {
        self.resources.get(index)
    }

    /// Number of resource kinds.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterates `(index, resource)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Resource)> {
        self.resources.iter().enumerate()
    }

    /// Resources that can start at `start` and finish within `horizon`.
    ///
    /// Kinds whose duration overruns the horizon are silently excluded;
    /// this is not an error.
    pub fn usable_at(&self, start: u32, horizon: u32) -> impl Iterator<Item = (usize, &Resource)> {
        self.iter()
            .filter(move |(_, r)| r.fits_within(start, horizon))
    }
}

impl From<Vec<Resource>> for ResourceCatalog {
    fn from(resources: Vec<Resource>) -> Self {
        Self { resources }
    }
}
