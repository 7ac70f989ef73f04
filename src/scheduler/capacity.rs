//! Responder capacity tracking.
//!
//! Keeps a per-instant count of treatments in progress over the horizon
//! and answers whether a new treatment interval fits under the responder
//! bound. Responders are fungible: only counts matter, never identities.
//!
//! Any set of intervals whose per-instant count stays within `capacity`
//! can be distributed over `capacity` responders without overlap (interval
//! graph coloring), so this count check is sufficient.

/// Per-instant responder occupancy over `[0, horizon)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityTracker {
    capacity: u32,
    busy: Vec<u32>,
}

impl CapacityTracker {
    /// Creates an empty tracker.
    pub fn new(capacity: u32, horizon: u32) -> Self {
        Self {
            capacity,
            busy: vec![0; horizon as usize],
        }
    }

    /// Maximum concurrent treatments.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of tracked time units.
    pub fn horizon(&self) -> u32 {
        self.busy.len() as u32
    }

    /// Treatments in progress at time unit `t` (0 outside the horizon).
    pub fn count_at(&self, t: u32) -> u32 {
        self.busy.get(t as usize).copied().unwrap_or(0)
    }

    /// Whether `[start, start + duration)` lies inside the horizon and
    /// every instant in it has a free responder.
    pub fn fits(&self, start: u32, duration: u32) -> bool {
        match self.span(start, duration) {
            Some(range) => self.busy[range].iter().all(|&c| c < self.capacity),
            None => false,
        }
    }

    /// Commits `[start, start + duration)` if it [`fits`](Self::fits).
    ///
    /// Returns `false` and leaves the tracker untouched otherwise.
    pub fn reserve(&mut self, start: u32, duration: u32) -> bool {
        if !self.fits(start, duration) {
            return false;
        }
        if let Some(range) = self.span(start, duration) {
            for c in &mut self.busy[range] {
                *c += 1;
            }
        }
        true
    }

    /// Records an interval without enforcing capacity, clipped at the horizon.
    ///
    /// Used to measure arbitrary plans; see [`overloaded`](Self::overloaded).
    pub fn record(&mut self, start: u32, duration: u32) {
        let horizon = self.busy.len();
        let from = (start as usize).min(horizon);
        let to = (start as usize).saturating_add(duration as usize).min(horizon);
        for c in &mut self.busy[from..to] {
            *c += 1;
        }
    }

    /// Lazily yields `(time, count)` for every time unit.
    pub fn occupancy(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.busy.iter().enumerate().map(|(t, &c)| (t as u32, c))
    }

    /// Lazily yields `(time, count)` where the count exceeds capacity.
    pub fn overloaded(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.occupancy().filter(move |&(_, c)| c > self.capacity)
    }

    /// Largest count over the horizon.
    pub fn peak(&self) -> u32 {
        self.busy.iter().copied().max().unwrap_or(0)
    }

    /// Free responder-time from `from` to the horizon.
    pub fn idle_units_from(&self, from: u32) -> u64 {
        (from..self.horizon())
            .map(|t| u64::from(self.capacity.saturating_sub(self.count_at(t))))
            .sum()
    }

    /// Whether this tracker is nowhere busier than `other` from `from` on.
    ///
    /// Instants before `from` are in the past for both and are ignored.
    pub fn is_no_busier_from(&self, other: &Self, from: u32) -> bool {
        let from = from as usize;
        self.busy
            .iter()
            .zip(&other.busy)
            .skip(from)
            .all(|(a, b)| a <= b)
    }

    fn span(&self, start: u32, duration: u32) -> Option<std::ops::Range<usize>> {
        if duration == 0 {
            return None;
        }
        let end = start.checked_add(duration)?;
        if end as usize > self.busy.len() {
            return None;
        }
        Some(start as usize..end as usize)
    }
}
