use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ChartId, ParsedChartData};
use crate::render::SurfaceSize;

/// One cached bitmap and what it was rendered from.
#[derive(Debug)]
pub struct CachedRender<B> {
    pub bitmap: Rc<B>,
    /// Invalidation counter observed when the render started.
    pub version: u64,
    /// Logical and physical dimensions of `bitmap`.
    pub size: SurfaceSize,
    pub data: Rc<ParsedChartData>,
    pub rendered_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum CacheLookup<'a, B> {
    /// Entry rendered at the chart's current version.
    Current(&'a CachedRender<B>),
    /// Entry from an older version, still served while a new one renders.
    Stale(&'a CachedRender<B>),
    Missing,
}

/// Permission to run one render of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    pub chart_id: ChartId,
    pub ticket: u64,
    pub version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Stored,
    /// The chart was invalidated while the render ran.
    Superseded { current_version: u64 },
    /// The chart was evicted or the registry reset while the render ran.
    Evicted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderStats {
    pub started: u64,
    pub committed: u64,
    pub discarded: u64,
    pub failed: u64,
}

/// Per-chart version counters, cached bitmaps and in-flight tickets.
///
/// A chart is in flight while its ticket is registered. Only the holder of
/// that exact ticket can commit or release, so a render that outlives an
/// eviction or reset can neither store its bitmap nor clear the flag of a
/// newer render.
#[derive(Debug)]
pub struct ChartRenderRegistry<B> {
    versions: HashMap<ChartId, u64>,
    entries: HashMap<ChartId, CachedRender<B>>,
    in_flight: HashMap<ChartId, u64>,
    next_ticket: u64,
    stats: RenderStats,
}

impl<B> Default for ChartRenderRegistry<B> {
    fn default() -> Self {
        Self {
            versions: HashMap::new(),
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            next_ticket: 0,
            stats: RenderStats::default(),
        }
    }
}

impl<B> ChartRenderRegistry<B> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current invalidation counter; charts never invalidated are at 0.
    #[must_use]
    pub fn version(&self, chart_id: ChartId) -> u64 {
        self.versions.get(&chart_id).copied().unwrap_or(0)
    }

    /// Bumps the chart's counter and returns the new value.
    ///
    /// The cached entry is kept and served as stale.
    pub fn invalidate(&mut self, chart_id: ChartId) -> u64 {
        let version = self.versions.entry(chart_id).or_insert(0);
        *version += 1;
        *version
    }

    #[must_use]
    pub fn lookup(&self, chart_id: ChartId) -> CacheLookup<'_, B> {
        match self.entries.get(&chart_id) {
            Some(entry) if entry.version == self.version(chart_id) => CacheLookup::Current(entry),
            Some(entry) => CacheLookup::Stale(entry),
            None => CacheLookup::Missing,
        }
    }

    /// Data behind the cached bitmap, current or stale.
    #[must_use]
    pub fn cached_data(&self, chart_id: ChartId) -> Option<Rc<ParsedChartData>> {
        self.entries
            .get(&chart_id)
            .map(|entry| Rc::clone(&entry.data))
    }

    #[must_use]
    pub fn cached_size(&self, chart_id: ChartId) -> Option<SurfaceSize> {
        self.entries.get(&chart_id).map(|entry| entry.size)
    }

    #[must_use]
    pub fn is_in_flight(&self, chart_id: ChartId) -> bool {
        self.in_flight.contains_key(&chart_id)
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.entries.len()
    }

    /// Claims the chart's render slot, or returns `None` while another
    /// render of the same chart holds it.
    pub fn try_begin_render(&mut self, chart_id: ChartId) -> Option<RenderTicket> {
        if self.in_flight.contains_key(&chart_id) {
            return None;
        }

        self.next_ticket += 1;
        let ticket = RenderTicket {
            chart_id,
            ticket: self.next_ticket,
            version: self.version(chart_id),
        };
        self.in_flight.insert(chart_id, ticket.ticket);
        self.stats.started += 1;
        Some(ticket)
    }

    /// Stores a finished bitmap when its ticket still owns the slot and the
    /// chart was not invalidated meanwhile; otherwise discards it.
    pub fn commit(
        &mut self,
        ticket: &RenderTicket,
        bitmap: B,
        size: SurfaceSize,
        data: Rc<ParsedChartData>,
    ) -> CommitOutcome {
        if !self.owns_slot(ticket) {
            self.stats.discarded += 1;
            return CommitOutcome::Evicted;
        }

        let current_version = self.version(ticket.chart_id);
        if current_version != ticket.version {
            self.stats.discarded += 1;
            return CommitOutcome::Superseded { current_version };
        }

        self.entries.insert(
            ticket.chart_id,
            CachedRender {
                bitmap: Rc::new(bitmap),
                version: ticket.version,
                size,
                data,
                rendered_at: Utc::now(),
            },
        );
        self.stats.committed += 1;
        CommitOutcome::Stored
    }

    /// Counts a failed render unless its chart was evicted or reset
    /// meanwhile. Returns whether the failure was counted.
    pub fn record_failure(&mut self, ticket: &RenderTicket) -> bool {
        if self.owns_slot(ticket) {
            self.stats.failed += 1;
            true
        } else {
            false
        }
    }

    /// Frees the render slot if `ticket` still holds it.
    pub fn release(&mut self, ticket: &RenderTicket) -> bool {
        if self.owns_slot(ticket) {
            self.in_flight.remove(&ticket.chart_id);
            true
        } else {
            false
        }
    }

    /// Forgets everything about one chart.
    pub fn evict(&mut self, chart_id: ChartId) {
        self.versions.remove(&chart_id);
        self.entries.remove(&chart_id);
        self.in_flight.remove(&chart_id);
    }

    /// Forgets everything about every chart. Statistics are kept.
    pub fn reset(&mut self) {
        self.versions.clear();
        self.entries.clear();
        self.in_flight.clear();
    }

    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    fn owns_slot(&self, ticket: &RenderTicket) -> bool {
        self.in_flight.get(&ticket.chart_id) == Some(&ticket.ticket)
    }
}
