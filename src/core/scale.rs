use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// Tick count used when a caller does not ask for a specific density.
pub const DEFAULT_TICK_COUNT: usize = 5;

/// Tick values; axis tick runs stay small enough to live inline.
pub type Ticks = SmallVec<[f64; 16]>;

/// Upper bound on the number of intervals `LinearScale::ticks` walks.
const MAX_TICK_RUN: f64 = 10_000.0;

/// Affine value-to-pixel mapping over a "nice" rounded domain.
///
/// Construction extends the requested domain outward to multiples of a
/// 1/2/5×10^k step so ticks land on human-friendly values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_start: f64,
    range_end: f64,
    step: f64,
    tick_count: usize,
}

impl LinearScale {
    /// Builds a niced scale with the default tick density.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        Self::with_tick_count(domain, range, DEFAULT_TICK_COUNT)
    }

    /// Builds a niced scale targeting roughly `tick_count` intervals.
    pub fn with_tick_count(
        domain: (f64, f64),
        range: (f64, f64),
        tick_count: usize,
    ) -> ChartResult<Self> {
        validate_domain(domain)?;
        validate_range(range)?;

        let tick_count = tick_count.max(1);
        let (min, max) = resolve_degenerate_domain(domain.0, domain.1);
        if !(max - min).is_finite() {
            return Err(ChartError::InvalidData(format!(
                "scale domain [{min}, {max}] spans more than f64 can represent"
            )));
        }
        let (domain_min, domain_max, step) = nice_domain(min, max, tick_count);
        if !domain_min.is_finite() || !domain_max.is_finite() || !(domain_max - domain_min).is_finite()
        {
            return Err(ChartError::InvalidData(format!(
                "niced domain of [{min}, {max}] overflows f64"
            )));
        }
        Ok(Self {
            domain_min,
            domain_max,
            range_start: range.0,
            range_end: range.1,
            step,
            tick_count,
        })
    }

    /// Builds a niced scale whose domain always contains zero, as value axes
    /// of bar charts need a baseline to grow bars from.
    pub fn including_zero(
        domain: (f64, f64),
        range: (f64, f64),
        tick_count: usize,
    ) -> ChartResult<Self> {
        validate_domain(domain)?;
        Self::with_tick_count((domain.0.min(0.0), domain.1.max(0.0)), range, tick_count)
    }

    /// Replaces either side of the niced domain with an explicit bound.
    ///
    /// Bounds that are non-finite or that would produce an empty or
    /// unrepresentable domain are ignored and the niced domain is kept.
    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        let lo = min.filter(|value| value.is_finite()).unwrap_or(self.domain_min);
        let hi = max.filter(|value| value.is_finite()).unwrap_or(self.domain_max);
        if lo < hi && (hi - lo).is_finite() {
            self.domain_min = lo;
            self.domain_max = hi;
            self.step = nice_step((hi - lo) / self.tick_count as f64);
        }
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn step(self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        let span = self.domain_max - self.domain_min;
        let normalized = (value - self.domain_min) / span;
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    /// Every multiple of a nice step that lies inside the domain.
    ///
    /// Returns no ticks when the run would not fit `MAX_TICK_RUN`.
    #[must_use]
    pub fn ticks(self, count: usize) -> Ticks {
        let span = self.domain_max - self.domain_min;
        let step = nice_step(span / count.max(1) as f64);
        let first = (self.domain_min / step - 1e-9).ceil();
        let last = (self.domain_max / step + 1e-9).floor();
        if !first.is_finite() || !last.is_finite() || last - first > MAX_TICK_RUN {
            return Ticks::new();
        }

        let mut ticks = Ticks::new();
        let mut index = first;
        while index <= last {
            ticks.push(step_multiple(index, step));
            index += 1.0;
        }
        ticks
    }
}

/// Rounds a raw step to the nearest of {1, 2, 5, 10} × 10^k.
#[must_use]
pub fn nice_step(raw_step: f64) -> f64 {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return 1.0;
    }

    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Extends `[min, max]` outward to multiples of a nice step.
///
/// Returns `(niced_min, niced_max, step)`. Requires `min < max`.
#[must_use]
pub fn nice_domain(min: f64, max: f64, tick_count: usize) -> (f64, f64, f64) {
    let step = nice_step((max - min) / tick_count.max(1) as f64);

    let mut lo_index = (min / step).floor();
    let mut lo = step_multiple(lo_index, step);
    // snapping can land one ulp inside the data
    for _ in 0..4 {
        if lo <= min {
            break;
        }
        lo_index -= 1.0;
        lo = step_multiple(lo_index, step);
    }

    let mut hi_index = (max / step).ceil();
    let mut hi = step_multiple(hi_index, step);
    for _ in 0..4 {
        if hi >= max {
            break;
        }
        hi_index += 1.0;
        hi = step_multiple(hi_index, step);
    }
    (lo, hi, step)
}

fn resolve_degenerate_domain(min: f64, max: f64) -> (f64, f64) {
    if min != max {
        return (min, max);
    }
    if min == 0.0 {
        (0.0, 1.0)
    } else if min > 0.0 {
        (0.0, min * 1.2)
    } else {
        (min * 1.2, 0.0)
    }
}

/// `index × step`, snapped to the closest decimal with the step's precision.
///
/// Sub-unit steps are split into an integer mantissa over an exact power of
/// ten, so `3 × 0.1` comes out as `0.3` at any magnitude.
fn step_multiple(index: f64, step: f64) -> f64 {
    let exponent = step.log10().floor();
    let value = if exponent < 0.0 {
        let scale = 10f64.powi(-exponent as i32);
        let mantissa = (step * scale).round();
        if scale.is_finite() && mantissa > 0.0 {
            index * mantissa / scale
        } else {
            index * step
        }
    } else {
        index * step
    };
    // normalize `-0.0`
    if value == 0.0 { 0.0 } else { value }
}

fn validate_domain(domain: (f64, f64)) -> ChartResult<()> {
    if !domain.0.is_finite() || !domain.1.is_finite() {
        return Err(ChartError::InvalidData(
            "scale domain must be finite".to_owned(),
        ));
    }
    if domain.0 > domain.1 {
        return Err(ChartError::InvalidData(
            "scale domain min must be <= max".to_owned(),
        ));
    }
    Ok(())
}

fn validate_range(range: (f64, f64)) -> ChartResult<()> {
    if !range.0.is_finite() || !range.1.is_finite() {
        return Err(ChartError::InvalidData(
            "scale range must be finite".to_owned(),
        ));
    }
    Ok(())
}

/// Categorical mapping dividing a pixel range into equal padded bands.
///
/// Inner padding between bands is `bandwidth * padding`; outer padding at
/// each end is half of that.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    index: IndexMap<String, usize>,
    len: usize,
    range_start: f64,
    range_end: f64,
    padding: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(categories: &[String], range: (f64, f64), padding: f64) -> ChartResult<Self> {
        validate_range(range)?;
        if range.1 < range.0 {
            return Err(ChartError::InvalidData(
                "band scale range end must be >= start".to_owned(),
            ));
        }
        if !padding.is_finite() || !(0.0..1.0).contains(&padding) {
            return Err(ChartError::InvalidData(
                "band padding must be finite and in [0, 1)".to_owned(),
            ));
        }

        let mut index = IndexMap::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            index.entry(category.clone()).or_insert(position);
        }

        let len = categories.len();
        let total = range.1 - range.0;
        let bandwidth = if len == 0 {
            0.0
        } else {
            let n = len as f64;
            total / (n + padding * (n - 1.0) + padding)
        };

        Ok(Self {
            index,
            len,
            range_start: range.0,
            range_end: range.1,
            padding,
            bandwidth,
        })
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn inner_padding(&self) -> f64 {
        self.bandwidth * self.padding
    }

    #[must_use]
    pub fn outer_padding(&self) -> f64 {
        self.inner_padding() / 2.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Left edge of the band at `index`.
    #[must_use]
    pub fn scale_index(&self, index: usize) -> f64 {
        self.range_start + self.outer_padding() + index as f64 * (self.bandwidth + self.inner_padding())
    }

    /// Left edge of the band for `category`; unknown names fall back to the first band.
    #[must_use]
    pub fn scale(&self, category: &str) -> f64 {
        let index = self.index.get(category).copied().unwrap_or(0);
        self.scale_index(index)
    }
}
