//! Random-number sources backing numeric nodes.
//!
//! Every sampling operation derives from one continuous draw in `[0, 1)`
//! and maps it into the caller's half-open output range, so int, long,
//! double and bool requests against the same distribution stay consistent.

use crate::error::ValueError;
use rand::Rng;
use rand_distr::{Distribution as _, Normal};

/// A stateless random-number source producing values within caller-supplied
/// bounds. The RNG itself lives with the caller (the graph), so a cloned
/// distribution is parameter-identical and statistically independent.
#[derive(Debug, Clone)]
pub enum Distribution {
    /// Direct uniform draw.
    Uniform,

    /// Normal draw rejected outside configured bounds, then rescaled.
    Normal(BoundedNormal),
}

/// Normal distribution truncated to `[lower, upper]` by rejection
/// resampling; accepted draws are rescaled linearly into the requested
/// output range.
#[derive(Debug, Clone)]
pub struct BoundedNormal {
    lower: f64,
    upper: f64,
    normal: Normal<f64>,
}

impl BoundedNormal {
    /// Construction fails when `std_dev` is not positive, the bounds are
    /// inverted, or `mean` falls outside `[lower, upper]`.
    pub fn new(mean: f64, std_dev: f64, lower: f64, upper: f64) -> Result<Self, ValueError> {
        if lower >= upper {
            return Err(ValueError::InvalidBounds { lower, upper });
        }
        if !(lower..=upper).contains(&mean) {
            return Err(ValueError::MeanOutOfBounds { mean, lower, upper });
        }
        // Normal::new accepts 0.0, which would degenerate to a constant draw
        if !(std_dev > 0.0) {
            return Err(ValueError::InvalidStdDev(std_dev));
        }
        let normal =
            Normal::new(mean, std_dev).map_err(|_| ValueError::InvalidStdDev(std_dev))?;
        Ok(Self {
            lower,
            upper,
            normal,
        })
    }

    /// One accepted draw, normalized into `[0, 1)`.
    fn unit_sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let draw = loop {
            let x = self.normal.sample(rng);
            if (self.lower..=self.upper).contains(&x) {
                break x;
            }
        };
        let unit = (draw - self.lower) / (self.upper - self.lower);
        // Keep the output range half-open even when the draw hits `upper`
        unit.min(1.0 - f64::EPSILON)
    }
}

impl Distribution {
    pub fn uniform() -> Self {
        Self::Uniform
    }

    pub fn normal(mean: f64, std_dev: f64, lower: f64, upper: f64) -> Result<Self, ValueError> {
        Ok(Self::Normal(BoundedNormal::new(mean, std_dev, lower, upper)?))
    }

    fn unit_sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Uniform => rng.gen::<f64>(),
            Self::Normal(normal) => normal.unit_sample(rng),
        }
    }

    /// A double in `[lower, upper)`.
    pub fn next_f64<R: Rng>(&self, rng: &mut R, lower: f64, upper: f64) -> f64 {
        if lower >= upper {
            return lower;
        }
        lower + self.unit_sample(rng) * (upper - lower)
    }

    /// A long in `[lower, upper)`.
    pub fn next_i64<R: Rng>(&self, rng: &mut R, lower: i64, upper: i64) -> i64 {
        if lower >= upper {
            return lower;
        }
        let span = (upper - lower) as f64;
        lower + (self.unit_sample(rng) * span).floor() as i64
    }

    /// An int in `[lower, upper)`.
    pub fn next_i32<R: Rng>(&self, rng: &mut R, lower: i32, upper: i32) -> i32 {
        self.next_i64(rng, i64::from(lower), i64::from(upper)) as i32
    }

    /// A usize in `[lower, upper)`.
    pub fn next_usize<R: Rng>(&self, rng: &mut R, lower: usize, upper: usize) -> usize {
        self.next_i64(rng, lower as i64, upper as i64) as usize
    }

    /// Parity of the draw normalized into `[0, 100)`.
    pub fn next_bool<R: Rng>(&self, rng: &mut R) -> bool {
        (self.next_f64(rng, 0.0, 100.0) as i64) % 2 == 0
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self::Uniform
    }
}
