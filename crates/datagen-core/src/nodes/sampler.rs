//! Stateful sampling nodes: discrete, weighted, exact-weighted, circular,
//! ranges and dates. All validation happens in the constructors.

use crate::distribution::Distribution;
use crate::error::ValueError;
use crate::value::Value;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Uniform pick among candidate values.
#[derive(Debug, Clone)]
pub struct DiscreteSampler {
    values: Vec<Value>,
}

impl DiscreteSampler {
    pub fn new(values: Vec<Value>) -> Result<Self, ValueError> {
        if values.is_empty() {
            return Err(ValueError::EmptyCandidates);
        }
        Ok(Self { values })
    }

    pub fn next<R: Rng>(&self, rng: &mut R) -> Value {
        self.values[rng.gen_range(0..self.values.len())].clone()
    }
}

/// Pick proportional to supplied weights.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    values: Vec<Value>,
    cumulative: Vec<f64>,
    total: f64,
}

impl WeightedSampler {
    /// Requires at least one positive-weight candidate; negative or
    /// non-finite weights are rejected outright.
    pub fn new(items: Vec<(Value, f64)>) -> Result<Self, ValueError> {
        if items.is_empty() {
            return Err(ValueError::EmptyCandidates);
        }
        let mut values = Vec::with_capacity(items.len());
        let mut cumulative = Vec::with_capacity(items.len());
        let mut total = 0.0;
        for (value, weight) in items {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValueError::InvalidWeight {
                    value: value.render(),
                    weight,
                });
            }
            total += weight;
            values.push(value);
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(ValueError::NoPositiveWeight);
        }
        Ok(Self {
            values,
            cumulative,
            total,
        })
    }

    pub fn next<R: Rng>(&self, rng: &mut R) -> Value {
        let draw = rng.gen_range(0.0..self.total);
        let index = self.cumulative.partition_point(|&sum| sum <= draw);
        self.values[index.min(self.values.len() - 1)].clone()
    }
}

/// Output counts match requested proportions exactly over the declared
/// total, via a precomputed allocation schedule; cycles once the total is
/// reached. Stronger than probabilistic weighting: no resampling involved.
#[derive(Debug, Clone)]
pub struct ExactWeightedSampler {
    values: Vec<Value>,
    /// Indices into `values`, one entry per pull in the cycle.
    schedule: Vec<usize>,
    cursor: usize,
}

impl ExactWeightedSampler {
    pub fn new(items: Vec<(Value, u64)>) -> Result<Self, ValueError> {
        if items.is_empty() {
            return Err(ValueError::EmptyCandidates);
        }
        for (value, count) in &items {
            if *count == 0 {
                return Err(ValueError::InvalidWeight {
                    value: value.render(),
                    weight: 0.0,
                });
            }
        }
        let total: u64 = items.iter().map(|(_, c)| c).sum();

        // Weighted round-robin: each step grants every candidate its count
        // as credit and emits the highest-credit candidate (lowest index on
        // ties), keeping the interleave deterministic and proportional.
        let counts: Vec<i64> = items.iter().map(|(_, c)| *c as i64).collect();
        let values: Vec<Value> = items.into_iter().map(|(v, _)| v).collect();
        let mut credit = vec![0i64; counts.len()];
        let mut schedule = Vec::with_capacity(total as usize);
        for _ in 0..total {
            for (c, n) in credit.iter_mut().zip(&counts) {
                *c += *n;
            }
            let mut best = 0;
            for i in 1..credit.len() {
                if credit[i] > credit[best] {
                    best = i;
                }
            }
            schedule.push(best);
            credit[best] -= total as i64;
        }

        Ok(Self {
            values,
            schedule,
            cursor: 0,
        })
    }

    pub fn next(&mut self) -> Value {
        let value = self.values[self.schedule[self.cursor]].clone();
        self.cursor = (self.cursor + 1) % self.schedule.len();
        value
    }
}

/// Deterministic cycle through a fixed sequence.
#[derive(Debug, Clone)]
pub struct CircularSampler {
    values: Vec<Value>,
    cursor: usize,
}

impl CircularSampler {
    pub fn new(values: Vec<Value>) -> Result<Self, ValueError> {
        if values.is_empty() {
            return Err(ValueError::EmptyCandidates);
        }
        Ok(Self { values, cursor: 0 })
    }

    pub fn next(&mut self) -> Value {
        let value = self.values[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}

/// Deterministic cycle through an integer range with a declared step,
/// wrapping back to the start once the end is passed.
#[derive(Debug, Clone)]
pub struct CircularRangeSampler {
    start: i64,
    end: i64,
    step: i64,
    current: i64,
}

impl CircularRangeSampler {
    pub fn new(start: i64, end: i64, step: i64) -> Result<Self, ValueError> {
        let reachable = match step {
            0 => false,
            s if s > 0 => start <= end,
            _ => start >= end,
        };
        if !reachable {
            return Err(ValueError::UnreachableRange { start, end, step });
        }
        Ok(Self {
            start,
            end,
            step,
            current: start,
        })
    }

    pub fn next(&mut self) -> Value {
        let value = self.current;
        self.current += self.step;
        let past_end = if self.step > 0 {
            self.current > self.end
        } else {
            self.current < self.end
        };
        if past_end {
            self.current = self.start;
        }
        Value::Int64(value)
    }
}

/// Numeric result kind for range and arithmetic nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    Integer,
    Long,
    Double,
}

impl Default for NumberKind {
    fn default() -> Self {
        Self::Double
    }
}

impl NumberKind {
    /// Cast a computed double to this kind; integer kinds truncate toward
    /// zero.
    pub fn cast(self, value: f64) -> Value {
        match self {
            Self::Integer => Value::Int32(value as i32),
            Self::Long => Value::Int64(value as i64),
            Self::Double => Value::Float64(value),
        }
    }
}

/// Sample within `[lower, upper)` via a configured distribution.
#[derive(Debug, Clone)]
pub struct RangeSampler {
    lower: f64,
    upper: f64,
    kind: NumberKind,
    distribution: Distribution,
}

impl RangeSampler {
    pub fn new(
        lower: f64,
        upper: f64,
        kind: NumberKind,
        distribution: Distribution,
    ) -> Result<Self, ValueError> {
        if !(lower < upper) {
            return Err(ValueError::InvalidBounds { lower, upper });
        }
        Ok(Self {
            lower,
            upper,
            kind,
            distribution,
        })
    }

    pub fn next<R: Rng>(&self, rng: &mut R) -> Value {
        match self.kind {
            NumberKind::Integer => Value::Int32(self.distribution.next_i32(
                rng,
                self.lower as i32,
                self.upper as i32,
            )),
            NumberKind::Long => {
                Value::Int64(
                    self.distribution
                        .next_i64(rng, self.lower as i64, self.upper as i64),
                )
            }
            NumberKind::Double => {
                Value::Float64(self.distribution.next_f64(rng, self.lower, self.upper))
            }
        }
    }
}

/// Uniform instant between two timestamps, inclusive.
#[derive(Debug, Clone)]
pub struct DateSampler {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateSampler {
    pub fn new(start: &str, end: &str) -> Result<Self, ValueError> {
        let start_dt =
            parse_timestamp(start).ok_or_else(|| ValueError::InvalidTimestamp(start.to_string()))?;
        let end_dt =
            parse_timestamp(end).ok_or_else(|| ValueError::InvalidTimestamp(end.to_string()))?;
        if start_dt > end_dt {
            return Err(ValueError::InvalidBounds {
                lower: start_dt.timestamp() as f64,
                upper: end_dt.timestamp() as f64,
            });
        }
        Ok(Self {
            start: start_dt,
            end: end_dt,
        })
    }

    pub fn next<R: Rng>(&self, rng: &mut R) -> Value {
        let start = self.start.timestamp();
        let end = self.end.timestamp();
        let dt = if start >= end {
            self.start
        } else {
            let ts = rng.gen_range(start..=end);
            DateTime::from_timestamp(ts, 0).unwrap_or(self.start)
        };
        Value::DateTime(dt)
    }
}

/// Parse RFC 3339 or bare `%Y-%m-%d` timestamps.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
