//! Parallel generation over cloned generator graphs.
//!
//! Parallelism partitions the requested record count across a fixed pool
//! of workers. Each worker owns a full clone of the generator graph and a
//! distinct RNG seed, so workers share no mutable state and need no locks.
//! Record order across workers is unspecified by contract; this runner
//! happens to concatenate results in worker order.

use crate::error::GenerateError;
use crate::generator::ObjectGenerator;
use crate::value::Value;
use std::thread;
use tracing::{debug, info};

/// Split `total` records across `workers`, remainder assigned to the last
/// worker. At least one worker is always used.
pub fn partition_counts(total: usize, workers: usize) -> Vec<usize> {
    let workers = workers.max(1);
    let base = total / workers;
    let remainder = total % workers;

    let mut counts = vec![base; workers];
    if let Some(last) = counts.last_mut() {
        *last += remainder;
    }
    counts
}

/// Generate `total` records using `workers` parallel workers, each driving
/// its own cloned generator reseeded with `base_seed + worker index`.
///
/// A single worker degenerates to plain sequential generation.
pub fn generate_parallel(
    generator: &ObjectGenerator,
    total: usize,
    workers: usize,
    base_seed: u64,
) -> Result<Vec<Value>, GenerateError> {
    let counts = partition_counts(total, workers);
    info!(total, workers = counts.len(), "starting parallel generation");

    thread::scope(|scope| {
        let handles: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(index, &count)| {
                let mut worker = generator.clone();
                worker.reseed(base_seed.wrapping_add(index as u64));
                debug!(worker = index, count, "spawning generation worker");
                scope.spawn(move || worker.generate(count))
            })
            .collect();

        let mut records = Vec::with_capacity(total);
        for handle in handles {
            match handle.join() {
                Ok(result) => records.extend(result?),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        Ok(records)
    })
}
