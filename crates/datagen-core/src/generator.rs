//! The object generator: the façade every consumer pulls records through.

use crate::error::GenerateError;
use crate::graph::{Graph, NodeId};
use crate::value::Value;

/// Wraps a resolved generator graph and its designated root, yielding one
/// structured record per [`next`](Self::next) call.
///
/// Cloning produces a structurally independent generator: the sharing
/// topology of the graph is preserved, all node and RNG state equals the
/// original's at clone time, and the two diverge from there. Clones back
/// parallel generation workers.
#[derive(Debug, Clone)]
pub struct ObjectGenerator {
    graph: Graph,
    root: NodeId,
}

impl ObjectGenerator {
    pub(crate) fn new(graph: Graph, root: NodeId) -> Self {
        Self { graph, root }
    }

    /// Pull the next record, advancing every node the root reaches exactly
    /// once.
    pub fn next(&mut self) -> Result<Value, GenerateError> {
        let record = self.graph.pull(self.root)?;
        self.graph.reset();
        Ok(record)
    }

    /// Produce `count` records by sequential [`next`](Self::next) calls.
    pub fn generate(&mut self, count: usize) -> Result<Vec<Value>, GenerateError> {
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.next()?);
        }
        Ok(records)
    }

    /// Lazily yield up to `count` records.
    pub fn records(&mut self, count: usize) -> Records<'_> {
        Records {
            generator: self,
            remaining: count,
        }
    }

    /// Replace the RNG stream; cursors and other node state are untouched.
    /// Used to give cloned worker generators independent randomness.
    pub fn reseed(&mut self, seed: u64) {
        self.graph.reseed(seed);
    }

    /// Number of nodes in the underlying graph.
    pub fn node_count(&self) -> usize {
        self.graph.len()
    }
}

/// Iterator over generated records.
pub struct Records<'a> {
    generator: &'a mut ObjectGenerator,
    remaining: usize,
}

impl Iterator for Records<'_> {
    type Item = Result<Value, GenerateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::descriptor::DefinitionTable;

    fn counter_generator() -> ObjectGenerator {
        let table = DefinitionTable::from_yaml(
            "n:\n  kind: circular_range\n  start: 1\n  end: 3\n",
        )
        .unwrap();
        build(&table, &["$n"], 42).unwrap()
    }

    #[test]
    fn test_generate_matches_repeated_next() {
        let mut by_generate = counter_generator();
        let mut by_next = counter_generator();

        let batch = by_generate.generate(7).unwrap();
        let singles: Vec<_> = (0..7).map(|_| by_next.next().unwrap()).collect();
        assert_eq!(batch, singles);
    }

    #[test]
    fn test_generate_zero_is_empty() {
        let mut generator = counter_generator();
        assert_eq!(generator.generate(0).unwrap(), vec![]);
    }

    #[test]
    fn test_records_iterator() {
        let mut generator = counter_generator();
        let iter = generator.records(4);
        assert_eq!(iter.len(), 4);

        let records: Result<Vec<_>, _> = iter.collect();
        let expected: Vec<_> = [1, 2, 3, 1].iter().map(|&v| Value::Int64(v)).collect();
        assert_eq!(records.unwrap(), expected);
    }

    #[test]
    fn test_clone_preserves_state_then_diverges() {
        let mut original = counter_generator();
        original.generate(2).unwrap();

        let mut cloned = original.clone();
        assert_eq!(cloned.next().unwrap(), Value::Int64(3));
        assert_eq!(cloned.next().unwrap(), Value::Int64(1));

        // The original continues from its own state, unaffected
        assert_eq!(original.next().unwrap(), Value::Int64(3));
    }
}
