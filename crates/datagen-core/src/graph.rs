//! The generator graph: an arena of value nodes addressed by stable
//! handles.
//!
//! References resolve to [`NodeId`] handles rather than copies, so multiple
//! logical references observe one evolving node. A per-record memo realizes
//! the pull contract: however many fields reference a node within one
//! record, it advances exactly once; clearing the memo between records
//! advances the whole graph. Cloning the arena copies node state and the
//! seeded RNG wholesale, preserving the sharing topology exactly because
//! handles stay valid across the copy.

use crate::error::GenerateError;
use crate::nodes::{arithmetic, strings, transform, Node};
use crate::value::Value;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::HashMap;

/// Stable handle of a node in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Arena of value nodes plus the seeded RNG driving every sampler.
///
/// Nodes sit in per-slot `RefCell`s: a pull mutates only the slots it
/// visits, and the builder-guaranteed acyclic reference structure means no
/// slot is ever borrowed twice in one pull.
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<RefCell<Node>>,
    rng: RefCell<StdRng>,
    memo: RefCell<HashMap<NodeId, Value>>,
}

impl Graph {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(RefCell::new(node));
        id
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-seed the RNG; used to give cloned worker graphs independent
    /// random streams.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.rng = RefCell::new(StdRng::seed_from_u64(seed));
    }

    /// Pull one value from `id`, memoized per record: repeated pulls of the
    /// same node within one record observe one advance.
    pub(crate) fn pull(&self, id: NodeId) -> Result<Value, GenerateError> {
        if let Some(value) = self.memo.borrow().get(&id) {
            return Ok(value.clone());
        }
        let value = self.fetch(id)?;
        self.memo.borrow_mut().insert(id, value.clone());
        Ok(value)
    }

    /// Clear per-record transient state; called between records.
    pub(crate) fn reset(&self) {
        self.memo.borrow_mut().clear();
    }

    /// Drop memo entries for `id` and everything below it, forcing fresh
    /// draws on the next pull. Used by random-length lists between element
    /// pulls.
    fn invalidate(&self, id: NodeId) {
        self.memo.borrow_mut().remove(&id);
        let children = self.nodes[id.0].borrow().children();
        for child in children {
            self.invalidate(child);
        }
    }

    /// Advance the node and produce its next value.
    fn fetch(&self, id: NodeId) -> Result<Value, GenerateError> {
        let mut node = self.nodes[id.0].borrow_mut();
        match &mut *node {
            Node::Constant(value) => Ok(value.clone()),

            Node::Object { fields } => {
                let mut map = IndexMap::with_capacity(fields.len());
                for (name, child) in fields.iter() {
                    map.insert(name.clone(), self.pull(*child)?);
                }
                Ok(Value::Object(map))
            }

            Node::List { elements } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    items.push(self.pull(*element)?);
                }
                Ok(Value::Array(items))
            }

            Node::RandomList {
                element,
                min,
                max,
                distribution,
            } => {
                let length = {
                    let mut rng = self.rng.borrow_mut();
                    distribution.next_usize(&mut *rng, *min, *max + 1)
                };
                let element = *element;
                let mut items = Vec::with_capacity(length);
                for _ in 0..length {
                    self.invalidate(element);
                    items.push(self.pull(element)?);
                }
                Ok(Value::Array(items))
            }

            Node::Discrete(sampler) => {
                let mut rng = self.rng.borrow_mut();
                Ok(sampler.next(&mut *rng))
            }

            Node::Weighted(sampler) => {
                let mut rng = self.rng.borrow_mut();
                Ok(sampler.next(&mut *rng))
            }

            Node::ExactWeighted(sampler) => Ok(sampler.next()),

            Node::Circular(sampler) => Ok(sampler.next()),

            Node::CircularRange(sampler) => Ok(sampler.next()),

            Node::Range(sampler) => {
                let mut rng = self.rng.borrow_mut();
                Ok(sampler.next(&mut *rng))
            }

            Node::RandomDate(sampler) => {
                let mut rng = self.rng.borrow_mut();
                Ok(sampler.next(&mut *rng))
            }

            Node::Arithmetic { op, kind, operands } => {
                let (op, kind, operands) = (*op, *kind, operands.clone());
                let mut coerced = Vec::with_capacity(operands.len());
                for operand in operands {
                    let value = self.pull(operand)?;
                    let number = value
                        .as_f64()
                        .ok_or(GenerateError::NonNumericOperand(value.kind()))?;
                    coerced.push(number);
                }
                arithmetic::apply(op, kind, &coerced)
            }

            Node::Case { source, mode } => {
                let (source, mode) = (*source, *mode);
                let value = self.pull(source)?;
                Ok(Value::String(transform::apply_case(&value.render(), mode)))
            }

            Node::AsciiFold { source } => {
                let source = *source;
                let value = self.pull(source)?;
                Ok(Value::String(transform::fold_ascii(&value.render())))
            }

            Node::StringFormat { template, args } => {
                let (template, args) = (template.clone(), args.clone());
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.pull(arg)?.render());
                }
                Ok(Value::String(transform::format_positional(
                    &template, &rendered,
                )))
            }

            Node::TimeFormat { source, format } => {
                let (source, format) = (*source, format.clone());
                let value = self.pull(source)?;
                Ok(Value::String(transform::format_time(&value, &format)?))
            }

            Node::Getter { source, key } => {
                let (source, key) = (*source, key.clone());
                let value = self.pull(source)?;
                match &value {
                    Value::Object(fields) => {
                        fields
                            .get(&key)
                            .cloned()
                            .ok_or_else(|| GenerateError::MissingKey {
                                key,
                                kind: "object",
                            })
                    }
                    other => Err(GenerateError::MissingKey {
                        key,
                        kind: other.kind(),
                    }),
                }
            }

            Node::JsonEncode { source } => {
                let source = *source;
                let value = self.pull(source)?;
                Ok(Value::String(serde_json::to_string(&value)?))
            }

            Node::Switch {
                source,
                cases,
                default,
            } => {
                let (source, cases, default) = (*source, cases.clone(), *default);
                let key = self.pull(source)?.render();
                let branch = cases
                    .iter()
                    .find(|(case, _)| *case == key)
                    .map(|(_, id)| *id)
                    .or(default);
                match branch {
                    Some(id) => self.pull(id),
                    None => Err(GenerateError::NoMatchingCase(key)),
                }
            }

            Node::Mapper {
                source,
                mapping,
                default,
            } => {
                let (source, mapping, default) = (*source, mapping.clone(), default.clone());
                let key = self.pull(source)?.render();
                mapping
                    .iter()
                    .find(|(from, _)| *from == key)
                    .map(|(_, to)| to.clone())
                    .or(default)
                    .ok_or(GenerateError::NoMatchingCase(key))
            }

            Node::Xeger(pattern) => {
                let mut rng = self.rng.borrow_mut();
                Ok(Value::String(pattern.sample(&mut *rng)))
            }

            Node::RandomString { length, charset } => {
                let (length, charset) = (*length, charset.clone());
                let value = self.pull(length)?;
                let n = value
                    .as_i64()
                    .filter(|n| *n >= 0)
                    .ok_or(GenerateError::NonIntegerLength(value.kind()))?;
                let mut rng = self.rng.borrow_mut();
                Ok(Value::String(strings::random_string(
                    &mut *rng,
                    &charset,
                    n as usize,
                )))
            }

            Node::CsvRecord(reader) => {
                let index = {
                    let mut rng = self.rng.borrow_mut();
                    reader.next_index(&mut *rng)?
                };
                let table = reader.table();
                let fields = table
                    .record(index)
                    .map(|(column, field)| (column.to_string(), Value::String(field.to_string())))
                    .collect();
                Ok(Value::Object(fields))
            }
        }
    }
}

impl Clone for Graph {
    /// Arena-wide deep copy. Handles are indices, so shared nodes remain
    /// shared (and only with their counterparts); node state and the RNG
    /// carry the original's state at clone time and diverge afterward.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            rng: RefCell::new(self.rng.borrow().clone()),
            memo: RefCell::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::sampler::CircularSampler;

    fn circular_graph() -> (Graph, NodeId) {
        let mut graph = Graph::new(42);
        let seq = graph.insert(Node::Circular(
            CircularSampler::new(vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]).unwrap(),
        ));
        (graph, seq)
    }

    #[test]
    fn test_memo_holds_within_record() {
        let (graph, seq) = circular_graph();

        assert_eq!(graph.pull(seq).unwrap(), Value::Int64(1));
        // Second pull in the same record: same value, no advance
        assert_eq!(graph.pull(seq).unwrap(), Value::Int64(1));

        graph.reset();
        assert_eq!(graph.pull(seq).unwrap(), Value::Int64(2));
    }

    #[test]
    fn test_shared_child_pulled_once_per_record() {
        let (mut graph, seq) = circular_graph();
        let root = graph.insert(Node::Object {
            fields: vec![("a".to_string(), seq), ("b".to_string(), seq)],
        });

        let record = graph.pull(root).unwrap();
        let Value::Object(fields) = record else {
            panic!("expected object");
        };
        assert_eq!(fields["a"], Value::Int64(1));
        assert_eq!(fields["b"], Value::Int64(1));

        graph.reset();
        let Value::Object(fields) = graph.pull(root).unwrap() else {
            panic!("expected object");
        };
        assert_eq!(fields["a"], Value::Int64(2));
        assert_eq!(fields["b"], Value::Int64(2));
    }

    #[test]
    fn test_clone_copies_state_and_diverges() {
        let (graph, seq) = circular_graph();

        graph.pull(seq).unwrap();
        graph.reset();

        let cloned = graph.clone();

        // Clone resumes from the original's state at clone time
        assert_eq!(cloned.pull(seq).unwrap(), Value::Int64(2));
        cloned.reset();
        assert_eq!(cloned.pull(seq).unwrap(), Value::Int64(3));

        // The original is unaffected by the clone's pulls
        assert_eq!(graph.pull(seq).unwrap(), Value::Int64(2));
    }

    #[test]
    fn test_random_list_elements_draw_independently() {
        let mut graph = Graph::new(42);
        let seq = graph.insert(Node::Circular(
            CircularSampler::new(vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]).unwrap(),
        ));
        let list = graph.insert(Node::RandomList {
            element: seq,
            min: 3,
            max: 3,
            distribution: crate::distribution::Distribution::uniform(),
        });

        let Value::Array(items) = graph.pull(list).unwrap() else {
            panic!("expected array");
        };
        assert_eq!(
            items,
            vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]
        );
    }
}
