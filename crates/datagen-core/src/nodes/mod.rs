//! Value nodes: the polymorphic units of the generator graph.
//!
//! Every node yields one logical value per pull and may hold internal
//! cursor/sampling state. Composite variants reference their children by
//! [`NodeId`] handle into the owning graph's arena, which is what lets one
//! physical node back many logical references (and lets a whole-graph clone
//! preserve that sharing by plain arena copy).

pub mod arithmetic;
pub mod sampler;
pub mod strings;
pub mod transform;

use crate::distribution::Distribution;
use crate::graph::NodeId;
use crate::value::Value;
use crate::xeger::XegerPattern;
use arithmetic::ArithmeticOp;
use datagen_record_source::RecordReader;
use sampler::{
    CircularRangeSampler, CircularSampler, DateSampler, DiscreteSampler, ExactWeightedSampler,
    NumberKind, RangeSampler, WeightedSampler,
};
use transform::CaseMode;

/// One node of the generator graph. Pull dispatch lives in
/// [`crate::graph::Graph`]; this enum is the closed set of node kinds plus
/// their construction-time-validated state.
#[derive(Debug, Clone)]
pub enum Node {
    /// Fixed value.
    Constant(Value),

    /// Ordered named children assembled into a map.
    Object { fields: Vec<(String, NodeId)> },

    /// Fixed child list, each pulled once per record.
    List { elements: Vec<NodeId> },

    /// Random-length list: samples a length in `[min, max]`, then pulls the
    /// element node that many times, each pull an independent draw.
    RandomList {
        element: NodeId,
        min: usize,
        max: usize,
        distribution: Distribution,
    },

    /// Uniform pick among candidates.
    Discrete(DiscreteSampler),

    /// Probability proportional to weights.
    Weighted(WeightedSampler),

    /// Exact output counts over a declared total.
    ExactWeighted(ExactWeightedSampler),

    /// Deterministic cycle through a fixed sequence.
    Circular(CircularSampler),

    /// Deterministic cycle through an integer range.
    CircularRange(CircularRangeSampler),

    /// Sample within `[lower, upper)`.
    Range(RangeSampler),

    /// Uniform instant between two timestamps.
    RandomDate(DateSampler),

    /// Fold an operator across numeric operands.
    Arithmetic {
        op: ArithmeticOp,
        kind: NumberKind,
        operands: Vec<NodeId>,
    },

    /// Upper/lower-case the rendered source value.
    Case { source: NodeId, mode: CaseMode },

    /// Locale-aware accent folding to 7-bit ASCII.
    AsciiFold { source: NodeId },

    /// Positional `{}` template over pulled arguments.
    StringFormat { template: String, args: Vec<NodeId> },

    /// chrono format string over a pulled timestamp.
    TimeFormat { source: NodeId, format: String },

    /// Extract one key from a pulled object (e.g. a CSV row).
    Getter { source: NodeId, key: String },

    /// JSON-encode the pulled value.
    JsonEncode { source: NodeId },

    /// Route on the rendered source value to a case branch.
    Switch {
        source: NodeId,
        cases: Vec<(String, NodeId)>,
        default: Option<NodeId>,
    },

    /// Replace the rendered source value via a lookup table.
    Mapper {
        source: NodeId,
        mapping: Vec<(String, Value)>,
        default: Option<Value>,
    },

    /// Regex-driven string synthesis.
    Xeger(XegerPattern),

    /// String of sampled characters; length comes from a child node.
    RandomString { length: NodeId, charset: Vec<char> },

    /// One row from a CSV-backed record source, as an object.
    CsvRecord(RecordReader),
}

impl Node {
    /// Child handles of this node, in pull order. Leaf nodes yield none.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Object { fields } => fields.iter().map(|(_, id)| *id).collect(),
            Node::List { elements } => elements.clone(),
            Node::RandomList { element, .. } => vec![*element],
            Node::Arithmetic { operands, .. } => operands.clone(),
            Node::StringFormat { args, .. } => args.clone(),
            Node::Case { source, .. }
            | Node::AsciiFold { source }
            | Node::TimeFormat { source, .. }
            | Node::Getter { source, .. }
            | Node::JsonEncode { source }
            | Node::Mapper { source, .. } => vec![*source],
            Node::Switch {
                source,
                cases,
                default,
            } => {
                let mut ids = vec![*source];
                ids.extend(cases.iter().map(|(_, id)| *id));
                ids.extend(default.iter().copied());
                ids
            }
            Node::RandomString { length, .. } => vec![*length],
            Node::Constant(_)
            | Node::Discrete(_)
            | Node::Weighted(_)
            | Node::ExactWeighted(_)
            | Node::Circular(_)
            | Node::CircularRange(_)
            | Node::Range(_)
            | Node::RandomDate(_)
            | Node::Xeger(_)
            | Node::CsvRecord(_) => Vec::new(),
        }
    }
}
