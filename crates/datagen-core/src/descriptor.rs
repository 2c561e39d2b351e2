//! The named definition table: the engine's consumed boundary.
//!
//! A table maps definition names to node descriptors. Descriptors carry a
//! `kind` discriminant plus kind-specific parameters; child positions take
//! an [`Operand`], which is either a `$name` reference to another table
//! entry, an inline literal value, or a nested anonymous descriptor. The
//! table is order-independent: forward references resolve by name.

use crate::error::ConfigError;
use crate::nodes::arithmetic::ArithmeticOp;
use crate::nodes::sampler::NumberKind;
use crate::nodes::transform::CaseMode;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of definition name to node descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionTable {
    definitions: IndexMap<String, NodeDescriptor>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a definition table from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: NodeDescriptor) {
        self.definitions.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&NodeDescriptor> {
        self.definitions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// A child position in a descriptor: a `$name` reference, an inline
/// anonymous descriptor, or a literal value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// A nested anonymous node (tried first: maps carrying `kind`)
    Node(Box<NodeDescriptor>),

    /// A literal value; strings starting with `$` are references
    Value(Value),
}

impl Operand {
    /// The referenced definition name, when this operand is a `$name`.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Operand::Value(Value::String(s)) => s.strip_prefix('$'),
            _ => None,
        }
    }
}

/// A weighted candidate for the probabilistic weighted node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedCandidate {
    pub value: Value,
    pub weight: f64,
}

/// A counted candidate for the exact-weighted node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountedCandidate {
    pub value: Value,
    pub count: u64,
}

/// Distribution configuration for numeric nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionConfig {
    /// Direct uniform draw
    Uniform,

    /// Bounded normal: rejection-resampled outside `[lower, upper]`
    Normal {
        mean: f64,
        std_dev: f64,
        lower: f64,
        upper: f64,
    },
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self::Uniform
    }
}

/// Row-selection policy for CSV record sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// File order, hard failure once exhausted
    Sequential,
    /// File order, wrapping back to row 0
    Circular,
    /// Uniformly random row each pull
    Random,
    /// Probability proportional to a numeric column
    Weighted,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self::Sequential
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

fn default_has_headers() -> bool {
    true
}

fn default_step() -> i64 {
    1
}

fn default_charset() -> String {
    "a-zA-Z0-9".to_string()
}

/// Abstract description of one value node: kind, parameters, and child
/// references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDescriptor {
    /// Fixed value
    Constant { value: Value },

    /// Ordered named fields assembled into a map
    Object { fields: IndexMap<String, Operand> },

    /// Fixed element list
    List { elements: Vec<Operand> },

    /// Random-length list over one element node
    RandomList {
        element: Operand,
        min: usize,
        max: usize,
        #[serde(default)]
        distribution: DistributionConfig,
    },

    /// Uniform pick among candidate values
    Discrete { values: Vec<Value> },

    /// Pick proportional to weights
    Weighted { values: Vec<WeightedCandidate> },

    /// Output counts match declared proportions exactly
    ExactWeighted { values: Vec<CountedCandidate> },

    /// Deterministic cycle through a fixed sequence
    Circular { values: Vec<Value> },

    /// Deterministic cycle through an integer range
    CircularRange {
        start: i64,
        end: i64,
        #[serde(default = "default_step")]
        step: i64,
    },

    /// Sample within `[lower, upper)`
    Range {
        lower: f64,
        upper: f64,
        /// Named `number_kind` on the wire; `kind` is taken by the tag.
        #[serde(default)]
        number_kind: NumberKind,
        #[serde(default)]
        distribution: DistributionConfig,
    },

    /// Uniform instant between two timestamps (RFC 3339 or `YYYY-MM-DD`)
    RandomDate { start: String, end: String },

    /// Sum of operands
    Add {
        #[serde(default)]
        number_kind: NumberKind,
        operands: Vec<Operand>,
    },

    /// Left-fold subtraction of operands
    Subtract {
        #[serde(default)]
        number_kind: NumberKind,
        operands: Vec<Operand>,
    },

    /// Product of operands
    Multiply {
        #[serde(default)]
        number_kind: NumberKind,
        operands: Vec<Operand>,
    },

    /// Left-fold division of operands
    Divide {
        #[serde(default)]
        number_kind: NumberKind,
        operands: Vec<Operand>,
    },

    /// Upper/lower-case the source value
    Case { source: Operand, mode: CaseMode },

    /// Locale-aware accent folding to 7-bit ASCII
    AsciiFold { source: Operand },

    /// Positional `{}` template over argument values
    StringFormat {
        format: String,
        #[serde(default)]
        args: Vec<Operand>,
    },

    /// chrono format string over a timestamp value
    TimeFormat { source: Operand, format: String },

    /// Extract one key from an object value
    Getter { source: Operand, key: String },

    /// JSON-encode the source value
    Json { source: Operand },

    /// Route on the rendered source value
    Switch {
        source: Operand,
        cases: IndexMap<String, Operand>,
        #[serde(default)]
        default: Option<Operand>,
    },

    /// Replace the rendered source value via a lookup table
    Mapper {
        source: Operand,
        mapping: IndexMap<String, Value>,
        #[serde(default)]
        default: Option<Value>,
    },

    /// Regex-driven string synthesis
    Xeger { pattern: String },

    /// Random-content string; length comes from a child node
    RandomString {
        length: Operand,
        #[serde(default = "default_charset")]
        charset: String,
    },

    /// One row per pull from a CSV file
    Csv {
        path: String,
        #[serde(default)]
        policy: ReadPolicy,
        /// Weight column, required when `policy` is `weighted`
        #[serde(default)]
        weight_column: Option<String>,
        #[serde(default = "default_delimiter")]
        delimiter: char,
        #[serde(default = "default_has_headers")]
        has_headers: bool,
        #[serde(default = "default_quote")]
        quote: char,
        #[serde(default)]
        comment: Option<char>,
        #[serde(default)]
        escape: Option<char>,
        #[serde(default)]
        column_names: Option<Vec<String>>,
    },
}

impl NodeDescriptor {
    /// Map arithmetic descriptor variants to their operator.
    pub fn arithmetic_op(&self) -> Option<ArithmeticOp> {
        match self {
            NodeDescriptor::Add { .. } => Some(ArithmeticOp::Add),
            NodeDescriptor::Subtract { .. } => Some(ArithmeticOp::Subtract),
            NodeDescriptor::Multiply { .. } => Some(ArithmeticOp::Multiply),
            NodeDescriptor::Divide { .. } => Some(ArithmeticOp::Divide),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_from_yaml() {
        let yaml = r#"
id:
  kind: circular_range
  start: 1
  end: 100
name:
  kind: discrete
  values: [alice, bob]
user:
  kind: object
  fields:
    id: $id
    name: $name
"#;
        let table = DefinitionTable::from_yaml(yaml).unwrap();

        assert_eq!(table.len(), 3);
        assert!(matches!(
            table.get("id"),
            Some(NodeDescriptor::CircularRange { start: 1, end: 100, step: 1 })
        ));
        let Some(NodeDescriptor::Object { fields }) = table.get("user") else {
            panic!("expected object descriptor");
        };
        assert_eq!(fields["id"].reference(), Some("id"));
    }

    #[test]
    fn test_operand_shapes() {
        let yaml = r#"
combo:
  kind: list
  elements:
    - $other
    - 42
    - kind: constant
      value: inline
"#;
        let table = DefinitionTable::from_yaml(yaml).unwrap();
        let Some(NodeDescriptor::List { elements }) = table.get("combo") else {
            panic!("expected list descriptor");
        };

        assert_eq!(elements[0].reference(), Some("other"));
        assert!(matches!(elements[1], Operand::Value(Value::Int64(42))));
        assert!(matches!(elements[2], Operand::Node(_)));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let yaml = "bad:\n  kind: telepathy\n";
        assert!(matches!(
            DefinitionTable::from_yaml(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_required_parameter_is_rejected() {
        let yaml = "r:\n  kind: range\n  lower: 1.0\n";
        assert!(matches!(
            DefinitionTable::from_yaml(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_number_kind_parses_next_to_the_tag() {
        let yaml = r#"
total:
  kind: add
  number_kind: long
  operands: [$a, $b]
score:
  kind: range
  lower: 0.0
  upper: 10.0
  number_kind: integer
"#;
        let table = DefinitionTable::from_yaml(yaml).unwrap();

        let Some(NodeDescriptor::Add { number_kind, .. }) = table.get("total") else {
            panic!("expected add descriptor");
        };
        assert_eq!(*number_kind, NumberKind::Long);

        let Some(NodeDescriptor::Range { number_kind, .. }) = table.get("score") else {
            panic!("expected range descriptor");
        };
        assert_eq!(*number_kind, NumberKind::Integer);

        // Unset falls back to double
        let table = DefinitionTable::from_yaml(
            "t:\n  kind: multiply\n  operands: [$a, $b]\n",
        )
        .unwrap();
        let Some(NodeDescriptor::Multiply { number_kind, .. }) = table.get("t") else {
            panic!("expected multiply descriptor");
        };
        assert_eq!(*number_kind, NumberKind::Double);
    }

    #[test]
    fn test_distribution_config() {
        let yaml = r#"
score:
  kind: range
  lower: 0.0
  upper: 10.0
  distribution:
    type: normal
    mean: 5.0
    std_dev: 2.0
    lower: 0.0
    upper: 10.0
"#;
        let table = DefinitionTable::from_yaml(yaml).unwrap();
        let Some(NodeDescriptor::Range { distribution, .. }) = table.get("score") else {
            panic!("expected range descriptor");
        };
        assert!(matches!(
            distribution,
            DistributionConfig::Normal { mean, .. } if *mean == 5.0
        ));
    }
}
