//! Resolving a definition table into a live generator graph.
//!
//! Resolution is depth-first by name with an explicit in-progress path for
//! cycle detection, and a resolved-name memo so every textual reference to
//! a name lands on the identical node handle (the sharing invariant).
//! Forward references are fine: the table is consulted by name, never by
//! position. All parameter validation happens here; generation never sees
//! a malformed node.

use crate::descriptor::{
    DefinitionTable, DistributionConfig, NodeDescriptor, Operand, ReadPolicy,
};
use crate::distribution::Distribution;
use crate::error::{ConfigError, ValueError};
use crate::generator::ObjectGenerator;
use crate::graph::{Graph, NodeId};
use crate::nodes::sampler::{
    CircularRangeSampler, CircularSampler, DateSampler, DiscreteSampler, ExactWeightedSampler,
    RangeSampler, WeightedSampler,
};
use crate::nodes::{strings, Node};
use crate::xeger::XegerPattern;
use datagen_record_source::{CsvSettings, RecordReader, RecordTable};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Build an [`ObjectGenerator`] from a definition table and its declared
/// output references, with a fixed RNG seed for reproducibility.
///
/// Each output reference is a `$name` (the `$` is optional) or a
/// `list([$a, $b, ...])` declaring several named output roots, which are
/// wrapped in a thin composite keyed by name.
pub fn build(
    table: &DefinitionTable,
    outputs: &[&str],
    seed: u64,
) -> Result<ObjectGenerator, ConfigError> {
    let root_names = parse_outputs(outputs)?;

    let mut builder = GraphBuilder {
        table,
        graph: Graph::new(seed),
        resolved: HashMap::new(),
        resolving: Vec::new(),
    };

    let mut roots = Vec::with_capacity(root_names.len());
    for name in &root_names {
        roots.push((name.clone(), builder.resolve_name(name)?));
    }

    let root = if roots.len() == 1 {
        roots[0].1
    } else {
        builder.graph.insert(Node::Object { fields: roots })
    };

    debug!(
        nodes = builder.graph.len(),
        outputs = root_names.len(),
        "resolved generator graph"
    );

    Ok(ObjectGenerator::new(builder.graph, root))
}

/// Expand output references into definition names.
fn parse_outputs(outputs: &[&str]) -> Result<Vec<String>, ConfigError> {
    let mut names = Vec::new();
    for output in outputs {
        let output = output.trim();
        if let Some(inner) = output
            .strip_prefix("list([")
            .and_then(|rest| rest.strip_suffix("])"))
        {
            for part in inner.split(',') {
                let part = part.trim();
                let name = part
                    .strip_prefix('$')
                    .ok_or_else(|| ConfigError::InvalidOutput(output.to_string()))?;
                if name.is_empty() {
                    return Err(ConfigError::InvalidOutput(output.to_string()));
                }
                names.push(name.to_string());
            }
        } else {
            let name = output.strip_prefix('$').unwrap_or(output);
            if name.is_empty() || name.contains(['(', ')', '[', ']']) {
                return Err(ConfigError::InvalidOutput(output.to_string()));
            }
            names.push(name.to_string());
        }
    }
    if names.is_empty() {
        return Err(ConfigError::NoOutputs);
    }
    Ok(names)
}

struct GraphBuilder<'a> {
    table: &'a DefinitionTable,
    graph: Graph,
    /// One name, one node handle - repeated references share the instance.
    resolved: HashMap<String, NodeId>,
    /// Names on the current resolution path, for cycle detection.
    resolving: Vec<String>,
}

impl GraphBuilder<'_> {
    fn resolve_name(&mut self, name: &str) -> Result<NodeId, ConfigError> {
        if let Some(id) = self.resolved.get(name) {
            return Ok(*id);
        }
        if self.resolving.iter().any(|n| n == name) {
            let mut path = self.resolving.join(" -> ");
            path.push_str(" -> ");
            path.push_str(name);
            return Err(ConfigError::CyclicReference { path });
        }
        let descriptor = self
            .table
            .get(name)
            .ok_or_else(|| ConfigError::UnknownReference {
                name: name.to_string(),
            })?;

        self.resolving.push(name.to_string());
        let id = self.build_node(name, descriptor)?;
        self.resolving.pop();

        self.resolved.insert(name.to_string(), id);
        debug!(name, id = ?id, "resolved definition");
        Ok(id)
    }

    fn resolve_operand(&mut self, owner: &str, operand: &Operand) -> Result<NodeId, ConfigError> {
        if let Some(reference) = operand.reference() {
            return self.resolve_name(reference);
        }
        match operand {
            Operand::Node(descriptor) => self.build_node(owner, descriptor),
            Operand::Value(value) => Ok(self.graph.insert(Node::Constant(value.clone()))),
        }
    }

    fn resolve_operands(
        &mut self,
        owner: &str,
        operands: &[Operand],
    ) -> Result<Vec<NodeId>, ConfigError> {
        operands
            .iter()
            .map(|operand| self.resolve_operand(owner, operand))
            .collect()
    }

    fn distribution(
        &self,
        owner: &str,
        config: &DistributionConfig,
    ) -> Result<Distribution, ConfigError> {
        let distribution = match config {
            DistributionConfig::Uniform => Distribution::uniform(),
            DistributionConfig::Normal {
                mean,
                std_dev,
                lower,
                upper,
            } => Distribution::normal(*mean, *std_dev, *lower, *upper)
                .map_err(|source| self.invalid(owner, source))?,
        };
        Ok(distribution)
    }

    fn invalid(&self, name: &str, source: ValueError) -> ConfigError {
        ConfigError::Node {
            name: name.to_string(),
            source,
        }
    }

    /// CSV control characters are single bytes; anything non-ASCII would
    /// silently truncate in the cast.
    fn csv_byte(&self, owner: &str, name: &'static str, value: char) -> Result<u8, ConfigError> {
        u8::try_from(value)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| self.invalid(owner, ValueError::NonAsciiCsvChar { name, value }))
    }

    /// Instantiate one node, resolving children first and validating all
    /// parameters eagerly.
    fn build_node(
        &mut self,
        name: &str,
        descriptor: &NodeDescriptor,
    ) -> Result<NodeId, ConfigError> {
        if let Some(op) = descriptor.arithmetic_op() {
            let (kind, operands) = match descriptor {
                NodeDescriptor::Add {
                    number_kind,
                    operands,
                }
                | NodeDescriptor::Subtract {
                    number_kind,
                    operands,
                }
                | NodeDescriptor::Multiply {
                    number_kind,
                    operands,
                }
                | NodeDescriptor::Divide {
                    number_kind,
                    operands,
                } => (*number_kind, operands),
                _ => unreachable!("arithmetic_op covers exactly these variants"),
            };
            if operands.len() < 2 {
                return Err(self.invalid(name, ValueError::NotEnoughOperands(operands.len())));
            }
            let operands = self.resolve_operands(name, operands)?;
            return Ok(self.graph.insert(Node::Arithmetic { op, kind, operands }));
        }

        let node = match descriptor {
            NodeDescriptor::Constant { value } => Node::Constant(value.clone()),

            NodeDescriptor::Object { fields } => {
                let mut resolved = Vec::with_capacity(fields.len());
                for (field, operand) in fields {
                    resolved.push((field.clone(), self.resolve_operand(name, operand)?));
                }
                Node::Object { fields: resolved }
            }

            NodeDescriptor::List { elements } => Node::List {
                elements: self.resolve_operands(name, elements)?,
            },

            NodeDescriptor::RandomList {
                element,
                min,
                max,
                distribution,
            } => {
                if min > max {
                    return Err(self.invalid(
                        name,
                        ValueError::InvalidLength {
                            min: *min,
                            max: *max,
                        },
                    ));
                }
                Node::RandomList {
                    element: self.resolve_operand(name, element)?,
                    min: *min,
                    max: *max,
                    distribution: self.distribution(name, distribution)?,
                }
            }

            NodeDescriptor::Discrete { values } => Node::Discrete(
                DiscreteSampler::new(values.clone()).map_err(|e| self.invalid(name, e))?,
            ),

            NodeDescriptor::Weighted { values } => {
                let items = values
                    .iter()
                    .map(|c| (c.value.clone(), c.weight))
                    .collect();
                Node::Weighted(WeightedSampler::new(items).map_err(|e| self.invalid(name, e))?)
            }

            NodeDescriptor::ExactWeighted { values } => {
                let items = values.iter().map(|c| (c.value.clone(), c.count)).collect();
                Node::ExactWeighted(
                    ExactWeightedSampler::new(items).map_err(|e| self.invalid(name, e))?,
                )
            }

            NodeDescriptor::Circular { values } => Node::Circular(
                CircularSampler::new(values.clone()).map_err(|e| self.invalid(name, e))?,
            ),

            NodeDescriptor::CircularRange { start, end, step } => Node::CircularRange(
                CircularRangeSampler::new(*start, *end, *step)
                    .map_err(|e| self.invalid(name, e))?,
            ),

            NodeDescriptor::Range {
                lower,
                upper,
                number_kind,
                distribution,
            } => {
                let distribution = self.distribution(name, distribution)?;
                Node::Range(
                    RangeSampler::new(*lower, *upper, *number_kind, distribution)
                        .map_err(|e| self.invalid(name, e))?,
                )
            }

            NodeDescriptor::RandomDate { start, end } => Node::RandomDate(
                DateSampler::new(start, end).map_err(|e| self.invalid(name, e))?,
            ),

            NodeDescriptor::Add { .. }
            | NodeDescriptor::Subtract { .. }
            | NodeDescriptor::Multiply { .. }
            | NodeDescriptor::Divide { .. } => {
                unreachable!("handled by arithmetic_op above")
            }

            NodeDescriptor::Case { source, mode } => Node::Case {
                source: self.resolve_operand(name, source)?,
                mode: *mode,
            },

            NodeDescriptor::AsciiFold { source } => Node::AsciiFold {
                source: self.resolve_operand(name, source)?,
            },

            NodeDescriptor::StringFormat { format, args } => Node::StringFormat {
                template: format.clone(),
                args: self.resolve_operands(name, args)?,
            },

            NodeDescriptor::TimeFormat { source, format } => Node::TimeFormat {
                source: self.resolve_operand(name, source)?,
                format: format.clone(),
            },

            NodeDescriptor::Getter { source, key } => Node::Getter {
                source: self.resolve_operand(name, source)?,
                key: key.clone(),
            },

            NodeDescriptor::Json { source } => Node::JsonEncode {
                source: self.resolve_operand(name, source)?,
            },

            NodeDescriptor::Switch {
                source,
                cases,
                default,
            } => {
                if cases.is_empty() {
                    return Err(self.invalid(name, ValueError::EmptyCases));
                }
                let source = self.resolve_operand(name, source)?;
                let mut resolved = Vec::with_capacity(cases.len());
                for (case, operand) in cases {
                    resolved.push((case.clone(), self.resolve_operand(name, operand)?));
                }
                let default = default
                    .as_ref()
                    .map(|operand| self.resolve_operand(name, operand))
                    .transpose()?;
                Node::Switch {
                    source,
                    cases: resolved,
                    default,
                }
            }

            NodeDescriptor::Mapper {
                source,
                mapping,
                default,
            } => Node::Mapper {
                source: self.resolve_operand(name, source)?,
                mapping: mapping
                    .iter()
                    .map(|(from, to)| (from.clone(), to.clone()))
                    .collect(),
                default: default.clone(),
            },

            NodeDescriptor::Xeger { pattern } => {
                Node::Xeger(XegerPattern::compile(pattern).map_err(|e| self.invalid(name, e))?)
            }

            NodeDescriptor::RandomString { length, charset } => Node::RandomString {
                length: self.resolve_operand(name, length)?,
                charset: strings::parse_charset(charset).map_err(|e| self.invalid(name, e))?,
            },

            NodeDescriptor::Csv {
                path,
                policy,
                weight_column,
                delimiter,
                has_headers,
                quote,
                comment,
                escape,
                column_names,
            } => {
                let settings = CsvSettings {
                    delimiter: self.csv_byte(name, "delimiter", *delimiter)?,
                    has_headers: *has_headers,
                    quote: self.csv_byte(name, "quote", *quote)?,
                    comment: comment
                        .map(|c| self.csv_byte(name, "comment", c))
                        .transpose()?,
                    escape: escape
                        .map(|c| self.csv_byte(name, "escape", c))
                        .transpose()?,
                    column_names: column_names.clone(),
                };
                let table = Arc::new(
                    RecordTable::from_path(path, &settings)
                        .map_err(|e| self.invalid(name, ValueError::Source(e)))?,
                );
                let reader = match policy {
                    ReadPolicy::Sequential => RecordReader::sequential(table),
                    ReadPolicy::Circular => RecordReader::circular(table)
                        .map_err(|e| self.invalid(name, ValueError::Source(e)))?,
                    ReadPolicy::Random => RecordReader::random(table)
                        .map_err(|e| self.invalid(name, ValueError::Source(e)))?,
                    ReadPolicy::Weighted => {
                        let column = weight_column.as_deref().ok_or_else(|| {
                            self.invalid(
                                name,
                                ValueError::Source(
                                    datagen_record_source::SourceError::MissingColumn(
                                        "<weight_column unset>".to_string(),
                                    ),
                                ),
                            )
                        })?;
                        RecordReader::weighted(table, column)
                            .map_err(|e| self.invalid(name, ValueError::Source(e)))?
                    }
                };
                Node::CsvRecord(reader)
            }
        };

        Ok(self.graph.insert(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn test_forward_references_resolve() {
        let table = DefinitionTable::from_yaml(
            r#"
user:
  kind: object
  fields:
    id: $id
id:
  kind: circular_range
  start: 1
  end: 5
"#,
        )
        .unwrap();

        let mut generator = build(&table, &["$user"], 42).unwrap();
        let record = generator.next().unwrap();
        let Value::Object(fields) = record else {
            panic!("expected object record");
        };
        assert_eq!(fields["id"], Value::Int64(1));
    }

    #[test]
    fn test_unknown_reference_fails() {
        let table = DefinitionTable::from_yaml(
            "user:\n  kind: object\n  fields:\n    id: $missing\n",
        )
        .unwrap();

        let result = build(&table, &["$user"], 42);
        assert!(matches!(
            result,
            Err(ConfigError::UnknownReference { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_cycle_fails_with_path() {
        let table = DefinitionTable::from_yaml(
            r#"
a:
  kind: object
  fields:
    b: $b
b:
  kind: object
  fields:
    a: $a
"#,
        )
        .unwrap();

        let result = build(&table, &["$a"], 42);
        let Err(ConfigError::CyclicReference { path }) = result else {
            panic!("expected cycle error, got {result:?}");
        };
        assert_eq!(path, "a -> b -> a");
    }

    #[test]
    fn test_self_reference_fails() {
        let table =
            DefinitionTable::from_yaml("a:\n  kind: object\n  fields:\n    me: $a\n").unwrap();

        assert!(matches!(
            build(&table, &["$a"], 42),
            Err(ConfigError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_invalid_parameter_fails_at_build() {
        let table = DefinitionTable::from_yaml(
            "w:\n  kind: weighted\n  values:\n    - value: a\n      weight: 0.0\n",
        )
        .unwrap();

        assert!(matches!(
            build(&table, &["$w"], 42),
            Err(ConfigError::Node { name, .. }) if name == "w"
        ));
    }

    #[test]
    fn test_non_ascii_csv_characters_fail_at_build() {
        // Characters that cannot survive the byte cast are rejected before
        // the file is even opened
        let table = DefinitionTable::from_yaml(
            "row:\n  kind: csv\n  path: rows.csv\n  delimiter: \"\u{00b7}\"\n",
        )
        .unwrap();
        assert!(matches!(
            build(&table, &["$row"], 42),
            Err(ConfigError::Node {
                source: ValueError::NonAsciiCsvChar {
                    name: "delimiter",
                    ..
                },
                ..
            })
        ));

        let table = DefinitionTable::from_yaml(
            "row:\n  kind: csv\n  path: rows.csv\n  comment: \"\u{00a7}\"\n",
        )
        .unwrap();
        assert!(matches!(
            build(&table, &["$row"], 42),
            Err(ConfigError::Node {
                source: ValueError::NonAsciiCsvChar { name: "comment", .. },
                ..
            })
        ));
    }

    #[test]
    fn test_output_reference_parsing() {
        assert_eq!(parse_outputs(&["$a"]).unwrap(), vec!["a"]);
        assert_eq!(parse_outputs(&["a"]).unwrap(), vec!["a"]);
        assert_eq!(
            parse_outputs(&["list([$a, $b])"]).unwrap(),
            vec!["a", "b"]
        );
        assert!(matches!(
            parse_outputs(&["list([a])"]),
            Err(ConfigError::InvalidOutput(_))
        ));
        assert!(matches!(parse_outputs(&[]), Err(ConfigError::NoOutputs)));
    }

    #[test]
    fn test_multi_output_wraps_by_name() {
        let table = DefinitionTable::from_yaml(
            r#"
a:
  kind: constant
  value: 1
b:
  kind: constant
  value: 2
"#,
        )
        .unwrap();

        let mut generator = build(&table, &["list([$a, $b])"], 42).unwrap();
        let Value::Object(fields) = generator.next().unwrap() else {
            panic!("expected object record");
        };
        assert_eq!(fields["a"], Value::Int64(1));
        assert_eq!(fields["b"], Value::Int64(2));
    }

    #[test]
    fn test_shared_reference_is_one_instance() {
        let table = DefinitionTable::from_yaml(
            r#"
seq:
  kind: circular_range
  start: 1
  end: 100
pair:
  kind: object
  fields:
    first: $seq
    second: $seq
"#,
        )
        .unwrap();

        let mut generator = build(&table, &["$pair"], 42).unwrap();
        for expected in 1..=5i64 {
            let Value::Object(fields) = generator.next().unwrap() else {
                panic!("expected object record");
            };
            // Both fields observe the same advancing sequence
            assert_eq!(fields["first"], Value::Int64(expected));
            assert_eq!(fields["second"], Value::Int64(expected));
        }
    }
}
