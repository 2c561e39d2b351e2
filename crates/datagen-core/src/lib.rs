//! Generator graph engine for declarative synthetic data generation.
//!
//! A [`DefinitionTable`] names value-producing nodes (constants, samplers,
//! CSV-backed readers, transformers, arithmetic combinators, composites)
//! that may reference each other by `$name`. [`build`] resolves the table
//! into a live generator graph and wraps it in an [`ObjectGenerator`],
//! which yields one structured record per `next()` call.
//!
//! # Architecture
//!
//! ```text
//! DefinitionTable (YAML)
//!         │
//!         ▼
//! ┌───────────────┐    resolve $references,
//! │ GraphBuilder  │    detect cycles, validate
//! └───────┬───────┘    parameters eagerly
//!         ▼
//! ┌───────────────┐    arena of value nodes,
//! │     Graph     │    one name = one node,
//! │  (seeded RNG) │    per-record pull memo
//! └───────┬───────┘
//!         ▼
//!  ObjectGenerator ── next() / generate(n) / clone()
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_core::{build, DefinitionTable, Value};
//!
//! let table = DefinitionTable::from_yaml(r#"
//! id:
//!   kind: circular_range
//!   start: 1
//!   end: 100
//! name:
//!   kind: discrete
//!   values: [alice, bob, carol]
//! user:
//!   kind: object
//!   fields:
//!     id: $id
//!     name: $name
//! "#).unwrap();
//!
//! let mut generator = build(&table, &["$user"], 42).unwrap();
//! let record = generator.next().unwrap();
//! println!("generated: {record}");
//! ```
//!
//! # Node kinds
//!
//! - `constant` - fixed value
//! - `object` / `list` / `random_list` - composites over child nodes
//! - `discrete` / `weighted` / `exact_weighted` - candidate sampling
//! - `circular` / `circular_range` - deterministic cycles
//! - `range` / `random_date` - bounded numeric/instant sampling, with
//!   `uniform` or bounded `normal` distributions
//! - `add` / `subtract` / `multiply` / `divide` - arithmetic combinators
//! - `case` / `ascii_fold` / `string_format` / `time_format` / `getter` /
//!   `json` / `switch` / `mapper` - transformers over one upstream value
//! - `xeger` / `random_string` - string synthesis
//! - `csv` - rows from a CSV-backed record source (sequential, circular,
//!   random, or weighted selection)

pub mod builder;
pub mod descriptor;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod graph;
pub mod nodes;
pub mod runner;
pub mod value;
pub mod xeger;

// Re-exports for convenience
pub use builder::build;
pub use descriptor::{DefinitionTable, NodeDescriptor, Operand};
pub use distribution::Distribution;
pub use error::{ConfigError, GenerateError, ValueError};
pub use generator::{ObjectGenerator, Records};
pub use runner::{generate_parallel, partition_counts};
pub use value::Value;
pub use xeger::XegerPattern;
