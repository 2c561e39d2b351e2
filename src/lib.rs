//! Declarative synthetic-data generation.
//!
//! This crate is the façade over the `datagen` workspace: a definition
//! table of named value-producing nodes is resolved into a generator
//! graph, and records are pulled from it one at a time or in parallel
//! across cloned graphs.
//!
//! # Example
//!
//! ```rust
//! use datagen::{build, DefinitionTable};
//!
//! let table = DefinitionTable::from_yaml(r#"
//! order_id:
//!   kind: circular_range
//!   start: 1000
//!   end: 9999
//! status:
//!   kind: exact_weighted
//!   values:
//!     - value: shipped
//!       count: 60
//!     - value: pending
//!       count: 40
//! order:
//!   kind: object
//!   fields:
//!     id: $order_id
//!     status: $status
//! "#).unwrap();
//!
//! let mut generator = build(&table, &["$order"], 42).unwrap();
//! for record in generator.records(5) {
//!     println!("{}", record.unwrap());
//! }
//! ```
//!
//! The engine itself lives in [`datagen_core`]; CSV-backed record sources
//! in [`record_source`].

pub use datagen_core::{
    build, generate_parallel, partition_counts, ConfigError, DefinitionTable, Distribution,
    GenerateError, NodeDescriptor, ObjectGenerator, Operand, Records, Value, ValueError,
    XegerPattern,
};

pub use datagen_record_source as record_source;
