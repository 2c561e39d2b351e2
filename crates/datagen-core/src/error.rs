//! Error types for graph construction and record generation.

use datagen_record_source::SourceError;

/// Node-construction-time failure: invalid parameters detected eagerly,
/// never deferred to the first pull.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// Candidate set for a sampler is empty
    #[error("candidate set is empty")]
    EmptyCandidates,

    /// A supplied weight is negative or not finite
    #[error("weight {weight} for '{value}' must be a non-negative number")]
    InvalidWeight { value: String, weight: f64 },

    /// No candidate carries a positive weight
    #[error("at least one positive weight is required")]
    NoPositiveWeight,

    /// Numeric bounds are inverted or degenerate
    #[error("invalid bounds: lower {lower} must be below upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },

    /// Normal distribution with a non-positive standard deviation
    #[error("standard deviation must be positive, got {0}")]
    InvalidStdDev(f64),

    /// Normal distribution mean outside its own bounds
    #[error("mean {mean} falls outside [{lower}, {upper}]")]
    MeanOutOfBounds { mean: f64, lower: f64, upper: f64 },

    /// Malformed regex pattern
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Character-set specification resolves to no characters
    #[error("character set '{0}' is empty")]
    EmptyCharset(String),

    /// Character-set specification with an inverted range
    #[error("invalid character range in '{0}'")]
    InvalidCharset(String),

    /// Circular range with a zero step or a step pointing away from the end
    #[error("step {step} cannot reach {end} from {start}")]
    UnreachableRange { start: i64, end: i64, step: i64 },

    /// Random-length list with min above max
    #[error("invalid length bounds: min {min} must not exceed max {max}")]
    InvalidLength { min: usize, max: usize },

    /// Unparseable timestamp parameter
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// Arithmetic node with fewer than two operands
    #[error("arithmetic requires at least two operands, got {0}")]
    NotEnoughOperands(usize),

    /// Switch node without cases
    #[error("switch requires at least one case")]
    EmptyCases,

    /// CSV control character outside the single-byte ASCII range
    #[error("CSV {name} character '{value}' must be ASCII")]
    NonAsciiCsvChar { name: &'static str, value: char },

    /// Record-source construction failure (missing file, bad weight column)
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Graph-builder-time failure. Always detected at build time, never
/// mid-generation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error parsing the definition table from YAML
    #[error("failed to parse definition table: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `$name` reference names no table entry
    #[error("unknown reference '${name}'")]
    UnknownReference { name: String },

    /// A name directly or transitively references itself
    #[error("cyclic reference: {path}")]
    CyclicReference { path: String },

    /// Malformed output-reference declaration
    #[error("invalid output reference '{0}'")]
    InvalidOutput(String),

    /// No output references were declared
    #[error("no output references declared")]
    NoOutputs,

    /// A definition failed node-construction validation
    #[error("invalid definition '{name}': {source}")]
    Node {
        name: String,
        #[source]
        source: ValueError,
    },
}

/// Runtime generation failure. The only failures legitimately raised
/// mid-run; everything else is rejected at build time.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Sequential record source ran out of rows
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Division by a zero-valued operand
    #[error("division by zero")]
    DivisionByZero,

    /// An arithmetic operand pulled a non-numeric value
    #[error("expected a numeric operand, got {0}")]
    NonNumericOperand(&'static str),

    /// A getter key missing from the pulled object
    #[error("key '{key}' not found in pulled {kind} value")]
    MissingKey { key: String, kind: &'static str },

    /// Time-format over a value that is not a timestamp
    #[error("expected a timestamp or epoch-milli integer, got {0}")]
    NotATimestamp(&'static str),

    /// Random-string length source yielded a non-integer
    #[error("expected an integer length, got {0}")]
    NonIntegerLength(&'static str),

    /// Switch/mapper input matched no case and no default exists
    #[error("no case matches '{0}'")]
    NoMatchingCase(String),

    /// JSON encoding failure
    #[error("failed to encode value as JSON: {0}")]
    Json(#[from] serde_json::Error),
}
