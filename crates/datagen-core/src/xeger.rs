//! Regex-driven string synthesis.
//!
//! A [`XegerPattern`] compiles a regular expression to its parsed structure
//! and walks it randomly: literals emit themselves, character classes
//! sample one admissible character, alternations pick a uniform branch and
//! quantifiers a uniform repetition count. Every emitted string matches the
//! source pattern.

use crate::error::ValueError;
use rand::Rng;
use regex_syntax::hir::{Class, Hir, HirKind};

/// Extra iterations granted to unbounded quantifiers (`*`, `+`, `{n,}`)
/// beyond their minimum, so every walk terminates.
const UNBOUNDED_EXTRA: u32 = 8;

/// A compiled regular expression that can be randomly walked to emit
/// matching strings.
#[derive(Debug, Clone)]
pub struct XegerPattern {
    pattern: String,
    hir: Hir,
}

impl XegerPattern {
    /// Compile a pattern; malformed patterns fail here, never at sampling.
    pub fn compile(pattern: &str) -> Result<Self, ValueError> {
        let hir = regex_syntax::parse(pattern).map_err(|e| ValueError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            hir,
        })
    }

    /// The source pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Emit one random string matching the pattern.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> String {
        let mut out = String::new();
        walk(&self.hir, rng, &mut out);
        out
    }
}

fn walk<R: Rng>(hir: &Hir, rng: &mut R, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(literal) => {
            out.push_str(&String::from_utf8_lossy(&literal.0));
        }
        HirKind::Class(class) => {
            out.push(sample_class(class, rng));
        }
        HirKind::Repetition(rep) => {
            let max = rep.max.unwrap_or(rep.min + UNBOUNDED_EXTRA);
            let count = rng.gen_range(rep.min..=max);
            for _ in 0..count {
                walk(&rep.sub, rng, out);
            }
        }
        HirKind::Capture(capture) => walk(&capture.sub, rng, out),
        HirKind::Concat(parts) => {
            for part in parts {
                walk(part, rng, out);
            }
        }
        HirKind::Alternation(branches) => {
            let pick = rng.gen_range(0..branches.len());
            walk(&branches[pick], rng, out);
        }
    }
}

/// Sample one character from a class, uniformly by code-point count across
/// all of its ranges.
fn sample_class<R: Rng>(class: &Class, rng: &mut R) -> char {
    match class {
        Class::Unicode(unicode) => {
            let total: u64 = unicode
                .ranges()
                .iter()
                .map(|r| u64::from(r.end() as u32 - r.start() as u32) + 1)
                .sum();
            let mut pick = rng.gen_range(0..total);
            for range in unicode.ranges() {
                let span = u64::from(range.end() as u32 - range.start() as u32) + 1;
                if pick < span {
                    return char::from_u32(range.start() as u32 + pick as u32)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                }
                pick -= span;
            }
            char::REPLACEMENT_CHARACTER
        }
        Class::Bytes(bytes) => {
            let total: u32 = bytes
                .ranges()
                .iter()
                .map(|r| u32::from(r.end() - r.start()) + 1)
                .sum();
            let mut pick = rng.gen_range(0..total);
            for range in bytes.ranges() {
                let span = u32::from(range.end() - range.start()) + 1;
                if pick < span {
                    return char::from(range.start() + pick as u8);
                }
                pick -= span;
            }
            char::REPLACEMENT_CHARACTER
        }
    }
}
