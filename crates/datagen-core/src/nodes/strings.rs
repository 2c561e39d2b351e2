//! Random-content string support: character-set specifications.

use crate::error::ValueError;
use rand::Rng;

/// Expand a character-set specification like `"a-zA-Z0-9_"` into the
/// concrete characters it covers. A trailing or leading `-` is literal.
pub fn parse_charset(spec: &str) -> Result<Vec<char>, ValueError> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        // A range needs a character on both sides of the dash
        if i + 2 < chars.len() && chars[i + 1] == '-' {
            let (start, end) = (chars[i], chars[i + 2]);
            if start > end {
                return Err(ValueError::InvalidCharset(spec.to_string()));
            }
            for c in start..=end {
                out.push(c);
            }
            i += 3;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    if out.is_empty() {
        return Err(ValueError::EmptyCharset(spec.to_string()));
    }
    Ok(out)
}

/// A string of `length` characters drawn uniformly from `charset`.
pub fn random_string<R: Rng>(rng: &mut R, charset: &[char], length: usize) -> String {
    (0..length)
        .map(|_| charset[rng.gen_range(0..charset.len())])
        .collect()
}
