//! Compressed notation for ascending integer sequences.
//!
//! Rank sets and call lists are persisted as a compact run-length string:
//! consecutive runs render as `"start-end"`, isolated values as bare
//! decimals, tokens joined with `", "` (e.g. `[1,2,3,5,7,8,9]` becomes
//! `"1-3, 5, 7-9"`). Every other component decodes rank lists through this
//! module, so the round-trip law `decompress(compress(x)) == x` is load
//! bearing for the whole pipeline.

use crate::utils::error::NotationError;

/// Compress an ascending sequence of distinct ids into run-length notation
///
/// # Arguments
/// * `ids` - strictly ascending, distinct, non-negative integers
///
/// # Returns
/// The compressed representation; empty input yields an empty string.
///
/// # Errors
/// * `NotationError::NotAscending` - input repeats or goes backwards
pub fn compress(ids: &[u32]) -> Result<String, NotationError> {
    let mut tokens: Vec<String> = Vec::new();

    let mut i = 0;
    while i < ids.len() {
        if i > 0 && ids[i] <= ids[i - 1] {
            return Err(NotationError::NotAscending(ids[i], ids[i - 1]));
        }

        // Extend the run while ids stay consecutive and ascending
        let start = i;
        while i + 1 < ids.len() && ids[i + 1] == ids[i] + 1 {
            i += 1;
        }

        if i > start {
            tokens.push(format!("{}-{}", ids[start], ids[i]));
        } else {
            tokens.push(format!("{}", ids[start]));
        }
        i += 1;
    }

    Ok(tokens.join(", "))
}

/// Expand run-length notation back into the ascending id sequence
///
/// # Arguments
/// * `s` - compressed representation; tokens separated by `", "`, each a
///   bare integer or an inclusive `"a-b"` range
///
/// # Returns
/// The strictly ascending id sequence; an empty string yields an empty vec.
///
/// # Errors
/// * `NotationError::InvalidToken` - a token is not numeric
/// * `NotationError::ReversedRange` - a range has start > end
/// * `NotationError::NotAscending` - tokens overlap or repeat ids
pub fn decompress(s: &str) -> Result<Vec<u32>, NotationError> {
    let mut ids: Vec<u32> = Vec::new();

    if s.is_empty() {
        return Ok(ids);
    }

    for token in s.split(", ") {
        let (start, end) = parse_token(token)?;
        for id in start..=end {
            if let Some(&last) = ids.last() {
                if id <= last {
                    return Err(NotationError::NotAscending(id, last));
                }
            }
            ids.push(id);
        }
    }

    Ok(ids)
}

/// Parse one token into an inclusive (start, end) pair
fn parse_token(token: &str) -> Result<(u32, u32), NotationError> {
    match token.split_once('-') {
        Some((a, b)) => {
            let start = parse_id(a, token)?;
            let end = parse_id(b, token)?;
            if start > end {
                return Err(NotationError::ReversedRange(start, end));
            }
            Ok((start, end))
        }
        None => {
            let id = parse_id(token, token)?;
            Ok((id, id))
        }
    }
}

fn parse_id(text: &str, token: &str) -> Result<u32, NotationError> {
    text.parse::<u32>()
        .map_err(|_| NotationError::InvalidToken(token.to_string()))
}
