//! Joins centerline fragments that share an endpoint into continuous chains.
//!
//! Fragments of one logical road usually arrive as a handful of pieces, in no
//! particular order or direction. Endpoints are compared on their rounded
//! identity key, so fragments are only joined where they exactly meet.

use crate::models::{PointKey, RawPoint, Segment};

/// Rounded first and last point of a segment
fn endpoints(segment: &[RawPoint]) -> Option<(PointKey, PointKey)> {
    Some((segment.first()?.key(), segment.last()?.key()))
}

/// Check if two segments touch at any combination of their ends
pub fn adjacent(left: &[RawPoint], right: &[RawPoint]) -> bool {
    let (Some((left_start, left_end)), Some((right_start, right_end))) =
        (endpoints(left), endpoints(right))
    else {
        return false;
    };

    left_start == right_start
        || left_start == right_end
        || left_end == right_start
        || left_end == right_end
}

/// Combine two adjacent segments into one, reversing one of them if needed
/// so the shared point sits in the middle. The shared point is kept once.
///
/// Returns `None` if the segments do not touch.
pub fn splice(left: &[RawPoint], right: &[RawPoint]) -> Option<Segment> {
    let (left_start, left_end) = endpoints(left)?;
    let (right_start, right_end) = endpoints(right)?;

    let (head, tail): (Segment, &[RawPoint]) = if left_start == right_start {
        (left.iter().rev().copied().collect(), right)
    } else if left_start == right_end {
        (right.to_vec(), left)
    } else if left_end == right_start {
        (left.to_vec(), right)
    } else if left_end == right_end {
        let reversed: Segment = right.iter().rev().copied().collect();
        let mut joined = left.to_vec();
        joined.pop();
        joined.extend(reversed);
        return Some(joined);
    } else {
        return None;
    };

    let mut joined = head;
    joined.pop();
    joined.extend_from_slice(tail);
    Some(joined)
}

/// Grow the first segment of the pool as far as possible.
///
/// Each pass looks for the first remaining segment adjacent to the chain,
/// splices it in and starts over; a pass without a match ends the chain.
fn assemble_once(mut remaining: Vec<Segment>) -> (Segment, Vec<Segment>) {
    let mut chain = remaining.remove(0);

    while let Some((pos, joined)) = remaining
        .iter()
        .enumerate()
        .find_map(|(i, s)| splice(&chain, s).map(|joined| (i, joined)))
    {
        remaining.remove(pos);
        chain = joined;
    }

    (chain, remaining)
}

/// Combine as many segments as possible. Chains come out in the order of
/// the segment that started each of them.
pub fn assemble(segments: Vec<Segment>) -> Vec<Segment> {
    let mut remaining = segments;
    let mut chains = Vec::new();

    while !remaining.is_empty() {
        let (chain, rest) = assemble_once(remaining);
        chains.push(chain);
        remaining = rest;
    }

    chains
}
