//! State owned by one conversion run.

use tracing::{debug, info, warn};

use super::nodes::{IdCounter, NodeRegistry};
use super::offset::{generate, EnabledSides, OffsetPair, OffsetSettings};
use crate::models::{AddressRange, Feature, InterpolationType, Node, RawPoint, Side, TigerTags};
use crate::project::Unproject;

/// Node registry plus the id counter for generated address-line points.
///
/// Every point of every feature is registered up front, so node ids run from
/// 1 to N in input order and generated ids continue at N + 1. Nothing here is
/// shared between runs.
pub struct RunContext<T: Unproject> {
    nodes: NodeRegistry<T>,
    way_ids: IdCounter,
}

/// Address range and parity policy of an enabled side
#[derive(Debug, Clone, PartialEq)]
pub struct SidePlan {
    pub side: Side,
    pub range: AddressRange,
    pub policy: InterpolationType,
}

/// Sides of a chain that have a usable address range, right side first
pub fn plan_sides(tags: &TigerTags) -> Vec<SidePlan> {
    let right = tags.range(Side::Right);
    let left = tags.range(Side::Left);

    let mut plans = Vec::with_capacity(2);
    for (side, this, other) in [
        (Side::Right, &right, &left),
        (Side::Left, &left, &right),
    ] {
        match this {
            Some(range) => plans.push(SidePlan {
                side,
                range: range.clone(),
                policy: InterpolationType::for_side(range, other.as_ref()),
            }),
            None => match tags.raw_range(side) {
                (Some(from), Some(to)) => warn!(
                    "Way {}: non-integer house numbers {:?}-{:?} on {} side, skipped",
                    tags.way_id, from, to, side
                ),
                (from, to) => debug!(
                    "Way {}: skipping {} side, incomplete range (from={:?}, to={:?})",
                    tags.way_id, side, from, to
                ),
            },
        }
    }
    plans
}

impl<T: Unproject> RunContext<T> {
    /// Register every feature point and start the way id counter after them
    pub fn build(transformer: T, features: &[Feature]) -> Self {
        let mut nodes = NodeRegistry::new(transformer);
        for feature in features {
            for point in &feature.points {
                nodes.register(*point);
            }
        }
        info!("Registered {} nodes", nodes.len());

        let way_ids = IdCounter::starting_at(nodes.next_id());
        Self { nodes, way_ids }
    }

    pub fn nodes(&self) -> &NodeRegistry<T> {
        &self.nodes
    }

    /// Next id the offset generator will hand out
    pub fn next_way_id(&self) -> u64 {
        self.way_ids.peek()
    }

    /// Resolve a chain's raw points to registered nodes
    pub fn resolve(&mut self, chain: &[RawPoint]) -> Vec<Node> {
        chain.iter().map(|p| self.nodes.register(*p)).collect()
    }

    /// Plan the sides of a chain and draw their address lines.
    ///
    /// Returns `None` when neither side has a numeric range or the chain is
    /// degenerate; no ids are consumed in that case.
    pub fn offsets(
        &mut self,
        tags: &TigerTags,
        chain: &[RawPoint],
        settings: &OffsetSettings,
    ) -> Option<(Vec<SidePlan>, OffsetPair)> {
        let plans = plan_sides(tags);
        if plans.is_empty() {
            warn!(
                "Way {} ({}): no numeric address range on either side, skipped",
                tags.way_id,
                tags.name.as_deref().unwrap_or("unnamed")
            );
            return None;
        }

        let sides = EnabledSides {
            left: plans.iter().any(|p| p.side == Side::Left),
            right: plans.iter().any(|p| p.side == Side::Right),
        };
        let nodes = self.resolve(chain);
        match generate(&nodes, &mut self.way_ids, sides, settings) {
            Some(pair) => Some((plans, pair)),
            None => {
                warn!(
                    "Way {}: chain with {} points has no usable edge, skipped",
                    tags.way_id,
                    chain.len()
                );
                None
            }
        }
    }
}
