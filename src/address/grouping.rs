//! Groups input features by their full tag set and assembles each group.
//!
//! TIGER splits one logical road into many records. Records belong together
//! only if the way id and every attribute match, so address ranges of
//! different blocks are never mixed.

use hashbrown::HashMap;
use tracing::info;

use super::assemble::assemble;
use crate::models::{Feature, Segment, TigerTags};

/// All chains assembled from the features sharing one tag set
#[derive(Debug, Clone)]
pub struct WayGroup {
    pub tags: TigerTags,
    pub chains: Vec<Segment>,
}

/// Collects features into groups, keeping first-seen group order
#[derive(Debug, Default)]
pub struct WayGrouper {
    groups: Vec<(TigerTags, Vec<Segment>)>,
    index: HashMap<TigerTags, usize>,
}

impl WayGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one feature's fragment to its group
    pub fn add(&mut self, tags: &TigerTags, segment: Segment) {
        match self.index.get(tags) {
            Some(&pos) => self.groups[pos].1.push(segment),
            None => {
                self.index.insert(tags.clone(), self.groups.len());
                self.groups.push((tags.clone(), vec![segment]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Assemble the fragments of every group into chains
    pub fn assemble(self) -> Vec<WayGroup> {
        info!("Assembling {} way groups...", self.groups.len());

        let mut fragments = 0;
        let groups: Vec<WayGroup> = self
            .groups
            .into_iter()
            .map(|(tags, segments)| {
                fragments += segments.len();
                WayGroup {
                    tags,
                    chains: assemble(segments),
                }
            })
            .collect();

        let chains: usize = groups.iter().map(|g| g.chains.len()).sum();
        info!(
            "Assembled {} fragments into {} chains ({} groups)",
            fragments,
            chains,
            groups.len()
        );

        groups
    }
}

/// Group features and assemble each group's fragments
pub fn group(features: &[Feature]) -> Vec<WayGroup> {
    let mut grouper = WayGrouper::new();
    for feature in features {
        grouper.add(&feature.tags, feature.points.clone());
    }
    grouper.assemble()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPoint;

    fn feature(way_id: i64, name: &str, points: &[(f64, f64)]) -> Feature {
        let mut tags = TigerTags::new(way_id);
        tags.name = Some(name.to_string());
        Feature {
            points: points.iter().map(|&(x, y)| RawPoint::new(x, y)).collect(),
            tags,
        }
    }

    #[test]
    fn test_same_tags_are_assembled() {
        let groups = group(&[
            feature(1, "Holly St", &[(0.0, 0.0), (1.0, 0.0)]),
            feature(1, "Holly St", &[(1.0, 0.0), (2.0, 0.0)]),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].chains.len(), 1);
        assert_eq!(groups[0].chains[0].len(), 3);
    }

    #[test]
    fn test_different_tags_are_not_merged() {
        let groups = group(&[
            feature(1, "Holly St", &[(0.0, 0.0), (1.0, 0.0)]),
            feature(1, "Holly Street", &[(1.0, 0.0), (2.0, 0.0)]),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tags.name.as_deref(), Some("Holly St"));
        assert_eq!(groups[1].tags.name.as_deref(), Some("Holly Street"));
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let groups = group(&[
            feature(3, "C St", &[(0.0, 0.0), (1.0, 0.0)]),
            feature(1, "A St", &[(5.0, 0.0), (6.0, 0.0)]),
            feature(3, "C St", &[(7.0, 0.0), (8.0, 0.0)]),
            feature(2, "B St", &[(9.0, 0.0), (10.0, 0.0)]),
        ]);
        let ids: Vec<i64> = groups.iter().map(|g| g.tags.way_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(groups[0].chains.len(), 2);
    }
}
