//! Numbering, dominator and dominance frontier passes over a method's regions.
//!
//! The algorithms live in [`crate::utils::graph::algorithms`]; the passes here run
//! them on a [`ControlFlowGraph`] and copy the results into the region annotations.

use log::{debug, trace};

use crate::{
    analysis::{ControlFlowGraph, Stage},
    utils::graph::{
        algorithms::{compute_dominance_frontiers, compute_dominators, reverse_postorder},
        NodeId,
    },
};

impl ControlFlowGraph {
    /// Numbers the regions in reverse postorder from the entry.
    ///
    /// The entry receives 0. Regions not reachable from the entry keep
    /// [`RpoNumber::NotVisited`](crate::utils::graph::algorithms::RpoNumber::NotVisited)
    /// and are ignored by every later pass.
    ///
    /// # Panics
    ///
    /// Panics unless the graph is freshly assembled.
    pub fn compute_rpo(&mut self) {
        self.advance("compute_rpo", Stage::Assembled, Stage::Numbered);

        let rpo = reverse_postorder(&*self, self.entry);
        for region in &mut self.regions {
            region.rpo = rpo.number(region.id);
        }

        let unreachable = self.regions.len() - rpo.len();
        if unreachable > 0 {
            debug!(
                "{}: {} of {} regions unreachable from entry",
                self.method,
                unreachable,
                self.regions.len()
            );
        }
        self.rpo = Some(rpo);
    }

    /// Computes the immediate dominator of every reachable region and fills the
    /// dominator tree children.
    ///
    /// # Panics
    ///
    /// Panics unless [`compute_rpo`](Self::compute_rpo) ran last.
    pub fn compute_idominators(&mut self) {
        self.advance("compute_idominators", Stage::Numbered, Stage::Dominators);

        let tree = compute_dominators(&*self, self.numbering());
        trace!(
            "{}: dominators converged after {} passes",
            self.method,
            tree.passes()
        );

        for region in &mut self.regions {
            region.idom = tree.immediate_dominator(region.id);
            region.idominated = tree.children(region.id).to_vec();
        }
        self.dominators = Some(tree);
    }

    /// Computes the dominance frontier of every reachable region.
    ///
    /// # Panics
    ///
    /// Panics unless [`compute_idominators`](Self::compute_idominators) ran last.
    pub fn compute_dominance_frontier(&mut self) {
        self.advance(
            "compute_dominance_frontier",
            Stage::Dominators,
            Stage::Frontiers,
        );

        let frontiers = compute_dominance_frontiers(&*self, self.dominator_tree());
        let mut edges = 0;
        for (region, frontier) in self.regions.iter_mut().zip(frontiers) {
            edges += frontier.len();
            region.frontier = frontier;
        }
        debug!("{}: {} dominance frontier edges", self.method, edges);
    }

    /// Returns `true` if region `a` dominates region `b`.
    ///
    /// Every region dominates itself; unreachable regions take part in no
    /// dominance relation.
    ///
    /// # Panics
    ///
    /// Panics if dominators have not been computed yet.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        assert!(
            self.stage >= Stage::Dominators,
            "dominance queried on {} before dominators were computed",
            self.method
        );
        self.dominator_tree().dominates(a, b)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::{
        analysis::{BlockRecord, ControlFlowGraph, MethodBody, MethodRef},
        utils::graph::{algorithms::RpoNumber, NodeId},
    };

    /// Diamond 0 -> {2, 4} -> 6 plus a region at 8 nothing jumps to.
    fn diamond() -> ControlFlowGraph {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(BlockRecord::new(0).branches_to(4).falls_through_to(2))
            .with_block(BlockRecord::new(2).branches_to(6))
            .with_block(BlockRecord::new(4).falls_through_to(6))
            .with_block(BlockRecord::new(6))
            .with_block(BlockRecord::new(8).branches_to(6));
        ControlFlowGraph::from_method_body(body).unwrap()
    }

    fn annotated() -> ControlFlowGraph {
        let mut cfg = diamond();
        cfg.compute_rpo();
        cfg.compute_idominators();
        cfg.compute_dominance_frontier();
        cfg
    }

    #[test]
    fn test_rpo_annotations() {
        let mut cfg = diamond();
        cfg.compute_rpo();

        assert_eq!(cfg.region(cfg.entry_region()).rpo(), RpoNumber::Index(0));
        let merge = cfg.region(cfg.region_at(6).unwrap());
        assert_eq!(merge.rpo(), RpoNumber::Index(3));
        let orphan = cfg.region(cfg.region_at(8).unwrap());
        assert_eq!(orphan.rpo(), RpoNumber::NotVisited);
        assert!(!orphan.is_reachable());
        assert_eq!(cfg.rpo_order().len(), 4);
    }

    #[test]
    fn test_diamond_dominators() {
        let cfg = annotated();
        let entry = cfg.entry_region();
        let (a, b, merge) = (
            cfg.region_at(2).unwrap(),
            cfg.region_at(4).unwrap(),
            cfg.region_at(6).unwrap(),
        );

        assert_eq!(cfg.region(entry).immediate_dominator(), None);
        assert_eq!(cfg.region(a).immediate_dominator(), Some(entry));
        assert_eq!(cfg.region(b).immediate_dominator(), Some(entry));
        assert_eq!(cfg.region(merge).immediate_dominator(), Some(entry));

        let mut children = cfg.region(entry).idominated().to_vec();
        children.sort();
        assert_eq!(children, vec![a, b, merge]);

        assert!(cfg.dominates(entry, merge));
        assert!(!cfg.dominates(a, merge));
    }

    #[test]
    fn test_diamond_frontiers() {
        let cfg = annotated();
        let merge = cfg.region_at(6).unwrap();

        assert_eq!(cfg.region(cfg.region_at(2).unwrap()).frontier(), &BTreeSet::from([merge]));
        assert_eq!(cfg.region(cfg.region_at(4).unwrap()).frontier(), &BTreeSet::from([merge]));
        assert!(cfg.region(cfg.entry_region()).frontier().is_empty());
        assert!(cfg.region(merge).frontier().is_empty());
    }

    #[test]
    fn test_unreachable_region_gets_no_results() {
        let cfg = annotated();
        let orphan = cfg.region(cfg.region_at(8).unwrap());

        assert_eq!(orphan.immediate_dominator(), None);
        assert!(orphan.idominated().is_empty());
        assert!(orphan.frontier().is_empty());
        assert!(!cfg.dominates(cfg.entry_region(), orphan.id()));
        // The orphan appears in no frontier
        assert!(cfg
            .regions()
            .all(|region| !region.frontier().contains(&NodeId::new(4))));
    }

    #[test]
    #[should_panic(expected = "before dominators were computed")]
    fn test_dominates_before_computation_panics() {
        let cfg = diamond();
        let _ = cfg.dominates(cfg.entry_region(), cfg.entry_region());
    }
}
