//! Cycle-checked prototype chain walks

use std::collections::HashSet;

use confluence_graph::{NodeId, ObjectGraph};

use crate::{ExtractError, Result};

/// Iterator over a `[[Prototype]]` chain
///
/// Yields object nodes only; the walk ends at the first absent or terminal
/// prototype. Reaching a node twice yields one [`ExtractError::PrototypeCycle`]
/// and then ends.
pub struct PrototypeChain<'g> {
    graph: &'g dyn ObjectGraph,
    next: Option<NodeId>,
    visited: HashSet<NodeId>,
    walked: Vec<NodeId>,
}

impl<'g> PrototypeChain<'g> {
    /// Walk starting at `start` itself
    pub fn starting_at(graph: &'g dyn ObjectGraph, start: NodeId) -> Self {
        Self {
            graph,
            next: Some(start),
            visited: HashSet::new(),
            walked: Vec::new(),
        }
    }

    /// Walk the strict ancestors of `id`
    pub fn ancestors(graph: &'g dyn ObjectGraph, id: NodeId) -> Self {
        let mut chain = Self::starting_at(graph, id);
        chain.visited.insert(id);
        chain.walked.push(id);
        chain.next = graph.prototype(id);
        chain
    }

    fn cycle_error(&self, node: NodeId) -> ExtractError {
        let chain = self
            .walked
            .iter()
            .chain(std::iter::once(&node))
            .map(NodeId::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        ExtractError::PrototypeCycle { node, chain }
    }
}

impl Iterator for PrototypeChain<'_> {
    type Item = Result<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        if self.graph.is_type(id) {
            return None;
        }
        if !self.visited.insert(id) {
            return Some(Err(self.cycle_error(id)));
        }
        self.walked.push(id);
        self.next = self.graph.prototype(id);
        Some(Ok(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluence_graph::GraphBuilder;

    #[test]
    fn test_walk_stops_at_terminal() {
        let graph = GraphBuilder::new(1)
            .object(2)
            .object(3)
            .primitive(9, "null")
            .property(1, "a", 2)
            .property(1, "b", 3)
            .prototype(2, 3)
            .prototype(3, 9)
            .build()
            .unwrap();

        let from: Vec<NodeId> = PrototypeChain::starting_at(&graph, NodeId(2))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(from, vec![NodeId(2), NodeId(3)]);

        let ancestors: Vec<NodeId> = PrototypeChain::ancestors(&graph, NodeId(2))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(ancestors, vec![NodeId(3)]);

        // Root has no captured prototype
        assert_eq!(PrototypeChain::ancestors(&graph, NodeId(1)).count(), 0);
        assert_eq!(PrototypeChain::starting_at(&graph, NodeId(9)).count(), 0);
    }

    #[test]
    fn test_cycle_reported_once() {
        let graph = GraphBuilder::new(1)
            .object(2)
            .object(3)
            .property(1, "a", 2)
            .prototype(2, 3)
            .prototype(3, 2)
            .build()
            .unwrap();

        let steps: Vec<Result<NodeId>> = PrototypeChain::starting_at(&graph, NodeId(2)).collect();
        assert_eq!(steps.len(), 3);
        match &steps[2] {
            Err(ExtractError::PrototypeCycle { node, chain }) => {
                assert_eq!(*node, NodeId(2));
                assert_eq!(chain, "2 -> 3 -> 2");
            }
            other => panic!("Expected PrototypeCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_prototype_is_a_cycle() {
        let graph = GraphBuilder::new(1)
            .object(2)
            .property(1, "a", 2)
            .prototype(2, 2)
            .build()
            .unwrap();
        let err = PrototypeChain::ancestors(&graph, NodeId(2))
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.to_string(), "prototype cycle detected: 2 -> 2");
    }
}
