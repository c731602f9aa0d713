//! Dependents graph - who has to forget their caches when a type changes.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `TypeId`, one per registered type, added in registration order
//! - Edges: `Subclass` from a class to each direct subclass, `Inclusion` from a
//!   module to each type it was inserted into
//!
//! Every edge `a -> b` means `a` appears in the linearization of `b`, so a
//! path from `a` to `b` means the same thing transitively. Invalidation walks
//! outgoing edges; cycle checks ask whether a path already exists.

use lineage_core::TypeId;
use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};

/// Edge types in the dependents graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    /// Source class is the direct superclass of the target.
    Subclass,
    /// Source module was inserted into the target's module list.
    Inclusion,
}

/// Reverse dependency edges between registered types.
#[derive(Debug, Default)]
pub struct DependentsGraph {
    graph: DiGraph<TypeId, Dependency>,
}

impl DependentsGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn node(id: TypeId) -> NodeIndex {
        NodeIndex::new(id.as_usize())
    }

    /// Add a node for a freshly registered type.
    ///
    /// Types are numbered densely from zero, so the node index always equals
    /// the type index.
    pub fn add_type(&mut self, id: TypeId) {
        let node = self.graph.add_node(id);
        debug_assert_eq!(node.index(), id.as_usize());
    }

    /// Record that `subclass` extends `superclass`.
    pub fn add_subclass(&mut self, superclass: TypeId, subclass: TypeId) {
        self.graph.add_edge(
            Self::node(superclass),
            Self::node(subclass),
            Dependency::Subclass,
        );
    }

    /// Record that `module` was inserted into `target`.
    pub fn add_inclusion(&mut self, module: TypeId, target: TypeId) {
        self.graph.add_edge(
            Self::node(module),
            Self::node(target),
            Dependency::Inclusion,
        );
    }

    /// Direct dependents of `id` reached through `kind` edges, oldest first.
    pub fn direct(&self, id: TypeId, kind: Dependency) -> Vec<TypeId> {
        let mut out: Vec<TypeId> = self
            .graph
            .edges_directed(Self::node(id), Direction::Outgoing)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| self.graph[edge.target()])
            .collect();
        // petgraph walks the adjacency list newest first
        out.reverse();
        out
    }

    /// `id` followed by every type that transitively depends on it.
    pub fn transitive(&self, id: TypeId) -> Vec<TypeId> {
        let mut bfs = Bfs::new(&self.graph, Self::node(id));
        let mut out = Vec::new();
        while let Some(node) = bfs.next(&self.graph) {
            out.push(self.graph[node]);
        }
        out
    }

    /// True if `to` already depends on `from`, directly or transitively.
    pub fn reaches(&self, from: TypeId, to: TypeId) -> bool {
        has_path_connecting(&self.graph, Self::node(from), Self::node(to), None)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
