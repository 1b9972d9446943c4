//! Dependency graph construction and topological ordering
//!
//! Nodes are provider definitions (indexed in registry order), edges are
//! "depends on provider". Value-kind dependencies never produce edges;
//! they are satisfied from the environment. Edge building fans out over
//! every suitable candidate; uniqueness is enforced later, at instance
//! resolution. A cycle fails the build.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, trace};

use crate::definition::{DefinitionId, ProviderDefinition};
use crate::error::{Error, Result};
use crate::registry::DefinitionContainer;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Plain adjacency-list directed graph over node indices
struct OrientedGraph {
    adj: Vec<Vec<usize>>,
}

impl OrientedGraph {
    fn new() -> Self {
        Self { adj: Vec::new() }
    }

    fn add_node(&mut self) -> usize {
        self.adj.push(Vec::new());
        self.adj.len() - 1
    }

    // caller guarantees both endpoints exist
    fn add_edge(&mut self, from: usize, to: usize) {
        debug_assert!(from < self.adj.len() && to < self.adj.len());
        self.adj[from].push(to);
    }

    /// Depth-first topological sort; edge targets (dependencies) come
    /// strictly before edge sources (dependents). Roots are visited in
    /// index order and edges in insertion order, so the output is
    /// deterministic for identical input. The traversal keeps its own
    /// stack of `(node, next edge offset)` frames, so chain depth is not
    /// bounded by the call stack. `Err` carries a node participating in a
    /// cycle.
    fn topological_sort(&self) -> std::result::Result<Vec<usize>, usize> {
        let mut marks = vec![Mark::Unvisited; self.adj.len()];
        let mut order = Vec::with_capacity(self.adj.len());
        let mut stack: Vec<(usize, usize)> = Vec::new();
        for root in 0..self.adj.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::InProgress;
            stack.push((root, 0));
            while let Some((node, edge)) = stack.pop() {
                match self.adj[node].get(edge) {
                    Some(&next) => {
                        stack.push((node, edge + 1));
                        match marks[next] {
                            Mark::Done => {}
                            Mark::InProgress => return Err(next),
                            Mark::Unvisited => {
                                marks[next] = Mark::InProgress;
                                stack.push((next, 0));
                            }
                        }
                    }
                    None => {
                        marks[node] = Mark::Done;
                        order.push(node);
                    }
                }
            }
        }
        Ok(order)
    }
}

/// The engine's dependency graph: definitions as node payloads plus the
/// sorted construction order
pub struct ContextGraph {
    graph: OrientedGraph,
    nodes: Vec<Arc<ProviderDefinition>>,
    index_of: HashMap<DefinitionId, usize>,
    sorted: Vec<usize>,
}

impl ContextGraph {
    pub fn new() -> Self {
        Self {
            graph: OrientedGraph::new(),
            nodes: Vec::new(),
            index_of: HashMap::new(),
            sorted: Vec::new(),
        }
    }

    pub fn build(&mut self, definitions: &DefinitionContainer) -> Result<()> {
        info!("building the dependency graph");
        self.add_nodes(definitions);
        self.add_edges(definitions)?;
        self.sorted = self.graph.topological_sort().map_err(|node| {
            Error::cyclic_dependency(self.nodes[node].short_string())
        })?;
        Ok(())
    }

    /// Assign graph indices in registry iteration order
    fn add_nodes(&mut self, definitions: &DefinitionContainer) {
        for definition in definitions.iter() {
            let index = self.graph.add_node();
            self.nodes.push(definition.clone());
            self.index_of.insert(definition.id(), index);
            trace!(definition = %definition, index, "added graph node");
        }
    }

    /// One edge per suitable candidate per bean-kind dependency
    fn add_edges(&mut self, definitions: &DefinitionContainer) -> Result<()> {
        for definition in definitions.iter() {
            let Some(&from) = self.index_of.get(&definition.id()) else {
                continue;
            };
            for dependency in definition.dependencies() {
                if !dependency.is_bean() {
                    continue;
                }
                let targets: Vec<usize> = definitions
                    .iter()
                    .filter(|candidate| candidate.suitable_for(dependency))
                    .filter_map(|candidate| self.index_of.get(&candidate.id()).copied())
                    .collect();
                if targets.is_empty() {
                    return Err(Error::unsatisfied_dependency(
                        dependency.to_string(),
                        definition.short_string(),
                    ));
                }
                for to in targets {
                    self.graph.add_edge(from, to);
                    trace!(
                        from = %definition.short_string(),
                        from_index = from,
                        to = %dependency,
                        to_index = to,
                        "added dependency edge"
                    );
                }
            }
        }
        Ok(())
    }

    /// The definitions in construction order (dependencies first)
    pub fn iter_sorted(&self) -> impl Iterator<Item = Arc<ProviderDefinition>> + '_ {
        self.sorted.iter().map(|&index| self.nodes[index].clone())
    }
}
