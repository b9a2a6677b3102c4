//! Workflow graph engine: node registry, edges, and build-time validation.
//!
//! A graph is assembled with [`GraphBuilder`] and checked when
//! [`GraphBuilder::build`] runs: the entry point must be declared and
//! registered, every edge must connect registered nodes, and every node must
//! be reachable from the entry point. Problems that can only surface during
//! traversal (an unmapped branch key, a cycle) are reported by
//! [`WorkflowGraph::run`].

mod executor;

pub use executor::WorkflowGraph;

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;

use crate::error::{AppResult, GraphError};

/// A single processing step. Nodes consume the prior state by value and
/// return the extended state.
#[async_trait]
pub trait Node<S>: Send + Sync {
    /// Execute this step against the current state.
    async fn run(&self, state: S) -> AppResult<S>;
}

/// Branch selector for conditional edges: a pure function of the current
/// state returning a branch key.
pub type BranchFn<S> = Box<dyn Fn(&S) -> String + Send + Sync>;

pub(crate) enum Edge<S> {
    Direct(String),
    Conditional {
        decide: BranchFn<S>,
        branches: HashMap<String, String>,
    },
}

/// Incrementally assembles a [`WorkflowGraph`]; all topology checks run in
/// [`GraphBuilder::build`].
pub struct GraphBuilder<S> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    order: Vec<String>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
    duplicates: Vec<String>,
}

impl<S> GraphBuilder<S> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            edges: HashMap::new(),
            entry: None,
            duplicates: Vec::new(),
        }
    }

    /// Register a node under a unique name.
    pub fn add_node(mut self, name: impl Into<String>, node: impl Node<S> + 'static) -> Self {
        let name = name.into();
        if self.nodes.contains_key(&name) {
            self.duplicates.push(name);
        } else {
            self.order.push(name.clone());
            self.nodes.insert(name, Box::new(node));
        }
        self
    }

    /// Register an unconditional edge. A node has at most one outgoing edge
    /// entry; registering another replaces it.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.insert(from.into(), Edge::Direct(to.into()));
        self
    }

    /// Register a conditional edge: `decide` picks a branch key, `branches`
    /// maps each key to a target node.
    pub fn add_conditional_edges<F>(
        mut self,
        from: impl Into<String>,
        decide: F,
        branches: &[(&str, &str)],
    ) -> Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        let branches = branches
            .iter()
            .map(|(key, to)| ((*key).to_string(), (*to).to_string()))
            .collect();
        self.edges.insert(
            from.into(),
            Edge::Conditional {
                decide: Box::new(decide),
                branches,
            },
        );
        self
    }

    /// Declare the node traversal starts from.
    pub fn set_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Validate the topology and produce an executable graph.
    ///
    /// Rejects duplicate node names, a missing or unregistered entry point,
    /// edges from or to unregistered nodes, and nodes unreachable from the
    /// entry point. Nodes without an outgoing edge are the finish points.
    pub fn build(self) -> Result<WorkflowGraph<S>, GraphError> {
        if let Some(name) = self.duplicates.into_iter().next() {
            return Err(GraphError::DuplicateNode { name });
        }

        let entry = self.entry.ok_or(GraphError::MissingEntryPoint)?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::UnknownEntryPoint { name: entry });
        }

        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(GraphError::UnknownEdgeSource { from: from.clone() });
            }
            match edge {
                Edge::Direct(to) => {
                    if !self.nodes.contains_key(to) {
                        return Err(GraphError::DanglingEdgeTarget {
                            from: from.clone(),
                            to: to.clone(),
                        });
                    }
                }
                Edge::Conditional { branches, .. } => {
                    for (branch, to) in branches {
                        if !self.nodes.contains_key(to) {
                            return Err(GraphError::DanglingBranchTarget {
                                from: from.clone(),
                                branch: branch.clone(),
                                to: to.clone(),
                            });
                        }
                    }
                }
            }
        }

        let mut reachable = HashSet::new();
        let mut queue = VecDeque::from([entry.clone()]);
        while let Some(name) = queue.pop_front() {
            if !reachable.insert(name.clone()) {
                continue;
            }
            match self.edges.get(&name) {
                Some(Edge::Direct(to)) => queue.push_back(to.clone()),
                Some(Edge::Conditional { branches, .. }) => {
                    for to in branches.values() {
                        queue.push_back(to.clone());
                    }
                }
                None => {}
            }
        }
        if let Some(name) = self.order.iter().find(|name| !reachable.contains(*name)) {
            return Err(GraphError::UnreachableNode { name: name.clone() });
        }

        Ok(WorkflowGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
        })
    }
}

impl<S> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Minimal state for graph tests: records the visit order.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Trace {
        pub visited: Vec<String>,
        pub branch: String,
    }

    /// Appends its name to the trace.
    pub struct Visit(pub &'static str);

    #[async_trait]
    impl Node<Trace> for Visit {
        async fn run(&self, mut state: Trace) -> AppResult<Trace> {
            state.visited.push(self.0.to_string());
            Ok(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{Trace, Visit};
    use super::*;

    #[test]
    fn test_build_requires_entry_point() {
        let err = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, GraphError::MissingEntryPoint);
    }

    #[test]
    fn test_build_rejects_unknown_entry_point() {
        let err = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .set_entry_point("missing")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownEntryPoint {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_duplicate_node() {
        let err = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .add_node("a", Visit("a"))
            .set_entry_point("a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateNode {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_dangling_edge_target() {
        let err = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .add_edge("a", "missing")
            .set_entry_point("a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingEdgeTarget {
                from: "a".to_string(),
                to: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_unknown_edge_source() {
        let err = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .add_edge("ghost", "a")
            .set_entry_point("a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownEdgeSource {
                from: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_dangling_branch_target() {
        let err = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .add_node("b", Visit("b"))
            .add_conditional_edges("a", |_: &Trace| "left".to_string(), &[("left", "missing")])
            .set_entry_point("a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingBranchTarget {
                from: "a".to_string(),
                branch: "left".to_string(),
                to: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_unreachable_node() {
        let err = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .add_node("island", Visit("island"))
            .set_entry_point("a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnreachableNode {
                name: "island".to_string()
            }
        );
    }

    #[test]
    fn test_build_accepts_linear_graph() {
        let graph = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .add_node("b", Visit("b"))
            .add_edge("a", "b")
            .set_entry_point("a")
            .build();
        assert!(graph.is_ok());
    }

    #[test]
    fn test_build_accepts_branches_as_reachability_edges() {
        let graph = GraphBuilder::<Trace>::new()
            .add_node("a", Visit("a"))
            .add_node("left", Visit("left"))
            .add_node("right", Visit("right"))
            .add_conditional_edges(
                "a",
                |state: &Trace| state.branch.clone(),
                &[("left", "left"), ("right", "right")],
            )
            .set_entry_point("a")
            .build();
        assert!(graph.is_ok());
    }
}
