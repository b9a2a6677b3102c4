use std::collections::HashMap;

use tracing::debug;

use crate::error::{AppError, AppResult, GraphError};

use super::{Edge, Node};

/// A validated workflow graph, ready to execute.
///
/// Traversal starts at the entry point and follows edges until it reaches a
/// node with no outgoing edge. Nodes run strictly in sequence; each receives
/// the state the previous node returned.
pub struct WorkflowGraph<S> {
    pub(super) nodes: HashMap<String, Box<dyn Node<S>>>,
    pub(super) edges: HashMap<String, Edge<S>>,
    pub(super) entry: String,
}

impl<S> std::fmt::Debug for WorkflowGraph<S> {
    // Nodes and edges hold trait objects, so Debug cannot be derived.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowGraph")
            .field("entry", &self.entry)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<S: Send> WorkflowGraph<S> {
    /// Walk the graph from the entry point, threading `state` through each
    /// node, and return the state produced by the finish point.
    ///
    /// Every branch is mutually exclusive by construction, so a node executes
    /// at most once per invocation; a traversal that exceeds the node count
    /// has hit a cycle and is rejected.
    pub async fn run(&self, state: S) -> AppResult<S> {
        let max_steps = self.nodes.len();
        let mut state = state;
        let mut current = self.entry.clone();
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > max_steps {
                return Err(GraphError::CycleDetected { steps: max_steps }.into());
            }

            // Build-time validation guarantees every edge target is registered.
            let node = self.nodes.get(&current).ok_or_else(|| AppError::Internal {
                message: format!("node missing from validated graph: {}", current),
            })?;

            debug!(node = %current, step = steps, "Executing workflow node");
            state = node.run(state).await?;

            match self.edges.get(&current) {
                None => {
                    debug!(node = %current, "Reached finish point");
                    return Ok(state);
                }
                Some(Edge::Direct(next)) => {
                    current = next.clone();
                }
                Some(Edge::Conditional { decide, branches }) => {
                    let key = decide(&state);
                    match branches.get(&key) {
                        Some(next) => {
                            debug!(node = %current, branch = %key, next = %next, "Conditional dispatch");
                            current = next.clone();
                        }
                        None => {
                            return Err(GraphError::UnknownBranch {
                                from: current,
                                branch: key,
                            }
                            .into());
                        }
                    }
                }
            }
        }
    }
}
