//! Read-only view of the prerequisite graph, used for `status` output.

use anyhow::Result;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

use crate::core::DepwrightError;
use crate::registry::Registry;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Prerequisite graph of a registry. Edges point from a dependency to its
/// prerequisites.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Builds the graph, failing on prerequisites that are not in the registry.
    pub fn from_registry(registry: &Registry) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for dependency in registry {
            let index = graph.add_node(dependency.key.clone());
            node_map.insert(dependency.key.clone(), index);
        }

        for dependency in registry {
            let from = node_map[&dependency.key];
            for prerequisite in &dependency.requires {
                let to = *node_map.get(prerequisite).ok_or_else(|| DepwrightError::UnknownPrerequisite {
                    dependency: dependency.key.clone(),
                    prerequisite: prerequisite.clone(),
                })?;
                if !graph.contains_edge(from, to) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Ok(Self {
            graph,
            node_map,
        })
    }

    /// Fails with the first cycle found.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path = Vec::new();

        for node in self.graph.node_indices() {
            if colors.get(&node) == Some(&Color::White)
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                return Err(DepwrightError::CircularDependency {
                    chain: cycle.join(" → "),
                }
                .into());
            }
        }
        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<String>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        // Visit prerequisites in declaration order
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.reverse();

        for neighbor in neighbors {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| self.graph[*n].clone()).collect();
                    cycle.push(self.graph[neighbor].clone());
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Keys ordered so that prerequisites come before their dependents.
    pub fn install_order(&self) -> Result<Vec<String>> {
        self.detect_cycles()?;

        let indices = toposort(&self.graph, None).map_err(|cycle| DepwrightError::CircularDependency {
            chain: self.graph[cycle.node_id()].clone(),
        })?;
        Ok(indices.into_iter().rev().map(|index| self.graph[index].clone()).collect())
    }

    /// Direct prerequisites of `key`, in declaration order.
    #[must_use]
    pub fn prerequisites(&self, key: &str) -> Vec<String> {
        let Some(&index) = self.node_map.get(key) else {
            return Vec::new();
        };
        // petgraph iterates edges newest first
        let mut prerequisites: Vec<String> =
            self.graph.neighbors(index).map(|n| self.graph[n].clone()).collect();
        prerequisites.reverse();
        prerequisites
    }

    /// Keys nothing else requires, in declaration order.
    #[must_use]
    pub fn roots(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|index| self.graph.neighbors_directed(*index, Direction::Incoming).next().is_none())
            .map(|index| self.graph[index].clone())
            .collect()
    }

    /// Renders `root` and its prerequisites as a tree.
    #[must_use]
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = format!("{root}\n");
        let mut visited = HashSet::from([root.to_string()]);
        let prerequisites = self.prerequisites(root);
        for (i, prerequisite) in prerequisites.iter().enumerate() {
            self.build_tree_string(prerequisite, &mut result, "", i == prerequisites.len() - 1, &mut visited);
        }
        result
    }

    fn build_tree_string(
        &self,
        key: &str,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{key}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(key.to_string()) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let prerequisites = self.prerequisites(key);
        for (i, prerequisite) in prerequisites.iter().enumerate() {
            self.build_tree_string(prerequisite, result, &child_prefix, i == prerequisites.len() - 1, visited);
        }
        visited.remove(key);
    }
}
