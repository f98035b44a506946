//! Graph views over a dependency system: the identity-level graph used for
//! cycle reports, and the tree of resolved elements.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::system::DependencySystem;

/// Identity-level graph: one node per element set, an edge from each set to
/// every set it requires.
pub struct SetGraph {
    graph: DiGraph<String, ()>,
}

impl SetGraph {
    pub fn from_system(system: &DependencySystem) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for set in system.element_sets() {
            index.insert(set.id(), graph.add_node(set.id().to_string()));
        }
        for set in system.element_sets() {
            let from = index[set.id()];
            for required in set.required().ids() {
                if let Some(&to) = index.get(required) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        Self { graph }
    }

    /// One shortest cycle per strongly connected component, each starting
    /// at the component's smallest identity. The closing edge back to the
    /// first identity is implied.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.graph.contains_edge(component[0], component[0])
            })
            .filter_map(|component| {
                let start = *component.iter().min_by_key(|&&idx| &self.graph[idx])?;
                let members: HashSet<NodeIndex> = component.into_iter().collect();
                self.shortest_cycle(start, &members)
            })
            .collect();
        cycles.sort();
        cycles
    }

    fn shortest_cycle(&self, start: NodeIndex, members: &HashSet<NodeIndex>) -> Option<Vec<String>> {
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for edge in self.graph.edges(current) {
                let next = edge.target();
                if next == start {
                    let mut path = vec![current];
                    while let Some(&prev) = parent.get(path.last()?) {
                        path.push(prev);
                    }
                    path.reverse();
                    return Some(path.into_iter().map(|idx| self.graph[idx].clone()).collect());
                }
                if members.contains(&next) && !parent.contains_key(&next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// A resolved element in the tree.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ResolvedNode {
    pub id: String,
    pub version: String,
}

impl ResolvedNode {
    /// `id@version`.
    pub fn key(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }
}

impl fmt::Display for ResolvedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// Edge label: whether the dependency was declared optional.
#[derive(Debug, Clone)]
pub struct DepEdge {
    pub optional: bool,
}

/// Resolved elements linked to the versions their dependencies resolved to.
pub struct ResolvedTree {
    graph: DiGraph<ResolvedNode, DepEdge>,
    /// `id@version` to node.
    index: BTreeMap<String, NodeIndex>,
}

impl ResolvedTree {
    pub fn from_system(system: &DependencySystem) -> Self {
        let mut graph = DiGraph::new();
        let mut index = BTreeMap::new();
        let resolved = system.resolved();
        for element in &resolved {
            let node = ResolvedNode {
                id: element.id().to_string(),
                version: element.version().to_string(),
            };
            index.insert(node.key(), graph.add_node(node));
        }
        for element in &resolved {
            let from = index[&format!("{element}")];
            let Some(resolutions) = system.resolved_dependencies(element) else {
                continue;
            };
            for (dep, resolution) in element.dependencies().iter().zip(resolutions) {
                let Some(version) = resolution.version() else {
                    continue;
                };
                let key = format!("{}@{version}", dep.required_id());
                if let Some(&to) = index.get(&key) {
                    if !graph.edges(from).any(|e| e.target() == to) {
                        graph.add_edge(
                            from,
                            to,
                            DepEdge {
                                optional: dep.is_optional(),
                            },
                        );
                    }
                }
            }
        }
        Self { graph, index }
    }

    /// Resolved elements nothing else depends on, in key order.
    pub fn tops(&self) -> Vec<NodeIndex> {
        self.index
            .values()
            .copied()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        let mut deps: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect();
        deps.sort_by(|a, b| self.graph[a.0].key().cmp(&self.graph[b.0].key()));
        deps
    }

    fn dependents_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut dependents: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect();
        dependents.sort_by(|a, b| self.graph[*a].key().cmp(&self.graph[*b].key()));
        dependents
    }

    /// Nodes matching `key`: an exact `id@version`, or every resolved
    /// version of an identity.
    fn lookup(&self, key: &str) -> Vec<NodeIndex> {
        if let Some(&idx) = self.index.get(key) {
            return vec![idx];
        }
        self.index
            .values()
            .copied()
            .filter(|&idx| self.graph[idx].id == key)
            .collect()
    }

    /// Render every top element and what it pulls in, `max_depth` levels
    /// deep.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let mut visited = HashSet::new();
        for top in self.tops() {
            output.push_str(&format!("{}\n", self.graph[top]));
            visited.insert(top);
            let deps = self.dependencies_of(top);
            let count = deps.len();
            for (i, (child, edge)) in deps.into_iter().enumerate() {
                self.print_subtree(
                    &mut output,
                    child,
                    edge,
                    "",
                    i == count - 1,
                    1,
                    max_depth,
                    &mut visited,
                );
            }
            visited.remove(&top);
        }
        output
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: &DepEdge,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let suffix = if edge.optional { " (optional)" } else { "" };
        output.push_str(&format!("{prefix}{connector}{}{suffix}\n", self.graph[idx]));

        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, edge)) in deps.into_iter().enumerate() {
            self.print_subtree(
                output,
                child,
                edge,
                &child_prefix,
                i == count - 1,
                depth + 1,
                max_depth,
                visited,
            );
        }
        visited.remove(&idx);
    }

    /// Render who depends on `key`, one tree per matching resolved version.
    pub fn print_inverted_tree(&self, key: &str) -> String {
        let mut output = String::new();
        for idx in self.lookup(key) {
            output.push_str(&format!("{}\n", self.graph[idx]));
            let mut visited = HashSet::from([idx]);
            let dependents = self.dependents_of(idx);
            let count = dependents.len();
            for (i, dependent) in dependents.into_iter().enumerate() {
                self.print_inverted_subtree(&mut output, dependent, "", i == count - 1, &mut visited);
            }
        }
        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, dependent) in dependents.into_iter().enumerate() {
            self.print_inverted_subtree(output, dependent, &child_prefix, i == count - 1, visited);
        }
        visited.remove(&idx);
    }

    /// Every resolved element that something depends on, followed by its
    /// direct dependents.
    pub fn print_full_inverted_tree(&self) -> String {
        let mut output = String::new();
        for &idx in self.index.values() {
            let dependents = self.dependents_of(idx);
            if dependents.is_empty() {
                continue;
            }
            output.push_str(&format!("{}\n", self.graph[idx]));
            let count = dependents.len();
            for (i, dependent) in dependents.into_iter().enumerate() {
                let connector = if i == count - 1 { "└── " } else { "├── " };
                output.push_str(&format!("{connector}{}\n", self.graph[dependent]));
            }
            output.push('\n');
        }
        output
    }

    /// A chain from a top element down to `key`, if `key` is resolved.
    pub fn find_path(&self, key: &str) -> Option<Vec<&ResolvedNode>> {
        let targets: HashSet<NodeIndex> = self.lookup(key).into_iter().collect();
        if targets.is_empty() {
            return None;
        }
        for top in self.tops() {
            let mut path = Vec::new();
            let mut visited = HashSet::new();
            if self.dfs_path(top, &targets, &mut path, &mut visited) {
                return Some(path.into_iter().map(|idx| &self.graph[idx]).collect());
            }
        }
        None
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        targets: &HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if targets.contains(&current) {
            return true;
        }
        if visited.insert(current) {
            for (child, _) in self.dependencies_of(current) {
                if self.dfs_path(child, targets, path, visited) {
                    return true;
                }
            }
        }
        path.pop();
        false
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
