//! Elementary cycle enumeration
//!
//! Johnson's algorithm over nodes ranked by identity. Strongly connected
//! components of the whole graph are computed once and searched one at a
//! time; components that cannot hold a cycle are skipped. Inside a component
//! the search rooted at rank `s` only walks the strongly connected component
//! of `s` within the members of rank `>= s`, so each elementary cycle is
//! reported once, from its smallest identity. Blocked nodes stay blocked
//! until a cycle is found through them.
//!
//! The walk uses an explicit frame stack; long dependency chains never grow
//! the call stack.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::DependencyGraph;
use crate::model::Cycle;

/// How often (in search steps) the wall clock is consulted.
const CLOCK_CHECK_INTERVAL: u64 = 256;

/// Limits on cycle enumeration. Dense graphs can hold exponentially many
/// elementary cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleBudget {
    pub max_cycles: Option<usize>,
    pub time_budget: Option<Duration>,
}

impl CycleBudget {
    pub fn unbounded() -> Self {
        CycleBudget::default()
    }

    pub fn with_max_cycles(max_cycles: usize) -> Self {
        CycleBudget {
            max_cycles: Some(max_cycles),
            time_budget: None,
        }
    }
}

/// Cycles found, in ascending canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub cycles: Vec<Cycle>,
    /// Set when a budget or cancellation cut the search short.
    pub partial: bool,
}

/// Enumerate every elementary cycle within `budget`.
pub fn find_cycles(graph: &DependencyGraph, budget: CycleBudget) -> CycleReport {
    CycleSearch::new(graph, budget, None).run()
}

/// Like [`find_cycles`], also stopping as soon as `cancel` is set.
pub fn find_cycles_cancellable(
    graph: &DependencyGraph,
    budget: CycleBudget,
    cancel: &AtomicBool,
) -> CycleReport {
    CycleSearch::new(graph, budget, Some(cancel)).run()
}

struct Frame {
    node: usize,
    next: usize,
    found: bool,
}

struct CycleSearch<'a> {
    /// Identity per rank.
    names: Vec<&'a str>,
    /// Successor ranks per rank, ascending.
    adjacency: Vec<Vec<usize>>,
    budget: CycleBudget,
    cancel: Option<&'a AtomicBool>,
    started: Instant,
    steps: u64,
    found: BTreeSet<Cycle>,
    partial: bool,
}

impl<'a> CycleSearch<'a> {
    fn new(graph: &'a DependencyGraph, budget: CycleBudget, cancel: Option<&'a AtomicBool>) -> Self {
        let mut ranked: Vec<_> = graph.nodes().collect();
        ranked.sort_by(|a, b| a.identity.cmp(&b.identity));

        let mut rank_of = vec![0usize; graph.nodes().map(|n| n.id.0 as usize + 1).max().unwrap_or(0)];
        for (rank, node) in ranked.iter().enumerate() {
            rank_of[node.id.0 as usize] = rank;
        }

        let adjacency = ranked
            .iter()
            .map(|node| {
                let mut next: Vec<usize> = graph
                    .successors(node.id)
                    .map(|id| rank_of[id.0 as usize])
                    .collect();
                next.sort_unstable();
                next.dedup();
                next
            })
            .collect();

        CycleSearch {
            names: ranked.iter().map(|n| n.identity.as_str()).collect(),
            adjacency,
            budget,
            cancel,
            started: Instant::now(),
            steps: 0,
            found: BTreeSet::new(),
            partial: false,
        }
    }

    fn run(mut self) -> CycleReport {
        let n = self.names.len();
        let mut blocked = vec![false; n];
        let mut blocked_by: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut touched = Vec::new();
        let mut members = vec![false; n];
        let mut local = vec![usize::MAX; n];

        'components: for component in self.cyclic_components() {
            let mut start = 0;
            while start < component.len() {
                if self.should_stop() {
                    break 'components;
                }
                let Some((root, scc)) = self.next_component(&component[start..], &mut local) else {
                    break;
                };
                for &rank in &scc {
                    members[rank] = true;
                }
                let completed =
                    self.search_from(root, &members, &mut blocked, &mut blocked_by, &mut touched);
                for &rank in &scc {
                    members[rank] = false;
                }
                for v in touched.drain(..) {
                    blocked[v] = false;
                    blocked_by[v].clear();
                }
                if !completed {
                    break 'components;
                }
                start = component.partition_point(|&rank| rank <= root);
            }
        }

        if self.partial {
            tracing::warn!(
                "Cycle enumeration stopped early after {} cycles; results are partial",
                self.found.len()
            );
        } else {
            tracing::debug!("Found {} elementary cycles", self.found.len());
        }

        CycleReport {
            cycles: self.found.into_iter().collect(),
            partial: self.partial,
        }
    }

    /// Strongly connected components of the whole graph that can carry a
    /// cycle, each as ascending ranks, ordered by their smallest rank.
    fn cyclic_components(&self) -> Vec<Vec<usize>> {
        let n = self.names.len();
        let mut whole: DiGraph<(), ()> = DiGraph::with_capacity(n, 0);
        for _ in 0..n {
            whole.add_node(());
        }
        for (v, next) in self.adjacency.iter().enumerate() {
            for &w in next {
                whole.add_edge(NodeIndex::new(v), NodeIndex::new(w), ());
            }
        }

        let mut components: Vec<Vec<usize>> = kosaraju_scc(&whole)
            .into_iter()
            .map(|scc| {
                let mut ranks: Vec<usize> = scc.iter().map(|idx| idx.index()).collect();
                ranks.sort_unstable();
                ranks
            })
            .filter(|ranks| self.can_cycle(ranks))
            .collect();
        components.sort_unstable_by_key(|ranks| ranks[0]);
        tracing::debug!("{} strongly connected components hold cycles", components.len());
        components
    }

    /// More than one member, or a single member with a self edge.
    fn can_cycle(&self, ranks: &[usize]) -> bool {
        match ranks {
            [] => false,
            [single] => self.adjacency[*single].binary_search(single).is_ok(),
            _ => true,
        }
    }

    /// Within `scope` (ascending ranks of one component, already cut to ranks
    /// `>= start`), the strongly connected component holding the smallest
    /// rank that can carry a cycle. Returns that rank and the component.
    ///
    /// `local` maps ranks to subgraph indices and is left all `usize::MAX`.
    fn next_component(&self, scope: &[usize], local: &mut [usize]) -> Option<(usize, Vec<usize>)> {
        let mut sub: DiGraph<(), ()> = DiGraph::with_capacity(scope.len(), 0);
        for (i, &rank) in scope.iter().enumerate() {
            local[rank] = i;
            sub.add_node(());
        }
        for (i, &v) in scope.iter().enumerate() {
            for &w in &self.adjacency[v] {
                if local[w] != usize::MAX {
                    sub.add_edge(NodeIndex::new(i), NodeIndex::new(local[w]), ());
                }
            }
        }
        for &rank in scope {
            local[rank] = usize::MAX;
        }

        kosaraju_scc(&sub)
            .into_iter()
            .map(|scc| {
                let mut ranks: Vec<usize> = scc.iter().map(|idx| scope[idx.index()]).collect();
                ranks.sort_unstable();
                ranks
            })
            .filter(|ranks| self.can_cycle(ranks))
            .min_by_key(|ranks| ranks[0])
            .map(|ranks| (ranks[0], ranks))
    }

    /// Johnson's circuit search from `root`. Returns `false` when the search
    /// must stop entirely.
    fn search_from(
        &mut self,
        root: usize,
        members: &[bool],
        blocked: &mut [bool],
        blocked_by: &mut [Vec<usize>],
        touched: &mut Vec<usize>,
    ) -> bool {
        let mut frames = vec![Frame {
            node: root,
            next: 0,
            found: false,
        }];
        let mut path = vec![root];
        blocked[root] = true;
        touched.push(root);

        while let Some(top) = frames.last() {
            if self.should_stop() {
                return false;
            }
            let v = top.node;
            let successor = self.adjacency[v].get(top.next).copied();
            let depth = frames.len() - 1;

            match successor {
                Some(w) => {
                    frames[depth].next += 1;
                    if !members[w] {
                        continue;
                    }
                    if w == root {
                        frames[depth].found = true;
                        if !self.record(&path) {
                            return false;
                        }
                    } else if !blocked[w] {
                        blocked[w] = true;
                        touched.push(w);
                        path.push(w);
                        frames.push(Frame {
                            node: w,
                            next: 0,
                            found: false,
                        });
                    }
                }
                None => {
                    let found = frames[depth].found;
                    frames.pop();
                    path.pop();
                    if found {
                        unblock(v, blocked, blocked_by);
                    } else {
                        for &w in &self.adjacency[v] {
                            if members[w] && !blocked_by[w].contains(&v) {
                                blocked_by[w].push(v);
                                touched.push(w);
                            }
                        }
                    }
                    if let Some(parent) = frames.last_mut() {
                        parent.found |= found;
                    }
                }
            }
        }
        true
    }

    /// Store the cycle on `path`. Returns `false` when the cycle budget is
    /// already spent.
    fn record(&mut self, path: &[usize]) -> bool {
        if let Some(max) = self.budget.max_cycles {
            if self.found.len() >= max {
                self.partial = true;
                return false;
            }
        }
        let names = path.iter().map(|&r| self.names[r].to_string()).collect();
        if let Some(cycle) = Cycle::canonical(names) {
            self.found.insert(cycle);
        }
        true
    }

    fn should_stop(&mut self) -> bool {
        let step = self.steps;
        self.steps += 1;
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            self.partial = true;
            return true;
        }
        if let Some(limit) = self.budget.time_budget {
            if step % CLOCK_CHECK_INTERVAL == 0 && self.started.elapsed() >= limit {
                self.partial = true;
                return true;
            }
        }
        false
    }
}

/// Clear `start`'s block and, transitively, every node waiting on it.
fn unblock(start: usize, blocked: &mut [bool], blocked_by: &mut [Vec<usize>]) {
    let mut pending = vec![start];
    while let Some(u) = pending.pop() {
        blocked[u] = false;
        for w in std::mem::take(&mut blocked_by[u]) {
            if blocked[w] {
                pending.push(w);
            }
        }
    }
}
