use fxhash::FxHashSet;
use im::{OrdMap, OrdSet};

/// A cycle that was detected and broken while building a `Dag`.
///
/// `edge_removed` is the `(tail, head)` edge that was deleted to break the
/// cycle; `cycle` is the simple cycle it was found in, starting at the
/// vertex the DFS revisited. The caller (the CLI) is expected to log this
/// via `log::warn!`; the core itself never prints (spec.md §3.1, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleWarning {
    pub cycle: Vec<String>,
    pub edge_removed: (String, String),
}

/// A finite labeled DAG over variable-name vertices.
///
/// All mutators (`bar`, `underline`) return a fresh `Dag`; the adjacency
/// maps use `im`'s persistent collections so that producing a modified copy
/// shares most of its structure with the original rather than deep-cloning,
/// matching the "pure value, no caller mutation" contract of spec.md §4.2
/// and §5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dag {
    children: OrdMap<String, OrdSet<String>>,
    parents: OrdMap<String, OrdSet<String>>,
}

impl Dag {
    fn empty() -> Dag {
        Dag {
            children: OrdMap::new(),
            parents: OrdMap::new(),
        }
    }

    fn ensure_vertex(&mut self, v: &str) {
        self.children.entry(v.to_string()).or_insert_with(OrdSet::new);
        self.parents.entry(v.to_string()).or_insert_with(OrdSet::new);
    }

    fn add_edge(&mut self, tail: &str, head: &str) {
        self.ensure_vertex(tail);
        self.ensure_vertex(head);
        self.children.entry(tail.to_string()).or_default().insert(head.to_string());
        self.parents.entry(head.to_string()).or_default().insert(tail.to_string());
    }

    fn remove_edge(&mut self, tail: &str, head: &str) {
        if let Some(set) = self.children.get_mut(tail) {
            set.remove(head);
        }
        if let Some(set) = self.parents.get_mut(head) {
            set.remove(tail);
        }
    }

    /// Builds a DAG from a parent -> children adjacency map. If the input
    /// contains cycles, they are detected and broken deterministically:
    /// for each simple cycle found, the edge from the cycle's last vertex
    /// to its first is removed (spec.md §3.1). Returns the repaired DAG
    /// plus a warning for every cycle that was broken.
    pub fn build<S, I>(parents_to_children: &std::collections::HashMap<S, I>) -> (Dag, Vec<CycleWarning>)
    where
        S: AsRef<str> + std::hash::Hash + Eq,
        I: AsRef<[S]>,
    {
        let mut dag = Dag::empty();
        for (parent, children) in parents_to_children {
            dag.ensure_vertex(parent.as_ref());
            for child in children.as_ref() {
                dag.add_edge(parent.as_ref(), child.as_ref());
            }
        }

        let mut warnings = vec![];
        while let Some(cycle) = dag.find_cycle() {
            let tail = cycle.last().unwrap().clone();
            let head = cycle.first().unwrap().clone();
            dag.remove_edge(&tail, &head);
            warnings.push(CycleWarning {
                cycle,
                edge_removed: (tail, head),
            });
        }
        (dag, warnings)
    }

    /// Finds one simple cycle via DFS, visiting children in sorted order
    /// for determinism. Returns the cycle as the sequence of vertices
    /// visited from its start back to (but not including) the repeat.
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            InProgress,
            Done,
        }
        let mut mark: std::collections::HashMap<&str, Mark> = std::collections::HashMap::new();
        let mut stack: Vec<String> = vec![];

        fn visit<'a>(
            dag: &'a Dag,
            v: &'a str,
            mark: &mut std::collections::HashMap<&'a str, Mark>,
            stack: &mut Vec<String>,
        ) -> Option<Vec<String>> {
            if let Some(Mark::InProgress) = mark.get(v) {
                let start = stack.iter().position(|x| x == v).unwrap();
                return Some(stack[start..].to_vec());
            }
            if let Some(Mark::Done) = mark.get(v) {
                return None;
            }
            mark.insert(v, Mark::InProgress);
            stack.push(v.to_string());
            if let Some(children) = dag.children.get(v) {
                for child in children {
                    if let Some(cycle) = visit(dag, child, mark, stack) {
                        return Some(cycle);
                    }
                }
            }
            stack.pop();
            mark.insert(v, Mark::Done);
            None
        }

        for v in self.children.keys() {
            if mark.contains_key(v.as_str()) {
                continue;
            }
            if let Some(cycle) = visit(self, v, &mut mark, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }

    pub fn contains(&self, v: &str) -> bool {
        self.children.contains_key(v)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(|s| s.as_str())
    }

    pub fn children_of(&self, v: &str) -> impl Iterator<Item = &str> {
        self.children.get(v).into_iter().flatten().map(|s| s.as_str())
    }

    pub fn parents_of(&self, v: &str) -> impl Iterator<Item = &str> {
        self.parents.get(v).into_iter().flatten().map(|s| s.as_str())
    }

    /// The ancestors of `v`, not including `v` itself.
    pub fn ancestors(&self, v: &str) -> FxHashSet<String> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut frontier: Vec<&str> = self.parents_of(v).collect();
        while let Some(p) = frontier.pop() {
            if seen.insert(p.to_string()) {
                frontier.extend(self.parents_of(p));
            }
        }
        seen
    }

    /// The ancestors of every vertex in `vs`, unioned together, not
    /// including the members of `vs` themselves.
    pub fn ancestors_of_set<'a>(&self, vs: impl Iterator<Item = &'a str>) -> FxHashSet<String> {
        let mut result = FxHashSet::default();
        for v in vs {
            result.extend(self.ancestors(v));
        }
        result
    }

    /// True iff there is a directed path from `from` to `to` (inclusive of
    /// the trivial zero-length case when they're equal). Used by Rule 3's
    /// ancestor test and by the `suggest` collaborator.
    pub fn reachable(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut frontier = vec![from];
        while let Some(v) = frontier.pop() {
            if v == to {
                return true;
            }
            if seen.insert(v) {
                frontier.extend(self.children_of(v));
            }
        }
        false
    }

    /// `G` with every edge whose head is in `s` removed ("overbar on s").
    pub fn bar(&self, s: &FxHashSet<String>) -> Dag {
        let mut dag = self.clone();
        for head in s {
            let tails: Vec<String> = dag.parents_of(head).map(|p| p.to_string()).collect();
            for tail in tails {
                dag.remove_edge(&tail, head);
            }
        }
        dag
    }

    /// `G` with every edge whose tail is in `s` removed ("underbar on s").
    pub fn underline(&self, s: &FxHashSet<String>) -> Dag {
        let mut dag = self.clone();
        for tail in s {
            let heads: Vec<String> = dag.children_of(tail).map(|c| c.to_string()).collect();
            for head in heads {
                dag.remove_edge(tail, &head);
            }
        }
        dag
    }
}
