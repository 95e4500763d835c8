//! The d-separation oracle: spec.md §4.1's ancestral-moralization test.
//!
//! This is the textbook moralization-based criterion, not an ad-hoc
//! open-path walker -- substituting one would silently change behavior on
//! colliders.

use fxhash::{FxHashMap, FxHashSet};

use crate::dag::Dag;

/// An undirected graph over a fixed vertex set, built once per query and
/// used only to answer a single reachability question.
struct Moral {
    adjacency: FxHashMap<String, FxHashSet<String>>,
}

impl Moral {
    fn new() -> Moral {
        Moral {
            adjacency: FxHashMap::default(),
        }
    }

    fn ensure(&mut self, v: &str) {
        self.adjacency.entry(v.to_string()).or_default();
    }

    fn add_edge(&mut self, a: &str, b: &str) {
        self.ensure(a);
        self.ensure(b);
        self.adjacency.get_mut(a).unwrap().insert(b.to_string());
        self.adjacency.get_mut(b).unwrap().insert(a.to_string());
    }

    fn remove_vertex(&mut self, v: &str) {
        if let Some(neighbors) = self.adjacency.remove(v) {
            for n in neighbors {
                if let Some(set) = self.adjacency.get_mut(&n) {
                    set.remove(v);
                }
            }
        }
    }

    fn has_path(&self, s: &str, t: &str) -> bool {
        if !self.adjacency.contains_key(s) || !self.adjacency.contains_key(t) {
            return false;
        }
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut frontier = vec![s];
        while let Some(v) = frontier.pop() {
            if v == t {
                return true;
            }
            if seen.insert(v) {
                if let Some(neighbors) = self.adjacency.get(v) {
                    frontier.extend(neighbors.iter().map(|n| n.as_str()));
                }
            }
        }
        false
    }
}

/// Returns true iff `s` and `t` are d-separated given `z` in `g`, per the
/// ancestral-moralization algorithm of spec.md §4.1:
///
/// 1. `s == t` is never separated.
/// 2. A vertex absent from the graph is vacuously separated from anything.
/// 3. Restrict to the ancestral closure of `{s, t} ∪ z`.
/// 4. Moralize: skeleton plus an edge between every pair of co-parents.
/// 5. Delete every vertex in `z`; if that deletes `s` or `t`, they're separated.
/// 6. True iff no path remains between `s` and `t`.
pub fn is_d_separated(g: &Dag, s: &str, t: &str, z: &FxHashSet<String>) -> bool {
    if s == t {
        return false;
    }
    if !g.contains(s) || !g.contains(t) {
        return true;
    }

    let mut relevant: FxHashSet<String> = z.clone();
    relevant.insert(s.to_string());
    relevant.insert(t.to_string());
    let ancestral = g.ancestors_of_set(relevant.iter().map(|v| v.as_str()));
    relevant.extend(ancestral);

    let mut moral = Moral::new();
    for v in &relevant {
        moral.ensure(v);
        for child in g.children_of(v) {
            if relevant.contains(child) {
                moral.add_edge(v, child);
            }
        }
        let parents: Vec<&str> = g.parents_of(v).filter(|p| relevant.contains(*p)).collect();
        for i in 0..parents.len() {
            for j in (i + 1)..parents.len() {
                moral.add_edge(parents[i], parents[j]);
            }
        }
    }

    for v in z {
        moral.remove_vertex(v);
    }

    !moral.has_path(s, t)
}
