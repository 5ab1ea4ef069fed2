//! Prerequisite graph.
//!
//! Two edge families over course codes:
//! - **same-term** prerequisites, satisfied by an earlier completion or by
//!   concurrent enrollment in the same term;
//! - **prior-term** prerequisites, which must already be completed.
//!
//! Requirement data may contain cycles, so every traversal is iterative with
//! a visited set. Cycle detection uses Kahn's algorithm; a cycle is a data
//! error reported by [`crate::validation`], never resolved here.
//!
//! # Reference
//! Kahn (1962), "Topological sorting of large networks"

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::models::RequirementSet;

/// Adjacency maps keyed by course code: course → prerequisites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerequisiteGraph {
    same_term: BTreeMap<String, BTreeSet<String>>,
    prior_term: BTreeMap<String, BTreeSet<String>>,
}

impl PrerequisiteGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a requirement set's `prereqs` and
    /// `multiSemesterPrereqs`.
    pub fn from_requirements(requirements: &RequirementSet) -> Self {
        let mut graph = Self::new();
        for p in &requirements.prereqs {
            for req in &p.requires {
                graph.add_same_term(&p.course, req);
            }
        }
        for p in &requirements.multi_semester_prereqs {
            for req in &p.requires {
                graph.add_prior_term(&p.course, req);
            }
        }
        graph
    }

    /// `course` requires `requires`, completed or taken concurrently.
    pub fn add_same_term(&mut self, course: &str, requires: &str) {
        self.same_term
            .entry(course.to_string())
            .or_default()
            .insert(requires.to_string());
    }

    /// `course` requires `requires` completed in an earlier term.
    pub fn add_prior_term(&mut self, course: &str, requires: &str) {
        self.prior_term
            .entry(course.to_string())
            .or_default()
            .insert(requires.to_string());
    }

    /// Direct prerequisites of either family.
    pub fn prerequisites(&self, course: &str) -> BTreeSet<String> {
        self.same_term
            .get(course)
            .into_iter()
            .chain(self.prior_term.get(course))
            .flatten()
            .cloned()
            .collect()
    }

    /// Prior-term prerequisites of `course` not yet completed.
    pub fn missing_prior(&self, course: &str, completed: &BTreeSet<String>) -> Vec<String> {
        self.prior_term
            .get(course)
            .map(|reqs| reqs.iter().filter(|r| !completed.contains(*r)).cloned().collect())
            .unwrap_or_default()
    }

    /// Whether every direct prerequisite of `course` is already completed.
    pub fn is_satisfied_by(&self, course: &str, completed: &BTreeSet<String>) -> bool {
        self.prerequisites(course).iter().all(|p| completed.contains(p))
    }

    /// Transitive prerequisites of `course` (both families), excluding
    /// `course` itself.
    pub fn closure(&self, course: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<String> = self.prerequisites(course).into_iter().collect();

        while let Some(next) = stack.pop() {
            if next == course || !seen.insert(next.clone()) {
                continue;
            }
            stack.extend(self.prerequisites(&next));
        }
        seen
    }

    /// Courses in `selected` whose same-term prerequisites are neither
    /// completed nor themselves satisfiable within the selection.
    ///
    /// Runs to a fixed point: removing one course may strand another that
    /// depended on it. Returns course → missing prerequisites.
    pub fn unsatisfied_concurrent(
        &self,
        selected: &BTreeSet<String>,
        completed: &BTreeSet<String>,
    ) -> BTreeMap<String, Vec<String>> {
        let mut remaining = selected.clone();
        let mut dropped = BTreeMap::new();

        loop {
            let mut stranded = Vec::new();
            for course in &remaining {
                let missing: Vec<String> = self
                    .same_term
                    .get(course)
                    .map(|reqs| {
                        reqs.iter()
                            .filter(|r| !completed.contains(*r) && !remaining.contains(*r))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                if !missing.is_empty() {
                    stranded.push((course.clone(), missing));
                }
            }
            if stranded.is_empty() {
                return dropped;
            }
            for (course, missing) in stranded {
                remaining.remove(&course);
                dropped.insert(course, missing);
            }
        }
    }

    /// Courses that sit on a dependency cycle, if any.
    ///
    /// Kahn's algorithm over the union of both edge families; whatever
    /// cannot be ordered lies on or behind a cycle.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut nodes: BTreeSet<&str> = BTreeSet::new();
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for edges in [&self.same_term, &self.prior_term] {
            for (course, reqs) in edges {
                nodes.insert(course);
                for req in reqs {
                    nodes.insert(req);
                    *in_degree.entry(course.as_str()).or_default() += 1;
                    dependents.entry(req.as_str()).or_default().push(course.as_str());
                }
            }
        }

        let mut queue: VecDeque<&str> = nodes
            .iter()
            .copied()
            .filter(|n| in_degree.get(n).copied().unwrap_or(0) == 0)
            .collect();
        let mut ordered = 0usize;

        while let Some(node) = queue.pop_front() {
            ordered += 1;
            for &dep in dependents.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(d) = in_degree.get_mut(dep) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(dep);
                    }
                }
            }
        }

        if ordered == nodes.len() {
            return None;
        }
        let stuck: Vec<String> = in_degree
            .iter()
            .filter(|(_, d)| **d > 0)
            .map(|(n, _)| n.to_string())
            .collect();
        Some(stuck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prereq;

    fn completed(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|s| s.to_string()).collect()
    }

    fn pitt_graph() -> PrerequisiteGraph {
        let reqs = RequirementSet::new()
            .with_multi_semester_prereq(Prereq::new("CS1550", &["CS0449", "CS0447"]))
            .with_multi_semester_prereq(Prereq::new("CS1501", &["CS0441", "CS0445"]))
            .with_multi_semester_prereq(Prereq::new("CS0445", &["CS0441"]))
            .with_prereq(Prereq::new("MATH0230", &["MATH0220"]));
        PrerequisiteGraph::from_requirements(&reqs)
    }

    #[test]
    fn test_missing_prior() {
        let g = pitt_graph();
        assert_eq!(
            g.missing_prior("CS1501", &completed(&["CS0441"])),
            vec!["CS0445".to_string()]
        );
        assert!(g.missing_prior("CS1501", &completed(&["CS0441", "CS0445"])).is_empty());
        assert!(g.missing_prior("CS0401", &completed(&[])).is_empty());
    }

    #[test]
    fn test_is_satisfied_by() {
        let g = pitt_graph();
        assert!(!g.is_satisfied_by("MATH0230", &completed(&[])));
        assert!(g.is_satisfied_by("MATH0230", &completed(&["MATH0220"])));
        assert!(g.is_satisfied_by("HIST0100", &completed(&[])));
    }

    #[test]
    fn test_closure() {
        let g = pitt_graph();
        let c = g.closure("CS1501");
        assert_eq!(c, completed(&["CS0441", "CS0445"]));
    }

    #[test]
    fn test_concurrent_fixed_point() {
        let mut g = PrerequisiteGraph::new();
        g.add_same_term("B", "A");
        g.add_same_term("C", "B");

        // A missing → B stranded → C stranded
        let selected = completed(&["B", "C"]);
        let dropped = g.unsatisfied_concurrent(&selected, &completed(&[]));
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped["B"], vec!["A".to_string()]);

        // Concurrent enrollment satisfies
        let selected = completed(&["A", "B", "C"]);
        assert!(g.unsatisfied_concurrent(&selected, &completed(&[])).is_empty());

        // Completion satisfies
        let selected = completed(&["B", "C"]);
        assert!(g.unsatisfied_concurrent(&selected, &completed(&["A"])).is_empty());
    }

    #[test]
    fn test_no_cycle() {
        assert!(pitt_graph().find_cycle().is_none());
    }

    #[test]
    fn test_cycle_detected() {
        let mut g = PrerequisiteGraph::new();
        g.add_same_term("A", "B");
        g.add_prior_term("B", "C");
        g.add_same_term("C", "A");
        g.add_same_term("D", "A"); // behind the cycle

        let stuck = g.find_cycle().unwrap();
        assert!(stuck.contains(&"A".to_string()));
        assert!(stuck.contains(&"C".to_string()));

        // closure terminates despite the cycle
        assert_eq!(g.closure("A"), completed(&["B", "C"]));
    }
}
