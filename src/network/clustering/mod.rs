// https://github.com/graphext/louvain-rs/tree/master
// Copyright 2018 Juan Morales (crispamares@gmail.com)
// Repository: https://github.com/graphext/louvain-rs/tree/master
// Licensed under the MIT License.
use std::fmt::Debug;

/// Assignment of network nodes to groups, with group ids kept contiguous from 0.
pub trait NetworkGrouping: Debug + Send + Sync {
    /// Every node in its own group.
    fn create_isolated(node_count: usize) -> Self;

    fn from_assignments(assignments: &[usize]) -> Self;

    fn get_group(&self, node: usize) -> usize;

    fn set_group(&mut self, node: usize, group: usize);

    fn node_count(&self) -> usize;

    fn group_count(&self) -> usize;

    /// Renumbers groups so that ids are `0..group_count` without gaps, in order of first use.
    fn normalize_groups(&mut self);

    /// Replaces each node's group by the group its current group has in `arrangement`,
    /// i.e. maps the nodes through an aggregated level.
    fn merge<G: NetworkGrouping>(&mut self, arrangement: &G) {
        for node in 0..self.node_count() {
            let group = arrangement.get_group(self.get_group(node));
            self.set_group(node, group);
        }
        self.normalize_groups();
    }

    fn assignments(&self) -> Vec<usize> {
        (0..self.node_count()).map(|node| self.get_group(node)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorGrouping {
    assignments: Vec<usize>,
    group_count: usize,
}

impl VectorGrouping {
    pub fn into_assignments(self) -> Vec<usize> {
        self.assignments
    }
}

impl NetworkGrouping for VectorGrouping {
    fn create_isolated(node_count: usize) -> Self {
        VectorGrouping {
            assignments: (0..node_count).collect(),
            group_count: node_count,
        }
    }

    fn from_assignments(assignments: &[usize]) -> Self {
        let mut grouping = VectorGrouping {
            assignments: assignments.to_vec(),
            group_count: assignments.iter().max().map_or(0, |&max| max + 1),
        };
        grouping.normalize_groups();
        grouping
    }

    #[inline]
    fn get_group(&self, node: usize) -> usize {
        self.assignments[node]
    }

    #[inline]
    fn set_group(&mut self, node: usize, group: usize) {
        self.assignments[node] = group;
        self.group_count = self.group_count.max(group + 1);
    }

    #[inline]
    fn node_count(&self) -> usize {
        self.assignments.len()
    }

    #[inline]
    fn group_count(&self) -> usize {
        self.group_count
    }

    fn normalize_groups(&mut self) {
        let mut new_ids = vec![usize::MAX; self.group_count];
        let mut next_id = 0;

        for group in self.assignments.iter_mut() {
            if new_ids[*group] == usize::MAX {
                new_ids[*group] = next_id;
                next_id += 1;
            }
            *group = new_ids[*group];
        }

        self.group_count = next_id;
    }

    fn assignments(&self) -> Vec<usize> {
        self.assignments.clone()
    }
}
