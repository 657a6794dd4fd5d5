//! Re-projection of the class graph onto a coarser key, typically the package.
//!
//! Groups are numbered up front in key order, so coupling edges between groups
//! can be stored as [`GroupId`] sets from the start. An edge whose two ends map
//! to the same key is dropped: a group never depends on itself.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::{DependencyGraph, NodeRef, instability};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct GroupNode<K> {
    pub key: K,
    pub member_count: usize,
    efferents: BTreeSet<GroupId>,
    afferents: BTreeSet<GroupId>,
}

#[derive(Debug, Clone)]
pub struct Grouping<K> {
    groups: Vec<GroupNode<K>>,
    ids: BTreeMap<K, GroupId>,
}

/// Groups classes by package name; classes without one share `Default`.
pub fn by_package(node: &NodeRef<'_>) -> String {
    node.class().package().to_string()
}

/// Identity grouping: one group per class.
pub fn by_class(node: &NodeRef<'_>) -> String {
    node.name().to_string()
}

impl DependencyGraph {
    pub fn group_by<K, F>(&self, extractor: F) -> Grouping<K>
    where
        K: Ord + Clone,
        F: Fn(&NodeRef<'_>) -> K,
    {
        let keys: Vec<K> = self.nodes().map(|n| extractor(&n)).collect();

        let mut members: BTreeMap<K, Vec<NodeRef<'_>>> = BTreeMap::new();
        for (node, key) in self.nodes().zip(keys.iter()) {
            members.entry(key.clone()).or_default().push(node);
        }

        let ids: BTreeMap<K, GroupId> = members
            .keys()
            .enumerate()
            .map(|(i, key)| (key.clone(), GroupId(i)))
            .collect();
        let group_of = |node: &NodeRef<'_>| ids[&keys[node.id().index()]];

        let groups = members
            .iter()
            .map(|(key, nodes)| {
                let own = ids[key];
                let mut efferents = BTreeSet::new();
                let mut afferents = BTreeSet::new();
                for node in nodes {
                    efferents.extend(node.efferents().map(|n| group_of(&n)).filter(|g| *g != own));
                    afferents.extend(node.afferents().map(|n| group_of(&n)).filter(|g| *g != own));
                }
                GroupNode {
                    key: key.clone(),
                    member_count: nodes.len(),
                    efferents,
                    afferents,
                }
            })
            .collect();

        Grouping { groups, ids }
    }
}

impl<K: Ord> Grouping<K> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = GroupRef<'_, K>> + '_ {
        (0..self.groups.len()).map(move |i| GroupRef {
            grouping: self,
            id: GroupId(i),
        })
    }

    pub fn get(&self, key: &K) -> Option<GroupRef<'_, K>> {
        self.ids.get(key).map(|id| GroupRef {
            grouping: self,
            id: *id,
        })
    }

    /// Sets of groups that depend on each other in a cycle, each sorted by key.
    pub fn cycles(&self) -> Vec<Vec<&K>> {
        let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(self.groups.len(), 0);
        for _ in &self.groups {
            graph.add_node(());
        }
        for (i, group) in self.groups.iter().enumerate() {
            for target in &group.efferents {
                graph.add_edge(NodeIndex::new(i), NodeIndex::new(target.0), ());
            }
        }

        let mut cycles: Vec<Vec<&K>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut keys: Vec<&K> = scc.iter().map(|n| &self.groups[n.index()].key).collect();
                keys.sort();
                keys
            })
            .collect();
        cycles.sort();
        cycles
    }
}

pub struct GroupRef<'a, K> {
    grouping: &'a Grouping<K>,
    id: GroupId,
}

impl<K> Clone for GroupRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for GroupRef<'_, K> {}

impl<'a, K> GroupRef<'a, K> {
    fn group(&self) -> &'a GroupNode<K> {
        &self.grouping.groups[self.id.0]
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn key(&self) -> &'a K {
        &self.group().key
    }

    pub fn member_count(&self) -> usize {
        self.group().member_count
    }

    pub fn efferents(&self) -> impl Iterator<Item = GroupRef<'a, K>> + use<'a, K> {
        let grouping = self.grouping;
        self.group().efferents.iter().map(move |id| GroupRef {
            grouping,
            id: *id,
        })
    }

    pub fn afferents(&self) -> impl Iterator<Item = GroupRef<'a, K>> + use<'a, K> {
        let grouping = self.grouping;
        self.group().afferents.iter().map(move |id| GroupRef {
            grouping,
            id: *id,
        })
    }

    pub fn efferent_coupling(&self) -> usize {
        self.group().efferents.len()
    }

    pub fn afferent_coupling(&self) -> usize {
        self.group().afferents.len()
    }

    pub fn instability(&self) -> f64 {
        instability(self.afferent_coupling(), self.efferent_coupling())
    }
}

impl<K> PartialEq for GroupRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K> Eq for GroupRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for GroupRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRef")
            .field("key", self.key())
            .field("member_count", &self.member_count())
            .finish()
    }
}
