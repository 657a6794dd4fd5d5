//! Class-level dependency graph.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Every edge is
//! recorded once through [`DependencyGraph::link`], which writes the efferent
//! and afferent side together, so `b ∈ a.efferents ⇔ a ∈ b.afferents` holds
//! without any separate bookkeeping.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::class::DecodedClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    classes: Vec<DecodedClass>,
    ids: HashMap<String, NodeId>,
    efferents: Vec<BTreeSet<NodeId>>,
    afferents: Vec<BTreeSet<NodeId>>,
    /// Nodes below this index were decoded; the rest are placeholders.
    decoded: usize,
}

impl DependencyGraph {
    /// Builds the graph for one analysis run.
    ///
    /// When two inputs decode to the same class name the first one is kept.
    pub fn assemble<I>(classes: I) -> Self
    where
        I: IntoIterator<Item = DecodedClass>,
    {
        let mut graph = Self::default();
        for class in classes {
            if graph.ids.contains_key(class.name()) {
                tracing::debug!(class = %class.name(), origin = ?class.origin(), "duplicate class ignored");
                continue;
            }
            graph.push(class);
        }
        graph.decoded = graph.classes.len();

        for source in 0..graph.decoded {
            let references: Vec<String> = graph.classes[source].references().iter().cloned().collect();
            for reference in references {
                let target = graph.intern(reference);
                graph.link(NodeId(source), target);
            }
        }

        tracing::debug!(
            decoded = graph.decoded,
            placeholders = graph.classes.len() - graph.decoded,
            "assembled dependency graph"
        );
        graph
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn decoded_len(&self) -> usize {
        self.decoded
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        debug_assert!(id.0 < self.classes.len(), "node id out of range");
        NodeRef { graph: self, id }
    }

    pub fn find(&self, name: &str) -> Option<NodeRef<'_>> {
        self.ids.get(name).map(|id| self.node(*id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.classes.len()).map(move |i| self.node(NodeId(i)))
    }

    fn push(&mut self, class: DecodedClass) -> NodeId {
        let id = NodeId(self.classes.len());
        self.ids.insert(class.name().to_string(), id);
        self.classes.push(class);
        self.efferents.push(BTreeSet::new());
        self.afferents.push(BTreeSet::new());
        id
    }

    /// Handle for `name`, creating a placeholder when it was never decoded.
    fn intern(&mut self, name: String) -> NodeId {
        match self.ids.get(&name) {
            Some(id) => *id,
            None => self.push(DecodedClass::placeholder(name)),
        }
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        if from == to {
            return;
        }
        self.efferents[from.0].insert(to);
        self.afferents[to.0].insert(from);
    }
}

/// Borrowed view of one node. Two views are equal when they name the same node.
#[derive(Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g DependencyGraph,
    id: NodeId,
}

impl<'g> NodeRef<'g> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'g str {
        self.class().name()
    }

    pub fn class(&self) -> &'g DecodedClass {
        &self.graph.classes[self.id.0]
    }

    /// True when the class was only ever referenced, never decoded.
    pub fn is_placeholder(&self) -> bool {
        self.id.0 >= self.graph.decoded
    }

    pub fn efferents(&self) -> impl Iterator<Item = NodeRef<'g>> + use<'g> {
        let graph = self.graph;
        graph.efferents[self.id.0]
            .iter()
            .map(move |id| graph.node(*id))
    }

    pub fn afferents(&self) -> impl Iterator<Item = NodeRef<'g>> + use<'g> {
        let graph = self.graph;
        graph.afferents[self.id.0]
            .iter()
            .map(move |id| graph.node(*id))
    }

    pub fn depends_on(&self, other: &NodeRef<'_>) -> bool {
        self.graph.efferents[self.id.0].contains(&other.id)
    }

    /// Ce: number of classes this class depends on.
    pub fn efferent_coupling(&self) -> usize {
        self.graph.efferents[self.id.0].len()
    }

    /// Ca: number of classes that depend on this class.
    pub fn afferent_coupling(&self) -> usize {
        self.graph.afferents[self.id.0].len()
    }

    pub fn instability(&self) -> f64 {
        instability(self.afferent_coupling(), self.efferent_coupling())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl Hash for NodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id.0)
            .field("name", &self.name())
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// I = Ce / (Ca + Ce); 0 for an isolated node.
pub fn instability(afferent: usize, efferent: usize) -> f64 {
    let total = afferent + efferent;
    if total == 0 {
        0.0
    } else {
        efferent as f64 / total as f64
    }
}
