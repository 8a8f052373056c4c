//! Lazy views over the parent chain and the subtree of a dispatcher.

use crate::{
    dispatcher::Dispatcher,
    node::{NodeId, NodeRef},
};
use std::{collections::HashSet, iter::FusedIterator, sync::Arc};

/// The ancestors of a dispatcher, nearest first.
///
/// Each step resolves the next parent lazily, so a parent detached while
/// iterating ends the sequence early. Clone the iterator to restart from the
/// same point.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<Arc<Dispatcher>>,
}

impl Ancestors {
    pub(crate) fn new(first: Option<Arc<Dispatcher>>) -> Self {
        Self { next: first }
    }
}

impl Iterator for Ancestors {
    type Item = Arc<Dispatcher>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl FusedIterator for Ancestors {}

/// Every node reachable through children, in pre-order.
///
/// A dispatcher's children are read when the dispatcher itself is yielded.
/// Override slots are not part of the subtree.
pub struct Descendants {
    stack: Vec<NodeRef>,
    expanded: HashSet<NodeId>,
}

impl Descendants {
    pub(crate) fn new(mut children: Vec<NodeRef>) -> Self {
        children.reverse();
        Self {
            stack: children,
            expanded: HashSet::new(),
        }
    }
}

impl Iterator for Descendants {
    type Item = NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(dispatcher) = node.as_dispatcher() {
            if self.expanded.insert(dispatcher.id()) {
                self.stack.extend(dispatcher.children().into_iter().rev());
            }
        }
        Some(node)
    }
}

impl FusedIterator for Descendants {}

impl std::fmt::Debug for Descendants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descendants")
            .field("pending", &self.stack.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, Priority, StorageOption};

    fn named(name: &str) -> Arc<Dispatcher> {
        Dispatcher::builder().name(name).build()
    }

    #[test]
    fn test_no_parent_means_no_ancestors() {
        let d = Dispatcher::new();
        assert_eq!(d.ancestors().count(), 0);
    }

    #[test]
    fn test_ancestors_run_nearest_to_furthest() {
        let root = named("root");
        let middle = named("middle");
        let leaf = named("leaf");
        root.attach(middle.clone(), Priority::MEDIUM, StorageOption::Strong).unwrap();
        middle.attach(leaf.clone(), Priority::MEDIUM, StorageOption::Strong).unwrap();

        let names: Vec<_> = leaf.ancestors().map(|a| a.label().to_string()).collect();
        assert_eq!(names, vec!["middle", "root"]);

        let ancestors = leaf.ancestors();
        assert_eq!(ancestors.clone().count(), ancestors.count());
    }

    #[test]
    fn test_descendants_walk_the_subtree_in_pre_order() {
        let a = named("a");
        let b = named("b");
        let c = named("c");
        let d = named("d");
        a.attach(b.clone(), Priority::HIGH, StorageOption::Strong).unwrap();
        a.attach(c.clone(), Priority::LOW, StorageOption::Strong).unwrap();
        b.attach(d.clone(), Priority::MEDIUM, StorageOption::Strong).unwrap();

        let names: Vec<_> = a.descendants().map(|n| n.label().to_string()).collect();
        assert_eq!(names, vec!["b", "d", "c"]);
    }
}
