//! Node tree abstraction and leaf traversal
//!
//! The aggregation only needs two questions answered per node: what are its
//! children, and does it carry a visual geometry. Both are explicit queries on
//! the [`NodeTree`] trait so traversal can run against any host model.

/// Width and height of a node with a visual geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width * height`, signs preserved.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Read-only view of a tree element.
pub trait NodeTree: Sized {
    /// Child sequence, or `None` when the node has no children attribute at all.
    fn children(&self) -> Option<&[Self]>;

    /// Geometry, present only when both width and height are known.
    fn geometry(&self) -> Option<Geometry>;

    /// A node is a leaf when it has no children attribute or an empty one.
    fn is_leaf(&self) -> bool {
        self.children().map_or(true, |c| c.is_empty())
    }
}

/// Depth-first, pre-order iterator over the leaves below a set of roots.
pub struct Leaves<'a, N> {
    stack: Vec<&'a N>,
}

impl<'a, N: NodeTree> Iterator for Leaves<'a, N> {
    type Item = &'a N;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }
            if let Some(children) = node.children() {
                // reversed so the first child is visited first
                self.stack.extend(children.iter().rev());
            }
        }
        None
    }
}

/// Iterate over every leaf reachable from `roots`, in document order.
pub fn leaves<N: NodeTree>(roots: &[N]) -> Leaves<'_, N> {
    Leaves {
        stack: roots.iter().rev().collect(),
    }
}

/// Sum of `width * height` over every leaf below `roots` that has a geometry.
///
/// Leaves without geometry contribute nothing. Values are not clamped.
pub fn leaf_area<N: NodeTree>(roots: &[N]) -> f64 {
    leaves(roots)
        .map(|leaf| match leaf.geometry() {
            Some(g) => g.area(),
            None => {
                log::trace!("leaf without geometry skipped");
                0.0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct T {
        id: u32,
        children: Option<Vec<T>>,
        geometry: Option<Geometry>,
    }

    impl NodeTree for T {
        fn children(&self) -> Option<&[Self]> {
            self.children.as_deref()
        }

        fn geometry(&self) -> Option<Geometry> {
            self.geometry
        }
    }

    fn leaf(id: u32, w: f64, h: f64) -> T {
        T { id, children: None, geometry: Some(Geometry::new(w, h)) }
    }

    #[test]
    fn empty_children_is_leaf() {
        let bare = T { id: 1, children: None, geometry: None };
        let empty = T { id: 2, children: Some(vec![]), geometry: None };
        assert!(bare.is_leaf());
        assert!(empty.is_leaf());
        let parent = T { id: 3, children: Some(vec![bare]), geometry: None };
        assert!(!parent.is_leaf());
    }

    #[test]
    fn leaves_are_visited_once_in_document_order() {
        let roots = vec![
            T {
                id: 1,
                children: Some(vec![
                    leaf(2, 1.0, 1.0),
                    T { id: 3, children: Some(vec![leaf(4, 1.0, 1.0)]), geometry: None },
                ]),
                geometry: None,
            },
            leaf(5, 1.0, 1.0),
        ];
        let ids: Vec<u32> = leaves(&roots).map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 4, 5]);
    }

    #[test]
    fn parent_geometry_is_ignored() {
        let roots = vec![T {
            id: 1,
            children: Some(vec![leaf(2, 3.0, 4.0), leaf(3, 5.0, 6.0)]),
            geometry: Some(Geometry::new(100.0, 100.0)),
        }];
        assert_eq!(leaf_area(&roots), 42.0);
    }

    // A host that folds collapsed groups into a single leaf.
    struct Collapsible {
        collapsed: bool,
        children: Option<Vec<Collapsible>>,
        geometry: Option<Geometry>,
    }

    impl NodeTree for Collapsible {
        fn children(&self) -> Option<&[Self]> {
            self.children.as_deref()
        }

        fn geometry(&self) -> Option<Geometry> {
            self.geometry
        }

        fn is_leaf(&self) -> bool {
            self.collapsed || self.children().map_or(true, |c| c.is_empty())
        }
    }

    #[test]
    fn traversal_follows_overridden_leaf_predicate() {
        let inner = Collapsible {
            collapsed: false,
            children: None,
            geometry: Some(Geometry::new(1.0, 1.0)),
        };
        let roots = vec![Collapsible {
            collapsed: true,
            children: Some(vec![inner]),
            geometry: Some(Geometry::new(3.0, 3.0)),
        }];
        assert_eq!(leaves(&roots).count(), 1);
        assert_eq!(leaf_area(&roots), 9.0);
    }

    #[test]
    fn negative_and_zero_dimensions_are_summed_as_is() {
        let roots = vec![leaf(1, -2.0, 5.0), leaf(2, 0.0, 9.0), leaf(3, 4.0, 4.0)];
        assert_eq!(leaf_area(&roots), 6.0);
    }
}
