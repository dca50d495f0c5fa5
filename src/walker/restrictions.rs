//! Walk restrictions: predicates and skip flags

use std::fmt;

/// Boxed node predicate.
pub type Predicate<'a, N> = Box<dyn Fn(&N) -> bool + 'a>;

/// Immutable configuration for one walk. Everything defaults to permissive.
///
/// - `root`: a node the walk may not leave. Backward walks stop right after
///   returning it; forward walks do not ascend past it.
/// - `leaf`: a node that is returned but never descended into.
/// - `visit`: nodes failing it are stepped through but never returned.
pub struct Restrictions<'a, N> {
    pub(crate) root: Option<Predicate<'a, N>>,
    pub(crate) leaf: Option<Predicate<'a, N>>,
    pub(crate) visit: Option<Predicate<'a, N>>,
    pub(crate) skip_initial_ancestry: bool,
    pub(crate) skip_initial_subtree: bool,
}

impl<'a, N> Restrictions<'a, N> {
    pub fn new() -> Self {
        Self {
            root: None,
            leaf: None,
            visit: None,
            skip_initial_ancestry: false,
            skip_initial_subtree: false,
        }
    }

    pub fn root(mut self, predicate: impl Fn(&N) -> bool + 'a) -> Self {
        self.root = Some(Box::new(predicate));
        self
    }

    pub fn leaf(mut self, predicate: impl Fn(&N) -> bool + 'a) -> Self {
        self.leaf = Some(Box::new(predicate));
        self
    }

    pub fn visit(mut self, predicate: impl Fn(&N) -> bool + 'a) -> Self {
        self.visit = Some(Box::new(predicate));
        self
    }

    /// Do not return the start node's ancestors during a backward walk.
    pub fn skip_initial_ancestry(mut self, skip: bool) -> Self {
        self.skip_initial_ancestry = skip;
        self
    }

    /// Treat the start node as if it had no descendants.
    pub fn skip_initial_subtree(mut self, skip: bool) -> Self {
        self.skip_initial_subtree = skip;
        self
    }

    pub(crate) fn is_root(&self, node: &N) -> bool {
        self.root.as_ref().is_some_and(|p| p(node))
    }

    pub(crate) fn is_leaf(&self, node: &N) -> bool {
        self.leaf.as_ref().is_some_and(|p| p(node))
    }

    pub(crate) fn allows_visit(&self, node: &N) -> bool {
        self.visit.as_ref().is_none_or(|p| p(node))
    }
}

impl<N> Default for Restrictions<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for Restrictions<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restrictions")
            .field("root", &self.root.is_some())
            .field("leaf", &self.leaf.is_some())
            .field("visit", &self.visit.is_some())
            .field("skip_initial_ancestry", &self.skip_initial_ancestry)
            .field("skip_initial_subtree", &self.skip_initial_subtree)
            .finish()
    }
}
