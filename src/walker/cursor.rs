//! TreeWalker - the stateful pre-order cursor

use std::iter::FusedIterator;

use serde::Serialize;
use tracing::trace;

use crate::provider::TreeProvider;

use super::phase::Phase;
use super::restrictions::Restrictions;

/// Direction of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

/// Snapshot of the walker's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerState<N> {
    pub node: Option<N>,
    pub phase: Phase,
}

/// Pre-order cursor over a `TreeProvider`.
///
/// The start node must exist in the provider; this is not checked.
/// Iteration yields the state after each step and is fused: once the walk
/// runs out of nodes every further call returns `None`.
pub struct TreeWalker<'a, P: TreeProvider> {
    provider: &'a P,
    node: Option<P::Node>,
    phase: Phase,
    direction: Direction,
    initial: P::Node,
    backward_ancestor: Option<P::Node>,
    restrictions: Restrictions<'a, P::Node>,
}

impl<'a, P: TreeProvider> TreeWalker<'a, P> {
    pub fn new(
        provider: &'a P,
        start: P::Node,
        direction: Direction,
        restrictions: Restrictions<'a, P::Node>,
    ) -> Self {
        let backward_ancestor = provider.parent(&start);
        Self {
            provider,
            node: Some(start.clone()),
            phase: Phase::Initial,
            direction,
            initial: start,
            backward_ancestor,
            restrictions,
        }
    }

    /// Unrestricted walk in `direction`.
    pub fn unrestricted(provider: &'a P, start: P::Node, direction: Direction) -> Self {
        Self::new(provider, start, direction, Restrictions::default())
    }

    /// Current node without advancing. `None` once the walk is exhausted.
    pub fn node(&self) -> Option<&P::Node> {
        self.node.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> WalkerState<P::Node> {
        WalkerState {
            node: self.node.clone(),
            phase: self.phase,
        }
    }

    /// Advance to the next visitable node and return the new state.
    ///
    /// After exhaustion the returned state has `node == None`, and stays so.
    pub fn advance(&mut self) -> WalkerState<P::Node> {
        while let Some(current) = self.node.take() {
            if self.direction == Direction::Backward && self.restrictions.is_root(&current) {
                trace!(node = ?current, "backward walk reached root");
                break;
            }
            self.node = match self.direction {
                Direction::Forward => self.forward_from(current),
                Direction::Backward => self.backward_from(current),
            };
            match &self.node {
                Some(n) if self.should_visit(n) => break,
                Some(_) => continue,
                None => {
                    trace!(phase = %self.phase, "walk exhausted");
                    break;
                }
            }
        }
        self.state()
    }

    fn should_visit(&self, node: &P::Node) -> bool {
        if self.restrictions.skip_initial_ancestry && self.phase == Phase::Ancestor {
            return false;
        }
        if self.restrictions.skip_initial_subtree
            && self.phase != Phase::Ancestor
            && self.phase != Phase::Other
        {
            return false;
        }
        self.restrictions.allows_visit(node)
    }

    fn forward_from(&mut self, node: P::Node) -> Option<P::Node> {
        let provider = self.provider;

        if !self.restrictions.is_leaf(&node) {
            if let Some(child) = provider.first_child(&node) {
                if self.phase == Phase::Initial {
                    self.phase = Phase::Descendant;
                }
                let skipping = self.restrictions.skip_initial_subtree
                    && self.phase.is_within_initial_subtree();
                if !skipping {
                    if self.phase.is_within_initial_subtree() {
                        self.phase = if self.restrictions.is_leaf(&child) {
                            Phase::Leaf
                        } else {
                            Phase::Descendant
                        };
                    }
                    return Some(child);
                }
            }
        }

        let mut search = Some(node);
        while let Some(current) = search {
            // Crossed out of the initial subtree, by sibling or by parent.
            if current == self.initial {
                self.phase = Phase::Other;
            }
            if let Some(sibling) = provider.next_sibling(&current) {
                if self.phase.is_within_initial_subtree() {
                    self.phase = Phase::Sibling;
                }
                return Some(sibling);
            }
            let parent = provider.parent(&current);
            if let Some(p) = &parent {
                if *p == self.initial {
                    self.phase = Phase::Other;
                }
                if self.restrictions.is_root(p) && !self.phase.is_within_initial_subtree() {
                    break;
                }
            }
            search = parent;
        }
        None
    }

    fn backward_from(&mut self, node: P::Node) -> Option<P::Node> {
        let provider = self.provider;

        if let Some(mut previous) = provider.previous_sibling(&node) {
            self.phase = Phase::Other;
            while !self.restrictions.is_leaf(&previous) {
                match provider.last_child(&previous) {
                    Some(child) => previous = child,
                    None => break,
                }
            }
            return Some(previous);
        }

        let parent = provider.parent(&node)?;
        if self.backward_ancestor.as_ref() == Some(&parent) {
            self.phase = Phase::Ancestor;
            self.backward_ancestor = provider.parent(&parent);
        }
        Some(parent)
    }
}

impl<P: TreeProvider> Iterator for TreeWalker<'_, P> {
    type Item = WalkerState<P::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        self.node.as_ref()?;
        let state = self.advance();
        state.node.is_some().then_some(state)
    }
}

impl<P: TreeProvider> FusedIterator for TreeWalker<'_, P> {}
