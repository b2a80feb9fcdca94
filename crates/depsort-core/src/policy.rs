//! Edge-breaking policies.
//!
//! When a cycle stops the sort, the sorter offers attached edges one at a
//! time to an [`EdgeBreaker`] and detaches the ones it accepts. A breaker is
//! a pure decision: it is asked at most once per edge and must not assume
//! anything about which edges it will or will not see.

use crate::graph::EdgeData;
use crate::id::EdgeId;

/// Decides whether an edge may be sacrificed to unblock a cycle.
pub trait EdgeBreaker<E> {
    fn should_break(&mut self, id: EdgeId, edge: &EdgeData<E>) -> bool;
}

impl<E, F> EdgeBreaker<E> for F
where
    F: FnMut(&EdgeData<E>) -> bool,
{
    fn should_break(&mut self, _id: EdgeId, edge: &EdgeData<E>) -> bool {
        self(edge)
    }
}

/// Refuses every edge. Sorting with it behaves like sorting without a
/// breaker, except that every edge still attached when breaking starts is
/// offered once.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverBreak;

impl<E> EdgeBreaker<E> for NeverBreak {
    fn should_break(&mut self, _id: EdgeId, _edge: &EdgeData<E>) -> bool {
        false
    }
}

/// Accepts every edge it is offered.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakAll;

impl<E> EdgeBreaker<E> for BreakAll {
    fn should_break(&mut self, _id: EdgeId, _edge: &EdgeData<E>) -> bool {
        true
    }
}

/// Accepts only edges whose source and target are the same node.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakSelfLoops;

impl<E> EdgeBreaker<E> for BreakSelfLoops {
    fn should_break(&mut self, _id: EdgeId, edge: &EdgeData<E>) -> bool {
        edge.is_self_loop()
    }
}
