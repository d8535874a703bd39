//! Convenience wrapper over the host's channel link graph.

use crate::host::LinkGraph;
use crate::ids::ChannelRef;

/// Borrowed view onto a [`LinkGraph`] that reports refusals as `false`
/// instead of surfacing errors. Link edits are best-effort setup work;
/// callers that care about the reason use the trait directly. Adding a
/// link that is already in place is a success on the host side, not a
/// refusal.
pub struct ChannelLinks<'a> {
    graph: &'a mut dyn LinkGraph,
}

impl<'a> ChannelLinks<'a> {
    pub fn new(graph: &'a mut dyn LinkGraph) -> Self {
        Self { graph }
    }

    pub fn add(&mut self, from: ChannelRef, to: ChannelRef) -> bool {
        match self.graph.add_link(from, to) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("link {from} -> {to} refused: {err}");
                false
            }
        }
    }

    pub fn remove(&mut self, from: ChannelRef, to: ChannelRef) -> bool {
        match self.graph.remove_link(from, to) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("unlink {from} -> {to} refused: {err}");
                false
            }
        }
    }

    pub fn targets(&self, from: ChannelRef) -> Vec<ChannelRef> {
        self.graph.forward_links(from)
    }
}
