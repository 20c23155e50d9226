//! Trace-driven fetch stage.
//!
//! Holds the sequence of fetch addresses the pipeline will request. The
//! simulator presents `current` and `next` to the cache each cycle and only
//! advances once a word has been delivered.

use std::collections::VecDeque;

use crate::common::VirtAddr;
use crate::common::constants::INSTRUCTION_SIZE_32;

/// Ordered fetch addresses with a cursor at the one being fetched.
#[derive(Debug, Clone, Default)]
pub struct FetchStream {
    pcs: VecDeque<VirtAddr>,
    fetched: usize,
}

impl FetchStream {
    /// Creates a stream over raw addresses.
    pub fn from_addrs<I: IntoIterator<Item = u64>>(addrs: I) -> Self {
        Self {
            pcs: addrs.into_iter().map(VirtAddr::new).collect(),
            fetched: 0,
        }
    }

    /// Address being fetched, `None` once the stream is exhausted.
    pub fn current(&self) -> Option<VirtAddr> {
        self.pcs.front().copied()
    }

    /// Address that becomes current if this cycle advances.
    ///
    /// At the end of the stream this is the sequential successor, as a real
    /// fetch stage would keep going.
    pub fn peek_next(&self) -> VirtAddr {
        self.pcs.get(1).copied().unwrap_or_else(|| {
            self.current().map_or(VirtAddr::default(), |pc| {
                VirtAddr::new(pc.val().wrapping_add(INSTRUCTION_SIZE_32))
            })
        })
    }

    /// Retires the current address.
    pub fn advance(&mut self) {
        if self.pcs.pop_front().is_some() {
            self.fetched += 1;
        }
    }

    /// Redirect: the current fetch is abandoned and `target` takes its place.
    pub fn redirect(&mut self, target: VirtAddr) {
        let _ = self.pcs.pop_front();
        self.pcs.push_front(target);
    }

    /// Addresses not yet fetched.
    pub fn remaining(&self) -> usize {
        self.pcs.len()
    }

    /// Addresses retired so far.
    pub const fn fetched(&self) -> usize {
        self.fetched
    }

    /// True once every address has been fetched.
    pub fn is_done(&self) -> bool {
        self.pcs.is_empty()
    }
}
