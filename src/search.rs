//! Completion of partial tag addresses.
//!
//! The search keeps an explicit LIFO worklist instead of recursing. Each
//! expansion binds the leftmost unbound slot of the popped address, so every
//! address pushed has exactly one unbound slot fewer than its parent. With `k`
//! unbound slots and at most `B` candidates per slot the worklist sees at most
//! `(B^(k+1)-1)/(B-1)` addresses (`k+1` when `B = 1`), so the loop terminates.
//! Addresses whose slot has no candidates are dropped.
//!
//! Only membership of the result is meaningful; the order follows the
//! worklist. Duplicate rows from the catalog produce duplicate results.

use tracing::{debug, info};

use crate::adapter::CandidateSource;
use crate::address::TagAddress;
use crate::error::{AmiError, Result};

/// What a single [`Completion::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The popped address had no unbound slot and was moved to the results.
    Completed(TagAddress),
    /// The popped address was expanded on `slot`, pushing `produced` candidates.
    Expanded {
        address: TagAddress,
        slot: usize,
        produced: usize,
    },
}

pub struct CompletionSearch<S: CandidateSource> {
    source: S,
}

impl<S: CandidateSource> CompletionSearch<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
    pub fn source(&self) -> &S {
        &self.source
    }
    /// A search seeded with `seed`, to be driven step by step.
    pub fn start(&self, seed: TagAddress) -> Completion<'_, S> {
        Completion {
            source: &self.source,
            worklist: vec![seed],
            results: Vec::new(),
            calls: 0,
        }
    }
    /// Every complete address reachable from `partial`. Any source error
    /// aborts the search and no partial results are returned.
    pub fn complete_address(&self, partial: &TagAddress) -> Result<Vec<TagAddress>> {
        let mut completion = self.start(partial.clone());
        completion.run()?;
        info!(
            seed = %partial,
            results = completion.results().len(),
            calls = completion.calls(),
            "completion finished"
        );
        Ok(completion.into_results())
    }
    /// Completes each seed in turn, concatenating the results.
    pub fn complete_all<I>(&self, seeds: I) -> Result<Vec<TagAddress>>
    where
        I: IntoIterator<Item = TagAddress>,
    {
        let mut results = Vec::new();
        for seed in seeds {
            results.extend(self.complete_address(&seed)?);
        }
        Ok(results)
    }
}

pub struct Completion<'s, S: CandidateSource> {
    source: &'s S,
    worklist: Vec<TagAddress>,
    results: Vec<TagAddress>,
    calls: usize,
}

impl<S: CandidateSource> Completion<'_, S> {
    /// Addresses still waiting to be expanded, the next one last.
    pub fn frontier(&self) -> &[TagAddress] {
        &self.worklist
    }
    pub fn results(&self) -> &[TagAddress] {
        &self.results
    }
    /// Number of candidate lookups issued so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
    pub fn is_finished(&self) -> bool {
        self.worklist.is_empty()
    }
    /// Pops one address and either records it or expands it.
    /// Returns `None` once the worklist is empty.
    pub fn step(&mut self) -> Result<Option<Step>> {
        let Some(current) = self.worklist.pop() else {
            return Ok(None);
        };
        let Some(slot) = current.first_unbound_index() else {
            self.results.push(current.clone());
            return Ok(Some(Step::Completed(current)));
        };
        self.calls += 1;
        let candidates = self.source.find_slot_candidates(&current, slot)?;
        for candidate in &candidates {
            // a candidate may only add the value for `slot`
            let expected = candidate
                .slot(slot)
                .map(|value| current.with_slot_bound(slot, value))
                .transpose()?;
            if expected.as_ref() != Some(candidate) {
                return Err(AmiError::MalformedResponse(format!(
                    "candidate '{candidate}' does not bind slot {} of '{current}'",
                    slot + 1
                )));
            }
        }
        let produced = candidates.len();
        debug!(address = %current, slot, produced, "expanded");
        self.worklist.extend(candidates);
        Ok(Some(Step::Expanded {
            address: current,
            slot,
            produced,
        }))
    }
    pub fn run(&mut self) -> Result<()> {
        while self.step()?.is_some() {}
        Ok(())
    }
    pub fn into_results(self) -> Vec<TagAddress> {
        self.results
    }
}
