//! # Selection Accumulator
//!
//! Gathers candidate outputs page by page until the requested quantity is
//! covered. Pure: reservation happens afterwards, all at once.

use crate::domain::{StateRef, UnspentOutput};
use std::collections::HashSet;

/// Running total of outputs gathered during one selection attempt.
#[derive(Debug, Default)]
pub struct Accumulator {
    required: u64,
    gathered: u64,
    selected: Vec<UnspentOutput>,
    seen: HashSet<StateRef>,
}

impl Accumulator {
    /// Start gathering towards `required`.
    pub fn new(required: u64) -> Self {
        Self {
            required,
            ..Default::default()
        }
    }

    /// Add one output. Duplicates and zero-quantity outputs are ignored.
    ///
    /// Returns `true` once the required quantity is covered.
    pub fn offer(&mut self, output: UnspentOutput) -> bool {
        if self.is_satisfied() {
            return true;
        }
        if output.quantity() > 0 && self.seen.insert(output.state_ref) {
            self.gathered = self.gathered.saturating_add(output.quantity());
            self.selected.push(output);
        }
        self.is_satisfied()
    }

    /// Add a page of outputs, stopping mid-page once satisfied.
    pub fn offer_page<I>(&mut self, outputs: I) -> bool
    where
        I: IntoIterator<Item = UnspentOutput>,
    {
        for output in outputs {
            if self.offer(output) {
                return true;
            }
        }
        self.is_satisfied()
    }

    /// Check if the gathered quantity covers the requirement.
    ///
    /// An empty selection never counts as satisfied.
    pub fn is_satisfied(&self) -> bool {
        !self.selected.is_empty() && self.gathered >= self.required
    }

    /// Quantity gathered so far.
    pub fn gathered(&self) -> u64 {
        self.gathered
    }

    /// Refs of the gathered outputs, in gathering order.
    pub fn refs(&self) -> Vec<StateRef> {
        self.selected.iter().map(|o| o.state_ref).collect()
    }

    /// Consume the accumulator, yielding the gathered outputs.
    pub fn into_outputs(self) -> Vec<UnspentOutput> {
        self.selected
    }
}
