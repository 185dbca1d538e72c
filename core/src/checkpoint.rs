//! Checkpoint window — the most recent simulated ticks, oldest first.
//!
//! A checkpoint is the full snapshot *after* its tick's update. The window
//! is an owned arena: new checkpoints are pushed at the back, overflow is
//! dropped from the front, and rollback truncates from the back.

use crate::types::Tick;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct TickState<S> {
    pub tick:  Tick,
    pub state: S,
}

impl<S> TickState<S> {
    pub fn new(tick: Tick, state: S) -> Self {
        Self { tick, state }
    }
}

#[derive(Debug, Clone)]
pub struct CheckpointWindow<S> {
    items:    VecDeque<TickState<S>>,
    capacity: usize,
}

impl<S> CheckpointWindow<S> {
    /// A window holding only `seed`. `capacity` must be at least 1.
    pub(crate) fn seeded(seed: TickState<S>, capacity: usize) -> Self {
        let mut items = VecDeque::with_capacity(capacity.saturating_add(1));
        items.push_back(seed);
        Self { items, capacity }
    }

    /// Append a checkpoint, then drop the oldest ones beyond capacity.
    /// Returns how many were dropped.
    pub(crate) fn push(&mut self, checkpoint: TickState<S>) -> usize {
        debug_assert!(
            self.newest().is_none_or(|newest| newest.tick < checkpoint.tick),
            "checkpoints must be pushed in increasing tick order"
        );
        self.items.push_back(checkpoint);

        let overflow = self.items.len().saturating_sub(self.capacity);
        self.items.drain(..overflow);
        overflow
    }

    /// Keep checkpoints up to and including `tick`, if `tick` is retained.
    ///
    /// Returns `None` when no checkpoint has exactly that tick, otherwise the
    /// number of checkpoints discarded.
    pub(crate) fn truncate_after(&mut self, tick: Tick) -> Option<usize> {
        let index = self.items.iter().rposition(|item| item.tick == tick)?;
        let discarded = self.items.len() - (index + 1);
        self.items.truncate(index + 1);
        Some(discarded)
    }

    pub fn get(&self, index: usize) -> Option<&TickState<S>> {
        self.items.get(index)
    }

    pub fn oldest(&self) -> Option<&TickState<S>> { self.items.front() }
    pub fn newest(&self) -> Option<&TickState<S>> { self.items.back() }
    pub fn len(&self) -> usize                    { self.items.len() }
    pub fn is_empty(&self) -> bool                { self.items.is_empty() }
    pub fn capacity(&self) -> usize               { self.capacity }

    pub fn iter(&self) -> impl Iterator<Item = &TickState<S>> {
        self.items.iter()
    }

    pub fn ticks(&self) -> Vec<Tick> {
        self.items.iter().map(|item| item.tick).collect()
    }

    /// True when every checkpoint is exactly one tick after the previous.
    pub fn is_contiguous(&self) -> bool {
        self.items
            .iter()
            .zip(self.items.iter().skip(1))
            .all(|(a, b)| b.tick == a.tick + 1)
    }
}
