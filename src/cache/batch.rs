//! Per-element position cache in front of a wave position source.

use std::time::Instant;

use glam::Vec3;

use super::stats::CacheStats;
use super::validate::{validate_positions, PositionValidation};
use super::BubbleData;
use crate::params::WaveMatrixSettings;
use crate::wave::{WaveField, WavePositionSource};

/// A cached entry is reused only if computed within this much of the query time
const TIME_EPSILON: f32 = 1e-6;

/// Cached wave positions for up to `max_elements` bubbles.
///
/// Each entry remembers the time it was computed at. An entry is a hit when
/// it is clean and its timestamp matches the query time; everything else is
/// recomputed through one batch call into the source.
#[derive(Debug)]
pub struct BatchPositionCalculator<S: WavePositionSource = WaveField> {
    source: S,
    positions: Vec<Vec3>,
    dirty: Vec<bool>,
    computed_at: Vec<f32>,
    distance_offsets: Vec<f32>,
    stats: CacheStats,
}

impl BatchPositionCalculator<WaveField> {
    pub fn new(max_elements: usize) -> Self {
        Self::with_source(WaveField::new(), max_elements)
    }
}

impl<S: WavePositionSource> BatchPositionCalculator<S> {
    pub fn with_source(source: S, max_elements: usize) -> Self {
        let mut calculator = Self {
            source,
            positions: Vec::new(),
            dirty: Vec::new(),
            computed_at: Vec::new(),
            distance_offsets: Vec::new(),
            stats: CacheStats::default(),
        };
        calculator.set_max_elements(max_elements);
        calculator
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn max_elements(&self) -> usize {
        self.positions.len()
    }

    /// Resize the cache. Every entry, old or new, becomes dirty; offsets of
    /// surviving entries are kept.
    pub fn set_max_elements(&mut self, max_elements: usize) {
        self.positions.resize(max_elements, Vec3::ZERO);
        self.computed_at.resize(max_elements, 0.0);
        self.distance_offsets.resize(max_elements, 0.0);
        self.dirty.clear();
        self.dirty.resize(max_elements, true);
        self.stats.dirty_count = max_elements;
        log::debug!("Position cache resized to {} elements", max_elements);
    }

    /// Recompute every entry at `time` in a single batch
    pub fn calculate_all(&mut self, time: f32, settings: &WaveMatrixSettings) -> &[Vec3] {
        let slots: Vec<usize> = (0..self.positions.len()).collect();
        self.refresh(&slots, time, settings);
        &self.positions
    }

    /// Positions for `indices` at `time`, in input order.
    ///
    /// Clean entries computed at `time` are served from the cache. Misses
    /// are computed in one batch and written back. Indices past the cache
    /// capacity are computed with a zero offset but never stored.
    pub fn calculate(&mut self, indices: &[usize], time: f32, settings: &WaveMatrixSettings) -> Vec<Vec3> {
        let mut results = vec![Vec3::ZERO; indices.len()];
        let mut miss_slots = Vec::new();
        let mut miss_indices = Vec::new();
        let mut miss_offsets = Vec::new();

        for (k, &index) in indices.iter().enumerate() {
            if self.is_fresh(index, time) {
                results[k] = self.positions[index];
                self.stats.cache_hits += 1;
            } else {
                miss_slots.push(k);
                miss_indices.push(to_source_index(index));
                miss_offsets.push(self.distance_offsets.get(index).copied().unwrap_or(0.0));
                self.stats.cache_misses += 1;
            }
        }

        if miss_indices.is_empty() {
            return results;
        }

        if let Some(computed) = self.run_batch(&miss_indices, time, &miss_offsets, settings) {
            for (&k, pos) in miss_slots.iter().zip(computed) {
                results[k] = pos;
                self.store(indices[k], pos, time);
            }
        }
        self.stats.dirty_count = self.dirty_count();
        results
    }

    /// Positions for the active bubbles, ordered by descending priority.
    ///
    /// Inactive bubbles are skipped. Equal priorities keep their input order.
    /// Each active bubble's offset is recorded for later cache refreshes.
    pub fn calculate_with_priority(
        &mut self,
        bubbles: &[BubbleData],
        time: f32,
        settings: &WaveMatrixSettings,
    ) -> Vec<Vec3> {
        let mut active: Vec<&BubbleData> = bubbles.iter().filter(|b| b.is_active).collect();
        active.sort_by_key(|b| std::cmp::Reverse(b.priority));
        if active.is_empty() {
            return Vec::new();
        }

        let indices: Vec<i32> = active.iter().map(|b| b.index).collect();
        let offsets: Vec<f32> = active.iter().map(|b| b.ai_distance_offset).collect();
        let Some(computed) = self.run_batch(&indices, time, &offsets, settings) else {
            return vec![Vec3::ZERO; active.len()];
        };

        for (bubble, &pos) in active.iter().zip(&computed) {
            if let Ok(slot) = usize::try_from(bubble.index) {
                if slot < self.positions.len() {
                    self.distance_offsets[slot] = bubble.ai_distance_offset;
                    self.store(slot, pos, time);
                }
            }
        }
        self.stats.dirty_count = self.dirty_count();
        computed
    }

    /// Recompute dirty entries only. Returns how many were recomputed.
    pub fn update_dirty_only(&mut self, time: f32, settings: &WaveMatrixSettings) -> usize {
        let slots: Vec<usize> = self
            .dirty
            .iter()
            .enumerate()
            .filter_map(|(slot, &dirty)| dirty.then_some(slot))
            .collect();
        if slots.is_empty() {
            return 0;
        }
        self.refresh(&slots, time, settings)
    }

    pub fn mark_dirty(&mut self, index: usize) {
        if let Some(flag) = self.dirty.get_mut(index) {
            if !*flag {
                *flag = true;
                self.stats.dirty_count += 1;
            }
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|flag| *flag = true);
        self.stats.dirty_count = self.dirty.len();
    }

    /// Set the AI distance offset of one entry; a changed offset dirties it
    pub fn set_distance_offset(&mut self, index: usize, offset: f32) {
        let Some(current) = self.distance_offsets.get_mut(index) else {
            log::warn!("set_distance_offset: index {} outside cache", index);
            return;
        };
        if current.to_bits() != offset.to_bits() {
            *current = offset;
            self.mark_dirty(index);
        }
    }

    pub fn distance_offset(&self, index: usize) -> Option<f32> {
        self.distance_offsets.get(index).copied()
    }

    /// Cached position of a clean entry
    pub fn position(&self, index: usize) -> Option<Vec3> {
        match self.dirty.get(index) {
            Some(false) => Some(self.positions[index]),
            _ => None,
        }
    }

    /// Raw cache contents, including stale entries
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.dirty.get(index).copied().unwrap_or(true)
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.iter().filter(|&&dirty| dirty).count()
    }

    /// Nearest clean entry to `point` within `max_distance`
    pub fn closest(&self, point: Vec3, max_distance: f32) -> Option<usize> {
        if !usable_limit(max_distance) {
            return None;
        }
        let limit = max_distance * max_distance;
        let mut best: Option<(usize, f32)> = None;
        for (index, pos) in self.clean_entries() {
            let dist = pos.distance_squared(point);
            if dist <= limit && best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((index, dist));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Clean entries within `radius` of `center`, in index order
    pub fn in_radius(&self, center: Vec3, radius: f32) -> Vec<usize> {
        if !usable_limit(radius) {
            return Vec::new();
        }
        let limit = radius * radius;
        self.clean_entries()
            .filter(|(_, pos)| pos.distance_squared(center) <= limit)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn validate(&self, positions: &[Vec3], settings: &WaveMatrixSettings) -> PositionValidation {
        validate_positions(positions, settings)
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    fn clean_entries(&self) -> impl Iterator<Item = (usize, Vec3)> + '_ {
        (0..self.positions.len())
            .filter(move |&index| !self.dirty[index])
            .map(move |index| (index, self.positions[index]))
    }

    fn is_fresh(&self, index: usize, time: f32) -> bool {
        match self.dirty.get(index) {
            Some(false) => (self.computed_at[index] - time).abs() <= TIME_EPSILON,
            _ => false,
        }
    }

    fn store(&mut self, index: usize, pos: Vec3, time: f32) {
        if index < self.positions.len() {
            self.positions[index] = pos;
            self.computed_at[index] = time;
            self.dirty[index] = false;
        }
    }

    /// Recompute cache slots with their stored offsets
    fn refresh(&mut self, slots: &[usize], time: f32, settings: &WaveMatrixSettings) -> usize {
        if slots.is_empty() {
            return 0;
        }
        let indices: Vec<i32> = slots.iter().map(|&slot| to_source_index(slot)).collect();
        let offsets: Vec<f32> = slots.iter().map(|&slot| self.distance_offsets[slot]).collect();
        let Some(computed) = self.run_batch(&indices, time, &offsets, settings) else {
            return 0;
        };
        for (&slot, pos) in slots.iter().zip(computed) {
            self.store(slot, pos, time);
        }
        self.stats.dirty_count = self.dirty_count();
        slots.len()
    }

    fn run_batch(
        &mut self,
        indices: &[i32],
        time: f32,
        offsets: &[f32],
        settings: &WaveMatrixSettings,
    ) -> Option<Vec<Vec3>> {
        let start = Instant::now();
        match self.source.positions_batch(indices, time, Some(offsets), settings) {
            Ok(computed) => {
                self.stats.record_batch(computed.len(), start.elapsed());
                Some(computed)
            }
            Err(err) => {
                log::error!("Position batch of {} failed: {}", indices.len(), err);
                None
            }
        }
    }
}

/// Negative or non-finite search limits match nothing
fn usable_limit(limit: f32) -> bool {
    limit.is_finite() && limit >= 0.0
}

fn to_source_index(index: usize) -> i32 {
    // Out-of-range indices map to -1, which the source resolves to the origin
    i32::try_from(index).unwrap_or(-1)
}
