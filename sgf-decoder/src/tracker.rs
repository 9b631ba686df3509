//! Hammering and flushing state tracking
//!
//! The tracker folds the classified status events of a method block, row by
//! row, into one [`RegulatorState`] per category and reads out the resolved
//! [`RowFlags`] at the end of each row.
//!
//! Priority within a category follows [`Source::rank`]: once a higher tier has
//! been seen, events from lower tiers are ignored for the rest of the parse.
//! In particular a single K code makes the category K-governed for good, and
//! once AR has been seen the I reading no longer matters for flushing.

use crate::config::DecoderConfig;
use crate::types::{Category, RowFlags, Source, StatusEvent};

/// Mutable state of one regulated category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegulatorState {
    /// Highest-priority source seen so far
    governing: Option<Source>,
    k_active: bool,
    secondary_active: bool,
    reading_active: bool,
}

impl RegulatorState {
    /// True once any K code for this category has been seen
    pub fn k_governed(&self) -> bool {
        self.governing == Some(Source::K)
    }

    /// Highest-priority source seen so far, if any
    pub fn governing_source(&self) -> Option<Source> {
        self.governing
    }

    /// State from the most recent K code
    pub fn k_active(&self) -> bool {
        self.k_active
    }

    /// State from the most recent AP (hammering) or AR (flushing) code
    pub fn secondary_active(&self) -> bool {
        self.secondary_active
    }

    /// State from the most recent I reading
    pub fn reading_active(&self) -> bool {
        self.reading_active
    }

    /// Record `active` for `source`, unless a higher tier already governs.
    /// Returns whether the event was taken into account.
    fn apply(&mut self, source: Source, active: bool) -> bool {
        if let Some(current) = self.governing {
            if source.rank() < current.rank() {
                return false;
            }
            if source.rank() > current.rank() {
                self.governing = Some(source);
            }
        } else {
            self.governing = Some(source);
        }

        match source {
            Source::K => self.k_active = active,
            Source::AP | Source::AR => self.secondary_active = active,
            Source::I => self.reading_active = active,
        }
        true
    }

    fn resolve(&self) -> bool {
        match self.governing {
            None => false,
            Some(Source::K) => self.k_active,
            Some(Source::AP) | Some(Source::AR) => self.secondary_active,
            Some(Source::I) => self.reading_active,
        }
    }
}

/// Per-parse state tracker
///
/// One tracker serves exactly one method block. It owns all of its state, so
/// independent parses each create their own.
#[derive(Debug, Clone)]
pub struct StateTracker {
    regulators: [RegulatorState; 2],
    flushing_threshold: f64,
    rows: usize,
}

impl StateTracker {
    /// Create a tracker with the given flushing pressure threshold
    pub fn new(flushing_threshold: f64) -> Self {
        Self {
            regulators: Default::default(),
            flushing_threshold,
            rows: 0,
        }
    }

    /// Create a tracker using the threshold from a decoder configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.flushing_pressure_threshold)
    }

    /// Mark `category` as K-governed before any K code has been applied
    ///
    /// The K state starts off, so the category reads as inactive until the
    /// first K code switches it on.
    pub fn govern_by_k(&mut self, category: Category) {
        let regulator = &mut self.regulators[category.index()];
        if !regulator.k_governed() {
            log::debug!("{} is K-governed from the start", category);
            regulator.governing = Some(Source::K);
        }
    }

    /// Apply a single status event
    pub fn apply_event(&mut self, event: &StatusEvent) {
        let active = event.toggle.is_active(self.flushing_threshold);
        let row = self.rows;
        let regulator = &mut self.regulators[event.category.index()];
        let was_k_governed = regulator.k_governed();

        if !regulator.apply(event.source, active) {
            log::trace!(
                "row {}: {} event from {} ignored, governed by {:?}",
                row,
                event.category,
                event.source,
                regulator.governing
            );
            return;
        }

        if !was_k_governed && regulator.k_governed() {
            log::debug!("row {}: {} is now K-governed", row, event.category);
        }
    }

    /// Apply all events of one row, in order, and read out the row's flags
    pub fn apply_row(&mut self, events: &[StatusEvent]) -> RowFlags {
        for event in events {
            self.apply_event(event);
        }
        self.rows += 1;
        self.flags()
    }

    /// Current resolved flags
    pub fn flags(&self) -> RowFlags {
        RowFlags {
            hammering: self.regulator(Category::Hammering).resolve(),
            flushing: self.regulator(Category::Flushing).resolve(),
        }
    }

    /// State of a single category
    pub fn regulator(&self, category: Category) -> &RegulatorState {
        &self.regulators[category.index()]
    }

    /// Number of rows applied so far
    pub fn rows_applied(&self) -> usize {
        self.rows
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::from_config(&DecoderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Toggle;

    fn ev(category: Category, source: Source, toggle: Toggle) -> StatusEvent {
        StatusEvent::new(category, source, toggle)
    }

    fn k_on(category: Category) -> StatusEvent {
        ev(category, Source::K, Toggle::On)
    }

    fn k_off(category: Category) -> StatusEvent {
        ev(category, Source::K, Toggle::Off)
    }

    fn ap(on: bool) -> StatusEvent {
        ev(
            Category::Hammering,
            Source::AP,
            if on { Toggle::On } else { Toggle::Off },
        )
    }

    fn ar(on: bool) -> StatusEvent {
        ev(
            Category::Flushing,
            Source::AR,
            if on { Toggle::On } else { Toggle::Off },
        )
    }

    fn reading(value: f64) -> StatusEvent {
        ev(Category::Flushing, Source::I, Toggle::Reading(value))
    }

    fn run(rows: &[Vec<StatusEvent>]) -> Vec<RowFlags> {
        let mut tracker = StateTracker::default();
        rows.iter().map(|row| tracker.apply_row(row)).collect()
    }

    #[test]
    fn test_flags_default_to_false() {
        let flags = run(&[vec![], vec![], vec![]]);
        assert!(flags.iter().all(|f| *f == RowFlags::default()));
    }

    #[test]
    fn test_ap_controls_hammering_without_k() {
        let flags = run(&[vec![ap(true)], vec![], vec![ap(false)], vec![]]);
        let hammering: Vec<bool> = flags.iter().map(|f| f.hammering).collect();
        assert_eq!(hammering, vec![true, true, false, false]);
        assert!(flags.iter().all(|f| !f.flushing));
    }

    #[test]
    fn test_k_overrides_ap_permanently() {
        let flags = run(&[
            vec![ap(true)],
            vec![k_off(Category::Hammering)],
            vec![ap(true)],
            vec![],
            vec![k_on(Category::Hammering)],
            vec![ap(false)],
        ]);
        let hammering: Vec<bool> = flags.iter().map(|f| f.hammering).collect();
        assert_eq!(hammering, vec![true, false, false, false, true, true]);
    }

    #[test]
    fn test_ar_takes_precedence_over_reading() {
        let flags = run(&[
            vec![reading(0.5)],
            vec![ar(false)],
            vec![reading(0.5)],
            vec![ar(true)],
            vec![reading(0.0)],
        ]);
        let flushing: Vec<bool> = flags.iter().map(|f| f.flushing).collect();
        assert_eq!(flushing, vec![true, false, false, true, true]);
    }

    #[test]
    fn test_reading_threshold_is_strict() {
        let flags = run(&[vec![reading(0.1)], vec![reading(0.101)], vec![reading(0.05)]]);
        let flushing: Vec<bool> = flags.iter().map(|f| f.flushing).collect();
        assert_eq!(flushing, vec![false, true, false]);
    }

    #[test]
    fn test_custom_threshold() {
        let mut tracker = StateTracker::new(1.0);
        assert!(!tracker.apply_row(&[reading(0.5)]).flushing);
        assert!(tracker.apply_row(&[reading(1.5)]).flushing);
    }

    #[test]
    fn test_k_overrides_ar_and_reading() {
        let flags = run(&[
            vec![ar(true)],
            vec![k_off(Category::Flushing)],
            vec![ar(true), reading(2.0)],
        ]);
        let flushing: Vec<bool> = flags.iter().map(|f| f.flushing).collect();
        assert_eq!(flushing, vec![true, false, false]);
        assert!(flags.iter().all(|f| !f.hammering));
    }

    #[test]
    fn test_last_k_on_row_wins_per_category() {
        let mut tracker = StateTracker::default();
        let flags = tracker.apply_row(&[
            k_on(Category::Hammering),
            k_off(Category::Hammering),
        ]);
        assert!(!flags.hammering);

        let flags = tracker.apply_row(&[
            k_off(Category::Hammering),
            k_on(Category::Hammering),
        ]);
        assert!(flags.hammering);
    }

    #[test]
    fn test_different_categories_on_one_row_are_independent() {
        let forward = run(&[vec![k_on(Category::Flushing), k_on(Category::Hammering)]]);
        let reverse = run(&[vec![k_on(Category::Hammering), k_on(Category::Flushing)]]);
        assert_eq!(forward, reverse);
        assert_eq!(
            forward[0],
            RowFlags {
                hammering: true,
                flushing: true
            }
        );
    }

    #[test]
    fn test_k_governance_is_sticky() {
        let mut tracker = StateTracker::default();
        tracker.apply_row(&[k_on(Category::Flushing)]);
        for _ in 0..10 {
            tracker.apply_row(&[ar(false), reading(0.0)]);
        }

        let regulator = tracker.regulator(Category::Flushing);
        assert!(regulator.k_governed());
        assert!(regulator.k_active());
        assert!(!regulator.secondary_active());
        assert!(tracker.flags().flushing);
        assert!(!tracker.regulator(Category::Hammering).k_governed());
        assert_eq!(tracker.rows_applied(), 11);
    }

    #[test]
    fn test_govern_by_k_ignores_earlier_secondary_codes() {
        let mut tracker = StateTracker::default();
        tracker.govern_by_k(Category::Hammering);

        assert!(!tracker.apply_row(&[ap(true)]).hammering);
        assert!(tracker.apply_row(&[k_on(Category::Hammering)]).hammering);
        assert_eq!(
            tracker.regulator(Category::Hammering).governing_source(),
            Some(Source::K)
        );
    }

    #[test]
    fn test_replay_is_deterministic() {
        let rows = vec![
            vec![ap(true), reading(0.3)],
            vec![k_on(Category::Flushing)],
            vec![ar(false), k_off(Category::Hammering)],
            vec![],
        ];
        assert_eq!(run(&rows), run(&rows));
    }
}
