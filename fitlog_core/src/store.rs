//! The exercise record store.
//!
//! Owns the canonical in-memory collection, loaded once from the durable
//! slot at construction. Every mutator writes the full collection back to
//! the slot before returning; if the write is rejected the in-memory
//! mutation is rolled back so memory and disk never diverge.
//!
//! The store is an explicitly constructed instance handed to collaborators;
//! there is no process-wide global. `&mut self` on every mutator keeps the
//! at-most-one-writer invariant a compile-time property.

use crate::{
    stats, Exercise, ExerciseDraft, ExerciseFilter, ExercisePatch, ExerciseStats, JsonSlot,
    Result, WeekStart,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

pub struct ExerciseStore {
    slot: JsonSlot,
    exercises: Vec<Exercise>,
}

impl ExerciseStore {
    /// Open the store, loading the collection from the durable slot
    ///
    /// A missing or corrupt slot starts the store empty; opening never
    /// fails.
    pub fn open(slot: JsonSlot) -> Self {
        let exercises = slot.load();
        tracing::info!("Opened exercise store with {} records", exercises.len());
        Self { slot, exercises }
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Create a record from caller-validated fields
    ///
    /// Assigns a fresh id and `created_at = updated_at = now`, appends,
    /// and persists. Field validation happens at the boundary before the
    /// draft reaches the store.
    pub fn create(&mut self, draft: ExerciseDraft) -> Result<Exercise> {
        let now = Utc::now();
        let exercise = Exercise {
            id: Uuid::new_v4(),
            name: draft.name,
            kind: draft.kind,
            duration: draft.duration,
            intensity_level: draft.intensity_level,
            calories_burned: draft.calories_burned,
            date: draft.date,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        };

        self.exercises.push(exercise.clone());
        if let Err(e) = self.slot.save(&self.exercises) {
            self.exercises.pop();
            return Err(e);
        }

        tracing::debug!("Created exercise {} ({})", exercise.id, exercise.name);
        Ok(exercise)
    }

    /// Merge a partial patch over the record with the given id
    ///
    /// Returns `Ok(None)` when the id is unknown; nothing is written in
    /// that case. `id` and `created_at` cannot be patched; `updated_at`
    /// is refreshed on every successful update, even an empty patch.
    pub fn update(&mut self, id: Uuid, patch: ExercisePatch) -> Result<Option<Exercise>> {
        let index = match self.exercises.iter().position(|e| e.id == id) {
            Some(i) => i,
            None => return Ok(None),
        };

        let previous = self.exercises[index].clone();
        let exercise = &mut self.exercises[index];

        if let Some(name) = patch.name {
            exercise.name = name;
        }
        if let Some(kind) = patch.kind {
            exercise.kind = kind;
        }
        if let Some(duration) = patch.duration {
            exercise.duration = duration;
        }
        if let Some(level) = patch.intensity_level {
            exercise.intensity_level = level;
        }
        if let Some(calories) = patch.calories_burned {
            exercise.calories_burned = calories;
        }
        if let Some(date) = patch.date {
            exercise.date = date;
        }
        if let Some(notes) = patch.notes {
            exercise.notes = notes;
        }
        exercise.updated_at = Utc::now();

        let updated = exercise.clone();
        if let Err(e) = self.slot.save(&self.exercises) {
            self.exercises[index] = previous;
            return Err(e);
        }

        tracing::debug!("Updated exercise {}", id);
        Ok(Some(updated))
    }

    /// Delete the record with the given id
    ///
    /// Returns whether a removal occurred; an unknown id is `Ok(false)`
    /// with no write. Deletion is permanent.
    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        let index = match self.exercises.iter().position(|e| e.id == id) {
            Some(i) => i,
            None => return Ok(false),
        };

        let removed = self.exercises.remove(index);
        if let Err(e) = self.slot.save(&self.exercises) {
            self.exercises.insert(index, removed);
            return Err(e);
        }

        tracing::debug!("Deleted exercise {}", id);
        Ok(true)
    }

    /// Snapshot of the collection, filtered and sorted by date descending
    ///
    /// The sort is stable, so records sharing a date keep their original
    /// insertion order.
    pub fn list(&self, filter: Option<&ExerciseFilter>) -> Vec<Exercise> {
        let mut matched: Vec<Exercise> = match filter {
            Some(f) => self
                .exercises
                .iter()
                .filter(|e| f.matches(e))
                .cloned()
                .collect(),
            None => self.exercises.clone(),
        };

        matched.sort_by(|a, b| b.date.cmp(&a.date));
        matched
    }

    pub fn get(&self, id: Uuid) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Empty the collection and persist the empty state. Irreversible.
    pub fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.exercises);
        if let Err(e) = self.slot.save(&self.exercises) {
            self.exercises = previous;
            return Err(e);
        }

        tracing::info!("Cleared all exercise records");
        Ok(())
    }

    /// Compute derived statistics over the current collection
    pub fn stats(&self, now: DateTime<Utc>, week_start: WeekStart) -> ExerciseStats {
        stats::compute_stats(&self.exercises, now, week_start)
    }

    /// Serialize the full collection to the transport payload
    pub fn export(&self, now: DateTime<Utc>) -> Result<String> {
        crate::exchange::export_json(&self.exercises, now)
    }

    /// Merge a transport payload into the store
    ///
    /// Structurally invalid records are dropped, records whose id already
    /// exists are silently skipped, and the remainder are appended as-is
    /// with their foreign id and timestamps preserved. Returns the count
    /// actually added. The store is untouched on any failure.
    pub fn import(&mut self, payload: &str) -> Result<usize> {
        let incoming = crate::exchange::parse_payload(payload)?;

        let existing: HashSet<Uuid> = self.exercises.iter().map(|e| e.id).collect();
        let new_exercises: Vec<Exercise> = incoming
            .into_iter()
            .filter(|e| !existing.contains(&e.id))
            .collect();

        let added = new_exercises.len();
        if added == 0 {
            tracing::info!("Import contained no new records");
            return Ok(0);
        }

        let prior_len = self.exercises.len();
        self.exercises.extend(new_exercises);
        if let Err(e) = self.slot.save(&self.exercises) {
            self.exercises.truncate(prior_len);
            return Err(e);
        }

        tracing::info!("Imported {} new exercise records", added);
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateRange, ExerciseType, IntensityLevel};
    use chrono::{Duration, TimeZone};

    fn open_store(dir: &tempfile::TempDir) -> ExerciseStore {
        ExerciseStore::open(JsonSlot::new(dir.path().join("exercises.json")))
    }

    fn draft(name: &str, date: DateTime<Utc>) -> ExerciseDraft {
        ExerciseDraft {
            name: name.into(),
            kind: ExerciseType::Running,
            duration: 30,
            intensity_level: IntensityLevel::Moderate,
            calories_burned: None,
            date,
            notes: None,
        }
    }

    #[test]
    fn test_create_assigns_unique_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let mut ids = HashSet::new();
        for i in 0..10 {
            let ex = store.create(draft(&format!("run {}", i), Utc::now())).unwrap();
            assert!(ids.insert(ex.id), "duplicate id {}", ex.id);
            assert_eq!(ex.created_at, ex.updated_at);
        }
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let mut store = open_store(&dir);
            store.create(draft("Swim", Utc::now())).unwrap()
        };

        let store = open_store(&dir);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(created.id).unwrap().name, "Swim");
    }

    #[test]
    fn test_empty_update_only_touches_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let created = store.create(draft("Row", Utc::now())).unwrap();
        let updated = store
            .update(created.id, ExercisePatch::default())
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, created.name);
        assert_eq!(updated.kind, created.kind);
        assert_eq!(updated.duration, created.duration);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let created = store.create(draft("Jog", Utc::now())).unwrap();
        let patch = ExercisePatch {
            duration: Some(45),
            calories_burned: Some(Some(300)),
            notes: Some(Some("felt strong".into())),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).unwrap().unwrap();

        assert_eq!(updated.duration, 45);
        assert_eq!(updated.calories_burned, Some(300));
        assert_eq!(updated.notes.as_deref(), Some("felt strong"));
        assert_eq!(updated.name, "Jog");
    }

    #[test]
    fn test_update_unknown_id_is_negative_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let result = store.update(Uuid::new_v4(), ExercisePatch::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_then_get_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let created = store.create(draft("Bike", Utc::now())).unwrap();
        assert!(store.delete(created.id).unwrap());
        assert!(store.get(created.id).is_none());
        // Second delete is a negative result
        assert!(!store.delete(created.id).unwrap());
    }

    #[test]
    fn test_list_sorted_by_date_descending_stable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let day = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let first = store.create(draft("first", day)).unwrap();
        let newer = store.create(draft("newer", day + Duration::days(2))).unwrap();
        let second = store.create(draft("second", day)).unwrap();

        let listed = store.list(None);
        assert_eq!(listed[0].id, newer.id);
        // Tied dates keep insertion order
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[2].id, second.id);
    }

    #[test]
    fn test_list_filters() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        let day = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let mut yoga = draft("Yoga", day);
        yoga.kind = ExerciseType::Yoga;
        yoga.intensity_level = IntensityLevel::Low;
        store.create(yoga).unwrap();
        store.create(draft("Run", day + Duration::days(5))).unwrap();

        let by_type = store.list(Some(&ExerciseFilter {
            kind: Some(ExerciseType::Yoga),
            ..Default::default()
        }));
        assert_eq!(by_type.len(), 1);
        assert_eq!(by_type[0].name, "Yoga");

        let by_intensity = store.list(Some(&ExerciseFilter {
            intensity_level: Some(IntensityLevel::Moderate),
            ..Default::default()
        }));
        assert_eq!(by_intensity.len(), 1);
        assert_eq!(by_intensity[0].name, "Run");

        // Inclusive range picks up the boundary day
        let in_range = store.list(Some(&ExerciseFilter {
            date_range: Some(DateRange {
                start: day,
                end: day + Duration::days(1),
            }),
            ..Default::default()
        }));
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].name, "Yoga");
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&dir);

        store.create(draft("Walk", Utc::now())).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());

        let reopened = open_store(&dir);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_failed_write_rolls_back_create() {
        let dir = tempfile::tempdir().unwrap();
        let slot_path = dir.path().join("exercises.json");
        let mut store = ExerciseStore::open(JsonSlot::new(&slot_path));
        store.create(draft("kept", Utc::now())).unwrap();

        // A directory at the slot path makes the rename fail
        std::fs::remove_file(&slot_path).unwrap();
        std::fs::create_dir(&slot_path).unwrap();

        let result = store.create(draft("rejected", Utc::now()));
        assert!(matches!(result, Err(crate::Error::Persistence(_))));
        // In-memory state rolled back to match the last confirmed write
        assert_eq!(store.len(), 1);
        assert_eq!(store.list(None)[0].name, "kept");
    }

    #[test]
    fn test_failed_write_rolls_back_delete_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let slot_path = dir.path().join("exercises.json");
        let mut store = ExerciseStore::open(JsonSlot::new(&slot_path));
        let created = store.create(draft("kept", Utc::now())).unwrap();

        std::fs::remove_file(&slot_path).unwrap();
        std::fs::create_dir(&slot_path).unwrap();

        assert!(store.delete(created.id).is_err());
        assert_eq!(store.len(), 1);

        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);
    }
}
