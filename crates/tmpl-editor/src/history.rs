//! Undo/redo history.
//!
//! Every entry is a complete JSON snapshot of the scene, so undo and redo
//! are exact state replacements: redo after undo reproduces the serialized
//! state byte for byte.
//!
//! Pointer gestures and multi-object edits use **batching**: records made
//! between `begin_batch` and the outermost `end_batch` collapse into one
//! snapshot taken when the batch closes.

use std::collections::VecDeque;
use tmpl_core::error::TemplateError;
use tmpl_core::scene::SceneGraph;
use tmpl_core::serialize::{deserialize_scene, serialize_scene};

/// What kind of change produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLabel {
    Loaded,
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone)]
struct Entry {
    snapshot: String,
    label: HistoryLabel,
}

/// Bounded snapshot stack with a current index.
///
/// `index` always points at the entry matching the live scene. Entries past
/// it form the redo branch, which the next record discards.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Entry>,
    index: usize,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Whether anything was recorded during the current batch.
    batch_dirty: bool,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_dirty: false,
        }
    }

    /// Drop everything and start over from `scene` (template load).
    pub fn reset(&mut self, scene: &SceneGraph) -> Result<(), TemplateError> {
        let snapshot = serialize_scene(scene)?;
        self.entries.clear();
        self.entries.push_back(Entry {
            snapshot,
            label: HistoryLabel::Loaded,
        });
        self.index = 0;
        self.batch_depth = 0;
        self.batch_dirty = false;
        Ok(())
    }

    /// Discard all entries (session close).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.batch_depth = 0;
        self.batch_dirty = false;
    }

    /// Snapshot the scene after a mutation. Inside a batch this only marks
    /// the batch dirty. Returns whether a new entry was pushed; a scene
    /// identical to the current entry pushes nothing.
    pub fn record(&mut self, scene: &SceneGraph, label: HistoryLabel) -> Result<bool, TemplateError> {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return Ok(false);
        }
        let snapshot = serialize_scene(scene)?;
        if self
            .entries
            .get(self.index)
            .is_some_and(|e| e.snapshot == snapshot)
        {
            return Ok(false);
        }

        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push_back(Entry { snapshot, label });
        while self.entries.len() > self.max_depth {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
        log::debug!(
            "history: {label:?} snapshot #{} of {}",
            self.index,
            self.entries.len()
        );
        Ok(true)
    }

    /// Start a batch group.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and anything was
    /// recorded, push one snapshot.
    pub fn end_batch(&mut self, scene: &SceneGraph, label: HistoryLabel) -> Result<bool, TemplateError> {
        if self.batch_depth == 0 {
            return Ok(false);
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 || !self.batch_dirty {
            return Ok(false);
        }
        self.batch_dirty = false;
        self.record(scene, label)
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Step back one entry and replace `scene` with it. Returns the label of
    /// the change undone, or `None` at the oldest entry.
    pub fn undo(&mut self, scene: &mut SceneGraph) -> Result<Option<HistoryLabel>, TemplateError> {
        if !self.can_undo() {
            return Ok(None);
        }
        let label = self.entries[self.index].label;
        self.restore(self.index - 1, scene)?;
        Ok(Some(label))
    }

    /// Step forward one entry. Returns the label of the change redone, or
    /// `None` at the tip.
    pub fn redo(&mut self, scene: &mut SceneGraph) -> Result<Option<HistoryLabel>, TemplateError> {
        if !self.can_redo() {
            return Ok(None);
        }
        let label = self.entries[self.index + 1].label;
        self.restore(self.index + 1, scene)?;
        Ok(Some(label))
    }

    fn restore(&mut self, index: usize, scene: &mut SceneGraph) -> Result<(), TemplateError> {
        let report = deserialize_scene(&self.entries[index].snapshot)?;
        *scene = report.scene;
        self.index = index;
        log::trace!("history: restored snapshot #{index}");
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tmpl_core::factory;

    fn json(scene: &SceneGraph) -> String {
        serialize_scene(scene).unwrap()
    }

    #[test]
    fn undo_redo_replaces_state() {
        let mut scene = SceneGraph::new();
        let mut history = History::new(50);
        history.reset(&scene).unwrap();

        scene.add(factory::rectangle(10.0, 10.0));
        history.record(&scene, HistoryLabel::Added).unwrap();
        let after_add = json(&scene);

        assert_eq!(history.undo(&mut scene).unwrap(), Some(HistoryLabel::Added));
        assert!(scene.is_empty());
        assert_eq!(history.redo(&mut scene).unwrap(), Some(HistoryLabel::Added));
        assert_eq!(json(&scene), after_add);
    }

    #[test]
    fn undo_at_start_is_noop() {
        let mut scene = SceneGraph::new();
        let mut history = History::new(50);
        history.reset(&scene).unwrap();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(&mut scene).unwrap(), None);
        assert_eq!(history.redo(&mut scene).unwrap(), None);
    }

    #[test]
    fn record_discards_redo_branch() {
        let mut scene = SceneGraph::new();
        let mut history = History::new(50);
        history.reset(&scene).unwrap();

        scene.add(factory::rectangle(0.0, 0.0));
        history.record(&scene, HistoryLabel::Added).unwrap();
        scene.add(factory::circle(0.0, 0.0));
        history.record(&scene, HistoryLabel::Added).unwrap();

        history.undo(&mut scene).unwrap();
        assert!(history.can_redo());

        scene.add(factory::line(0.0, 0.0));
        history.record(&scene, HistoryLabel::Added).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn depth_is_bounded() {
        let mut scene = SceneGraph::new();
        let mut history = History::new(5);
        history.reset(&scene).unwrap();
        for i in 0..10 {
            scene.add(factory::rectangle(i as f64, 0.0));
            history.record(&scene, HistoryLabel::Added).unwrap();
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.index(), 4);

        let mut undone = 0;
        while history.undo(&mut scene).unwrap().is_some() {
            undone += 1;
        }
        assert_eq!(undone, 4);
        assert_eq!(scene.len(), 6);
    }

    #[test]
    fn batch_collapses_to_one_entry() {
        let mut scene = SceneGraph::new();
        let id = scene.add(factory::rectangle(0.0, 0.0));
        let mut history = History::new(50);
        history.reset(&scene).unwrap();

        history.begin_batch();
        for step in 1..=5 {
            scene.get_mut(id).unwrap().geometry.left = step as f64 * 10.0;
            assert!(!history.record(&scene, HistoryLabel::Modified).unwrap());
        }
        assert!(history.end_batch(&scene, HistoryLabel::Modified).unwrap());
        assert_eq!(history.len(), 2);

        history.undo(&mut scene).unwrap();
        assert_eq!(scene.get(id).unwrap().geometry.left, 0.0);
    }

    #[test]
    fn empty_batch_records_nothing() {
        let scene = SceneGraph::new();
        let mut history = History::new(50);
        history.reset(&scene).unwrap();
        history.begin_batch();
        assert!(!history.end_batch(&scene, HistoryLabel::Modified).unwrap());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn identical_state_is_not_recorded() {
        let scene = SceneGraph::new();
        let mut history = History::new(50);
        history.reset(&scene).unwrap();
        assert!(!history.record(&scene, HistoryLabel::Modified).unwrap());
        assert_eq!(history.len(), 1);
    }
}
