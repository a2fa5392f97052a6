//! Editor session: one template, its history and everything the author does
//! to it between load and close.
//!
//! Every mutation funnels through here so the history sees keyboard, pointer
//! and panel edits the same way: mutate the scene, then record exactly one
//! snapshot.
//!
//! Lifecycle: `Empty → Loaded → Editing ⇄ Saving → Saved → Editing … → Closed`.

use crate::align::{AlignEdge, align_objects};
use crate::clipboard::{self, Clipboard};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::history::{History, HistoryLabel};
use crate::input::{InputEvent, KeyEvent};
use crate::properties::{PropertyEdit, PropertySheet, apply_edit};
use crate::selection::{GestureState, IdList, Selection, SelectionController};
use crate::shortcuts::{Direction, EditorCommand, PlatformProfile, ShortcutMap};
use crate::store::{SaveRequest, TemplateStore};
use tmpl_core::catalog::is_known_field;
use tmpl_core::factory;
use tmpl_core::id::ObjectId;
use tmpl_core::model::{CanvasObject, DocumentType};
use tmpl_core::scene::SceneGraph;
use tmpl_core::serialize::{SkippedObject, deserialize_scene, serialize_scene};
use tmpl_core::starter::starter_template;
use tmpl_core::template::Template;
use tmpl_render::render_thumbnail;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Nothing loaded yet.
    Empty,
    /// A template was applied and not yet touched.
    Loaded,
    Editing,
    /// A save is in flight.
    Saving,
    /// Last save succeeded; the next edit returns to `Editing`.
    Saved,
    Closed,
}

/// What `handle_key` did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled(EditorCommand),
    /// Bound, but swallowed because a text object is being typed into.
    Suppressed(EditorCommand),
    /// No binding.
    Ignored,
}

#[derive(Debug, Clone)]
struct TextEdit {
    id: ObjectId,
}

/// A single-writer editing session over one template.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    profile: PlatformProfile,
    state: EditorState,
    template: Template,
    history: History,
    selection: SelectionController,
    clipboard: Clipboard,
    text_edit: Option<TextEdit>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, profile: PlatformProfile) -> Self {
        Self {
            history: History::new(config.history_depth),
            selection: SelectionController::new(&config),
            config,
            profile,
            state: EditorState::Empty,
            template: Template::blank("Untitled", DocumentType::Quote),
            clipboard: Clipboard::new(),
            text_edit: None,
        }
    }

    /// Default settings with the platform profile of the compile target.
    pub fn with_defaults() -> Self {
        Self::new(EditorConfig::default(), PlatformProfile::current())
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn profile(&self) -> PlatformProfile {
        self.profile
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.template.scene
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.selection.state()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn is_text_editing(&self) -> bool {
        self.text_edit.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Apply the starter layout for `document_type`.
    pub fn load_starter(&mut self, document_type: DocumentType) -> Result<(), EditorError> {
        self.load_template(starter_template(document_type))
    }

    /// Apply an already-built template. Only valid on a fresh session.
    pub fn load_template(&mut self, template: Template) -> Result<(), EditorError> {
        if self.state != EditorState::Empty {
            return Err(self.invalid("load"));
        }
        self.history.reset(&template.scene)?;
        log::debug!(
            "loaded `{}` ({}) with {} objects",
            template.name,
            template.document_type,
            template.scene.len()
        );
        self.template = template;
        self.selection.clear();
        self.state = EditorState::Loaded;
        Ok(())
    }

    /// Fetch a template from `store` and apply it. Objects that fail to
    /// decode are skipped and returned; the rest load normally.
    pub async fn load<S: TemplateStore>(
        &mut self,
        store: &S,
        template_id: &str,
    ) -> Result<Vec<SkippedObject>, EditorError> {
        if self.state != EditorState::Empty {
            return Err(self.invalid("load"));
        }
        let stored = store.load(template_id).await.map_err(|e| {
            log::error!("loading template `{template_id}` failed: {e}");
            e
        })?;
        let report = deserialize_scene(&stored.template_json)?;
        let template = Template {
            id: Some(stored.id),
            name: stored.name,
            document_type: stored.document_type,
            scene: report.scene,
            thumbnail: None,
            last_modified: None,
        };
        self.load_template(template)?;
        Ok(report.skipped)
    }

    /// Serialize, thumbnail and hand the template to `store`.
    ///
    /// On success the template takes the id the store assigned and the
    /// session is `Saved`. On failure the session is back in `Editing` with
    /// the scene and history exactly as before, so the author can retry.
    pub async fn save<S: TemplateStore>(&mut self, store: &S) -> Result<String, EditorError> {
        self.ensure_editable("save")?;
        self.finish_gesture();
        let previous = self.state;
        self.state = EditorState::Saving;

        let request = match self.save_request() {
            Ok(request) => request,
            Err(e) => {
                self.state = previous;
                return Err(e);
            }
        };
        let thumbnail = request.thumbnail_data_url.clone();

        match store.save(request).await {
            Ok(id) => {
                log::debug!("saved `{}` as {id}", self.template.name);
                self.template.id = Some(id.clone());
                self.template.thumbnail = Some(thumbnail);
                self.template.touch();
                self.state = EditorState::Saved;
                Ok(id)
            }
            Err(e) => {
                log::error!("saving `{}` failed: {e}", self.template.name);
                self.state = EditorState::Editing;
                Err(e.into())
            }
        }
    }

    fn save_request(&self) -> Result<SaveRequest, EditorError> {
        let template_json = serialize_scene(&self.template.scene)?;
        let thumbnail = render_thumbnail(&self.template.scene, self.config.thumbnail_scale)?;
        Ok(SaveRequest {
            template_id: self.template.id.clone(),
            template_json,
            thumbnail_data_url: thumbnail.to_data_url(),
            name: self.template.name.clone(),
            document_type: self.template.document_type,
        })
    }

    /// End the session. Unsaved history is discarded.
    pub fn close(&mut self) {
        if self.can_undo() && self.state == EditorState::Editing {
            log::debug!("closing with unsaved changes");
        }
        self.history.clear();
        self.selection.clear();
        self.text_edit = None;
        self.state = EditorState::Closed;
    }

    // ─── Plumbing ────────────────────────────────────────────────────────

    fn invalid(&self, action: &'static str) -> EditorError {
        EditorError::InvalidState {
            state: self.state,
            action,
        }
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), EditorError> {
        match self.state {
            EditorState::Loaded | EditorState::Editing | EditorState::Saved => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    /// Record one snapshot for a mutation that already happened.
    fn commit(&mut self, label: HistoryLabel) -> Result<(), EditorError> {
        self.state = EditorState::Editing;
        self.history.record(&self.template.scene, label)?;
        Ok(())
    }

    /// Close out a half-finished pointer gesture so its live geometry is
    /// either committed or never observed by the next command.
    fn finish_gesture(&mut self) {
        if self.selection.state() != GestureState::Idle
            && self.selection.pointer_up(&self.template.scene)
        {
            self.state = EditorState::Editing;
            if let Err(e) = self.history.record(&self.template.scene, HistoryLabel::Modified) {
                log::warn!("could not record interrupted gesture: {e}");
            }
        }
    }

    fn require(&self, id: ObjectId) -> Result<&CanvasObject, EditorError> {
        self.template.scene.get(id).ok_or(EditorError::NotFound(id))
    }

    // ─── Adding objects ──────────────────────────────────────────────────

    /// Stack `object` on top and make it the active object.
    pub fn add_object(&mut self, object: CanvasObject) -> Result<ObjectId, EditorError> {
        self.ensure_editable("add objects")?;
        self.finish_gesture();
        let id = self.template.scene.add(object);
        self.selection.set_active_object(Some(id));
        self.commit(HistoryLabel::Added)?;
        Ok(id)
    }

    /// Add a placeholder bound to `path`, which must be in the catalog for
    /// this template's document type.
    pub fn add_data_field(&mut self, path: &str, left: f64, top: f64) -> Result<ObjectId, EditorError> {
        let document_type = self.template.document_type;
        if !is_known_field(document_type, path) {
            return Err(EditorError::UnknownField {
                path: path.to_string(),
                document_type,
            });
        }
        self.add_object(factory::data_field(path, left, top))
    }

    /// Add the line-items table with the configured number of rows.
    pub fn add_line_items_table(&mut self, left: f64, top: f64) -> Result<ObjectId, EditorError> {
        let rows = self.config.table_rows;
        self.add_object(factory::line_items_table(rows, left, top))
    }

    // ─── Removing ────────────────────────────────────────────────────────

    /// Delete every selected object that is not locked.
    pub fn delete_selected(&mut self) -> Result<usize, EditorError> {
        self.ensure_editable("delete")?;
        self.finish_gesture();
        let ids = self.selection.selection().unlocked_in(&self.template.scene);
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self.template.scene.remove_many(&ids).len();
        self.selection.retain_existing(&self.template.scene);
        self.commit(HistoryLabel::Removed)?;
        Ok(removed)
    }

    pub fn remove(&mut self, id: ObjectId) -> Result<(), EditorError> {
        self.ensure_editable("delete")?;
        if self.require(id)?.locked {
            return Err(EditorError::Locked(id));
        }
        self.finish_gesture();
        self.template.scene.remove(id);
        self.selection.retain_existing(&self.template.scene);
        self.commit(HistoryLabel::Removed)
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn copy(&mut self) -> Result<usize, EditorError> {
        self.ensure_editable("copy")?;
        Ok(self
            .clipboard
            .copy(&self.template.scene, self.selection.selection()))
    }

    /// Paste the clipboard at the configured offset; the copies become the
    /// selection.
    pub fn paste(&mut self) -> Result<IdList, EditorError> {
        self.ensure_editable("paste")?;
        if self.clipboard.is_empty() {
            return Ok(IdList::new());
        }
        self.finish_gesture();
        let ids = self
            .clipboard
            .paste(&mut self.template.scene, self.config.paste_offset);
        self.selection
            .set_selection(Selection::from_ids(ids.iter().copied()));
        self.commit(HistoryLabel::Added)?;
        Ok(ids)
    }

    /// Copy + paste in one step, leaving the clipboard alone.
    pub fn duplicate(&mut self) -> Result<IdList, EditorError> {
        self.ensure_editable("duplicate")?;
        if self.selection.selection().is_empty() {
            return Ok(IdList::new());
        }
        self.finish_gesture();
        let ids = clipboard::duplicate(
            &mut self.template.scene,
            self.selection.selection(),
            self.config.paste_offset,
        );
        self.selection
            .set_selection(Selection::from_ids(ids.iter().copied()));
        self.commit(HistoryLabel::Added)?;
        Ok(ids)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_all(&mut self) -> Result<(), EditorError> {
        self.ensure_editable("select")?;
        self.finish_gesture();
        self.selection.select_all(&self.template.scene);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.finish_gesture();
        self.selection.clear();
    }

    /// Make `id` the single active object (or clear with `None`). Locked
    /// objects can be activated this way so the panel can unlock them.
    pub fn set_active_object(&mut self, id: Option<ObjectId>) -> Result<(), EditorError> {
        if let Some(id) = id {
            self.require(id)?;
        }
        self.finish_gesture();
        self.selection.set_active_object(id);
        Ok(())
    }

    /// Feed a pointer event to the selection controller. Returns true when
    /// a gesture finished with a geometry change (and was recorded).
    pub fn handle_pointer(&mut self, event: &InputEvent) -> Result<bool, EditorError> {
        self.ensure_editable("transform")?;
        if self.text_edit.is_some() && matches!(event, InputEvent::PointerDown { .. }) {
            self.cancel_text_edit();
        }
        let changed = self.selection.handle(&mut self.template.scene, event);
        if changed {
            self.commit(HistoryLabel::Modified)?;
        }
        Ok(changed)
    }

    // ─── Geometry commands ───────────────────────────────────────────────

    /// Move the unlocked selected objects one step (or a large step).
    pub fn nudge(&mut self, direction: Direction, large: bool) -> Result<bool, EditorError> {
        self.ensure_editable("nudge")?;
        self.finish_gesture();
        let ids = self.selection.selection().unlocked_in(&self.template.scene);
        if ids.is_empty() {
            return Ok(false);
        }
        let step = if large {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        let (ux, uy) = direction.unit();
        for id in &ids {
            if let Some(obj) = self.template.scene.get_mut(*id) {
                obj.translate(ux * step, uy * step);
            }
        }
        self.commit(HistoryLabel::Modified)?;
        Ok(true)
    }

    /// Align the selection (or the single active object to the page). One
    /// snapshot for the whole batch.
    pub fn align(&mut self, edge: AlignEdge) -> Result<usize, EditorError> {
        self.ensure_editable("align")?;
        self.finish_gesture();
        let ids = self.selection.selection().in_z_order(&self.template.scene);
        if ids.is_empty() {
            return Err(EditorError::NoActiveObject);
        }

        self.history.begin_batch();
        let moved = align_objects(&mut self.template.scene, &ids, edge);
        if moved > 0 {
            self.state = EditorState::Editing;
            self.history
                .record(&self.template.scene, HistoryLabel::Modified)?;
        }
        self.history
            .end_batch(&self.template.scene, HistoryLabel::Modified)?;
        Ok(moved)
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    fn reorder(&mut self, action: &'static str, front_first: bool, op: fn(&mut SceneGraph, ObjectId) -> bool) -> Result<bool, EditorError> {
        self.ensure_editable(action)?;
        self.finish_gesture();
        let mut ids = self.selection.selection().in_z_order(&self.template.scene);
        if ids.is_empty() {
            return Err(EditorError::NoActiveObject);
        }
        if front_first {
            ids.reverse();
        }
        let mut changed = false;
        for id in ids {
            changed |= op(&mut self.template.scene, id);
        }
        if changed {
            self.commit(HistoryLabel::Modified)?;
        }
        Ok(changed)
    }

    pub fn bring_to_front(&mut self) -> Result<bool, EditorError> {
        self.reorder("reorder", false, SceneGraph::bring_to_front)
    }

    pub fn send_to_back(&mut self) -> Result<bool, EditorError> {
        self.reorder("reorder", true, SceneGraph::send_to_back)
    }

    pub fn bring_forward(&mut self) -> Result<bool, EditorError> {
        self.reorder("reorder", true, SceneGraph::bring_forward)
    }

    pub fn send_backward(&mut self) -> Result<bool, EditorError> {
        self.reorder("reorder", false, SceneGraph::send_backward)
    }

    // ─── Properties ──────────────────────────────────────────────────────

    /// Panel read-out of the single active object.
    pub fn property_sheet(&self) -> Option<PropertySheet> {
        let id = self.selection.selection().active_object()?;
        self.template.scene.get(id).map(PropertySheet::from_object)
    }

    /// Apply a panel edit to `id`. Invalid values are rejected with the
    /// object untouched; an edit that changes nothing records nothing.
    pub fn apply_property(&mut self, id: ObjectId, edit: PropertyEdit) -> Result<bool, EditorError> {
        self.ensure_editable("edit properties")?;
        if let PropertyEdit::FieldName(path) = &edit {
            let document_type = self.template.document_type;
            if !is_known_field(document_type, path.trim()) {
                return Err(EditorError::UnknownField {
                    path: path.clone(),
                    document_type,
                });
            }
        }
        self.finish_gesture();
        let obj = self
            .template
            .scene
            .get_mut(id)
            .ok_or(EditorError::NotFound(id))?;
        let changed = apply_edit(obj, edit)?;
        if changed {
            self.commit(HistoryLabel::Modified)?;
        }
        Ok(changed)
    }

    pub fn set_locked(&mut self, id: ObjectId, locked: bool) -> Result<bool, EditorError> {
        self.apply_property(id, PropertyEdit::Locked(locked))
    }

    // ─── Live text editing ───────────────────────────────────────────────

    /// Enter text-edit mode on an editable, unlocked text object.
    pub fn begin_text_edit(&mut self, id: ObjectId) -> Result<(), EditorError> {
        self.ensure_editable("edit text")?;
        let obj = self.require(id)?;
        if obj.locked {
            return Err(EditorError::Locked(id));
        }
        if !(obj.editable && obj.kind.is_editable_text()) {
            return Err(EditorError::Rejected {
                property: "text",
                reason: format!("`{id}` is not editable text"),
            });
        }
        self.finish_gesture();
        self.selection.set_active_object(Some(id));
        self.text_edit = Some(TextEdit { id });
        Ok(())
    }

    /// Leave text-edit mode, writing `text` into the object as one snapshot.
    pub fn commit_text_edit(&mut self, text: &str) -> Result<bool, EditorError> {
        let edit = self.text_edit.take().ok_or(EditorError::NoActiveObject)?;
        self.apply_property(edit.id, PropertyEdit::Text(text.to_string()))
    }

    /// Leave text-edit mode without touching the object.
    pub fn cancel_text_edit(&mut self) {
        if let Some(edit) = self.text_edit.take() {
            log::trace!("text edit on `{}` cancelled", edit.id);
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve a key press against the session's platform profile and run
    /// it. During a text edit only Escape gets through (it cancels the edit).
    pub fn handle_key(&mut self, event: &KeyEvent) -> Result<KeyOutcome, EditorError> {
        let Some(cmd) = ShortcutMap::resolve(&self.profile, event) else {
            return Ok(KeyOutcome::Ignored);
        };
        if self.text_edit.is_some() {
            if cmd.suppressed_during_text_edit() {
                log::trace!("{cmd:?} suppressed during text edit");
                return Ok(KeyOutcome::Suppressed(cmd));
            }
            self.cancel_text_edit();
            return Ok(KeyOutcome::Handled(cmd));
        }
        self.execute(cmd)?;
        Ok(KeyOutcome::Handled(cmd))
    }

    /// Run a command through the same entry points as the toolbar.
    pub fn execute(&mut self, cmd: EditorCommand) -> Result<(), EditorError> {
        match cmd {
            EditorCommand::Delete => {
                self.delete_selected()?;
            }
            EditorCommand::Copy => {
                self.copy()?;
            }
            EditorCommand::Paste => {
                self.paste()?;
            }
            EditorCommand::Duplicate => {
                self.duplicate()?;
            }
            EditorCommand::SelectAll => self.select_all()?,
            EditorCommand::Nudge { direction, large } => {
                self.nudge(direction, large)?;
            }
            EditorCommand::Undo => {
                self.undo()?;
            }
            EditorCommand::Redo => {
                self.redo()?;
            }
            EditorCommand::BringForward
            | EditorCommand::SendBackward
            | EditorCommand::BringToFront
            | EditorCommand::SendToBack => {
                if self.selection.selection().is_empty() {
                    return Ok(());
                }
                match cmd {
                    EditorCommand::BringForward => self.bring_forward()?,
                    EditorCommand::SendBackward => self.send_backward()?,
                    EditorCommand::BringToFront => self.bring_to_front()?,
                    _ => self.send_to_back()?,
                };
            }
            EditorCommand::ClearSelection => self.clear_selection(),
        }
        Ok(())
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    /// Step back one snapshot. `false` at the oldest entry.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_editable("undo")?;
        self.finish_gesture();
        let Some(label) = self.history.undo(&mut self.template.scene)? else {
            return Ok(false);
        };
        log::debug!("undo {label:?}");
        self.after_restore();
        Ok(true)
    }

    /// Step forward one snapshot. `false` at the tip.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_editable("redo")?;
        self.finish_gesture();
        let Some(label) = self.history.redo(&mut self.template.scene)? else {
            return Ok(false);
        };
        log::debug!("redo {label:?}");
        self.after_restore();
        Ok(true)
    }

    fn after_restore(&mut self) {
        self.state = EditorState::Editing;
        self.text_edit = None;
        self.selection.retain_existing(&self.template.scene);
    }
}
