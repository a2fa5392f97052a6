//! Editor tuning knobs.

use tmpl_core::factory::DEFAULT_TABLE_ROWS;

/// Settings fixed for the lifetime of an editor session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Maximum undo depth; the oldest snapshots are dropped beyond it.
    pub history_depth: usize,
    /// Offset applied to pasted and duplicated objects.
    pub paste_offset: (f64, f64),
    /// Arrow-key nudge distance.
    pub nudge_step: f64,
    /// Shift+arrow nudge distance.
    pub nudge_step_large: f64,
    /// Thumbnail scale relative to the page (1.0 = 595x842 px).
    pub thumbnail_scale: f64,
    /// Placeholder rows in a new line-items table.
    pub table_rows: usize,
    /// Pointer slop for picking thin objects, in page units.
    pub hit_tolerance: f64,
    /// Grab radius of transform handles.
    pub handle_radius: f64,
    /// Rotation step while Shift is held, in degrees.
    pub rotation_snap: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 50,
            paste_offset: (10.0, 10.0),
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            thumbnail_scale: 0.3,
            table_rows: DEFAULT_TABLE_ROWS,
            hit_tolerance: 3.0,
            handle_radius: 6.0,
            rotation_snap: 15.0,
        }
    }
}
