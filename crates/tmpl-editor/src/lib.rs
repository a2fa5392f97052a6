pub mod align;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod properties;
pub mod selection;
pub mod session;
pub mod shortcuts;
pub mod store;

pub use align::{AlignEdge, align_objects};
pub use clipboard::{Clipboard, duplicate};
pub use config::EditorConfig;
pub use error::EditorError;
pub use history::{History, HistoryLabel};
pub use input::{InputEvent, KeyEvent, Modifiers};
pub use properties::{PropertyEdit, PropertySheet, TextProperties, apply_edit};
pub use selection::{GestureState, IdList, Selection, SelectionController};
pub use session::{EditorSession, EditorState, KeyOutcome};
pub use shortcuts::{Direction, EditorCommand, PlatformProfile, ShortcutMap};
pub use store::{MemoryStore, SaveRequest, StoreError, StoredTemplate, TemplateStore};
