// SPDX-License-Identifier: MIT
//! Host editor capability surface.
//!
//! Ghostline never touches buffer storage or rendering primitives directly.
//! The embedding editor implements [`EditorHost`] and hands it to the engine;
//! everything the engine needs from the editor — buffer snapshots, a narrow
//! line/cursor mutation surface, ghost-text overlays, modals, toasts — flows
//! through this trait.

/// The kind of buffer a snapshot was taken from.
///
/// Only `File` buffers are eligible for auto-triggered completions; scratch,
/// prompt, and tree surfaces never arm the debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// A normal, file-backed buffer.
    File,
    /// An unnamed scratch buffer.
    Scratch,
    /// A command-line / prompt surface.
    Prompt,
    /// A file-tree or other special UI surface.
    Tree,
    /// Anything else the host cannot classify.
    Other,
}

/// A (line, column) position in a document. 0-based, character columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

/// Opaque handle to a rendered ghost-text overlay.
///
/// Produced by [`EditorHost::render_overlay`] and used solely to remove the
/// overlay later. The engine never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayId(pub u64);

/// A point-in-time observation of the active document.
///
/// Purely a value — taking a snapshot must not mutate editor state.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub kind: BufferKind,
    /// Absolute path of the backing file, if any.
    pub path: Option<String>,
    /// Full buffer text.
    pub text: String,
    /// Primary cursor position at snapshot time.
    pub cursor: Position,
}

impl DocumentSnapshot {
    /// File extension of the backing file, lowercased, if any.
    pub fn extension(&self) -> Option<String> {
        let path = self.path.as_deref()?;
        std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Capability interface implemented by the embedding editor.
///
/// All methods are synchronous: they map onto main-thread editor API calls
/// and must be cheap. The engine serializes its own state transitions, so
/// implementations are never called re-entrantly for the same suggestion.
pub trait EditorHost: Send + Sync {
    /// Observe the active document, or `None` when no buffer has focus.
    fn snapshot(&self) -> Option<DocumentSnapshot>;

    /// Read a single line (0-based). `None` if the row is out of range.
    fn line(&self, row: u32) -> Option<String>;

    /// Replace a single line. `text` may contain embedded newlines when a
    /// multi-line suggestion is accepted; the host splits them as its buffer
    /// model requires.
    fn set_line(&self, row: u32, text: &str);

    /// Move the primary cursor.
    fn set_cursor(&self, pos: Position);

    /// Render ghost text at `pos` and return a handle for later removal.
    ///
    /// A visual decoration only — must not mutate document content.
    fn render_overlay(&self, pos: Position, text: &str) -> OverlayId;

    /// Remove a previously rendered overlay. Removing an already-removed
    /// handle is a no-op.
    fn remove_overlay(&self, id: OverlayId);

    /// Open a modal view with the given title and body lines. Dismissal is
    /// host-scoped and outside this crate's control.
    fn show_modal(&self, title: &str, lines: &[String]);

    /// Show a one-shot error toast.
    fn notify_error(&self, message: &str);
}
