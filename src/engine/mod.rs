// SPDX-License-Identifier: MIT
//! Suggestion lifecycle engine — the debounced-request state machine.
//!
//! Owns the debounce timer, the auto-trigger flag, the single current
//! suggestion slot, and the self-edit suppression window, and mediates
//! between editor-change events, timer expiry, dispatch results, and
//! user accept/dismiss actions.
//!
//! # State machine
//!
//! ```text
//! Idle ──(qualifying edit)──► Armed ──(debounce elapses)──► Pending
//!   ▲                           │ ▲                            │
//!   │                (edit re-arms, restarting the deadline)   │
//!   │                                                          │
//!   ├◄──(empty / error / stale)────────────────────────────────┤
//!   │                                                          ▼
//!   ├◄──(accept: splice + suppression)──────────────────── Suggested
//!   └◄──(cursor move: dismiss, no suppression)─────────────────┘
//! ```
//!
//! Every qualifying edit bumps a generation counter and any timer firing or
//! dispatch resolution carrying a stale generation is discarded. This closes
//! the out-of-order-response race: with no transport-level cancellation, an
//! old request can still resolve late, but it can never render.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, ScanConfig, TriggerConfig};
use crate::context;
use crate::dispatch::{DispatchError, Dispatcher, Mode, ModelTransport, Outcome};
use crate::editor::{EditorHost, OverlayId, Position};
use crate::present::clean_modal_body;
use crate::project::{scan_project, SymbolSource};

/// Observable lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing armed, nothing shown.
    Idle,
    /// The debounce timer is running; a further edit restarts it.
    Armed,
    /// The debounce deadline elapsed and a dispatch is outstanding.
    Pending,
    /// A ghost-text suggestion is rendered and awaiting accept or dismiss.
    Suggested,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Armed => write!(f, "armed"),
            Phase::Pending => write!(f, "pending"),
            Phase::Suggested => write!(f, "suggested"),
        }
    }
}

/// The single active proposed completion.
#[derive(Debug, Clone)]
struct Suggestion {
    /// Exact characters to insert, already scrubbed by the dispatcher.
    text: String,
    /// Position the suggestion was rendered at and will be spliced into.
    anchor: Position,
    /// Overlay handle, used solely for removal.
    overlay: OverlayId,
}

/// Mutable state guarded by the engine mutex. One writer context: every
/// transition (edit, timer firing, dispatch resolution, accept, dismiss)
/// runs under this lock, so no two transitions ever interleave.
struct Inner {
    phase: Phase,
    /// Bumped on every qualifying edit; stale timer firings and dispatch
    /// resolutions are identified by comparing against it.
    generation: u64,
    auto_trigger: bool,
    /// While `Instant::now()` is before this, edits do not arm the timer.
    /// Lowered purely by clock expiry, never by a matching "off" event,
    /// so it cannot be left permanently raised.
    suppress_until: Option<Instant>,
    suggestion: Option<Suggestion>,
}

impl Inner {
    fn suppressed(&self) -> bool {
        self.suppress_until.is_some_and(|until| Instant::now() < until)
    }

    fn raise_suppression(&mut self, window: std::time::Duration) {
        self.suppress_until = Some(Instant::now() + window);
    }
}

/// The suggestion lifecycle engine.
///
/// Cheaply cloneable — all clones share state via `Arc`. The embedding
/// editor constructs one engine and wires its event hooks to the methods
/// below:
///
/// - insert-mode text change  → [`Engine::on_buffer_edit`]
/// - insert-mode cursor move  → [`Engine::on_cursor_moved`]
/// - accept keybinding        → [`Engine::accept`] (fall through on `false`)
/// - native completion accept → [`Engine::note_host_completion_accepted`]
/// - user commands            → [`Engine::set_auto_trigger`],
///   [`Engine::describe_file`], [`Engine::summarize_project`]
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Mutex<Inner>>,
    editor: Arc<dyn EditorHost>,
    dispatcher: Arc<Dispatcher>,
    symbols: Arc<dyn SymbolSource>,
    trigger: TriggerConfig,
    scan: ScanConfig,
}

impl Engine {
    pub fn new(
        config: &EngineConfig,
        editor: Arc<dyn EditorHost>,
        transport: Arc<dyn ModelTransport>,
        symbols: Arc<dyn SymbolSource>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                phase: Phase::Idle,
                generation: 0,
                auto_trigger: config.trigger.auto_trigger,
                suppress_until: None,
                suggestion: None,
            })),
            editor,
            dispatcher: Arc::new(Dispatcher::new(transport)),
            symbols,
            trigger: config.trigger.clone(),
            scan: config.scan.clone(),
        }
    }

    // ─── Edit / timer path ───────────────────────────────────────────────────

    /// Entry point for insert-mode text changes.
    ///
    /// Any existing suggestion is destroyed immediately: an edit always
    /// invalidates the prior suggestion, even before a new request resolves.
    /// If the edit qualifies (eligible buffer, auto-trigger on, suppression
    /// not raised), the debounce timer is (re)armed from this edit.
    pub async fn on_buffer_edit(&self) {
        let mut inner = self.inner.lock().await;
        self.drop_suggestion(&mut inner);

        if !inner.auto_trigger {
            return;
        }
        if inner.suppressed() {
            debug!("edit within suppression window, not arming");
            return;
        }
        let Some(snapshot) = self.editor.snapshot() else {
            return;
        };
        if !context::is_eligible(&snapshot, &self.trigger) {
            return;
        }

        // Re-arming restarts the deadline: the generation bump strands any
        // previously spawned timer task.
        inner.generation = inner.generation.wrapping_add(1);
        inner.phase = Phase::Armed;
        let generation = inner.generation;
        debug!(generation, "debounce armed");
        drop(inner);

        let engine = self.clone();
        tokio::spawn(async move {
            engine.debounce_then_dispatch(generation).await;
        });
    }

    /// Trailing-edge debounce: wait out the quiet period, then dispatch if
    /// this timer is still the latest one.
    async fn debounce_then_dispatch(&self, generation: u64) {
        tokio::time::sleep(self.trigger.debounce()).await;

        let payload = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation || inner.phase != Phase::Armed {
                return; // a newer edit re-armed, or state moved on
            }
            let Some(snapshot) = self.editor.snapshot() else {
                inner.phase = Phase::Idle;
                return;
            };
            inner.phase = Phase::Pending;
            context::extract(&snapshot)
        };

        // No lock across the await: edits stay fully interactive while the
        // request is outstanding.
        let outcome = self.dispatcher.dispatch(&payload, Mode::Complete).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            debug!(generation, "stale dispatch resolution discarded");
            return;
        }
        match outcome {
            Ok(Outcome::Text(text)) => {
                // The buffer may have scrolled or the cursor moved since the
                // request was issued; render at the cursor position as of now.
                let Some(snapshot) = self.editor.snapshot() else {
                    inner.phase = Phase::Idle;
                    return;
                };
                let anchor = snapshot.cursor;
                self.drop_suggestion(&mut inner);
                let overlay = self.editor.render_overlay(anchor, &text);
                debug!(generation, line = anchor.line, col = anchor.col, "suggestion rendered");
                inner.suggestion = Some(Suggestion { text, anchor, overlay });
                inner.phase = Phase::Suggested;
            }
            Ok(Outcome::Empty) => {
                debug!(generation, "empty completion, nothing to suggest");
                inner.phase = Phase::Idle;
            }
            Err(err) => {
                // Inline completion failures are swallowed: never interrupt
                // typing flow with an error surface.
                debug!(generation, error = %err, "completion dispatch failed");
                inner.phase = Phase::Idle;
            }
        }
    }

    // ─── User actions ────────────────────────────────────────────────────────

    /// Accept the active suggestion.
    ///
    /// Splices the suggestion text into its anchor line at the stored column,
    /// advances the cursor past the inserted text, and raises the suppression
    /// window so the self-inflicted edit does not re-arm the timer.
    ///
    /// Returns `false` when no suggestion is active; the host keybinding must
    /// then fall through to its default action, never swallowing the key.
    pub async fn accept(&self) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(suggestion) = inner.suggestion.take() else {
            return false;
        };
        self.editor.remove_overlay(suggestion.overlay);

        if let Some(line) = self.editor.line(suggestion.anchor.line) {
            let (spliced, new_col) =
                splice_line(&line, suggestion.anchor.col as usize, &suggestion.text);
            self.editor.set_line(suggestion.anchor.line, &spliced);
            self.editor.set_cursor(Position {
                line: suggestion.anchor.line,
                col: new_col as u32,
            });
        } else {
            warn!(line = suggestion.anchor.line, "anchor line vanished before accept");
        }

        inner.raise_suppression(self.trigger.suppress());
        inner.phase = Phase::Idle;
        debug!("suggestion accepted");
        true
    }

    /// Dismiss on cursor movement without accepting.
    ///
    /// The overlay is removed and the suggestion destroyed, but no
    /// suppression is raised: this is a real edit path, and a following
    /// qualifying edit may immediately re-arm.
    pub async fn on_cursor_moved(&self) {
        let mut inner = self.inner.lock().await;
        if inner.phase == Phase::Suggested {
            self.drop_suggestion(&mut inner);
            debug!("suggestion dismissed by cursor movement");
        }
    }

    /// The host editor's own completion menu accepted an entry; raise the
    /// shared suppression window so the resulting buffer edit does not
    /// re-trigger.
    pub async fn note_host_completion_accepted(&self) {
        let mut inner = self.inner.lock().await;
        inner.raise_suppression(self.trigger.suppress());
    }

    /// Toggle the auto-trigger flag. Independent of the suppression window.
    pub async fn set_auto_trigger(&self, enabled: bool) {
        let mut inner = self.inner.lock().await;
        inner.auto_trigger = enabled;
        info!(enabled, "auto-trigger flag set");
    }

    pub async fn auto_trigger(&self) -> bool {
        self.inner.lock().await.auto_trigger
    }

    /// Current lifecycle phase (diagnostics).
    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.phase
    }

    // ─── On-demand commands ──────────────────────────────────────────────────

    /// Describe the current file in a modal. Failures surface as a single
    /// error toast; no automatic retry.
    pub async fn describe_file(&self) {
        let Some(snapshot) = self.editor.snapshot() else {
            self.editor.notify_error("describe: no active file");
            return;
        };
        let payload = context::extract(&snapshot);
        match self.dispatcher.dispatch(&payload, Mode::Describe).await {
            Ok(Outcome::Text(body)) => {
                self.editor.show_modal("File description", &clean_modal_body(&body));
            }
            Ok(Outcome::Empty) => {
                self.editor.notify_error("describe: model returned an empty response");
            }
            Err(DispatchError::Transport(msg)) => {
                warn!(error = %msg, "describe dispatch failed");
                self.editor.notify_error(&format!("describe failed: {msg}"));
            }
        }
    }

    /// Summarize the project rooted at `root` in a modal. The symbol listing
    /// comes from the host's [`SymbolSource`]; failures surface as a single
    /// error toast.
    pub async fn summarize_project(&self, root: &std::path::Path) {
        let listing = match scan_project(root, self.symbols.as_ref(), &self.scan) {
            Ok(listing) => listing,
            Err(err) => {
                warn!(error = %err, "project scan failed");
                self.editor.notify_error(&format!("summarize failed: {err}"));
                return;
            }
        };
        let payload = crate::context::ContextPayload {
            text: listing,
            cursor_line: 0,
            cursor_col: 0,
            language_tag: "plaintext",
        };
        match self.dispatcher.dispatch(&payload, Mode::SummarizeProject).await {
            Ok(Outcome::Text(body)) => {
                self.editor.show_modal("Project summary", &clean_modal_body(&body));
            }
            Ok(Outcome::Empty) => {
                self.editor.notify_error("summarize: model returned an empty response");
            }
            Err(DispatchError::Transport(msg)) => {
                warn!(error = %msg, "summarize dispatch failed");
                self.editor.notify_error(&format!("summarize failed: {msg}"));
            }
        }
    }

    // ─── Internal ────────────────────────────────────────────────────────────

    /// Destroy the current suggestion, if any: overlay removed, handle
    /// invalidated, phase back to Idle when it was Suggested.
    fn drop_suggestion(&self, inner: &mut Inner) {
        if let Some(suggestion) = inner.suggestion.take() {
            self.editor.remove_overlay(suggestion.overlay);
            if inner.phase == Phase::Suggested {
                inner.phase = Phase::Idle;
            }
        }
    }
}

/// Splice `text` into `line` at character column `col`:
/// `prefix(col) + text + suffix(col)`. Returns the new line and the cursor
/// column just past the inserted text.
fn splice_line(line: &str, col: usize, text: &str) -> (String, usize) {
    let split = line
        .char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let col = col.min(line.chars().count());
    let mut spliced = String::with_capacity(line.len() + text.len());
    spliced.push_str(&line[..split]);
    spliced.push_str(text);
    spliced.push_str(&line[split..]);
    (spliced, col + text.chars().count())
}
