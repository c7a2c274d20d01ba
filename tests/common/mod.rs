//! Shared test doubles: an in-memory editor host and a scripted transport.
#![allow(dead_code)] // each test binary uses a different subset of helpers

use std::collections::HashMap;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ghostline::config::EngineConfig;
use ghostline::dispatch::{DispatchError, ModelTransport};
use ghostline::editor::{BufferKind, DocumentSnapshot, EditorHost, OverlayId, Position};
use ghostline::engine::Engine;
use ghostline::project::SymbolSource;

// ─── MockEditor ───────────────────────────────────────────────────────────────

pub struct EditorState {
    pub kind: BufferKind,
    pub path: Option<String>,
    pub lines: Vec<String>,
    pub cursor: Position,
    /// Live overlays by handle.
    pub overlays: HashMap<u64, (Position, String)>,
    pub next_overlay: u64,
    /// Total overlays ever rendered (live + removed).
    pub rendered_total: usize,
    pub modals: Vec<(String, Vec<String>)>,
    pub errors: Vec<String>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            kind: BufferKind::Other,
            path: None,
            lines: vec![String::new()],
            cursor: Position { line: 0, col: 0 },
            overlays: HashMap::new(),
            next_overlay: 0,
            rendered_total: 0,
            modals: Vec::new(),
            errors: Vec::new(),
        }
    }
}

pub struct MockEditor {
    pub state: Mutex<EditorState>,
}

impl MockEditor {
    pub fn file(path: &str, text: &str, cursor: Position) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(EditorState {
                kind: BufferKind::File,
                path: Some(path.to_string()),
                lines: text.split('\n').map(str::to_string).collect(),
                cursor,
                ..EditorState::default()
            }),
        })
    }

    pub fn with_kind(kind: BufferKind) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(EditorState {
                kind,
                lines: vec![String::new()],
                ..EditorState::default()
            }),
        })
    }

    pub fn buffer_text(&self) -> String {
        self.state.lock().unwrap().lines.join("\n")
    }

    pub fn cursor(&self) -> Position {
        self.state.lock().unwrap().cursor
    }

    pub fn live_overlays(&self) -> usize {
        self.state.lock().unwrap().overlays.len()
    }

    pub fn rendered_total(&self) -> usize {
        self.state.lock().unwrap().rendered_total
    }

    pub fn modals(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().modals.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.lock().unwrap().errors.clone()
    }

    pub fn move_cursor(&self, pos: Position) {
        self.state.lock().unwrap().cursor = pos;
    }
}

impl EditorHost for MockEditor {
    fn snapshot(&self) -> Option<DocumentSnapshot> {
        let state = self.state.lock().unwrap();
        Some(DocumentSnapshot {
            kind: state.kind,
            path: state.path.clone(),
            text: state.lines.join("\n"),
            cursor: state.cursor,
        })
    }

    fn line(&self, row: u32) -> Option<String> {
        self.state.lock().unwrap().lines.get(row as usize).cloned()
    }

    fn set_line(&self, row: u32, text: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(line) = state.lines.get_mut(row as usize) {
            *line = text.to_string();
        }
    }

    fn set_cursor(&self, pos: Position) {
        self.state.lock().unwrap().cursor = pos;
    }

    fn render_overlay(&self, pos: Position, text: &str) -> OverlayId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_overlay;
        state.next_overlay += 1;
        state.rendered_total += 1;
        state.overlays.insert(id, (pos, text.to_string()));
        OverlayId(id)
    }

    fn remove_overlay(&self, id: OverlayId) {
        self.state.lock().unwrap().overlays.remove(&id.0);
    }

    fn show_modal(&self, title: &str, lines: &[String]) {
        self.state
            .lock()
            .unwrap()
            .modals
            .push((title.to_string(), lines.to_vec()));
    }

    fn notify_error(&self, message: &str) {
        self.state.lock().unwrap().errors.push(message.to_string());
    }
}

// ─── ScriptedTransport ────────────────────────────────────────────────────────

/// Returns scripted responses in order, each after an optional delay. Falls
/// back to an empty envelope once the script runs out.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<(Duration, Result<String, String>)>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn respond(self: Arc<Self>, body: &str) -> Arc<Self> {
        self.respond_after(Duration::ZERO, body)
    }

    pub fn respond_after(self: Arc<Self>, delay: Duration, body: &str) -> Arc<Self> {
        self.responses
            .lock()
            .unwrap()
            .push_back((delay, Ok(body.to_string())));
        self
    }

    pub fn fail(self: Arc<Self>, message: &str) -> Arc<Self> {
        self.responses
            .lock()
            .unwrap()
            .push_back((Duration::ZERO, Err(message.to_string())));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    async fn generate(&self, prompt: &str) -> Result<String, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let scripted = self.responses.lock().unwrap().pop_front();
        let (delay, result) =
            scripted.unwrap_or((Duration::ZERO, Ok(r#"{"response": ""}"#.to_string())));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result.map_err(DispatchError::Transport)
    }
}

// ─── Symbol source ────────────────────────────────────────────────────────────

/// Extracts `fn` names, enough to exercise the scan without a real parser.
pub struct FnNameSource;

impl SymbolSource for FnNameSource {
    fn symbols(&self, _path: &Path, text: &str) -> Vec<String> {
        text.lines()
            .filter_map(|l| l.trim().strip_prefix("fn "))
            .map(|rest| rest.split('(').next().unwrap_or(rest).to_string())
            .collect()
    }
}

// ─── Harness ──────────────────────────────────────────────────────────────────

/// Short real delays, in the spirit of the production defaults.
pub fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.trigger.debounce_ms = 40;
    config.trigger.suppress_ms = 150;
    config
}

pub fn engine_with(
    config: &EngineConfig,
    editor: Arc<MockEditor>,
    transport: Arc<ScriptedTransport>,
) -> Engine {
    Engine::new(config, editor, transport, Arc::new(FnNameSource))
}

/// Poll `cond` until it holds or `timeout_ms` elapses.
pub async fn wait_until(cond: impl Fn() -> bool, timeout_ms: u64) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return cond();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
