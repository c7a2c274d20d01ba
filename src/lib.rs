// SPDX-License-Identifier: MIT
//! ghostline — editor-embedded, debounced AI inline-completion engine.
//!
//! Ghostline watches text-editing activity reported by a host editor, waits
//! out a quiet period, snapshots the buffer, asks a local inference endpoint
//! for a completion, and renders the result as ghost text the user can accept
//! or discard. It is a thin orchestration layer: buffer storage, rendering,
//! syntax parsing, and command registration all stay on the host side of the
//! [`editor::EditorHost`] / [`project::SymbolSource`] traits.
//!
//! # Wiring
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ghostline::{config::EngineConfig, dispatch::HttpTransport, engine::Engine};
//!
//! let config = EngineConfig::load(&config_dir);
//! ghostline::observability::init_tracing(&config.log, &config.log_format);
//! let transport = Arc::new(HttpTransport::new(&config.endpoint)?);
//! let engine = Engine::new(&config, host_adapter, transport, symbol_source);
//!
//! // host event hooks:
//! //   text changed (insert mode)   -> engine.on_buffer_edit().await
//! //   cursor moved (insert mode)   -> engine.on_cursor_moved().await
//! //   accept key                   -> if !engine.accept().await { /* default action */ }
//! //   native completion accepted   -> engine.note_host_completion_accepted().await
//! // commands:
//! //   :GhostlineEnable / Disable   -> engine.set_auto_trigger(true / false).await
//! //   :GhostlineDescribe           -> engine.describe_file().await
//! //   :GhostlineSummarize          -> engine.summarize_project(&root).await
//! ```

pub mod config;
pub mod context;
pub mod dispatch;
pub mod editor;
pub mod engine;
pub mod observability;
pub mod present;
pub mod project;

pub use config::EngineConfig;
pub use dispatch::{DispatchError, HttpTransport, Mode, ModelTransport, Outcome};
pub use editor::{BufferKind, DocumentSnapshot, EditorHost, OverlayId, Position};
pub use engine::{Engine, Phase};
pub use project::SymbolSource;
