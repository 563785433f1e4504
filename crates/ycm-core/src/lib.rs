//! `ycm-core` — host-environment helpers for an editor plugin that drives an
//! external code-completion server.
//!
//! - [`port`]: pick a free loopback port for the server to listen on.
//! - [`exe`]: find executables on `PATH`, and the Python 2.7 interpreter the
//!   server runs under.
//! - [`encoding`]: normalize mixed text/bytes payloads and serialize them as
//!   UTF-8 JSON.
//! - [`timer`]: [`DeferredAction`], a resettable one-shot timer used to
//!   debounce requests.
//! - [`settings`]: the plugin's YAML settings.

pub mod encoding;
pub mod error;
pub mod exe;
pub mod port;
pub mod settings;
pub mod timer;

pub use encoding::{normalize_to_text, to_text_if_needed, to_utf8_json, Data, Scalar};
pub use error::{BridgeError, Result, TimerError};
pub use exe::{find_executable, on_windows, path_to_first_existing_executable, path_to_python};
pub use port::get_unused_localhost_port;
pub use settings::Settings;
pub use timer::{DeferredAction, Phase};
