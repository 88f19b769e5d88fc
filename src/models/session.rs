// ABOUTME: Session identity and window binding models
// Derives stable tmux session names from namespaces and relates apps to live windows

use crate::config::ConfigError;
use std::fmt;

/// Characters tmux rejects in session names or parses as target syntax.
const PROBLEMATIC_CHARS: [char; 14] = [
    '/', '\\', ':', ';', '|', '&', '(', ')', '<', '>', '"', '\'', '.', '$',
];

/// Name of a tmux session, derived from a topology namespace.
///
/// The same namespace always yields the same id, so re-running the tool
/// targets the session created by the previous run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Derive the session id for a namespace.
    ///
    /// The namespace is reused as-is when tmux accepts it. Otherwise the
    /// sanitized form gets a short hash of the raw namespace appended so two
    /// namespaces that sanitize to the same string still get distinct sessions.
    /// Namespaces that already end in `_` plus eight hex digits are hashed too,
    /// so they cannot take over the name derived for another namespace.
    pub fn derive(namespace: &str) -> Result<Self, ConfigError> {
        let trimmed = namespace.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        let sanitized = sanitize_tmux_name(trimmed);
        if sanitized == namespace && !has_hash_suffix(namespace) {
            Ok(Self(sanitized))
        } else {
            Ok(Self(format!("{}_{:08x}", sanitized, fnv1a(namespace.as_bytes()))))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact-match target for commands addressing the session itself.
    pub fn target(&self) -> String {
        format!("={}", self.0)
    }

    /// Target that places a new window at the next free index of the session.
    pub fn window_target(&self) -> String {
        format!("={}:", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace characters that are unsafe in tmux names with underscores.
pub fn sanitize_tmux_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || PROBLEMATIC_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

// Matches the `_{:08x}` suffix `derive` appends.
fn has_hash_suffix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 9
        && bytes[bytes.len() - 9] == b'_'
        && bytes[bytes.len() - 8..]
            .iter()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
}

// 32-bit FNV-1a, stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(0x0100_0193)
    })
}

/// A live window inside a tmux session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRef {
    pub index: u32,
    pub id: String,
    pub name: String,
}

/// Relates an app from the topology to the window running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowBinding {
    pub app_name: String,
    pub window: WindowRef,
}

/// Result of ensuring a session: which session, and where each app lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub session_id: SessionId,
    pub bindings: Vec<WindowBinding>,
}

impl SessionHandle {
    pub fn binding(&self, app_name: &str) -> Option<&WindowBinding> {
        self.bindings.iter().find(|b| b.app_name == app_name)
    }
}
