// ABOUTME: Helpers for building tmux command lines and parsing their output

use crate::models::{SessionId, WindowRef};
use crate::tmux::TmuxError;

/// `-F` format used for every window listing. The name goes last so that
/// `|` inside a window name survives the split.
pub const WINDOW_FORMAT: &str = "#{window_index}|#{window_id}|#{window_name}";

pub fn parse_window_line(line: &str) -> Result<WindowRef, TmuxError> {
    let mut parts = line.splitn(3, '|');
    let (Some(index), Some(id), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(TmuxError::UnexpectedOutput(line.to_string()));
    };
    let index = index
        .trim()
        .parse()
        .map_err(|_| TmuxError::UnexpectedOutput(line.to_string()))?;

    Ok(WindowRef {
        index,
        id: id.to_string(),
        name: name.to_string(),
    })
}

/// Parse `list-windows` output, sorted by window index.
pub fn parse_window_list(stdout: &str) -> Result<Vec<WindowRef>, TmuxError> {
    let mut windows = stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_window_line)
        .collect::<Result<Vec<_>, _>>()?;
    windows.sort_by_key(|w| w.index);
    Ok(windows)
}

/// Prefix a command so its window stays open, showing the last output,
/// after the process exits. The option is set from inside the pane before
/// the command starts, so even instantly-exiting commands are kept.
pub fn keep_output_on_exit(tmux_program: &str, command: &str) -> String {
    format!(
        "{} set-option -w -t \"$TMUX_PANE\" remain-on-exit on >/dev/null 2>&1; {}",
        shell_quote(tmux_program),
        command
    )
}

/// Shell command a terminal can run to attach to the session.
pub fn attach_command(tmux_program: &str, session: &SessionId) -> String {
    format!(
        "{} attach-session -t {}",
        shell_quote(tmux_program),
        shell_quote(&session.target())
    )
}

// Window ids (`@N`) grow monotonically for the life of the server.
fn window_serial(window: &WindowRef) -> Option<u64> {
    window.id.strip_prefix('@')?.parse().ok()
}

/// Another window with the same name as `created` that was opened before it.
///
/// tmux allows duplicate window names, so two clients creating the same app
/// at once both succeed. The older window is the one to keep.
pub fn earlier_duplicate<'a>(
    windows: &'a [WindowRef],
    created: &WindowRef,
) -> Option<&'a WindowRef> {
    let created_serial = window_serial(created);
    windows
        .iter()
        .filter(|w| w.name == created.name && w.id != created.id)
        .find(|w| match (window_serial(w), created_serial) {
            (Some(serial), Some(ours)) => serial < ours,
            _ => w.index < created.index,
        })
}

/// Quote a single shell word with single quotes when it needs quoting.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=@%+,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Whether tmux stderr says the target session (or the whole server) is gone.
pub(crate) fn is_missing_session(stderr: &str) -> bool {
    stderr.contains("can't find session")
        || stderr.contains("no server running")
        || stderr.contains("error connecting to")
        || stderr.contains("session not found")
}
