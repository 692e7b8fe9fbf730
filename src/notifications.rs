//! Transient toasts and audio cues
//! Sound is a macOS system sound where available, the terminal bell elsewhere

#[cfg(target_os = "macos")]
use std::process::Command;
use std::time::{Duration, Instant};

/// Default lifetime of a success toast
pub const SUCCESS_TOAST_MS: u64 = 3000;
/// Default lifetime of an error toast
pub const ERROR_TOAST_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A message that disappears on its own
#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Lifetimes for each toast kind
#[derive(Debug, Clone, Copy)]
pub struct ToastDurations {
    pub success: Duration,
    pub error: Duration,
}

impl Default for ToastDurations {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(SUCCESS_TOAST_MS),
            error: Duration::from_millis(ERROR_TOAST_MS),
        }
    }
}

/// Short sound played per event class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Added,
    Completed,
    Uncompleted,
    Error,
    Success,
}

impl Cue {
    /// macOS system sound for this cue (added and completed share one)
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    fn system_sound(&self) -> &'static str {
        match self {
            Cue::Added | Cue::Completed => "Glass",
            Cue::Uncompleted => "Pop",
            Cue::Error => "Basso",
            Cue::Success => "Tink",
        }
    }
}

/// Play a cue without blocking the event loop
pub fn play_cue(cue: Cue) {
    #[cfg(target_os = "macos")]
    {
        let path = format!("/System/Library/Sounds/{}.aiff", cue.system_sound());
        if let Err(e) = Command::new("afplay").arg(&path).spawn() {
            tracing::debug!("could not play {:?} cue: {}", cue, e);
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        use std::io::Write;

        // Terminal bell; errors get a double ring
        let bell: &[u8] = if cue == Cue::Error { &b"\x07\x07"[..] } else { &b"\x07"[..] };
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(bell).and_then(|_| stdout.flush()) {
            tracing::debug!("could not ring bell for {:?} cue: {}", cue, e);
        }
    }
}
