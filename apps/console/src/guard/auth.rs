use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

/// Token sent when no real token is available.
pub const MOCK_TOKEN: &str = "MOCK_TOKEN";

#[derive(Debug, Clone, PartialEq)]
enum AuthState {
    Pending,
    Ready(Option<String>),
}

/// Readiness flag for the bearer token. Requests wait for it, but only for a
/// bounded time; after that they go out with whatever token is known.
#[derive(Debug, Clone)]
pub struct AuthGate {
    state: watch::Receiver<AuthState>,
}

/// Write side of an [`AuthGate`].
#[derive(Debug)]
pub struct AuthHandle {
    state: watch::Sender<AuthState>,
}

impl AuthGate {
    /// A gate that is not ready yet.
    pub fn pending() -> (AuthGate, AuthHandle) {
        let (tx, rx) = watch::channel(AuthState::Pending);
        (AuthGate { state: rx }, AuthHandle { state: tx })
    }

    /// A gate that is ready from the start.
    pub fn ready(token: Option<String>) -> AuthGate {
        let (gate, handle) = AuthGate::pending();
        handle.set_ready(token);
        gate
    }

    /// Resolves the token in a background task: an explicit token wins,
    /// otherwise the first non-blank line of `token_file` is used. Requests
    /// made before the task finishes wait on the gate.
    pub fn resolve_in_background(token: Option<String>, token_file: Option<PathBuf>) -> AuthGate {
        let (gate, handle) = AuthGate::pending();
        tokio::spawn(async move {
            let token = match (token, token_file) {
                (Some(token), _) => Some(token),
                (None, Some(path)) => read_token_file(&path).await,
                (None, None) => None,
            };
            handle.set_ready(token);
        });
        gate
    }

    /// Waits up to `max_wait` for readiness and returns the token to send.
    pub async fn token(&self, max_wait: Duration) -> String {
        let mut rx = self.state.clone();
        let waited = tokio::time::timeout(
            max_wait,
            rx.wait_for(|s| matches!(s, AuthState::Ready(_))),
        )
        .await;

        match waited {
            Ok(Ok(_)) => debug!("Auth ready"),
            Ok(Err(_)) => warn!("Auth source dropped before becoming ready, proceeding"),
            Err(_) => warn!(
                "Auth not ready after {}ms, proceeding without waiting",
                max_wait.as_millis()
            ),
        }

        let token = match &*self.state.borrow() {
            AuthState::Ready(Some(token)) if !token.trim().is_empty() => token.clone(),
            _ => MOCK_TOKEN.to_string(),
        };
        token
    }
}

impl AuthHandle {
    pub fn set_ready(&self, token: Option<String>) {
        // send_replace keeps the value even when no receiver is waiting
        self.state.send_replace(AuthState::Ready(token));
    }
}

async fn read_token_file(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string),
        Err(e) => {
            warn!(path = %path.display(), "Failed to read token file: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_token_is_used() {
        let gate = AuthGate::ready(Some("abc".into()));
        assert_eq!(gate.token(Duration::from_secs(5)).await, "abc");
    }

    #[tokio::test]
    async fn test_missing_token_falls_back_to_mock() {
        let gate = AuthGate::ready(None);
        assert_eq!(gate.token(Duration::from_secs(5)).await, MOCK_TOKEN);

        let gate = AuthGate::ready(Some("  ".into()));
        assert_eq!(gate.token(Duration::from_secs(5)).await, MOCK_TOKEN);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_gate_times_out_to_mock() {
        let (gate, _handle) = AuthGate::pending();
        let started = tokio::time::Instant::now();
        assert_eq!(gate.token(Duration::from_secs(5)).await, MOCK_TOKEN);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_late_readiness() {
        let (gate, handle) = AuthGate::pending();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.set_ready(Some("late-token".into()));
        });
        assert_eq!(gate.token(Duration::from_secs(5)).await, "late-token");
    }

    #[tokio::test]
    async fn test_background_resolution_reads_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        tokio::fs::write(&path, "\n  file-token \n").await.unwrap();

        let gate = AuthGate::resolve_in_background(None, Some(path));
        assert_eq!(gate.token(Duration::from_secs(5)).await, "file-token");
    }

    #[tokio::test]
    async fn test_explicit_token_beats_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        tokio::fs::write(&path, "file-token").await.unwrap();

        let gate = AuthGate::resolve_in_background(Some("flag-token".into()), Some(path));
        assert_eq!(gate.token(Duration::from_secs(5)).await, "flag-token");
    }

    #[tokio::test]
    async fn test_unreadable_token_file_falls_back_to_mock() {
        let dir = tempfile::tempdir().unwrap();
        let gate = AuthGate::resolve_in_background(None, Some(dir.path().join("missing")));
        assert_eq!(gate.token(Duration::from_secs(5)).await, MOCK_TOKEN);

        let gate = AuthGate::resolve_in_background(None, None);
        assert_eq!(gate.token(Duration::from_secs(5)).await, MOCK_TOKEN);
    }
}
