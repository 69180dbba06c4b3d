use std::sync::Arc;
use std::time::Duration;

use parcelbox_domain::identity::Identity;
use parcelbox_domain::profile::Role;
use parcelbox_session::infra::memory::MemoryBackend;
use parcelbox_session::{SessionListener, SessionManager, SessionState, SignUpAttributes};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub type MemoryManager = SessionManager<MemoryBackend, MemoryBackend>;

pub const PASSWORD: &str = "secret1";

pub fn manager() -> Arc<MemoryManager> {
    let backend = MemoryBackend::new();
    Arc::new(SessionManager::new(backend.clone(), backend))
}

/// Create an account with `role` recorded at sign-up.
pub async fn register(manager: &MemoryManager, email: &str, role: Role) -> Identity {
    let attributes = SignUpAttributes {
        role: Some(role),
        ..Default::default()
    };
    manager
        .sign_up(email, PASSWORD, attributes)
        .await
        .expect("sign-up")
        .identity
}

/// Navigator that forwards every page into a channel.
pub fn recording_navigator() -> (impl Fn(&str) + Send + 'static, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let navigator = move |page: &str| {
        let _ = tx.send(page.to_owned());
    };
    (navigator, rx)
}

/// Wait (bounded) until the published state satisfies `pred`.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<SessionState>,
    pred: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("state not reached in time")
        .expect("session store dropped")
        .clone()
}

/// Poll `cond` until it holds, for at most two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Spawn `manager.run` and wait until it watches `identity`'s profile.
pub async fn spawn_runner(
    manager: &Arc<MemoryManager>,
    listener: SessionListener,
    identity: &Identity,
) -> JoinHandle<()> {
    let runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run(listener).await })
    };
    let backend = manager.backend().clone();
    let id = identity.id;
    wait_until(|| backend.profile_watcher_count(id) > 0).await;
    runner
}

pub async fn next_page(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no navigation in time")
        .expect("navigator dropped")
}
