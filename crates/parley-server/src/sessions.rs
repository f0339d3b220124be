use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parley_core::conversation::ConversationSession;
use parley_core::error::ParleyError;
use parley_core::scenario::ScenarioDescriptor;
use tokio::sync::{broadcast, Mutex};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::SseMessage;

// ---------------------------------------------------------------------------
// LiveConversation
// ---------------------------------------------------------------------------

/// A conversation being practised in the web shell, plus the reply that is
/// currently being "typed" for it.
struct LiveConversation {
    session: ConversationSession,
    pending_reply: Option<AbortHandle>,
    last_touched: Instant,
}

impl LiveConversation {
    fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    /// Cancel any pending reply and close the transcript.
    fn discard(&mut self, id: Uuid) {
        if let Some(pending) = self.pending_reply.take() {
            pending.abort();
            info!(session = %id, "pending reply cancelled");
        }
        self.session.end();
    }
}

type SharedConversation = Arc<Mutex<LiveConversation>>;

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// Every live conversation, keyed by session id.
///
/// The map lock is only held to look up or insert an entry. Transcript
/// mutations happen under the conversation's own lock, so a slow reply for
/// one session never blocks another.
///
/// Sessions nobody has read or written for `idle_ttl` are swept out each
/// time a new one starts.
#[derive(Clone)]
pub struct SessionRegistry {
    live: Arc<Mutex<HashMap<Uuid, SharedConversation>>>,
    reply_delay: Duration,
    idle_ttl: Duration,
    event_tx: broadcast::Sender<SseMessage>,
}

impl SessionRegistry {
    pub fn new(
        reply_delay: Duration,
        idle_ttl: Duration,
        event_tx: broadcast::Sender<SseMessage>,
    ) -> Self {
        Self {
            live: Arc::new(Mutex::new(HashMap::new())),
            reply_delay,
            idle_ttl,
            event_tx,
        }
    }

    /// Open a conversation for an already-gated scenario and return its
    /// first snapshot (opening line posted, awaiting input).
    pub async fn start(&self, scenario: &ScenarioDescriptor) -> ConversationSession {
        self.sweep_idle().await;

        let session = ConversationSession::start(scenario.id);
        let snapshot = session.clone();
        let live = LiveConversation {
            session,
            pending_reply: None,
            last_touched: Instant::now(),
        };
        self.live
            .lock()
            .await
            .insert(snapshot.id, Arc::new(Mutex::new(live)));

        info!(session = %snapshot.id, scenario = scenario.id, "conversation started");
        let _ = self.event_tx.send(SseMessage::SessionStarted {
            session_id: snapshot.id,
            scenario_id: snapshot.scenario_id.clone(),
        });
        snapshot
    }

    /// Current transcript and state of `id`.
    pub async fn snapshot(&self, id: Uuid) -> Result<ConversationSession, ParleyError> {
        let shared = self.lookup(id).await?;
        let mut live = shared.lock().await;
        live.touch();
        Ok(live.session.clone())
    }

    /// Record the user's message and schedule the counterpart's reply after
    /// the configured delay. Returns the snapshot with the user entry
    /// appended and the conversation in `processing_response`.
    pub async fn submit(&self, id: Uuid, text: &str) -> Result<ConversationSession, ParleyError> {
        let shared = self.lookup(id).await?;
        let mut live = shared.lock().await;
        live.touch();
        live.session.submit(text)?;
        let snapshot = live.session.clone();

        let delay = self.reply_delay;
        let event_tx = self.event_tx.clone();
        let target = shared.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            deliver_reply(id, &target, &event_tx).await;
        });
        live.pending_reply = Some(handle.abort_handle());
        drop(live);

        let _ = self.event_tx.send(SseMessage::TranscriptUpdated {
            session_id: id,
            state: snapshot.state,
            entries: snapshot.entries.len(),
        });
        Ok(snapshot)
    }

    /// Discard the conversation. A reply still pending is cancelled and never
    /// lands in the transcript.
    pub async fn end(&self, id: Uuid) -> Result<(), ParleyError> {
        let shared = self
            .live
            .lock()
            .await
            .remove(&id)
            .ok_or_else(|| ParleyError::SessionNotFound(id.to_string()))?;

        shared.lock().await.discard(id);

        info!(session = %id, "conversation ended");
        let _ = self
            .event_tx
            .send(SseMessage::SessionEnded { session_id: id });
        Ok(())
    }

    /// End every conversation untouched for longer than `idle_ttl`.
    ///
    /// A conversation whose lock is held is in use and is skipped. Returns
    /// the number discarded.
    pub async fn sweep_idle(&self) -> usize {
        let expired: Vec<(Uuid, SharedConversation)> = {
            let mut live = self.live.lock().await;
            let ids: Vec<Uuid> = live
                .iter()
                .filter(|(_, shared)| {
                    shared
                        .try_lock()
                        .is_ok_and(|c| c.last_touched.elapsed() > self.idle_ttl)
                })
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| live.remove(&id).map(|shared| (id, shared)))
                .collect()
        };

        for (id, shared) in &expired {
            shared.lock().await.discard(*id);
            info!(session = %id, "idle conversation discarded");
            let _ = self
                .event_tx
                .send(SseMessage::SessionEnded { session_id: *id });
        }
        expired.len()
    }

    /// Number of conversations currently open.
    pub async fn len(&self) -> usize {
        self.live.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn lookup(&self, id: Uuid) -> Result<SharedConversation, ParleyError> {
        self.live
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ParleyError::SessionNotFound(id.to_string()))
    }
}

async fn deliver_reply(
    id: Uuid,
    target: &SharedConversation,
    event_tx: &broadcast::Sender<SseMessage>,
) {
    let mut live = target.lock().await;
    live.pending_reply = None;
    live.touch();
    if live.session.is_ended() {
        return;
    }
    let delivered = live.session.complete().map(|added| added.len());
    match delivered {
        Ok(added) => {
            info!(session = %id, added, "reply delivered");
            let _ = event_tx.send(SseMessage::TranscriptUpdated {
                session_id: id,
                state: live.session.state,
                entries: live.session.entries.len(),
            });
        }
        Err(e) => warn!(session = %id, error = %e, "reply could not be delivered"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
