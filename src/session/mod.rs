// Conversation session state machine
// This module owns the in-memory state of one open conversation view:
// the ordered message list, the contact set, composing/recording flags
// and the timers that drive delivery confirmation and typing debounce.
// It is UI-free; rendering and persistence live elsewhere.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinHandle;

use crate::models::{Contact, DeliveryStatus, Message, MessageKind, NetworkStatus, SELF_ID};

pub mod network;
pub mod typing;

/// Delay before a sent message is confirmed as delivered.
pub const DELIVERY_DELAY: Duration = Duration::from_millis(1000);
/// Quiet period after the last keystroke before the typing flag clears.
pub const TYPING_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Snapshot of everything a conversation view displays.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub contacts: HashMap<String, Contact>,
    pub selected_contact_id: Option<String>,
    pub composing_text: String,
    pub is_typing: bool,
    pub is_recording_voice: bool,
    pub playing_voice_id: Option<String>,
    pub network_status: NetworkStatus,
}

impl SessionState {
    fn new() -> Self {
        SessionState {
            messages: Vec::new(),
            contacts: HashMap::new(),
            selected_contact_id: None,
            composing_text: String::new(),
            is_typing: false,
            is_recording_voice: false,
            playing_voice_id: None,
            network_status: NetworkStatus::Online,
        }
    }
}

/// One open conversation. All mutation goes through the methods here (and
/// the impl blocks in `typing` and `network`); the session exclusively owns
/// every timer it starts and aborts them all on disposal.
pub struct ConversationSession {
    pub(crate) state: Arc<TokioMutex<SessionState>>,
    pub(crate) typing_timer: Option<JoinHandle<()>>,
    delivery_timers: HashMap<String, JoinHandle<()>>,
    pub(crate) network_task: Option<JoinHandle<()>>,
    pub(crate) typing_debounce: Duration,
    delivery_delay: Duration,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::with_delays(TYPING_DEBOUNCE, DELIVERY_DELAY)
    }

    /// Construct with explicit timer delays. Tests use short delays together
    /// with a paused tokio clock.
    pub fn with_delays(typing_debounce: Duration, delivery_delay: Duration) -> Self {
        ConversationSession {
            state: Arc::new(TokioMutex::new(SessionState::new())),
            typing_timer: None,
            delivery_timers: HashMap::new(),
            network_task: None,
            typing_debounce,
            delivery_delay,
        }
    }

    /// Clone of the current state, for rendering and assertions.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn add_contact(&self, contact: Contact) {
        let mut state = self.state.lock().await;
        state.contacts.insert(contact.id.clone(), contact);
    }

    /// Select a contact and clear its unread counter. Selecting an unknown
    /// id still records the selection; the contact may arrive later.
    pub async fn select_contact(&self, contact_id: &str) {
        let mut state = self.state.lock().await;
        state.selected_contact_id = Some(contact_id.to_string());
        if let Some(contact) = state.contacts.get_mut(contact_id) {
            contact.unread_count = 0;
        }
    }

    /// Commit the composing text as a sent message. Whitespace-only text is
    /// a no-op. The message enters the session with status Sent (optimistic,
    /// there is no separate compose-commit step) and an independent timer
    /// promotes exactly this message to Delivered after the delivery delay.
    /// Returns the new message id, or None if nothing was sent.
    pub async fn send(&mut self) -> Option<String> {
        let message = {
            let mut state = self.state.lock().await;
            let content = state.composing_text.trim().to_string();
            if content.is_empty() {
                return None;
            }
            state.composing_text.clear();
            state.is_typing = false;

            let message = Message::new(SELF_ID, content, MessageKind::Text, None, DeliveryStatus::Sent);
            state.messages.push(message.clone());
            message
        };

        // Sending ends the current typing burst.
        if let Some(timer) = self.typing_timer.take() {
            timer.abort();
        }

        let id = message.id.clone();
        self.schedule_delivery(id.clone());
        debug!("Sent message {}", id);
        Some(id)
    }

    /// Spawn the delivery-confirmation timer for one message. Timers for
    /// different messages are independent; aborting one never touches
    /// another. Handles of timers that already fired are dropped here so a
    /// long-lived session does not accumulate them.
    fn schedule_delivery(&mut self, message_id: String) {
        self.delivery_timers.retain(|_, handle| !handle.is_finished());

        let state = self.state.clone();
        let delay = self.delivery_delay;
        let id = message_id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.lock().await;
            if let Some(message) = state.messages.iter_mut().find(|m| m.id == id) {
                // Never regress a message that was already read.
                if message.delivery_status < DeliveryStatus::Delivered {
                    message.delivery_status = DeliveryStatus::Delivered;
                    debug!("Message {} confirmed delivered", id);
                }
            }
        });

        self.delivery_timers.insert(message_id, handle);
    }

    /// Number of delivery-timer handles currently held by the session.
    pub fn outstanding_delivery_timers(&self) -> usize {
        self.delivery_timers.len()
    }

    /// Mark a message as read. Unknown ids and already-read messages are
    /// no-ops; calling twice is the same as calling once.
    pub async fn mark_read(&self, message_id: &str) {
        let mut state = self.state.lock().await;
        if let Some(message) = state.messages.iter_mut().find(|m| m.id == message_id) {
            if message.delivery_status < DeliveryStatus::Read {
                message.delivery_status = DeliveryStatus::Read;
            }
        }
    }

    /// Append a message originated elsewhere (an AI reply or a contact
    /// message). The session assigns the id and timestamp. The sender
    /// contact's preview is refreshed, and its unread counter bumped unless
    /// it is the selected contact. Returns the assigned id.
    pub async fn add_incoming(
        &self,
        sender_id: &str,
        content: &str,
        kind: MessageKind,
        voice_duration: Option<u32>,
    ) -> String {
        let mut state = self.state.lock().await;
        let message = Message::new(sender_id, content, kind, voice_duration, DeliveryStatus::Delivered);
        let id = message.id.clone();
        let timestamp = message.timestamp;
        state.messages.push(message);

        let selected = state.selected_contact_id.clone();
        if let Some(contact) = state.contacts.get_mut(sender_id) {
            contact.last_message_preview = Some(content.to_string());
            contact.last_message_at = Some(timestamp);
            if selected.as_deref() != Some(sender_id) {
                contact.unread_count += 1;
            }
        }
        id
    }

    /// Update a contact's typing indicator; unknown contacts are ignored.
    pub async fn set_contact_typing(&self, contact_id: &str, typing: bool) {
        let mut state = self.state.lock().await;
        if let Some(contact) = state.contacts.get_mut(contact_id) {
            contact.is_typing = typing;
        }
    }

    pub async fn toggle_contact_pinned(&self, contact_id: &str) {
        let mut state = self.state.lock().await;
        if let Some(contact) = state.contacts.get_mut(contact_id) {
            contact.is_pinned = !contact.is_pinned;
        }
    }

    pub async fn toggle_contact_muted(&self, contact_id: &str) {
        let mut state = self.state.lock().await;
        if let Some(contact) = state.contacts.get_mut(contact_id) {
            contact.is_muted = !contact.is_muted;
        }
    }

    /// Flip the recording flag. Audio capture itself happens outside the
    /// state machine.
    pub async fn toggle_voice_recording(&self) -> bool {
        let mut state = self.state.lock().await;
        state.is_recording_voice = !state.is_recording_voice;
        state.is_recording_voice
    }

    /// Exclusive voice playback: at most one voice message plays at a time.
    /// Toggling the currently playing id stops playback.
    pub async fn toggle_playing_voice(&self, message_id: &str) {
        let mut state = self.state.lock().await;
        if state.playing_voice_id.as_deref() == Some(message_id) {
            state.playing_voice_id = None;
        } else {
            state.playing_voice_id = Some(message_id.to_string());
        }
    }

    /// Explicit network status setter. This is the only path that can set
    /// Connecting: the connectivity watcher in `network` maps its boolean
    /// signal to Online/Offline only.
    pub async fn set_network_status(&self, status: NetworkStatus) {
        let mut state = self.state.lock().await;
        state.network_status = status;
    }

    /// Abort every outstanding timer. After this no typing-clear, delivery
    /// confirmation or connectivity update will touch the state. Also runs
    /// on Drop.
    pub fn dispose(&mut self) {
        if let Some(timer) = self.typing_timer.take() {
            timer.abort();
        }
        for (_, timer) in self.delivery_timers.drain() {
            timer.abort();
        }
        if let Some(task) = self.network_task.take() {
            task.abort();
        }
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConversationSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
