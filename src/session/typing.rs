// Composing-text debounce
// Mirrors the usual chat-state convention: the typing flag goes up on the
// first keystroke and comes down after a quiet period, not on every edit.

use log::debug;

impl super::ConversationSession {
    /// Update the composing text and drive the typing flag.
    ///
    /// Non-empty text raises `is_typing` and (re)starts the debounce timer;
    /// each call aborts and replaces the previous timer, so at most one is
    /// outstanding and the flag clears once, at last-edit + debounce delay.
    /// Empty text clears the flag immediately and cancels any pending timer.
    pub async fn update_composing_text(&mut self, text: &str) {
        if let Some(timer) = self.typing_timer.take() {
            timer.abort();
        }

        {
            let mut state = self.state.lock().await;
            state.composing_text = text.to_string();
            state.is_typing = !text.is_empty();
        }

        if text.is_empty() {
            return;
        }

        let state = self.state.clone();
        let delay = self.typing_debounce;
        self.typing_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.lock().await;
            state.is_typing = false;
            debug!("Typing debounce elapsed, cleared typing flag");
        }));
    }
}
