//! The session state machine: a single linear timeline of image revisions.
//!
//! `history` holds only superseded revisions, oldest first; the active
//! revision lives in `current` and is never also present in `history`.
//! Reverting truncates — there is no redo stack and no branching.

use chrono::Utc;
use thiserror::Error;

use super::types::ImageRevision;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no current image")]
    NoCurrentImage,
    #[error("history index {0} out of bounds")]
    InvalidIndex(usize),
    #[error("debug mode cannot change while a submission is in flight")]
    Busy,
}

#[derive(Debug, Default)]
pub struct EditSession {
    current: Option<ImageRevision>,
    history: Vec<ImageRevision>,
    last_response_text: Option<String>,
    submit_message: String,
    instructions: String,
    pending: bool,
    debug_mode: bool,
    // Last issued revision timestamp, so identities stay unique even when
    // two revisions land within the same millisecond.
    last_timestamp: i64,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ImageRevision> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[ImageRevision] {
        &self.history
    }

    pub fn last_response_text(&self) -> Option<&str> {
        self.last_response_text.as_deref()
    }

    pub fn submit_message(&self) -> &str {
        &self.submit_message
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// 1-based number the next edit would carry once appended.
    pub fn iteration_number(&self) -> u32 {
        self.history.len() as u32 + 1
    }

    /// Mints a revision stamped with a strictly increasing unix-ms timestamp.
    pub fn make_revision(&mut self, image_ref: String, prompt: String) -> ImageRevision {
        let now = Utc::now().timestamp_millis();
        let timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp = timestamp;
        ImageRevision {
            image_ref,
            prompt,
            timestamp,
        }
    }

    /// Replaces the active revision unconditionally. Used for fresh uploads
    /// and for accepting edit results.
    pub fn set_current(&mut self, revision: ImageRevision) {
        self.current = Some(revision);
    }

    /// Pushes the active revision onto the end of history without changing
    /// `current`. The caller replaces `current` right after.
    pub fn append_current_to_history(&mut self) -> Result<(), HistoryError> {
        let current = self.current.clone().ok_or(HistoryError::NoCurrentImage)?;
        self.history.push(current);
        Ok(())
    }

    /// Truncates history to `[0..index)` and promotes the revision formerly
    /// at `index` to `current`. Everything at or after `index` is dropped
    /// for good.
    pub fn revert_to(&mut self, index: usize) -> Result<ImageRevision, HistoryError> {
        if index >= self.history.len() {
            return Err(HistoryError::InvalidIndex(index));
        }
        let target = self.history[index].clone();
        self.history.truncate(index);
        self.current = Some(target.clone());
        Ok(target)
    }

    /// Discards the whole timeline. A fresh upload starts a new session.
    pub fn reset(&mut self) {
        self.current = None;
        self.history.clear();
        self.last_response_text = None;
        self.submit_message.clear();
        self.instructions.clear();
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn set_debug_mode(&mut self, enabled: bool) -> Result<(), HistoryError> {
        if self.pending {
            return Err(HistoryError::Busy);
        }
        self.debug_mode = enabled;
        Ok(())
    }

    pub fn set_instructions(&mut self, text: String) {
        self.instructions = text;
    }

    pub fn set_submit_message(&mut self, message: String) {
        self.submit_message = message;
    }

    pub fn set_response_text(&mut self, text: Option<String>) {
        self.last_response_text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(session: &mut EditSession, image_ref: &str, prompt: &str) -> ImageRevision {
        session.make_revision(image_ref.into(), prompt.into())
    }

    fn session_with_edits(n: usize) -> EditSession {
        let mut s = EditSession::new();
        let base = rev(&mut s, "img-0", "uploaded");
        s.set_current(base);
        for i in 1..=n {
            s.append_current_to_history().unwrap();
            let next = rev(&mut s, &format!("img-{}", i), &format!("edit {}", i));
            s.set_current(next);
        }
        s
    }

    #[test]
    fn n_edits_leave_n_history_entries_in_order() {
        let s = session_with_edits(4);
        assert_eq!(s.history().len(), 4);
        assert_eq!(s.current().unwrap().image_ref, "img-4");
        for (k, item) in s.history().iter().enumerate() {
            assert_eq!(item.image_ref, format!("img-{}", k));
        }
    }

    #[test]
    fn timestamps_are_strictly_increasing() {
        let s = session_with_edits(5);
        let mut last = 0;
        for item in s.history() {
            assert!(item.timestamp > last);
            last = item.timestamp;
        }
        assert!(s.current().unwrap().timestamp > last);
    }

    #[test]
    fn append_without_current_is_rejected() {
        let mut s = EditSession::new();
        assert!(matches!(
            s.append_current_to_history(),
            Err(HistoryError::NoCurrentImage)
        ));
    }

    #[test]
    fn revert_truncates_and_promotes() {
        let mut s = session_with_edits(3);
        let target = s.revert_to(1).expect("revert");
        assert_eq!(target.image_ref, "img-1");
        assert_eq!(s.current().unwrap().image_ref, "img-1");
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history()[0].image_ref, "img-0");
    }

    #[test]
    fn revert_to_zero_restores_the_original_upload() {
        let mut s = session_with_edits(3);
        s.revert_to(0).expect("revert");
        assert!(s.history().is_empty());
        assert_eq!(s.current().unwrap().image_ref, "img-0");
    }

    #[test]
    fn revert_out_of_bounds_mutates_nothing() {
        let mut s = session_with_edits(2);
        assert!(matches!(s.revert_to(2), Err(HistoryError::InvalidIndex(2))));
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.current().unwrap().image_ref, "img-2");
    }

    #[test]
    fn revert_on_empty_history_is_invalid() {
        let mut s = EditSession::new();
        let base = rev(&mut s, "img-0", "uploaded");
        s.set_current(base);
        assert!(matches!(s.revert_to(0), Err(HistoryError::InvalidIndex(0))));
    }

    #[test]
    fn revert_then_edit_then_same_revert_reproduces_state() {
        // After revert(i) the slot at i is only re-populated by the next
        // edit; reverting to i again must then reproduce the same state.
        let mut s = session_with_edits(2);
        s.revert_to(1).expect("first revert");
        let first_current = s.current().unwrap().clone();
        let first_history: Vec<_> = s.history().to_vec();

        s.append_current_to_history().unwrap();
        let next = rev(&mut s, "img-2b", "edit 2b");
        s.set_current(next);

        s.revert_to(1).expect("second revert");
        assert_eq!(s.current().unwrap(), &first_current);
        assert_eq!(s.history(), first_history.as_slice());
    }

    #[test]
    fn debug_toggle_blocked_while_pending() {
        let mut s = EditSession::new();
        s.set_pending(true);
        assert!(matches!(s.set_debug_mode(true), Err(HistoryError::Busy)));
        s.set_pending(false);
        s.set_debug_mode(true).expect("toggle");
        assert!(s.debug_mode());
    }
}
