//! Workflow orchestration: validate a submission, run the local stamp or
//! the remote service, and commit the result to the session.
//!
//! Submits are split into three phases so the edit call can run without
//! holding the session lock: `begin_submit` validates and raises the
//! pending flag, `perform_edit` does the slow work, `finish_submit`
//! commits everything (or nothing) and always lowers the flag.

use thiserror::Error;

use super::codec::{self, ImagePayload};
use super::history::EditSession;
use super::messages;
use super::remote::EditService;
use super::stamp;
use super::types::{EditOutcome, SessionSnapshot, UPLOAD_PROMPT};

#[derive(Debug, Clone, Error)]
pub enum EditError {
    #[error("Please provide an image.")]
    MissingImage,
    #[error("Please provide an image and instructions.")]
    MissingInstruction,
    #[error("An edit is already in progress.")]
    AlreadySubmitting,
    #[error("Debug edit failed: {0}")]
    LocalEditFailed(String),
    #[error("Error: {0}")]
    RemoteEditFailed(String),
    #[error("Error reverting to image #{}", .0 + 1)]
    RevertFailed(usize),
}

/// Everything `perform_edit` needs, captured while the session was locked.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    instruction: String,
    debug: bool,
    iteration: u32,
    image: ImagePayload,
}

/// Result of the slow phase, ready to be committed.
#[derive(Debug, Clone)]
pub enum PerformedEdit {
    Stamped { image_ref: String },
    Remote(EditOutcome),
}

/// Starts a new session around freshly uploaded image bytes. Any prior
/// timeline is discarded; the upload becomes the base revision.
pub fn upload(session: &mut EditSession, bytes: &[u8], mime: &str) -> Result<(), EditError> {
    if session.is_pending() {
        return Err(EditError::AlreadySubmitting);
    }
    let image_ref = codec::encode_data_url(bytes, mime);
    session.reset();
    let base = session.make_revision(image_ref, UPLOAD_PROMPT.to_string());
    session.set_current(base);
    Ok(())
}

/// Validates a submission and raises the pending flag. On any error the
/// session is left exactly as it was.
pub fn begin_submit(session: &mut EditSession, instruction: &str) -> Result<SubmitTicket, EditError> {
    if session.is_pending() {
        return Err(EditError::AlreadySubmitting);
    }
    let current = session.current().ok_or(EditError::MissingImage)?;
    let trimmed = instruction.trim().to_string();
    if trimmed.is_empty() && !session.debug_mode() {
        return Err(EditError::MissingInstruction);
    }
    let image = codec::decode_data_url(&current.image_ref).map_err(|err| {
        if session.debug_mode() {
            EditError::LocalEditFailed(err.to_string())
        } else {
            EditError::RemoteEditFailed(err.to_string())
        }
    })?;

    let ticket = SubmitTicket {
        instruction: trimmed,
        debug: session.debug_mode(),
        iteration: session.iteration_number(),
        image,
    };
    session.set_pending(true);
    session.set_instructions(instruction.to_string());
    session.set_submit_message(String::new());
    session.set_response_text(None);
    Ok(ticket)
}

/// The slow phase. Runs without any reference to the session, so callers
/// can drop the lock around it.
pub fn perform_edit(
    ticket: &SubmitTicket,
    service: &dyn EditService,
) -> Result<PerformedEdit, EditError> {
    if ticket.debug {
        let stamped = stamp::overlay_iteration_number(&ticket.image.bytes, ticket.iteration)
            .map_err(|err| EditError::LocalEditFailed(err.to_string()))?;
        Ok(PerformedEdit::Stamped {
            image_ref: codec::encode_data_url(&stamped, "image/png"),
        })
    } else {
        let outcome = service
            .process(&ticket.image.bytes, &ticket.image.mime, &ticket.instruction)
            .map_err(|err| EditError::RemoteEditFailed(err.to_string()))?;
        Ok(PerformedEdit::Remote(outcome))
    }
}

/// Commits the outcome. The append-and-replace sequence either completes in
/// full or not at all; the pending flag is lowered on every path.
pub fn finish_submit(
    session: &mut EditSession,
    ticket: &SubmitTicket,
    result: Result<PerformedEdit, EditError>,
) {
    match result.and_then(|edit| commit(session, ticket, edit)) {
        Ok(message) => session.set_submit_message(message),
        Err(err) => session.set_submit_message(err.to_string()),
    }
    session.set_pending(false);
}

fn commit(
    session: &mut EditSession,
    ticket: &SubmitTicket,
    edit: PerformedEdit,
) -> Result<String, EditError> {
    match edit {
        PerformedEdit::Stamped { image_ref } => {
            session
                .append_current_to_history()
                .map_err(|err| EditError::LocalEditFailed(err.to_string()))?;
            let revision = session.make_revision(image_ref, ticket.instruction.clone());
            session.set_current(revision);
            session.set_response_text(Some(messages::DEBUG_API_SKIPPED.to_string()));
            session.set_instructions(String::new());
            Ok(messages::success_debug(ticket.iteration))
        }
        PerformedEdit::Remote(EditOutcome::ImageProduced {
            image_ref,
            text,
            original_size,
        }) => {
            session
                .append_current_to_history()
                .map_err(|err| EditError::RemoteEditFailed(err.to_string()))?;
            let revision = session.make_revision(image_ref, ticket.instruction.clone());
            session.set_current(revision);
            session.set_response_text(text);
            session.set_instructions(String::new());
            Ok(messages::success_remote(original_size))
        }
        PerformedEdit::Remote(EditOutcome::TextOnly {
            text,
            original_size,
        }) => {
            // No usable image: leave current/history untouched and keep the
            // instruction so the user can rephrase it.
            session.set_response_text(text);
            Ok(messages::success_remote(original_size))
        }
    }
}

/// Single-call submit for synchronous callers and tests. An `Err` can only
/// come from the validation phase; edit failures are recorded in the
/// session's submit message instead.
pub fn submit(
    session: &mut EditSession,
    service: &dyn EditService,
    instruction: &str,
) -> Result<(), EditError> {
    let ticket = begin_submit(session, instruction)?;
    let result = perform_edit(&ticket, service);
    finish_submit(session, &ticket, result);
    Ok(())
}

/// Reverts to a history entry, truncating everything at and after it.
pub fn revert(session: &mut EditSession, index: usize) -> Result<(), EditError> {
    if session.is_pending() {
        return Err(EditError::AlreadySubmitting);
    }
    let target = session
        .revert_to(index)
        .map_err(|_| EditError::RevertFailed(index))?;
    session.set_submit_message(messages::success_revert(index, &target.prompt));
    session.set_response_text(None);
    session.set_instructions(String::new());
    Ok(())
}

pub fn set_debug_mode(session: &mut EditSession, enabled: bool) -> Result<(), EditError> {
    session
        .set_debug_mode(enabled)
        .map_err(|_| EditError::AlreadySubmitting)
}

pub fn snapshot(session: &EditSession) -> SessionSnapshot {
    SessionSnapshot {
        current_image: session.current().cloned(),
        history: session.history().to_vec(),
        response_text: session.last_response_text().map(|s| s.to_string()),
        submit_message: session.submit_message().to_string(),
        instructions: session.instructions().to_string(),
        is_submitting: session.is_pending(),
        debug_mode: session.debug_mode(),
        submit_button_label: submit_button_label(session),
    }
}

fn submit_button_label(session: &EditSession) -> String {
    let label = match (session.is_pending(), session.debug_mode()) {
        (true, true) => messages::PROCESSING_DEBUG,
        (true, false) => messages::PROCESSING_REMOTE,
        (false, true) => messages::PROCESS_DEBUG,
        (false, false) => messages::PROCESS_AI,
    };
    label.to_string()
}
