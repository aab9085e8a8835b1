use std::sync::{Arc, Mutex, MutexGuard};

use tauri::State;

use super::codec;
use super::controller::{self, EditError};
use super::history::EditSession;
#[cfg(feature = "edit-http")]
use super::remote::HttpEditService;
use super::remote::{EditService, MockEditService};
use super::settings::EditServiceSettings;
use super::types::SessionSnapshot;

pub struct EditorState {
    pub session: Mutex<EditSession>,
    pub service: Arc<dyn EditService>,
    pub settings: EditServiceSettings,
}

impl EditorState {
    pub fn new(service: Arc<dyn EditService>, settings: EditServiceSettings) -> Self {
        Self {
            session: Mutex::new(EditSession::new()),
            service,
            settings,
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, EditSession>, String> {
        self.session.lock().map_err(|_| "poisoned".to_string())
    }
}

pub fn create_default_state() -> EditorState {
    EditorState::new(Arc::new(MockEditService), EditServiceSettings::default())
}

/// Picks the HTTP service when an endpoint is configured (and the feature is
/// on); otherwise the offline mock keeps the app usable.
pub fn create_state_with_settings(settings: EditServiceSettings) -> EditorState {
    let settings = settings.normalize();
    let service = service_for(&settings);
    EditorState::new(service, settings)
}

fn service_for(settings: &EditServiceSettings) -> Arc<dyn EditService> {
    if !settings.is_configured() {
        return Arc::new(MockEditService);
    }
    #[cfg(feature = "edit-http")]
    {
        match HttpEditService::from_settings(settings) {
            Ok(service) => return Arc::new(service),
            Err(err) => {
                eprintln!("[editor] falling back to mock service: {}", err);
            }
        }
    }
    Arc::new(MockEditService)
}

#[tauri::command]
pub fn editor_session(state: State<EditorState>) -> Result<SessionSnapshot, String> {
    Ok(controller::snapshot(&*state.session()?))
}

#[tauri::command]
pub fn editor_upload_image(
    state: State<EditorState>,
    data_url: String,
) -> Result<SessionSnapshot, String> {
    let payload = codec::decode_data_url(&data_url).map_err(|err| err.to_string())?;
    let mut session = state.session()?;
    controller::upload(&mut session, &payload.bytes, &payload.mime)
        .map_err(|err| err.to_string())?;
    Ok(controller::snapshot(&session))
}

#[tauri::command]
pub async fn editor_submit(
    state: State<'_, EditorState>,
    instructions: String,
) -> Result<SessionSnapshot, String> {
    let ticket = {
        let mut session = state.session()?;
        controller::begin_submit(&mut session, &instructions).map_err(|err| err.to_string())?
    };

    // The stamp render or network round-trip runs off the session lock, so
    // snapshot reads stay responsive while an edit is in flight.
    let service = state.service.clone();
    let perform_ticket = ticket.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        controller::perform_edit(&perform_ticket, service.as_ref())
    })
    .await
    .unwrap_or_else(|err| Err(EditError::RemoteEditFailed(err.to_string())));

    let mut session = state.session()?;
    controller::finish_submit(&mut session, &ticket, result);
    Ok(controller::snapshot(&session))
}

#[tauri::command]
pub fn editor_revert(state: State<EditorState>, index: usize) -> Result<SessionSnapshot, String> {
    let mut session = state.session()?;
    controller::revert(&mut session, index).map_err(|err| err.to_string())?;
    Ok(controller::snapshot(&session))
}

#[tauri::command]
pub fn editor_set_debug_mode(
    state: State<EditorState>,
    enabled: bool,
) -> Result<SessionSnapshot, String> {
    let mut session = state.session()?;
    controller::set_debug_mode(&mut session, enabled).map_err(|err| err.to_string())?;
    Ok(controller::snapshot(&session))
}

#[tauri::command]
pub fn editor_service_settings(state: State<EditorState>) -> Result<EditServiceSettings, String> {
    Ok(state.settings.masked())
}
