use std::fs;

use tauri::Manager;

pub mod editor;

use editor::settings::{self, EditServiceSettings};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let app_data_dir = app.path().app_data_dir()?;
            fs::create_dir_all(&app_data_dir)?;

            let settings_path = settings::default_settings_path(&app_data_dir);
            let service_settings = match settings::load_settings(&settings_path) {
                Ok(loaded) => loaded,
                Err(err) => {
                    if err.kind() != std::io::ErrorKind::NotFound {
                        eprintln!("[editor] failed to load settings, using defaults: {}", err);
                    }
                    EditServiceSettings::default()
                }
            };

            app.manage(editor::commands::create_state_with_settings(service_settings));
            Ok(())
        })
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            editor::commands::editor_session,
            editor::commands::editor_upload_image,
            editor::commands::editor_submit,
            editor::commands::editor_revert,
            editor::commands::editor_set_debug_mode,
            editor::commands::editor_service_settings
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
