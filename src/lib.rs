pub mod common;
pub mod config;
pub mod logging;
pub mod printers;
pub mod service;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    let app_config = config::load_config().unwrap_or_default();

    // Initialize domain logs (audit, service, crash)
    if let Ok(root_dir) = config::get_app_root_dir() {
        logging::init_log_dir(root_dir);
        logging::setup_panic_hook();
    }

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            // When a second instance is launched, focus the existing window
            if let Some(window) = app.webview_windows().values().next() {
                let _ = window.set_focus();
                let _ = window.unminimize();
            }
        }))
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(if app_config.verbose_logging {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                })
                .targets([
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Stdout),
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Folder {
                        path: config::get_app_root_dir().unwrap_or_default().join("logs"),
                        file_name: Some("app".to_string()),
                    }),
                ])
                .rotation_strategy(tauri_plugin_log::RotationStrategy::KeepOne)
                .timezone_strategy(tauri_plugin_log::TimezoneStrategy::UseLocal)
                .build(),
        )
        .manage(printers::PrinterClient::from_config(&app_config))
        .setup(move |app| {
            let resource_dir = app.path().resource_dir().ok();
            let controller =
                service::ServiceController::from_config(&app_config, resource_dir.as_deref())?;
            log::info!("Service controller ready for {:?}", controller.platform());
            app.manage(controller);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            service::commands::add_service,
            service::commands::delete_service,
            service::commands::restart_service,
            service::commands::get_ip,
            printers::commands::list_printer_urls,
            printers::commands::check_service_status,
            printers::commands::manual_printer_url,
            printers::commands::run_startup_checks,
            config::load_config,
            config::save_config,
            logging::log_domain_event,
            logging::get_logs,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
