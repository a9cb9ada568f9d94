use super::client::{PrinterClient, ServiceEndpoint};
use super::model::{ServiceStatus, StartupReport};
use crate::common::error::ToTauriError;
use crate::service::ServiceController;

#[tauri::command]
pub async fn list_printer_urls(
    host: String,
    client: tauri::State<'_, PrinterClient>,
) -> Result<Vec<String>, String> {
    let endpoint = ServiceEndpoint::parse(&host).map_err(|e| e.to_tauri_error())?;
    client.list_printer_urls(&endpoint).await.map_err(|e| {
        log::warn!("Printer list request failed: {}", e);
        super::PRINTER_FETCH_FAILED.to_string()
    })
}

#[tauri::command]
pub async fn check_service_status(
    host: String,
    client: tauri::State<'_, PrinterClient>,
) -> Result<ServiceStatus, String> {
    let endpoint = ServiceEndpoint::parse(&host).map_err(|e| e.to_tauri_error())?;
    Ok(client.probe(&endpoint).await)
}

#[tauri::command]
pub fn manual_printer_url(host: String, printer_ip: String) -> Result<String, String> {
    if printer_ip.trim().is_empty() {
        return Err("Please enter an IP.".to_string());
    }
    let endpoint = ServiceEndpoint::parse(&host).map_err(|e| e.to_tauri_error())?;
    Ok(endpoint.manual_printer_url(&printer_ip))
}

#[tauri::command]
pub async fn run_startup_checks(
    controller: tauri::State<'_, ServiceController>,
    client: tauri::State<'_, PrinterClient>,
) -> Result<StartupReport, String> {
    Ok(super::run_startup_checks(&controller, &client).await)
}
