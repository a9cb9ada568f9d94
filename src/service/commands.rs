use super::dispatch::{ServiceController, ServiceOperation};
use crate::common::error::ToTauriError;
use crate::logging;

async fn run_operation(
    controller: &ServiceController,
    operation: ServiceOperation,
) -> Result<String, String> {
    let _ = logging::write_domain_log("audit", &format!("Requested {}", operation.as_str()));
    controller
        .run(operation)
        .await
        .map_err(|e| e.to_tauri_error())
}

#[tauri::command]
pub async fn add_service(state: tauri::State<'_, ServiceController>) -> Result<String, String> {
    run_operation(&state, ServiceOperation::AddService).await
}

#[tauri::command]
pub async fn delete_service(
    state: tauri::State<'_, ServiceController>,
) -> Result<String, String> {
    run_operation(&state, ServiceOperation::DeleteService).await
}

#[tauri::command]
pub async fn restart_service(
    state: tauri::State<'_, ServiceController>,
) -> Result<String, String> {
    run_operation(&state, ServiceOperation::RestartService).await
}

#[tauri::command]
pub async fn get_ip(state: tauri::State<'_, ServiceController>) -> Result<String, String> {
    state
        .run(ServiceOperation::GetIp)
        .await
        .map_err(|e| e.to_tauri_error())
}
