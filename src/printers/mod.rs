#[cfg(feature = "desktop")]
pub mod commands;
pub mod client;
pub mod model;

pub use client::{PrinterClient, ServiceEndpoint};
pub use model::{ServiceStatus, StartupReport, UsbPrinter};

use crate::service::ServiceController;

pub const PRINTER_FETCH_FAILED: &str = "Error fetching printers, the service may be down";

/// Launch sequence: resolve the IP, list printers, then probe the service.
/// Each step reports its own failure; none of them stops the next.
pub async fn run_startup_checks(
    controller: &ServiceController,
    client: &PrinterClient,
) -> StartupReport {
    let ip = controller.local_ip().await;

    let endpoint = match ServiceEndpoint::parse(&ip) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            log::warn!("Cannot address printer service at {:?}: {}", ip, e);
            let status = ServiceStatus::Unreachable {
                url: ip.clone(),
                reason: e.to_string(),
            };
            return StartupReport {
                ip,
                printers: Vec::new(),
                printer_error: Some(PRINTER_FETCH_FAILED.to_string()),
                status_text: status.describe(),
                status,
            };
        }
    };

    let (printers, printer_error) = match client.list_printer_urls(&endpoint).await {
        Ok(urls) => (urls, None),
        Err(e) => {
            log::warn!("Printer list unavailable: {}", e);
            (Vec::new(), Some(PRINTER_FETCH_FAILED.to_string()))
        }
    };

    let status = client.probe(&endpoint).await;
    log::info!("Startup checks: {}", status.describe());

    StartupReport {
        ip,
        printers,
        printer_error,
        status_text: status.describe(),
        status,
    }
}
