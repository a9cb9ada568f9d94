use super::model::{PrinterListResponse, ServiceStatus, UsbPrinter};
use crate::common::error::PrinterError;
use crate::config::AppConfig;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Base address of the printer service, e.g. `http://192.168.1.50:8089`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base: Url,
}

impl ServiceEndpoint {
    /// Accepts `ip`, `ip:port` or a full `http://` URL
    pub fn parse(host: &str) -> Result<Self, PrinterError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(PrinterError::NoDeviceIp);
        }

        let candidate = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        let base =
            Url::parse(&candidate).map_err(|_| PrinterError::InvalidHost(host.to_string()))?;
        if base.host_str().is_none() {
            return Err(PrinterError::InvalidHost(host.to_string()));
        }
        Ok(Self { base })
    }

    pub fn root(&self) -> String {
        self.base.as_str().trim_end_matches('/').to_string()
    }

    pub fn printer_list_url(&self) -> String {
        format!("{}/printer-list", self.root())
    }

    /// Print URL for a USB printer attached to this machine
    pub fn printer_url(&self, printer: &UsbPrinter) -> String {
        format!(
            "{}/vid/{}/pid/{}",
            self.root(),
            printer.vendor_id,
            printer.product_id
        )
    }

    /// Print URL that relays to a network printer
    pub fn manual_printer_url(&self, printer_ip: &str) -> String {
        format!("{}/ip/{}", self.root(), printer_ip.trim())
    }
}

pub struct PrinterClient {
    client: Client,
}

impl PrinterClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            // The service lives on the LAN; never route it through a system proxy
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Duration::from_secs(config.http_timeout_secs))
    }

    pub async fn fetch_printers(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<Vec<UsbPrinter>, PrinterError> {
        let response = self.client.get(endpoint.printer_list_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrinterError::HttpStatus(status.as_u16()));
        }

        let body: PrinterListResponse = response
            .json()
            .await
            .map_err(|e| PrinterError::BadResponse(e.to_string()))?;

        if body.status != "success" {
            return Err(PrinterError::BadResponse(format!(
                "status \"{}\"",
                body.status
            )));
        }

        log::debug!("Printer service reported {} printer(s)", body.message.len());
        Ok(body.message)
    }

    pub async fn list_printer_urls(
        &self,
        endpoint: &ServiceEndpoint,
    ) -> Result<Vec<String>, PrinterError> {
        let printers = self.fetch_printers(endpoint).await?;
        Ok(printers.iter().map(|p| endpoint.printer_url(p)).collect())
    }

    /// Liveness check against the service root
    pub async fn probe(&self, endpoint: &ServiceEndpoint) -> ServiceStatus {
        let url = endpoint.root();
        match self.client.get(&url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                ServiceStatus::Running { url }
            }
            Ok(response) => ServiceStatus::HttpError {
                url,
                status: response.status().as_u16(),
            },
            Err(e) => {
                log::warn!("Printer service unreachable at {}: {}", url, e);
                ServiceStatus::Unreachable {
                    url,
                    reason: e.to_string(),
                }
            }
        }
    }
}
