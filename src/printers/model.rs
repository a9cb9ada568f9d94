use serde::{Deserialize, Serialize};

/// A USB printer as reported by the printer service.
/// Older service builds use camelCase ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UsbPrinter {
    #[serde(default, alias = "vendorID")]
    pub vendor_id: String,
    #[serde(default, alias = "productID")]
    pub product_id: String,
}

/// Body of `GET /printer-list`
#[derive(Debug, Clone, Deserialize)]
pub struct PrinterListResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Vec<UsbPrinter>,
}

/// Result of probing the service root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServiceStatus {
    Running { url: String },
    HttpError { url: String, status: u16 },
    Unreachable { url: String, reason: String },
}

impl ServiceStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ServiceStatus::Running { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            ServiceStatus::Running { url } => format!("Service is running at {}", url),
            ServiceStatus::HttpError { status, .. } => format!("Service returned HTTP {}", status),
            ServiceStatus::Unreachable { reason, .. } => {
                format!("Failed to reach service, the service may be down: {}", reason)
            }
        }
    }
}

/// Everything the window shows after launch
#[derive(Debug, Clone, Serialize)]
pub struct StartupReport {
    pub ip: String,
    pub printers: Vec<String>,
    pub printer_error: Option<String>,
    pub status: ServiceStatus,
    pub status_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_and_camel_ids_both_parse() {
        let body = r#"{"status":"success","message":[
            {"vendor_id":"04b8","product_id":"0202","manufacturer":"EPSON"},
            {"vendorID":"0519","productID":"0003"}
        ]}"#;
        let parsed: PrinterListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "success");
        assert_eq!(
            parsed.message,
            vec![
                UsbPrinter {
                    vendor_id: "04b8".into(),
                    product_id: "0202".into()
                },
                UsbPrinter {
                    vendor_id: "0519".into(),
                    product_id: "0003".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_message_is_empty_list() {
        let parsed: PrinterListResponse = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert!(parsed.message.is_empty());
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let status = ServiceStatus::HttpError {
            url: "http://10.0.0.7".into(),
            status: 503,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "http_error");
        assert_eq!(json["status"], 503);
        assert_eq!(status.describe(), "Service returned HTTP 503");
    }
}
