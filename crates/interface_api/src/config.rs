//! Application configuration
//!
//! Read from `INVOICE_*` environment variables (after loading `.env`), with
//! the defaults below for anything unset.

use std::path::PathBuf;

use serde::Deserialize;

use invoice_pdf::{InvoicePrint, JpegImage, RenderError};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Configuration shared by the server and the admin CLI
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level, or a full `EnvFilter` directive
    pub log_level: String,
    pub log_format: LogFormat,
    /// Where printed invoices are written
    pub pdf_output_dir: PathBuf,
    /// JPEG printed in the invoice header
    pub logo_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/billing".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            pdf_output_dir: PathBuf::from("."),
            logo_path: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment
    ///
    /// `DATABASE_URL` is honoured when `INVOICE_DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default(
                "database_url",
                std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            )?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .set_default("pdf_output_dir", defaults.pdf_output_dir.to_string_lossy().into_owned())?
            .add_source(config::Environment::with_prefix("INVOICE"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The invoice layout, with the configured logo when there is one
    pub fn invoice_print(&self) -> Result<InvoicePrint, RenderError> {
        let print = InvoicePrint::new();
        match &self.logo_path {
            Some(path) => Ok(print.with_logo(JpegImage::open(path)?)),
            None => Ok(print),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = AppConfig {
            port: 3000,
            ..AppConfig::default()
        };
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_log_format_from_string() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_missing_logo_is_an_error() {
        let config = AppConfig {
            logo_path: Some(PathBuf::from("/nonexistent/logo.jpg")),
            ..AppConfig::default()
        };
        assert!(config.invoice_print().is_err());
    }

    #[test]
    fn test_no_logo_configured() {
        assert!(AppConfig::default().invoice_print().is_ok());
    }
}
