//! Export domain types

use crate::config::{Credentials, RunConfig};
use crate::layout::{DUMP_FILE_NAME, EXPORT_LOG_NAME};

/// Directory object on the source database pointing at the host dump directory
pub const EXPORT_DIRECTORY_OBJECT: &str = "ORADOCK_EXPORT_DIR";

/// A schema-mode data pump export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub account: Credentials,
    pub directory: String,
    pub dump_file: String,
    pub log_file: String,
    pub schemas: String,
    pub version: Option<String>,
}

impl ExportRequest {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            account: config.export_account.clone(),
            directory: EXPORT_DIRECTORY_OBJECT.to_string(),
            dump_file: DUMP_FILE_NAME.to_string(),
            log_file: EXPORT_LOG_NAME.to_string(),
            schemas: config.schemas.joined(),
            version: config.export_version.clone(),
        }
    }

    /// Connect string argument; holds the password
    pub fn userid(&self) -> String {
        format!("{}/\"{}\"", self.account.username, self.account.password)
    }

    /// Parameter arguments, without the connect string
    pub fn parameters(&self) -> Vec<String> {
        let mut params = vec![
            format!("DIRECTORY={}", self.directory),
            format!("DUMPFILE={}", self.dump_file),
            format!("LOGFILE={}", self.log_file),
            format!("SCHEMAS={}", self.schemas),
            "REUSE_DUMPFILES=YES".to_string(),
        ];
        if let Some(version) = &self.version {
            params.push(format!("VERSION={}", version));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_parameters() {
        let mut config = RunConfig::new(
            "/srv/migrate",
            1522,
            "hr,scott",
            "AMERICAN_AMERICA.AL32UTF8",
            Credentials::new("sys", "pw"),
        );
        config.export_version = Some("11.2".to_string());

        let request = ExportRequest::from_config(&config);
        assert_eq!(request.userid(), "ORADOCK_EXP/\"oradock_exp\"");
        assert_eq!(
            request.parameters(),
            vec![
                "DIRECTORY=ORADOCK_EXPORT_DIR",
                "DUMPFILE=EXPORT.DMP",
                "LOGFILE=export.log",
                "SCHEMAS=HR,SCOTT",
                "REUSE_DUMPFILES=YES",
                "VERSION=11.2",
            ]
        );
    }
}
