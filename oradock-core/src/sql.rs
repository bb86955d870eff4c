//! Database client sessions
//!
//! Builds the scripts fed to the database client on standard input and
//! reads typed results back out of its text output.
//!
//! Credentials are sent inside the script (`CONNECT ...`) so they never
//! appear on a command line.

use crate::config::Credentials;
use crate::error::ParseError;
use crate::layout::to_db_path;
use std::path::Path;

/// Session settings that reduce query output to bare values
const QUIET_SETTINGS: &[&str] = &[
    "SET HEADING OFF",
    "SET FEEDBACK OFF",
    "SET ECHO OFF",
    "SET VERIFY OFF",
    "SET PAGESIZE 0",
    "SET TRIMSPOOL ON",
];

/// A script for one client session
#[derive(Debug, Clone)]
pub struct SqlSession {
    connect: String,
    statements: Vec<String>,
}

impl SqlSession {
    /// Session connected with the SYSDBA privilege
    ///
    /// An empty password selects operating-system authentication.
    pub fn sysdba(credentials: &Credentials) -> Self {
        let connect = if credentials.uses_os_auth() {
            "CONNECT / AS SYSDBA".to_string()
        } else {
            format!(
                "CONNECT {}/\"{}\" AS SYSDBA",
                credentials.username, credentials.password
            )
        };

        let mut statements: Vec<String> = QUIET_SETTINGS.iter().map(|s| s.to_string()).collect();
        statements.push("WHENEVER SQLERROR EXIT SQL.SQLCODE".to_string());

        Self {
            connect,
            statements,
        }
    }

    pub fn statement(mut self, sql: impl Into<String>) -> Self {
        self.statements.push(sql.into());
        self
    }

    pub fn statements<I, S>(mut self, sql: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statements.extend(sql.into_iter().map(Into::into));
        self
    }

    /// Full script text, ending with `EXIT`
    pub fn render(&self) -> String {
        let mut script = String::new();
        script.push_str(&self.connect);
        script.push('\n');
        for statement in &self.statements {
            script.push_str(statement);
            script.push('\n');
        }
        script.push_str("EXIT\n");
        script
    }
}

/// Query counting accounts with the given name
pub fn user_exists_query(username: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM dba_users WHERE username = '{}';",
        username.to_uppercase()
    )
}

/// Statements creating the export account and its directory object
///
/// The directory object points at the host dump directory, written with
/// forward slashes.
pub fn export_account_statements(
    account: &Credentials,
    directory_object: &str,
    dump_dir: &Path,
) -> Vec<String> {
    let user = &account.username;
    vec![
        format!("CREATE USER {} IDENTIFIED BY \"{}\";", user, account.password),
        format!("GRANT CREATE SESSION, UNLIMITED TABLESPACE TO {};", user),
        format!("GRANT EXP_FULL_DATABASE TO {};", user),
        format!(
            "CREATE OR REPLACE DIRECTORY {} AS '{}';",
            directory_object,
            to_db_path(dump_dir)
        ),
        format!(
            "GRANT READ, WRITE ON DIRECTORY {} TO {};",
            directory_object, user
        ),
    ]
}

/// Reads a single count from quiet-session client output
///
/// Output carrying an `ORA-` or `SP2-` code is an error. Otherwise the last
/// run of ASCII digits is the result, so surrounding prompts, padding and
/// line breaks are ignored.
pub fn parse_count(raw: &str) -> Result<u64, ParseError> {
    if let Some(line) = raw
        .lines()
        .find(|line| line.contains("ORA-") || line.contains("SP2-"))
    {
        return Err(ParseError::ClientError(line.trim().to_string()));
    }

    let digits = last_digit_run(raw).ok_or_else(|| ParseError::NoNumber(raw.trim().to_string()))?;

    digits
        .parse::<u64>()
        .map_err(|_| ParseError::OutOfRange(digits.to_string()))
}

fn last_digit_run(raw: &str) -> Option<&str> {
    let end = raw.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = raw[..end]
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    Some(&raw[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_count_with_noise() {
        assert_eq!(parse_count("1"), Ok(1));
        assert_eq!(parse_count("0"), Ok(0));
        assert_eq!(parse_count("\r\n         1\r\n"), Ok(1));
        assert_eq!(parse_count("\n\n         0\n\n"), Ok(0));
        assert_eq!(parse_count("SQL> [1]\nSQL> "), Ok(1));
        assert_eq!(parse_count("\u{feff}  0  \t"), Ok(0));
        assert_eq!(parse_count("\u{feff}1"), Ok(1));
    }

    #[test]
    fn test_parse_count_takes_last_number() {
        assert_eq!(parse_count("Connected.\n   12\n"), Ok(12));
        assert_eq!(parse_count("release 19\n  1"), Ok(1));
    }

    #[test]
    fn test_parse_count_rejects_client_errors() {
        let out = "ERROR:\nORA-01017: invalid username/password; logon denied\n";
        assert_eq!(
            parse_count(out),
            Err(ParseError::ClientError(
                "ORA-01017: invalid username/password; logon denied".to_string()
            ))
        );
        assert!(matches!(
            parse_count("SP2-0306: Invalid option."),
            Err(ParseError::ClientError(_))
        ));
    }

    #[test]
    fn test_parse_count_without_digits() {
        assert!(matches!(parse_count("\n  \n"), Err(ParseError::NoNumber(_))));
        assert!(matches!(
            parse_count("99999999999999999999999"),
            Err(ParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_sysdba_session_script() {
        let script = SqlSession::sysdba(&Credentials::new("sys", "pw"))
            .statement(user_exists_query("oradock_exp"))
            .render();

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], "CONNECT sys/\"pw\" AS SYSDBA");
        assert!(lines.contains(&"SET HEADING OFF"));
        assert!(lines.contains(&"SET FEEDBACK OFF"));
        assert!(lines.contains(&"SET ECHO OFF"));
        assert!(lines.contains(&"WHENEVER SQLERROR EXIT SQL.SQLCODE"));
        assert_eq!(
            lines[lines.len() - 2],
            "SELECT COUNT(*) FROM dba_users WHERE username = 'ORADOCK_EXP';"
        );
        assert_eq!(lines[lines.len() - 1], "EXIT");
    }

    #[test]
    fn test_os_auth_session() {
        let script = SqlSession::sysdba(&Credentials::new("sys", "")).render();
        assert!(script.starts_with("CONNECT / AS SYSDBA\n"));
    }

    #[test]
    fn test_export_account_statements() {
        let statements = export_account_statements(
            &Credentials::new("ORADOCK_EXP", "secret"),
            "ORADOCK_EXPORT_DIR",
            &PathBuf::from(r"D:\migrate\dump"),
        );
        assert_eq!(statements.len(), 5);
        assert_eq!(statements[0], "CREATE USER ORADOCK_EXP IDENTIFIED BY \"secret\";");
        assert_eq!(
            statements[3],
            "CREATE OR REPLACE DIRECTORY ORADOCK_EXPORT_DIR AS 'D:/migrate/dump';"
        );
        assert_eq!(
            statements[4],
            "GRANT READ, WRITE ON DIRECTORY ORADOCK_EXPORT_DIR TO ORADOCK_EXP;"
        );
    }
}
