//! Query dialects and data sources.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// One of the supported surface query syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SQL subset (`SELECT ... FROM ... WHERE ...`).
    Sql,
    /// Pipe-based search language (`search ... | stats ... | head N`).
    Spl,
    /// Pipe-based analytics language (`table | where ... | summarize ...`).
    Kql,
    /// YAML-like detection rule with a `detection.selection` block.
    Sigma,
}

impl Dialect {
    /// All dialects, in display order.
    pub const ALL: [Dialect; 4] = [Self::Sql, Self::Spl, Self::Kql, Self::Sigma];

    /// Returns the lowercase tag of this dialect.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Spl => "spl",
            Self::Kql => "kql",
            Self::Sigma => "sigma",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// The dialect tag is not one of `sql`, `spl`, `kql` or `sigma`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported query language: {0}")]
pub struct UnsupportedDialect(pub String);

impl FromStr for Dialect {
    type Err = UnsupportedDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sql" => Ok(Self::Sql),
            "spl" => Ok(Self::Spl),
            "kql" => Ok(Self::Kql),
            "sigma" => Ok(Self::Sigma),
            _ => Err(UnsupportedDialect(s.to_string())),
        }
    }
}

/// A named dataset the lessons run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Authentication events (logins, failures, lockouts).
    AuthLogs,
    /// Network flow records.
    NetworkTraffic,
    /// DNS queries.
    DnsLogs,
    /// Process creation events.
    ProcessEvents,
}

impl DataSource {
    /// All data sources.
    pub const ALL: [DataSource; 4] = [
        Self::AuthLogs,
        Self::NetworkTraffic,
        Self::DnsLogs,
        Self::ProcessEvents,
    ];

    /// Returns the snake-case name, which is also the dataset file stem.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AuthLogs => "auth_logs",
            Self::NetworkTraffic => "network_traffic",
            Self::DnsLogs => "dns_logs",
            Self::ProcessEvents => "process_events",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The name does not match any known data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown data source: '{0}'")]
pub struct UnknownDataSource(pub String);

impl FromStr for DataSource {
    type Err = UnknownDataSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDataSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("sql".parse::<Dialect>().unwrap(), Dialect::Sql);
        assert_eq!("SPL".parse::<Dialect>().unwrap(), Dialect::Spl);
        assert_eq!(" kql ".parse::<Dialect>().unwrap(), Dialect::Kql);
        assert_eq!("sigma".parse::<Dialect>().unwrap(), Dialect::Sigma);
    }

    #[test]
    fn test_dialect_unsupported() {
        let err = "eql".parse::<Dialect>().unwrap_err();
        assert_eq!(err, UnsupportedDialect("eql".to_string()));
        assert_eq!(err.to_string(), "Unsupported query language: eql");
    }

    #[test]
    fn test_dialect_serialization() {
        assert_eq!(serde_json::to_string(&Dialect::Kql).unwrap(), "\"kql\"");
        let dialect: Dialect = serde_json::from_str("\"sigma\"").unwrap();
        assert_eq!(dialect, Dialect::Sigma);
    }

    #[test]
    fn test_data_source_names() {
        for source in DataSource::ALL {
            assert_eq!(source.name().parse::<DataSource>().unwrap(), source);
            assert_eq!(
                serde_json::to_string(&source).unwrap(),
                format!("\"{}\"", source.name())
            );
        }
        assert!("firewall".parse::<DataSource>().is_err());
    }
}
