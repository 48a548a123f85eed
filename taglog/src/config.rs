//! Declarative logger configuration.

use alloc::collections::BTreeMap;
use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::Severity;
use crate::logger::DEFAULT_TX_BUFFER_SIZE;

/// Everything needed to build a [`Logger`](crate::Logger) apart from its transport.
///
/// ```rust
/// use taglog::{LoggerConfig, Severity};
///
/// let config: LoggerConfig = serde_json::from_str(
///     r#"{ "level": "INFO", "logs": { "wifi": "VERBOSE" } }"#,
/// )?;
/// assert_eq!(config.tx_buffer_size, 512);
/// assert_eq!(config.level, Severity::Info);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Render buffer capacity in bytes, including the terminator.
    pub tx_buffer_size: usize,

    /// Global default level.
    pub level: Severity,

    /// Per-tag level overrides.
    pub logs: BTreeMap<String, Severity>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            tx_buffer_size: DEFAULT_TX_BUFFER_SIZE,
            level: Severity::Debug,
            logs: BTreeMap::new(),
        }
    }
}
