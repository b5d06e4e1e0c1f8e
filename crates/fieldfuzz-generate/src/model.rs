use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_MAX_LEN;

/// Initial configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Leave unbound fields at their zero value.
    pub zero_value_fallthrough: bool,
    /// Upper bound for string, byte and list lengths of default values.
    pub max_len: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            zero_value_fallthrough: false,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}
