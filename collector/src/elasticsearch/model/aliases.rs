use serde::Deserialize;
use std::collections::BTreeMap;

/// `/_aliases`: index name to its aliases.
pub type Aliases = BTreeMap<String, AliasInfo>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AliasInfo {
    /// Alias name to its (unused) filter and routing settings.
    pub aliases: BTreeMap<String, serde_json::Value>,
}
