use serde::de::DeserializeOwned;

/// Parse a `snake_case` enum value through serde. Hyphens are accepted in
/// place of underscores, so `tier-2` and `in-progress` work on the command line.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}
