/// Canonical form of a user-supplied ticker: whitespace removed, uppercase.
pub fn normalize_symbol(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Fold a JSON key for alias matching (`growwCompanyId` == `groww_company_id`).
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
