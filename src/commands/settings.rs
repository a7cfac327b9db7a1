use crate::db::Database;
use crate::models::Settings;

pub const SETTING_KEYS: [&str; 7] = [
    "company_name",
    "address",
    "phones",
    "email_gst",
    "jurisdiction",
    "rate_per_piece",
    "minimum_payable",
];

/// Configuration for a session, stored values over built-in defaults.
/// Unreadable entries fall back to their default.
pub fn load_settings(db: &Database) -> Settings {
    let defaults = Settings::default();
    let text = |key: &str, fallback: String| db.get_setting(key).ok().flatten().unwrap_or(fallback);
    let amount = |key: &str, fallback: f64| {
        db.get_setting(key)
            .ok()
            .flatten()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 0.0)
            .unwrap_or(fallback)
    };

    Settings {
        company_name: text("company_name", defaults.company_name),
        address: text("address", defaults.address),
        phones: text("phones", defaults.phones),
        email_gst: text("email_gst", defaults.email_gst),
        jurisdiction: text("jurisdiction", defaults.jurisdiction),
        rate_per_piece: amount("rate_per_piece", defaults.rate_per_piece),
        minimum_payable: amount("minimum_payable", defaults.minimum_payable),
    }
}

pub fn get_settings(db: &Database) -> Result<Vec<(String, String)>, String> {
    let settings = load_settings(db);
    let value = serde_json::to_value(&settings).map_err(|e| e.to_string())?;
    Ok(SETTING_KEYS
        .iter()
        .map(|key| {
            let shown = match &value[*key] {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.to_string(), shown)
        })
        .collect())
}

pub fn save_setting(db: &Database, key: &str, value: &str) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key) {
        return Err(format!(
            "Unknown setting '{}'; expected one of: {}",
            key,
            SETTING_KEYS.join(", ")
        ));
    }
    if key == "rate_per_piece" || key == "minimum_payable" {
        let amount = value
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("{} must be a number: {}", key, e))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{} must be zero or more", key));
        }
    }
    db.set_setting(key, value.trim()).map_err(|e| e.to_string())?;
    tracing::info!(key, "Setting saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_until_overridden() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(load_settings(&db), Settings::default());

        save_setting(&db, "rate_per_piece", "45").unwrap();
        save_setting(&db, "company_name", "ACME ASSAY").unwrap();
        let settings = load_settings(&db);
        assert_eq!(settings.rate_per_piece, 45.0);
        assert_eq!(settings.company_name, "ACME ASSAY");
        assert_eq!(settings.minimum_payable, 500.0);
    }

    #[test]
    fn rejects_bad_keys_and_amounts() {
        let db = Database::open_in_memory().unwrap();
        assert!(save_setting(&db, "colour", "red").is_err());
        assert!(save_setting(&db, "minimum_payable", "lots").is_err());
        assert!(save_setting(&db, "minimum_payable", "-1").is_err());
    }

    #[test]
    fn unreadable_stored_amount_falls_back() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting("minimum_payable", "many").unwrap();
        assert_eq!(load_settings(&db).minimum_payable, 500.0);
    }

    #[test]
    fn lists_every_key() {
        let db = Database::open_in_memory().unwrap();
        let listed = get_settings(&db).unwrap();
        assert_eq!(listed.len(), SETTING_KEYS.len());
        assert_eq!(listed[5], ("rate_per_piece".to_string(), "50.0".to_string()));
    }
}
