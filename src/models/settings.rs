use serde::{Deserialize, Deserializer, Serialize};

/// Tema de la superficie de render
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Ajustes por identidad, persistidos en local y replicados al backend.
/// Los blobs antiguos guardaban el intervalo como cadena ("0", "30"...),
/// por eso el deserializador acepta ambas formas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(
        rename = "defaultRefreshInterval",
        default,
        deserialize_with = "interval_from_repr"
    )]
    pub default_refresh_interval_secs: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self { theme: Theme::Light, default_refresh_interval_secs: 0 }
    }
}

fn interval_from_repr<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u32),
        Text(String),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Number(n) => n,
        Repr::Text(s) => s.trim().parse().unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_light_and_no_refresh() {
        let settings = UserSettings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.default_refresh_interval_secs, 0);
    }

    #[test]
    fn empty_blob_decodes_to_defaults() {
        let settings: UserSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn legacy_string_interval_decodes() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"theme":"dark","defaultRefreshInterval":"30"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.default_refresh_interval_secs, 30);
    }

    #[test]
    fn numeric_interval_decodes() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"defaultRefreshInterval":60}"#).unwrap();
        assert_eq!(settings.default_refresh_interval_secs, 60);
    }
}
