use meridian_data::SettingsDef;

use crate::error::ConstructionError;

/// Session-wide settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Display name of the session.
    pub name: String,
    /// RNG seed for deterministic placement.
    pub seed: u64,
    /// Simulation time between universe updates. Never zero.
    pub update_interval: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            name: "Untitled session".to_string(),
            seed: 42,
            update_interval: 10,
        }
    }
}

impl SessionSettings {
    /// Apply a settings definition over the defaults.
    pub fn from_def(def: Option<&SettingsDef>) -> Result<Self, ConstructionError> {
        let mut settings = Self::default();
        if let Some(def) = def {
            if let Some(name) = &def.name {
                settings.name = name.clone();
            }
            if let Some(seed) = def.seed {
                settings.seed = seed;
            }
            if let Some(interval) = def.update_interval {
                settings.update_interval = interval;
            }
        }
        if settings.update_interval == 0 {
            return Err(ConstructionError::InvalidSettings(
                "update_interval must be greater than zero".into(),
            ));
        }
        Ok(settings)
    }

    /// Set the session name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the update interval.
    pub fn with_update_interval(mut self, interval: u64) -> Self {
        self.update_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_definition() {
        let settings = SessionSettings::from_def(None).unwrap();
        assert_eq!(settings, SessionSettings::default());
        assert_eq!(settings.update_interval, 10);
    }

    #[test]
    fn definition_overrides_defaults() {
        let def = SettingsDef {
            name: Some("Arena".into()),
            seed: Some(7),
            update_interval: None,
            max_log: Some(5),
        };
        let settings = SessionSettings::from_def(Some(&def)).unwrap();
        assert_eq!(settings.name, "Arena");
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.update_interval, 10);
    }

    #[test]
    fn zero_interval_rejected() {
        let def = SettingsDef {
            update_interval: Some(0),
            ..Default::default()
        };
        let err = SessionSettings::from_def(Some(&def)).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidSettings(_)));
    }

    #[test]
    fn builder_chain() {
        let settings = SessionSettings::default()
            .with_name("Duel")
            .with_seed(9)
            .with_update_interval(3);
        assert_eq!(settings.name, "Duel");
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.update_interval, 3);
    }
}
