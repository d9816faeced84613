use serde::{Deserialize, Serialize};

use super::*;

/// Knobs for discovery, rendering and popup placement.
///
/// Every field has a default, so a TOML document only needs the keys it
/// wants to change:
///
/// ```toml
/// opt_out_class = "keep-native"
/// portal_selectors = [".table-wrap"]
///
/// [positioning]
/// margin = 12.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhancerConfig {
    /// Elements carrying this attribute keep their native control.
    pub opt_out_attribute: String,
    /// Elements carrying this class keep their native control.
    pub opt_out_class: String,
    /// Regions whose popups render under `<body>` to escape clipping.
    pub portal_selectors: Vec<String>,
    /// Locale for date labels, such as `en_US` or `fr-FR`. `None` selects the
    /// numeric fallback.
    pub locale: Option<String>,
    /// Trigger text for an empty date input.
    pub date_placeholder: String,
    /// Follow document changes automatically. When off, new markup is only
    /// picked up through an explicit re-scan.
    pub observe_mutations: bool,
    pub positioning: PositioningConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositioningConfig {
    pub margin: f64,
    pub gap: f64,
    pub min_width: f64,
    pub date_width: f64,
    pub estimated_date_height: f64,
    pub option_row_height: f64,
    pub max_list_height: f64,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            opt_out_attribute: "data-native".to_string(),
            opt_out_class: "native-control".to_string(),
            portal_selectors: vec!["[data-portal-view]".to_string(), ".portal-view".to_string()],
            locale: Some("en_US".to_string()),
            date_placeholder: "Select date".to_string(),
            observe_mutations: true,
            positioning: PositioningConfig::default(),
        }
    }
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            margin: 8.0,
            gap: 4.0,
            min_width: 160.0,
            date_width: 288.0,
            estimated_date_height: 332.0,
            option_row_height: 32.0,
            max_list_height: 280.0,
        }
    }
}

impl EnhancerConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: Self = toml::from_str(src).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.opt_out_attribute.trim().is_empty() {
            return Err(Error::Config("opt_out_attribute must not be empty".into()));
        }
        for selector in &self.portal_selectors {
            parse_selector_groups(selector)
                .map_err(|_| Error::Config(format!("unsupported portal selector: {selector}")))?;
        }

        let p = &self.positioning;
        let lengths = [
            ("margin", p.margin),
            ("gap", p.gap),
            ("min_width", p.min_width),
            ("date_width", p.date_width),
            ("estimated_date_height", p.estimated_date_height),
            ("option_row_height", p.option_row_height),
            ("max_list_height", p.max_list_height),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "positioning.{name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() -> Result<()> {
        let config = EnhancerConfig::from_toml_str(
            r#"
            opt_out_class = "keep-native"
            portal_selectors = [".table-wrap"]

            [positioning]
            margin = 12.0
            "#,
        )?;
        assert_eq!(config.opt_out_class, "keep-native");
        assert_eq!(config.opt_out_attribute, "data-native");
        assert_eq!(config.portal_selectors, vec![".table-wrap".to_string()]);
        assert_eq!(config.positioning.margin, 12.0);
        assert_eq!(config.positioning.gap, 4.0);
        Ok(())
    }

    #[test]
    fn unknown_keys_and_bad_selectors_are_rejected() {
        assert!(matches!(
            EnhancerConfig::from_toml_str("opt_out = true"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            EnhancerConfig::from_toml_str("portal_selectors = [\"li + li\"]"),
            Err(Error::Config(message)) if message.contains("li + li")
        ));
        assert!(matches!(
            EnhancerConfig::from_toml_str("[positioning]\nmargin = -1.0"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn default_config_survives_a_toml_round_trip() -> Result<()> {
        let config = EnhancerConfig::default();
        let text = config.to_toml_string()?;
        assert_eq!(EnhancerConfig::from_toml_str(&text)?, config);
        Ok(())
    }
}
