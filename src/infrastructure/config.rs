use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub source: SourceSettings,
    pub meter: MeterSettings,
    pub influx: InfluxSettings,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Where the raw line stream comes from.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub addr: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Tcp,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MeterSettings {
    /// Substring a line must contain to start a telegram, e.g. "ESMR5.0".
    pub header_marker: String,
    #[serde(default = "default_sample_density")]
    pub sample_density: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_sample_density() -> f64 {
    0.15
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/meter"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

fn validate(config: &AppConfig) -> anyhow::Result<()> {
    let density = config.meter.sample_density;
    anyhow::ensure!(
        density > 0.0 && density <= 1.0,
        "meter.sample_density must lie in (0, 1], got {density}"
    );
    match config.source.kind {
        SourceKind::Tcp => anyhow::ensure!(
            config.source.addr.is_some(),
            "source.addr is required for a tcp source"
        ),
        SourceKind::File => anyhow::ensure!(
            config.source.path.is_some(),
            "source.path is required for a file source"
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(density: f64) -> AppConfig {
        AppConfig {
            source: SourceSettings {
                kind: SourceKind::Tcp,
                addr: Some("192.168.1.50:2001".to_string()),
                path: None,
            },
            meter: MeterSettings {
                header_marker: "ESMR5.0".to_string(),
                sample_density: density,
            },
            influx: InfluxSettings {
                host: "http://localhost:8086".to_string(),
                token: "secret".to_string(),
                database: "smartmeter".to_string(),
                retention_policy: "autogen".to_string(),
            },
            http: HttpSettings::default(),
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(validate(&sample_config(0.15)).is_ok());
        assert!(validate(&sample_config(1.0)).is_ok());
    }

    #[test]
    fn test_validate_rejects_density_out_of_range() {
        assert!(validate(&sample_config(0.0)).is_err());
        assert!(validate(&sample_config(-0.1)).is_err());
        assert!(validate(&sample_config(1.5)).is_err());
    }

    #[test]
    fn test_validate_requires_a_source_location() {
        let mut config = sample_config(0.15);
        config.source.addr = None;
        assert!(validate(&config).is_err());

        config.source.kind = SourceKind::File;
        assert!(validate(&config).is_err());
        config.source.path = Some(PathBuf::from("demos/telegrams.txt"));
        assert!(validate(&config).is_ok());
    }
}
