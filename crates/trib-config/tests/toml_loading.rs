//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use trib_config::TribConfig;

#[test]
fn loads_geometry_and_model_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[geometry]
area_tolerance_sq_m = 0.5
min_complement_sq_ft = 250.0

[model]
project_name = "Maple Street"
project_version = "rev3"
max_discharge_points = 10
"#,
        )?;

        let config: TribConfig = Figment::from(Serialized::defaults(TribConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!((config.geometry.area_tolerance_sq_m - 0.5).abs() < f64::EPSILON);
        assert!((config.geometry.min_complement_sq_ft - 250.0).abs() < f64::EPSILON);
        assert_eq!(config.model.project_name, "Maple Street");
        assert_eq!(config.model.project_version, "rev3");
        assert_eq!(config.model.max_discharge_points, 10);
        assert_eq!(config.model.id_max_len, 31);
        Ok(())
    });
}

#[test]
fn partial_sections_keep_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[soils]
area_symbol = "NY103"
"#,
        )?;

        let config: TribConfig = Figment::from(Serialized::defaults(TribConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.soils.is_configured());
        assert_eq!(config.soils.chunk_size, 50);
        assert_eq!(config.soils.timeout_secs, 90);
        assert_eq!(config.soils_area_symbol().ok(), Some("NY103"));
        Ok(())
    });
}

#[test]
fn load_from_explicit_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[general]
log_capacity = 42
"#,
        )?;

        let config = TribConfig::load_from(std::path::Path::new("custom.toml"))
            .expect("config loads");
        assert_eq!(config.general.log_capacity, 42);
        Ok(())
    });
}

#[test]
fn project_local_file_is_discovered() {
    Jail::expect_with(|jail| {
        jail.create_dir(".tributary")?;
        jail.create_file(
            ".tributary/config.toml",
            r#"
[model]
project_name = "Local"
"#,
        )?;

        let config = TribConfig::load().expect("config loads");
        assert_eq!(config.model.project_name, "Local");
        Ok(())
    });
}
