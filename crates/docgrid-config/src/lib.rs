use docgrid_model::{ModelError, Schema, SchemaSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read schema file at {schema_path}: {source}")]
    SchemaReadError {
        schema_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse schema file at {schema_path}: {source}")]
    SchemaParseError {
        schema_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid schema: {0}")]
    InvalidSchema(#[from] ModelError),
}

/// Which schema documents are built against.
///
/// The schema is either written inline under `[schema]` or kept in its own
/// TOML file named by `schema_path`. Inline wins when both are present;
/// with neither, the built-in basic schema is used.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaSpec>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the schema file path
        config.schema_path = config
            .schema_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        log::debug!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/docgrid");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The schema description this config selects.
    pub fn schema_spec(&self) -> Result<SchemaSpec, ConfigError> {
        if let Some(spec) = &self.schema {
            return Ok(spec.clone());
        }
        let Some(schema_path) = &self.schema_path else {
            return Ok(SchemaSpec::basic());
        };
        let content = std::fs::read_to_string(schema_path).map_err(|source| {
            ConfigError::SchemaReadError {
                schema_path: schema_path.clone(),
                source,
            }
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::SchemaParseError {
            schema_path: schema_path.clone(),
            source,
        })
    }

    /// Compile the configured schema.
    pub fn build_schema(&self) -> Result<Schema, ConfigError> {
        let schema = Schema::new(self.schema_spec()?)?;
        Ok(schema)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgrid_model::{NodeSpec, TableRole};
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn grid_only_spec() -> SchemaSpec {
        SchemaSpec {
            top_node: "doc".to_string(),
            marks: vec![],
            nodes: vec![
                NodeSpec::new("doc").content("grid+"),
                NodeSpec::new("grid")
                    .content("line+")
                    .table_role(TableRole::Table),
                NodeSpec::new("line")
                    .content("slot*")
                    .table_role(TableRole::Row),
                NodeSpec::new("slot")
                    .content("text*")
                    .table_role(TableRole::Cell),
                NodeSpec::new("text").inline(),
            ],
        }
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/docgrid/config.toml"));
    }

    #[test]
    fn test_empty_config_builds_basic_schema() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());

        let schema = config.build_schema().unwrap();
        assert_eq!(schema.spec(), &SchemaSpec::basic());
    }

    #[test]
    fn test_inline_schema_from_toml() {
        let config_content = r#"
[schema]
marks = ["strong"]

[[schema.nodes]]
name = "doc"
content = "block+"

[[schema.nodes]]
name = "paragraph"
content = "inline*"
group = "block"

[[schema.nodes]]
name = "text"
group = "inline"
inline = true

[[schema.nodes]]
name = "table"
content = "table_row+"
group = "block"
table_role = "table"

[[schema.nodes]]
name = "table_row"
content = "table_cell*"
table_role = "row"

[[schema.nodes]]
name = "table_cell"
content = "paragraph+"
table_role = "cell"

[schema.nodes.attrs.colspan]
default = 1
"#;

        let config: Config = toml::from_str(config_content).unwrap();
        let schema = config.build_schema().unwrap();
        let cell = schema.node_type("table_cell").unwrap();

        assert_eq!(schema.top_node_type().name(), "doc");
        assert_eq!(cell.table_role(), Some(TableRole::Cell));
        assert_eq!(cell.default_attrs()["colspan"], docgrid_model::AttrValue::Int(1));
        assert_eq!(
            cell.create_and_fill().unwrap().to_string(),
            "table_cell(paragraph)"
        );
    }

    #[test]
    fn test_invalid_content_expression_is_reported() {
        let config = Config {
            schema_path: None,
            schema: Some(SchemaSpec {
                top_node: "doc".to_string(),
                marks: vec![],
                nodes: vec![NodeSpec::new("doc").content("(block"), NodeSpec::new("text")],
            }),
        };

        let err = config.build_schema().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSchema(ModelError::InvalidContentExpr { .. })
        ));
    }

    #[test]
    fn test_schema_file_is_loaded_from_schema_path() {
        let temp_dir = TempDir::new().unwrap();
        let schema_file = temp_dir.path().join("schema.toml");
        std::fs::write(&schema_file, toml::to_string_pretty(&grid_only_spec()).unwrap()).unwrap();

        let config = Config {
            schema_path: Some(schema_file),
            schema: None,
        };
        let schema = config.build_schema().unwrap();

        assert_eq!(schema.spec(), &grid_only_spec());
        assert_eq!(
            schema.node_type("slot").unwrap().table_role(),
            Some(TableRole::Cell)
        );
    }

    #[test]
    fn test_missing_schema_file_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            schema_path: Some(temp_dir.path().join("missing.toml")),
            schema: None,
        };

        let err = config.build_schema().unwrap_err();
        assert!(matches!(err, ConfigError::SchemaReadError { .. }));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_schema_path_with_env_var_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "schema_path = \"$DOCGRID_SCHEMAS/grid.toml\"\n").unwrap();

        unsafe {
            env::set_var("DOCGRID_SCHEMAS", "/custom/schemas");
        }

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(
            config.schema_path,
            Some(PathBuf::from("/custom/schemas/grid.toml"))
        );

        unsafe {
            env::remove_var("DOCGRID_SCHEMAS");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_config_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "schema = 42\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        match err {
            ConfigError::ConfigParseError { config_path, .. } => assert_eq!(config_path, config_file),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            schema_path: None,
            schema: Some(SchemaSpec::basic()),
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
