use crate::adapters::keyword_interpreter;
use crate::core::catalog::{default_menu, MenuCatalog};
use crate::core::session::{Prompts, DEFAULT_TIMEOUT};
use crate::domain::model::MenuItem;
use crate::utils::error::{KioskError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    #[serde(default)]
    pub kiosk: StoreConfig,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default = "default_menu_entries")]
    pub menu: Vec<MenuEntry>,
    #[serde(default)]
    pub prompts: Prompts,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub locale: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "국밥 키오스크".to_string(),
            locale: "ko-KR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    /// Use the built-in keyword interpreter instead of the service.
    pub offline: Option<bool>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/process-voice".to_string(),
            timeout_seconds: None,
            offline: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: u32,
    pub name: String,
    pub price: u64,
    /// Words the offline interpreter listens for; defaults to the name.
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_menu_entries() -> Vec<MenuEntry> {
    let keywords = keyword_interpreter::default_keywords();
    default_menu()
        .into_iter()
        .map(|item| {
            let words = keywords
                .iter()
                .find(|(menu, _)| *menu == item.name)
                .map(|(_, words)| words.clone());
            MenuEntry {
                id: item.id,
                name: item.name,
                price: item.price,
                keywords: words,
            }
        })
        .collect()
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            kiosk: StoreConfig::default(),
            interpreter: InterpreterConfig::default(),
            session: SessionConfig::default(),
            menu: default_menu_entries(),
            prompts: Prompts::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl KioskConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(KioskError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when it exists, otherwise the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::info!(
                "No config at {}, using built-in defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| KioskError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitutes environment variables (e.g. ${INTERPRETER_URL}).
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| KioskError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if !self.is_offline() {
            validation::validate_url("interpreter.endpoint", &self.interpreter.endpoint)?;
        }
        validation::validate_non_empty_string("kiosk.locale", &self.kiosk.locale)?;

        if let Some(timeout) = self.session.timeout_ms {
            validation::validate_range("session.timeout_ms", timeout, 500, 60_000)?;
        }
        if let Some(timeout) = self.interpreter.timeout_seconds {
            validation::validate_range("interpreter.timeout_seconds", timeout, 1, 120)?;
        }

        if self.menu.is_empty() {
            return Err(KioskError::MissingConfigError {
                field: "menu".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for entry in &self.menu {
            validation::validate_non_empty_string("menu.name", &entry.name)?;
            if !seen.insert(entry.id) {
                return Err(KioskError::InvalidConfigValueError {
                    field: "menu.id".to_string(),
                    value: entry.id.to_string(),
                    reason: "Menu ids must be unique".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn catalog(&self) -> MenuCatalog {
        MenuCatalog::new(
            self.menu
                .iter()
                .map(|entry| MenuItem::new(entry.id, entry.name.clone(), entry.price))
                .collect(),
        )
    }

    pub fn keywords(&self) -> Vec<(String, Vec<String>)> {
        self.menu
            .iter()
            .map(|entry| {
                let words = entry
                    .keywords
                    .clone()
                    .unwrap_or_else(|| vec![entry.name.clone()]);
                (entry.name.clone(), words)
            })
            .collect()
    }

    pub fn session_timeout(&self) -> Duration {
        self.session
            .timeout_ms
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis)
    }

    pub fn interpreter_timeout(&self) -> Duration {
        Duration::from_secs(self.interpreter.timeout_seconds.unwrap_or(10))
    }

    pub fn is_offline(&self) -> bool {
        self.interpreter.offline.unwrap_or(false)
    }
}

impl Validate for KioskConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
