//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

const SELECTION_POLICIES: [&str; 2] = ["first_registered", "round_robin"];
const STORAGE_BACKENDS: [&str; 2] = ["memory", "file"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// The first error as a `ConfigError`, if any.
    pub fn first_error(&self) -> Option<ConfigError> {
        self.errors
            .first()
            .map(|e| ConfigError::invalid_value(&e.path, &e.message))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_engine(config, &mut result);
        Self::validate_retry(config, &mut result);
        Self::validate_knowledge(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;

        if engine.max_concurrent_steps == 0 {
            result.add_error(ValidationError::new(
                "engine.max_concurrent_steps",
                "max_concurrent_steps must be greater than 0",
            ));
        }

        if engine.step_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "engine.step_timeout_secs",
                "step_timeout_secs must be greater than 0",
            ));
        } else if engine.step_timeout_secs > 3600 {
            result.add_warning(ValidationWarning::new(
                "engine.step_timeout_secs",
                "step_timeout_secs is very high (>1h), a hung agent will hold its slot that long",
            ));
        }

        if engine.orchestrate_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "engine.orchestrate_timeout_secs",
                "orchestrate_timeout_secs must be greater than 0",
            ));
        }

        if !SELECTION_POLICIES.contains(&engine.selection_policy.as_str()) {
            result.add_error(ValidationError::new(
                "engine.selection_policy",
                format!(
                    "Unknown selection policy '{}', valid values: {:?}",
                    engine.selection_policy, SELECTION_POLICIES
                ),
            ));
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        let retry = &config.engine.retry;

        if retry.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "engine.retry.max_attempts",
                "max_attempts must be at least 1",
            ));
        }

        if retry.backoff_multiplier < 1.0 {
            result.add_error(ValidationError::new(
                "engine.retry.backoff_multiplier",
                "backoff_multiplier must be >= 1.0",
            ));
        }

        if retry.max_delay_ms < retry.base_delay_ms {
            result.add_warning(ValidationWarning::new(
                "engine.retry.max_delay_ms",
                "max_delay_ms is below base_delay_ms; every retry waits max_delay_ms",
            ));
        }
    }

    fn validate_knowledge(config: &Config, result: &mut ValidationResult) {
        if config.vector.dimension == 0 {
            result.add_error(ValidationError::new(
                "vector.dimension",
                "dimension must be greater than 0",
            ));
        }

        if config.vector.store_type != "in_memory" {
            result.add_warning(ValidationWarning::new(
                "vector.store_type",
                format!(
                    "Unknown vector store '{}', the in-memory store will be used",
                    config.vector.store_type
                ),
            ));
        }

        if config.graph.password.is_empty() {
            result.add_warning(ValidationWarning::new(
                "graph.password",
                "Graph password is not set, may need to be set via NEO4J_PASSWORD",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if !STORAGE_BACKENDS.contains(&config.storage.backend.as_str()) {
            result.add_error(ValidationError::new(
                "storage.backend",
                format!(
                    "Unknown storage backend '{}', valid values: {:?}",
                    config.storage.backend, STORAGE_BACKENDS
                ),
            ));
        }

        if config.storage.backend == "file" && config.storage.path.is_empty() {
            result.add_error(ValidationError::new(
                "storage.path",
                "File backend requires a path",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!("Unknown log level '{}', falling back to info", config.logging.level),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
