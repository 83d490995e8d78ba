//! [`TestConfigDir`] builder for on-disk configuration fixtures.

use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tempfile::TempDir;

use guild_model::{CategorySpec, DesiredState, IntegrationSpec, RoleSpec};

/// A temporary configuration directory with helper methods for writing
/// the YAML files the loader expects.
///
/// # Example
///
/// ```rust,no_run
/// use guild_test_utils::config::TestConfigDir;
/// use guild_test_utils::fixtures;
///
/// let dir = TestConfigDir::new();
/// dir.write_desired(&fixtures::project_server());
/// ```
pub struct TestConfigDir {
    temp_dir: TempDir,
}

impl Default for TestConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestConfigDir: failed to create temp dir"),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write raw content to a file under the root.
    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.root().join(name), content)
            .expect("TestConfigDir: failed to write file");
    }

    /// Write a full desired state as `roles.yaml`, `channels.yaml`, and
    /// `integrations.yaml`.
    pub fn write_desired(&self, desired: &DesiredState) {
        self.write_roles(&desired.roles);
        self.write_categories(&desired.categories);
        self.write_integrations(&desired.integrations);
    }

    /// Write `roles.yaml`.
    pub fn write_roles(&self, roles: &[RoleSpec]) {
        self.write_wrapped("roles.yaml", "roles", roles);
    }

    /// Write `channels.yaml`.
    pub fn write_categories(&self, categories: &[CategorySpec]) {
        self.write_wrapped("channels.yaml", "categories", categories);
    }

    /// Write `integrations.yaml`.
    pub fn write_integrations(&self, integrations: &[IntegrationSpec]) {
        self.write_wrapped("integrations.yaml", "integrations", integrations);
    }

    fn write_wrapped<T: serde::Serialize + ?Sized>(&self, file: &str, key: &str, value: &T) {
        let inner = serde_yaml::to_value(value).expect("TestConfigDir: failed to serialize");
        let mut mapping = serde_yaml::Mapping::new();
        mapping.insert(Value::String(key.to_string()), inner);
        let content = serde_yaml::to_string(&Value::Mapping(mapping))
            .expect("TestConfigDir: failed to serialize");
        self.write(file, &content);
    }
}
