//! Settings for `modgen` itself.
//!
//! Settings are declared as `static` [`Config`]s next to the code that reads them, registered
//! once into a [`ConfigSetBuilder`], and then read back with their concrete type. The command
//! line can override any registered setting by name with a string value.
//!
//! The types in this crate describe how the generator runs, _not_ which components or features
//! get built; that lives in `modgen-core`'s registries.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use compact_str::CompactString;
use modgen_ore::assert_none;

/// A single configuration setting.
#[derive(Debug)]
pub struct Config<V: ConfigType> {
    name: &'static str,
    desc: &'static str,
    default: V,
}

impl<V: ConfigType> Config<V> {
    /// Define a new [`Config`] with a default value.
    pub const fn new(name: &'static str, desc: &'static str, default: V) -> Self {
        Config {
            name,
            desc,
            default,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn desc(&self) -> &'static str {
        self.desc
    }

    /// Read the value of this [`Config`] from the provided [`ConfigSet`].
    ///
    /// # Panics
    /// * If this [`Config`] was never registered with the set's builder.
    pub fn read(&self, set: &ConfigSet) -> V::Stored {
        let entries = set.entries.read().expect("ConfigSet lock poisoned");
        let Some(entry) = entries.get(self.name) else {
            panic!("tried to read unregistered config {}", self.name);
        };
        V::from_value(&entry.value)
    }
}

/// A shareable set of [`Config`]s.
///
/// Clones share storage, so an update through one clone is visible through all of them.
#[derive(Clone, Debug)]
pub struct ConfigSet {
    entries: Arc<RwLock<BTreeMap<CompactString, ConfigEntry>>>,
}

impl ConfigSet {
    /// Returns a new [`ConfigSetBuilder`].
    pub fn builder() -> ConfigSetBuilder {
        ConfigSetBuilder::default()
    }

    /// Update a [`Config`] in this [`ConfigSet`] with the specified value.
    ///
    /// # Panics
    /// * If [`Config`] was not previously registered with the original [`ConfigSetBuilder`].
    pub fn update<V: ConfigType>(&self, config: &'static Config<V>, value: V) {
        let mut entries = self.entries.write().expect("ConfigSet lock poisoned");
        let entry = entries
            .get_mut(config.name)
            .expect("tried to update unregistered config");
        entry.value = value.to_value();
    }

    /// Update the [`Config`] in this [`ConfigSet`] with `name` to `value`.
    ///
    /// # Errors
    ///
    /// * If no config named `name` exists in this set.
    /// * If the config specified by `name` cannot parse `value`.
    pub fn try_update(&self, name: &str, value: &str) -> Result<(), anyhow::Error> {
        let mut entries = self.entries.write().expect("ConfigSet lock poisoned");
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| anyhow::anyhow!("no config named '{name}' found"))?;
        entry.value = entry
            .value
            .parse_same_kind(value)
            .map_err(|err| anyhow::anyhow!("invalid value '{value}' for config '{name}': {err}"))?;
        Ok(())
    }

    /// Update the [`Config`] named in a `name=value` assignment.
    pub fn try_assign(&self, assignment: &str) -> Result<(), anyhow::Error> {
        let Some((name, value)) = assignment.split_once('=') else {
            anyhow::bail!("expected NAME=VALUE, found '{assignment}'");
        };
        self.try_update(name.trim(), value.trim())
    }
}

impl fmt::Display for ConfigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read().map_err(|_| fmt::Error)?;
        for (name, entry) in &*entries {
            writeln!(f, "{} => {}\n\t└─ '{}'", name, entry.value, entry.desc)?;
        }
        Ok(())
    }
}

/// Single entry within a [`ConfigSet`].
#[derive(Clone, Debug)]
struct ConfigEntry {
    value: ConfigValue,
    desc: &'static str,
}

/// A builder for a [`ConfigSet`].
#[derive(Default, Debug)]
pub struct ConfigSetBuilder {
    entries: BTreeMap<CompactString, ConfigEntry>,
}

impl ConfigSetBuilder {
    /// Register a [`Config`] into this [`ConfigSetBuilder`] with its default value.
    ///
    /// # Panics
    /// * If a [`Config`] with the same name was already registered.
    pub fn register<V: ConfigType>(&mut self, config: &'static Config<V>) -> &mut Self {
        let entry = ConfigEntry {
            value: config.default.to_value(),
            desc: config.desc,
        };
        let prev = self
            .entries
            .insert(CompactString::const_new(config.name), entry);
        assert_none!(prev, "config '{}' registered more than once", config.name);
        self
    }

    /// Consumes this [`ConfigSetBuilder`] constructing a [`ConfigSet`].
    pub fn build(self) -> ConfigSet {
        ConfigSet {
            entries: Arc::new(RwLock::new(self.entries)),
        }
    }
}

/// Types that can be the value of a [`Config`].
pub trait ConfigType {
    /// What a read of the [`Config`] returns.
    type Stored;

    fn to_value(&self) -> ConfigValue;
    fn from_value(val: &ConfigValue) -> Self::Stored;
}

impl ConfigType for bool {
    type Stored = bool;

    fn to_value(&self) -> ConfigValue {
        ConfigValue::Bool(*self)
    }

    fn from_value(val: &ConfigValue) -> Self::Stored {
        let ConfigValue::Bool(val) = val else {
            panic!("programming error, found {val:?} for bool")
        };
        *val
    }
}

impl ConfigType for u64 {
    type Stored = u64;

    fn to_value(&self) -> ConfigValue {
        ConfigValue::U64(*self)
    }

    fn from_value(val: &ConfigValue) -> Self::Stored {
        let ConfigValue::U64(val) = val else {
            panic!("programming error, found {val:?} for u64")
        };
        *val
    }
}

impl ConfigType for &str {
    type Stored = CompactString;

    fn to_value(&self) -> ConfigValue {
        ConfigValue::String(CompactString::new(self))
    }

    fn from_value(val: &ConfigValue) -> Self::Stored {
        let ConfigValue::String(val) = val else {
            panic!("programming error, found {val:?} for string")
        };
        val.clone()
    }
}

/// "Type erased" configuration values.
///
/// An enum instead of `Box<dyn Any>` so parsing from the command line can dispatch on the kind
/// of value already stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    U64(u64),
    String(CompactString),
}

impl ConfigValue {
    /// Parse `raw` into a [`ConfigValue`] of the same kind as `self`.
    fn parse_same_kind(&self, raw: &str) -> Result<ConfigValue, anyhow::Error> {
        let value = match self {
            ConfigValue::Bool(_) => ConfigValue::Bool(parse_bool(raw)?),
            ConfigValue::U64(_) => ConfigValue::U64(raw.parse()?),
            ConfigValue::String(_) => ConfigValue::String(CompactString::new(raw)),
        };
        Ok(value)
    }
}

fn parse_bool(raw: &str) -> Result<bool, anyhow::Error> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => anyhow::bail!("'{other}' is not a boolean"),
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(val) => write!(f, "{val}"),
            ConfigValue::U64(val) => write!(f, "{val}"),
            ConfigValue::String(val) => write!(f, "'{val}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_CONFIG_A: Config<bool> =
        Config::new("test_config_a", "A test configuration value.", true);
    static TEST_CONFIG_B: Config<&'static str> =
        Config::new("test_config_b", "A test configuration value.", "foobar");
    static TEST_CONFIG_C: Config<u64> =
        Config::new("test_config_c", "A test configuration value.", 9);

    fn test_set() -> ConfigSet {
        let mut builder = ConfigSet::builder();
        builder
            .register(&TEST_CONFIG_A)
            .register(&TEST_CONFIG_B)
            .register(&TEST_CONFIG_C);
        builder.build()
    }

    #[test]
    fn smoketest_read() {
        let config_set = test_set();

        assert!(TEST_CONFIG_A.read(&config_set));
        assert_eq!(TEST_CONFIG_B.read(&config_set), "foobar");
        assert_eq!(TEST_CONFIG_C.read(&config_set), 9);
    }

    #[test]
    fn smoketest_update() {
        let config_set = test_set();
        let config_set_2 = config_set.clone();

        config_set.update(&TEST_CONFIG_A, false);
        assert!(!TEST_CONFIG_A.read(&config_set));
        assert!(!TEST_CONFIG_A.read(&config_set_2));

        config_set.update(&TEST_CONFIG_B, "hello world!");
        assert_eq!(TEST_CONFIG_B.read(&config_set_2), "hello world!");
    }

    #[test]
    fn smoketest_parse() {
        let config_set = test_set();

        config_set.try_update("test_config_a", "no").unwrap();
        assert!(!TEST_CONFIG_A.read(&config_set));

        config_set.try_assign("test_config_b = anotha one").unwrap();
        assert_eq!(TEST_CONFIG_B.read(&config_set), "anotha one");

        config_set.try_update("test_config_c", "8").unwrap();
        assert_eq!(TEST_CONFIG_C.read(&config_set), 8);
    }

    #[test]
    fn parse_errors() {
        let config_set = test_set();

        assert!(config_set.try_update("missing", "1").is_err());
        assert!(config_set.try_update("test_config_a", "maybe").is_err());
        assert!(config_set.try_update("test_config_c", "-1").is_err());
        assert!(config_set.try_assign("test_config_c").is_err());
        // Failed updates leave the old value in place.
        assert_eq!(TEST_CONFIG_C.read(&config_set), 9);
    }

    #[test]
    #[should_panic(expected = "registered more than once")]
    fn duplicate_registration_panics() {
        let mut builder = ConfigSet::builder();
        builder.register(&TEST_CONFIG_A).register(&TEST_CONFIG_A);
    }

    #[test]
    fn display_lists_descriptions() {
        let rendered = test_set().to_string();
        assert!(rendered.contains("test_config_b => 'foobar'"));
        assert!(rendered.contains("A test configuration value."));
    }
}
