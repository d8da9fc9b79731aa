use std::str::FromStr;

use anyhow::Context;
use log::LevelFilter;

#[derive(Clone, Debug, PartialEq)]
pub struct SoakConfig {
    pub initial_capacity: usize,
    pub operations: usize,
    /// chance, out of 100, that a step enqueues instead of dequeues
    pub enqueue_percent: u8,
    pub seed: Option<u64>,
    pub log_level: LevelFilter,
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            operations: 100_000,
            enqueue_percent: 55,
            seed: None,
            log_level: LevelFilter::Info,
        }
    }
}

impl SoakConfig {
    pub fn load_from_env() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        fn get_env<T>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> anyhow::Result<Option<T>>
        where
            T: FromStr,
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            lookup(key)
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .with_context(|| anyhow::anyhow!("invalid `{key}` in the env: {value:?}"))
                })
                .transpose()
        }

        let default = Self::default();

        let enqueue_percent = get_env(&lookup, "CIRCQ_ENQUEUE_PERCENT")?
            .unwrap_or(default.enqueue_percent);
        anyhow::ensure!(
            enqueue_percent <= 100,
            "`CIRCQ_ENQUEUE_PERCENT` must be at most 100, got {enqueue_percent}"
        );

        Ok(Self {
            initial_capacity: get_env(&lookup, "CIRCQ_INITIAL_CAPACITY")?
                .unwrap_or(default.initial_capacity),
            operations: get_env(&lookup, "CIRCQ_OPERATIONS")?.unwrap_or(default.operations),
            enqueue_percent,
            seed: get_env(&lookup, "CIRCQ_SEED")?,
            log_level: get_env(&lookup, "CIRCQ_LOG")?.unwrap_or(default.log_level),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use log::LevelFilter;

    use super::SoakConfig;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = SoakConfig::load_from(lookup(&[])).unwrap();
        assert_eq!(config, SoakConfig::default());
    }

    #[test]
    fn overrides() {
        let config = SoakConfig::load_from(lookup(&[
            ("CIRCQ_INITIAL_CAPACITY", "16"),
            ("CIRCQ_OPERATIONS", " 500 "),
            ("CIRCQ_ENQUEUE_PERCENT", "100"),
            ("CIRCQ_SEED", "42"),
            ("CIRCQ_LOG", "trace"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            SoakConfig {
                initial_capacity: 16,
                operations: 500,
                enqueue_percent: 100,
                seed: Some(42),
                log_level: LevelFilter::Trace,
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = SoakConfig::load_from(lookup(&[("CIRCQ_OPERATIONS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("CIRCQ_OPERATIONS"), "{err}");

        let err = SoakConfig::load_from(lookup(&[("CIRCQ_ENQUEUE_PERCENT", "101")])).unwrap_err();
        assert!(err.to_string().contains("at most 100"), "{err}");
    }
}
