use std::env;

use serde::Deserialize;

pub const ECS_CLUSTER: &str = "ECS_CLUSTER";
pub const TASK_DEFINITION: &str = "TASK_DEFINITION";
pub const SUBNET_ID: &str = "SUBNET_ID";

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Orchestration parameters for launching the analyzer task.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    pub cluster: String,
    pub task_definition: String,
    pub subnet_id: String,
}

/// Connection settings for the S3-compatible object store.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Reads `name` through `lookup`, treating blank values as absent.
fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name).ok_or(ConfigError::Missing(name))
}

impl DispatchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Every field is required; the first absent one is reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            cluster: required(&lookup, ECS_CLUSTER)?,
            task_definition: required(&lookup, TASK_DEFINITION)?,
            subnet_id: required(&lookup, SUBNET_ID)?,
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            region: non_empty(&lookup, "AWS_REGION")
                .or_else(|| non_empty(&lookup, "S3_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: non_empty(&lookup, "S3_ENDPOINT"),
            access_key_id: non_empty(&lookup, "AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty(&lookup, "AWS_SECRET_ACCESS_KEY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_dispatch_config_complete() {
        let config = DispatchConfig::from_lookup(lookup_from(&[
            ("ECS_CLUSTER", "fft-cluster"),
            ("TASK_DEFINITION", "fft-analyzer:3"),
            ("SUBNET_ID", "subnet-0abc"),
        ]))
        .unwrap();

        assert_eq!(config.cluster, "fft-cluster");
        assert_eq!(config.task_definition, "fft-analyzer:3");
        assert_eq!(config.subnet_id, "subnet-0abc");
    }

    #[test]
    fn test_dispatch_config_fails_fast_on_missing_field() {
        let result = DispatchConfig::from_lookup(lookup_from(&[
            ("ECS_CLUSTER", "fft-cluster"),
            ("SUBNET_ID", "subnet-0abc"),
        ]));
        assert_eq!(result, Err(ConfigError::Missing("TASK_DEFINITION")));
    }

    #[test]
    fn test_dispatch_config_treats_blank_as_missing() {
        let result = DispatchConfig::from_lookup(lookup_from(&[
            ("ECS_CLUSTER", "   "),
            ("TASK_DEFINITION", "fft-analyzer:3"),
            ("SUBNET_ID", "subnet-0abc"),
        ]));
        assert_eq!(result, Err(ConfigError::Missing("ECS_CLUSTER")));
    }

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
        assert!(config.access_key_id.is_none());
    }

    #[test]
    fn test_storage_config_prefers_aws_region() {
        let config = StorageConfig::from_lookup(lookup_from(&[
            ("AWS_REGION", "eu-west-1"),
            ("S3_REGION", "us-west-2"),
            ("S3_ENDPOINT", "http://localhost:9000"),
        ]));
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
    }
}
