// ECS launcher: starts the analyzer as a Fargate task

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use aws_sdk_ecs::Client;
use tracing::warn;

use super::{DispatchError, LaunchReceipt, TaskLaunch, TaskLauncher, CONTAINER_NAME};
use crate::config::DispatchConfig;

pub struct EcsLauncher {
    client: Client,
    config: DispatchConfig,
}

impl EcsLauncher {
    pub fn new(client: Client, config: DispatchConfig) -> Self {
        Self { client, config }
    }

    /// Build a client from the default AWS credential and region chain.
    pub async fn from_env(config: DispatchConfig) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(Client::new(&sdk_config), config)
    }

    fn network_configuration(&self) -> Result<NetworkConfiguration, DispatchError> {
        let vpc = AwsVpcConfiguration::builder()
            .subnets(&self.config.subnet_id)
            .assign_public_ip(AssignPublicIp::Enabled)
            .build()
            .map_err(|e| DispatchError::Launch(e.to_string()))?;

        Ok(NetworkConfiguration::builder()
            .awsvpc_configuration(vpc)
            .build())
    }
}

/// Container override carrying the task's input location.
pub fn container_override(task: &TaskLaunch) -> TaskOverride {
    let environment = task
        .environment()
        .into_iter()
        .map(|(name, value)| KeyValuePair::builder().name(name).value(value).build());

    let container = ContainerOverride::builder()
        .name(CONTAINER_NAME)
        .set_environment(Some(environment.collect()))
        .build();

    TaskOverride::builder().container_overrides(container).build()
}

#[async_trait]
impl TaskLauncher for EcsLauncher {
    async fn launch(&self, task: &TaskLaunch) -> Result<LaunchReceipt, DispatchError> {
        let output = self
            .client
            .run_task()
            .cluster(&self.config.cluster)
            .task_definition(&self.config.task_definition)
            .launch_type(LaunchType::Fargate)
            .count(1)
            .network_configuration(self.network_configuration()?)
            .overrides(container_override(task))
            .send()
            .await
            .map_err(|e| DispatchError::Launch(DisplayErrorContext(&e).to_string()))?;

        // RunTask reports placement problems in the body of a successful response
        let failures: Vec<String> = output
            .failures()
            .iter()
            .map(|f| {
                format!(
                    "{} ({})",
                    f.reason().unwrap_or("unknown reason"),
                    f.arn().unwrap_or("no arn")
                )
            })
            .collect();
        if !failures.is_empty() {
            warn!("RunTask returned {} failure(s)", failures.len());
            return Err(DispatchError::Rejected(failures));
        }

        Ok(LaunchReceipt {
            task_arns: output
                .tasks()
                .iter()
                .filter_map(|t| t.task_arn().map(str::to_string))
                .collect(),
        })
    }
}
