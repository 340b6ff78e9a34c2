//! Dispatcher stage
//!
//! Runs as an event handler for "object created" notifications and starts
//! one detached analyzer task per invocation. The task's outcome is never
//! observed here.
//!
//! Only the first record of a notification is dispatched. Batched
//! notifications therefore lose every record after the first; this is a
//! known limitation kept for compatibility with the existing deployment.

use async_trait::async_trait;
use lambda_runtime::LambdaEvent;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::types::ObjectRef;

pub mod ecs;
pub mod event;

pub use ecs::EcsLauncher;
pub use event::{S3Notification, UploadEvent};

/// Container in the task definition that receives the overrides
pub const CONTAINER_NAME: &str = "fft-analyzer";
pub const INPUT_BUCKET_ENV: &str = "INPUT_BUCKET";
pub const INPUT_KEY_ENV: &str = "INPUT_KEY";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Notification contains no records")]
    EmptyEvent,

    #[error("Invalid record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Task launch failed: {0}")]
    Launch(String),

    #[error("Task launch rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
}

/// Parameters of one analyzer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLaunch {
    pub object: ObjectRef,
}

impl TaskLaunch {
    pub fn new(object: ObjectRef) -> Self {
        Self { object }
    }

    /// Environment overrides for the analyzer container
    pub fn environment(&self) -> Vec<(&'static str, String)> {
        vec![
            (INPUT_BUCKET_ENV, self.object.bucket.clone()),
            (INPUT_KEY_ENV, self.object.key.clone()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LaunchReceipt {
    pub task_arns: Vec<String>,
}

/// Backend able to start a detached container task.
#[async_trait]
pub trait TaskLauncher: Send + Sync {
    async fn launch(&self, task: &TaskLaunch) -> Result<LaunchReceipt, DispatchError>;
}

pub struct Dispatcher<L: TaskLauncher> {
    launcher: L,
}

impl<L: TaskLauncher> Dispatcher<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Launch the analyzer for the first record of `event`.
    pub async fn dispatch(&self, event: &UploadEvent) -> Result<LaunchReceipt, DispatchError> {
        let object = event.first();
        info!("Image path: {}", object);

        let ignored = event.records().len() - 1;
        if ignored > 0 {
            warn!("Ignoring {} additional record(s) in notification", ignored);
        }

        let task = TaskLaunch::new(object.clone());
        match self.launcher.launch(&task).await {
            Ok(receipt) => {
                info!("Task submitted successfully");
                debug!("Launched tasks: {:?}", receipt.task_arns);
                Ok(receipt)
            }
            Err(e) => {
                error!("Error: {}", e);
                Err(e)
            }
        }
    }

    /// Lambda entry point: decode the notification, then dispatch.
    pub async fn handle(
        &self,
        event: LambdaEvent<S3Notification>,
    ) -> Result<LaunchReceipt, lambda_runtime::Error> {
        let (payload, context) = event.into_parts();
        debug!("Handling notification for request {}", context.request_id);

        let upload = UploadEvent::try_from(payload).map_err(|e| {
            error!("Error: {}", e);
            e
        })?;
        Ok(self.dispatch(&upload).await?)
    }
}
