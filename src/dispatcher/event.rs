//! Upload notification payloads
//!
//! The wire shape follows the S3 "object created" notification; only the
//! fields the dispatcher needs are modelled, everything else is ignored.

use serde::{Deserialize, Serialize};

use super::DispatchError;
use crate::types::ObjectRef;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    pub key: String,
}

impl NotificationRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            s3: S3Entity {
                bucket: S3Bucket { name: bucket.into() },
                object: S3Object { key: key.into() },
            },
        }
    }
}

/// Validated notification: at least one record, each with a bucket and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    records: Vec<ObjectRef>,
}

impl UploadEvent {
    pub fn records(&self) -> &[ObjectRef] {
        &self.records
    }

    /// The record the dispatcher acts on.
    pub fn first(&self) -> &ObjectRef {
        // Non-empty by construction
        &self.records[0]
    }
}

impl TryFrom<S3Notification> for UploadEvent {
    type Error = DispatchError;

    fn try_from(notification: S3Notification) -> Result<Self, Self::Error> {
        if notification.records.is_empty() {
            return Err(DispatchError::EmptyEvent);
        }

        let records = notification
            .records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let S3Entity { bucket, object } = record.s3;
                if bucket.name.is_empty() {
                    return Err(DispatchError::InvalidRecord {
                        index,
                        reason: "bucket name is empty".to_string(),
                    });
                }
                if object.key.is_empty() {
                    return Err(DispatchError::InvalidRecord {
                        index,
                        reason: "object key is empty".to_string(),
                    });
                }
                Ok(ObjectRef::new(bucket.name, object.key))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_s3_notification() {
        let payload = serde_json::json!({
            "Records": [{
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "bucket": { "name": "images", "arn": "arn:aws:s3:::images" },
                    "object": { "key": "inputs/photo_20240102T030405.jpg", "size": 1024 }
                }
            }]
        });

        let notification: S3Notification = serde_json::from_value(payload).unwrap();
        let event = UploadEvent::try_from(notification).unwrap();

        assert_eq!(event.records().len(), 1);
        assert_eq!(
            event.first(),
            &ObjectRef::new("images", "inputs/photo_20240102T030405.jpg")
        );
    }

    #[test]
    fn test_missing_records_is_empty_event() {
        let notification: S3Notification = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            UploadEvent::try_from(notification),
            Err(DispatchError::EmptyEvent)
        ));

        let notification: S3Notification = serde_json::from_str(r#"{"Records": []}"#).unwrap();
        assert!(matches!(
            UploadEvent::try_from(notification),
            Err(DispatchError::EmptyEvent)
        ));
    }

    #[test]
    fn test_record_without_key_fails_to_decode() {
        let result = serde_json::from_str::<S3Notification>(
            r#"{"Records": [{"s3": {"bucket": {"name": "images"}, "object": {}}}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_key_is_rejected_with_index() {
        let notification = S3Notification {
            records: vec![
                NotificationRecord::new("images", "inputs/a.png"),
                NotificationRecord::new("images", ""),
            ],
        };

        match UploadEvent::try_from(notification) {
            Err(DispatchError::InvalidRecord { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_records_keep_delivery_order() {
        let notification = S3Notification {
            records: vec![
                NotificationRecord::new("images", "inputs/first.png"),
                NotificationRecord::new("other", "inputs/second.png"),
            ],
        };

        let event = UploadEvent::try_from(notification).unwrap();
        assert_eq!(event.first().key, "inputs/first.png");
        assert_eq!(event.records()[1].bucket, "other");
    }
}
