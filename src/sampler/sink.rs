use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::Result;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_firehose::{Client, primitives::Blob, types::Record};
use log::{error, info};

use crate::{config::SamplerConfig, metrics::METRICS, schema::FirehoseRecord};

/// Durable append-only stream accepting one opaque byte record per
/// call and returning the identifier the service assigned to it.
///
/// THREAD SAFETY:
/// - Must be Send + Sync; one instance is shared across tasks.
///
/// Implementations must surface every submission failure (network,
/// throttling, auth) as an error; retry policy belongs to the caller.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn put_record(&self, data: Vec<u8>) -> Result<String>;
}

/// Kinesis Firehose implementation of [`RecordSink`].
///
/// Credentials and endpoints come from the ambient AWS environment;
/// only the region and delivery stream name are ours to configure.
pub struct FirehoseSink {
    client: Client,
    stream_name: String,
}

impl FirehoseSink {
    pub async fn connect(cfg: &SamplerConfig) -> Self {
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .load()
            .await;

        Self {
            client: Client::new(&aws_cfg),
            stream_name: cfg.stream_name.clone(),
        }
    }
}

#[async_trait]
impl RecordSink for FirehoseSink {
    async fn put_record(&self, data: Vec<u8>) -> Result<String> {
        let record = Record::builder().data(Blob::new(data)).build()?;

        let out = self
            .client
            .put_record()
            .delivery_stream_name(&self.stream_name)
            .record(record)
            .send()
            .await?;

        Ok(out.record_id().to_string())
    }
}

/// Serializes sampled records and hands them to the sink.
///
/// FAILURE POLICY:
/// - Any submission failure is caught, logged and the record dropped.
/// - No retry, no dead-letter; the next interval produces a fresh
///   record anyway.
pub struct SinkWriter {
    sink: Arc<dyn RecordSink>,
}

impl SinkWriter {
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self { sink }
    }

    /// Submits one record, reporting the assigned id on success.
    pub async fn submit(&self, record: &FirehoseRecord) {
        let payload = match serde_json::to_vec(record) {
            Ok(p) => p,
            Err(e) => {
                METRICS.submit_errors.fetch_add(1, Ordering::Relaxed);
                error!("record serialization failed: {e}");
                return;
            }
        };

        match self.sink.put_record(payload).await {
            Ok(id) => {
                METRICS.records_submitted.fetch_add(1, Ordering::Relaxed);
                info!("record sent, price: {:.2}, record id: {id}", record.price);
            }
            Err(e) => {
                METRICS.submit_errors.fetch_add(1, Ordering::Relaxed);
                error!("record submission failed: {e}");
            }
        }
    }
}
