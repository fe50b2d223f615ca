//! Kafka broker reached over the wire with `rdkafka`.
//!
//! Topic creation and single-message publishing talk to `broker_address`
//! directly. Bulk load generation runs `kafka-producer-perf-test` through
//! `docker exec -i <container>` because the perf tool's load profile is the
//! baseline the performance thresholds were tuned against.
//!
//! Invariants:
//! - A failed admin, metadata or produce request is a `Broker` error naming
//!   the operation.
//! - A single publish resolves only after the broker acknowledged delivery.
//! - The perf tool invocation is bounded by the command timeout; the child is
//!   killed when the timeout fires.

use std::ffi::OsString;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use harness_config::constants::{DEFAULT_KAFKA_CONTAINER, DEFAULT_KAFKA_INTERNAL_BOOTSTRAP};
use harness_config::{KafkaConfig, TimingConfig};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::message::{Header as KafkaHeader, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use search_client::{Attempt, PollPolicy, poll};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{BulkPublish, Header, MessageBroker};
use crate::error::{HarnessError, Result};

/// Upper bound for one perf tool run.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Upper bound for one admin, metadata or delivery round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PERF_TOOL: &str = "/bin/kafka-producer-perf-test";

fn broker_error(operation: impl Into<String>, message: impl fmt::Display) -> HarnessError {
    HarnessError::Broker {
        operation: operation.into(),
        message: message.to_string(),
    }
}

/// [`MessageBroker`] backed by an `rdkafka` producer and admin client, with
/// `kafka-producer-perf-test` inside a container for bulk loads.
pub struct KafkaBroker {
    producer: FutureProducer,
    admin: AdminClient<DefaultClientContext>,
    bootstrap: String,
    request_timeout: Duration,
    topic_ready: PollPolicy,
    docker: OsString,
    container: String,
    internal_bootstrap: String,
    command_timeout: Duration,
}

impl fmt::Debug for KafkaBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaBroker")
            .field("bootstrap", &self.bootstrap)
            .field("container", &self.container)
            .field("internal_bootstrap", &self.internal_bootstrap)
            .finish_non_exhaustive()
    }
}

impl KafkaBroker {
    /// Clients for `bootstrap`. No connection is made until the first request.
    ///
    /// # Errors
    ///
    /// Returns `Broker` if librdkafka rejects the client configuration.
    pub fn new(bootstrap: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let bootstrap = bootstrap.into();
        let timeout_ms = request_timeout.as_millis().max(1).to_string();

        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &bootstrap)
            .set("message.timeout.ms", &timeout_ms);

        let producer: FutureProducer = client_config
            .create()
            .map_err(|e| broker_error("create producer", e))?;
        let admin: AdminClient<DefaultClientContext> = client_config
            .create()
            .map_err(|e| broker_error("create admin client", e))?;

        let timing = TimingConfig::default();
        Ok(Self {
            producer,
            admin,
            bootstrap,
            request_timeout,
            topic_ready: PollPolicy::deadline(timing.topic_ready, timing.tick),
            docker: OsString::from("docker"),
            container: DEFAULT_KAFKA_CONTAINER.to_string(),
            internal_bootstrap: DEFAULT_KAFKA_INTERNAL_BOOTSTRAP.to_string(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    /// # Errors
    ///
    /// Returns `Broker` if the clients cannot be created.
    pub fn from_config(kafka: &KafkaConfig, timing: &TimingConfig) -> Result<Self> {
        Ok(Self::new(&kafka.broker_address, DEFAULT_REQUEST_TIMEOUT)?
            .with_bulk_container(&kafka.container, &kafka.internal_bootstrap)
            .with_topic_ready(PollPolicy::deadline(timing.topic_ready, timing.tick)))
    }

    /// Container running the perf tool and the bootstrap address it sees.
    pub fn with_bulk_container(
        mut self,
        container: impl Into<String>,
        internal_bootstrap: impl Into<String>,
    ) -> Self {
        self.container = container.into();
        self.internal_bootstrap = internal_bootstrap.into();
        self
    }

    /// Program used in place of `docker`.
    pub fn with_docker_program(mut self, program: impl Into<OsString>) -> Self {
        self.docker = program.into();
        self
    }

    pub fn with_topic_ready(mut self, policy: PollPolicy) -> Self {
        self.topic_ready = policy;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn bootstrap(&self) -> &str {
        &self.bootstrap
    }

    /// Topics currently known to the broker.
    pub async fn list_topics(&self) -> Result<Vec<String>> {
        let producer = self.producer.clone();
        let timeout = self.request_timeout;
        tokio::task::spawn_blocking(move || {
            producer
                .client()
                .fetch_metadata(None, timeout)
                .map(|metadata| {
                    metadata
                        .topics()
                        .iter()
                        .map(|t| t.name().to_string())
                        .collect::<Vec<_>>()
                })
        })
        .await
        .map_err(|e| broker_error("list topics", e))?
        .map_err(|e| broker_error("list topics", e))
    }

    pub async fn topic_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_topics().await?.iter().any(|t| t == name))
    }

    async fn run_perf_tool(&self, args: &[String]) -> Result<String> {
        let command_line = format!("{PERF_TOOL} {}", args.join(" "));

        let mut cmd = Command::new(&self.docker);
        cmd.args(["exec", "-i", self.container.as_str(), PERF_TOOL])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(container = %self.container, command = %command_line, "Running Kafka perf tool");
        let child = cmd.spawn().map_err(|e| {
            broker_error(&command_line, format!("cannot start {:?}: {e}", self.docker))
        })?;

        let output = tokio::time::timeout(self.command_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                broker_error(
                    &command_line,
                    format!("did not finish within {}s", self.command_timeout.as_secs()),
                )
            })?
            .map_err(|e| broker_error(&command_line, format!("cannot collect output: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(broker_error(
                &command_line,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Record headers in publish order.
fn owned_headers(headers: &[Header]) -> OwnedHeaders {
    headers
        .iter()
        .fold(OwnedHeaders::new_with_capacity(headers.len()), |acc, h| {
            acc.insert(KafkaHeader {
                key: &h.key,
                value: Some(h.value.as_str()),
            })
        })
}

impl MessageBroker for KafkaBroker {
    async fn create_topic(&self, name: &str, partitions: u32, replication_factor: u32) -> Result<()> {
        let operation = format!("create topic {name}");
        if self.topic_exists(name).await? {
            warn!(
                topic = name,
                "Kafka topic already exists, skipping creation; leftover records may affect results"
            );
            return Ok(());
        }

        let partitions = i32::try_from(partitions)
            .map_err(|_| broker_error(&operation, format!("{partitions} partitions is too many")))?;
        let replication = i32::try_from(replication_factor).map_err(|_| {
            broker_error(
                &operation,
                format!("replication factor {replication_factor} is too large"),
            )
        })?;
        let topic = NewTopic::new(name, partitions, TopicReplication::Fixed(replication));
        let options = AdminOptions::new().operation_timeout(Some(self.request_timeout));

        let results = self
            .admin
            .create_topics([&topic], &options)
            .await
            .map_err(|e| broker_error(&operation, e))?;
        for result in results {
            match result {
                Ok(_) => {}
                Err((_, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    warn!(topic = name, "Kafka topic was created concurrently, reusing it");
                }
                Err((_, code)) => return Err(broker_error(&operation, code)),
            }
        }

        poll(&self.topic_ready, move |_| async move {
            let listed = self.topic_exists(name).await?;
            Ok::<_, HarnessError>(if listed {
                Attempt::Ready(())
            } else {
                Attempt::Pending(format!("topic {name} not listed yet"))
            })
        })
        .await
        .map_err(|e| HarnessError::from_poll(e, format!("topic {name} to be listed")))?;

        info!(topic = name, partitions, replication, "Kafka topic created");
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &str, headers: &[Header]) -> Result<()> {
        let record = FutureRecord::<(), str>::to(topic)
            .payload(payload)
            .headers(owned_headers(headers));

        self.producer
            .send(record, Timeout::After(self.request_timeout))
            .await
            .map_err(|(e, _)| broker_error(format!("publish to {topic}"), e))?;

        info!(topic, headers = headers.len(), "Message published");
        Ok(())
    }

    async fn publish_bulk(&self, topic: &str, count: u64, record_size: u64) -> Result<BulkPublish> {
        let count = count.to_string();
        let record_size = record_size.to_string();
        let args: Vec<String> = [
            "--topic",
            topic,
            "--num-records",
            count.as_str(),
            "--record-size",
            record_size.as_str(),
            "--throughput",
            "-1",
            "--producer-props",
        ]
        .into_iter()
        .map(str::to_string)
        .chain(std::iter::once(format!(
            "bootstrap.servers={}",
            self.internal_bootstrap
        )))
        .collect();

        let first_sent_at = Utc::now();
        let summary = self.run_perf_tool(&args).await?;
        let last_sent_at = Utc::now();

        info!(
            topic,
            records = %count,
            summary = summary.lines().last().unwrap_or_default(),
            "Bulk publish finished"
        );
        Ok(BulkPublish {
            first_sent_at,
            last_sent_at,
        })
    }
}
