//! Kafka broker settings.

/// Kafka addresses as seen from the connector, the harness and the perf tool container.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Bootstrap address rendered into connector configs and used by the
    /// harness producer and admin client.
    pub broker_address: String,
    /// Container that ships `kafka-producer-perf-test`.
    pub container: String,
    /// Bootstrap address the perf tool uses from inside the container.
    pub internal_bootstrap: String,
}
