//! Observability module for logging and metrics setup.
//!
//! This module provides:
//! - Structured logging (pretty in development, JSON elsewhere)
//! - Optional Prometheus export of the `metrics` facade
//! - Recording helpers for aggregation and database metrics

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("shopping_list={}", config.log_level.to_lowercase()).parse()?)
        .add_directive("sqlx=warn".parse()?);

    if config.is_development()
        || std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()) == "pretty"
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Install the Prometheus exporter when metrics export is enabled
pub fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics_export {
        tracing::debug!("Metrics export disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Initialize logging and metrics from one configuration
pub fn init_observability_with_config(config: &ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    init_tracing_with_config(config)?;
    init_metrics_with_config(config)?;
    Ok(())
}

/// Record the shape of one aggregation request
pub fn record_aggregation_metrics(
    selection_size: usize,
    merged_entries: usize,
    excluded_recipes: usize,
    skipped_lines: usize,
    duration: Duration,
) {
    metrics::counter!("aggregations_total").increment(1);
    metrics::histogram!("aggregation_selection_size").record(selection_size as f64);
    metrics::histogram!("aggregation_merged_entries").record(merged_entries as f64);
    metrics::histogram!("aggregation_duration_seconds").record(duration.as_secs_f64());
    metrics::counter!("aggregation_excluded_recipes_total").increment(excluded_recipes as u64);
    metrics::counter!("ingredient_lines_skipped_total").increment(skipped_lines as u64);
}

/// Record database operation metrics
pub fn record_db_metrics(operation: &str, success: bool, duration: Duration) {
    let operation = operation.to_string();
    metrics::counter!(
        "db_operations_total",
        "operation" => operation,
        "result" => if success { "success" } else { "failure" }
    )
    .increment(1);
    metrics::histogram!("db_operation_duration_seconds").record(duration.as_secs_f64());
}
