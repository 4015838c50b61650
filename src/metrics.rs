//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Application Metrics
    pub static ref POSTS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "mikromatter_posts_created_total",
        "Total number of posts created"
    ).expect("metric can be created");
    pub static ref COMMENTS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "mikromatter_comments_created_total",
        "Total number of comments created"
    ).expect("metric can be created");
    pub static ref HASHTAGS_INDEXED_TOTAL: IntCounter = IntCounter::new(
        "mikromatter_hashtags_indexed_total",
        "Total number of hashtag links indexed"
    ).expect("metric can be created");

    // Realtime Metrics
    pub static ref WS_CONNECTIONS_ACTIVE: IntGauge = IntGauge::new(
        "mikromatter_ws_connections_active",
        "Current number of open WebSocket connections"
    ).expect("metric can be created");
    pub static ref BROADCASTS_TOTAL: IntCounter = IntCounter::new(
        "mikromatter_broadcasts_total",
        "Total number of messages published to the realtime channel"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("mikromatter_errors_total", "Total number of errors"),
        &["error_type", "endpoint"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(POSTS_CREATED_TOTAL.clone()))
        .expect("POSTS_CREATED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(COMMENTS_CREATED_TOTAL.clone()))
        .expect("COMMENTS_CREATED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(HASHTAGS_INDEXED_TOTAL.clone()))
        .expect("HASHTAGS_INDEXED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .expect("WS_CONNECTIONS_ACTIVE can be registered");
    REGISTRY
        .register(Box::new(BROADCASTS_TOTAL.clone()))
        .expect("BROADCASTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
