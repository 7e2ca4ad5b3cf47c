//! Prometheus metrics for blog-service.
//!
//! Exposes comment-tree and cascade collectors plus an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Size of each materialized comment tree.
    pub static ref COMMENT_TREE_NODES: Histogram = register_histogram!(
        "blog_comment_tree_nodes",
        "Number of comments in each materialized comment tree",
        vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0]
    )
    .expect("failed to register blog_comment_tree_nodes");

    /// Comments removed as part of post deletion.
    pub static ref CASCADE_DELETED_COMMENTS: IntCounter = register_int_counter!(
        "blog_cascade_deleted_comments_total",
        "Comments deleted by post deletion cascades"
    )
    .expect("failed to register blog_cascade_deleted_comments_total");

    /// Failed requests by error kind.
    pub static ref REQUEST_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_request_errors_total",
        "Failed requests segmented by error kind",
        &["kind"]
    )
    .expect("failed to register blog_request_errors_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
