use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

lazy_static! {
    pub static ref ACTIVE_SUBSCRIBERS: IntGauge =
        IntGauge::new("chat_active_subscribers", "Number of joined clients")
            .expect("metric can not be created");

    pub static ref SERVER_CLOCK: IntGauge =
        IntGauge::new("chat_server_clock", "Current Lamport clock of the server")
            .expect("metric can not be created");

    pub static ref MESSAGES_BROADCAST: IntCounterVec = IntCounterVec::new(
        Opts::new("chat_messages_broadcast_total", "Messages fanned out, by kind"),
        &["kind"]
    )
    .expect("metric can not be created");

    pub static ref DELIVERY_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("chat_delivery_failures_total", "Per-subscriber sends that were skipped"),
        &["reason"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

static REGISTER: Once = Once::new();

fn register_custom_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(ACTIVE_SUBSCRIBERS.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(SERVER_CLOCK.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(MESSAGES_BROADCAST.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(DELIVERY_FAILURES.clone()))
            .expect("collector can be registered");
    });
}

/// Serves `/metrics` until the shutdown signal fires.
pub async fn start_metrics_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    register_custom_metrics();

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    info!("metrics server listening on 0.0.0.0:{}", port);
    let (_, server) = warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
        let _ = shutdown_signal.changed().await;
    });
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    Ok(gather_metrics())
}

/// Text exposition of every registered collector.
pub fn gather_metrics() -> String {
    use prometheus::Encoder;

    register_custom_metrics();
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
