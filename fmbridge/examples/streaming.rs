//! Streaming generation example.
//!
//! Partial chunks arrive in generation order and strictly precede the
//! single terminal `Complete` notification. A `ScriptedBackend` stands in
//! for the on-device model; the readiness layer shows how a caller waits
//! out a model that is still downloading.

use fmbridge::prelude::*;
use futures::StreamExt;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let backend = ScriptedBackend::new().push_chunks(vec![
        "The on-device model ",
        "streams text ",
        "chunk by chunk.",
    ]);

    let session = ModelSession::builder(backend)
        .layer(LoggingLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(20)))
        .layer(ReadinessLayer::new().with_max_probes(4))
        .finish();

    let mut events = session
        .stream_text("Explain streaming.", GenerateOptions::new())
        .await?;

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Partial { delta } => println!("partial: {delta:?}"),
            StreamEvent::Complete { text } => println!("complete: {text:?}"),
        }
    }

    Ok(())
}
