//! Schema-guided extraction example.
//!
//! This demonstrates:
//! 1. Declaring a dynamic field schema
//! 2. Extracting structured data through a session
//! 3. Graceful fallback when the model answers in prose
//! 4. Fixed-schema dispatch with a natively-typed result
//!
//! A `ScriptedBackend` stands in for the on-device model so the example
//! runs anywhere; swap in a `HostBackend` on device.

use fmbridge::prelude::*;
use fmbridge::types::KeywordList;
use std::collections::HashMap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let backend = ScriptedBackend::new()
        .push_text("```json\n{\"genre\": \"jazz\", \"rating\": 9, \"standouts\": [\"Blue in Green\"]}\n```")
        .push_text("Honestly, it's a solid 9 out of 10.")
        .push_typed(TypedContent::KeywordList(KeywordList {
            keywords: vec!["modal jazz".to_string(), "trumpet".to_string()],
        }));

    let session = ModelSession::builder(backend)
        .layer(LoggingLayer::new())
        .instructions("You are a music critic. Answer precisely.")
        .finish();

    // 1. Dynamic schema: declare the fields we want back.
    let mut schema = HashMap::new();
    schema.insert(
        "rating".to_string(),
        FieldSchema::new(FieldKind::Number)
            .with_description("Score out of 10")
            .required(),
    );
    schema.insert(
        "genre".to_string(),
        FieldSchema::new(FieldKind::String)
            .with_options(vec!["jazz".to_string(), "rock".to_string(), "pop".to_string()]),
    );
    schema.insert(
        "standouts".to_string(),
        FieldSchema::new(FieldKind::Array).with_description("Standout tracks"),
    );

    let extraction = session
        .extract("Review 'Kind of Blue'.", &schema, GenerateOptions::new())
        .await?;
    println!("clean extraction: {:?}", extraction.data);

    // 2. The model ignored the format this time; we still get usable text.
    let degraded = session
        .extract("Review it again.", &schema, GenerateOptions::new())
        .await?;
    println!(
        "degraded extraction (warning: {:?}): {:?}",
        degraded.warning, degraded.data
    );

    // 3. Fixed schema: natively-typed output, no text parsing involved.
    let keywords = session
        .generate_typed(
            "List keywords for 'Kind of Blue'.",
            TypedKind::KeywordList,
            GenerateOptions::new().with_temperature(0.2),
        )
        .await?;
    println!("typed result: {:?}", keywords);

    // 4. The host-facing reply shape.
    let reply = GenerationReply::from_typed(Ok(keywords));
    println!("reply: {}", serde_json::to_string_pretty(&reply)?);

    Ok(())
}
