//! Basic usage: cached completion and embedding calls.
//!
//! Reads the API key from `OPENAI_KEY` (or a `.env` file). Run twice to see the
//! second run served entirely from `gpt_cache/` and `embedding_cache/`.
//!
//! Usage:
//!   RUST_LOG=cachegpt=debug cargo run --example basic_usage

use cachegpt::{InvocationParameters, MemoizedCompletion, MemoizedEmbedding, OutputFormat};

fn main() -> cachegpt::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== cachegpt demo ===\n");

    let gpt = MemoizedCompletion::builder().build()?;
    let reply = gpt.complete("Translate the following English text to French: 'Hello, world!'")?;
    println!("completion: {}", reply);

    let creative = gpt.complete_with(
        "Write a one-line poem about caching.",
        "You are a poet",
        &InvocationParameters::new().temperature(0.7),
    )?;
    println!("poem: {}\n", creative);

    let embeddings = MemoizedEmbedding::builder().build()?;
    let texts = ["apple", "banana", "Mexico"];
    let output = embeddings.embed_with(&texts, OutputFormat::ColumnsPerText, &InvocationParameters::new())?;
    if let Some(table) = output.as_table() {
        println!("table shape: {:?}", table.shape());
        for other in ["banana", "Mexico"] {
            if let Some(r) = table.correlation("apple", other) {
                println!("corr(apple, {}) = {:.3}", other, r);
            }
        }
    }

    if let Some(store) = gpt.cache() {
        let stats = store.stats();
        println!("\ncompletion cache: {} hits / {} misses", stats.hits, stats.misses);
    }
    Ok(())
}
