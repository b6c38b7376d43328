//! Async listing example.
//!
//! ```bash
//! cargo run --example list_assistants
//! ```
//!
//! Env vars:
//! - `OPENAI_API_KEY` (required)
//! - `OPENAI_BASE_URL`, `OPENAI_ORG_ID`, `OPENAI_PROJECT_ID` (optional)
//! - `ASSISTANTS_LIMIT` (default: `20`)

use openai_kit::{ClientBuilder, ListAssistantsParams, ListOrder};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let limit = std::env::var("ASSISTANTS_LIMIT")
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(20);

    let client = ClientBuilder::from_env()?
        .timeout(Duration::from_secs(60))
        .with_retry(2, Duration::from_millis(500))
        .build()?;
    let assistants = client.assistants();

    let mut params = ListAssistantsParams::new().limit(limit).order(ListOrder::Desc);
    loop {
        let page = assistants.list(&params).await?;
        for assistant in &page.data {
            println!(
                "{}\t{}\t{}",
                assistant.id.as_str(),
                assistant.model,
                assistant.name.as_deref().unwrap_or("-")
            );
        }
        match params.after_page(&page) {
            Some(next) => params = next,
            None => break,
        }
    }

    Ok(())
}
