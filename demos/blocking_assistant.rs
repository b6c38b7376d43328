//! Blocking example: fetch one assistant, or the newest one when no id is given.
//!
//! ```bash
//! cargo run --example blocking_assistant --no-default-features --features blocking,rustls
//! ```
//!
//! Env vars:
//! - `OPENAI_API_KEY` (required)
//! - `OPENAI_BASE_URL`, `OPENAI_ORG_ID`, `OPENAI_PROJECT_ID` (optional)
//! - `ASSISTANT_ID` (optional)

use openai_kit::{BlockingClient, ListAssistantsParams};

fn main() -> anyhow::Result<()> {
    let client = BlockingClient::from_env()?;
    let assistants = client.assistants();

    let id = match std::env::var("ASSISTANT_ID").ok().filter(|v| !v.trim().is_empty()) {
        Some(id) => id,
        None => {
            let page = assistants.list(&ListAssistantsParams::new().limit(1))?;
            let Some(newest) = page.data.into_iter().next() else {
                eprintln!("no assistants in this project");
                return Ok(());
            };
            newest.id.as_str().to_owned()
        }
    };

    let assistant = assistants.retrieve(id.as_str())?;
    println!("{assistant:#?}");
    Ok(())
}
