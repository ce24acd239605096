use anyhow::Context;

use resort_concierge::config::DialogConfig;
use resort_concierge::dialog::{ChatSessionAdapter, DialogEngine};
use resort_concierge::llm::{LlmConfig, create_provider};
use resort_concierge::terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the transcript
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let llm_config = LlmConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  export ANTHROPIC_API_KEY=sk-ant-...");
        eprintln!("  (or CONCIERGE_LLM_BACKEND=openai with OPENAI_API_KEY)");
        std::process::exit(1);
    });
    let dialog_config = DialogConfig::from_env().context("invalid dialog configuration")?;

    eprintln!("🤠 Resort Concierge v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!("   Type /quit to exit.\n");

    let llm = create_provider(&llm_config).context("failed to create chat backend")?;
    let adapter = ChatSessionAdapter::new(llm).with_max_tokens(dialog_config.max_reply_tokens);
    let engine = DialogEngine::new(adapter, dialog_config);

    terminal::run(engine).await.context("terminal session failed")?;

    eprintln!("\n👋 Até a próxima!");
    Ok(())
}
