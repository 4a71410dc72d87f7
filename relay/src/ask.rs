use std::io::Write;

use anyhow::Context;
use futures_util::StreamExt;
use relay_agent::{AgentConfig, AgentState, Message, StreamAccumulator};
use relay_config::Config;

use crate::args::AskArgs;

/// Stream one completion to stdout, then summarize reasoning, tool calls
/// and usage
pub async fn run(config: &Config, args: AskArgs) -> anyhow::Result<()> {
    let state = AgentState::from_config(&config.providers)?;
    let agent = state.agent(AgentConfig::new(args.provider, args.model, args.system_prompt))?;
    let history = [Message::user(args.prompt)];

    let mut stdout = std::io::stdout();
    writeln!(stdout, "--- Streaming from {} ---", agent.config().address())?;

    let mut chunks = agent.run_streaming(&history).await?;
    let mut accumulator = StreamAccumulator::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.context("stream failed")?;

        for choice in chunk.choices.iter().filter(|choice| choice.index == 0) {
            if let Some(content) = &choice.delta.content {
                write!(stdout, "{content}")?;
                stdout.flush()?;
            }
        }

        accumulator.push(&chunk);
    }

    writeln!(stdout)?;

    if !accumulator.reasoning().is_empty() {
        writeln!(stdout, "--- Reasoning ---")?;
        writeln!(stdout, "{}", accumulator.reasoning())?;
    }

    let usage = accumulator.usage();
    let finish_reason = accumulator.finish_reason().unwrap_or("none").to_owned();
    let message = accumulator.into_message();

    if let Some(tool_calls) = &message.tool_calls {
        writeln!(stdout, "--- Tool calls ---")?;
        for call in tool_calls {
            writeln!(stdout, "{} {}({})", call.id, call.function.name, call.function.arguments)?;
        }
    }

    if let Some(usage) = usage {
        writeln!(
            stdout,
            "--- {} prompt + {} completion tokens ---",
            usage.prompt_tokens, usage.completion_tokens
        )?;
    }

    writeln!(stdout, "--- Finish reason: {finish_reason} ---")?;
    writeln!(stdout, "--- Stream finished ---")?;
    Ok(())
}
