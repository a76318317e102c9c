use std::io::Write;

use eyre::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::{AgentError, RagAgent};

/// Interactive chat loop for local development. One conversation per session,
/// driven through the same pipeline the request boundary uses.
pub async fn run(agent: RagAgent) -> Result<()> {
    let conversation_id = format!("conv-{}", uuid::Uuid::new_v4());
    log::info!("Starting interactive session {}", conversation_id);

    println!("ragline interactive agent (type 'exit' or 'quit' to leave)");
    if !agent.has_backend() {
        println!("note: no backend configured, replies use the fallback response");
    }
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush().wrap_err("flushing prompt")?;

        let line = match lines.next_line().await.wrap_err("reading input")? {
            Some(line) => line,
            None => break,
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        match agent.chat(input, &conversation_id).await {
            Ok(reply) => println!("Agent: {}\n", reply.message),
            Err(AgentError::Validation(err)) => println!("Input rejected: {}\n", err),
            Err(err) => {
                log::error!("Error processing message: {:?}", err);
                println!("Something went wrong, please try again.\n");
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
