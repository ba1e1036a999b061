//! Line-mode chat.
//!
//! A REPL over stdin/stdout using the same client and session semantics as
//! the TUI. Responses stream token-by-token to stdout. Exits on `:q` or EOF.

use std::io::{BufRead, Write};

use anyhow::Result;
use banter_core::client::ChatClient;
use banter_core::config::Config;
use banter_core::session::{ChatSession, ModelId};
use banter_core::stream::StreamEvent;
use futures_util::StreamExt;

const QUIT_COMMAND: &str = ":q";
const PROMPT_PREFIX: &str = "you> ";
const ASSISTANT_PREFIX: &str = "assistant> ";

/// Runs the chat loop with stdin/stdout.
pub async fn run(config: &Config) -> Result<()> {
    let base_url = config.effective_base_url()?;
    let client = ChatClient::new(base_url);
    let model = ModelId::from_tag(&config.model).unwrap_or_default();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "banter chat (type {} to quit)", QUIT_COMMAND)?;
    write!(stdout, "{}", PROMPT_PREFIX)?;
    stdout.flush()?;

    run_chat(stdin.lock(), &mut stdout, &client, model).await
}

/// Runs the chat loop with a provided client and I/O (for testing).
pub async fn run_chat<R, W>(
    input: R,
    output: &mut W,
    client: &ChatClient,
    model: ModelId,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut session = ChatSession::new(model);

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed == QUIT_COMMAND {
            writeln!(output, "Goodbye!")?;
            break;
        }

        // Skip empty lines
        if trimmed.is_empty() {
            write!(output, "{}", PROMPT_PREFIX)?;
            output.flush()?;
            continue;
        }

        // The REPL is strictly sequential, so submit can only fail on empty
        // input, which was just filtered out.
        let Ok(text) = session.submit(trimmed) else {
            continue;
        };

        match stream_response(output, client, &session, &text).await {
            Ok(fragments) => {
                for fragment in &fragments {
                    session.apply_delta(fragment);
                }
                session.complete();
            }
            Err(e) => {
                session.fail();
                writeln!(output)?;
                writeln!(output, "Error: {:#}", e)?;
            }
        }

        write!(output, "{}", PROMPT_PREFIX)?;
        output.flush()?;
    }

    Ok(())
}

/// Streams a single response, printing fragments as they arrive.
///
/// Returns the fragments on success so the caller can commit them.
async fn stream_response<W: Write>(
    output: &mut W,
    client: &ChatClient,
    session: &ChatSession,
    text: &str,
) -> Result<Vec<String>> {
    let mut stream = client.send_message_stream(text, session.model()).await?;

    let mut fragments: Vec<String> = Vec::new();
    let mut printed_prefix = false;

    while let Some(event_result) = stream.next().await {
        match event_result? {
            StreamEvent::Content { text } => {
                if !printed_prefix {
                    write!(output, "{}", ASSISTANT_PREFIX)?;
                    printed_prefix = true;
                }
                write!(output, "{}", text)?;
                output.flush()?;
                fragments.push(text);
            }
            StreamEvent::Error { message } => {
                anyhow::bail!("backend error: {}", message);
            }
        }
    }

    if printed_prefix {
        writeln!(output)?;
    }

    Ok(fragments)
}
