//! `chatdeck chat` — Interactive text chat.

use std::path::PathBuf;

use chatdeck_config::Page;
use chatdeck_session::ChatSession;

use super::setup::{self, CmdResult};
use crate::repl;

pub async fn run(prompt: Option<PathBuf>) -> CmdResult {
    let config = setup::load_config()?;
    let page = config.page(Page::Chat);
    let api_key = setup::api_key(&config).await?;

    let provider = chatdeck_providers::build_chat_provider(&config, &api_key);
    let prompt = setup::prompt_source(&page, prompt)?;
    let mut session = ChatSession::new(provider, prompt.clone(), setup::chat_settings(&config));
    if let Some(sink) = setup::log_sink(&config, &page) {
        session = session.with_sink(sink, &page.log_stream);
    }
    session.start().await?;

    repl::banner(
        "Chat",
        &[
            ("Model:", config.chat_model.clone()),
            ("Prompt:", prompt.id().to_string()),
            ("Session:", session.session_id().to_string()),
        ],
    );
    if let Some(greeting) = &page.greeting {
        repl::assistant(greeting);
    }

    let mut rx = repl::stdin_lines();
    repl::user_prompt()?;

    while let Some(line) = rx.recv().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("  [Input Error] {e}");
                break;
            }
        };

        repl::thinking();
        let result = session.submit(&line).await;
        repl::clear_thinking();
        match result {
            Ok(answer) => repl::assistant(&answer),
            Err(e) => repl::error(&e),
        }

        repl::user_prompt()?;
    }

    repl::goodbye();
    Ok(())
}
