//! `chatdeck explain` — Ask questions about an image.
//!
//! `/image PATH` switches the attached image for the following questions.

use std::path::{Path, PathBuf};

use chatdeck_config::Page;
use chatdeck_session::VisionSession;

use super::setup::{self, CmdResult};
use crate::repl;

/// Parse `/image PATH`.
fn image_command(line: &str) -> Option<&Path> {
    let rest = line.strip_prefix("/image")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let path = rest.trim();
    (!path.is_empty()).then(|| Path::new(path))
}

pub async fn run(image: PathBuf, prompt: Option<PathBuf>) -> CmdResult {
    let config = setup::load_config()?;
    let page = config.page(Page::Explain);
    let mut image_bytes = setup::read_image(&image).await?;
    let mut image_name = image.display().to_string();
    let api_key = setup::api_key(&config).await?;

    let provider = chatdeck_providers::build_chat_provider(&config, &api_key);
    let prompt = setup::prompt_source(&page, prompt)?;
    let mut session = VisionSession::new(provider, prompt.clone(), setup::chat_settings(&config));
    if let Some(sink) = setup::log_sink(&config, &page) {
        session = session.with_sink(sink, &page.log_stream);
    }
    session.start().await?;

    repl::banner(
        "Explain",
        &[
            ("Model:", config.chat_model.clone()),
            ("Prompt:", prompt.id().to_string()),
            ("Image:", image_name.clone()),
        ],
    );
    println!("  Use '/image PATH' to switch images.");
    println!();
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

        if let Some(path) = image_command(&line) {
            match setup::read_image(path).await {
                Ok(bytes) => {
                    image_bytes = bytes;
                    image_name = path.display().to_string();
                    println!("  Image > {image_name}");
                    println!();
                }
                Err(e) => repl::error(&e),
            }
            repl::user_prompt()?;
            continue;
        }

        repl::thinking();
        let result = session.submit(&line, &image_bytes).await;
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
