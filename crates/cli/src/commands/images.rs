//! Input loop shared by `draw` and `edit`.

use chatdeck_session::ImageGenSession;

use super::setup::CmdResult;
use crate::output::ImageWriter;
use crate::repl;

pub async fn run_loop(session: &mut ImageGenSession, mut writer: ImageWriter) -> CmdResult {
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
            Ok(image) => match writer.save(&image).await {
                Ok(path) => {
                    println!();
                    println!("  Image > {}", path.display());
                    println!();
                }
                Err(e) => repl::error(&e),
            },
            Err(e) => repl::error(&e),
        }

        repl::user_prompt()?;
    }

    repl::goodbye();
    Ok(())
}
