//! `chatdeck onboard` — First-time setup.

use std::path::{Path, PathBuf};

use chatdeck_config::AppConfig;

use super::setup::CmdResult;

const SAMPLE_CHAT_PROMPT: &str = concat!(
    "# Assistant\n\n",
    "You are a friendly, concise assistant.\n\n",
    "- Answer in the language the user writes in\n",
    "- Keep answers short unless asked for detail\n",
    "- When an image is attached, describe what you see before answering\n",
);

const SAMPLE_EDIT_PROMPT: &str = concat!(
    "# Image Editor\n\n",
    "You edit the attached image according to the user's instruction.\n\n",
    "- Keep the composition and subject of the original\n",
    "- Change only what the instruction asks for\n",
    "- Always answer with an edited image\n",
);

/// Write `content` to `path` unless it already exists. Returns whether the
/// file was created.
fn write_if_missing(path: &Path, content: &str) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(true)
}

/// Lay out `dir` with a default config, sample prompts and output
/// directories. Existing files are left alone. Returns the files created.
pub fn init_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    for sub in ["prompts", "images", "logs", "secrets"] {
        std::fs::create_dir_all(dir.join(sub))?;
    }

    let files = [
        (dir.join("config.toml"), AppConfig::default_toml()),
        (dir.join("prompts/01_sample.md"), SAMPLE_CHAT_PROMPT.to_string()),
        (dir.join("prompts/04_change.md"), SAMPLE_EDIT_PROMPT.to_string()),
    ];
    for (path, content) in files {
        if write_if_missing(&path, &content)? {
            created.push(path);
        }
    }

    Ok(created)
}

pub async fn run() -> CmdResult {
    let config_dir = AppConfig::config_dir();

    println!("ChatDeck — First-Time Setup");
    println!("===========================\n");

    let created = init_dir(&config_dir)?;
    println!("  Config directory: {}", config_dir.display());
    if created.is_empty() {
        println!("  Nothing to do, all files already exist.");
    }
    for path in &created {
        println!("  ✅ Created {}", path.display());
    }

    println!("\n  Next steps:");
    println!("   1. export OPENAI_API_KEY=sk-... (or set api_key in config.toml)");
    println!("   2. Run: chatdeck chat");
    println!();

    Ok(())
}
