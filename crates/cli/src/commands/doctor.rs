//! `chatdeck doctor` — Diagnose configuration health.

use chatdeck_config::{AppConfig, Page};
use chatdeck_core::provider::ChatProvider;
use chatdeck_core::sink::LogSink;
use chatdeck_security::resolve_api_key;

use super::setup::{self, CmdResult};

pub async fn run() -> CmdResult {
    println!("ChatDeck Doctor — Configuration Diagnostics");
    println!("===========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `chatdeck onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found.");
            return Ok(());
        }
    };

    // API key
    let api_key = match &config.api_key {
        Some(key) => {
            println!("  ✅ API key configured");
            Some(key.clone())
        }
        None => match setup::secret_source(&config) {
            Some(source) => {
                match resolve_api_key(source.as_ref(), &config.secrets.name, &config.secrets.field)
                    .await
                {
                    Ok(key) => {
                        println!(
                            "  ✅ API key resolved from {} secret '{}'",
                            source.name(),
                            config.secrets.name
                        );
                        Some(key)
                    }
                    Err(e) => {
                        println!("  ❌ No API key: {e}");
                        issues += 1;
                        None
                    }
                }
            }
            None => {
                println!("  ❌ No API key and secret source disabled");
                issues += 1;
                None
            }
        },
    };

    // Gateway
    if let Some(key) = &api_key {
        let provider = chatdeck_providers::build_chat_provider(&config, key);
        if !check_gateway(provider.as_ref(), &config.api_url).await {
            issues += 1;
        }
    }

    // Prompts
    for page in [Page::Chat, Page::Explain, Page::Draw, Page::Edit] {
        let resolved = config.page(page);
        match &resolved.prompt {
            Some(path) if path.is_file() => {
                println!("  ✅ {} prompt: {}", page.name(), path.display());
            }
            Some(path) => {
                println!("  ⚠️  {} prompt missing: {}", page.name(), path.display());
                issues += 1;
            }
            None => println!("  ✅ {} page needs no prompt", page.name()),
        }
    }

    // Turn logging
    let chat = config.page(Page::Chat);
    match setup::log_sink(&config, &chat) {
        Some(sink) => match sink.setup(&chat.log_stream).await {
            Ok(()) => println!("  ✅ Log sink '{}' ready", sink.name()),
            Err(e) => {
                println!("  ❌ Log sink '{}' failed: {e}", sink.name());
                issues += 1;
            }
        },
        None => println!("  ✅ Turn logging disabled"),
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Probe the chat endpoint with the resolved key. Returns whether it answered.
async fn check_gateway(provider: &dyn ChatProvider, url: &str) -> bool {
    match provider.health_check().await {
        Ok(true) => {
            println!("  ✅ Gateway '{}' reachable at {url}", provider.name());
            true
        }
        Ok(false) => {
            println!("  ❌ Gateway '{}' rejected the request at {url}", provider.name());
            false
        }
        Err(e) => {
            println!("  ❌ Gateway '{}' unreachable: {e}", provider.name());
            false
        }
    }
}
