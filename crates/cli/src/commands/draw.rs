//! `chatdeck draw` — Generate images from text instructions.

use std::path::PathBuf;

use chatdeck_config::Page;
use chatdeck_session::ImageGenSession;

use super::images;
use super::setup::{self, CmdResult};
use crate::output::ImageWriter;
use crate::repl;

pub async fn run(out: Option<PathBuf>) -> CmdResult {
    let config = setup::load_config()?;
    let page = config.page(Page::Draw);
    let api_key = setup::api_key(&config).await?;

    let provider = chatdeck_providers::build_image_provider(&config, &api_key);
    let mut session = ImageGenSession::draw(provider, &config.image_model);
    if let Some(sink) = setup::log_sink(&config, &page) {
        session = session.with_sink(sink, &page.log_stream);
    }
    session.start().await?;

    let out_dir = out.unwrap_or_else(|| page.output_dir.clone());
    let writer = ImageWriter::new(out_dir, session.session_id());
    repl::banner(
        "Draw",
        &[
            ("Model:", config.image_model.clone()),
            ("Output:", writer.dir().display().to_string()),
        ],
    );
    if let Some(greeting) = &page.greeting {
        repl::assistant(greeting);
    }

    images::run_loop(&mut session, writer).await
}
