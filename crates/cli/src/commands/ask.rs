//! `sourcechat ask` — Answer a single question and exit.

use std::path::{Path, PathBuf};

use super::{
    build_session, config_path, load_config, print_missing_key, source_from_args, submission_for,
};

pub async fn run(
    config_file: Option<&Path>,
    question: String,
    url: Option<String>,
    pdf: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_file)?;

    let Some(api_key) = config.api_key.clone() else {
        print_missing_key(&config_path(config_file));
        return Err("No API key found. See above for setup instructions.".into());
    };

    let source = source_from_args(url, pdf.as_deref())?;
    let submission = submission_for(question, source.as_ref());

    let mut session = build_session(&config, &api_key)?;

    eprint!("  Thinking...");
    let result = session.submit(submission).await;
    eprint!("\r              \r");

    let reply = result?;
    println!("{}", reply.answer);

    Ok(())
}
