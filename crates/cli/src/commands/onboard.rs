//! `sourcechat onboard` — First-time setup.

use std::path::Path;

use sourcechat_config::AppConfig;

use super::config_path;

pub async fn run(config_file: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path(config_file);

    println!("📄 SourceChat — First-Time Setup");
    println!("================================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        } else {
            println!("  Config directory exists: {}", dir.display());
        }
    }

    if config_path.exists() && !force {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually, or re-run with --force to overwrite.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Wrote config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set DEEPSEEK_API_KEY (or add api_key to the config file)");
    println!("   2. Run: sourcechat chat --url https://example.com");
    println!("   3. Start asking questions!\n");

    Ok(())
}
