//! `sourcechat doctor` — Diagnose configuration.

use std::path::Path;

use sourcechat_config::AppConfig;
use sourcechat_core::Provider;
use sourcechat_providers::OpenAiCompatProvider;

use super::config_path;

pub async fn run(config_file: Option<&Path>, ping: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 SourceChat Doctor — Configuration Check");
    println!("=========================================\n");

    let mut issues = 0;

    let path = config_path(config_file);
    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file at {} — using defaults (run `sourcechat onboard`)", path.display());
    }

    let config = match AppConfig::load(config_file) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Err(format!("Invalid configuration at {}", path.display()).into());
        }
    };

    println!("  ℹ️  Provider:   {} ({})", config.provider.name, config.provider.base_url);
    println!("  ℹ️  Model:      {}", config.provider.model);
    println!("  ℹ️  Max chars:  {}", config.context.max_chars);
    println!("  ℹ️  Cache key:  {:?}", config.context.cache_key);

    match &config.api_key {
        Some(key) => {
            println!("  ✅ API key configured");
            if ping {
                let provider =
                    OpenAiCompatProvider::from_config(&config.provider, &config.http, key.clone())?;
                match provider.health_check().await {
                    Ok(true) => println!("  ✅ Provider reachable"),
                    Ok(false) => {
                        println!("  ❌ Provider rejected the request (check the API key)");
                        issues += 1;
                    }
                    Err(e) => {
                        println!("  ❌ {e}");
                        issues += 1;
                    }
                }
            }
        }
        None => {
            println!("  ⚠️  No API key — set DEEPSEEK_API_KEY or add api_key to the config file");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
