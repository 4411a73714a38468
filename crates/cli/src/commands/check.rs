//! `paibot check` — diagnose configuration and backend health.

use paibot_config::AppConfig;
use paibot_core::Provider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 paibot check — system diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration loaded");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue found. See above for details.");
            return Ok(());
        }
    };

    if config.discord.token.is_some() {
        println!("  ✅ Discord token configured");
    } else {
        println!("  ⚠️  No Discord token — set DISCORD_TOKEN or discord.token");
        issues += 1;
    }

    if config.has_backend_keys() {
        println!("  ✅ Backend API keys configured");

        let backends = paibot_providers::build_from_config(&config)?;
        for provider in [&backends.primary, &backends.secondary] {
            match provider.health_check().await {
                Ok(true) => println!("  ✅ {} reachable", provider.name()),
                Ok(false) => {
                    println!("  ❌ {} rejected the health check", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ {} unreachable: {e}", provider.name());
                    issues += 1;
                }
            }
        }
    } else {
        println!("  ⚠️  Missing backend keys — set GEMINI_API_KEY and GROQ_API_KEY");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
