use crate::server::config::AppConfig;
use crate::server::{load_config, Secrets};
use rumbo_tools::commerce::PricingPolicy;
use std::path::Path;

pub async fn run() -> anyhow::Result<()> {
    println!("🏥 Rumbo Doctor\n");

    print!("Loading configuration... ");
    let config = match load_config() {
        Ok(config) => {
            println!("✅");
            config
        }
        Err(e) => {
            println!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let mut all_ok = true;
    all_ok &= check_env_file();
    all_ok &= check_secrets(&config);
    all_ok &= check_pricing(&config);
    all_ok &= check_maps_command(&config);
    check_llm(&config);

    println!();
    if all_ok {
        println!("✅ All checks passed! Ready to run `rumbo serve`.");
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        std::process::exit(1);
    }

    Ok(())
}

fn check_env_file() -> bool {
    print!("Checking .env file... ");
    if Path::new(".env").exists() {
        println!("✅ Found");
    } else {
        println!("⚠️  Not found (reading secrets from the process environment)");
    }
    true
}

fn check_secrets(config: &AppConfig) -> bool {
    print!("Checking secrets... ");
    match Secrets::from_env(config) {
        Ok(_) => {
            println!("✅ Present");
            true
        }
        Err(e) => {
            println!("❌ {}", e);
            false
        }
    }
}

fn check_pricing(config: &AppConfig) -> bool {
    print!("Checking pricing... ");
    match PricingPolicy::new(&config.commerce.currency, config.commerce.discount_percent) {
        Ok(policy) => {
            println!(
                "✅ {}% package discount in {}",
                policy.discount_percent(),
                policy.currency().to_uppercase()
            );
            true
        }
        Err(e) => {
            println!("❌ {}", e);
            false
        }
    }
}

fn check_maps_command(config: &AppConfig) -> bool {
    print!("Checking maps server command... ");
    let command = &config.maps.command;
    if find_in_path(command) {
        println!("✅ {}", command);
        true
    } else {
        println!("❌ `{}` not found in PATH", command);
        false
    }
}

fn check_llm(config: &AppConfig) {
    print!("Checking LLM... ");
    if config.llm.enabled {
        println!("✅ Enabled ({})", config.llm.model);
    } else {
        println!("ℹ️  Disabled (template replies, keyword classification)");
    }
}

fn find_in_path(command: &str) -> bool {
    let path = Path::new(command);
    if path.components().count() > 1 {
        return path.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
        .unwrap_or(false)
}
