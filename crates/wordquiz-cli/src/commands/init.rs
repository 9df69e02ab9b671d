//! The `wordquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("wordquiz.toml").exists() {
        println!("wordquiz.toml already exists, skipping.");
    } else {
        std::fs::write("wordquiz.toml", SAMPLE_CONFIG)?;
        println!("Created wordquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point api_url at your backend");
    println!("  2. Run: wordquiz login <username>");
    println!("  3. Run: wordquiz quiz");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# wordquiz configuration

# Backend base URL; /api/* paths are appended.
api_url = "http://127.0.0.1:5000"

# Where the session token is stored.
# token_file = "~/.config/wordquiz/session.json"

request_timeout_secs = 30

# Pause on the feedback screen before the next question.
advance_delay_ms = 1500
"#;
