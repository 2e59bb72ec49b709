use std::path::PathBuf;

use clap::Parser;

// CLI argument structure, every option can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "aquamind-backend")]
#[command(about = "Aquarium management backend with a rate limited LLM proxy")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    // Credential for the downstream LLM provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    // Cap on generated tokens per completion
    #[arg(long, default_value_t = 150)]
    pub max_tokens: u32,

    // Minimum spacing between two admitted LLM queries from one client
    #[arg(long, default_value_t = 5)]
    pub cooldown_secs: u64,

    // Max LLM queries per client in a trailing hour
    #[arg(long, default_value_t = 25)]
    pub hourly_limit: usize,

    // Timeout for the downstream LLM call
    #[arg(long, default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    // Google OAuth client id, /oauth is disabled without it
    #[arg(long, env = "CLIENT_ID")]
    pub google_client_id: Option<String>,

    // JSON file with the species/plant/equipment catalog
    #[arg(long, env = "CATALOG_PATH")]
    pub catalog: Option<PathBuf>,

    #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,
}
