use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "icp_forge",
    version,
    about = "Ideal Customer Profile and outreach generator backed by a structured-output LLM"
)]
pub struct Args {
    /// TOML config file
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    /// Environment variable that holds the API key
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Run once on this catalog file instead of the interactive form
    #[arg(long)]
    pub catalog_file: Option<String>,

    #[arg(long, default_value = "USA")]
    pub country: String,

    /// Defaults to the country's first hub
    #[arg(long)]
    pub city: Option<String>,

    /// One of the listed industries, or "Other" with --custom-industry
    #[arg(long)]
    pub industry: Option<String>,

    #[arg(long)]
    pub custom_industry: Option<String>,

    /// Print the report as JSON (one-shot mode)
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Speech-to-text command whose stdout lines are appended to the catalog
    #[arg(long)]
    pub dictation_command: Option<String>,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
