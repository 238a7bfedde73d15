use anyhow::Context;
use clap::{Parser, ValueEnum};
use instamon_core::{
    AnalysisKind, AppConfig, ConsoleSink, CountPolicy, RunConfig, RunRequest, SelectionMode,
};
use instamon_graph::GraphClient;
use instamon_monitor::{Orchestrator, RunSettings};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "instamon")]
#[command(about = "Instagram comment keyword monitoring and monthly indicators")]
struct Cli {
    /// Graph API access token
    #[arg(long, env = "INSTAMON_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Instagram business account id
    #[arg(long, env = "INSTAMON_ACCOUNT_ID")]
    account: Option<String>,

    /// Analyze the N most recent posts (1-500)
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Analyze every post from these months instead, e.g. `03/2024,04/2024`
    #[arg(long, value_delimiter = ',', conflicts_with = "count")]
    months: Vec<String>,

    /// Comma-separated keywords to count in comments
    #[arg(long, default_value = "")]
    keywords: String,

    #[arg(long, value_enum, default_value_t = Analysis::Keywords)]
    analysis: Analysis,

    #[arg(long, value_enum, default_value_t = Policy::Occurrences)]
    count_policy: Policy,

    /// Also read replies to every comment
    #[arg(long)]
    replies: bool,

    /// Do not add comment likes to keyword totals
    #[arg(long)]
    no_like_sums: bool,

    /// Fetch impressions and reach per post (monthly analysis)
    #[arg(long)]
    insights: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Analysis {
    /// Keyword mentions across comments
    Keywords,
    /// Likes, comments, impressions and reach per month
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Every mention counts
    Occurrences,
    /// A comment counts at most once per keyword
    PerComment,
}

impl Cli {
    fn into_request(self, fallback_token: Option<String>) -> RunRequest {
        let selection_mode = if self.months.is_empty() {
            SelectionMode::ByCount
        } else {
            SelectionMode::ByMonthList
        };
        RunRequest {
            access_token: self.token.or(fallback_token).unwrap_or_default(),
            account_id: self.account.unwrap_or_default(),
            selection_mode,
            post_count: self.count,
            months: self.months,
            keywords: self.keywords,
            analysis: match self.analysis {
                Analysis::Keywords => AnalysisKind::KeywordMonitoring,
                Analysis::Monthly => AnalysisKind::MonthlyIndicators,
            },
            include_replies: self.replies,
            count_policy: match self.count_policy {
                Policy::Occurrences => CountPolicy::Occurrences,
                Policy::PerComment => CountPolicy::PerComment,
            },
            accumulate_likes: !self.no_like_sums,
            fetch_insights: self.insights,
        }
    }
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(app: &AppConfig, config: &RunConfig) -> anyhow::Result<()> {
    let client = GraphClient::with_base_url(
        &config.access_token,
        app.request_timeout_secs,
        &app.user_agent,
        &app.graph_base_url,
        &app.graph_api_version,
    )
    .context("failed to build Graph API client")?;

    let mut sink = ConsoleSink::stdout();
    let output = Orchestrator::new(&client, config, RunSettings::from(app))
        .run(&mut sink)
        .await?;

    println!("\nReport written to {}", output.path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let app = instamon_core::load_app_config().context("failed to load configuration")?;
    init_tracing(&app)?;

    let cli = Cli::parse();
    let config = cli
        .into_request(app.access_token.clone())
        .validate()
        .context("invalid run parameters")?;
    tracing::debug!(?config, "starting run");

    run(&app, &config).await
}

#[cfg(test)]
mod tests;
