use std::time::Duration;

use tracing::warn;

/// How much history the FX intraday endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSize {
    /// Latest 100 bars.
    Compact,
    /// Full intraday history. Needed for the 210-bar minimum of the pro strategy.
    #[default]
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

/// Settings for the read-only status dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub token: String,
    pub port: u16,
}

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    /// Chats allowed to change subscriptions. Empty means open access.
    pub admin_chat_ids: Vec<i64>,

    // Price provider
    pub alphavantage_api_key: String,
    pub output_size: OutputSize,
    pub fetch_timeout: Duration,
    pub fetch_max_retries: u32,

    // Scheduling
    pub interval_minutes: u64,
    pub first_check_delay: Duration,
    pub cycle_concurrency: usize,

    // Strategy
    pub strategy_config_path: Option<String>,
    pub rsi_low: Option<f64>,
    pub rsi_high: Option<f64>,

    // Persistence
    pub subscriptions_path: String,

    // Dashboard, enabled when DASHBOARD_TOKEN is set
    pub dashboard: Option<DashboardConfig>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let admin_chat_ids = env
            .optional("ADMIN_CHAT_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<i64>().unwrap_or_else(|_| {
                            panic!("ADMIN_CHAT_IDS contains non-numeric ID: '{s}'")
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let output_size = match env.optional("ALPHAVANTAGE_OUTPUT_SIZE") {
            None => OutputSize::default(),
            Some(v) => match v.trim().to_lowercase().as_str() {
                "compact" => {
                    warn!("ALPHAVANTAGE_OUTPUT_SIZE=compact returns 100 bars; strategies needing more history will stay silent");
                    OutputSize::Compact
                }
                "full" => OutputSize::Full,
                other => panic!(
                    "ERROR: ALPHAVANTAGE_OUTPUT_SIZE must be 'compact' or 'full', got: '{other}'"
                ),
            },
        };

        let interval_minutes: u64 = env.parsed("INTERVAL_MINUTES", 5);
        if interval_minutes == 0 {
            panic!("ERROR: INTERVAL_MINUTES must be at least 1");
        }

        let cycle_concurrency: usize = env.parsed("CYCLE_CONCURRENCY", 1);
        if cycle_concurrency == 0 {
            warn!("CYCLE_CONCURRENCY=0 is treated as 1");
        }

        let dashboard = env.optional("DASHBOARD_TOKEN").map(|token| DashboardConfig {
            token,
            port: env.parsed("DASHBOARD_PORT", 8080),
        });

        Config {
            telegram_token: env.required("TELEGRAM_BOT_TOKEN"),
            admin_chat_ids,
            alphavantage_api_key: env.required("ALPHAVANTAGE_API_KEY"),
            output_size,
            fetch_timeout: Duration::from_secs(env.parsed("FETCH_TIMEOUT_SECS", 30)),
            fetch_max_retries: env.parsed("FETCH_MAX_RETRIES", 3),
            interval_minutes,
            first_check_delay: Duration::from_secs(env.parsed("FIRST_CHECK_DELAY_SECS", 10)),
            cycle_concurrency: cycle_concurrency.max(1),
            strategy_config_path: env.optional("STRATEGY_CONFIG_PATH"),
            rsi_low: env.optional("RSI_LOW").map(|v| parse_or_panic("RSI_LOW", &v)),
            rsi_high: env.optional("RSI_HIGH").map(|v| parse_or_panic("RSI_HIGH", &v)),
            subscriptions_path: env
                .optional("SUBSCRIPTIONS_PATH")
                .unwrap_or_else(|| "subscriptions.json".to_string()),
            dashboard,
        }
    }

    pub fn check_period(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &str) -> String {
        self.optional(key).unwrap_or_else(|| {
            panic!("Required environment variable '{key}' is not set. Check your .env file.")
        })
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.optional(key)
            .map(|v| parse_or_panic(key, &v))
            .unwrap_or(default)
    }
}

fn parse_or_panic<T: std::str::FromStr>(key: &str, raw: &str) -> T {
    raw.trim()
        .parse()
        .unwrap_or_else(|_| panic!("ERROR: {key} has an invalid value: '{raw}'"))
}
