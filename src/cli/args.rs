use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "snortmon",
    version,
    about = "Snort 3 monitor management client",
    long_about = "snortmon talks to the Snort 3 monitor management API: browse events, rules and the request log, and drive the control endpoints.\n\nA list request that fails on the network exits with status 1 and prints nothing; run with -v to see the logged cause.\n\nExamples:\n  snortmon rules --gid 1 --sid 2000001\n  snortmon events --protocol TCP --interactive\n  snortmon events-count --period 24h --type addr\n  snortmon profiler-start --time 5 && snortmon profiler-status --watch\n  snortmon --format html -o rules.html rules --action alert\n\nTip: run `snortmon init-config` once and keep the API location in ~/.snortmon/config.yml."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv). RUST_LOG overrides it."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'f',
        long = "format",
        visible_alias = "of",
        value_name = "FORMAT",
        global = true,
        help_heading = "Output",
        help = "Output format: text, json or html. Defaults to the --output extension, then text."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        global = true,
        help_heading = "Output",
        help = "Write the rendered result to FILE instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Config file (YAML). Defaults to ~/.snortmon/config.yml when present."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'b',
        long = "base-url",
        value_name = "URL",
        env = "SNORTMON_BASE_URL",
        global = true,
        help_heading = "HTTP",
        help = "API root, e.g. http://127.0.0.1:8000/api/v1."
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Request timeout in seconds (default: 10)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "control-timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Timeout for execute, update-rules, write-rule and profiler-start, which wait on Snort (default: 45)."
    )]
    pub control_timeout: Option<u64>,

    #[arg(
        short = 'p',
        long = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Send every request through this proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "response-order",
        value_name = "POLICY",
        global = true,
        help_heading = "Browsing",
        help = "Which list response wins when requests overlap: latest-issued (default) or last-arrival."
    )]
    pub response_order: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List alert events.
    Events(EventsArgs),
    /// Delete every stored event.
    ClearEvents,
    /// Event counts over a period, grouped by sid or by address pair.
    EventsCount(EventsCountArgs),
    /// Run a command on the Snort control channel.
    Execute(ExecuteArgs),
    /// Query perf_monitor data.
    PerfMonitor(PerfMonitorArgs),
    /// Start rule profiling for a number of minutes or until a point in time.
    ProfilerStart(ProfilerStartArgs),
    /// Time left on the running rule profiler.
    ProfilerStatus(ProfilerStatusArgs),
    /// Show the last rule profiler result.
    ProfilerLast,
    /// List rules.
    Rules(RulesArgs),
    /// Pull and reload the rule set.
    UpdateRules,
    /// Add a local rule.
    WriteRule(WriteRuleArgs),
    /// List API request log periods.
    RequestsLog(RequestsLogArgs),
    /// Write a commented default config file if none exists.
    InitConfig,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(
        long = "page",
        value_name = "N",
        help_heading = "Paging",
        help = "Start on page N (events and rules only)."
    )]
    pub page: Option<u32>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Paging",
        help = "Browse page by page: n(ext), p(rev), f key=value..., r(efresh), q(uit)."
    )]
    pub interactive: bool,

    #[arg(
        long = "all",
        conflicts_with = "interactive",
        help_heading = "Paging",
        help = "Follow next links and print every page."
    )]
    pub all: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EventsArgs {
    #[arg(long = "sid", help_heading = "Filters")]
    pub sid: Option<String>,
    #[arg(long = "source-ip", visible_alias = "src", help_heading = "Filters")]
    pub source_ip: Option<String>,
    #[arg(long = "dest-ip", visible_alias = "dst", help_heading = "Filters")]
    pub dest_ip: Option<String>,
    #[arg(long = "source-port", visible_alias = "sport", help_heading = "Filters")]
    pub source_port: Option<String>,
    #[arg(long = "dest-port", visible_alias = "dport", help_heading = "Filters")]
    pub dest_port: Option<String>,
    #[arg(long = "protocol", visible_alias = "proto", help_heading = "Filters")]
    pub protocol: Option<String>,
    #[command(flatten)]
    pub list: ListArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RulesArgs {
    #[arg(long = "gid", help_heading = "Filters")]
    pub gid: Option<String>,
    #[arg(long = "sid", help_heading = "Filters")]
    pub sid: Option<String>,
    #[arg(long = "action", help_heading = "Filters")]
    pub action: Option<String>,
    #[command(flatten)]
    pub list: ListArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RequestsLogArgs {
    #[arg(long = "period-start", value_name = "DATE", help_heading = "Filters")]
    pub period_start: Option<String>,
    #[arg(long = "period-end", value_name = "DATE", help_heading = "Filters")]
    pub period_end: Option<String>,
    #[command(flatten)]
    pub list: ListArgs,
}

#[derive(Args, Debug, Clone)]
pub struct EventsCountArgs {
    #[arg(long = "period", value_name = "PERIOD", help = "Time period, e.g. 1h or 7d.")]
    pub period: String,

    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPE",
        default_value = "sid",
        help = "Group by sid or addr."
    )]
    pub count_type: String,
}

#[derive(Args, Debug, Clone)]
pub struct ExecuteArgs {
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Control command; the words are joined with spaces."
    )]
    pub command: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PerfMonitorArgs {
    #[arg(long = "begin", value_name = "TIME")]
    pub begin: Option<String>,
    #[arg(long = "end", value_name = "TIME")]
    pub end: Option<String>,
    #[arg(long = "aggr", value_name = "AGGREGATION")]
    pub aggr: Option<String>,
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefix: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProfilerStartArgs {
    #[arg(
        short = 't',
        long = "time",
        value_name = "MINUTES",
        help = "Profile for this many minutes (wins over --until)."
    )]
    pub time: Option<u32>,

    #[arg(
        short = 'u',
        long = "until",
        value_name = "DATETIME",
        help = "Profile until YYYY-MM-DDTHH:MM (UTC) or an RFC 3339 timestamp."
    )]
    pub until: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProfilerStatusArgs {
    #[arg(short = 'w', long = "watch", help = "Keep counting down once per second.")]
    pub watch: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WriteRuleArgs {
    #[arg(value_name = "RULE", conflicts_with = "file", help = "Rule text.")]
    pub content: Option<String>,

    #[arg(
        short = 'F',
        long = "file",
        value_name = "FILE",
        help = "Read the rule text from FILE."
    )]
    pub file: Option<String>,
}
