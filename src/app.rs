use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::json;
use time::OffsetDateTime;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::args::{CliArgs, Command, ListArgs, WriteRuleArgs};
use crate::cli::validation;
use crate::client::{
    ApiClient, ClientError, ClientOptions, CountKind, EventCount, ListResponse, PerfQuery,
    DEFAULT_BASE_URL, DEFAULT_CONTROL_TIMEOUT_SECONDS,
};
use crate::config::{self, ConfigFile};
use crate::output::{self, OutputFormat};
use crate::profiler::{self, ProfilerState};
use crate::query::{FilterSet, ListKind};
use crate::view::{Applied, Dispatch, ListView, ResponseOrder, Screen, Ticket};

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn status_line(message: &str) {
    println!("{}", message.green().bold());
}

#[derive(Clone, Debug)]
struct RunConfig {
    client: ClientOptions,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    verbose: u8,
    response_order: ResponseOrder,
    profiler_state: Option<PathBuf>,
    command: Command,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout_seconds = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout_seconds == 0 {
        return Err("invalid timeout in config, expected a positive number of seconds".to_string());
    }
    let control_timeout_seconds = args
        .control_timeout
        .or(cfg.control_timeout)
        .unwrap_or(DEFAULT_CONTROL_TIMEOUT_SECONDS);
    if control_timeout_seconds == 0 {
        return Err(
            "invalid control_timeout in config, expected a positive number of seconds".to_string(),
        );
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let output_format = match args.output_format.as_deref() {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --format '{raw}', expected text, json or html"))?,
        None => match args.output.as_deref().and_then(output::infer_format_from_path) {
            Some(inferred) => inferred,
            None => match cfg.output_format.as_deref() {
                Some(raw) => OutputFormat::parse(raw).ok_or_else(|| {
                    format!("invalid output_format '{raw}' in config, expected text, json or html")
                })?,
                None => OutputFormat::Text,
            },
        },
    };

    let response_order = match args.response_order.as_deref().or(cfg.response_order.as_deref()) {
        Some(raw) => ResponseOrder::parse(raw).ok_or_else(|| {
            format!("invalid response order '{raw}', expected latest-issued or last-arrival")
        })?,
        None => ResponseOrder::default(),
    };

    let profiler_state = cfg
        .profiler_state
        .as_deref()
        .map(config::expand_tilde)
        .or_else(profiler::default_state_path);

    Ok(RunConfig {
        client: ClientOptions {
            base_url,
            timeout_seconds,
            control_timeout_seconds,
            proxy,
        },
        output: args.output,
        output_format,
        no_color,
        verbose: args.verbose,
        response_order,
        profiler_state,
        command: args.command,
    })
}

fn print_summary(run: &RunConfig) {
    format_kv_line("API", &run.client.base_url);
    format_kv_line("Timeout", &format!("{}s", run.client.timeout_seconds));
    format_kv_line(
        "Control",
        &format!("{}s", run.client.control_timeout_seconds),
    );
    format_kv_line("Proxy", run.client.proxy.as_deref().unwrap_or("none"));
    format_kv_line("Format", run.output_format.as_str());
    format_kv_line("Output", run.output.as_deref().unwrap_or("stdout"));
    eprintln!();
}

/// Write rendered bytes to `--output`, or stdout when none was given.
async fn emit(run: &RunConfig, rendered: &[u8]) -> Result<(), String> {
    match run.output.as_deref() {
        Some(path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(rendered)
                .await
                .map_err(|_| "failed to write output file".to_string())?;
            info!(path, bytes = rendered.len(), "wrote output file");
            Ok(())
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))
        }
    }
}

fn render_table(format: OutputFormat, title: &str, table: &output::Table) -> Vec<u8> {
    match format {
        OutputFormat::Text => output::render_text_table(table).into_bytes(),
        OutputFormat::Json => output::render_json(table),
        OutputFormat::Html => output::report::render_table_page(title, table),
    }
}

fn render_text(format: OutputFormat, title: &str, text: &str) -> Vec<u8> {
    let mut text = text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    match format {
        OutputFormat::Text => text.into_bytes(),
        OutputFormat::Json => output::render_json(&json!({ "response": text.trim_end() })),
        OutputFormat::Html => output::report::render_text_page(title, &text),
    }
}

fn render_screen(format: OutputFormat, kind: ListKind, screen: &Screen, page: Option<u32>) -> Vec<u8> {
    match format {
        OutputFormat::Text => output::render_screen_text(kind, screen, page).into_bytes(),
        OutputFormat::Json => output::render_json(&json!({
            "view": kind.path(),
            "page": page,
            "results": screen.rows,
            "nav": screen.nav,
            "banner": screen.banner,
        })),
        OutputFormat::Html => output::report::render_screen_html(kind, screen, page),
    }
}

fn list_filters(kind: ListKind, fields: &[(&str, Option<&String>)]) -> Result<FilterSet, String> {
    let mut filters = FilterSet::new(kind);
    for (field, value) in fields {
        if let Some(value) = value {
            filters.set(field, value).map_err(|e| e.to_string())?;
        }
    }
    Ok(filters)
}

async fn run_list(
    run: &RunConfig,
    client: &ApiClient,
    kind: ListKind,
    filters: FilterSet,
    list: &ListArgs,
) -> Result<(), String> {
    if list.interactive {
        return run_interactive(run, client, kind, filters, list.page.unwrap_or(1)).await;
    }
    if list.all {
        return run_all_pages(run, client, kind, &filters).await;
    }

    let mut view = ListView::new(kind, run.response_order);
    let dispatch = view
        .submit_at(filters, list.page.unwrap_or(1))
        .map_err(|e| e.to_string())?;
    view.run(client, dispatch).await;

    let screen = view.screen();
    if let Some(banner) = screen.banner.as_deref() {
        // On a terminal the banner is the whole text screen; main prints it.
        if run.output.is_some() || run.output_format != OutputFormat::Text {
            emit(run, &render_screen(run.output_format, kind, screen, view.page())).await?;
        }
        return Err(banner.to_string());
    }
    if screen.nav.is_none() {
        // Transport failures stay silent; the cause is in the -v log.
        return Err(String::new());
    }
    emit(run, &render_screen(run.output_format, kind, screen, view.page())).await
}

async fn run_all_pages(
    run: &RunConfig,
    client: &ApiClient,
    kind: ListKind,
    filters: &FilterSet,
) -> Result<(), String> {
    let mut rows = Vec::new();
    let mut pages = 0usize;
    {
        let stream = client.stream_pages(kind, filters);
        futures::pin_mut!(stream);
        while let Some(page) = stream.next().await {
            match page {
                Ok(page) => {
                    pages += 1;
                    debug!(view = kind.label(), pages, items = page.results.len(), "page received");
                    rows.extend(page.results);
                }
                Err(e) => {
                    warn!(view = kind.label(), pages, error = %e, "stopped following pages");
                    return Err(e.banner().unwrap_or_default());
                }
            }
        }
    }
    info!(view = kind.label(), pages, items = rows.len(), "fetched every page");

    let rendered = match run.output_format {
        OutputFormat::Json => output::render_json(&rows),
        format => render_table(
            format,
            &format!("Snort {}", kind.label()),
            &output::items_table(kind, &rows),
        ),
    };
    emit(run, &rendered).await
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Interaction {
    Next,
    Previous,
    Filter(Vec<String>),
    Refresh,
    Help,
    Quit,
}

fn starts_pair(word: &str) -> bool {
    word.split_once('=').is_some_and(|(key, _)| {
        !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Split `key=value` pairs; a word without its own `key=` continues the
/// previous value, so `period_start=2024-01-01 10:00` stays one pair.
fn split_filter_pairs(rest: &str) -> Vec<String> {
    let mut pairs: Vec<String> = Vec::new();
    for word in rest.split_whitespace() {
        if !starts_pair(word) {
            if let Some(last) = pairs.last_mut() {
                last.push(' ');
                last.push_str(word);
                continue;
            }
        }
        pairs.push(word.to_string());
    }
    pairs
}

/// One stdin line of the interactive browser; `Ok(None)` for a blank line.
fn parse_interaction(line: &str) -> Result<Option<Interaction>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let interaction = match head.to_lowercase().as_str() {
        "n" | "next" => Interaction::Next,
        "p" | "prev" | "previous" => Interaction::Previous,
        "f" | "filter" => Interaction::Filter(split_filter_pairs(rest)),
        "r" | "refresh" => Interaction::Refresh,
        "h" | "help" | "?" => Interaction::Help,
        "q" | "quit" | "exit" => Interaction::Quit,
        other => return Err(format!("unknown command '{other}' (h for help)")),
    };
    Ok(Some(interaction))
}

fn interactive_help(kind: ListKind) -> String {
    format!(
        "n(ext) | p(rev) | f key=value ... | r(efresh) | q(uit)\nfilters: {}",
        kind.filter_fields().join(", ")
    )
}

type Outcome = (Ticket, Result<ListResponse, ClientError>);

fn spawn_fetch(client: &ApiClient, kind: ListKind, dispatch: Dispatch, tx: mpsc::Sender<Outcome>) {
    let client = client.clone();
    tokio::spawn(async move {
        let outcome = client.fetch_list(kind, &dispatch.request).await;
        let _ = tx.send((dispatch.ticket, outcome)).await;
    });
}

fn print_screen(view: &ListView) {
    let screen = view.screen();
    match screen.banner.as_deref() {
        Some(banner) => println!("{}", banner.red().bold()),
        None => print!(
            "{}",
            output::render_screen_text(view.kind(), screen, view.page())
        ),
    }
}

async fn run_interactive(
    run: &RunConfig,
    client: &ApiClient,
    kind: ListKind,
    filters: FilterSet,
    page: u32,
) -> Result<(), String> {
    if run.output.is_some() || run.output_format != OutputFormat::Text {
        warn!("interactive mode always renders text to the terminal");
    }
    let mut view = ListView::new(kind, run.response_order);
    let (tx, mut rx) = mpsc::channel::<Outcome>(16);

    let first = view.submit_at(filters, page).map_err(|e| e.to_string())?;
    spawn_fetch(client, kind, first, tx.clone());
    println!("{}", interactive_help(kind).dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some((ticket, outcome)) = rx.recv() => {
                if view.complete(ticket, outcome) == Applied::Shown {
                    print_screen(&view);
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => return Err(format!("failed to read stdin: {e}")),
                };
                let interaction = match parse_interaction(&line) {
                    Ok(Some(interaction)) => interaction,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{}", e.yellow());
                        continue;
                    }
                };
                let dispatch = match interaction {
                    Interaction::Quit => break,
                    Interaction::Help => {
                        println!("{}", interactive_help(kind).dimmed());
                        None
                    }
                    Interaction::Next => {
                        let dispatch = view.next();
                        if dispatch.is_none() {
                            println!("{}", "Next page is disabled.".dimmed());
                        }
                        dispatch
                    }
                    Interaction::Previous => {
                        let dispatch = view.previous();
                        if dispatch.is_none() {
                            println!("{}", "Previous page is disabled.".dimmed());
                        }
                        dispatch
                    }
                    Interaction::Refresh => Some(view.refresh()),
                    Interaction::Filter(pairs) => {
                        match FilterSet::from_pairs(kind, &pairs).and_then(|f| view.submit(f)) {
                            Ok(dispatch) => Some(dispatch),
                            Err(e) => {
                                eprintln!("{}", e.to_string().yellow());
                                None
                            }
                        }
                    }
                };
                if let Some(dispatch) = dispatch {
                    spawn_fetch(client, kind, dispatch, tx.clone());
                }
            }
        }
    }
    Ok(())
}

fn user_error(e: &ClientError) -> String {
    e.server_message().unwrap_or_else(|| format!("Error: {e}"))
}

async fn clear_events(client: &ApiClient) -> Result<String, String> {
    match client.clear_events().await {
        Ok(_) => Ok("Delete successful!".to_string()),
        Err(e) => {
            warn!(error = %e, "clear events failed");
            Err(user_error(&e))
        }
    }
}

async fn events_count(
    run: &RunConfig,
    client: &ApiClient,
    period: &str,
    count_type: &str,
) -> Result<(), String> {
    let kind = CountKind::parse(count_type)
        .ok_or_else(|| format!("invalid --type '{count_type}', expected sid or addr"))?;
    let counts = client.events_count(period, kind).await.map_err(|e| {
        warn!(error = %e, period, "events count failed");
        "Error fetching events count. Please try again.".to_string()
    })?;
    info!(
        rows = counts.len(),
        total = counts.iter().map(EventCount::count).sum::<u64>(),
        "events counted"
    );
    let rendered = match run.output_format {
        OutputFormat::Json => output::render_json(&counts),
        format => render_table(
            format,
            "Snort Events Count",
            &output::events_count_table(kind, &counts),
        ),
    };
    emit(run, &rendered).await
}

async fn execute(run: &RunConfig, client: &ApiClient, words: &[String]) -> Result<(), String> {
    let command = words.join(" ");
    let resp = client.execute(command.trim()).await.map_err(|e| {
        warn!(error = %e, "execute failed");
        user_error(&e)
    })?;
    emit(run, &render_text(run.output_format, "Snort Command", &resp.response)).await
}

async fn perf_monitor(
    run: &RunConfig,
    client: &ApiClient,
    query: PerfQuery,
) -> Result<(), String> {
    let resp = client.perf_monitor(&query).await.map_err(|e| {
        warn!(error = %e, "perf monitor failed");
        "Error fetching performance data. Please try again.".to_string()
    })?;
    let rendered = match run.output_format {
        OutputFormat::Json => output::render_json(&resp.response),
        format => render_text(
            format,
            "Snort Performance Monitor",
            &output::render_perf_text(&resp.response),
        ),
    };
    emit(run, &rendered).await
}

fn now_ms() -> i64 {
    profiler::unix_millis(OffsetDateTime::now_utc())
}

fn state_path(run: &RunConfig) -> Result<&PathBuf, String> {
    run.profiler_state.as_ref().ok_or_else(|| {
        "cannot locate a home directory; set profiler_state in the config file".to_string()
    })
}

async fn profiler_start(
    run: &RunConfig,
    client: &ApiClient,
    minutes: Option<u32>,
    until: Option<&str>,
) -> Result<String, String> {
    let window = profiler::window_from_inputs(minutes, until).map_err(|e| e.to_string())?;
    let end_timestamp_ms =
        profiler::end_timestamp_ms(&window, OffsetDateTime::now_utc()).map_err(|e| e.to_string())?;
    let path = state_path(run)?;
    profiler::save_state(path, &ProfilerState { end_timestamp_ms }).map_err(|e| e.to_string())?;
    debug!(path = %path.display(), end_timestamp_ms, "profiler state saved");

    client.start_profiler(&window).await.map_err(|e| {
        warn!(error = %e, "start profiler failed");
        "Error starting profiling.".to_string()
    })?;
    Ok(format!(
        "Rule profiling started.\n{}",
        profiler::countdown_text(profiler::seconds_left(end_timestamp_ms, now_ms()))
    ))
}

async fn profiler_status(run: &RunConfig, watch: bool) -> Result<(), String> {
    let path = state_path(run)?;
    let Some(state) = profiler::load_state(path).map_err(|e| e.to_string())? else {
        println!("{}", profiler::countdown_text(0));
        return Ok(());
    };
    let left = profiler::seconds_left(state.end_timestamp_ms, now_ms());
    if !watch || left == 0 {
        println!("{}", profiler::countdown_text(left));
        return Ok(());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stdout());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let left = profiler::seconds_left(state.end_timestamp_ms, now_ms());
        if left == 0 {
            pb.finish_with_message(profiler::countdown_text(0));
            break;
        }
        pb.set_message(profiler::countdown_text(left));
        pb.tick();
    }
    Ok(())
}

async fn profiler_last(run: &RunConfig, client: &ApiClient) -> Result<(), String> {
    let last = client.last_profiler().await.map_err(|e| {
        warn!(error = %e, "last profiler result failed");
        "Error fetching last profiler result.".to_string()
    })?;
    let result = last.result;
    let rendered = match run.output_format {
        OutputFormat::Text => output::render_profiler_text(&result).into_bytes(),
        OutputFormat::Json => output::render_json(&result),
        OutputFormat::Html => output::report::render_table_page(
            &format!(
                "Rule Profiler {} - {}",
                output::value_text(&result.start_time),
                output::value_text(&result.end_time)
            ),
            &output::profiler_rules_table(&result.rules),
        ),
    };
    emit(run, &rendered).await
}

async fn update_rules(run: &RunConfig, client: &ApiClient) -> Result<String, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Updating rules");
    pb.enable_steady_tick(Duration::from_millis(120));

    let outcome = client.update_rules().await;
    pb.finish_and_clear();
    let resp = outcome.map_err(|e| {
        warn!(error = %e, "update rules failed");
        "Update failed. Please try again.".to_string()
    })?;
    emit(run, &render_text(run.output_format, "Snort Rule Update", &resp.response)).await?;
    Ok("Update complete!".to_string())
}

async fn write_rule(
    run: &RunConfig,
    client: &ApiClient,
    args: &WriteRuleArgs,
) -> Result<String, String> {
    let content = match (&args.content, &args.file) {
        (Some(content), _) => content.clone(),
        (None, Some(file)) => tokio::fs::read_to_string(config::expand_tilde(file))
            .await
            .map_err(|e| format!("failed to read rule file '{file}': {e}"))?,
        (None, None) => return Err("missing rule: pass the rule text or --file".to_string()),
    };
    let resp = client.write_rule(content.trim()).await.map_err(|e| {
        warn!(error = %e, "write rule failed");
        user_error(&e)
    })?;
    if run.output_format == OutputFormat::Json {
        emit(run, &output::render_json(&resp)).await?;
    }
    if !resp.success {
        return Err(format!("Error: {}", resp.message));
    }
    if resp.message.is_empty() {
        Ok("Rule added.".to_string())
    } else {
        Ok(resp.message)
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.verbose > 0 {
        print_summary(&run);
    }
    let client = ApiClient::new(&run.client).map_err(|e| e.to_string())?;

    match &run.command {
        Command::Events(a) => {
            let filters = list_filters(
                ListKind::Events,
                &[
                    ("sid", a.sid.as_ref()),
                    ("source_ip", a.source_ip.as_ref()),
                    ("dest_ip", a.dest_ip.as_ref()),
                    ("source_port", a.source_port.as_ref()),
                    ("dest_port", a.dest_port.as_ref()),
                    ("protocol", a.protocol.as_ref()),
                ],
            )?;
            run_list(&run, &client, ListKind::Events, filters, &a.list).await
        }
        Command::Rules(a) => {
            let filters = list_filters(
                ListKind::Rules,
                &[
                    ("gid", a.gid.as_ref()),
                    ("sid", a.sid.as_ref()),
                    ("action", a.action.as_ref()),
                ],
            )?;
            run_list(&run, &client, ListKind::Rules, filters, &a.list).await
        }
        Command::RequestsLog(a) => {
            let filters = list_filters(
                ListKind::RequestsLog,
                &[
                    ("period_start", a.period_start.as_ref()),
                    ("period_end", a.period_end.as_ref()),
                ],
            )?;
            run_list(&run, &client, ListKind::RequestsLog, filters, &a.list).await
        }
        Command::ClearEvents => clear_events(&client).await.map(|m| status_line(&m)),
        Command::EventsCount(a) => events_count(&run, &client, &a.period, &a.count_type).await,
        Command::Execute(a) => execute(&run, &client, &a.command).await,
        Command::PerfMonitor(a) => {
            let query = PerfQuery {
                begin: a.begin.clone().unwrap_or_default(),
                end: a.end.clone().unwrap_or_default(),
                aggr: a.aggr.clone().unwrap_or_default(),
                prefix: a.prefix.clone().unwrap_or_default(),
            };
            perf_monitor(&run, &client, query).await
        }
        Command::ProfilerStart(a) => {
            profiler_start(&run, &client, a.time, a.until.as_deref())
                .await
                .map(|m| status_line(&m))
        }
        Command::ProfilerStatus(a) => profiler_status(&run, a.watch).await,
        Command::ProfilerLast => profiler_last(&run, &client).await,
        Command::UpdateRules => update_rules(&run, &client).await.map(|m| status_line(&m)),
        Command::WriteRule(a) => write_rule(&run, &client, a).await.map(|m| status_line(&m)),
        Command::InitConfig => Ok(()),
    }
}

fn init_config(explicit: Option<&str>) -> Result<(), String> {
    let path = match explicit {
        Some(p) => config::expand_tilde(p),
        None => config::default_config_path()
            .ok_or_else(|| "cannot locate a home directory; pass --config".to_string())?,
    };
    if config::ensure_default_config_file(&path)? {
        status_line(&format!("Wrote default config to {}", path.display()));
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if matches!(args.command, Command::InitConfig) {
        return init_config(args.config.as_deref());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    if run.no_color {
        colored::control::set_override(false);
    }
    crate::telemetry::init(run.verbose, run.no_color)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
