use crate::cli::args::{CliArgs, Command, ListArgs};
use crate::client::CountKind;
use crate::output::OutputFormat;
use crate::view::ResponseOrder;

fn validate_list(args: &ListArgs, supports_page: bool, command: &str) -> Result<(), String> {
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid --page, expected a positive integer".to_string());
        }
        if !supports_page {
            return Err(format!(
                "--page is not supported for {command}; it follows the server's links, use --interactive"
            ));
        }
    }
    Ok(())
}

fn non_blank(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.output_format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --format '{raw}', expected text, json or html"
            ));
        }
    }
    if let Some(raw) = args.response_order.as_deref() {
        if ResponseOrder::parse(raw).is_none() {
            return Err(format!(
                "invalid --response-order '{raw}', expected latest-issued or last-arrival"
            ));
        }
    }
    if args.timeout == Some(0) {
        return Err("invalid --timeout, expected a positive number of seconds".to_string());
    }
    if args.control_timeout == Some(0) {
        return Err(
            "invalid --control-timeout, expected a positive number of seconds".to_string(),
        );
    }

    match &args.command {
        Command::Events(a) => validate_list(&a.list, true, "events")?,
        Command::Rules(a) => validate_list(&a.list, true, "rules")?,
        Command::RequestsLog(a) => validate_list(&a.list, false, "requests-log")?,
        Command::EventsCount(a) => {
            if a.period.trim().is_empty() {
                return Err("invalid --period, expected a value like 1h or 7d".to_string());
            }
            if CountKind::parse(&a.count_type).is_none() {
                return Err(format!(
                    "invalid --type '{}', expected sid or addr",
                    a.count_type
                ));
            }
        }
        Command::Execute(a) => {
            if a.command.iter().all(|w| w.trim().is_empty()) {
                return Err("missing command to execute".to_string());
            }
        }
        Command::PerfMonitor(a) => {
            if !non_blank(a.begin.as_ref()) || !non_blank(a.end.as_ref()) {
                return Err("Please provide both start and end dates.".to_string());
            }
        }
        Command::ProfilerStart(a) => {
            if a.time.is_none() && !non_blank(a.until.as_ref()) {
                return Err("Please provide either 'time' or 'until' parameter.".to_string());
            }
            if a.time == Some(0) {
                return Err("invalid --time, expected a positive number of minutes".to_string());
            }
        }
        Command::WriteRule(a) => {
            if !non_blank(a.content.as_ref()) && a.file.is_none() {
                return Err("missing rule: pass the rule text or --file".to_string());
            }
        }
        Command::ClearEvents
        | Command::ProfilerStatus(_)
        | Command::ProfilerLast
        | Command::UpdateRules
        | Command::InitConfig => {}
    }
    Ok(())
}
