//! Log console deep links.
//!
//! The console decodes the `#logsV2:` fragment once before routing and once more when
//! it reads the path segment, so path segments need two layers of percent-encoding.
//! The session query link carries a rison-style query definition whose own escapes
//! use `*` instead of `%`.

use chrono::{DateTime, Duration, SubsecRound, Utc};

pub const CONSOLE_BASE: &str = "https://console.aws.amazon.com/cloudwatch/home";

/// Characters that must not appear raw in a console path segment.
const PATH_RESERVED: &[char] = &['%', '/', '$', '[', ']'];

/// Characters of the query link's fragment that are escaped once.
const FRAGMENT_RESERVED: &[char] = &['%', '?', '='];

/// Encode each of `% / $ [ ]` as `%25XX`, i.e. percent-encoded twice, so a literal
/// `%` becomes `%2525`. Everything else passes through unchanged. Total and pure.
pub fn double_encode(segment: &str) -> String {
    escape_set(&escape_set(segment, PATH_RESERVED), &['%'])
}

/// Link to one log stream. The group is encoded once, the stream twice.
pub fn stream_link(region: &str, log_group: &str, log_stream: &str) -> String {
    format!(
        "{}?region={}#logsV2:log-groups/log-group/{}/log-events/{}",
        CONSOLE_BASE,
        region,
        urlencoding::encode(log_group),
        double_encode(log_stream)
    )
}

/// Time range of the session query. Whole seconds, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// The hour ending at `now`.
    pub fn hour_ending(now: DateTime<Utc>) -> Self {
        let end = now.trunc_subsecs(0);
        Self {
            start: end - Duration::hours(1),
            end,
        }
    }
}

/// Link to a log query over `log_group` filtered to lines mentioning `session_id`.
pub fn session_query_link(
    region: &str,
    log_group: &str,
    session_id: &str,
    window: QueryWindow,
) -> String {
    let editor = format!(
        "fields @message\n| filter @message like '{}'",
        session_id
    );
    let detail = format!(
        "~(end~'{}~start~'{}~timeType~'ABSOLUTE~tz~'UTC~editorString~'{}~isLiveTail~false~source~(~'{}))",
        rison_escape(&timestamp(window.end)),
        rison_escape(&timestamp(window.start)),
        rison_escape(&editor),
        rison_escape(log_group),
    );
    let query = format!("?queryDetail={}", escape_except(&detail, "%", true, is_detail_safe));
    format!(
        "{}?region={}#logsV2:logs-insights{}",
        CONSOLE_BASE,
        region,
        escape_set(&query, FRAGMENT_RESERVED)
    )
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// Escape for a quoted rison value: anything outside `[A-Za-z0-9._-]` becomes `*xx`.
fn rison_escape(value: &str) -> String {
    escape_except(value, "*", false, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
    })
}

/// Rison escapes survive the percent layer as-is.
fn is_detail_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '*')
}

fn escape_set(input: &str, reserved: &[char]) -> String {
    escape_except(input, "%", true, |c| !reserved.contains(&c))
}

fn escape_except(input: &str, prefix: &str, upper: bool, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut buf = [0u8; 4];
    for c in input.chars() {
        if keep(c) {
            out.push(c);
            continue;
        }
        for byte in c.encode_utf8(&mut buf).bytes() {
            out.push_str(prefix);
            if upper {
                out.push_str(&format!("{:02X}", byte));
            } else {
                out.push_str(&format!("{:02x}", byte));
            }
        }
    }
    out
}
