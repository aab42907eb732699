//! Human-readable run reports.

use chrono::{DateTime, Utc};
use comfy_table::{Table, presets::UTF8_FULL};

use chanward_core::announce::AnnounceReport;
use chanward_core::scanner::LastMessage;
use chanward_core::sweep::SweepReport;
use chanward_core::Decision;

const PREVIEW_CHARS: usize = 60;

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// `author [bot]: text`, whitespace collapsed and cut to 60 characters.
pub fn preview(msg: &LastMessage) -> String {
    let text = msg.text.split_whitespace().collect::<Vec<_>>().join(" ");
    let text = if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS - 1).collect();
        format!("{cut}…")
    } else {
        text
    };
    let author = msg.author_name.as_deref().unwrap_or("unknown");
    let tag = if msg.is_bot { " [bot]" } else { "" };
    format!("{author}{tag}: {text}")
}

fn decision_label(decision: Decision, dry_run: bool) -> &'static str {
    match (decision, dry_run) {
        (Decision::None, _) => "-",
        (Decision::Warn, false) => "warn",
        (Decision::Warn, true) => "would warn",
        (Decision::Archive, false) => "archive",
        (Decision::Archive, true) => "would archive",
    }
}

pub fn render_sweep(report: &SweepReport) -> String {
    let mut out = String::new();

    if report.rows.is_empty() {
        out.push_str("No channels to evaluate.\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(["CHANNEL", "LAST ACTIVITY", "MEMBERS", "STATE", "DECISION", "LAST MESSAGE"]);

        for row in &report.rows {
            let last = row
                .summary
                .last_message
                .as_ref()
                .map(preview)
                .unwrap_or_else(|| "-".into());
            table.add_row([
                row.channel.display_name(),
                format_ts(row.summary.last_activity),
                row.channel.member_count.to_string(),
                row.state.to_string(),
                decision_label(row.decision, report.dry_run).to_owned(),
                last,
            ]);
        }
        out.push_str(&format!("{table}\n"));
    }

    if !report.excluded.is_empty() {
        let names: Vec<String> = report.excluded.iter().map(|c| c.display_name()).collect();
        out.push_str(&format!("Excluded: {}\n", names.join(", ")));
    }

    for skipped in &report.skipped {
        out.push_str(&format!(
            "skipped {}: {}\n  hint: {}\n",
            skipped.channel.display_name(),
            skipped.error,
            skipped.error.remediation()
        ));
    }

    for failure in &report.actions.failed {
        out.push_str(&format!(
            "failed to {} {}: {}\n  hint: {}\n",
            failure.decision,
            failure.channel.display_name(),
            failure.error,
            failure.error.remediation()
        ));
    }
    if report.actions.aborted {
        out.push_str("Stopped early; remaining actions were not attempted.\n");
    }

    out.push_str(&format!("{}\n", report.summary_line()));
    out
}

pub fn render_announce(report: &AnnounceReport) -> String {
    let mut out = String::new();

    if report.candidates.is_empty() {
        out.push_str("No new channels in the window.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["CHANNEL", "CREATED", "MEMBERS", "STATUS"]);
    for c in &report.candidates {
        let status = if report.already_announced.contains(&c.name) {
            "already announced"
        } else if report.dry_run {
            "would announce"
        } else {
            "announced"
        };
        table.add_row([
            c.display_name(),
            format_ts(c.created),
            c.member_count.to_string(),
            status.to_owned(),
        ]);
    }
    out.push_str(&format!("{table}\n"));

    if report.duplicate_check_degraded {
        out.push_str("Duplicate check was unavailable; some channels may be announced twice.\n");
    }

    match (&report.announcement, report.dry_run) {
        (Some(a), true) => {
            out.push_str(&format!("Announcement preview:\n{}\n", a.text));
        }
        (Some(_), false) => {
            out.push_str(&format!("{} channel(s) announced\n", report.announced()));
        }
        (None, _) => out.push_str("Nothing new to announce.\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanward_core::executor::{ActionFailure, BatchReport};
    use chanward_core::scanner::ActivitySummary;
    use chanward_core::sweep::{ChannelRow, SkippedChannel};
    use chanward_core::LifecycleState;
    use chanward_types::{Channel, ChanwardError};
    use chanward_types::channel::from_unix;

    fn last(text: &str, is_bot: bool) -> LastMessage {
        LastMessage {
            author_id: Some("U1".into()),
            author_name: Some("ada".into()),
            text: text.into(),
            is_bot,
            ts: from_unix(1_700_000_000).unwrap(),
        }
    }

    #[test]
    fn preview_truncates_to_sixty_chars() {
        let long = "x".repeat(200);
        let p = preview(&last(&long, false));
        let body = p.strip_prefix("ada: ").unwrap();
        assert_eq!(body.chars().count(), 60);
        assert!(body.ends_with('…'));
    }

    #[test]
    fn preview_tags_bots_and_collapses_whitespace() {
        assert_eq!(preview(&last("deploy\n  done", true)), "ada [bot]: deploy done");
    }

    #[test]
    fn preview_without_author() {
        let mut m = last("hi", false);
        m.author_name = None;
        assert_eq!(preview(&m), "unknown: hi");
    }

    fn report(dry_run: bool) -> SweepReport {
        let channel = Channel {
            id: "C1".into(),
            name: "idle".into(),
            created: from_unix(1_600_000_000).unwrap(),
            member_count: 4,
            is_archived: false,
            is_member: true,
        };
        SweepReport {
            rows: vec![ChannelRow {
                channel,
                summary: ActivitySummary {
                    last_activity: from_unix(1_650_000_000).unwrap(),
                    marker: None,
                    last_message: Some(last("anyone here?", false)),
                    notice_posted: false,
                    scanned: 1,
                },
                state: LifecycleState::PendingWarning,
                decision: Decision::Warn,
            }],
            excluded: vec![],
            skipped: vec![],
            actions: BatchReport::default(),
            dry_run,
        }
    }

    #[test]
    fn sweep_report_lists_channel_and_summary() {
        let out = render_sweep(&report(true));
        assert!(out.contains("#idle"));
        assert!(out.contains("would warn"));
        assert!(out.contains("ada: anyone here?"));
        assert!(out.contains("2022-04-15"));
        assert!(out.trim_end().ends_with("would warn 0, would archive 0, 0 failed"));
    }

    #[test]
    fn failures_are_listed_with_hints() {
        let mut r = report(false);
        let channel = r.rows[0].channel.clone();
        r.skipped.push(SkippedChannel {
            channel: channel.clone(),
            error: ChanwardError::NotFound {
                what: "#idle".into(),
            },
        });
        r.actions.failed.push(ActionFailure {
            channel,
            decision: Decision::Warn,
            error: ChanwardError::MissingPermission {
                scope: "chat:write".into(),
                action: "post a warning".into(),
            },
        });
        r.actions.aborted = true;

        let out = render_sweep(&r);
        assert!(out.contains("skipped #idle: not found: #idle\n  hint: "), "{out}");
        assert!(out.contains("failed to warn #idle: missing permission `chat:write`"), "{out}");
        assert!(out.contains("Stopped early"), "{out}");
        assert!(out.ends_with("0 warned, 0 archived, 1 failed\n"), "{out}");
    }

    #[test]
    fn empty_announce_report() {
        let out = render_announce(&AnnounceReport::default());
        assert_eq!(out, "No new channels in the window.\n");
    }
}
