use chrono::{DateTime, Utc};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::error;

use crate::model::{IcpReport, Inputs, Level, OutreachDraft, TeamStatus};

pub fn banner() {
    println!("\n{}", "Cehpoint".bold());
    println!("{}\n", "STRATEGIC INTELLIGENCE & PROPOSAL AI".yellow());
}

/// Read one line from stdin; `None` on EOF.
pub fn prompt_line(prompt: &str) -> Option<String> {
    print!("{} ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Numbered picker. Empty answer keeps `current`; the answer may be the
/// number or the option text.
pub fn choose(title: &str, options: &[&str], current: usize) -> Option<usize> {
    println!("{}", title.bold());
    for (i, o) in options.iter().enumerate() {
        let marker = if i == current { ">" } else { " " };
        println!(" {} {:>2}. {}", marker, i + 1, o);
    }
    loop {
        let ans = prompt_line(&format!("Select [{}]:", current + 1))?;
        let ans = ans.trim();
        if ans.is_empty() {
            return Some(current);
        }
        if let Ok(n) = ans.parse::<usize>() {
            if (1..=options.len()).contains(&n) {
                return Some(n - 1);
            }
        }
        if let Some(i) = options.iter().position(|o| o.eq_ignore_ascii_case(ans)) {
            return Some(i);
        }
        println!("{}", "Not an option, try again.".red());
    }
}

pub fn confirm(prompt: &str) -> bool {
    match prompt_line(&format!("{} [y/N]:", prompt)) {
        Some(ans) => {
            let ans = ans.trim().to_lowercase();
            ans == "y" || ans == "yes"
        }
        None => false,
    }
}

/// Loading view shown while a generation is in flight.
pub fn generating_spinner(model: &str) -> ProgressBar {
    println!("\n{}", "Analyzing Vectors".bold());
    println!("{}", format!("Deploying strategic models for market fit ({model})...").dimmed());
    println!("  {} Global Market Scan ... {}", "*".green(), "OK".green());
    println!("  {} Psychographic Profiling ... {}", "*".yellow(), "Processing".yellow());
    println!("  {} Proposal Synthesis ... {}", "*".magenta(), "Pending".dimmed());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("waiting for the model");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn refining_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message("refining outreach draft");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn render_error_panel(message: &str) -> String {
    let mut out = String::new();
    line(&mut out, format!("\n{}", "ANALYSIS INTERRUPTED".red().bold()));
    line(&mut out, format!("  {}", message));
    line(&mut out, format!("\n  [{}]etry operation   [{}]ew strategy   [{}]uit", "r".bold(), "n".bold(), "q".bold()));
    out
}

fn line(out: &mut String, s: impl AsRef<str>) {
    out.push_str(s.as_ref());
    out.push('\n');
}

fn section(out: &mut String, n: usize, title: &str) {
    line(out, format!("\n{} {}", format!("{n:>2}.").dimmed(), title.bold().cyan()));
}

fn bullets(out: &mut String, items: &[String]) {
    if items.is_empty() {
        line(out, format!("    {}", "(none)".dimmed()));
    }
    for i in items {
        line(out, format!("    - {}", i));
    }
}

fn field(out: &mut String, label: &str, value: impl AsRef<str>) {
    line(out, format!("    {:<22} {}", format!("{label}:").dimmed(), value.as_ref()));
}

fn joined(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// Lower is friendlier for approval complexity.
fn complexity_badge(level: Level) -> String {
    match level {
        Level::Low => level.as_str().green().to_string(),
        Level::Medium => level.as_str().yellow().to_string(),
        Level::High => level.as_str().red().to_string(),
    }
}

fn readiness_badge(level: Level) -> String {
    match level {
        Level::Low => level.as_str().red().to_string(),
        Level::Medium => level.as_str().yellow().to_string(),
        Level::High => level.as_str().green().to_string(),
    }
}

fn team_badge(status: TeamStatus) -> String {
    match status {
        TeamStatus::None => status.as_str().red().to_string(),
        TeamStatus::Limited => status.as_str().yellow().to_string(),
        TeamStatus::Mature => status.as_str().green().to_string(),
    }
}

fn first_line_preview(text: &str, max: usize) -> String {
    let first = text.trim().lines().next().unwrap_or_default();
    if first.chars().count() > max {
        let cut: String = first.chars().take(max).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}

/// The read-only report. The draft is rendered separately.
pub fn render_report(report: &IcpReport, inputs: &Inputs, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    line(&mut out, format!("\n{}", "═══ IDEAL CUSTOMER PROFILE ═══".bold()));
    line(&mut out, format!("{} {}", "Service:".bold(), report.service_name.bold().yellow()));
    line(
        &mut out,
        format!(
            "{}",
            format!(
                "Market: {}  |  Industry: {}  |  Generated: {}",
                inputs.region,
                inputs.industry,
                generated_at.format("%Y-%m-%d %H:%M UTC")
            )
            .dimmed()
        ),
    );
    line(&mut out, format!("{}", format!("Source: {}", first_line_preview(&inputs.catalog_text, 72)).dimmed()));

    let cp = &report.company_profile;
    section(&mut out, 1, "Target Company Profile");
    field(&mut out, "Type", &cp.kind);
    field(&mut out, "Size", &cp.size);
    field(&mut out, "Geography", &cp.geography);
    field(&mut out, "Industry", &cp.industry);

    let dm = &report.decision_maker;
    section(&mut out, 2, "Decision-Maker Profile");
    field(&mut out, "Primary", joined(&dm.primary));
    field(&mut out, "Secondary", joined(&dm.secondary));
    field(&mut out, "Focus", &dm.role);

    section(&mut out, 3, "Client Pain Points");
    bullets(&mut out, &report.pain_points);
    section(&mut out, 4, "Business Goals");
    bullets(&mut out, &report.business_goals);
    section(&mut out, 5, "Buying Triggers");
    bullets(&mut out, &report.buying_triggers);

    let cr = &report.commercial_readiness;
    section(&mut out, 6, "Budget & Commercial Readiness");
    field(&mut out, "Budget range", &cr.budget_range);
    field(&mut out, "Buying model", &cr.buying_model);
    field(&mut out, "Approval complexity", complexity_badge(cr.approval_complexity));

    let tm = &report.technical_maturity;
    section(&mut out, 7, "Technical Maturity");
    field(&mut out, "Likely stack", joined(&tm.tech_stack));
    field(&mut out, "Internal team", team_badge(tm.team_status));
    field(&mut out, "Data readiness", readiness_badge(tm.data_readiness));

    section(&mut out, 8, "Success Criteria");
    bullets(&mut out, &report.success_criteria);

    section(&mut out, 9, "Objections & Risks");
    line(&mut out, format!("    {}", "Objections".underline()));
    bullets(&mut out, &report.objections_and_risks.common_objections);
    line(&mut out, format!("    {}", "Risk factors".underline()));
    bullets(&mut out, &report.objections_and_risks.risk_factors);

    section(&mut out, 10, "Why This Client Chooses Us");
    line(&mut out, format!("    {}", report.why_us));

    let qc = &report.qualification_checklist;
    section(&mut out, 11, &format!("Deal Qualification Checklist ({}/5)", qc.score()));
    for (label, ok) in qc.items() {
        let mark = if ok { "[x]".green() } else { "[ ]".red() };
        line(&mut out, format!("    {} {}", mark, label));
    }

    section(&mut out, 12, "Ideal Engagement Model");
    line(&mut out, format!("    {}", report.engagement_model));
    section(&mut out, 13, "Red Flags");
    bullets(&mut out, &report.red_flags);
    section(&mut out, 14, "Upsell / Cross-Sell Potential");
    bullets(&mut out, &report.upsell_potential);

    section(&mut out, 15, &format!("Potential Clients ({})", report.potential_clients.len()));
    if report.potential_clients.is_empty() {
        line(&mut out, format!("    {}", "(none)".dimmed()));
    }
    for (i, c) in report.potential_clients.iter().enumerate() {
        line(&mut out, format!("    {}. {} {}", i + 1, c.name.bold(), format!("<{}>", c.website).dimmed()));
        line(&mut out, format!("       {}", c.description));
        let email = if c.contact_email.trim().is_empty() {
            "(no contact email)".red().to_string()
        } else {
            c.contact_email.clone()
        };
        line(&mut out, format!("       {}", email));
    }
    out
}

pub fn render_draft(draft: &OutreachDraft) -> String {
    let mut out = String::new();
    line(&mut out, format!("\n{}", "─── OUTREACH DRAFT ───".bold()));
    line(&mut out, format!("{} {}", "Subject:".bold(), draft.subject));
    line(&mut out, "");
    line(&mut out, &draft.body);
    out
}

pub fn render_complete_menu() -> String {
    format!(
        "\n  [{}]dit subject  edit [{}]ody  re[{}]ine draft  [{}]iew  re[{}]enerate  [{}]son  [{}]ew strategy  [{}]uit",
        "e".bold(),
        "b".bold(),
        "f".bold(),
        "v".bold(),
        "g".bold(),
        "j".bold(),
        "n".bold(),
        "q".bold()
    )
}

/// A panic that escaped the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationFailure {
    pub message: String,
}

/// Run a presentation step, turning a panic into a `PresentationFailure`.
/// State touched by the panicking step is not trusted afterwards; the
/// caller reloads instead of recovering in place.
pub fn guarded<R>(f: impl FnOnce() -> R) -> Result<R, PresentationFailure> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        error!("presentation failure: {message}");
        PresentationFailure { message }
    })
}

pub fn render_crash_notice(failure: &PresentationFailure) -> String {
    let mut out = String::new();
    line(&mut out, format!("\n{}", "Something went wrong".red().bold()));
    line(&mut out, "  The report could not be displayed. Reloading with a fresh session.");
    line(&mut out, format!("  {}", failure.message.dimmed()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::report_json;

    fn plain() {
        colored::control::set_override(false);
    }

    fn report() -> IcpReport {
        serde_json::from_value(report_json("Bangalore, India")).unwrap()
    }

    fn inputs() -> Inputs {
        Inputs::new("We build CRM integrations\nand more", "Bangalore, India", "Enterprise SaaS & Cloud Computing")
            .unwrap()
    }

    #[test]
    fn report_lists_every_section() {
        plain();
        let out = render_report(&report(), &inputs(), Utc::now());
        for heading in [
            "Target Company Profile",
            "Decision-Maker Profile",
            "Budget & Commercial Readiness",
            "Technical Maturity",
            "Deal Qualification Checklist (4/5)",
            "Upsell / Cross-Sell Potential",
            "Potential Clients (1)",
        ] {
            assert!(out.contains(heading), "missing {heading}");
        }
        assert!(out.contains("Bangalore, India"));
        assert!(out.contains("partnerships@freshworks.com"));
        assert!(out.contains("Source: We build CRM integrations"));
        assert!(!out.contains("and more"));
    }

    #[test]
    fn blank_contact_email_is_flagged() {
        plain();
        let mut r = report();
        r.potential_clients[0].contact_email = " ".into();
        let out = render_report(&r, &inputs(), Utc::now());
        assert!(out.contains("(no contact email)"));
    }

    #[test]
    fn draft_and_error_panel() {
        plain();
        let d = OutreachDraft { subject: "Hello".into(), body: "Dear [Client Name],".into() };
        let out = render_draft(&d);
        assert!(out.contains("Subject: Hello"));
        assert!(out.contains("Dear [Client Name],"));
        assert!(render_error_panel("no response from AI").contains("no response from AI"));
    }

    #[test]
    fn preview_is_truncated_on_char_boundary() {
        assert_eq!(first_line_preview("héllo wörld", 5), "héllo...");
        assert_eq!(first_line_preview("\n  short\nrest", 10), "short");
    }

    #[test]
    fn guarded_catches_panics() {
        assert_eq!(guarded(|| 7), Ok(7));
        let failure = guarded(|| -> usize { panic!("layout exploded") }).unwrap_err();
        assert_eq!(failure.message, "layout exploded");
        plain();
        assert!(render_crash_notice(&failure).contains("Something went wrong"));
    }
}
