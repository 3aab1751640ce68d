use anyhow::{bail, Result};
use colored::Colorize;
use tracing::{debug, warn};

use crate::app::App;
use crate::cli::Args;
use crate::dictation::{CatalogBuffer, VoiceInput};
use crate::errors::IcpError;
use crate::market::{self, IndustryChoice, MarketSelection, INDUSTRIES, MARKETS};
use crate::model::{IcpReport, Inputs, OutreachDraft};
use crate::session::Phase;
use crate::ux;

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    /// The presentation layer failed; start over with a fresh session.
    Reload,
}

/// The input form: market, industry and the catalog text being composed.
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub market: MarketSelection,
    pub industry: IndustryChoice,
    pub custom_industry: Option<String>,
    catalog: CatalogBuffer,
}

impl Form {
    pub fn from_args(args: &Args) -> Result<Self, IcpError> {
        let mut form = Form::default();
        form.market.select_country(&args.country)?;
        if let Some(city) = &args.city {
            form.market.select_city(city)?;
        }
        if let Some(industry) = &args.industry {
            form.industry = IndustryChoice::parse(industry)?;
        }
        form.custom_industry = args.custom_industry.clone();
        Ok(form)
    }

    /// Shared handle to the catalog text; dictation appends through it.
    pub fn catalog(&self) -> CatalogBuffer {
        self.catalog.clone()
    }

    pub fn inputs(&self) -> Result<Inputs, IcpError> {
        let industry = market::resolve_industry(&self.industry, self.custom_industry.as_deref())?;
        Inputs::new(self.catalog.text(), self.market.region(), industry)
    }

    fn industry_label(&self) -> String {
        match (&self.industry, self.custom_industry.as_deref().map(str::trim)) {
            (_, Some(c)) if !c.is_empty() => format!("{c} (custom)"),
            (IndustryChoice::Listed(name), _) => (*name).to_string(),
            (IndustryChoice::Other, _) => "Other (describe it)".to_string(),
        }
    }
}

/// The report as exported: the generated profile with the current,
/// possibly edited, outreach draft in place of the template.
pub fn export_json(report: &IcpReport, draft: &OutreachDraft) -> Result<String> {
    let mut out = report.clone();
    out.outreach_template = draft.clone();
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Lines until a lone `.` or EOF, joined with newlines.
fn read_block(prompt: &str) -> Option<String> {
    println!("{}", prompt.dimmed());
    let mut lines = Vec::new();
    loop {
        match ux::prompt_line(">") {
            Some(l) if l.trim() == "." => break,
            Some(l) => lines.push(l),
            None if lines.is_empty() => return None,
            None => break,
        }
    }
    Some(lines.join("\n"))
}

/// Print rendered output behind the presentation boundary.
fn show(render: impl FnOnce() -> String) -> bool {
    match ux::guarded(render) {
        Ok(text) => {
            println!("{text}");
            true
        }
        Err(failure) => {
            println!("{}", ux::render_crash_notice(&failure));
            false
        }
    }
}

enum Flow {
    Continue,
    End(SessionEnd),
}

/// Drive the form and session until the user quits or the view must reload.
pub async fn run_interactive(app: &mut App, form: &mut Form, voice: &mut VoiceInput) -> Result<SessionEnd> {
    loop {
        let flow = match app.phase() {
            Phase::Idle => idle_step(app, form, voice)?,
            Phase::Generating { .. } => {
                let pb = ux::generating_spinner(app.model());
                app.resolve().await;
                pb.finish_and_clear();
                Flow::Continue
            }
            Phase::Complete { .. } => complete_step(app).await?,
            Phase::Error { .. } => error_step(app)?,
        };
        if let Flow::End(end) = flow {
            return Ok(end);
        }
    }
}

fn print_form(form: &Form, voice: &VoiceInput) {
    println!("\n{}", "Strategy Input".bold());
    println!("  {:<16} {}", "Target market:".dimmed(), form.market.region());
    println!("  {:<16} {}", "Industry:".dimmed(), form.industry_label());
    if form.catalog.is_blank() {
        println!("  {:<16} {}", "Catalog:".dimmed(), "(empty)".red());
    } else {
        println!("  {:<16} {} chars", "Catalog:".dimmed(), form.catalog.text().chars().count());
    }
    let mic = if !voice.is_available() {
        "unavailable".dimmed()
    } else if voice.is_listening() {
        "listening".green()
    } else {
        "off".normal()
    };
    println!("  {:<16} {}", "Voice input:".dimmed(), mic);
    println!(
        "\n  [{}]ountry  ci[{}]y  [{}]ndustry  [{}]rite catalog  e[{}]ample  [{}]ic  c[{}]ear  [{}]enerate  [{}]uit",
        "c".bold(),
        "t".bold(),
        "i".bold(),
        "w".bold(),
        "x".bold(),
        "m".bold(),
        "l".bold(),
        "g".bold(),
        "q".bold()
    );
}

fn idle_step(app: &mut App, form: &mut Form, voice: &mut VoiceInput) -> Result<Flow> {
    print_form(form, voice);
    let Some(cmd) = ux::prompt_line("Action:") else {
        return Ok(Flow::End(SessionEnd::Quit));
    };
    match cmd.trim().to_lowercase().as_str() {
        "c" | "country" => {
            let names: Vec<&str> = MARKETS.iter().map(|(c, _)| *c).collect();
            let current = names.iter().position(|c| *c == form.market.country()).unwrap_or(0);
            if let Some(i) = ux::choose("Country", &names, current) {
                form.market.select_country(names[i])?;
            }
        }
        "t" | "city" => {
            let hubs = market::hubs(form.market.country()).unwrap_or(&[]);
            let current = hubs.iter().position(|h| *h == form.market.city()).unwrap_or(0);
            if let Some(i) = ux::choose("City / hub", hubs, current) {
                form.market.select_city(hubs[i])?;
            }
        }
        "i" | "industry" => {
            let mut names: Vec<&str> = INDUSTRIES.to_vec();
            names.push("Other");
            let current = match &form.industry {
                IndustryChoice::Listed(n) => names.iter().position(|x| x == n).unwrap_or(0),
                IndustryChoice::Other => names.len() - 1,
            };
            if let Some(i) = ux::choose("Industry", &names, current) {
                form.industry = IndustryChoice::parse(names[i])?;
                form.custom_industry = None;
                if form.industry == IndustryChoice::Other {
                    form.custom_industry = ux::prompt_line("Describe the industry:");
                }
            }
        }
        "w" | "write" => {
            if let Some(text) = read_block("Describe your services. End with a line containing only '.'") {
                form.catalog.append_line(&text);
            }
        }
        "x" | "example" => {
            form.catalog.set(market::EXAMPLE_CATALOG);
            println!("{}", "Loaded the example catalog.".dimmed());
        }
        "m" | "mic" => match voice.toggle() {
            Ok(true) => println!("{}", "Listening... speak to append to the catalog.".green()),
            Ok(false) => println!("{}", "Stopped listening.".dimmed()),
            Err(e) => println!("{}", e.to_string().yellow()),
        },
        "l" | "clear" => form.catalog.clear(),
        "g" | "generate" => match form.inputs() {
            Ok(inputs) => {
                voice.stop();
                app.submit(inputs)?;
            }
            Err(e) => println!("{}", e.to_string().red()),
        },
        "q" | "quit" => return Ok(Flow::End(SessionEnd::Quit)),
        "" => {}
        other => println!("{}", format!("unknown action: {other}").red()),
    }
    Ok(Flow::Continue)
}

async fn complete_step(app: &mut App) -> Result<Flow> {
    let shown = {
        let session = app.session();
        match session.phase() {
            Phase::Complete { inputs, report, draft, generated_at } => show(|| {
                let mut out = ux::render_report(report, inputs, *generated_at);
                out.push_str(&ux::render_draft(draft));
                out
            }),
            _ => return Ok(Flow::Continue),
        }
    };
    if !shown {
        return Ok(Flow::End(SessionEnd::Reload));
    }

    loop {
        println!("{}", ux::render_complete_menu());
        let Some(cmd) = ux::prompt_line("Action:") else {
            return Ok(Flow::End(SessionEnd::Quit));
        };
        match cmd.trim().to_lowercase().as_str() {
            "e" => {
                if let Some(subject) = ux::prompt_line("New subject:") {
                    app.edit_draft(Some(subject), None)?;
                    print_draft(app);
                }
            }
            "b" => {
                if let Some(body) = read_block("New body. End with a line containing only '.'") {
                    app.edit_draft(None, Some(body))?;
                    print_draft(app);
                }
            }
            "f" => {
                let Some(feedback) = ux::prompt_line("How should the draft change?") else {
                    continue;
                };
                if feedback.trim().is_empty() {
                    continue;
                }
                let pb = ux::refining_spinner();
                let outcome = app.refine(&feedback).await.cloned();
                pb.finish_and_clear();
                match outcome {
                    Ok(draft) => {
                        if !show(|| ux::render_draft(&draft)) {
                            return Ok(Flow::End(SessionEnd::Reload));
                        }
                    }
                    Err(e) => {
                        warn!("refine failed: {e}");
                        println!("{}", format!("Could not refine the draft: {e}").red());
                    }
                }
            }
            "g" => {
                app.retry()?;
                return Ok(Flow::Continue);
            }
            "j" => {
                if let (Some(report), Some(draft)) = (app.session().report(), app.session().draft()) {
                    println!("{}", export_json(report, draft)?);
                }
            }
            "v" => return Ok(Flow::Continue),
            "n" => {
                if ux::confirm("Discard this report and start a new strategy?") {
                    app.reset()?;
                    return Ok(Flow::Continue);
                }
            }
            "q" => return Ok(Flow::End(SessionEnd::Quit)),
            "" => {}
            other => println!("{}", format!("unknown action: {other}").red()),
        }
    }
}

fn print_draft(app: &App) {
    if let Some(draft) = app.session().draft() {
        println!("{}", ux::render_draft(draft));
    }
}

fn error_step(app: &mut App) -> Result<Flow> {
    let message = app.session().error_message().unwrap_or_default().to_string();
    if !show(|| ux::render_error_panel(&message)) {
        return Ok(Flow::End(SessionEnd::Reload));
    }
    loop {
        let Some(cmd) = ux::prompt_line("Action:") else {
            return Ok(Flow::End(SessionEnd::Quit));
        };
        match cmd.trim().to_lowercase().as_str() {
            "r" | "retry" => {
                app.retry()?;
                return Ok(Flow::Continue);
            }
            "n" | "new" => {
                app.reset()?;
                return Ok(Flow::Continue);
            }
            "q" | "quit" => return Ok(Flow::End(SessionEnd::Quit)),
            _ => println!("{}", "Choose r, n or q.".red()),
        }
    }
}

/// Generate once from the form and print the report (or JSON). A failed
/// generation is returned as an error so the process exits non-zero.
pub async fn run_once(app: &mut App, form: &Form, json: bool) -> Result<()> {
    let inputs = form.inputs()?;
    debug!(region = %inputs.region, industry = %inputs.industry, "one-shot generation");
    let pb = (!json).then(|| ux::generating_spinner(app.model()));
    let phase = app.generate(inputs).await?;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    match phase {
        Phase::Complete { inputs, report, draft, generated_at } => {
            if json {
                println!("{}", export_json(report, draft)?);
            } else {
                let text = ux::guarded(|| {
                    let mut out = ux::render_report(report, inputs, *generated_at);
                    out.push_str(&ux::render_draft(draft));
                    out
                })
                .map_err(|f| anyhow::anyhow!("could not render the report: {}", f.message))?;
                println!("{text}");
            }
            Ok(())
        }
        Phase::Error { message, .. } => bail!("{message}"),
        other => bail!("generation ended while {}", other.name()),
    }
}
