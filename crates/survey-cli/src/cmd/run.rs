use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use survey_form::{
    NoLocation, Page, PageBody, ScrollPolicy, SessionServices, SessionSettings, StepOutcome,
    SubmitOutcome, SurveySession, UploadedFile,
};
use survey_spec::{AnswerSet, SurveyDocument};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Survey schema document (JSON)
    pub schema: PathBuf,
    /// Write the submission here instead of stdout
    #[arg(long, value_name = "answers.json")]
    pub out: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.schema)
        .with_context(|| format!("failed to read schema {}", args.schema.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("schema {} must be valid JSON", args.schema.display()))?;
    let document = SurveyDocument::parse(&value);
    if document.survey.children.is_empty() {
        bail!("schema {} contains no questions", args.schema.display());
    }

    let mut session = SurveySession::start(
        document,
        SessionServices {
            settings: SessionSettings::default(),
            location: Box::new(NoLocation),
            recorder: None,
            capture: None,
        },
    );

    let answer_set = drive(&mut session)?;
    let payload = answer_set.to_json_pretty()?;
    match &args.out {
        Some(path) => {
            fs::write(path, payload)
                .with_context(|| format!("failed to write answers {}", path.display()))?;
            println!("answers written to {}", path.display());
        }
        None => println!("{payload}"),
    }
    Ok(())
}

fn drive(session: &mut SurveySession) -> Result<AnswerSet> {
    loop {
        show_page(session)?;
        answer_page(session)?;

        let buttons = session.buttons();
        if buttons.submit_visible {
            if prompt_yes_no("Submit now?", true)? {
                match submit(session)? {
                    Some(answer_set) => return Ok(answer_set),
                    None => continue,
                }
            }
            if buttons.prev_enabled && prompt_yes_no("Go back?", false)? {
                session.previous();
            }
            continue;
        }

        let choice = prompt_line("[Enter] next, [p] previous", Some(""))?;
        if choice.eq_ignore_ascii_case("p") {
            session.previous();
            continue;
        }
        match session.next() {
            StepOutcome::Moved(_) => {}
            StepOutcome::Blocked(reason) => println!("cannot continue: {reason}"),
            StepOutcome::Finished(outcome) => {
                if let Some(answer_set) = handle_submit_outcome(session, outcome)? {
                    return Ok(answer_set);
                }
            }
        }
    }
}

fn submit(session: &mut SurveySession) -> Result<Option<AnswerSet>> {
    let outcome = session.submit();
    handle_submit_outcome(session, outcome)
}

/// Finishes a submission. With no upload service attached, pending
/// uploads are acknowledged locally using the file name as its id.
fn handle_submit_outcome(
    session: &mut SurveySession,
    outcome: SubmitOutcome,
) -> Result<Option<AnswerSet>> {
    match outcome {
        SubmitOutcome::Submitted(answer_set) => Ok(Some(answer_set)),
        SubmitOutcome::Blocked(reason) => {
            println!("cannot submit: {reason}");
            Ok(None)
        }
        SubmitOutcome::Deferred => {
            let requests = session.take_upload_requests();
            let mut finished = None;
            for request in requests {
                let name = request
                    .path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                finished = session.on_upload_result(
                    request.job,
                    Ok(UploadedFile {
                        file_id: name.clone(),
                        original_name: name,
                    }),
                );
            }
            match finished {
                Some(answer_set) => Ok(Some(answer_set)),
                None => bail!("submission deferred but no uploads were pending"),
            }
        }
    }
}

/// Rows the page body may use before the terminal is assumed to scroll.
const VIEWPORT_ROWS: usize = 24;

fn show_page(session: &mut SurveySession) -> Result<()> {
    let progress = session.progress();
    let Some(page) = session.page() else {
        bail!("survey has no visible questions");
    };
    println!();
    println!(
        "[{}/{}] ({}%) {}{}",
        progress.position,
        progress.total,
        progress.percent,
        page.title,
        if page.required { " *" } else { "" }
    );
    if !page.description.is_empty() {
        println!("{}", page.description);
    }
    if session.layout_pending() && session.measure(VIEWPORT_ROWS) == ScrollPolicy::AsNeeded {
        println!("(long question, more lines follow below)");
    }
    Ok(())
}

fn answer_page(session: &mut SurveySession) -> Result<()> {
    let Some(snapshot) = session.page().cloned() else {
        return Ok(());
    };
    match &snapshot.body {
        PageBody::TextInput { text, .. } => {
            let input = prompt_line("Answer", Some(text))?;
            if let Some(page) = session.page_mut() {
                page.set_text(&input);
            }
        }
        PageBody::Choices { multiple, rows } => {
            answer_choices(session, &snapshot, *multiple, rows.len())?;
        }
        PageBody::Select { items, selected } => {
            for (index, item) in items.iter().enumerate() {
                let mark = if *selected == index + 1 { '>' } else { ' ' };
                println!(" {mark} {}. {}", index + 1, item.label);
            }
            let input = prompt_line("Choice number (0 for none)", Some(""))?;
            if let Ok(index) = input.parse::<usize>()
                && let Some(page) = session.page_mut()
            {
                page.select_index(index);
            }
        }
        PageBody::Blanks { fields } => {
            for field in fields {
                let input = prompt_line(&field.label, Some(&field.text))?;
                if let Some(page) = session.page_mut() {
                    page.set_blank(&field.sub_id, &input);
                }
            }
        }
        PageBody::Slider { value } => {
            let input = prompt_line("Score (0-10)", Some(&value.to_string()))?;
            if let Ok(score) = input.parse::<i64>()
                && let Some(page) = session.page_mut()
            {
                page.set_slider(score);
            }
        }
        PageBody::Upload { files } => {
            for file in files {
                println!("  attached: {file}");
            }
            loop {
                let input = prompt_line("File path (empty to finish)", Some(""))?;
                if input.is_empty() {
                    break;
                }
                match session.attach_file(PathBuf::from(&input)) {
                    Some(_) => println!("  queued: {input}"),
                    None => break,
                }
            }
        }
        PageBody::Passive => {
            println!("(no input needed here)");
        }
    }
    Ok(())
}

fn answer_choices(
    session: &mut SurveySession,
    snapshot: &Page,
    multiple: bool,
    row_count: usize,
) -> Result<()> {
    loop {
        let Some(PageBody::Choices { rows, .. }) = session.page().map(|page| &page.body) else {
            return Ok(());
        };
        for (index, row) in rows.iter().enumerate() {
            let mark = if row.checked { 'x' } else { ' ' };
            println!(" [{mark}] {}. {}", index + 1, row.label);
        }
        let hint = if multiple {
            "Toggle number (empty to finish)"
        } else {
            "Choice number (empty to finish)"
        };
        let input = prompt_line(hint, Some(""))?;
        if input.is_empty() {
            return Ok(());
        }
        let Ok(number) = input.parse::<usize>() else {
            println!("enter a number between 1 and {row_count}");
            continue;
        };
        if number == 0 || number > row_count {
            println!("enter a number between 1 and {row_count}");
            continue;
        }
        let PageBody::Choices { rows, .. } = &snapshot.body else {
            return Ok(());
        };
        let row = &rows[number - 1];
        let option_id = row.option_id.clone();
        let was_checked = session
            .page()
            .and_then(|page| match &page.body {
                PageBody::Choices { rows, .. } => rows.get(number - 1).map(|row| row.checked),
                _ => None,
            })
            .unwrap_or(false);
        let check = if multiple { !was_checked } else { true };
        if let Some(page) = session.page_mut() {
            page.toggle_option(&option_id, check);
        }
        if check && row.inline.is_some() {
            let text = prompt_line("Please specify", Some(""))?;
            if let Some(page) = session.page_mut() {
                page.set_inline_text(&option_id, &text);
            }
        }
        if !multiple {
            return Ok(());
        }
    }
}

fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some("") | None => print!("{label}: "),
        Some(value) => print!("{label} [{value}]: "),
    }
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        bail!("stdin closed");
    }
    let trimmed = input.trim();
    if trimmed.is_empty()
        && let Some(value) = default
        && !value.is_empty()
    {
        return Ok(value.to_string());
    }
    Ok(trimmed.to_string())
}

fn prompt_yes_no(prompt: &str, default_yes: bool) -> Result<bool> {
    let suffix = if default_yes { "[Y/n]" } else { "[y/N]" };
    loop {
        print!("{prompt} {suffix}: ");
        io::stdout().flush()?;
        let mut line = String::new();
        let read = io::stdin().read_line(&mut line)?;
        if read == 0 {
            bail!("stdin closed");
        }
        let token = line.trim().to_ascii_lowercase();
        if token.is_empty() {
            return Ok(default_yes);
        }
        match token.as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("please answer y or n"),
        }
    }
}
