//! Line-driven interactive session: each input line is one user event.

use std::io::{self, BufRead, Write};

use crate::page::Page;
use crate::providers::ProviderApi;
use crate::widget::Widget;

pub const PROMPT: &str = "city> ";
const HELP: &str = "Type a city name to search, :unit to toggle C/F, :html to print the page as HTML, :quit to exit.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    ToggleUnit,
    Html,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":unit" | ":u" => Self::ToggleUnit,
            ":html" => Self::Html,
            ":help" | ":h" | "?" => Self::Help,
            ":quit" | ":q" | ":exit" => Self::Quit,
            _ => Self::Search(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Runs until `:quit` or end of input. Searches run one at a time, so a new
/// event is only read after the previous search has finished rendering.
pub fn run_session<P, R, W>(
    widget: &mut Widget,
    providers: &P,
    input: R,
    output: &mut W,
) -> io::Result<Page>
where
    P: ProviderApi,
    R: BufRead,
    W: Write,
{
    let mut page = Page::new();
    writeln!(output, "{HELP}")?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let command = SessionCommand::parse(&line?);
        tracing::debug!(?command, "session command");

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => writeln!(output, "{HELP}")?,
            SessionCommand::Html => write!(output, "{}", page.to_html())?,
            SessionCommand::Search(city) => {
                widget.set_city_input(city);
                if let Err(error) = widget.search(providers, &mut page) {
                    tracing::debug!(%error, "search reported as notice");
                }
                write_page(output, &mut page)?;
            }
            SessionCommand::ToggleUnit => {
                if let Err(error) = widget.toggle_unit(providers, &mut page) {
                    tracing::debug!(%error, "unit toggle search reported as notice");
                }
                writeln!(output, "unit: {}", widget.unit().as_str())?;
                write_page(output, &mut page)?;
            }
        }

        write!(output, "{PROMPT}")?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(page)
}

fn write_page<W: Write>(output: &mut W, page: &mut Page) -> io::Result<()> {
    for notice in page.take_notices() {
        writeln!(output, "! {notice}")?;
    }
    let text = page.to_text();
    if !text.is_empty() {
        writeln!(output, "{text}")?;
    }
    Ok(())
}
