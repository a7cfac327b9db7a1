use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::commands::{history, receipts};
use crate::services::editor::{ItemField, ReceiptField};
use crate::services::state::AppState;

pub const HELP: &str = "\
Commands:
  show                          print the working receipt
  totals                        piece count, weight totals and payable amount
  set <from|bis|dc|dcdate> TEXT change a header field
  item <sl> <field> TEXT        change a row (desc, qty, cgross, cnet, hgross, hnet, purity, remarks)
  add                           append a blank row
  remove <sl>                   delete a row (the last one always stays)
  save                          save the receipt into history
  new                           start the next receipt
  history                       list saved receipts, newest first
  load <receipt-no|id>          open a saved receipt
  reload                        re-read history from storage
  suggest <desc|purity> [TERM]  list vocabulary entries containing TERM
  print                         write the HTML voucher and open it
  help                          this text
  quit                          leave without saving";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Show,
    Totals,
    Set(ReceiptField, String),
    Item(usize, ItemField, String),
    Add,
    Remove(usize),
    Save,
    New,
    History,
    Load(String),
    Reload,
    Suggest(String, String),
    Print,
    Help,
    Quit,
}

/// Splits off the first whitespace-delimited word.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(at) => (&input[..at], input[at..].trim_start()),
        None => (input, ""),
    }
}

fn parse_sl_no(word: &str) -> Result<usize, String> {
    word.parse::<usize>()
        .map_err(|_| format!("Expected a row number, got '{}'", word))
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let (verb, rest) = next_word(line.trim());
        let rest = rest.trim_end();
        match verb.to_ascii_lowercase().as_str() {
            "show" => Ok(SessionCommand::Show),
            "totals" => Ok(SessionCommand::Totals),
            "set" => {
                let (field, value) = next_word(rest);
                if field.is_empty() {
                    return Err("Usage: set <from|bis|dc|dcdate> TEXT".to_string());
                }
                Ok(SessionCommand::Set(field.parse()?, value.to_string()))
            }
            "item" => {
                let (sl, rest) = next_word(rest);
                let (field, value) = next_word(rest);
                if field.is_empty() {
                    return Err("Usage: item <sl> <field> TEXT".to_string());
                }
                Ok(SessionCommand::Item(
                    parse_sl_no(sl)?,
                    field.parse()?,
                    value.to_string(),
                ))
            }
            "add" => Ok(SessionCommand::Add),
            "remove" => Ok(SessionCommand::Remove(parse_sl_no(rest)?)),
            "save" => Ok(SessionCommand::Save),
            "new" => Ok(SessionCommand::New),
            "history" => Ok(SessionCommand::History),
            "load" if !rest.is_empty() => Ok(SessionCommand::Load(rest.to_string())),
            "load" => Err("Usage: load <receipt-no|id>".to_string()),
            "reload" => Ok(SessionCommand::Reload),
            "suggest" => {
                let (list, term) = next_word(rest);
                Ok(SessionCommand::Suggest(list.to_string(), term.to_string()))
            }
            "print" => Ok(SessionCommand::Print),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            "" => Err(String::new()),
            other => Err(format!("Unknown command '{}'; type help", other)),
        }
    }
}

/// Where the session writes vouchers and whether it opens them.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    pub dir: PathBuf,
    pub open_file: bool,
}

pub fn execute(command: SessionCommand, state: &mut AppState, print: &PrintOptions) -> Result<String, String> {
    debug!(?command, "Session command");
    match command {
        SessionCommand::Show => Ok(receipts::show_receipt(state)),
        SessionCommand::Totals => Ok(receipts::get_totals(state)),
        SessionCommand::Set(field, value) => {
            receipts::update_receipt_field(field, value, state)?;
            Ok(String::new())
        }
        SessionCommand::Item(sl_no, field, value) => {
            receipts::update_item_field(sl_no, field, value, state)?;
            Ok(receipts::get_totals(state))
        }
        SessionCommand::Add => receipts::add_row(state),
        SessionCommand::Remove(sl_no) => receipts::remove_row(sl_no, state),
        SessionCommand::Save => receipts::save_receipt(state),
        SessionCommand::New => receipts::new_receipt(state),
        SessionCommand::History => Ok(history::format_history(&history::get_history(state))),
        SessionCommand::Load(key) => history::load_receipt(key, state),
        SessionCommand::Reload => history::reload_history(state),
        SessionCommand::Suggest(list, term) => {
            let matches = receipts::suggest(&list, &term)?;
            if matches.is_empty() {
                Ok("No matches".to_string())
            } else {
                Ok(matches.join("\n"))
            }
        }
        SessionCommand::Print => receipts::print_receipt(state, &print.dir, print.open_file),
        SessionCommand::Help => Ok(HELP.to_string()),
        SessionCommand::Quit => Ok(String::new()),
    }
}

/// Reads commands line by line until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    state: &mut AppState,
    print: &PrintOptions,
    input: R,
    mut output: W,
) -> std::io::Result<()> {
    writeln!(
        output,
        "Editing {} ({} saved). Type help for commands.",
        state.receipt().receipt_no,
        state.history().len()
    )?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        match SessionCommand::parse(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => match execute(command, state, print) {
                Ok(message) if message.is_empty() => {}
                Ok(message) => writeln!(output, "{}", message)?,
                Err(message) => writeln!(output, "error: {}", message)?,
            },
            Err(message) if message.is_empty() => {}
            Err(message) => writeln!(output, "error: {}", message)?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}
