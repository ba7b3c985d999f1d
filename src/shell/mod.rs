pub mod command;
pub mod parse;

use crate::{
    fs::{config::FsConfig, FileSystem},
    shell::{command::execute_command, parse::parse_command},
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::{error::Error, io::stdout, path::PathBuf};
use tracing::warn;

const HISTORY_FILE: &str = ".blockfs_history";
const HISTORY_SIZE: usize = 100;

pub fn start_shell(mut fs: FileSystem) -> Result<(), Box<dyn Error>> {
    print_banner(fs.config())?;

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HISTORY_FILE);

    let mut line_editor = Reedline::create();
    match FileBackedHistory::with_file(HISTORY_SIZE, history_path.clone()) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => warn!(path = %history_path.display(), error = %e, "history disabled"),
    }

    // 命令补全
    let commands = vec![
        "help", "create", "write", "read", "delete", "rm", "list", "ls", "stat", "check", "exit",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    let completer = DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(format!(
            "{}@{}",
            username.green().bold(),
            hostname.cyan().bold()
        )),
        DefaultPromptSegment::Basic("block-fs".bright_blue().bold().to_string()),
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut fs) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                        if matches!(cmd, command::Command::Exit) {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown or malformed command. Type 'help' for command list.".yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting block-fs...".yellow());
                break;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
    Ok(())
}

fn print_banner(config: &FsConfig) -> Result<(), Box<dyn Error>> {
    let mut stdout = stdout();
    execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("block-fs v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    )?;

    println!("  - Block size:     {} bytes", config.block_size);
    println!("  - Max files:      {}", config.max_files);
    println!(
        "  - Storage:        {} bytes ({} KB)",
        config.capacity_bytes(),
        config.capacity_bytes() / 1024
    );
    println!("  - Total blocks:   {}\n", config.total_blocks);
    Ok(())
}
