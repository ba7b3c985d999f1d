use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::error::Error;

use crate::fs::{FileSystem, Listing};

#[derive(Debug)]
pub enum Command {
    Help,
    List { json: bool },
    Create(String, usize),
    Write(String, usize, String),
    Read(String, usize, usize),
    Delete(String),
    Stat(String),
    Check,
    Exit,
}

pub fn execute_command(cmd: &Command, fs: &mut FileSystem) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::List { json } => {
            let listing = fs.list();
            if *json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print_listing(&listing)?;
            }
        }
        Command::Create(name, size) => {
            let created = fs.create(name, *size)?;
            println!(
                "📝 Created file: {} ({} bytes, {} blocks)",
                created.name.green(),
                created.size,
                created.blocks.len()
            );
        }
        Command::Write(name, offset, content) => {
            let written = fs.write(name, *offset, content.as_bytes())?;
            println!(
                "✏️  Wrote {} bytes to {} (offset {})",
                written,
                name.cyan(),
                offset
            );
        }
        Command::Read(name, offset, len) => {
            let out = fs.read(name, *offset, *len)?;
            if out.is_truncated() {
                println!(
                    "{}",
                    format!(
                        "⚠️  Reached end of file: read {} bytes instead of {}",
                        out.len(),
                        out.requested
                    )
                    .yellow()
                );
            }
            println!(
                "📖 {} bytes from {} (offset {})",
                out.len(),
                name.cyan(),
                offset
            );
            println!("{} \"{}\"", "Output:".green(), String::from_utf8_lossy(&out.data));
        }
        Command::Delete(name) => {
            let deleted = fs.delete(name)?;
            println!(
                "❌ Deleted file: {} ({} blocks freed)",
                deleted.name.red(),
                deleted.freed_blocks.len()
            );
        }
        Command::Stat(name) => {
            let info = fs.stat(name)?;
            println!(
                "{}\n{}: {}\n{}: {} bytes\n{}: {:?}\n{}: {}\n{}: {}\n",
                "📊 File Info".bright_yellow().bold(),
                "Name".blue(),
                info.name,
                "Size".blue(),
                info.size,
                "Blocks".blue(),
                info.blocks,
                "Created".blue(),
                info.created_at.format("%Y-%m-%d %H:%M:%S"),
                "Modified".blue(),
                info.modified_at.format("%Y-%m-%d %H:%M:%S"),
            );
        }
        Command::Check => {
            fs.check()?;
            println!("{}", "✅ Block accounting is consistent".green());
        }
        Command::Exit => println!("{}", "👋 Exiting block-fs shell...".yellow().bold()),
    }

    Ok(())
}

fn print_listing(listing: &Listing) -> Result<(), Box<dyn Error>> {
    let stats = &listing.stats;
    if listing.entries.is_empty() {
        println!("{}", "(no files)".bright_black());
    } else {
        println!("{}", "-".repeat(44));
        println!("{:<30} {:>13}", "Name".bold(), "Size (bytes)".bold());
        println!("{}", "-".repeat(44));
        for entry in &listing.entries {
            println!("{:<30} {:>13}", entry.name, entry.size);
        }
        println!("{}", "-".repeat(44));
    }
    println!(
        "Total: {} file(s), {} bytes, {} blocks used",
        stats.file_count, stats.total_bytes, stats.used_blocks
    );

    // 块占用条
    let pb = ProgressBar::with_draw_target(
        Some(stats.total_blocks as u64),
        ProgressDrawTarget::stdout(),
    );
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} blocks")?
            .progress_chars("#>-"),
    );
    pb.set_position(stats.used_blocks as u64);
    pb.abandon();
    Ok(())
}

fn print_help() {
    println!("{}", "📘 block-fs Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  create <file> <size>            Create a file with a fixed size in bytes
  write <file> <offset> \"<data>\"  Write data at offset
  read <file> <offset> <len>      Read len bytes from offset
  delete <file>                   Delete a file and free its blocks
  list [--json]                   List files and block usage
  stat <file>                     Show file info and owned blocks
  check                           Verify block accounting
  help                            Show this help message
  exit                            Quit the shell
"
        .bright_black()
    );
}
