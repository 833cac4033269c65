use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use log::warn;
use minifs::{FileSystem, FileSystemError, OpenMode};
use std::io::stdout;

use crate::shell::display;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Ls,
    Create(String),
    Open(String, OpenMode),
    Close(String),
    Write(String, String),
    Append(String, String),
    Read(String, usize),
    Cat(String),
    Rm(String),
    Stat(String),
    Params,
    Info,
    Disk,
    Hex,
    Bitmap,
    Block(usize),
    Handles,
    Proc(Option<String>),
    Format,
    Clear,
    Exit,
}

/// 一次 shell 会话：文件系统 + 当前进程名
pub struct Session {
    pub fs: FileSystem,
    pub proc_name: String,
}

impl Session {
    pub fn new(proc_name: impl Into<String>) -> Self {
        Self {
            fs: FileSystem::new(),
            proc_name: proc_name.into(),
        }
    }
}

fn mode_name(mode: OpenMode) -> &'static str {
    if mode == OpenMode::READ_WRITE {
        "read/write"
    } else if mode.contains(OpenMode::WRITE) {
        "write"
    } else {
        "read"
    }
}

pub fn execute_command(cmd: &Command, session: &mut Session) -> Result<(), FileSystemError> {
    let fs = &mut session.fs;
    let proc_name = session.proc_name.as_str();

    match cmd {
        Command::Help => print_help(),
        Command::Ls => {
            let names = fs.list_files();
            let sizes: Vec<usize> = names
                .iter()
                .map(|name| fs.file_info(name).map_or(0, |info| info.real_size))
                .collect();
            print!("{}", display::tree(&names, &sizes).cyan());
        }
        Command::Create(name) => {
            fs.create(name, proc_name)?;
            println!("📝 Created file: {} (opened read/write)", name.green());
        }
        Command::Open(name, mode) => {
            fs.open(name, proc_name, *mode)?;
            println!("📂 Opened {} for {}", name.cyan(), mode_name(*mode));
        }
        Command::Close(name) => {
            fs.close(name, proc_name)?;
            println!("📕 Closed {}", name.cyan());
        }
        Command::Write(name, text) => {
            fs.write(name, proc_name, text)?;
            println!("✏️  Wrote {} byte(s) to {}", text.len(), name.cyan());
        }
        Command::Append(name, text) => {
            fs.append(name, proc_name, text)?;
            println!("✏️  Appended {} byte(s) to {}", text.len(), name.cyan());
        }
        Command::Read(name, n) => {
            let data = fs.read(name, proc_name, *n)?;
            println!("{}", String::from_utf8_lossy(&data));
        }
        Command::Cat(name) => {
            let data = fs.read_all(name, proc_name)?;
            println!("{}", String::from_utf8_lossy(&data));
        }
        Command::Rm(name) => {
            fs.delete(name, proc_name)?;
            println!("❌ Deleted file: {}", name.red());
        }
        Command::Stat(name) => {
            let info = fs.file_info(name)?;
            println!("{}", "📊 File Info".bright_yellow().bold());
            print!("{}", display::file_info(&info));
            print!(
                "{}",
                display::open_state(fs.accessing_proc_count(name), fs.is_opened_for_write(name))
            );
        }
        Command::Params => {
            println!("{}", "⚙️  Parameters".bright_yellow().bold());
            print!("{}", display::params(&fs.super_block()));
        }
        Command::Info => {
            println!("{}", "💾 Usage".bright_yellow().bold());
            print!("{}", display::usage(&fs.super_block(), &fs.directory_info()));
        }
        Command::Disk => print!("{}", display::char_dump(fs.disk_bytes())),
        Command::Hex => print!("{}", display::hex_dump(fs.disk_bytes()).bright_black()),
        Command::Bitmap => println!("{}", display::bitmap(&fs.bitmap_bits())),
        Command::Block(id) => match fs.block_bytes(*id) {
            Some(bytes) => {
                print!("{}", display::char_dump(bytes));
                print!("{}", display::hex_dump(bytes).bright_black());
            }
            None => println!("{}", format!("⚠️  No block {id}").yellow()),
        },
        Command::Handles => {
            let handles = fs.open_handles();
            if handles.is_empty() {
                println!("{}", "(no open files)".bright_black());
            } else {
                print!("{}", display::handles(&handles));
            }
        }
        Command::Proc(None) => println!("👤 Current process: {}", proc_name.green()),
        Command::Proc(Some(name)) => {
            session.proc_name = name.clone();
            println!("👤 Switched to process: {}", name.green());
        }
        Command::Format => {
            fs.format();
            println!("💾 Disk formatted successfully!");
        }
        Command::Clear => {
            if let Err(e) = execute!(stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0)) {
                warn!("failed to clear screen: {e}");
            }
        }
        Command::Exit => println!("{}", "👋 Exiting MiniFS shell...".yellow().bold()),
    }

    Ok(())
}

fn print_help() {
    println!("{}", "📘 MiniFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  ls | tree              List files
  create <file>          Create file and open it read/write
  open <file> <r|w|rw>   Open file for the current process
  close <file>           Close file
  write <file> <text>    Replace file content
  append <file> <text>   Append to file
  read <file> <n>        Read n bytes from the cursor
  cat <file>             Read whole file
  rm <file>              Delete file (must be closed everywhere)
  stat <file>            Show inode and block layout
  params                 Show file system parameters
  info                   Show disk usage
  disk | hex             Dump disk as text or hex
  bitmap                 Show block bitmap
  block <n>              Dump a single block
  handles                List open handles
  proc [name]            Show or switch current process
  format                 Wipe the disk
  clear                  Clear the screen
  help                   Show this help message
  exit                   Quit the shell
"
        .bright_black()
    );
}
