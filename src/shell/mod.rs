pub mod command;
pub mod display;
pub mod parse;

use crate::shell::{
    command::{execute_command, Command, Session},
    parse::parse_command,
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use log::warn;
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::{io::stdout, path::PathBuf, thread, time::Duration};

const HISTORY_SIZE: usize = 100;

const COMMANDS: [&str; 24] = [
    "help", "ls", "tree", "create", "open", "close", "write", "append", "read", "cat", "rm",
    "stat", "params", "info", "disk", "hex", "bitmap", "block", "handles", "proc", "format",
    "clear", "exit", "quit",
];

pub fn start_shell() {
    boot_banner();

    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());
    // 默认以当前用户名作为进程名
    let mut session = Session::new(whoami::username());

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let mut line_editor = Reedline::create();

    // 历史记录
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".minifs_history");
    match FileBackedHistory::with_file(HISTORY_SIZE, history_path) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => warn!("history disabled: {e}"),
    }

    // 命令补全
    let words = COMMANDS.iter().map(|c| c.to_string()).collect();
    let completer = DefaultCompleter::new_with_wordlen(words, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!(
                "{}@{}",
                session.proc_name.green().bold(),
                hostname.cyan().bold()
            )),
            DefaultPromptSegment::Basic("MiniFS".bright_blue().bold().to_string()),
        );

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut session) {
                            println!("{} [{}] {}", "❌ Error".red().bold(), e.code(), e);
                        }
                        if cmd == Command::Exit {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command or bad arguments. Type 'help' for command list."
                            .yellow()
                    ),
                }
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting MiniFS...".yellow());
                break;
            }
            Ok(_) => {
                println!();
                continue;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
}

/// 启动画面
fn boot_banner() {
    let mut stdout = stdout();

    if let Err(e) = execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0)) {
        warn!("failed to clear screen: {e}");
    }
    println!("{}", "[MiniFS Booting...]".bright_yellow().bold());

    let steps = [
        "🧠 Initializing virtual disk...",
        "⚙️  Mounting file system...",
        "📁 Loading shell...",
    ];
    for step in steps {
        println!("{}", step);
        thread::sleep(Duration::from_millis(200));
    }

    if let Err(e) = execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print(format!("Welcome to MiniFS v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    ) {
        warn!("failed to print banner: {e}");
    }
}
