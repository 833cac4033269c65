use minifs::OpenMode;

use crate::shell::command::Command;

/// 解析访问模式：r / w / rw
fn parse_mode(mode: &str) -> Option<OpenMode> {
    match mode {
        "r" => Some(OpenMode::READ),
        "w" => Some(OpenMode::WRITE),
        "rw" | "wr" => Some(OpenMode::READ_WRITE),
        _ => None,
    }
}

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    let (&cmd, args) = tokens.split_first()?;

    let name = || args.first().map(|name| name.to_string());
    // 文件名之后的所有内容作为数据，保留单个空格分隔
    let text = || args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();

    match cmd {
        "help" => Some(Command::Help),
        "ls" | "tree" => Some(Command::Ls),
        "create" => name().map(Command::Create),
        "open" => {
            let mode = parse_mode(args.get(1)?)?;
            name().map(|name| Command::Open(name, mode))
        }
        "close" => name().map(Command::Close),
        "write" => name().map(|name| Command::Write(name, text())),
        "append" => name().map(|name| Command::Append(name, text())),
        "read" => {
            let n = args.get(1)?.parse().ok()?;
            name().map(|name| Command::Read(name, n))
        }
        "cat" => name().map(Command::Cat),
        "rm" => name().map(Command::Rm),
        "stat" => name().map(Command::Stat),
        "params" => Some(Command::Params),
        "info" => Some(Command::Info),
        "disk" => Some(Command::Disk),
        "hex" => Some(Command::Hex),
        "bitmap" => Some(Command::Bitmap),
        "block" => args.first()?.parse().ok().map(Command::Block),
        "handles" => Some(Command::Handles),
        "proc" => Some(Command::Proc(name())),
        "format" => Some(Command::Format),
        "clear" => Some(Command::Clear),
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}
