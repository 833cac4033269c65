//! 把查询结果格式化成文本，颜色由调用方添加

use minifs::{
    disk::BLOCK_SIZE,
    fs::{
        query::{DirectoryInfo, FileInfo, HandleInfo},
        super_block::SuperBlock,
    },
    OpenMode,
};

/// 不可打印字符显示为 '.'
fn printable(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        char::from(byte)
    } else {
        '.'
    }
}

fn block_ref(block: Option<usize>) -> String {
    block.map_or_else(|| "-".to_string(), |b| b.to_string())
}

/// 根目录树，`sizes` 与 `names` 一一对应
pub fn tree(names: &[&str], sizes: &[usize]) -> String {
    let mut out = String::from("/\n");
    for (i, (name, size)) in names.iter().zip(sizes).enumerate() {
        let branch = if i + 1 == names.len() { "└──" } else { "├──" };
        out.push_str(&format!("{branch} {name} ({size} B)\n"));
    }
    out
}

pub fn params(sb: &SuperBlock) -> String {
    [
        format!("fs type          {}", sb.fs_type),
        format!("disk capacity    {} B", sb.disk_capacity),
        format!("block size       {} B", sb.block_size),
        format!("blocks           {}", sb.total_blocks),
        format!("direct pointers  {}", sb.direct_blocks),
        format!("indirect slots   {}", sb.indirect_slots),
        format!("max data size    {} B", sb.max_data_size),
        format!("max file size    {} B", sb.max_file_size),
        format!("inodes           {}", sb.total_inodes),
    ]
    .map(|line| line + "\n")
    .concat()
}

/// 磁盘与目录的使用情况
pub fn usage(sb: &SuperBlock, dir: &DirectoryInfo) -> String {
    format!(
        "blocks   {}/{} used, {} B free\n\
         inodes   {}/{} used\n\
         files    {} ({} B data, {} B on disk)\n",
        sb.used_blocks(),
        sb.total_blocks,
        sb.free_space,
        sb.total_inodes - sb.free_inodes,
        sb.total_inodes,
        dir.file_count,
        dir.data_size,
        dir.size_on_disk
    )
}

/// 每行一个块：块号 | 字符
pub fn char_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(BLOCK_SIZE)
        .enumerate()
        .map(|(id, block)| {
            let line: String = block.iter().copied().map(printable).collect();
            format!("{id:>2} | {line}\n")
        })
        .collect()
}

/// 每行一个块：块号 | 十六进制
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(BLOCK_SIZE)
        .enumerate()
        .map(|(id, block)| {
            let line: String = block.iter().map(|byte| format!(" {byte:02x}")).collect();
            format!("{id:>2} |{line}\n")
        })
        .collect()
}

/// 8 个一组，1 表示占用
pub fn bitmap(bits: &[bool]) -> String {
    bits.chunks(8)
        .map(|group| group.iter().map(|&used| if used { '1' } else { '0' }).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn file_info(info: &FileInfo) -> String {
    let direct: Vec<String> = info.direct_blocks.iter().map(|&b| block_ref(b)).collect();

    let mut out = format!(
        "name        {}\n\
         inode       {}\n\
         size        {} B ({} B on disk)\n\
         created     {}\n\
         modified    {}\n\
         direct      [{}]\n\
         indirect    {}\n",
        info.name,
        info.inode_id,
        info.real_size,
        info.size_on_disk,
        info.creation_time,
        info.modification_time,
        direct.join(", "),
        block_ref(info.indirect_block)
    );
    if let Some(entries) = &info.indirect_entries {
        let used: Vec<String> = entries.iter().flatten().map(ToString::to_string).collect();
        out.push_str(&format!("  entries   [{}]\n", used.join(", ")));
    }
    out.push_str(&format!("data        {}\n", String::from_utf8_lossy(&info.data)));
    out
}

/// 打开该文件的进程数，以及是否有进程持有写权限
pub fn open_state(proc_count: usize, has_writer: bool) -> String {
    match (proc_count, has_writer) {
        (0, _) => "opened      no\n".to_string(),
        (n, true) => format!("opened      by {n} process(es), writable\n"),
        (n, false) => format!("opened      by {n} process(es), read only\n"),
    }
}

pub fn handles(handles: &[HandleInfo<'_>]) -> String {
    handles
        .iter()
        .map(|h| {
            let mode = match (h.mode.contains(OpenMode::READ), h.mode.contains(OpenMode::WRITE)) {
                (true, true) => "rw",
                (true, false) => "r",
                (false, true) => "w",
                (false, false) => "-",
            };
            format!("{:<12} {:<12} {:<2} @{}\n", h.file_name, h.proc_name, mode, h.read_pos)
        })
        .collect()
}
