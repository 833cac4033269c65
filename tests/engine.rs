use minifs::{
    disk::{index_codec, BLOCK_COUNT, BLOCK_SIZE, INDIRECT_SLOTS},
    fs::config::{INODE_NUMBER_LIMIT, MAX_DATA_SIZE},
    FileSystem, FileSystemError, OpenMode,
};
use test_log::test;

fn text(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'a' + (i % 26) as u8).collect()
}

/// 位图、超级块、空闲字节数三者一致
fn assert_accounting(fs: &FileSystem) {
    let free_bits = fs.bitmap_bits().iter().filter(|used| !**used).count();
    let sb = fs.super_block();
    assert_eq!(sb.free_blocks, free_bits);
    assert_eq!(sb.free_space, free_bits * BLOCK_SIZE);
    assert_eq!(fs.free_space(), sb.free_space);
}

#[test]
fn create_write_read_back() {
    let mut fs = FileSystem::new();
    fs.create("hello.txt", "shell").unwrap();
    fs.write("hello.txt", "shell", "Hello world").unwrap();

    assert_eq!(fs.read_all("hello.txt", "shell").unwrap(), b"Hello world");
    assert!(fs.exists("hello.txt"));
    assert_eq!(fs.free_space(), (BLOCK_COUNT - 1) * BLOCK_SIZE);
}

#[test]
fn cursor_reads_continue_until_end() {
    let mut fs = FileSystem::new();
    fs.create("f", "p").unwrap();
    let data = text(100);
    fs.write("f", "p", &data).unwrap();

    assert_eq!(fs.read("f", "p", 40).unwrap(), &data[..40]);
    assert_eq!(fs.read("f", "p", 40).unwrap(), &data[40..80]);
    assert_eq!(fs.read("f", "p", 40).unwrap(), &data[80..]);
    assert!(fs.read("f", "p", 1).unwrap().is_empty());
    assert_eq!(fs.read_all("f", "p").unwrap(), data);
}

#[test]
fn max_data_size_is_the_limit() {
    let mut fs = FileSystem::new();
    fs.create("f", "p").unwrap();

    assert_eq!(
        fs.write("f", "p", text(MAX_DATA_SIZE + 1)),
        Err(FileSystemError::DataTooBig)
    );
    assert_eq!(fs.free_space(), BLOCK_COUNT * BLOCK_SIZE);

    fs.write("f", "p", text(MAX_DATA_SIZE)).unwrap();
    let info = fs.file_info("f").unwrap();
    assert_eq!(info.real_size, MAX_DATA_SIZE);
    // 19 个数据块 + 1 个间接块
    assert_eq!(info.size_on_disk, 20 * BLOCK_SIZE);
    assert_eq!(info.indirect_entries.unwrap().iter().flatten().count(), INDIRECT_SLOTS);
    assert_eq!(fs.read_all("f", "p").unwrap(), text(MAX_DATA_SIZE));
    assert_accounting(&fs);
}

#[test]
fn access_modes_are_enforced_per_process() {
    let mut fs = FileSystem::new();
    fs.create("f", "owner").unwrap();
    fs.write("f", "owner", "shared").unwrap();
    fs.open("f", "reader", OpenMode::READ).unwrap();
    fs.open("f", "writer", OpenMode::WRITE).unwrap();

    assert_eq!(fs.write("f", "reader", "x"), Err(FileSystemError::NotWMode));
    assert_eq!(fs.append("f", "reader", "x"), Err(FileSystemError::NotWMode));
    assert_eq!(fs.read_all("f", "reader").unwrap(), b"shared");

    assert_eq!(fs.read("f", "writer", 3), Err(FileSystemError::NotRMode));
    fs.append("f", "writer", "!").unwrap();

    assert_eq!(fs.read_all("f", "stranger"), Err(FileSystemError::NotOpened));
    assert_eq!(fs.write("f", "stranger", "x"), Err(FileSystemError::NotOpened));
    assert_eq!(fs.read_all("f", "reader").unwrap(), b"shared!");
}

#[test]
fn writing_a_fully_closed_file_fails() {
    let mut fs = FileSystem::new();
    fs.create("f", "p").unwrap();
    fs.close("f", "p").unwrap();

    assert_eq!(fs.write("f", "p", "data"), Err(FileSystemError::NotOpened));
    assert_eq!(fs.close("f", "p"), Err(FileSystemError::NotOpened));
}

#[test]
fn error_precedence_and_codes() {
    let mut fs = FileSystem::new();

    let empty = fs.create("", "p").unwrap_err();
    assert_eq!(empty, FileSystemError::EmptyName);
    assert_eq!(empty.code(), 1);

    fs.create("f", "p").unwrap();
    assert_eq!(fs.create("f", "q"), Err(FileSystemError::NameUsed));
    assert_eq!(fs.open("ghost", "p", OpenMode::READ), Err(FileSystemError::NotFound));
    assert_eq!(fs.delete("ghost", "p"), Err(FileSystemError::NotFound));
    // 大小检查先于存在性检查
    assert_eq!(
        fs.write("ghost", "p", text(MAX_DATA_SIZE + 1)),
        Err(FileSystemError::DataTooBig)
    );
    assert_eq!(fs.write("", "p", "x"), Err(FileSystemError::EmptyName));

    let codes: Vec<u8> = [
        FileSystemError::NotFound,
        FileSystemError::NotOpened,
        FileSystemError::Opened,
        FileSystemError::NotRMode,
        FileSystemError::NotWMode,
    ]
    .iter()
    .map(|e| e.code())
    .collect();
    assert_eq!(codes, vec![5, 6, 7, 9, 10]);
}

#[test]
fn inode_table_runs_out() {
    let mut fs = FileSystem::new();
    for i in 0..INODE_NUMBER_LIMIT {
        fs.create(&format!("f{i}"), "p").unwrap();
    }

    assert_eq!(fs.create("one-more", "p"), Err(FileSystemError::NoInodesLeft));
    assert_eq!(fs.super_block().free_inodes, 0);

    fs.close("f7", "p").unwrap();
    fs.delete("f7", "p").unwrap();
    fs.create("one-more", "p").unwrap();
    assert_eq!(fs.file_info("one-more").unwrap().inode_id, 7);
}

#[test]
fn delete_waits_for_every_handle() {
    let mut fs = FileSystem::new();
    fs.create("f", "p").unwrap();
    fs.write("f", "p", text(200)).unwrap();
    fs.open("f", "q", OpenMode::READ).unwrap();

    assert_eq!(fs.delete("f", "p"), Err(FileSystemError::Opened));
    fs.close("f", "p").unwrap();
    assert_eq!(fs.delete("f", "q"), Err(FileSystemError::Opened));
    fs.close("f", "q").unwrap();

    fs.delete("f", "q").unwrap();
    assert!(!fs.exists("f"));
    assert_eq!(fs.free_space(), BLOCK_COUNT * BLOCK_SIZE);
    assert!(fs.open_handles().is_empty());
    assert_accounting(&fs);
}

#[test]
fn appends_build_the_same_file_as_one_write() {
    let mut fs = FileSystem::new();
    fs.create("appended", "p").unwrap();
    fs.create("written", "p").unwrap();

    let mut whole = Vec::new();
    for chunk in [5, 27, 1, 64, 100, 31, 33] {
        let piece = text(chunk);
        fs.append("appended", "p", &piece).unwrap();
        whole.extend_from_slice(&piece);
    }
    fs.write("written", "p", &whole).unwrap();

    let appended = fs.file_info("appended").unwrap();
    let written = fs.file_info("written").unwrap();
    assert_eq!(appended.data, whole);
    assert_eq!(written.data, whole);
    assert_eq!(appended.real_size, written.real_size);
    assert_eq!(appended.size_on_disk, written.size_on_disk);
    assert_accounting(&fs);
}

#[test]
fn fragmented_disk_still_fits_a_file() {
    let mut fs = FileSystem::new();
    for i in 0..BLOCK_COUNT {
        let name = format!("f{i:02}");
        fs.create(&name, "p").unwrap();
        fs.write(&name, "p", text(BLOCK_SIZE)).unwrap();
    }
    assert_eq!(fs.free_space(), 0);

    // 释放偶数块，没有两个相邻的空闲块
    for i in (0..BLOCK_COUNT).step_by(2) {
        let name = format!("f{i:02}");
        fs.close(&name, "p").unwrap();
        fs.delete(&name, "p").unwrap();
    }

    fs.create("big", "p").unwrap();
    let data = text(5 * BLOCK_SIZE);
    fs.write("big", "p", &data).unwrap();

    let info = fs.file_info("big").unwrap();
    assert_eq!(info.direct_blocks, [Some(0), Some(2), Some(4)]);
    assert_eq!(info.indirect_block, Some(10));
    let entries = info.indirect_entries.unwrap();
    assert_eq!(&entries[..2], &[Some(6), Some(8)]);
    assert_eq!(info.data, data);
    assert_accounting(&fs);
}

#[test]
fn best_fit_prefers_the_tightest_gap() {
    let mut fs = FileSystem::new();
    // a: 0..2, b: 2..3, c: 3..6, d: 6..7
    for (name, blocks) in [("a", 2), ("b", 1), ("c", 3), ("d", 1)] {
        fs.create(name, "p").unwrap();
        fs.write(name, "p", text(blocks * BLOCK_SIZE)).unwrap();
    }
    for name in ["a", "c"] {
        fs.close(name, "p").unwrap();
        fs.delete(name, "p").unwrap();
    }

    // 空闲段：[0,2) [3,6) [7,32)，两块的文件应落在 [0,2)
    fs.create("e", "p").unwrap();
    fs.write("e", "p", text(2 * BLOCK_SIZE)).unwrap();
    assert_eq!(fs.file_info("e").unwrap().direct_blocks, [Some(0), Some(1), None]);

    // 三块的文件正好填满 [3,6)
    fs.create("g", "p").unwrap();
    fs.write("g", "p", text(3 * BLOCK_SIZE)).unwrap();
    assert_eq!(fs.file_info("g").unwrap().direct_blocks, [Some(3), Some(4), Some(5)]);
}

#[test]
fn index_block_uses_two_digit_slots() {
    let mut table = [None; INDIRECT_SLOTS];
    table[0] = Some(7);
    table[1] = Some(31);

    let block = index_codec::encode(&table);
    assert_eq!(&block[..8], b"0731-1-1");
    assert_eq!(index_codec::decode(&block), table);
}

#[test]
fn format_returns_to_a_blank_disk() {
    let mut fs = FileSystem::new();
    fs.create("f", "p").unwrap();
    fs.write("f", "p", text(300)).unwrap();

    fs.format();

    assert!(fs.list_files().is_empty());
    assert!(fs.disk_bytes().iter().all(|&b| b == 0));
    assert_eq!(fs.super_block().free_inodes, INODE_NUMBER_LIMIT);
    fs.create("f", "p").unwrap();
    assert_eq!(fs.file_info("f").unwrap().inode_id, 0);
}
