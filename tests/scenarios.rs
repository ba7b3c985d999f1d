use block_fs::{FileSystem, FileSystemError, FsConfig};

fn fs_with(block_size: usize, total_blocks: usize, max_files: usize) -> FileSystem {
    FileSystem::new(FsConfig {
        block_size,
        total_blocks,
        max_files,
        ..FsConfig::default()
    })
    .unwrap()
}

#[test]
fn freed_blocks_are_reused_after_delete() {
    let mut fs = fs_with(1, 4, 10);

    assert_eq!(fs.create("a", 2).unwrap().blocks, vec![0, 1]);
    assert_eq!(fs.create("b", 2).unwrap().blocks, vec![2, 3]);
    assert_eq!(
        fs.create("c", 1).unwrap_err(),
        FileSystemError::InsufficientSpace {
            requested: 1,
            available: 0
        }
    );

    let deleted = fs.delete("a").unwrap();
    assert_eq!(deleted.freed_blocks, vec![0, 1]);
    assert_eq!(fs.create("c", 1).unwrap().blocks, vec![0]);
    fs.check().unwrap();
}

#[test]
fn hola_mundo_round_trip() {
    let mut fs = FileSystem::new(FsConfig::default()).unwrap();

    let created = fs.create("x", 1000).unwrap();
    assert_eq!(created.blocks.len(), 2);

    assert_eq!(fs.write("x", 0, b"Hola, mundo").unwrap(), 11);
    let out = fs.read("x", 0, 11).unwrap();
    assert_eq!(out.data, b"Hola, mundo");
    assert_eq!(out.len(), 11);
    assert!(!out.is_truncated());
}

#[test]
fn write_spanning_blocks_reads_back() {
    let mut fs = FileSystem::new(FsConfig::default()).unwrap();
    fs.create("big", 2000).unwrap();

    let payload: Vec<u8> = (0..1200u32).map(|i| (i % 251) as u8).collect();
    fs.write("big", 300, &payload).unwrap();

    assert_eq!(fs.read("big", 300, payload.len()).unwrap().data, payload);
    // 未写区域仍为 0
    assert_eq!(fs.read("big", 0, 300).unwrap().data, vec![0; 300]);
}

#[test]
fn directory_exhaustion_is_independent_of_space() {
    let mut fs = FileSystem::new(FsConfig::default()).unwrap();
    let max_files = fs.config().max_files;

    for i in 0..max_files {
        fs.create(&format!("file{i}"), 1).unwrap();
    }
    assert!(fs.stats().free_blocks() > 0);
    assert_eq!(
        fs.create("one-too-many", 1).unwrap_err(),
        FileSystemError::TableFull {
            capacity: max_files
        }
    );
    assert_eq!(fs.stats().file_count, max_files);
}

#[test]
fn boundary_violations() {
    let mut fs = FileSystem::new(FsConfig::default()).unwrap();
    assert!(matches!(
        fs.create("f", 0),
        Err(FileSystemError::InvalidSize { .. })
    ));

    fs.create("f", 10).unwrap();
    assert!(matches!(
        fs.write("f", 10, b"z"),
        Err(FileSystemError::OutOfBounds { .. })
    ));
    assert!(matches!(
        fs.write("f", 11, b""),
        Err(FileSystemError::OutOfBounds { .. })
    ));
    assert!(matches!(
        fs.read("f", 10, 1),
        Err(FileSystemError::OutOfBounds { .. })
    ));

    let out = fs.read("f", 4, 50).unwrap();
    assert_eq!(out.len(), 6);
    assert!(out.is_truncated());
}

#[test]
fn listing_matches_entries() {
    let mut fs = fs_with(512, 2048, 8);
    fs.create("alpha", 700).unwrap();
    fs.create("beta", 10).unwrap();
    fs.create("gamma", 512).unwrap();
    fs.delete("beta").unwrap();

    let listing = fs.list();
    let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["alpha", "gamma"]);
    assert_eq!(listing.stats.file_count, 2);
    assert_eq!(listing.stats.total_bytes, 1212);
    assert_eq!(listing.stats.used_blocks, 3);
    fs.check().unwrap();
}

#[test]
fn whole_pool_fits_one_file() {
    let mut fs = FileSystem::new(FsConfig::default()).unwrap();
    let created = fs.create("all", 1024 * 1024).unwrap();
    assert_eq!(created.blocks.len(), 2048);
    assert_eq!(fs.stats().free_blocks(), 0);
    assert!(matches!(
        fs.create("more", 1),
        Err(FileSystemError::InsufficientSpace { .. })
    ));
    fs.delete("all").unwrap();
    assert_eq!(fs.stats().used_blocks, 0);
}
