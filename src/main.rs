use block_fs::{shell::start_shell, FileSystem, FsConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    // 日志写到 stderr，避免与 shell 输出混在一起；RUST_LOG 可覆盖级别
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = FileSystem::new(FsConfig::default())
        .map_err(Into::into)
        .and_then(start_shell);

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
