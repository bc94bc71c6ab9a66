use env_logger::{Builder, Env};

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт - warn (stdout остаётся только для отчёта).
    // Пример: RUST_LOG=debug raftsnap inspect snap.tar.gz
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = raftsnap::cli::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
