use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 未設定時使用的過濾規則
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "dorm_assign=debug,info"
    } else {
        "dorm_assign=info"
    }
}

/// 初始化日誌；`json` 為 true 時輸出 JSON，方便交給日誌收集系統
pub fn init_logger(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let json_layer = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .json()
    });
    let compact_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(compact_layer)
        .init();
}
