use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use shiftpart::{
    cli, config,
    logging::{self, LogFormat},
    pipeline::{
        self,
        status::{LogProgressReporter, ProgressConfig},
    },
};

fn main() -> Result<()> {
    let cli_opts = cli::parse();
    logging::init_logging(if cli_opts.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let cfg = loaded.config;
    let task = cli_opts.to_task(&cfg);

    info!(
        "starting version={} file={} from={} to={} search_mark={} search_offset={} config_hash={}",
        env!("CARGO_PKG_VERSION"),
        task.path().display(),
        task.from_offset,
        task.to_offset,
        task.search_mark,
        task.search_offset,
        loaded.config_hash
    );

    let interval = cli_opts
        .progress_interval_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or_else(|| cfg.progress_interval());
    let progress = ProgressConfig {
        reporter: Arc::new(LogProgressReporter),
        interval,
    };

    let summary = pipeline::run_shift(&task, progress)
        .with_context(|| format!("shift of {} failed", task.path().display()))?;

    if let Some(path) = cli_opts.summary_json.as_ref() {
        let file = File::create(path)
            .with_context(|| format!("creating summary {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &summary)?;
        writer.flush()?;
        info!("summary written to {}", path.display());
    }

    info!("done");
    Ok(())
}
