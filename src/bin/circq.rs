use std::io::Write;

use circq::{init_logger, DisplayOptions, SoakConfig};

fn main() -> anyhow::Result<()> {
    simple_env_load::load_env_from([".dev.env"]);

    let config = SoakConfig::load_from_env()?;
    let logs = init_logger(config.log_level)?;

    let result = circq::soak::run(&config);

    let stderr = std::io::stderr();
    let mut stderr = stderr.lock();
    for (index, record) in logs.try_iter().enumerate() {
        record.display(DisplayOptions::default(), index, &mut stderr)?;
    }
    stderr.flush()?;

    let report = result?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
