use fern::colors::{Color, ColoredLevelConfig};

pub use log::LevelFilter;

/// Log configuration.
#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    pub level: LevelFilter,
}

/// Initialize the log module. Call once, before anything logs.
pub fn init_log(config: LogConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all("log")?;
    setup_logger(config)?;

    log::trace!("log initialized!");
    Ok(())
}

fn setup_logger(config: LogConfig) -> anyhow::Result<()> {
    // setup colors
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Magenta)
        .info(Color::Cyan)
        .warn(Color::Yellow)
        .error(Color::Red);

    // standard output dispatch, for trace, debug and info messages.
    let stdout = fern::Dispatch::new()
        .filter(|meta| meta.level() >= log::Level::Info)
        .chain(std::io::stdout());

    // standard error dispatch, for warn and error messages.
    let stderr = fern::Dispatch::new()
        .level(LevelFilter::Warn)
        .chain(std::io::stderr());

    // console output with the colors
    let console_output = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .chain(stdout)
        .chain(stderr);

    let file_output = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(
            std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open("log/log.txt")?,
        );

    // final apply to all the dispatches
    fern::Dispatch::new()
        .level(config.level)
        .chain(console_output)
        .chain(file_output)
        .apply()?;

    Ok(())
}
