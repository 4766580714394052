// use log macros.
#[macro_use]
extern crate log as _log;

mod context;
mod world;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "magpie sandbox", about = "Frame graph demo renderer.")]
struct ConsoleVars {
    /// log level (please choose from trace, debug, info, warn, error)
    #[structopt(short, long, default_value = "debug")]
    level: String,

    /// number of frames to render before exiting
    #[structopt(short, long, default_value = "3")]
    frames: u32,
}

fn parse_level(raw: &str) -> log::LevelFilter {
    match raw.to_lowercase().trim() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => panic!("Unknown log level!"),
    }
}

fn main() -> anyhow::Result<()> {
    let console = ConsoleVars::from_args();

    magpie_log::init_log(magpie_log::LogConfig {
        level: parse_level(&console.level),
    })?;

    let mut context = context::DebugContext::new();
    let (mut graph, present) = world::build_world_graph(&mut context)?;

    graph.start(&mut context)?;
    info!("world graph started");

    // mesh and quad draws stayed deferred until the warm-up submission
    // flushed their uploads; by the first frame here the data is resident
    for _ in 0..console.frames {
        graph.execute(&mut context, present)?;
    }

    graph.stop(&mut context);
    info!("sandbox finished");
    Ok(())
}
