use std::path::PathBuf;

use anyhow::{anyhow, Result};
use dotenv::dotenv;
use env_logger::Env;

use tenant_copy::argsets::CopyArgs;
use tenant_copy::command;
use tenant_copy::constants::{defaults, envvars};

const HELP: &str = "\
Copy devices with their external IDs, measurements, events and alarms to another tenant

USAGE:
  tenant-copy [--config <path>] [<device-id>]

ARGS:
  <device-id>        Copy only this device and its child devices;
                     without it every device on the source tenant is copied

OPTIONS:
  --config <path>    Properties file with the tenant settings [default: ./config.properties]
  -h, --help         Print this help
";

fn main() -> Result<()> {
    let _ = dotenv();
    env_logger::Builder::from_env(Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL))
        .init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let config_path = args
        .opt_value_from_str::<_, PathBuf>("--config")?
        .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_PATH));
    let device_id = args.opt_free_from_str::<String>()?;

    let remaining = args.finish();
    if !remaining.is_empty() {
        return Err(anyhow!("Unexpected arguments: {remaining:?}"));
    }

    command::copy(CopyArgs {
        config_path,
        device_id,
    })
}
