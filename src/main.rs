use anyhow::{anyhow, Result};
use env_logger::Env;

use tankmon::constants::{defaults, envvars};
use tankmon::{argsets, command, helpers};

const CMD_POLL: &str = "poll";
const CMD_DAILY: &str = "daily";
const CMD_MONTHLY: &str = "monthly";
const CMD_RUN: &str = "run";
const CMD_VALIDATE: &str = "validate";
const CMD_DEVICES: &str = "devices";
const CMD_KVS_GET: &str = "kvs-get";
const CMD_KVS_SET: &str = "kvs-set";

fn main() -> Result<()> {
    helpers::load_dotenv();
    env_logger::Builder::from_env(Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL))
        .init();

    let mut args = pico_args::Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_POLL) => command::poll(),
        Some(CMD_DAILY) => command::daily(),
        Some(CMD_MONTHLY) => command::monthly(),
        Some(CMD_RUN) => command::run(),
        Some(CMD_VALIDATE) => command::validate(),
        Some(CMD_DEVICES) => command::devices(),
        Some(CMD_KVS_GET) => command::kvs_get(argsets::KvsGetArgs {
            key: args.free_from_str()?,
        }),
        Some(CMD_KVS_SET) => command::kvs_set(argsets::KvsSetArgs {
            key: args.free_from_str()?,
            value: args.free_from_str()?,
        }),
        _ => Err(anyhow!(
            "Subcommand must be one of 'poll', 'daily', 'monthly', 'run', 'validate', 'devices', 'kvs-get', 'kvs-set'"
        )),
    }
}
