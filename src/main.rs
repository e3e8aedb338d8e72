use mixpath::cli::CliArgs;
use mixpath::process::exit_code;
use mixpath::util::init_from_config;
use mixpath::{MixpathConfig, Runner, VERSION};

use std::env;
use std::io;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse_forwarded(env::args_os());
    let config = MixpathConfig::default();
    init_from_config(&config);

    debug!("mixpath v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(exit_code(false));
    }

    let runner = Runner::new(config.clone());
    let result = if config.filter {
        let stdin = io::stdin();
        runner.filter(stdin.lock(), io::stdout().lock()).await
    } else {
        runner.run(args.tool_args, io::stdout().lock()).await
    };

    let success = match result {
        Ok(success) => success,
        Err(e) => {
            error!("{}", e);
            false
        }
    };

    std::process::exit(exit_code(success));
}
