use clap::Parser;
use deploy_cli::{handler, utils};
use eyre::Result;
use trust_deploy::DeployArgs;

fn main() -> Result<()> {
    handler::install();
    utils::load_dotenv();
    utils::subscriber();
    let args = DeployArgs::parse();
    utils::block_on(args.run())?
}
