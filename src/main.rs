use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    let args = haulbooks::args::parse();
    haulbooks::cli::main(args)
}
