use anyhow::Context;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("lantern=info"))
        .init();

    let config = lantern::AppConfig::from_env();
    log::debug!("starting with {:?}", config);

    lantern::run(config).context("lantern exited with an error")
}
