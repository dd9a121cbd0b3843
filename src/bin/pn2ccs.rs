use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

use pn2ccs::ccs::encode;
use pn2ccs::classify::{NetClass, classify};
use pn2ccs::config::Pn2CcsConfig;
use pn2ccs::net::io::read_document;
use pn2ccs::options::Options;
use pn2ccs::sync::Synchronizer;

fn main() {
    if std::env::var("PN2CCS_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN2CCS_LOG")
            .write_style("PN2CCS_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    if let Err(err) = run() {
        eprintln!("pn2ccs: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Ok(flags) = std::env::var("PN2CCS_FLAGS") {
        let extra = shellwords::split(&flags).context("malformed PN2CCS_FLAGS")?;
        debug!("pn2ccs options from environment: {:?}", extra);
        args.extend(extra);
    }
    let options = Options::parse_from_args(&args)?;

    let mut config = Pn2CcsConfig::load_from_file(&options.config)?;
    options.merge_into(&mut config);
    debug!("effective configuration: {:?}", config);

    let document = read_document(&options.input)
        .with_context(|| format!("Failed to load net from {:?}", options.input))?;
    let net = document.to_net()?;
    info!(
        "loaded {} places, {} transitions, {} arcs",
        net.places_len(),
        net.transitions_len(),
        net.edges_len()
    );

    if let Some(path) = &config.dot_output {
        net.write_dot(path)
            .with_context(|| format!("Failed to write dot file {:?}", path))?;
    }

    let class = classify(&net);
    println!("classes: {class}");

    let net = if class.contains(NetClass::TWO_TAU_SYNCHRONISATION) {
        net
    } else if class.contains(NetClass::GROUP_CHOICE) {
        if !config.synchronize {
            bail!("net needs synchronisation, which is disabled");
        }
        let mut synchronizer = match config.seed {
            Some(seed) => Synchronizer::seeded(seed),
            None => Synchronizer::from_os_rng(),
        };
        synchronizer.synchronize(&net)?.net
    } else {
        warn!("net is neither group-choice nor 2-τ-synchronisation");
        bail!("net cannot be encoded as a CCS process");
    };

    let encoding = encode(&net)?;
    println!("{}", encoding.render(config.render));
    Ok(())
}
