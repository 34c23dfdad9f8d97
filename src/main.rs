#[macro_use]
extern crate log;

mod cli;
mod logging;

use crate::logging::setup_logging;
use anyhow::Context;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gpu_detect::{Config, GpuProbe, HostEnv};
use std::process::exit;

pub fn main() {
    let clap = App::new("gpu-detect")
        .about("GPU vendor, PRIME and Vulkan driver detection for program launchers")
        .global_setting(AppSettings::ColoredHelp)
        .global_setting(AppSettings::UnifiedHelpMessage)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .help("print debug messages")
                .short("v")
                .long("verbose")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("gpu")
                .about("detect the GPUs, and the environment needed to launch programs on them")
                .arg(Arg::with_name("json").help("print the report as JSON").long("json")),
        )
        .subcommand(
            SubCommand::with_name("icd")
                .about("list Vulkan ICD manifests found by the loader search")
                .arg(
                    Arg::with_name("VENDOR")
                        .help("only list manifests of this driver: IE: `amdradv` or `nvidia`"),
                )
                .arg(
                    Arg::with_name("dirs")
                        .help("list the directories that are searched instead")
                        .long("dirs")
                        .conflicts_with("VENDOR"),
                )
                .arg(
                    Arg::with_name("joined")
                        .help("print the manifests of VENDOR as a `:` delimited list")
                        .long("joined")
                        .requires("VENDOR"),
                ),
        )
        .subcommand(
            SubCommand::with_name("name")
                .about("print the name of the GPU that Vulkan selects")
                .arg(
                    Arg::with_name("prime")
                        .help("select the discrete GPU with DRI_PRIME=1")
                        .short("p")
                        .long("prime"),
                ),
        )
        .subcommand(SubCommand::with_name("vulkaninfo").about("print the full vulkaninfo report"))
        .subcommand(
            SubCommand::with_name("has-gpu")
                .about("exit successfully if a GPU from VENDOR is on the PCI bus")
                .arg(
                    Arg::with_name("VENDOR")
                        .help("one of `nvidia`, `amd`, or `intel`")
                        .required(true),
                ),
        );

    let matches = clap.get_matches();

    let filter = if matches.is_present("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    let _ = setup_logging(filter);

    match main_(&matches) {
        Ok(code) => exit(code),
        Err(why) => {
            eprintln!("gpu-detect: {:#}", why);
            exit(1);
        }
    }
}

fn main_(matches: &ArgMatches) -> anyhow::Result<i32> {
    let env = HostEnv::capture();
    let config = Config::load(&env).context("invalid configuration")?;
    debug!("configuration: {:?}", config);

    let probe = GpuProbe::new(gpu_detect::host::SystemRunner, config, &env);

    match matches.subcommand() {
        ("gpu", Some(matches)) => cli::gpu(&probe, matches.is_present("json"))?,
        ("icd", Some(matches)) => {
            if matches.is_present("dirs") {
                cli::icd_dirs(&probe.config().icd_search, &env);
            } else {
                cli::icd(probe.loaders(), matches.value_of("VENDOR"), matches.is_present("joined"))?;
            }
        }
        ("name", Some(matches)) => cli::name(&probe, matches.is_present("prime")),
        ("vulkaninfo", _) => cli::vulkaninfo(&probe)?,
        ("has-gpu", Some(matches)) => {
            let vendor = matches.value_of("VENDOR").unwrap_or_default();
            return cli::has_gpu(&probe, vendor).map(|found| if found { 0 } else { 1 });
        }
        _ => unreachable!("clap argument parsing failed"),
    }

    Ok(0)
}
