mod color;

use gpu_detect::{
    environment::HostEnv,
    gpu::{GpuProbe, GpuRecord, GpuReport, GpuVendor, UnknownGpuVendor},
    host::CommandRunner,
    vulkan::{DeviceName, DiagnosticError, IcdLoaders, IcdSearch, IcdVendor},
};
use std::io::{self, Write};

pub fn gpu<R: CommandRunner + Clone>(probe: &GpuProbe<R>, json: bool) -> anyhow::Result<()> {
    let report = probe.detect();

    if json {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &GpuReport) {
    match report.prime {
        Some(ref prime) => {
            println!("{}", color::info("Hybrid graphics (PRIME)"));
            print_record("Integrated", &prime.integrated);
            print_record("Discrete", &prime.discrete);
        }
        None => print_record("GPU", &report.vendors),
    }
}

fn print_record(title: &str, record: &GpuRecord) {
    println!("{}: {}", color::primary(title), record.name);
    println!("       Vendor: {}", color::secondary(record.vendor));
    println!("          ICD: {}", if record.icd.is_empty() { "none" } else { record.icd.as_str() });

    if record.envs.is_empty() {
        println!("  Environment: none");
    } else {
        for (id, (key, value)) in record.envs.iter().enumerate() {
            let label = if id == 0 { "  Environment:" } else { "              " };
            println!("{} {}={}", label, key, value);
        }
    }

    if let Some(ref path) = record.nvngx_path {
        println!("        NVNGX: {}", path.display());
    }
}

pub fn icd_dirs(search: &IcdSearch, env: &HostEnv) {
    for dir in search.directories(env) {
        println!("{}", dir.display());
    }
}

pub fn icd(loaders: &IcdLoaders, vendor: Option<&str>, joined: bool) -> anyhow::Result<()> {
    let vendor = match vendor {
        Some(vendor) => vendor.parse::<IcdVendor>()?,
        None => {
            for (vendor, files) in loaders.iter() {
                println!("{}", color::primary(vendor));
                for file in files {
                    println!("  {}", file.display());
                }
            }

            return Ok(());
        }
    };

    if joined {
        println!("{}", loaders.joined(vendor));
    } else {
        for file in loaders.files(vendor) {
            println!("{}", file.display());
        }
    }

    Ok(())
}

pub fn name<R: CommandRunner + Clone>(probe: &GpuProbe<R>, prime: bool) {
    match probe.vulkan().device_name(&[], prime) {
        DeviceName::Detected(name) => println!("{}", name),
        DeviceName::DriverError(message) => {
            println!("{}: {}", color::error("driver error"), message)
        }
        other => println!("{}", other),
    }
}

pub fn vulkaninfo<R: CommandRunner + Clone>(probe: &GpuProbe<R>) -> anyhow::Result<()> {
    match probe.vulkan().raw_dump() {
        Ok(dump) => print!("{}", dump),
        Err(DiagnosticError::ToolMissing) => println!("{}", DiagnosticError::ToolMissing),
        Err(why) => return Err(why.into()),
    }

    Ok(())
}

pub fn has_gpu<R: CommandRunner + Clone>(probe: &GpuProbe<R>, vendor: &str) -> anyhow::Result<bool> {
    let vendor = vendor.parse::<GpuVendor>()?;
    if vendor == GpuVendor::Unknown {
        return Err(UnknownGpuVendor(vendor.to_string()).into());
    }

    Ok(probe.has_gpu(vendor))
}
