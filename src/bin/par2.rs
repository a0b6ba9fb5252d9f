//! Main par2 binary - drop-in replacement for par2cmdline
//!
//! Supports the same command-line interface as par2cmdline for compatibility

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = Command::new("par2")
        .version(env!("CARGO_PKG_VERSION"))
        .about("PAR2 file verification and repair utility (Rust implementation)")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("create")
                .visible_alias("c")
                .about("Create PAR2 recovery files")
                .arg(
                    Arg::new("par2_file")
                        .help("Base name for PAR2 files")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("files")
                        .help("Files to protect")
                        .required(true)
                        .num_args(1..)
                        .index(2),
                )
                .arg(
                    Arg::new("redundancy")
                        .short('r')
                        .long("redundancy")
                        .help("Redundancy percentage (default: 5)")
                        .value_name("PERCENT")
                        .default_value("5"),
                )
                .arg(
                    Arg::new("block_size")
                        .short('s')
                        .long("block-size")
                        .help("Block size in bytes")
                        .value_name("BYTES"),
                )
                .arg(
                    Arg::new("block_count")
                        .short('b')
                        .long("block-count")
                        .help("Number of recovery blocks")
                        .value_name("COUNT"),
                )
                .arg(
                    Arg::new("recovery_count")
                        .short('n')
                        .long("recovery-count")
                        .help("Number of recovery files")
                        .value_name("COUNT"),
                )
                .arg(
                    Arg::new("first_recovery_block")
                        .short('f')
                        .long("first-block")
                        .help("Exponent of the first recovery block")
                        .value_name("N"),
                )
                .arg(
                    Arg::new("uniform")
                        .short('u')
                        .long("uniform")
                        .help("Spread recovery blocks uniformly across volumes")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("limit"),
                )
                .arg(
                    Arg::new("limit")
                        .short('l')
                        .long("limit")
                        .help("Limit volume size to that of the largest source file")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("uniform"),
                )
                .arg(
                    Arg::new("base_dir")
                        .short('d')
                        .long("base-dir")
                        .help("Base directory for hierarchical paths")
                        .value_name("DIR"),
                )
                .arg(
                    Arg::new("dummy")
                        .short('0')
                        .long("dummy")
                        .help("Emit metadata-only volumes (benchmarking layout)")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("verify")
                .visible_alias("v")
                .about("Verify files using PAR2 data")
                .arg(
                    Arg::new("par2_file")
                        .help("PAR2 file to use for verification")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("files")
                        .help("Specific files to verify (optional)")
                        .num_args(0..)
                        .index(2),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Quiet mode - minimal output")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("threads")
                        .short('p')
                        .long("threads")
                        .help("Number of CPU threads for computation (0 = auto-detect)")
                        .value_name("N")
                        .default_value("0"),
                )
                .arg(
                    Arg::new("concurrency_mode")
                        .short('t')
                        .long("concurrency-mode")
                        .help("Concurrency mode: + (parallel), 0 (serial scan/parallel apply), - (serial)")
                        .value_name("+|0|-")
                        .value_parser(["+", "0", "-"])
                        .default_value("+"),
                )
                .arg(
                    Arg::new("no-parallel")
                        .long("no-parallel")
                        .help("Disable all parallel processing")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("memory_limit")
                        .short('m')
                        .long("memory-limit")
                        .help("Memory limit in MiB")
                        .value_name("MIB"),
                )
                .arg(
                    Arg::new("base_dir")
                        .short('d')
                        .long("base-dir")
                        .help("Base directory for hierarchical paths")
                        .value_name("DIR"),
                ),
        )
        .subcommand(
            Command::new("repair")
                .visible_alias("r")
                .about("Repair files using PAR2 recovery data")
                .arg(
                    Arg::new("par2_file")
                        .help("PAR2 file to use for repair")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("files")
                        .help("Specific files to repair (optional)")
                        .num_args(0..)
                        .index(2),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help("Quiet mode - minimal output")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("purge")
                        .long("purge")
                        .help("Purge backup files after successful repair")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("threads")
                        .short('p')
                        .long("threads")
                        .help("Number of CPU threads for computation (0 = auto-detect)")
                        .value_name("N")
                        .default_value("0"),
                )
                .arg(
                    Arg::new("concurrency_mode")
                        .short('t')
                        .long("concurrency-mode")
                        .help("Concurrency mode: + (parallel), 0 (serial scan/parallel apply), - (serial)")
                        .value_name("+|0|-")
                        .value_parser(["+", "0", "-"])
                        .default_value("+"),
                )
                .arg(
                    Arg::new("no-parallel")
                        .long("no-parallel")
                        .help("Disable all parallel processing")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("memory_limit")
                        .short('m')
                        .long("memory-limit")
                        .help("Memory limit in MiB")
                        .value_name("MIB"),
                )
                .arg(
                    Arg::new("base_dir")
                        .short('d')
                        .long("base-dir")
                        .help("Base directory for hierarchical paths")
                        .value_name("DIR"),
                ),
        )
        // Backward compatibility: allow command as first positional argument
        .arg(
            Arg::new("command")
                .help("Command (c/create, v/verify, r/repair)")
                .index(1),
        )
        .get_matches();

    // Handle subcommands
    match matches.subcommand() {
        Some(("create", sub_matches)) => handle_create(sub_matches),
        Some(("verify", sub_matches)) => handle_verify(sub_matches),
        Some(("repair", sub_matches)) => handle_repair(sub_matches),
        Some((cmd, _)) => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
        None => {
            // No subcommand - show help
            eprintln!("Error: No command specified");
            eprintln!("\nUse 'par2 --help' for usage information");
            std::process::exit(1);
        }
    }
}

fn handle_create(matches: &clap::ArgMatches) -> Result<()> {
    use binrw::BinWrite;
    use par2rs::creator::{self, CreatorConfig, VolumeScheme};
    use std::fs::File;
    use std::path::PathBuf;

    let base_name = matches
        .get_one::<String>("par2_file")
        .expect("par2_file is required");
    let files: Vec<PathBuf> = matches
        .get_many::<String>("files")
        .expect("files is required")
        .map(PathBuf::from)
        .collect();
    let redundancy: f64 = matches
        .get_one::<String>("redundancy")
        .and_then(|s| s.parse().ok())
        .unwrap_or(5.0);
    let block_size: Option<u64> = matches.get_one::<String>("block_size").and_then(|s| s.parse().ok());
    let mut source_block_count: Option<u32> =
        matches.get_one::<String>("block_count").and_then(|s| s.parse().ok());
    let recovery_file_count: Option<u32> =
        matches.get_one::<String>("recovery_count").and_then(|s| s.parse().ok());
    let first_recovery_block: u32 = matches
        .get_one::<String>("first_recovery_block")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let scheme = if matches.get_flag("uniform") {
        VolumeScheme::Uniform
    } else if matches.get_flag("limit") {
        VolumeScheme::Limited
    } else {
        VolumeScheme::Variable
    };
    let dummy = matches.get_flag("dummy");

    // Neither -s nor -b given: fall back to a block count of 2000, matching
    // par2cmdline's CommandLine::Parse default.
    if block_size.is_none() && source_block_count.is_none() {
        source_block_count = Some(2000);
    }

    if let Some(dir) = matches.get_one::<String>("base_dir") {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to set base directory to {dir}"))?;
    }

    let sizes: Vec<u64> = files
        .iter()
        .map(|p| std::fs::metadata(p).map(|m| m.len()).with_context(|| format!("stat {}", p.display())))
        .collect::<Result<Vec<_>>>()?;

    let (slice_size, _block_count) =
        creator::compute_block_size_and_count(&sizes, block_size, source_block_count)
            .map_err(|e| anyhow::anyhow!(e))?;

    let source_files: Vec<creator::SourceFile> = files
        .iter()
        .map(|p| creator::read_source_file(p, slice_size).map_err(|e| anyhow::anyhow!(e)))
        .collect::<Result<Vec<_>>>()?;

    let config = CreatorConfig {
        block_size: Some(slice_size),
        source_block_count: None,
        redundancy_percent: redundancy,
        recovery_block_count: None,
        recovery_file_count,
        first_recovery_block,
        scheme,
    };

    let creator_info = format!("par2rs/{}", env!("CARGO_PKG_VERSION")).into_bytes();
    let plan = creator::plan_recovery_set(&source_files, slice_size, &config, creator_info)
        .map_err(|e| anyhow::anyhow!(e))?;

    // `-0` skips the point of reading source data at all: metadata-only
    // volumes exist to benchmark I/O and volume scheduling, not recovery
    // computation.
    let recovery_slices = if dummy {
        creator::dummy_recovery_slices(slice_size, plan.recovery_block_count)
    } else {
        // Read every source file's blocks, zero-padding the last one, in the
        // same order the slice checksums (and therefore the recovery matrix's
        // input columns) were built in.
        let mut blocks: Vec<Vec<u8>> = Vec::new();
        for file in &source_files {
            let data =
                std::fs::read(&file.path).with_context(|| format!("reading {}", file.path.display()))?;
            let mut offset = 0usize;
            while offset < data.len() {
                let end = (offset + slice_size as usize).min(data.len());
                let mut chunk = data[offset..end].to_vec();
                chunk.resize(slice_size as usize, 0);
                blocks.push(chunk);
                offset = end;
            }
        }
        let block_refs: Vec<&[u8]> = blocks.iter().map(Vec::as_slice).collect();
        creator::compute_recovery_slices(&block_refs, config.first_recovery_block, plan.recovery_block_count)
            .map_err(|e| anyhow::anyhow!(e))?
    };
    let recovery_packets =
        creator::build_recovery_packets(plan.set_id, config.first_recovery_block, recovery_slices);

    // Index file: every critical packet, no recovery data.
    let index_path = PathBuf::from(creator::index_file_name(base_name));
    let mut index_file =
        File::create(&index_path).with_context(|| format!("creating {}", index_path.display()))?;
    plan.main.write_le(&mut index_file)?;
    plan.creator.write_le(&mut index_file)?;
    for fd in &plan.descriptions {
        fd.write_le(&mut index_file)?;
    }
    for ifsc in &plan.verifications {
        ifsc.write_le(&mut index_file)?;
    }

    // Recovery volumes: a scheduled share of the critical packets, the
    // Creator packet, and this volume's slice of the recovery data.
    enum CriticalRef<'a> {
        Main(&'a par2rs::MainPacket),
        FileDesc(&'a par2rs::FileDescriptionPacket),
        Ifsc(&'a par2rs::InputFileSliceChecksumPacket),
    }
    let mut pool: Vec<CriticalRef> = vec![CriticalRef::Main(&plan.main)];
    pool.extend(plan.descriptions.iter().map(CriticalRef::FileDesc));
    pool.extend(plan.verifications.iter().map(CriticalRef::Ifsc));
    let schedule = creator::schedule_critical_packets(&plan.volumes, pool.len());
    let exponent_width = plan
        .volumes
        .iter()
        .map(|v| v.exponent_low + v.count)
        .max()
        .unwrap_or(1)
        .to_string()
        .len();

    for (vi, volume) in plan.volumes.iter().enumerate() {
        let name = creator::volume_file_name(base_name, *volume, exponent_width);
        let mut volume_file = File::create(&name).with_context(|| format!("creating {name}"))?;
        for &idx in &schedule[vi] {
            match &pool[idx] {
                CriticalRef::Main(p) => p.write_le(&mut volume_file)?,
                CriticalRef::FileDesc(p) => p.write_le(&mut volume_file)?,
                CriticalRef::Ifsc(p) => p.write_le(&mut volume_file)?,
            }
        }
        plan.creator.write_le(&mut volume_file)?;
        for packet in recovery_packets
            .iter()
            .filter(|p| p.exponent >= volume.exponent_low && p.exponent < volume.exponent_low + volume.count)
        {
            packet.write_le(&mut volume_file)?;
        }
    }

    println!(
        "Created {} and {} recovery volume(s) ({} recovery block(s), {}% redundancy)",
        index_path.display(),
        plan.volumes.len(),
        plan.recovery_block_count,
        redundancy
    );

    Ok(())
}

fn handle_verify(matches: &clap::ArgMatches) -> Result<()> {
    use std::path::{Path, PathBuf};

    let par2_file = matches
        .get_one::<String>("par2_file")
        .expect("par2_file is required");
    let quiet = matches.get_flag("quiet");

    let verify_config = par2rs::verify::VerificationConfig::from_args(matches);

    let file_path = PathBuf::from(par2_file);
    anyhow::ensure!(file_path.exists(), "File does not exist: {}", par2_file);

    if let Ok(prefix) = std::fs::read(&file_path).map(|b| b.into_iter().take(40).collect::<Vec<_>>()) {
        anyhow::ensure!(
            !par2rs::par1::is_par1_file(&prefix),
            "{} is a PAR1 file; this tool only reads PAR2 recovery sets",
            par2_file
        );
    }

    // `-d` overrides the default of resolving relative to the PAR2 file's
    // own directory (like par2verify does).
    if let Some(dir) = matches.get_one::<String>("base_dir") {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to set base directory to {dir}"))?;
    } else if let Some(parent) = file_path.parent() {
        std::env::set_current_dir(parent)
            .with_context(|| format!("Failed to set current directory to {}", parent.display()))?;
    }

    // Collect all PAR2 files in the set (use just filename after cd)
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(Path::new)
        .unwrap_or(&file_path);
    let par2_files = par2rs::par2_files::collect_par2_files(file_name);

    if !quiet {
        println!("Loading PAR2 files...\n");
    }

    // Parse packets excluding recovery slices (verification doesn't need them)
    let all_packets = par2rs::par2_files::load_par2_packets(&par2_files, false);

    if !quiet {
        // Count recovery blocks without loading their data
        let recovery_metadata =
            par2rs::par2_files::parse_recovery_slice_metadata(&par2_files, false);
        let total_recovery_blocks = recovery_metadata.len();

        println!(); // Blank line after loading

        // Show summary statistics
        let stats = par2rs::analysis::calculate_par2_stats(&all_packets, total_recovery_blocks);
        par2rs::analysis::print_summary_stats(&stats);

        println!("\nVerifying source files:\n");
    }

    // Perform comprehensive verification
    let results =
        par2rs::verify::comprehensive_verify_files_with_config(all_packets, &verify_config);

    if !quiet {
        par2rs::verify::print_verification_results(&results);
    }

    if results.missing_block_count == 0 {
        Ok(())
    } else if results.repair_possible {
        if !quiet {
            eprintln!("\nRepair is required.");
        }
        std::process::exit(1);
    } else {
        if !quiet {
            eprintln!("\nRepair is not possible.");
        }
        std::process::exit(2);
    }
}

fn handle_repair(matches: &clap::ArgMatches) -> Result<()> {
    let par2_file = matches
        .get_one::<String>("par2_file")
        .expect("par2_file is required");
    let quiet = matches.get_flag("quiet");
    let purge = matches.get_flag("purge");

    if let Ok(prefix) = std::fs::read(par2_file).map(|b| b.into_iter().take(40).collect::<Vec<_>>()) {
        anyhow::ensure!(
            !par2rs::par1::is_par1_file(&prefix),
            "{} is a PAR1 file; this tool only repairs PAR2 recovery sets",
            par2_file
        );
    }

    if let Some(dir) = matches.get_one::<String>("base_dir") {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to set base directory to {dir}"))?;
    }

    // Create verification config from command line arguments (like par2repair does)
    let verify_config = par2rs::verify::VerificationConfig::from_args(matches);

    let (context, result) = par2rs::repair::repair_files_with_config(
        par2_file,
        Box::new(par2rs::repair::ConsoleReporter::new(quiet)),
        &verify_config,
    )
    .context("Failed to repair files")?;

    if !quiet {
        context.recovery_set.print_statistics();
        result.print_result();
    }

    if purge && result.is_success() {
        context.purge_files(par2_file)?;
    }

    if result.is_success() {
        Ok(())
    } else {
        anyhow::bail!("Repair failed");
    }
}
