use std::env;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use unionfs_policy::config::{create_config, Category, ConfigError, UpstreamSpec};
use unionfs_policy::policy::register_builtin_policies;
use unionfs_policy::{Policy, Upstream, UpstreamRef};

struct Args {
    options: Vec<String>,
    category: String,
    path: PathBuf,
    upstreams: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut options = Vec::new();
    let mut i = 1;

    while i < args.len() {
        if args[i] == "-o" && i + 1 < args.len() {
            options.extend(args[i + 1].split(',').map(str::to_string));
            i += 2;
        } else {
            break;
        }
    }

    // Remaining arguments: category, path, upstreams
    if i + 2 >= args.len() {
        return Err("Missing category, path or upstream directories".to_string());
    }

    Ok(Args {
        options,
        category: args[i].clone(),
        path: PathBuf::from(&args[i + 1]),
        upstreams: args[i + 2..].to_vec(),
    })
}

fn print_usage(program: &str) {
    println!("unionfs-policy - resolve union filesystem operations to upstreams");
    println!();
    println!(
        "Usage: {} [options] <action|create|search> <path> <upstream1> [upstream2] ...",
        program
    );
    println!();
    println!("Options:");
    println!("  -o func.action=POLICY    Action policy [default: eplfs]");
    println!("  -o func.create=POLICY    Create policy [default: eplfs]");
    println!("  -o func.search=POLICY    Search policy [default: eplfs]");
    println!();
    println!("Upstreams are directories, optionally suffixed with :ro or :nc");
    println!();
    println!("Policies:");
    println!("  epall - ExistingPathAll: every upstream where the path exists");
    println!("  eplfs - ExistingPathLeastFreeSpace: of those, the one with least free space");
    println!();
    println!("Example:");
    println!("  {} search /docs/report.txt /mnt/disk1 /mnt/disk2:ro", program);
}

fn run(args: Args) -> Result<Vec<UpstreamRef>, Box<dyn std::error::Error>> {
    register_builtin_policies();

    let config = create_config();
    {
        let mut config = config.write();
        for option in &args.options {
            config.set_option(option)?;
        }
        for upstream in &args.upstreams {
            config.upstreams.push(upstream.parse::<UpstreamSpec>()?);
        }
    }

    let category: Category = args.category.parse()?;
    let config = config.read();
    let upstreams = config.build_upstreams()?;
    let policy = config.resolve(category)?;

    tracing::info!(
        category = %category,
        policy = policy.name(),
        path = %args.path.display(),
        upstreams = upstreams.len(),
        "Resolving operation"
    );

    let ctx = CancellationToken::new();
    let selected = match category {
        Category::Action => policy.action(&ctx, &upstreams, &args.path)?,
        Category::Create => policy.create(&ctx, &upstreams, &args.path)?,
        Category::Search => vec![policy.search(&ctx, &upstreams, &args.path)?],
    };
    Ok(selected)
}

fn main() {
    // Initialize tracing with environment filter
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        print_usage(args.first().map(String::as_str).unwrap_or("unionfs-policy"));
        return;
    }

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match run(parsed) {
        Ok(selected) => {
            for upstream in selected {
                println!("{}", upstream.name());
            }
        }
        Err(e) => {
            let errno = if let Some(e) = e.downcast_ref::<unionfs_policy::PolicyError>() {
                e.errno()
            } else if let Some(e) = e.downcast_ref::<ConfigError>() {
                e.errno()
            } else {
                1
            };
            tracing::error!(error = %e, errno, "Selection failed");
            eprintln!("Error: {} (errno {})", e, errno);
            std::process::exit(1);
        }
    }
}
