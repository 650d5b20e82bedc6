use clap::{Parser, Subcommand};
use linkchain::config::Config;
use linkchain::hash::abbreviate;
use linkchain::store::ChainStore;
use linkchain::{ChainLink, CodecRegistry, SimpleBlockchain};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "linkchain",
    version,
    about = "Append-only hash-linked chains of data records"
)]
struct Cli {
    /// Store directory (default: ./linkchain.db)
    #[arg(long, default_value = "linkchain.db")]
    dir: PathBuf,

    /// Codec used to read and write chains (default from linkchain.json)
    #[arg(short, long)]
    format: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty chain
    New {
        /// Chain id (default: random UUID)
        #[arg(long)]
        id: Option<String>,
    },
    /// Append a payload to a chain
    Append {
        id: String,
        data: String,
        /// Treat DATA as hex-encoded bytes
        #[arg(long)]
        hex: bool,
    },
    /// Print every link of a chain
    Show { id: String },
    /// Verify the integrity of a chain
    Verify { id: String },
    /// Look up a link by hash or index
    Find {
        id: String,
        #[arg(long, conflicts_with = "index", required_unless_present = "index")]
        hash: Option<String>,
        #[arg(long)]
        index: Option<u64>,
    },
    /// Write a chain to stdout in another format
    Export {
        id: String,
        /// Target format
        #[arg(long = "to")]
        to: String,
    },
    /// Import a serialized chain from a file
    Import {
        file: PathBuf,
        /// Format of FILE (default: file extension)
        #[arg(long = "from")]
        from: Option<String>,
    },
    /// List stored chains
    List,
    /// List registered formats
    Formats,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = run(&cli);

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

struct Ctx {
    store: ChainStore,
    registry: CodecRegistry,
    format: String,
}

fn open(dir: &Path, format: Option<&str>) -> Result<Ctx, Box<dyn std::error::Error>> {
    let config = Config::load(dir)?;
    let registry = config.registry()?;
    let format = match format {
        Some(f) => registry.get(f)?.format().to_string(),
        None => registry.default_codec()?.format().to_string(),
    };
    Ok(Ctx {
        store: ChainStore::open(dir)?,
        registry,
        format,
    })
}

fn run(cli: &Cli) -> CliResult {
    let ctx = open(&cli.dir, cli.format.as_deref())?;
    match &cli.command {
        Commands::New { id } => cmd_new(&ctx, id.as_deref()),
        Commands::Append { id, data, hex } => cmd_append(&ctx, id, data, *hex),
        Commands::Show { id } => cmd_show(&ctx, id),
        Commands::Verify { id } => cmd_verify(&ctx, id),
        Commands::Find { id, hash, index } => cmd_find(&ctx, id, hash.as_deref(), *index),
        Commands::Export { id, to } => cmd_export(&ctx, id, to),
        Commands::Import { file, from } => cmd_import(&ctx, file, from.as_deref()),
        Commands::List => cmd_list(&ctx),
        Commands::Formats => cmd_formats(&ctx),
    }
}

fn load(ctx: &Ctx, id: &str) -> Result<SimpleBlockchain, Box<dyn std::error::Error>> {
    let codec = ctx.registry.get(&ctx.format)?;
    Ok(ctx.store.load(id, codec.as_ref())?)
}

fn save(ctx: &Ctx, chain: &SimpleBlockchain) -> CliResult {
    let codec = ctx.registry.get(&ctx.format)?;
    ctx.store.save(chain, codec.as_ref())?;
    Ok(())
}

fn print_link(link: &ChainLink) {
    println!(
        "#{} {} prev={} hash={} data={}",
        link.index(),
        link.timestamp(),
        abbreviate(link.previous_hash()),
        link.hash(),
        String::from_utf8_lossy(link.data()),
    );
}

fn cmd_new(ctx: &Ctx, id: Option<&str>) -> CliResult {
    let chain = match id {
        Some(id) => SimpleBlockchain::with_id(id),
        None => SimpleBlockchain::new(),
    };
    save(ctx, &chain)?;
    println!("Created chain {}", chain.id());
    Ok(())
}

fn cmd_append(ctx: &Ctx, id: &str, data: &str, is_hex: bool) -> CliResult {
    let mut chain = load(ctx, id)?;
    let bytes = if is_hex {
        linkchain::payload::decode(data)?
    } else {
        data.as_bytes().to_vec()
    };
    let link = chain.append(bytes)?.clone();
    save(ctx, &chain)?;
    println!("[{}] {}", link.index(), link.hash());
    Ok(())
}

fn cmd_show(ctx: &Ctx, id: &str) -> CliResult {
    let chain = load(ctx, id)?;
    println!("Chain {} ({} links)", chain.id(), chain.count());
    if chain.is_empty() {
        println!("(no links yet)");
    }
    for link in &chain {
        print_link(link);
    }
    Ok(())
}

fn cmd_verify(ctx: &Ctx, id: &str) -> CliResult {
    let codec = ctx.registry.get(&ctx.format)?;
    let chain = ctx.store.load_unverified(id, codec.as_ref())?;
    chain.verify()?;
    println!("Chain {} OK ({} links)", chain.id(), chain.count());
    Ok(())
}

fn cmd_find(ctx: &Ctx, id: &str, hash: Option<&str>, index: Option<u64>) -> CliResult {
    let chain = load(ctx, id)?;
    let link = match (hash, index) {
        (Some(h), _) => chain.find_by_hash(h)?,
        (None, Some(i)) => chain.find_by_index(i)?,
        (None, None) => return Err("either --hash or --index is required".into()),
    };
    print_link(link);
    Ok(())
}

fn cmd_export(ctx: &Ctx, id: &str, to: &str) -> CliResult {
    let chain = load(ctx, id)?;
    print!("{}", ctx.registry.serialize_with(Some(to), &chain)?);
    Ok(())
}

fn cmd_import(ctx: &Ctx, file: &Path, from: Option<&str>) -> CliResult {
    let key = from
        .map(String::from)
        .or_else(|| file.extension().and_then(|e| e.to_str()).map(String::from));
    let text = fs::read_to_string(file)?;
    let chain = ctx.registry.deserialize_with(key.as_deref(), &text)?;
    save(ctx, &chain)?;
    println!("Imported chain {} ({} links)", chain.id(), chain.count());
    Ok(())
}

fn cmd_list(ctx: &Ctx) -> CliResult {
    let chains = ctx.store.list()?;
    if chains.is_empty() {
        println!("(no chains)");
    }
    for (id, format) in chains {
        println!("{} [{}]", id, format);
    }
    Ok(())
}

fn cmd_formats(ctx: &Ctx) -> CliResult {
    for key in ctx.registry.keys() {
        if Some(key.as_str()) == ctx.registry.default_key() {
            println!("* {}", key);
        } else {
            println!("  {}", key);
        }
    }
    Ok(())
}
