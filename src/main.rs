use album_site::album::fetch_photo;
use album_site::catalog::{Catalog, has_photo_extension, photo_key};
use album_site::config::{self, FailurePolicy};
use album_site::output;
use album_site::publish::Publisher;
use album_site::site::{SiteAssembler, SiteOptions};
use album_site::staging::Staging;
use album_site::store::S3Store;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "album-site")]
#[command(about = "Publish photo albums stored in a bucket as a static website")]
#[command(long_about = "\
Publish photo albums stored in a bucket as a static website

Albums are key prefixes. Every .jpg/.jpeg under a prefix belongs to that album:

  mybucket/
  ├── trip/a.jpg
  ├── trip/b.jpg
  └── beach/c.jpg

'album-site build' renders one page per album plus an index and uploads them
to the bucket root:

  mybucket/
  ├── trip.html                    # Links to trip/a.jpg, trip/b.jpg
  ├── beach.html
  └── index.html                   # Links to every album page

then enables website hosting and prints https://<bucket>.<website-domain>.

Run 'album-site gen-config' to generate a documented album-site.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Bucket name (overrides store.bucket)
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// Object store endpoint URL (overrides store.endpoint_url)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List albums in the bucket
    Albums,
    /// List the photos of one album
    Photos {
        album: String,
    },
    /// Upload photos into an album (directories are searched for .jpg/.jpeg)
    Upload {
        album: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Download the photos of one album
    Download {
        album: String,
        /// Destination directory
        #[arg(long, default_value = ".")]
        dest: PathBuf,
    },
    /// Generate album pages and the index, upload them, enable website hosting
    Build(BuildArgs),
    /// Print a stock album-site.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Staging directory (overrides pipeline.staging_dir; default: fresh temp dir)
    #[arg(long)]
    staging: Option<PathBuf>,

    /// Abort the build at the first failed album
    #[arg(long)]
    strict: bool,

    /// Write a JSON report of published and failed albums
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut site_config = config::load_config(&cli.config)?;
    if let Some(bucket) = cli.bucket {
        site_config.store.bucket = bucket;
    }
    if let Some(endpoint) = cli.endpoint {
        site_config.store.endpoint_url = Some(endpoint);
    }
    site_config.validate()?;

    let store = S3Store::connect(&site_config.store)?;

    match cli.command {
        Command::Albums => {
            let albums = Catalog::new(&store).list_albums()?;
            output::print_lines(output::format_albums(&albums));
        }
        Command::Photos { album } => {
            let photos = Catalog::new(&store).list_photos(&album)?;
            output::print_lines(output::format_photos(&album, &photos));
        }
        Command::Upload { album, paths } => {
            let publisher = Publisher::new(&store, config::website_domain(&site_config));
            for file in collect_photos(&paths)? {
                let Some(name) = file.file_name() else {
                    continue;
                };
                let key = photo_key(&album, &name.to_string_lossy());
                publisher.publish_file(&file, &key)?;
                println!("{} \u{2192} {}", file.display(), key);
            }
        }
        Command::Download { album, dest } => {
            let photos = Catalog::new(&store).list_photos(&album)?;
            std::fs::create_dir_all(&dest)?;
            for photo in &photos {
                let key = photo_key(&album, photo);
                let path = dest.join(photo.replace('/', "-"));
                fetch_photo(&store, &key, &path)?;
                println!("{} \u{2192} {}", key, path.display());
            }
        }
        Command::Build(args) => {
            let mut options = SiteOptions::from_config(&site_config);
            if args.strict {
                options.policy = FailurePolicy::Abort;
            }

            let staging = match args.staging.or(site_config.pipeline.staging_dir.clone()) {
                Some(dir) => Staging::locked(&dir)?,
                None => Staging::temporary()?,
            };

            println!("==> Building site for {}", store_label(&site_config));
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_lines(output::format_site_event(&event));
                }
            });
            let result = SiteAssembler::new(&store, &staging, &options)
                .with_events(Some(&tx))
                .build_site();
            drop(tx);
            printer.join().unwrap();
            let report = result?;

            if let Some(path) = args.report {
                let json = serde_json::to_string_pretty(&report.summary())?;
                std::fs::write(&path, json)?;
            }
            output::print_lines(output::format_site_report(&report));
        }
        Command::GenConfig => unreachable!("handled before connecting"),
    }

    Ok(())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default: warnings).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn store_label(config: &config::SiteConfig) -> String {
    match &config.store.endpoint_url {
        Some(endpoint) => format!("{} at {}", config.store.bucket, endpoint),
        None => config.store.bucket.clone(),
    }
}

/// Expand the upload arguments: files as given, directories walked for photos.
fn collect_photos(paths: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_photo_path(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_photo_path(path: &Path) -> bool {
    path.file_name()
        .map(|n| has_photo_extension(&n.to_string_lossy()))
        .unwrap_or(false)
}
