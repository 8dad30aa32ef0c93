//! Command-line front end for the grouping engine, the resolver, and the
//! endpoint handlers over a local SQLite store.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use variant_gallery::{
    api::{MediaNode, Session, public::public_variant_images, save::save_mapping},
    config::GalleryConfig,
    engine::{
        grouping::derive,
        resolver::{GalleryPayload, GalleryResolver},
    },
    map::Assignment,
    persist::sqlite::SqliteMetafieldStore,
    types::ImageId,
};

#[derive(Parser, Debug)]
#[command(name = "variant-gallery")]
#[command(about = "Variant image grouping and storefront filtering")]
struct Args {
    /// Optional TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Group images from `{ "images": [...], "assignments": {...} }`
    Derive {
        /// Input JSON file
        input: PathBuf,
    },
    /// Show which page images are visible for a variant
    Visible {
        /// `{ imageMap, mediaMap }` JSON file
        payload: PathBuf,
        /// Selected variant (numeric or global id)
        #[arg(long)]
        variant: String,
        /// Page media ids (numeric or global id), in page order
        #[arg(long = "media-id")]
        media_ids: Vec<String>,
    },
    /// Register a product and its ordered media in a SQLite store
    Register {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        shop: String,
        #[arg(long)]
        handle: String,
        /// `ID=URL` pairs in catalog order
        #[arg(long = "media")]
        media: Vec<String>,
    },
    /// Run the public read endpoint against a SQLite store
    ServeRead {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        shop: String,
        #[arg(long)]
        handle: String,
    },
    /// Run the save endpoint against a SQLite store
    Save {
        #[arg(long)]
        db: PathBuf,
        /// Authenticated shop
        #[arg(long)]
        shop: String,
        /// `{ productId, imageMap }` JSON file
        body: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct DeriveInput {
    images: Vec<ImageId>,
    #[serde(default)]
    assignments: Assignment,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };

    match args.command {
        Cmd::Derive { input } => {
            let input: DeriveInput = read_json(&input)?;
            let map = derive(&input.images, &input.assignments);
            println!("{}", map.to_json()?);
        }
        Cmd::Visible {
            payload,
            variant,
            media_ids,
        } => {
            let raw = std::fs::read_to_string(&payload).with_context(|| format!("reading {}", payload.display()))?;
            let resolver = match serde_json::from_str::<GalleryPayload>(&raw) {
                Ok(payload) => GalleryResolver::new(payload, &media_ids),
                Err(err) => {
                    tracing::warn!(error = %err, "unusable gallery payload; showing every image");
                    GalleryResolver::inert(&media_ids)
                }
            };
            let view = resolver.on_variant_change(&variant);
            let out = serde_json::json!({ "shown": view.shown, "hidden": view.hidden });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Cmd::Register {
            db,
            product_id,
            shop,
            handle,
            media,
        } => {
            let nodes = media
                .iter()
                .map(|pair| {
                    pair.split_once('=')
                        .map(|(id, url)| MediaNode::new(id, url))
                        .with_context(|| format!("media entry {pair:?} is not ID=URL"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let mut store = SqliteMetafieldStore::open(&db).with_context(|| format!("opening {}", db.display()))?;
            store.upsert_product(&product_id, &shop, &handle)?;
            store.replace_media(&product_id, &nodes)?;
            tracing::info!(product_id = %product_id, media = nodes.len(), "product registered");
        }
        Cmd::ServeRead { db, shop, handle } => {
            let store = SqliteMetafieldStore::open(&db).with_context(|| format!("opening {}", db.display()))?;
            let response = public_variant_images(&store, &config, &shop, &handle);
            print_response(response.status, &response.body)?;
        }
        Cmd::Save { db, shop, body } => {
            let mut store = SqliteMetafieldStore::open(&db).with_context(|| format!("opening {}", db.display()))?;
            let raw = std::fs::read(&body).with_context(|| format!("reading {}", body.display()))?;
            let session = Session { shop };
            let response = save_mapping(Some(&session), &mut store, &config, &raw);
            print_response(response.status, &response.body)?;
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_response(status: u16, body: &serde_json::Value) -> anyhow::Result<()> {
    println!("{status}");
    println!("{}", serde_json::to_string_pretty(body)?);
    if !(200..300).contains(&status) {
        anyhow::bail!("request failed with status {status}");
    }
    Ok(())
}
