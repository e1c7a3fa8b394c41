use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use client_core::{GalleryController, HttpGalleryService, LoadOutcome};
use shared::domain::{ItemId, SortOrder};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_base_url};

#[derive(Parser, Debug)]
#[command(about = "Browse and rearrange a user's captured-image collection")]
struct Args {
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    user_id: Option<String>,
    /// asc or desc
    #[arg(long)]
    order: Option<SortOrder>,
    /// Move the item at FROM onto the position of the item at TO.
    #[arg(long = "move", num_args = 2, value_names = ["FROM", "TO"])]
    move_indices: Option<Vec<usize>>,
    #[arg(long, requires = "drop_on")]
    drag: Option<usize>,
    #[arg(long, requires = "drag")]
    drop_on: Option<usize>,
    /// Show the detail card after paging forward N times.
    #[arg(long)]
    page: Option<usize>,
    /// Request timeout in seconds, 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(base_url) = &args.base_url {
        settings.base_url = normalize_base_url(base_url)?;
    }
    if let Some(user_id) = args.user_id.clone() {
        settings.user_id = Some(user_id);
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = (secs > 0).then_some(secs);
    }
    let user_id = settings
        .user_id
        .clone()
        .context("no user id configured; pass --user-id or set GALLERY_USER_ID")?;
    info!(
        base_url = %settings.base_url,
        timeout_secs = ?settings.request_timeout_secs,
        "gallery settings resolved"
    );

    let service = match settings.request_timeout_secs {
        Some(secs) => {
            HttpGalleryService::with_timeout(&settings.base_url, Duration::from_secs(secs))?
        }
        None => HttpGalleryService::new(&settings.base_url),
    };
    let mut controller = GalleryController::new(Arc::new(service));

    match controller.load_now(&user_id).await? {
        LoadOutcome::Replaced { count, .. } => {
            println!("Loaded {count} captured items for {user_id}");
        }
        LoadOutcome::Failed { error, .. } => {
            bail!("could not load collection for {user_id}: {error}");
        }
        LoadOutcome::Stale { generation, latest } => {
            return Err(anyhow!("load {generation} was superseded by load {latest}"));
        }
    }

    if let Some(order) = args.order {
        controller.set_sort_order(order);
        println!("Sorted by {order}");
    }

    if let Some(indices) = &args.move_indices {
        let (from, to) = (indices[0], indices[1]);
        let moved = match (id_at(&controller, from), id_at(&controller, to)) {
            (Some(moved), Some(target)) => controller.reorder_by_id(&moved, &target),
            _ => false,
        };
        report_move("move", from, to, moved);
    }

    if let (Some(from), Some(to)) = (args.drag, args.drop_on) {
        if let Some(dragged) = id_at(&controller, from) {
            controller.begin_drag(&dragged);
        }
        let dropped = match id_at(&controller, to) {
            Some(target) => controller.drop_on(&target),
            None => false,
        };
        controller.cancel_drag();
        report_move("drag", from, to, dropped);
    }

    print_collection(&controller);

    if let Some(steps) = args.page {
        let mut pager = controller.detail_pager();
        for _ in 0..steps {
            pager.next();
        }
        match pager.card() {
            Some(card) => {
                println!();
                println!("[{}/{}] {}", pager.index() + 1, pager.len(), card.title);
                println!("  {}", card.location);
                println!("  {}", card.date);
                println!("  {}", card.probability);
                println!("  image: {}", card.image_url);
            }
            None => println!("No captured items available."),
        }
    }

    Ok(())
}

fn id_at(controller: &GalleryController, index: usize) -> Option<ItemId> {
    controller.items().get(index).map(|item| item.id.clone())
}

fn report_move(action: &str, from: usize, to: usize, applied: bool) {
    if applied {
        println!("Applied {action} {from} -> {to}");
    } else {
        println!("Ignored {action} {from} -> {to} (item missing or same position)");
    }
}

fn print_collection(controller: &GalleryController) {
    if controller.items().is_empty() {
        println!("No captured items available.");
        return;
    }
    for (index, item) in controller.items().iter().enumerate() {
        println!(
            "{index:>3}  {:<24} {:<30} {:<24} {}",
            item.image_classification, item.date_added, item.location_taken, item.probability
        );
    }
}
