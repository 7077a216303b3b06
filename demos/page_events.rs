//! Page Events
//!
//! This example demonstrates driving a page stack through its event channel.
//!
//! Key concepts:
//! - Queuing push and pop requests from code that cannot await them
//! - A single consumer loop applying requests in arrival order
//! - Failed requests logged without stopping the loop
//! - A transient splash page dropped once the next page covers it
//!
//! Run with: RUST_LOG=screenstack=info cargo run --example page_events

use async_trait::async_trait;
use screenstack::{from_fn, BoxError, Entry, HookResult, Navigator, PhaseContext, Screen, ScreenBuilder};
use std::error::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

struct Page {
    title: &'static str,
}

#[async_trait]
impl Screen for Page {
    async fn did_push_enter(&self, _ctx: PhaseContext) -> HookResult {
        println!("  showing {}", self.title);
        Ok(())
    }

    async fn did_pop_enter(&self, _ctx: PhaseContext) -> HookResult {
        println!("  back on {}", self.title);
        Ok(())
    }

    async fn cleanup(&self, _ctx: PhaseContext) -> HookResult {
        println!("  released {}", self.title);
        Ok(())
    }
}

fn page(id: &'static str) -> impl ScreenBuilder {
    from_fn(move |ctx, _cancel| async move { Ok::<_, BoxError>(ctx.entry(id, Page { title: id })) })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    println!("=== Page Events ===\n");

    let navigator = Navigator::new();
    let events = navigator.events();
    let worker = navigator
        .spawn_event_loop()
        .ok_or("event reader already taken")?;

    let splash = from_fn(|ctx, _cancel| async move {
        Ok::<_, BoxError>(ctx.entry("splash", Page { title: "splash" }))
    })
    .transient();
    events.send_push(splash)?;
    events.send_push(page("home"))?;
    events.send_push(from_fn(|_ctx, _cancel| async {
        Err::<Entry, BoxError>("profile service unavailable".into())
    }))?;
    events.send_push(page("settings"))?;
    events.send_pop(true)?;
    events.close();

    worker.await?;

    println!("\nfinal stack: {:?}", navigator.ids());
    println!("{}", serde_json::to_string_pretty(&navigator.snapshot())?);

    navigator.shutdown().await;
    println!("\n=== Done ===");
    Ok(())
}
