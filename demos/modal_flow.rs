//! Modal Flow
//!
//! This example demonstrates a confirmation dialog stacked over a page.
//!
//! Key concepts:
//! - Pages and modals on separate navigators sharing one transition lock
//! - A modal that closes itself through its completion signal
//! - Fire-and-forget pushes that pop once the modal completes
//! - Exit signals that stop a screen's background work when it is covered
//!
//! Run with: RUST_LOG=screenstack=debug cargo run --example modal_flow

use async_trait::async_trait;
use screenstack::{
    from_fn, BoxError, CancelSignal, CompletionSignal, EntryKind, HookResult, NavigatorBuilder,
    PhaseContext, Screen, TransitionLock,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// A page that ticks while it is the active screen
struct Dashboard;

#[async_trait]
impl Screen for Dashboard {
    async fn did_push_enter(&self, ctx: PhaseContext) -> HookResult {
        start_ticker(ctx);
        Ok(())
    }

    async fn did_pop_enter(&self, ctx: PhaseContext) -> HookResult {
        start_ticker(ctx);
        Ok(())
    }
}

fn start_ticker(ctx: PhaseContext) {
    let Some(active) = ctx.active_signal().cloned() else {
        return;
    };
    tokio::spawn(async move {
        let mut ticks = 0u32;
        while active
            .run_until_cancelled(tokio::time::sleep(Duration::from_millis(25)))
            .await
            .is_ok()
        {
            ticks += 1;
        }
        println!("dashboard ticker stopped after {ticks} ticks");
    });
}

// A modal that answers after a short delay
struct Confirm {
    done: CompletionSignal,
}

#[async_trait]
impl Screen for Confirm {
    async fn did_push_enter(&self, ctx: PhaseContext) -> HookResult {
        let done = self.done.clone();
        let dispose = ctx.dispose_signal().clone();
        tokio::spawn(async move {
            if dispose
                .run_until_cancelled(tokio::time::sleep(Duration::from_millis(100)))
                .await
                .is_ok()
            {
                println!("user pressed OK");
                done.resolve();
            }
        });
        Ok(())
    }

    async fn cleanup(&self, _ctx: PhaseContext) -> HookResult {
        println!("confirm dialog released");
        Ok(())
    }

    fn completion(&self) -> Option<CompletionSignal> {
        Some(self.done.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    println!("=== Modal Flow ===\n");

    let lock = Arc::new(TransitionLock::new());
    let pages = NavigatorBuilder::new()
        .name("pages")
        .transition_lock(Arc::clone(&lock))
        .build()?;
    let modals = NavigatorBuilder::new()
        .name("modals")
        .kind(EntryKind::Modal)
        .transition_lock(lock)
        .build()?;

    let cancel = CancelSignal::never();
    pages
        .push(
            from_fn(|ctx, _cancel| async move { Ok::<_, BoxError>(ctx.entry("dashboard", Dashboard)) }),
            &cancel,
        )
        .await?;
    println!("pages: {:?}", pages.ids());

    tokio::time::sleep(Duration::from_millis(80)).await;

    let dialog = modals.push_and_forget(from_fn(|ctx, _cancel| async move {
        Ok::<_, BoxError>(ctx.entry(
            "confirm",
            Confirm {
                done: CompletionSignal::new(),
            },
        ))
    }));
    let _ = modals.watch().wait_for(|ids| !ids.is_empty()).await?;
    println!("modals: {:?}", modals.ids());

    dialog.await?;
    println!("modals after close: {:?}", modals.ids());

    println!("\nsnapshot: {}", serde_json::to_string_pretty(&pages.snapshot())?);

    pages.pop_all(true, &cancel).await?;
    modals.shutdown().await;
    pages.shutdown().await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    println!("\n=== Done ===");
    Ok(())
}
