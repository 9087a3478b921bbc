//! Record Lifecycle
//!
//! This example walks two records through their lifecycle.
//!
//! Key concepts:
//! - Loading a record and editing it into the `updated` family
//! - A new comment waiting on its unsaved post before committing
//! - Server-side validation errors and how they clear
//! - Checkpointing a manager and resuming it
//!
//! Run with: RUST_LOG=record_state=debug cargo run --example record_lifecycle

use record_state::core::{ErrorMap, Event};
use record_state::memory::{MemoryRecord, MemoryStore, MemoryTransaction};
use record_state::{Checkpoint, LifecycleError, StateManager};
use serde_json::json;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn show(label: &str, manager: &StateManager<MemoryRecord>) {
    let flags = manager.flags();
    println!(
        "  {label:<10} {:<32} loaded={} dirty={} saving={} valid={} pending={}",
        manager.current_path(),
        flags.is_loaded,
        flags.is_dirty,
        flags.is_saving,
        flags.is_valid,
        flags.is_pending,
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("record_state=info".parse()?),
        )
        .init();

    let transaction = MemoryTransaction::shared();
    let store = MemoryStore::shared();
    let record = |kind: &str| {
        MemoryRecord::new(kind)
            .in_transaction(Rc::clone(&transaction))
            .attached_to(Rc::clone(&store))
    };

    println!("=== Loading and editing ===");
    let mut article = StateManager::new(record("article"));
    show("new", &article);
    article.send(Event::LoadingData)?;
    show("loading", &article);
    article.send(Event::SetData(json!({"title": "Draft", "body": "..."})))?;
    show("loaded", &article);
    article.send(Event::set_property("title", json!("Final")))?;
    show("edited", &article);
    println!("  timeline: {:?}", article.record().timeline());

    println!("\n=== Waiting on another record ===");
    let mut post = StateManager::new(record("post"));
    let mut comment = StateManager::new(record("comment"));
    comment.send(Event::DidCreate)?;
    comment.send(Event::WaitingOn(post.load_signal()))?;
    comment.send(Event::WillCommit)?;
    show("comment", &comment);

    post.send(Event::DidCreate)?;
    let delivered = comment.process_notifications()?;
    println!("  delivered {delivered} notification(s)");
    show("comment", &comment);

    println!("\n=== Validation ===");
    post.send(Event::WillCommit)?;
    let mut errors = ErrorMap::new();
    errors.insert("title".to_string(), "can't be blank".to_string());
    post.send(Event::WasInvalid(errors))?;
    show("rejected", &post);

    let checkpoint = post.checkpoint().to_json()?;
    println!("  checkpoint:\n{checkpoint}");
    let mut post = StateManager::restore(post.into_record(), Checkpoint::from_json(&checkpoint)?)?;
    post.send(Event::set_property("title", json!("Hello")))?;
    show("fixed", &post);

    println!("\n=== Faults ===");
    match post.send(Event::WillLoadData) {
        Err(LifecycleError::CannotLoadData { state }) => {
            println!("  cannot load data while in {state}")
        }
        other => println!("  unexpected: {other:?}"),
    }

    println!("\n=== Transaction ===");
    println!("  calls: {}", transaction.borrow().calls().len());
    println!("  hash updates: {}", store.borrow().updated().len());
    Ok(())
}
