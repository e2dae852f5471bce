//! # Example: services and controllers wired through the registry
//!
//! Starts `db`, `cache` and `api` in that order, stops them in reverse after
//! Ctrl-C (or after three seconds).
//!
//! ```text
//! cargo run --example basic_runner
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use runvisor::{Component, ComponentError, Config, Controller, Runner, Service};

/// Pretend connection pool.
struct Database {
    name: &'static str,
    up: AtomicBool,
}

impl Database {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            up: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Component for Database {
    fn name(&self) -> &str {
        self.name
    }

    async fn start(&self) -> Result<(), ComponentError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.up.store(true, Ordering::SeqCst);
        println!("[{}] connected", self.name);
        Ok(())
    }

    async fn stop(&self) -> Result<(), ComponentError> {
        self.up.store(false, Ordering::SeqCst);
        println!("[{}] disconnected", self.name);
        Ok(())
    }

    async fn health(&self) -> Result<(), ComponentError> {
        if self.up.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ComponentError::unhealthy("not connected"))
        }
    }
}

impl Service for Database {}

/// Request-facing controller depending on both services.
struct Api {
    db: Arc<Database>,
    cache: Arc<Database>,
}

#[async_trait]
impl Component for Api {
    fn name(&self) -> &str {
        "api"
    }

    async fn start(&self) -> Result<(), ComponentError> {
        println!("[api] listening");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ComponentError> {
        println!("[api] closed");
        Ok(())
    }

    async fn health(&self) -> Result<(), ComponentError> {
        self.db.health().await?;
        self.cache.health().await
    }
}

impl Controller for Api {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::new("basic-runner", "1.0.0");
    runvisor::logging::init(&cfg);

    let mut runner = Runner::new(cfg);
    runner.create_service(|_| Ok(Database::new("db")))?;
    runner.create_service(|_| Ok(Database::new("cache")))?;
    let api = runner.create_controller(|ctx| {
        Ok(Api {
            db: ctx.service("db")?,
            cache: ctx.service("cache")?,
        })
    })?;

    let handle = runner.handle();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            if handle.await_ready().await {
                println!("[main] ready, api health: {:?}", api.health().await);
                tokio::time::sleep(Duration::from_secs(3)).await;
                handle.kill();
            }
        }
    });

    let report = runner.run().await?;
    println!("[main] shutdown clean: {}", report.is_clean());
    Ok(())
}
