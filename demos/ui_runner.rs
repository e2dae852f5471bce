//! # Example: UI-controller owning the foreground loop
//!
//! The UI-controller prints a tick every 200ms until either Ctrl-C arrives or
//! it decides to quit on its own after ten ticks. Both paths run the same
//! reverse-order shutdown.
//!
//! ```text
//! cargo run --example ui_runner
//! ```

use std::time::Duration;

use async_trait::async_trait;
use runvisor::{
    Component, ComponentError, Config, Controller, Runner, UiController, mock::MockService,
};
use tokio_util::sync::CancellationToken;

struct Console;

#[async_trait]
impl Component for Console {
    fn name(&self) -> &str {
        "console"
    }

    async fn start(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), ComponentError> {
        println!("[console] bye");
        Ok(())
    }

    async fn health(&self) -> Result<(), ComponentError> {
        Ok(())
    }
}

impl Controller for Console {}

#[async_trait]
impl UiController for Console {
    async fn run(&self, termination: CancellationToken) -> Result<(), ComponentError> {
        for tick in 1..=10 {
            tokio::select! {
                _ = termination.cancelled() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_millis(200)) => println!("[console] tick {tick}"),
            }
        }
        println!("[console] quitting");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::new("ui-runner", "1.0.0");
    runvisor::logging::init(&cfg);

    let mut runner = Runner::new(cfg);
    runner.create_service(|_| Ok(MockService::new("store")))?;
    runner.create_ui_controller(|_| Ok(Console))?;

    let report = runner.run().await?;
    println!("[main] shutdown clean: {}", report.is_clean());
    Ok(())
}
