//! # Runner: wires components and drives the ordered start/stop sequence.
//!
//! The [`Runner`] owns the [`Context`], the creation order of services and
//! controllers, and the termination token. Components are created through
//! factories during `Building`; [`run`](Runner::run) then walks the state
//! machine once.
//!
//! ## Lifecycle
//! ```text
//! Building ──► create_service / create_controller / create_ui_controller
//!                 (factory(&Context) ─► register ─► append name to order)
//!
//! run():
//!   ServicesStarting     services[0..N].start()        (creation order)
//!   ControllersStarting  controllers[0..M].start()     (creation order)
//!   UiStarting           ui.start()                    (if present)
//!   Ready                ──► await_ready() resolves
//!   Running              ui.run(termination)           (if present)
//!                        termination.cancelled()       (otherwise)
//!   UiStopping           ui.stop()
//!   ControllersStopping  controllers[M..0].stop()      (reverse order)
//!   ServicesStopping     services[N..0].stop()         (reverse order)
//!   Terminated
//! ```
//!
//! ## Rules
//! - Startup is sequential; a failing (or panicking) `start` is a boot-time
//!   fatal error.
//! - Shutdown is best-effort and total: a failing (or panicking) `stop` is
//!   logged, recorded in the [`ShutdownReport`], and the sequence continues.
//! - Termination comes from [`RunnerHandle::kill`], an OS signal, or the
//!   UI-controller's `run` returning. All three cancel the same token.
//! - While a UI-controller is running, only it waits on the termination token.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::task::AbortOnDropHandle;
use tracing::{info, warn};

use super::{
    context::Context,
    fatal::FatalPolicy,
    handle::RunnerHandle,
    report::{ShutdownReport, StopFailure},
    shutdown,
    state::RunnerState,
};
use crate::components::{ComponentKind, Controller, Service, UiController};
use crate::config::Config;
use crate::error::{ComponentError, RuntimeError};

/// Components resolved from the registry in creation order.
struct Plan {
    services: Vec<(String, Arc<dyn Service>)>,
    controllers: Vec<(String, Arc<dyn Controller>)>,
    ui: Option<Arc<dyn UiController>>,
}

/// How far startup got; shutdown only stops what was started.
#[derive(Default)]
struct Progress {
    services: usize,
    controllers: usize,
    ui: bool,
}

/// Dependency-injection runner with ordered startup and reverse-order shutdown.
pub struct Runner {
    cfg: Config,
    ctx: Context,
    services_order: Vec<String>,
    controllers_order: Vec<String>,
    fatal: Arc<dyn FatalPolicy>,
    handle: RunnerHandle,
}

impl Runner {
    /// Creates a runner with the default [`ExitProcess`](crate::ExitProcess) policy.
    pub fn new(cfg: Config) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder for customizing the fatal policy.
    pub fn builder(cfg: Config) -> super::builder::RunnerBuilder {
        super::builder::RunnerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, fatal: Arc<dyn FatalPolicy>) -> Self {
        info!(project = %cfg.project_name, version = %cfg.version, "{} {}", cfg.project_name, cfg.version);

        Self {
            ctx: Context::new(Arc::clone(&fatal)),
            cfg,
            services_order: Vec::new(),
            controllers_order: Vec::new(),
            fatal,
            handle: RunnerHandle::new(),
        }
    }

    /// Builds a service with `factory` and registers it.
    ///
    /// The factory receives the context so it can resolve components created
    /// before it. The returned instance must not be started yet.
    pub fn create_service<S, F>(&mut self, factory: F) -> Result<Arc<S>, RuntimeError>
    where
        S: Service,
        F: FnOnce(&Context) -> Result<S, RuntimeError>,
    {
        let service = Arc::new(factory(&self.ctx).map_err(|e| self.report(e))?);
        self.ctx.register_service(Arc::clone(&service))?;
        self.services_order.push(service.name().to_string());
        Ok(service)
    }

    /// Builds a controller with `factory` and registers it.
    pub fn create_controller<C, F>(&mut self, factory: F) -> Result<Arc<C>, RuntimeError>
    where
        C: Controller,
        F: FnOnce(&Context) -> Result<C, RuntimeError>,
    {
        let controller = Arc::new(factory(&self.ctx).map_err(|e| self.report(e))?);
        self.ctx.register_controller(Arc::clone(&controller))?;
        self.controllers_order.push(controller.name().to_string());
        Ok(controller)
    }

    /// Builds the UI-controller with `factory` and registers it.
    pub fn create_ui_controller<U, F>(&mut self, factory: F) -> Result<Arc<U>, RuntimeError>
    where
        U: UiController,
        F: FnOnce(&Context) -> Result<U, RuntimeError>,
    {
        let ui = Arc::new(factory(&self.ctx).map_err(|e| self.report(e))?);
        self.ctx.register_ui_controller(Arc::clone(&ui))?;
        Ok(ui)
    }

    /// Returns a handle for `await_ready`, `kill` and state observation.
    pub fn handle(&self) -> RunnerHandle {
        self.handle.clone()
    }

    /// Returns the registry.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Returns the configuration the runner was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Service names in creation (= start) order.
    pub fn services_order(&self) -> &[String] {
        &self.services_order
    }

    /// Controller names in creation (= start) order.
    pub fn controllers_order(&self) -> &[String] {
        &self.controllers_order
    }

    /// Starts everything, waits for termination, then stops everything in reverse.
    ///
    /// Returns the [`ShutdownReport`] once shutdown completed. Returns `Err`
    /// only for a boot-time error under a non-exiting fatal policy; in that
    /// case the components already started are stopped before returning.
    pub async fn run(self) -> Result<ShutdownReport, RuntimeError> {
        // Dropping the guard aborts the listener, also when `run` is cancelled.
        let _signals = self.cfg.handle_os_signals.then(|| {
            AbortOnDropHandle::new(shutdown::spawn_signal_listener(
                self.handle.termination().clone(),
            ))
        });

        self.drive().await
    }

    async fn drive(&self) -> Result<ShutdownReport, RuntimeError> {
        let mut progress = Progress::default();
        let plan = match self.resolve() {
            Ok(plan) => plan,
            Err(err) => {
                self.handle.publish(RunnerState::Failed).await;
                return Err(err);
            }
        };

        info!(project = %self.cfg.project_name, "starting ...");
        if let Err(err) = self.start_all(&plan, &mut progress).await {
            self.fatal.fatal(&err);
            self.handle.publish(RunnerState::Failed).await;

            let report = self.stop_all(&plan, &progress, false).await;
            warn!(
                label = err.as_label(),
                stop_failures = report.failures.len(),
                "startup aborted; started components were stopped"
            );
            return Err(err);
        }

        self.handle.publish(RunnerState::Ready).await;
        info!(project = %self.cfg.project_name, "ready");

        let ui_run_error = self.wait_for_termination(plan.ui.as_ref()).await;

        info!(project = %self.cfg.project_name, "stopping ...");
        let mut report = self.stop_all(&plan, &progress, true).await;
        report.ui_run_error = ui_run_error;

        self.handle.publish(RunnerState::Terminated).await;
        info!(
            project = %self.cfg.project_name,
            failures = report.failures.len(),
            "stopped"
        );
        Ok(report)
    }

    /// Looks up every component in creation order.
    fn resolve(&self) -> Result<Plan, RuntimeError> {
        let services = self
            .services_order
            .iter()
            .map(|name| -> Result<_, RuntimeError> { Ok((name.clone(), self.ctx.get_service(name)?)) })
            .collect::<Result<Vec<_>, RuntimeError>>()?;
        let controllers = self
            .controllers_order
            .iter()
            .map(|name| -> Result<_, RuntimeError> { Ok((name.clone(), self.ctx.get_controller(name)?)) })
            .collect::<Result<Vec<_>, RuntimeError>>()?;

        Ok(Plan {
            services,
            controllers,
            ui: self.ctx.get_ui_controller(),
        })
    }

    async fn start_all(&self, plan: &Plan, progress: &mut Progress) -> Result<(), RuntimeError> {
        self.handle.publish(RunnerState::ServicesStarting).await;
        for (name, service) in &plan.services {
            start_one(ComponentKind::Service, name, service.start()).await?;
            progress.services += 1;
        }

        self.handle.publish(RunnerState::ControllersStarting).await;
        for (name, controller) in &plan.controllers {
            start_one(ComponentKind::Controller, name, controller.start()).await?;
            progress.controllers += 1;
        }

        if let Some(ui) = &plan.ui {
            self.handle.publish(RunnerState::UiStarting).await;
            start_one(ComponentKind::UiController, ui.name(), ui.start()).await?;
            progress.ui = true;
        }
        Ok(())
    }

    /// Blocks until termination; returns the UI-controller's `run` error, if any.
    async fn wait_for_termination(&self, ui: Option<&Arc<dyn UiController>>) -> Option<ComponentError> {
        self.handle.publish(RunnerState::Running).await;
        let termination = self.handle.termination();

        let Some(ui) = ui else {
            termination.cancelled().await;
            return None;
        };

        info!(
            component = ui.name(),
            kind = ComponentKind::UiController.as_label(),
            "ui-controller owns the foreground"
        );
        let outcome = AssertUnwindSafe(ui.run(termination.clone()))
            .catch_unwind()
            .await;
        // The UI returning on its own ends the run as well.
        termination.cancel();

        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(error)) => {
                warn!(component = ui.name(), label = error.as_label(), "ui-controller run failed: {error}");
                Some(error)
            }
            Err(panic) => {
                let error = ComponentError::fail(format!("run panicked: {}", panic_message(panic.as_ref())));
                warn!(component = ui.name(), "ui-controller {error}");
                Some(error)
            }
        }
    }

    /// Stops what `progress` says was started, UI first, services last.
    async fn stop_all(&self, plan: &Plan, progress: &Progress, publish: bool) -> ShutdownReport {
        let mut report = ShutdownReport::default();

        if let Some(ui) = plan.ui.as_ref().filter(|_| progress.ui) {
            if publish {
                self.handle.publish(RunnerState::UiStopping).await;
            }
            stop_one(ComponentKind::UiController, ui.name(), ui.stop(), &mut report).await;
        }

        if publish {
            self.handle.publish(RunnerState::ControllersStopping).await;
        }
        for (name, controller) in plan.controllers.iter().take(progress.controllers).rev() {
            stop_one(ComponentKind::Controller, name, controller.stop(), &mut report).await;
        }

        if publish {
            self.handle.publish(RunnerState::ServicesStopping).await;
        }
        for (name, service) in plan.services.iter().take(progress.services).rev() {
            stop_one(ComponentKind::Service, name, service.stop(), &mut report).await;
        }

        report
    }

    /// Forwards a factory error to the fatal policy.
    ///
    /// Registry errors were already reported by the context.
    fn report(&self, err: RuntimeError) -> RuntimeError {
        if !matches!(err, RuntimeError::Registry(_)) {
            self.fatal.fatal(&err);
        }
        err
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("project", &self.cfg.project_name)
            .field("services_order", &self.services_order)
            .field("controllers_order", &self.controllers_order)
            .field("state", &self.handle.state())
            .finish()
    }
}

async fn start_one<F>(kind: ComponentKind, name: &str, start: F) -> Result<(), RuntimeError>
where
    F: Future<Output = Result<(), ComponentError>>,
{
    info!(component = name, kind = kind.as_label(), "starting {kind} ...");
    let error = match AssertUnwindSafe(start).catch_unwind().await {
        Ok(Ok(())) => {
            info!(component = name, kind = kind.as_label(), "{kind} started");
            return Ok(());
        }
        Ok(Err(error)) => error,
        Err(panic) => ComponentError::fail(format!("start panicked: {}", panic_message(panic.as_ref()))),
    };

    Err(RuntimeError::StartFailed {
        kind,
        name: name.to_string(),
        error,
    })
}

async fn stop_one<F>(kind: ComponentKind, name: &str, stop: F, report: &mut ShutdownReport)
where
    F: Future<Output = Result<(), ComponentError>>,
{
    info!(component = name, kind = kind.as_label(), "stopping {kind} ...");
    let error = match AssertUnwindSafe(stop).catch_unwind().await {
        Ok(Ok(())) => {
            info!(component = name, kind = kind.as_label(), "{kind} stopped");
            return;
        }
        Ok(Err(error)) => error,
        Err(panic) => ComponentError::fail(format!("stop panicked: {}", panic_message(panic.as_ref()))),
    };

    warn!(
        component = name,
        kind = kind.as_label(),
        label = error.as_label(),
        "cannot stop {kind}: {error}"
    );
    report.failures.push(StopFailure {
        kind,
        name: name.to_string(),
        error,
    });
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Component;
    use crate::components::mock::{CallLog, MockController, MockService, MockUiController};
    use crate::core::fatal::RecordFatal;
    use crate::error::RegistryError;
    use std::time::Duration;

    fn test_runner() -> (Runner, RecordFatal) {
        let rec = RecordFatal::new();
        let cfg = Config {
            handle_os_signals: false,
            ..Config::new("test", "0.0.0")
        };
        (Runner::builder(cfg).with_fatal_policy(rec.clone()).build(), rec)
    }

    fn service(log: &CallLog, name: &'static str) -> impl FnOnce(&Context) -> Result<MockService, RuntimeError> {
        let log = log.clone();
        move |_| Ok(MockService::new(name).with_log(log))
    }

    fn controller(log: &CallLog, name: &'static str) -> impl FnOnce(&Context) -> Result<MockController, RuntimeError> {
        let log = log.clone();
        move |_| Ok(MockController::new(name).with_log(log))
    }

    #[tokio::test]
    async fn test_start_in_creation_order_stop_in_reverse() {
        let (mut runner, rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner.create_service(service(&log, "cache")).unwrap();
        runner.create_controller(controller(&log, "api")).unwrap();

        let handle = runner.handle();
        let run = tokio::spawn(runner.run());

        assert!(handle.await_ready().await);
        assert_eq!(log.names_for("start"), vec!["db", "cache", "api"]);
        assert!(log.names_for("stop").is_empty());

        handle.kill();
        let report = run.await.unwrap().unwrap();

        assert!(report.is_clean());
        assert_eq!(log.names_for("stop"), vec!["api", "cache", "db"]);
        assert_eq!(handle.state(), RunnerState::Terminated);
        assert_eq!(rec.count(), 0);
    }

    #[tokio::test]
    async fn test_ui_controller_starts_last_and_stops_first() {
        let (mut runner, _rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner.create_controller(controller(&log, "api")).unwrap();
        let ui = runner
            .create_ui_controller({
                let log = log.clone();
                move |_| Ok(MockUiController::new("tui").with_log(log))
            })
            .unwrap();

        let handle = runner.handle();
        let run = tokio::spawn(runner.run());
        assert!(handle.await_ready().await);

        handle.kill();
        run.await.unwrap().unwrap();

        assert_eq!(
            log.entries(),
            vec![
                "start:db", "start:api", "start:tui", "run:tui", "stop:tui", "stop:api", "stop:db"
            ]
        );
        assert_eq!(ui.run_calls(), 1);
    }

    #[tokio::test]
    async fn test_ui_controller_returning_begins_shutdown() {
        let (mut runner, _rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner
            .create_ui_controller(|_| Ok(MockUiController::new("tui").exit_with(Err(ComponentError::fail("closed")))))
            .unwrap();
        let handle = runner.handle();

        let report = tokio::time::timeout(Duration::from_secs(1), runner.run())
            .await
            .expect("run must finish when the ui-controller returns")
            .unwrap();

        assert_eq!(report.ui_run_error, Some(ComponentError::fail("closed")));
        assert_eq!(log.names_for("stop"), vec!["db"]);
        assert!(handle.is_terminating());
    }

    #[tokio::test]
    async fn test_stop_failure_does_not_abort_shutdown() {
        let (mut runner, rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner
            .create_service({
                let log = log.clone();
                move |_| {
                    Ok(MockService::new("cache")
                        .with_log(log)
                        .on_stop(|| Err(ComponentError::fail("socket busy"))))
                }
            })
            .unwrap();
        runner.create_controller(controller(&log, "api")).unwrap();
        runner.handle().kill();

        let report = runner.run().await.unwrap();

        assert_eq!(log.names_for("stop"), vec!["api", "cache", "db"]);
        assert_eq!(
            report.failures,
            vec![StopFailure {
                kind: ComponentKind::Service,
                name: "cache".into(),
                error: ComponentError::fail("socket busy"),
            }]
        );
        assert_eq!(rec.count(), 0);
    }

    #[tokio::test]
    async fn test_panicking_stop_is_reported_and_shutdown_continues() {
        let (mut runner, _rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner
            .create_controller({
                let log = log.clone();
                move |_| Ok(MockController::new("api").with_log(log).on_stop(|| panic!("boom")))
            })
            .unwrap();
        runner.handle().kill();

        let report = runner.run().await.unwrap();

        assert_eq!(log.names_for("stop"), vec!["api", "db"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error, ComponentError::fail("stop panicked: boom"));
    }

    #[tokio::test]
    async fn test_start_failure_is_fatal_and_rolls_back() {
        let (mut runner, rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner
            .create_service({
                let log = log.clone();
                move |_| {
                    Ok(MockService::new("cache")
                        .with_log(log)
                        .on_start(|| Err(ComponentError::fail("refused"))))
                }
            })
            .unwrap();
        runner.create_controller(controller(&log, "api")).unwrap();
        let handle = runner.handle();

        let err = runner.run().await.unwrap_err();

        assert_eq!(
            err,
            RuntimeError::StartFailed {
                kind: ComponentKind::Service,
                name: "cache".into(),
                error: ComponentError::fail("refused"),
            }
        );
        assert_eq!(rec.errors(), vec![err]);
        assert_eq!(log.names_for("start"), vec!["db", "cache"]);
        assert_eq!(log.names_for("stop"), vec!["db"]);
        assert_eq!(handle.state(), RunnerState::Failed);
        assert!(!handle.await_ready().await);
    }

    #[tokio::test]
    async fn test_panicking_start_is_fatal_and_rolls_back() {
        let (mut runner, rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner
            .create_service({
                let log = log.clone();
                move |_| Ok(MockService::new("cache").with_log(log).on_start(|| panic!("boom")))
            })
            .unwrap();
        runner.create_controller(controller(&log, "api")).unwrap();
        let handle = runner.handle();

        let run = tokio::spawn(runner.run());
        let ready = tokio::time::timeout(Duration::from_secs(1), handle.await_ready())
            .await
            .expect("await_ready must resolve when a start panics");
        assert!(!ready);

        let err = run.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            RuntimeError::StartFailed {
                kind: ComponentKind::Service,
                name: "cache".into(),
                error: ComponentError::fail("start panicked: boom"),
            }
        );
        assert_eq!(rec.errors(), vec![err]);
        assert_eq!(log.names_for("stop"), vec!["db"]);
        assert_eq!(handle.state(), RunnerState::Failed);
    }

    #[tokio::test]
    async fn test_panicking_ui_start_stops_everything_started() {
        let (mut runner, rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner.create_controller(controller(&log, "api")).unwrap();
        let ui = runner
            .create_ui_controller(|_| Ok(MockUiController::new("tui").on_start(|| panic!("no tty"))))
            .unwrap();

        let err = runner.run().await.unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::StartFailed { kind: ComponentKind::UiController, .. }
        ));
        assert_eq!(rec.count(), 1);
        assert_eq!(ui.run_calls(), 0);
        assert_eq!(ui.stop_calls(), 0);
        assert_eq!(log.names_for("stop"), vec!["api", "db"]);
    }

    #[tokio::test]
    async fn test_await_ready_waits_for_every_start() {
        let (mut runner, _rec) = test_runner();
        let gate = Arc::new(tokio::sync::Notify::new());

        struct Slow(Arc<tokio::sync::Notify>);

        #[async_trait::async_trait]
        impl Component for Slow {
            fn name(&self) -> &str {
                "slow"
            }
            async fn start(&self) -> Result<(), ComponentError> {
                self.0.notified().await;
                Ok(())
            }
            async fn stop(&self) -> Result<(), ComponentError> {
                Ok(())
            }
            async fn health(&self) -> Result<(), ComponentError> {
                Ok(())
            }
        }
        impl Service for Slow {}

        runner.create_service({
            let gate = Arc::clone(&gate);
            move |_| Ok(Slow(gate))
        })
        .unwrap();

        let handle = runner.handle();
        let run = tokio::spawn(runner.run());

        let mut ready = tokio::spawn({
            let handle = handle.clone();
            async move { handle.await_ready().await }
        });
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut ready)
                .await
                .is_err(),
            "await_ready must wait while a start is pending"
        );
        assert_eq!(handle.state(), RunnerState::ServicesStarting);

        gate.notify_one();
        assert!(ready.await.unwrap());

        handle.kill();
        run.await.unwrap().unwrap();
        // Late waiters still observe readiness.
        assert!(handle.await_ready().await);
    }

    #[tokio::test]
    async fn test_state_subscriber_sees_full_sequence() {
        let (mut runner, _rec) = test_runner();
        let log = CallLog::new();
        runner.create_service(service(&log, "db")).unwrap();
        runner.create_controller(controller(&log, "api")).unwrap();
        let handle = runner.handle();

        let (mut rx, _sub) = handle.subscribe_state().await;
        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(state) = rx.recv().await {
                seen.push(state);
                if state.is_final() {
                    break;
                }
            }
            seen
        });

        handle.kill();
        runner.run().await.unwrap();

        assert_eq!(
            observer.await.unwrap(),
            vec![
                RunnerState::ServicesStarting,
                RunnerState::ControllersStarting,
                RunnerState::Ready,
                RunnerState::Running,
                RunnerState::ControllersStopping,
                RunnerState::ServicesStopping,
                RunnerState::Terminated,
            ]
        );
    }

    #[tokio::test]
    async fn test_kill_is_idempotent() {
        let (mut runner, _rec) = test_runner();
        let svc = runner.create_service(|_| Ok(MockService::new("db"))).unwrap();
        let handle = runner.handle();

        handle.kill();
        handle.kill();
        runner.run().await.unwrap();
        handle.kill();

        assert_eq!(svc.start_calls(), 1);
        assert_eq!(svc.stop_calls(), 1);
    }

    #[tokio::test]
    async fn test_factory_resolves_earlier_dependency() {
        let (mut runner, rec) = test_runner();
        let db = runner.create_service(|_| Ok(MockService::new("db"))).unwrap();

        let resolved = Arc::new(std::sync::Mutex::new(None));
        runner
            .create_controller({
                let resolved = Arc::clone(&resolved);
                move |ctx| {
                    let dep: Arc<MockService> = ctx.service("db")?;
                    *resolved.lock().unwrap() = Some(dep);
                    Ok(MockController::new("api"))
                }
            })
            .unwrap();

        let got = resolved.lock().unwrap().take().unwrap();
        assert!(Arc::ptr_eq(&got, &db));
        assert_eq!(rec.count(), 0);
    }

    #[tokio::test]
    async fn test_factory_missing_dependency_is_fatal_once() {
        let (mut runner, rec) = test_runner();

        let res = runner.create_controller(|ctx| {
            ctx.get_service("db")?;
            Ok(MockController::new("api"))
        });

        assert!(matches!(
            res,
            Err(RuntimeError::Registry(RegistryError::NotFound { .. }))
        ));
        assert_eq!(rec.count(), 1);
        assert!(runner.controllers_order().is_empty());
        assert!(runner.context().get_controllers().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_service_is_not_added_to_order() {
        let (mut runner, rec) = test_runner();
        runner.create_service(|_| Ok(MockService::new("db"))).unwrap();

        let res = runner.create_service(|_| Ok(MockService::new("db")));

        assert!(matches!(
            res,
            Err(RuntimeError::Registry(RegistryError::DuplicateName { .. }))
        ));
        assert_eq!(runner.services_order(), ["db".to_string()]);
        assert_eq!(rec.count(), 1);
    }

    #[tokio::test]
    async fn test_factory_error_is_fatal() {
        let (mut runner, rec) = test_runner();

        let res = runner.create_service::<MockService, _>(|_| {
            Err(RuntimeError::Factory {
                kind: ComponentKind::Service,
                error: ComponentError::fail("bad dsn"),
            })
        });

        assert!(res.is_err());
        assert_eq!(rec.count(), 1);
        assert!(runner.services_order().is_empty());
    }

    #[tokio::test]
    async fn test_run_without_components_terminates_on_kill() {
        let (runner, _rec) = test_runner();
        let handle = runner.handle();
        let run = tokio::spawn(runner.run());

        assert!(handle.await_ready().await);
        handle.kill();

        let report = tokio::time::timeout(Duration::from_secs(1), run)
            .await
            .expect("run must return after kill")
            .unwrap()
            .unwrap();
        assert!(report.is_clean());
    }
}
