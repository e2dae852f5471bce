//! # Component registry used for dependency injection.
//!
//! [`Context`] stores services and controllers by name, plus at most one
//! UI-controller. The runner registers every component a factory returns,
//! and hands the same context to later factories so they can resolve the
//! dependencies created before them.
//!
//! ## Rules
//! - Names are non-empty and unique per category.
//! - Registration is append-only and only happens while the runner is being built.
//! - Every violation (empty name, duplicate, missing lookup, wrong type) goes
//!   through the configured [`FatalPolicy`] before `Err` is returned.
//!
//! ## Typed lookup
//! ```text
//! register_service(Arc<Db>)
//!     ├─► services["db"].component : Arc<dyn Service>        (lifecycle calls)
//!     └─► services["db"].any       : Arc<dyn Any + Send + Sync> (downcast)
//!
//! service::<Db>("db")   ─► Arc<Db>
//! get_service("db")     ─► Arc<dyn Service>
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use super::fatal::{ExitProcess, FatalPolicy};
use crate::components::{ComponentKind, Controller, Service, UiController};
use crate::error::{RegistryError, RuntimeError};

/// One registered component, kept both as its capability object and as `Any`.
struct Entry<C: ?Sized> {
    component: Arc<C>,
    any: Arc<dyn Any + Send + Sync>,
}

impl<C: ?Sized> Entry<C> {
    fn downcast<T: Any + Send + Sync>(
        &self,
        kind: ComponentKind,
        name: &str,
    ) -> Result<Arc<T>, RegistryError> {
        Arc::clone(&self.any)
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                kind,
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }
}

/// Name-keyed store of services, controllers and the optional UI-controller.
pub struct Context {
    services: HashMap<String, Entry<dyn Service>>,
    controllers: HashMap<String, Entry<dyn Controller>>,
    ui_controller: Option<Entry<dyn UiController>>,
    fatal: Arc<dyn FatalPolicy>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Arc::new(ExitProcess))
    }
}

impl Context {
    /// Creates an empty context reporting violations to `fatal`.
    pub fn new(fatal: Arc<dyn FatalPolicy>) -> Self {
        Self {
            services: HashMap::new(),
            controllers: HashMap::new(),
            ui_controller: None,
            fatal,
        }
    }

    /// Registers a service under [`name`](crate::Component::name).
    pub fn register_service<S: Service>(&mut self, service: Arc<S>) -> Result<(), RegistryError> {
        let name = service.name().to_string();
        self.check_new_name(ComponentKind::Service, &name, self.services.contains_key(&name))?;

        let component: Arc<dyn Service> = service.clone();
        self.services.insert(name, Entry { component, any: service });
        Ok(())
    }

    /// Registers a controller under [`name`](crate::Component::name).
    pub fn register_controller<C: Controller>(
        &mut self,
        controller: Arc<C>,
    ) -> Result<(), RegistryError> {
        let name = controller.name().to_string();
        self.check_new_name(
            ComponentKind::Controller,
            &name,
            self.controllers.contains_key(&name),
        )?;

        let component: Arc<dyn Controller> = controller.clone();
        self.controllers.insert(
            name,
            Entry {
                component,
                any: controller,
            },
        );
        Ok(())
    }

    /// Registers the UI-controller. Fails if one is already registered.
    pub fn register_ui_controller<U: UiController>(
        &mut self,
        ui_controller: Arc<U>,
    ) -> Result<(), RegistryError> {
        let name = ui_controller.name().to_string();
        self.check_new_name(ComponentKind::UiController, &name, false)?;

        if let Some(existing) = &self.ui_controller {
            return Err(self.fail(RegistryError::UiControllerAlreadySet {
                name,
                existing: existing.component.name().to_string(),
            }));
        }

        let component: Arc<dyn UiController> = ui_controller.clone();
        self.ui_controller = Some(Entry {
            component,
            any: ui_controller,
        });
        Ok(())
    }

    /// Returns the service registered under `name`.
    pub fn get_service(&self, name: &str) -> Result<Arc<dyn Service>, RegistryError> {
        match self.services.get(name) {
            Some(entry) => Ok(Arc::clone(&entry.component)),
            None => Err(self.not_found(ComponentKind::Service, name)),
        }
    }

    /// Returns the service registered under `name` as its concrete type.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use runvisor::{Context, RecordFatal, mock::MockService};
    ///
    /// let mut ctx = Context::new(Arc::new(RecordFatal::new()));
    /// ctx.register_service(Arc::new(MockService::new("db"))).unwrap();
    ///
    /// let db: Arc<MockService> = ctx.service("db").unwrap();
    /// assert_eq!(db.start_calls(), 0);
    /// ```
    pub fn service<S: Service>(&self, name: &str) -> Result<Arc<S>, RegistryError> {
        let entry = self
            .services
            .get(name)
            .ok_or_else(|| self.not_found(ComponentKind::Service, name))?;
        entry
            .downcast::<S>(ComponentKind::Service, name)
            .map_err(|e| self.fail(e))
    }

    /// Returns every registered service, in no particular order.
    pub fn get_services(&self) -> Vec<Arc<dyn Service>> {
        self.services
            .values()
            .map(|e| Arc::clone(&e.component))
            .collect()
    }

    /// Returns the controller registered under `name`.
    pub fn get_controller(&self, name: &str) -> Result<Arc<dyn Controller>, RegistryError> {
        match self.controllers.get(name) {
            Some(entry) => Ok(Arc::clone(&entry.component)),
            None => Err(self.not_found(ComponentKind::Controller, name)),
        }
    }

    /// Returns the controller registered under `name` as its concrete type.
    pub fn controller<C: Controller>(&self, name: &str) -> Result<Arc<C>, RegistryError> {
        let entry = self
            .controllers
            .get(name)
            .ok_or_else(|| self.not_found(ComponentKind::Controller, name))?;
        entry
            .downcast::<C>(ComponentKind::Controller, name)
            .map_err(|e| self.fail(e))
    }

    /// Returns every registered controller, in no particular order.
    pub fn get_controllers(&self) -> Vec<Arc<dyn Controller>> {
        self.controllers
            .values()
            .map(|e| Arc::clone(&e.component))
            .collect()
    }

    /// Returns the UI-controller, if one is registered.
    pub fn get_ui_controller(&self) -> Option<Arc<dyn UiController>> {
        self.ui_controller.as_ref().map(|e| Arc::clone(&e.component))
    }

    /// Returns the UI-controller as its concrete type.
    ///
    /// `Ok(None)` when none is registered; a registered UI-controller of
    /// another type is a fatal [`RegistryError::TypeMismatch`].
    pub fn ui_controller<U: UiController>(&self) -> Result<Option<Arc<U>>, RegistryError> {
        let Some(entry) = &self.ui_controller else {
            return Ok(None);
        };
        entry
            .downcast::<U>(ComponentKind::UiController, entry.component.name())
            .map(Some)
            .map_err(|e| self.fail(e))
    }

    /// Returns sorted service names.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns sorted controller names.
    pub fn controller_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.controllers.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn check_new_name(
        &self,
        kind: ComponentKind,
        name: &str,
        taken: bool,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(self.fail(RegistryError::EmptyName { kind }));
        }
        if taken {
            return Err(self.fail(RegistryError::DuplicateName {
                kind,
                name: name.to_string(),
            }));
        }
        Ok(())
    }

    fn not_found(&self, kind: ComponentKind, name: &str) -> RegistryError {
        self.fail(RegistryError::NotFound {
            kind,
            name: name.to_string(),
        })
    }

    /// Reports the violation to the fatal policy and hands it back for `Err`.
    fn fail(&self, err: RegistryError) -> RegistryError {
        self.fatal.fatal(&RuntimeError::Registry(err.clone()));
        err
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("services", &self.service_names())
            .field("controllers", &self.controller_names())
            .field(
                "ui_controller",
                &self.ui_controller.as_ref().map(|e| e.component.name().to_string()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Component;
    use crate::components::mock::{MockController, MockService, MockUiController};
    use crate::core::fatal::RecordFatal;
    use crate::error::ComponentError;
    use tokio_util::sync::CancellationToken;

    fn ctx() -> (Context, RecordFatal) {
        let rec = RecordFatal::new();
        (Context::new(Arc::new(rec.clone())), rec)
    }

    #[test]
    fn test_register_service_empty_name_is_fatal_once() {
        let (mut ctx, rec) = ctx();

        let res = ctx.register_service(Arc::new(MockService::new("")));

        assert_eq!(
            res,
            Err(RegistryError::EmptyName {
                kind: ComponentKind::Service
            })
        );
        assert_eq!(rec.count(), 1);
        assert!(ctx.get_services().is_empty());
    }

    #[test]
    fn test_register_service_same_name_keeps_first() {
        let (mut ctx, rec) = ctx();
        let first = Arc::new(MockService::new("mock"));

        ctx.register_service(Arc::clone(&first)).unwrap();
        assert_eq!(ctx.get_services().len(), 1);
        assert_eq!(rec.count(), 0);

        let res = ctx.register_service(Arc::new(MockService::new("mock")));
        assert!(matches!(res, Err(RegistryError::DuplicateName { .. })));
        assert_eq!(ctx.get_services().len(), 1);
        assert_eq!(rec.count(), 1);

        let got: Arc<MockService> = ctx.service("mock").unwrap();
        assert!(Arc::ptr_eq(&got, &first));
    }

    #[test]
    fn test_register_and_get_services() {
        let (mut ctx, rec) = ctx();
        assert!(ctx.get_services().is_empty());

        ctx.register_service(Arc::new(MockService::new("mock0"))).unwrap();
        ctx.register_service(Arc::new(MockService::new("mock1"))).unwrap();

        assert_eq!(ctx.get_service("mock0").unwrap().name(), "mock0");
        assert_eq!(ctx.get_service("mock1").unwrap().name(), "mock1");

        let mut names: Vec<String> = ctx
            .get_services()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["mock0", "mock1"]);
        assert_eq!(ctx.service_names(), vec!["mock0", "mock1"]);
        assert_eq!(rec.count(), 0);
    }

    #[test]
    fn test_register_controller_empty_and_duplicate_names() {
        let (mut ctx, rec) = ctx();

        assert!(ctx.register_controller(Arc::new(MockController::new(""))).is_err());
        assert!(ctx.get_controllers().is_empty());

        ctx.register_controller(Arc::new(MockController::new("api"))).unwrap();
        assert!(ctx.register_controller(Arc::new(MockController::new("api"))).is_err());

        assert_eq!(ctx.controller_names(), vec!["api"]);
        assert_eq!(rec.count(), 2);
    }

    #[test]
    fn test_same_name_in_different_categories_is_allowed() {
        let (mut ctx, rec) = ctx();

        ctx.register_service(Arc::new(MockService::new("test"))).unwrap();
        ctx.register_controller(Arc::new(MockController::new("test"))).unwrap();

        assert_eq!(rec.count(), 0);
    }

    #[test]
    fn test_get_unknown_service_is_fatal() {
        let (ctx, rec) = ctx();

        let res = ctx.get_service("nope");
        assert!(matches!(
            res,
            Err(RegistryError::NotFound {
                kind: ComponentKind::Service,
                ..
            })
        ));
        assert!(ctx.get_controller("nope").is_err());
        assert_eq!(rec.count(), 2);
    }

    #[test]
    fn test_typed_lookup_wrong_type_is_fatal() {
        let (mut ctx, rec) = ctx();
        ctx.register_controller(Arc::new(MockController::new("api"))).unwrap();

        let res = ctx.controller::<MockUiController>("api");
        assert!(matches!(res, Err(RegistryError::TypeMismatch { .. })));
        assert_eq!(rec.count(), 1);

        let ok: Arc<MockController> = ctx.controller("api").unwrap();
        assert_eq!(ok.name(), "api");
    }

    #[test]
    fn test_ui_controller_at_most_one() {
        let (mut ctx, rec) = ctx();
        assert!(ctx.get_ui_controller().is_none());

        ctx.register_ui_controller(Arc::new(MockUiController::new("tui"))).unwrap();
        let res = ctx.register_ui_controller(Arc::new(MockUiController::new("gui")));

        assert_eq!(
            res,
            Err(RegistryError::UiControllerAlreadySet {
                name: "gui".into(),
                existing: "tui".into(),
            })
        );
        assert_eq!(rec.count(), 1);
        assert_eq!(ctx.get_ui_controller().unwrap().name(), "tui");
        assert!(ctx.ui_controller::<MockUiController>().unwrap().is_some());
    }

    struct OtherUi;

    #[async_trait::async_trait]
    impl Component for OtherUi {
        fn name(&self) -> &str {
            "other"
        }
        async fn start(&self) -> Result<(), ComponentError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), ComponentError> {
            Ok(())
        }
        async fn health(&self) -> Result<(), ComponentError> {
            Ok(())
        }
    }
    impl Controller for OtherUi {}

    #[async_trait::async_trait]
    impl UiController for OtherUi {
        async fn run(&self, termination: CancellationToken) -> Result<(), ComponentError> {
            termination.cancelled().await;
            Ok(())
        }
    }

    #[test]
    fn test_ui_controller_typed_lookup() {
        let (mut ctx, rec) = ctx();
        assert!(ctx.ui_controller::<MockUiController>().unwrap().is_none());

        ctx.register_ui_controller(Arc::new(MockUiController::new("tui"))).unwrap();
        let res = ctx.ui_controller::<OtherUi>();

        assert_eq!(
            res.err(),
            Some(RegistryError::TypeMismatch {
                kind: ComponentKind::UiController,
                name: "tui".into(),
                expected: type_name::<OtherUi>(),
            })
        );
        assert_eq!(rec.count(), 1);

        let tui = ctx.ui_controller::<MockUiController>().unwrap().unwrap();
        assert_eq!(tui.name(), "tui");
        assert_eq!(rec.count(), 1);
    }

    #[test]
    fn test_ui_controller_empty_name_is_fatal() {
        let (mut ctx, rec) = ctx();
        assert!(ctx.register_ui_controller(Arc::new(MockUiController::new(""))).is_err());
        assert!(ctx.get_ui_controller().is_none());
        assert_eq!(rec.count(), 1);
    }
}
