use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::core::client::orchestration::OrchestrationClient;
use crate::core::persistence::registry::registry_repository_trait::RegistryApiRepository;
use crate::core::state::runtime::audit::audit_sink::AuditSink;
use crate::domain::common::model::RequestContext;
use crate::domain::service::model::{AuditEvent, LifecycleAction, ServiceSpec};
use crate::errors::{internal_error, upstream_error, AppError, AppResult};

/// Outcome of a batch delete that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub removed: Vec<String>,
}

/// Sequences lifecycle operations against the orchestrator and records one
/// audit event per operation that took effect.
pub struct ServiceControlCoordinator {
    orchestrator: Arc<dyn OrchestrationClient>,
    registries: Arc<dyn RegistryApiRepository>,
    audit: Arc<dyn AuditSink>,
}

impl ServiceControlCoordinator {
    pub fn new(
        orchestrator: Arc<dyn OrchestrationClient>,
        registries: Arc<dyn RegistryApiRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            orchestrator,
            registries,
            audit,
        }
    }

    pub async fn create(&self, ctx: &RequestContext, mut spec: ServiceSpec) -> AppResult<()> {
        spec.normalize();
        spec.validate()?;

        if !spec.registry.is_empty() {
            let registry = self
                .registries
                .get(&spec.registry)
                .map_err(internal_error)?
                .ok_or_else(|| AppError::NotFound(format!("registry '{}'", spec.registry)))?;

            spec.image = registry.qualify_image(&spec.image);
            spec.registry_auth = Some(registry.credential());
            debug!("Resolved registry {} for service {}", registry.name, spec.name);
        }

        self.orchestrator
            .create_service(&spec)
            .await
            .map_err(upstream_error)?;

        self.emit(ctx, LifecycleAction::Create, &spec.name);
        Ok(())
    }

    /// The path-supplied `name` always wins over whatever the body carried.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        name: &str,
        mut spec: ServiceSpec,
    ) -> AppResult<ServiceSpec> {
        spec.name = name.to_string();
        spec.normalize();
        spec.validate()?;

        self.orchestrator
            .update_service(&spec)
            .await
            .map_err(upstream_error)?;

        self.emit(ctx, LifecycleAction::Update, name);
        Ok(spec)
    }

    pub async fn scale(&self, ctx: &RequestContext, name: &str, count: &str) -> AppResult<u64> {
        let replicas = parse_replica_count(count)?;

        self.orchestrator
            .scale_service(name, replicas)
            .await
            .map_err(upstream_error)?;

        self.emit(ctx, LifecycleAction::Scale, name);
        Ok(replicas)
    }

    /// No precondition check: a service without a previous revision
    /// surfaces the orchestrator's own error.
    pub async fn rollback(&self, ctx: &RequestContext, name: &str) -> AppResult<()> {
        self.orchestrator
            .rollback_service(name)
            .await
            .map_err(upstream_error)?;

        self.emit(ctx, LifecycleAction::Rollback, name);
        Ok(())
    }

    /// Removes `names` strictly in order and stops at the first failure.
    ///
    /// Not transactional: services removed before the failing one stay
    /// removed (and audited); names after it are never attempted.
    pub async fn delete(&self, ctx: &RequestContext, names: &[String]) -> AppResult<DeleteReport> {
        let mut report = DeleteReport::default();

        for (idx, name) in names.iter().enumerate() {
            if let Err(err) = self.orchestrator.remove_service(name).await {
                warn!(
                    "Batch delete aborted at {} ({} removed, {} not attempted): {:#}",
                    name,
                    report.removed.len(),
                    names.len() - idx - 1,
                    err
                );
                return Err(upstream_error(err));
            }

            self.emit(ctx, LifecycleAction::Delete, name);
            report.removed.push(name.clone());
        }

        Ok(report)
    }

    fn emit(&self, ctx: &RequestContext, action: LifecycleAction, subject: &str) {
        info!("Service {} {} by {}", subject, action, ctx.actor);
        self.audit.record(&AuditEvent::new(action, subject, ctx.actor.as_str()));
    }
}

fn parse_replica_count(count: &str) -> AppResult<u64> {
    count
        .trim()
        .parse::<u64>()
        .map_err(|e| AppError::InvalidArgument(format!("invalid replica count {count:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::orchestration::{
        NetworkDescriptor, ServiceDescriptor, ServiceListFilter, ServiceLogs, TaskDescriptor,
        TaskListFilter,
    };
    use crate::core::persistence::registry::registry_entity::RegistryEntity;
    use crate::core::persistence::registry::registry_fs_adapter_trait::RegistryFsAdapterTrait;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(ServiceSpec),
        Update(ServiceSpec),
        Scale(String, u64),
        Rollback(String),
        Remove(String),
    }

    #[derive(Default)]
    struct MockOrchestrator {
        calls: Mutex<Vec<Call>>,
        failing: HashSet<String>,
    }

    impl MockOrchestrator {
        fn failing_on(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|n| n.to_string()).collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self, name: &str, call: Call) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.failing.contains(name) {
                Err(anyhow!("service {name} could not be processed"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl OrchestrationClient for MockOrchestrator {
        async fn inspect_service(&self, _name: &str) -> Result<(ServiceDescriptor, Vec<u8>)> {
            unimplemented!()
        }

        async fn create_service(&self, spec: &ServiceSpec) -> Result<()> {
            self.check(&spec.name, Call::Create(spec.clone()))
        }

        async fn update_service(&self, spec: &ServiceSpec) -> Result<()> {
            self.check(&spec.name, Call::Update(spec.clone()))
        }

        async fn scale_service(&self, name: &str, replicas: u64) -> Result<()> {
            self.check(name, Call::Scale(name.into(), replicas))
        }

        async fn rollback_service(&self, name: &str) -> Result<()> {
            self.check(name, Call::Rollback(name.into()))
        }

        async fn remove_service(&self, name: &str) -> Result<()> {
            self.check(name, Call::Remove(name.into()))
        }

        async fn list_services(
            &self,
            _filter: &ServiceListFilter,
        ) -> Result<(Vec<ServiceDescriptor>, usize)> {
            unimplemented!()
        }

        async fn list_tasks(&self, _filter: &TaskListFilter) -> Result<(Vec<TaskDescriptor>, usize)> {
            unimplemented!()
        }

        async fn inspect_network(&self, _id: &str) -> Result<NetworkDescriptor> {
            unimplemented!()
        }

        async fn service_logs(&self, _name: &str, _tail: usize, _timestamps: bool) -> Result<ServiceLogs> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct MockRegistryAdapter {
        records: Vec<RegistryEntity>,
        broken: bool,
    }

    impl RegistryFsAdapterTrait for MockRegistryAdapter {
        fn read_all(&self) -> Result<Vec<RegistryEntity>> {
            if self.broken {
                return Err(anyhow!("registries.json is corrupt"));
            }
            Ok(self.records.clone())
        }
    }

    #[derive(Default)]
    struct MockRegistryRepository {
        adapter: MockRegistryAdapter,
    }

    impl RegistryApiRepository for MockRegistryRepository {
        fn fs_adapter(&self) -> &dyn RegistryFsAdapterTrait {
            &self.adapter
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl RecordingSink {
        fn subjects(&self) -> Vec<(LifecycleAction, String)> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| (e.action, e.subject.clone()))
                .collect()
        }
    }

    impl AuditSink for RecordingSink {
        fn record(&self, event: &AuditEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    struct Fixture {
        coordinator: ServiceControlCoordinator,
        orchestrator: Arc<MockOrchestrator>,
        audit: Arc<RecordingSink>,
    }

    fn fixture(orchestrator: MockOrchestrator, registries: MockRegistryRepository) -> Fixture {
        let orchestrator = Arc::new(orchestrator);
        let audit = Arc::new(RecordingSink::default());
        let coordinator = ServiceControlCoordinator::new(
            orchestrator.clone(),
            Arc::new(registries),
            audit.clone(),
        );
        Fixture {
            coordinator,
            orchestrator,
            audit,
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new("alice")
    }

    fn spec(name: &str, image: &str) -> ServiceSpec {
        ServiceSpec {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn create_qualifies_image_through_registry() {
        let registries = MockRegistryRepository {
            adapter: MockRegistryAdapter {
                records: vec![RegistryEntity {
                    name: "r1".into(),
                    url: "reg.example.com".into(),
                    username: "bob".into(),
                    password: "pw".into(),
                }],
                ..Default::default()
            },
        };
        let f = fixture(MockOrchestrator::default(), registries);

        let mut req = spec("web", "nginx");
        req.registry = "r1".into();
        f.coordinator.create(&ctx(), req).await.unwrap();

        match &f.orchestrator.calls()[0] {
            Call::Create(sent) => {
                assert_eq!(sent.image, "reg.example.com/nginx");
                let cred = sent.registry_auth.as_ref().unwrap();
                assert_eq!((cred.username.as_str(), cred.server_address.as_str()), ("bob", "reg.example.com"));
                assert_eq!(sent.to_swarm_spec()["Mode"]["Replicated"]["Replicas"], 1);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(f.audit.subjects(), vec![(LifecycleAction::Create, "web".to_string())]);
        assert_eq!(f.audit.events.lock().unwrap()[0].actor, "alice");
    }

    #[tokio::test]
    async fn create_without_registry_keeps_image() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        f.coordinator.create(&ctx(), spec("web", "nginx:1.25")).await.unwrap();

        match &f.orchestrator.calls()[0] {
            Call::Create(sent) => {
                assert_eq!(sent.image, "nginx:1.25");
                assert_eq!(sent.registry_auth, None);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_with_unknown_registry_is_not_found() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        let mut req = spec("web", "nginx");
        req.registry = "missing".into();

        let err = f.coordinator.create(&ctx(), req).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f.orchestrator.calls().is_empty());
        assert!(f.audit.subjects().is_empty());
    }

    #[tokio::test]
    async fn create_with_broken_registry_store_is_internal() {
        let registries = MockRegistryRepository {
            adapter: MockRegistryAdapter { broken: true, ..Default::default() },
        };
        let f = fixture(MockOrchestrator::default(), registries);
        let mut req = spec("web", "nginx");
        req.registry = "r1".into();

        let err = f.coordinator.create(&ctx(), req).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(f.orchestrator.calls().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_spec_before_any_call() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        let err = f.coordinator.create(&ctx(), spec("web", "  ")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(f.orchestrator.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_create_emits_no_audit() {
        let f = fixture(MockOrchestrator::failing_on(&["web"]), MockRegistryRepository::default());
        let err = f.coordinator.create(&ctx(), spec("web", "nginx")).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(f.audit.subjects().is_empty());
    }

    #[tokio::test]
    async fn update_forces_path_name() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        let applied = f
            .coordinator
            .update(&ctx(), "web", spec("renamed", "nginx:2"))
            .await
            .unwrap();

        assert_eq!(applied.name, "web");
        match &f.orchestrator.calls()[0] {
            Call::Update(sent) => {
                assert_eq!(sent.name, "web");
                assert_eq!(sent.replicas, None, "an edit without a count keeps the running one");
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(f.audit.subjects(), vec![(LifecycleAction::Update, "web".to_string())]);
    }

    #[tokio::test]
    async fn failed_update_emits_no_audit() {
        let f = fixture(MockOrchestrator::failing_on(&["web"]), MockRegistryRepository::default());
        assert!(f.coordinator.update(&ctx(), "web", spec("web", "nginx")).await.is_err());
        assert!(f.audit.subjects().is_empty());
    }

    #[tokio::test]
    async fn scale_parses_count() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        assert_eq!(f.coordinator.scale(&ctx(), "web", "3").await.unwrap(), 3);
        assert_eq!(f.orchestrator.calls(), vec![Call::Scale("web".into(), 3)]);
        assert_eq!(f.audit.subjects(), vec![(LifecycleAction::Scale, "web".to_string())]);
    }

    #[tokio::test]
    async fn scale_with_bad_count_makes_no_call() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        for count in ["-1", "abc", "", "1.5"] {
            let err = f.coordinator.scale(&ctx(), "web", count).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)), "count {count:?}");
        }
        assert!(f.orchestrator.calls().is_empty());
        assert!(f.audit.subjects().is_empty());
    }

    #[tokio::test]
    async fn rollback_surfaces_orchestrator_error_verbatim() {
        let f = fixture(MockOrchestrator::failing_on(&["web"]), MockRegistryRepository::default());
        let err = f.coordinator.rollback(&ctx(), "web").await.unwrap_err();
        match err {
            AppError::Upstream(inner) => assert_eq!(inner.to_string(), "service web could not be processed"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(f.audit.subjects().is_empty());
    }

    #[tokio::test]
    async fn rollback_audits_on_success() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        f.coordinator.rollback(&ctx(), "web").await.unwrap();
        assert_eq!(f.audit.subjects(), vec![(LifecycleAction::Rollback, "web".to_string())]);
    }

    #[tokio::test]
    async fn delete_stops_at_first_failure() {
        let f = fixture(MockOrchestrator::failing_on(&["b"]), MockRegistryRepository::default());
        let err = f
            .coordinator
            .delete(&ctx(), &names(&["a", "b", "c"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("service b"));
        assert_eq!(
            f.orchestrator.calls(),
            vec![Call::Remove("a".into()), Call::Remove("b".into())]
        );
        assert_eq!(f.audit.subjects(), vec![(LifecycleAction::Delete, "a".to_string())]);
    }

    #[tokio::test]
    async fn delete_removes_in_order() {
        let f = fixture(MockOrchestrator::default(), MockRegistryRepository::default());
        let report = f
            .coordinator
            .delete(&ctx(), &names(&["c", "a", "b"]))
            .await
            .unwrap();

        assert_eq!(report.removed, names(&["c", "a", "b"]));
        let audited: Vec<_> = f.audit.subjects().into_iter().map(|(_, s)| s).collect();
        assert_eq!(audited, names(&["c", "a", "b"]));
    }
}
