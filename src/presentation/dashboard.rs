// Dashboard facade - Wires the engine together for a presentation layer
use crate::application::active_board::ActiveBoard;
use crate::application::admin_service::{AdminService, AuthProvider, BoardProvisioner, PinVerifier};
use crate::application::board_registry::BoardRegistry;
use crate::application::channel_controller::ChannelController;
use crate::application::chart_sink::ChartSink;
use crate::application::error::{ControlError, EngineError};
use crate::application::export_service::{CsvExport, ExportService};
use crate::application::history_store::HistoryStore;
use crate::application::mode_executor::ModeExecutor;
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::domain::channel::Rendering;
use crate::domain::mode::{FilterInputs, Intent};
use crate::domain::threshold::Threshold;
use crate::domain::variable::Variable;
use crate::infrastructure::config::DashboardConfig;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct Dashboard {
    pub controller: Arc<ChannelController>,
    pub scheduler: Arc<RefreshScheduler>,
    pub registry: Arc<BoardRegistry>,
    pub export: Arc<ExportService>,
    executor: Arc<ModeExecutor>,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig, store: Arc<dyn HistoryStore>, sink: Arc<dyn ChartSink>) -> Self {
        let engine = &config.engine;
        let active = ActiveBoard::new();

        let executor = Arc::new(ModeExecutor::new(
            store.clone(),
            config.threshold_table(),
            engine.realtime_window,
        ));
        let controller = Arc::new(ChannelController::new(
            executor.clone(),
            sink,
            active.clone(),
            engine.render_ordering,
            engine.board_wait(),
        ));
        let scheduler = Arc::new(RefreshScheduler::new(controller.clone(), engine.refresh_period()));
        let registry = Arc::new(BoardRegistry::new(
            store,
            controller.clone(),
            scheduler.clone(),
            active.clone(),
            config.store.history_suffix.clone(),
            engine.store_wait(),
        ));
        let export = Arc::new(ExportService::new(executor.clone(), active, engine.board_wait()));

        Self {
            controller,
            scheduler,
            registry,
            export,
            executor,
        }
    }

    /// Handle a button on a channel card. Going live also makes sure the
    /// periodic refresh is running.
    pub async fn trigger(&self, variable: Variable, intent: Intent) -> Result<Rendering, ControlError> {
        let outcome = self.controller.trigger(variable, intent).await;
        if intent == Intent::Live {
            self.scheduler.start(false);
        }
        outcome
    }

    pub async fn set_inputs(
        &self,
        variable: Variable,
        inputs: FilterInputs,
    ) -> Option<Result<Rendering, EngineError>> {
        self.controller.update_inputs(variable, inputs).await
    }

    pub async fn select_board(&self, id: &str) {
        self.registry.select(id).await;
    }

    pub fn set_visible(&self, visible: bool) {
        self.scheduler.set_visible(visible);
    }

    pub async fn export_csv(&self, from: NaiveDate, to: NaiveDate) -> Result<CsvExport, EngineError> {
        self.export.export_csv(from, to).await
    }

    /// Threshold row and legend shown next to each chart
    pub fn legend(&self, variable: Variable) -> (Threshold, [String; 3]) {
        let threshold = self.executor.thresholds().get(variable);
        (threshold, threshold.legend())
    }

    pub fn admin(
        &self,
        auth: Arc<dyn AuthProvider>,
        pins: Arc<dyn PinVerifier>,
        provisioner: Arc<dyn BoardProvisioner>,
    ) -> AdminService {
        AdminService::new(auth, pins, provisioner, self.registry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::admin_service::{AdminError, PinCheck, User};
    use crate::application::testing::{records, MemoryStore, RecordingSink};
    use async_trait::async_trait;

    fn dashboard() -> (Arc<MemoryStore>, Arc<RecordingSink>, Dashboard) {
        let store = Arc::new(MemoryStore::with_root(
            "lab/historial",
            records(
                Variable::Temp,
                &[("2024-01-01T08:00:00", 20.0), ("2024-01-01T09:00:00", 22.0)],
            ),
        ));
        let sink = Arc::new(RecordingSink::default());
        let dashboard = Dashboard::new(&DashboardConfig::default(), store.clone(), sink.clone());
        (store, sink, dashboard)
    }

    #[tokio::test(start_paused = true)]
    async fn test_selecting_a_board_renders_every_channel() {
        let (_store, sink, dashboard) = dashboard();
        dashboard.select_board("lab").await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        for variable in Variable::ALL {
            assert_eq!(sink.renders(variable).len(), 1, "{variable}");
        }
        let (labels, series) = sink.renders(Variable::Temp).pop().unwrap();
        assert_eq!(labels, vec!["08:00", "09:00"]);
        assert_eq!(series[0].values, vec![Some(20.0), Some(22.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_average_then_live() {
        let (_store, _sink, dashboard) = dashboard();
        dashboard.select_board("lab").await;

        let inputs = FilterInputs {
            day: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(dashboard.set_inputs(Variable::Temp, inputs).await.is_none());
        let avg = dashboard.trigger(Variable::Temp, Intent::Average).await.unwrap();
        assert_eq!(avg.series[0].values, vec![Some(21.0)]);

        dashboard.set_visible(false);
        assert!(!dashboard.scheduler.is_running());
        dashboard.set_visible(true);

        let live = dashboard.trigger(Variable::Temp, Intent::Live).await.unwrap();
        assert_eq!(live.labels.len(), 2);
        assert!(dashboard.scheduler.is_running());
    }

    struct SignedIn;

    #[async_trait]
    impl AuthProvider for SignedIn {
        async fn settled_user(&self) -> Option<User> {
            Some(User {
                uid: "u1".into(),
                email: None,
            })
        }
    }

    struct AcceptAll;

    #[async_trait]
    impl PinVerifier for AcceptAll {
        async fn issue(&self, _user: &User) -> anyhow::Result<()> {
            Ok(())
        }

        async fn verify(&self, _user: &User, _pin: &str) -> anyhow::Result<PinCheck> {
            Ok(PinCheck::Accepted)
        }
    }

    #[async_trait]
    impl BoardProvisioner for AcceptAll {
        async fn register(&self, _board_id: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn remove(&self, _board_id: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_adds_board_to_the_dashboard() {
        let (_store, sink, dashboard) = dashboard();
        let admin = dashboard.admin(Arc::new(SignedIn), Arc::new(AcceptAll), Arc::new(AcceptAll));

        assert!(matches!(
            admin.add_board("lab", "12ab56").await,
            Err(AdminError::InvalidPin)
        ));
        assert_eq!(dashboard.registry.active(), None);

        let board = admin.add_board("lab", "123456").await.unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(dashboard.registry.active(), Some(board));
        assert!(dashboard.scheduler.is_running());
        assert_eq!(sink.renders(Variable::Temp).len(), 1);
    }

    #[test]
    fn test_legend() {
        let (_store, _sink, dashboard) = dashboard();
        let (threshold, legend) = dashboard.legend(Variable::Hum);
        assert_eq!(threshold.warn, 75.0);
        assert_eq!(legend[2], "> 75");
    }
}
