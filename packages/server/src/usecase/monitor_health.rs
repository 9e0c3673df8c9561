//! UseCase: 接続の死活監視（1 サイクル分）
//!
//! 無通信のセッションに LivenessProbe を送り、応答のないセッションを切断する。
//! 切断は通信路からの切断と同じ経路（DisconnectSessionUseCase）を通る。

use std::sync::Arc;

use hottopics_shared::{protocol::Packet, time::Clock};

use crate::domain::{ChatroomRegistry, LivenessPolicy, LivenessSweep, Timestamp};

use super::{DisconnectSessionUseCase, Notifier};

pub struct MonitorHealthUseCase {
    registry: Arc<dyn ChatroomRegistry>,
    notifier: Arc<Notifier>,
    disconnect_usecase: Arc<DisconnectSessionUseCase>,
    clock: Arc<dyn Clock>,
    policy: LivenessPolicy,
}

impl MonitorHealthUseCase {
    pub fn new(
        registry: Arc<dyn ChatroomRegistry>,
        notifier: Arc<Notifier>,
        disconnect_usecase: Arc<DisconnectSessionUseCase>,
        clock: Arc<dyn Clock>,
        policy: LivenessPolicy,
    ) -> Self {
        Self {
            registry,
            notifier,
            disconnect_usecase,
            clock,
            policy,
        }
    }

    pub async fn execute(&self) -> LivenessSweep {
        let now = Timestamp::new(self.clock.now_millis());
        let sweep = self.registry.sweep_liveness(now, &self.policy).await;

        if !sweep.probed.is_empty() {
            tracing::debug!("Probing {} idle session(s)", sweep.probed.len());
            self.notifier
                .send_all(sweep.probed.clone(), &Packet::LivenessProbe)
                .await;
        }

        for session_id in &sweep.evicted {
            tracing::info!("Session '{}' did not answer the liveness probe, evicting", session_id);
            self.disconnect_usecase.execute(session_id).await;
        }

        sweep
    }
}
