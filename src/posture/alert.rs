use serde::Serialize;

use crate::config::AlertConfig;
use crate::error::{PostureError, Result};
use crate::geometry::PostureAngles;
use crate::posture::Verdict;

/// 発火したアラート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    /// 発火時刻（秒、単調増加クロック）
    pub timestamp: f64,
    pub shoulder_angle: f32,
    pub neck_angle: f32,
    pub message: String,
}

/// 悪い姿勢が続く間のアラート連発を抑える
///
/// GoodPostureではタイマーを参照も更新もしない。
#[derive(Debug, Clone)]
pub struct AlertGate {
    cooldown_secs: f64,
    message: String,
    /// まだ一度も発火していなければNone（最初のPoorPostureは必ず発火）
    last_alert: Option<f64>,
}

impl AlertGate {
    pub fn new(cooldown_secs: f64, message: impl Into<String>) -> Result<Self> {
        if !cooldown_secs.is_finite() || cooldown_secs < 0.0 {
            return Err(PostureError::config(format!(
                "alert cooldown must be a non-negative number (got {})",
                cooldown_secs
            )));
        }
        Ok(Self {
            cooldown_secs,
            message: message.into(),
            last_alert: None,
        })
    }

    pub fn from_config(config: &AlertConfig) -> Result<Self> {
        Self::new(config.cooldown_secs, config.message.clone())
    }

    pub fn maybe_alert(
        &mut self,
        verdict: Verdict,
        angles: PostureAngles,
        now: f64,
    ) -> Option<AlertEvent> {
        if !verdict.is_poor() {
            return None;
        }
        if let Some(last) = self.last_alert {
            if now - last <= self.cooldown_secs {
                return None;
            }
        }

        self.last_alert = Some(now);
        tracing::warn!(
            shoulder = angles.shoulder,
            neck = angles.neck,
            "{}",
            self.message
        );
        Some(AlertEvent {
            timestamp: now,
            shoulder_angle: angles.shoulder,
            neck_angle: angles.neck,
            message: self.message.clone(),
        })
    }

    pub fn last_alert(&self) -> Option<f64> {
        self.last_alert
    }

    pub fn cooldown_secs(&self) -> f64 {
        self.cooldown_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poor() -> PostureAngles {
        PostureAngles::new(95.0, 60.0)
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        assert!(AlertGate::new(-1.0, "x").is_err());
        assert!(AlertGate::new(f64::NAN, "x").is_err());
    }

    #[test]
    fn test_first_poor_verdict_alerts() {
        let mut gate = AlertGate::new(5.0, "sit up").unwrap();
        let event = gate.maybe_alert(Verdict::PoorPosture, poor(), 0.0).unwrap();
        assert_eq!(event.timestamp, 0.0);
        assert_eq!(event.shoulder_angle, 95.0);
        assert_eq!(event.message, "sit up");
        assert_eq!(gate.last_alert(), Some(0.0));
    }

    #[test]
    fn test_cooldown() {
        let mut gate = AlertGate::new(5.0, "sit up").unwrap();
        let alerts: Vec<f64> = [0.0, 3.0, 6.0]
            .iter()
            .filter_map(|&t| gate.maybe_alert(Verdict::PoorPosture, poor(), t))
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(alerts, vec![0.0, 6.0]);
    }

    #[test]
    fn test_cooldown_is_strict() {
        let mut gate = AlertGate::new(5.0, "sit up").unwrap();
        assert!(gate.maybe_alert(Verdict::PoorPosture, poor(), 10.0).is_some());
        assert!(gate.maybe_alert(Verdict::PoorPosture, poor(), 15.0).is_none());
        assert!(gate.maybe_alert(Verdict::PoorPosture, poor(), 15.5).is_some());
    }

    #[test]
    fn test_good_verdict_never_touches_timer() {
        let mut gate = AlertGate::new(5.0, "sit up").unwrap();
        assert!(gate.maybe_alert(Verdict::GoodPosture, poor(), 0.0).is_none());
        assert_eq!(gate.last_alert(), None);

        gate.maybe_alert(Verdict::PoorPosture, poor(), 1.0);
        assert!(gate.maybe_alert(Verdict::GoodPosture, poor(), 100.0).is_none());
        assert_eq!(gate.last_alert(), Some(1.0));
    }

    #[test]
    fn test_zero_cooldown_still_requires_time_to_pass() {
        let mut gate = AlertGate::new(0.0, "sit up").unwrap();
        assert!(gate.maybe_alert(Verdict::PoorPosture, poor(), 1.0).is_some());
        assert!(gate.maybe_alert(Verdict::PoorPosture, poor(), 1.0).is_none());
        assert!(gate.maybe_alert(Verdict::PoorPosture, poor(), 1.01).is_some());
    }
}
