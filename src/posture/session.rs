use serde::Serialize;

use crate::config::{CalibrationConfig, Config};
use crate::error::Result;
use crate::geometry::{posture_angles, PostureAngles, PostureLandmarks};
use crate::pose::LandmarkFrame;
use crate::posture::{
    classify, AlertEvent, AlertGate, CalibrationPhaseResult, Calibrator, Envelopes, Progress,
    Verdict,
};

/// キャリブレーションの進行状況
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CalibrationStatus {
    Calibrating(Progress),
    Calibrated(Envelopes),
}

/// フレームを処理しなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoLandmarks,
    DegenerateGeometry,
}

/// 1フレーム分の出力。描画・通知側へそのまま渡す
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub timestamp: f64,
    pub angles: Option<PostureAngles>,
    pub calibration: CalibrationStatus,
    pub verdict: Option<Verdict>,
    pub alert: Option<AlertEvent>,
    pub skipped: Option<SkipReason>,
}

/// 姿勢監視セッション
///
/// キャリブレーションとアラートのクールダウンを単独で所有し、1ループから1フレームずつ駆動する。
/// スキップしたフレーム（未検出・退化した幾何）はキャリブレーション枠を消費せず、
/// アラートにも触れない。
pub struct PostureSession {
    calibration_config: CalibrationConfig,
    calibrator: Calibrator,
    alert_gate: AlertGate,
}

impl PostureSession {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            calibration_config: config.calibration.clone(),
            calibrator: Calibrator::from_config(&config.calibration)?,
            alert_gate: AlertGate::from_config(&config.alert)?,
        })
    }

    /// 再キャリブレーション要求を処理してからフレームを処理
    pub fn process(&mut self, frame: &LandmarkFrame) -> Result<FrameReport> {
        if frame.recalibrate {
            self.recalibrate()?;
        }
        Ok(self.process_frame(frame.landmarks.as_ref(), frame.timestamp))
    }

    pub fn process_frame(
        &mut self,
        landmarks: Option<&PostureLandmarks>,
        timestamp: f64,
    ) -> FrameReport {
        let Some(landmarks) = landmarks else {
            tracing::trace!(timestamp, "no landmarks, frame skipped");
            return self.skipped(timestamp, SkipReason::NoLandmarks);
        };

        match posture_angles(landmarks) {
            Ok(angles) => self.process_angles(angles, timestamp),
            Err(e) => {
                tracing::debug!(timestamp, "{}, frame skipped", e);
                self.skipped(timestamp, SkipReason::DegenerateGeometry)
            }
        }
    }

    /// 角度が計算済みの場合の入口。非有限の角度はフレームごと捨てる
    pub fn process_angles(&mut self, angles: PostureAngles, timestamp: f64) -> FrameReport {
        if !(angles.shoulder.is_finite() && angles.neck.is_finite()) {
            tracing::debug!(timestamp, "non-finite angle, frame skipped");
            return self.skipped(timestamp, SkipReason::DegenerateGeometry);
        }

        let Some(envelopes) = self.calibrator.envelopes().copied() else {
            let calibration = match self.calibrator.record_sample(angles.shoulder, angles.neck) {
                CalibrationPhaseResult::InProgress(progress) => {
                    CalibrationStatus::Calibrating(progress)
                }
                CalibrationPhaseResult::Complete(envelopes) => {
                    CalibrationStatus::Calibrated(envelopes)
                }
                CalibrationPhaseResult::AlreadyComplete => self.calibration_status(),
            };
            return FrameReport {
                timestamp,
                angles: Some(angles),
                calibration,
                verdict: None,
                alert: None,
                skipped: None,
            };
        };

        let verdict = classify(angles.shoulder, angles.neck, &envelopes.shoulder, &envelopes.neck);
        let alert = self.alert_gate.maybe_alert(verdict, angles, timestamp);

        FrameReport {
            timestamp,
            angles: Some(angles),
            calibration: CalibrationStatus::Calibrated(envelopes),
            verdict: Some(verdict),
            alert,
            skipped: None,
        }
    }

    /// エンベロープを破棄して新しいキャリブレーションを開始。アラートのクールダウンは維持
    pub fn recalibrate(&mut self) -> Result<()> {
        self.calibrator = Calibrator::from_config(&self.calibration_config)?;
        tracing::info!(
            "Recalibrating over {} frames",
            self.calibration_config.frames
        );
        Ok(())
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_complete()
    }

    pub fn envelopes(&self) -> Option<&Envelopes> {
        self.calibrator.envelopes()
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn alert_gate(&self) -> &AlertGate {
        &self.alert_gate
    }

    pub fn calibration_status(&self) -> CalibrationStatus {
        match self.calibrator.envelopes() {
            Some(envelopes) => CalibrationStatus::Calibrated(*envelopes),
            None => CalibrationStatus::Calibrating(self.calibrator.progress()),
        }
    }

    fn skipped(&self, timestamp: f64, reason: SkipReason) -> FrameReport {
        FrameReport {
            timestamp,
            angles: None,
            calibration: self.calibration_status(),
            verdict: None,
            alert: None,
            skipped: Some(reason),
        }
    }
}
