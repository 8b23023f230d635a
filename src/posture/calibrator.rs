use serde::Serialize;
use std::fmt;

use crate::config::CalibrationConfig;
use crate::error::{PostureError, Result};

/// 良い姿勢とみなす角度範囲 [lower, upper]（両端含む）
///
/// キャリブレーション完了時に一度だけ作られ、以後変更されない。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelope {
    lower: f32,
    upper: f32,
}

impl Envelope {
    fn around(mean: f32, tolerance: f32) -> Self {
        Self {
            lower: mean - tolerance,
            upper: mean + tolerance,
        }
    }

    pub fn lower(&self) -> f32 {
        self.lower
    }

    pub fn upper(&self) -> f32 {
        self.upper
    }

    pub fn contains(&self, angle: f32) -> bool {
        self.lower <= angle && angle <= self.upper
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}-{:.1}", self.lower, self.upper)
    }
}

/// 肩・首それぞれのエンベロープ
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelopes {
    pub shoulder: Envelope,
    pub neck: Envelope,
}

impl fmt::Display for Envelopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Shoulder bounds: {}, Neck bounds: {}",
            self.shoulder, self.neck
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub count: usize,
    pub target: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Calibrating... {}/{}", self.count, self.target)
    }
}

/// `record_sample` の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhaseResult {
    InProgress(Progress),
    /// 目標数に達したフレームでのみ返る
    Complete(Envelopes),
    /// 完了後の呼び出し。状態は変わらない
    AlreadyComplete,
}

/// 蓄積中のキャリブレーションサンプル
///
/// `sample_count == shoulder_samples.len() == neck_samples.len()` を常に保つ。
#[derive(Debug, Clone, Default)]
pub struct CalibrationState {
    sample_count: usize,
    shoulder_samples: Vec<f32>,
    neck_samples: Vec<f32>,
    is_complete: bool,
}

impl CalibrationState {
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn shoulder_samples(&self) -> &[f32] {
        &self.shoulder_samples
    }

    pub fn neck_samples(&self) -> &[f32] {
        &self.neck_samples
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }
}

/// 固定フレーム数の角度を集め、軸ごとに `平均 ± 許容幅` のエンベロープを作る
///
/// 外れ値除去はしない。
#[derive(Debug, Clone)]
pub struct Calibrator {
    target: usize,
    shoulder_range: f32,
    neck_range: f32,
    state: CalibrationState,
    envelopes: Option<Envelopes>,
}

impl Calibrator {
    pub fn new(target: usize, shoulder_range: f32, neck_range: f32) -> Result<Self> {
        if target == 0 {
            return Err(PostureError::config("calibration frames must be at least 1"));
        }
        for (name, range) in [("shoulder", shoulder_range), ("neck", neck_range)] {
            if !range.is_finite() || range < 0.0 {
                return Err(PostureError::config(format!(
                    "{} range must be a non-negative number (got {})",
                    name, range
                )));
            }
        }
        Ok(Self {
            target,
            shoulder_range,
            neck_range,
            state: CalibrationState {
                shoulder_samples: Vec::with_capacity(target),
                neck_samples: Vec::with_capacity(target),
                ..CalibrationState::default()
            },
            envelopes: None,
        })
    }

    pub fn from_config(config: &CalibrationConfig) -> Result<Self> {
        Self::new(config.frames, config.shoulder_range, config.neck_range)
    }

    pub fn record_sample(&mut self, shoulder_angle: f32, neck_angle: f32) -> CalibrationPhaseResult {
        if self.state.is_complete {
            return CalibrationPhaseResult::AlreadyComplete;
        }

        self.state.shoulder_samples.push(shoulder_angle);
        self.state.neck_samples.push(neck_angle);
        self.state.sample_count += 1;

        if self.state.sample_count < self.target {
            let progress = self.progress();
            tracing::debug!("{}", progress);
            return CalibrationPhaseResult::InProgress(progress);
        }

        let envelopes = Envelopes {
            shoulder: Envelope::around(mean(&self.state.shoulder_samples), self.shoulder_range),
            neck: Envelope::around(mean(&self.state.neck_samples), self.neck_range),
        };
        self.envelopes = Some(envelopes);
        self.state.is_complete = true;
        tracing::info!("Calibration complete. {}", envelopes);

        CalibrationPhaseResult::Complete(envelopes)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            count: self.state.sample_count,
            target: self.target,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    /// 完了前はNone
    pub fn envelopes(&self) -> Option<&Envelopes> {
        self.envelopes.as_ref()
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }
}

fn mean(samples: &[f32]) -> f32 {
    let sum: f64 = samples.iter().map(|&s| s as f64).sum();
    (sum / samples.len() as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrate(samples: &[(f32, f32)], tolerance: f32) -> Envelopes {
        let mut cal = Calibrator::new(samples.len(), tolerance, tolerance).unwrap();
        let mut result = None;
        for &(s, n) in samples {
            result = Some(cal.record_sample(s, n));
        }
        match result {
            Some(CalibrationPhaseResult::Complete(env)) => env,
            other => panic!("calibration did not complete: {:?}", other),
        }
    }

    #[test]
    fn test_zero_frames_rejected() {
        assert!(matches!(
            Calibrator::new(0, 10.0, 10.0),
            Err(PostureError::Configuration(_))
        ));
    }

    #[test]
    fn test_negative_range_rejected() {
        assert!(Calibrator::new(30, -1.0, 10.0).is_err());
        assert!(Calibrator::new(30, 10.0, f32::INFINITY).is_err());
    }

    #[test]
    fn test_completes_exactly_on_target() {
        let mut cal = Calibrator::new(30, 10.0, 10.0).unwrap();
        for i in 1..30 {
            let r = cal.record_sample(80.0, 60.0);
            assert_eq!(
                r,
                CalibrationPhaseResult::InProgress(Progress { count: i, target: 30 })
            );
            assert!(!cal.is_complete());
            assert!(cal.envelopes().is_none());
        }
        assert!(matches!(
            cal.record_sample(80.0, 60.0),
            CalibrationPhaseResult::Complete(_)
        ));
        assert!(cal.is_complete());
    }

    #[test]
    fn test_frozen_after_completion() {
        let mut cal = Calibrator::new(3, 10.0, 10.0).unwrap();
        for _ in 0..3 {
            cal.record_sample(80.0, 60.0);
        }
        let before = *cal.envelopes().unwrap();

        assert_eq!(cal.record_sample(10.0, 170.0), CalibrationPhaseResult::AlreadyComplete);
        assert_eq!(cal.record_sample(10.0, 170.0), CalibrationPhaseResult::AlreadyComplete);
        assert!(cal.is_complete());
        assert_eq!(*cal.envelopes().unwrap(), before);
        assert_eq!(cal.state().sample_count(), 3);
        assert_eq!(cal.state().shoulder_samples().len(), 3);
        assert_eq!(cal.state().neck_samples().len(), 3);
    }

    #[test]
    fn test_state_counts_stay_in_sync() {
        let mut cal = Calibrator::new(5, 10.0, 10.0).unwrap();
        for i in 0..4 {
            cal.record_sample(80.0 + i as f32, 60.0);
            let state = cal.state();
            assert_eq!(state.sample_count(), i + 1);
            assert_eq!(state.shoulder_samples().len(), state.sample_count());
            assert_eq!(state.neck_samples().len(), state.sample_count());
        }
    }

    #[test]
    fn test_envelope_mean_plus_minus_tolerance() {
        let env = calibrate(&[(80.0, 60.0); 30], 10.0);
        assert_eq!(env.shoulder, Envelope { lower: 70.0, upper: 90.0 });
        assert_eq!(env.neck, Envelope { lower: 50.0, upper: 70.0 });
    }

    #[test]
    fn test_envelope_order_independent() {
        let forward = [(70.0, 40.0), (75.0, 50.0), (80.0, 60.0), (85.0, 70.0), (90.0, 80.0)];
        let mut reversed = forward;
        reversed.reverse();
        let shuffled = [forward[2], forward[4], forward[0], forward[3], forward[1]];

        let expected = Envelope { lower: 70.0, upper: 90.0 };
        for samples in [forward, reversed, shuffled] {
            let env = calibrate(&samples, 10.0);
            assert_eq!(env.shoulder, expected);
            assert_eq!(env.neck, Envelope { lower: 50.0, upper: 70.0 });
        }
    }

    #[test]
    fn test_per_axis_tolerance() {
        let mut cal = Calibrator::new(1, 5.0, 15.0).unwrap();
        match cal.record_sample(100.0, 30.0) {
            CalibrationPhaseResult::Complete(env) => {
                assert_eq!(env.shoulder.lower(), 95.0);
                assert_eq!(env.shoulder.upper(), 105.0);
                assert_eq!(env.neck.lower(), 15.0);
                assert_eq!(env.neck.upper(), 45.0);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_contains_inclusive() {
        let env = Envelope::around(80.0, 10.0);
        assert!(env.contains(70.0));
        assert!(env.contains(90.0));
        assert!(!env.contains(69.9));
        assert!(!env.contains(90.1));
        assert!(!env.contains(f32::NAN));
    }

    #[test]
    fn test_display() {
        let env = calibrate(&[(80.0, 60.0); 2], 10.0);
        assert_eq!(
            env.to_string(),
            "Shoulder bounds: 70.0-90.0, Neck bounds: 50.0-70.0"
        );
        assert_eq!(
            Progress { count: 3, target: 30 }.to_string(),
            "Calibrating... 3/30"
        );
    }
}
