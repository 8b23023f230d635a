use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PostureError, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationConfig {
    /// キャリブレーションに使うフレーム数
    #[serde(default = "default_calibration_frames")]
    pub frames: usize,
    /// 肩角度の許容幅（度、平均±この値）
    #[serde(default = "default_range")]
    pub shoulder_range: f32,
    /// 首角度の許容幅（度、平均±この値）
    #[serde(default = "default_range")]
    pub neck_range: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertConfig {
    /// アラート間の最小間隔（秒）
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: f64,
    #[serde(default = "default_alert_message")]
    pub message: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// 正規化座標をピクセルへ変換する際のフレーム幅
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
    /// これ未満のvisibilityのランドマークは未検出扱い
    #[serde(default)]
    pub min_visibility: f32,
}

fn default_calibration_frames() -> usize { 30 }
fn default_range() -> f32 { 10.0 }
fn default_cooldown_secs() -> f64 { 5.0 }
fn default_alert_message() -> String { "Poor posture detected! Please sit up straight.".to_string() }
fn default_frame_width() -> u32 { 640 }
fn default_frame_height() -> u32 { 480 }

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            frames: default_calibration_frames(),
            shoulder_range: default_range(),
            neck_range: default_range(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            message: default_alert_message(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            frame_width: default_frame_width(),
            frame_height: default_frame_height(),
            min_visibility: 0.0,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// ファイルが無ければデフォルト設定を使う。パースエラーは握りつぶさない
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("{} not found, using default config", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// 起動時の設定検証。不正値は部分的に起動させずに即エラー
    pub fn validate(&self) -> Result<()> {
        let cal = &self.calibration;
        if cal.frames == 0 {
            return Err(PostureError::config("calibration frames must be at least 1"));
        }
        check_non_negative("shoulder_range", cal.shoulder_range as f64)?;
        check_non_negative("neck_range", cal.neck_range as f64)?;
        check_non_negative("alert cooldown", self.alert.cooldown_secs)?;

        let input = &self.input;
        if input.frame_width == 0 || input.frame_height == 0 {
            return Err(PostureError::config(format!(
                "frame size must be non-zero (got {}x{})",
                input.frame_width, input.frame_height
            )));
        }
        if !(0.0..=1.0).contains(&input.min_visibility) {
            return Err(PostureError::config(format!(
                "min_visibility must be within 0..=1 (got {})",
                input.min_visibility
            )));
        }
        Ok(())
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PostureError::config(format!(
            "{} must be a non-negative number (got {})",
            name, value
        )));
    }
    Ok(())
}
