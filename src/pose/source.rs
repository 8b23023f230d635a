//! ランドマーク入力
//!
//! 姿勢推定モデルはこのクレートの外で動く。入力側はフレームごとに
//! 3つのランドマーク（未検出ならNone）と単調増加のタイムスタンプを渡すだけ。

use serde::Deserialize;
use std::io::BufRead;
use std::time::Instant;

use crate::config::InputConfig;
use crate::error::{PostureError, Result};
use crate::geometry::PostureLandmarks;
use crate::pose::{Keypoint, Pose};

/// 1フレーム分の入力
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// 単調増加のタイムスタンプ（秒）
    pub timestamp: f64,
    /// Noneは姿勢未検出
    pub landmarks: Option<PostureLandmarks>,
    /// このフレームの前にキャリブレーションをやり直す
    pub recalibrate: bool,
}

pub trait LandmarkSource {
    /// 次のフレームを返す。入力が尽きたら `Ok(None)`
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    timestamp: Option<f64>,
    /// ピクセル座標で直接与えられたランドマーク
    #[serde(default)]
    landmarks: Option<PostureLandmarks>,
    /// 正規化座標のBlazePose 33点
    #[serde(default)]
    keypoints: Option<Vec<Keypoint>>,
    #[serde(default)]
    recalibrate: bool,
}

/// 1行1JSONのランドマーク入力
///
/// `{"timestamp": 0.5, "keypoints": [{"x": 0.5, "y": 0.4, "visibility": 0.9}, ...]}`
/// または `{"landmarks": {"left_shoulder": {"x": 400, "y": 300}, ...}}`。
/// `"recalibrate": true` でそのフレームの前にキャリブレーションをやり直す。
pub struct JsonLinesSource<R> {
    reader: R,
    input: InputConfig,
    line_no: usize,
    started: Instant,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R, input: &InputConfig) -> Self {
        Self {
            reader,
            input: input.clone(),
            line_no: 0,
            started: Instant::now(),
        }
    }

    fn to_frame(&self, record: FrameRecord) -> LandmarkFrame {
        let timestamp = record
            .timestamp
            .unwrap_or_else(|| self.started.elapsed().as_secs_f64());

        let landmarks = match (record.landmarks, record.keypoints) {
            (Some(lm), _) => Some(lm),
            (None, Some(keypoints)) => Pose::new(keypoints).posture_landmarks(
                self.input.frame_width,
                self.input.frame_height,
                self.input.min_visibility,
            ),
            (None, None) => None,
        };

        LandmarkFrame {
            timestamp,
            landmarks,
            recalibrate: record.recalibrate,
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let record: FrameRecord =
            serde_json::from_str(line.trim()).map_err(|source| PostureError::Parse {
                line: self.line_no,
                source,
            })?;
        Ok(Some(self.to_frame(record)))
    }
}
