//! 姿勢ランドマークの2D角度計算
//!
//! 純粋関数のみ。呼び出し間で状態を共有しない。

use serde::{Deserialize, Serialize};

use crate::error::{PostureError, Result};

/// 2D点（ピクセルまたは正規化座標）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn delta_from(self, other: Point2D) -> (f64, f64) {
        (
            self.x as f64 - other.x as f64,
            self.y as f64 - other.y as f64,
        )
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// `vertex` を頂点とする p1→vertex→p3 の角度（度、0〜180）
///
/// どちらかのベクトルが長さ0、または座標が非有限なら `DegenerateGeometry`。
pub fn angle_at_vertex(p1: Point2D, vertex: Point2D, p3: Point2D) -> Result<f32> {
    if !(p1.is_finite() && vertex.is_finite() && p3.is_finite()) {
        return Err(PostureError::DegenerateGeometry(
            "non-finite coordinate".to_string(),
        ));
    }

    let v1 = p1.delta_from(vertex);
    let v2 = p3.delta_from(vertex);
    let n1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let n2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if n1 == 0.0 || n2 == 0.0 {
        return Err(PostureError::DegenerateGeometry(format!(
            "zero-length ray at vertex ({:.1}, {:.1})",
            vertex.x, vertex.y
        )));
    }

    // 浮動小数点誤差で[-1, 1]をはみ出すとacosがNaNになる
    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (n1 * n2)).clamp(-1.0, 1.0);
    Ok(cos.acos().to_degrees().clamp(0.0, 180.0) as f32)
}

/// 姿勢判定に使う3つのランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureLandmarks {
    pub left_shoulder: Point2D,
    pub right_shoulder: Point2D,
    pub left_ear: Point2D,
}

/// 1フレーム分の肩・首角度（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PostureAngles {
    pub shoulder: f32,
    pub neck: f32,
}

impl PostureAngles {
    pub fn new(shoulder: f32, neck: f32) -> Self {
        Self { shoulder, neck }
    }
}

/// 画像上端 (y = 0) への鉛直線を基準にした肩・首角度
///
/// - 肩: 左肩 → 右肩（頂点） → 真上
/// - 首: 左耳 → 左肩（頂点） → 真上
pub fn posture_angles(landmarks: &PostureLandmarks) -> Result<PostureAngles> {
    let PostureLandmarks {
        left_shoulder,
        right_shoulder,
        left_ear,
    } = *landmarks;

    let shoulder = angle_at_vertex(
        left_shoulder,
        right_shoulder,
        Point2D::new(right_shoulder.x, 0.0),
    )?;
    let neck = angle_at_vertex(left_ear, left_shoulder, Point2D::new(left_shoulder.x, 0.0))?;

    Ok(PostureAngles { shoulder, neck })
}
